use crate::error::{Result, TessellationError};
use crate::geometry::set_height;
use crate::math::{Point2, Point3};

use super::{BoundingSphere, WallMesh};

/// Shortest ground perimeter, in metres, that still gets texture coordinates.
const MIN_PERIMETER: f64 = 1e-6;

/// Builds a continuous wall along a path, with texture coordinates that
/// follow ground distance instead of vertex count.
///
/// The wall top is each path vertex (or the vertex at its maximum height
/// override); the bottom is the vertex dropped to the ellipsoid surface (or
/// at its non-zero minimum height override).
#[derive(Debug, Clone)]
pub struct ContinuousWall {
    positions: Vec<Point3>,
    minimum_heights: Option<Vec<f64>>,
    maximum_heights: Option<Vec<f64>>,
}

/// Top, bottom and ground projection of one path vertex.
struct WallColumn {
    top: Point3,
    bottom: Point3,
    ground: Point3,
}

impl ContinuousWall {
    /// Creates a new wall builder over `positions`.
    #[must_use]
    pub fn new(positions: Vec<Point3>) -> Self {
        Self {
            positions,
            minimum_heights: None,
            maximum_heights: None,
        }
    }

    /// Overrides the bottom height of each vertex. A `0.0` entry keeps the
    /// ground projection.
    #[must_use]
    pub fn with_minimum_heights(mut self, heights: Vec<f64>) -> Self {
        self.minimum_heights = Some(heights);
        self
    }

    /// Overrides the top height of each vertex.
    #[must_use]
    pub fn with_maximum_heights(mut self, heights: Vec<f64>) -> Self {
        self.maximum_heights = Some(heights);
        self
    }

    /// Executes the build, producing the wall mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than 2 positions are given, if a height
    /// array does not match the number of positions, or if every position
    /// projects onto the same ground point (zero perimeter).
    #[allow(clippy::cast_possible_truncation)]
    pub fn execute(&self) -> Result<WallMesh> {
        let n = self.positions.len();
        if n < 2 {
            return Err(TessellationError::InvalidParameters(
                "at least 2 positions are required for a wall".to_owned(),
            )
            .into());
        }
        check_length("maximum_heights", n, self.maximum_heights.as_deref())?;
        check_length("minimum_heights", n, self.minimum_heights.as_deref())?;

        let columns = self.columns();

        // Chord distance between consecutive ground points.
        let mut cumulative = Vec::with_capacity(n);
        cumulative.push(0.0);
        let mut perimeter = 0.0;
        for pair in columns.windows(2) {
            perimeter += (pair[1].ground - pair[0].ground).norm();
            cumulative.push(perimeter);
        }
        if perimeter < MIN_PERIMETER {
            return Err(TessellationError::Degenerate(
                "wall path has zero ground length".to_owned(),
            )
            .into());
        }

        let mut positions = Vec::with_capacity(2 * n);
        let mut uvs = Vec::with_capacity(2 * n);
        for (i, column) in columns.iter().enumerate() {
            // The last column is pinned so the texture always ends exactly at 1.
            let s = if i == n - 1 {
                1.0
            } else {
                cumulative[i] / perimeter
            };
            positions.push(column.bottom);
            positions.push(column.top);
            uvs.push(Point2::new(s, 0.0));
            uvs.push(Point2::new(s, 1.0));
        }

        let steps = (n - 1) * 2;
        let mut indices = Vec::with_capacity(steps);
        for k in 0..steps {
            let k = k as u32;
            if k % 2 == 1 {
                indices.push([k + 2, k - 1, k + 1]);
            } else {
                indices.push([k + 1, k, k + 3]);
            }
        }

        let bounding_sphere = BoundingSphere::from_points(&positions);

        Ok(WallMesh {
            positions,
            uvs,
            indices,
            bounding_sphere,
        })
    }

    fn columns(&self) -> Vec<WallColumn> {
        self.positions
            .iter()
            .enumerate()
            .map(|(i, position)| {
                let ground = set_height(position, 0.0);
                let top = match &self.maximum_heights {
                    Some(heights) => set_height(position, heights[i]),
                    None => *position,
                };
                let bottom = match &self.minimum_heights {
                    Some(heights) if heights[i] != 0.0 => set_height(position, heights[i]),
                    _ => ground,
                };
                WallColumn { top, bottom, ground }
            })
            .collect()
    }
}

fn check_length(name: &'static str, expected: usize, heights: Option<&[f64]>) -> Result<()> {
    match heights {
        Some(h) if h.len() != expected => Err(TessellationError::LengthMismatch {
            name,
            expected,
            actual: h.len(),
        }
        .into()),
        _ => Ok(()),
    }
}
