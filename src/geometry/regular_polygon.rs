use crate::error::{GeometryError, Result};
use crate::math::Point3;

use super::LocalFrame;

/// Generates the vertices of a regular polygon centered on `center`.
///
/// Vertices lie at `radius` metres from `center` in its east-north-up
/// tangent plane, spaced `360 / sides` degrees apart and starting due east.
/// The ring is explicitly closed, so `sides + 1` points are returned and the
/// first equals the last.
///
/// # Errors
///
/// Returns an error if `sides < 3`, if `radius` is negative or not finite,
/// or if `center` has no local frame.
#[allow(clippy::cast_precision_loss)]
pub fn regular_polygon_vertices(center: &Point3, radius: f64, sides: usize) -> Result<Vec<Point3>> {
    if sides < 3 {
        return Err(GeometryError::InvalidArgument(format!(
            "a regular polygon needs at least 3 sides, got {sides}"
        ))
        .into());
    }
    if !radius.is_finite() || radius < 0.0 {
        return Err(GeometryError::InvalidArgument(format!(
            "radius must be finite and non-negative, got {radius}"
        ))
        .into());
    }

    let frame = LocalFrame::east_north_up(*center)?;
    let step = 360.0 / sides as f64;

    let mut vertices = Vec::with_capacity(sides + 1);
    for i in 0..sides {
        let angle = (i as f64 * step).to_radians();
        let local = Point3::new(radius * angle.cos(), radius * angle.sin(), 0.0);
        vertices.push(frame.to_world(&local));
    }
    vertices.push(vertices[0]);

    Ok(vertices)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::to_local_frame;
    use crate::math::Cartographic;
    use approx::assert_abs_diff_eq;

    fn center() -> Point3 {
        Cartographic::from_degrees(116.39, 39.9, 50.0).to_cartesian()
    }

    #[test]
    fn two_sides_fails() {
        assert!(regular_polygon_vertices(&center(), 100.0, 2).is_err());
        assert!(regular_polygon_vertices(&center(), 100.0, 0).is_err());
    }

    #[test]
    fn negative_radius_fails() {
        assert!(regular_polygon_vertices(&center(), -1.0, 4).is_err());
        assert!(regular_polygon_vertices(&center(), f64::INFINITY, 4).is_err());
    }

    #[test]
    fn square_has_closing_duplicate_at_radius() {
        let c = center();
        let vertices = regular_polygon_vertices(&c, 100.0, 4).unwrap();
        assert_eq!(vertices.len(), 5);
        assert_eq!(vertices[0], vertices[4]);

        let (_, local) = to_local_frame(&c, &vertices).unwrap();
        for p in &local {
            assert_abs_diff_eq!(p.coords.norm(), 100.0, epsilon = 1e-6);
            assert_abs_diff_eq!(p.z, 0.0, epsilon = 1e-6);
        }
        // First vertex due east, second due north.
        assert_abs_diff_eq!(local[0], Point3::new(100.0, 0.0, 0.0), epsilon = 1e-6);
        assert_abs_diff_eq!(local[1], Point3::new(0.0, 100.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn hexagon_edges_are_equal() {
        let c = center();
        let vertices = regular_polygon_vertices(&c, 30.0, 6).unwrap();
        assert_eq!(vertices.len(), 7);
        for pair in vertices.windows(2) {
            // Side of a regular hexagon equals its circumradius.
            assert_abs_diff_eq!((pair[1] - pair[0]).norm(), 30.0, epsilon = 1e-6);
        }
    }
}
