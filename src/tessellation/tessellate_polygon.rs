use std::collections::{HashMap, HashSet};

use spade::handles::{FixedFaceHandle, InnerTag};
use spade::{
    ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation,
};

use crate::error::{Result, TessellationError};
use crate::geometry::LocalFrame;
use crate::math::{Point2, Point3};

use super::TriangleMesh;

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Triangulates the fill of a closed ring drawn on the globe.
///
/// The ring is flattened into the east-north-up plane at its first vertex,
/// triangulated with a constrained Delaunay triangulation, and mapped back to
/// world coordinates. Local east/north become the UVs and the frame's up
/// axis the normal. A trailing vertex equal to the first is ignored.
#[derive(Debug)]
pub struct TessellatePolygon {
    ring: Vec<Point3>,
}

impl TessellatePolygon {
    /// Creates a new polygon tessellation operation.
    #[must_use]
    pub fn new(ring: Vec<Point3>) -> Self {
        Self { ring }
    }

    /// Executes the tessellation, returning a triangle mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the ring has fewer than 3 vertices, crosses
    /// itself, or the triangulation rejects a vertex.
    #[allow(clippy::cast_possible_truncation)]
    pub fn execute(&self) -> Result<TriangleMesh> {
        let mut ring = self.ring.as_slice();
        if let [first, .., last] = ring {
            if first == last {
                ring = &ring[..ring.len() - 1];
            }
        }
        let Some(&origin) = ring.first() else {
            return Err(
                TessellationError::InvalidParameters("polygon ring is empty".into()).into(),
            );
        };

        let frame = LocalFrame::east_north_up(origin)?;
        let normal = frame.up();

        let flat: Vec<SpadePoint2<f64>> = ring
            .iter()
            .map(|p| {
                let local = frame.to_local(p);
                SpadePoint2::new(local.x, local.y)
            })
            .collect();

        let mut cdt = Cdt::new();
        constrain_ring(&mut cdt, &flat)?;

        let interior_faces = classify_interior_faces(&cdt);

        let mut mesh = TriangleMesh::default();
        let mut vertex_map: HashMap<usize, u32> = HashMap::new();

        for face_handle in cdt.inner_faces() {
            if !interior_faces.contains(&face_handle.fix().index()) {
                continue;
            }

            let mut tri_indices = [0u32; 3];
            for (i, vh) in face_handle.vertices().iter().enumerate() {
                let idx = vh.fix().index();
                tri_indices[i] = *vertex_map.entry(idx).or_insert_with(|| {
                    let pos = vh.position();
                    let new_idx = mesh.vertices.len() as u32;
                    mesh.vertices.push(frame.to_world(&Point3::new(pos.x, pos.y, 0.0)));
                    mesh.normals.push(normal);
                    mesh.uvs.push(Point2::new(pos.x, pos.y));
                    new_idx
                });
            }
            mesh.indices.push(tri_indices);
        }

        Ok(mesh)
    }
}

/// Inserts the ring's vertices and constrains each edge, closing back to the
/// first vertex. Coincident vertices collapse onto one CDT vertex.
fn constrain_ring(cdt: &mut Cdt, points: &[SpadePoint2<f64>]) -> Result<()> {
    if points.len() < 3 {
        return Err(TessellationError::InvalidParameters(
            "polygon ring needs at least 3 vertices".into(),
        )
        .into());
    }

    let vertices = points
        .iter()
        .map(|&pt| cdt.insert(pt))
        .collect::<std::result::Result<Vec<_>, InsertionError>>()
        .map_err(|e| TessellationError::Failed(format!("CDT insert: {e}")))?;

    let closing = vertices.iter().skip(1).chain(vertices.first());
    for (&from, &to) in vertices.iter().zip(closing) {
        if from == to {
            continue;
        }
        if !cdt.can_add_constraint(from, to) {
            return Err(TessellationError::InvalidParameters(
                "polygon ring intersects itself".into(),
            )
            .into());
        }
        cdt.add_constraint(from, to);
    }

    Ok(())
}

/// Returns the indices of the CDT faces inside the ring.
///
/// Walks outward-in from the convex hull; crossing a constraint edge flips
/// between outside and inside.
fn classify_interior_faces(cdt: &Cdt) -> HashSet<usize> {
    let mut inside: HashMap<usize, bool> = HashMap::new();
    let mut pending: Vec<(FixedFaceHandle<InnerTag>, bool)> = cdt
        .convex_hull()
        .flat_map(|edge| [edge, edge.rev()])
        .filter_map(|edge| {
            let face = edge.face().as_inner()?;
            Some((face.fix(), cdt.is_constraint_edge(edge.as_undirected().fix())))
        })
        .collect();

    while let Some((face, is_inside)) = pending.pop() {
        if inside.contains_key(&face.index()) {
            continue;
        }
        inside.insert(face.index(), is_inside);
        for edge in cdt.face(face).adjacent_edges() {
            if let Some(neighbor) = edge.rev().face().as_inner() {
                let crosses = cdt.is_constraint_edge(edge.as_undirected().fix());
                pending.push((neighbor.fix(), is_inside != crosses));
            }
        }
    }

    inside
        .into_iter()
        .filter_map(|(index, is_inside)| is_inside.then_some(index))
        .collect()
}
