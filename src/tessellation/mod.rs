mod bounding_sphere;
mod continuous_wall;
mod tessellate_polygon;

pub use bounding_sphere::BoundingSphere;
pub use continuous_wall::ContinuousWall;
pub use tessellate_polygon::TessellatePolygon;

use crate::math::{Point2, Point3, Vector3};

/// A vertical ribbon of triangles following a ground path.
///
/// Positions are interleaved per path vertex: index `2i` is the bottom and
/// `2i + 1` the top of vertex `i`. Texture `u` runs along the path in
/// proportion to ground distance; `v` is 0 at the bottom and 1 at the top.
#[derive(Debug, Clone)]
pub struct WallMesh {
    /// Bottom/top vertex positions.
    pub positions: Vec<Point3>,
    /// Texture coordinates, one per position.
    pub uvs: Vec<Point2>,
    /// Triangle indices (each triple defines a triangle).
    pub indices: Vec<[u32; 3]>,
    /// Sphere enclosing every position.
    pub bounding_sphere: BoundingSphere,
}

/// A triangle mesh approximation of a surface.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Vertex normals.
    pub normals: Vec<Vector3>,
    /// UV coordinates.
    pub uvs: Vec<Point2>,
    /// Triangle indices (each triple defines a triangle).
    pub indices: Vec<[u32; 3]>,
}
