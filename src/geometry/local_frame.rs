use crate::error::{GeometryError, Result};
use crate::math::{transform_direction, transform_point, Ellipsoid, Matrix4, Point3, Vector3, TOLERANCE};

/// An east-north-up frame tangent to the ellipsoid at `origin`.
///
/// Local `x` points east, `y` north and `z` along the geodetic normal.
/// Planar math near the origin can be done on local `(x, y)` directly.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalFrame {
    origin: Point3,
    to_world: Matrix4,
    to_local: Matrix4,
}

impl LocalFrame {
    /// Builds the WGS84 east-north-up frame at `origin`.
    ///
    /// # Errors
    ///
    /// Returns an error if `origin` has no surface normal (ellipsoid center).
    pub fn east_north_up(origin: Point3) -> Result<Self> {
        Self::east_north_up_on(&Ellipsoid::wgs84(), origin)
    }

    /// Builds the east-north-up frame at `origin` on the given ellipsoid.
    ///
    /// # Errors
    ///
    /// Returns an error if `origin` has no surface normal (ellipsoid center).
    pub fn east_north_up_on(ellipsoid: &Ellipsoid, origin: Point3) -> Result<Self> {
        let up = ellipsoid
            .geodetic_surface_normal(&origin)
            .ok_or(GeometryError::ZeroVector)?;

        // On the polar axis east is undefined; pin it to +Y.
        let east = if origin.x.abs() < TOLERANCE && origin.y.abs() < TOLERANCE {
            Vector3::y()
        } else {
            Vector3::new(-origin.y, origin.x, 0.0).normalize()
        };
        let north = up.cross(&east);

        #[rustfmt::skip]
        let to_world = Matrix4::new(
            east.x, north.x, up.x, origin.x,
            east.y, north.y, up.y, origin.y,
            east.z, north.z, up.z, origin.z,
            0.0,    0.0,     0.0,  1.0,
        );

        // Rigid transform: inverse rotation is the transpose.
        let o = origin.coords;
        #[rustfmt::skip]
        let to_local = Matrix4::new(
            east.x,  east.y,  east.z,  -east.dot(&o),
            north.x, north.y, north.z, -north.dot(&o),
            up.x,    up.y,    up.z,    -up.dot(&o),
            0.0,     0.0,     0.0,     1.0,
        );

        Ok(Self {
            origin,
            to_world,
            to_local,
        })
    }

    /// Returns the frame origin in world coordinates.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the local-to-world transform.
    #[must_use]
    pub fn to_world_matrix(&self) -> &Matrix4 {
        &self.to_world
    }

    /// Returns the world-to-local transform.
    #[must_use]
    pub fn to_local_matrix(&self) -> &Matrix4 {
        &self.to_local
    }

    /// Expresses a world point in this frame.
    #[must_use]
    pub fn to_local(&self, point: &Point3) -> Point3 {
        transform_point(&self.to_local, point)
    }

    /// Maps a local point back to world coordinates.
    #[must_use]
    pub fn to_world(&self, point: &Point3) -> Point3 {
        transform_point(&self.to_world, point)
    }

    /// Expresses a world-space offset in this frame (rotation only).
    #[must_use]
    pub fn to_local_direction(&self, offset: &Vector3) -> Vector3 {
        transform_direction(&self.to_local, offset)
    }

    /// Returns the local up axis in world coordinates.
    #[must_use]
    pub fn up(&self) -> Vector3 {
        transform_direction(&self.to_world, &Vector3::z())
    }
}

/// Builds the east-north-up frame at `origin` and expresses `points` in it.
///
/// # Errors
///
/// Returns an error if `origin` has no surface normal (ellipsoid center).
pub fn to_local_frame(origin: &Point3, points: &[Point3]) -> Result<(LocalFrame, Vec<Point3>)> {
    let frame = LocalFrame::east_north_up(*origin)?;
    let local = points.iter().map(|p| frame.to_local(p)).collect();
    Ok((frame, local))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Cartographic;
    use approx::assert_abs_diff_eq;

    #[test]
    fn origin_maps_to_local_zero() {
        let origin = Cartographic::from_degrees(120.0, 36.0, 0.0).to_cartesian();
        let (_, local) = to_local_frame(&origin, &[origin]).unwrap();
        assert_abs_diff_eq!(local[0], Point3::origin(), epsilon = 1e-6);
    }

    #[test]
    fn forward_and_inverse_are_consistent() {
        let origin = Cartographic::from_degrees(-10.0, 45.0, 100.0).to_cartesian();
        let frame = LocalFrame::east_north_up(origin).unwrap();
        let world = Cartographic::from_degrees(-9.99, 45.01, 250.0).to_cartesian();
        let back = frame.to_world(&frame.to_local(&world));
        assert_abs_diff_eq!(back, world, epsilon = 1e-6);

        let product = frame.to_world_matrix() * frame.to_local_matrix();
        assert_abs_diff_eq!(product, Matrix4::identity(), epsilon = 1e-6);
    }

    #[test]
    fn axes_point_east_north_up_at_equator() {
        let origin = Cartographic::from_degrees(0.0, 0.0, 0.0).to_cartesian();
        let frame = LocalFrame::east_north_up(origin).unwrap();

        // 100 m up along +X, east is +Y, north is +Z at (0°, 0°).
        let above = frame.to_local(&Point3::new(origin.x + 100.0, 0.0, 0.0));
        assert_abs_diff_eq!(above, Point3::new(0.0, 0.0, 100.0), epsilon = 1e-6);

        let east = frame.to_local(&Point3::new(origin.x, 10.0, 0.0));
        assert_abs_diff_eq!(east, Point3::new(10.0, 0.0, 0.0), epsilon = 1e-6);

        let north = frame.to_local(&Point3::new(origin.x, 0.0, 10.0));
        assert_abs_diff_eq!(north, Point3::new(0.0, 10.0, 0.0), epsilon = 1e-6);

        assert_abs_diff_eq!(frame.up(), Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn pole_frame_is_orthonormal() {
        let origin = Cartographic::from_degrees(0.0, 90.0, 0.0).to_cartesian();
        let frame = LocalFrame::east_north_up(origin).unwrap();
        let product = frame.to_world_matrix() * frame.to_local_matrix();
        assert_abs_diff_eq!(product, Matrix4::identity(), epsilon = 1e-6);
    }

    #[test]
    fn center_has_no_frame() {
        assert!(LocalFrame::east_north_up(Point3::origin()).is_err());
    }
}
