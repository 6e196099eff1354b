use crate::error::{GeometryError, Result};

use super::{Point3, Vector3, TOLERANCE};

/// Convergence threshold of the geodetic surface projection.
const EPSILON12: f64 = 1e-12;

/// Below this squared scaled norm a point is treated as the ellipsoid center.
const CENTER_TOLERANCE_SQUARED: f64 = 0.1;

/// Hard cap on Newton iterations; convergence normally takes 2-3 steps.
const MAX_ITERATIONS: usize = 64;

/// A geodetic position: longitude and latitude in radians, height in metres
/// above the ellipsoid surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cartographic {
    pub longitude: f64,
    pub latitude: f64,
    pub height: f64,
}

impl Cartographic {
    /// Creates a cartographic position from radians.
    #[must_use]
    pub fn new(longitude: f64, latitude: f64, height: f64) -> Self {
        Self {
            longitude,
            latitude,
            height,
        }
    }

    /// Creates a cartographic position from degrees.
    #[must_use]
    pub fn from_degrees(longitude: f64, latitude: f64, height: f64) -> Self {
        Self::new(longitude.to_radians(), latitude.to_radians(), height)
    }

    /// Converts a WGS84 Cartesian position. Returns `None` near the center.
    #[must_use]
    pub fn from_cartesian(position: &Point3) -> Option<Self> {
        Ellipsoid::wgs84().cartesian_to_cartographic(position)
    }

    /// Converts to a WGS84 Cartesian position.
    #[must_use]
    pub fn to_cartesian(&self) -> Point3 {
        Ellipsoid::wgs84().cartographic_to_cartesian(self)
    }

    #[must_use]
    pub fn longitude_degrees(&self) -> f64 {
        self.longitude.to_degrees()
    }

    #[must_use]
    pub fn latitude_degrees(&self) -> f64 {
        self.latitude.to_degrees()
    }
}

/// A triaxial ellipsoid centered at the origin, `x²/a² + y²/b² + z²/c² = 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    radii: Vector3,
    radii_squared: Vector3,
    one_over_radii: Vector3,
    one_over_radii_squared: Vector3,
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl Ellipsoid {
    /// Creates an ellipsoid from its three semi-axes.
    ///
    /// # Errors
    ///
    /// Returns an error if any radius is not strictly positive and finite.
    pub fn new(x: f64, y: f64, z: f64) -> Result<Self> {
        for r in [x, y, z] {
            if !(r.is_finite() && r > TOLERANCE) {
                return Err(GeometryError::InvalidArgument(format!(
                    "ellipsoid radius must be positive, got {r}"
                ))
                .into());
            }
        }
        Ok(Self::from_radii(Vector3::new(x, y, z)))
    }

    /// The WGS84 reference ellipsoid.
    #[must_use]
    pub fn wgs84() -> Self {
        Self::from_radii(Vector3::new(6_378_137.0, 6_378_137.0, 6_356_752.314_245_179))
    }

    fn from_radii(radii: Vector3) -> Self {
        Self {
            radii,
            radii_squared: radii.component_mul(&radii),
            one_over_radii: radii.map(|r| 1.0 / r),
            one_over_radii_squared: radii.map(|r| 1.0 / (r * r)),
        }
    }

    /// Returns the semi-axes.
    #[must_use]
    pub fn radii(&self) -> &Vector3 {
        &self.radii
    }

    /// Returns the outward surface normal of the ellipsoid through `position`.
    ///
    /// `None` when `position` is the origin.
    #[must_use]
    pub fn geodetic_surface_normal(&self, position: &Point3) -> Option<Vector3> {
        let n = position.coords.component_mul(&self.one_over_radii_squared);
        let len = n.norm();
        (len > TOLERANCE && len.is_finite()).then_some(n / len)
    }

    /// Returns the surface normal for a cartographic position.
    #[must_use]
    pub fn geodetic_surface_normal_cartographic(&self, cartographic: &Cartographic) -> Vector3 {
        let cos_lat = cartographic.latitude.cos();
        Vector3::new(
            cos_lat * cartographic.longitude.cos(),
            cos_lat * cartographic.longitude.sin(),
            cartographic.latitude.sin(),
        )
        .normalize()
    }

    /// Projects `position` along the geodetic normal onto the surface.
    ///
    /// Newton iteration on the Lagrange multiplier of the closest-point
    /// problem. Returns `None` for points too close to the center.
    #[must_use]
    pub fn scale_to_geodetic_surface(&self, position: &Point3) -> Option<Point3> {
        let inv = &self.one_over_radii;
        let inv_sq = &self.one_over_radii_squared;

        let x2 = position.x * position.x * inv.x * inv.x;
        let y2 = position.y * position.y * inv.y * inv.y;
        let z2 = position.z * position.z * inv.z * inv.z;

        let squared_norm = x2 + y2 + z2;
        let ratio = (1.0 / squared_norm).sqrt();
        let intersection = position.coords * ratio;

        if squared_norm < CENTER_TOLERANCE_SQUARED {
            return ratio.is_finite().then_some(Point3::from(intersection));
        }

        let gradient = intersection.component_mul(inv_sq) * 2.0;
        let mut lambda = (1.0 - ratio) * position.coords.norm() / (0.5 * gradient.norm());
        let mut correction = 0.0;

        let mut multiplier = Vector3::repeat(1.0);
        for iteration in 0..MAX_ITERATIONS {
            lambda -= correction;

            multiplier = inv_sq.map(|s| 1.0 / (1.0 + lambda * s));
            let m2 = multiplier.component_mul(&multiplier);
            let m3 = m2.component_mul(&multiplier);

            let func = x2 * m2.x + y2 * m2.y + z2 * m2.z - 1.0;
            // At least one Newton step, even when the first guess looks converged.
            if iteration > 0 && func.abs() <= EPSILON12 {
                break;
            }

            let denominator = x2 * m3.x * inv_sq.x + y2 * m3.y * inv_sq.y + z2 * m3.z * inv_sq.z;
            let derivative = -2.0 * denominator;
            correction = func / derivative;
        }

        Some(Point3::from(position.coords.component_mul(&multiplier)))
    }

    /// Converts an Earth-fixed Cartesian position to cartographic.
    #[must_use]
    pub fn cartesian_to_cartographic(&self, position: &Point3) -> Option<Cartographic> {
        let surface = self.scale_to_geodetic_surface(position)?;
        let normal = self.geodetic_surface_normal(&surface)?;
        let h = position - surface;

        let longitude = normal.y.atan2(normal.x);
        let latitude = normal.z.clamp(-1.0, 1.0).asin();
        let height = h.dot(&position.coords).signum() * h.norm();

        Some(Cartographic::new(longitude, latitude, height))
    }

    /// Converts a cartographic position to Earth-fixed Cartesian.
    #[must_use]
    pub fn cartographic_to_cartesian(&self, cartographic: &Cartographic) -> Point3 {
        let n = self.geodetic_surface_normal_cartographic(cartographic);
        let k = self.radii_squared.component_mul(&n);
        let gamma = n.dot(&k).sqrt();
        Point3::from(k / gamma + n * cartographic.height)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn equator_prime_meridian_is_on_x_axis() {
        let p = Cartographic::from_degrees(0.0, 0.0, 0.0).to_cartesian();
        assert_abs_diff_eq!(p.x, 6_378_137.0, epsilon = 1e-6);
        assert_abs_diff_eq!(p.y, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(p.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn north_pole_is_on_minor_axis() {
        let p = Cartographic::from_degrees(0.0, 90.0, 0.0).to_cartesian();
        assert_abs_diff_eq!(p.z, 6_356_752.314_245_179, epsilon = 1e-6);
        assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn cartographic_round_trip() {
        let original = Cartographic::from_degrees(120.0, 36.0, 1000.0);
        let back = Cartographic::from_cartesian(&original.to_cartesian()).unwrap();
        assert_abs_diff_eq!(back.longitude_degrees(), 120.0, epsilon = 1e-9);
        assert_abs_diff_eq!(back.latitude_degrees(), 36.0, epsilon = 1e-9);
        assert_abs_diff_eq!(back.height, 1000.0, epsilon = 1e-6);
    }

    #[test]
    fn negative_height_round_trip() {
        let original = Cartographic::from_degrees(-45.0, -60.0, -250.0);
        let back = Cartographic::from_cartesian(&original.to_cartesian()).unwrap();
        assert_abs_diff_eq!(back.height, -250.0, epsilon = 1e-6);
        assert_abs_diff_eq!(back.longitude_degrees(), -45.0, epsilon = 1e-9);
    }

    #[test]
    fn heights_just_above_surface_are_exact() {
        for height in [0.05, 0.3, 0.5, 0.9] {
            let p = Cartographic::from_degrees(-73.9, 40.7, height).to_cartesian();
            let back = Cartographic::from_cartesian(&p).unwrap();
            assert_abs_diff_eq!(back.height, height, epsilon = 1e-8);
        }
    }

    #[test]
    fn center_has_no_cartographic() {
        assert!(Cartographic::from_cartesian(&Point3::origin()).is_none());
    }

    #[test]
    fn surface_normal_at_equator_is_radial() {
        let e = Ellipsoid::wgs84();
        let n = e
            .geodetic_surface_normal(&Point3::new(6_378_137.0, 0.0, 0.0))
            .unwrap();
        assert_abs_diff_eq!(n, Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn invalid_radius_fails() {
        assert!(Ellipsoid::new(1.0, 0.0, 1.0).is_err());
        assert!(Ellipsoid::new(1.0, 1.0, f64::NAN).is_err());
        assert!(Ellipsoid::new(2.0, 2.0, 1.0).is_ok());
    }
}
