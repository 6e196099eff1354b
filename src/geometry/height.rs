use crate::math::{Cartographic, Point3};

/// Returns `position` with its ellipsoidal height raised by `delta` metres.
///
/// `delta` may be negative. A position with no cartographic representation
/// (the ellipsoid center) is returned unchanged.
#[must_use]
pub fn add_height(position: &Point3, delta: f64) -> Point3 {
    match Cartographic::from_cartesian(position) {
        Some(mut cartographic) => {
            cartographic.height += delta;
            cartographic.to_cartesian()
        }
        None => *position,
    }
}

/// Returns `position` moved along its geodetic normal to `height` metres.
#[must_use]
pub fn set_height(position: &Point3, height: f64) -> Point3 {
    match Cartographic::from_cartesian(position) {
        Some(mut cartographic) => {
            cartographic.height = height;
            cartographic.to_cartesian()
        }
        None => *position,
    }
}
