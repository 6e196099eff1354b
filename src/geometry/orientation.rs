use crate::error::Result;
use crate::math::{Point3, TOLERANCE};

use super::LocalFrame;

/// Returns the heading from `from` to `to` in degrees, in `(-180, 180]`.
///
/// 0 is north and 90 is east, measured in the east-north-up frame at `from`.
/// Axis-aligned offsets are returned exactly; coincident points give 0.
///
/// # Errors
///
/// Returns an error if `from` has no local frame (ellipsoid center).
pub fn heading_degrees(from: &Point3, to: &Point3) -> Result<f64> {
    let offset = LocalFrame::east_north_up(*from)?.to_local_direction(&(to - from));
    let (east, north) = (offset.x, offset.y);

    let east_zero = east.abs() < TOLERANCE;
    let north_zero = north.abs() < TOLERANCE;

    let heading = match (east_zero, north_zero) {
        (true, true) => 0.0,
        (true, false) => {
            if north > 0.0 {
                0.0
            } else {
                180.0
            }
        }
        (false, true) => {
            if east > 0.0 {
                90.0
            } else {
                -90.0
            }
        }
        (false, false) => east.atan2(north).to_degrees(),
    };
    Ok(heading)
}

/// Returns the pitch from `from` to `to` in degrees, in `[-90, 90]`.
///
/// Positive when `to` is above the tangent plane at `from`. A purely vertical
/// offset gives exactly ±90 and a purely horizontal one exactly 0.
///
/// # Errors
///
/// Returns an error if `from` has no local frame (ellipsoid center).
pub fn pitch_degrees(from: &Point3, to: &Point3) -> Result<f64> {
    let offset = LocalFrame::east_north_up(*from)?.to_local_direction(&(to - from));
    let horizontal = offset.x.hypot(offset.y);
    let vertical = offset.z;

    let pitch = if vertical.abs() < TOLERANCE {
        0.0
    } else if horizontal < TOLERANCE {
        if vertical > 0.0 {
            90.0
        } else {
            -90.0
        }
    } else {
        (vertical / horizontal).atan().to_degrees()
    };
    Ok(pitch)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::LocalFrame;
    use crate::math::Cartographic;
    use approx::assert_abs_diff_eq;

    fn origin() -> Point3 {
        Cartographic::from_degrees(120.0, 36.0, 0.0).to_cartesian()
    }

    fn local_offset(east: f64, north: f64, up: f64) -> Point3 {
        let frame = LocalFrame::east_north_up(origin()).unwrap();
        frame.to_world(&Point3::new(east, north, up))
    }

    #[test]
    fn due_north_is_zero() {
        let to = Cartographic::from_degrees(120.0, 36.01, 0.0).to_cartesian();
        assert_abs_diff_eq!(heading_degrees(&origin(), &to).unwrap(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn due_east_is_ninety() {
        let to = local_offset(500.0, 0.0, 0.0);
        assert_abs_diff_eq!(heading_degrees(&origin(), &to).unwrap(), 90.0, epsilon = 1e-9);
    }

    #[test]
    fn south_and_west() {
        let south = local_offset(0.0, -500.0, 0.0);
        assert_abs_diff_eq!(heading_degrees(&origin(), &south).unwrap().abs(), 180.0, epsilon = 1e-9);
        let west = local_offset(-500.0, 0.0, 0.0);
        assert_abs_diff_eq!(heading_degrees(&origin(), &west).unwrap(), -90.0, epsilon = 1e-9);
        let north_east = local_offset(100.0, 100.0, 0.0);
        assert_abs_diff_eq!(heading_degrees(&origin(), &north_east).unwrap(), 45.0, epsilon = 1e-9);
    }

    #[test]
    fn coincident_points_have_zero_heading_and_pitch() {
        let o = origin();
        assert!(heading_degrees(&o, &o).unwrap().abs() < 1e-9);
        assert!(pitch_degrees(&o, &o).unwrap().abs() < 1e-9);
    }

    #[test]
    fn vertical_offsets_are_plus_minus_ninety() {
        let above = Cartographic::from_degrees(120.0, 36.0, 100.0).to_cartesian();
        let below = Cartographic::from_degrees(120.0, 36.0, -100.0).to_cartesian();
        assert_abs_diff_eq!(pitch_degrees(&origin(), &above).unwrap(), 90.0, epsilon = 1e-6);
        assert_abs_diff_eq!(pitch_degrees(&origin(), &below).unwrap(), -90.0, epsilon = 1e-6);
    }

    #[test]
    fn forty_five_degree_climb() {
        let to = local_offset(0.0, 200.0, 200.0);
        assert_abs_diff_eq!(pitch_degrees(&origin(), &to).unwrap(), 45.0, epsilon = 1e-9);
    }

    #[test]
    fn center_has_no_heading() {
        assert!(heading_degrees(&Point3::origin(), &origin()).is_err());
    }
}
