use crate::math::Point3;

/// A sphere enclosing a set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Point3,
    pub radius: f64,
}

impl Default for BoundingSphere {
    fn default() -> Self {
        Self {
            center: Point3::origin(),
            radius: 0.0,
        }
    }
}

impl BoundingSphere {
    /// Computes a tight sphere around `points`.
    ///
    /// Runs Ritter's algorithm seeded with the widest pair of axis extremes,
    /// and also the sphere around the axis-aligned box center; the smaller of
    /// the two is returned. An empty slice gives a zero sphere at the origin.
    #[must_use]
    pub fn from_points(points: &[Point3]) -> Self {
        let Some(&first) = points.first() else {
            return Self::default();
        };

        let (mut x_min, mut x_max) = (first, first);
        let (mut y_min, mut y_max) = (first, first);
        let (mut z_min, mut z_max) = (first, first);
        for &p in &points[1..] {
            if p.x < x_min.x {
                x_min = p;
            }
            if p.x > x_max.x {
                x_max = p;
            }
            if p.y < y_min.y {
                y_min = p;
            }
            if p.y > y_max.y {
                y_max = p;
            }
            if p.z < z_min.z {
                z_min = p;
            }
            if p.z > z_max.z {
                z_max = p;
            }
        }

        let x_span = (x_max - x_min).norm_squared();
        let y_span = (y_max - y_min).norm_squared();
        let z_span = (z_max - z_min).norm_squared();

        let (diameter_min, diameter_max) = if x_span >= y_span && x_span >= z_span {
            (x_min, x_max)
        } else if y_span >= z_span {
            (y_min, y_max)
        } else {
            (z_min, z_max)
        };

        let mut ritter_center = nalgebra::center(&diameter_min, &diameter_max);
        let mut radius_squared = (diameter_max - ritter_center).norm_squared();
        let mut ritter_radius = radius_squared.sqrt();

        let box_min = Point3::new(x_min.x, y_min.y, z_min.z);
        let box_max = Point3::new(x_max.x, y_max.y, z_max.z);
        let naive_center = nalgebra::center(&box_min, &box_max);
        let mut naive_radius: f64 = 0.0;

        for p in points {
            naive_radius = naive_radius.max((p - naive_center).norm());

            let distance_squared = (p - ritter_center).norm_squared();
            if distance_squared > radius_squared {
                let distance = distance_squared.sqrt();
                ritter_radius = (ritter_radius + distance) * 0.5;
                radius_squared = ritter_radius * ritter_radius;
                let shift = distance - ritter_radius;
                ritter_center = Point3::from(
                    (ritter_center.coords * ritter_radius + p.coords * shift) / distance,
                );
            }
        }

        if ritter_radius < naive_radius {
            Self {
                center: ritter_center,
                radius: ritter_radius,
            }
        } else {
            Self {
                center: naive_center,
                radius: naive_radius,
            }
        }
    }

    /// Returns `true` if `point` lies inside the sphere, allowing `tolerance`.
    #[must_use]
    pub fn contains(&self, point: &Point3, tolerance: f64) -> bool {
        (point - self.center).norm() <= self.radius + tolerance
    }
}
