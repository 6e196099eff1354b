//! Host-side drawable entities.
//!
//! The drawer never renders anything itself. It describes what should be on
//! screen as [`Entity`] values and hands them to an [`EntitySink`], usually
//! the [`EntityCollection`] of a data source owned by the viewer.

mod collection;
mod style;

pub use collection::{CollectionChange, EntityCollection};
pub use style::{Color, LabelStyle, PointStyle, PolygonStyle, PolylineStyle};

use crate::math::Point3;

slotmap::new_key_type! {
    /// Unique identifier for an entity in a collection.
    pub struct EntityId;
}

/// A closed ring of positions with optional holes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolygonHierarchy {
    pub positions: Vec<Point3>,
    pub holes: Vec<PolygonHierarchy>,
}

impl PolygonHierarchy {
    /// Creates a hierarchy without holes.
    #[must_use]
    pub fn new(positions: Vec<Point3>) -> Self {
        Self {
            positions,
            holes: Vec::new(),
        }
    }
}

/// How the host should treat an entity's geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sampling {
    /// Fixed until the next explicit update.
    #[default]
    Constant,
    /// Live geometry that changes while the user moves the pointer; hosts
    /// should re-read it every frame.
    PerFrame,
}

/// The visual content of an entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Graphics {
    Point {
        position: Point3,
        style: PointStyle,
    },
    Label {
        position: Point3,
        text: String,
        style: LabelStyle,
    },
    Polyline {
        positions: Vec<Point3>,
        style: PolylineStyle,
    },
    Polygon {
        hierarchy: PolygonHierarchy,
        style: PolygonStyle,
    },
}

/// Replacement geometry for an existing entity.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityGeometry {
    Position(Point3),
    Positions(Vec<Point3>),
    Hierarchy(PolygonHierarchy),
}

/// A drawable entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub graphics: Graphics,
    pub sampling: Sampling,
}

impl Entity {
    #[must_use]
    pub fn new(graphics: Graphics) -> Self {
        Self {
            graphics,
            sampling: Sampling::Constant,
        }
    }

    #[must_use]
    pub fn with_sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }

    /// Replaces the geometry, keeping the style.
    ///
    /// Returns `false` and leaves the entity untouched if `geometry` does not
    /// fit this kind of graphics.
    pub fn set_geometry(&mut self, geometry: EntityGeometry, sampling: Sampling) -> bool {
        match (&mut self.graphics, geometry) {
            (Graphics::Point { position, .. } | Graphics::Label { position, .. }, EntityGeometry::Position(p)) => {
                *position = p;
            }
            (Graphics::Polyline { positions, .. }, EntityGeometry::Positions(p)) => {
                *positions = p;
            }
            (Graphics::Polygon { hierarchy, .. }, EntityGeometry::Hierarchy(h)) => {
                *hierarchy = h;
            }
            _ => return false,
        }
        self.sampling = sampling;
        true
    }
}

/// Capability to create, remove and update entities on the host.
///
/// Removal is idempotent: removing an id that is already gone returns
/// `false` and is not an error.
pub trait EntitySink {
    /// Adds an entity and returns its id.
    fn add(&mut self, entity: Entity) -> EntityId;

    /// Removes an entity. Returns `true` if it was present.
    fn remove(&mut self, id: EntityId) -> bool;

    /// Removes every entity.
    fn remove_all(&mut self);

    /// Replaces the geometry of an entity. Returns `false` if the id is
    /// unknown or the geometry does not match the entity kind.
    fn update_geometry(&mut self, id: EntityId, geometry: EntityGeometry, sampling: Sampling) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_geometry_matches_kind() {
        let mut point = Entity::new(Graphics::Point {
            position: Point3::origin(),
            style: PointStyle::default(),
        });
        let moved = Point3::new(1.0, 2.0, 3.0);
        assert!(point.set_geometry(EntityGeometry::Position(moved), Sampling::Constant));
        assert!(matches!(point.graphics, Graphics::Point { position, .. } if position == moved));

        assert!(!point.set_geometry(EntityGeometry::Positions(vec![moved]), Sampling::PerFrame));
        assert_eq!(point.sampling, Sampling::Constant);
    }

    #[test]
    fn polygon_takes_hierarchy() {
        let mut polygon = Entity::new(Graphics::Polygon {
            hierarchy: PolygonHierarchy::default(),
            style: PolygonStyle::default(),
        });
        let ring = PolygonHierarchy::new(vec![Point3::origin(); 3]);
        assert!(polygon.set_geometry(EntityGeometry::Hierarchy(ring.clone()), Sampling::PerFrame));
        assert_eq!(polygon.sampling, Sampling::PerFrame);
        assert!(matches!(&polygon.graphics, Graphics::Polygon { hierarchy, .. } if *hierarchy == ring));
    }
}
