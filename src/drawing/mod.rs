//! Interactive shape capture.
//!
//! A [`Drawer`] binds to a [`Viewer`](crate::host::Viewer), receives its
//! pointer events and drives one [`DrawingSession`] at a time. Finished
//! shapes are kept as [`CompletedShape`] records.

mod drawer;
mod options;
mod session;

pub use drawer::{Drawer, DrawerOptions, DrawerState, FinishCallback};
pub use options::{
    default_label_text, CompletionPredicate, DrawOptions, LabelHeight, LabelOptions, LabelText,
    LabelTextFn,
};
pub use session::DrawingSession;

use crate::entity::{EntityId, PolygonHierarchy};
use crate::error::{Result, TessellationError};
use crate::math::Point3;
use crate::tessellation::{ContinuousWall, TessellatePolygon, TriangleMesh};

/// The kind of shape a session captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Polyline,
    Polygon,
}

impl ShapeKind {
    /// Fewest committed vertices a finished shape may have.
    #[must_use]
    pub fn min_vertices(self) -> usize {
        match self {
            Self::Polyline => 2,
            Self::Polygon => 3,
        }
    }
}

/// A committed vertex with the entities decorating it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecoratedVertex {
    pub position: Point3,
    pub point: Option<EntityId>,
    pub label: Option<EntityId>,
}

/// The vertex a label is created for, with every position committed so far.
#[derive(Debug, Clone, Copy)]
pub struct PositionData<'a> {
    pub position: Point3,
    pub index: usize,
    pub positions: &'a [Point3],
}

/// A finished shape: its outline, its fill (polygons only) and its vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedShape {
    kind: ShapeKind,
    outline: EntityId,
    fill: Option<EntityId>,
    vertices: Vec<DecoratedVertex>,
}

impl CompletedShape {
    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// The outline polyline entity.
    #[must_use]
    pub fn outline(&self) -> EntityId {
        self.outline
    }

    /// The polygon fill entity, `None` for polylines.
    #[must_use]
    pub fn fill(&self) -> Option<EntityId> {
        self.fill
    }

    #[must_use]
    pub fn vertices(&self) -> &[DecoratedVertex] {
        &self.vertices
    }

    /// The committed positions in click order.
    #[must_use]
    pub fn positions(&self) -> Vec<Point3> {
        self.vertices.iter().map(|v| v.position).collect()
    }

    /// The fill ring of a polygon, `None` for polylines.
    #[must_use]
    pub fn ring(&self) -> Option<PolygonHierarchy> {
        (self.kind == ShapeKind::Polygon).then(|| PolygonHierarchy::new(self.positions()))
    }

    /// A wall builder standing on this shape's vertices.
    ///
    /// Polygon walls are closed back to the first vertex.
    #[must_use]
    pub fn wall(&self) -> ContinuousWall {
        let mut positions = self.positions();
        if self.kind == ShapeKind::Polygon {
            if let Some(&first) = positions.first() {
                positions.push(first);
            }
        }
        ContinuousWall::new(positions)
    }

    /// Triangulates the fill of a polygon.
    ///
    /// # Errors
    ///
    /// Returns an error for polylines, or if the ring cannot be triangulated.
    pub fn fill_mesh(&self) -> Result<TriangleMesh> {
        if self.kind != ShapeKind::Polygon {
            return Err(TessellationError::InvalidParameters(
                "only polygons have a fill".to_owned(),
            )
            .into());
        }
        TessellatePolygon::new(self.positions()).execute()
    }

    /// Every entity belonging to the shape.
    pub(crate) fn entity_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        std::iter::once(self.outline)
            .chain(self.fill)
            .chain(self.vertices.iter().flat_map(|v| v.point.into_iter().chain(v.label)))
    }
}

/// Summary of a shape handed to the finish callback.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedShape {
    pub kind: ShapeKind,
    /// Index into [`Drawer::polylines`] or [`Drawer::polygons`] at the time
    /// the shape finished.
    pub index: usize,
    pub positions: Vec<Point3>,
}

/// What a pointer event did to the active session.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// Nothing changed: no session, an unregistered gesture, an unpickable
    /// position, nothing to undo, or too few vertices to finish.
    Ignored,
    Committed { index: usize },
    Previewed,
    Undone { index: usize, position: Point3 },
    Finished(FinishedShape),
}
