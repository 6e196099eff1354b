use tracing::{debug, trace};

use crate::entity::{
    Entity, EntityGeometry, EntityId, EntitySink, Graphics, PointStyle, PolygonHierarchy, Sampling,
};
use crate::geometry::add_height;
use crate::host::Gesture;
use crate::math::Point3;

use super::{CompletedShape, DecoratedVertex, DrawOptions, LabelOptions, PositionData, ShapeKind};

/// One in-progress shape: committed vertices, an optional preview vertex
/// following the pointer, and the entities showing them.
///
/// The session only talks to an [`EntitySink`]; picking and gesture
/// routing belong to the [`Drawer`](super::Drawer).
#[derive(Debug)]
pub struct DrawingSession {
    kind: ShapeKind,
    options: DrawOptions,
    outline: EntityId,
    fill: Option<EntityId>,
    vertices: Vec<DecoratedVertex>,
    preview: Option<Point3>,
}

impl DrawingSession {
    /// Opens a session and creates its placeholder outline (and fill, for
    /// polygons).
    pub fn start<S: EntitySink + ?Sized>(kind: ShapeKind, options: DrawOptions, sink: &mut S) -> Self {
        let sampling = live_sampling(&options);
        let outline = sink.add(
            Entity::new(Graphics::Polyline {
                positions: Vec::new(),
                style: options.polyline.clone(),
            })
            .with_sampling(sampling),
        );
        let fill = (kind == ShapeKind::Polygon).then(|| {
            sink.add(
                Entity::new(Graphics::Polygon {
                    hierarchy: PolygonHierarchy::default(),
                    style: options.polygon.clone(),
                })
                .with_sampling(sampling),
            )
        });
        debug!(?kind, guidance = options.show_guidance, "drawing session started");
        Self {
            kind,
            options,
            outline,
            fill,
            vertices: Vec::new(),
            preview: None,
        }
    }

    /// The gestures this session reacts to.
    #[must_use]
    pub fn gestures(&self) -> Vec<Gesture> {
        let mut gestures = vec![Gesture::LeftClick, Gesture::RightClick, Gesture::MiddleClick];
        if self.options.show_guidance {
            gestures.push(Gesture::MouseMove);
        }
        gestures
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    #[must_use]
    pub fn options(&self) -> &DrawOptions {
        &self.options
    }

    /// The committed positions.
    #[must_use]
    pub fn positions(&self) -> Vec<Point3> {
        self.vertices.iter().map(|v| v.position).collect()
    }

    #[must_use]
    pub fn vertices(&self) -> &[DecoratedVertex] {
        &self.vertices
    }

    #[must_use]
    pub fn preview(&self) -> Option<Point3> {
        self.preview
    }

    /// The committed positions followed by the preview vertex, if any.
    #[must_use]
    pub fn live_positions(&self) -> Vec<Point3> {
        let mut positions = self.positions();
        positions.extend(self.preview);
        positions
    }

    /// Appends a vertex and its decorations. Returns the vertex index.
    ///
    /// `label_height` is the resolved label offset in metres.
    pub fn commit<S: EntitySink + ?Sized>(
        &mut self,
        position: Point3,
        label_height: f64,
        sink: &mut S,
    ) -> usize {
        let index = self.vertices.len();
        let point = self
            .options
            .point
            .as_ref()
            .map(|style| sink.add(point_entity(position, style)));
        let label = self.options.label.as_ref().map(|options| {
            let mut positions = self.positions();
            positions.push(position);
            let data = PositionData {
                position,
                index,
                positions: &positions,
            };
            sink.add(label_entity(&data, options, label_height))
        });
        self.vertices.push(DecoratedVertex {
            position,
            point,
            label,
        });
        self.preview = None;
        self.publish(sink);
        debug!(index, "vertex committed");
        index
    }

    /// Moves the preview vertex.
    pub fn preview_to<S: EntitySink + ?Sized>(&mut self, position: Point3, sink: &mut S) {
        self.preview = Some(position);
        self.publish(sink);
        trace!(?position, "preview moved");
    }

    /// Drops the preview vertex, if any.
    pub fn clear_preview<S: EntitySink + ?Sized>(&mut self, sink: &mut S) {
        if self.preview.take().is_some() {
            self.publish(sink);
        }
    }

    /// Removes the last committed vertex and its decorations.
    ///
    /// Returns the removed index and position, or `None` if nothing was
    /// committed.
    pub fn undo<S: EntitySink + ?Sized>(&mut self, sink: &mut S) -> Option<(usize, Point3)> {
        let vertex = self.vertices.pop()?;
        for id in vertex.point.into_iter().chain(vertex.label) {
            sink.remove(id);
        }
        self.publish(sink);
        let index = self.vertices.len();
        debug!(index, "vertex undone");
        Some((index, vertex.position))
    }

    /// Whether the completion predicate holds for the committed vertices.
    #[must_use]
    pub fn should_finish(&self) -> bool {
        self.options
            .finish_when
            .as_ref()
            .is_some_and(|predicate| predicate(&self.positions()))
    }

    /// Whether enough vertices are committed to finish.
    #[must_use]
    pub fn can_finish(&self) -> bool {
        self.vertices.len() >= self.kind.min_vertices()
    }

    /// Freezes the outline and fill on the committed vertices and closes the
    /// session. Callers check [`can_finish`](Self::can_finish) first.
    pub fn finish<S: EntitySink + ?Sized>(mut self, sink: &mut S) -> (CompletedShape, DrawOptions) {
        self.preview = None;
        let positions = self.positions();
        sink.update_geometry(
            self.outline,
            EntityGeometry::Positions(positions.clone()),
            Sampling::Constant,
        );
        if let Some(fill) = self.fill {
            sink.update_geometry(
                fill,
                EntityGeometry::Hierarchy(PolygonHierarchy::new(positions)),
                Sampling::Constant,
            );
        }
        debug!(kind = ?self.kind, vertices = self.vertices.len(), "drawing session finished");
        let shape = CompletedShape {
            kind: self.kind,
            outline: self.outline,
            fill: self.fill,
            vertices: self.vertices,
        };
        (shape, self.options)
    }

    /// Removes every entity the session created and records nothing.
    pub fn cancel<S: EntitySink + ?Sized>(self, sink: &mut S) {
        let decorations = self
            .vertices
            .iter()
            .flat_map(|v| v.point.into_iter().chain(v.label));
        for id in std::iter::once(self.outline)
            .chain(self.fill)
            .chain(decorations)
        {
            sink.remove(id);
        }
        debug!(kind = ?self.kind, vertices = self.vertices.len(), "drawing session cancelled");
    }

    fn publish<S: EntitySink + ?Sized>(&self, sink: &mut S) {
        let sampling = live_sampling(&self.options);
        let positions = self.live_positions();
        if let Some(fill) = self.fill {
            sink.update_geometry(
                fill,
                EntityGeometry::Hierarchy(PolygonHierarchy::new(positions.clone())),
                sampling,
            );
        }
        sink.update_geometry(self.outline, EntityGeometry::Positions(positions), sampling);
    }
}

fn live_sampling(options: &DrawOptions) -> Sampling {
    if options.show_guidance {
        Sampling::PerFrame
    } else {
        Sampling::Constant
    }
}

/// A point marker at `position`.
pub(super) fn point_entity(position: Point3, style: &PointStyle) -> Entity {
    Entity::new(Graphics::Point {
        position,
        style: style.clone(),
    })
}

/// A label for `data`, raised `height` metres above the vertex.
pub(super) fn label_entity(data: &PositionData<'_>, options: &LabelOptions, height: f64) -> Entity {
    let position = if height == 0.0 {
        data.position
    } else {
        add_height(&data.position, height)
    };
    Entity::new(Graphics::Label {
        position,
        text: options.text.resolve(&data.position, data.index, data.positions),
        style: options.style.clone(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entity::{CollectionChange, EntityCollection};
    use crate::math::Cartographic;
    use crate::testing::{ground, init_tracing};
    use approx::assert_abs_diff_eq;

    fn positions_of(collection: &EntityCollection, id: EntityId) -> Vec<Point3> {
        match &collection.get(id).unwrap().graphics {
            Graphics::Polyline { positions, .. } => positions.clone(),
            Graphics::Polygon { hierarchy, .. } => hierarchy.positions.clone(),
            other => panic!("unexpected graphics {other:?}"),
        }
    }

    #[test]
    fn start_creates_live_placeholders() {
        init_tracing();
        let mut entities = EntityCollection::new();
        let session = DrawingSession::start(ShapeKind::Polygon, DrawOptions::default(), &mut entities);
        assert_eq!(entities.len(), 2);
        assert!(session.fill.is_some());
        assert!(entities.iter().all(|(_, e)| e.sampling == Sampling::PerFrame));
        assert!(session.gestures().contains(&Gesture::MouseMove));

        let mut entities = EntityCollection::new();
        let session = DrawingSession::start(
            ShapeKind::Polyline,
            DrawOptions::default().with_guidance(false),
            &mut entities,
        );
        assert_eq!(entities.len(), 1);
        assert!(session.fill.is_none());
        assert!(entities.iter().all(|(_, e)| e.sampling == Sampling::Constant));
        assert_eq!(session.gestures().len(), 3);
    }

    #[test]
    fn commit_then_undo_removes_decorations() {
        init_tracing();
        let mut entities = EntityCollection::new();
        let mut session =
            DrawingSession::start(ShapeKind::Polyline, DrawOptions::default(), &mut entities);
        let (a, b) = (ground(1.0, 1.0), ground(2.0, 1.0));
        assert_eq!(session.commit(a, 0.0, &mut entities), 0);
        assert_eq!(session.commit(b, 0.0, &mut entities), 1);
        let b_point = session.vertices()[1].point.unwrap();
        let b_label = session.vertices()[1].label.unwrap();
        entities.take_changes();

        assert_eq!(session.undo(&mut entities), Some((1, b)));
        assert_eq!(session.positions(), vec![a]);
        assert!(!entities.contains(b_point));
        assert!(!entities.contains(b_label));
        assert!(entities.changes().contains(&CollectionChange::Removed(b_point)));
        assert_eq!(positions_of(&entities, session.outline), vec![a]);
    }

    #[test]
    fn undo_on_empty_session_is_noop() {
        let mut entities = EntityCollection::new();
        let mut session =
            DrawingSession::start(ShapeKind::Polyline, DrawOptions::default(), &mut entities);
        entities.take_changes();
        assert_eq!(session.undo(&mut entities), None);
        assert!(entities.changes().is_empty());
    }

    #[test]
    fn preview_follows_pointer_and_clears_on_commit() {
        let mut entities = EntityCollection::new();
        let mut session =
            DrawingSession::start(ShapeKind::Polygon, DrawOptions::default(), &mut entities);
        let (a, p, q) = (ground(1.0, 1.0), ground(3.0, 3.0), ground(4.0, 4.0));
        session.commit(a, 0.0, &mut entities);
        session.preview_to(p, &mut entities);
        session.preview_to(q, &mut entities);
        assert_eq!(session.live_positions(), vec![a, q]);
        assert_eq!(positions_of(&entities, session.outline), vec![a, q]);
        assert_eq!(positions_of(&entities, session.fill.unwrap()), vec![a, q]);

        session.commit(p, 0.0, &mut entities);
        assert_eq!(session.preview(), None);
        assert_eq!(session.live_positions(), vec![a, p]);
    }

    #[test]
    fn label_is_raised_and_numbered() {
        let mut entities = EntityCollection::new();
        let mut session = DrawingSession::start(
            ShapeKind::Polyline,
            DrawOptions::default().without_points(),
            &mut entities,
        );
        session.commit(ground(1.0, 1.0), 0.0, &mut entities);
        session.commit(ground(2.0, 1.0), 500.0, &mut entities);
        let vertex = session.vertices()[1];
        assert!(vertex.point.is_none());
        let Graphics::Label { position, text, .. } = &entities.get(vertex.label.unwrap()).unwrap().graphics
        else {
            panic!("expected a label");
        };
        assert!(text.starts_with("Point 2\n"));
        let height = Cartographic::from_cartesian(position).unwrap().height;
        assert_abs_diff_eq!(height, 500.0, epsilon = 1e-6);

        let Graphics::Label { position, .. } =
            &entities.get(session.vertices()[0].label.unwrap()).unwrap().graphics
        else {
            panic!("expected a label");
        };
        assert_eq!(*position, ground(1.0, 1.0));
    }

    #[test]
    fn finish_freezes_geometry() {
        let mut entities = EntityCollection::new();
        let mut session =
            DrawingSession::start(ShapeKind::Polygon, DrawOptions::default(), &mut entities);
        let ring = [ground(1.0, 1.0), ground(2.0, 1.0), ground(2.0, 2.0)];
        for p in ring {
            session.commit(p, 0.0, &mut entities);
        }
        session.preview_to(ground(5.0, 5.0), &mut entities);
        assert!(session.can_finish());

        let (shape, options) = session.finish(&mut entities);
        assert!(options.show_guidance);
        assert_eq!(shape.positions(), ring.to_vec());
        assert_eq!(positions_of(&entities, shape.outline()), ring.to_vec());
        let fill = shape.fill().unwrap();
        assert_eq!(positions_of(&entities, fill), ring.to_vec());
        assert_eq!(entities.get(fill).unwrap().sampling, Sampling::Constant);
        assert_eq!(entities.get(shape.outline()).unwrap().sampling, Sampling::Constant);
        assert_eq!(shape.entity_ids().count(), 2 + 2 * ring.len());
    }

    #[test]
    fn minimum_vertex_counts() {
        let mut entities = EntityCollection::new();
        let mut session =
            DrawingSession::start(ShapeKind::Polygon, DrawOptions::default(), &mut entities);
        session.commit(ground(1.0, 1.0), 0.0, &mut entities);
        session.commit(ground(2.0, 1.0), 0.0, &mut entities);
        assert!(!session.can_finish());
        session.commit(ground(2.0, 2.0), 0.0, &mut entities);
        assert!(session.can_finish());
    }

    #[test]
    fn predicate_sees_committed_vertices() {
        let mut entities = EntityCollection::new();
        let options = DrawOptions::default().with_finish_when(|positions| positions.len() == 2);
        let mut session = DrawingSession::start(ShapeKind::Polyline, options, &mut entities);
        session.commit(ground(1.0, 1.0), 0.0, &mut entities);
        session.preview_to(ground(2.0, 2.0), &mut entities);
        assert!(!session.should_finish());
        session.commit(ground(3.0, 1.0), 0.0, &mut entities);
        assert!(session.should_finish());
    }

    #[test]
    fn cancel_removes_everything() {
        let mut entities = EntityCollection::new();
        let mut session =
            DrawingSession::start(ShapeKind::Polygon, DrawOptions::default(), &mut entities);
        session.commit(ground(1.0, 1.0), 0.0, &mut entities);
        session.commit(ground(2.0, 1.0), 0.0, &mut entities);
        assert_eq!(entities.len(), 6);
        session.cancel(&mut entities);
        assert!(entities.is_empty());
    }
}
