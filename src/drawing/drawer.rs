use std::fmt;

use tracing::{debug, trace, warn};

use crate::entity::{EntityCollection, EntityId, EntitySink, PointStyle};
use crate::error::{HostError, Result, SessionError};
use crate::host::{DataSourceId, PointerEvent, Viewer};
use crate::math::{Point2, Point3};

use super::session::{label_entity, point_entity};
use super::{
    CompletedShape, DrawOptions, DrawingSession, EventOutcome, FinishedShape, LabelOptions,
    PositionData, ShapeKind,
};

/// Name of the data source a drawer registers when none is given.
const DEFAULT_DATA_SOURCE_NAME: &str = "drawer";

/// Called once per finished shape, after it is recorded and the drawer has
/// stopped or reopened. The callback may start a new session.
pub type FinishCallback<V> = Box<dyn FnMut(&mut Drawer<V>, &FinishedShape)>;

/// Construction options for a [`Drawer`].
#[derive(Debug)]
pub struct DrawerOptions<V> {
    pub viewer: Option<V>,
    /// Name of the data source holding the drawer's entities.
    pub data_source_name: Option<String>,
}

impl<V> Default for DrawerOptions<V> {
    fn default() -> Self {
        Self {
            viewer: None,
            data_source_name: None,
        }
    }
}

impl<V> DrawerOptions<V> {
    #[must_use]
    pub fn new(viewer: V) -> Self {
        Self {
            viewer: Some(viewer),
            data_source_name: None,
        }
    }

    #[must_use]
    pub fn with_data_source_name(mut self, name: impl Into<String>) -> Self {
        self.data_source_name = Some(name.into());
        self
    }
}

/// Lifecycle state of a [`Drawer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawerState {
    Idle,
    Capturing(ShapeKind),
    Destroyed,
}

/// Session manager bound to one viewer and one data source.
///
/// At most one [`DrawingSession`] is active. Pointer events reach it
/// through [`handle_event`](Self::handle_event); finished shapes are kept in
/// [`polylines`](Self::polylines) and [`polygons`](Self::polygons).
pub struct Drawer<V: Viewer> {
    viewer: V,
    data_source: DataSourceId,
    data_source_name: String,
    session: Option<DrawingSession>,
    on_finish: Option<FinishCallback<V>>,
    // Bumped whenever a session begins, so a finish callback can tell whether
    // it started a new one.
    generation: u64,
    polylines: Vec<CompletedShape>,
    polygons: Vec<CompletedShape>,
    destroyed: bool,
}

impl<V: Viewer> Drawer<V> {
    /// Creates a drawer and registers its data source with the viewer.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::MissingViewer`] if no viewer is given.
    pub fn new(options: DrawerOptions<V>) -> Result<Self> {
        let Some(mut viewer) = options.viewer else {
            return Err(HostError::MissingViewer.into());
        };
        let data_source_name = options
            .data_source_name
            .unwrap_or_else(|| DEFAULT_DATA_SOURCE_NAME.to_owned());
        let data_source = viewer.data_sources_mut().add(&data_source_name);
        debug!(data_source = %data_source_name, "drawer created");
        Ok(Self {
            viewer,
            data_source,
            data_source_name,
            session: None,
            on_finish: None,
            generation: 0,
            polylines: Vec::new(),
            polygons: Vec::new(),
            destroyed: false,
        })
    }

    #[must_use]
    pub fn state(&self) -> DrawerState {
        if self.destroyed {
            return DrawerState::Destroyed;
        }
        match &self.session {
            Some(session) => DrawerState::Capturing(session.kind()),
            None => DrawerState::Idle,
        }
    }

    /// Finished polylines in completion order.
    #[must_use]
    pub fn polylines(&self) -> &[CompletedShape] {
        &self.polylines
    }

    /// Finished polygons in completion order.
    #[must_use]
    pub fn polygons(&self) -> &[CompletedShape] {
        &self.polygons
    }

    #[must_use]
    pub fn active_session(&self) -> Option<&DrawingSession> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn viewer(&self) -> &V {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut V {
        &mut self.viewer
    }

    /// Releases the viewer. Entities stay in the data source.
    #[must_use]
    pub fn into_viewer(self) -> V {
        self.viewer
    }

    /// The entities of the drawer's data source.
    ///
    /// # Errors
    ///
    /// Returns an error after teardown or if the data source was detached
    /// from the viewer.
    pub fn entities(&self) -> Result<&EntityCollection> {
        self.ensure_alive()?;
        self.viewer
            .data_sources()
            .get(self.data_source)
            .map(|source| source.entities())
            .ok_or_else(|| HostError::DataSourceDetached(self.data_source_name.clone()).into())
    }

    /// Adds a standalone point marker.
    ///
    /// # Errors
    ///
    /// Returns an error after teardown or if the data source was detached.
    pub fn create_point(&mut self, position: Point3, style: &PointStyle) -> Result<EntityId> {
        self.ensure_alive()?;
        let sink = entities_mut(&mut self.viewer, self.data_source, &self.data_source_name)?;
        Ok(sink.add(point_entity(position, style)))
    }

    /// Adds a standalone label, raised by `options.height` resolved against
    /// the current camera.
    ///
    /// # Errors
    ///
    /// Returns an error after teardown or if the data source was detached.
    pub fn create_label(&mut self, data: &PositionData<'_>, options: &LabelOptions) -> Result<EntityId> {
        self.ensure_alive()?;
        let height = options.height.resolve(&self.viewer.camera_position());
        let sink = entities_mut(&mut self.viewer, self.data_source, &self.data_source_name)?;
        Ok(sink.add(label_entity(data, options, height)))
    }

    /// Starts capturing a polyline, cancelling any active session.
    ///
    /// # Errors
    ///
    /// Returns an error after teardown or if the data source was detached.
    pub fn begin_polyline_drawing(&mut self, options: DrawOptions) -> Result<()> {
        self.begin(ShapeKind::Polyline, options, None)
    }

    /// Like [`begin_polyline_drawing`](Self::begin_polyline_drawing), calling
    /// `on_finish` for every finished polyline.
    ///
    /// # Errors
    ///
    /// Returns an error after teardown or if the data source was detached.
    pub fn begin_polyline_drawing_with(
        &mut self,
        options: DrawOptions,
        on_finish: impl FnMut(&mut Self, &FinishedShape) + 'static,
    ) -> Result<()> {
        self.begin(ShapeKind::Polyline, options, Some(Box::new(on_finish)))
    }

    /// Starts capturing a polygon, cancelling any active session.
    ///
    /// # Errors
    ///
    /// Returns an error after teardown or if the data source was detached.
    pub fn begin_polygon_drawing(&mut self, options: DrawOptions) -> Result<()> {
        self.begin(ShapeKind::Polygon, options, None)
    }

    /// Like [`begin_polygon_drawing`](Self::begin_polygon_drawing), calling
    /// `on_finish` for every finished polygon.
    ///
    /// # Errors
    ///
    /// Returns an error after teardown or if the data source was detached.
    pub fn begin_polygon_drawing_with(
        &mut self,
        options: DrawOptions,
        on_finish: impl FnMut(&mut Self, &FinishedShape) + 'static,
    ) -> Result<()> {
        self.begin(ShapeKind::Polygon, options, Some(Box::new(on_finish)))
    }

    /// Dispatches a pointer event to the active session.
    ///
    /// # Errors
    ///
    /// Returns an error after teardown or if the data source was detached.
    pub fn handle_event(&mut self, event: PointerEvent) -> Result<EventOutcome> {
        self.ensure_alive()?;
        let Some(session) = &self.session else {
            trace!(?event, "no active session");
            return Ok(EventOutcome::Ignored);
        };
        if !session.gestures().contains(&event.gesture()) {
            trace!(?event, "gesture not registered");
            return Ok(EventOutcome::Ignored);
        }
        match event {
            PointerEvent::LeftClick { position } => self.commit_at(position),
            PointerEvent::MouseMove { end_position, .. } => self.preview_at(end_position),
            PointerEvent::RightClick { .. } => self.undo(),
            PointerEvent::MiddleClick { .. } => self.finalize(),
        }
    }

    /// Stops the active session and removes its in-progress entities.
    /// Finished shapes are kept.
    ///
    /// # Errors
    ///
    /// Returns an error after teardown or if the data source was detached.
    pub fn cancel(&mut self) -> Result<()> {
        self.ensure_alive()?;
        self.cancel_session()
    }

    /// Cancels the active session and removes every entity in the data
    /// source, forgetting all finished shapes.
    ///
    /// # Errors
    ///
    /// Returns an error after teardown or if the data source was detached.
    pub fn clear_all(&mut self) -> Result<()> {
        self.ensure_alive()?;
        self.cancel_session()?;
        entities_mut(&mut self.viewer, self.data_source, &self.data_source_name)?.remove_all();
        self.polylines.clear();
        self.polygons.clear();
        debug!("all shapes cleared");
        Ok(())
    }

    /// Removes one finished shape and its entities. Later shapes of the same
    /// kind move down one index.
    ///
    /// Returns `false` if there is no shape at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error after teardown or if the data source was detached.
    pub fn remove_shape(&mut self, kind: ShapeKind, index: usize) -> Result<bool> {
        self.ensure_alive()?;
        let sink = entities_mut(&mut self.viewer, self.data_source, &self.data_source_name)?;
        let shapes = match kind {
            ShapeKind::Polyline => &mut self.polylines,
            ShapeKind::Polygon => &mut self.polygons,
        };
        if index >= shapes.len() {
            return Ok(false);
        }
        let shape = shapes.remove(index);
        for id in shape.entity_ids() {
            sink.remove(id);
        }
        debug!(?kind, index, "shape removed");
        Ok(true)
    }

    /// Cancels any session and shuts the drawer down. Unless `keep_entities`
    /// is set, every entity is removed and the data source is detached from
    /// the viewer.
    ///
    /// Every later fallible call returns [`SessionError::Destroyed`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Destroyed`] if the drawer was already torn
    /// down.
    pub fn teardown(&mut self, keep_entities: bool) -> Result<()> {
        self.ensure_alive()?;
        let session = self.session.take();
        self.on_finish = None;
        if session.is_some() {
            self.viewer.release();
        }
        if let Some(source) = self.viewer.data_sources_mut().get_mut(self.data_source) {
            let sink = source.entities_mut();
            if let Some(session) = session {
                session.cancel(sink);
            }
            if !keep_entities {
                sink.remove_all();
            }
        }
        if !keep_entities {
            self.viewer.data_sources_mut().remove(self.data_source);
        }
        self.polylines.clear();
        self.polygons.clear();
        self.destroyed = true;
        debug!(keep_entities, "drawer torn down");
        Ok(())
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.destroyed {
            Err(SessionError::Destroyed.into())
        } else {
            Ok(())
        }
    }

    fn begin(
        &mut self,
        kind: ShapeKind,
        options: DrawOptions,
        on_finish: Option<FinishCallback<V>>,
    ) -> Result<()> {
        self.ensure_alive()?;
        self.cancel_session()?;
        let sink = entities_mut(&mut self.viewer, self.data_source, &self.data_source_name)?;
        let session = DrawingSession::start(kind, options, sink);
        self.viewer.listen(&session.gestures());
        self.session = Some(session);
        self.on_finish = on_finish;
        self.generation += 1;
        Ok(())
    }

    fn cancel_session(&mut self) -> Result<()> {
        self.on_finish = None;
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        self.viewer.release();
        let sink = entities_mut(&mut self.viewer, self.data_source, &self.data_source_name)?;
        session.cancel(sink);
        Ok(())
    }

    fn commit_at(&mut self, window_position: Point2) -> Result<EventOutcome> {
        let Some(position) = self.viewer.pick_position(window_position) else {
            trace!(?window_position, "click did not hit the globe");
            return Ok(EventOutcome::Ignored);
        };
        let camera = self.viewer.camera_position();
        let sink = entities_mut(&mut self.viewer, self.data_source, &self.data_source_name)?;
        let Some(session) = self.session.as_mut() else {
            return Ok(EventOutcome::Ignored);
        };
        let label_height = session
            .options()
            .label
            .as_ref()
            .map_or(0.0, |label| label.height.resolve(&camera));
        let index = session.commit(position, label_height, sink);
        if session.should_finish() {
            if let EventOutcome::Finished(shape) = self.finalize()? {
                return Ok(EventOutcome::Finished(shape));
            }
        }
        Ok(EventOutcome::Committed { index })
    }

    fn preview_at(&mut self, window_position: Point2) -> Result<EventOutcome> {
        let Some(position) = self.viewer.pick_position(window_position) else {
            trace!(?window_position, "pointer is off the globe");
            return Ok(EventOutcome::Ignored);
        };
        let sink = entities_mut(&mut self.viewer, self.data_source, &self.data_source_name)?;
        let Some(session) = self.session.as_mut() else {
            return Ok(EventOutcome::Ignored);
        };
        session.preview_to(position, sink);
        Ok(EventOutcome::Previewed)
    }

    fn undo(&mut self) -> Result<EventOutcome> {
        let sink = entities_mut(&mut self.viewer, self.data_source, &self.data_source_name)?;
        let undone = self.session.as_mut().and_then(|session| session.undo(sink));
        Ok(match undone {
            Some((index, position)) => EventOutcome::Undone { index, position },
            None => EventOutcome::Ignored,
        })
    }

    fn finalize(&mut self) -> Result<EventOutcome> {
        let sink = entities_mut(&mut self.viewer, self.data_source, &self.data_source_name)?;
        let Some(mut session) = self.session.take() else {
            return Ok(EventOutcome::Ignored);
        };
        if !session.can_finish() {
            session.clear_preview(sink);
            warn!(
                kind = ?session.kind(),
                vertices = session.vertices().len(),
                "not enough vertices to finish, ignoring"
            );
            self.session = Some(session);
            return Ok(EventOutcome::Ignored);
        }

        let (shape, options) = session.finish(sink);
        let kind = shape.kind();
        let positions = shape.positions();
        let shapes = match kind {
            ShapeKind::Polyline => &mut self.polylines,
            ShapeKind::Polygon => &mut self.polygons,
        };
        shapes.push(shape);
        let finished = FinishedShape {
            kind,
            index: shapes.len() - 1,
            positions,
        };

        if options.stop_after_finish {
            self.viewer.release();
            debug!(?kind, "drawing stopped after finish");
        } else {
            let sink = entities_mut(&mut self.viewer, self.data_source, &self.data_source_name)?;
            self.session = Some(DrawingSession::start(kind, options, sink));
        }

        self.run_finish_callback(&finished);
        Ok(EventOutcome::Finished(finished))
    }

    fn run_finish_callback(&mut self, finished: &FinishedShape) {
        let Some(mut callback) = self.on_finish.take() else {
            return;
        };
        let generation = self.generation;
        callback(self, finished);
        // Keep the callback only while the reopened session it belongs to
        // is still running.
        if !self.destroyed && self.generation == generation && self.session.is_some() {
            self.on_finish = Some(callback);
        }
    }
}

impl<V: Viewer + fmt::Debug> fmt::Debug for Drawer<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Drawer")
            .field("viewer", &self.viewer)
            .field("data_source", &self.data_source_name)
            .field("state", &self.state())
            .field("polylines", &self.polylines.len())
            .field("polygons", &self.polygons.len())
            .finish_non_exhaustive()
    }
}

fn entities_mut<'a, V: Viewer>(
    viewer: &'a mut V,
    id: DataSourceId,
    name: &str,
) -> Result<&'a mut EntityCollection> {
    viewer
        .data_sources_mut()
        .get_mut(id)
        .map(|source| source.entities_mut())
        .ok_or_else(|| HostError::DataSourceDetached(name.to_owned()).into())
}
