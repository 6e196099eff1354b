//! The render/scene host a drawer is bound to.

use slotmap::SlotMap;

use crate::entity::EntityCollection;
use crate::math::{Point2, Point3};

slotmap::new_key_type! {
    /// Unique identifier for a data source registered with a viewer.
    pub struct DataSourceId;
}

/// A discrete pointer gesture the drawer can listen to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    LeftClick,
    MouseMove,
    RightClick,
    MiddleClick,
}

/// A pointer event in window coordinates, forwarded by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    LeftClick { position: Point2 },
    MouseMove { start_position: Point2, end_position: Point2 },
    RightClick { position: Point2 },
    MiddleClick { position: Point2 },
}

impl PointerEvent {
    /// Returns the gesture this event belongs to.
    #[must_use]
    pub fn gesture(&self) -> Gesture {
        match self {
            Self::LeftClick { .. } => Gesture::LeftClick,
            Self::MouseMove { .. } => Gesture::MouseMove,
            Self::RightClick { .. } => Gesture::RightClick,
            Self::MiddleClick { .. } => Gesture::MiddleClick,
        }
    }
}

/// A named group of entities rendered by the viewer.
#[derive(Debug)]
pub struct DataSource {
    name: String,
    entities: EntityCollection,
}

impl DataSource {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn entities(&self) -> &EntityCollection {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut EntityCollection {
        &mut self.entities
    }
}

/// The data sources attached to a viewer.
#[derive(Debug, Default)]
pub struct DataSourceCollection {
    sources: SlotMap<DataSourceId, DataSource>,
}

impl DataSourceCollection {
    /// Creates a new, empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a new, empty data source.
    pub fn add(&mut self, name: &str) -> DataSourceId {
        self.sources.insert(DataSource {
            name: name.to_owned(),
            entities: EntityCollection::new(),
        })
    }

    /// Detaches a data source and its entities. Returns `true` if it was attached.
    pub fn remove(&mut self, id: DataSourceId) -> bool {
        self.sources.remove(id).is_some()
    }

    #[must_use]
    pub fn get(&self, id: DataSourceId) -> Option<&DataSource> {
        self.sources.get(id)
    }

    pub fn get_mut(&mut self, id: DataSourceId) -> Option<&mut DataSource> {
        self.sources.get_mut(id)
    }

    #[must_use]
    pub fn contains(&self, id: DataSourceId) -> bool {
        self.sources.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Iterates over all attached data sources.
    pub fn iter(&self) -> impl Iterator<Item = (DataSourceId, &DataSource)> {
        self.sources.iter()
    }
}

/// The scene host: picking, camera, data sources and input registration.
///
/// Input is push-based: the host forwards pointer events to
/// [`Drawer::handle_event`](crate::drawing::Drawer::handle_event).
/// [`listen`](Viewer::listen) and [`release`](Viewer::release) tell the host
/// which gestures are currently wanted so it can route or style them.
pub trait Viewer {
    /// Projects a window position onto the scene. `None` when nothing is
    /// under the cursor.
    fn pick_position(&self, window_position: Point2) -> Option<Point3>;

    /// Current camera position in world coordinates.
    fn camera_position(&self) -> Point3;

    fn data_sources(&self) -> &DataSourceCollection;

    fn data_sources_mut(&mut self) -> &mut DataSourceCollection;

    /// Registers interest in `gestures`, replacing any earlier registration.
    fn listen(&mut self, _gestures: &[Gesture]) {}

    /// Revokes every gesture registration at once.
    fn release(&mut self) {}
}

impl<T: Viewer + ?Sized> Viewer for &mut T {
    fn pick_position(&self, window_position: Point2) -> Option<Point3> {
        (**self).pick_position(window_position)
    }

    fn camera_position(&self) -> Point3 {
        (**self).camera_position()
    }

    fn data_sources(&self) -> &DataSourceCollection {
        (**self).data_sources()
    }

    fn data_sources_mut(&mut self) -> &mut DataSourceCollection {
        (**self).data_sources_mut()
    }

    fn listen(&mut self, gestures: &[Gesture]) {
        (**self).listen(gestures);
    }

    fn release(&mut self) {
        (**self).release();
    }
}
