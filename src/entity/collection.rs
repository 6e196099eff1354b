use slotmap::SlotMap;

use super::{Entity, EntityGeometry, EntityId, EntitySink, Sampling};

/// A change to an [`EntityCollection`], in the order it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionChange {
    Added(EntityId),
    Removed(EntityId),
    Updated(EntityId),
}

/// Arena of entities keyed by generational ids.
///
/// Every mutation is also appended to a change log so a renderer can sync
/// incrementally with [`EntityCollection::take_changes`].
#[derive(Debug, Default)]
pub struct EntityCollection {
    entities: SlotMap<EntityId, Entity>,
    changes: Vec<CollectionChange>,
}

impl EntityCollection {
    /// Creates a new, empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entity with the given id.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterates over all entities.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter()
    }

    /// Returns the changes recorded since the last [`take_changes`](Self::take_changes).
    #[must_use]
    pub fn changes(&self) -> &[CollectionChange] {
        &self.changes
    }

    /// Drains the change log.
    pub fn take_changes(&mut self) -> Vec<CollectionChange> {
        std::mem::take(&mut self.changes)
    }
}

impl EntitySink for EntityCollection {
    fn add(&mut self, entity: Entity) -> EntityId {
        let id = self.entities.insert(entity);
        self.changes.push(CollectionChange::Added(id));
        id
    }

    fn remove(&mut self, id: EntityId) -> bool {
        if self.entities.remove(id).is_some() {
            self.changes.push(CollectionChange::Removed(id));
            true
        } else {
            false
        }
    }

    fn remove_all(&mut self) {
        let ids: Vec<EntityId> = self.entities.keys().collect();
        self.entities.clear();
        self.changes
            .extend(ids.into_iter().map(CollectionChange::Removed));
    }

    fn update_geometry(&mut self, id: EntityId, geometry: EntityGeometry, sampling: Sampling) -> bool {
        let updated = self
            .entities
            .get_mut(id)
            .is_some_and(|entity| entity.set_geometry(geometry, sampling));
        if updated {
            self.changes.push(CollectionChange::Updated(id));
        }
        updated
    }
}
