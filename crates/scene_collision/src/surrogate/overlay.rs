//! Live surrogates and the side-pocket journal

use std::collections::BTreeMap;

use crate::scene::EntityId;
use crate::wrapper::WrapperView;
use super::SurrogateWrapper;

/// Undo log for trial edits of surrogates.
///
/// The first `begin` for an entity snapshots its surrogate (or its lack of
/// one); later calls keep that first snapshot. `rollback` hands the
/// snapshot back, `commit` forgets it. At most one snapshot per entity.
#[derive(Debug, Default, Clone)]
pub struct SurrogateJournal {
    snapshots: BTreeMap<EntityId, Option<SurrogateWrapper>>,
}

impl SurrogateJournal {
    /// Create an empty journal
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot `current` unless the entity already has a snapshot.
    /// Returns whether a snapshot was taken.
    pub fn begin(&mut self, id: EntityId, current: Option<&SurrogateWrapper>) -> bool {
        if self.snapshots.contains_key(&id) {
            return false;
        }
        self.snapshots.insert(id, current.cloned());
        true
    }

    /// Take the snapshot back out. The outer `None` means no trial was
    /// open; the inner one means the entity had no surrogate at `begin`.
    pub fn rollback(&mut self, id: EntityId) -> Option<Option<SurrogateWrapper>> {
        self.snapshots.remove(&id)
    }

    /// Keep the trial state and drop the snapshot
    pub fn commit(&mut self, id: EntityId) -> bool {
        self.snapshots.remove(&id).is_some()
    }

    /// Whether a trial is open for the entity
    pub fn is_open(&self, id: EntityId) -> bool {
        self.snapshots.contains_key(&id)
    }

    /// Entities with an open trial
    pub fn open_entities(&self) -> Vec<EntityId> {
        self.snapshots.keys().copied().collect()
    }

    /// Number of open trials
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether no trial is open
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Live surrogates by entity, at most one each, plus their journal
#[derive(Debug, Default, Clone)]
pub struct SurrogateOverlay {
    live: BTreeMap<EntityId, SurrogateWrapper>,
    journal: SurrogateJournal,
}

impl SurrogateOverlay {
    /// Create an empty overlay
    pub fn new() -> Self {
        Self::default()
    }

    /// Live surrogate of an entity
    pub fn get(&self, id: EntityId) -> Option<&SurrogateWrapper> {
        self.live.get(&id)
    }

    /// Mutable live surrogate of an entity
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut SurrogateWrapper> {
        self.live.get_mut(&id)
    }

    /// Store a surrogate, superseding any previous one for the entity
    pub fn insert(&mut self, surrogate: SurrogateWrapper) -> Option<SurrogateWrapper> {
        self.live.insert(surrogate.entity_id(), surrogate)
    }

    /// Drop the surrogate of an entity after its edit was committed or
    /// cancelled. An open trial for the entity is discarded with it.
    pub fn remove(&mut self, id: EntityId) -> Option<SurrogateWrapper> {
        self.journal.commit(id);
        self.live.remove(&id)
    }

    /// Live surrogates in id order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &SurrogateWrapper)> {
        self.live.iter().map(|(id, surrogate)| (*id, surrogate))
    }

    /// Number of live surrogates
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether no surrogate is live
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// The side-pocket journal
    pub fn journal(&self) -> &SurrogateJournal {
        &self.journal
    }

    /// Side-pocket the current surrogate of `id` before a trial edit
    pub fn begin_trial(&mut self, id: EntityId) -> bool {
        self.journal.begin(id, self.live.get(&id))
    }

    /// Restore the side-pocketed state of `id`. Returns `false` when no
    /// trial was open.
    pub fn rollback_trial(&mut self, id: EntityId) -> bool {
        match self.journal.rollback(id) {
            Some(Some(snapshot)) => {
                self.live.insert(id, snapshot);
                true
            }
            Some(None) => {
                self.live.remove(&id);
                true
            }
            None => false,
        }
    }

    /// Keep the trial state of `id`
    pub fn commit_trial(&mut self, id: EntityId) -> bool {
        self.journal.commit(id)
    }

    /// Restore every open trial, then drop every surrogate.
    /// Returns how many trials were rolled back.
    pub fn clear(&mut self) -> usize {
        let open = self.journal.open_entities();
        for id in &open {
            self.rollback_trial(*id);
        }
        self.live.clear();
        open.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::BoundingVolume;
    use crate::foundation::math::{Quat, Vec3};
    use crate::scene::EntityKind;

    fn surrogate(raw: u32, x: f32) -> SurrogateWrapper {
        SurrogateWrapper::new(
            EntityId::new(raw),
            EntityKind::Model,
            EntityId::new(0),
            Vec3::new(x, 0.0, 0.0),
            Quat::identity(),
            Vec3::new(1.0, 1.0, 1.0),
            BoundingVolume::from_size(Vec3::new(1.0, 1.0, 1.0)),
            BoundingVolume::from_size(Vec3::new(2.0, 2.0, 2.0)),
        )
    }

    #[test]
    fn test_snapshot_then_rollback_restores_exact_state() {
        let mut overlay = SurrogateOverlay::new();
        overlay.insert(surrogate(1, 2.0));
        let before = overlay.get(EntityId::new(1)).cloned();

        assert!(overlay.begin_trial(EntityId::new(1)));
        if let Some(live) = overlay.get_mut(EntityId::new(1)) {
            live.set_position(Vec3::new(9.0, 9.0, 9.0));
            live.set_scale(Vec3::new(3.0, 3.0, 3.0));
        }
        assert!(overlay.rollback_trial(EntityId::new(1)));

        assert_eq!(overlay.get(EntityId::new(1)).cloned(), before);
        assert!(overlay.journal().is_empty());
    }

    #[test]
    fn test_first_snapshot_wins() {
        let mut overlay = SurrogateOverlay::new();
        overlay.insert(surrogate(1, 2.0));
        assert!(overlay.begin_trial(EntityId::new(1)));
        overlay.insert(surrogate(1, 5.0));
        assert!(!overlay.begin_trial(EntityId::new(1)));
        assert_eq!(overlay.journal().len(), 1);

        overlay.rollback_trial(EntityId::new(1));
        assert_eq!(overlay.get(EntityId::new(1)), Some(&surrogate(1, 2.0)));
    }

    #[test]
    fn test_rollback_of_absent_surrogate_removes_trial_surrogate() {
        let mut overlay = SurrogateOverlay::new();
        assert!(overlay.begin_trial(EntityId::new(4)));
        overlay.insert(surrogate(4, 1.0));
        assert!(overlay.rollback_trial(EntityId::new(4)));
        assert!(overlay.get(EntityId::new(4)).is_none());
        assert!(!overlay.rollback_trial(EntityId::new(4)));
    }

    #[test]
    fn test_commit_keeps_trial_state() {
        let mut overlay = SurrogateOverlay::new();
        overlay.insert(surrogate(1, 2.0));
        overlay.begin_trial(EntityId::new(1));
        overlay.insert(surrogate(1, 7.0));
        assert!(overlay.commit_trial(EntityId::new(1)));
        assert!(!overlay.rollback_trial(EntityId::new(1)));
        assert_eq!(overlay.get(EntityId::new(1)), Some(&surrogate(1, 7.0)));
    }

    #[test]
    fn test_clear_restores_snapshots_first() {
        let mut overlay = SurrogateOverlay::new();
        overlay.insert(surrogate(1, 0.0));
        overlay.insert(surrogate(2, 0.0));
        overlay.begin_trial(EntityId::new(1));
        overlay.begin_trial(EntityId::new(3));

        assert_eq!(overlay.clear(), 2);
        assert!(overlay.is_empty());
        assert!(overlay.journal().is_empty());
    }
}
