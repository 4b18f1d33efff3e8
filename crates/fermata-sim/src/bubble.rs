use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use fermata_core::{BubbleId, BubbleVolume, EntityId, PlayerId, Vec3};

use crate::event::{EventLog, TimeEventKind};

/// The local time mode a bubble imposes on its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BubbleMode {
    /// Members run at the bubble's local scale instead of the global one.
    Scale,
    /// Members are paused while the rest of the world runs.
    Pause,
    /// Members are fully frozen, independent of global speed or pause.
    Stasis,
    /// Members are locally rewound by the bubble's tick offset.
    Rewind,
}

/// A spatial volume imposing a local time mode on the entities inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBubble {
    /// Identifier, assigned by the manager on spawn.
    pub id: BubbleId,
    /// The local mode imposed on members.
    pub mode: BubbleMode,
    /// Local scale for `Scale` bubbles; ignored by other modes.
    pub scale: f64,
    /// Overlapping bubbles are resolved by priority, ties by lowest id.
    pub priority: i32,
    /// The player that spawned the bubble.
    pub owner: PlayerId,
    /// Restrict membership to entities owned by `owner`.
    pub affects_owned_only: bool,
    /// Inactive bubbles capture no members and release locked ones.
    pub active: bool,
    /// Membership is re-evaluated each tick when true. Stasis and Rewind
    /// bubbles lock membership so a member cannot straddle inconsistent
    /// partial-rewind states by drifting out of the volume.
    pub allow_membership_changes: bool,
    /// How far back `Rewind` bubbles shift their members, in ticks.
    pub rewind_offset_ticks: u64,
    /// The containment volume.
    pub volume: BubbleVolume,
}

impl TimeBubble {
    fn with_mode(volume: BubbleVolume, mode: BubbleMode, allow_changes: bool) -> Self {
        Self {
            id: BubbleId::NONE,
            mode,
            scale: 1.0,
            priority: 0,
            owner: PlayerId::SINGLE_PLAYER,
            affects_owned_only: false,
            active: true,
            allow_membership_changes: allow_changes,
            rewind_offset_ticks: 0,
            volume,
        }
    }

    /// A bubble scaling its members' local time by `scale`.
    pub fn scaling(volume: BubbleVolume, scale: f64) -> Self {
        Self {
            scale,
            ..Self::with_mode(volume, BubbleMode::Scale, true)
        }
    }

    /// A bubble pausing its members.
    pub fn pausing(volume: BubbleVolume) -> Self {
        Self::with_mode(volume, BubbleMode::Pause, true)
    }

    /// A stasis bubble: members fully frozen, membership locked.
    pub fn stasis(volume: BubbleVolume) -> Self {
        Self::with_mode(volume, BubbleMode::Stasis, false)
    }

    /// A local-rewind bubble: members shifted back by `offset_ticks`,
    /// membership locked.
    pub fn rewinding(volume: BubbleVolume, offset_ticks: u64) -> Self {
        Self {
            rewind_offset_ticks: offset_ticks,
            ..Self::with_mode(volume, BubbleMode::Rewind, false)
        }
    }

    /// Set the resolution priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Restrict the bubble to entities owned by `owner`.
    pub fn owned_by(mut self, owner: PlayerId) -> Self {
        self.owner = owner;
        self.affects_owned_only = true;
        self
    }
}

/// An entity's resolved bubble membership for the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BubbleMembership {
    /// The bubble the entity belongs to.
    pub bubble: BubbleId,
    /// The local mode in force for the entity.
    pub mode: BubbleMode,
    /// The local scale in force for `Scale` mode.
    pub scale: f64,
}

/// Per-entity input to membership resolution: position and owning player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityRecord {
    /// The entity under time control.
    pub entity: EntityId,
    /// Its position this tick.
    pub position: Vec3,
    /// The player partition it belongs to.
    pub owner: PlayerId,
}

impl EntityRecord {
    /// A record owned by the single-player sentinel.
    pub fn at(entity: EntityId, position: Vec3) -> Self {
        Self {
            entity,
            position,
            owner: PlayerId::SINGLE_PLAYER,
        }
    }
}

/// Tracks active bubbles and resolves per-entity membership each tick.
///
/// Resolution is a pure per-entity function of the read-only bubble catalog:
/// each entity reads the shared list and writes only its own membership
/// record, so a parallel-for over entities needs no cross-entity
/// synchronization. The sequential loop here keeps the same structure.
#[derive(Debug, Default)]
pub struct TimeBubbleManager {
    bubbles: BTreeMap<BubbleId, TimeBubble>,
    memberships: HashMap<EntityId, BubbleMembership>,
    next_id: u64,
}

impl TimeBubbleManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self {
            bubbles: BTreeMap::new(),
            memberships: HashMap::new(),
            next_id: 1,
        }
    }

    /// Spawn a bubble, assigning its id. Returns the id.
    pub fn spawn(&mut self, mut bubble: TimeBubble, tick: u64, events: &mut EventLog) -> BubbleId {
        let id = BubbleId(self.next_id);
        self.next_id += 1;
        bubble.id = id;
        self.bubbles.insert(id, bubble);
        events.push_at(
            tick,
            TimeEventKind::BubbleCreated { bubble: id },
            format!("{id} created"),
        );
        id
    }

    /// Destroy a bubble, releasing all of its members (locked ones included).
    pub fn despawn(&mut self, id: BubbleId, tick: u64, events: &mut EventLog) -> bool {
        if self.bubbles.remove(&id).is_none() {
            return false;
        }
        let released: Vec<EntityId> = self
            .memberships
            .iter()
            .filter(|(_, m)| m.bubble == id)
            .map(|(e, _)| *e)
            .collect();
        for entity in released {
            self.memberships.remove(&entity);
            events.push_at(
                tick,
                TimeEventKind::LeftBubble { entity, bubble: id },
                format!("{entity} released from {id}"),
            );
        }
        events.push_at(
            tick,
            TimeEventKind::BubbleDestroyed { bubble: id },
            format!("{id} destroyed"),
        );
        true
    }

    /// Activate or deactivate a bubble. Deactivation ends locked memberships
    /// at the next resolution pass.
    pub fn set_active(&mut self, id: BubbleId, active: bool) -> bool {
        match self.bubbles.get_mut(&id) {
            Some(bubble) => {
                bubble.active = active;
                true
            }
            None => false,
        }
    }

    /// Look up a bubble.
    pub fn bubble(&self, id: BubbleId) -> Option<&TimeBubble> {
        self.bubbles.get(&id)
    }

    /// All bubbles in ascending id order.
    pub fn bubbles(&self) -> impl Iterator<Item = &TimeBubble> {
        self.bubbles.values()
    }

    /// Number of spawned bubbles.
    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    /// True if no bubbles are spawned.
    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    /// The entity's membership, if it belongs to a bubble.
    pub fn membership_of(&self, entity: EntityId) -> Option<&BubbleMembership> {
        self.memberships.get(&entity)
    }

    /// Current members of a bubble.
    pub fn members_of(&self, id: BubbleId) -> usize {
        self.memberships.values().filter(|m| m.bubble == id).count()
    }

    /// Drop every membership record. Used when bubbles are feature-gated off.
    pub fn clear_memberships(&mut self) {
        self.memberships.clear();
    }

    /// Drop one entity's membership, locked or not. For entities leaving the
    /// simulation, so a despawned entity's record cannot go stale in a
    /// locked-membership bubble. Returns false if the entity had none.
    pub fn forget(&mut self, entity: EntityId, tick: u64, events: &mut EventLog) -> bool {
        match self.memberships.remove(&entity) {
            Some(membership) => {
                events.push_at(
                    tick,
                    TimeEventKind::LeftBubble {
                        entity,
                        bubble: membership.bubble,
                    },
                    format!("{entity} released from {}", membership.bubble),
                );
                true
            }
            None => false,
        }
    }

    /// Recompute membership for every tracked entity.
    ///
    /// An entity already held by an active locked-membership bubble keeps
    /// that membership even if its position has left the volume. Everyone
    /// else is assigned the highest-priority containing bubble, ties broken
    /// by lowest bubble id.
    pub fn resolve(&mut self, tick: u64, entities: &[EntityRecord], events: &mut EventLog) {
        for record in entities {
            if let Some(current) = self.memberships.get(&record.entity)
                && self
                    .bubbles
                    .get(&current.bubble)
                    .is_some_and(|b| b.active && !b.allow_membership_changes)
            {
                continue;
            }

            let best = self
                .bubbles
                .values()
                .filter(|b| b.active)
                .filter(|b| !b.affects_owned_only || b.owner == record.owner)
                .filter(|b| b.volume.contains(record.position))
                .fold(None::<&TimeBubble>, |best, candidate| match best {
                    None => Some(candidate),
                    // BTreeMap iterates in ascending id order, so on a
                    // priority tie the earlier (lower-id) bubble stands.
                    Some(current) if candidate.priority > current.priority => Some(candidate),
                    Some(current) => Some(current),
                });

            let previous = self.memberships.get(&record.entity).map(|m| m.bubble);
            match best {
                Some(bubble) => {
                    if previous != Some(bubble.id) {
                        if let Some(old) = previous {
                            events.push_at(
                                tick,
                                TimeEventKind::LeftBubble {
                                    entity: record.entity,
                                    bubble: old,
                                },
                                format!("{} left {old}", record.entity),
                            );
                        }
                        events.push_at(
                            tick,
                            TimeEventKind::EnteredBubble {
                                entity: record.entity,
                                bubble: bubble.id,
                            },
                            format!("{} entered {}", record.entity, bubble.id),
                        );
                    }
                    self.memberships.insert(
                        record.entity,
                        BubbleMembership {
                            bubble: bubble.id,
                            mode: bubble.mode,
                            scale: bubble.scale,
                        },
                    );
                }
                None => {
                    if let Some(old) = previous {
                        events.push_at(
                            tick,
                            TimeEventKind::LeftBubble {
                                entity: record.entity,
                                bubble: old,
                            },
                            format!("{} left {old}", record.entity),
                        );
                        self.memberships.remove(&record.entity);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere(radius: f64) -> BubbleVolume {
        BubbleVolume::sphere(Vec3::ZERO, radius)
    }

    fn resolve_one(
        manager: &mut TimeBubbleManager,
        entity: EntityId,
        position: Vec3,
    ) -> Option<BubbleMembership> {
        let mut events = EventLog::new(0);
        manager.resolve(0, &[EntityRecord::at(entity, position)], &mut events);
        manager.membership_of(entity).copied()
    }

    #[test]
    fn stasis_and_rewind_lock_membership_scale_does_not() {
        assert!(!TimeBubble::stasis(sphere(5.0)).allow_membership_changes);
        assert!(!TimeBubble::rewinding(sphere(5.0), 60).allow_membership_changes);
        assert!(TimeBubble::scaling(sphere(5.0), 0.5).allow_membership_changes);
        assert!(TimeBubble::pausing(sphere(5.0)).allow_membership_changes);
    }

    #[test]
    fn member_assigned_inside_volume() {
        let mut manager = TimeBubbleManager::new();
        let mut events = EventLog::new(0);
        let id = manager.spawn(TimeBubble::scaling(sphere(10.0), 0.5), 0, &mut events);
        let m = resolve_one(&mut manager, EntityId(1), Vec3::new(5.0, 0.0, 0.0)).unwrap();
        assert_eq!(m.bubble, id);
        assert_eq!(m.mode, BubbleMode::Scale);
        assert!((m.scale - 0.5).abs() < f64::EPSILON);
        assert!(resolve_one(&mut manager, EntityId(2), Vec3::new(50.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn highest_priority_bubble_wins_ties_by_lowest_id() {
        let mut manager = TimeBubbleManager::new();
        let mut events = EventLog::new(0);
        let low = manager.spawn(
            TimeBubble::scaling(sphere(10.0), 0.5).with_priority(1),
            0,
            &mut events,
        );
        let high = manager.spawn(
            TimeBubble::scaling(sphere(10.0), 2.0).with_priority(5),
            0,
            &mut events,
        );
        let tied = manager.spawn(
            TimeBubble::scaling(sphere(10.0), 4.0).with_priority(5),
            0,
            &mut events,
        );
        assert!(low < high && high < tied);
        let m = resolve_one(&mut manager, EntityId(1), Vec3::ZERO).unwrap();
        // high and tied share priority 5; the lower id wins.
        assert_eq!(m.bubble, high);
    }

    #[test]
    fn locked_membership_sticks_after_leaving_volume() {
        let mut manager = TimeBubbleManager::new();
        let mut events = EventLog::new(0);
        let id = manager.spawn(TimeBubble::stasis(sphere(10.0)), 0, &mut events);

        let joined = resolve_one(&mut manager, EntityId(1), Vec3::ZERO).unwrap();
        assert_eq!(joined.bubble, id);

        // Entity drifts far outside; membership must not be recomputed.
        let still = resolve_one(&mut manager, EntityId(1), Vec3::new(1000.0, 0.0, 0.0)).unwrap();
        assert_eq!(still.bubble, id);
    }

    #[test]
    fn locked_membership_released_on_despawn() {
        let mut manager = TimeBubbleManager::new();
        let mut events = EventLog::new(0);
        let id = manager.spawn(TimeBubble::stasis(sphere(10.0)), 0, &mut events);
        resolve_one(&mut manager, EntityId(1), Vec3::ZERO);

        assert!(manager.despawn(id, 1, &mut events));
        assert!(manager.membership_of(EntityId(1)).is_none());
        assert!(events.iter().any(|e| matches!(
            e.kind,
            TimeEventKind::LeftBubble { entity: EntityId(1), .. }
        )));
    }

    #[test]
    fn forgetting_an_entity_releases_a_locked_membership() {
        let mut manager = TimeBubbleManager::new();
        let mut events = EventLog::new(0);
        let id = manager.spawn(TimeBubble::stasis(sphere(10.0)), 0, &mut events);
        resolve_one(&mut manager, EntityId(1), Vec3::ZERO);
        assert_eq!(manager.members_of(id), 1);

        assert!(manager.forget(EntityId(1), 1, &mut events));
        assert!(manager.membership_of(EntityId(1)).is_none());
        assert_eq!(manager.members_of(id), 0);
        assert!(events.iter().any(|e| matches!(
            e.kind,
            TimeEventKind::LeftBubble { entity: EntityId(1), bubble } if bubble == id
        )));

        // Nothing left to forget.
        assert!(!manager.forget(EntityId(1), 2, &mut events));
    }

    #[test]
    fn deactivated_bubble_releases_locked_members() {
        let mut manager = TimeBubbleManager::new();
        let mut events = EventLog::new(0);
        let id = manager.spawn(TimeBubble::stasis(sphere(10.0)), 0, &mut events);
        resolve_one(&mut manager, EntityId(1), Vec3::ZERO);

        manager.set_active(id, false);
        assert!(resolve_one(&mut manager, EntityId(1), Vec3::ZERO).is_none());
    }

    #[test]
    fn owned_only_bubble_skips_other_players() {
        let mut manager = TimeBubbleManager::new();
        let mut events = EventLog::new(0);
        manager.spawn(
            TimeBubble::scaling(sphere(10.0), 0.5).owned_by(PlayerId(1)),
            0,
            &mut events,
        );

        let mine = EntityRecord {
            entity: EntityId(1),
            position: Vec3::ZERO,
            owner: PlayerId(1),
        };
        let theirs = EntityRecord {
            entity: EntityId(2),
            position: Vec3::ZERO,
            owner: PlayerId(2),
        };
        manager.resolve(0, &[mine, theirs], &mut events);
        assert!(manager.membership_of(EntityId(1)).is_some());
        assert!(manager.membership_of(EntityId(2)).is_none());
    }

    #[test]
    fn leaving_an_unlocked_bubble_clears_membership() {
        let mut manager = TimeBubbleManager::new();
        let mut events = EventLog::new(0);
        let id = manager.spawn(TimeBubble::scaling(sphere(10.0), 0.5), 0, &mut events);
        resolve_one(&mut manager, EntityId(1), Vec3::ZERO);
        assert_eq!(manager.members_of(id), 1);

        assert!(resolve_one(&mut manager, EntityId(1), Vec3::new(100.0, 0.0, 0.0)).is_none());
        assert_eq!(manager.members_of(id), 0);
    }
}
