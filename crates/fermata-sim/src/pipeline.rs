use rand::SeedableRng;
use rand::rngs::StdRng;

use fermata_core::{
    BubbleId, EntityId, EntryId, PlayerId, SessionMeta, TimeFeatures, deterministic_seed,
};

use crate::bubble::{BubbleMembership, BubbleMode, EntityRecord, TimeBubble, TimeBubbleManager};
use crate::clock::TickClock;
use crate::command::{CommandProcessor, Scope, TimeCommand};
use crate::config::TimeConfig;
use crate::error::{TimeError, TimeResult};
use crate::event::{EventLog, TimeEventKind};
use crate::history::InputHistory;
use crate::rewind::{RewindEngine, RewindState, TimeMode};
use crate::scale::{ScaleEntrySpec, TimeScaleResolver};
use crate::snapshot::{SnapshotRing, SnapshotSource};

/// The top-level time-control system.
///
/// Owns the clock, feature gate, command queue, scale resolver, bubble
/// manager, snapshot ring, input history, rewind engine, and event log, and
/// drives them in a fixed order each tick so no stage reads state another
/// stage is still writing:
///
/// 1. commands are drained and validated against the feature gate,
/// 2. the effective global scale is recomputed,
/// 3. the clock advances (or holds, outside Record),
/// 4. bubble membership is resolved,
/// 5. a snapshot is captured if due,
/// 6. the rewind engine evaluates transitions, which may restore a snapshot
///    for the next tick.
///
/// Downstream consumers read time exclusively through [`Self::effective_delta`],
/// [`Self::should_update`], and [`Self::is_in_stasis`] — no gameplay system
/// reimplements time-scaling arithmetic.
pub struct TimeSystem {
    meta: SessionMeta,
    config: TimeConfig,
    features: TimeFeatures,
    clock: TickClock,
    processor: CommandProcessor,
    resolver: TimeScaleResolver,
    bubbles: TimeBubbleManager,
    ring: SnapshotRing,
    history: InputHistory,
    rewind: RewindEngine,
    events: EventLog,
    last_snapshot_tick: Option<u64>,
}

impl std::fmt::Debug for TimeSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeSystem")
            .field("tick", &self.clock.tick())
            .field("mode", &self.rewind.mode())
            .field("bubbles", &self.bubbles.len())
            .field("snapshots", &self.ring.valid_count())
            .finish()
    }
}

impl TimeSystem {
    /// Create a time system for a fresh session.
    pub fn new(meta: SessionMeta, config: TimeConfig, features: TimeFeatures) -> Self {
        let clock = TickClock::new(&config);
        let resolver = TimeScaleResolver::new(&config);
        let ring = SnapshotRing::new(config.snapshot_capacity);
        let history = InputHistory::new(config.rewind_window_ticks);
        let rewind = RewindEngine::new(&config);
        let events = EventLog::new(config.max_events);
        Self {
            meta,
            config,
            features,
            clock,
            processor: CommandProcessor::new(),
            resolver,
            bubbles: TimeBubbleManager::new(),
            ring,
            history,
            rewind,
            events,
            last_snapshot_tick: None,
        }
    }

    /// Convenience constructor with default config and single-player features.
    pub fn single_player(name: impl Into<String>, seed: u64) -> Self {
        Self::new(
            SessionMeta::new(name, seed),
            TimeConfig::default(),
            TimeFeatures::default_single_player(),
        )
    }

    /// Enqueue a time-control command for the next tick's processing pass.
    /// Producers may call this at any point between ticks.
    pub fn enqueue(&mut self, command: TimeCommand) {
        self.processor.enqueue(command);
    }

    /// Record an opaque input payload against the upcoming tick. Recording
    /// only happens while recording forward with a rewind capability live;
    /// playback replays these instead of live input.
    pub fn record_input(&mut self, payload: Vec<u8>) {
        if self.rewind.mode() == TimeMode::Record && self.features.any_rewind() {
            self.history.record(self.clock.tick() + 1, payload);
        }
    }

    /// The recorded input payloads for `tick`, replayed during playback.
    pub fn replay_frames(&self, tick: u64) -> &[Vec<u8>] {
        self.history.frames_for(tick)
    }

    /// Advance the whole time-control pipeline by one fixed step.
    pub fn tick(&mut self, entities: &[EntityRecord], source: &mut dyn SnapshotSource) {
        let mode_before = self.rewind.mode();
        self.processor.drain(
            &self.features,
            &self.config,
            &mut self.clock,
            &mut self.rewind,
            &mut self.ring,
            &mut self.history,
            &mut self.events,
        );

        // An accepted StartRewind abandons the present between cadence
        // points; snapshot it so a later cancel lands on the exact tick.
        if mode_before == TimeMode::Record
            && self.rewind.mode() == TimeMode::Rewind
            && self.last_snapshot_tick != Some(self.clock.tick())
        {
            self.capture_snapshot(source);
        }

        let tick = self.clock.tick();
        if self.features.enable_time_scale_scheduling {
            self.resolver.expire(tick, &mut self.events);
            self.clock.set_scheduled_scale(self.resolver.active_scale(tick));
        } else {
            self.clock.set_scheduled_scale(None);
        }

        self.clock.advance(self.rewind.mode());

        if self.features.enable_time_bubbles {
            self.bubbles
                .resolve(self.clock.tick(), entities, &mut self.events);
        } else {
            self.bubbles.clear_memberships();
        }

        if self.snapshot_due() {
            self.capture_snapshot(source);
        }

        self.rewind
            .evaluate(&mut self.clock, &mut self.ring, source, &mut self.events);

        if self.rewind.mode() == TimeMode::Record {
            self.history.prune(self.clock.tick());
        }
    }

    fn capture_snapshot(&mut self, source: &mut dyn SnapshotSource) {
        let tick = self.clock.tick();
        let data = source.capture(tick);
        let entity_count = source.entity_count();
        self.ring
            .record(tick, data, entity_count, PlayerId::SINGLE_PLAYER, Scope::Global);
        self.last_snapshot_tick = Some(tick);
        self.events.push_at(
            tick,
            TimeEventKind::SnapshotRecorded { tick },
            format!("snapshot recorded at tick {tick}"),
        );
    }

    fn snapshot_due(&self) -> bool {
        let tick = self.clock.tick();
        self.features.enable_world_snapshots
            && self.rewind.mode() == TimeMode::Record
            && self.config.snapshot_interval_ticks > 0
            && tick > 0
            && tick % self.config.snapshot_interval_ticks == 0
            && self.last_snapshot_tick != Some(tick)
    }

    // ---- gated collaborator surfaces -----------------------------------

    /// Spawn a time bubble. Fails if bubbles (or the specific bubble mode)
    /// are feature-gated off.
    pub fn spawn_bubble(&mut self, bubble: TimeBubble) -> TimeResult<BubbleId> {
        if !self.features.enable_time_bubbles {
            return Err(self.gated("time_bubbles"));
        }
        match bubble.mode {
            BubbleMode::Stasis if !self.features.enable_stasis => {
                return Err(self.gated("stasis"));
            }
            BubbleMode::Rewind if !self.features.enable_local_bubble_rewind => {
                return Err(self.gated("local_bubble_rewind"));
            }
            _ => {}
        }
        Ok(self
            .bubbles
            .spawn(bubble, self.clock.tick(), &mut self.events))
    }

    /// Destroy a bubble, releasing its members.
    pub fn despawn_bubble(&mut self, id: BubbleId) -> bool {
        self.bubbles.despawn(id, self.clock.tick(), &mut self.events)
    }

    /// Activate or deactivate a bubble.
    pub fn set_bubble_active(&mut self, id: BubbleId, active: bool) -> bool {
        self.bubbles.set_active(id, active)
    }

    /// Release an entity leaving the simulation from its bubble, locked
    /// membership included.
    pub fn forget_entity(&mut self, entity: EntityId) -> bool {
        self.bubbles
            .forget(entity, self.clock.tick(), &mut self.events)
    }

    /// Schedule a time-scale entry. Fails if scheduling is gated off.
    pub fn add_scale_entry(&mut self, spec: ScaleEntrySpec) -> TimeResult<EntryId> {
        if !self.features.enable_time_scale_scheduling {
            return Err(self.gated("time_scale_scheduling"));
        }
        let id = self.resolver.add(spec, &self.config);
        self.events.push_at(
            self.clock.tick(),
            TimeEventKind::ScaleEntryAdded { entry: id },
            format!("{id} scheduled"),
        );
        Ok(id)
    }

    /// Remove a scale entry before its expiry.
    pub fn remove_scale_entry(&mut self, id: EntryId) -> bool {
        self.resolver.remove(id)
    }

    fn gated(&self, capability: &'static str) -> TimeError {
        TimeError::FeatureDisabled {
            capability,
            mode: self.features.simulation_mode,
        }
    }

    // ---- pure read helpers for downstream consumers --------------------

    /// The simulation delta `entity` experiences this tick.
    pub fn effective_delta(&self, entity: EntityId) -> f64 {
        self.clock.effective_delta(self.bubbles.membership_of(entity))
    }

    /// Whether `entity` should run its per-tick update.
    pub fn should_update(&self, entity: EntityId) -> bool {
        self.clock
            .should_update(self.rewind.mode(), self.bubbles.membership_of(entity))
    }

    /// Whether `entity` is frozen inside a stasis bubble.
    pub fn is_in_stasis(&self, entity: EntityId) -> bool {
        self.bubbles
            .membership_of(entity)
            .is_some_and(|m| m.mode == BubbleMode::Stasis)
    }

    /// A deterministic RNG for randomness scoped to the current tick. Two
    /// sessions with the same seed draw identical values at identical ticks,
    /// which is what makes replay from a snapshot bit-exact.
    pub fn rng_for(&self, salt: u64, stream: u32) -> StdRng {
        StdRng::seed_from_u64(deterministic_seed(
            self.clock.tick(),
            self.meta.seed ^ salt,
            stream,
        ))
    }

    // ---- accessors -----------------------------------------------------

    /// Session metadata.
    pub fn meta(&self) -> &SessionMeta {
        &self.meta
    }

    /// The active configuration.
    pub fn config(&self) -> &TimeConfig {
        &self.config
    }

    /// The feature gate in force.
    pub fn features(&self) -> &TimeFeatures {
        &self.features
    }

    /// The global clock.
    pub fn clock(&self) -> &TickClock {
        &self.clock
    }

    /// The rewind engine's current mode.
    pub fn mode(&self) -> TimeMode {
        self.rewind.mode()
    }

    /// The rewind engine's externally visible state.
    pub fn rewind_state(&self) -> &RewindState {
        self.rewind.state()
    }

    /// The snapshot ring.
    pub fn snapshots(&self) -> &SnapshotRing {
        &self.ring
    }

    /// The bubble manager.
    pub fn bubbles(&self) -> &TimeBubbleManager {
        &self.bubbles
    }

    /// An entity's bubble membership, if any.
    pub fn membership_of(&self, entity: EntityId) -> Option<&BubbleMembership> {
        self.bubbles.membership_of(entity)
    }

    /// The diagnostic event log.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Drain the diagnostic event log.
    pub fn drain_events(&mut self) -> Vec<crate::event::TimeEvent> {
        self.events.drain()
    }
}
