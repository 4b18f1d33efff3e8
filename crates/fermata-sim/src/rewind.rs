use serde::{Deserialize, Serialize};

use crate::clock::TickClock;
use crate::config::TimeConfig;
use crate::error::{TimeError, TimeResult};
use crate::event::{EventLog, TimeEventKind};
use crate::history::InputHistory;
use crate::snapshot::{SnapshotRing, SnapshotSource};

/// The rewind engine's mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeMode {
    /// Normal forward simulation; the only mode that writes snapshots and
    /// input history.
    #[default]
    Record,
    /// Scrubbing backward through recorded history.
    Rewind,
    /// Forward replay from a rewound point, for inspection without
    /// commitment.
    Playback,
}

/// Which way the scrub cursor is moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScrubDirection {
    /// Deeper into the past.
    #[default]
    Backward,
    /// Back toward the present.
    Forward,
}

/// The rewind state machine's externally visible state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewindState {
    /// Current mode.
    pub mode: TimeMode,
    /// The tick the scrub cursor points at (and the branch point, once
    /// confirmed).
    pub target_tick: u64,
    /// Maximum backward span from the point where rewinding began.
    pub rewind_window_ticks: u64,
    /// Scrub steps queued by `StepTicks` commands, consumed each tick.
    pub pending_step_ticks: i64,
    /// Which way the cursor is moving.
    pub scrub_direction: ScrubDirection,
    /// Step multiplier from the press-and-hold charge level.
    pub scrub_speed_multiplier: f64,
    /// Forward replay rate during playback.
    pub playback_ticks_per_second: u32,
}

/// Result of a confirmed timeline branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchSummary {
    /// The tick the new branch diverges from.
    pub tick: u64,
    /// Snapshots discarded by the truncation.
    pub discarded_snapshots: usize,
    /// Input-history ticks discarded by the truncation.
    pub discarded_frames: usize,
}

/// State machine orchestrating scrubbing and re-divergence.
///
/// Transitions: Record→Rewind on an accepted `StartRewind`; Rewind→Playback
/// when the scrub is released; Playback→Record on confirm (branching the
/// timeline at the target) or cancel (resuming the original continuation).
/// In multiplayer sessions the command processor never accepts a rewind
/// command, so the engine is Record-only by construction.
#[derive(Debug)]
pub struct RewindEngine {
    state: RewindState,
    /// The tick the world was at when rewinding began; cancel returns here.
    record_head: u64,
    /// A restore the next evaluation pass must serve.
    restore_request: Option<u64>,
    /// Fractional playback progress carried between ticks.
    playback_accum: f64,
    charge_level: u8,
}

impl RewindEngine {
    /// Create an engine in Record mode.
    pub fn new(config: &TimeConfig) -> Self {
        Self {
            state: RewindState {
                mode: TimeMode::Record,
                target_tick: 0,
                rewind_window_ticks: config.rewind_window_ticks,
                pending_step_ticks: 0,
                scrub_direction: ScrubDirection::Backward,
                scrub_speed_multiplier: 1.0,
                playback_ticks_per_second: config.playback_ticks_per_second,
            },
            record_head: 0,
            restore_request: None,
            playback_accum: 0.0,
            charge_level: 1,
        }
    }

    /// Current mode.
    pub fn mode(&self) -> TimeMode {
        self.state.mode
    }

    /// The externally visible state.
    pub fn state(&self) -> &RewindState {
        &self.state
    }

    /// The tick rewinding began from; meaningful outside Record mode.
    pub fn record_head(&self) -> u64 {
        self.record_head
    }

    /// Set the press-and-hold charge level (clamped to 1..=4). Each level
    /// doubles the scrub speed. Returns the applied level.
    pub fn set_charge_level(&mut self, level: i64) -> u8 {
        self.charge_level = level.clamp(1, 4) as u8;
        self.state.scrub_speed_multiplier = f64::from(1u32 << (self.charge_level - 1));
        self.charge_level
    }

    /// Begin rewinding toward `target`.
    ///
    /// Fails without changing mode if the engine is not recording, the
    /// target falls outside the rewind window, or no valid snapshot can
    /// serve the restore.
    pub fn start_rewind(
        &mut self,
        target: u64,
        clock: &TickClock,
        ring: &SnapshotRing,
    ) -> TimeResult<()> {
        if self.state.mode != TimeMode::Record {
            return Err(TimeError::WrongMode {
                expected: TimeMode::Record,
                actual: self.state.mode,
            });
        }
        let latest = clock.tick();
        let earliest = latest.saturating_sub(self.state.rewind_window_ticks);
        if target < earliest || target > latest {
            return Err(TimeError::TargetOutOfWindow {
                target,
                earliest,
                latest,
            });
        }
        if !ring.has_valid_at_or_before(target) {
            return Err(TimeError::NoSnapshotAvailable { target });
        }
        self.record_head = latest;
        self.state.mode = TimeMode::Rewind;
        self.state.target_tick = target;
        self.state.pending_step_ticks = 0;
        self.state.scrub_direction = ScrubDirection::Backward;
        self.restore_request = Some(target);
        Ok(())
    }

    /// Queue scrub movement; positive steps move deeper into the past.
    pub fn queue_steps(&mut self, steps: i64) -> TimeResult<()> {
        if self.state.mode != TimeMode::Rewind {
            return Err(TimeError::WrongMode {
                expected: TimeMode::Rewind,
                actual: self.state.mode,
            });
        }
        self.state.pending_step_ticks += steps;
        self.state.scrub_direction = if self.state.pending_step_ticks >= 0 {
            ScrubDirection::Backward
        } else {
            ScrubDirection::Forward
        };
        Ok(())
    }

    /// Release the scrub: Rewind→Playback, replaying forward from the cursor.
    pub fn release_scrub(&mut self) -> TimeResult<()> {
        if self.state.mode != TimeMode::Rewind {
            return Err(TimeError::WrongMode {
                expected: TimeMode::Rewind,
                actual: self.state.mode,
            });
        }
        self.state.mode = TimeMode::Playback;
        self.state.pending_step_ticks = 0;
        self.playback_accum = 0.0;
        self.restore_request = Some(self.state.target_tick);
        Ok(())
    }

    /// Commit the previewed point: Playback→Record, destructively truncating
    /// all snapshot and input history after the target and branching the
    /// timeline there.
    pub fn confirm(
        &mut self,
        clock: &mut TickClock,
        ring: &mut SnapshotRing,
        history: &mut InputHistory,
    ) -> TimeResult<BranchSummary> {
        if self.state.mode != TimeMode::Playback {
            return Err(TimeError::WrongMode {
                expected: TimeMode::Playback,
                actual: self.state.mode,
            });
        }
        let branch = self.state.target_tick;
        let discarded_snapshots = ring.truncate_after(branch);
        let discarded_frames = history.truncate_after(branch);
        clock.seek(branch);
        self.state.mode = TimeMode::Record;
        self.state.pending_step_ticks = 0;
        // Preview playback mutated the world past the branch point; the next
        // evaluation resets it to the branch snapshot before recording resumes.
        self.restore_request = Some(branch);
        self.record_head = branch;
        Ok(BranchSummary {
            tick: branch,
            discarded_snapshots,
            discarded_frames,
        })
    }

    /// Discard the preview: Playback→Record at the original present, with
    /// history untouched.
    pub fn cancel(&mut self, clock: &mut TickClock) -> TimeResult<()> {
        if self.state.mode != TimeMode::Playback {
            return Err(TimeError::WrongMode {
                expected: TimeMode::Playback,
                actual: self.state.mode,
            });
        }
        clock.seek(self.record_head);
        self.state.mode = TimeMode::Record;
        self.state.pending_step_ticks = 0;
        self.restore_request = Some(self.record_head);
        Ok(())
    }

    /// Per-tick evaluation, run after every other component so a transition
    /// decided this tick takes effect on the next.
    pub fn evaluate(
        &mut self,
        clock: &mut TickClock,
        ring: &mut SnapshotRing,
        source: &mut dyn SnapshotSource,
        events: &mut EventLog,
    ) {
        match self.state.mode {
            TimeMode::Record => {
                // Serve the restore a cancel left behind, then idle.
                self.serve_restore(ring, source, events);
            }
            TimeMode::Rewind => {
                let steps = self.state.pending_step_ticks;
                if steps != 0 {
                    self.state.pending_step_ticks = 0;
                    let offset =
                        (steps as f64 * self.state.scrub_speed_multiplier).round() as i64;
                    let earliest =
                        self.record_head.saturating_sub(self.state.rewind_window_ticks);
                    let moved = (self.state.target_tick as i64 - offset)
                        .clamp(earliest as i64, self.record_head as i64)
                        as u64;
                    if moved != self.state.target_tick {
                        self.state.target_tick = moved;
                        self.restore_request = Some(moved);
                    }
                }
                clock.seek(self.state.target_tick);
                self.serve_restore(ring, source, events);
            }
            TimeMode::Playback => {
                self.serve_restore(ring, source, events);
                self.playback_accum +=
                    f64::from(self.state.playback_ticks_per_second) * clock.fixed_delta();
                let advance = self.playback_accum.floor() as u64;
                if advance > 0 {
                    self.playback_accum -= advance as f64;
                    let cursor = (clock.tick() + advance).min(self.record_head);
                    clock.seek(cursor);
                }
            }
        }
    }

    fn serve_restore(
        &mut self,
        ring: &mut SnapshotRing,
        source: &mut dyn SnapshotSource,
        events: &mut EventLog,
    ) {
        let Some(target) = self.restore_request.take() else {
            return;
        };
        // A failed restore degrades this request only: the mode stands, and
        // StartRewind stays rejected until a valid snapshot accumulates.
        if let Ok(restored) = ring.restore(target, events) {
            source.restore(restored.meta.tick, &restored.data);
            events.push_at(
                restored.meta.tick,
                TimeEventKind::SnapshotRestored {
                    tick: restored.meta.tick,
                    target,
                },
                format!(
                    "restored snapshot at tick {} for target {target}",
                    restored.meta.tick
                ),
            );
        }
    }
}
