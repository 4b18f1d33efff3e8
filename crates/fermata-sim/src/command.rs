use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use fermata_core::{PlayerId, TimeFeatures};

use crate::clock::TickClock;
use crate::config::TimeConfig;
use crate::event::{EventLog, TimeEventKind};
use crate::history::InputHistory;
use crate::rewind::RewindEngine;
use crate::snapshot::SnapshotRing;

/// Whether a time-control effect applies to the whole world or to one
/// player's partition of state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Applies to the whole simulation.
    #[default]
    Global,
    /// Applies to a single player's partition.
    Player,
}

/// Who produced a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CommandSource {
    /// Direct player input (hotkeys, UI).
    #[default]
    Player,
    /// An ability or environmental effect.
    Ability,
    /// Engine-internal producers (AI director, scripts).
    System,
}

/// The operation a command requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// Set the global speed multiplier to `float_param` (clamped).
    SetSpeed,
    /// Toggle the global pause flag.
    TogglePause,
    /// Begin rewinding toward tick `int_param`.
    StartRewind,
    /// Release the scrub and enter playback preview.
    ExitRewind,
    /// Scrub by `int_param` ticks (positive = deeper into the past).
    StepTicks,
    /// Commit the previewed point, branching the timeline there.
    ConfirmBranch,
    /// Discard the preview and resume the original continuation.
    CancelPreview,
    /// Set the press-and-hold rewind charge level to `int_param`.
    SetRewindCharge,
}

/// A queued time-control request. Ephemeral: commands live for at most one
/// tick and are cleared wholesale after processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeCommand {
    /// The requested operation.
    pub kind: CommandKind,
    /// Floating-point payload (speed multiplier).
    pub float_param: f64,
    /// Integer payload (target tick, step count, charge level).
    pub int_param: i64,
    /// Global or per-player effect.
    pub scope: Scope,
    /// Owning player; `PlayerId::SINGLE_PLAYER` in local sessions.
    pub player: PlayerId,
    /// Who produced the command.
    pub source: CommandSource,
}

impl TimeCommand {
    fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            float_param: 0.0,
            int_param: 0,
            scope: Scope::Global,
            player: PlayerId::SINGLE_PLAYER,
            source: CommandSource::Player,
        }
    }

    /// Request a new global speed multiplier.
    pub fn set_speed(multiplier: f64) -> Self {
        Self {
            float_param: multiplier,
            ..Self::new(CommandKind::SetSpeed)
        }
    }

    /// Toggle the global pause flag.
    pub fn toggle_pause() -> Self {
        Self::new(CommandKind::TogglePause)
    }

    /// Begin rewinding toward `target_tick`.
    pub fn start_rewind(target_tick: u64) -> Self {
        Self {
            int_param: target_tick as i64,
            ..Self::new(CommandKind::StartRewind)
        }
    }

    /// Release the scrub and enter playback preview.
    pub fn exit_rewind() -> Self {
        Self::new(CommandKind::ExitRewind)
    }

    /// Scrub by `steps` ticks; positive steps move deeper into the past.
    pub fn step_ticks(steps: i64) -> Self {
        Self {
            int_param: steps,
            ..Self::new(CommandKind::StepTicks)
        }
    }

    /// Commit the previewed point, branching the timeline there.
    pub fn confirm_branch() -> Self {
        Self::new(CommandKind::ConfirmBranch)
    }

    /// Discard the preview and resume the original continuation.
    pub fn cancel_preview() -> Self {
        Self::new(CommandKind::CancelPreview)
    }

    /// Set the rewind charge level (press-and-hold escalation, 1..=4).
    pub fn rewind_charge(level: i64) -> Self {
        Self {
            int_param: level,
            ..Self::new(CommandKind::SetRewindCharge)
        }
    }

    /// Attribute the command to a producer.
    pub fn from_source(mut self, source: CommandSource) -> Self {
        self.source = source;
        self
    }

    /// Scope the command to one player's partition.
    pub fn for_player(mut self, player: PlayerId) -> Self {
        self.scope = Scope::Player;
        self.player = player;
        self
    }
}

/// FIFO queue of pending commands. Producers push asynchronously between
/// ticks; the processor is the sole consumer and clears the queue wholesale
/// once per tick.
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: VecDeque<TimeCommand>,
}

impl CommandQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a command for the next processing pass.
    pub fn push(&mut self, command: TimeCommand) {
        self.pending.push_back(command);
    }

    /// Number of pending commands.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True if no commands are pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn take_all(&mut self) -> Vec<TimeCommand> {
        self.pending.drain(..).collect()
    }
}

/// Single consumer of the command queue, run exactly once per tick.
///
/// Each command is atomic: it is validated against the feature gate and the
/// rewind state machine first, then either fully applied or dropped with a
/// `CommandRejected` diagnostic. The queue is cleared regardless of how many
/// entries were accepted — commands do not accumulate across ticks.
#[derive(Debug, Default)]
pub struct CommandProcessor {
    queue: CommandQueue,
}

impl CommandProcessor {
    /// Create a processor with an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Producer-side access to the queue.
    pub fn enqueue(&mut self, command: TimeCommand) {
        self.queue.push(command);
    }

    /// Number of commands awaiting the next drain.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Drain and apply every pending command in FIFO order.
    #[allow(clippy::too_many_arguments)]
    pub fn drain(
        &mut self,
        features: &TimeFeatures,
        config: &TimeConfig,
        clock: &mut TickClock,
        rewind: &mut RewindEngine,
        ring: &mut SnapshotRing,
        history: &mut InputHistory,
        events: &mut EventLog,
    ) {
        for command in self.queue.take_all() {
            Self::apply(command, features, config, clock, rewind, ring, history, events);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn apply(
        command: TimeCommand,
        features: &TimeFeatures,
        config: &TimeConfig,
        clock: &mut TickClock,
        rewind: &mut RewindEngine,
        ring: &mut SnapshotRing,
        history: &mut InputHistory,
        events: &mut EventLog,
    ) {
        let tick = clock.tick();

        if !command.player.is_valid() {
            events.push_at(
                tick,
                TimeEventKind::CommandRejected {
                    kind: command.kind,
                    reason: "invalid player id".into(),
                },
                format!("dropped {:?} from {}", command.kind, command.player),
            );
            return;
        }
        if command.scope == Scope::Player
            && !features.is_multiplayer()
            && command.player != PlayerId::SINGLE_PLAYER
        {
            events.push_at(
                tick,
                TimeEventKind::CommandRejected {
                    kind: command.kind,
                    reason: "player scope outside multiplayer".into(),
                },
                format!("dropped {:?} for {}", command.kind, command.player),
            );
            return;
        }

        match command.kind {
            CommandKind::SetSpeed => {
                let before = clock.base_speed();
                let applied =
                    clock.set_speed(command.float_param, config, features.use_legacy_speed_limits);
                events.push_at(
                    tick,
                    TimeEventKind::SpeedChanged {
                        from: before,
                        to: applied,
                    },
                    format!("speed multiplier {before} -> {applied}"),
                );
            }
            CommandKind::TogglePause => {
                clock.toggle_pause();
                events.push_at(
                    tick,
                    TimeEventKind::PauseToggled {
                        paused: clock.is_paused(),
                    },
                    if clock.is_paused() {
                        "simulation paused"
                    } else {
                        "simulation resumed"
                    },
                );
            }
            CommandKind::StartRewind => {
                let allowed = match command.scope {
                    Scope::Global => features.enable_global_rewind,
                    Scope::Player => features.enable_local_rewind,
                };
                if !allowed {
                    Self::reject_gated(command.kind, features, events, tick);
                    return;
                }
                let target = command.int_param.max(0) as u64;
                let from = rewind.mode();
                match rewind.start_rewind(target, clock, ring) {
                    Ok(()) => events.push_at(
                        tick,
                        TimeEventKind::ModeChanged {
                            from,
                            to: rewind.mode(),
                        },
                        format!("rewinding toward tick {target}"),
                    ),
                    Err(err) => events.push_at(
                        tick,
                        TimeEventKind::CommandRejected {
                            kind: command.kind,
                            reason: err.to_string(),
                        },
                        format!("dropped StartRewind: {err}"),
                    ),
                }
            }
            CommandKind::ExitRewind => {
                let from = rewind.mode();
                match rewind.release_scrub() {
                    Ok(()) => events.push_at(
                        tick,
                        TimeEventKind::ModeChanged {
                            from,
                            to: rewind.mode(),
                        },
                        "entering playback preview",
                    ),
                    Err(err) => events.push_at(
                        tick,
                        TimeEventKind::CommandRejected {
                            kind: command.kind,
                            reason: err.to_string(),
                        },
                        format!("dropped ExitRewind: {err}"),
                    ),
                }
            }
            CommandKind::StepTicks => match rewind.queue_steps(command.int_param) {
                Ok(()) => {}
                Err(err) => events.push_at(
                    tick,
                    TimeEventKind::CommandRejected {
                        kind: command.kind,
                        reason: err.to_string(),
                    },
                    format!("dropped StepTicks: {err}"),
                ),
            },
            CommandKind::ConfirmBranch => {
                let from = rewind.mode();
                match rewind.confirm(clock, ring, history) {
                    Ok(summary) => {
                        events.push_at(
                            tick,
                            TimeEventKind::ModeChanged {
                                from,
                                to: rewind.mode(),
                            },
                            format!("timeline branched at tick {}", summary.tick),
                        );
                        events.push_at(
                            tick,
                            TimeEventKind::TimelineBranched {
                                at: summary.tick,
                                discarded_snapshots: summary.discarded_snapshots,
                            },
                            format!(
                                "discarded {} snapshots and {} input ticks",
                                summary.discarded_snapshots, summary.discarded_frames
                            ),
                        );
                    }
                    Err(err) => events.push_at(
                        tick,
                        TimeEventKind::CommandRejected {
                            kind: command.kind,
                            reason: err.to_string(),
                        },
                        format!("dropped ConfirmBranch: {err}"),
                    ),
                }
            }
            CommandKind::CancelPreview => {
                let from = rewind.mode();
                match rewind.cancel(clock) {
                    Ok(()) => events.push_at(
                        tick,
                        TimeEventKind::ModeChanged {
                            from,
                            to: rewind.mode(),
                        },
                        "preview cancelled, resuming original timeline",
                    ),
                    Err(err) => events.push_at(
                        tick,
                        TimeEventKind::CommandRejected {
                            kind: command.kind,
                            reason: err.to_string(),
                        },
                        format!("dropped CancelPreview: {err}"),
                    ),
                }
            }
            CommandKind::SetRewindCharge => {
                if !features.any_rewind() {
                    Self::reject_gated(command.kind, features, events, tick);
                    return;
                }
                let level = rewind.set_charge_level(command.int_param);
                events.push_at(
                    tick,
                    TimeEventKind::RewindChargeChanged { level },
                    format!("rewind charge level {level}"),
                );
            }
        }
    }

    fn reject_gated(
        kind: CommandKind,
        features: &TimeFeatures,
        events: &mut EventLog,
        tick: u64,
    ) {
        events.push_at(
            tick,
            TimeEventKind::CommandRejected {
                kind,
                reason: format!("disabled in {:?} mode", features.simulation_mode),
            },
            format!("dropped {kind:?}: feature gate"),
        );
    }
}
