//! Deterministic time control for a fixed-tick simulation.
//!
//! The crate is organized around [`TimeSystem`], which owns every
//! time-control component and steps them in a fixed order each tick:
//! command processing, scale resolution, clock advance, bubble membership,
//! snapshot capture, and rewind evaluation. Gameplay code reads time only
//! through the system's query helpers, so a single change to the clock or a
//! bubble propagates consistently to every consumer.
//!
//! Determinism is the load-bearing property: the same seed, config, and
//! command sequence produce the same ticks, the same snapshots, and the same
//! random draws. Every tie-break in the crate resolves through stable
//! integer identifiers, never insertion order or map iteration.

/// Time bubbles: volumes that override local time for entities inside them.
pub mod bubble;
/// The global fixed-step clock.
pub mod clock;
/// Time-control commands and the per-tick processing queue.
pub mod command;
/// Tunable limits and defaults.
pub mod config;
/// Error types for time-control operations.
pub mod error;
/// Diagnostic event log.
pub mod event;
/// Opaque per-tick input recording for playback.
pub mod history;
/// The orchestrating time system.
pub mod pipeline;
/// The Record / Rewind / Playback state machine.
pub mod rewind;
/// Scheduled time-scale entries and conflict resolution.
pub mod scale;
/// The world snapshot ring buffer.
pub mod snapshot;

pub use bubble::{BubbleMembership, BubbleMode, EntityRecord, TimeBubble, TimeBubbleManager};
pub use clock::TickClock;
pub use command::{CommandKind, CommandProcessor, CommandSource, Scope, TimeCommand};
pub use config::TimeConfig;
pub use error::{TimeError, TimeResult};
pub use event::{EventLog, TimeEvent, TimeEventKind};
pub use history::InputHistory;
pub use pipeline::TimeSystem;
pub use rewind::{BranchSummary, RewindEngine, RewindState, ScrubDirection, TimeMode};
pub use scale::{ScaleEntrySpec, TimeScaleEntry, TimeScaleResolver};
pub use snapshot::{
    CompressionKind, RestoredSnapshot, SnapshotMeta, SnapshotRing, SnapshotSource,
};
