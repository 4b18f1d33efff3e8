use std::collections::VecDeque;

use fermata_core::{BubbleId, EntityId, EntryId};

use crate::command::CommandKind;
use crate::rewind::TimeMode;

/// What kind of time-control event occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeEventKind {
    // Commands
    /// A command was dropped without mutating any state.
    CommandRejected {
        /// The dropped command's kind.
        kind: CommandKind,
        /// Why it was dropped.
        reason: String,
    },
    /// The global speed multiplier changed.
    SpeedChanged {
        /// Multiplier before the change.
        from: f64,
        /// Multiplier after clamping.
        to: f64,
    },
    /// The global pause flag toggled.
    PauseToggled {
        /// The new pause state.
        paused: bool,
    },
    /// The press-and-hold rewind charge level changed.
    RewindChargeChanged {
        /// The new charge level.
        level: u8,
    },

    // Rewind state machine
    /// The rewind engine moved between modes.
    ModeChanged {
        /// The previous mode.
        from: TimeMode,
        /// The new mode.
        to: TimeMode,
    },
    /// The timeline was branched: history after the branch point was discarded.
    TimelineBranched {
        /// The tick the new branch diverges from.
        at: u64,
        /// Number of snapshots discarded by the truncation.
        discarded_snapshots: usize,
    },

    // Snapshots
    /// A snapshot was written to the ring.
    SnapshotRecorded {
        /// The captured tick.
        tick: u64,
    },
    /// A snapshot was restored for a rewind/playback request.
    SnapshotRestored {
        /// The tick of the snapshot actually restored.
        tick: u64,
        /// The tick the request asked for.
        target: u64,
    },
    /// A snapshot failed checksum verification and was invalidated.
    SnapshotCorrupt {
        /// The tick of the corrupt snapshot.
        tick: u64,
    },

    // Bubbles
    /// A time bubble was spawned.
    BubbleCreated {
        /// The new bubble.
        bubble: BubbleId,
    },
    /// A time bubble was destroyed.
    BubbleDestroyed {
        /// The destroyed bubble.
        bubble: BubbleId,
    },
    /// An entity became a member of a bubble.
    EnteredBubble {
        /// The entity that entered.
        entity: EntityId,
        /// The bubble it joined.
        bubble: BubbleId,
    },
    /// An entity's membership in a bubble ended.
    LeftBubble {
        /// The entity that left.
        entity: EntityId,
        /// The bubble it left.
        bubble: BubbleId,
    },

    // Scale entries
    /// A scheduled time-scale entry was added.
    ScaleEntryAdded {
        /// The new entry.
        entry: EntryId,
    },
    /// A time-scale entry reached its end tick and was removed.
    ScaleEntryExpired {
        /// The expired entry.
        entry: EntryId,
    },
}

impl TimeEventKind {
    /// Check whether a given entity is involved in this event.
    pub fn involves(&self, id: EntityId) -> bool {
        match self {
            Self::EnteredBubble { entity, .. } | Self::LeftBubble { entity, .. } => *entity == id,
            _ => false,
        }
    }
}

/// A record of something the time-control core did or refused to do.
#[derive(Debug, Clone)]
pub struct TimeEvent {
    /// The simulation tick when this event occurred.
    pub tick: u64,
    /// The specific kind of event that occurred.
    pub kind: TimeEventKind,
    /// A human-readable description of the event.
    pub description: String,
}

/// Bounded in-memory diagnostic log.
///
/// The single writer is the tick that produced the events; consumers read or
/// drain between ticks.
#[derive(Debug, Default)]
pub struct EventLog {
    events: VecDeque<TimeEvent>,
    max_events: usize,
}

impl EventLog {
    /// Create a log that keeps at most `max_events` entries (0 = unlimited).
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::new(),
            max_events,
        }
    }

    /// Append an event, dropping the oldest entry if the cap is exceeded.
    pub fn push_at(&mut self, tick: u64, kind: TimeEventKind, description: impl Into<String>) {
        self.events.push_back(TimeEvent {
            tick,
            kind,
            description: description.into(),
        });
        if self.max_events > 0 && self.events.len() > self.max_events {
            self.events.pop_front();
        }
    }

    /// Iterate events oldest-first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &TimeEvent> {
        self.events.iter()
    }

    /// Number of retained events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if no events are retained.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove and return all retained events.
    pub fn drain(&mut self) -> Vec<TimeEvent> {
        self.events.drain(..).collect()
    }
}
