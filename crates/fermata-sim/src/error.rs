use fermata_core::EntityId;
use fermata_core::features::SimulationMode;

use crate::rewind::TimeMode;

/// Alias for `Result<T, TimeError>`.
pub type TimeResult<T> = Result<T, TimeError>;

/// Errors surfaced by the time-control API.
///
/// Dropped commands are not errors: the command processor reports those as
/// event-log diagnostics and keeps going. `TimeError` is for direct API calls
/// whose caller must handle the failure.
#[derive(Debug, thiserror::Error)]
pub enum TimeError {
    /// The requested capability is disabled by the active feature gate.
    #[error("capability '{capability}' is disabled in {mode:?} mode")]
    FeatureDisabled {
        /// Name of the gated capability.
        capability: &'static str,
        /// The simulation mode the gate was built for.
        mode: SimulationMode,
    },

    /// A rewind target outside the permitted window.
    #[error("rewind target tick {target} outside window [{earliest}, {latest}]")]
    TargetOutOfWindow {
        /// The requested tick.
        target: u64,
        /// Oldest tick the window still covers.
        earliest: u64,
        /// Newest tick (the present).
        latest: u64,
    },

    /// No valid snapshot exists at or before the requested tick.
    #[error("no valid snapshot at or before tick {target}")]
    NoSnapshotAvailable {
        /// The requested tick.
        target: u64,
    },

    /// An operation legal only in a specific rewind mode.
    #[error("operation requires {expected:?} mode, current mode is {actual:?}")]
    WrongMode {
        /// The mode the operation needs.
        expected: TimeMode,
        /// The mode the engine is in.
        actual: TimeMode,
    },

    /// The entity is not tracked by the time system.
    #[error("entity not tracked: {0}")]
    EntityNotTracked(EntityId),
}
