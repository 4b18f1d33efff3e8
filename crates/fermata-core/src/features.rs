use serde::{Deserialize, Serialize};

/// Which kind of session the simulation is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationMode {
    /// Local single-player session: every capability available.
    SinglePlayer,
    /// Authoritative multiplayer host: rewind-family features disabled.
    MultiplayerServer,
    /// Multiplayer client: rewind-family features disabled.
    MultiplayerClient,
}

/// Mode-dependent capability flags consulted by every time-control system.
///
/// This is the single source of truth keeping rewind, snapshots, and time
/// bubbles out of networked sessions. Components never perform a gated
/// mutation and roll it back — they query the gate first, and a forbidden
/// request is dropped before any state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeFeatures {
    /// The session kind these flags were built for.
    pub simulation_mode: SimulationMode,
    /// Whole-world rewind via the snapshot ring.
    pub enable_global_rewind: bool,
    /// Rewind-mode time bubbles (localized backward time).
    pub enable_local_bubble_rewind: bool,
    /// Periodic world snapshot capture.
    pub enable_world_snapshots: bool,
    /// Scheduled time-scale entries from abilities/environment.
    pub enable_time_scale_scheduling: bool,
    /// Global-scope snapshot entries (as opposed to per-player ones).
    pub enable_global_snapshots: bool,
    /// Per-component history recording for fine-grained restore.
    pub enable_component_history: bool,
    /// Time bubbles of any mode.
    pub enable_time_bubbles: bool,
    /// Per-player-scope rewind.
    pub enable_local_rewind: bool,
    /// Stasis bubbles (full local freeze).
    pub enable_stasis: bool,
    /// Forced true in any multiplayer mode; refuses determinism-breaking
    /// features even if other flags are toggled by configuration.
    pub enforce_multiplayer_compatibility: bool,
    /// Restrict the speed multiplier to the legacy range.
    pub use_legacy_speed_limits: bool,
}

impl TimeFeatures {
    /// Full single-player capability set.
    pub fn default_single_player() -> Self {
        Self {
            simulation_mode: SimulationMode::SinglePlayer,
            enable_global_rewind: true,
            enable_local_bubble_rewind: true,
            enable_world_snapshots: true,
            enable_time_scale_scheduling: true,
            enable_global_snapshots: true,
            enable_component_history: true,
            enable_time_bubbles: true,
            enable_local_rewind: true,
            enable_stasis: true,
            enforce_multiplayer_compatibility: false,
            use_legacy_speed_limits: false,
        }
    }

    /// Authoritative-server flags: every rewind/bubble/snapshot capability
    /// off, compatibility enforcement on.
    pub fn multiplayer_server() -> Self {
        Self::multiplayer(SimulationMode::MultiplayerServer)
    }

    /// Client flags: identical capability cuts as the server, so client and
    /// server never disagree about which features exist.
    pub fn multiplayer_client() -> Self {
        Self::multiplayer(SimulationMode::MultiplayerClient)
    }

    fn multiplayer(mode: SimulationMode) -> Self {
        Self {
            simulation_mode: mode,
            enable_global_rewind: false,
            enable_local_bubble_rewind: false,
            enable_world_snapshots: false,
            enable_time_scale_scheduling: true,
            enable_global_snapshots: false,
            enable_component_history: false,
            enable_time_bubbles: false,
            enable_local_rewind: false,
            enable_stasis: false,
            enforce_multiplayer_compatibility: true,
            use_legacy_speed_limits: false,
        }
    }

    /// Reduced-footprint profile: scheduling, snapshots, history, and bubbles
    /// off; legacy speed limits on.
    pub fn minimal() -> Self {
        Self {
            simulation_mode: SimulationMode::SinglePlayer,
            enable_global_rewind: false,
            enable_local_bubble_rewind: false,
            enable_world_snapshots: false,
            enable_time_scale_scheduling: false,
            enable_global_snapshots: false,
            enable_component_history: false,
            enable_time_bubbles: false,
            enable_local_rewind: false,
            enable_stasis: false,
            enforce_multiplayer_compatibility: false,
            use_legacy_speed_limits: true,
        }
    }

    /// True in either multiplayer mode.
    pub fn is_multiplayer(&self) -> bool {
        matches!(
            self.simulation_mode,
            SimulationMode::MultiplayerServer | SimulationMode::MultiplayerClient
        )
    }

    /// Whether any rewind-family capability (and thus the snapshot ring and
    /// input history) is live.
    pub fn any_rewind(&self) -> bool {
        self.enable_global_rewind || self.enable_local_rewind || self.enable_local_bubble_rewind
    }
}

impl Default for TimeFeatures {
    fn default() -> Self {
        Self::default_single_player()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_player_enables_everything() {
        let f = TimeFeatures::default_single_player();
        assert!(f.enable_global_rewind);
        assert!(f.enable_local_bubble_rewind);
        assert!(f.enable_world_snapshots);
        assert!(f.enable_time_bubbles);
        assert!(f.enable_local_rewind);
        assert!(f.enable_stasis);
        assert!(!f.enforce_multiplayer_compatibility);
        assert!(!f.is_multiplayer());
    }

    #[test]
    fn multiplayer_disables_rewind_family() {
        for f in [
            TimeFeatures::multiplayer_server(),
            TimeFeatures::multiplayer_client(),
        ] {
            assert!(!f.enable_global_rewind);
            assert!(!f.enable_local_bubble_rewind);
            assert!(!f.enable_world_snapshots);
            assert!(!f.enable_time_bubbles);
            assert!(!f.enable_local_rewind);
            assert!(!f.enable_stasis);
            assert!(f.enforce_multiplayer_compatibility);
            assert!(f.is_multiplayer());
            assert!(!f.any_rewind());
        }
    }

    #[test]
    fn multiplayer_modes_differ_only_in_kind() {
        let server = TimeFeatures::multiplayer_server();
        let client = TimeFeatures::multiplayer_client();
        assert_eq!(server.simulation_mode, SimulationMode::MultiplayerServer);
        assert_eq!(client.simulation_mode, SimulationMode::MultiplayerClient);
        let normalized = TimeFeatures {
            simulation_mode: server.simulation_mode,
            ..client
        };
        assert_eq!(server, normalized);
    }

    #[test]
    fn minimal_profile_uses_legacy_limits() {
        let f = TimeFeatures::minimal();
        assert!(f.use_legacy_speed_limits);
        assert!(!f.enable_time_scale_scheduling);
        assert!(!f.enable_world_snapshots);
        assert!(!f.enable_component_history);
        assert!(!f.enable_time_bubbles);
        assert!(!f.is_multiplayer());
    }
}
