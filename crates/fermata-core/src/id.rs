use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier for a simulated entity under time control.
///
/// Integer ids rather than uuids: tie-breaking rules (lowest bubble id,
/// ascending entry id) need a total order that is identical across runs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Identifier for a time bubble. `BubbleId::NONE` (0) means "not a member".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct BubbleId(pub u64);

impl BubbleId {
    /// Sentinel for "no bubble".
    pub const NONE: BubbleId = BubbleId(0);

    /// Returns true if this id refers to an actual bubble.
    pub fn is_some(self) -> bool {
        self != Self::NONE
    }
}

impl fmt::Display for BubbleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bubble#{}", self.0)
    }
}

/// Identifier for a time-scale entry. Assigned in creation order, which makes
/// ascending `EntryId` the deterministic tie-break between equal priorities.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry#{}", self.0)
    }
}

/// Identifier for a player partition of simulation state.
///
/// `SINGLE_PLAYER` (0) is the sentinel owner in non-networked sessions;
/// `INVALID` (255) marks a malformed command and is never a legal owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// The sole player in a single-player session.
    pub const SINGLE_PLAYER: PlayerId = PlayerId(0);
    /// Reserved invalid id; commands carrying it are dropped.
    pub const INVALID: PlayerId = PlayerId(255);

    /// Returns true if this id may legally own commands, bubbles, or snapshots.
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::SINGLE_PLAYER
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bubble_none_sentinel() {
        assert!(!BubbleId::NONE.is_some());
        assert!(BubbleId(7).is_some());
    }

    #[test]
    fn player_sentinels() {
        assert!(PlayerId::SINGLE_PLAYER.is_valid());
        assert!(PlayerId(3).is_valid());
        assert!(!PlayerId::INVALID.is_valid());
        assert_eq!(PlayerId::default(), PlayerId::SINGLE_PLAYER);
    }

    #[test]
    fn ids_order_by_value() {
        assert!(EntryId(1) < EntryId(2));
        assert!(BubbleId(1) < BubbleId(10));
    }

    #[test]
    fn display_forms() {
        assert_eq!(EntityId(4).to_string(), "entity#4");
        assert_eq!(BubbleId(2).to_string(), "bubble#2");
        assert_eq!(PlayerId(0).to_string(), "player#0");
    }
}
