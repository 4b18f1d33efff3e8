use serde::{Deserialize, Serialize};

use fermata_core::PlayerId;

use crate::command::Scope;
use crate::error::{TimeError, TimeResult};
use crate::event::{EventLog, TimeEventKind};

/// How a snapshot payload is compressed. Metadata only — the payload encoding
/// belongs to the external serializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompressionKind {
    /// Raw serialized bytes.
    #[default]
    None,
    /// LZ4 block compression.
    Lz4,
    /// Zstandard compression.
    Zstd,
}

/// Bookkeeping for one captured snapshot. The payload itself is an opaque
/// byte blob owned format-wise by the external serializer; this core owns
/// only placement and integrity metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    /// The tick the world state was captured at.
    pub tick: u64,
    /// Cleared when the slot is overwritten or fails verification.
    pub valid: bool,
    /// Payload offset within external storage.
    pub byte_offset: u64,
    /// Payload length in bytes.
    pub byte_len: u64,
    /// Payload compression.
    pub compression: CompressionKind,
    /// Number of entities captured.
    pub entity_count: u32,
    /// blake3 checksum of the payload, truncated to 64 bits.
    pub checksum: u64,
    /// The player the snapshot belongs to.
    pub owner: PlayerId,
    /// Whole-world or per-player capture.
    pub scope: Scope,
}

/// Checksum a snapshot payload: blake3, truncated to the first 8 bytes.
pub fn checksum(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(prefix)
}

/// The seam to the external world serializer.
///
/// This core owns placement, cadence, and integrity of snapshots; the
/// collaborator behind this trait owns the entity-state encoding. `capture`
/// must serialize one globally consistent instant — it is only ever called
/// from the authoritative tick, never mid-mutation.
pub trait SnapshotSource {
    /// Serialize the current world state at `tick`.
    fn capture(&mut self, tick: u64) -> Vec<u8>;

    /// Replace the current world state with a previously captured payload.
    fn restore(&mut self, tick: u64, data: &[u8]);

    /// Number of entities the next capture will cover, for metadata.
    fn entity_count(&self) -> u32 {
        0
    }
}

#[derive(Debug, Clone)]
struct Slot {
    meta: SnapshotMeta,
    data: Vec<u8>,
}

/// A successfully restored snapshot.
#[derive(Debug, Clone)]
pub struct RestoredSnapshot {
    /// The restored snapshot's metadata.
    pub meta: SnapshotMeta,
    /// The verified payload.
    pub data: Vec<u8>,
}

/// Bounded circular buffer of checksummed world-state captures.
///
/// Insertion advances the head modulo capacity; once full, each write
/// implicitly evicts the slot it overwrites. Only the authoritative tick
/// writes here, so a capture is always one globally consistent instant.
#[derive(Debug)]
pub struct SnapshotRing {
    slots: Vec<Option<Slot>>,
    head: usize,
}

impl SnapshotRing {
    /// Create an empty ring with the given capacity (at least 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity.max(1)).map(|_| None).collect(),
            head: 0,
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of valid snapshots currently held.
    pub fn valid_count(&self) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|s| s.meta.valid)
            .count()
    }

    /// The newest valid snapshot tick, if any.
    pub fn latest_tick(&self) -> Option<u64> {
        self.slots
            .iter()
            .flatten()
            .filter(|s| s.meta.valid)
            .map(|s| s.meta.tick)
            .max()
    }

    /// The oldest valid snapshot tick, if any.
    pub fn oldest_tick(&self) -> Option<u64> {
        self.slots
            .iter()
            .flatten()
            .filter(|s| s.meta.valid)
            .map(|s| s.meta.tick)
            .min()
    }

    /// Whether a restore request for `target` could be served, ignoring
    /// checksum verification. Used to reject `StartRewind` up front when
    /// rewind is temporarily unavailable.
    pub fn has_valid_at_or_before(&self, target: u64) -> bool {
        self.oldest_tick().is_some_and(|oldest| oldest <= target)
    }

    /// Write a capture at the ring head, evicting whatever the head slot
    /// held. Returns the new snapshot's metadata.
    pub fn record(
        &mut self,
        tick: u64,
        data: Vec<u8>,
        entity_count: u32,
        owner: PlayerId,
        scope: Scope,
    ) -> SnapshotMeta {
        let meta = SnapshotMeta {
            tick,
            valid: true,
            byte_offset: 0,
            byte_len: data.len() as u64,
            compression: CompressionKind::None,
            entity_count,
            checksum: checksum(&data),
            owner,
            scope,
        };
        self.slots[self.head] = Some(Slot {
            meta: meta.clone(),
            data,
        });
        self.head = (self.head + 1) % self.slots.len();
        meta
    }

    /// Restore the snapshot with the greatest tick at or before `target`.
    ///
    /// The payload checksum is verified on read. A mismatch invalidates the
    /// slot, logs the corruption, and falls back to the next older valid
    /// snapshot; if no candidate survives, the request fails without
    /// touching any state.
    pub fn restore(&mut self, target: u64, events: &mut EventLog) -> TimeResult<RestoredSnapshot> {
        loop {
            let candidate = self
                .slots
                .iter()
                .enumerate()
                .filter_map(|(i, slot)| slot.as_ref().map(|s| (i, s)))
                .filter(|(_, s)| s.meta.valid && s.meta.tick <= target)
                .max_by_key(|(_, s)| s.meta.tick)
                .map(|(i, _)| i);

            let Some(index) = candidate else {
                return Err(TimeError::NoSnapshotAvailable { target });
            };

            // Index came from the scan above; the slot is present.
            let slot = self.slots[index].as_mut().ok_or(TimeError::NoSnapshotAvailable { target })?;
            if checksum(&slot.data) == slot.meta.checksum {
                return Ok(RestoredSnapshot {
                    meta: slot.meta.clone(),
                    data: slot.data.clone(),
                });
            }

            slot.meta.valid = false;
            events.push_at(
                slot.meta.tick,
                TimeEventKind::SnapshotCorrupt {
                    tick: slot.meta.tick,
                },
                format!("snapshot at tick {} failed checksum", slot.meta.tick),
            );
        }
    }

    /// Invalidate every snapshot after `tick`. Returns how many were
    /// discarded. Used when the timeline branches on a confirmed rewind.
    pub fn truncate_after(&mut self, tick: u64) -> usize {
        let mut discarded = 0;
        for slot in self.slots.iter_mut().flatten() {
            if slot.meta.valid && slot.meta.tick > tick {
                slot.meta.valid = false;
                discarded += 1;
            }
        }
        discarded
    }

    /// Metadata for every valid snapshot, oldest first.
    pub fn iter_meta(&self) -> Vec<&SnapshotMeta> {
        let mut metas: Vec<&SnapshotMeta> = self
            .slots
            .iter()
            .flatten()
            .filter(|s| s.meta.valid)
            .map(|s| &s.meta)
            .collect();
        metas.sort_by_key(|m| m.tick);
        metas
    }
}
