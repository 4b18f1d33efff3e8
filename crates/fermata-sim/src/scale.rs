use serde::{Deserialize, Serialize};

use fermata_core::EntryId;

use crate::command::CommandSource;
use crate::config::TimeConfig;
use crate::event::{EventLog, TimeEventKind};

/// A scheduled contribution to the global time scale.
///
/// Created by ability/environment collaborators, removed on expiry or by the
/// owner. `end_tick == 0` means open-ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeScaleEntry {
    /// Identifier, assigned in creation order.
    pub id: EntryId,
    /// Who scheduled the entry.
    pub source: CommandSource,
    /// Collaborator-defined discriminator (ability id, zone id).
    pub source_id: u64,
    /// Competing entries are resolved by priority, then ascending id.
    pub priority: i32,
    /// The scale this entry contributes, pre-clamped into the legal range.
    pub scale: f64,
    /// A pause entry forces the resolved scale to 0 regardless of priority.
    pub is_pause: bool,
    /// First tick the entry is active.
    pub start_tick: u64,
    /// First tick the entry is no longer active; 0 = unbounded.
    pub end_tick: u64,
}

impl TimeScaleEntry {
    /// Whether the entry is active at `tick`.
    pub fn is_active(&self, tick: u64) -> bool {
        tick >= self.start_tick && (self.end_tick == 0 || tick < self.end_tick)
    }
}

/// Parameters for scheduling a new scale entry.
#[derive(Debug, Clone)]
pub struct ScaleEntrySpec {
    /// Who is scheduling the entry.
    pub source: CommandSource,
    /// Collaborator-defined discriminator.
    pub source_id: u64,
    /// Resolution priority.
    pub priority: i32,
    /// Requested scale (clamped on insertion).
    pub scale: f64,
    /// Whether this entry pauses the simulation outright.
    pub is_pause: bool,
    /// First active tick.
    pub start_tick: u64,
    /// End tick, exclusive; 0 = unbounded.
    pub end_tick: u64,
}

/// Resolves competing scale/pause contributions into one effective global
/// scale, deterministically.
///
/// Default rule: any active pause entry forces 0; otherwise the highest
/// priority wins, ties broken by ascending entry id; no active entries means
/// the configured default. With stacking enabled, the scales of all active
/// entries at or above the priority floor are multiplied instead — iteration
/// is in ascending id order, so the product is identical across runs.
#[derive(Debug)]
pub struct TimeScaleResolver {
    entries: Vec<TimeScaleEntry>,
    next_id: u64,
    default_scale: f64,
    allow_stacking: bool,
    stacking_floor: i32,
}

impl TimeScaleResolver {
    /// Create an empty resolver with the configured defaults.
    pub fn new(config: &TimeConfig) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
            default_scale: config.default_scale,
            allow_stacking: config.allow_stacking,
            stacking_floor: config.stacking_priority_floor,
        }
    }

    /// Schedule a new entry. The scale is clamped into the configured speed
    /// range on the way in; pause entries keep their flag instead.
    pub fn add(&mut self, spec: ScaleEntrySpec, config: &TimeConfig) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push(TimeScaleEntry {
            id,
            source: spec.source,
            source_id: spec.source_id,
            priority: spec.priority,
            scale: config.clamp_speed(spec.scale, false),
            is_pause: spec.is_pause,
            start_tick: spec.start_tick,
            end_tick: spec.end_tick,
        });
        id
    }

    /// Remove an entry by id. Returns whether it existed.
    pub fn remove(&mut self, id: EntryId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Drop entries whose end tick has passed, logging each expiry.
    pub fn expire(&mut self, tick: u64, events: &mut EventLog) {
        self.entries.retain(|entry| {
            let expired = entry.end_tick != 0 && tick >= entry.end_tick;
            if expired {
                events.push_at(
                    tick,
                    TimeEventKind::ScaleEntryExpired { entry: entry.id },
                    format!("{} expired", entry.id),
                );
            }
            !expired
        });
    }

    /// The scale imposed by active entries at `tick`, or `None` when no entry
    /// is active and the player-set multiplier should apply.
    pub fn active_scale(&self, tick: u64) -> Option<f64> {
        let mut active = self.entries.iter().filter(|e| e.is_active(tick)).peekable();
        active.peek()?;

        if active.clone().any(|e| e.is_pause) {
            return Some(0.0);
        }

        if self.allow_stacking {
            let mut product = 1.0;
            let mut any = false;
            // entries is in ascending id order by construction
            for entry in active.filter(|e| e.priority >= self.stacking_floor) {
                product *= entry.scale;
                any = true;
            }
            return if any { Some(product) } else { None };
        }

        let mut best: Option<&TimeScaleEntry> = None;
        for entry in active {
            best = match best {
                None => Some(entry),
                Some(current)
                    if entry.priority > current.priority
                        || (entry.priority == current.priority && entry.id < current.id) =>
                {
                    Some(entry)
                }
                Some(current) => Some(current),
            };
        }
        best.map(|e| e.scale)
    }

    /// The effective global scale at `tick`, falling back to the configured
    /// default when nothing is active.
    pub fn resolve(&self, tick: u64) -> f64 {
        self.active_scale(tick).unwrap_or(self.default_scale)
    }

    /// Number of entries currently held (active or not).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no entries are held.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All held entries in ascending id order.
    pub fn entries(&self) -> &[TimeScaleEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(priority: i32, scale: f64) -> ScaleEntrySpec {
        ScaleEntrySpec {
            source: CommandSource::Ability,
            source_id: 0,
            priority,
            scale,
            is_pause: false,
            start_tick: 0,
            end_tick: 0,
        }
    }

    fn pause_spec(priority: i32) -> ScaleEntrySpec {
        ScaleEntrySpec {
            is_pause: true,
            ..spec(priority, 1.0)
        }
    }

    #[test]
    fn empty_resolver_yields_default() {
        let config = TimeConfig::default();
        let resolver = TimeScaleResolver::new(&config);
        assert_eq!(resolver.active_scale(10), None);
        assert!((resolver.resolve(10) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn highest_priority_wins() {
        let config = TimeConfig::default();
        let mut resolver = TimeScaleResolver::new(&config);
        resolver.add(spec(1, 0.5), &config);
        resolver.add(spec(5, 2.0), &config);
        resolver.add(spec(3, 0.1), &config);
        assert!((resolver.resolve(0) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn priority_ties_break_by_ascending_id() {
        let config = TimeConfig::default();
        let mut resolver = TimeScaleResolver::new(&config);
        let first = resolver.add(spec(5, 0.5), &config);
        let second = resolver.add(spec(5, 2.0), &config);
        assert!(first < second);
        assert!((resolver.resolve(0) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn pause_beats_higher_priority_entry() {
        // Canonical rule: a pause entry wins regardless of priority.
        let config = TimeConfig::default();
        let mut resolver = TimeScaleResolver::new(&config);
        resolver.add(spec(100, 2.0), &config);
        resolver.add(pause_spec(-5), &config);
        assert_eq!(resolver.active_scale(0), Some(0.0));
    }

    #[test]
    fn entries_respect_activity_window() {
        let config = TimeConfig::default();
        let mut resolver = TimeScaleResolver::new(&config);
        resolver.add(
            ScaleEntrySpec {
                start_tick: 10,
                end_tick: 20,
                ..spec(1, 0.5)
            },
            &config,
        );
        assert_eq!(resolver.active_scale(9), None);
        assert_eq!(resolver.active_scale(10), Some(0.5));
        assert_eq!(resolver.active_scale(19), Some(0.5));
        assert_eq!(resolver.active_scale(20), None);
    }

    #[test]
    fn open_ended_entry_never_expires() {
        let config = TimeConfig::default();
        let mut resolver = TimeScaleResolver::new(&config);
        resolver.add(spec(1, 0.5), &config);
        let mut events = EventLog::new(0);
        resolver.expire(1_000_000, &mut events);
        assert_eq!(resolver.len(), 1);
        assert_eq!(resolver.active_scale(1_000_000), Some(0.5));
    }

    #[test]
    fn expire_removes_finished_entries() {
        let config = TimeConfig::default();
        let mut resolver = TimeScaleResolver::new(&config);
        resolver.add(
            ScaleEntrySpec {
                end_tick: 5,
                ..spec(1, 0.5)
            },
            &config,
        );
        let mut events = EventLog::new(0);
        resolver.expire(5, &mut events);
        assert!(resolver.is_empty());
        assert!(events.iter().any(|e| matches!(
            e.kind,
            TimeEventKind::ScaleEntryExpired { .. }
        )));
    }

    #[test]
    fn stacking_multiplies_above_floor() {
        let config = TimeConfig::default().with_stacking(0);
        let mut resolver = TimeScaleResolver::new(&config);
        resolver.add(spec(1, 0.5), &config);
        resolver.add(spec(2, 0.5), &config);
        resolver.add(spec(-1, 8.0), &config); // below the floor, ignored
        assert_eq!(resolver.active_scale(0), Some(0.25));
    }

    #[test]
    fn stacking_is_order_independent_across_runs() {
        let config = TimeConfig::default().with_stacking(0);
        let build = || {
            let mut r = TimeScaleResolver::new(&config);
            r.add(spec(1, 0.5), &config);
            r.add(spec(3, 2.0), &config);
            r.add(spec(2, 0.25), &config);
            r.active_scale(0)
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn scale_is_clamped_on_insertion() {
        let config = TimeConfig::default();
        let mut resolver = TimeScaleResolver::new(&config);
        resolver.add(spec(1, 1000.0), &config);
        assert_eq!(resolver.active_scale(0), Some(16.0));
    }

    #[test]
    fn remove_by_id() {
        let config = TimeConfig::default();
        let mut resolver = TimeScaleResolver::new(&config);
        let id = resolver.add(spec(1, 0.5), &config);
        assert!(resolver.remove(id));
        assert!(!resolver.remove(id));
        assert!(resolver.is_empty());
    }
}
