/// Configuration for a time-control session.
#[derive(Debug, Clone)]
pub struct TimeConfig {
    /// Simulation seconds per fixed tick.
    pub fixed_delta: f64,
    /// Lower bound for the global speed multiplier.
    pub min_speed: f64,
    /// Upper bound for the global speed multiplier.
    pub max_speed: f64,
    /// Bounds applied instead when legacy speed limits are in force.
    pub legacy_min_speed: f64,
    /// Upper legacy bound.
    pub legacy_max_speed: f64,
    /// Scale resolved when no scale entries are active.
    pub default_scale: f64,
    /// Multiply active scale entries above the priority floor instead of
    /// selecting the single highest-priority one.
    pub allow_stacking: bool,
    /// Minimum entry priority included when stacking.
    pub stacking_priority_floor: i32,
    /// Maximum backward span, in ticks, a rewind may cover.
    pub rewind_window_ticks: u64,
    /// Number of slots in the snapshot ring.
    pub snapshot_capacity: usize,
    /// Ticks between snapshot captures while recording.
    pub snapshot_interval_ticks: u64,
    /// Forward replay rate during playback.
    pub playback_ticks_per_second: u32,
    /// Maximum event log size (oldest events dropped when exceeded). 0 = unlimited.
    pub max_events: usize,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            fixed_delta: 1.0 / 60.0,
            min_speed: 0.01,
            max_speed: 16.0,
            legacy_min_speed: 0.25,
            legacy_max_speed: 4.0,
            default_scale: 1.0,
            allow_stacking: false,
            stacking_priority_floor: 0,
            rewind_window_ticks: 600,
            snapshot_capacity: 64,
            snapshot_interval_ticks: 30,
            playback_ticks_per_second: 30,
            max_events: 0,
        }
    }
}

impl TimeConfig {
    /// Set the fixed tick delta in seconds.
    pub fn with_fixed_delta(mut self, delta: f64) -> Self {
        self.fixed_delta = delta;
        self
    }

    /// Set the speed multiplier bounds.
    pub fn with_speed_bounds(mut self, min: f64, max: f64) -> Self {
        self.min_speed = min;
        self.max_speed = max;
        self
    }

    /// Set the rewind window in ticks.
    pub fn with_rewind_window(mut self, ticks: u64) -> Self {
        self.rewind_window_ticks = ticks;
        self
    }

    /// Set snapshot ring capacity and capture cadence.
    pub fn with_snapshots(mut self, capacity: usize, interval_ticks: u64) -> Self {
        self.snapshot_capacity = capacity;
        self.snapshot_interval_ticks = interval_ticks;
        self
    }

    /// Enable multiplicative stacking above the given priority floor.
    pub fn with_stacking(mut self, floor: i32) -> Self {
        self.allow_stacking = true;
        self.stacking_priority_floor = floor;
        self
    }

    /// Set the playback replay rate.
    pub fn with_playback_rate(mut self, ticks_per_second: u32) -> Self {
        self.playback_ticks_per_second = ticks_per_second;
        self
    }

    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Clamp a requested speed multiplier into the legal range. Malformed
    /// input degrades to the nearest legal value rather than being rejected;
    /// a non-finite request falls back to the default scale.
    pub fn clamp_speed(&self, requested: f64, legacy_limits: bool) -> f64 {
        let (min, max) = if legacy_limits {
            (self.legacy_min_speed, self.legacy_max_speed)
        } else {
            (self.min_speed, self.max_speed)
        };
        if !requested.is_finite() {
            return self.default_scale.clamp(min, max);
        }
        requested.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn config_default_values() {
        let config = TimeConfig::default();
        assert!((config.min_speed - 0.01).abs() < f64::EPSILON);
        assert!((config.max_speed - 16.0).abs() < f64::EPSILON);
        assert!((config.default_scale - 1.0).abs() < f64::EPSILON);
        assert!(!config.allow_stacking);
        assert_eq!(config.rewind_window_ticks, 600);
    }

    #[test]
    fn config_builder_chain() {
        let config = TimeConfig::default()
            .with_fixed_delta(0.05)
            .with_rewind_window(1200)
            .with_snapshots(32, 10)
            .with_stacking(5)
            .with_max_events(100);
        assert!((config.fixed_delta - 0.05).abs() < f64::EPSILON);
        assert_eq!(config.rewind_window_ticks, 1200);
        assert_eq!(config.snapshot_capacity, 32);
        assert_eq!(config.snapshot_interval_ticks, 10);
        assert!(config.allow_stacking);
        assert_eq!(config.stacking_priority_floor, 5);
        assert_eq!(config.max_events, 100);
    }

    #[test]
    fn clamp_speed_in_range_is_identity() {
        let config = TimeConfig::default();
        assert!((config.clamp_speed(2.0, false) - 2.0).abs() < f64::EPSILON);
        assert!((config.clamp_speed(0.01, false) - 0.01).abs() < f64::EPSILON);
        assert!((config.clamp_speed(16.0, false) - 16.0).abs() < f64::EPSILON);
    }

    #[test]
    fn clamp_speed_handles_malformed_input() {
        let config = TimeConfig::default();
        assert!((config.clamp_speed(f64::NAN, false) - 1.0).abs() < f64::EPSILON);
        assert!((config.clamp_speed(f64::INFINITY, false) - 1.0).abs() < f64::EPSILON);
        assert!((config.clamp_speed(-5.0, false) - 0.01).abs() < f64::EPSILON);
    }

    #[test]
    fn clamp_speed_legacy_limits() {
        let config = TimeConfig::default();
        assert!((config.clamp_speed(16.0, true) - 4.0).abs() < f64::EPSILON);
        assert!((config.clamp_speed(0.01, true) - 0.25).abs() < f64::EPSILON);
    }

    proptest! {
        #[test]
        fn clamp_speed_always_in_bounds(requested in proptest::num::f64::ANY) {
            let config = TimeConfig::default();
            let clamped = config.clamp_speed(requested, false);
            prop_assert!((config.min_speed..=config.max_speed).contains(&clamped));
        }

        #[test]
        fn clamp_speed_identity_in_range(requested in 0.01f64..=16.0) {
            let config = TimeConfig::default();
            prop_assert_eq!(config.clamp_speed(requested, false), requested);
        }
    }
}
