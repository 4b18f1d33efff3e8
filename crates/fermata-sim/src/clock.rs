use crate::bubble::{BubbleMembership, BubbleMode};
use crate::config::TimeConfig;
use crate::rewind::TimeMode;

/// The global simulation clock: a monotonic tick counter, fixed delta,
/// pause flag, and speed multiplier.
///
/// The tick advances exactly once per fixed step while recording and
/// unpaused. During rewind and playback the rewind engine seeks the counter
/// directly; monotonicity is only guaranteed in Record mode.
///
/// Two multipliers are tracked: the player-set base (written by `SetSpeed`,
/// always clamped into the configured range) and an optional scheduled
/// override computed by the scale resolver each tick. While any scale entry
/// is active, the override replaces the base rather than compounding with it.
#[derive(Debug, Clone)]
pub struct TickClock {
    tick: u64,
    fixed_delta: f64,
    base_speed: f64,
    scheduled_scale: Option<f64>,
    paused: bool,
}

impl TickClock {
    /// Create a clock at tick 0 with the configured fixed delta and default
    /// speed.
    pub fn new(config: &TimeConfig) -> Self {
        Self {
            tick: 0,
            fixed_delta: config.fixed_delta,
            base_speed: config.default_scale,
            scheduled_scale: None,
            paused: false,
        }
    }

    /// Current tick number.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulation seconds per tick.
    pub fn fixed_delta(&self) -> f64 {
        self.fixed_delta
    }

    /// The player-set speed multiplier, ignoring any scheduled override.
    pub fn base_speed(&self) -> f64 {
        self.base_speed
    }

    /// The multiplier in force this tick: the scheduled override while one
    /// is active, the player-set base otherwise.
    pub fn current_multiplier(&self) -> f64 {
        self.scheduled_scale.unwrap_or(self.base_speed)
    }

    /// True while the global pause flag is set.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Set the global pause flag.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Clear the global pause flag.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Toggle the global pause flag.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Write the player-set multiplier, clamped into the legal range.
    /// Returns the value actually applied.
    pub fn set_speed(&mut self, requested: f64, config: &TimeConfig, legacy_limits: bool) -> f64 {
        self.base_speed = config.clamp_speed(requested, legacy_limits);
        self.base_speed
    }

    /// Install or clear the scheduled-scale override for this tick.
    pub fn set_scheduled_scale(&mut self, scale: Option<f64>) {
        self.scheduled_scale = scale;
    }

    /// Advance one tick. Only Record mode moves the counter forward, and only
    /// while unpaused; returns whether the counter moved.
    pub fn advance(&mut self, mode: TimeMode) -> bool {
        if mode != TimeMode::Record || self.paused {
            return false;
        }
        self.tick += 1;
        true
    }

    /// Seek the counter to an arbitrary tick. Reserved for the rewind engine;
    /// gameplay never moves the clock directly.
    pub fn seek(&mut self, tick: u64) {
        self.tick = tick;
    }

    /// The simulation delta an entity experiences this tick.
    ///
    /// Stasis members are frozen regardless of global state. Members of a
    /// Scale bubble run at the bubble's local scale, which replaces the
    /// global multiplier. Everyone else runs at the global multiplier, or not
    /// at all while paused.
    pub fn effective_delta(&self, membership: Option<&BubbleMembership>) -> f64 {
        if let Some(member) = membership {
            match member.mode {
                BubbleMode::Stasis | BubbleMode::Pause => return 0.0,
                BubbleMode::Scale => return self.fixed_delta * member.scale,
                // Rewind-bubble members are driven by their rewind offset,
                // not by forward integration.
                BubbleMode::Rewind => return 0.0,
            }
        }
        if self.paused {
            0.0
        } else {
            self.fixed_delta * self.current_multiplier()
        }
    }

    /// Whether an entity should run its per-tick update at all.
    pub fn should_update(&self, mode: TimeMode, membership: Option<&BubbleMembership>) -> bool {
        if membership.is_some_and(|m| matches!(m.mode, BubbleMode::Stasis)) {
            return false;
        }
        !(self.paused && mode == TimeMode::Record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fermata_core::BubbleId;

    fn member(mode: BubbleMode, scale: f64) -> BubbleMembership {
        BubbleMembership {
            bubble: BubbleId(1),
            mode,
            scale,
        }
    }

    #[test]
    fn clock_initial_state() {
        let clock = TickClock::new(&TimeConfig::default());
        assert_eq!(clock.tick(), 0);
        assert!(!clock.is_paused());
        assert!((clock.current_multiplier() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn advance_only_while_recording_and_unpaused() {
        let mut clock = TickClock::new(&TimeConfig::default());
        assert!(clock.advance(TimeMode::Record));
        assert!(!clock.advance(TimeMode::Rewind));
        assert!(!clock.advance(TimeMode::Playback));
        clock.pause();
        assert!(!clock.advance(TimeMode::Record));
        assert_eq!(clock.tick(), 1);
    }

    #[test]
    fn tick_never_decreases_while_recording() {
        let mut clock = TickClock::new(&TimeConfig::default());
        let mut last = clock.tick();
        for _ in 0..100 {
            clock.advance(TimeMode::Record);
            assert!(clock.tick() >= last);
            last = clock.tick();
        }
    }

    #[test]
    fn stasis_member_always_frozen() {
        let mut clock = TickClock::new(&TimeConfig::default());
        let config = TimeConfig::default();
        clock.set_speed(8.0, &config, false);
        let stasis = member(BubbleMode::Stasis, 1.0);
        assert_eq!(clock.effective_delta(Some(&stasis)), 0.0);
        clock.pause();
        assert_eq!(clock.effective_delta(Some(&stasis)), 0.0);
        assert!(!clock.should_update(TimeMode::Record, Some(&stasis)));
    }

    #[test]
    fn bubble_scale_replaces_global_multiplier() {
        let mut clock = TickClock::new(&TimeConfig::default());
        let config = TimeConfig::default();
        clock.set_speed(4.0, &config, false);
        let slowed = member(BubbleMode::Scale, 0.5);
        let delta = clock.effective_delta(Some(&slowed));
        // Local 0.5 replaces the global 4.0; it does not compound to 2.0.
        assert!((delta - clock.fixed_delta() * 0.5).abs() < 1e-12);
    }

    #[test]
    fn global_pause_zeroes_unbubbled_delta() {
        let mut clock = TickClock::new(&TimeConfig::default());
        clock.pause();
        assert_eq!(clock.effective_delta(None), 0.0);
        assert!(!clock.should_update(TimeMode::Record, None));
        // Pause only holds forward recording; scrubbing still updates.
        assert!(clock.should_update(TimeMode::Rewind, None));
    }

    #[test]
    fn scheduled_scale_overrides_base() {
        let mut clock = TickClock::new(&TimeConfig::default());
        let config = TimeConfig::default();
        clock.set_speed(4.0, &config, false);
        clock.set_scheduled_scale(Some(0.25));
        assert!((clock.current_multiplier() - 0.25).abs() < f64::EPSILON);
        clock.set_scheduled_scale(None);
        assert!((clock.current_multiplier() - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn set_speed_clamps() {
        let mut clock = TickClock::new(&TimeConfig::default());
        let config = TimeConfig::default();
        assert!((clock.set_speed(1000.0, &config, false) - 16.0).abs() < f64::EPSILON);
        assert!((clock.set_speed(0.0, &config, false) - 0.01).abs() < f64::EPSILON);
    }
}
