use serde::{Deserialize, Serialize};

/// A position or offset in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vec3 {
    /// East/west component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
    /// North/south component.
    pub z: f64,
}

impl Vec3 {
    /// Construct a vector from its components.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Euclidean distance to another point.
    pub fn distance(self, other: Vec3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Distance in the XZ plane, ignoring the vertical axis.
    pub fn distance_xz(self, other: Vec3) -> f64 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }
}

/// Convert a tick count to seconds at the given fixed delta.
pub fn ticks_to_seconds(ticks: u64, fixed_delta: f64) -> f64 {
    ticks as f64 * fixed_delta
}

/// Convert seconds to a whole tick count at the given fixed delta.
///
/// A non-positive or non-finite delta yields 0 ticks rather than a fault;
/// the round trip `seconds_to_ticks(ticks_to_seconds(n, dt), dt) == n` holds
/// for any positive finite delta.
pub fn seconds_to_ticks(seconds: f64, fixed_delta: f64) -> u64 {
    if fixed_delta <= 0.0 || !fixed_delta.is_finite() {
        return 0;
    }
    let ticks = (seconds / fixed_delta).round();
    if ticks <= 0.0 { 0 } else { ticks as u64 }
}

/// Wrap a cyclic phase into `[0, 1)`.
pub fn wrap_phase(phase: f64) -> f64 {
    let wrapped = phase.rem_euclid(1.0);
    // rem_euclid can return exactly 1.0 for tiny negative inputs.
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}

/// Advance a cyclic phase by an elapsed duration against a full period,
/// wrapping into `[0, 1)`. Used for orbital/diurnal cycles driven by the
/// effective simulation delta. A non-positive period leaves the phase
/// unchanged (wrapped).
pub fn advance_phase(phase: f64, elapsed_seconds: f64, period_seconds: f64) -> f64 {
    if period_seconds <= 0.0 || !period_seconds.is_finite() {
        return wrap_phase(phase);
    }
    wrap_phase(phase + elapsed_seconds / period_seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn distance_basic() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 4.0, 0.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn distance_xz_ignores_y() {
        let a = Vec3::new(0.0, 100.0, 0.0);
        let b = Vec3::new(3.0, -50.0, 4.0);
        assert!((a.distance_xz(b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn seconds_to_ticks_zero_delta() {
        assert_eq!(seconds_to_ticks(10.0, 0.0), 0);
        assert_eq!(seconds_to_ticks(10.0, -1.0), 0);
        assert_eq!(seconds_to_ticks(10.0, f64::NAN), 0);
    }

    #[test]
    fn orbital_phase_one_hour_of_a_day() {
        // One 3600 s step against an 86400 s period, from phase 0.
        let phase = advance_phase(0.0, 3600.0, 86400.0);
        assert!(phase > 0.0 && phase < 0.05, "phase = {phase}");
    }

    #[test]
    fn orbital_phase_wraps_past_one() {
        let phase = advance_phase(0.99, 3600.0, 86400.0);
        assert!((0.0..1.0).contains(&phase), "phase = {phase}");
        // 0.99 + 1/24 wraps just past zero.
        assert!(phase < 0.99);
    }

    #[test]
    fn wrap_phase_negative_input() {
        let phase = wrap_phase(-0.25);
        assert!((phase - 0.75).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn tick_seconds_round_trip(ticks in 0u64..1_000_000, delta in 0.001f64..10.0) {
            let seconds = ticks_to_seconds(ticks, delta);
            prop_assert_eq!(seconds_to_ticks(seconds, delta), ticks);
        }

        #[test]
        fn phase_always_in_unit_interval(
            phase in -100.0f64..100.0,
            elapsed in 0.0f64..1_000_000.0,
            period in 1.0f64..1_000_000.0,
        ) {
            let next = advance_phase(phase, elapsed, period);
            prop_assert!((0.0..1.0).contains(&next));
        }
    }
}
