//! Deterministic seed derivation for tick-scoped randomness.
//!
//! Rewind playback must reproduce the original forward run bit-for-bit, so no
//! system may draw from a shared stateful RNG whose consumption order could
//! drift between runs. Instead every consumer derives a seed from the tick it
//! is simulating, a per-system salt, and a stream index, and builds a local
//! RNG from that. The derivation is a stateless splitmix64-style mix: pure,
//! call-order independent, and avalanching on every input bit.

fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Derive the seed for randomness scoped to `tick`, distinguished by a
/// per-system `salt` and a `stream` index for systems that need several
/// independent draws within one tick.
pub fn deterministic_seed(tick: u64, salt: u64, stream: u32) -> u64 {
    let mut state = splitmix64(tick);
    state = splitmix64(state ^ salt.wrapping_mul(0x9E37_79B9));
    splitmix64(state ^ u64::from(stream).wrapping_mul(0xC2B2_AE35))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn seed_is_pure() {
        assert_eq!(
            deterministic_seed(100, 5, 0),
            deterministic_seed(100, 5, 0)
        );
    }

    #[test]
    fn seed_distinguishes_each_input() {
        let base = deterministic_seed(100, 5, 0);
        assert_ne!(base, deterministic_seed(101, 5, 0));
        assert_ne!(base, deterministic_seed(100, 6, 0));
        assert_ne!(base, deterministic_seed(100, 5, 1));
    }

    proptest! {
        #[test]
        fn adjacent_ticks_never_collide(tick in 0u64..u64::MAX - 1, salt: u64, stream: u32) {
            prop_assert_ne!(
                deterministic_seed(tick, salt, stream),
                deterministic_seed(tick + 1, salt, stream)
            );
        }

        #[test]
        fn streams_are_independent(tick: u64, salt: u64, stream in 0u32..u32::MAX - 1) {
            prop_assert_ne!(
                deterministic_seed(tick, salt, stream),
                deterministic_seed(tick, salt, stream + 1)
            );
        }
    }
}
