//! Core types for Fermata: identifiers, time math, bubble geometry, and
//! feature flags.
//!
//! This crate defines the data model shared by the time-control systems in
//! `fermata-sim` and their consumers. Everything here is a plain value type:
//! no system state, no tick loop, no I/O. All operations are total — malformed
//! input degrades (clamped speed, non-containing degenerate volume) rather
//! than faulting, so callers never need to guard a call into this crate.

/// Feature flags gating time-control capabilities per simulation mode.
pub mod features;
/// Identifier newtypes for entities, bubbles, scale entries, and players.
pub mod id;
/// Vector math, tick/seconds conversions, and cyclic phase helpers.
pub mod math;
/// Deterministic seed derivation for tick-scoped randomness.
pub mod seed;
/// Session metadata created at simulation start.
pub mod session;
/// Time bubble volume shapes and containment tests.
pub mod volume;

/// Re-export feature flag types.
pub use features::{SimulationMode, TimeFeatures};
/// Re-export identifier types.
pub use id::{BubbleId, EntityId, EntryId, PlayerId};
/// Re-export the vector type.
pub use math::Vec3;
/// Re-export the seed function.
pub use seed::deterministic_seed;
/// Re-export session metadata.
pub use session::SessionMeta;
/// Re-export volume types.
pub use volume::{BubbleShape, BubbleVolume};
