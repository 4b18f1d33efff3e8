pub mod features;
pub mod rewind;
pub mod run;

use colored::Colorize;
use serde::{Deserialize, Serialize};

use fermata_core::{EntityId, Vec3, math};
use fermata_sim::{EntityRecord, SnapshotSource, TimeEventKind, TimeSystem};

/// A small orbital world driven entirely through the time system's query
/// helpers, so pauses, scale entries, bubbles, and rewinds all visibly bend
/// its motion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoWorld {
    pub bodies: Vec<DemoBody>,
}

/// One body on a circular orbit around the origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoBody {
    pub id: u64,
    pub radius: f64,
    pub period_seconds: f64,
    pub phase: f64,
}

impl DemoBody {
    pub fn position(&self) -> Vec3 {
        let angle = self.phase * std::f64::consts::TAU;
        Vec3::new(self.radius * angle.cos(), 0.0, self.radius * angle.sin())
    }
}

impl DemoWorld {
    pub fn new() -> Self {
        let bodies = (1..=4)
            .map(|id| DemoBody {
                id,
                radius: 2.0 * id as f64,
                period_seconds: 10.0 * id as f64,
                phase: 0.0,
            })
            .collect();
        Self { bodies }
    }

    pub fn records(&self) -> Vec<EntityRecord> {
        self.bodies
            .iter()
            .map(|b| EntityRecord::at(EntityId(b.id), b.position()))
            .collect()
    }

    /// Advance each body by the per-entity delta the time system resolved
    /// this tick. Frozen or paused bodies hold their phase.
    pub fn step(&mut self, system: &TimeSystem) {
        for body in &mut self.bodies {
            let entity = EntityId(body.id);
            if !system.should_update(entity) {
                continue;
            }
            let elapsed = system.effective_delta(entity);
            body.phase = math::advance_phase(body.phase, elapsed, body.period_seconds);
        }
    }
}

impl Default for DemoWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotSource for DemoWorld {
    fn capture(&mut self, _tick: u64) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }

    fn restore(&mut self, _tick: u64, data: &[u8]) {
        if let Ok(world) = serde_json::from_slice(data) {
            *self = world;
        }
    }

    fn entity_count(&self) -> u32 {
        self.bodies.len() as u32
    }
}

/// Step the system and the demo world together for `ticks` ticks.
pub fn advance(system: &mut TimeSystem, world: &mut DemoWorld, ticks: u64) {
    for _ in 0..ticks {
        let records = world.records();
        system.tick(&records, world);
        world.step(system);
    }
}

/// Render one diagnostic event line, colored by kind.
pub fn colorize_event(kind: &TimeEventKind, description: &str) -> colored::ColoredString {
    match kind {
        TimeEventKind::CommandRejected { .. } | TimeEventKind::SnapshotCorrupt { .. } => {
            description.red()
        }
        TimeEventKind::TimelineBranched { .. } | TimeEventKind::ModeChanged { .. } => {
            description.magenta().bold()
        }
        TimeEventKind::SnapshotRecorded { .. } | TimeEventKind::SnapshotRestored { .. } => {
            description.blue()
        }
        TimeEventKind::SpeedChanged { .. }
        | TimeEventKind::PauseToggled { .. }
        | TimeEventKind::RewindChargeChanged { .. } => description.cyan(),
        TimeEventKind::BubbleCreated { .. }
        | TimeEventKind::BubbleDestroyed { .. }
        | TimeEventKind::EnteredBubble { .. }
        | TimeEventKind::LeftBubble { .. } => description.yellow(),
        TimeEventKind::ScaleEntryAdded { .. } | TimeEventKind::ScaleEntryExpired { .. } => {
            description.normal()
        }
    }
}

/// Print the full event log in tick order.
pub fn print_event_log(system: &TimeSystem) {
    println!("  {}", "Event Log".bold().underline());
    println!();
    let mut any = false;
    for event in system.events().iter() {
        any = true;
        let tick_label = format!("[tick {:>4}]", event.tick).dimmed();
        let desc = colorize_event(&event.kind, &event.description);
        println!("  {tick_label} {desc}");
    }
    if !any {
        println!("  {}", "(no events)".dimmed());
    }
    println!();
}
