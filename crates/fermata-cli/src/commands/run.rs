use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use fermata_core::{BubbleVolume, Vec3};
use fermata_sim::{CommandSource, ScaleEntrySpec, TimeBubble, TimeCommand, TimeSystem};

use super::{DemoWorld, advance, print_event_log};

#[allow(clippy::too_many_arguments)]
pub fn run(
    ticks: u64,
    seed: u64,
    speed: f64,
    pause_at: Option<u64>,
    bubble: bool,
    slow_field: Option<f64>,
    verbose: bool,
) -> Result<(), String> {
    let mut system = TimeSystem::single_player("demo", seed);
    let mut world = DemoWorld::new();

    if bubble {
        system
            .spawn_bubble(TimeBubble::scaling(
                BubbleVolume::sphere(Vec3::ZERO, 3.0),
                0.5,
            ))
            .map_err(|e| format!("bubble spawn failed: {e}"))?;
    }
    if let Some(scale) = slow_field {
        system
            .add_scale_entry(ScaleEntrySpec {
                source: CommandSource::Ability,
                source_id: 1,
                priority: 10,
                scale,
                is_pause: false,
                start_tick: ticks / 3,
                end_tick: 2 * ticks / 3,
            })
            .map_err(|e| format!("slow field failed: {e}"))?;
    }
    if speed != 1.0 {
        system.enqueue(TimeCommand::set_speed(speed));
    }

    match pause_at {
        Some(at) if at < ticks => {
            advance(&mut system, &mut world, at);
            system.enqueue(TimeCommand::toggle_pause());
            advance(&mut system, &mut world, ticks - at);
        }
        _ => advance(&mut system, &mut world, ticks),
    }

    println!(
        "  {} '{}' {}",
        "Run".bold(),
        system.meta().name,
        format!("({ticks} ticks, seed={seed}, speed={speed}x)").dimmed()
    );
    println!(
        "  tick {} reached, mode {:?}, {} snapshots held, {} events logged",
        system.clock().tick(),
        system.mode(),
        system.snapshots().valid_count(),
        system.events().len()
    );
    if system.clock().is_paused() {
        println!("  {}", "clock is paused".yellow());
    }
    println!();

    if verbose {
        print_event_log(&system);
    }

    println!("  {}", "Orbital Bodies".bold().underline());
    println!();
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Body", "Phase", "Position", "Delta/tick", "In bubble"]);
    for body in &world.bodies {
        let entity = fermata_core::EntityId(body.id);
        let pos = body.position();
        table.add_row(vec![
            entity.to_string(),
            format!("{:.3}", body.phase),
            format!("({:.2}, {:.2}, {:.2})", pos.x, pos.y, pos.z),
            format!("{:.4}s", system.effective_delta(entity)),
            system
                .membership_of(entity)
                .map(|m| m.bubble.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    println!("{table}");
    println!();

    print_snapshot_table(&system);
    Ok(())
}

fn print_snapshot_table(system: &TimeSystem) {
    println!("  {}", "Snapshot Ring".bold().underline());
    println!();
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Tick", "Entities", "Bytes", "Checksum"]);
    for meta in system.snapshots().iter_meta() {
        table.add_row(vec![
            meta.tick.to_string(),
            meta.entity_count.to_string(),
            meta.byte_len.to_string(),
            format!("{:016x}", meta.checksum),
        ]);
    }
    println!("{table}");
}
