use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use fermata_sim::{TimeCommand, TimeEventKind, TimeMode, TimeSystem};

use super::{DemoWorld, advance, print_event_log};

pub fn run(
    ticks: u64,
    seed: u64,
    target: u64,
    playback: u64,
    cancel: bool,
    verbose: bool,
) -> Result<(), String> {
    let mut system = TimeSystem::single_player("demo", seed);
    let mut world = DemoWorld::new();

    advance(&mut system, &mut world, ticks);
    let present = system.clock().tick();

    system.enqueue(TimeCommand::start_rewind(target));
    advance(&mut system, &mut world, 1);
    if system.mode() != TimeMode::Rewind {
        let reason = system
            .events()
            .iter()
            .rev()
            .find_map(|e| match &e.kind {
                TimeEventKind::CommandRejected { reason, .. } => Some(reason.clone()),
                _ => None,
            })
            .unwrap_or_else(|| "rewind rejected".to_string());
        return Err(format!("cannot rewind to tick {target}: {reason}"));
    }

    println!(
        "  {} '{}' {}",
        "Rewind".bold(),
        system.meta().name,
        format!("(present tick {present}, target {target}, seed={seed})").dimmed()
    );
    println!(
        "  scrub cursor at tick {}, restored from snapshot",
        system.clock().tick()
    );

    system.enqueue(TimeCommand::exit_rewind());
    advance(&mut system, &mut world, 1);
    advance(&mut system, &mut world, playback);
    println!(
        "  previewed {} ticks of playback, cursor at tick {}",
        playback,
        system.clock().tick()
    );
    println!();

    if cancel {
        system.enqueue(TimeCommand::cancel_preview());
        advance(&mut system, &mut world, 1);
        println!(
            "  {} returned to tick {}, history intact",
            "CANCELLED".yellow().bold(),
            system.clock().tick()
        );
    } else {
        system.enqueue(TimeCommand::confirm_branch());
        advance(&mut system, &mut world, 1);
        let branch = system.events().iter().rev().find_map(|e| match e.kind {
            TimeEventKind::TimelineBranched {
                at,
                discarded_snapshots,
            } => Some((at, discarded_snapshots)),
            _ => None,
        });
        match branch {
            Some((at, discarded)) => println!(
                "  {} timeline branched at tick {at}, {discarded} snapshots discarded",
                "BRANCHED".magenta().bold()
            ),
            None => return Err("confirm did not branch the timeline".into()),
        }
    }
    println!();

    if verbose {
        print_event_log(&system);
    }

    println!("  {}", "Final State".bold().underline());
    println!();
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["Mode".to_string(), format!("{:?}", system.mode())]);
    table.add_row(vec!["Tick".to_string(), system.clock().tick().to_string()]);
    table.add_row(vec![
        "Snapshots".to_string(),
        system.snapshots().valid_count().to_string(),
    ]);
    table.add_row(vec![
        "Oldest snapshot".to_string(),
        system
            .snapshots()
            .oldest_tick()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string()),
    ]);
    table.add_row(vec![
        "Latest snapshot".to_string(),
        system
            .snapshots()
            .latest_tick()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string()),
    ]);
    println!("{table}");
    Ok(())
}
