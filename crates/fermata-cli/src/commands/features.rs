use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use fermata_core::TimeFeatures;

pub fn run(mode: &str) -> Result<(), String> {
    let features = match mode {
        "single" | "single-player" => TimeFeatures::default_single_player(),
        "server" => TimeFeatures::multiplayer_server(),
        "client" => TimeFeatures::multiplayer_client(),
        other => {
            return Err(format!(
                "unknown mode '{other}' (expected single, server, or client)"
            ));
        }
    };

    println!(
        "  {} {:?}",
        "Capability matrix for".bold(),
        features.simulation_mode
    );
    println!();

    let rows: [(&str, bool); 11] = [
        ("Global rewind", features.enable_global_rewind),
        ("Local bubble rewind", features.enable_local_bubble_rewind),
        ("World snapshots", features.enable_world_snapshots),
        ("Time-scale scheduling", features.enable_time_scale_scheduling),
        ("Global snapshots", features.enable_global_snapshots),
        ("Component history", features.enable_component_history),
        ("Time bubbles", features.enable_time_bubbles),
        ("Local rewind", features.enable_local_rewind),
        ("Stasis", features.enable_stasis),
        (
            "Multiplayer compatibility enforced",
            features.enforce_multiplayer_compatibility,
        ),
        ("Legacy speed limits", features.use_legacy_speed_limits),
    ];

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Capability", "Enabled"]);
    for (name, enabled) in rows {
        let value = if enabled {
            "yes".green().to_string()
        } else {
            "no".red().to_string()
        };
        table.add_row(vec![name.to_string(), value]);
    }
    println!("{table}");
    Ok(())
}
