//! CLI frontend for the Fermata time-control simulation.

mod commands;

use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "fermata",
    about = "Fermata — deterministic time control for fixed-tick simulations",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the demo world forward and report the time-control state
    Run {
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "300")]
        ticks: u64,

        /// RNG seed for deterministic simulation
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Global speed multiplier applied at tick 0
        #[arg(long, default_value = "1.0")]
        speed: f64,

        /// Toggle pause at this tick
        #[arg(long)]
        pause_at: Option<u64>,

        /// Spawn a half-speed time bubble around the origin
        #[arg(short, long)]
        bubble: bool,

        /// Schedule a slow field at this scale over the middle third of the run
        #[arg(long)]
        slow_field: Option<f64>,

        /// Show the full event log
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run forward, rewind to a target tick, preview, and branch or cancel
    Rewind {
        /// Number of ticks to simulate before rewinding
        #[arg(short, long, default_value = "300")]
        ticks: u64,

        /// RNG seed for deterministic simulation
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Tick to rewind to
        #[arg(long)]
        target: u64,

        /// Ticks of playback preview before committing
        #[arg(long, default_value = "30")]
        playback: u64,

        /// Discard the preview instead of branching the timeline
        #[arg(long)]
        cancel: bool,

        /// Show the full event log
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show the time-control capability matrix for a simulation mode
    Features {
        /// Simulation mode: single, server, or client
        #[arg(default_value = "single")]
        mode: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            ticks,
            seed,
            speed,
            pause_at,
            bubble,
            slow_field,
            verbose,
        } => commands::run::run(ticks, seed, speed, pause_at, bubble, slow_field, verbose),
        Commands::Rewind {
            ticks,
            seed,
            target,
            playback,
            cancel,
            verbose,
        } => commands::rewind::run(ticks, seed, target, playback, cancel, verbose),
        Commands::Features { mode } => commands::features::run(&mode),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
