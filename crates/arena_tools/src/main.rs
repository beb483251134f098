//! Arena development tools.

use std::path::PathBuf;

use arena_tools::simulate::{self, SimulationOptions};
use arena_tools::validate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "arena-tools")]
#[command(about = "Development tools for the arena combat core")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate data files
    Validate {
        /// Path to data directory
        #[arg(default_value = "assets/data")]
        path: PathBuf,
    },
    /// Run a headless arena and print an event tally
    Simulate {
        /// Path to data directory
        #[arg(long, default_value = "assets/data")]
        data: PathBuf,
        /// RNG seed
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Frames to run
        #[arg(long, default_value_t = 600)]
        ticks: u64,
        /// Frame length in milliseconds
        #[arg(long, default_value_t = 16)]
        delta: u32,
        /// Enemies to spawn
        #[arg(long, default_value_t = 20)]
        enemies: u32,
        /// Enemy key
        #[arg(long, default_value = "enemy_slime")]
        enemy: String,
        /// Weapon keys to equip (repeatable)
        #[arg(long = "weapon", default_value = "weapon_sword")]
        weapons: Vec<String>,
        /// Boss key to spawn alongside the ring
        #[arg(long)]
        boss: Option<String>,
    },
}

fn run(command: Commands) -> arena_tools::Result<()> {
    match command {
        Commands::Validate { path } => {
            tracing::info!("Validating data files in: {}", path.display());
            validate::validate_data_directory(&path)
        }
        Commands::Simulate {
            data,
            seed,
            ticks,
            delta,
            enemies,
            enemy,
            weapons,
            boss,
        } => {
            let config = validate::load_arena_config(&data)?;
            let content = validate::load_content(&data)?;
            let options = SimulationOptions {
                seed,
                ticks,
                delta_ms: delta,
                enemies,
                enemy,
                weapons,
                boss,
            };
            let report = simulate::run(config, content, &options);
            print!("{report}");
            Ok(())
        }
    }
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
