//! Headless Battle Runner
//!
//! Autopilots one battle and prints the post-battle report.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use hexmech::battle::{
    BattleOutcome, HostileCount, MissionParams, ProceduralFactory, Roster, TracingSink,
    TurnScheduler,
};
use hexmech::core::{BattleConfig, SeededRng};

/// Headless Battle Runner - autopilot a battle and report the result
#[derive(Parser, Debug)]
#[command(name = "battle_runner")]
#[command(about = "Run a seeded battle with AI on both sides and report the outcome")]
struct Args {
    /// Battle config TOML (built-in defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Player roster TOML (standard lance when omitted)
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Fewest hostiles to field
    #[arg(long, default_value_t = 2)]
    hostiles_min: u32,

    /// Most hostiles to field
    #[arg(long, default_value_t = 4)]
    hostiles_max: u32,

    /// Rounds before the battle is left undecided
    #[arg(long, default_value_t = 100)]
    max_rounds: u32,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Log every turn, move, and attack roll
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let default_level = if args.verbose { "hexmech=debug" } else { "hexmech=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => BattleConfig::load(path)?,
        None => BattleConfig::default(),
    };
    let roster = match &args.roster {
        Some(path) => Roster::load(path)?,
        None => Roster::standard_lance(),
    };
    let hostiles = if args.hostiles_min >= args.hostiles_max {
        HostileCount::Exact(args.hostiles_min)
    } else {
        HostileCount::Range {
            min: args.hostiles_min,
            max: args.hostiles_max,
        }
    };
    let mission = MissionParams::new(hostiles);

    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!("Running battle with seed {}", seed);

    let mut battle = TurnScheduler::new(
        config,
        &roster,
        &mission,
        &mut ProceduralFactory,
        TracingSink,
        SeededRng::new(seed),
    )?;
    let outcome = battle.run_autopilot(args.max_rounds)?;
    let report = battle.report();

    match args.format.as_str() {
        "text" => {
            println!("Battle Result");
            println!("=============");
            println!("Outcome: {:?}", outcome);
            println!("Rounds: {}", report.rounds);
            println!("Seed: {}", seed);
            println!();
            for unit in &report.units {
                println!(
                    "  {} {:<12} {:<8} {:>3}/{:<3} {}",
                    unit.id,
                    unit.name,
                    unit.side.label(),
                    unit.health,
                    unit.max_health,
                    if unit.destroyed { "destroyed" } else { "" }
                );
            }
            println!();
            println!("Casualties: {}", report.casualties.len());
            println!("Salvage: {}", report.salvage.len());
        }
        other => {
            if other != "json" {
                eprintln!("Unknown format '{}', defaulting to json", other);
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    if outcome == BattleOutcome::Undecided {
        tracing::info!("No decision after {} rounds", args.max_rounds);
    }
    Ok(())
}
