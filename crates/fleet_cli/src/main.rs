use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use fleet_control::{CommandCenter, DirectNavigator, Task};
use fleet_core::{GameSnapshot, Intent};
use fleet_world::{advance_drill, generate_map, load_replay, validate_snapshot};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "fleet_cli", about = "Fleet decision-engine drill CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay recorded snapshots (or a generated drill map) through the
    /// controller and print each round's intents.
    Run {
        /// JSON array of per-round snapshots to replay.
        #[arg(long)]
        replay: Option<String>,
        /// RNG seed; also generates the drill map when no replay is given.
        #[arg(long)]
        seed: Option<u64>,
        /// Rounds to run in drill mode (replays run their full length).
        #[arg(long, default_value_t = 100)]
        rounds: u64,
        /// Print only the intent JSON lines, no per-round summary.
        #[arg(long)]
        quiet: bool,
    },
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

fn run(replay: Option<String>, seed: Option<u64>, rounds: u64, quiet: bool) -> Result<()> {
    let mut commander = CommandCenter::new();
    let navigator = DirectNavigator;

    if let Some(path) = replay {
        let snapshots = load_replay(std::path::Path::new(&path))?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed_or_random(seed));
        println!("Replaying {} rounds from {path}", snapshots.len());
        for snapshot in &snapshots {
            validate_snapshot(snapshot);
            let intents = commander.plan_round(snapshot, &navigator, &mut rng);
            emit_round(&commander, snapshot, &intents, quiet)?;
        }
        return Ok(());
    }

    let resolved_seed = seed_or_random(seed);
    let mut rng = ChaCha8Rng::seed_from_u64(resolved_seed);
    let mut snapshot = generate_map(&mut rng);
    println!(
        "Drill: rounds={rounds} seed={resolved_seed} planets={} ships={}",
        snapshot.planets.len(),
        snapshot.ships.len(),
    );
    println!("{}", "-".repeat(80));

    for _ in 0..rounds {
        let intents = commander.plan_round(&snapshot, &navigator, &mut rng);
        emit_round(&commander, &snapshot, &intents, quiet)?;
        advance_drill(&mut snapshot, &intents);
    }

    println!("{}", "-".repeat(80));
    println!("Done after round {}.", commander.round());
    Ok(())
}

fn seed_or_random(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(rand::random)
}

fn emit_round(
    commander: &CommandCenter,
    snapshot: &GameSnapshot,
    intents: &[Intent],
    quiet: bool,
) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string(intents).context("serializing intents")?
    );
    if !quiet {
        print_status(commander, snapshot, intents);
    }
    Ok(())
}

fn print_status(commander: &CommandCenter, snapshot: &GameSnapshot, intents: &[Intent]) {
    let owned = snapshot
        .planets
        .iter()
        .filter(|p| p.owner == Some(snapshot.my_id))
        .count();

    let mut tasks: Vec<(Task, usize)> = Vec::new();
    for unit in commander.units() {
        match tasks.iter_mut().find(|(task, _)| *task == unit.task) {
            Some((_, count)) => *count += 1,
            None => tasks.push((unit.task, 1)),
        }
    }
    let tasks_str = tasks
        .iter()
        .map(|(task, count)| format!("{task:?}x{count}"))
        .collect::<Vec<_>>()
        .join(" ");

    println!(
        "[round={round:03}]  units={units:2}  owned_planets={owned}  \
         locks={locks}  intents={count:2}  tasks: {tasks_str}",
        round = commander.round(),
        units = commander.units().len(),
        locks = commander.ledger().total_commitments(),
        count = intents.len(),
    );
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            replay,
            seed,
            rounds,
            quiet,
        } => run(replay, seed, rounds, quiet)?,
    }
    Ok(())
}
