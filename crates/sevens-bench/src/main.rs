use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};

use sevens_bench::advisor::Advisor;
use sevens_bench::config::{ResolvedOutputs, TrainingConfig};
use sevens_bench::logging::{init_console_logging, init_logging};
use sevens_bench::simulate::Simulation;
use sevens_bench::trainer::Trainer;
use sevens_bot::{BotDifficulty, HeuristicPolicy, WeightTable};
use sevens_core::model::deck::MAX_SEATS;

/// Weight search, simulation and play advice for Sevens bots.
#[derive(Debug, Parser)]
#[command(
    name = "sevens-bench",
    author,
    version,
    about = "Deterministic Sevens bot harness"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Hill-climb the weighted tier's scores against fixed opponents.
    Train(TrainArgs),
    /// Play seeded games between fixed difficulties and report per-seat results.
    Play(PlayArgs),
    /// Interactive advice for a game played elsewhere.
    Advise(AdviseArgs),
}

#[derive(Debug, Args)]
struct TrainArgs {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/train.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of search iterations.
    #[arg(long, value_name = "COUNT")]
    iterations: Option<usize>,

    /// Override the number of games per iteration.
    #[arg(long, value_name = "COUNT")]
    trials: Option<usize>,

    /// Override the search seed.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Exit after validating the configuration (no search is run).
    #[arg(long)]
    validate_only: bool,
}

#[derive(Debug, Args)]
struct PlayArgs {
    /// Number of games to play.
    #[arg(long, default_value_t = 100)]
    games: usize,

    /// Seed for deals and bot choices.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Difficulty per seat, comma separated (0-3 or a name).
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = vec![
            BotDifficulty::Random,
            BotDifficulty::Random,
            BotDifficulty::Random,
            BotDifficulty::Weighted,
        ]
    )]
    levels: Vec<BotDifficulty>,

    /// Weights JSON for weighted seats.
    #[arg(long, value_name = "FILE")]
    weights: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct AdviseArgs {
    /// Bot difficulty; defaults to SEVENS_BOT_DIFFICULTY or blocking.
    #[arg(long)]
    level: Option<BotDifficulty>,

    /// Weights JSON for the weighted level.
    #[arg(long, value_name = "FILE")]
    weights: Option<PathBuf>,

    /// Seed for the random level.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Train(args) => train(args),
        Command::Play(args) => play(args),
        Command::Advise(args) => advise(args),
    }
}

fn train(args: TrainArgs) -> anyhow::Result<()> {
    let mut config = TrainingConfig::from_path(&args.config)?;

    if let Some(run_id) = args.run_id {
        config.run_id = run_id;
    }

    if let Some(iterations) = args.iterations {
        config.search.iterations = iterations;
    }

    if let Some(trials) = args.trials {
        config.search.trials = trials;
    }

    if let Some(seed) = args.seed {
        config.search.seed = Some(seed);
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let iterations = config.search.iterations;
    let trials = config.search.trials;

    println!(
        "Loaded configuration '{run_id}' ({iterations} iterations × {trials} trials, learner at seat {})",
        config.table.learner_seat
    );

    let logging_guard = init_logging(&config.logging, &outputs.summary_dir())?;
    let trainer = Trainer::new(config, outputs)?;

    if args.validate_only {
        println!("Validation-only mode: search skipped.");
        return Ok(());
    }

    let summary = trainer.run()?;
    println!(
        "Search complete for '{run_id}': {} iterations, {} accepted, best {} / {trials} wins → {} rows at {}",
        summary.iterations_run,
        summary.accepted,
        summary.best_wins,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Weights: {}", summary.weights_path.display());
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }

    Ok(())
}

fn play(args: PlayArgs) -> anyhow::Result<()> {
    init_console_logging();

    if !(2..=MAX_SEATS).contains(&args.levels.len()) {
        bail!(
            "--levels needs between 2 and {MAX_SEATS} seats, got {}",
            args.levels.len()
        );
    }

    let mut simulation = Simulation::new(args.levels.clone(), args.games, args.seed);
    if let Some(path) = args.weights.as_ref() {
        let weights = WeightTable::from_file(path)
            .with_context(|| format!("loading weights from {}", path.display()))?;
        simulation = simulation.with_weights(weights);
    }

    let summary = simulation.run()?;
    println!("Played {} games (seed {})", summary.games, args.seed);
    for stats in &summary.seats {
        let Some(rate) = summary.win_rate(stats.seat)? else {
            continue;
        };
        println!(
            "  seat {} ({}): {} wins ({:.1}%, 95% CI [{:.1}%, {:.1}%]), avg hand value {:.2}",
            stats.seat,
            stats.difficulty,
            stats.wins,
            rate.rate * 100.0,
            rate.ci95.0 * 100.0,
            rate.ci95.1 * 100.0,
            stats.average_hand_value(summary.games)
        );
    }
    if summary.stalls > 0 {
        println!("  {} games stalled without a winner", summary.stalls);
    }

    Ok(())
}

fn advise(args: AdviseArgs) -> anyhow::Result<()> {
    init_console_logging();

    let difficulty = args.level.unwrap_or_else(BotDifficulty::from_env);
    let mut policy = HeuristicPolicy::new(difficulty);
    if let Some(seed) = args.seed {
        policy = policy.with_seed(seed);
    }
    if let Some(path) = args.weights.as_ref() {
        let weights = WeightTable::from_file(path)
            .with_context(|| format!("loading weights from {}", path.display()))?;
        policy = policy.with_scorer(Arc::new(weights));
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut advisor = Advisor::new(stdin.lock(), stdout.lock(), Box::new(policy));
    advisor.run()?;
    Ok(())
}
