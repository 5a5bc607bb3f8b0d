//! Arena CLI
//!
//! Play a series of games between two engines from the registry.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use arena::{
    run_stamp, setup_logger, ClientConfig, EngineClient, EngineRegistry, EngineSpec,
    GameRecordWriter, MatchRunner, MatchSummary, PlayOptions, ResourceConfig,
};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "reversi_arena", version, about = "Referee matches between NBoard reversi engines")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play games between two engines, alternating colors
    Play(PlayArgs),
}

#[derive(Args, Debug)]
struct PlayArgs {
    /// First engine as name[:depth]; plays black in odd games
    engine1: EngineSpec,

    /// Second engine as name[:depth]
    engine2: EngineSpec,

    /// Number of games
    #[arg(short = 'n', long = "games", default_value_t = 1)]
    n_play: u32,

    /// Engine registry file (default: <project>/engines.toml)
    #[arg(short = 'c', long = "config")]
    registry: Option<PathBuf>,

    /// Debug logging, including all engine traffic
    #[arg(short, long)]
    verbose: bool,

    /// Seconds an engine may take to answer a ping; 0 waits forever
    #[arg(long, default_value_t = 30)]
    ping_timeout: u64,

    /// Seconds an engine may think about one move (default: no limit)
    #[arg(long)]
    move_timeout: Option<u64>,
}

impl PlayArgs {
    fn client_config(&self) -> ClientConfig {
        ClientConfig {
            ping_timeout: (self.ping_timeout > 0).then(|| Duration::from_secs(self.ping_timeout)),
            move_timeout: self.move_timeout.map(Duration::from_secs),
            ..ClientConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Play(args) => play(args).await,
    }
}

async fn play(args: PlayArgs) -> Result<()> {
    let mut resources = ResourceConfig::from_env();
    if let Some(path) = &args.registry {
        resources = resources.with_engine_def_path(path);
    }
    resources.create_directories().with_context(|| {
        format!("failed to create directories under {}", resources.project_dir.display())
    })?;
    setup_logger(&resources.main_log_path, args.verbose).context("failed to set up logging")?;

    let registry = EngineRegistry::load(&resources.engine_def_path)
        .with_context(|| format!("failed to load {}", resources.engine_def_path.display()))?;
    let options = PlayOptions {
        n_play: args.n_play,
        engine1: args.engine1.clone(),
        engine2: args.engine2.clone(),
    };
    for spec in [&options.engine1, &options.engine2] {
        registry
            .get(&spec.name)
            .with_context(|| format!("known engines: {}", registry.names().join(", ")))?;
    }

    let registry = Arc::new(registry);
    let client_config = args.client_config();
    let players = [
        EngineClient::new(options.engine1.clone(), Arc::clone(&registry), client_config.clone()),
        EngineClient::new(options.engine2.clone(), registry, client_config),
    ];

    let started = Local::now();
    let records = GameRecordWriter::for_run(&resources.ggf_dir, started);
    info!(
        "{} vs {}, {} game(s), recording to {}",
        options.engine1,
        options.engine2,
        options.n_play,
        records.path().display()
    );

    let mut runner = MatchRunner::new(players, options.n_play, records);
    let finished = tokio::select! {
        result = runner.run() => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };
    let result = match finished {
        Some(result) => result,
        None => {
            warn!("interrupted, stopping engines");
            runner.shutdown().await;
            Ok(())
        }
    };

    let summary = runner.summary();
    let summary_path = resources.ggf_dir.join(format!("{}.json", run_stamp(started)));
    let json = serde_json::to_string_pretty(&summary)?;
    std::fs::write(&summary_path, json)
        .with_context(|| format!("failed to write {}", summary_path.display()))?;

    print_report(&summary);
    result.context("match aborted")
}

fn print_report(summary: &MatchSummary) {
    println!();
    println!("=== Final Result ===");
    println!(
        "Games: {} played, {} aborted, {} requested",
        summary.games_played, summary.games_aborted, summary.games_requested
    );
    for player in &summary.players {
        println!(
            "{:<20} {:<20} {}  Score: {:.1}%",
            player.label,
            player.name,
            player.stats,
            player.stats.score() * 100.0
        );
    }
    println!("Records: {}", summary.record_file.display());
}
