use std::{
    env,
    fs::{self, File},
    io::{self, BufRead},
    path::PathBuf,
    str::FromStr,
};

use anyhow::{Context, Result};
use bejola::Game;
use bejola_engine::search::format_line;
use bejola_engine::{
    Board, EngineConfig, ReplacementPolicy, SearchContext, TranspositionTable, perft, perft_full,
};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use tracing::{Level, debug, level_filters::LevelFilter};
use tracing_subscriber::{Registry, layer::SubscriberExt, prelude::*, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Plies searched for each computer move.
    #[arg(long, default_value_t = 4)]
    depth: i32,

    /// Transposition table slots per tier.
    #[arg(long, default_value_t = 251_611)]
    hash_size: usize,

    /// Use a single always-replace cache tier.
    #[arg(long)]
    always_replace: bool,

    /// Search without a transposition table.
    #[arg(long)]
    no_cache: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl Cli {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            search_depth: self.depth,
            hash_size: self.hash_size,
            replacement: if self.always_replace {
                ReplacementPolicy::AlwaysReplace
            } else {
                ReplacementPolicy::TwoTier
            },
            use_cache: !self.no_cache,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search a position for the best move.
    Search { fen: String, depth: i32 },
    Perft {
        fen: String,
        depth: usize,
        /// Tally move kinds at every depth instead of splitting by root move.
        #[arg(long)]
        full: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    enable_logging()?;

    let config = cli.engine_config();
    match cli.command {
        Some(Commands::Search { fen, depth }) => cli_search(&fen, depth, &config),
        Some(Commands::Perft { fen, depth, full }) => cli_perft(&fen, depth, full),
        None => command_loop(config),
    }
}

fn cli_search(fen: &str, depth: i32, config: &EngineConfig) -> Result<()> {
    let mut board =
        Board::from_fen(fen).with_context(|| format!("Couldn't parse given fen: `{}`", fen))?;
    let mut cache = TranspositionTable::from_config(config);
    let result = SearchContext::new(&mut cache).iterative_deepening(&mut board, depth, &[])?;

    for report in &result.iterations {
        println!("{}", report);
    }
    println!("best move: {}", result.best_move);
    println!("score: {}", result.score);
    println!("line: {}", format_line(&result.line));
    Ok(())
}

fn cli_perft(fen: &str, depth: usize, full: bool) -> Result<()> {
    let mut board =
        Board::from_fen(fen).with_context(|| format!("Couldn't parse given fen: `{}`", fen))?;
    if full {
        print!("{}", perft_full(&mut board, depth));
        return Ok(());
    }

    let (move_counts, tot_moves) = perft(&mut board, depth);
    for (mve, move_nodes) in move_counts.into_iter() {
        println!("{}:  {}", mve, move_nodes);
    }
    println!("Total: {}", tot_moves);
    Ok(())
}

fn command_loop(config: EngineConfig) -> Result<()> {
    let mut game = Game::new(config);

    for line in io::stdin().lock().lines() {
        let line = line.context("Couldn't read from stdin")?;
        let reply = game.handle_line(&line);
        for out in &reply.lines {
            println!("{}", out);
        }
        if reply.quit {
            debug!("quitting");
            break;
        }
    }
    Ok(())
}

fn enable_logging() -> Result<()> {
    let log_path = if let Ok(log_path_str) = env::var("BEJOLA_LOG_PATH") {
        PathBuf::from_str(&log_path_str)?
    } else {
        let log_path = get_default_log_path()?;
        if let Some(log_path_dir) = log_path.parent() {
            fs::create_dir_all(log_path_dir)
                .with_context(|| format!("Couldn't create directory {:?}", log_path_dir))?;
        }
        log_path
    };

    let log_file =
        File::create(&log_path).with_context(|| format!("Couldn't create file {:?}", log_path))?;

    let stderr_layer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_level(false)
        .with_target(false)
        .with_writer(io::stderr)
        .with_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        );

    let log_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_ansi(false)
        .with_filter(LevelFilter::from_level(Level::DEBUG));

    Registry::default().with(stderr_layer).with(log_layer).init();

    Ok(())
}

fn get_default_log_path() -> Result<PathBuf> {
    let mut log_path = dirs::home_dir().context("Home directory not set")?;
    log_path.push(".local/state/bejola/bejola.log");
    Ok(log_path)
}
