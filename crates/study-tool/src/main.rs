//! Study tool
//!
//! Command-line front end for the move-tree engine: inspect a PGN study as
//! JSON, print the position at any point of its tree, play moves into it and
//! re-export it as normalized PGN.

mod config;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chess_core::nag;
use chess_core::pgn::{self, PgnGame};
use chess_core::{write_pgn, PathDescriptor, ShakmatyEngine, StudySession};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "study-tool", version, about = "Inspect and edit annotated PGN studies")]
struct Cli {
    /// Chapter to use when the file holds several games (1-based)
    #[arg(long, global = true, default_value_t = 1)]
    game: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the move tree as JSON
    Parse { file: PathBuf },

    /// Print the position and move history at a point of the tree
    Position {
        file: PathBuf,
        /// Flat path such as `1,0` or `[-1,0,2,1]`; empty for the main line
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        path: PathDescriptor,
        #[arg(long, default_value_t = 0)]
        ply: usize,
    },

    /// Play moves at a point of the tree and print the resulting PGN
    Play {
        file: PathBuf,
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        path: PathDescriptor,
        #[arg(long, default_value_t = 0)]
        ply: usize,
        #[arg(required = true)]
        moves: Vec<String>,
    },

    /// Re-emit every game in the file as normalized PGN
    Export { file: PathBuf },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Command::Parse { file } => {
            let game = load_game(&config, &file, cli.game)?;
            println!("{}", game.tree.to_json()?);
        }
        Command::Position { file, path, ply } => {
            let game = load_game(&config, &file, cli.game)?;
            let position = chess_core::reconstruct(&game.tree, &path, ply);
            if !position.resolved {
                warn!(path = %path, "Path not found, showing the last reachable position");
            }
            println!("{}", position.fen);
            let history: Vec<String> = position
                .history
                .iter()
                .map(|node| {
                    let glyphs: String = node.nags.iter().filter_map(|n| nag::glyph(*n)).collect();
                    format!("{}{glyphs}", node.san)
                })
                .collect();
            println!("{}", history.join(" "));
            for skipped in &position.skipped {
                warn!(index = skipped.index, san = %skipped.san, "Move could not be replayed: {}", skipped.reason);
            }
        }
        Command::Play {
            file,
            path,
            ply,
            moves,
        } => {
            let game = load_game(&config, &file, cli.game)?;
            let mut session = StudySession::new(game.tree).with_limits(config.limits());
            session.go_to(path, ply)?;
            for san in &moves {
                let outcome = session
                    .play(san)
                    .with_context(|| format!("Could not play {san}"))?;
                info!(san = %san, outcome = ?outcome, "Move applied");
            }
            let cursor = session.cursor();
            println!("path {} ply {}", cursor.path, cursor.ply);
            print!("{}", write_pgn(&session.snapshot(), &game.tags));
        }
        Command::Export { file } => {
            let games = load_study(&config, &file)?;
            let exported: Vec<String> = games
                .iter()
                .map(|game| write_pgn(&game.tree, &game.tags))
                .collect();
            print!("{}", exported.join("\n"));
        }
    }

    Ok(())
}

fn load_study(config: &Config, file: &Path) -> anyhow::Result<Vec<PgnGame>> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let games = pgn::parse_study_from::<ShakmatyEngine>(&text, &config.default_fen, &config.limits())
        .with_context(|| format!("Failed to parse {}", file.display()))?;
    info!(games = games.len(), file = %file.display(), "Loaded study");
    Ok(games)
}

fn load_game(config: &Config, file: &Path, number: usize) -> anyhow::Result<PgnGame> {
    let mut games = load_study(config, file)?;
    if number == 0 || number > games.len() {
        bail!("Game {number} not found, the file has {} game(s)", games.len());
    }
    Ok(games.swap_remove(number - 1))
}
