//! PGN import and export.
//!
//! Tag pairs are read with a regex like the rest of our PGN helpers; movetext
//! goes through the recursive-descent [`parser`] so variations, comments and
//! NAGs survive.

mod lexer;
mod parser;
pub mod writer;

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::error::ParseError;
use crate::rules::{RulesEngine, ShakmatyEngine};
use crate::tree::GameTree;

pub use writer::{write_movetext, write_pgn};

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*\[(\w+)\s+"((?:[^"\\]|\\.)*)"\s*\]\s*$"#).expect("tag pattern is valid")
});

/// Bounds applied before and during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    pub max_input_bytes: usize,
    pub max_variation_depth: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_input_bytes: 1024 * 1024,
            max_variation_depth: 128,
        }
    }
}

impl ParseLimits {
    fn check_size(&self, text: &str) -> Result<(), ParseError> {
        if text.len() > self.max_input_bytes {
            return Err(ParseError::InputTooLarge {
                size: text.len(),
                limit: self.max_input_bytes,
            });
        }
        Ok(())
    }
}

/// One game: its tag pairs in input order and its move tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgnGame {
    pub tags: Vec<(String, String)>,
    pub tree: GameTree,
}

impl PgnGame {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.is_empty())
    }
}

/// Parse bare movetext from `starting_position` with the shakmaty engine and default limits.
pub fn parse(move_text: &str, starting_position: &str) -> Result<GameTree, ParseError> {
    parse_movetext_with::<ShakmatyEngine>(move_text, starting_position, &ParseLimits::default())
}

pub fn parse_movetext_with<E: RulesEngine>(
    move_text: &str,
    starting_position: &str,
    limits: &ParseLimits,
) -> Result<GameTree, ParseError> {
    limits.check_size(move_text)?;
    if move_text.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let start = E::from_fen(starting_position).map_err(ParseError::InvalidStartingPosition)?;
    parser::Parser::new(move_text, start, limits).parse()
}

/// Parse a single game with tag pairs. A `FEN` tag sets the starting position.
pub fn parse_pgn(pgn: &str) -> Result<PgnGame, ParseError> {
    parse_pgn_with::<ShakmatyEngine>(pgn, &ParseLimits::default())
}

pub fn parse_pgn_with<E: RulesEngine>(pgn: &str, limits: &ParseLimits) -> Result<PgnGame, ParseError> {
    parse_pgn_from::<E>(pgn, &E::default().starting_position(), limits)
}

/// Like [`parse_pgn_with`], starting from `default_start` when there is no usable `FEN` tag.
pub fn parse_pgn_from<E: RulesEngine>(
    pgn: &str,
    default_start: &str,
    limits: &ParseLimits,
) -> Result<PgnGame, ParseError> {
    limits.check_size(pgn)?;
    let (tags, move_text) = split_tags(pgn);

    let starting_position = match tags.iter().find(|(key, _)| key == "FEN") {
        Some((_, fen)) => match E::from_fen(fen) {
            Ok(engine) => engine.current_position(),
            Err(e) => {
                warn!(error = %e, "Ignoring invalid FEN tag, using the default position");
                default_start.to_string()
            }
        },
        None => default_start.to_string(),
    };

    let tree = parse_movetext_with::<E>(&move_text, &starting_position, limits)?;
    Ok(PgnGame { tags, tree })
}

/// Parse every game in a multi-game PGN, such as an exported study with several chapters.
///
/// Chapters without moves are skipped; the call fails only if none has any.
pub fn parse_study(pgn: &str) -> Result<Vec<PgnGame>, ParseError> {
    parse_study_with::<ShakmatyEngine>(pgn, &ParseLimits::default())
}

pub fn parse_study_with<E: RulesEngine>(
    pgn: &str,
    limits: &ParseLimits,
) -> Result<Vec<PgnGame>, ParseError> {
    parse_study_from::<E>(pgn, &E::default().starting_position(), limits)
}

pub fn parse_study_from<E: RulesEngine>(
    pgn: &str,
    default_start: &str,
    limits: &ParseLimits,
) -> Result<Vec<PgnGame>, ParseError> {
    limits.check_size(pgn)?;

    let mut games = Vec::new();
    let mut last_error = ParseError::EmptyInput;
    for (index, chunk) in split_games(pgn).iter().enumerate() {
        match parse_pgn_from::<E>(chunk, default_start, limits) {
            Ok(game) => games.push(game),
            Err(e @ (ParseError::EmptyInput | ParseError::StructuralParseFailure)) => {
                debug!(chapter = index + 1, error = %e, "Skipping chapter without moves");
                last_error = e;
            }
            Err(e) => return Err(e),
        }
    }

    if games.is_empty() {
        return Err(last_error);
    }
    Ok(games)
}

/// Separate `[Name "value"]` lines from the movetext.
fn split_tags(pgn: &str) -> (Vec<(String, String)>, String) {
    let mut tags = Vec::new();
    let mut move_text = String::new();

    for line in pgn.lines() {
        if let Some(cap) = TAG_RE.captures(line) {
            tags.push((cap[1].to_string(), unescape(&cap[2])));
        } else {
            move_text.push_str(line);
            move_text.push('\n');
        }
    }

    (tags, move_text)
}

fn unescape(value: &str) -> String {
    value.replace("\\\"", "\"").replace("\\\\", "\\")
}

/// A tag line after movetext starts a new game.
fn split_games(pgn: &str) -> Vec<String> {
    let mut games = Vec::new();
    let mut current = String::new();
    let mut seen_move_text = false;

    for line in pgn.lines() {
        let is_tag = TAG_RE.is_match(line);
        if is_tag && seen_move_text {
            games.push(std::mem::take(&mut current));
            seen_move_text = false;
        }
        if !is_tag && !line.trim().is_empty() {
            seen_move_text = true;
        }
        current.push_str(line);
        current.push('\n');
    }

    if !current.trim().is_empty() {
        games.push(current);
    }
    games
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::STANDARD_START_FEN;

    const STUDY: &str = r#"[Event "Study: Chapter 1"]
[White "Player1"]
[Black "Player2"]
[Result "1-0"]

1. e4 e5 2. Nf3 Nc6 1-0

[Event "Study: Chapter 2"]
[SetUp "1"]
[FEN "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1"]

1. e4 Kd7 *
"#;

    #[test]
    fn test_parse_pgn_basic() {
        let game = parse_pgn(
            r#"[White "Player1"]
[Black "Player2"]
[Result "1-0"]
[Date "2025.01.15"]

1. e4 e5 2. Nf3 Nc6 1-0"#,
        )
        .unwrap();
        assert_eq!(game.header("White"), Some("Player1"));
        assert_eq!(game.header("Date"), Some("2025.01.15"));
        assert_eq!(game.header("Missing"), None);
        assert_eq!(game.tree.main_line.sans(), vec!["e4", "e5", "Nf3", "Nc6"]);
        assert_eq!(game.tree.result.as_deref(), Some("1-0"));
    }

    #[test]
    fn test_fen_tag_sets_starting_position() {
        let game = parse_pgn("[FEN \"4k3/8/8/8/8/8/4P3/4K3 w - - 0 1\"]\n\n1. e4 Kd7").unwrap();
        assert_eq!(game.tree.starting_position, "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1");
        assert!(game.tree.main_line.iter().all(|node| node.is_verified()));
    }

    #[test]
    fn test_invalid_fen_tag_falls_back_to_initial_position() {
        let game = parse_pgn("[FEN \"garbage\"]\n1. e4").unwrap();
        assert_eq!(game.tree.starting_position, STANDARD_START_FEN);
        assert!(game.tree.main_line.get(0).unwrap().is_verified());
    }

    #[test]
    fn test_default_start_without_fen_tag() {
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
        let game = parse_pgn_from::<ShakmatyEngine>("1... e5", fen, &ParseLimits::default()).unwrap();
        assert_eq!(game.tree.starting_position, fen);
        assert!(game.tree.main_line.get(0).unwrap().is_verified());
    }

    #[test]
    fn test_tags_only_is_empty_input() {
        assert_eq!(
            parse_pgn("[Event \"Nothing\"]\n"),
            Err(ParseError::EmptyInput)
        );
    }

    #[test]
    fn test_escaped_tag_value() {
        let game = parse_pgn("[Annotator \"The \\\"Doctor\\\"\"]\n1. d4").unwrap();
        assert_eq!(game.header("Annotator"), Some("The \"Doctor\""));
    }

    #[test]
    fn test_parse_study_splits_chapters() {
        let games = parse_study(STUDY).unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].header("Event"), Some("Study: Chapter 1"));
        assert_eq!(games[1].tree.main_line.sans(), vec!["e4", "Kd7"]);
        assert_eq!(games[1].tree.result.as_deref(), Some("*"));
    }

    #[test]
    fn test_parse_study_skips_empty_chapters() {
        let pgn = "[Event \"Setup only\"]\n[FEN \"4k3/8/8/8/8/8/8/4K3 w - - 0 1\"]\n\n*\n\n[Event \"Real\"]\n\n1. d4 *\n";
        let games = parse_study(pgn).unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].header("Event"), Some("Real"));
    }

    #[test]
    fn test_input_limit() {
        let limits = ParseLimits {
            max_input_bytes: 8,
            ..ParseLimits::default()
        };
        assert_eq!(
            parse_movetext_with::<ShakmatyEngine>("1. e4 e5 2. Nf3", STANDARD_START_FEN, &limits),
            Err(ParseError::InputTooLarge { size: 15, limit: 8 })
        );
    }
}
