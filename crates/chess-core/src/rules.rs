//! Boundary to the chess rules engine.
//!
//! The parser and navigator never inspect board state themselves: they hand
//! move text to a [`RulesEngine`] and record what comes back. [`ShakmatyEngine`]
//! is the production implementation.

use serde::{Deserialize, Serialize};
use shakmaty::fen::Fen;
use shakmaty::san::{San, SanPlus};
use shakmaty::{CastlingMode, Chess, EnPassantMode, File, Move, Position, Role, Square};

use crate::error::RulesError;

pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Everything the engine reports about a successfully applied move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveResult {
    /// Canonical SAN, including a `+` or `#` suffix.
    pub san: String,
    pub from: String,
    pub to: String,
    pub piece: char,
    pub captured: Option<char>,
    pub promotion: Option<char>,
    /// chess.js style flags: n, b, e, c, p, k, q.
    pub flags: String,
    /// Position after the move.
    pub fen: String,
}

/// Capability the move-tree engine needs from a chess implementation.
pub trait RulesEngine: Clone + Default {
    /// Replace the current position with the one described by `fen`.
    fn load_position(&mut self, fen: &str) -> Result<(), RulesError>;

    /// Current position as FEN.
    fn current_position(&self) -> String;

    /// The standard initial position as FEN.
    fn starting_position(&self) -> String {
        STANDARD_START_FEN.to_string()
    }

    /// Validate `text` against the current position and play it.
    /// On error the position is left untouched.
    fn apply_move(&mut self, text: &str) -> Result<MoveResult, RulesError>;

    /// Build an engine already positioned at `fen`.
    fn from_fen(fen: &str) -> Result<Self, RulesError> {
        let mut engine = Self::default();
        engine.load_position(fen)?;
        Ok(engine)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ShakmatyEngine {
    pos: Chess,
}

impl RulesEngine for ShakmatyEngine {
    fn load_position(&mut self, fen: &str) -> Result<(), RulesError> {
        let invalid = |reason: String| RulesError::InvalidFen {
            fen: fen.to_string(),
            reason,
        };
        let parsed: Fen = fen.trim().parse().map_err(|e| invalid(format!("{e}")))?;
        self.pos = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| invalid(format!("{e}")))?;
        Ok(())
    }

    fn current_position(&self) -> String {
        Fen::from_position(&self.pos, EnPassantMode::Legal).to_string()
    }

    fn apply_move(&mut self, text: &str) -> Result<MoveResult, RulesError> {
        let normalized = normalize_san(text);
        let illegal = |reason: String| RulesError::IllegalMove {
            san: text.to_string(),
            reason,
        };

        let san_plus: SanPlus = normalized.parse().map_err(|e| illegal(format!("{e}")))?;
        let mv = san_plus
            .san
            .to_move(&self.pos)
            .map_err(|e| illegal(format!("{e}")))?;

        let mut san = San::from_move(&self.pos, mv.clone()).to_string();
        let (from, to) = move_squares(&mv);
        let flags = move_flags(&mv, from, to);

        self.pos.play_unchecked(mv.clone());
        if self.pos.is_checkmate() {
            san.push('#');
        } else if self.pos.is_check() {
            san.push('+');
        }

        Ok(MoveResult {
            san,
            from: from.to_string(),
            to: to.to_string(),
            piece: mv.role().char(),
            captured: mv.capture().map(Role::char),
            promotion: mv.promotion().map(Role::char),
            flags,
            fen: self.current_position(),
        })
    }
}

/// Castling written with zeros is common in hand-typed studies.
fn normalize_san(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.trim_end_matches(['+', '#']) {
        "0-0" => trimmed.replacen("0-0", "O-O", 1),
        "0-0-0" => trimmed.replacen("0-0-0", "O-O-O", 1),
        _ => trimmed.to_string(),
    }
}

/// Origin and destination as a human would click them (king destination for castling).
fn move_squares(mv: &Move) -> (Square, Square) {
    match mv {
        Move::Castle { king, rook } => {
            let file = if rook.file() > king.file() { File::G } else { File::C };
            (*king, Square::from_coords(file, king.rank()))
        }
        _ => (mv.from().unwrap_or(mv.to()), mv.to()),
    }
}

fn move_flags(mv: &Move, from: Square, to: Square) -> String {
    let mut flags = String::new();
    match mv {
        Move::Castle { .. } => flags.push(if to.file() == File::G { 'k' } else { 'q' }),
        Move::EnPassant { .. } => flags.push('e'),
        _ => {
            if mv.is_capture() {
                flags.push('c');
            }
            if mv.role() == Role::Pawn && (from.rank() as i32 - to.rank() as i32).abs() == 2 {
                flags.push('b');
            }
            if mv.is_promotion() {
                flags.push('p');
            }
            if flags.is_empty() {
                flags.push('n');
            }
        }
    }
    flags
}
