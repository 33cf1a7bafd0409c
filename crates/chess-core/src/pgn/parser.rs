//! Recursive-descent parser from movetext to a [`GameTree`].
//!
//! One lexer cursor is shared by every level of recursion: a nested call
//! consumes tokens up to and including the `)` that closes its variation.

use tracing::{debug, warn};

use super::lexer::{Lexer, Token};
use super::ParseLimits;
use crate::error::ParseError;
use crate::nag;
use crate::rules::RulesEngine;
use crate::tree::{push_comment, GameTree, MoveNode, VariationLine};

/// A parsed line before it is attached to its owner.
#[derive(Default)]
struct Sequence {
    moves: Vec<MoveNode>,
    /// Comments seen before this line's first move; they belong to the move this line replaces.
    leading_comment: Option<String>,
    /// Alternatives to this line's first move. They live in the same list as the line itself.
    siblings: Vec<VariationLine>,
}

pub(crate) struct Parser<'a, E> {
    lexer: Lexer<'a>,
    max_depth: usize,
    result: Option<String>,
    illegal_moves: usize,
    start: E,
}

impl<'a, E: RulesEngine> Parser<'a, E> {
    pub(crate) fn new(move_text: &'a str, start: E, limits: &ParseLimits) -> Self {
        Self {
            lexer: Lexer::new(move_text),
            max_depth: limits.max_variation_depth,
            result: None,
            illegal_moves: 0,
            start,
        }
    }

    pub(crate) fn parse(mut self) -> Result<GameTree, ParseError> {
        let start = self.start.clone();
        let top = self.parse_sequence(&start, 0)?;

        let mut tree = GameTree::new(start.current_position());
        tree.comment = top.leading_comment;
        tree.main_line = top.moves.into_iter().collect();
        tree.root_variations = top.siblings;
        tree.result = self.result;

        if tree.is_empty() {
            return Err(ParseError::StructuralParseFailure);
        }

        debug!(
            main_line = tree.main_line.len(),
            root_variations = tree.root_variations.len(),
            total_moves = tree.move_count(),
            illegal_moves = self.illegal_moves,
            "Parsed move tree"
        );
        Ok(tree)
    }

    fn parse_sequence(&mut self, parent: &E, depth: usize) -> Result<Sequence, ParseError> {
        let mut engine = parent.clone();
        // Position before the most recent move; variations branch from here.
        let mut before_last: Option<E> = None;
        let mut seq = Sequence::default();

        while let Some(token) = self.lexer.next() {
            match token {
                Token::Move(text) => {
                    let before = engine.clone();
                    seq.moves.push(self.play(&mut engine, text));
                    before_last = Some(before);
                }
                Token::Comment(text) => match seq.moves.last_mut() {
                    Some(last) => last.push_comment(text),
                    None => push_comment(&mut seq.leading_comment, text),
                },
                Token::Nag(raw) => match (nag::parse_dollar(raw), seq.moves.last_mut()) {
                    (Some(code), Some(last)) => last.nags.push(code),
                    (Some(_), None) => debug!(nag = raw, "NAG before any move, dropped"),
                    (None, _) => warn!(nag = raw, "Unreadable NAG, dropped"),
                },
                Token::Open => {
                    if depth >= self.max_depth {
                        return Err(ParseError::VariationTooDeep(self.max_depth));
                    }
                    match before_last.as_ref() {
                        Some(before) => {
                            let before = before.clone();
                            let child = self.parse_sequence(&before, depth + 1)?;
                            attach_variation(&mut seq, child);
                        }
                        None => {
                            warn!("Variation with no preceding move, skipped");
                            self.skip_variation();
                        }
                    }
                }
                Token::Close => {
                    if depth > 0 {
                        break;
                    }
                    warn!("Unmatched ')' in main line, skipped");
                }
                Token::Result(marker) => {
                    if depth == 0 {
                        self.result = Some(marker.to_string());
                    } else {
                        self.skip_variation();
                    }
                    break;
                }
            }
        }

        Ok(seq)
    }

    /// Play one move token; illegal moves are kept as unverified nodes.
    fn play(&mut self, engine: &mut E, text: &str) -> MoveNode {
        let (san, suffix_nag) = nag::split_suffix(text);
        let mut node = match engine.apply_move(san) {
            Ok(result) => MoveNode::verified(result),
            Err(e) => {
                self.illegal_moves += 1;
                warn!(san, error = %e, "Illegal move in PGN, keeping it unverified");
                MoveNode::unverified(san, e.to_string())
            }
        };
        node.nags.extend(suffix_nag);
        node
    }

    /// Consume tokens up to and including the `)` closing the current variation.
    fn skip_variation(&mut self) {
        let mut open = 1usize;
        for token in self.lexer.by_ref() {
            match token {
                Token::Open => open += 1,
                Token::Close => {
                    open -= 1;
                    if open == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }
}

/// Hang a finished variation on the right owner.
///
/// The child is an alternative to the last move of `seq`. With one move in
/// `seq` that is the line's first move, so the child becomes a sibling;
/// otherwise it branches from the move before. Comments that opened the
/// child stay with the move it replaces.
fn attach_variation(seq: &mut Sequence, child: Sequence) {
    let line: VariationLine = child.moves.into_iter().collect();
    let mut lines = Vec::with_capacity(1 + child.siblings.len());
    if !line.is_empty() {
        lines.push(line);
    }
    lines.extend(child.siblings);

    if let (Some(comment), Some(replaced)) = (child.leading_comment, seq.moves.last_mut()) {
        replaced.push_comment(&comment);
    }

    match seq.moves.len() {
        0 => {}
        1 => seq.siblings.extend(lines),
        len => seq.moves[len - 2].variations.extend(lines),
    }
}
