//! Move-tree data model.
//!
//! Lines hold their moves behind `Arc`, so cloning a tree is shallow and an
//! edit only copies the nodes along the edited path (see `editor`). Older
//! snapshots handed out to readers are never mutated.
//!
//! A line stored in `line[k].variations` continues from the position after
//! `line[k]`, i.e. it is an alternative to `line[k + 1]`. `root_variations`
//! are alternatives to the first main-line move.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::path::{PathDescriptor, PathStep};
use crate::rules::{MoveResult, STANDARD_START_FEN};

/// Whether the rules engine accepted a move when it was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Verification {
    Verified {
        from: String,
        to: String,
        piece: char,
        captured: Option<char>,
        promotion: Option<char>,
        flags: String,
        fen: String,
    },
    /// Kept as written; hand-annotated studies contain speculative lines.
    Unverified { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveNode {
    pub san: String,
    pub verification: Verification,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nags: Vec<u8>,
    #[serde(default)]
    pub variations: Vec<VariationLine>,
}

impl MoveNode {
    pub fn verified(result: MoveResult) -> Self {
        Self {
            san: result.san,
            verification: Verification::Verified {
                from: result.from,
                to: result.to,
                piece: result.piece,
                captured: result.captured,
                promotion: result.promotion,
                flags: result.flags,
                fen: result.fen,
            },
            comment: None,
            nags: Vec::new(),
            variations: Vec::new(),
        }
    }

    pub fn unverified(san: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            san: san.into(),
            verification: Verification::Unverified {
                reason: reason.into(),
            },
            comment: None,
            nags: Vec::new(),
            variations: Vec::new(),
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self.verification, Verification::Verified { .. })
    }

    /// Position after this move, when the engine verified it.
    pub fn fen(&self) -> Option<&str> {
        match &self.verification {
            Verification::Verified { fen, .. } => Some(fen),
            Verification::Unverified { .. } => None,
        }
    }

    /// Append to the comment, separating consecutive comment blocks with a space.
    pub fn push_comment(&mut self, text: &str) {
        push_comment(&mut self.comment, text);
    }
}

pub(crate) fn push_comment(slot: &mut Option<String>, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    match slot {
        Some(existing) => {
            existing.push(' ');
            existing.push_str(text);
        }
        None => *slot = Some(text.to_string()),
    }
}

/// An ordered sequence of moves. Serialized as a plain array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariationLine {
    pub moves: Vec<Arc<MoveNode>>,
}

impl VariationLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MoveNode> {
        self.moves.get(index).map(Arc::as_ref)
    }

    pub fn push(&mut self, node: MoveNode) {
        self.moves.push(Arc::new(node));
    }

    pub fn iter(&self) -> impl Iterator<Item = &MoveNode> {
        self.moves.iter().map(Arc::as_ref)
    }

    pub fn sans(&self) -> Vec<&str> {
        self.iter().map(|node| node.san.as_str()).collect()
    }

    /// Mutable access to one node, copying it first if a snapshot still shares it.
    pub(crate) fn node_mut(&mut self, index: usize) -> Option<&mut MoveNode> {
        self.moves.get_mut(index).map(Arc::make_mut)
    }
}

impl FromIterator<MoveNode> for VariationLine {
    fn from_iter<I: IntoIterator<Item = MoveNode>>(iter: I) -> Self {
        Self {
            moves: iter.into_iter().map(Arc::new).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameTree {
    /// FEN the main line and root variations start from.
    pub starting_position: String,
    /// Text before the first move, or leading comments with no move to attach to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub main_line: VariationLine,
    #[serde(default)]
    pub root_variations: Vec<VariationLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl Default for GameTree {
    fn default() -> Self {
        Self::new(STANDARD_START_FEN)
    }
}

impl GameTree {
    pub fn new(starting_position: impl Into<String>) -> Self {
        Self {
            starting_position: starting_position.into(),
            comment: None,
            main_line: VariationLine::new(),
            root_variations: Vec::new(),
            result: None,
        }
    }

    /// True when there is neither a main-line move nor a root variation.
    pub fn is_empty(&self) -> bool {
        self.main_line.is_empty() && self.root_variations.is_empty()
    }

    /// Total number of move nodes in every line.
    pub fn move_count(&self) -> usize {
        fn count(line: &VariationLine) -> usize {
            line.iter()
                .map(|node| 1 + node.variations.iter().map(count).sum::<usize>())
                .sum()
        }
        count(&self.main_line) + self.root_variations.iter().map(count).sum::<usize>()
    }

    /// The line addressed by `path`, if every index exists.
    pub fn line(&self, path: &PathDescriptor) -> Option<&VariationLine> {
        let (mut line, rest) = match path.steps().split_first() {
            Some((PathStep::Root { variation }, rest)) => {
                (self.root_variations.get(*variation)?, rest)
            }
            _ => (&self.main_line, path.steps()),
        };

        for step in rest {
            match *step {
                PathStep::Branch {
                    branch_point,
                    variation,
                } => {
                    line = line.get(branch_point)?.variations.get(variation)?;
                }
                PathStep::Root { .. } => return None,
            }
        }
        Some(line)
    }

    pub(crate) fn line_mut(&mut self, path: &PathDescriptor) -> Option<&mut VariationLine> {
        let (mut line, rest) = match path.steps().split_first() {
            Some((PathStep::Root { variation }, rest)) => {
                (self.root_variations.get_mut(*variation)?, rest)
            }
            _ => (&mut self.main_line, path.steps()),
        };

        for step in rest {
            match *step {
                PathStep::Branch {
                    branch_point,
                    variation,
                } => {
                    line = line
                        .node_mut(branch_point)?
                        .variations
                        .get_mut(variation)?;
                }
                PathStep::Root { .. } => return None,
            }
        }
        Some(line)
    }

    /// The list that owns the line addressed by `path` (`None` for the main line).
    pub(crate) fn owner_mut(&mut self, path: &PathDescriptor) -> Option<&mut Vec<VariationLine>> {
        let (parent, last) = path.split_last()?;
        match last {
            PathStep::Root { .. } => Some(&mut self.root_variations),
            PathStep::Branch { branch_point, .. } => Some(
                &mut self
                    .line_mut(&parent)?
                    .node_mut(branch_point)?
                    .variations,
            ),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
