//! Rebuild the position at any point of a move tree.
//!
//! A location is a [`PathDescriptor`] plus a ply index into the line it
//! addresses. Reconstruction collects the move history leading there and
//! replays it through the rules engine from the tree's starting position.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::path::{PathDescriptor, PathStep};
use crate::rules::{RulesEngine, ShakmatyEngine};
use crate::tree::{GameTree, MoveNode, VariationLine};

/// A history move the engine refused during replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedMove {
    /// Index into `Reconstruction::history`.
    pub index: usize,
    pub san: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconstruction {
    pub fen: String,
    pub history: Vec<Arc<MoveNode>>,
    /// Ply index after clamping to the addressed line.
    pub ply: usize,
    /// False when the path pointed past the tree and the history stops early.
    pub resolved: bool,
    pub skipped: Vec<SkippedMove>,
}

impl Reconstruction {
    pub fn sans(&self) -> Vec<&str> {
        self.history.iter().map(|node| node.san.as_str()).collect()
    }
}

/// The moves from the start up to `ply` of the line at `path`.
///
/// Returns the history, the clamped ply and whether every path step resolved.
/// A missing branch point or variation ends the walk at the last resolved line.
pub fn history(tree: &GameTree, path: &PathDescriptor, ply: usize) -> (Vec<Arc<MoveNode>>, usize, bool) {
    let mut history = Vec::new();
    let (mut line, rest): (&VariationLine, &[PathStep]) = match path.steps().split_first() {
        Some((PathStep::Root { variation }, rest)) => match tree.root_variations.get(*variation) {
            Some(root) => (root, rest),
            None => return (history, 0, false),
        },
        _ => (&tree.main_line, path.steps()),
    };

    for step in rest {
        let PathStep::Branch {
            branch_point,
            variation,
        } = *step
        else {
            return (history, 0, false);
        };

        let shared = (branch_point + 1).min(line.len());
        history.extend(line.moves[..shared].iter().cloned());

        match line.get(branch_point).and_then(|node| node.variations.get(variation)) {
            Some(next) => line = next,
            None => return (history, 0, false),
        }
    }

    let ply = ply.min(line.len());
    history.extend(line.moves[..ply].iter().cloned());
    (history, ply, true)
}

/// Reconstruct with the shakmaty engine.
pub fn reconstruct(tree: &GameTree, path: &PathDescriptor, ply: usize) -> Reconstruction {
    reconstruct_with::<ShakmatyEngine>(tree, path, ply)
}

/// Replay the history at `(path, ply)` and return the resulting position.
///
/// Never fails: moves the engine refuses are skipped and reported, and an
/// unreadable starting position falls back to the engine's initial position.
pub fn reconstruct_with<E: RulesEngine>(tree: &GameTree, path: &PathDescriptor, ply: usize) -> Reconstruction {
    let (history, ply, resolved) = history(tree, path, ply);
    if !resolved {
        warn!(path = %path, "Path does not resolve in this tree, stopping at the last reachable line");
    }

    let mut engine = E::from_fen(&tree.starting_position).unwrap_or_else(|e| {
        warn!(error = %e, "Unreadable starting position, replaying from the initial position");
        E::default()
    });

    let mut skipped = Vec::new();
    for (index, node) in history.iter().enumerate() {
        if let Err(e) = engine.apply_move(&node.san) {
            warn!(index, san = %node.san, error = %e, "Could not reapply move, skipping it");
            skipped.push(SkippedMove {
                index,
                san: node.san.clone(),
                reason: e.to_string(),
            });
        }
    }

    Reconstruction {
        fen: engine.current_position(),
        history,
        ply,
        resolved,
        skipped,
    }
}

/// Length of the line at `path`, or `None` if the path does not resolve.
pub fn line_len(tree: &GameTree, path: &PathDescriptor) -> Option<usize> {
    tree.line(path).map(VariationLine::len)
}
