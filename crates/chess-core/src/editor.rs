//! Persistent edits on a [`GameTree`].
//!
//! Every operation takes the current snapshot by `Arc` and returns a new one.
//! The old snapshot is never touched: the new tree shares every node that is
//! not on the edited path, and nodes on the path are copied before they change.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::error::EditError;
use crate::path::{PathDescriptor, PathStep};
use crate::tree::{GameTree, MoveNode, VariationLine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EditOutcome {
    /// The move extended the addressed line.
    Appended,
    /// The move was already there; only the cursor advanced.
    Navigated,
    /// The move diverged and now starts a new variation.
    Branched,
}

/// Result of [`apply_move`]: the new snapshot and where the cursor lands.
#[derive(Debug, Clone)]
pub struct Edit {
    pub tree: Arc<GameTree>,
    pub path: PathDescriptor,
    pub ply: usize,
    pub outcome: EditOutcome,
}

fn unresolved(path: &PathDescriptor) -> EditError {
    EditError::UnresolvedPath(path.to_flat())
}

/// Play `new_move` at `(path, ply)`.
///
/// - nothing at `line[ply]`: append and advance
/// - same move text at `line[ply]`: return the same tree and advance
/// - different move: start a one-move variation and point the cursor into it
///
/// A `ply` past the end of the line is treated as the end of the line.
pub fn apply_move(
    tree: &Arc<GameTree>,
    path: &PathDescriptor,
    ply: usize,
    new_move: MoveNode,
) -> Result<Edit, EditError> {
    let line = tree.line(path).ok_or_else(|| unresolved(path))?;
    let ply = ply.min(line.len());

    match line.get(ply) {
        None => {
            let mut next = GameTree::clone(tree);
            next.line_mut(path).ok_or_else(|| unresolved(path))?.push(new_move);
            Ok(Edit {
                tree: Arc::new(next),
                path: path.clone(),
                ply: ply + 1,
                outcome: EditOutcome::Appended,
            })
        }
        Some(existing) if existing.san == new_move.san => Ok(Edit {
            tree: Arc::clone(tree),
            path: path.clone(),
            ply: ply + 1,
            outcome: EditOutcome::Navigated,
        }),
        Some(_) => {
            let mut next = GameTree::clone(tree);
            let branch: VariationLine = std::iter::once(new_move).collect();
            let new_path = match ply {
                0 => add_sibling(&mut next, path, branch)?,
                _ => {
                    let anchor = next
                        .line_mut(path)
                        .and_then(|line| line.node_mut(ply - 1))
                        .ok_or_else(|| unresolved(path))?;
                    anchor.variations.push(branch);
                    path.child(ply - 1, anchor.variations.len() - 1)
                }
            };
            debug!(path = %new_path, "Created variation");
            Ok(Edit {
                tree: Arc::new(next),
                path: new_path,
                ply: 1,
                outcome: EditOutcome::Branched,
            })
        }
    }
}

/// Add `line` next to the one at `path`, as an alternative to its first move.
fn add_sibling(
    tree: &mut GameTree,
    path: &PathDescriptor,
    line: VariationLine,
) -> Result<PathDescriptor, EditError> {
    if path.is_main_line() {
        tree.root_variations.push(line);
        return Ok(PathDescriptor::root(tree.root_variations.len() - 1));
    }
    let owner = tree.owner_mut(path).ok_or_else(|| unresolved(path))?;
    owner.push(line);
    Ok(path.with_last_variation(owner.len() - 1))
}

/// Set or clear the comment on the move ending at `ply`.
///
/// Ply 0 of the main line addresses the game comment.
pub fn set_comment(
    tree: &Arc<GameTree>,
    path: &PathDescriptor,
    ply: usize,
    comment: Option<String>,
) -> Result<Arc<GameTree>, EditError> {
    let comment = comment
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty());

    let mut next = GameTree::clone(tree);
    if ply == 0 && path.is_main_line() {
        next.comment = comment;
    } else {
        move_at_ply(&mut next, path, ply)?.comment = comment;
    }
    Ok(Arc::new(next))
}

/// Replace the NAG list of the move ending at `ply`.
pub fn set_nags(
    tree: &Arc<GameTree>,
    path: &PathDescriptor,
    ply: usize,
    nags: Vec<u8>,
) -> Result<Arc<GameTree>, EditError> {
    let mut next = GameTree::clone(tree);
    move_at_ply(&mut next, path, ply)?.nags = nags;
    Ok(Arc::new(next))
}

fn move_at_ply<'t>(
    tree: &'t mut GameTree,
    path: &PathDescriptor,
    ply: usize,
) -> Result<&'t mut MoveNode, EditError> {
    let line = tree.line_mut(path).ok_or_else(|| unresolved(path))?;
    ply.checked_sub(1)
        .and_then(|index| line.node_mut(index))
        .ok_or(EditError::NoMoveAtPly(ply))
}

/// Remove the variation at `path` together with everything nested in it.
pub fn delete_variation(
    tree: &Arc<GameTree>,
    path: &PathDescriptor,
) -> Result<Arc<GameTree>, EditError> {
    let (_, last) = path.split_last().ok_or(EditError::EmptyPath)?;
    let mut next = GameTree::clone(tree);
    let owner = next.owner_mut(path).ok_or_else(|| unresolved(path))?;
    if last.variation() >= owner.len() {
        return Err(unresolved(path));
    }
    owner.remove(last.variation());
    Ok(Arc::new(next))
}

/// Swap the variation at `path` with the continuation it is an alternative to.
///
/// Returns the new tree and the path of the line that now holds the promoted
/// moves, together with the ply at which they start there. The demoted
/// continuation takes the variation's old slot; if there was none, the slot
/// is removed.
pub fn promote_variation(
    tree: &Arc<GameTree>,
    path: &PathDescriptor,
) -> Result<(Arc<GameTree>, PathDescriptor, usize), EditError> {
    let (parent, last) = path.split_last().ok_or(EditError::EmptyPath)?;
    if tree.line(path).is_none() {
        return Err(unresolved(path));
    }

    let mut next = GameTree::clone(tree);
    let start = match last {
        PathStep::Root { variation } => {
            let promoted = std::mem::take(&mut next.root_variations[variation]);
            let demoted = std::mem::replace(&mut next.main_line, promoted);
            replace_or_remove(&mut next.root_variations, variation, demoted);
            0
        }
        PathStep::Branch {
            branch_point,
            variation,
        } => {
            let line = next.line_mut(&parent).ok_or_else(|| unresolved(path))?;
            let demoted = VariationLine {
                moves: line.moves.split_off(branch_point + 1),
            };
            let anchor = line
                .node_mut(branch_point)
                .ok_or_else(|| unresolved(path))?;
            let promoted = std::mem::take(&mut anchor.variations[variation]);
            replace_or_remove(&mut anchor.variations, variation, demoted);
            line.moves.extend(promoted.moves);
            branch_point + 1
        }
    };
    Ok((Arc::new(next), parent, start))
}

fn replace_or_remove(lines: &mut Vec<VariationLine>, index: usize, line: VariationLine) {
    if line.is_empty() {
        lines.remove(index);
    } else {
        lines[index] = line;
    }
}

/// Drop `line[ply..]` and the variations that were alternatives to it.
///
/// Truncating a variation at ply 0 deletes it; truncating the main line at
/// ply 0 clears the main line and every root variation.
pub fn truncate_line(
    tree: &Arc<GameTree>,
    path: &PathDescriptor,
    ply: usize,
) -> Result<Arc<GameTree>, EditError> {
    let line = tree.line(path).ok_or_else(|| unresolved(path))?;
    if ply >= line.len() {
        return Ok(Arc::clone(tree));
    }
    if ply == 0 {
        if path.is_main_line() {
            let mut next = GameTree::clone(tree);
            next.main_line = VariationLine::new();
            next.root_variations.clear();
            return Ok(Arc::new(next));
        }
        return delete_variation(tree, path);
    }

    let mut next = GameTree::clone(tree);
    let line = next.line_mut(path).ok_or_else(|| unresolved(path))?;
    line.moves.truncate(ply);
    if let Some(last) = line.node_mut(ply - 1) {
        last.variations.clear();
    }
    Ok(Arc::new(next))
}
