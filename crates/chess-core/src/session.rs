//! An interactive study: one tree snapshot plus a cursor into it.
//!
//! Readers take [`StudySession::snapshot`] and keep it as long as they like;
//! writes swap in a new snapshot and never touch the old one.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::{debug, info};

use crate::editor::{self, EditOutcome};
use crate::error::{EditError, SessionError};
use crate::navigator::{self, Reconstruction};
use crate::path::{PathDescriptor, PathStep};
use crate::pgn::{self, ParseLimits};
use crate::rules::{RulesEngine, ShakmatyEngine};
use crate::tree::{GameTree, MoveNode};

/// A location in the tree: a line and a ply index into it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    pub path: PathDescriptor,
    pub ply: usize,
}

#[derive(Debug, Clone, Default)]
pub struct StudySession {
    tree: Arc<GameTree>,
    cursor: Cursor,
    limits: ParseLimits,
}

impl StudySession {
    pub fn new(tree: GameTree) -> Self {
        Self {
            tree: Arc::new(tree),
            ..Self::default()
        }
    }

    pub fn with_limits(mut self, limits: ParseLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn tree(&self) -> &GameTree {
        &self.tree
    }

    /// The current tree. Later edits do not affect the returned snapshot.
    pub fn snapshot(&self) -> Arc<GameTree> {
        Arc::clone(&self.tree)
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Load a single-game PGN, replacing the tree. Returns the game's tag pairs.
    pub fn import_pgn(&mut self, pgn: &str) -> Result<Vec<(String, String)>, SessionError> {
        let game = pgn::parse_pgn_with::<ShakmatyEngine>(pgn, &self.limits)?;
        info!(moves = game.tree.move_count(), "Imported PGN into session");
        self.tree = Arc::new(game.tree);
        self.reset();
        Ok(game.tags)
    }

    /// Install a tree from elsewhere. The last call wins.
    ///
    /// The cursor is kept if it still addresses a position in the new tree.
    pub fn replace_tree(&mut self, tree: Arc<GameTree>) {
        let keeps_cursor = tree
            .line(&self.cursor.path)
            .is_some_and(|line| self.cursor.ply <= line.len());
        self.tree = tree;
        if !keeps_cursor {
            debug!(path = %self.cursor.path, ply = self.cursor.ply, "Cursor no longer valid, resetting");
            self.reset();
        }
    }

    /// Move the cursor back to the starting position.
    pub fn reset(&mut self) {
        self.cursor = Cursor::default();
    }

    pub fn position(&self) -> Reconstruction {
        navigator::reconstruct(&self.tree, &self.cursor.path, self.cursor.ply)
    }

    /// Play `san` at the cursor and move the cursor past it.
    ///
    /// Illegal moves are rejected here, unlike PGN import.
    pub fn play(&mut self, san: &str) -> Result<EditOutcome, SessionError> {
        let position = self.position();
        let mut engine = ShakmatyEngine::from_fen(&position.fen)?;
        let result = engine.apply_move(san)?;

        let edit = editor::apply_move(
            &self.tree,
            &self.cursor.path,
            self.cursor.ply,
            MoveNode::verified(result),
        )?;
        debug!(san, outcome = ?edit.outcome, path = %edit.path, ply = edit.ply, "Played move");

        self.tree = edit.tree;
        self.cursor = Cursor {
            path: edit.path,
            ply: edit.ply,
        };
        Ok(edit.outcome)
    }

    /// Jump to `(path, ply)`. The ply is clamped to the line's length.
    pub fn go_to(&mut self, path: PathDescriptor, ply: usize) -> Result<(), SessionError> {
        let len = navigator::line_len(&self.tree, &path)
            .ok_or_else(|| EditError::UnresolvedPath(path.to_flat()))?;
        self.cursor = Cursor {
            path,
            ply: ply.min(len),
        };
        Ok(())
    }

    /// Step one move back, leaving a variation through its branch point.
    /// Returns false at the starting position.
    pub fn go_back(&mut self) -> bool {
        if self.cursor.ply > 0 {
            self.cursor.ply -= 1;
            return true;
        }
        let Some((parent, last)) = self.cursor.path.split_last() else {
            return false;
        };
        match last {
            // A root variation starts at the starting position.
            PathStep::Root { .. } => {
                self.reset();
                false
            }
            PathStep::Branch { branch_point, .. } => {
                self.cursor = Cursor {
                    path: parent,
                    ply: branch_point,
                };
                true
            }
        }
    }

    /// Step one move forward along the current line. Returns false at its end.
    pub fn go_forward(&mut self) -> bool {
        let len = navigator::line_len(&self.tree, &self.cursor.path).unwrap_or(0);
        if self.cursor.ply < len {
            self.cursor.ply += 1;
            true
        } else {
            false
        }
    }

    pub fn go_to_start(&mut self) {
        self.reset();
    }

    /// Last position of the current line.
    pub fn go_to_end(&mut self) {
        self.cursor.ply = navigator::line_len(&self.tree, &self.cursor.path).unwrap_or(0);
    }
}

/// A session shared between threads, guarded by one mutex.
#[derive(Debug, Clone, Default)]
pub struct SharedSession(Arc<Mutex<StudySession>>);

impl SharedSession {
    pub fn new(session: StudySession) -> Self {
        Self(Arc::new(Mutex::new(session)))
    }

    /// Run `f` with exclusive access. A panic in another holder does not
    /// poison the session: every write replaces whole values.
    pub fn with<R>(&self, f: impl FnOnce(&mut StudySession) -> R) -> R {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn snapshot(&self) -> Arc<GameTree> {
        self.with(|session| session.snapshot())
    }
}
