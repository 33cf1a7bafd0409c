//! Move-tree engine for annotated chess studies.
//!
//! PGN with nested variations is parsed into a [`GameTree`]; positions
//! anywhere in the tree are rebuilt with [`reconstruct`]; interactive edits go
//! through [`apply_move`] and friends, which return new snapshots instead of
//! mutating the old ones.

pub mod editor;
pub mod error;
pub mod nag;
pub mod navigator;
pub mod path;
pub mod pgn;
pub mod rules;
pub mod session;
pub mod tree;

pub use editor::{apply_move, Edit, EditOutcome};
pub use error::{EditError, ParseError, PathError, RulesError, SessionError};
pub use navigator::{reconstruct, Reconstruction, SkippedMove};
pub use path::{PathDescriptor, PathStep};
pub use pgn::{parse, parse_pgn, parse_study, write_movetext, write_pgn, ParseLimits, PgnGame};
pub use rules::{MoveResult, RulesEngine, ShakmatyEngine, STANDARD_START_FEN};
pub use session::{Cursor, SharedSession, StudySession};
pub use tree::{GameTree, MoveNode, VariationLine, Verification};
