//! Error types for parsing, navigation and editing.

use thiserror::Error;

/// Failures reported by a rules engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    #[error("Invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("Illegal move '{san}': {reason}")]
    IllegalMove { san: String, reason: String },
}

/// Fatal outcomes of a parse call. Individual illegal moves are not errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("No moves found")]
    EmptyInput,

    #[error("Could not extract any moves or variations")]
    StructuralParseFailure,

    #[error("Input is {size} bytes, limit is {limit}")]
    InputTooLarge { size: usize, limit: usize },

    #[error("Variations nested deeper than {0} levels")]
    VariationTooDeep(usize),

    #[error("Invalid starting position: {0}")]
    InvalidStartingPosition(RulesError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Path must have an even number of entries, got {0}")]
    OddLength(usize),

    #[error("Root sentinel -1 is only allowed in the first slot, found at {0}")]
    MisplacedRootSentinel(usize),

    #[error("Negative index {value} at slot {index}")]
    NegativeIndex { index: usize, value: i64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Path {0:?} does not address a line in this tree")]
    UnresolvedPath(Vec<i64>),

    #[error("No move ends at ply {0} of the addressed line")]
    NoMoveAtPly(usize),

    #[error("The main line cannot be deleted or promoted")]
    EmptyPath,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Rules(#[from] RulesError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Path(#[from] PathError),
}
