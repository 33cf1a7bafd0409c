//! Tool configuration from environment variables

use std::env;

use chess_core::{ParseLimits, STANDARD_START_FEN};

#[derive(Clone, Debug)]
pub struct Config {
    /// Largest PGN file accepted, in bytes
    pub max_input_bytes: usize,

    /// Deepest variation nesting accepted
    pub max_variation_depth: usize,

    /// Starting position for files without a FEN tag
    pub default_fen: String,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = ParseLimits::default();
        Self {
            max_input_bytes: env::var("STUDY_MAX_INPUT_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_input_bytes),
            max_variation_depth: env::var("STUDY_MAX_VARIATION_DEPTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_variation_depth),
            default_fen: env::var("STUDY_DEFAULT_FEN")
                .unwrap_or_else(|_| STANDARD_START_FEN.to_string()),
        }
    }

    pub fn limits(&self) -> ParseLimits {
        ParseLimits {
            max_input_bytes: self.max_input_bytes,
            max_variation_depth: self.max_variation_depth,
        }
    }
}
