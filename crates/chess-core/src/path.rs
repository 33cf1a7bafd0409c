//! Addressing lines inside a [`GameTree`](crate::tree::GameTree).
//!
//! On the wire a path is a flat, even-length list of integers read as
//! `(branch_point, variation)` pairs. `branch_point` is the index of the last
//! move shared with the parent line; a leading `(-1, v)` selects
//! `rootVariations[v]` instead.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PathError;

const ROOT_SENTINEL: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// `rootVariations[variation]`; only valid as the first step.
    Root { variation: usize },
    /// `line[branch_point].variations[variation]`.
    Branch { branch_point: usize, variation: usize },
}

impl PathStep {
    pub fn variation(&self) -> usize {
        match *self {
            PathStep::Root { variation } | PathStep::Branch { variation, .. } => variation,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<i64>")]
pub struct PathDescriptor {
    steps: Vec<PathStep>,
}

impl PathDescriptor {
    /// The empty path, addressing the main line.
    pub fn main_line() -> Self {
        Self::default()
    }

    /// Path to `rootVariations[variation]`.
    pub fn root(variation: usize) -> Self {
        Self {
            steps: vec![PathStep::Root { variation }],
        }
    }

    pub fn from_flat(flat: &[i64]) -> Result<Self, PathError> {
        if flat.len() % 2 != 0 {
            return Err(PathError::OddLength(flat.len()));
        }

        let mut steps = Vec::with_capacity(flat.len() / 2);
        for (pair_index, pair) in flat.chunks_exact(2).enumerate() {
            let slot = pair_index * 2;
            let (branch_point, variation) = (pair[0], pair[1]);

            if variation < 0 {
                if variation == ROOT_SENTINEL {
                    return Err(PathError::MisplacedRootSentinel(slot + 1));
                }
                return Err(PathError::NegativeIndex {
                    index: slot + 1,
                    value: variation,
                });
            }

            let step = match branch_point {
                ROOT_SENTINEL if slot == 0 => PathStep::Root {
                    variation: variation as usize,
                },
                ROOT_SENTINEL => return Err(PathError::MisplacedRootSentinel(slot)),
                bp if bp < 0 => {
                    return Err(PathError::NegativeIndex {
                        index: slot,
                        value: bp,
                    })
                }
                bp => PathStep::Branch {
                    branch_point: bp as usize,
                    variation: variation as usize,
                },
            };
            steps.push(step);
        }

        Ok(Self { steps })
    }

    pub fn to_flat(&self) -> Vec<i64> {
        self.steps
            .iter()
            .flat_map(|step| match *step {
                PathStep::Root { variation } => [ROOT_SENTINEL, variation as i64],
                PathStep::Branch {
                    branch_point,
                    variation,
                } => [branch_point as i64, variation as i64],
            })
            .collect()
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn is_main_line(&self) -> bool {
        self.steps.is_empty()
    }

    /// Path to `line[branch_point].variations[variation]` where `line` is the one addressed by `self`.
    pub fn child(&self, branch_point: usize, variation: usize) -> Self {
        let mut steps = self.steps.clone();
        steps.push(PathStep::Branch {
            branch_point,
            variation,
        });
        Self { steps }
    }

    /// Split off the last step. `None` for the main line.
    pub fn split_last(&self) -> Option<(Self, PathStep)> {
        let (last, rest) = self.steps.split_last()?;
        Some((
            Self {
                steps: rest.to_vec(),
            },
            *last,
        ))
    }

    /// Same owner, different variation index in the last step.
    pub fn with_last_variation(&self, variation: usize) -> Self {
        let mut steps = self.steps.clone();
        if let Some(last) = steps.last_mut() {
            *last = match *last {
                PathStep::Root { .. } => PathStep::Root { variation },
                PathStep::Branch { branch_point, .. } => PathStep::Branch {
                    branch_point,
                    variation,
                },
            };
        }
        Self { steps }
    }
}

impl TryFrom<Vec<i64>> for PathDescriptor {
    type Error = PathError;

    fn try_from(flat: Vec<i64>) -> Result<Self, Self::Error> {
        Self::from_flat(&flat)
    }
}

impl From<PathDescriptor> for Vec<i64> {
    fn from(path: PathDescriptor) -> Self {
        path.to_flat()
    }
}

impl fmt::Display for PathDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flat: Vec<String> = self.to_flat().iter().map(i64::to_string).collect();
        write!(f, "[{}]", flat.join(","))
    }
}

/// Accepts `1,0`, `[-1, 0, 2, 1]` or an empty string.
impl FromStr for PathDescriptor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s.trim().trim_start_matches('[').trim_end_matches(']');
        let flat = inner
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<i64>()
                    .map_err(|e| format!("Invalid path entry '{part}': {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_flat(&flat).map_err(|e| e.to_string())
    }
}
