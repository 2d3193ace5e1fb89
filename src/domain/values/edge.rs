use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MAX_WEIGHT: i64 = 10;

/// How a step's outcome feeds into a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeType {
    /// The step gates progression; a miss stops the branch.
    Match,
    /// The step only contributes its weight to the branch score.
    Weight,
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeType::Match => write!(f, "match"),
            EdgeType::Weight => write!(f, "weight"),
        }
    }
}

impl FromStr for EdgeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "match" => Ok(EdgeType::Match),
            "weight" => Ok(EdgeType::Weight),
            _ => Err(format!("Unknown edge type: {s}")),
        }
    }
}

/// Editable per-(branch, step) configuration as exchanged with the editor.
///
/// `weight` is kept raw so an out-of-range value coming from the editor is
/// reported by strategy validation instead of failing deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchConfig {
    pub edge_type: EdgeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
}

impl BranchConfig {
    pub fn matching() -> Self {
        Self {
            edge_type: EdgeType::Match,
            weight: None,
        }
    }

    pub fn weighted(weight: i64) -> Self {
        Self {
            edge_type: EdgeType::Weight,
            weight: Some(weight),
        }
    }
}

impl Default for BranchConfig {
    fn default() -> Self {
        Self::matching()
    }
}

/// Score contribution of a satisfied weight step, `0..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Weight(u8);

impl Weight {
    pub fn new(value: i64) -> Result<Self, String> {
        if !(0..=MAX_WEIGHT).contains(&value) {
            return Err(format!(
                "Weight must be between 0 and {MAX_WEIGHT}, got {value}"
            ));
        }
        Ok(Weight(value as u8))
    }

    pub fn value(&self) -> u32 {
        u32::from(self.0)
    }
}

/// Compiled edge: the tag decides short-circuit versus accumulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "edgeType", content = "weight")]
pub enum Edge {
    Match,
    Weight(Weight),
}
