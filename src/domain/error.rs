use thiserror::Error;

use crate::domain::values::branch::Branch;
use crate::domain::values::step_id::StepId;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Metric provider error: {0}")]
    Provider(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Invalid strategy configuration: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl From<&str> for DomainError {
    fn from(s: &str) -> Self {
        DomainError::InvalidInput(s.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::Parse(e.to_string())
    }
}

/// Strategy invariants checked before any fixture is evaluated.
///
/// Each variant names the violated invariant together with the branch and
/// step it was found on, so the authoring side can point at the culprit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("strategy has no steps")]
    NoSteps,

    #[error("scale bound {0} must be a finite number >= 50")]
    ScaleTooSmall(f64),

    #[error("step {0} appears more than once")]
    DuplicateStep(StepId),

    #[error("no {branch} branch config for step {step}")]
    MissingBranchConfig { branch: Branch, step: StepId },

    #[error("{branch} branch config references unknown step {step}")]
    UnknownStepConfig { branch: Branch, step: StepId },

    #[error("{branch} weight {weight} on step {step} is outside 0..=10")]
    WeightOutOfRange {
        branch: Branch,
        step: StepId,
        weight: i64,
    },

    #[error("{branch} weight edge on step {step} has no weight")]
    MissingWeight { branch: Branch, step: StepId },

    #[error("{branch} range on step {step} has min {min} > max {max}")]
    InvertedRange {
        branch: Branch,
        step: StepId,
        min: f64,
        max: f64,
    },

    #[error("{branch} range endpoint {value} on step {step} lies outside +/-{max_margin}")]
    RangeOutOfScale {
        branch: Branch,
        step: StepId,
        value: f64,
        max_margin: f64,
    },

    #[error("step {step} is bound to unknown metric '{metric_id}'")]
    UnknownMetric { step: StepId, metric_id: String },
}
