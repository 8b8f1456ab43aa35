//! Update plans and step logs
//!
//! Multi-call operations are not transactional. [`ApplyResult`] records
//! which remote steps completed so a caller can report the exact state a
//! failure left behind.

use crate::client::UpdateEnvironmentRequest;
use crate::model::EnvironmentRecord;
use crate::tags::TagDiff;
use serde::{Deserialize, Serialize};

/// A single remote step of a reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Create the environment
    Create,
    /// Read the environment back after creation
    ReadBack,
    /// Update scalar fields
    UpdateScalars,
    /// Remove tags
    Untag,
    /// Add or overwrite tags
    Tag,
    /// Delete the environment
    Delete,
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepKind::Create => write!(f, "create"),
            StepKind::ReadBack => write!(f, "read-back"),
            StepKind::UpdateScalars => write!(f, "update-scalars"),
            StepKind::Untag => write!(f, "untag"),
            StepKind::Tag => write!(f, "tag"),
            StepKind::Delete => write!(f, "delete"),
        }
    }
}

/// Result of applying steps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResult {
    /// Successfully applied steps, in order
    pub succeeded: Vec<StepResult>,

    /// Failed steps (at most one; execution stops at the first failure)
    pub failed: Vec<StepResult>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,

    /// ID assigned by a successful create, even when a later step failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_id: Option<String>,
}

impl ApplyResult {
    pub fn new() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
            duration_ms: 0,
            created_id: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Whether a failure happened after at least one step took effect
    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty() && !self.succeeded.is_empty()
    }

    pub fn add_success(&mut self, step: StepKind, message: String) {
        self.succeeded.push(StepResult {
            step,
            success: true,
            message,
            error: None,
        });
    }

    pub fn add_failure(&mut self, step: StepKind, error: String) {
        self.failed.push(StepResult {
            step,
            success: false,
            message: String::new(),
            error: Some(error),
        });
    }

    /// Steps that took effect, in execution order
    pub fn completed_steps(&self) -> Vec<StepKind> {
        self.succeeded.iter().map(|r| r.step).collect()
    }
}

impl Default for ApplyResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a single step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub step: StepKind,

    pub success: bool,

    /// Success message
    pub message: String,

    /// Error message if failed
    pub error: Option<String>,
}

/// Planned update of an existing environment
#[derive(Debug, Clone)]
pub struct UpdatePlan {
    /// Environment ID the scalar update targets
    pub environment_id: String,

    /// ARN the tag calls target
    pub arn: String,

    /// Scalar update request (always sent)
    pub scalars: UpdateEnvironmentRequest,

    /// Tag operations
    pub tags: TagDiff,

    /// Scalar fields whose desired value differs from the current one
    pub changed_fields: Vec<&'static str>,

    /// Record expected after a successful apply
    pub target: EnvironmentRecord,
}

impl UpdatePlan {
    /// Whether applying the plan would change anything
    pub fn has_changes(&self) -> bool {
        !self.changed_fields.is_empty() || !self.tags.is_empty()
    }

    /// Remote steps the plan issues, in order
    pub fn steps(&self) -> Vec<StepKind> {
        let mut steps = vec![StepKind::UpdateScalars];
        if !self.tags.to_remove.is_empty() {
            steps.push(StepKind::Untag);
        }
        if !self.tags.to_add.is_empty() {
            steps.push(StepKind::Tag);
        }
        steps
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            changed_fields: self.changed_fields.len(),
            tags_to_remove: self.tags.to_remove.len(),
            tags_to_add: self.tags.to_add.len(),
        }
    }
}

/// Summary of an update plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSummary {
    pub changed_fields: usize,
    pub tags_to_remove: usize,
    pub tags_to_add: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} fields to change, {} tags to remove, {} tags to add",
            self.changed_fields, self.tags_to_remove, self.tags_to_add
        )
    }
}
