//! Execution timeline types.
//!
//! The timeline is the ordered sequence of work steps the backend plans and
//! executes for a case. Order is execution order and is preserved across
//! updates; steps merge by id via [`StepPatch`].

use serde::{Deserialize, Serialize};

/// Kind of work a timeline step performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    /// Text extraction from an uploaded document.
    Ocr,
    /// Retrieval over case memory and statutes.
    Rag,
    /// Document drafting.
    Draft,
    /// Outcome simulation.
    Simulate,
    /// Any other step kind the backend plans.
    #[serde(other)]
    General,
}

/// Execution status of a timeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    // The backend emits "waiting" for steps it has not started yet.
    #[serde(alias = "waiting")]
    Pending,
    Running,
    Completed,
    Blocked,
}

/// One step in the case execution timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineStep {
    pub id: String,
    #[serde(rename = "type", default = "default_step_kind")]
    pub kind: StepKind,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: StepStatus,
    /// Agent responsible for the step, if attributed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    /// Wall-clock duration in seconds, once known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<String>,
}

fn default_step_kind() -> StepKind {
    StepKind::General
}

/// Typed partial update for a single timeline step, merged by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepPatch {
    pub status: Option<StepStatus>,
    pub progress: Option<u8>,
    pub duration: Option<f64>,
    pub output: Option<serde_json::Value>,
    pub logs: Option<Vec<String>>,
}

impl StepPatch {
    /// Applies this patch to a step, overwriting only the populated fields.
    pub(crate) fn apply(&self, step: &mut TimelineStep) {
        if let Some(status) = self.status {
            step.status = status;
        }
        if let Some(progress) = self.progress {
            step.progress = Some(progress);
        }
        if let Some(duration) = self.duration {
            step.duration = Some(duration);
        }
        if let Some(output) = &self.output {
            step.output = Some(output.clone());
        }
        if let Some(logs) = &self.logs {
            step.logs = logs.clone();
        }
    }
}
