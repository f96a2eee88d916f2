//! Agent roster types.
//!
//! An [`AgentCard`] describes one specialized sub-agent deployed by the
//! backend: its status, progress, and the case-facing details shown on its
//! card (generated documents, required form fields, next steps). The roster
//! is replaced wholesale on each command-pipeline response; targeted partial
//! updates go through [`AgentPatch`].

use serde::{Deserialize, Serialize};

use super::artifact::Artifact;

/// Execution status of a sub-agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Idle,
    Running,
    Completed,
    Error,
}

impl Default for AgentStatus {
    fn default() -> Self {
        AgentStatus::Idle
    }
}

/// Kind of input control a form field renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormFieldKind {
    Text,
    Textarea,
    Select,
}

/// One option of a select-type form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// A piece of information an agent needs from the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub label: String,
    #[serde(rename = "type")]
    pub kind: FormFieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}

/// A recommended follow-up action surfaced by an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextStep {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

/// A specialized sub-agent working the case.
///
/// Identity (`id`) is stable across a session so incremental backend updates
/// stay attributable to the same card. Field names follow the backend wire
/// format (camelCase).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    pub id: String,
    pub name: String,
    /// Agent specialty (e.g. "small_claims", "landlord_tenant").
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub status: AgentStatus,
    /// Overall progress, 0-100.
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<Artifact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub form_fields: Vec<FormField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_steps: Vec<NextStep>,
    /// Estimated chance of a favorable outcome, 0-100.
    #[serde(default)]
    pub win_percentage: u8,
    #[serde(default)]
    pub steps_remaining: u32,
    #[serde(default)]
    pub forms_completed: u32,
    #[serde(default)]
    pub contacts_needed: u32,
    /// Short human-readable description of the agent's latest activity.
    #[serde(default)]
    pub last_update: String,
}

/// Typed partial update for a single agent, merged by id.
///
/// Only `Some` fields are applied; everything else on the card is preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentPatch {
    pub status: Option<AgentStatus>,
    pub progress: Option<u8>,
    pub summary: Option<String>,
    pub last_update: Option<String>,
    pub win_percentage: Option<u8>,
    pub steps_remaining: Option<u32>,
    pub forms_completed: Option<u32>,
    pub contacts_needed: Option<u32>,
}

impl AgentPatch {
    /// Applies this patch to a card, overwriting only the populated fields.
    pub(crate) fn apply(&self, card: &mut AgentCard) {
        if let Some(status) = self.status {
            card.status = status;
        }
        if let Some(progress) = self.progress {
            card.progress = progress;
        }
        if let Some(summary) = &self.summary {
            card.summary = summary.clone();
        }
        if let Some(last_update) = &self.last_update {
            card.last_update = last_update.clone();
        }
        if let Some(win_percentage) = self.win_percentage {
            card.win_percentage = win_percentage;
        }
        if let Some(steps_remaining) = self.steps_remaining {
            card.steps_remaining = steps_remaining;
        }
        if let Some(forms_completed) = self.forms_completed {
            card.forms_completed = forms_completed;
        }
        if let Some(contacts_needed) = self.contacts_needed {
            card.contacts_needed = contacts_needed;
        }
    }
}
