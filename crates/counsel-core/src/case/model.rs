//! Case session state model.
//!
//! [`CaseState`] is the single mutable session model shared by all consumers:
//! conversation, agent roster, execution timeline, artifacts, staged uploads,
//! settings, and the running flag. It is owned exclusively by the
//! [`CaseStore`](super::CaseStore) and observed as whole-state snapshots.

use serde::{Deserialize, Serialize};

use super::agent::AgentCard;
use super::artifact::Artifact;
use super::file::UploadedFile;
use super::message::Message;
use super::settings::Settings;
use super::timeline::TimelineStep;

/// Snapshot of a case held by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Case identifier.
    #[serde(rename = "case_id")]
    pub id: String,
    /// Backend-side case memory (conversations, accumulated facts).
    #[serde(default)]
    pub memory: serde_json::Value,
}

/// The full client-side session state.
///
/// Created once per application session; an explicit
/// [`reset`](super::CaseStore::reset) clears everything back to empty
/// defaults except `settings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseState {
    /// Reference to the current backend case, once fetched.
    pub current_case: Option<CaseRecord>,
    /// Sub-agent roster, replaced wholesale per command response.
    pub agents: Vec<AgentCard>,
    /// Execution timeline in execution order.
    pub timeline: Vec<TimelineStep>,
    /// Downloadable artifact references.
    pub artifacts: Vec<Artifact>,
    /// Conversation in chronological order.
    pub messages: Vec<Message>,
    /// True from command submission until pipeline completion; the sole
    /// signal consumers use to disable concurrent submission.
    pub is_running: bool,
    /// User-tunable settings; survive reset.
    pub settings: Settings,
    /// Files staged for the next command submission.
    pub uploaded_files: Vec<UploadedFile>,
}

impl Default for CaseState {
    fn default() -> Self {
        Self {
            current_case: None,
            agents: Vec::new(),
            timeline: Vec::new(),
            artifacts: Vec::new(),
            messages: Vec::new(),
            is_running: false,
            settings: Settings::default(),
            uploaded_files: Vec::new(),
        }
    }
}
