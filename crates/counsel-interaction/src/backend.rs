//! Backend contract types and the `CaseBackend` trait.
//!
//! The backend orchestration service plans and executes agent work; the
//! client only depends on the request/response shapes defined here. The
//! trait is the seam the pipelines are tested through.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use counsel_core::Result;
use counsel_core::case::{AgentCard, Artifact, CaseRecord, TimelineStep};

/// Body of `POST /agent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunAgentRequest {
    pub user_id: String,
    pub prompt: String,
    /// Identifiers of the files staged for this submission.
    pub files: Vec<String>,
}

/// Response of `POST /agent`.
///
/// Every field defaults when absent so a sparse response never leaves stale
/// collections in place: missing means empty, not "keep the previous run".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RunAgentResponse {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub agents: Vec<AgentCard>,
    #[serde(default)]
    pub timeline: Vec<TimelineStep>,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

/// A locally selected file handed to `POST /upload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Response of `POST /upload`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadResponse {
    /// Backend-assigned file identifier.
    pub file_id: String,
    /// Text extracted from the document (OCR or plain read).
    #[serde(default)]
    pub extracted_text: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Body of `POST /approve-step`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApproveStepRequest {
    pub step_id: String,
    /// User decision, e.g. "approved" or "rejected".
    pub decision: String,
}

/// Response of `POST /approve-step`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApproveStepResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// The backend orchestration service, as seen by the client.
#[async_trait]
pub trait CaseBackend: Send + Sync {
    /// Runs the agent workflow against a prompt and staged files.
    async fn run_agent(&self, request: RunAgentRequest) -> Result<RunAgentResponse>;

    /// Uploads one file for text extraction and staging.
    async fn upload_file(&self, upload: FileUpload) -> Result<UploadResponse>;

    /// Fetches the backend-held case snapshot.
    async fn fetch_case(&self, case_id: &str) -> Result<CaseRecord>;

    /// Approves or rejects a pending step.
    async fn approve_step(&self, request: ApproveStepRequest) -> Result<ApproveStepResponse>;

    /// Fetches the raw bytes of a generated artifact.
    async fn fetch_artifact(&self, path: &str) -> Result<Vec<u8>>;
}
