//! HttpCaseBackend - REST implementation of the backend contract.
//!
//! Talks to the orchestration service over its `/api` surface. The stored
//! credential, when present, rides along as the `x-api-key` header on every
//! request; when absent the header is simply omitted and the backend decides
//! whether that is acceptable.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;

use counsel_core::config::ClientConfig;
use counsel_core::error::{CounselError, Result};
use counsel_core::case::CaseRecord;
use counsel_infrastructure::SecretStorage;

use crate::backend::{
    ApproveStepRequest, ApproveStepResponse, CaseBackend, FileUpload, RunAgentRequest,
    RunAgentResponse, UploadResponse,
};

const API_KEY_HEADER: &str = "x-api-key";

/// REST client for the case backend.
#[derive(Clone)]
pub struct HttpCaseBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpCaseBackend {
    /// Creates a client against the given base URL (including the `/api`
    /// path), with no credential.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
            api_key: None,
        }
    }

    /// Sets the credential sent as `x-api-key`.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Creates a client from the client configuration, picking up the stored
    /// credential if secret.json holds one.
    pub fn from_config(config: &ClientConfig) -> Self {
        let mut backend = Self::new(config.base_url.clone());
        if let Ok(storage) = SecretStorage::new() {
            if let Some(api_key) = storage.load_api_key() {
                backend = backend.with_api_key(api_key);
            }
        }
        backend
    }

    /// Replaces the credential at runtime (e.g. after the user stores a new
    /// key). `None` drops the header from subsequent requests.
    pub fn set_api_key(&mut self, api_key: Option<String>) {
        self.api_key = api_key;
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self.client.request(method, self.endpoint(path));
        if let Some(api_key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, api_key);
        }
        builder
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read backend error body".to_string());
        Err(map_http_error(status, body))
    }
}

#[async_trait]
impl CaseBackend for HttpCaseBackend {
    async fn run_agent(&self, request: RunAgentRequest) -> Result<RunAgentResponse> {
        tracing::debug!(target: "backend", prompt_len = request.prompt.len(), files = request.files.len(), "POST /agent");
        let response = self
            .request(Method::POST, "agent")
            .json(&request)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn upload_file(&self, upload: FileUpload) -> Result<UploadResponse> {
        tracing::debug!(target: "backend", name = %upload.name, size = upload.bytes.len(), "POST /upload");
        let part = reqwest::multipart::Part::bytes(upload.bytes)
            .file_name(upload.name)
            .mime_str(&upload.mime_type)
            .map_err(|e| CounselError::internal(format!("Invalid MIME type: {e}")))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .request(Method::POST, "upload")
            .multipart(form)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn fetch_case(&self, case_id: &str) -> Result<CaseRecord> {
        let response = self
            .request(Method::GET, &format!("case/{case_id}"))
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn approve_step(&self, request: ApproveStepRequest) -> Result<ApproveStepResponse> {
        let response = self
            .request(Method::POST, "approve-step")
            .json(&request)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn fetch_artifact(&self, path: &str) -> Result<Vec<u8>> {
        let response = self
            .request(Method::GET, &format!("artifact/{path}"))
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Error body shape of the orchestration service.
#[derive(Deserialize)]
struct ErrorResponse {
    detail: String,
}

fn map_http_error(status: StatusCode, body: String) -> CounselError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.detail)
        .unwrap_or(body);

    CounselError::http(Some(status.as_u16()), message)
}
