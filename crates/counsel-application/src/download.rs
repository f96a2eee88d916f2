//! Artifact download.
//!
//! Fetches a backend-held document's bytes and writes them next to the
//! caller-chosen destination. Failures are notified and leave no file behind;
//! there is no retry.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use counsel_core::case::Artifact;
use counsel_core::notify::Notifier;
use counsel_interaction::CaseBackend;

/// Downloads artifacts to the local filesystem.
pub struct ArtifactDownloader {
    backend: Arc<dyn CaseBackend>,
    notifier: Notifier,
}

impl ArtifactDownloader {
    pub fn new(backend: Arc<dyn CaseBackend>, notifier: Notifier) -> Self {
        Self { backend, notifier }
    }

    /// Fetches `artifact` and saves it as `dest_dir/<artifact.name>`.
    ///
    /// Returns the written path, or `None` when the fetch or the write
    /// failed, in which case nothing is left on disk.
    pub async fn download(&self, artifact: &Artifact, dest_dir: &Path) -> Option<PathBuf> {
        let bytes = match self.backend.fetch_artifact(&artifact.path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!(target: "download", "Failed to fetch {}: {}", artifact.path, err);
                self.notifier
                    .error(format!("Failed to download {}", artifact.name));
                return None;
            }
        };

        let dest = dest_dir.join(&artifact.name);
        if let Err(err) = tokio::fs::write(&dest, &bytes).await {
            tracing::error!(target: "download", "Failed to write {}: {}", dest.display(), err);
            // Leave no partial file behind.
            let _ = tokio::fs::remove_file(&dest).await;
            self.notifier
                .error(format!("Failed to save {}", artifact.name));
            return None;
        }

        self.notifier.success(format!("Saved {}", artifact.name));
        Some(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use counsel_core::case::CaseRecord;
    use counsel_core::error::{CounselError, Result};
    use counsel_core::notify::ToastKind;
    use counsel_interaction::{
        ApproveStepRequest, ApproveStepResponse, FileUpload, RunAgentRequest, RunAgentResponse,
        UploadResponse,
    };
    use tempfile::TempDir;

    struct MockBackend {
        artifact: Option<Vec<u8>>,
    }

    #[async_trait]
    impl CaseBackend for MockBackend {
        async fn run_agent(&self, _request: RunAgentRequest) -> Result<RunAgentResponse> {
            Err(CounselError::internal("not used in this test"))
        }

        async fn upload_file(&self, _upload: FileUpload) -> Result<UploadResponse> {
            Err(CounselError::internal("not used in this test"))
        }

        async fn fetch_case(&self, _case_id: &str) -> Result<CaseRecord> {
            Err(CounselError::internal("not used in this test"))
        }

        async fn approve_step(&self, _request: ApproveStepRequest) -> Result<ApproveStepResponse> {
            Err(CounselError::internal("not used in this test"))
        }

        async fn fetch_artifact(&self, _path: &str) -> Result<Vec<u8>> {
            self.artifact
                .clone()
                .ok_or_else(|| CounselError::http(Some(404), "Artifact not found"))
        }
    }

    fn artifact() -> Artifact {
        Artifact {
            path: "artifacts/complaint.pdf".to_string(),
            name: "complaint.pdf".to_string(),
            kind: "pdf".to_string(),
            size: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_download_writes_the_fetched_bytes() {
        let dir = TempDir::new().unwrap();
        let downloader = ArtifactDownloader::new(
            Arc::new(MockBackend {
                artifact: Some(b"%PDF-1.4 fake".to_vec()),
            }),
            Notifier::new(),
        );

        let written = downloader.download(&artifact(), dir.path()).await;

        let path = written.expect("download should succeed");
        assert_eq!(path, dir.path().join("complaint.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4 fake");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_saves_nothing_and_notifies() {
        let dir = TempDir::new().unwrap();
        let notifier = Notifier::new();
        let downloader =
            ArtifactDownloader::new(Arc::new(MockBackend { artifact: None }), notifier.clone());

        let written = downloader.download(&artifact(), dir.path()).await;

        assert!(written.is_none());
        assert!(!dir.path().join("complaint.pdf").exists());
        let toasts = notifier.toasts();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, ToastKind::Error);
    }
}
