//! The upload pipeline: file staging.
//!
//! Each file is one independent backend call; a failure is per-file and never
//! aborts siblings in the same batch. Success appends a normalized record to
//! the staged-file list; failure is surfaced through the notifier and the
//! file is simply not staged. Removal is purely local.

use std::sync::Arc;

use counsel_core::case::{CaseStore, UploadedFile};
use counsel_core::notify::Notifier;
use counsel_interaction::{CaseBackend, FileUpload};

/// Kinds of documents the client accepts at the selection layer: PDFs,
/// common image types, and plain/word-processor text. The pipeline itself
/// performs no further validation.
pub fn supported_mime_type(mime: &str) -> bool {
    mime == "application/pdf"
        || mime == "application/msword"
        || mime == "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        || mime.starts_with("image/")
        || mime.starts_with("text/")
}

/// A locally selected file, read and typed by the selection layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub bytes: Vec<u8>,
}

/// Stages locally selected files with the backend.
pub struct UploadPipeline {
    store: Arc<CaseStore>,
    backend: Arc<dyn CaseBackend>,
    notifier: Notifier,
}

impl UploadPipeline {
    /// Creates a pipeline bound to a store, backend, and notifier.
    pub fn new(store: Arc<CaseStore>, backend: Arc<dyn CaseBackend>, notifier: Notifier) -> Self {
        Self {
            store,
            backend,
            notifier,
        }
    }

    /// Uploads one file and stages it on success.
    ///
    /// The staged record combines the backend's assigned identifier and
    /// extracted text with the locally known name, size, and MIME type.
    pub async fn stage(&self, file: LocalFile) {
        let LocalFile {
            name,
            mime_type,
            size,
            bytes,
        } = file;

        let upload = FileUpload {
            name: name.clone(),
            mime_type: mime_type.clone(),
            bytes,
        };

        match self.backend.upload_file(upload).await {
            Ok(response) => {
                let extracted_text =
                    (!response.extracted_text.is_empty()).then_some(response.extracted_text);
                self.store.add_uploaded_file(UploadedFile {
                    id: response.file_id,
                    name: name.clone(),
                    size,
                    mime_type,
                    extracted_text,
                });
                self.notifier.success(format!("Uploaded {name}"));
            }
            Err(err) => {
                tracing::error!(target: "upload", "Failed to upload {}: {}", name, err);
                self.notifier.error(format!("Failed to upload {name}"));
            }
        }
    }

    /// Uploads a batch of files, each as an independent call.
    pub async fn stage_all(&self, files: Vec<LocalFile>) {
        for file in files {
            self.stage(file).await;
        }
    }

    /// Removes a staged file. Local only, no backend call; it just stops the
    /// file from riding along with the next command submission.
    pub fn unstage(&self, id: &str) {
        self.store.remove_uploaded_file(id);
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
        ApproveStepRequest, ApproveStepResponse, RunAgentRequest, RunAgentResponse, UploadResponse,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails any upload whose filename starts with "bad", succeeds otherwise.
    struct MockBackend {
        uploads: AtomicUsize,
    }

    impl MockBackend {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                uploads: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl CaseBackend for MockBackend {
        async fn run_agent(&self, _request: RunAgentRequest) -> Result<RunAgentResponse> {
            Err(CounselError::internal("not used in this test"))
        }

        async fn upload_file(&self, upload: FileUpload) -> Result<UploadResponse> {
            let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
            if upload.name.starts_with("bad") {
                return Err(CounselError::http(Some(500), "extraction failed"));
            }
            Ok(UploadResponse {
                file_id: format!("file_{n}"),
                extracted_text: "extracted".to_string(),
                filename: Some(upload.name),
                content_type: Some(upload.mime_type),
                size: None,
            })
        }

        async fn fetch_case(&self, _case_id: &str) -> Result<CaseRecord> {
            Err(CounselError::internal("not used in this test"))
        }

        async fn approve_step(&self, _request: ApproveStepRequest) -> Result<ApproveStepResponse> {
            Err(CounselError::internal("not used in this test"))
        }

        async fn fetch_artifact(&self, _path: &str) -> Result<Vec<u8>> {
            Err(CounselError::internal("not used in this test"))
        }
    }

    fn local(name: &str) -> LocalFile {
        LocalFile {
            name: name.to_string(),
            mime_type: "application/pdf".to_string(),
            size: 1024,
            bytes: vec![0u8; 16],
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_batch_failure_stages_only_the_successes() {
        let store = Arc::new(CaseStore::new());
        let notifier = Notifier::new();
        let pipeline = UploadPipeline::new(store.clone(), MockBackend::new(), notifier.clone());

        pipeline
            .stage_all(vec![local("lease.pdf"), local("bad-scan.pdf")])
            .await;

        let files = store.snapshot().uploaded_files;
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "lease.pdf");
        assert_eq!(files[0].id, "file_1");
        assert_eq!(files[0].extracted_text.as_deref(), Some("extracted"));

        let kinds: Vec<ToastKind> = notifier.toasts().iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![ToastKind::Success, ToastKind::Error]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_staged_record_keeps_local_metadata() {
        let store = Arc::new(CaseStore::new());
        let pipeline = UploadPipeline::new(store.clone(), MockBackend::new(), Notifier::new());

        pipeline
            .stage(LocalFile {
                name: "photo.png".to_string(),
                mime_type: "image/png".to_string(),
                size: 4096,
                bytes: vec![1, 2, 3],
            })
            .await;

        let files = store.snapshot().uploaded_files;
        assert_eq!(files[0].size, 4096);
        assert_eq!(files[0].mime_type, "image/png");
    }

    #[tokio::test(start_paused = true)]
    async fn test_unstage_is_local_only() {
        let store = Arc::new(CaseStore::new());
        let backend = MockBackend::new();
        let pipeline = UploadPipeline::new(store.clone(), backend.clone(), Notifier::new());

        pipeline.stage(local("lease.pdf")).await;
        assert_eq!(backend.uploads.load(Ordering::SeqCst), 1);

        pipeline.unstage("file_1");

        assert!(store.snapshot().uploaded_files.is_empty());
        // No additional backend traffic for removal.
        assert_eq!(backend.uploads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_mime_allow_list() {
        assert!(supported_mime_type("application/pdf"));
        assert!(supported_mime_type("image/png"));
        assert!(supported_mime_type("image/jpeg"));
        assert!(supported_mime_type("text/plain"));
        assert!(supported_mime_type(
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        ));
        assert!(!supported_mime_type("application/zip"));
        assert!(!supported_mime_type("video/mp4"));
    }
}
