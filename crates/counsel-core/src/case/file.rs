use serde::{Deserialize, Serialize};

/// A file uploaded to the backend and staged for the next command submission.
///
/// Created by the upload pipeline from the backend's assigned identifier and
/// extracted text plus the locally known name, size, and MIME type. Removal
/// is a pure local operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Backend-assigned file identifier.
    pub id: String,
    /// Original filename.
    pub name: String,
    /// File size in bytes.
    pub size: u64,
    /// MIME type as known at selection time.
    pub mime_type: String,
    /// Text the backend extracted from the document (OCR or plain read).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
}
