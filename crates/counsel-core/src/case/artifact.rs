use serde::{Deserialize, Serialize};

/// Reference to a backend-held document.
///
/// No content is held client-side until explicitly fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Backend storage path, used to fetch the document bytes.
    pub path: String,
    /// Display filename.
    pub name: String,
    /// File kind (usually the extension, e.g. "pdf").
    #[serde(rename = "type")]
    pub kind: String,
    /// Size in bytes, when the backend reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}
