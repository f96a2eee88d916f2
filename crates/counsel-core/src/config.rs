use serde::{Deserialize, Serialize};

/// Secret configuration persisted in `secret.json`.
///
/// Holds exactly one credential: the API key forwarded to the backend as the
/// `x-api-key` header. An absent key means requests go out without the header.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretConfig {
    /// Backend API key, if one has been stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Client configuration persisted in `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the backend orchestration service, including the API path.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// User identifier sent with every run-agent submission.
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_id: default_user_id(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_user_id() -> String {
    "default_user".to_string()
}
