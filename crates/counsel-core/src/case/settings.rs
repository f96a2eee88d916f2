//! User-tunable case settings.

use serde::{Deserialize, Serialize};

/// User-tunable settings for how the backend works a case.
///
/// Settings are mutated only by partial merge and survive a session reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Budget vs. thoroughness slider, 0-100 (0 = fast and cheap).
    pub budget: u8,
    /// Thoroughness level, 0-100.
    pub thoroughness: u8,
    /// Whether agent output should avoid legalese.
    pub plain_english: bool,
    /// Jurisdiction code (e.g. "CA", "NY").
    pub jurisdiction: String,
    /// Maximum planning depth for the master agent.
    pub max_depth: u8,
    /// Token budget per run.
    pub token_budget: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            budget: 50,
            thoroughness: 75,
            plain_english: true,
            jurisdiction: "CA".to_string(),
            max_depth: 5,
            token_budget: 10_000,
        }
    }
}

/// Partial settings update; only `Some` fields are merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub budget: Option<u8>,
    pub thoroughness: Option<u8>,
    pub plain_english: Option<bool>,
    pub jurisdiction: Option<String>,
    pub max_depth: Option<u8>,
    pub token_budget: Option<u32>,
}

impl SettingsPatch {
    /// Shallow-merges this patch into `settings`.
    pub(crate) fn apply(&self, settings: &mut Settings) {
        if let Some(budget) = self.budget {
            settings.budget = budget;
        }
        if let Some(thoroughness) = self.thoroughness {
            settings.thoroughness = thoroughness;
        }
        if let Some(plain_english) = self.plain_english {
            settings.plain_english = plain_english;
        }
        if let Some(jurisdiction) = &self.jurisdiction {
            settings.jurisdiction = jurisdiction.clone();
        }
        if let Some(max_depth) = self.max_depth {
            settings.max_depth = max_depth;
        }
        if let Some(token_budget) = self.token_budget {
            settings.token_budget = token_budget;
        }
    }
}
