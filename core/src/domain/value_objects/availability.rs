//! Username availability check result

use serde::Serialize;

/// Result of a username availability query
#[derive(Debug, Clone, Serialize)]
pub struct CheckUsername {
    pub available: bool,

    /// Alternatives offered when the name is taken
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

impl CheckUsername {
    pub fn available() -> Self {
        Self {
            available: true,
            suggestions: None,
        }
    }

    pub fn taken(suggestions: Vec<String>) -> Self {
        Self {
            available: false,
            suggestions: Some(suggestions),
        }
    }
}
