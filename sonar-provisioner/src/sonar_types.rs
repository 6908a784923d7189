use serde::Deserialize;

/// Value of `health` once SonarQube accepts requests.
pub const READY_SENTINEL: &str = "GREEN";

/// Response from `GET /api/system/health`.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemHealth {
    pub health: Option<String>,
    #[serde(default)]
    pub causes: Vec<HealthCause>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthCause {
    pub message: String,
}

impl SystemHealth {
    pub fn is_ready(&self) -> bool {
        self.health.as_deref() == Some(READY_SENTINEL)
    }
}

/// Response from `GET /api/projects/search`.
#[derive(Debug, Deserialize)]
pub struct ProjectSearch {
    #[serde(default)]
    pub components: Vec<ProjectComponent>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectComponent {
    pub key: String,
}

impl ProjectSearch {
    pub fn contains_key(&self, key: &str) -> bool {
        self.components.iter().any(|c| c.key == key)
    }
}

/// Response from `POST /api/user_tokens/generate`.
#[derive(Debug, Deserialize)]
pub struct GeneratedToken {
    #[serde(default)]
    pub token: Option<String>,
}
