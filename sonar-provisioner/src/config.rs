use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::poll::PollPolicy;

pub const DEFAULT_SONAR_URL: &str = "http://tc-cloudgames-sonarqube:9000";
pub const DEFAULT_ADMIN_USER: &str = "admin";
pub const DEFAULT_PROJECT_KEY: &str = "tc-cloudgames-local";
pub const DEFAULT_PROJECT_NAME: &str = "TCCloudGames";
pub const DEFAULT_TOKEN_NAME: &str = "tc-cloudgames-token";
pub const DEFAULT_TOKEN_FILE: &str = "./token_data/sonar-token.txt";
pub const DEFAULT_COVERAGE_SCRIPT: &str = "/scripts/code_coverage.sh";

/// Provisioner configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // SonarQube API
    pub sonar_url: String,
    pub credentials: Credentials,

    // Project and token identity
    pub project_key: String,
    pub project_name: String,
    pub token_name: String,

    // Filesystem
    pub token_file: PathBuf,
    pub coverage_script: PathBuf,

    // Health polling
    pub health_interval_seconds: u64,
    pub health_timeout_seconds: u64,
    pub health_max_attempts: Option<u32>,

    // Timeout for search, create and token requests
    pub request_timeout_seconds: u64,

    // Print generated tokens in clear text (debugging only)
    pub log_token: bool,
}

/// HTTP basic-auth credentials for the SonarQube admin account
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Required:
    /// - SONAR_ADMIN_PASSWORD: password of the admin account
    ///
    /// Optional:
    /// - SONAR_URL: SonarQube base URL (default: http://tc-cloudgames-sonarqube:9000)
    /// - SONAR_ADMIN_USER: admin login (default: admin)
    /// - SONAR_PROJECT_KEY / SONAR_PROJECT_NAME: project to ensure
    /// - SONAR_TOKEN_NAME: name of the generated user token
    /// - SONAR_TOKEN_FILE: where the token is written (default: ./token_data/sonar-token.txt)
    /// - CODE_COVERAGE_SCRIPT: script run once a token exists (default: /scripts/code_coverage.sh)
    /// - SONAR_HEALTH_INTERVAL: seconds between health checks (default: 5)
    /// - SONAR_HEALTH_TIMEOUT: per-request health check timeout in seconds (default: 5)
    /// - SONAR_HEALTH_MAX_ATTEMPTS: give up after this many checks (default: never)
    /// - SONAR_REQUEST_TIMEOUT: timeout for every other API request in seconds (default: 60)
    /// - SONAR_LOG_TOKEN: log generated tokens in clear text (default: false)
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let password = lookup("SONAR_ADMIN_PASSWORD")
            .filter(|v| !v.is_empty())
            .context("SONAR_ADMIN_PASSWORD environment variable is required")?;

        let health_interval_seconds = var("SONAR_HEALTH_INTERVAL", "5")
            .parse::<u64>()
            .context("SONAR_HEALTH_INTERVAL must be a valid number")?;

        let health_timeout_seconds = var("SONAR_HEALTH_TIMEOUT", "5")
            .parse::<u64>()
            .context("SONAR_HEALTH_TIMEOUT must be a valid number")?;

        let health_max_attempts = match lookup("SONAR_HEALTH_MAX_ATTEMPTS").filter(|v| !v.is_empty()) {
            Some(raw) => Some(
                raw.parse::<u32>()
                    .context("SONAR_HEALTH_MAX_ATTEMPTS must be a valid number")?,
            ),
            None => None,
        };

        let request_timeout_seconds = var("SONAR_REQUEST_TIMEOUT", "60")
            .parse::<u64>()
            .context("SONAR_REQUEST_TIMEOUT must be a valid number")?;

        let log_token = var("SONAR_LOG_TOKEN", "false")
            .parse::<bool>()
            .context("SONAR_LOG_TOKEN must be 'true' or 'false'")?;

        Ok(Config {
            sonar_url: var("SONAR_URL", DEFAULT_SONAR_URL)
                .trim_end_matches('/')
                .to_string(),
            credentials: Credentials {
                user: var("SONAR_ADMIN_USER", DEFAULT_ADMIN_USER),
                password,
            },
            project_key: var("SONAR_PROJECT_KEY", DEFAULT_PROJECT_KEY),
            project_name: var("SONAR_PROJECT_NAME", DEFAULT_PROJECT_NAME),
            token_name: var("SONAR_TOKEN_NAME", DEFAULT_TOKEN_NAME),
            token_file: PathBuf::from(var("SONAR_TOKEN_FILE", DEFAULT_TOKEN_FILE)),
            coverage_script: PathBuf::from(var("CODE_COVERAGE_SCRIPT", DEFAULT_COVERAGE_SCRIPT)),
            health_interval_seconds,
            health_timeout_seconds,
            health_max_attempts,
            request_timeout_seconds,
            log_token,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.sonar_url.is_empty() {
            bail!("SonarQube URL cannot be empty");
        }

        if !self.sonar_url.starts_with("http://") && !self.sonar_url.starts_with("https://") {
            bail!("SonarQube URL must start with http:// or https://");
        }

        if self.credentials.user.is_empty() {
            bail!("SonarQube admin user cannot be empty");
        }

        if self.project_key.is_empty() || self.project_name.is_empty() {
            bail!("Project key and name cannot be empty");
        }

        if self.token_name.is_empty() {
            bail!("Token name cannot be empty");
        }

        if self.health_interval_seconds == 0 {
            bail!("Health check interval must be at least 1 second");
        }

        if self.health_timeout_seconds == 0 || self.health_timeout_seconds > 300 {
            bail!("Health check timeout must be between 1 and 300 seconds");
        }

        if self.request_timeout_seconds == 0 || self.request_timeout_seconds > 3600 {
            bail!("Request timeout must be between 1 and 3600 seconds");
        }

        if self.health_max_attempts == Some(0) {
            bail!("SONAR_HEALTH_MAX_ATTEMPTS must be at least 1 when set");
        }

        Ok(())
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_secs(self.health_interval_seconds),
            max_attempts: self.health_max_attempts,
        }
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}
