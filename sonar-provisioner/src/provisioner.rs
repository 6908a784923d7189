use crate::config::Config;
use crate::coverage::{self, CoverageOutcome};
use crate::error::Result;
use crate::poll::{self, Sleeper};
use crate::sonar_client::SonarApi;
use crate::token;

/// What the project step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectOutcome {
    AlreadyExists,
    Created { token_written: bool },
}

/// Summary of a completed provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    pub health_checks: u32,
    pub project: ProjectOutcome,
    pub coverage: CoverageOutcome,
}

/// Sequential driver: wait for the server, ensure the project (and its token),
/// then trigger the coverage script.
pub struct Provisioner<A, S> {
    api: A,
    sleeper: S,
    config: Config,
}

impl<A: SonarApi, S: Sleeper> Provisioner<A, S> {
    pub fn new(api: A, sleeper: S, config: Config) -> Self {
        Self {
            api,
            sleeper,
            config,
        }
    }

    pub async fn run(&self) -> Result<ProvisionReport> {
        let health_checks =
            poll::wait_until_ready(&self.api, &self.sleeper, &self.config.poll_policy()).await?;

        let project = self.ensure_project().await?;

        let coverage =
            coverage::run_coverage(&self.config.token_file, &self.config.coverage_script).await?;

        tracing::info!("Setup complete.");

        Ok(ProvisionReport {
            health_checks,
            project,
            coverage,
        })
    }

    /// Create the project and its token unless the project is already registered.
    ///
    /// No rollback: a project created before a failing token request stays.
    pub async fn ensure_project(&self) -> Result<ProjectOutcome> {
        let key = &self.config.project_key;

        if self.api.project_exists(key).await? {
            tracing::info!(project_key = %key, "Project already exists");
            return Ok(ProjectOutcome::AlreadyExists);
        }

        tracing::info!(project_key = %key, "Creating project...");
        self.api
            .create_project(&self.config.project_name, key)
            .await?;
        tracing::info!(project_key = %key, "Project created successfully");

        let token_written = self.generate_token().await?;
        Ok(ProjectOutcome::Created { token_written })
    }

    /// Request a token and persist it. Returns whether a token was written.
    pub async fn generate_token(&self) -> Result<bool> {
        tracing::info!(token_name = %self.config.token_name, "Generating token...");

        let Some(value) = self.api.generate_token(&self.config.token_name).await? else {
            tracing::warn!(
                token_name = %self.config.token_name,
                "Token generation failed or token already exists"
            );
            return Ok(false);
        };

        token::write_token(&self.config.token_file, &value).await?;

        let shown = if self.config.log_token {
            value.clone()
        } else {
            token::redact(&value)
        };
        tracing::info!(
            token_file = %self.config.token_file.display(),
            token = %shown,
            "Token generated and saved"
        );

        Ok(true)
    }
}
