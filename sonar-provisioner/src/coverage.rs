use std::path::{Path, PathBuf};

use crate::error::{ProvisionError, Result};

/// Result of the coverage trigger step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverageOutcome {
    /// Script ran and exited successfully
    Ran,
    /// Prerequisite missing; nothing was spawned
    Skipped(MissingPrerequisite),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingPrerequisite {
    TokenFile(PathBuf),
    Script(PathBuf),
}

/// Run the coverage script once a token file is on disk.
///
/// The token file is checked first, then the script. A missing prerequisite is
/// logged and reported, not treated as an error. A script exiting non-zero is.
pub async fn run_coverage(token_file: &Path, script: &Path) -> Result<CoverageOutcome> {
    if !path_exists(token_file).await {
        tracing::error!(
            token_file = %token_file.display(),
            "Token file not found, skipping code coverage execution"
        );
        return Ok(CoverageOutcome::Skipped(MissingPrerequisite::TokenFile(
            token_file.to_path_buf(),
        )));
    }

    tracing::info!("Token file exists, proceeding to code coverage execution");

    if !path_exists(script).await {
        tracing::error!(
            script = %script.display(),
            "Code coverage script not found, skipping execution"
        );
        return Ok(CoverageOutcome::Skipped(MissingPrerequisite::Script(
            script.to_path_buf(),
        )));
    }

    tracing::info!(script = %script.display(), "Executing code coverage script");

    let status = tokio::process::Command::new("sh")
        .arg(script)
        .status()
        .await
        .map_err(|source| ProvisionError::CoverageSpawn {
            script: script.to_path_buf(),
            source,
        })?;

    if !status.success() {
        return Err(ProvisionError::CoverageFailed {
            script: script.to_path_buf(),
            code: status.code(),
        });
    }

    tracing::info!("Code coverage script finished");
    Ok(CoverageOutcome::Ran)
}

async fn path_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}
