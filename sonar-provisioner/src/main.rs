use anyhow::{Context, Result};
use std::process::ExitCode;
use tracing::{error, info};

use sonar_provisioner::poll::TokioSleeper;
use sonar_provisioner::sonar_client::SonarClient;
use sonar_provisioner::{Config, ProvisionError, Provisioner};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sonar_provisioner=info".into()),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "Provisioning failed");
            let code = e
                .downcast_ref::<ProvisionError>()
                .map(ProvisionError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

async fn run() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!("SonarQube: {}", config.sonar_url);
    info!("Project: {} ({})", config.project_key, config.project_name);
    info!("Token file: {}", config.token_file.display());
    info!("Coverage script: {}", config.coverage_script.display());

    let client = SonarClient::new(
        &config.sonar_url,
        config.credentials.clone(),
        config.request_timeout(),
        config.health_timeout(),
    )
    .context("Failed to create SonarQube client")?;

    let report = Provisioner::new(client, TokioSleeper, config).run().await?;

    info!(
        health_checks = report.health_checks,
        project = ?report.project,
        coverage = ?report.coverage,
        "Provisioning finished"
    );

    Ok(())
}
