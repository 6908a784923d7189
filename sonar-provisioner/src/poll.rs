use async_trait::async_trait;
use std::time::Duration;

use crate::error::{ProvisionError, Result};
use crate::sonar_client::SonarApi;
use crate::sonar_types::SystemHealth;

/// How the health endpoint is polled before provisioning starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Fixed delay between two health checks
    pub interval: Duration,
    /// `None` polls until the server is ready, however long that takes
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: None,
        }
    }
}

/// Source of delays between health checks.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Block until the server reports the ready sentinel.
///
/// Transport failures, non-2xx answers and undecodable bodies all count as
/// "not ready yet". Returns the number of health checks performed.
pub async fn wait_until_ready<A, S>(api: &A, sleeper: &S, policy: &PollPolicy) -> Result<u32>
where
    A: SonarApi + ?Sized,
    S: Sleeper + ?Sized,
{
    tracing::info!("Waiting for SonarQube to be ready...");

    let mut attempts: u32 = 0;
    loop {
        attempts += 1;

        match api.system_health().await {
            Ok(health) if health.is_ready() => {
                tracing::info!(attempts, "SonarQube is ready");
                return Ok(attempts);
            }
            Ok(health) => log_not_ready(&health, attempts),
            Err(e) => {
                tracing::warn!(attempt = attempts, error = %e, "Error connecting to SonarQube");
            }
        }

        if let Some(max) = policy.max_attempts {
            if attempts >= max {
                return Err(ProvisionError::NotReady { attempts });
            }
        }

        sleeper.sleep(policy.interval).await;
    }
}

fn log_not_ready(health: &SystemHealth, attempt: u32) {
    let status = health.health.as_deref().unwrap_or("None");
    let causes: Vec<&str> = health.causes.iter().map(|c| c.message.as_str()).collect();

    if causes.is_empty() {
        tracing::info!(attempt, status, "Current health status - waiting...");
    } else {
        tracing::info!(
            attempt,
            status,
            causes = %causes.join("; "),
            "Current health status - waiting..."
        );
    }
}
