use std::path::PathBuf;

use reqwest::StatusCode;

pub type Result<T> = std::result::Result<T, ProvisionError>;

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {endpoint}: {body}")]
    Http {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("SonarQube not ready after {attempts} health checks")]
    NotReady { attempts: u32 },

    #[error("failed to start coverage script {}: {source}", script.display())]
    CoverageSpawn {
        script: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("coverage script {} exited with {}", script.display(), describe_exit(*code))]
    CoverageFailed { script: PathBuf, code: Option<i32> },
}

impl ProvisionError {
    /// Process exit status for this failure. A failing coverage script hands its
    /// own code through; everything else maps to 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::CoverageFailed { code: Some(code), .. } => {
                u8::try_from(*code).ok().filter(|c| *c != 0).unwrap_or(1)
            }
            _ => 1,
        }
    }
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}
