// Export modules for testing
pub mod config;
pub mod coverage;
pub mod error;
pub mod poll;
pub mod provisioner;
pub mod sonar_client;
pub mod sonar_types;
pub mod token;

pub use config::Config;
pub use error::ProvisionError;
pub use provisioner::{ProjectOutcome, ProvisionReport, Provisioner};
