use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Credentials;
use crate::error::{ProvisionError, Result};
use crate::sonar_types::{GeneratedToken, ProjectSearch, SystemHealth};

pub const HEALTH_ENDPOINT: &str = "/api/system/health";
pub const PROJECT_SEARCH_ENDPOINT: &str = "/api/projects/search";
pub const PROJECT_CREATE_ENDPOINT: &str = "/api/projects/create";
pub const TOKEN_GENERATE_ENDPOINT: &str = "/api/user_tokens/generate";

/// The SonarQube web API calls the provisioner depends on.
#[async_trait]
pub trait SonarApi: Send + Sync {
    /// Fetch the server health. Any error here is treated as "not ready yet".
    async fn system_health(&self) -> Result<SystemHealth>;

    /// Whether a project with `key` is already registered.
    async fn project_exists(&self, key: &str) -> Result<bool>;

    async fn create_project(&self, name: &str, key: &str) -> Result<()>;

    /// Generate a user token. `Ok(None)` when the server answers without one.
    async fn generate_token(&self, name: &str) -> Result<Option<String>>;
}

#[async_trait]
impl<T: SonarApi + ?Sized> SonarApi for Arc<T> {
    async fn system_health(&self) -> Result<SystemHealth> {
        (**self).system_health().await
    }

    async fn project_exists(&self, key: &str) -> Result<bool> {
        (**self).project_exists(key).await
    }

    async fn create_project(&self, name: &str, key: &str) -> Result<()> {
        (**self).create_project(name, key).await
    }

    async fn generate_token(&self, name: &str) -> Result<Option<String>> {
        (**self).generate_token(name).await
    }
}

/// HTTP client for the SonarQube web API
#[derive(Clone)]
pub struct SonarClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
    health_timeout: Duration,
}

impl SonarClient {
    /// Create a new SonarQube client
    ///
    /// `request_timeout` bounds search, create and token requests; health checks
    /// use the shorter `health_timeout`.
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        request_timeout: Duration,
        health_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|source| ProvisionError::Transport {
                endpoint: "client builder",
                source,
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            health_timeout,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn send(
        &self,
        endpoint: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<Response> {
        let response = request
            .basic_auth(&self.credentials.user, Some(&self.credentials.password))
            .send()
            .await
            .map_err(|source| ProvisionError::Transport { endpoint, source })?;

        let status = response.status();
        tracing::debug!(endpoint, status = %status, "SonarQube response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProvisionError::Http {
                endpoint,
                status,
                body,
            });
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(endpoint: &'static str, response: Response) -> Result<T> {
        response
            .json::<T>()
            .await
            .map_err(|source| ProvisionError::Decode { endpoint, source })
    }
}

#[async_trait]
impl SonarApi for SonarClient {
    async fn system_health(&self) -> Result<SystemHealth> {
        let request = self
            .client
            .get(self.url(HEALTH_ENDPOINT))
            .timeout(self.health_timeout);

        let response = self.send(HEALTH_ENDPOINT, request).await?;
        Self::decode(HEALTH_ENDPOINT, response).await
    }

    async fn project_exists(&self, key: &str) -> Result<bool> {
        let request = self
            .client
            .get(self.url(PROJECT_SEARCH_ENDPOINT))
            .query(&[("projects", key)]);

        let response = self.send(PROJECT_SEARCH_ENDPOINT, request).await?;
        let search: ProjectSearch = Self::decode(PROJECT_SEARCH_ENDPOINT, response).await?;

        Ok(search.contains_key(key))
    }

    async fn create_project(&self, name: &str, key: &str) -> Result<()> {
        let request = self
            .client
            .post(self.url(PROJECT_CREATE_ENDPOINT))
            .form(&[("name", name), ("project", key)]);

        self.send(PROJECT_CREATE_ENDPOINT, request).await?;
        Ok(())
    }

    async fn generate_token(&self, name: &str) -> Result<Option<String>> {
        let request = self
            .client
            .post(self.url(TOKEN_GENERATE_ENDPOINT))
            .form(&[("name", name)]);

        let response = self.send(TOKEN_GENERATE_ENDPOINT, request).await?;
        let generated: GeneratedToken = Self::decode(TOKEN_GENERATE_ENDPOINT, response).await?;

        Ok(generated.token.filter(|t| !t.is_empty()))
    }
}
