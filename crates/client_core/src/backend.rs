//! Transport seam between the flow controller and the remote plan service.

use std::{fmt, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    error::ErrorDetail,
    protocol::{
        AuthResponse, CredentialsRequest, GuestRequest, InputRequest, PlanResult,
        WorkflowRunRequest,
    },
};
use tracing::debug;

use crate::{config::ClientSettings, error::ClientError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Signup,
    Login,
    Guest,
    Input,
    WorkflowRun,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Signup => "/auth/signup",
            Endpoint::Login => "/auth/login",
            Endpoint::Guest => "/auth/guest",
            Endpoint::Input => "/input",
            Endpoint::WorkflowRun => "/workflow/run",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[async_trait]
pub trait FlowBackend: Send + Sync {
    async fn signup(&self, request: &CredentialsRequest) -> Result<AuthResponse, ClientError>;
    async fn login(&self, request: &CredentialsRequest) -> Result<AuthResponse, ClientError>;
    async fn guest(&self, request: &GuestRequest) -> Result<AuthResponse, ClientError>;
    /// Stores the baseline. The response body carries nothing the client uses.
    async fn submit_input(&self, request: &InputRequest) -> Result<(), ClientError>;
    async fn run_workflow(&self, request: &WorkflowRunRequest)
        -> Result<PlanResult, ClientError>;
}

pub struct HttpBackend {
    http: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(seconds) = settings.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let http = builder
            .build()
            .context("failed to build backend http client")?;
        Ok(Self::with_client(http, settings.backend_url.clone()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    async fn post_json<B>(&self, endpoint: Endpoint, body: &B) -> Result<Vec<u8>, ClientError>
    where
        B: Serialize + ?Sized + Sync,
    {
        debug!(%endpoint, base_url = %self.base_url, "backend request");
        let response = self
            .http
            .post(self.url(endpoint))
            .json(body)
            .send()
            .await
            .map_err(|source| ClientError::Transport { endpoint, source })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ClientError::Transport { endpoint, source })?;
        debug!(%endpoint, status = status.as_u16(), "backend response");

        if !status.is_success() {
            return Err(ClientError::Status {
                endpoint,
                status: status.as_u16(),
                detail: ErrorDetail::from_body(&bytes).message(),
            });
        }
        Ok(bytes.to_vec())
    }

    async fn post_for<B, T>(&self, endpoint: Endpoint, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let bytes = self.post_json(endpoint, body).await?;
        serde_json::from_slice(&bytes).map_err(|err| ClientError::InvalidResponseShape {
            endpoint,
            reason: err.to_string(),
        })
    }
}

#[async_trait]
impl FlowBackend for HttpBackend {
    async fn signup(&self, request: &CredentialsRequest) -> Result<AuthResponse, ClientError> {
        self.post_for(Endpoint::Signup, request).await
    }

    async fn login(&self, request: &CredentialsRequest) -> Result<AuthResponse, ClientError> {
        self.post_for(Endpoint::Login, request).await
    }

    async fn guest(&self, request: &GuestRequest) -> Result<AuthResponse, ClientError> {
        self.post_for(Endpoint::Guest, request).await
    }

    async fn submit_input(&self, request: &InputRequest) -> Result<(), ClientError> {
        self.post_json(Endpoint::Input, request).await.map(|_| ())
    }

    async fn run_workflow(
        &self,
        request: &WorkflowRunRequest,
    ) -> Result<PlanResult, ClientError> {
        let bytes = self.post_json(Endpoint::WorkflowRun, request).await?;
        PlanResult::validate_slice(&bytes).map_err(|err| ClientError::InvalidResponseShape {
            endpoint: Endpoint::WorkflowRun,
            reason: err.0,
        })
    }
}
