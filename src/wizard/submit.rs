//! Submission boundary between the wizard and the endpoint

use async_trait::async_trait;
use miette::Diagnostic;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

use crate::protocol::{Acknowledgment, Rejection};
use crate::schema::{FieldError, ValidatedRecord};

#[derive(Debug, Error, Diagnostic)]
pub enum SubmitError {
    /// The endpoint re-validated the record and refused it
    #[error("Submission rejected: {message}")]
    #[diagnostic(code(hmv::submit::rejected))]
    Rejected {
        message: String,
        errors: Vec<FieldError>,
    },

    #[error("Unexpected response status {status}")]
    #[diagnostic(code(hmv::submit::unexpected_status))]
    UnexpectedStatus { status: u16 },

    #[error("Submission failed: {0}")]
    #[diagnostic(
        code(hmv::submit::transport),
        help("Check that the endpoint is reachable and try submitting again")
    )]
    Transport(String),
}

/// Sends a validated application somewhere that acknowledges it
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, record: &ValidatedRecord) -> Result<Acknowledgment, SubmitError>;
}

/// Posts applications to the HTTP endpoint
pub struct HttpSubmitter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSubmitter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Submitter for HttpSubmitter {
    async fn submit(&self, record: &ValidatedRecord) -> Result<Acknowledgment, SubmitError> {
        debug!(endpoint = %self.endpoint, "posting application");
        let response = self
            .client
            .post(&self.endpoint)
            .json(record)
            .send()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        match response.status() {
            StatusCode::OK => response
                .json::<Acknowledgment>()
                .await
                .map_err(|e| SubmitError::Transport(format!("unreadable acknowledgment: {}", e))),
            StatusCode::BAD_REQUEST => match response.json::<Rejection>().await {
                Ok(body) => Err(SubmitError::Rejected {
                    message: body.message,
                    errors: body.errors,
                }),
                Err(_) => Err(SubmitError::UnexpectedStatus { status: 400 }),
            },
            status => Err(SubmitError::UnexpectedStatus {
                status: status.as_u16(),
            }),
        }
    }
}

/// Acknowledges locally without any network I/O
#[derive(Debug, Default)]
pub struct DryRunSubmitter;

#[async_trait]
impl Submitter for DryRunSubmitter {
    async fn submit(&self, record: &ValidatedRecord) -> Result<Acknowledgment, SubmitError> {
        debug!(visitor = %record.full_name(), "dry run, application not sent");
        Ok(Acknowledgment {
            message: "dry run".to_string(),
            reference: Some(format!("DRY-{}", ulid::Ulid::new())),
        })
    }
}
