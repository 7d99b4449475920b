// ABOUTME: Classification of remote failures into reportable problems.
// ABOUTME: Every remote error is funneled through one handler into the listener.

use serde::Serialize;
use std::fmt;

use crate::listener::DeploymentListener;

/// Error returned by the object store or deployment service collaborators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The service received the request and answered with a structured error.
    #[error("{message}")]
    Service {
        service_name: String,
        error_type: String,
        status_code: u16,
        error_code: String,
        request_id: Option<String>,
        message: String,
    },

    /// The request never produced a service answer (transport, signing, client config).
    #[error("{0}")]
    Client(String),

    /// Anything else, including an interrupted poll wait.
    #[error("{0}")]
    Unexpected(String),
}

/// Category of a reported problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProblemType {
    Service,
    Client,
    Unexpected,
}

impl fmt::Display for ProblemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProblemType::Service => "SERVICE",
            ProblemType::Client => "CLIENT",
            ProblemType::Unexpected => "UNEXPECTED",
        })
    }
}

/// A classified failure, ready for a notification sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Problem {
    pub message: String,
    /// Stable identity for deduplicating recurring service errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    #[serde(rename = "type")]
    pub problem_type: ProblemType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&RemoteError> for Problem {
    fn from(err: &RemoteError) -> Self {
        match err {
            RemoteError::Service {
                service_name,
                error_type,
                status_code,
                error_code,
                request_id,
                message,
            } => Problem {
                message: format!("Service error: {}", trim_period(message)),
                identity: Some(format!(
                    "{service_name}{error_type}{status_code}{error_code}"
                )),
                problem_type: ProblemType::Service,
                details: Some(format!(
                    "Service: {service_name}\n\
                     HTTP Status Code: {status_code}\n\
                     Error Code: {error_code}\n\
                     Error Type: {error_type}\n\
                     Request ID: {}",
                    request_id.as_deref().unwrap_or("-")
                )),
            },
            RemoteError::Client(message) => Problem {
                message: format!("Client error: {}", trim_period(message)),
                identity: None,
                problem_type: ProblemType::Client,
                details: None,
            },
            RemoteError::Unexpected(message) => Problem {
                message: format!("Unexpected error: {}", trim_period(message)),
                identity: None,
                problem_type: ProblemType::Unexpected,
                details: None,
            },
        }
    }
}

/// Classify a remote failure and hand it to the listener exactly once.
pub(crate) fn report(listener: &dyn DeploymentListener, err: &RemoteError) {
    let problem = Problem::from(err);
    tracing::warn!("{} ({})", problem.message, problem.problem_type);
    listener.exception(&problem);
}

/// Drop one trailing period.
fn trim_period(message: &str) -> &str {
    let message = message.trim();
    message.strip_suffix('.').unwrap_or(message)
}
