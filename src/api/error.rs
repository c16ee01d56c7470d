use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, warn};
use uuid::Uuid;

/// Subsystem that raised an error
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Domain {
    App,
    Storage,
    Tenant,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorDetails {
    pub reason: String,
    pub domain: Domain,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Structured error payload returned by every failing endpoint
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorBody {
    /// Mirrors the HTTP status of the response
    pub code: u16,
    pub message: String,
    /// Machine readable token, e.g. `JOB_LIST`
    pub status: String,
    pub details: ErrorDetails,
}

impl ErrorBody {
    pub fn new(code: StatusCode, message: impl Into<String>, status: &str, reason: &str) -> Self {
        Self {
            code: code.as_u16(),
            message: message.into(),
            status: status.to_string(),
            details: ErrorDetails {
                reason: reason.to_string(),
                domain: Domain::App,
                metadata: None,
            },
        }
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.details.domain = domain;
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.details.metadata = Some(metadata);
        self
    }
}

/// Log event ids, one per logical group of job operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventId {
    Index = 1000,
    Update = 3000,
    Delete = 4000,
    List = 5000,
    Sample = 6000,
}

/// Job endpoints that can fail, each with its own status/reason pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOperation {
    List,
    Sample,
    Get(Uuid),
    Update(Uuid),
    Delete(Uuid),
    Forced,
}

impl JobOperation {
    pub fn event_id(&self) -> EventId {
        match self {
            JobOperation::List => EventId::List,
            JobOperation::Sample => EventId::Sample,
            JobOperation::Get(_) | JobOperation::Forced => EventId::Index,
            JobOperation::Update(_) => EventId::Update,
            JobOperation::Delete(_) => EventId::Delete,
        }
    }

    /// The 400 payload reported when this operation fails
    pub fn error_body(&self) -> ErrorBody {
        let (message, status, reason) = match self {
            JobOperation::List => ("Unable to retrieve job list".to_string(), "JOB_LIST", "JL-2"),
            JobOperation::Sample => ("Could not generate samples".to_string(), "SAMPLE_CREATE", "JS-1"),
            JobOperation::Get(id) => (format!("Unable to retrieve job {}", id), "JOB_GET", "JG-2"),
            JobOperation::Update(id) => (format!("Unable to update job {}", id), "JOB_UPDATE", "JU-1"),
            JobOperation::Delete(id) => (format!("Unable to delete job {}", id), "JOB_DELETE", "JD-1"),
            JobOperation::Forced => ("forced error thrown".to_string(), "JOB_ERROR", "JE-1"),
        };
        ErrorBody::new(StatusCode::BAD_REQUEST, message, status, reason)
    }
}

/// Handler level failure
#[derive(Debug)]
pub enum ApiError {
    /// Record absent, answered with an empty 404
    NotFound(EventId, Uuid),

    /// Any failure of an operation, answered with its `ErrorBody`
    Failed(ErrorBody),
}

impl ApiError {
    /// Log the underlying cause once and wrap it in the operation's payload
    pub fn failed(operation: JobOperation, cause: impl fmt::Display) -> Self {
        let body = operation.error_body();
        let event_id = operation.event_id() as u16;
        error!(
            event_id,
            status = %body.status,
            reason = %body.details.reason,
            "{}: {}",
            body.message,
            cause
        );
        ApiError::Failed(body)
    }

    pub fn forced() -> Self {
        let operation = JobOperation::Forced;
        let body = operation.error_body();
        let event_id = operation.event_id() as u16;
        error!(event_id, status = %body.status, "{}", body.message);
        ApiError::Failed(body)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(_, id) => write!(f, "Job not found {}", id),
            ApiError::Failed(body) => write!(f, "{} ({})", body.message, body.status),
        }
    }
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(..) => StatusCode::NOT_FOUND,
            ApiError::Failed(body) => {
                StatusCode::from_u16(body.code).unwrap_or(StatusCode::BAD_REQUEST)
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::NotFound(event_id, id) => {
                let event_id = *event_id as u16;
                warn!(event_id, "Job not found {}", id);
                HttpResponse::NotFound().finish()
            }
            ApiError::Failed(body) => HttpResponse::build(self.status_code()).json(body),
        }
    }
}
