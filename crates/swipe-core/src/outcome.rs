use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{Domain, ProviderId, ServiceError, UtcDateTime};

/// Schema version stamped on every outcome.
pub const SCHEMA_VERSION: &str = "v1.0.0";

/// Terminal status of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Ok,
    NotFound,
    InvalidInput,
    UpstreamUnavailable,
    Internal,
}

impl OutcomeStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NotFound => "not_found",
            Self::InvalidInput => "invalid_input",
            Self::UpstreamUnavailable => "upstream_unavailable",
            Self::Internal => "internal",
        }
    }

    /// Status code a transport layer should answer with.
    pub const fn http_status(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::NotFound => 404,
            Self::InvalidInput => 400,
            Self::UpstreamUnavailable => 503,
            Self::Internal => 500,
        }
    }

    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform result of every endpoint: a payload on success, a message otherwise.
///
/// Built once by the coordinator and never mutated afterwards; fields are only
/// reachable through getters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestOutcome {
    status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    meta: OutcomeMeta,
}

impl RequestOutcome {
    pub fn ok(meta: OutcomeMeta, payload: Value) -> Self {
        Self {
            status: OutcomeStatus::Ok,
            payload: Some(payload),
            message: None,
            meta,
        }
    }

    pub fn failure(meta: OutcomeMeta, error: &ServiceError) -> Self {
        Self {
            status: error.status(),
            payload: None,
            message: Some(error.to_string()),
            meta,
        }
    }

    pub const fn status(&self) -> OutcomeStatus {
        self.status
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub const fn meta(&self) -> &OutcomeMeta {
        &self.meta
    }

    pub fn into_payload(self) -> Option<Value> {
        self.payload
    }
}

/// Metadata attached to every outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeMeta {
    pub request_id: String,
    pub schema_version: String,
    pub domain: Domain,
    pub provider: ProviderId,
    pub generated_at: UtcDateTime,
    pub latency_ms: u64,
}

impl OutcomeMeta {
    /// Metadata for a fresh request with a generated v4 request id.
    pub fn for_request(domain: Domain, latency_ms: u64) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            schema_version: String::from(SCHEMA_VERSION),
            domain,
            provider: domain.provider(),
            generated_at: UtcDateTime::now(),
            latency_ms,
        }
    }
}
