//! Primary/secondary fetch orchestration.
//!
//! Every endpoint runs through [`PartialFetchCoordinator::run`], which is the
//! single place where internal failures become an [`OutcomeStatus`]. The
//! primary fetch decides the request's fate; secondary fetches degrade into a
//! [`SubFetchOutcome::Failed`] slot and never abort the payload.
//!
//! Dropping the future returned by `run` abandons every in-flight call, so a
//! cancelled inbound request releases its upstream work immediately.

use std::future::Future;
use std::time::{Duration, Instant};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::catalog::{FieldCatalog, FieldSelection, ResolvedFields};
use crate::gateway::GatewayError;
use crate::outcome::{OutcomeMeta, OutcomeStatus, RequestOutcome};
use crate::{Domain, ServiceError};

/// Result of one optional sub-fetch, attached under a named payload slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SubFetchOutcome<T> {
    Success(T),
    /// The provider answered with nothing; serialized as `[]`.
    Empty,
    /// Serialized as `{"error": message}`.
    Failed(String),
}

impl<T> SubFetchOutcome<T> {
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SubFetchOutcome<U> {
        match self {
            Self::Success(value) => SubFetchOutcome::Success(f(value)),
            Self::Empty => SubFetchOutcome::Empty,
            Self::Failed(message) => SubFetchOutcome::Failed(message),
        }
    }

    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

impl<U> SubFetchOutcome<Vec<U>> {
    /// Classifies a collection result; an empty collection is `Empty`.
    pub fn from_collection(result: Result<Vec<U>, String>) -> Self {
        match result {
            Ok(items) if items.is_empty() => Self::Empty,
            Ok(items) => Self::Success(items),
            Err(message) => Self::Failed(message),
        }
    }
}

impl<T: Serialize> Serialize for SubFetchOutcome<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Success(value) => value.serialize(serializer),
            Self::Empty => serializer.collect_seq(std::iter::empty::<Value>()),
            Self::Failed(message) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", message)?;
                map.end()
            }
        }
    }
}

/// Orchestrates field resolution, the bounded primary fetch and isolated
/// secondary fetches for one request at a time. Holds no per-request state.
#[derive(Debug, Clone, Copy)]
pub struct PartialFetchCoordinator {
    call_timeout: Duration,
}

impl PartialFetchCoordinator {
    pub const fn new(call_timeout: Duration) -> Self {
        Self { call_timeout }
    }

    pub const fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Resolves `selection`, then runs `body` with the resolved fields.
    ///
    /// Resolution failures return `InvalidInput` before `body` is polled, so
    /// no network call is made for a bad field list.
    pub async fn run<F, Fut>(
        &self,
        catalog: &FieldCatalog,
        selection: &FieldSelection,
        body: F,
    ) -> RequestOutcome
    where
        F: FnOnce(ResolvedFields) -> Fut,
        Fut: Future<Output = Result<Value, ServiceError>>,
    {
        let started = Instant::now();
        let domain = catalog.domain();
        debug!(domain = %domain, "handling request");

        let result = match catalog.resolve(selection) {
            Ok(fields) => body(fields).await,
            Err(error) => Err(ServiceError::from(error)),
        };

        self.finish(domain, started, result)
    }

    /// Runs a lookup whose payload is the provider record itself, with no
    /// field catalog involved.
    pub async fn run_lookup<Fut>(&self, domain: Domain, body: Fut) -> RequestOutcome
    where
        Fut: Future<Output = Result<Value, ServiceError>>,
    {
        let started = Instant::now();
        debug!(domain = %domain, "handling lookup");
        let result = body.await;
        self.finish(domain, started, result)
    }

    /// Turns a finished request into its outcome and logs it.
    pub fn finish(
        &self,
        domain: Domain,
        started: Instant,
        result: Result<Value, ServiceError>,
    ) -> RequestOutcome {
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let meta = OutcomeMeta::for_request(domain, latency_ms);

        let outcome = match result {
            Ok(payload) => RequestOutcome::ok(meta, payload),
            Err(error) => RequestOutcome::failure(meta, &error),
        };

        match outcome.status() {
            OutcomeStatus::Ok | OutcomeStatus::NotFound | OutcomeStatus::InvalidInput => info!(
                domain = %domain,
                status = %outcome.status(),
                latency_ms,
                request_id = %outcome.meta().request_id,
                "request finished"
            ),
            OutcomeStatus::UpstreamUnavailable | OutcomeStatus::Internal => warn!(
                domain = %domain,
                status = %outcome.status(),
                latency_ms,
                request_id = %outcome.meta().request_id,
                message = outcome.message().unwrap_or_default(),
                "request failed"
            ),
        }

        outcome
    }

    /// Runs one upstream call under the per-call timeout.
    ///
    /// A hang becomes `UpstreamUnavailable`; gateway errors map by kind.
    pub async fn bounded<T, Fut>(&self, call: Fut) -> Result<T, ServiceError>
    where
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result.map_err(ServiceError::from),
            Err(_) => Err(ServiceError::UpstreamUnavailable(format!(
                "upstream call timed out after {} ms",
                self.call_timeout.as_millis()
            ))),
        }
    }

    /// Runs an optional collection fetch, capturing any failure in the slot.
    ///
    /// `what` names the data in the failure message, e.g. `historical data`
    /// gives `Could not fetch historical data: <cause>`.
    pub async fn secondary<U, Fut>(
        &self,
        slot: &'static str,
        what: &'static str,
        call: Fut,
    ) -> SubFetchOutcome<Vec<U>>
    where
        Fut: Future<Output = Result<Vec<U>, GatewayError>>,
    {
        let result = self
            .bounded(call)
            .await
            .map_err(|error| format!("Could not fetch {what}: {error}"));

        if let Err(message) = &result {
            warn!(slot, error = %message, "secondary fetch failed");
        }

        SubFetchOutcome::from_collection(result)
    }
}
