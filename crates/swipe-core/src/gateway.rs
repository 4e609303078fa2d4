//! Provider gateway contracts.
//!
//! A gateway is the only code allowed to perform network I/O. Each domain has
//! one trait; adapters implement it and collapse every provider-specific
//! failure into a [`GatewayError`] before returning.
//!
//! | Trait | Domain | Production adapter |
//! |-------|--------|--------------------|
//! | [`QuoteGateway`] | finance | [`YahooAdapter`](crate::adapters::YahooAdapter) |
//! | [`SearchGateway`] | search | [`DuckDuckGoAdapter`](crate::adapters::DuckDuckGoAdapter) |
//! | [`NewsGateway`] | news | [`GoogleNewsAdapter`](crate::adapters::GoogleNewsAdapter) |
//! | [`MusicGateway`] | music | [`YoutubeMusicAdapter`](crate::adapters::YoutubeMusicAdapter) |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::http_client::HttpError;
use crate::record::{RawCollection, RawRecord};
use crate::{CalendarDate, Interval, ServiceError, Symbol, ValidationError};

/// Boxed future returned by gateway methods.
pub type GatewayFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, GatewayError>> + Send + 'a>>;

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    NotFound,
    Unavailable,
    InvalidRequest,
    Internal,
}

/// Structured gateway error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    kind: GatewayErrorKind,
    message: String,
}

impl GatewayError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: GatewayErrorKind::NotFound,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: GatewayErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: GatewayErrorKind::InvalidRequest,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: GatewayErrorKind::Internal,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> GatewayErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            GatewayErrorKind::NotFound => "gateway.not_found",
            GatewayErrorKind::Unavailable => "gateway.unavailable",
            GatewayErrorKind::InvalidRequest => "gateway.invalid_request",
            GatewayErrorKind::Internal => "gateway.internal",
        }
    }
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for GatewayError {}

impl From<HttpError> for GatewayError {
    fn from(error: HttpError) -> Self {
        Self::unavailable(format!("transport error: {}", error.message()))
    }
}

impl From<GatewayError> for ServiceError {
    fn from(error: GatewayError) -> Self {
        match error.kind {
            GatewayErrorKind::NotFound => Self::NotFound(error.message),
            GatewayErrorKind::Unavailable => Self::UpstreamUnavailable(error.message),
            GatewayErrorKind::InvalidRequest => {
                Self::InvalidInput(ValidationError::UpstreamRejected {
                    message: error.message,
                })
            }
            GatewayErrorKind::Internal => Self::Internal(error.message),
        }
    }
}

/// Time span of a history request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryRange {
    /// The most recent `n` calendar days, as the provider counts them.
    Days(u32),
    /// Explicit bounds; an open end means "until now".
    Between {
        start: CalendarDate,
        end: Option<CalendarDate>,
    },
}

/// Parameters of a price-history fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryQuery {
    pub range: HistoryRange,
    pub interval: Interval,
    pub adjusted: bool,
}

impl HistoryQuery {
    /// Daily, adjusted bars over the last `days` days.
    pub const fn recent_days(days: u32) -> Self {
        Self {
            range: HistoryRange::Days(days),
            interval: Interval::OneDay,
            adjusted: true,
        }
    }
}

/// Quote provider contract.
///
/// `history` rows use canonical keys (`date`, `open`, `high`, `low`, `close`,
/// `volume`, plus `adj_close` when unadjusted) in chronological order.
/// `recommendations` rows use `period`, `strong_buy`, `buy`, `hold`, `sell`,
/// `strong_sell`.
pub trait QuoteGateway: Send + Sync {
    /// Flat key/value quote summary for one symbol.
    fn info<'a>(&'a self, symbol: &'a Symbol) -> GatewayFuture<'a, RawRecord>;

    fn history<'a>(
        &'a self,
        symbol: &'a Symbol,
        query: HistoryQuery,
    ) -> GatewayFuture<'a, RawCollection>;

    fn recommendations<'a>(&'a self, symbol: &'a Symbol) -> GatewayFuture<'a, RawCollection>;

    /// Primary quote fetch with the ticker-existence check.
    ///
    /// A symbol with no live price is only reported missing when one day of
    /// history is also empty. This is a heuristic: an instrument that has not
    /// traded recently can still be classified as not found.
    fn fetch_primary<'a>(&'a self, symbol: &'a Symbol) -> GatewayFuture<'a, RawRecord> {
        Box::pin(async move {
            let info = self.info(symbol).await?;
            if info.get("regularMarketPrice").is_some() {
                return Ok(info);
            }

            let recent = self.history(symbol, HistoryQuery::recent_days(1)).await?;
            if recent.is_empty() {
                return Err(GatewayError::not_found(format!(
                    "Ticker '{symbol}' not found or no valid market data available."
                )));
            }

            Ok(info)
        })
    }
}

/// Web search parameters. `depth` is the number of hits the caller needs
/// counted from the first result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub region: String,
    pub safe: bool,
    pub depth: usize,
}

/// Web search provider contract. Hits come back in provider order.
pub trait SearchGateway: Send + Sync {
    fn search<'a>(&'a self, query: &'a SearchQuery) -> GatewayFuture<'a, RawCollection>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsQuery {
    /// `None` asks for top headlines.
    pub query: Option<String>,
    pub language: String,
    pub region: String,
    pub from: Option<CalendarDate>,
    pub to: Option<CalendarDate>,
    pub category: Option<String>,
}

impl NewsQuery {
    /// Search text sent upstream, with the category appended as a `when:` hint.
    pub fn search_text(&self) -> Option<String> {
        let query = self.query.as_deref()?;
        Some(match &self.category {
            Some(category) => format!("{query} when:{category}"),
            None => query.to_owned(),
        })
    }
}

/// News provider contract.
pub trait NewsGateway: Send + Sync {
    fn articles<'a>(&'a self, query: &'a NewsQuery) -> GatewayFuture<'a, RawCollection>;
}

/// Music provider contract. Lookups fail with `NotFound` for unknown ids.
pub trait MusicGateway: Send + Sync {
    fn search<'a>(&'a self, query: &'a str, depth: usize) -> GatewayFuture<'a, RawCollection>;

    fn song<'a>(&'a self, video_id: &'a str) -> GatewayFuture<'a, RawRecord>;

    fn album<'a>(&'a self, browse_id: &'a str) -> GatewayFuture<'a, RawRecord>;

    fn artist<'a>(&'a self, channel_id: &'a str) -> GatewayFuture<'a, RawRecord>;

    fn lyrics<'a>(&'a self, video_id: &'a str) -> GatewayFuture<'a, RawRecord>;

    fn charts<'a>(&'a self) -> GatewayFuture<'a, RawRecord>;
}
