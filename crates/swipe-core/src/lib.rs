//! # Swipe Core
//!
//! Provider normalization, field projection and partial-fetch isolation for
//! the swipe data endpoints.
//!
//! ## Overview
//!
//! Four endpoint families (finance quotes, web search, news, music) share one
//! pattern: fetch a raw provider record or collection, project it onto the
//! fields the caller asked for, attach optional extras without letting them
//! fail the request, and report every failure through one small status set.
//!
//! - **Field catalogs** declare each domain's canonical fields and defaults
//! - **Provider gateways** are the only code that performs network I/O
//! - **Projection** turns raw records into ordered canonical records
//! - **Pagination** windows collections and assigns contiguous ranks
//! - **Partial-fetch coordination** isolates secondary fetch failures
//! - **Request outcomes** carry status, payload and metadata
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (Yahoo Finance, DuckDuckGo, Google News, YouTube Music) |
//! | [`catalog`] | Field specs, selections and per-domain catalogs |
//! | [`config`] | Process-wide settings with env overrides |
//! | [`coordinator`] | Primary/secondary fetch orchestration |
//! | [`domain`] | Validated request inputs (Symbol, Interval, dates) |
//! | [`error`] | Validation and service error types |
//! | [`gateway`] | Gateway traits and the gateway error |
//! | [`http_client`] | HTTP transport seam and fixture client |
//! | [`hub`] | Inbound `handle` surface |
//! | [`options`] | String-keyed domain options |
//! | [`outcome`] | Request outcome envelope and status taxonomy |
//! | [`paginator`] | Offset/count windows and ranks |
//! | [`projector`] | Raw-to-canonical projection |
//! | [`record`] | Raw and projected record types |
//! | [`sentiment`] | Lexicon sentiment scoring for news |
//! | [`services`] | Per-domain services |
//! | [`source`] | Domain and provider identifiers |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use swipe_core::{Endpoint, InboundRequest, ServiceHub};
//!
//! #[tokio::main]
//! async fn main() {
//!     let hub = ServiceHub::builder().build();
//!
//!     let request = InboundRequest::new("AAPL")
//!         .with_fields("price,previous_close")
//!         .with_option("history_days", "5");
//!     let outcome = hub.handle(Endpoint::Finance, &request).await;
//!
//!     println!("{}", serde_json::to_string_pretty(&outcome).unwrap());
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / Server   │
//! └────────┬────────┘
//!          │ InboundRequest
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  ServiceHub     │────▶│ Domain Service   │
//! └─────────────────┘     └────────┬─────────┘
//!                                  │
//!                                  ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Field Catalog   │◀────│ Coordinator      │
//! └─────────────────┘     └────────┬─────────┘
//!                                  │
//!                                  ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ HTTP Client     │◀────│ Gateway (Adapter)│
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Gateways classify failures with [`GatewayErrorKind`]; the coordinator maps
//! them onto [`OutcomeStatus`]:
//!
//! ```rust
//! use swipe_core::{GatewayError, OutcomeStatus, ServiceError};
//!
//! let error = ServiceError::from(GatewayError::not_found("Ticker 'ZZZZ' not found"));
//! assert_eq!(error.status(), OutcomeStatus::NotFound);
//! ```

pub mod adapters;
pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod http_client;
pub mod hub;
pub mod options;
pub mod outcome;
pub mod paginator;
pub mod projector;
pub mod record;
pub mod sentiment;
pub mod services;
pub mod source;

// Adapter implementations
pub use adapters::{DuckDuckGoAdapter, GoogleNewsAdapter, YahooAdapter, YoutubeMusicAdapter};

// Catalogs and selections
pub use catalog::{Accessor, FieldCatalog, FieldSelection, FieldSpec, ResolvedFields};

pub use config::SwipeConfig;

// Orchestration
pub use coordinator::{PartialFetchCoordinator, SubFetchOutcome};

// Domain inputs
pub use domain::{format_session_time, CalendarDate, Interval, Symbol, UtcDateTime};

// Error types
pub use error::{ServiceError, ValidationError};

// Gateway contracts
pub use gateway::{
    GatewayError, GatewayErrorKind, GatewayFuture, HistoryQuery, HistoryRange, MusicGateway,
    NewsGateway, NewsQuery, QuoteGateway, SearchGateway, SearchQuery,
};

// HTTP client types
pub use http_client::{
    FixtureHttpClient, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse,
    ReqwestHttpClient,
};

// Inbound surface
pub use hub::{Endpoint, InboundRequest, ServiceHub, ServiceHubBuilder};

pub use options::OptionMap;

// Outcome envelope
pub use outcome::{OutcomeMeta, OutcomeStatus, RequestOutcome, SCHEMA_VERSION};

// Pagination and projection
pub use paginator::{window, Ranked, Window};
pub use projector::{project, project_ranked};

// Records
pub use record::{FieldValue, ProjectedRecord, RawCollection, RawRecord};

pub use sentiment::{SentimentAnalyzer, SentimentError, SentimentScores};

// Domain services
pub use services::{
    FinanceOptions, FinanceService, MusicService, NewsOptions, NewsService, SearchOptions,
    SearchService, FINANCE_CATALOG, MUSIC_CATALOG, NEWS_CATALOG, SEARCH_CATALOG,
};

// Source identifiers
pub use source::{Domain, ProviderId};
