//! In-memory gateways shared by the integration tests.
//!
//! Each fake answers from canned results and records what it was asked, so
//! tests can assert both on the outcome and on the upstream calls made.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use swipe_core::{
    GatewayError, GatewayFuture, HistoryQuery, HistoryRange, MusicGateway, NewsGateway,
    NewsQuery, QuoteGateway, RawCollection, RawRecord, SearchGateway, SearchQuery, ServiceHub,
    SwipeConfig, Symbol,
};

pub fn raw(value: Value) -> RawRecord {
    RawRecord::from_value(value).expect("fixture must be a JSON object")
}

pub fn rows(values: Vec<Value>) -> RawCollection {
    values.into_iter().map(raw).collect()
}

pub fn config() -> SwipeConfig {
    SwipeConfig::default().with_call_timeout(Duration::from_millis(500))
}

// =============================================================================
// Quotes
// =============================================================================

/// Quote gateway. Short `Days` history queries (the existence check and the
/// previous-close backfill) answer from `recent`; everything else from `history`.
pub struct FakeQuotes {
    pub info: Result<RawRecord, GatewayError>,
    pub recent: Result<RawCollection, GatewayError>,
    pub history: Result<RawCollection, GatewayError>,
    pub recommendations: Result<RawCollection, GatewayError>,
    pub history_queries: Mutex<Vec<HistoryQuery>>,
    pub info_calls: Mutex<usize>,
}

impl FakeQuotes {
    pub fn with_info(info: Value) -> Self {
        Self {
            info: Ok(raw(info)),
            recent: Ok(Vec::new()),
            history: Ok(Vec::new()),
            recommendations: Ok(Vec::new()),
            history_queries: Mutex::new(Vec::new()),
            info_calls: Mutex::new(0),
        }
    }

    pub fn with_recent(mut self, recent: Result<RawCollection, GatewayError>) -> Self {
        self.recent = recent;
        self
    }

    pub fn with_history(mut self, history: Result<RawCollection, GatewayError>) -> Self {
        self.history = history;
        self
    }

    pub fn with_recommendations(
        mut self,
        recommendations: Result<RawCollection, GatewayError>,
    ) -> Self {
        self.recommendations = recommendations;
        self
    }

    pub fn history_queries(&self) -> Vec<HistoryQuery> {
        self.history_queries.lock().expect("lock").clone()
    }

    pub fn info_calls(&self) -> usize {
        *self.info_calls.lock().expect("lock")
    }
}

impl QuoteGateway for FakeQuotes {
    fn info<'a>(&'a self, _symbol: &'a Symbol) -> GatewayFuture<'a, RawRecord> {
        *self.info_calls.lock().expect("lock") += 1;
        let info = self.info.clone();
        Box::pin(async move { info })
    }

    fn history<'a>(
        &'a self,
        _symbol: &'a Symbol,
        query: HistoryQuery,
    ) -> GatewayFuture<'a, RawCollection> {
        self.history_queries.lock().expect("lock").push(query);
        let answer = match query.range {
            HistoryRange::Days(days) if days <= 2 => self.recent.clone(),
            _ => self.history.clone(),
        };
        Box::pin(async move { answer })
    }

    fn recommendations<'a>(&'a self, _symbol: &'a Symbol) -> GatewayFuture<'a, RawCollection> {
        let answer = self.recommendations.clone();
        Box::pin(async move { answer })
    }
}

// =============================================================================
// Search and news
// =============================================================================

/// Search gateway returning at most `depth` of its hits, like a real provider.
pub struct FakeSearch {
    pub hits: Result<RawCollection, GatewayError>,
    pub queries: Mutex<Vec<SearchQuery>>,
}

impl FakeSearch {
    pub fn new(hits: Result<RawCollection, GatewayError>) -> Self {
        Self {
            hits,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<SearchQuery> {
        self.queries.lock().expect("lock").clone()
    }
}

impl SearchGateway for FakeSearch {
    fn search<'a>(&'a self, query: &'a SearchQuery) -> GatewayFuture<'a, RawCollection> {
        self.queries.lock().expect("lock").push(query.clone());
        let answer = self.hits.clone().map(|mut hits| {
            hits.truncate(query.depth);
            hits
        });
        Box::pin(async move { answer })
    }
}

pub struct FakeNews {
    pub entries: Result<RawCollection, GatewayError>,
    pub queries: Mutex<Vec<NewsQuery>>,
}

impl FakeNews {
    pub fn new(entries: Result<RawCollection, GatewayError>) -> Self {
        Self {
            entries,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<NewsQuery> {
        self.queries.lock().expect("lock").clone()
    }
}

impl NewsGateway for FakeNews {
    fn articles<'a>(&'a self, query: &'a NewsQuery) -> GatewayFuture<'a, RawCollection> {
        self.queries.lock().expect("lock").push(query.clone());
        let answer = self.entries.clone();
        Box::pin(async move { answer })
    }
}

// =============================================================================
// Music
// =============================================================================

/// Music gateway; every lookup answers with `record`.
pub struct FakeMusic {
    pub hits: Result<RawCollection, GatewayError>,
    pub record: Result<RawRecord, GatewayError>,
    pub depths: Mutex<Vec<usize>>,
}

impl FakeMusic {
    pub fn new(hits: Result<RawCollection, GatewayError>) -> Self {
        Self {
            hits,
            record: Err(GatewayError::not_found("not found")),
            depths: Mutex::new(Vec::new()),
        }
    }

    pub fn record(mut self, record: Result<RawRecord, GatewayError>) -> Self {
        self.record = record;
        self
    }

    pub fn depths(&self) -> Vec<usize> {
        self.depths.lock().expect("lock").clone()
    }

    fn lookup<'a>(&'a self) -> GatewayFuture<'a, RawRecord> {
        let answer = self.record.clone();
        Box::pin(async move { answer })
    }
}

impl MusicGateway for FakeMusic {
    fn search<'a>(&'a self, _query: &'a str, depth: usize) -> GatewayFuture<'a, RawCollection> {
        self.depths.lock().expect("lock").push(depth);
        let answer = self.hits.clone().map(|mut hits| {
            hits.truncate(depth);
            hits
        });
        Box::pin(async move { answer })
    }

    fn song<'a>(&'a self, _video_id: &'a str) -> GatewayFuture<'a, RawRecord> {
        self.lookup()
    }

    fn album<'a>(&'a self, _browse_id: &'a str) -> GatewayFuture<'a, RawRecord> {
        self.lookup()
    }

    fn artist<'a>(&'a self, _channel_id: &'a str) -> GatewayFuture<'a, RawRecord> {
        self.lookup()
    }

    fn lyrics<'a>(&'a self, _video_id: &'a str) -> GatewayFuture<'a, RawRecord> {
        self.lookup()
    }

    fn charts<'a>(&'a self) -> GatewayFuture<'a, RawRecord> {
        self.lookup()
    }
}

// =============================================================================
// Hub wiring
// =============================================================================

/// Hub with every domain on a fake; unused domains get empty fakes.
pub struct Fakes {
    pub quotes: Arc<FakeQuotes>,
    pub search: Arc<FakeSearch>,
    pub news: Arc<FakeNews>,
    pub music: Arc<FakeMusic>,
}

impl Default for Fakes {
    fn default() -> Self {
        Self {
            quotes: Arc::new(FakeQuotes::with_info(serde_json::json!({}))),
            search: Arc::new(FakeSearch::new(Ok(Vec::new()))),
            news: Arc::new(FakeNews::new(Ok(Vec::new()))),
            music: Arc::new(FakeMusic::new(Ok(Vec::new()))),
        }
    }
}

impl Fakes {
    pub fn hub(&self) -> ServiceHub {
        ServiceHub::builder()
            .with_config(config())
            .with_quote_gateway(self.quotes.clone())
            .with_search_gateway(self.search.clone())
            .with_news_gateway(self.news.clone())
            .with_music_gateway(self.music.clone())
            .build()
    }
}
