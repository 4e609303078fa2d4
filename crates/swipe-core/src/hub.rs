//! Inbound surface: one `handle` call per endpoint.
//!
//! The transport in front of the hub (CLI, HTTP server) only parses its own
//! protocol into an [`InboundRequest`] and maps the returned
//! [`OutcomeStatus`](crate::OutcomeStatus) back onto its status codes.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::adapters::{DuckDuckGoAdapter, GoogleNewsAdapter, YahooAdapter, YoutubeMusicAdapter};
use crate::catalog::FieldSelection;
use crate::config::SwipeConfig;
use crate::coordinator::PartialFetchCoordinator;
use crate::gateway::{MusicGateway, NewsGateway, QuoteGateway, SearchGateway};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::options::OptionMap;
use crate::outcome::RequestOutcome;
use crate::services::{FinanceService, MusicService, NewsService, SearchService};
use crate::source::Domain;

/// Every endpoint served by the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Finance,
    Search,
    News,
    MusicSearch,
    MusicSong,
    MusicAlbum,
    MusicArtist,
    MusicLyrics,
    MusicCharts,
}

impl Endpoint {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Finance => "finance",
            Self::Search => "search",
            Self::News => "news",
            Self::MusicSearch => "music.search",
            Self::MusicSong => "music.song",
            Self::MusicAlbum => "music.album",
            Self::MusicArtist => "music.artist",
            Self::MusicLyrics => "music.lyrics",
            Self::MusicCharts => "music.charts",
        }
    }

    pub const fn domain(self) -> Domain {
        match self {
            Self::Finance => Domain::Finance,
            Self::Search => Domain::Search,
            Self::News => Domain::News,
            Self::MusicSearch
            | Self::MusicSong
            | Self::MusicAlbum
            | Self::MusicArtist
            | Self::MusicLyrics
            | Self::MusicCharts => Domain::Music,
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport-neutral request.
///
/// `query` is the ticker, search text or entity id depending on the endpoint.
/// `fields` is the raw comma-separated selection; `None` or blank means the
/// domain defaults. `start`/`count` only apply to windowed endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundRequest {
    pub query: Option<String>,
    pub fields: Option<String>,
    pub start: Option<usize>,
    pub count: Option<usize>,
    pub options: OptionMap,
}

impl InboundRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    pub fn with_fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    pub fn with_window(mut self, start: usize, count: usize) -> Self {
        self.start = Some(start);
        self.count = Some(count);
        self
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(name, value);
        self
    }
}

/// Routes inbound requests to the domain services.
#[derive(Clone)]
pub struct ServiceHub {
    finance: FinanceService,
    search: SearchService,
    news: NewsService,
    music: MusicService,
}

impl ServiceHub {
    pub fn builder() -> ServiceHubBuilder {
        ServiceHubBuilder::new()
    }

    pub async fn handle(&self, endpoint: Endpoint, request: &InboundRequest) -> RequestOutcome {
        let selection = FieldSelection::parse(request.fields.as_deref());
        let query = request.query.as_deref().unwrap_or_default();

        match endpoint {
            Endpoint::Finance => self.finance.quote(query, &selection, &request.options).await,
            Endpoint::Search => {
                self.search
                    .search(
                        query,
                        &selection,
                        request.start,
                        request.count,
                        &request.options,
                    )
                    .await
            }
            Endpoint::News => {
                self.news
                    .articles(
                        request.query.as_deref(),
                        &selection,
                        request.start,
                        request.count,
                        &request.options,
                    )
                    .await
            }
            Endpoint::MusicSearch => {
                self.music
                    .search(query, &selection, request.start, request.count)
                    .await
            }
            Endpoint::MusicSong => self.music.song(query).await,
            Endpoint::MusicAlbum => self.music.album(query).await,
            Endpoint::MusicArtist => self.music.artist(query).await,
            Endpoint::MusicLyrics => self.music.lyrics(query).await,
            Endpoint::MusicCharts => self.music.charts().await,
        }
    }

    pub fn finance(&self) -> &FinanceService {
        &self.finance
    }

    pub fn search(&self) -> &SearchService {
        &self.search
    }

    pub fn news(&self) -> &NewsService {
        &self.news
    }

    pub fn music(&self) -> &MusicService {
        &self.music
    }
}

/// Builder wiring gateways into a [`ServiceHub`].
///
/// Gateways that are not supplied fall back to the production adapters, all
/// sharing one HTTP transport. The transport defaults to a reqwest client
/// built from the config's user agent and HTTP timeout.
///
/// # Example
///
/// ```rust,ignore
/// use swipe_core::{Endpoint, InboundRequest, ServiceHub, SwipeConfig};
///
/// let hub = ServiceHub::builder()
///     .with_config(SwipeConfig::from_env()?)
///     .build();
/// let outcome = hub
///     .handle(Endpoint::Finance, &InboundRequest::new("AAPL").with_fields("price,beta"))
///     .await;
/// ```
#[derive(Default)]
pub struct ServiceHubBuilder {
    config: SwipeConfig,
    http_client: Option<Arc<dyn HttpClient>>,
    quotes: Option<Arc<dyn QuoteGateway>>,
    search: Option<Arc<dyn SearchGateway>>,
    news: Option<Arc<dyn NewsGateway>>,
    music: Option<Arc<dyn MusicGateway>>,
}

impl ServiceHubBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: SwipeConfig) -> Self {
        self.config = config;
        self
    }

    /// Transport shared by every production adapter.
    pub fn with_http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn with_quote_gateway(mut self, gateway: Arc<dyn QuoteGateway>) -> Self {
        self.quotes = Some(gateway);
        self
    }

    pub fn with_search_gateway(mut self, gateway: Arc<dyn SearchGateway>) -> Self {
        self.search = Some(gateway);
        self
    }

    pub fn with_news_gateway(mut self, gateway: Arc<dyn NewsGateway>) -> Self {
        self.news = Some(gateway);
        self
    }

    pub fn with_music_gateway(mut self, gateway: Arc<dyn MusicGateway>) -> Self {
        self.music = Some(gateway);
        self
    }

    pub fn build(self) -> ServiceHub {
        let config = self.config;
        let mut shared = self.http_client;
        let mut transport = || {
            shared
                .get_or_insert_with(|| {
                    Arc::new(ReqwestHttpClient::new(&config.user_agent, config.http_timeout))
                })
                .clone()
        };

        let quotes: Arc<dyn QuoteGateway> = match self.quotes {
            Some(gateway) => gateway,
            None => Arc::new(YahooAdapter::new(transport())),
        };
        let search: Arc<dyn SearchGateway> = match self.search {
            Some(gateway) => gateway,
            None => Arc::new(DuckDuckGoAdapter::new(transport())),
        };
        let news: Arc<dyn NewsGateway> = match self.news {
            Some(gateway) => gateway,
            None => Arc::new(GoogleNewsAdapter::new(transport())),
        };
        let music: Arc<dyn MusicGateway> = match self.music {
            Some(gateway) => gateway,
            None => Arc::new(
                YoutubeMusicAdapter::new(transport()).with_language(config.default_language.clone()),
            ),
        };

        let coordinator = PartialFetchCoordinator::new(config.call_timeout);
        ServiceHub {
            finance: FinanceService::new(quotes, coordinator),
            search: SearchService::new(
                search,
                coordinator,
                config.default_page_size,
                config.max_page_size,
            ),
            news: NewsService::new(
                news,
                coordinator,
                config.default_page_size,
                config.max_page_size,
            )
            .with_locale(config.default_language.clone(), config.default_region.clone()),
            music: MusicService::new(
                music,
                coordinator,
                config.music_page_size,
                config.max_page_size,
            ),
        }
    }
}
