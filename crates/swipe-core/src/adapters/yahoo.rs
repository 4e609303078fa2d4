use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::gateway::{GatewayError, GatewayFuture, HistoryQuery, HistoryRange, QuoteGateway};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse};
use crate::record::{RawCollection, RawRecord};
use crate::{format_session_time, Symbol};

const QUERY_HOST: &str = "https://query2.finance.yahoo.com";
const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_ENDPOINTS: [&str; 2] = [
    "https://query1.finance.yahoo.com/v1/test/getcrumb",
    "https://query2.finance.yahoo.com/v1/test/getcrumb",
];
const SUMMARY_MODULES: &str = "price,summaryDetail,defaultKeyStatistics,financialData";
const REFERER: &str = "https://finance.yahoo.com/";
const CRUMB_TTL: Duration = Duration::from_secs(3_600);

/// Yahoo's unofficial API wants a session cookie from `fc.yahoo.com` (kept by
/// the transport's cookie jar) plus a crumb token passed as a query parameter.
#[derive(Debug, Default)]
pub struct YahooAuthManager {
    crumb: RwLock<Option<(String, Instant)>>,
}

impl YahooAuthManager {
    /// Cached crumb, refreshed when missing or older than an hour.
    pub async fn crumb(&self, http_client: &dyn HttpClient) -> Result<String, GatewayError> {
        if let Some((crumb, fetched_at)) = self.crumb.read().await.as_ref() {
            if fetched_at.elapsed() < CRUMB_TTL {
                return Ok(crumb.clone());
            }
        }

        let mut slot = self.crumb.write().await;
        // Another request may have refreshed while this one waited for the lock.
        if let Some((crumb, fetched_at)) = slot.as_ref() {
            if fetched_at.elapsed() < CRUMB_TTL {
                return Ok(crumb.clone());
            }
        }

        let crumb = fetch_crumb(http_client).await?;
        *slot = Some((crumb.clone(), Instant::now()));
        Ok(crumb)
    }

    pub async fn invalidate(&self) {
        *self.crumb.write().await = None;
    }
}

async fn fetch_crumb(http_client: &dyn HttpClient) -> Result<String, GatewayError> {
    let cookie_request = HttpRequest::get(COOKIE_URL).with_header("referer", REFERER);
    // fc.yahoo.com answers 404 while still setting the session cookie.
    let _ = http_client.execute(cookie_request).await.map_err(|e| {
        GatewayError::unavailable(format!("failed to fetch Yahoo cookie: {}", e.message()))
    })?;

    for endpoint in CRUMB_ENDPOINTS {
        let request = HttpRequest::get(endpoint).with_header("referer", REFERER);
        let Ok(response) = http_client.execute(request).await else {
            continue;
        };
        if !response.is_success() {
            continue;
        }

        let body = response.body.trim();
        if body.to_lowercase().contains("too many requests") {
            return Err(GatewayError::unavailable(
                "Yahoo rate limited while fetching crumb",
            ));
        }
        if !body.is_empty() && body.len() < 100 && !body.contains(' ') && !body.contains('<') {
            return Ok(body.to_owned());
        }
    }

    Err(GatewayError::unavailable(
        "failed to fetch Yahoo crumb from all endpoints",
    ))
}

/// Yahoo Finance quote gateway.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    auth: Arc<YahooAuthManager>,
}

impl YahooAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            auth: Arc::new(YahooAuthManager::default()),
        }
    }

    /// GET with the crumb appended. Sent exactly once: a 401 drops the cached
    /// crumb so the next request starts a fresh session, and this call fails
    /// as unavailable.
    async fn get_authenticated(&self, url: &str) -> Result<HttpResponse, GatewayError> {
        let crumb = self.auth.crumb(self.http_client.as_ref()).await?;
        let response = self.send(url, &crumb).await?;
        if response.status != 401 {
            return Ok(response);
        }

        debug!("yahoo rejected crumb; dropping session");
        self.auth.invalidate().await;
        Err(GatewayError::unavailable(
            "Yahoo rejected the session crumb (status 401)",
        ))
    }

    async fn send(&self, url: &str, crumb: &str) -> Result<HttpResponse, GatewayError> {
        let separator = if url.contains('?') { '&' } else { '?' };
        let endpoint = format!("{url}{separator}crumb={}", urlencoding::encode(crumb));
        debug!(url, "yahoo request");

        let request = HttpRequest::get(endpoint).with_header("referer", REFERER);
        Ok(self.http_client.execute(request).await?)
    }

    async fn quote_summary(&self, symbol: &Symbol, modules: &str) -> Result<Option<Map<String, Value>>, GatewayError> {
        let url = format!(
            "{QUERY_HOST}/v10/finance/quoteSummary/{}?modules={modules}",
            urlencoding::encode(symbol.as_str())
        );
        let response = self.get_authenticated(&url).await?;
        parse_quote_summary(&response)
    }
}

impl QuoteGateway for YahooAdapter {
    fn info<'a>(&'a self, symbol: &'a Symbol) -> GatewayFuture<'a, RawRecord> {
        Box::pin(async move {
            let summary = self.quote_summary(symbol, SUMMARY_MODULES).await?;
            Ok(summary.map(|modules| flatten_modules(&modules)).unwrap_or_default())
        })
    }

    fn history<'a>(
        &'a self,
        symbol: &'a Symbol,
        query: HistoryQuery,
    ) -> GatewayFuture<'a, RawCollection> {
        Box::pin(async move {
            let url = chart_url(symbol, &query);
            let response = self.get_authenticated(&url).await?;
            parse_chart(&response, query.adjusted)
        })
    }

    fn recommendations<'a>(&'a self, symbol: &'a Symbol) -> GatewayFuture<'a, RawCollection> {
        Box::pin(async move {
            let Some(modules) = self.quote_summary(symbol, "recommendationTrend").await? else {
                return Ok(Vec::new());
            };
            Ok(parse_recommendation_trend(&modules))
        })
    }
}

fn chart_url(symbol: &Symbol, query: &HistoryQuery) -> String {
    let range = match query.range {
        HistoryRange::Days(days) => format!("range={days}d"),
        HistoryRange::Between { start, end } => {
            let period2 = end
                .map(|end| end.unix_midnight())
                .unwrap_or_else(|| crate::UtcDateTime::now().unix_timestamp());
            format!("period1={}&period2={period2}", start.unix_midnight())
        }
    };

    format!(
        "{QUERY_HOST}/v8/finance/chart/{}?{range}&interval={}&includePrePost=false",
        urlencoding::encode(symbol.as_str()),
        query.interval.as_str()
    )
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl ProviderError {
    fn is_not_found(&self) -> bool {
        self.code.as_deref() == Some("Not Found")
    }

    fn describe(&self) -> String {
        self.description
            .clone()
            .or_else(|| self.code.clone())
            .unwrap_or_else(|| String::from("unknown error"))
    }
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryData,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryData {
    #[serde(default)]
    result: Option<Vec<Map<String, Value>>>,
    #[serde(default)]
    error: Option<ProviderError>,
}

/// `Ok(None)` when Yahoo does not know the symbol.
fn parse_quote_summary(response: &HttpResponse) -> Result<Option<Map<String, Value>>, GatewayError> {
    if !response.is_success() && response.status != 404 {
        return Err(GatewayError::unavailable(format!(
            "yahoo returned status {}",
            response.status
        )));
    }

    let parsed: QuoteSummaryResponse = serde_json::from_str(&response.body).map_err(|e| {
        GatewayError::unavailable(format!("failed to parse yahoo quote summary: {e}"))
    })?;

    if let Some(error) = parsed.quote_summary.error {
        if error.is_not_found() {
            return Ok(None);
        }
        return Err(GatewayError::unavailable(format!(
            "yahoo quote summary error: {}",
            error.describe()
        )));
    }

    Ok(parsed
        .quote_summary
        .result
        .and_then(|results| results.into_iter().next()))
}

/// Merges quoteSummary modules into one flat record.
///
/// `{"raw": .., "fmt": ..}` wrappers are unwrapped to `raw`; wrappers without
/// a raw value and nested objects are dropped. The first module to define a
/// key wins, in the order Yahoo returned them.
fn flatten_modules(modules: &Map<String, Value>) -> RawRecord {
    let mut flat = Map::new();
    for module in modules.values().filter_map(Value::as_object) {
        for (key, value) in module {
            if flat.contains_key(key) {
                continue;
            }
            let scalar = match value {
                Value::Object(wrapper) => match wrapper.get("raw") {
                    Some(raw) if !raw.is_null() => raw.clone(),
                    _ => continue,
                },
                Value::Array(_) | Value::Null => continue,
                other => other.clone(),
            };
            flat.insert(key.clone(), scalar);
        }
    }
    RawRecord::new(flat)
}

fn parse_recommendation_trend(modules: &Map<String, Value>) -> RawCollection {
    let trend = modules
        .get("recommendationTrend")
        .and_then(|module| module.get("trend"))
        .and_then(Value::as_array);

    trend
        .into_iter()
        .flatten()
        .map(|row| {
            [
                ("period", "period"),
                ("strong_buy", "strongBuy"),
                ("buy", "buy"),
                ("hold", "hold"),
                ("sell", "sell"),
                ("strong_sell", "strongSell"),
            ]
            .into_iter()
            .map(|(canonical, key)| {
                (
                    canonical.to_owned(),
                    row.get(key).cloned().unwrap_or(Value::Null),
                )
            })
            .collect()
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartData,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i32,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
    #[serde(default)]
    adjclose: Vec<ChartAdjClose>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct ChartAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Chart rows in chronological order. Unknown symbols and empty ranges give
/// an empty collection. Rows without a close are skipped.
fn parse_chart(response: &HttpResponse, adjusted: bool) -> Result<RawCollection, GatewayError> {
    if !response.is_success() && response.status != 404 {
        return Err(GatewayError::unavailable(format!(
            "yahoo returned status {}",
            response.status
        )));
    }

    let parsed: ChartResponse = serde_json::from_str(&response.body)
        .map_err(|e| GatewayError::unavailable(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = parsed.chart.error {
        if error.is_not_found() {
            return Ok(Vec::new());
        }
        return Err(GatewayError::unavailable(format!(
            "yahoo chart error: {}",
            error.describe()
        )));
    }

    let Some(result) = parsed.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|a| a.adjclose)
        .unwrap_or_default();

    let mut rows = Vec::with_capacity(result.timestamp.len());
    for (index, &timestamp) in result.timestamp.iter().enumerate() {
        let at = |series: &[Option<f64>]| series.get(index).copied().flatten();
        let Some(close) = at(&quote.close) else {
            continue;
        };
        let Some(date) = format_session_time(timestamp, result.meta.gmtoffset) else {
            warn!(timestamp, "skipping chart row with unrepresentable timestamp");
            continue;
        };

        let adj_close = at(&adjclose);
        // Adjusted bars scale OHLC by the adjusted-close ratio.
        let factor = match (adjusted, adj_close) {
            (true, Some(adj)) if close != 0.0 => adj / close,
            _ => 1.0,
        };
        let scaled = |value: Option<f64>| value.map(|v| Value::from(v * factor)).unwrap_or(Value::Null);

        let mut row = Map::new();
        row.insert(String::from("date"), Value::String(date));
        row.insert(String::from("open"), scaled(at(&quote.open)));
        row.insert(String::from("high"), scaled(at(&quote.high)));
        row.insert(String::from("low"), scaled(at(&quote.low)));
        row.insert(String::from("close"), scaled(Some(close)));
        row.insert(
            String::from("volume"),
            quote
                .volume
                .get(index)
                .copied()
                .flatten()
                .map(Value::from)
                .unwrap_or(Value::Null),
        );
        if !adjusted {
            row.insert(
                String::from("adj_close"),
                adj_close.map(Value::from).unwrap_or(Value::Null),
            );
        }
        rows.push(RawRecord::new(row));
    }

    Ok(rows)
}
