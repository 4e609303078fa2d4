use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::gateway::{GatewayError, GatewayFuture, MusicGateway};
use crate::http_client::{HttpClient, HttpRequest};
use crate::record::{RawCollection, RawRecord};

const API_BASE: &str = "https://music.youtube.com/youtubei/v1";
const CLIENT_NAME: &str = "WEB_REMIX";
const CLIENT_VERSION: &str = "1.20241023.01.00";
const CHARTS_BROWSE_ID: &str = "FEmusic_charts";
const LYRICS_BROWSE_PREFIX: &str = "MPLY";

const RESULT_TYPES: [&str; 10] = [
    "song", "video", "album", "artist", "playlist", "single", "ep", "episode", "podcast", "profile",
];

static DURATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(:\d{2})+$").expect("duration regex should compile"));

/// YouTube Music gateway over the internal JSON API used by the web client.
///
/// Search hits carry `resultType`, `title`, `videoId`, `browseId`,
/// `artists` (`[{name, id}]`), `album` (`{name, id}`) and `duration`.
#[derive(Clone)]
pub struct YoutubeMusicAdapter {
    http_client: Arc<dyn HttpClient>,
    language: String,
}

impl YoutubeMusicAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            language: String::from("en"),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// POSTs `body` plus the client context. `entity` names the id being
    /// looked up; only then do 400/404 mean "not found", otherwise they are
    /// an upstream failure like any other status.
    async fn call(
        &self,
        endpoint: &str,
        mut body: Map<String, Value>,
        entity: Option<&str>,
    ) -> Result<Value, GatewayError> {
        body.insert(
            String::from("context"),
            json!({
                "client": {
                    "clientName": CLIENT_NAME,
                    "clientVersion": CLIENT_VERSION,
                    "hl": self.language,
                },
                "user": {}
            }),
        );

        let url = format!("{API_BASE}/{endpoint}?alt=json&prettyPrint=false");
        debug!(endpoint, "youtube music request");
        let request = HttpRequest::post_json(url, &Value::Object(body))
            .with_header("origin", "https://music.youtube.com")
            .with_header("x-origin", "https://music.youtube.com");

        let response = self.http_client.execute(request).await?;
        match (response.status, entity) {
            (200..=299, _) => {}
            (400 | 404, Some(entity)) => {
                return Err(GatewayError::not_found(format!("{entity} not found")))
            }
            (status, _) => {
                return Err(GatewayError::unavailable(format!(
                    "youtube music returned status {status}"
                )))
            }
        }

        serde_json::from_str(&response.body).map_err(|e| {
            GatewayError::unavailable(format!("failed to parse youtube music response: {e}"))
        })
    }

    async fn browse(&self, browse_id: &str, entity: Option<&str>) -> Result<Value, GatewayError> {
        let mut body = Map::new();
        body.insert(String::from("browseId"), Value::from(browse_id));
        self.call("browse", body, entity).await
    }
}

fn require_id<'a>(id: &'a str, what: &str) -> Result<&'a str, GatewayError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(GatewayError::invalid_request(format!("{what} cannot be empty")));
    }
    Ok(id)
}

impl MusicGateway for YoutubeMusicAdapter {
    fn search<'a>(&'a self, query: &'a str, depth: usize) -> GatewayFuture<'a, RawCollection> {
        Box::pin(async move {
            let mut body = Map::new();
            body.insert(String::from("query"), Value::from(query));
            let response = self.call("search", body, None).await?;

            let mut hits = parse_search(&response);
            hits.truncate(depth);
            Ok(hits)
        })
    }

    fn song<'a>(&'a self, video_id: &'a str) -> GatewayFuture<'a, RawRecord> {
        Box::pin(async move {
            let video_id = require_id(video_id, "video id")?;
            let mut body = Map::new();
            body.insert(String::from("videoId"), Value::from(video_id));
            let response = self.call("player", body, Some("song")).await?;
            parse_song(&response, video_id)
        })
    }

    fn album<'a>(&'a self, browse_id: &'a str) -> GatewayFuture<'a, RawRecord> {
        Box::pin(async move {
            let browse_id = require_id(browse_id, "browse id")?;
            let response = self.browse(browse_id, Some("album")).await?;
            parse_album(&response, browse_id)
        })
    }

    fn artist<'a>(&'a self, channel_id: &'a str) -> GatewayFuture<'a, RawRecord> {
        Box::pin(async move {
            let channel_id = require_id(channel_id, "artist id")?;
            let response = self.browse(channel_id, Some("artist")).await?;
            parse_artist(&response, channel_id)
        })
    }

    fn lyrics<'a>(&'a self, video_id: &'a str) -> GatewayFuture<'a, RawRecord> {
        Box::pin(async move {
            let video_id = require_id(video_id, "video id")?;
            let mut body = Map::new();
            body.insert(String::from("videoId"), Value::from(video_id));
            body.insert(String::from("isAudioOnly"), Value::Bool(true));
            let watch = self.call("next", body, Some("song")).await?;

            let browse_id = lyrics_browse_id(&watch)
                .ok_or_else(|| GatewayError::not_found("No lyrics found for this song."))?;
            let response = self.browse(&browse_id, Some("lyrics")).await?;
            parse_lyrics(&response, video_id)
        })
    }

    fn charts<'a>(&'a self) -> GatewayFuture<'a, RawRecord> {
        Box::pin(async move {
            let response = self.browse(CHARTS_BROWSE_ID, None).await?;
            let mut record = Map::new();
            record.insert(String::from("sections"), Value::Array(collect_sections(&response)));
            Ok(RawRecord::new(record))
        })
    }
}

/// Text of a `{"runs": [{"text": ..}, ..]}` or `{"simpleText": ..}` node.
fn text_of(node: &Value) -> Option<String> {
    if let Some(text) = node.get("simpleText").and_then(Value::as_str) {
        return Some(text.to_owned());
    }
    let runs = node.get("runs")?.as_array()?;
    let text = runs
        .iter()
        .filter_map(|run| run.get("text").and_then(Value::as_str))
        .collect::<String>();
    (!text.is_empty()).then_some(text)
}

fn text_value(node: Option<&Value>) -> Value {
    node.and_then(text_of).map(Value::String).unwrap_or(Value::Null)
}

/// Every value stored under `key`, depth-first, in document order.
fn find_all<'a>(value: &'a Value, key: &str, found: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) => {
            for (name, child) in map {
                if name == key {
                    found.push(child);
                }
                find_all(child, key, found);
            }
        }
        Value::Array(items) => {
            for item in items {
                find_all(item, key, found);
            }
        }
        _ => {}
    }
}

fn find_first<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let mut found = Vec::new();
    find_all(value, key, &mut found);
    found.into_iter().next()
}

fn page_type(run: &Value) -> Option<&str> {
    run.pointer(
        "/navigationEndpoint/browseEndpoint/browseEndpointContextSupportedConfigs/browseEndpointContextMusicConfig/pageType",
    )
    .and_then(Value::as_str)
}

fn run_browse_id(run: &Value) -> Value {
    run.pointer("/navigationEndpoint/browseEndpoint/browseId")
        .cloned()
        .unwrap_or(Value::Null)
}

fn parse_search(response: &Value) -> RawCollection {
    let mut shelves = Vec::new();
    find_all(response, "musicShelfRenderer", &mut shelves);

    shelves
        .into_iter()
        .flat_map(|shelf| {
            let shelf_title = shelf.get("title").and_then(text_of);
            shelf
                .get("contents")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(|item| item.get("musicResponsiveListItemRenderer"))
                .map(move |item| parse_list_item(item, shelf_title.as_deref()))
                .collect::<Vec<_>>()
        })
        .collect()
}

fn flex_runs(columns: &[Value], index: usize) -> &[Value] {
    columns
        .get(index)
        .and_then(|column| column.pointer("/musicResponsiveListItemFlexColumnRenderer/text/runs"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn parse_list_item(item: &Value, shelf_title: Option<&str>) -> RawRecord {
    let columns = item
        .get("flexColumns")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let title = flex_runs(columns, 0)
        .first()
        .and_then(|run| run.get("text"))
        .cloned()
        .unwrap_or(Value::Null);

    let mut result_type = None;
    let mut artists = Vec::new();
    let mut album = Value::Null;
    let mut duration = Value::Null;
    for (index, run) in flex_runs(columns, 1).iter().enumerate() {
        let Some(text) = run.get("text").and_then(Value::as_str) else {
            continue;
        };
        match page_type(run) {
            Some("MUSIC_PAGE_TYPE_ARTIST") | Some("MUSIC_PAGE_TYPE_USER_CHANNEL") => {
                artists.push(json!({"name": text, "id": run_browse_id(run)}));
            }
            Some("MUSIC_PAGE_TYPE_ALBUM") => {
                album = json!({"name": text, "id": run_browse_id(run)});
            }
            _ if DURATION.is_match(text) => duration = Value::from(text),
            _ if index == 0 && RESULT_TYPES.contains(&text.to_lowercase().as_str()) => {
                result_type = Some(text.to_lowercase());
            }
            _ => {}
        }
    }

    let result_type = result_type.or_else(|| {
        shelf_title.map(|title| {
            let lowered = title.to_lowercase();
            lowered.strip_suffix('s').unwrap_or(&lowered).to_owned()
        })
    });

    let video_id = item
        .pointer("/playlistItemData/videoId")
        .or_else(|| find_first(item, "watchEndpoint").and_then(|endpoint| endpoint.get("videoId")))
        .cloned()
        .unwrap_or(Value::Null);
    let browse_id = item
        .pointer("/navigationEndpoint/browseEndpoint/browseId")
        .cloned()
        .unwrap_or(Value::Null);

    let mut record = Map::new();
    record.insert(
        String::from("resultType"),
        result_type.map(Value::String).unwrap_or(Value::Null),
    );
    record.insert(String::from("title"), title);
    record.insert(String::from("videoId"), video_id);
    record.insert(String::from("browseId"), browse_id);
    record.insert(
        String::from("artists"),
        if artists.is_empty() { Value::Null } else { Value::Array(artists) },
    );
    record.insert(String::from("album"), album);
    record.insert(String::from("duration"), duration);
    RawRecord::new(record)
}

fn parse_song(response: &Value, video_id: &str) -> Result<RawRecord, GatewayError> {
    let details = response
        .get("videoDetails")
        .and_then(|details| RawRecord::from_value(details.clone()))
        .ok_or_else(|| GatewayError::not_found(format!("song '{video_id}' not found")))?;

    let mut record = details.as_map().clone();
    record.insert(
        String::from("playabilityStatus"),
        response
            .pointer("/playabilityStatus/status")
            .cloned()
            .unwrap_or(Value::Null),
    );
    Ok(RawRecord::new(record))
}

fn parse_album(response: &Value, browse_id: &str) -> Result<RawRecord, GatewayError> {
    let header = find_first(response, "musicResponsiveHeaderRenderer")
        .or_else(|| find_first(response, "musicDetailHeaderRenderer"))
        .ok_or_else(|| GatewayError::not_found(format!("album '{browse_id}' not found")))?;

    let mut items = Vec::new();
    find_all(response, "musicResponsiveListItemRenderer", &mut items);
    let tracks = items
        .into_iter()
        .map(|item| parse_list_item(item, Some("songs")).into_value())
        .collect();

    let mut record = Map::new();
    record.insert(String::from("browseId"), Value::from(browse_id));
    record.insert(String::from("title"), text_value(header.get("title")));
    record.insert(String::from("subtitle"), text_value(header.get("subtitle")));
    record.insert(String::from("secondSubtitle"), text_value(header.get("secondSubtitle")));
    record.insert(String::from("tracks"), Value::Array(tracks));
    Ok(RawRecord::new(record))
}

fn parse_artist(response: &Value, channel_id: &str) -> Result<RawRecord, GatewayError> {
    let header = ["musicImmersiveHeaderRenderer", "musicVisualHeaderRenderer", "musicResponsiveHeaderRenderer"]
        .into_iter()
        .find_map(|key| find_first(response, key))
        .ok_or_else(|| GatewayError::not_found(format!("artist '{channel_id}' not found")))?;

    let mut record = Map::new();
    record.insert(String::from("channelId"), Value::from(channel_id));
    record.insert(String::from("name"), text_value(header.get("title")));
    record.insert(String::from("description"), text_value(header.get("description")));
    record.insert(
        String::from("subscribers"),
        text_value(find_first(header, "subscriberCountText")),
    );
    record.insert(String::from("sections"), Value::Array(collect_sections(response)));
    Ok(RawRecord::new(record))
}

/// Titled shelves and carousels of a browse page, each with its item titles and ids.
fn collect_sections(response: &Value) -> Vec<Value> {
    let mut sections = Vec::new();

    let mut shelves = Vec::new();
    find_all(response, "musicShelfRenderer", &mut shelves);
    for shelf in shelves {
        let items = shelf
            .get("contents")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|item| item.get("musicResponsiveListItemRenderer"))
            .map(|item| parse_list_item(item, None).into_value())
            .collect::<Vec<_>>();
        sections.push(json!({"title": text_value(shelf.get("title")), "items": items}));
    }

    let mut carousels = Vec::new();
    find_all(response, "musicCarouselShelfRenderer", &mut carousels);
    for carousel in carousels {
        let title = text_value(
            find_first(carousel, "musicCarouselShelfBasicHeaderRenderer")
                .and_then(|header| header.get("title")),
        );
        let items = carousel
            .get("contents")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|item| {
                if let Some(two_row) = item.get("musicTwoRowItemRenderer") {
                    return Some(json!({
                        "title": text_value(two_row.get("title")),
                        "browseId": two_row.pointer("/navigationEndpoint/browseEndpoint/browseId").cloned().unwrap_or(Value::Null),
                        "videoId": two_row.pointer("/navigationEndpoint/watchEndpoint/videoId").cloned().unwrap_or(Value::Null),
                    }));
                }
                item.get("musicResponsiveListItemRenderer")
                    .map(|list_item| parse_list_item(list_item, None).into_value())
            })
            .collect::<Vec<_>>();
        sections.push(json!({"title": title, "items": items}));
    }

    sections
}

/// Browse id of the lyrics tab in a watch response, when the song has lyrics.
fn lyrics_browse_id(watch: &Value) -> Option<String> {
    let mut tabs = Vec::new();
    find_all(watch, "tabRenderer", &mut tabs);
    tabs.into_iter()
        .filter(|tab| tab.get("unselectable").and_then(Value::as_bool) != Some(true))
        .filter_map(|tab| tab.pointer("/endpoint/browseEndpoint/browseId"))
        .filter_map(Value::as_str)
        .find(|id| id.starts_with(LYRICS_BROWSE_PREFIX))
        .map(str::to_owned)
}

fn parse_lyrics(response: &Value, video_id: &str) -> Result<RawRecord, GatewayError> {
    let shelf = find_first(response, "musicDescriptionShelfRenderer")
        .ok_or_else(|| GatewayError::not_found("No lyrics found for this song."))?;

    let mut record = Map::new();
    record.insert(String::from("videoId"), Value::from(video_id));
    record.insert(String::from("lyrics"), text_value(shelf.get("description")));
    record.insert(String::from("source"), text_value(shelf.get("footer")));
    Ok(RawRecord::new(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayErrorKind;
    use crate::http_client::{FixtureHttpClient, HttpResponse};

    fn list_item(title: &str, kind: &str, video_id: &str) -> Value {
        json!({
            "musicResponsiveListItemRenderer": {
                "flexColumns": [
                    {"musicResponsiveListItemFlexColumnRenderer": {"text": {"runs": [{"text": title}]}}},
                    {"musicResponsiveListItemFlexColumnRenderer": {"text": {"runs": [
                        {"text": kind},
                        {"text": " • "},
                        {"text": "Daft Punk", "navigationEndpoint": {"browseEndpoint": {
                            "browseId": "UC_artist",
                            "browseEndpointContextSupportedConfigs": {"browseEndpointContextMusicConfig": {"pageType": "MUSIC_PAGE_TYPE_ARTIST"}}
                        }}},
                        {"text": " • "},
                        {"text": "Discovery", "navigationEndpoint": {"browseEndpoint": {
                            "browseId": "MPREb_album",
                            "browseEndpointContextSupportedConfigs": {"browseEndpointContextMusicConfig": {"pageType": "MUSIC_PAGE_TYPE_ALBUM"}}
                        }}},
                        {"text": " • "},
                        {"text": "3:45"}
                    ]}}}
                ],
                "playlistItemData": {"videoId": video_id}
            }
        })
    }

    fn search_response() -> Value {
        json!({
            "contents": {"tabbedSearchResultsRenderer": {"tabs": [{"tabRenderer": {"content": {"sectionListRenderer": {"contents": [
                {"musicShelfRenderer": {
                    "title": {"runs": [{"text": "Songs"}]},
                    "contents": [
                        list_item("One More Time", "Song", "vid1"),
                        list_item("Digital Love", "Daft Punk", "vid2")
                    ]
                }}
            ]}}}}]}}
        })
    }

    fn adapter(client: FixtureHttpClient) -> YoutubeMusicAdapter {
        YoutubeMusicAdapter::new(Arc::new(client))
    }

    #[test]
    fn parses_search_items() {
        let hits = parse_search(&search_response());

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].get_str("resultType"), Some("song"));
        assert_eq!(hits[0].get_str("title"), Some("One More Time"));
        assert_eq!(hits[0].get_str("videoId"), Some("vid1"));
        assert_eq!(hits[0].get_str("duration"), Some("3:45"));
        assert_eq!(
            hits[0].get("artists"),
            Some(&json!([{"name": "Daft Punk", "id": "UC_artist"}]))
        );
        assert_eq!(hits[0].get_path(&["album", "name"]), Some(&json!("Discovery")));
        // Falls back to the shelf title when the first run is not a type.
        assert_eq!(hits[1].get_str("resultType"), Some("song"));
    }

    #[tokio::test]
    async fn search_truncates_to_depth_and_posts_context() {
        let client = Arc::new(FixtureHttpClient::new().with_response(
            format!("{API_BASE}/search"),
            HttpResponse::ok(search_response().to_string()),
        ));
        let adapter = YoutubeMusicAdapter::new(client.clone());

        let hits = adapter.search("daft punk", 1).await.expect("search");
        assert_eq!(hits.len(), 1);

        let body = client.recorded_requests()[0].body.clone().expect("json body");
        let body: Value = serde_json::from_str(&body).expect("valid json");
        assert_eq!(body["query"], json!("daft punk"));
        assert_eq!(body["context"]["client"]["clientName"], json!(CLIENT_NAME));
    }

    #[tokio::test]
    async fn unknown_album_is_not_found() {
        let adapter = adapter(
            FixtureHttpClient::new()
                .with_response(format!("{API_BASE}/browse"), HttpResponse::new(400, "{}")),
        );
        let error = adapter.album("MPREb_missing").await.expect_err("must fail");
        assert_eq!(error.kind(), GatewayErrorKind::NotFound);
    }

    #[tokio::test]
    async fn rejected_search_is_unavailable_not_missing() {
        let adapter = adapter(
            FixtureHttpClient::new()
                .with_response(format!("{API_BASE}/search"), HttpResponse::new(400, "{}"))
                .with_response(format!("{API_BASE}/browse"), HttpResponse::new(404, "{}")),
        );

        let error = adapter.search("daft punk", 5).await.expect_err("must fail");
        assert_eq!(error.kind(), GatewayErrorKind::Unavailable);
        assert_eq!(error.message(), "youtube music returned status 400");

        let error = adapter.charts().await.expect_err("must fail");
        assert_eq!(error.kind(), GatewayErrorKind::Unavailable);
    }

    #[tokio::test]
    async fn empty_id_is_rejected_without_a_call() {
        let client = Arc::new(FixtureHttpClient::new());
        let adapter = YoutubeMusicAdapter::new(client.clone());

        let error = adapter.song("  ").await.expect_err("must fail");
        assert_eq!(error.kind(), GatewayErrorKind::InvalidRequest);
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn song_without_lyrics_tab_is_not_found() {
        let watch = json!({"contents": {"tabs": [
            {"tabRenderer": {"title": "Up next"}},
            {"tabRenderer": {"title": "Lyrics", "unselectable": true,
                "endpoint": {"browseEndpoint": {"browseId": "MPLYt_abc"}}}}
        ]}});
        let adapter = adapter(
            FixtureHttpClient::new()
                .with_response(format!("{API_BASE}/next"), HttpResponse::ok(watch.to_string())),
        );

        let error = adapter.lyrics("vid1").await.expect_err("must fail");
        assert_eq!(error.kind(), GatewayErrorKind::NotFound);
        assert_eq!(error.message(), "No lyrics found for this song.");
    }

    #[tokio::test]
    async fn lyrics_follow_the_lyrics_tab() {
        let watch = json!({"contents": {"tabs": [
            {"tabRenderer": {"title": "Lyrics", "endpoint": {"browseEndpoint": {"browseId": "MPLYt_abc"}}}}
        ]}});
        let lyrics = json!({"contents": {"sectionListRenderer": {"contents": [
            {"musicDescriptionShelfRenderer": {
                "description": {"runs": [{"text": "One more time\nWe're gonna celebrate"}]},
                "footer": {"runs": [{"text": "Source: LyricFind"}]}
            }}
        ]}}});
        let adapter = adapter(
            FixtureHttpClient::new()
                .with_response(format!("{API_BASE}/next"), HttpResponse::ok(watch.to_string()))
                .with_response(format!("{API_BASE}/browse"), HttpResponse::ok(lyrics.to_string())),
        );

        let record = adapter.lyrics("vid1").await.expect("lyrics");
        assert_eq!(record.get_str("source"), Some("Source: LyricFind"));
        assert!(record.get_str("lyrics").is_some_and(|text| text.starts_with("One more time")));
    }

    #[tokio::test]
    async fn charts_collect_carousel_sections() {
        let charts = json!({"contents": {"sectionListRenderer": {"contents": [
            {"musicCarouselShelfRenderer": {
                "header": {"musicCarouselShelfBasicHeaderRenderer": {"title": {"runs": [{"text": "Top artists"}]}}},
                "contents": [
                    {"musicTwoRowItemRenderer": {
                        "title": {"runs": [{"text": "Daft Punk"}]},
                        "navigationEndpoint": {"browseEndpoint": {"browseId": "UC_artist"}}
                    }}
                ]
            }}
        ]}}});
        let adapter = adapter(
            FixtureHttpClient::new()
                .with_response(format!("{API_BASE}/browse"), HttpResponse::ok(charts.to_string())),
        );

        let record = adapter.charts().await.expect("charts");
        let sections = record.get("sections").and_then(Value::as_array).expect("sections");
        assert_eq!(sections[0]["title"], json!("Top artists"));
        assert_eq!(sections[0]["items"][0]["browseId"], json!("UC_artist"));
    }
}
