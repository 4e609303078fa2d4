//! Behavior tests for the inbound `handle` surface: routing, option
//! validation and the serialized outcome envelope.

mod support;

use std::sync::Arc;

use serde_json::{json, Value};
use support::{raw, rows, FakeMusic, FakeNews, FakeQuotes, FakeSearch, Fakes};
use swipe_core::{
    Domain, Endpoint, GatewayError, InboundRequest, OutcomeStatus, ProviderId, SCHEMA_VERSION,
};

fn search_fakes() -> (Fakes, Arc<FakeSearch>) {
    let hits = rows(
        (1..=20)
            .map(|n| json!({"href": format!("https://r{n}.example/"), "title": format!("r{n}"), "body": "b"}))
            .collect(),
    );
    let search = Arc::new(FakeSearch::new(Ok(hits)));
    (
        Fakes {
            search: search.clone(),
            ..Fakes::default()
        },
        search,
    )
}

// =============================================================================
// Envelope
// =============================================================================

#[tokio::test]
async fn every_outcome_carries_metadata_for_its_domain() {
    let (fakes, _) = search_fakes();
    let hub = fakes.hub();

    for (endpoint, domain, provider) in [
        (Endpoint::Finance, Domain::Finance, ProviderId::Yahoo),
        (Endpoint::Search, Domain::Search, ProviderId::DuckDuckGo),
        (Endpoint::News, Domain::News, ProviderId::GoogleNews),
        (Endpoint::MusicCharts, Domain::Music, ProviderId::YoutubeMusic),
    ] {
        let outcome = hub.handle(endpoint, &InboundRequest::new("x")).await;
        let meta = outcome.meta();

        assert_eq!(meta.domain, domain, "{endpoint}");
        assert_eq!(meta.provider, provider, "{endpoint}");
        assert_eq!(meta.schema_version, SCHEMA_VERSION);
        assert_eq!(meta.request_id.len(), 36, "{endpoint}");
        assert!(meta.generated_at.format_rfc3339().ends_with('Z'), "{endpoint}");
    }
}

#[tokio::test]
async fn request_ids_are_unique_per_request() {
    let (fakes, _) = search_fakes();
    let hub = fakes.hub();

    let first = hub.handle(Endpoint::Search, &InboundRequest::new("a")).await;
    let second = hub.handle(Endpoint::Search, &InboundRequest::new("a")).await;

    assert_ne!(first.meta().request_id, second.meta().request_id);
}

#[tokio::test]
async fn failures_serialize_with_a_message_and_no_payload() {
    // Given: The music provider does not know the id
    let fakes = Fakes {
        music: Arc::new(FakeMusic::new(Ok(Vec::new()))),
        ..Fakes::default()
    };

    // When: A song lookup is made and the outcome serialized
    let outcome = fakes
        .hub()
        .handle(Endpoint::MusicSong, &InboundRequest::new("nope"))
        .await;
    let json = serde_json::to_value(&outcome).expect("outcome serializes");

    // Then: status and message, metadata, and no payload key
    assert_eq!(json["status"], json!("not_found"));
    assert_eq!(json["message"], json!("not found"));
    assert!(json.get("payload").is_none());
    assert_eq!(json["meta"]["domain"], json!("music"));
    assert_eq!(json["meta"]["provider"], json!("youtube_music"));
}

#[tokio::test]
async fn successes_serialize_with_a_payload_and_no_message() {
    let (fakes, _) = search_fakes();
    let outcome = fakes
        .hub()
        .handle(Endpoint::Search, &InboundRequest::new("rust").with_window(0, 1))
        .await;
    let json = serde_json::to_value(&outcome).expect("outcome serializes");

    assert_eq!(json["status"], json!("ok"));
    assert!(json.get("message").is_none());
    assert_eq!(json["payload"].as_array().map(Vec::len), Some(1));
    assert!(json["meta"]["generated_at"]
        .as_str()
        .is_some_and(|stamp| stamp.ends_with('Z')));
}

// =============================================================================
// Routing and options
// =============================================================================

#[tokio::test]
async fn search_window_without_rank_returns_the_requested_slice() {
    // Given: Twenty upstream hits
    let (fakes, search) = search_fakes();

    // When: start=10, count=5 and no rank option
    let request = InboundRequest::new("rust").with_window(10, 5);
    let outcome = fakes.hub().handle(Endpoint::Search, &request).await;

    // Then: Hits 11..=15, no rank key, safe search on in the default region
    let payload = outcome.payload().expect("payload");
    let hits = payload.as_array().expect("array");
    assert_eq!(hits.len(), 5);
    assert_eq!(hits[0]["title"], json!("r11"));
    assert!(hits.iter().all(|hit| hit.get("rank").is_none()));

    let sent = &search.queries()[0];
    assert_eq!(sent.query, "rust");
    assert_eq!(sent.region, "us-en");
    assert!(sent.safe);
}

#[tokio::test]
async fn blank_queries_are_invalid_before_any_call() {
    let (fakes, search) = search_fakes();
    let hub = fakes.hub();

    let search_outcome = hub
        .handle(Endpoint::Search, &InboundRequest::new("   "))
        .await;
    let music_outcome = hub
        .handle(Endpoint::MusicLyrics, &InboundRequest::default())
        .await;
    let finance_outcome = hub.handle(Endpoint::Finance, &InboundRequest::default()).await;

    assert_eq!(search_outcome.status(), OutcomeStatus::InvalidInput);
    assert_eq!(music_outcome.status(), OutcomeStatus::InvalidInput);
    assert_eq!(finance_outcome.status(), OutcomeStatus::InvalidInput);
    assert!(search.queries().is_empty());
}

#[tokio::test]
async fn malformed_boolean_options_are_rejected() {
    let (fakes, search) = search_fakes();

    let request = InboundRequest::new("rust").with_option("include_rank", "perhaps");
    let outcome = fakes.hub().handle(Endpoint::Search, &request).await;

    assert_eq!(outcome.status(), OutcomeStatus::InvalidInput);
    let message = outcome.message().expect("message");
    assert!(message.contains("include_rank"), "{message}");
    assert!(message.contains("perhaps"), "{message}");
    assert!(search.queries().is_empty());
}

#[tokio::test]
async fn finance_date_options_are_validated_before_fetching() {
    let quotes = Arc::new(FakeQuotes::with_info(json!({"regularMarketPrice": 1.0})));
    let fakes = Fakes {
        quotes: quotes.clone(),
        ..Fakes::default()
    };
    let hub = fakes.hub();

    let end_only = InboundRequest::new("AAPL").with_option("end_date", "2024-02-01");
    let inverted = InboundRequest::new("AAPL")
        .with_option("start_date", "2024-02-01")
        .with_option("end_date", "2024-01-01");
    let bad_interval = InboundRequest::new("AAPL").with_option("interval", "2d");

    for request in [end_only, inverted, bad_interval] {
        let outcome = hub.handle(Endpoint::Finance, &request).await;
        assert_eq!(outcome.status(), OutcomeStatus::InvalidInput, "{request:?}");
    }
    assert_eq!(quotes.info_calls(), 0);
}

#[tokio::test]
async fn news_options_shape_the_upstream_query() {
    // Given: A news provider
    let news = Arc::new(FakeNews::new(Ok(Vec::new())));
    let fakes = Fakes {
        news: news.clone(),
        ..Fakes::default()
    };

    // When: The caller narrows by dates, locale and category
    let request = InboundRequest::new(" rust ")
        .with_option("from_date", "2024-09-01")
        .with_option("to_date", "2024-09-30")
        .with_option("language", "de")
        .with_option("region", "DE")
        .with_option("category", "technology");
    let outcome = fakes.hub().handle(Endpoint::News, &request).await;

    // Then: The query reaches the provider trimmed, with every filter
    assert_eq!(outcome.payload(), Some(&json!({"articles": []})));
    let sent = &news.queries()[0];
    assert_eq!(sent.query.as_deref(), Some("rust"));
    assert_eq!(sent.language, "de");
    assert_eq!(sent.region, "DE");
    assert_eq!(sent.category.as_deref(), Some("technology"));
    assert_eq!(sent.from.map(|date| date.to_string()).as_deref(), Some("2024-09-01"));
    assert_eq!(sent.search_text().as_deref(), Some("rust when:technology"));
}

#[tokio::test]
async fn inverted_news_dates_are_rejected() {
    let news = Arc::new(FakeNews::new(Ok(Vec::new())));
    let fakes = Fakes {
        news: news.clone(),
        ..Fakes::default()
    };

    let request = InboundRequest::new("rust")
        .with_option("from_date", "2024-09-30")
        .with_option("to_date", "2024-09-01");
    let outcome = fakes.hub().handle(Endpoint::News, &request).await;

    assert_eq!(outcome.status(), OutcomeStatus::InvalidInput);
    assert!(news.queries().is_empty());
}

#[tokio::test]
async fn music_lookups_return_the_raw_record() {
    // Given: A provider record for an album
    let album = json!({"browseId": "MPREb_1", "title": "Discovery", "tracks": []});
    let fakes = Fakes {
        music: Arc::new(FakeMusic::new(Ok(Vec::new())).record(Ok(raw(album.clone())))),
        ..Fakes::default()
    };

    // When: The album is looked up
    let outcome = fakes
        .hub()
        .handle(Endpoint::MusicAlbum, &InboundRequest::new("MPREb_1"))
        .await;

    // Then: The payload is the record as the provider described it
    assert_eq!(outcome.status(), OutcomeStatus::Ok);
    assert_eq!(outcome.payload(), Some(&album));
}

#[tokio::test]
async fn music_lookup_outages_are_unavailable() {
    let fakes = Fakes {
        music: Arc::new(
            FakeMusic::new(Ok(Vec::new()))
                .record(Err(GatewayError::unavailable("youtube music returned status 503"))),
        ),
        ..Fakes::default()
    };

    let outcome = fakes
        .hub()
        .handle(Endpoint::MusicCharts, &InboundRequest::default())
        .await;

    assert_eq!(outcome.status(), OutcomeStatus::UpstreamUnavailable);
    assert_eq!(outcome.payload(), None::<&Value>);
}
