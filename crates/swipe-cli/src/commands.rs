//! Maps parsed commands onto hub endpoints and inbound requests.

use swipe_core::{Endpoint, InboundRequest};

use crate::cli::{Command, FinanceArgs, ListArgs, MusicCommand, NewsArgs, SearchArgs};

pub fn inbound(command: &Command) -> (Endpoint, InboundRequest) {
    match command {
        Command::Finance(args) => (Endpoint::Finance, finance(args)),
        Command::Search(args) => (Endpoint::Search, search(args)),
        Command::News(args) => (Endpoint::News, news(args)),
        Command::Music(args) => match &args.command {
            MusicCommand::Search { query, list } => (
                Endpoint::MusicSearch,
                listed(InboundRequest::new(query.as_str()), list),
            ),
            MusicCommand::Song { video_id } => {
                (Endpoint::MusicSong, InboundRequest::new(video_id.as_str()))
            }
            MusicCommand::Album { browse_id } => {
                (Endpoint::MusicAlbum, InboundRequest::new(browse_id.as_str()))
            }
            MusicCommand::Artist { channel_id } => {
                (Endpoint::MusicArtist, InboundRequest::new(channel_id.as_str()))
            }
            MusicCommand::Lyrics { video_id } => {
                (Endpoint::MusicLyrics, InboundRequest::new(video_id.as_str()))
            }
            MusicCommand::Charts => (Endpoint::MusicCharts, InboundRequest::default()),
        },
    }
}

fn listed(mut request: InboundRequest, list: &ListArgs) -> InboundRequest {
    request.fields = list.fields.clone();
    request.start = list.start;
    request.count = list.count;
    request
}

fn with_optional(request: InboundRequest, name: &str, value: Option<&str>) -> InboundRequest {
    match value {
        Some(value) => request.with_option(name, value),
        None => request,
    }
}

fn finance(args: &FinanceArgs) -> InboundRequest {
    let mut request = InboundRequest::new(args.ticker.as_str())
        .with_option("include_recommendations", args.include_recommendations.to_string())
        .with_option("adjusted", (!args.unadjusted).to_string());
    request.fields = args.fields.clone();

    if let Some(days) = args.history_days {
        request = request.with_option("history_days", days.to_string());
    }
    request = with_optional(request, "start_date", args.start_date.as_deref());
    request = with_optional(request, "end_date", args.end_date.as_deref());
    with_optional(request, "interval", args.interval.as_deref())
}

fn search(args: &SearchArgs) -> InboundRequest {
    let request = listed(InboundRequest::new(args.query.as_str()), &args.list)
        .with_option("safe", (!args.no_safe).to_string())
        .with_option("include_rank", args.include_rank.to_string());
    with_optional(request, "language", args.language.as_deref())
}

fn news(args: &NewsArgs) -> InboundRequest {
    let base = InboundRequest {
        query: args.query.clone(),
        ..InboundRequest::default()
    };
    let mut request = listed(base, &args.list)
        .with_option("include_sentiment", args.include_sentiment.to_string());

    for (name, value) in [
        ("from_date", &args.from_date),
        ("to_date", &args.to_date),
        ("language", &args.language),
        ("region", &args.region),
        ("category", &args.category),
    ] {
        request = with_optional(request, name, value.as_deref());
    }
    request
}
