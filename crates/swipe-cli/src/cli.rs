//! CLI argument definitions for swipe.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `finance` | Quote fields for a ticker, with optional history and recommendations |
//! | `search` | Web search |
//! | `news` | News search or top headlines |
//! | `music` | Music search and song/album/artist/lyrics/charts lookups |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--timeout-ms` | from `SWIPE_CALL_TIMEOUT_MS` or 15000 | Per upstream call timeout |
//! | `--verbose` | `false` | Debug logging on stderr |
//!
//! # Examples
//!
//! ```bash
//! swipe finance AAPL --fields price,previous_close --history-days 5
//! swipe search "rust async" --count 5 --include-rank
//! swipe news --category business --include-sentiment
//! swipe music lyrics dQw4w9WgXcQ --pretty
//! ```

use clap::{Args, Parser, Subcommand};

/// Normalized finance, search, news and music data from public providers.
#[derive(Debug, Parser)]
#[command(name = "swipe", author, version, about)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Per upstream call timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Log at debug level regardless of RUST_LOG.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch quote fields for a ticker symbol.
    ///
    ///   swipe finance AAPL
    ///   swipe finance MSFT --fields price,beta --include-recommendations
    Finance(FinanceArgs),

    /// Search the web.
    Search(SearchArgs),

    /// Search news, or list top headlines when no query is given.
    News(NewsArgs),

    /// YouTube Music search and lookups.
    Music(MusicArgs),
}

/// Field selection and window shared by the list endpoints.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Comma-separated output fields; defaults to the domain's default set.
    #[arg(long)]
    pub fields: Option<String>,

    /// Zero-based offset of the first result.
    #[arg(long)]
    pub start: Option<usize>,

    /// Number of results to return.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Debug, Args)]
pub struct FinanceArgs {
    /// Ticker symbol (e.g., AAPL, ^GSPC, BTC-USD).
    pub ticker: String,

    /// Comma-separated output fields.
    #[arg(long)]
    pub fields: Option<String>,

    /// Attach the last N days of price history.
    #[arg(long)]
    pub history_days: Option<u32>,

    /// History start date (YYYY-MM-DD); takes priority over --history-days.
    #[arg(long)]
    pub start_date: Option<String>,

    /// History end date (YYYY-MM-DD); requires --start-date.
    #[arg(long)]
    pub end_date: Option<String>,

    /// History bar interval (1m .. 3mo).
    #[arg(long)]
    pub interval: Option<String>,

    /// Attach analyst recommendation trends.
    #[arg(long, default_value_t = false)]
    pub include_recommendations: bool,

    /// Return raw prices instead of split/dividend adjusted ones.
    #[arg(long, default_value_t = false)]
    pub unadjusted: bool,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Search query.
    pub query: String,

    #[command(flatten)]
    pub list: ListArgs,

    /// Result language (en, es, fr, de, ja, zh, ru, pt, it).
    #[arg(long)]
    pub language: Option<String>,

    /// Disable safe search.
    #[arg(long, default_value_t = false)]
    pub no_safe: bool,

    /// Include the result rank when the `rank` field is selected.
    #[arg(long, default_value_t = false)]
    pub include_rank: bool,
}

#[derive(Debug, Args)]
pub struct NewsArgs {
    /// News query; omit for top headlines.
    pub query: Option<String>,

    #[command(flatten)]
    pub list: ListArgs,

    /// Earliest article date (YYYY-MM-DD).
    #[arg(long)]
    pub from_date: Option<String>,

    /// Latest article date (YYYY-MM-DD).
    #[arg(long)]
    pub to_date: Option<String>,

    /// Article language (e.g., en, de).
    #[arg(long)]
    pub language: Option<String>,

    /// Edition region (e.g., US, GB, IN).
    #[arg(long)]
    pub region: Option<String>,

    /// Topic appended to the query (e.g., business, technology).
    #[arg(long)]
    pub category: Option<String>,

    /// Score each article's sentiment.
    #[arg(long, default_value_t = false)]
    pub include_sentiment: bool,
}

#[derive(Debug, Args)]
pub struct MusicArgs {
    #[command(subcommand)]
    pub command: MusicCommand,
}

#[derive(Debug, Subcommand)]
pub enum MusicCommand {
    /// Search songs, albums, artists and videos.
    Search {
        query: String,

        #[command(flatten)]
        list: ListArgs,
    },
    /// Song details by video id.
    Song { video_id: String },
    /// Album details by browse id.
    Album { browse_id: String },
    /// Artist details by channel id.
    Artist { channel_id: String },
    /// Lyrics by video id.
    Lyrics { video_id: String },
    /// Current charts.
    Charts,
}
