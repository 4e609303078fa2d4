//! Quotes with optional history and analyst recommendations (Yahoo Finance).
//!
//! The quote summary is the primary fetch and decides the request status.
//! `historical`, `recommendations` and the previous-close backfill are
//! secondary: each failure is confined to its own slot or field.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::warn;

use super::encode;
use crate::catalog::{FieldCatalog, FieldSelection, FieldSpec, ResolvedFields};
use crate::coordinator::PartialFetchCoordinator;
use crate::gateway::{HistoryQuery, HistoryRange, QuoteGateway};
use crate::options::OptionMap;
use crate::outcome::RequestOutcome;
use crate::projector::project;
use crate::record::FieldValue;
use crate::{Domain, Interval, ServiceError, Symbol, ValidationError};

const PREVIOUS_CLOSE: &str = "previous_close";

static FINANCE_FIELDS: [FieldSpec; 15] = [
    FieldSpec::key("price", "regularMarketPrice"),
    FieldSpec::key("market_cap", "marketCap"),
    FieldSpec::key("pe_ratio", "trailingPE"),
    FieldSpec::key("pb_ratio", "priceToBook"),
    FieldSpec::key("beta", "beta"),
    FieldSpec::key("dividend_yield", "dividendYield"),
    FieldSpec::key("52_week_high", "fiftyTwoWeekHigh"),
    FieldSpec::key("52_week_low", "fiftyTwoWeekLow"),
    FieldSpec::key("volume", "regularMarketVolume"),
    FieldSpec::key("average_volume", "averageVolume"),
    FieldSpec::key("open", "regularMarketOpen"),
    FieldSpec::key(PREVIOUS_CLOSE, "previousClose").backfilled(),
    FieldSpec::key("forward_pe", "forwardPE"),
    FieldSpec::key("enterprise_value", "enterpriseValue"),
    FieldSpec::key("payout_ratio", "payoutRatio"),
];

/// Quote fields. `previous_close` is backfilled from recent history when the
/// quote summary lacks it.
pub static FINANCE_CATALOG: FieldCatalog = FieldCatalog::new(
    Domain::Finance,
    &FINANCE_FIELDS,
    &[
        "price",
        PREVIOUS_CLOSE,
        "market_cap",
        "pe_ratio",
        "52_week_high",
        "52_week_low",
    ],
);

/// Parsed finance options.
///
/// | Option | Default | Meaning |
/// |--------|---------|---------|
/// | `history_days` | `0` | attach the last N days of bars |
/// | `start_date` / `end_date` | none | explicit bar range, takes priority over `history_days` |
/// | `interval` | `1d` | bar interval |
/// | `adjusted` | `true` | split/dividend adjusted OHLC |
/// | `include_recommendations` | `false` | attach analyst recommendation trend |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FinanceOptions {
    pub history: Option<HistoryQuery>,
    pub include_recommendations: bool,
}

impl FinanceOptions {
    pub fn parse(options: &OptionMap) -> Result<Self, ValidationError> {
        let interval = options.parsed::<Interval>("interval")?.unwrap_or_default();
        let adjusted = options.bool_or("adjusted", true)?;
        let history_days = options.u32("history_days")?.unwrap_or(0);
        let start = options.date("start_date")?;
        let end = options.date("end_date")?;

        let range = match (start, end) {
            (None, Some(_)) => {
                return Err(ValidationError::MissingDateBound {
                    field: "end_date",
                    requires: "start_date",
                })
            }
            (Some(start), Some(end)) if end < start => {
                return Err(ValidationError::InvertedDateRange {
                    start: start.to_string(),
                    end: end.to_string(),
                })
            }
            (Some(start), end) => Some(HistoryRange::Between { start, end }),
            (None, None) if history_days > 0 => Some(HistoryRange::Days(history_days)),
            (None, None) => None,
        };

        Ok(Self {
            history: range.map(|range| HistoryQuery {
                range,
                interval,
                adjusted,
            }),
            include_recommendations: options.bool_or("include_recommendations", false)?,
        })
    }
}

/// Quote lookups with optional history and recommendation slots.
#[derive(Clone)]
pub struct FinanceService {
    gateway: Arc<dyn QuoteGateway>,
    coordinator: PartialFetchCoordinator,
}

impl FinanceService {
    pub fn new(gateway: Arc<dyn QuoteGateway>, coordinator: PartialFetchCoordinator) -> Self {
        Self {
            gateway,
            coordinator,
        }
    }

    /// Payload: `ticker`, then the selected fields in order, then the
    /// `historical` and `recommendations` slots when requested.
    pub async fn quote(
        &self,
        ticker: &str,
        selection: &FieldSelection,
        options: &OptionMap,
    ) -> RequestOutcome {
        self.coordinator
            .run(&FINANCE_CATALOG, selection, |fields| async move {
                let symbol = Symbol::parse(ticker)?;
                let options = FinanceOptions::parse(options)?;
                self.assemble(&symbol, &fields, options).await
            })
            .await
    }

    async fn assemble(
        &self,
        symbol: &Symbol,
        fields: &ResolvedFields,
        options: FinanceOptions,
    ) -> Result<Value, ServiceError> {
        let info = self
            .coordinator
            .bounded(self.gateway.fetch_primary(symbol))
            .await?;
        let mut projected = project(&info, fields);

        let needs_backfill = fields
            .absence_sensitive()
            .any(|spec| projected.get(spec.name).is_some_and(FieldValue::is_unknown));

        let backfill = async {
            if needs_backfill {
                self.previous_close(symbol).await
            } else {
                None
            }
        };
        let historical = async {
            match options.history {
                Some(query) => Some(
                    self.coordinator
                        .secondary(
                            "historical",
                            "historical data",
                            self.gateway.history(symbol, query),
                        )
                        .await,
                ),
                None => None,
            }
        };
        let recommendations = async {
            if options.include_recommendations {
                Some(
                    self.coordinator
                        .secondary(
                            "recommendations",
                            "recommendations",
                            self.gateway.recommendations(symbol),
                        )
                        .await,
                )
            } else {
                None
            }
        };
        let (previous_close, historical, recommendations) =
            tokio::join!(backfill, historical, recommendations);

        if let Some(close) = previous_close {
            projected.fill(PREVIOUS_CLOSE, FieldValue::Known(close));
        }

        let mut payload = Map::new();
        let ticker = info.get_str("symbol").unwrap_or(symbol.as_str());
        payload.insert(String::from("ticker"), Value::from(ticker));
        for (name, value) in projected.iter() {
            payload.insert(name.to_owned(), encode(value)?);
        }
        if let Some(historical) = historical {
            payload.insert(String::from("historical"), encode(&historical)?);
        }
        if let Some(recommendations) = recommendations {
            payload.insert(String::from("recommendations"), encode(&recommendations)?);
        }

        Ok(Value::Object(payload))
    }

    /// Close of the second-to-last of the two most recent sessions. Any
    /// failure leaves the field unknown.
    async fn previous_close(&self, symbol: &Symbol) -> Option<Value> {
        let recent = self
            .coordinator
            .bounded(self.gateway.history(symbol, HistoryQuery::recent_days(2)))
            .await;

        match recent {
            Ok(rows) => rows.iter().rev().nth(1).and_then(|row| row.get("close").cloned()),
            Err(error) => {
                warn!(symbol = %symbol, error = %error, "previous close backfill failed");
                None
            }
        }
    }
}
