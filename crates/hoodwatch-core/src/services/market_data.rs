use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::options::required_symbol;
use crate::source::BrokerageSource;
use crate::{
    coerce, Candle, HistoryBounds, HistoryInterval, HistorySpan, Quote, ServiceError, Symbol,
};

const QUOTES_CONTEXT: &str = "Failed to fetch quotes";
const HISTORY_CONTEXT: &str = "Failed to fetch price history";

/// Quotes and historical candles.
pub struct MarketDataService {
    source: Arc<dyn BrokerageSource>,
}

impl MarketDataService {
    pub fn new(source: Arc<dyn BrokerageSource>) -> Self {
        Self { source }
    }

    /// Latest quote for each symbol, in upstream order.
    pub async fn get_current_price(&self, symbols: &[String]) -> Result<Vec<Quote>, ServiceError> {
        if symbols.is_empty() {
            return Err(ServiceError::invalid_argument(
                "At least one symbol is required",
            ));
        }
        let symbols = symbols
            .iter()
            .map(|raw| Symbol::parse(raw).map(String::from))
            .collect::<Result<Vec<_>, _>>()?;

        self.source.ensure_session().await?;

        let quotes = self
            .source
            .quotes(&symbols)
            .await
            .map_err(|error| ServiceError::wrap_upstream(QUOTES_CONTEXT, error))?;
        debug!(requested = symbols.len(), returned = quotes.len(), "quotes fetched");

        Ok(quotes
            .iter()
            .filter(|quote| coerce::is_record(quote))
            .map(build_quote)
            .collect())
    }

    /// Historical candles. `None` parameters take the documented defaults.
    ///
    /// Parameter validation happens before the session is touched.
    pub async fn get_price_history(
        &self,
        symbol: &str,
        interval: Option<&str>,
        span: Option<&str>,
        bounds: Option<&str>,
    ) -> Result<Vec<Candle>, ServiceError> {
        let symbol = required_symbol(symbol)?;
        let interval = interval
            .map(str::parse::<HistoryInterval>)
            .transpose()?
            .unwrap_or_default();
        let span = span
            .map(str::parse::<HistorySpan>)
            .transpose()?
            .unwrap_or_default();
        let bounds = bounds
            .map(str::parse::<HistoryBounds>)
            .transpose()?
            .unwrap_or_default();

        self.source.ensure_session().await?;

        let candles = self
            .source
            .historicals(symbol.as_str(), interval, span, bounds)
            .await
            .map_err(|error| ServiceError::wrap_upstream(HISTORY_CONTEXT, error))?;

        Ok(candles
            .iter()
            .filter(|candle| coerce::is_record(candle))
            .map(build_candle)
            .collect())
    }
}

fn build_quote(item: &Value) -> Quote {
    let last_price = coerce::number(item, "last_trade_price");
    let previous_close = coerce::number(item, "previous_close");

    Quote {
        symbol: coerce::text_or_empty(item, "symbol"),
        last_price,
        bid: coerce::number(item, "bid_price"),
        ask: coerce::number(item, "ask_price"),
        timestamp: coerce::timestamp(item, "updated_at"),
        previous_close,
        change_percent: change_percent(last_price, previous_close),
    }
}

/// Percentage move from the previous close; undefined when the close is zero.
pub fn change_percent(last: Option<f64>, previous_close: Option<f64>) -> Option<f64> {
    match (last, previous_close) {
        (Some(last), Some(previous)) if previous != 0.0 => {
            Some((last - previous) / previous * 100.0)
        }
        _ => None,
    }
}

fn build_candle(item: &Value) -> Candle {
    Candle {
        timestamp: coerce::timestamp(item, "begins_at"),
        open: coerce::number(item, "open_price"),
        high: coerce::number(item, "high_price"),
        low: coerce::number(item, "low_price"),
        close: coerce::number(item, "close_price"),
        volume: coerce::integer(item, "volume"),
    }
}
