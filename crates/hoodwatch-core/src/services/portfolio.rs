use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::source::{BrokerageSource, SourceErrorKind};
use crate::{coerce, PortfolioSummary, Position, ServiceError};

const SUMMARY_CONTEXT: &str = "Failed to fetch portfolio";
const POSITIONS_CONTEXT: &str = "Failed to fetch positions";
const UNKNOWN_SYMBOL: &str = "UNKNOWN";

/// Account equity and held stock positions.
pub struct PortfolioService {
    source: Arc<dyn BrokerageSource>,
}

impl PortfolioService {
    pub fn new(source: Arc<dyn BrokerageSource>) -> Self {
        Self { source }
    }

    pub async fn get_portfolio_summary(&self) -> Result<PortfolioSummary, ServiceError> {
        self.source.ensure_session().await?;

        let wrap = |error| ServiceError::wrap_upstream(SUMMARY_CONTEXT, error);
        let portfolio = self.source.portfolio_profile().await.map_err(wrap)?;
        let account = self.source.account_profile().await.map_err(wrap)?;

        let equity = coerce::number(&portfolio, "equity");
        let day_change = match (equity, coerce::number(&portfolio, "equity_previous_close")) {
            (Some(equity), Some(previous)) => Some(equity - previous),
            _ => None,
        };

        Ok(PortfolioSummary {
            equity,
            cash: coerce::number(&account, "cash"),
            buying_power: coerce::number(&account, "buying_power"),
            day_change,
            unrealized_pl: day_change,
        })
    }

    /// Open stock positions valued at the latest trade price.
    ///
    /// `symbols` narrows the result to the listed tickers (case-insensitive).
    /// Positions whose instrument cannot be resolved are reported as
    /// `UNKNOWN` and are only kept when no filter is given.
    pub async fn get_positions(
        &self,
        symbols: Option<&[String]>,
    ) -> Result<Vec<Position>, ServiceError> {
        self.source.ensure_session().await?;

        let wanted: Option<Vec<String>> = symbols
            .filter(|symbols| !symbols.is_empty())
            .map(|symbols| symbols.iter().map(|s| s.trim().to_ascii_uppercase()).collect());

        let holdings = self
            .source
            .open_stock_positions()
            .await
            .map_err(|error| ServiceError::wrap_upstream(POSITIONS_CONTEXT, error))?;

        let mut resolved = Vec::with_capacity(holdings.len());
        for holding in holdings.iter().filter(|holding| coerce::is_record(holding)) {
            let symbol = self.resolve_symbol(holding).await?;
            if let Some(wanted) = &wanted {
                let keep = symbol
                    .as_deref()
                    .is_some_and(|symbol| wanted.iter().any(|w| w.eq_ignore_ascii_case(symbol)));
                if !keep {
                    continue;
                }
            }
            resolved.push((symbol, holding));
        }

        let known: Vec<String> = resolved
            .iter()
            .filter_map(|(symbol, _)| symbol.clone())
            .collect();
        let last_prices = if known.is_empty() {
            HashMap::new()
        } else {
            let quotes = self
                .source
                .quotes(&known)
                .await
                .map_err(|error| ServiceError::wrap_upstream(POSITIONS_CONTEXT, error))?;
            quotes
                .iter()
                .filter_map(|quote| {
                    let symbol = coerce::text(quote, "symbol")?;
                    Some((symbol, coerce::number(quote, "last_trade_price")))
                })
                .collect::<HashMap<_, _>>()
        };
        debug!(positions = resolved.len(), quoted = last_prices.len(), "positions valued");

        Ok(resolved
            .into_iter()
            .map(|(symbol, holding)| {
                let last_price = symbol
                    .as_ref()
                    .and_then(|symbol| last_prices.get(symbol).copied().flatten());
                build_position(symbol, holding, last_price)
            })
            .collect())
    }

    async fn resolve_symbol(&self, holding: &Value) -> Result<Option<String>, ServiceError> {
        let Some(url) = coerce::text(holding, "instrument") else {
            return Ok(None);
        };
        match self.source.instrument_by_url(&url).await {
            Ok(instrument) => Ok(coerce::text(&instrument, "symbol")),
            Err(error) if error.kind() == SourceErrorKind::AuthRequired => {
                Err(ServiceError::from(error))
            }
            Err(error) => {
                debug!(%url, %error, "instrument lookup failed");
                Ok(None)
            }
        }
    }
}

fn build_position(symbol: Option<String>, holding: &Value, last_price: Option<f64>) -> Position {
    let quantity = coerce::number(holding, "quantity");
    let average_cost = coerce::number(holding, "average_buy_price");

    let market_value = quantity.zip(last_price).map(|(qty, price)| qty * price);
    let unrealized_pl = market_value
        .zip(quantity.zip(average_cost))
        .map(|(value, (qty, cost))| value - qty * cost);

    Position {
        symbol: symbol.unwrap_or_else(|| String::from(UNKNOWN_SYMBOL)),
        quantity,
        average_cost,
        market_value,
        unrealized_pl,
    }
}
