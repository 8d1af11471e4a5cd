//! Options chain retrieval and option position enrichment.
//!
//! [`OptionsService::get_options_chain`] chooses one of two strategies by the
//! presence of a strike:
//!
//! | Strike | Strategy | Upstream calls | Pricing/Greeks | Near-the-money filter |
//! |--------|----------|----------------|----------------|-----------------------|
//! | given | [`targeted lookup`](OptionsService::targeted_lookup) | one market-data call per type | yes | no |
//! | omitted | [`chain listing`](OptionsService::chain_listing) | one listing + one price call | no | yes, fail-open |
//!
//! Both strategies feed [`build_contract`], so callers always receive the
//! same normalized [`OptionContract`] shape.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::source::{BrokerageSource, SourceError};
use crate::{
    coerce, OptionContract, OptionPosition, OptionType, PositionDirection, ServiceError, Symbol,
};

const CHAIN_CONTEXT: &str = "Failed to fetch options chain";
const POSITIONS_CONTEXT: &str = "Failed to fetch option positions";

/// Strikes are kept when they fall within this fraction of the reference price.
pub const NEAR_THE_MONEY_LOWER: f64 = 0.80;
pub const NEAR_THE_MONEY_UPPER: f64 = 1.20;

/// Parameters of one options-chain request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainQuery {
    pub symbol: String,
    pub expiration: Option<String>,
    pub option_type: Option<OptionType>,
    pub strike_price: Option<String>,
}

impl ChainQuery {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    pub fn with_expiration(mut self, expiration: impl Into<String>) -> Self {
        self.expiration = Some(expiration.into());
        self
    }

    pub fn with_option_type(mut self, option_type: OptionType) -> Self {
        self.option_type = Some(option_type);
        self
    }

    pub fn with_strike_price(mut self, strike_price: impl Into<String>) -> Self {
        self.strike_price = Some(strike_price.into());
        self
    }
}

/// Options chain and option position operations.
pub struct OptionsService {
    source: Arc<dyn BrokerageSource>,
}

impl OptionsService {
    pub fn new(source: Arc<dyn BrokerageSource>) -> Self {
        Self { source }
    }

    /// Returns the expiration to query.
    ///
    /// A non-empty `requested` value is trusted verbatim. Otherwise the first
    /// upstream expiration is used, relying on the upstream's ascending order.
    /// `None` means the chain has no expirations and the caller should return
    /// an empty result.
    pub async fn resolve_expiration(
        &self,
        symbol: &str,
        requested: Option<&str>,
    ) -> Result<Option<String>, SourceError> {
        if let Some(requested) = requested.filter(|value| !value.trim().is_empty()) {
            return Ok(Some(requested.to_owned()));
        }

        let expirations = self.source.list_expirations(symbol).await?;
        Ok(expirations.into_iter().next())
    }

    /// Fetches option contracts for `query`.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty or malformed symbol, before any
    ///   upstream call.
    /// - `AuthRequired` from the session, unchanged.
    /// - `Upstream` for every other failure during retrieval.
    pub async fn get_options_chain(
        &self,
        query: &ChainQuery,
    ) -> Result<Vec<OptionContract>, ServiceError> {
        let symbol = required_symbol(&query.symbol)?;

        self.source.ensure_session().await?;

        self.retrieve(symbol.as_str(), query)
            .await
            .map_err(|error| ServiceError::wrap_upstream(CHAIN_CONTEXT, error))
    }

    async fn retrieve(
        &self,
        symbol: &str,
        query: &ChainQuery,
    ) -> Result<Vec<OptionContract>, SourceError> {
        let Some(expiration) = self
            .resolve_expiration(symbol, query.expiration.as_deref())
            .await?
        else {
            debug!(symbol, "no expirations available");
            return Ok(Vec::new());
        };

        match query
            .strike_price
            .as_deref()
            .filter(|strike| !strike.trim().is_empty())
        {
            Some(strike) => {
                self.targeted_lookup(symbol, &expiration, strike, query.option_type)
                    .await
            }
            None => {
                self.chain_listing(symbol, &expiration, query.option_type)
                    .await
            }
        }
    }

    /// Point lookup with full market data. One upstream call per type.
    pub async fn targeted_lookup(
        &self,
        symbol: &str,
        expiration: &str,
        strike: &str,
        option_type: Option<OptionType>,
    ) -> Result<Vec<OptionContract>, SourceError> {
        let types = match option_type {
            Some(option_type) => vec![option_type],
            None => OptionType::BOTH.to_vec(),
        };
        debug!(symbol, expiration, strike, ?types, "targeted option lookup");

        let mut contracts = Vec::new();
        for option_type in types {
            let entries = self
                .source
                .get_market_data(symbol, expiration, strike, option_type)
                .await?;

            for mut entry in entries {
                if !coerce::is_record(&entry) {
                    continue;
                }
                inject_query(&mut entry, option_type, strike, expiration);
                contracts.push(build_contract(&entry, symbol, expiration));
            }
        }

        Ok(contracts)
    }

    /// Instrument listing for one expiration, narrowed to near-the-money strikes.
    pub async fn chain_listing(
        &self,
        symbol: &str,
        expiration: &str,
        option_type: Option<OptionType>,
    ) -> Result<Vec<OptionContract>, SourceError> {
        debug!(symbol, expiration, ?option_type, "option chain listing");
        let entries = self
            .source
            .list_tradable_instruments(symbol, expiration, option_type)
            .await?;
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let reference_price = self.reference_price(symbol).await;
        let records = entries.into_iter().filter(coerce::is_record).collect();

        Ok(filter_near_the_money(records, reference_price)
            .iter()
            .map(|entry| build_contract(entry, symbol, expiration))
            .collect())
    }

    /// Best-effort latest price; any failure disables filtering.
    async fn reference_price(&self, symbol: &str) -> Option<f64> {
        match self.source.get_latest_price(symbol).await {
            Ok(price) => price.filter(|price| *price > 0.0),
            Err(error) => {
                debug!(symbol, %error, "reference price unavailable; returning unfiltered chain");
                None
            }
        }
    }

    /// Lists held option positions with their contract identity resolved.
    ///
    /// Each position costs one instrument lookup. A failed lookup leaves
    /// strike, expiration and type null but still returns the position.
    pub async fn get_option_positions(&self) -> Result<Vec<OptionPosition>, ServiceError> {
        self.source.ensure_session().await?;

        let holdings = self
            .source
            .open_option_positions()
            .await
            .map_err(|error| ServiceError::wrap_upstream(POSITIONS_CONTEXT, error))?;

        let mut positions = Vec::with_capacity(holdings.len());
        for holding in holdings.iter().filter(|holding| coerce::is_record(holding)) {
            let instrument_id = coerce::text(holding, "option")
                .as_deref()
                .and_then(coerce::url_id)
                .map(str::to_owned);

            let instrument = match instrument_id {
                Some(id) => match self.source.option_instrument(&id).await {
                    Ok(instrument) => Some(instrument),
                    Err(error) => {
                        warn!(instrument_id = %id, %error, "option instrument lookup failed");
                        None
                    }
                },
                None => None,
            };

            positions.push(build_position(holding, instrument.as_ref()));
        }

        Ok(positions)
    }
}

/// Trims and validates a required symbol argument.
pub(crate) fn required_symbol(raw: &str) -> Result<Symbol, ServiceError> {
    if raw.trim().is_empty() {
        return Err(ServiceError::invalid_argument("Symbol is required"));
    }
    Ok(Symbol::parse(raw)?)
}

/// Keeps entries whose strike lies in `[0.8 * P, 1.2 * P]`.
///
/// Without a reference price every entry is kept. An entry with no
/// `strike_price` key is read as strike zero; one whose strike is null or not
/// numeric always passes.
pub fn filter_near_the_money(entries: Vec<Value>, reference_price: Option<f64>) -> Vec<Value> {
    let Some(price) = reference_price else {
        return entries;
    };
    let lower = price * NEAR_THE_MONEY_LOWER;
    let upper = price * NEAR_THE_MONEY_UPPER;

    entries
        .into_iter()
        .filter(|entry| {
            let strike = match entry.get("strike_price") {
                None => Some(0.0),
                Some(_) => coerce::number(entry, "strike_price"),
            };
            strike.map_or(true, |strike| strike >= lower && strike <= upper)
        })
        .collect()
}

/// Fills query parameters the market-data response did not echo back.
fn inject_query(entry: &mut Value, option_type: OptionType, strike: &str, expiration: &str) {
    let Some(fields) = entry.as_object_mut() else {
        return;
    };
    let defaults = [
        ("type", option_type.as_str()),
        ("strike_price", strike),
        ("expiration_date", expiration),
    ];
    for (key, value) in defaults {
        if fields.get(key).map_or(true, Value::is_null) {
            fields.insert(key.to_owned(), Value::from(value));
        }
    }
}

/// Normalizes one raw upstream option record.
///
/// `symbol` and `expiration` are used when the record does not carry its own.
pub fn build_contract(item: &Value, symbol: &str, expiration: &str) -> OptionContract {
    OptionContract {
        symbol: coerce::text(item, "chain_symbol").unwrap_or_else(|| symbol.to_owned()),
        expiration: coerce::text(item, "expiration_date")
            .unwrap_or_else(|| expiration.to_owned()),
        strike: coerce::number(item, "strike_price"),
        option_type: OptionType::from_upstream(item.get("type").and_then(Value::as_str)),
        bid: coerce::number(item, "bid_price"),
        ask: coerce::number(item, "ask_price"),
        mark_price: coerce::number(item, "adjusted_mark_price")
            .or_else(|| coerce::number(item, "mark_price")),
        last_trade_price: coerce::number(item, "last_trade_price"),
        open_interest: coerce::integer(item, "open_interest"),
        volume: coerce::integer(item, "volume"),
        implied_volatility: coerce::number(item, "implied_volatility"),
        delta: coerce::number(item, "delta"),
        gamma: coerce::number(item, "gamma"),
        theta: coerce::number(item, "theta"),
        vega: coerce::number(item, "vega"),
        rho: coerce::number(item, "rho"),
        chance_of_profit_short: coerce::number(item, "chance_of_profit_short"),
        chance_of_profit_long: coerce::number(item, "chance_of_profit_long"),
    }
}

fn build_position(holding: &Value, instrument: Option<&Value>) -> OptionPosition {
    OptionPosition {
        symbol: coerce::text(holding, "chain_symbol")
            .or_else(|| instrument.and_then(|inst| coerce::text(inst, "chain_symbol"))),
        expiration_date: instrument.and_then(|inst| coerce::text(inst, "expiration_date")),
        strike_price: instrument.and_then(|inst| coerce::number(inst, "strike_price")),
        option_type: instrument
            .and_then(|inst| coerce::text(inst, "type"))
            .and_then(|value| value.parse().ok()),
        direction: coerce::text(holding, "type")
            .as_deref()
            .and_then(PositionDirection::from_upstream),
        quantity: coerce::number(holding, "quantity"),
        average_price: coerce::number(holding, "average_price"),
        created_at: coerce::timestamp(holding, "created_at"),
        updated_at: coerce::timestamp(holding, "updated_at"),
    }
}
