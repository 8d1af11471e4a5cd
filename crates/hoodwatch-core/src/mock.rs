//! In-memory brokerage source for tests.
//!
//! Implements [`BrokerageSource`] from scripted data and records every call
//! so tests can assert how many upstream requests an operation made.
//!
//! ```ignore
//! use hoodwatch_core::mock::{Capability, MockSource};
//! use serde_json::json;
//!
//! let source = MockSource::builder()
//!     .with_expirations(["2026-03-20", "2026-04-17"])
//!     .with_latest_price(100.0)
//!     .with_instruments(vec![json!({ "strike_price": "100.0000", "type": "call" })])
//!     .build();
//!
//! assert_eq!(source.calls(Capability::ListExpirations), 0);
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use serde_json::Value;

use crate::source::{BrokerageSource, SourceError, SourceFuture};
use crate::{HistoryBounds, HistoryInterval, HistorySpan, OptionType};

/// Upstream capability identifier used for call counting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    EnsureSession,
    Logout,
    ListExpirations,
    ListTradableInstruments,
    GetMarketData,
    GetLatestPrice,
    OpenOptionPositions,
    OptionInstrument,
    Quotes,
    Historicals,
    Fundamentals,
    News,
    PortfolioProfile,
    AccountProfile,
    OpenStockPositions,
    InstrumentByUrl,
    Watchlists,
    WatchlistItems,
    StockOrders,
    OptionOrders,
    CryptoOrders,
}

/// One recorded upstream call with its arguments rendered as strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub capability: Capability,
    pub args: Vec<String>,
}

/// Builder for [`MockSource`].
#[derive(Default)]
pub struct MockSourceBuilder {
    expirations: Vec<String>,
    instruments: Vec<Value>,
    market_data: HashMap<OptionType, Vec<Value>>,
    latest_price: Option<f64>,
    option_positions: Vec<Value>,
    option_instruments: HashMap<String, Value>,
    quotes: Vec<Value>,
    historicals: Vec<Value>,
    fundamentals: Vec<Value>,
    news: Vec<Value>,
    portfolio: Value,
    account: Value,
    stock_positions: Vec<Value>,
    instruments_by_url: HashMap<String, Value>,
    watchlists: Vec<Value>,
    watchlist_items: HashMap<String, Vec<Value>>,
    stock_orders: Vec<Value>,
    option_orders: Vec<Value>,
    crypto_orders: Vec<Value>,
    failures: HashMap<Capability, SourceError>,
}

impl MockSourceBuilder {
    pub fn with_expirations<I, S>(mut self, expirations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expirations = expirations.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_instruments(mut self, instruments: Vec<Value>) -> Self {
        self.instruments = instruments;
        self
    }

    /// Entries returned by a market-data call for `option_type`.
    pub fn with_market_data(mut self, option_type: OptionType, entries: Vec<Value>) -> Self {
        self.market_data.insert(option_type, entries);
        self
    }

    pub fn with_latest_price(mut self, price: f64) -> Self {
        self.latest_price = Some(price);
        self
    }

    pub fn with_option_positions(mut self, positions: Vec<Value>) -> Self {
        self.option_positions = positions;
        self
    }

    pub fn with_option_instrument(mut self, id: impl Into<String>, instrument: Value) -> Self {
        self.option_instruments.insert(id.into(), instrument);
        self
    }

    pub fn with_quotes(mut self, quotes: Vec<Value>) -> Self {
        self.quotes = quotes;
        self
    }

    pub fn with_historicals(mut self, candles: Vec<Value>) -> Self {
        self.historicals = candles;
        self
    }

    pub fn with_fundamentals(mut self, fundamentals: Vec<Value>) -> Self {
        self.fundamentals = fundamentals;
        self
    }

    pub fn with_news(mut self, news: Vec<Value>) -> Self {
        self.news = news;
        self
    }

    pub fn with_portfolio(mut self, portfolio: Value) -> Self {
        self.portfolio = portfolio;
        self
    }

    pub fn with_account(mut self, account: Value) -> Self {
        self.account = account;
        self
    }

    pub fn with_stock_positions(mut self, positions: Vec<Value>) -> Self {
        self.stock_positions = positions;
        self
    }

    pub fn with_instrument(mut self, url: impl Into<String>, instrument: Value) -> Self {
        self.instruments_by_url.insert(url.into(), instrument);
        self
    }

    pub fn with_watchlists(mut self, watchlists: Vec<Value>) -> Self {
        self.watchlists = watchlists;
        self
    }

    pub fn with_watchlist_items(mut self, list_id: impl Into<String>, items: Vec<Value>) -> Self {
        self.watchlist_items.insert(list_id.into(), items);
        self
    }

    pub fn with_stock_orders(mut self, orders: Vec<Value>) -> Self {
        self.stock_orders = orders;
        self
    }

    pub fn with_option_orders(mut self, orders: Vec<Value>) -> Self {
        self.option_orders = orders;
        self
    }

    pub fn with_crypto_orders(mut self, orders: Vec<Value>) -> Self {
        self.crypto_orders = orders;
        self
    }

    /// Makes every call to `capability` fail with `error`.
    pub fn failing(mut self, capability: Capability, error: SourceError) -> Self {
        self.failures.insert(capability, error);
        self
    }

    pub fn build(self) -> MockSource {
        MockSource {
            data: self,
            calls: Mutex::new(Vec::new()),
        }
    }
}

/// Scripted [`BrokerageSource`] that records every call.
pub struct MockSource {
    data: MockSourceBuilder,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockSource {
    pub fn builder() -> MockSourceBuilder {
        MockSourceBuilder::default()
    }

    /// Number of calls made to `capability`.
    pub fn calls(&self, capability: Capability) -> usize {
        self.recorded_calls()
            .iter()
            .filter(|call| call.capability == capability)
            .count()
    }

    /// Number of calls to anything other than the session capability.
    pub fn data_calls(&self) -> usize {
        self.recorded_calls()
            .iter()
            .filter(|call| !matches!(call.capability, Capability::EnsureSession | Capability::Logout))
            .count()
    }

    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, capability: Capability, args: &[&str]) -> Result<(), SourceError> {
        let call = RecordedCall {
            capability,
            args: args.iter().map(|arg| (*arg).to_owned()).collect(),
        };
        match self.calls.lock() {
            Ok(mut calls) => calls.push(call),
            Err(poisoned) => poisoned.into_inner().push(call),
        }

        match self.data.failures.get(&capability) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn reply<'a, T>(&'a self, capability: Capability, args: &[&str], value: T) -> SourceFuture<'a, T>
    where
        T: Send + 'a,
    {
        let outcome = self.record(capability, args).map(|()| value);
        Box::pin(async move { outcome })
    }
}

impl BrokerageSource for MockSource {
    fn ensure_session<'a>(&'a self) -> SourceFuture<'a, ()> {
        self.reply(Capability::EnsureSession, &[], ())
    }

    fn logout<'a>(&'a self) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        let _ = self.record(Capability::Logout, &[]);
        Box::pin(async {})
    }

    fn list_expirations<'a>(&'a self, symbol: &'a str) -> SourceFuture<'a, Vec<String>> {
        self.reply(
            Capability::ListExpirations,
            &[symbol],
            self.data.expirations.clone(),
        )
    }

    fn list_tradable_instruments<'a>(
        &'a self,
        symbol: &'a str,
        expiration: &'a str,
        option_type: Option<OptionType>,
    ) -> SourceFuture<'a, Vec<Value>> {
        let type_arg = option_type.map_or("", OptionType::as_str);
        self.reply(
            Capability::ListTradableInstruments,
            &[symbol, expiration, type_arg],
            self.data.instruments.clone(),
        )
    }

    fn get_market_data<'a>(
        &'a self,
        symbol: &'a str,
        expiration: &'a str,
        strike: &'a str,
        option_type: OptionType,
    ) -> SourceFuture<'a, Vec<Value>> {
        self.reply(
            Capability::GetMarketData,
            &[symbol, expiration, strike, option_type.as_str()],
            self.data
                .market_data
                .get(&option_type)
                .cloned()
                .unwrap_or_default(),
        )
    }

    fn get_latest_price<'a>(&'a self, symbol: &'a str) -> SourceFuture<'a, Option<f64>> {
        self.reply(Capability::GetLatestPrice, &[symbol], self.data.latest_price)
    }

    fn open_option_positions<'a>(&'a self) -> SourceFuture<'a, Vec<Value>> {
        self.reply(
            Capability::OpenOptionPositions,
            &[],
            self.data.option_positions.clone(),
        )
    }

    fn option_instrument<'a>(&'a self, instrument_id: &'a str) -> SourceFuture<'a, Value> {
        let outcome = self
            .record(Capability::OptionInstrument, &[instrument_id])
            .and_then(|()| {
                self.data
                    .option_instruments
                    .get(instrument_id)
                    .cloned()
                    .ok_or_else(|| {
                        SourceError::not_found(format!("option instrument {instrument_id}"))
                    })
            });
        Box::pin(async move { outcome })
    }

    fn quotes<'a>(&'a self, symbols: &'a [String]) -> SourceFuture<'a, Vec<Value>> {
        let joined = symbols.join(",");
        self.reply(Capability::Quotes, &[joined.as_str()], self.data.quotes.clone())
    }

    fn historicals<'a>(
        &'a self,
        symbol: &'a str,
        interval: HistoryInterval,
        span: HistorySpan,
        bounds: HistoryBounds,
    ) -> SourceFuture<'a, Vec<Value>> {
        self.reply(
            Capability::Historicals,
            &[symbol, interval.as_str(), span.as_str(), bounds.as_str()],
            self.data.historicals.clone(),
        )
    }

    fn fundamentals<'a>(&'a self, symbol: &'a str) -> SourceFuture<'a, Vec<Value>> {
        self.reply(
            Capability::Fundamentals,
            &[symbol],
            self.data.fundamentals.clone(),
        )
    }

    fn news<'a>(&'a self, symbol: &'a str) -> SourceFuture<'a, Vec<Value>> {
        self.reply(Capability::News, &[symbol], self.data.news.clone())
    }

    fn portfolio_profile<'a>(&'a self) -> SourceFuture<'a, Value> {
        self.reply(Capability::PortfolioProfile, &[], self.data.portfolio.clone())
    }

    fn account_profile<'a>(&'a self) -> SourceFuture<'a, Value> {
        self.reply(Capability::AccountProfile, &[], self.data.account.clone())
    }

    fn open_stock_positions<'a>(&'a self) -> SourceFuture<'a, Vec<Value>> {
        self.reply(
            Capability::OpenStockPositions,
            &[],
            self.data.stock_positions.clone(),
        )
    }

    fn instrument_by_url<'a>(&'a self, url: &'a str) -> SourceFuture<'a, Value> {
        let outcome = self
            .record(Capability::InstrumentByUrl, &[url])
            .and_then(|()| {
                self.data
                    .instruments_by_url
                    .get(url)
                    .cloned()
                    .ok_or_else(|| SourceError::not_found(format!("instrument {url}")))
            });
        Box::pin(async move { outcome })
    }

    fn watchlists<'a>(&'a self) -> SourceFuture<'a, Vec<Value>> {
        self.reply(Capability::Watchlists, &[], self.data.watchlists.clone())
    }

    fn watchlist_items<'a>(&'a self, list_id: &'a str) -> SourceFuture<'a, Vec<Value>> {
        self.reply(
            Capability::WatchlistItems,
            &[list_id],
            self.data
                .watchlist_items
                .get(list_id)
                .cloned()
                .unwrap_or_default(),
        )
    }

    fn stock_orders<'a>(&'a self, start_date: Option<&'a str>) -> SourceFuture<'a, Vec<Value>> {
        self.reply(
            Capability::StockOrders,
            &[start_date.unwrap_or("")],
            self.data.stock_orders.clone(),
        )
    }

    fn option_orders<'a>(&'a self, start_date: Option<&'a str>) -> SourceFuture<'a, Vec<Value>> {
        self.reply(
            Capability::OptionOrders,
            &[start_date.unwrap_or("")],
            self.data.option_orders.clone(),
        )
    }

    fn crypto_orders<'a>(&'a self) -> SourceFuture<'a, Vec<Value>> {
        self.reply(Capability::CryptoOrders, &[], self.data.crypto_orders.clone())
    }
}
