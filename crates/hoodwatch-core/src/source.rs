//! Upstream capability contract.
//!
//! Services never talk HTTP directly. They consume a [`BrokerageSource`],
//! constructed once at startup and injected into each service, and receive
//! raw upstream records as [`serde_json::Value`]. Normalization into domain
//! records happens in the service layer.
//!
//! # Capabilities
//!
//! | Group | Methods |
//! |-------|---------|
//! | Session | [`ensure_session`](BrokerageSource::ensure_session), [`logout`](BrokerageSource::logout) |
//! | Options chain | [`list_expirations`](BrokerageSource::list_expirations), [`list_tradable_instruments`](BrokerageSource::list_tradable_instruments), [`get_market_data`](BrokerageSource::get_market_data), [`get_latest_price`](BrokerageSource::get_latest_price) |
//! | Option holdings | [`open_option_positions`](BrokerageSource::open_option_positions), [`option_instrument`](BrokerageSource::option_instrument) |
//! | Market data | [`quotes`](BrokerageSource::quotes), [`historicals`](BrokerageSource::historicals), [`fundamentals`](BrokerageSource::fundamentals), [`news`](BrokerageSource::news) |
//! | Account | [`portfolio_profile`](BrokerageSource::portfolio_profile), [`account_profile`](BrokerageSource::account_profile), [`open_stock_positions`](BrokerageSource::open_stock_positions), [`instrument_by_url`](BrokerageSource::instrument_by_url) |
//! | Watchlists | [`watchlists`](BrokerageSource::watchlists), [`watchlist_items`](BrokerageSource::watchlist_items) |
//! | Orders | [`stock_orders`](BrokerageSource::stock_orders), [`option_orders`](BrokerageSource::option_orders), [`crypto_orders`](BrokerageSource::crypto_orders) |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::{HistoryBounds, HistoryInterval, HistorySpan, OptionType};

/// Boxed future returned by every upstream call.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    AuthRequired,
    InvalidRequest,
    Unavailable,
    NotFound,
    Internal,
}

/// Structured upstream error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn auth_required(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::AuthRequired,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
        }
    }

    /// Transport failure: timeout, refused connection, bad status.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NotFound,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::AuthRequired => "source.auth_required",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Brokerage data capability consumed by the services.
///
/// Listing methods return an empty vector for "no data"; errors are reserved
/// for failures. Entries inside a listing may be `null` or empty objects and
/// callers are expected to skip them.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; a single instance is shared by
/// every service for the lifetime of the process.
pub trait BrokerageSource: Send + Sync {
    /// Ensures a valid session exists, authenticating if needed.
    ///
    /// # Errors
    ///
    /// [`SourceErrorKind::AuthRequired`] when credentials are missing or
    /// rejected, [`SourceErrorKind::Unavailable`] when the login call fails
    /// in transit.
    fn ensure_session<'a>(&'a self) -> SourceFuture<'a, ()>;

    /// Drops the session and any persisted token. Never fails.
    fn logout<'a>(&'a self) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

    /// Expiration dates of the underlying's option chain, in upstream order.
    fn list_expirations<'a>(&'a self, symbol: &'a str) -> SourceFuture<'a, Vec<String>>;

    /// Instrument-level records (strike, type, expiration, chain symbol) for
    /// every tradable contract at `expiration`. No pricing.
    fn list_tradable_instruments<'a>(
        &'a self,
        symbol: &'a str,
        expiration: &'a str,
        option_type: Option<OptionType>,
    ) -> SourceFuture<'a, Vec<Value>>;

    /// Pricing and Greeks for one (expiration, strike, type) point.
    fn get_market_data<'a>(
        &'a self,
        symbol: &'a str,
        expiration: &'a str,
        strike: &'a str,
        option_type: OptionType,
    ) -> SourceFuture<'a, Vec<Value>>;

    /// Latest trade price, `None` when the upstream has none.
    fn get_latest_price<'a>(&'a self, symbol: &'a str) -> SourceFuture<'a, Option<f64>>;

    fn open_option_positions<'a>(&'a self) -> SourceFuture<'a, Vec<Value>>;

    /// Option instrument record by id.
    fn option_instrument<'a>(&'a self, instrument_id: &'a str) -> SourceFuture<'a, Value>;

    fn quotes<'a>(&'a self, symbols: &'a [String]) -> SourceFuture<'a, Vec<Value>>;

    fn historicals<'a>(
        &'a self,
        symbol: &'a str,
        interval: HistoryInterval,
        span: HistorySpan,
        bounds: HistoryBounds,
    ) -> SourceFuture<'a, Vec<Value>>;

    fn fundamentals<'a>(&'a self, symbol: &'a str) -> SourceFuture<'a, Vec<Value>>;

    fn news<'a>(&'a self, symbol: &'a str) -> SourceFuture<'a, Vec<Value>>;

    fn portfolio_profile<'a>(&'a self) -> SourceFuture<'a, Value>;

    fn account_profile<'a>(&'a self) -> SourceFuture<'a, Value>;

    fn open_stock_positions<'a>(&'a self) -> SourceFuture<'a, Vec<Value>>;

    /// Equity instrument record behind an instrument URL.
    fn instrument_by_url<'a>(&'a self, url: &'a str) -> SourceFuture<'a, Value>;

    fn watchlists<'a>(&'a self) -> SourceFuture<'a, Vec<Value>>;

    fn watchlist_items<'a>(&'a self, list_id: &'a str) -> SourceFuture<'a, Vec<Value>>;

    fn stock_orders<'a>(&'a self, start_date: Option<&'a str>) -> SourceFuture<'a, Vec<Value>>;

    fn option_orders<'a>(&'a self, start_date: Option<&'a str>) -> SourceFuture<'a, Vec<Value>>;

    /// Crypto orders; the upstream has no date filter for these.
    fn crypto_orders<'a>(&'a self) -> SourceFuture<'a, Vec<Value>>;
}
