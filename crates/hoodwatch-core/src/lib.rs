//! # Hoodwatch Core
//!
//! Read-only access to a Robinhood brokerage account for tool-calling agents.
//!
//! ## Overview
//!
//! - **Normalized records** for option contracts, positions, quotes, candles,
//!   fundamentals, news, watchlists and orders
//! - **Lenient coercion** of string-encoded upstream numbers
//! - **Upstream capability trait** ([`BrokerageSource`]) with a REST adapter and a
//!   scripted in-memory mock
//! - **Session handling** with token persistence
//! - **Services** that validate, authenticate and normalize
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Robinhood REST adapter |
//! | [`coerce`] | Lenient field readers for raw records |
//! | [`config`] | Session configuration from environment and arguments |
//! | [`domain`] | Normalized records and validated inputs |
//! | [`error`] | Validation and service error taxonomy |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`mock`] | Scripted [`BrokerageSource`] for tests |
//! | [`services`] | Options chain and pass-through services |
//! | [`session`] | Login, token cache and persistence |
//! | [`source`] | Upstream capability trait and its error type |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use hoodwatch_core::{ChainQuery, OptionsService, RobinhoodAdapter, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = RobinhoodAdapter::new(SessionConfig::from_env());
//!     let options = OptionsService::new(Arc::new(adapter));
//!
//!     let query = ChainQuery::new("AAPL").with_strike_price("150");
//!     for contract in options.get_options_chain(&query).await? {
//!         println!("{} {:?} mark={:?}", contract.expiration, contract.option_type, contract.mark_price);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every service returns [`ServiceError`], whose [`code`](ServiceError::code)
//! is the wire prefix reported to agents:
//!
//! ```rust
//! use hoodwatch_core::{ServiceError, ServiceErrorKind};
//!
//! fn describe(error: &ServiceError) -> &'static str {
//!     match error.kind() {
//!         ServiceErrorKind::AuthRequired => "log in again",
//!         ServiceErrorKind::InvalidArgument => "fix the request",
//!         ServiceErrorKind::Upstream | ServiceErrorKind::Network => "try later",
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - Credentials come from the environment or explicit arguments and are never logged
//! - The bearer token is only sent to the configured API host

pub mod adapters;
pub mod coerce;
pub mod config;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod mock;
pub mod services;
pub mod session;
pub mod source;

pub use adapters::RobinhoodAdapter;

pub use config::{SessionConfig, DEFAULT_API_BASE_URL, DEFAULT_TIMEOUT_MS};

pub use domain::{
    Candle, CryptoOrder, Fundamentals, HistoryBounds, HistoryInterval, HistorySpan, NewsItem,
    OptionContract, OptionOrder, OptionPosition, OptionType, OrderExecution, OrderHistory,
    OrderKind, PortfolioSummary, Position, PositionDirection, Quote, StockOrder, Symbol,
    UtcDateTime, Watchlist,
};

pub use error::{CoreError, ServiceError, ServiceErrorKind, ValidationError};

pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
};

pub use mock::{Capability, MockSource, MockSourceBuilder};

pub use services::{
    ChainQuery, FundamentalsService, MarketDataService, NewsService, OptionsService, OrderQuery,
    OrdersService, PortfolioService, WatchlistsService,
};

pub use session::{AuthToken, Session};

pub use source::{BrokerageSource, SourceError, SourceErrorKind, SourceFuture};
