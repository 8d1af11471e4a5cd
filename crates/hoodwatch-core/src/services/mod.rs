//! Read-only operations over a [`BrokerageSource`](crate::source::BrokerageSource).
//!
//! Every service follows the same order of work: validate arguments, ensure
//! the session, then call the upstream. Services hold nothing but the shared
//! source handle.

mod fundamentals;
mod market_data;
mod news;
mod options;
mod orders;
mod portfolio;
mod watchlists;

pub use fundamentals::FundamentalsService;
pub use market_data::{change_percent, MarketDataService};
pub use news::NewsService;
pub use options::{
    build_contract, filter_near_the_money, ChainQuery, OptionsService, NEAR_THE_MONEY_LOWER,
    NEAR_THE_MONEY_UPPER,
};
pub use orders::{OrderQuery, OrdersService};
pub use portfolio::PortfolioService;
pub use watchlists::WatchlistsService;
