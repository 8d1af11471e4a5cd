//! # Domain Models
//!
//! Normalized records returned to tool callers. None of these carry upstream
//! field names; every optional value serializes as an explicit `null`.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`OptionContract`] | One option contract with pricing and Greeks when available |
//! | [`OptionPosition`] | A held option position |
//! | [`Quote`] | Latest equity quote with change percent |
//! | [`Candle`] | Historical OHLCV candle |
//! | [`Fundamentals`] | Market cap, P/E, dividend yield, 52-week range |
//! | [`NewsItem`] | News headline for a symbol |
//! | [`PortfolioSummary`] | Equity, cash, buying power, day change |
//! | [`Position`] | Held stock position |
//! | [`Watchlist`] | Named list of symbols |
//! | [`OrderHistory`] | Stock, option and crypto orders |
//! | [`Symbol`] | Validated ticker |
//! | [`UtcDateTime`] | UTC timestamp |

mod account;
mod market;
mod options;
mod orders;
mod symbol;
mod timestamp;

pub use account::{PortfolioSummary, Position, Watchlist};
pub use market::{Candle, Fundamentals, HistoryBounds, HistoryInterval, HistorySpan, NewsItem, Quote};
pub use options::{OptionContract, OptionPosition, OptionType, PositionDirection};
pub use orders::{
    CryptoOrder, OptionOrder, OrderExecution, OrderHistory, OrderKind, StockOrder,
};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
