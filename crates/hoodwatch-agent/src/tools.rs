//! # Tool Registry
//!
//! The fixed set of read-only tools exposed to agents, each with a
//! description and a JSON input schema.
//!
//! | Tool | Service operation |
//! |------|-------------------|
//! | `robinhood.market.current_price` | quotes for one or more symbols |
//! | `robinhood.market.price_history` | historical candles |
//! | `robinhood.market.quote` | quotes with change data |
//! | `robinhood.options.chain` | chain listing or targeted lookup |
//! | `robinhood.options.positions` | held option positions |
//! | `robinhood.portfolio.summary` | equity, cash and day change |
//! | `robinhood.portfolio.positions` | held stock positions |
//! | `robinhood.watchlists.list` | watchlists with symbols |
//! | `robinhood.news.latest` | news for a symbol |
//! | `robinhood.fundamentals.get` | valuation fundamentals |
//! | `robinhood.auth.status` | session check |
//! | `robinhood.orders.history` | stock, option and crypto orders |

use serde::Serialize;
use serde_json::{json, Value};

const OPTIONS_CHAIN_DESCRIPTION: &str = "Get options chain for a symbol. This tool has TWO data tiers depending on whether strike_price is provided:\n\n\
TIER 1 - Chain listing (strike_price OMITTED): Returns option contracts near the money (within 20% of the current price) \
with basic instrument data: strike, type (call/put), expiration. Does NOT include bid/ask, Greeks, or market data. \
This is fast; use it to browse available strikes.\n\n\
TIER 2 - Targeted lookup (strike_price PROVIDED): Returns 1-2 contracts with FULL market data including: \
bid/ask, mark price, last trade price, open interest, volume, implied volatility, all Greeks \
(delta, gamma, theta, vega, rho), and chance of profit (long/short). This is the ONLY way to get Greeks.\n\n\
RECOMMENDED WORKFLOW:\n\
  Step 1: Call with just symbol (and optionally expiration_date + option_type) to see available strikes.\n\
  Step 2: Pick a strike from the results.\n\
  Step 3: Call again with symbol + expiration_date + strike_price (+ option_type) to get full Greeks and market data.\n\n\
NOTE: expiration_date defaults to the nearest available expiration if omitted.";

const OPTION_POSITIONS_DESCRIPTION: &str = "Get all open option positions for the authenticated account. \
Returns each position with: underlying symbol, strike price, expiration date, option type (call/put), \
direction (long/short), quantity, and average cost basis. Does NOT include current Greeks or market data; \
use robinhood.options.chain with the position's strike_price to get live Greeks and pricing.";

/// A tool exposed to agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    CurrentPrice,
    PriceHistory,
    Quote,
    OptionsChain,
    OptionPositions,
    PortfolioSummary,
    PortfolioPositions,
    Watchlists,
    News,
    Fundamentals,
    AuthStatus,
    OrderHistory,
}

impl Tool {
    pub const ALL: [Self; 12] = [
        Self::CurrentPrice,
        Self::PriceHistory,
        Self::Quote,
        Self::OptionsChain,
        Self::OptionPositions,
        Self::PortfolioSummary,
        Self::PortfolioPositions,
        Self::Watchlists,
        Self::News,
        Self::Fundamentals,
        Self::AuthStatus,
        Self::OrderHistory,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::CurrentPrice => "robinhood.market.current_price",
            Self::PriceHistory => "robinhood.market.price_history",
            Self::Quote => "robinhood.market.quote",
            Self::OptionsChain => "robinhood.options.chain",
            Self::OptionPositions => "robinhood.options.positions",
            Self::PortfolioSummary => "robinhood.portfolio.summary",
            Self::PortfolioPositions => "robinhood.portfolio.positions",
            Self::Watchlists => "robinhood.watchlists.list",
            Self::News => "robinhood.news.latest",
            Self::Fundamentals => "robinhood.fundamentals.get",
            Self::AuthStatus => "robinhood.auth.status",
            Self::OrderHistory => "robinhood.orders.history",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::CurrentPrice => "Get current price quotes for one or more symbols",
            Self::PriceHistory => "Get historical price data for a symbol",
            Self::Quote => {
                "Get detailed stock quote for one or more symbols. Returns current price, previous close, \
                 and change percent. Use this instead of current_price when you need change data."
            }
            Self::OptionsChain => OPTIONS_CHAIN_DESCRIPTION,
            Self::OptionPositions => OPTION_POSITIONS_DESCRIPTION,
            Self::PortfolioSummary => "Get portfolio summary",
            Self::PortfolioPositions => "Get portfolio positions",
            Self::Watchlists => "Get watchlists",
            Self::News => "Get latest news for a stock symbol",
            Self::Fundamentals => {
                "Get company fundamentals (market cap, P/E, dividend yield, 52-week range)"
            }
            Self::AuthStatus => "Check authentication status",
            Self::OrderHistory => {
                "Get order history for stocks, options, and/or crypto. Returns past trades with \
                 execution details, prices, quantities, and timestamps."
            }
        }
    }

    /// JSON schema for the tool's `arguments` object.
    pub fn input_schema(self) -> Value {
        match self {
            Self::CurrentPrice | Self::Quote => json!({
                "type": "object",
                "properties": {
                    "symbols": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Stock ticker symbols"
                    }
                },
                "required": ["symbols"]
            }),
            Self::PriceHistory => json!({
                "type": "object",
                "properties": {
                    "symbol": { "type": "string", "description": "Stock ticker symbol" },
                    "interval": {
                        "type": "string",
                        "description": "Data interval: 5minute, 10minute, hour, day, week",
                        "default": "hour"
                    },
                    "span": {
                        "type": "string",
                        "description": "Time span: day, week, month, 3month, year, 5year",
                        "default": "week"
                    },
                    "bounds": {
                        "type": "string",
                        "description": "Price bounds: extended, trading, regular",
                        "default": "regular"
                    }
                },
                "required": ["symbol"]
            }),
            Self::OptionsChain => json!({
                "type": "object",
                "properties": {
                    "symbol": {
                        "type": "string",
                        "description": "Stock ticker symbol (e.g., 'AAPL', 'TSLA')"
                    },
                    "expiration_date": {
                        "type": "string",
                        "description": "Expiration date in YYYY-MM-DD format. Defaults to the nearest available expiration."
                    },
                    "option_type": {
                        "type": "string",
                        "description": "Filter by option type: 'call' or 'put'. If omitted, returns both."
                    },
                    "strike_price": {
                        "type": "string",
                        "description": "Specific strike price (e.g., '150.00'). Switches to targeted lookup with full market data and Greeks."
                    }
                },
                "required": ["symbol"]
            }),
            Self::PortfolioPositions => json!({
                "type": "object",
                "properties": {
                    "symbols": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Optional filter by symbols"
                    }
                }
            }),
            Self::News | Self::Fundamentals => json!({
                "type": "object",
                "properties": {
                    "symbol": { "type": "string", "description": "Stock ticker symbol" }
                },
                "required": ["symbol"]
            }),
            Self::OrderHistory => json!({
                "type": "object",
                "properties": {
                    "type": {
                        "type": "string",
                        "description": "Order type to retrieve: stock, option, crypto, or all (default: all)",
                        "default": "all"
                    },
                    "symbol": {
                        "type": "string",
                        "description": "Filter by stock ticker symbol (applies to stock and option orders only)"
                    },
                    "start_date": {
                        "type": "string",
                        "description": "Start date filter in YYYY-MM-DD format. Returns orders from this date to now."
                    }
                }
            }),
            Self::OptionPositions
            | Self::PortfolioSummary
            | Self::Watchlists
            | Self::AuthStatus => json!({ "type": "object", "properties": {} }),
        }
    }

    pub fn definition(self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: self.description(),
            input_schema: self.input_schema(),
        }
    }
}

/// Wire form of a tool, as listed to agents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Every tool definition, in registry order.
pub fn registry() -> Vec<ToolDefinition> {
    Tool::ALL.into_iter().map(Tool::definition).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn names_are_unique_and_resolvable() {
        let names: HashSet<&str> = Tool::ALL.iter().map(|tool| tool.name()).collect();
        assert_eq!(names.len(), Tool::ALL.len());

        for tool in Tool::ALL {
            assert_eq!(Tool::from_name(tool.name()), Some(tool));
        }
        assert_eq!(Tool::from_name("robinhood.trade.buy"), None);
    }

    #[test]
    fn every_schema_is_an_object_schema() {
        for definition in registry() {
            assert_eq!(definition.input_schema["type"], "object", "{}", definition.name);
        }
    }

    #[test]
    fn definition_serializes_with_camel_case_schema_key() {
        let rendered = serde_json::to_value(Tool::News.definition()).expect("serializable");
        assert_eq!(rendered["name"], "robinhood.news.latest");
        assert_eq!(rendered["inputSchema"]["required"][0], "symbol");
    }
}
