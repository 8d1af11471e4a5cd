//! # Tool Dispatch
//!
//! Routes a tool call to its service and renders the outcome as a result
//! payload. Failures never escape as protocol faults: they become
//! `{"error": "<CODE>: <message>"}` payloads flagged with `is_error`.

use std::sync::Arc;
use std::time::Instant;

use hoodwatch_core::{
    BrokerageSource, ChainQuery, FundamentalsService, MarketDataService, NewsService, OptionType,
    OptionsService, OrderQuery, OrdersService, PortfolioService, ServiceError, SourceErrorKind,
    WatchlistsService,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::metadata::CallId;
use crate::schema::validate_against_schema;
use crate::tools::{registry, Tool, ToolDefinition};

/// Result payload of one tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    pub payload: Value,
    pub is_error: bool,
}

impl ToolOutcome {
    fn success(payload: Value) -> Self {
        Self {
            payload,
            is_error: false,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            payload: json!({ "error": message.into() }),
            is_error: true,
        }
    }

    /// The payload rendered as compact JSON text.
    pub fn text(&self) -> String {
        self.payload.to_string()
    }
}

#[derive(Debug, thiserror::Error)]
enum CallError {
    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("INTERNAL_ERROR: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Owns one instance of every service, all sharing a single upstream source.
pub struct ToolDispatcher {
    source: Arc<dyn BrokerageSource>,
    market: MarketDataService,
    options: OptionsService,
    portfolio: PortfolioService,
    watchlists: WatchlistsService,
    news: NewsService,
    fundamentals: FundamentalsService,
    orders: OrdersService,
}

impl ToolDispatcher {
    pub fn new(source: Arc<dyn BrokerageSource>) -> Self {
        Self {
            market: MarketDataService::new(Arc::clone(&source)),
            options: OptionsService::new(Arc::clone(&source)),
            portfolio: PortfolioService::new(Arc::clone(&source)),
            watchlists: WatchlistsService::new(Arc::clone(&source)),
            news: NewsService::new(Arc::clone(&source)),
            fundamentals: FundamentalsService::new(Arc::clone(&source)),
            orders: OrdersService::new(Arc::clone(&source)),
            source,
        }
    }

    pub fn tools(&self) -> Vec<ToolDefinition> {
        registry()
    }

    /// Runs `name` with `arguments`. A `null` argument value is treated as `{}`.
    pub async fn call(&self, name: &str, arguments: &Value) -> ToolOutcome {
        let call_id = CallId::new_v4();
        let Some(tool) = Tool::from_name(name) else {
            warn!(%call_id, tool = name, "unknown tool");
            return ToolOutcome::failure(format!("Unknown tool: {name}"));
        };

        let empty = Value::Object(Map::new());
        let arguments = if arguments.is_null() { &empty } else { arguments };

        debug!(%call_id, tool = name, "tool call");
        let started = Instant::now();
        let result = match validate_against_schema(arguments, &tool.input_schema()) {
            Ok(()) => self.run(tool, arguments).await,
            Err(violation) => Err(ServiceError::invalid_argument(violation.to_string()).into()),
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(payload) => {
                debug!(%call_id, tool = name, elapsed_ms, "tool call succeeded");
                ToolOutcome::success(payload)
            }
            Err(error) => {
                warn!(%call_id, tool = name, elapsed_ms, error = %error, "tool call failed");
                ToolOutcome::failure(error.to_string())
            }
        }
    }

    async fn run(&self, tool: Tool, arguments: &Value) -> Result<Value, CallError> {
        match tool {
            Tool::CurrentPrice | Tool::Quote => {
                let symbols = string_list(arguments, "symbols").unwrap_or_default();
                render(self.market.get_current_price(&symbols).await?)
            }
            Tool::PriceHistory => render(
                self.market
                    .get_price_history(
                        string_arg(arguments, "symbol").unwrap_or_default(),
                        string_arg(arguments, "interval"),
                        string_arg(arguments, "span"),
                        string_arg(arguments, "bounds"),
                    )
                    .await?,
            ),
            Tool::OptionsChain => {
                let query = chain_query(arguments)?;
                render(self.options.get_options_chain(&query).await?)
            }
            Tool::OptionPositions => render(self.options.get_option_positions().await?),
            Tool::PortfolioSummary => render(self.portfolio.get_portfolio_summary().await?),
            Tool::PortfolioPositions => {
                let symbols = string_list(arguments, "symbols");
                render(self.portfolio.get_positions(symbols.as_deref()).await?)
            }
            Tool::Watchlists => render(self.watchlists.get_watchlists().await?),
            Tool::News => render(
                self.news
                    .get_news(string_arg(arguments, "symbol").unwrap_or_default())
                    .await?,
            ),
            Tool::Fundamentals => render(
                self.fundamentals
                    .get_fundamentals(string_arg(arguments, "symbol").unwrap_or_default())
                    .await?,
            ),
            Tool::AuthStatus => self.auth_status().await,
            Tool::OrderHistory => {
                let query = OrderQuery {
                    kind: string_arg(arguments, "type").map(str::to_owned),
                    symbol: string_arg(arguments, "symbol").map(str::to_owned),
                    start_date: string_arg(arguments, "start_date").map(str::to_owned),
                };
                render(self.orders.get_order_history(&query).await?)
            }
        }
    }

    /// Only an auth failure is reported as `authenticated: false`; any other
    /// session failure is an error payload.
    async fn auth_status(&self) -> Result<Value, CallError> {
        match self.source.ensure_session().await {
            Ok(()) => Ok(json!({ "authenticated": true })),
            Err(error) if error.kind() == SourceErrorKind::AuthRequired => Ok(json!({
                "authenticated": false,
                "error": "Authentication required"
            })),
            Err(error) => Err(ServiceError::from(error).into()),
        }
    }
}

fn render<T: Serialize>(value: T) -> Result<Value, CallError> {
    Ok(serde_json::to_value(value)?)
}

fn string_arg<'a>(arguments: &'a Value, key: &str) -> Option<&'a str> {
    arguments.get(key).and_then(Value::as_str)
}

fn string_list(arguments: &Value, key: &str) -> Option<Vec<String>> {
    arguments.get(key).and_then(Value::as_array).map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect()
    })
}

fn chain_query(arguments: &Value) -> Result<ChainQuery, ServiceError> {
    let option_type = string_arg(arguments, "option_type")
        .filter(|value| !value.trim().is_empty())
        .map(str::parse::<OptionType>)
        .transpose()?;

    Ok(ChainQuery {
        symbol: string_arg(arguments, "symbol").unwrap_or_default().to_owned(),
        expiration: string_arg(arguments, "expiration_date").map(str::to_owned),
        option_type,
        strike_price: string_arg(arguments, "strike_price").map(str::to_owned),
    })
}
