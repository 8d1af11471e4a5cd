use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::source::{BrokerageSource, SourceError};
use crate::{
    coerce, CryptoOrder, OptionOrder, OrderExecution, OrderHistory, OrderKind, ServiceError,
    StockOrder,
};

const ORDERS_CONTEXT: &str = "Failed to fetch order history";

/// Filters applied to an order-history request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderQuery {
    pub kind: Option<String>,
    pub symbol: Option<String>,
    pub start_date: Option<String>,
}

pub struct OrdersService {
    source: Arc<dyn BrokerageSource>,
}

impl OrdersService {
    pub fn new(source: Arc<dyn BrokerageSource>) -> Self {
        Self { source }
    }

    /// Stock, option and crypto order history.
    ///
    /// The symbol filter applies to stock and option orders only, and orders
    /// whose symbol is unknown are never filtered out. Crypto orders ignore
    /// both `symbol` and `start_date`.
    pub async fn get_order_history(&self, query: &OrderQuery) -> Result<OrderHistory, ServiceError> {
        self.source.ensure_session().await?;

        let kind = match query.kind.as_deref() {
            Some(kind) if !kind.trim().is_empty() => kind.parse::<OrderKind>()?,
            _ => OrderKind::All,
        };
        let symbol = non_empty(query.symbol.as_deref());
        let start_date = non_empty(query.start_date.as_deref());

        self.collect(kind, symbol, start_date)
            .await
            .map_err(|error| ServiceError::wrap_upstream(ORDERS_CONTEXT, error))
    }

    async fn collect(
        &self,
        kind: OrderKind,
        symbol: Option<&str>,
        start_date: Option<&str>,
    ) -> Result<OrderHistory, SourceError> {
        let mut history = OrderHistory::default();

        if kind.includes_stock() {
            history.stock_orders = self.stock_orders(symbol, start_date).await?;
        }
        if kind.includes_option() {
            history.option_orders = self
                .source
                .option_orders(start_date)
                .await?
                .iter()
                .filter(|order| coerce::is_record(order))
                .map(build_option_order)
                .filter(|order| symbol_matches(order.chain_symbol.as_deref(), symbol))
                .collect();
        }
        if kind.includes_crypto() {
            history.crypto_orders = self
                .source
                .crypto_orders()
                .await?
                .iter()
                .filter(|order| coerce::is_record(order))
                .map(build_crypto_order)
                .collect();
        }

        debug!(
            ?kind,
            stock = history.stock_orders.len(),
            option = history.option_orders.len(),
            crypto = history.crypto_orders.len(),
            "order history collected"
        );
        Ok(history)
    }

    async fn stock_orders(
        &self,
        symbol: Option<&str>,
        start_date: Option<&str>,
    ) -> Result<Vec<StockOrder>, SourceError> {
        let raw = self.source.stock_orders(start_date).await?;

        let mut orders = Vec::with_capacity(raw.len());
        for item in raw.iter().filter(|item| coerce::is_record(item)) {
            let order_symbol = self.resolve_stock_symbol(item).await;
            if !symbol_matches(order_symbol.as_deref(), symbol) {
                continue;
            }
            orders.push(build_stock_order(item, order_symbol));
        }
        Ok(orders)
    }

    async fn resolve_stock_symbol(&self, item: &Value) -> Option<String> {
        let url = coerce::text(item, "instrument")?;
        match self.source.instrument_by_url(&url).await {
            Ok(instrument) => coerce::text(&instrument, "symbol"),
            Err(error) => {
                debug!(%url, %error, "failed to resolve order instrument");
                None
            }
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn symbol_matches(order_symbol: Option<&str>, wanted: Option<&str>) -> bool {
    match (order_symbol, wanted) {
        (Some(order_symbol), Some(wanted)) => order_symbol.eq_ignore_ascii_case(wanted),
        _ => true,
    }
}

fn build_execution(item: &Value) -> OrderExecution {
    OrderExecution {
        price: coerce::number(item, "price"),
        quantity: coerce::number(item, "quantity"),
        settlement_date: coerce::text(item, "settlement_date"),
        timestamp: coerce::timestamp(item, "timestamp"),
        id: coerce::text(item, "id"),
    }
}

fn build_stock_order(item: &Value, symbol: Option<String>) -> StockOrder {
    let executions = item
        .get("executions")
        .and_then(Value::as_array)
        .map(|executions| {
            executions
                .iter()
                .filter(|execution| coerce::is_record(execution))
                .map(build_execution)
                .collect()
        })
        .unwrap_or_default();

    StockOrder {
        id: coerce::text(item, "id"),
        symbol,
        side: coerce::text(item, "side"),
        order_type: coerce::text(item, "type"),
        state: coerce::text(item, "state"),
        quantity: coerce::number(item, "quantity"),
        cumulative_quantity: coerce::number(item, "cumulative_quantity"),
        price: coerce::number(item, "price"),
        average_price: coerce::number(item, "average_price"),
        stop_price: coerce::number(item, "stop_price"),
        executions,
        created_at: coerce::timestamp(item, "created_at"),
        updated_at: coerce::timestamp(item, "updated_at"),
        last_transaction_at: coerce::timestamp(item, "last_transaction_at"),
        time_in_force: coerce::text(item, "time_in_force"),
        extended_hours: coerce::boolean(item, "extended_hours"),
    }
}

fn array_field(item: &Value, key: &str) -> Option<Vec<Value>> {
    item.get(key).and_then(Value::as_array).cloned()
}

fn build_option_order(item: &Value) -> OptionOrder {
    OptionOrder {
        id: coerce::text(item, "id"),
        chain_symbol: coerce::text(item, "chain_symbol"),
        direction: coerce::text(item, "direction"),
        order_type: coerce::text(item, "type"),
        state: coerce::text(item, "state"),
        quantity: coerce::number(item, "quantity"),
        pending_quantity: coerce::number(item, "pending_quantity"),
        processed_quantity: coerce::number(item, "processed_quantity"),
        price: coerce::number(item, "price"),
        premium: coerce::number(item, "premium"),
        processed_premium: coerce::number(item, "processed_premium"),
        opening_strategy: coerce::text(item, "opening_strategy"),
        closing_strategy: coerce::text(item, "closing_strategy"),
        legs: array_field(item, "legs"),
        created_at: coerce::timestamp(item, "created_at"),
        updated_at: coerce::timestamp(item, "updated_at"),
        time_in_force: coerce::text(item, "time_in_force"),
    }
}

fn build_crypto_order(item: &Value) -> CryptoOrder {
    CryptoOrder {
        id: coerce::text(item, "id"),
        currency_pair_id: coerce::text(item, "currency_pair_id"),
        side: coerce::text(item, "side"),
        order_type: coerce::text(item, "type"),
        state: coerce::text(item, "state"),
        quantity: coerce::number(item, "quantity"),
        cumulative_quantity: coerce::number(item, "cumulative_quantity"),
        price: coerce::number(item, "price"),
        average_price: coerce::number(item, "average_price"),
        executions: array_field(item, "executions"),
        created_at: coerce::timestamp(item, "created_at"),
        updated_at: coerce::timestamp(item, "updated_at"),
        time_in_force: coerce::text(item, "time_in_force"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn symbol_filter_is_case_insensitive_and_keeps_unknown_symbols() {
        assert!(symbol_matches(Some("aapl"), Some("AAPL")));
        assert!(!symbol_matches(Some("MSFT"), Some("AAPL")));
        assert!(symbol_matches(None, Some("AAPL")));
        assert!(symbol_matches(Some("MSFT"), None));
    }

    #[test]
    fn stock_order_skips_malformed_executions() {
        let order = build_stock_order(
            &json!({
                "id": "o-1",
                "side": "buy",
                "type": "market",
                "quantity": "5.00000",
                "extended_hours": false,
                "executions": [
                    { "price": "101.25", "quantity": "5.00000", "id": "e-1" },
                    null,
                    {}
                ]
            }),
            Some(String::from("AAPL")),
        );

        assert_eq!(order.quantity, Some(5.0));
        assert_eq!(order.extended_hours, Some(false));
        assert_eq!(order.executions.len(), 1);
        assert_eq!(order.executions[0].price, Some(101.25));
    }

    #[test]
    fn option_order_passes_legs_through() {
        let order = build_option_order(&json!({
            "chain_symbol": "SPY",
            "legs": [{ "side": "buy", "position_effect": "open" }]
        }));
        assert_eq!(order.legs.as_ref().map(Vec::len), Some(1));
        assert_eq!(order.premium, None);
    }
}
