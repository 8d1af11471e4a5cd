use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ValidationError;

/// Which order books an order-history request reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderKind {
    #[default]
    All,
    Stock,
    Option,
    Crypto,
}

impl OrderKind {
    pub const fn includes_stock(self) -> bool {
        matches!(self, Self::All | Self::Stock)
    }

    pub const fn includes_option(self) -> bool {
        matches!(self, Self::All | Self::Option)
    }

    pub const fn includes_crypto(self) -> bool {
        matches!(self, Self::All | Self::Crypto)
    }
}

impl FromStr for OrderKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "stock" => Ok(Self::Stock),
            "option" => Ok(Self::Option),
            "crypto" => Ok(Self::Crypto),
            other => Err(ValidationError::InvalidOrderKind {
                value: other.to_owned(),
            }),
        }
    }
}

/// A single fill within a stock order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderExecution {
    pub price: Option<f64>,
    pub quantity: Option<f64>,
    pub settlement_date: Option<String>,
    pub timestamp: Option<String>,
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockOrder {
    pub id: Option<String>,
    pub symbol: Option<String>,
    pub side: Option<String>,
    #[serde(rename = "type")]
    pub order_type: Option<String>,
    pub state: Option<String>,
    pub quantity: Option<f64>,
    pub cumulative_quantity: Option<f64>,
    pub price: Option<f64>,
    pub average_price: Option<f64>,
    pub stop_price: Option<f64>,
    pub executions: Vec<OrderExecution>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub last_transaction_at: Option<String>,
    pub time_in_force: Option<String>,
    pub extended_hours: Option<bool>,
}

/// Option order; `legs` is passed through as returned upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionOrder {
    pub id: Option<String>,
    pub chain_symbol: Option<String>,
    pub direction: Option<String>,
    #[serde(rename = "type")]
    pub order_type: Option<String>,
    pub state: Option<String>,
    pub quantity: Option<f64>,
    pub pending_quantity: Option<f64>,
    pub processed_quantity: Option<f64>,
    pub price: Option<f64>,
    pub premium: Option<f64>,
    pub processed_premium: Option<f64>,
    pub opening_strategy: Option<String>,
    pub closing_strategy: Option<String>,
    pub legs: Option<Vec<Value>>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub time_in_force: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoOrder {
    pub id: Option<String>,
    pub currency_pair_id: Option<String>,
    pub side: Option<String>,
    #[serde(rename = "type")]
    pub order_type: Option<String>,
    pub state: Option<String>,
    pub quantity: Option<f64>,
    pub cumulative_quantity: Option<f64>,
    pub price: Option<f64>,
    pub average_price: Option<f64>,
    pub executions: Option<Vec<Value>>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub time_in_force: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderHistory {
    pub stock_orders: Vec<StockOrder>,
    pub option_orders: Vec<OptionOrder>,
    pub crypto_orders: Vec<CryptoOrder>,
}
