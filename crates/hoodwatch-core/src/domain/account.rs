use serde::{Deserialize, Serialize};

/// Account-level equity snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub equity: Option<f64>,
    pub cash: Option<f64>,
    pub buying_power: Option<f64>,
    pub day_change: Option<f64>,
    pub unrealized_pl: Option<f64>,
}

/// A held stock position valued at the latest trade price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub quantity: Option<f64>,
    pub average_cost: Option<f64>,
    pub market_value: Option<f64>,
    pub unrealized_pl: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watchlist {
    pub id: String,
    pub name: String,
    pub symbols: Vec<String>,
}
