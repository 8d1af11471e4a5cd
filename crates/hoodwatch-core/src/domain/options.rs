use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Side of an option contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    pub const BOTH: [Self; 2] = [Self::Call, Self::Put];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Put => "put",
        }
    }

    /// Maps an upstream type value onto a side.
    ///
    /// Only the exact literal `"call"` is a call. Anything else, including a
    /// missing or garbled value, is reported as a put. Callers depend on this
    /// never being null, so the ambiguity is kept as-is.
    pub fn from_upstream(value: Option<&str>) -> Self {
        match value {
            Some("call") => Self::Call,
            _ => Self::Put,
        }
    }
}

impl Display for OptionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "call" => Ok(Self::Call),
            "put" => Ok(Self::Put),
            other => Err(ValidationError::InvalidOptionType {
                value: other.to_owned(),
            }),
        }
    }
}

/// Whether a held option position is long or short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionDirection {
    Long,
    Short,
}

impl PositionDirection {
    pub fn from_upstream(value: &str) -> Option<Self> {
        match value {
            "long" => Some(Self::Long),
            "short" => Some(Self::Short),
            _ => None,
        }
    }
}

/// One option contract's state at query time.
///
/// Built fresh for every retrieval; never cached or mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    pub symbol: String,
    pub expiration: String,
    pub strike: Option<f64>,
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub mark_price: Option<f64>,
    pub last_trade_price: Option<f64>,
    pub open_interest: Option<i64>,
    pub volume: Option<i64>,
    pub implied_volatility: Option<f64>,
    pub delta: Option<f64>,
    pub gamma: Option<f64>,
    pub theta: Option<f64>,
    pub vega: Option<f64>,
    pub rho: Option<f64>,
    pub chance_of_profit_short: Option<f64>,
    pub chance_of_profit_long: Option<f64>,
}

/// An option position currently held in the account.
///
/// Contract identity (strike, expiration, type) comes from a separate
/// instrument lookup and is null when that lookup fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionPosition {
    pub symbol: Option<String>,
    pub expiration_date: Option<String>,
    pub strike_price: Option<f64>,
    pub option_type: Option<OptionType>,
    pub direction: Option<PositionDirection>,
    pub quantity: Option<f64>,
    pub average_price: Option<f64>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_exact_call_literal_maps_to_call() {
        assert_eq!(OptionType::from_upstream(Some("call")), OptionType::Call);
        assert_eq!(OptionType::from_upstream(Some("CALL")), OptionType::Put);
        assert_eq!(OptionType::from_upstream(Some("straddle")), OptionType::Put);
        assert_eq!(OptionType::from_upstream(None), OptionType::Put);
    }

    #[test]
    fn caller_supplied_type_is_parsed_strictly() {
        assert_eq!(" Call ".parse::<OptionType>(), Ok(OptionType::Call));
        let err = "both".parse::<OptionType>().expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidOptionType { .. }));
    }

    #[test]
    fn contract_serializes_type_field_name() {
        let contract = OptionContract {
            symbol: String::from("AAPL"),
            expiration: String::from("2026-03-20"),
            strike: Some(150.0),
            option_type: OptionType::Call,
            bid: None,
            ask: None,
            mark_price: None,
            last_trade_price: None,
            open_interest: None,
            volume: None,
            implied_volatility: None,
            delta: None,
            gamma: None,
            theta: None,
            vega: None,
            rho: None,
            chance_of_profit_short: None,
            chance_of_profit_long: None,
        };

        let json = serde_json::to_value(&contract).expect("serializes");
        assert_eq!(json["type"], "call");
        assert!(json["bid"].is_null());
    }
}
