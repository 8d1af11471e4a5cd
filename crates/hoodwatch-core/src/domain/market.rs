use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Latest quote for an equity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub last_price: Option<f64>,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub timestamp: Option<String>,
    pub previous_close: Option<f64>,
    pub change_percent: Option<f64>,
}

/// One OHLCV candle from the historicals endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: Option<String>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub week_52_high: Option<f64>,
    pub week_52_low: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: String,
    pub headline: String,
    pub summary: String,
    pub source: String,
    pub url: String,
    pub published_at: Option<String>,
}

/// Candle width accepted by the historicals endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HistoryInterval {
    FiveMinute,
    TenMinute,
    #[default]
    Hour,
    Day,
    Week,
}

impl HistoryInterval {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FiveMinute => "5minute",
            Self::TenMinute => "10minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
        }
    }
}

impl FromStr for HistoryInterval {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "5minute" => Ok(Self::FiveMinute),
            "10minute" => Ok(Self::TenMinute),
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            other => Err(ValidationError::InvalidInterval {
                value: other.to_owned(),
            }),
        }
    }
}

/// Look-back window for the historicals endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HistorySpan {
    Day,
    #[default]
    Week,
    Month,
    ThreeMonth,
    Year,
    FiveYear,
}

impl HistorySpan {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::ThreeMonth => "3month",
            Self::Year => "year",
            Self::FiveYear => "5year",
        }
    }
}

impl FromStr for HistorySpan {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "3month" => Ok(Self::ThreeMonth),
            "year" => Ok(Self::Year),
            "5year" => Ok(Self::FiveYear),
            other => Err(ValidationError::InvalidSpan {
                value: other.to_owned(),
            }),
        }
    }
}

/// Trading session bounds for the historicals endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HistoryBounds {
    Extended,
    Trading,
    #[default]
    Regular,
}

impl HistoryBounds {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Extended => "extended",
            Self::Trading => "trading",
            Self::Regular => "regular",
        }
    }
}

impl FromStr for HistoryBounds {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "extended" => Ok(Self::Extended),
            "trading" => Ok(Self::Trading),
            "regular" => Ok(Self::Regular),
            other => Err(ValidationError::InvalidBounds {
                value: other.to_owned(),
            }),
        }
    }
}

impl Display for HistoryInterval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for HistorySpan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for HistoryBounds {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_parameters_default_to_hour_week_regular() {
        assert_eq!(HistoryInterval::default().as_str(), "hour");
        assert_eq!(HistorySpan::default().as_str(), "week");
        assert_eq!(HistoryBounds::default().as_str(), "regular");
    }

    #[test]
    fn rejects_unknown_interval_with_allowed_values() {
        let err = "1minute".parse::<HistoryInterval>().expect_err("must fail");
        assert!(err.to_string().contains("5minute, 10minute, hour, day, week"));
    }

    #[test]
    fn parses_numeric_prefixed_span() {
        assert_eq!("3month".parse::<HistorySpan>(), Ok(HistorySpan::ThreeMonth));
    }
}
