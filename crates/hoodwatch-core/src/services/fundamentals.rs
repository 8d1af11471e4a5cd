use std::sync::Arc;

use super::options::required_symbol;
use crate::source::BrokerageSource;
use crate::{coerce, Fundamentals, ServiceError};

const FUNDAMENTALS_CONTEXT: &str = "Failed to fetch fundamentals";

pub struct FundamentalsService {
    source: Arc<dyn BrokerageSource>,
}

impl FundamentalsService {
    pub fn new(source: Arc<dyn BrokerageSource>) -> Self {
        Self { source }
    }

    /// Valuation fundamentals. An unknown symbol yields all-null fields.
    pub async fn get_fundamentals(&self, symbol: &str) -> Result<Fundamentals, ServiceError> {
        let symbol = required_symbol(symbol)?;

        self.source.ensure_session().await?;

        let records = self
            .source
            .fundamentals(symbol.as_str())
            .await
            .map_err(|error| ServiceError::wrap_upstream(FUNDAMENTALS_CONTEXT, error))?;

        let Some(record) = records.iter().find(|record| coerce::is_record(record)) else {
            return Ok(Fundamentals::default());
        };

        Ok(Fundamentals {
            market_cap: coerce::number(record, "market_cap"),
            pe_ratio: coerce::number(record, "pe_ratio"),
            dividend_yield: coerce::number(record, "dividend_yield"),
            week_52_high: coerce::number(record, "high_52_weeks"),
            week_52_low: coerce::number(record, "low_52_weeks"),
        })
    }
}
