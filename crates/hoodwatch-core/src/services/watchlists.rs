use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::source::{BrokerageSource, SourceError};
use crate::{coerce, ServiceError, Watchlist};

const WATCHLISTS_CONTEXT: &str = "Failed to fetch watchlists";

pub struct WatchlistsService {
    source: Arc<dyn BrokerageSource>,
}

impl WatchlistsService {
    pub fn new(source: Arc<dyn BrokerageSource>) -> Self {
        Self { source }
    }

    /// Every watchlist with its member symbols.
    ///
    /// A watchlist whose items cannot be read is still listed, with no symbols.
    pub async fn get_watchlists(&self) -> Result<Vec<Watchlist>, ServiceError> {
        self.source.ensure_session().await?;

        let lists = self
            .source
            .watchlists()
            .await
            .map_err(|error| ServiceError::wrap_upstream(WATCHLISTS_CONTEXT, error))?;

        let mut watchlists = Vec::with_capacity(lists.len());
        for list in lists.iter().filter(|list| coerce::is_record(list)) {
            let id = coerce::text_or_empty(list, "id");
            let symbols = match self.member_symbols(&id).await {
                Ok(symbols) => symbols,
                Err(error) => {
                    debug!(watchlist = %id, %error, "watchlist items unavailable");
                    Vec::new()
                }
            };

            watchlists.push(Watchlist {
                name: coerce::text_or_empty(list, "display_name"),
                id,
                symbols,
            });
        }

        Ok(watchlists)
    }

    async fn member_symbols(&self, list_id: &str) -> Result<Vec<String>, SourceError> {
        if list_id.is_empty() {
            return Ok(Vec::new());
        }

        let items = self.source.watchlist_items(list_id).await?;
        let mut symbols = Vec::with_capacity(items.len());
        for item in items.iter().filter(|item| coerce::is_record(item)) {
            if let Some(symbol) = self.item_symbol(item).await? {
                symbols.push(symbol);
            }
        }
        Ok(symbols)
    }

    async fn item_symbol(&self, item: &Value) -> Result<Option<String>, SourceError> {
        if let Some(symbol) = coerce::text(item, "symbol") {
            return Ok(Some(symbol));
        }
        match coerce::text(item, "instrument") {
            Some(url) => {
                let instrument = self.source.instrument_by_url(&url).await?;
                Ok(coerce::text(&instrument, "symbol"))
            }
            None => Ok(None),
        }
    }
}
