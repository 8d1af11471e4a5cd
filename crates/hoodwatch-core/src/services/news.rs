use std::sync::Arc;

use serde_json::Value;

use crate::source::BrokerageSource;
use crate::{coerce, NewsItem, ServiceError, Symbol};

const NEWS_CONTEXT: &str = "Failed to fetch news";

pub struct NewsService {
    source: Arc<dyn BrokerageSource>,
}

impl NewsService {
    pub fn new(source: Arc<dyn BrokerageSource>) -> Self {
        Self { source }
    }

    pub async fn get_news(&self, symbol: &str) -> Result<Vec<NewsItem>, ServiceError> {
        if symbol.trim().is_empty() {
            return Err(ServiceError::invalid_argument(
                "A stock symbol is required to fetch news.",
            ));
        }
        let symbol = Symbol::parse(symbol)?;

        self.source.ensure_session().await?;

        let articles = self
            .source
            .news(symbol.as_str())
            .await
            .map_err(|error| ServiceError::wrap_upstream(NEWS_CONTEXT, error))?;

        Ok(articles
            .iter()
            .filter(|article| coerce::is_record(article))
            .map(build_news_item)
            .collect())
    }
}

fn build_news_item(item: &Value) -> NewsItem {
    NewsItem {
        id: coerce::text_or_empty(item, "uuid"),
        headline: coerce::text_or_empty(item, "title"),
        summary: coerce::text_or_empty(item, "summary"),
        source: coerce::text_or_empty(item, "source"),
        url: coerce::text_or_empty(item, "url"),
        published_at: coerce::timestamp(item, "published_at"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_article_fields_become_empty_strings() {
        let item = build_news_item(&json!({
            "uuid": "a1",
            "title": "Earnings beat",
            "published_at": "2026-03-02T09:00:00-05:00"
        }));

        assert_eq!(item.id, "a1");
        assert_eq!(item.summary, "");
        assert_eq!(item.published_at.as_deref(), Some("2026-03-02T14:00:00Z"));
    }
}
