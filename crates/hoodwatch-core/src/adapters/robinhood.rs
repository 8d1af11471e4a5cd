use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use reqwest::Url;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::session::Session;
use crate::source::{BrokerageSource, SourceError, SourceFuture};
use crate::{coerce, HistoryBounds, HistoryInterval, HistorySpan, OptionType};

const DEFAULT_CRYPTO_BASE_URL: &str = "https://nummus.robinhood.com";
const MAX_PAGES: usize = 100;

/// Instrument fields merged into market-data records, which do not echo them.
const INSTRUMENT_FIELDS: [&str; 4] = ["chain_symbol", "expiration_date", "strike_price", "type"];

/// Robinhood REST adapter.
///
/// Every call goes through the shared [`Session`] for its bearer token. A 401
/// or 403 drops the cached token so the next call logs in again.
#[derive(Clone)]
pub struct RobinhoodAdapter {
    http_client: Arc<dyn HttpClient>,
    session: Arc<Session>,
    crypto_base_url: String,
}

impl RobinhoodAdapter {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_http_client(config, Arc::new(ReqwestHttpClient::new()))
    }

    pub fn with_http_client(config: SessionConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            session: Arc::new(Session::new(config, Arc::clone(&http_client))),
            http_client,
            crypto_base_url: String::from(DEFAULT_CRYPTO_BASE_URL),
        }
    }

    pub fn with_crypto_base_url(mut self, url: impl Into<String>) -> Self {
        self.crypto_base_url = url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Whether `url` shares scheme, host and port with the api or crypto
    /// base URL. The bearer token is only ever sent to those origins.
    fn is_trusted_url(&self, url: &str) -> bool {
        let Ok(target) = Url::parse(url) else {
            return false;
        };
        [self.session.config().base_url(), self.crypto_base_url.as_str()]
            .into_iter()
            .filter_map(|base| Url::parse(base).ok())
            .any(|base| base.origin() == target.origin())
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.session.config().base_url(), path)
    }

    async fn get_json(&self, request: HttpRequest) -> Result<Value, SourceError> {
        let token = self.session.ensure().await?;
        let url = request.url.clone();
        let request = request
            .with_auth(&token.auth())
            .with_timeout_ms(self.session.config().timeout_ms);

        debug!(url = %url, "robinhood request");
        let response = self.http_client.execute(request).await.map_err(|error| {
            warn!(url = %url, error = %error, "robinhood transport error");
            SourceError::unavailable(format!("robinhood transport error: {}", error.message()))
        })?;

        if response.is_auth_failure() {
            self.session.reject(&token).await;
            return Err(SourceError::auth_required(format!(
                "Robinhood rejected the session (status {}). Please re-authenticate.",
                response.status
            )));
        }
        if response.status == 404 {
            return Err(SourceError::not_found(format!("robinhood resource not found: {url}")));
        }
        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "robinhood upstream returned status {}",
                response.status
            )));
        }

        serde_json::from_str(&response.body).map_err(|error| {
            SourceError::internal(format!("failed to parse robinhood response: {error}"))
        })
    }

    /// Follows `next` links and concatenates every page's `results`.
    async fn get_paginated(&self, request: HttpRequest) -> Result<Vec<Value>, SourceError> {
        let mut records = Vec::new();
        let mut page = self.get_json(request).await?;
        let mut fetched = 1;

        loop {
            if let Some(results) = page.get_mut("results").and_then(Value::as_array_mut) {
                records.append(results);
            }

            let Some(next) = page.get("next").and_then(Value::as_str).map(str::to_owned) else {
                return Ok(records);
            };
            if fetched >= MAX_PAGES {
                warn!(pages = MAX_PAGES, "pagination limit reached; returning partial listing");
                return Ok(records);
            }
            if !self.is_trusted_url(&next) {
                return Err(SourceError::invalid_request(format!(
                    "pagination link is outside the configured api host: {next}"
                )));
            }
            page = self.get_json(HttpRequest::get(next)).await?;
            fetched += 1;
        }
    }

    async fn results(&self, request: HttpRequest) -> Result<Vec<Value>, SourceError> {
        let mut payload = self.get_json(request).await?;
        Ok(match payload.get_mut("results").map(Value::take) {
            Some(Value::Array(results)) => results,
            _ => Vec::new(),
        })
    }

    async fn first_result(&self, request: HttpRequest) -> Result<Value, SourceError> {
        Ok(self
            .results(request)
            .await?
            .into_iter()
            .next()
            .unwrap_or(Value::Null))
    }

    async fn chain_id(&self, symbol: &str) -> Result<Option<String>, SourceError> {
        let request =
            HttpRequest::get(self.api_url("instruments/")).with_query([("symbol", Some(symbol))]);
        let instrument = self.first_result(request).await?;
        Ok(coerce::text(&instrument, "tradable_chain_id"))
    }

    async fn option_instruments(
        &self,
        chain_id: &str,
        expiration: &str,
        strike: Option<&str>,
        option_type: Option<OptionType>,
    ) -> Result<Vec<Value>, SourceError> {
        let request = HttpRequest::get(self.api_url("options/instruments/")).with_query([
            ("chain_id", Some(chain_id)),
            ("expiration_dates", Some(expiration)),
            ("strike_price", strike),
            ("state", Some("active")),
            ("type", option_type.map(OptionType::as_str)),
        ]);
        self.get_paginated(request).await
    }
}

fn merge_instrument(market_data: Value, instrument: &Value) -> Value {
    let mut merged = match market_data {
        Value::Object(fields) => fields,
        _ => Map::new(),
    };
    for field in INSTRUMENT_FIELDS {
        if merged.get(field).map_or(true, Value::is_null) {
            if let Some(value) = instrument.get(field) {
                merged.insert(field.to_owned(), value.clone());
            }
        }
    }
    Value::Object(merged)
}

impl BrokerageSource for RobinhoodAdapter {
    fn ensure_session<'a>(&'a self) -> SourceFuture<'a, ()> {
        Box::pin(async move { self.session.ensure().await.map(|_| ()) })
    }

    fn logout<'a>(&'a self) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move { self.session.logout().await })
    }

    fn list_expirations<'a>(&'a self, symbol: &'a str) -> SourceFuture<'a, Vec<String>> {
        Box::pin(async move {
            let Some(chain_id) = self.chain_id(symbol).await? else {
                return Ok(Vec::new());
            };
            let chain = self
                .get_json(HttpRequest::get(
                    self.api_url(&format!("options/chains/{chain_id}/")),
                ))
                .await?;

            Ok(chain
                .get("expiration_dates")
                .and_then(Value::as_array)
                .map(|dates| {
                    dates
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_owned)
                        .collect()
                })
                .unwrap_or_default())
        })
    }

    fn list_tradable_instruments<'a>(
        &'a self,
        symbol: &'a str,
        expiration: &'a str,
        option_type: Option<OptionType>,
    ) -> SourceFuture<'a, Vec<Value>> {
        Box::pin(async move {
            let Some(chain_id) = self.chain_id(symbol).await? else {
                return Ok(Vec::new());
            };
            self.option_instruments(&chain_id, expiration, None, option_type)
                .await
        })
    }

    fn get_market_data<'a>(
        &'a self,
        symbol: &'a str,
        expiration: &'a str,
        strike: &'a str,
        option_type: OptionType,
    ) -> SourceFuture<'a, Vec<Value>> {
        Box::pin(async move {
            let Some(chain_id) = self.chain_id(symbol).await? else {
                return Ok(Vec::new());
            };
            let instruments = self
                .option_instruments(&chain_id, expiration, Some(strike), Some(option_type))
                .await?;

            let mut records = Vec::with_capacity(instruments.len());
            for instrument in instruments {
                let Some(id) = coerce::text(&instrument, "id") else {
                    continue;
                };
                let market_data = self
                    .get_json(HttpRequest::get(
                        self.api_url(&format!("marketdata/options/{id}/")),
                    ))
                    .await?;
                records.push(merge_instrument(market_data, &instrument));
            }
            Ok(records)
        })
    }

    fn get_latest_price<'a>(&'a self, symbol: &'a str) -> SourceFuture<'a, Option<f64>> {
        Box::pin(async move {
            let quote = self
                .get_json(HttpRequest::get(self.api_url(&format!(
                    "quotes/{}/",
                    urlencoding::encode(symbol)
                ))))
                .await?;
            Ok(coerce::number(&quote, "last_extended_hours_trade_price")
                .or_else(|| coerce::number(&quote, "last_trade_price")))
        })
    }

    fn open_option_positions<'a>(&'a self) -> SourceFuture<'a, Vec<Value>> {
        Box::pin(async move {
            let request = HttpRequest::get(self.api_url("options/positions/"))
                .with_query([("nonzero", Some("True"))]);
            self.get_paginated(request).await
        })
    }

    fn option_instrument<'a>(&'a self, instrument_id: &'a str) -> SourceFuture<'a, Value> {
        Box::pin(async move {
            self.get_json(HttpRequest::get(self.api_url(&format!(
                "options/instruments/{}/",
                urlencoding::encode(instrument_id)
            ))))
            .await
        })
    }

    fn quotes<'a>(&'a self, symbols: &'a [String]) -> SourceFuture<'a, Vec<Value>> {
        Box::pin(async move {
            let joined = symbols
                .iter()
                .map(|symbol| symbol.trim().to_ascii_uppercase())
                .collect::<Vec<_>>()
                .join(",");
            let request =
                HttpRequest::get(self.api_url("quotes/")).with_query([("symbols", Some(joined.as_str()))]);
            self.results(request).await
        })
    }

    fn historicals<'a>(
        &'a self,
        symbol: &'a str,
        interval: HistoryInterval,
        span: HistorySpan,
        bounds: HistoryBounds,
    ) -> SourceFuture<'a, Vec<Value>> {
        Box::pin(async move {
            let request = HttpRequest::get(self.api_url("quotes/historicals/")).with_query([
                ("symbols", Some(symbol)),
                ("interval", Some(interval.as_str())),
                ("span", Some(span.as_str())),
                ("bounds", Some(bounds.as_str())),
            ]);
            let mut series = self.first_result(request).await?;
            Ok(match series.get_mut("historicals").map(Value::take) {
                Some(Value::Array(candles)) => candles,
                _ => Vec::new(),
            })
        })
    }

    fn fundamentals<'a>(&'a self, symbol: &'a str) -> SourceFuture<'a, Vec<Value>> {
        Box::pin(async move {
            let request = HttpRequest::get(self.api_url("fundamentals/"))
                .with_query([("symbols", Some(symbol))]);
            self.results(request).await
        })
    }

    fn news<'a>(&'a self, symbol: &'a str) -> SourceFuture<'a, Vec<Value>> {
        Box::pin(async move {
            let request = HttpRequest::get(self.api_url(&format!(
                "midlands/news/{}/",
                urlencoding::encode(symbol)
            )));
            self.get_paginated(request).await
        })
    }

    fn portfolio_profile<'a>(&'a self) -> SourceFuture<'a, Value> {
        Box::pin(async move {
            self.first_result(HttpRequest::get(self.api_url("portfolios/")))
                .await
        })
    }

    fn account_profile<'a>(&'a self) -> SourceFuture<'a, Value> {
        Box::pin(async move {
            self.first_result(HttpRequest::get(self.api_url("accounts/")))
                .await
        })
    }

    fn open_stock_positions<'a>(&'a self) -> SourceFuture<'a, Vec<Value>> {
        Box::pin(async move {
            let request = HttpRequest::get(self.api_url("positions/"))
                .with_query([("nonzero", Some("true"))]);
            self.get_paginated(request).await
        })
    }

    fn instrument_by_url<'a>(&'a self, url: &'a str) -> SourceFuture<'a, Value> {
        Box::pin(async move {
            if !self.is_trusted_url(url) {
                return Err(SourceError::invalid_request(format!(
                    "instrument url is outside the configured api host: {url}"
                )));
            }
            self.get_json(HttpRequest::get(url)).await
        })
    }

    fn watchlists<'a>(&'a self) -> SourceFuture<'a, Vec<Value>> {
        Box::pin(async move {
            self.results(HttpRequest::get(self.api_url("midlands/lists/default/")))
                .await
        })
    }

    fn watchlist_items<'a>(&'a self, list_id: &'a str) -> SourceFuture<'a, Vec<Value>> {
        Box::pin(async move {
            let request = HttpRequest::get(self.api_url("midlands/lists/items/"))
                .with_query([("list_id", Some(list_id))]);
            self.get_paginated(request).await
        })
    }

    fn stock_orders<'a>(&'a self, start_date: Option<&'a str>) -> SourceFuture<'a, Vec<Value>> {
        Box::pin(async move {
            let request = HttpRequest::get(self.api_url("orders/"))
                .with_query([("updated_at[gte]", start_date)]);
            self.get_paginated(request).await
        })
    }

    fn option_orders<'a>(&'a self, start_date: Option<&'a str>) -> SourceFuture<'a, Vec<Value>> {
        Box::pin(async move {
            let request = HttpRequest::get(self.api_url("options/orders/"))
                .with_query([("updated_at[gte]", start_date)]);
            self.get_paginated(request).await
        })
    }

    fn crypto_orders<'a>(&'a self) -> SourceFuture<'a, Vec<Value>> {
        Box::pin(async move {
            let request = HttpRequest::get(format!("{}/orders/", self.crypto_base_url));
            self.get_paginated(request).await
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    use super::*;
    use crate::http_client::{HttpError, HttpResponse};
    use crate::source::SourceErrorKind;

    const BASE: &str = "https://api.example.test";

    /// Replies by exact URL; unknown URLs get a 404.
    struct ScriptedHttpClient {
        routes: HashMap<String, HttpResponse>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedHttpClient {
        fn new(routes: &[(&str, HttpResponse)]) -> Self {
            let mut table: HashMap<String, HttpResponse> = routes
                .iter()
                .map(|(url, response)| (format!("{BASE}/{url}"), response.clone()))
                .collect();
            table
                .entry(format!("{BASE}/oauth2/token/"))
                .or_insert_with(|| HttpResponse::ok_json(r#"{"access_token":"tok"}"#));
            Self {
                routes: table,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn recorded_urls(&self) -> Vec<String> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .iter()
                .map(|request| request.url.clone())
                .collect()
        }

        fn recorded_requests(&self) -> Vec<HttpRequest> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .clone()
        }
    }

    impl HttpClient for ScriptedHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            let response = self
                .routes
                .get(&request.url)
                .cloned()
                .unwrap_or_else(|| HttpResponse::with_status(404, "{}"));
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            Box::pin(async move { Ok(response) })
        }
    }

    fn adapter(client: Arc<ScriptedHttpClient>) -> RobinhoodAdapter {
        let config = SessionConfig::default()
            .with_username(Some(String::from("trader@example.com")))
            .with_password(Some(String::from("hunter2")))
            .with_api_base_url(Some(String::from(BASE)));
        RobinhoodAdapter::with_http_client(config, client)
    }

    fn chain_routes() -> Vec<(&'static str, HttpResponse)> {
        vec![
            (
                "instruments/?symbol=AAPL",
                HttpResponse::ok_json(r#"{"results":[{"symbol":"AAPL","tradable_chain_id":"chain-1"}]}"#),
            ),
            (
                "options/chains/chain-1/",
                HttpResponse::ok_json(r#"{"expiration_dates":["2026-03-20","2026-04-17"]}"#),
            ),
        ]
    }

    #[test]
    fn expirations_resolve_chain_then_read_dates_with_bearer_token() {
        let client = Arc::new(ScriptedHttpClient::new(&chain_routes()));
        let adapter = adapter(client.clone());

        let dates = block_on(adapter.list_expirations("AAPL")).expect("expirations");
        assert_eq!(dates, vec!["2026-03-20", "2026-04-17"]);

        let requests = client.recorded_requests();
        let chain_request = requests
            .iter()
            .find(|request| request.url.ends_with("options/chains/chain-1/"))
            .expect("chain request");
        assert_eq!(
            chain_request.headers.get("authorization").map(String::as_str),
            Some("Bearer tok")
        );
    }

    #[test]
    fn unknown_underlying_yields_no_expirations() {
        let client = Arc::new(ScriptedHttpClient::new(&[(
            "instruments/?symbol=ZZZZ",
            HttpResponse::ok_json(r#"{"results":[]}"#),
        )]));
        let adapter = adapter(client);

        let dates = block_on(adapter.list_expirations("ZZZZ")).expect("no data is not an error");
        assert!(dates.is_empty());
    }

    #[test]
    fn instrument_listing_follows_next_links() {
        let mut routes = chain_routes();
        routes.push((
            "options/instruments/?chain_id=chain-1&expiration_dates=2026-03-20&state=active&type=call",
            HttpResponse::ok_json(format!(
                r#"{{"results":[{{"strike_price":"150.0000"}}],"next":"{BASE}/options/instruments/?cursor=p2"}}"#
            )),
        ));
        routes.push((
            "options/instruments/?cursor=p2",
            HttpResponse::ok_json(r#"{"results":[{"strike_price":"155.0000"}],"next":null}"#),
        ));
        let client = Arc::new(ScriptedHttpClient::new(&routes));
        let adapter = adapter(client);

        let instruments = block_on(adapter.list_tradable_instruments(
            "AAPL",
            "2026-03-20",
            Some(OptionType::Call),
        ))
        .expect("listing");

        assert_eq!(instruments.len(), 2);
        assert_eq!(instruments[1]["strike_price"], "155.0000");
    }

    #[test]
    fn market_data_is_merged_with_instrument_identity() {
        let mut routes = chain_routes();
        routes.push((
            "options/instruments/?chain_id=chain-1&expiration_dates=2026-03-20&strike_price=150.00&state=active&type=put",
            HttpResponse::ok_json(
                r#"{"results":[{"id":"opt-9","chain_symbol":"AAPL","strike_price":"150.0000","type":"put","expiration_date":"2026-03-20"}],"next":null}"#,
            ),
        ));
        routes.push((
            "marketdata/options/opt-9/",
            HttpResponse::ok_json(r#"{"bid_price":"2.10","ask_price":"2.20","delta":"-0.41"}"#),
        ));
        let client = Arc::new(ScriptedHttpClient::new(&routes));
        let adapter = adapter(client.clone());

        let records = block_on(adapter.get_market_data(
            "AAPL",
            "2026-03-20",
            "150.00",
            OptionType::Put,
        ))
        .expect("market data");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["delta"], "-0.41");
        assert_eq!(records[0]["strike_price"], "150.0000");
        assert_eq!(records[0]["type"], "put");
        assert!(client
            .recorded_urls()
            .iter()
            .any(|url| url.ends_with("marketdata/options/opt-9/")));
    }

    #[test]
    fn latest_price_prefers_extended_hours_trade() {
        let client = Arc::new(ScriptedHttpClient::new(&[(
            "quotes/AAPL/",
            HttpResponse::ok_json(
                r#"{"last_trade_price":"100.00","last_extended_hours_trade_price":"101.50"}"#,
            ),
        )]));
        let adapter = adapter(client);

        let price = block_on(adapter.get_latest_price("AAPL")).expect("price");
        assert_eq!(price, Some(101.5));
    }

    #[test]
    fn unauthorized_response_maps_to_auth_required_and_drops_token() {
        let client = Arc::new(ScriptedHttpClient::new(&[(
            "portfolios/",
            HttpResponse::with_status(401, r#"{"detail":"Invalid token."}"#),
        )]));
        let adapter = adapter(client);

        let error = block_on(adapter.portfolio_profile()).expect_err("must be unauthorized");
        assert_eq!(error.kind(), SourceErrorKind::AuthRequired);
        assert!(!block_on(adapter.session().is_authenticated()));
    }

    #[test]
    fn malformed_body_maps_to_internal_error() {
        let client = Arc::new(ScriptedHttpClient::new(&[(
            "accounts/",
            HttpResponse::ok_json("<html>maintenance</html>"),
        )]));
        let adapter = adapter(client);

        let error = block_on(adapter.account_profile()).expect_err("must fail to parse");
        assert_eq!(error.kind(), SourceErrorKind::Internal);
        assert!(error.message().starts_with("failed to parse robinhood response"));
    }

    #[test]
    fn instrument_url_on_foreign_host_is_refused() {
        let client = Arc::new(ScriptedHttpClient::new(&[]));
        let adapter = adapter(client.clone());

        let error = block_on(adapter.instrument_by_url("https://evil.example/instruments/1/"))
            .expect_err("must refuse");
        assert_eq!(error.kind(), SourceErrorKind::InvalidRequest);
        assert!(client.recorded_urls().is_empty());
    }

    #[test]
    fn instrument_url_on_lookalike_host_is_refused() {
        let client = Arc::new(ScriptedHttpClient::new(&[]));
        let adapter = adapter(client.clone());

        for url in [
            "https://api.example.test.evil.com/instruments/x/",
            "https://api.example.test@evil.com/instruments/x/",
            "http://api.example.test/instruments/x/",
            "not a url",
        ] {
            let error = block_on(adapter.instrument_by_url(url)).expect_err("must refuse");
            assert_eq!(error.kind(), SourceErrorKind::InvalidRequest, "{url}");
        }
        assert!(client.recorded_urls().is_empty());
    }

    #[test]
    fn instrument_url_on_api_host_is_fetched() {
        let client = Arc::new(ScriptedHttpClient::new(&[(
            "instruments/abc/",
            HttpResponse::ok_json(r#"{"symbol":"AAPL"}"#),
        )]));
        let adapter = adapter(client);

        let instrument = block_on(adapter.instrument_by_url(&format!("{BASE}/instruments/abc/")))
            .expect("same origin");
        assert_eq!(instrument["symbol"], "AAPL");
    }

    #[test]
    fn pagination_link_to_foreign_host_is_not_followed() {
        let client = Arc::new(ScriptedHttpClient::new(&[(
            "p/0/",
            HttpResponse::ok_json(
                r#"{"results":[{"n":0}],"next":"https://api.example.test.evil.com/p/1/"}"#,
            ),
        )]));
        let adapter = adapter(client.clone());

        let error = block_on(adapter.get_paginated(HttpRequest::get(format!("{BASE}/p/0/"))))
            .expect_err("must refuse");
        assert_eq!(error.kind(), SourceErrorKind::InvalidRequest);
        assert!(client
            .recorded_urls()
            .iter()
            .all(|url| url.starts_with(&format!("{BASE}/"))));
    }

    #[test]
    fn pagination_stops_at_page_limit_without_extra_request() {
        let pages: Vec<(String, HttpResponse)> = (0..=MAX_PAGES)
            .map(|index| {
                (
                    format!("p/{index}/"),
                    HttpResponse::ok_json(format!(
                        r#"{{"results":[{{"n":{index}}}],"next":"{BASE}/p/{}/"}}"#,
                        index + 1
                    )),
                )
            })
            .collect();
        let routes: Vec<(&str, HttpResponse)> = pages
            .iter()
            .map(|(path, response)| (path.as_str(), response.clone()))
            .collect();
        let client = Arc::new(ScriptedHttpClient::new(&routes));
        let adapter = adapter(client.clone());

        let records = block_on(adapter.get_paginated(HttpRequest::get(format!("{BASE}/p/0/"))))
            .expect("partial listing");

        assert_eq!(records.len(), MAX_PAGES);
        assert_eq!(records[MAX_PAGES - 1]["n"], MAX_PAGES - 1);
        let page_requests = client
            .recorded_urls()
            .iter()
            .filter(|url| url.contains("/p/"))
            .count();
        assert_eq!(page_requests, MAX_PAGES);
    }

    #[test]
    fn order_listing_passes_start_date_filter() {
        let client = Arc::new(ScriptedHttpClient::new(&[(
            "orders/?updated_at%5Bgte%5D=2026-01-01",
            HttpResponse::ok_json(r#"{"results":[{"id":"o-1"}],"next":null}"#),
        )]));
        let adapter = adapter(client);

        let orders = block_on(adapter.stock_orders(Some("2026-01-01"))).expect("orders");
        assert_eq!(orders.len(), 1);
    }

    fn block_on<F>(future: F) -> F::Output
    where
        F: Future,
    {
        let waker = noop_waker();
        let mut context = Context::from_waker(&waker);
        let mut future = std::pin::pin!(future);

        loop {
            match future.as_mut().poll(&mut context) {
                Poll::Ready(output) => return output,
                Poll::Pending => std::thread::yield_now(),
            }
        }
    }

    fn noop_waker() -> Waker {
        // SAFETY: The vtable functions never dereference the data pointer and are no-op operations.
        unsafe { Waker::from_raw(noop_raw_waker()) }
    }

    fn noop_raw_waker() -> RawWaker {
        RawWaker::new(std::ptr::null(), &NOOP_RAW_WAKER_VTABLE)
    }

    unsafe fn noop_raw_waker_clone(_: *const ()) -> RawWaker {
        noop_raw_waker()
    }

    unsafe fn noop_raw_waker_wake(_: *const ()) {}

    unsafe fn noop_raw_waker_wake_by_ref(_: *const ()) {}

    unsafe fn noop_raw_waker_drop(_: *const ()) {}

    static NOOP_RAW_WAKER_VTABLE: RawWakerVTable = RawWakerVTable::new(
        noop_raw_waker_clone,
        noop_raw_waker_wake,
        noop_raw_waker_wake_by_ref,
        noop_raw_waker_drop,
    );
}
