//! Behavior-driven tests for options chain retrieval
//!
//! These tests verify HOW the options service chooses between a targeted
//! lookup and a chain listing, how it narrows listings to near-the-money
//! strikes, and how it normalizes raw upstream records.

use std::sync::Arc;

use hoodwatch_core::{
    Capability, ChainQuery, MockSource, OptionType, OptionsService, ServiceErrorKind, SourceError,
};
use serde_json::{json, Value};

fn service(source: &Arc<MockSource>) -> OptionsService {
    OptionsService::new(source.clone())
}

fn instrument(strike: &str, option_type: &str) -> Value {
    json!({
        "chain_symbol": "AAPL",
        "expiration_date": "2026-03-20",
        "strike_price": strike,
        "type": option_type,
        "state": "active"
    })
}

fn market_data(option_type: &str) -> Value {
    json!({
        "chain_symbol": "AAPL",
        "expiration_date": "2026-03-20",
        "strike_price": "150.0000",
        "type": option_type,
        "bid_price": "2.95",
        "ask_price": "3.15",
        "mark_price": "3.05",
        "adjusted_mark_price": "3.04",
        "open_interest": 1520,
        "volume": "87",
        "implied_volatility": "0.2412",
        "delta": "0.3245",
        "gamma": "0.0211",
        "theta": "-0.0412",
        "vega": "0.1533",
        "rho": "0.0123"
    })
}

// =============================================================================
// Argument validation
// =============================================================================

#[tokio::test]
async fn when_symbol_is_empty_no_upstream_call_is_made() {
    // Given: An upstream that would happily answer anything
    let source = Arc::new(
        MockSource::builder()
            .with_expirations(["2026-03-20"])
            .with_latest_price(150.0)
            .build(),
    );

    // When: The chain is requested for an empty symbol
    let error = service(&source)
        .get_options_chain(&ChainQuery::new(""))
        .await
        .expect_err("empty symbol must be rejected");

    // Then: The request fails fast without touching the session or the upstream
    assert_eq!(error.kind(), ServiceErrorKind::InvalidArgument);
    assert_eq!(error.to_string(), "INVALID_ARGUMENT: Symbol is required");
    assert!(source.recorded_calls().is_empty());
}

// =============================================================================
// Targeted lookup
// =============================================================================

#[tokio::test]
async fn when_strike_is_given_without_type_both_types_are_fetched() {
    // Given: Market data for both contract types at one strike
    let source = Arc::new(
        MockSource::builder()
            .with_market_data(OptionType::Call, vec![market_data("call")])
            .with_market_data(OptionType::Put, vec![market_data("put")])
            .build(),
    );

    // When: A strike is requested with an explicit expiration and no type
    let query = ChainQuery::new("AAPL")
        .with_expiration("2026-03-20")
        .with_strike_price("150");
    let contracts = service(&source)
        .get_options_chain(&query)
        .await
        .expect("targeted lookup should succeed");

    // Then: Exactly one market-data call happens per type
    assert_eq!(source.calls(Capability::GetMarketData), 2);
    assert_eq!(source.calls(Capability::ListTradableInstruments), 0);
    assert_eq!(source.calls(Capability::ListExpirations), 0);

    // And: At most one record comes back per type
    let calls = contracts
        .iter()
        .filter(|contract| contract.option_type == OptionType::Call)
        .count();
    let puts = contracts
        .iter()
        .filter(|contract| contract.option_type == OptionType::Put)
        .count();
    assert_eq!((calls, puts), (1, 1));
}

#[tokio::test]
async fn when_strike_and_call_type_are_given_one_market_data_call_is_made() {
    // Given: Call market data at one strike
    let source = Arc::new(
        MockSource::builder()
            .with_market_data(OptionType::Call, vec![market_data("call")])
            .build(),
    );

    // When: A call contract is requested at that strike
    let query = ChainQuery::new("AAPL")
        .with_expiration("2026-03-20")
        .with_option_type(OptionType::Call)
        .with_strike_price("150");
    let contracts = service(&source)
        .get_options_chain(&query)
        .await
        .expect("targeted lookup should succeed");

    // Then: Only the call side is queried
    assert_eq!(source.calls(Capability::GetMarketData), 1);
    let recorded = source.recorded_calls();
    let market_call = recorded
        .iter()
        .find(|call| call.capability == Capability::GetMarketData)
        .expect("market data call recorded");
    assert_eq!(market_call.args, vec!["AAPL", "2026-03-20", "150", "call"]);

    // And: Pricing and Greeks are populated
    let contract = &contracts[0];
    assert_eq!(contract.strike, Some(150.0));
    assert_eq!(contract.bid, Some(2.95));
    assert_eq!(contract.delta, Some(0.3245));
    assert_eq!(contract.open_interest, Some(1520));
    assert_eq!(contract.volume, Some(87));
}

#[tokio::test]
async fn when_market_data_omits_query_fields_they_are_filled_in() {
    // Given: A sparse market-data entry and a null placeholder
    let source = Arc::new(
        MockSource::builder()
            .with_market_data(
                OptionType::Put,
                vec![json!({ "mark_price": "1.10" }), Value::Null],
            )
            .build(),
    );

    // When: A put is requested at strike 95
    let query = ChainQuery::new("spy")
        .with_expiration("2026-04-17")
        .with_option_type(OptionType::Put)
        .with_strike_price("95");
    let contracts = service(&source)
        .get_options_chain(&query)
        .await
        .expect("targeted lookup should succeed");

    // Then: The null entry is skipped and the query values are injected
    assert_eq!(contracts.len(), 1);
    let contract = &contracts[0];
    assert_eq!(contract.symbol, "SPY");
    assert_eq!(contract.expiration, "2026-04-17");
    assert_eq!(contract.strike, Some(95.0));
    assert_eq!(contract.option_type, OptionType::Put);
    assert_eq!(contract.mark_price, Some(1.10));
}

// =============================================================================
// Chain listing and near-the-money filtering
// =============================================================================

#[tokio::test]
async fn when_reference_price_is_known_listing_keeps_boundary_strikes() {
    // Given: Strikes straddling both edges of the band around a price of 100
    let source = Arc::new(
        MockSource::builder()
            .with_instruments(vec![
                instrument("80.0000", "call"),
                instrument("79.9900", "call"),
                instrument("120.0000", "call"),
                instrument("120.0100", "call"),
            ])
            .with_latest_price(100.0)
            .build(),
    );

    // When: The chain is listed without a strike
    let query = ChainQuery::new("AAPL").with_expiration("2026-03-20");
    let contracts = service(&source)
        .get_options_chain(&query)
        .await
        .expect("listing should succeed");

    // Then: Exactly the inclusive boundary strikes remain
    let strikes: Vec<Option<f64>> = contracts.iter().map(|contract| contract.strike).collect();
    assert_eq!(strikes, vec![Some(80.0), Some(120.0)]);
    assert_eq!(source.calls(Capability::GetMarketData), 0);

    // And: Listing entries carry no pricing
    assert!(contracts.iter().all(|contract| contract.mark_price.is_none()));
}

#[tokio::test]
async fn when_reference_price_lookup_fails_listing_is_returned_unfiltered() {
    // Given: A listing and a failing price lookup
    let listing = vec![
        instrument("10.0000", "call"),
        instrument("150.0000", "put"),
        instrument("900.0000", "call"),
    ];
    let source = Arc::new(
        MockSource::builder()
            .with_instruments(listing.clone())
            .failing(
                Capability::GetLatestPrice,
                SourceError::unavailable("quote service down"),
            )
            .build(),
    );

    // When: The chain is listed
    let contracts = service(&source)
        .get_options_chain(&ChainQuery::new("AAPL").with_expiration("2026-03-20"))
        .await
        .expect("price failure must not fail the listing");

    // Then: Nothing is dropped
    assert_eq!(contracts.len(), listing.len());
}

#[tokio::test]
async fn when_reference_price_is_missing_listing_is_returned_unfiltered() {
    // Given: A listing and no price for the underlying
    let source = Arc::new(
        MockSource::builder()
            .with_instruments(vec![instrument("10.0000", "call"), instrument("900.0000", "put")])
            .build(),
    );

    // When: The chain is listed
    let contracts = service(&source)
        .get_options_chain(&ChainQuery::new("AAPL").with_expiration("2026-03-20"))
        .await
        .expect("listing should succeed");

    // Then: Both strikes are returned
    assert_eq!(contracts.len(), 2);
    assert_eq!(source.calls(Capability::GetLatestPrice), 1);
}

#[tokio::test]
async fn when_listing_is_empty_price_is_not_looked_up() {
    // Given: An expiration with no tradable instruments
    let source = Arc::new(MockSource::builder().with_latest_price(100.0).build());

    // When: The chain is listed
    let contracts = service(&source)
        .get_options_chain(&ChainQuery::new("AAPL").with_expiration("2026-03-20"))
        .await
        .expect("empty listing is not an error");

    // Then: The result is empty and no price call was spent
    assert!(contracts.is_empty());
    assert_eq!(source.calls(Capability::GetLatestPrice), 0);
}

// =============================================================================
// Expiration resolution
// =============================================================================

#[tokio::test]
async fn when_no_expiration_is_requested_the_nearest_one_is_used() {
    // Given: Two upstream expirations in ascending order
    let source = Arc::new(
        MockSource::builder()
            .with_expirations(["2026-03-20", "2026-04-17"])
            .with_instruments(vec![instrument("150.0000", "call")])
            .build(),
    );
    let options = service(&source);

    // When: The expiration is resolved without a request
    let resolved = options
        .resolve_expiration("AAPL", None)
        .await
        .expect("resolution should succeed");

    // Then: The first one is selected
    assert_eq!(resolved.as_deref(), Some("2026-03-20"));

    // And: A listing without an expiration queries that date
    options
        .get_options_chain(&ChainQuery::new("AAPL"))
        .await
        .expect("listing should succeed");
    let listing_call = source
        .recorded_calls()
        .into_iter()
        .find(|call| call.capability == Capability::ListTradableInstruments)
        .expect("listing call recorded");
    assert_eq!(listing_call.args[1], "2026-03-20");
}

#[tokio::test]
async fn when_requested_expiration_is_given_it_is_trusted_verbatim() {
    // Given: An upstream whose expirations do not include the requested date
    let source = Arc::new(MockSource::builder().with_expirations(["2026-03-20"]).build());

    // When: A specific expiration is requested
    let resolved = service(&source)
        .resolve_expiration("AAPL", Some("2027-01-15"))
        .await
        .expect("resolution should succeed");

    // Then: It is returned without consulting the upstream
    assert_eq!(resolved.as_deref(), Some("2027-01-15"));
    assert_eq!(source.calls(Capability::ListExpirations), 0);
}

#[tokio::test]
async fn when_the_chain_has_no_expirations_the_result_is_empty() {
    // Given: A symbol without listed options
    let source = Arc::new(MockSource::builder().build());

    // When: The chain is requested with a strike
    let contracts = service(&source)
        .get_options_chain(&ChainQuery::new("BRK.A").with_strike_price("500000"))
        .await
        .expect("no expirations is not an error");

    // Then: Nothing is returned and no market data is fetched
    assert!(contracts.is_empty());
    assert_eq!(source.calls(Capability::GetMarketData), 0);
}

// =============================================================================
// Normalization
// =============================================================================

#[tokio::test]
async fn when_raw_fields_are_strings_they_are_coerced_or_nulled() {
    // Given: An entry mixing numeric strings and garbage
    let mut raw = market_data("call");
    raw["volume"] = json!("not_a_number");
    raw["strike_price"] = json!("150.00");
    let source = Arc::new(
        MockSource::builder()
            .with_market_data(OptionType::Call, vec![raw])
            .build(),
    );

    // When: The contract is fetched
    let contracts = service(&source)
        .get_options_chain(
            &ChainQuery::new("AAPL")
                .with_expiration("2026-03-20")
                .with_option_type(OptionType::Call)
                .with_strike_price("150"),
        )
        .await
        .expect("lookup should succeed");

    // Then: Numeric strings parse and garbage becomes null
    let contract = &contracts[0];
    assert_eq!(contract.strike, Some(150.0));
    assert_eq!(contract.delta, Some(0.3245));
    assert_eq!(contract.volume, None);

    // And: The adjusted mark wins over the plain mark
    assert_eq!(contract.mark_price, Some(3.04));
}

#[tokio::test]
async fn contracts_serialize_with_explicit_nulls_and_type_field() {
    // Given: A listing entry with no pricing
    let source = Arc::new(
        MockSource::builder()
            .with_instruments(vec![instrument("150.0000", "put")])
            .build(),
    );

    // When: The contract is serialized
    let contracts = service(&source)
        .get_options_chain(&ChainQuery::new("AAPL").with_expiration("2026-03-20"))
        .await
        .expect("listing should succeed");
    let rendered = serde_json::to_value(&contracts[0]).expect("serializable");

    // Then: The wire shape uses `type` and keeps absent values as null
    assert_eq!(rendered["type"], "put");
    assert_eq!(rendered["strike"], 150.0);
    assert!(rendered.get("mark_price").is_some_and(Value::is_null));
    assert!(rendered.get("delta").is_some_and(Value::is_null));
}
