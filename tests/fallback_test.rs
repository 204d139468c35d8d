mod common;

use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;

use common::{configured, service, unconfigured_service, ScriptedTransport};
use skyscout::config::ApiConfig;
use skyscout::error::FlightError;
use skyscout::fallback::{with_fallback, with_mock_fallback};
use skyscout::model::{CabinClass, FlightLeg};

#[tokio::test]
async fn unconfigured_never_calls_the_api() {
    let api_calls = AtomicUsize::new(0);
    let value = with_mock_fallback(
        &ApiConfig::unconfigured(),
        || async {
            api_calls.fetch_add(1, Ordering::SeqCst);
            Ok(1)
        },
        || async { 2 },
        "test",
    )
    .await;
    assert_eq!(value, 2);
    assert_eq!(api_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn api_result_wins_when_it_succeeds() {
    let mock_calls = AtomicUsize::new(0);
    let value = with_mock_fallback(
        &configured(),
        || async { Ok::<_, FlightError>("live") },
        || async {
            mock_calls.fetch_add(1, Ordering::SeqCst);
            "mock"
        },
        "test",
    )
    .await;
    assert_eq!(value, "live");
    assert_eq!(mock_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn api_failure_substitutes_mock() {
    let value = with_mock_fallback(
        &configured(),
        || async { Err(FlightError::HttpStatus(403)) },
        || async { "mock" },
        "test",
    )
    .await;
    assert_eq!(value, "mock");
}

#[tokio::test]
async fn cancelled_call_still_yields_a_value() {
    let value = with_mock_fallback(
        &configured(),
        || async { Err(FlightError::Cancelled) },
        || async { "mock" },
        "test",
    )
    .await;
    assert_eq!(value, "mock");

    let lookup: Option<u8> =
        with_fallback(&configured(), || async { Err(FlightError::Cancelled) }, "test").await;
    assert_eq!(lookup, None);
}

#[tokio::test]
async fn lookups_without_mock_yield_none() {
    let unconfigured: Option<u8> =
        with_fallback(&ApiConfig::unconfigured(), || async { Ok(1) }, "test").await;
    assert_eq!(unconfigured, None);

    let failed: Option<u8> =
        with_fallback(&configured(), || async { Err(FlightError::Timeout) }, "test").await;
    assert_eq!(failed, None);

    let ok = with_fallback(&configured(), || async { Ok::<_, FlightError>(7) }, "test").await;
    assert_eq!(ok, Some(7));
}

#[tokio::test]
async fn nearby_airports_fall_back_to_table() {
    let transport = ScriptedTransport::always(Err(FlightError::HttpStatus(500)));
    let service = service(transport.clone());

    let nearby = service.nearby_airports(33.94, -118.41).await.unwrap();
    let current = nearby.current.expect("closest airport");
    assert_eq!(current.iata.as_deref(), Some("LAX"));
    assert_eq!(nearby.nearby.len(), 5);
    assert_eq!(nearby.nearby[0].iata.as_deref(), Some("SFO"));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn nearby_rejects_bad_coordinates_before_any_request() {
    let transport = ScriptedTransport::always(Ok(json!({})));
    let service = service(transport.clone());

    assert!(service.nearby_airports(91.0, 0.0).await.is_err());
    assert!(service.nearby_airports(0.0, f64::NAN).await.is_err());
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn live_nearby_airports_are_normalized() {
    let transport = ScriptedTransport::always(Ok(json!({
        "data": {
            "current": { "skyId": "LHR", "entityId": "95565050", "presentation": { "title": "London Heathrow" } },
            "nearby": [{ "skyId": "LGW", "entityId": "95565051" }]
        }
    })));
    let nearby = service(transport).nearby_airports(51.47, -0.45).await.unwrap();
    assert_eq!(nearby.current.map(|a| a.name), Some("London Heathrow".into()));
    assert_eq!(nearby.nearby[0].sky_id, "LGW");
}

#[tokio::test]
async fn price_calendar_falls_back_to_thirty_days() {
    let service = unconfigured_service(ScriptedTransport::always(Ok(json!([]))));
    let days = service
        .price_calendar("JFK", "LHR", "2026-03-01", "USD")
        .await
        .unwrap();
    assert_eq!(days.len(), 30);
    assert_eq!(days[0].date, "2026-03-01");
    assert_eq!(days[29].date, "2026-03-30");
    assert!(days.iter().all(|d| d.price > 0.0 && d.group.is_some()));
}

#[tokio::test]
async fn price_calendar_reads_grouped_days() {
    let transport = ScriptedTransport::always(Ok(json!({
        "data": { "flights": { "days": [
            { "day": "2026-03-01", "price": 410, "group": "medium" },
            { "day": "2026-03-02", "price": 380, "group": "low" }
        ] } }
    })));
    let days = service(transport)
        .price_calendar("JFK", "LHR", "2026-03-01", "USD")
        .await
        .unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[1].price, 380.0);
    assert_eq!(days[1].group.as_deref(), Some("low"));
}

#[tokio::test]
async fn price_calendar_validates_date() {
    let service = unconfigured_service(ScriptedTransport::always(Ok(json!([]))));
    let err = service
        .price_calendar("JFK", "LHR", "03/01/2026", "USD")
        .await
        .unwrap_err();
    assert!(matches!(err, FlightError::InvalidDate(_)));
}

fn leg() -> FlightLeg {
    FlightLeg {
        origin: "JFK".into(),
        destination: "LHR".into(),
        date: "2026-03-01".into(),
    }
}

#[tokio::test]
async fn flight_details_have_no_mock() {
    let transport = ScriptedTransport::always(Err(FlightError::HttpStatus(404)));
    let details = service(transport.clone())
        .flight_details(&[leg()], 1, CabinClass::Economy, "USD")
        .await
        .unwrap();
    assert!(details.is_none());
    assert_eq!(transport.calls(), 1);

    let unconfigured = unconfigured_service(ScriptedTransport::always(Ok(json!({}))))
        .flight_details(&[leg()], 1, CabinClass::Economy, "USD")
        .await
        .unwrap();
    assert!(unconfigured.is_none());
}

#[tokio::test]
async fn flight_details_require_legs() {
    let service = unconfigured_service(ScriptedTransport::always(Ok(json!({}))));
    assert!(service
        .flight_details(&[], 1, CabinClass::Economy, "USD")
        .await
        .is_err());
}

#[tokio::test]
async fn flight_details_normalize_itinerary() {
    let transport = ScriptedTransport::always(Ok(json!({
        "data": { "itinerary": {
            "id": "it-1",
            "legs": [{
                "origin": { "displayCode": "JFK" },
                "destination": { "displayCode": "LHR" },
                "departure": "2026-03-01T19:00:00",
                "arrival": "2026-03-02T07:05:00",
                "durationInMinutes": 425,
                "stopCount": 0,
                "carriers": { "marketing": [{ "name": "British Airways" }] }
            }],
            "pricingOptions": []
        } }
    })));
    let flight = service(transport)
        .flight_details(&[leg()], 1, CabinClass::Business, "USD")
        .await
        .unwrap()
        .expect("itinerary");
    assert_eq!(flight.id, "it-1");
    assert_eq!(flight.airline, "British Airways");
    assert_eq!(flight.duration, "7h 5m");
    assert_eq!(flight.cabin_class.as_deref(), Some("business"));
}
