mod common;

use std::time::Duration;

use serde_json::json;

use common::{configured, ScriptedTransport};
use skyscout::config::ApiConfig;
use skyscout::error::FlightError;
use skyscout::health::{HealthProber, HEALTH_CACHE_TTL, PROBE_TIMEOUT};
use skyscout::model::HealthStatus;

#[tokio::test]
async fn no_key_reports_mock_without_network() {
    let transport = ScriptedTransport::always(Ok(json!([])));
    let prober = HealthProber::new(ApiConfig::unconfigured(), transport.clone());

    let health = prober.check_health(false).await;
    assert_eq!(health.status, HealthStatus::Mock);
    assert!(health.using_mock_data);
    assert!(!health.api_key_configured);
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn reachable_api_is_online_and_cached() {
    let transport = ScriptedTransport::always(Ok(json!({ "data": [] })));
    let prober = HealthProber::new(configured(), transport.clone());

    let first = prober.check_health(false).await;
    assert_eq!(first.status, HealthStatus::Online);
    assert!(!first.using_mock_data);
    assert!(first.api_key_configured);

    let second = prober.check_health(false).await;
    assert_eq!(second, first);
    assert_eq!(transport.calls(), 1);
    assert_eq!(transport.paths(), ["/api/v1/flights/searchAirport"]);
}

#[tokio::test]
async fn skip_cache_probes_again() {
    let transport = ScriptedTransport::always(Ok(json!([])));
    let prober = HealthProber::new(configured(), transport.clone());

    prober.check_health(false).await;
    prober.check_health(true).await;
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn rate_limited_is_offline_and_not_cached() {
    let transport = ScriptedTransport::sequence(vec![Err(FlightError::RateLimited)], Ok(json!([])));
    let prober = HealthProber::new(configured(), transport.clone());

    let limited = prober.check_health(false).await;
    assert_eq!(limited.status, HealthStatus::Offline);
    assert!(limited.using_mock_data);
    assert!(prober.cached().is_none());

    let recovered = prober.check_health(false).await;
    assert_eq!(recovered.status, HealthStatus::Online);
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn server_error_is_degraded_online() {
    let transport = ScriptedTransport::always(Err(FlightError::HttpStatus(500)));
    let prober = HealthProber::new(configured(), transport);

    let health = prober.check_health(false).await;
    assert_eq!(health.status, HealthStatus::Online);
    assert!(health.using_mock_data);
    assert!(health.message.contains("500"));
}

#[tokio::test]
async fn unreachable_api_falls_back_to_mock() {
    let transport = ScriptedTransport::always(Err(FlightError::ConnectionFailed("refused".into())));
    let prober = HealthProber::new(configured(), transport);

    let health = prober.check_health(false).await;
    assert_eq!(health.status, HealthStatus::Mock);
    assert!(health.using_mock_data);
    assert!(health.api_key_configured);
}

#[tokio::test(start_paused = true)]
async fn slow_probe_times_out() {
    let transport = ScriptedTransport::slow(Ok(json!([])), PROBE_TIMEOUT * 3);
    let prober = HealthProber::new(configured(), transport);

    let health = prober.check_health(false).await;
    assert_eq!(health.status, HealthStatus::Mock);
    assert!(health.message.contains("timed out"));
}

#[tokio::test(start_paused = true)]
async fn cache_expires_after_ttl() {
    let transport = ScriptedTransport::always(Ok(json!([])));
    let prober = HealthProber::new(configured(), transport.clone());

    prober.check_health(false).await;
    tokio::time::advance(HEALTH_CACHE_TTL - Duration::from_secs(1)).await;
    assert!(prober.cached().is_some());

    tokio::time::advance(Duration::from_secs(2)).await;
    assert!(prober.cached().is_none());
    prober.check_health(false).await;
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn invalidate_forces_a_new_probe() {
    let transport = ScriptedTransport::always(Ok(json!([])));
    let prober = HealthProber::new(configured(), transport.clone());

    prober.check_health(false).await;
    prober.invalidate();
    prober.check_health(false).await;
    assert_eq!(transport.calls(), 2);
}
