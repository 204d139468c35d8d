#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use skyscout::api::FlightService;
use skyscout::config::{ApiConfig, DEFAULT_API_HOST};
use skyscout::error::FlightError;
use skyscout::fetch::{Query, Transport};
use skyscout::retry::RetryPolicy;

/// In-memory transport that replays scripted replies and counts calls.
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<Value, FlightError>>>,
    default_reply: Result<Value, FlightError>,
    latency: Duration,
    calls: AtomicUsize,
    paths: Mutex<Vec<String>>,
    queries: Mutex<Vec<Query>>,
}

impl ScriptedTransport {
    /// Answers every call with `reply`.
    pub fn always(reply: Result<Value, FlightError>) -> Arc<Self> {
        Self::build(Vec::new(), reply, Duration::ZERO)
    }

    /// Answers with `replies` in order, then with `then` forever.
    pub fn sequence(
        replies: Vec<Result<Value, FlightError>>,
        then: Result<Value, FlightError>,
    ) -> Arc<Self> {
        Self::build(replies, then, Duration::ZERO)
    }

    /// Like [`ScriptedTransport::always`], but each call takes `latency`.
    pub fn slow(reply: Result<Value, FlightError>, latency: Duration) -> Arc<Self> {
        Self::build(Vec::new(), reply, latency)
    }

    fn build(
        replies: Vec<Result<Value, FlightError>>,
        default_reply: Result<Value, FlightError>,
        latency: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            default_reply,
            latency,
            calls: AtomicUsize::new(0),
            paths: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<Query> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get_json(&self, path: &str, query: &Query) -> Result<Value, FlightError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.paths.lock().unwrap().push(path.to_string());
        self.queries.lock().unwrap().push(query.clone());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let next = self.replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.default_reply.clone())
    }
}

pub fn configured() -> ApiConfig {
    ApiConfig::new("test-key", DEFAULT_API_HOST)
}

/// A configured service over `transport` that never sleeps between retries.
pub fn service(transport: Arc<ScriptedTransport>) -> Arc<FlightService> {
    Arc::new(FlightService::new(configured(), transport).with_retry_policy(RetryPolicy::no_retry()))
}

pub fn unconfigured_service(transport: Arc<ScriptedTransport>) -> Arc<FlightService> {
    Arc::new(FlightService::new(ApiConfig::unconfigured(), transport))
}
