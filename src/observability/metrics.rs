use std::time::Instant;

use prometheus::{
    Encoder, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

use crate::error::AppError;

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub handler_requests_total: IntCounterVec,
    pub handler_latency_seconds: HistogramVec,
    pub order_transitions_total: IntCounterVec,
    pub rider_location_updates_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let handler_requests_total = IntCounterVec::new(
            Opts::new("handler_requests_total", "Dispatch requests by handler and outcome"),
            &["handler", "outcome"],
        )
        .expect("valid handler_requests_total metric");

        let handler_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "handler_latency_seconds",
                "Latency of dispatch handlers in seconds",
            ),
            &["handler"],
        )
        .expect("valid handler_latency_seconds metric");

        let order_transitions_total = IntCounterVec::new(
            Opts::new("order_transitions_total", "Order status transitions by target status"),
            &["status"],
        )
        .expect("valid order_transitions_total metric");

        let rider_location_updates_total = IntCounter::new(
            "rider_location_updates_total",
            "Rider location fixes accepted",
        )
        .expect("valid rider_location_updates_total metric");

        registry
            .register(Box::new(handler_requests_total.clone()))
            .expect("register handler_requests_total");
        registry
            .register(Box::new(handler_latency_seconds.clone()))
            .expect("register handler_latency_seconds");
        registry
            .register(Box::new(order_transitions_total.clone()))
            .expect("register order_transitions_total");
        registry
            .register(Box::new(rider_location_updates_total.clone()))
            .expect("register rider_location_updates_total");

        Self {
            registry,
            handler_requests_total,
            handler_latency_seconds,
            order_transitions_total,
            rider_location_updates_total,
        }
    }

    pub fn observe<T>(&self, handler: &str, result: &Result<T, AppError>, started: Instant) {
        let outcome = if result.is_ok() { "success" } else { "error" };

        self.handler_latency_seconds
            .with_label_values(&[handler])
            .observe(started.elapsed().as_secs_f64());
        self.handler_requests_total
            .with_label_values(&[handler, outcome])
            .inc();
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
