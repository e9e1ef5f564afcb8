//! Prometheus metrics shared by the API server and the worker.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

pub struct Metrics {
    registry: Registry,
    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: IntGauge,
    pub evaluations_total: IntCounter,
    pub evaluations_skipped_total: IntCounter,
    pub evaluation_failures_total: IntCounter,
    pub evaluation_duration_seconds: Histogram,
    pub signals_emitted_total: IntCounterVec,
    pub store_connected: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total =
            IntCounter::new("http_requests_total", "Total HTTP requests handled")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;
        let http_requests_in_flight =
            IntGauge::new("http_requests_in_flight", "HTTP requests currently in flight")?;
        let evaluations_total = IntCounter::new(
            "signal_evaluations_total",
            "Completed subscription evaluation cycles",
        )?;
        let evaluations_skipped_total = IntCounter::new(
            "signal_evaluations_skipped_total",
            "Evaluation cycles skipped for insufficient data",
        )?;
        let evaluation_failures_total = IntCounter::new(
            "signal_evaluation_failures_total",
            "Evaluation cycles that failed on a collaborator",
        )?;
        let evaluation_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "signal_evaluation_duration_seconds",
            "Duration of one evaluation cycle in seconds",
        ))?;
        let signals_emitted_total = IntCounterVec::new(
            Opts::new("signals_emitted_total", "Signals delivered, by kind"),
            &["kind"],
        )?;
        let store_connected = IntGauge::new(
            "subscription_store_connected",
            "1 when the subscription store is backed by Redis",
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(evaluations_total.clone()))?;
        registry.register(Box::new(evaluations_skipped_total.clone()))?;
        registry.register(Box::new(evaluation_failures_total.clone()))?;
        registry.register(Box::new(evaluation_duration_seconds.clone()))?;
        registry.register(Box::new(signals_emitted_total.clone()))?;
        registry.register(Box::new(store_connected.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            evaluations_total,
            evaluations_skipped_total,
            evaluation_failures_total,
            evaluation_duration_seconds,
            signals_emitted_total,
            store_connected,
        })
    }

    /// Render all metrics in the Prometheus text format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
