use crate::error::AppError;
use actix_web::{
    Error,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web,
};
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};
use std::time::{Duration, Instant};

/// Process-wide request metrics, created once at startup.
pub struct Metrics {
    registry: Registry,
    pub requests_total: IntCounter,
    pub db_connection_errors_total: IntCounter,
    pub request_latency_seconds: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = IntCounter::new("requests_total", "Total HTTP requests")?;
        let db_connection_errors_total = IntCounter::new(
            "db_connection_errors_total",
            "Total database connection errors",
        )?;
        let request_latency_seconds = Histogram::with_opts(HistogramOpts::new(
            "request_latency_seconds",
            "Request latency in seconds",
        ))?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(db_connection_errors_total.clone()))?;
        registry.register(Box::new(request_latency_seconds.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            db_connection_errors_total,
            request_latency_seconds,
        })
    }

    pub fn observe_request(&self, elapsed: Duration) {
        self.requests_total.inc();
        self.request_latency_seconds.observe(elapsed.as_secs_f64());
    }

    /// Current snapshot in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, AppError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| AppError::Metrics(e.to_string()))
    }
}

/// Records every completed request. A no-op when no `Metrics` is registered as app data.
pub async fn track_requests(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let metrics = req.app_data::<web::Data<Metrics>>().cloned();
    let started = Instant::now();

    let res = next.call(req).await;

    if let Some(metrics) = metrics {
        metrics.observe_request(started.elapsed());
    }
    res
}
