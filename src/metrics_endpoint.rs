//! Metrics and health endpoints
//!
//! Serves the web metrics in Prometheus text format at `/metrics` and a
//! liveness document at `/health`.

use crate::metrics::WebMetrics;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use prometheus::{Encoder, TextEncoder};
use tracing::error;

/// Generate the metrics response in Prometheus format
pub fn metrics_response(metrics: &WebMetrics) -> Response<Full<Bytes>> {
    match format_prometheus_metrics(metrics) {
        Ok(body) => Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", TextEncoder::new().format_type())
            .body(Full::new(Bytes::from(body)))
            .unwrap(),
        Err(e) => {
            error!("failed to encode metrics: {}", e);
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header("Content-Type", "text/plain; charset=utf-8")
                .body(Full::new(Bytes::from("failed to encode metrics\n")))
                .unwrap()
        }
    }
}

/// Format metrics in Prometheus exposition format
///
/// Each metric carries a HELP line and a TYPE line.
pub fn format_prometheus_metrics(metrics: &WebMetrics) -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&metrics.gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Generate health check response
pub fn health_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(r#"{"status":"healthy"}"#)))
        .unwrap()
}
