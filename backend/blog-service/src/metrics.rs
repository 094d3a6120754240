//! Prometheus metrics for blog-service.
//!
//! Exposes cache and write counters and an HTTP handler for the `/metrics`
//! endpoint.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

lazy_static! {
    /// Index page cache lookups (hit/miss), clears and evictions.
    pub static ref INDEX_CACHE_EVENTS: IntCounterVec = register_int_counter_vec!(
        "index_page_cache_events_total",
        "Index page cache events segmented by outcome",
        &["event"]
    )
    .expect("failed to register index_page_cache_events_total");

    /// Successful writes segmented by entity (post, comment) and action.
    pub static ref CONTENT_WRITES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "content_writes_total",
        "Content writes segmented by entity and action",
        &["entity", "action"]
    )
    .expect("failed to register content_writes_total");

    /// Follow edges created or removed.
    pub static ref FOLLOW_EDGES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "follow_edges_total",
        "Follow graph mutations that changed an edge",
        &["action"]
    )
    .expect("failed to register follow_edges_total");
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
