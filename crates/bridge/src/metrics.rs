use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

lazy_static! {
    pub static ref WEBHOOKS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "alertbridge_webhooks_total",
            "Inbound webhook requests by decode outcome."
        ),
        &["outcome"]
    )
    .expect("valid webhooks_total metric");
    pub static ref ALERTS_RECEIVED_TOTAL: IntCounter = IntCounter::new(
        "alertbridge_alerts_received_total",
        "Total number of alerts received from Alertmanager."
    )
    .expect("valid alerts_received_total metric");
    pub static ref NOTIFICATIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "alertbridge_notifications_total",
            "Notifications forwarded to Gotify by delivery outcome."
        ),
        &["outcome"]
    )
    .expect("valid notifications_total metric");
    pub static ref REGISTRY: Registry = {
        let registry = Registry::new();
        registry
            .register(Box::new(WEBHOOKS_TOTAL.clone()))
            .expect("Failed to register WEBHOOKS_TOTAL");
        registry
            .register(Box::new(ALERTS_RECEIVED_TOTAL.clone()))
            .expect("Failed to register ALERTS_RECEIVED_TOTAL");
        registry
            .register(Box::new(NOTIFICATIONS_TOTAL.clone()))
            .expect("Failed to register NOTIFICATIONS_TOTAL");
        registry
    };
}

pub fn record_webhook(accepted: bool) {
    let outcome = if accepted { "accepted" } else { "rejected" };
    WEBHOOKS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_notification(delivered: bool) {
    let outcome = if delivered { "delivered" } else { "failed" };
    NOTIFICATIONS_TOTAL.with_label_values(&[outcome]).inc();
}

// Function to gather metrics for exposition
pub fn gather_metrics() -> crate::Result<String> {
    let mut buffer = vec![];
    let encoder = TextEncoder::new();
    encoder
        .encode(&REGISTRY.gather(), &mut buffer)
        .map_err(|e| crate::Error::Internal(format!("Failed to encode metrics: {}", e)))?;
    String::from_utf8(buffer)
        .map_err(|e| crate::Error::Internal(format!("Metrics are not valid UTF-8: {}", e)))
}
