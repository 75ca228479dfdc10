//! Forwards every alert of a batch, one at a time, in payload order.

use tracing::{error, info};

use crate::{
    metrics,
    sinks::Notifier,
    sources::AlertManagerWebhook,
    transform::{lookup_or, transform_alert, DEFAULT_ALERT_NAME},
    Result,
};

#[derive(Debug)]
pub struct DeliveryOutcome {
    pub alert_name: String,
    /// Status code Gotify answered with, or why no answer was received.
    pub result: Result<u16>,
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        self.result.is_ok()
    }
}

/// A failure on one alert is logged and recorded; the remaining alerts are
/// still sent.
pub async fn relay_batch(notifier: &dyn Notifier, batch: &AlertManagerWebhook) -> Vec<DeliveryOutcome> {
    let mut outcomes = Vec::with_capacity(batch.alerts.len());

    for alert in &batch.alerts {
        metrics::ALERTS_RECEIVED_TOTAL.inc();

        let alert_name = lookup_or(&alert.labels, "alertname", DEFAULT_ALERT_NAME).to_string();
        let message = transform_alert(alert);

        let result = notifier.send(&message).await;
        match &result {
            Ok(status) => {
                info!(alert = %alert_name, status = *status, "Forwarded alert to Gotify");
            }
            Err(e) => {
                error!(alert = %alert_name, error = %e, "Failed to forward alert to Gotify");
            }
        }
        metrics::record_notification(result.is_ok());

        outcomes.push(DeliveryOutcome { alert_name, result });
    }

    outcomes
}
