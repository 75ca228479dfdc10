pub mod alertmanager;

pub use alertmanager::{decode, AlertManagerAlert, AlertManagerWebhook, ZERO_TIMESTAMP};
