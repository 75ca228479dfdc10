use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

/// Timestamp Alertmanager sends in `endsAt` while an alert is still firing.
pub const ZERO_TIMESTAMP: &str = "0001-01-01T00:00:00Z";

// AlertManager webhook payload structures. Fields the bridge does not read
// (receiver, groupLabels, externalURL, ...) are ignored on decode.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AlertManagerWebhook {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_alerts_as_default")]
    pub alerts: Vec<AlertManagerAlert>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AlertManagerAlert {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_values_as_empty")]
    pub labels: HashMap<String, String>,
    #[serde(default, deserialize_with = "null_values_as_empty")]
    pub annotations: HashMap<String, String>,
    // Kept as raw strings: an unparseable timestamp is shown verbatim
    // rather than failing the whole batch.
    #[serde(rename = "startsAt", default, deserialize_with = "null_as_default")]
    pub starts_at: String,
    #[serde(rename = "endsAt", default, deserialize_with = "null_as_default")]
    pub ends_at: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// `[null, {...}]` keeps its length; a null entry becomes an empty alert.
fn null_alerts_as_default<'de, D>(deserializer: D) -> std::result::Result<Vec<AlertManagerAlert>, D::Error>
where
    D: Deserializer<'de>,
{
    let alerts: Vec<Option<AlertManagerAlert>> = null_as_default(deserializer)?;
    Ok(alerts.into_iter().map(Option::unwrap_or_default).collect())
}

fn null_values_as_empty<'de, D>(deserializer: D) -> std::result::Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let map: HashMap<String, Option<String>> = null_as_default(deserializer)?;
    Ok(map
        .into_iter()
        .map(|(k, v)| (k, v.unwrap_or_default()))
        .collect())
}

/// Parses an inbound request body. Only the document's structure is checked;
/// missing or empty values are left for the transformer to default.
///
/// Decoding stops after the first JSON value, so anything trailing it is
/// ignored.
pub fn decode(body: &[u8]) -> Result<AlertManagerWebhook> {
    let mut deserializer = serde_json::Deserializer::from_slice(body);
    AlertManagerWebhook::deserialize(&mut deserializer).map_err(|e| Error::Decode(e.to_string()))
}
