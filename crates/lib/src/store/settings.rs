use serde::{Deserialize, Serialize};

/// Tuning for a [`ConfigStore`](super::ConfigStore).
///
/// Every field has a default, so a partial JSON or YAML document is enough:
///
/// ```
/// # use keepsake::store::StoreSettings;
/// let settings = StoreSettings::from_yaml("workers: 4\n").unwrap();
/// assert_eq!(settings.workers, 4);
/// assert_eq!(settings.queue_capacity, 256);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Tasks running at once.
    pub workers: usize,
    /// Tasks waiting for a worker before new work runs on the caller.
    pub queue_capacity: usize,
    /// Events buffered per subscriber before the slowest one lags.
    pub event_capacity: usize,
    /// Collection name in the SQL document store.
    pub collection: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            workers: 2,
            queue_capacity: 256,
            event_capacity: 128,
            collection: crate::constants::DEFAULT_COLLECTION.to_string(),
        }
    }
}

impl StoreSettings {
    pub fn from_json(text: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_yaml(text: &str) -> crate::Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }
}
