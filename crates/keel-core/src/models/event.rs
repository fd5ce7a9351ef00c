//! Observability event record.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An ephemeral `{topic, data}` record published on the event bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub topic: String,
    pub data: Value,
    pub at: Timestamp,
}

impl Event {
    pub fn new(topic: impl Into<String>, data: Value) -> Self {
        Self {
            topic: topic.into(),
            data,
            at: Timestamp::now(),
        }
    }
}
