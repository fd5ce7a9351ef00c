//! Plan payload: typed side-effect artifacts plus an open extension map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// Key under which the digest is stored. The digest never covers itself.
pub const DIGEST_KEY: &str = "sha256";

/// Artifacts accumulated as a plan moves through its phases.
///
/// Known keys are typed fields; anything else the ingress supplied lands in
/// `extra`. Phase actions only ever fill fields in, they never clear them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Payload {
    /// Hex SHA-256 digest of the canonical payload, written by SEAL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,

    /// Content address derived from the digest, written by SYNC
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,

    /// Transparency log outcome, written by CONFIRM or the sweep
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rekor: Option<AnchorOutcome>,

    /// Whether the webhook broadcast was delivered, written by SEND
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent: Option<bool>,

    /// Acknowledgement marker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipts: Option<Receipt>,

    /// Ingress-supplied data
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Payload {
    /// Creates a payload seeded with ingress data under the `event` key.
    pub fn seeded(seed: Option<Value>) -> Self {
        let mut payload = Self::default();
        if let Some(seed) = seed {
            payload.extra.insert("event".to_string(), seed);
        }
        payload
    }

    /// Serializes the payload with every object's keys in sorted order and
    /// the digest field removed, so the bytes only change when content does.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut value {
            map.remove(DIGEST_KEY);
        }
        Ok(serde_json::to_vec(&sorted(value))?)
    }

    /// True once the broadcast has been confirmed delivered.
    pub fn is_sent(&self) -> bool {
        self.sent == Some(true)
    }

    /// True once the digest has been recorded in the transparency log. A
    /// recorded skip does not count.
    pub fn is_anchored(&self) -> bool {
        self.rekor.as_ref().is_some_and(AnchorOutcome::is_anchored)
    }
}

fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, sorted(v))).collect();
            Value::Object(ordered.into_iter().collect::<Map<String, Value>>())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}

/// Result of handing a digest to the transparency log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AnchorOutcome {
    /// The entry was integrated into the log
    Anchored {
        uuid: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        log_index: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        integrated_time: Option<i64>,
    },
    /// Anchoring was not attempted
    Skipped {
        reason: String,
        #[serde(default)]
        simulate: bool,
    },
}

impl AnchorOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
            simulate: false,
        }
    }

    pub fn is_anchored(&self) -> bool {
        matches!(self, Self::Anchored { .. })
    }
}

/// Acknowledgement marker on a plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Receipt {
    /// Set by the reconciliation sweep when no acknowledgement arrived
    Provisional,

    /// Set by an explicit acknowledgement
    Acknowledged,
}

impl Receipt {
    pub fn as_str(&self) -> &'static str {
        match self {
            Receipt::Provisional => "provisional",
            Receipt::Acknowledged => "acknowledged",
        }
    }
}
