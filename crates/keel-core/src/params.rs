//! Parameter types shared by the engine API and its front ends.
//!
//! These structs carry no framework attributes so the CLI (or any other
//! ingress) converts its own argument types into them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Thread used when the ingress does not name one.
pub const ANONYMOUS_THREAD: &str = "th_anon";

/// Parameters for creating a plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CreatePlan {
    /// Unique plan identifier
    pub id: String,
    /// Originating conversation; defaults to [`ANONYMOUS_THREAD`]
    pub thread: Option<String>,
    /// Caller-supplied correlation pointer; derived at PHRASE when absent
    pub scp: Option<String>,
    /// Inbound event data, stored under the payload's `event` key
    pub seed: Option<Value>,
}

/// Parameters addressing one plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Id {
    pub id: String,
}

impl From<&str> for Id {
    fn from(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}
