//! Plan model definition and related functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{Payload, Stage};

/// A unit of work tracked through the fixed phase sequence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    /// Unique, immutable identifier
    pub id: String,

    /// Grouping identifier of the originating conversation
    pub thread: String,

    /// Current phase
    pub stage: Stage,

    /// Session/correlation pointer, assigned once
    #[serde(default)]
    pub scp: Option<String>,

    /// Side-effect artifacts and ingress data
    #[serde(default)]
    pub payload: Payload,

    /// Timestamp when the plan was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the plan was last persisted (UTC)
    pub updated_at: Timestamp,
}

impl Plan {
    /// Creates a plan at the initial stage.
    pub fn new(
        id: impl Into<String>,
        thread: impl Into<String>,
        scp: Option<String>,
        payload: Payload,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: id.into(),
            thread: thread.into(),
            stage: Stage::INITIAL,
            scp,
            payload,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves one step forward. Returns `false` at the terminal stage.
    pub fn advance(&mut self) -> bool {
        match self.stage.next() {
            Some(next) => {
                self.stage = next;
                true
            }
            None => false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.stage.is_terminal()
    }
}
