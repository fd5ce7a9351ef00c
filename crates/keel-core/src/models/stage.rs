//! The fixed, ordered phase enumeration.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Phase of a plan. Declaration order is workflow order, so the derived
/// `Ord` is the advance order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Stage {
    /// Reserved first phase; no action is bound to it
    Establish,

    /// Assigns the session/correlation pointer
    Phrase,

    /// Digests the canonical payload
    Seal,

    /// Derives the content address from the digest
    Sync,

    /// Anchors the digest in the transparency log
    Confirm,

    /// Broadcasts the plan to webhook targets
    Send,

    /// Terminal; waits for an external acknowledgement
    Verify,
}

impl Stage {
    /// All stages in advance order.
    pub const ALL: [Stage; 7] = [
        Stage::Establish,
        Stage::Phrase,
        Stage::Seal,
        Stage::Sync,
        Stage::Confirm,
        Stage::Send,
        Stage::Verify,
    ];

    /// Stage new plans are created at.
    pub const INITIAL: Stage = Stage::Phrase;

    /// Position of this stage in [`Stage::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// The stage one step after this one, or `None` at the terminal stage.
    pub fn next(self) -> Option<Stage> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    /// Whether an action is bound to this stage. The reserved first stage
    /// and the terminal stage have none.
    pub fn has_action(self) -> bool {
        !matches!(self, Stage::Establish | Stage::Verify)
    }

    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Establish => "ESTABLISH",
            Stage::Phrase => "PHRASE",
            Stage::Seal => "SEAL",
            Stage::Sync => "SYNC",
            Stage::Confirm => "CONFIRM",
            Stage::Send => "SEND",
            Stage::Verify => "VERIFY",
        }
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Invalid stage: {s}"))
    }
}
