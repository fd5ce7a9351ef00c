//! Narrow interfaces to the side-effect services the phase actions call.
//!
//! The engine only sees these traits. Default implementations:
//!
//! - [`Sha256Hasher`] digests canonical payload bytes
//! - [`LocalPinner`] derives a content address without a pinning service
//! - [`RekorCliAnchor`] anchors through the `rekor-cli` binary, or records a
//!   skip when signing material is not configured
//! - [`HttpWebhook`] POSTs the plan to every configured URL
//! - [`LogTelemetry`] writes the plan position to the log

use async_trait::async_trait;
use log::debug;

use crate::{
    error::Result,
    models::{AnchorOutcome, Plan},
};

pub mod rekor;
pub mod sealing;
pub mod webhook;

pub use rekor::{AnchorConfig, RekorCliAnchor};
pub use sealing::{LocalPinner, Sha256Hasher};
pub use webhook::HttpWebhook;

/// Deterministic fixed-length digest over canonical bytes.
pub trait Hasher: Send + Sync {
    /// Lowercase hex digest; identical input yields identical output.
    fn digest(&self, bytes: &[u8]) -> String;
}

/// Content-addressed storage.
#[async_trait]
pub trait Pinner: Send + Sync {
    async fn pin(&self, digest: &str) -> Result<String>;
}

/// What the anchoring collaborator needs for one plan.
#[derive(Debug, Clone, Copy)]
pub struct AnchorRequest<'a> {
    pub plan_id: &'a str,
    pub digest: &'a str,
    /// The canonical payload bytes the signature covers
    pub blob: &'a [u8],
}

/// Transparency-log anchoring.
///
/// Missing configuration is an `Ok(AnchorOutcome::Skipped { .. })`, never an
/// error; `Err` is reserved for a call that was attempted and failed.
#[async_trait]
pub trait Anchor: Send + Sync {
    async fn anchor(&self, request: AnchorRequest<'_>) -> Result<AnchorOutcome>;
}

/// Best-effort broadcast of a plan to external listeners.
#[async_trait]
pub trait Webhook: Send + Sync {
    /// Returns whether every target accepted the delivery.
    async fn broadcast(&self, plan: &Plan) -> Result<bool>;
}

/// Dashboard publishing, called once per tick. Failures are ignored.
#[async_trait]
pub trait Telemetry: Send + Sync {
    async fn publish(&self, plan: &Plan) -> Result<()>;
}

/// Telemetry that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTelemetry;

#[async_trait]
impl Telemetry for LogTelemetry {
    async fn publish(&self, plan: &Plan) -> Result<()> {
        debug!(
            "plan {} on thread {} at {}",
            plan.id,
            plan.thread,
            plan.stage.as_str()
        );
        Ok(())
    }
}
