//! Data models for plans and their phases.
//!
//! A [`Plan`] moves through the fixed [`Stage`] order, accumulating
//! side-effect artifacts in its [`Payload`]. [`Event`] is the record published
//! on the event bus and [`Scope`] is the aggregate report over all plans.
//!
//! Display implementations live in [`crate::display`].
//!
//! # Examples
//!
//! ```rust
//! use keel_core::models::{Payload, Plan, Stage};
//!
//! let mut plan = Plan::new("p1", "t1", None, Payload::default());
//! assert_eq!(plan.stage, Stage::Phrase);
//!
//! assert!(plan.advance());
//! assert_eq!(plan.stage, Stage::Seal);
//! ```

pub mod event;
pub mod payload;
pub mod plan;
pub mod scope;
pub mod stage;

#[cfg(test)]
mod tests;

pub use event::Event;
pub use payload::{AnchorOutcome, Payload, Receipt, DIGEST_KEY};
pub use plan::Plan;
pub use scope::Scope;
pub use stage::Stage;
