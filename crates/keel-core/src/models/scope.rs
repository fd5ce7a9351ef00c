//! Aggregate view over every persisted plan.

use std::collections::BTreeMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{Plan, Stage};

/// Totals of plans by stage plus the ids that have not reached the
/// terminal stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scope {
    pub total: usize,
    pub by_stage: BTreeMap<Stage, usize>,
    pub unfinished: Vec<String>,
    pub generated_at: Timestamp,
}

impl Scope {
    pub fn from_plans<'a>(plans: impl IntoIterator<Item = &'a Plan>) -> Self {
        let mut scope = Self {
            total: 0,
            by_stage: BTreeMap::new(),
            unfinished: Vec::new(),
            generated_at: Timestamp::now(),
        };
        for plan in plans {
            scope.total += 1;
            *scope.by_stage.entry(plan.stage).or_default() += 1;
            if !plan.is_terminal() {
                scope.unfinished.push(plan.id.clone());
            }
        }
        scope.unfinished.sort();
        scope
    }
}
