//! Display wrappers for operation outcomes and engine reports.

use std::fmt;

use crate::{
    engine::{PollReport, SweepReport},
    models::Plan,
};

/// A plan together with what just happened to it.
pub struct OperationResult<'a> {
    pub verb: &'static str,
    pub plan: &'a Plan,
}

impl<'a> OperationResult<'a> {
    pub fn created(plan: &'a Plan) -> Self {
        Self {
            verb: "Created",
            plan,
        }
    }

    pub fn acknowledged(plan: &'a Plan) -> Self {
        Self {
            verb: "Acknowledged",
            plan,
        }
    }

    pub fn ticked(plan: &'a Plan) -> Self {
        Self {
            verb: "Ticked",
            plan,
        }
    }
}

impl fmt::Display for OperationResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} plan {}", self.verb, self.plan.id)?;
        writeln!(f)?;
        write!(f, "{}", self.plan)
    }
}

fn write_ids(f: &mut fmt::Formatter<'_>, heading: &str, ids: &[String]) -> fmt::Result {
    if ids.is_empty() {
        return Ok(());
    }
    writeln!(f, "\n## {heading}")?;
    writeln!(f)?;
    for id in ids {
        writeln!(f, "- {id}")?;
    }
    Ok(())
}

impl fmt::Display for PollReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Poll")?;
        if self.is_empty() {
            writeln!(f, "\nNothing was due.")?;
            return Ok(());
        }
        write_ids(f, "Processed", &self.processed)?;
        write_ids(f, "Missing", &self.missing)?;
        write_ids(f, "Failed", &self.failed)
    }
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Sweep")?;
        writeln!(f)?;
        writeln!(f, "- Scanned: {}", self.scanned)?;
        writeln!(f, "- Anchored: {}", self.anchored)?;
        writeln!(f, "- Broadcast: {}", self.broadcast)?;
        writeln!(f, "- Receipts: {}", self.receipts)?;
        write_ids(f, "Failed", &self.failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_poll() {
        assert!(PollReport::default().to_string().contains("Nothing was due."));
    }

    #[test]
    fn test_poll_sections() {
        let report = PollReport {
            processed: vec!["a".into()],
            missing: vec![],
            failed: vec!["b".into()],
        };
        let output = report.to_string();
        assert!(output.contains("## Processed\n\n- a"));
        assert!(output.contains("## Failed\n\n- b"));
        assert!(!output.contains("## Missing"));
    }

    #[test]
    fn test_sweep_counts() {
        let report = SweepReport {
            scanned: 3,
            anchored: 1,
            broadcast: 2,
            receipts: 3,
            failed: vec![],
        };
        let output = report.to_string();
        assert!(output.contains("- Scanned: 3"));
        assert!(output.contains("- Broadcast: 2"));
        assert!(!output.contains("## Failed"));
    }
}
