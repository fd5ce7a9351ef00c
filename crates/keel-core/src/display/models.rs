//! Display implementations for domain models.

use std::fmt;

use super::LocalDateTime;
use crate::models::{AnchorOutcome, Plan, Receipt, Scope, Stage};

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AnchorOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorOutcome::Anchored {
                uuid,
                log_index,
                integrated_time,
            } => {
                write!(f, "anchored `{uuid}`")?;
                if let Some(index) = log_index {
                    write!(f, ", log index {index}")?;
                }
                if let Some(time) = integrated_time {
                    write!(f, ", integrated at {time}")?;
                }
                Ok(())
            }
            AnchorOutcome::Skipped { reason, simulate } => {
                write!(f, "skipped: {reason}")?;
                if *simulate {
                    write!(f, " (simulated)")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.id)?;
        writeln!(f)?;
        writeln!(f, "- Thread: {}", self.thread)?;
        writeln!(
            f,
            "- Stage: {} ({}/{})",
            self.stage,
            self.stage.index() + 1,
            Stage::ALL.len()
        )?;
        writeln!(f, "- SCP: {}", self.scp.as_deref().unwrap_or("unassigned"))?;
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;

        let payload = &self.payload;
        writeln!(f, "\n## Artifacts")?;
        writeln!(f)?;
        writeln!(f, "- sha256: {}", payload.sha256.as_deref().unwrap_or("pending"))?;
        writeln!(f, "- cid: {}", payload.cid.as_deref().unwrap_or("pending"))?;
        match &payload.rekor {
            Some(outcome) => writeln!(f, "- rekor: {outcome}")?,
            None => writeln!(f, "- rekor: pending")?,
        }
        let sent = match payload.sent {
            Some(true) => "yes",
            Some(false) => "not delivered",
            None => "pending",
        };
        writeln!(f, "- sent: {sent}")?;
        match payload.receipts {
            Some(receipt) => writeln!(f, "- receipts: {receipt}")?,
            None => writeln!(f, "- receipts: pending")?,
        }
        Ok(())
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Scope")?;
        writeln!(f)?;
        writeln!(f, "- Plans: {}", self.total)?;
        writeln!(f, "- Generated: {}", LocalDateTime(&self.generated_at))?;

        if self.total == 0 {
            writeln!(f, "\nNo plans found.")?;
            return Ok(());
        }

        writeln!(f, "\n## By stage")?;
        writeln!(f)?;
        for (stage, count) in &self.by_stage {
            writeln!(f, "- {stage}: {count}")?;
        }

        if !self.unfinished.is_empty() {
            writeln!(f, "\n## Unfinished")?;
            writeln!(f)?;
            for id in &self.unfinished {
                writeln!(f, "- {id}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::models::Payload;

    fn sample_plan() -> Plan {
        Plan {
            id: "evt_42".to_string(),
            thread: "th_demo".to_string(),
            stage: Stage::Send,
            scp: None,
            payload: Payload {
                sha256: Some("ab".repeat(32)),
                cid: Some("bafyabababababababab".to_string()),
                rekor: Some(AnchorOutcome::skipped("no key")),
                ..Payload::default()
            },
            created_at: Timestamp::from_second(1640995200).unwrap(),
            updated_at: Timestamp::from_second(1641081600).unwrap(),
        }
    }

    #[test]
    fn test_plan_card() {
        let output = sample_plan().to_string();
        assert!(output.starts_with("# evt_42\n"));
        assert!(output.contains("- Stage: SEND (6/7)"));
        assert!(output.contains("- SCP: unassigned"));
        assert!(output.contains("- rekor: skipped: no key"));
        assert!(output.contains("- sent: pending"));
        assert!(output.contains("- receipts: pending"));
    }

    #[test]
    fn test_anchored_outcome() {
        let outcome = AnchorOutcome::Anchored {
            uuid: "24296fb2".to_string(),
            log_index: Some(7),
            integrated_time: None,
        };
        assert_eq!(outcome.to_string(), "anchored `24296fb2`, log index 7");
    }

    #[test]
    fn test_empty_scope() {
        let scope = Scope::from_plans(&[]);
        assert!(scope.to_string().contains("No plans found."));
    }

    #[test]
    fn test_scope_lists_unfinished() {
        let plan = sample_plan();
        let output = Scope::from_plans([&plan]).to_string();
        assert!(output.contains("- SEND: 1"));
        assert!(output.contains("## Unfinished"));
        assert!(output.contains("- evt_42"));
    }
}
