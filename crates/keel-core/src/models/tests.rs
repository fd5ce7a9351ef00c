#[cfg(test)]
mod model_tests {
    use jiff::Timestamp;
    use serde_json::json;

    use crate::models::{AnchorOutcome, Payload, Plan, Receipt, Scope, Stage};

    fn create_test_plan(stage: Stage) -> Plan {
        Plan {
            id: "plan-1".to_string(),
            thread: "th_demo".to_string(),
            stage,
            scp: Some("SCP:th_demo".to_string()),
            payload: Payload::seeded(Some(json!({"role": "user", "created": 0}))),
            created_at: Timestamp::from_second(1640995200).unwrap(), // 2022-01-01 00:00:00 UTC
            updated_at: Timestamp::from_second(1641081600).unwrap(), // 2022-01-02 00:00:00 UTC
        }
    }

    #[test]
    fn test_stage_order_is_fixed() {
        let names: Vec<&str> = Stage::ALL.iter().map(Stage::as_str).collect();
        assert_eq!(
            names,
            ["ESTABLISH", "PHRASE", "SEAL", "SYNC", "CONFIRM", "SEND", "VERIFY"]
        );
        for pair in Stage::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].next(), Some(pair[1]));
        }
    }

    #[test]
    fn test_only_verify_is_terminal() {
        for stage in Stage::ALL {
            assert_eq!(stage.is_terminal(), stage == Stage::Verify);
        }
        assert_eq!(Stage::Verify.next(), None);
    }

    #[test]
    fn test_stage_from_str() {
        assert_eq!("seal".parse::<Stage>().unwrap(), Stage::Seal);
        assert_eq!("VERIFY".parse::<Stage>().unwrap(), Stage::Verify);
        assert_eq!(" Send ".parse::<Stage>().unwrap(), Stage::Send);
        assert!("DONE".parse::<Stage>().is_err());
    }

    #[test]
    fn test_stage_serializes_uppercase() {
        assert_eq!(serde_json::to_value(Stage::Confirm).unwrap(), json!("CONFIRM"));
    }

    #[test]
    fn test_advance_moves_one_step_and_stops_at_terminal() {
        let mut plan = create_test_plan(Stage::Phrase);
        let mut seen = vec![plan.stage];
        while plan.advance() {
            seen.push(plan.stage);
        }
        assert_eq!(seen, Stage::ALL[1..].to_vec());
        assert!(!plan.advance());
        assert_eq!(plan.stage, Stage::Verify);
    }

    #[test]
    fn test_canonical_bytes_sort_keys_and_skip_digest() {
        let mut payload = Payload::default();
        payload.extra.insert("zeta".into(), json!({"b": 2, "a": 1}));
        payload.extra.insert("alpha".into(), json!(true));

        let before = payload.canonical_bytes().unwrap();
        assert_eq!(
            String::from_utf8(before.clone()).unwrap(),
            r#"{"alpha":true,"zeta":{"a":1,"b":2}}"#
        );

        payload.sha256 = Some("ab".repeat(32));
        assert_eq!(payload.canonical_bytes().unwrap(), before);
    }

    #[test]
    fn test_payload_keeps_unknown_keys() {
        let raw = json!({
            "sha256": "00",
            "sent": true,
            "receipts": "provisional",
            "rekor": {"status": "skipped", "reason": "no key", "simulate": false},
            "event": {"id": "evt_1"}
        });
        let payload: Payload = serde_json::from_value(raw).unwrap();
        assert_eq!(payload.sha256.as_deref(), Some("00"));
        assert!(payload.is_sent());
        assert_eq!(payload.receipts, Some(Receipt::Provisional));
        assert_eq!(payload.rekor, Some(AnchorOutcome::skipped("no key")));
        assert_eq!(payload.extra.get("event"), Some(&json!({"id": "evt_1"})));
    }

    #[test]
    fn test_anchored_outcome_round_trip_shape() {
        let outcome = AnchorOutcome::Anchored {
            uuid: "24296fb2".into(),
            log_index: Some(42),
            integrated_time: Some(1_700_000_000),
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], json!("anchored"));
        assert_eq!(value["log_index"], json!(42));
        assert!(outcome.is_anchored());
        assert!(!AnchorOutcome::skipped("x").is_anchored());
    }

    #[test]
    fn test_skipped_anchor_is_not_anchored_payload() {
        let mut payload = Payload::default();
        assert!(!payload.is_anchored());

        payload.rekor = Some(AnchorOutcome::skipped("no signature/public key configured"));
        assert!(!payload.is_anchored());

        payload.rekor = Some(AnchorOutcome::Anchored {
            uuid: "u1".into(),
            log_index: None,
            integrated_time: None,
        });
        assert!(payload.is_anchored());
    }

    #[test]
    fn test_acknowledged_outranks_provisional() {
        assert!(Receipt::Acknowledged > Receipt::Provisional);
    }

    #[test]
    fn test_scope_counts_by_stage() {
        let mut a = create_test_plan(Stage::Seal);
        a.id = "b".into();
        let mut b = create_test_plan(Stage::Verify);
        b.id = "c".into();
        let mut c = create_test_plan(Stage::Seal);
        c.id = "a".into();

        let scope = Scope::from_plans([&a, &b, &c]);
        assert_eq!(scope.total, 3);
        assert_eq!(scope.by_stage.get(&Stage::Seal), Some(&2));
        assert_eq!(scope.by_stage.get(&Stage::Verify), Some(&1));
        assert_eq!(scope.unfinished, vec!["a".to_string(), "b".to_string()]);
    }
}
