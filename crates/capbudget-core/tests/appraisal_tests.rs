use capbudget_core::appraisal::{appraise, AppraisalInput};
use capbudget_core::time_value;
use capbudget_core::types::PaybackPeriod;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn level_flows() -> AppraisalInput {
    // -200 then four inflows of 100, appraised at 10%
    AppraisalInput {
        cash_flows: vec![dec!(-200), dec!(100), dec!(100), dec!(100), dec!(100)],
        discount_rate: dec!(0.10),
        label: None,
    }
}

fn back_loaded_flows() -> AppraisalInput {
    // -200 then 50, 50, 50 and a 1000 balloon, appraised at 10%
    AppraisalInput {
        cash_flows: vec![dec!(-200), dec!(50), dec!(50), dec!(50), dec!(1000)],
        discount_rate: dec!(0.10),
        label: None,
    }
}

// ===========================================================================
// NPV and discounting schedule — known answers
// ===========================================================================

#[test]
fn test_npv_level_flows_known_answer() {
    let result = appraise(&level_flows()).unwrap();
    let npv = result.result.npv;
    // -200 + 100/1.1 + 100/1.21 + 100/1.331 + 100/1.4641 = 116.98654463...
    assert!(
        (npv - dec!(116.98654463)).abs() < dec!(0.00000001),
        "Expected NPV ~116.9865, got {}",
        npv
    );
}

#[test]
fn test_npv_back_loaded_known_answer() {
    let result = appraise(&back_loaded_flows()).unwrap();
    let npv = result.result.npv;
    // -200 + 50/1.1 + 50/1.21 + 50/1.331 + 1000/1.4641 = 607.35605491...
    assert!(
        (npv - dec!(607.35605491)).abs() < dec!(0.00000001),
        "Expected NPV ~607.3561, got {}",
        npv
    );
}

#[test]
fn test_npv_equals_final_cumulative_row() {
    let result = appraise(&back_loaded_flows()).unwrap();
    let out = &result.result;
    assert_eq!(
        out.schedule.last().unwrap().cumulative_discounted,
        out.npv,
        "schedule must reconcile to the NPV"
    );
}

#[test]
fn test_zero_rate_npv_is_plain_sum() {
    let input = AppraisalInput {
        cash_flows: vec![dec!(-200), dec!(50), dec!(50), dec!(50), dec!(1000)],
        discount_rate: dec!(0),
        label: None,
    };
    let result = appraise(&input).unwrap();
    let out = &result.result;

    assert_eq!(out.npv, dec!(950));
    for row in &out.schedule {
        assert_eq!(row.discount_factor, Decimal::ONE);
        assert_eq!(row.discounted, row.cash_flow);
    }
}

// ===========================================================================
// IRR
// ===========================================================================

#[test]
fn test_irr_known_answers() {
    let level = appraise(&level_flows()).unwrap().result.irr.unwrap();
    assert!(
        (level - dec!(0.3490)).abs() < dec!(0.001),
        "Expected IRR ~34.9%, got {}",
        level
    );

    let back_loaded = appraise(&back_loaded_flows()).unwrap().result.irr.unwrap();
    assert!(
        (back_loaded - dec!(0.6368)).abs() < dec!(0.001),
        "Expected IRR ~63.7%, got {}",
        back_loaded
    );
}

#[test]
fn test_irr_is_a_root_of_npv() {
    for flows in [
        vec![dec!(-200), dec!(100), dec!(100), dec!(100), dec!(100)],
        vec![dec!(-200), dec!(50), dec!(50), dec!(50), dec!(1000)],
        vec![dec!(-1000), dec!(400), dec!(400), dec!(400)],
    ] {
        let input = AppraisalInput {
            cash_flows: flows.clone(),
            discount_rate: dec!(0.10),
            label: None,
        };
        let irr = appraise(&input).unwrap().result.irr.unwrap();
        let residual = time_value::npv(irr, &flows).unwrap();
        assert!(
            residual.abs() < dec!(0.00001),
            "NPV at the IRR should vanish, got {} for {:?}",
            residual,
            flows
        );
    }
}

#[test]
fn test_irr_below_zero_when_inflows_lag_outlay() {
    // -100 then a lone 50: the root is exactly -50%
    let input = AppraisalInput {
        cash_flows: vec![dec!(-100), dec!(50)],
        discount_rate: dec!(0.10),
        label: None,
    };
    let irr = appraise(&input).unwrap().result.irr.unwrap();
    assert!((irr - dec!(-0.5)).abs() < dec!(0.000001));
}

#[test]
fn test_irr_absent_without_sign_change() {
    let input = AppraisalInput {
        cash_flows: vec![dec!(100), dec!(100), dec!(100)],
        discount_rate: dec!(0.10),
        label: None,
    };
    let result = appraise(&input).unwrap();
    assert!(result.result.irr.is_none());
    assert!(
        result
            .warnings
            .iter()
            .any(|w| w.contains("IRR calculation warning")),
        "missing IRR must be explained in warnings: {:?}",
        result.warnings
    );
}

// ===========================================================================
// Payback
// ===========================================================================

#[test]
fn test_discounted_payback_known_answers() {
    let level = appraise(&level_flows()).unwrap().result;
    match level.discounted_payback.unwrap() {
        // 2 + 26.4463/75.1315 = 2.352
        PaybackPeriod::After(p) => assert!(
            (p - dec!(2.352)).abs() < dec!(0.0001),
            "Expected ~2.352 periods, got {}",
            p
        ),
        other => panic!("expected After, got {other:?}"),
    }

    let back_loaded = appraise(&back_loaded_flows()).unwrap().result;
    match back_loaded.discounted_payback.unwrap() {
        // 3 + 75.6574/683.0135 = 3.1108
        PaybackPeriod::After(p) => assert!(
            (p - dec!(3.1108)).abs() < dec!(0.0001),
            "Expected ~3.111 periods, got {}",
            p
        ),
        other => panic!("expected After, got {other:?}"),
    }
}

#[test]
fn test_simple_payback_ignores_the_rate() {
    let level = appraise(&level_flows()).unwrap().result;
    // Undiscounted cumulative hits zero exactly at period 2
    assert_eq!(level.simple_payback.unwrap(), PaybackPeriod::After(dec!(2)));

    let back_loaded = appraise(&back_loaded_flows()).unwrap().result;
    // 3 + 50/1000 = 3.05
    assert_eq!(
        back_loaded.simple_payback.unwrap(),
        PaybackPeriod::After(dec!(3.05))
    );
}

#[test]
fn test_discounting_defers_payback() {
    let out = appraise(&level_flows()).unwrap().result;
    let simple = out.simple_payback.unwrap().as_periods().unwrap();
    let discounted = out.discounted_payback.unwrap().as_periods().unwrap();
    assert!(
        discounted > simple,
        "discounting can only push payback out: {} vs {}",
        discounted,
        simple
    );
}

#[test]
fn test_payback_never_when_horizon_too_short() {
    let input = AppraisalInput {
        cash_flows: vec![dec!(-1000), dec!(10), dec!(10), dec!(10)],
        discount_rate: dec!(0.10),
        label: None,
    };
    let out = appraise(&input).unwrap().result;
    assert_eq!(out.discounted_payback.unwrap(), PaybackPeriod::Never);
    assert_eq!(out.simple_payback.unwrap(), PaybackPeriod::Never);
}

#[test]
fn test_payback_immediate_without_outlay() {
    let input = AppraisalInput {
        cash_flows: vec![dec!(100), dec!(100), dec!(100)],
        discount_rate: dec!(0.10),
        label: None,
    };
    let out = appraise(&input).unwrap().result;
    assert_eq!(out.discounted_payback.unwrap(), PaybackPeriod::Immediate);
    assert_eq!(out.simple_payback.unwrap(), PaybackPeriod::Immediate);
}

// ===========================================================================
// Envelope
// ===========================================================================

#[test]
fn test_clean_input_has_no_warnings() {
    let result = appraise(&level_flows()).unwrap();
    assert_eq!(result.warnings, Vec::<String>::new());
}

#[test]
fn test_envelope_metadata() {
    let result = appraise(&level_flows()).unwrap();
    assert_eq!(
        result.methodology,
        "Capital budgeting appraisal: NPV, IRR, discounted payback"
    );
    assert_eq!(result.metadata.precision, "rust_decimal_128bit");
    assert_eq!(result.metadata.version, env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_assumptions_echo_the_input() {
    let result = appraise(&level_flows()).unwrap();
    // Decimals serialise as strings
    assert_eq!(
        result.assumptions["discount_rate"].as_str(),
        Some("0.10")
    );
    assert_eq!(
        result.assumptions["cash_flows"][0].as_str(),
        Some("-200")
    );
    // Unset label is skipped entirely
    assert!(result.assumptions.get("label").is_none());
}
