use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Instant;

use crate::appraisal::{appraise, AppraisalInput, AppraisalOutput};
use crate::error::CapBudgetError;
use crate::types::{
    with_metadata, Alternative, ComputationOutput, Money, PaybackPeriod, Preference, Rate,
};
use crate::CapBudgetResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for a two-alternative comparison. Both sides are appraised at the
/// same discount rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonInput {
    /// Cash flows of alternative A, one per period
    pub alternative_a: Vec<Money>,
    /// Cash flows of alternative B, one per period
    pub alternative_b: Vec<Money>,
    /// Minimum acceptable rate of return shared by both alternatives
    pub discount_rate: Rate,
    /// Display label for alternative A (defaults to "A")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_a: Option<String>,
    /// Display label for alternative B (defaults to "B")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_b: Option<String>,
}

/// Side-by-side appraisals with per-metric preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonOutput {
    pub label_a: String,
    pub label_b: String,
    /// Full appraisal of alternative A
    pub alternative_a: AppraisalOutput,
    /// Full appraisal of alternative B
    pub alternative_b: AppraisalOutput,
    /// Side with the strictly greater NPV
    pub npv_preference: Preference,
    /// Side with the strictly greater IRR; Undefined when either side has
    /// no IRR
    pub irr_preference: Preference,
    /// Side with the strictly shorter discounted payback; a finite payback
    /// beats Never, and two Nevers are indistinguishable
    pub payback_preference: Preference,
    /// The side preferred by every metric, when one exists
    pub dominant: Option<Alternative>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compare two cash-flow alternatives metric by metric.
///
/// Each side is appraised independently; warnings raised inside a side are
/// folded into the comparison's warnings under that side's label. A metric
/// missing on either side makes that metric's preference `Undefined` and
/// blocks dominance, but never fails the comparison.
pub fn compare_alternatives(
    input: &ComparisonInput,
) -> CapBudgetResult<ComputationOutput<ComparisonOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    // --- Validate ---
    validate_comparison_input(input)?;

    let label_a = input.label_a.clone().unwrap_or_else(|| "A".to_string());
    let label_b = input.label_b.clone().unwrap_or_else(|| "B".to_string());

    // --- Appraise both sides ---
    let a = appraise_side(
        &input.alternative_a,
        input.discount_rate,
        &label_a,
        &mut warnings,
    )?;
    let b = appraise_side(
        &input.alternative_b,
        input.discount_rate,
        &label_b,
        &mut warnings,
    )?;

    // --- Per-metric preferences ---
    let npv_preference = prefer_larger(a.npv, b.npv);
    let irr_preference = match (a.irr, b.irr) {
        (Some(ra), Some(rb)) => prefer_larger(ra, rb),
        _ => Preference::Undefined,
    };
    let payback_preference = prefer_shorter(&a.discounted_payback, &b.discounted_payback);

    // --- Dominance ---
    let dominant = match (npv_preference, irr_preference, payback_preference) {
        (Preference::A, Preference::A, Preference::A) => Some(Alternative::A),
        (Preference::B, Preference::B, Preference::B) => Some(Alternative::B),
        _ => None,
    };

    match (npv_preference, payback_preference) {
        (Preference::A, Preference::B) => warnings.push(format!(
            "NPV favours {label_a} while payback favours {label_b}; no alternative dominates"
        )),
        (Preference::B, Preference::A) => warnings.push(format!(
            "NPV favours {label_b} while payback favours {label_a}; no alternative dominates"
        )),
        _ => {}
    }

    let output = ComparisonOutput {
        label_a,
        label_b,
        alternative_a: a,
        alternative_b: b,
        npv_preference,
        irr_preference,
        payback_preference,
        dominant,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Two-alternative comparison: NPV, IRR, discounted payback",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_comparison_input(input: &ComparisonInput) -> CapBudgetResult<()> {
    if input.alternative_a.is_empty() {
        return Err(CapBudgetError::InvalidInput {
            field: "alternative_a".into(),
            reason: "At least one cash flow is required".into(),
        });
    }
    if input.alternative_b.is_empty() {
        return Err(CapBudgetError::InvalidInput {
            field: "alternative_b".into(),
            reason: "At least one cash flow is required".into(),
        });
    }
    if input.discount_rate <= dec!(-1) {
        return Err(CapBudgetError::InvalidInput {
            field: "discount_rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }
    Ok(())
}

fn appraise_side(
    cash_flows: &[Money],
    discount_rate: Rate,
    label: &str,
    warnings: &mut Vec<String>,
) -> CapBudgetResult<AppraisalOutput> {
    let sub = appraise(&AppraisalInput {
        cash_flows: cash_flows.to_vec(),
        discount_rate,
        label: Some(label.to_string()),
    })?;
    for w in &sub.warnings {
        warnings.push(format!("[{label}] {w}"));
    }
    Ok(sub.result)
}

fn prefer_larger(a: Decimal, b: Decimal) -> Preference {
    match a.cmp(&b) {
        Ordering::Greater => Preference::A,
        Ordering::Less => Preference::B,
        Ordering::Equal => Preference::Tie,
    }
}

fn prefer_shorter(a: &Option<PaybackPeriod>, b: &Option<PaybackPeriod>) -> Preference {
    match (a, b) {
        (None, _) | (_, None) => Preference::Undefined,
        (Some(PaybackPeriod::Never), Some(PaybackPeriod::Never)) => Preference::Undefined,
        (Some(PaybackPeriod::Never), Some(_)) => Preference::B,
        (Some(_), Some(PaybackPeriod::Never)) => Preference::A,
        (Some(pa), Some(pb)) => {
            // Never is excluded above, so both sides are finite
            let pa = pa.as_periods().unwrap_or(Decimal::ZERO);
            let pb = pb.as_periods().unwrap_or(Decimal::ZERO);
            match pa.cmp(&pb) {
                Ordering::Less => Preference::A,
                Ordering::Greater => Preference::B,
                Ordering::Equal => Preference::Tie,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
