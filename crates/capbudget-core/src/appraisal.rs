use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::CapBudgetError;
use crate::time_value;
use crate::types::{with_metadata, ComputationOutput, Money, PaybackPeriod, PeriodFlow, Rate};
use crate::CapBudgetResult;

/// Starting guess handed to the IRR solver
const DEFAULT_IRR_GUESS: Decimal = dec!(0.10);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for a single-alternative appraisal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppraisalInput {
    /// Cash flow per period (index 0 = initial flow, conventionally the
    /// outlay and negative)
    pub cash_flows: Vec<Money>,
    /// Minimum acceptable rate of return as a decimal (0.10 = 10%)
    pub discount_rate: Rate,
    /// Display label for this alternative
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Appraisal metrics for one alternative
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppraisalOutput {
    /// Net present value at the given discount rate
    pub npv: Money,
    /// Internal rate of return; None when no real root exists or the solver
    /// fails to converge
    pub irr: Option<Rate>,
    /// Payback period with discounting at the given rate
    pub discounted_payback: Option<PaybackPeriod>,
    /// Payback period without discounting, for reference
    pub simple_payback: Option<PaybackPeriod>,
    /// Per-period discounting schedule
    pub schedule: Vec<PeriodFlow>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Appraise a single cash-flow series: NPV, IRR, discounted and simple
/// payback at the series' discount rate.
///
/// A metric that cannot be produced for this series (no IRR root, solver
/// non-convergence, degenerate payback boundary) comes back as `None` with
/// a warning; it does not fail the remaining metrics.
pub fn appraise(input: &AppraisalInput) -> CapBudgetResult<ComputationOutput<AppraisalOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    // --- Validate ---
    validate_appraisal_input(input)?;

    if input.discount_rate >= Decimal::ONE {
        warnings.push(format!(
            "Discount rate {} is 100% or more; rates are decimals (0.10 = 10%), not percentages",
            input.discount_rate
        ));
    }
    if input.cash_flows[0] > Decimal::ZERO {
        warnings.push(
            "Period 0 cash flow is positive; the initial period conventionally carries the outlay"
                .into(),
        );
    }

    // --- Discounting schedule and NPV ---
    let schedule = build_schedule(input.discount_rate, &input.cash_flows)?;
    let npv = time_value::npv(input.discount_rate, &input.cash_flows)?;

    // --- IRR ---
    let irr = match time_value::irr(&input.cash_flows, DEFAULT_IRR_GUESS) {
        Ok(r) => Some(r),
        Err(e) => {
            warnings.push(format!("IRR calculation warning: {e}"));
            None
        }
    };

    // --- Payback, discounted and simple ---
    let discounted_payback =
        match time_value::discounted_payback(input.discount_rate, &input.cash_flows) {
            Ok(p) => Some(p),
            Err(e) => {
                warnings.push(format!("Discounted payback warning: {e}"));
                None
            }
        };
    let simple_payback = match time_value::discounted_payback(Decimal::ZERO, &input.cash_flows) {
        Ok(p) => Some(p),
        Err(e) => {
            warnings.push(format!("Simple payback warning: {e}"));
            None
        }
    };

    let output = AppraisalOutput {
        npv,
        irr,
        discounted_payback,
        simple_payback,
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Capital budgeting appraisal: NPV, IRR, discounted payback",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_appraisal_input(input: &AppraisalInput) -> CapBudgetResult<()> {
    if input.cash_flows.is_empty() {
        return Err(CapBudgetError::InvalidInput {
            field: "cash_flows".into(),
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

fn build_schedule(rate: Rate, cash_flows: &[Money]) -> CapBudgetResult<Vec<PeriodFlow>> {
    let one_plus_r = Decimal::ONE + rate;
    let mut growth = Decimal::ONE;
    let mut cumulative = Decimal::ZERO;
    let mut schedule = Vec::with_capacity(cash_flows.len());

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            growth *= one_plus_r;
        }
        if growth.is_zero() {
            return Err(CapBudgetError::DivisionByZero {
                context: format!("schedule discount factor at period {t}"),
            });
        }
        let discounted = cf / growth;
        cumulative += discounted;
        schedule.push(PeriodFlow {
            period: t as u32,
            cash_flow: *cf,
            discount_factor: Decimal::ONE / growth,
            discounted,
            cumulative_discounted: cumulative,
        });
    }

    Ok(schedule)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
