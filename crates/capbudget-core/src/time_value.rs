use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::CapBudgetError;
use crate::types::{Money, PaybackPeriod, Rate};
use crate::CapBudgetResult;

const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000001);
const MAX_IRR_ITERATIONS: u32 = 100;
const MAX_BISECTION_ITERATIONS: u32 = 100;

/// Rates probed when bracketing an NPV sign change for the bisection
/// fallback. Spans deeply negative rates up to 2000%.
const BRACKET_RATES: [Decimal; 16] = [
    dec!(-0.99),
    dec!(-0.9),
    dec!(-0.75),
    dec!(-0.5),
    dec!(-0.25),
    dec!(-0.1),
    dec!(0),
    dec!(0.05),
    dec!(0.1),
    dec!(0.25),
    dec!(0.5),
    dec!(1),
    dec!(2),
    dec!(5),
    dec!(10),
    dec!(20),
];

/// Net Present Value of a series of cash flows
pub fn npv(rate: Rate, cash_flows: &[Money]) -> CapBudgetResult<Money> {
    if rate <= dec!(-1) {
        return Err(CapBudgetError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount *= one_plus_r;
        }
        if discount.is_zero() {
            return Err(CapBudgetError::DivisionByZero {
                context: format!("NPV discount factor at period {t}"),
            });
        }
        result += cf / discount;
    }

    Ok(result)
}

/// Internal Rate of Return: the rate at which the series' NPV is zero.
///
/// Tries Newton-Raphson from `guess` first, then falls back to bisection
/// over a bracketed sign change. A series whose flows never change sign has
/// no real root and is rejected up front. A non-conventional series (more
/// than one sign change) can have several roots; whichever root the solver
/// reaches first is returned.
pub fn irr(cash_flows: &[Money], guess: Rate) -> CapBudgetResult<Rate> {
    if cash_flows.len() < 2 {
        return Err(CapBudgetError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }

    let has_inflow = cash_flows.iter().any(|cf| *cf > Decimal::ZERO);
    let has_outflow = cash_flows.iter().any(|cf| *cf < Decimal::ZERO);
    if !has_inflow || !has_outflow {
        return Err(CapBudgetError::FinancialImpossibility(
            "IRR requires at least one inflow and one outflow".into(),
        ));
    }

    match newton_irr(cash_flows, guess) {
        Ok(rate) => Ok(rate),
        Err(_) => bisect_irr(cash_flows),
    }
}

/// Discounted payback period at the given rate.
///
/// Discounts each flow to period 0 and accumulates. If the running total is
/// never negative there is nothing to recover (`Immediate`); if it is still
/// negative at the last period the outlay is never recovered (`Never`);
/// otherwise the crossover is interpolated linearly inside the first
/// non-negative period. A zero rate gives the plain undiscounted payback.
pub fn discounted_payback(rate: Rate, cash_flows: &[Money]) -> CapBudgetResult<PaybackPeriod> {
    if rate <= dec!(-1) {
        return Err(CapBudgetError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }
    if cash_flows.is_empty() {
        return Err(CapBudgetError::InsufficientData(
            "Payback requires at least 1 cash flow".into(),
        ));
    }

    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;
    let mut cumulative = Decimal::ZERO;
    let mut discounted = Vec::with_capacity(cash_flows.len());
    let mut cumulatives = Vec::with_capacity(cash_flows.len());

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount *= one_plus_r;
        }
        if discount.is_zero() {
            return Err(CapBudgetError::DivisionByZero {
                context: format!("payback discount factor at period {t}"),
            });
        }
        let dcf = cf / discount;
        cumulative += dcf;
        discounted.push(dcf);
        cumulatives.push(cumulative);
    }

    // Last period still carrying unrecovered outlay
    let t_star = match cumulatives.iter().rposition(|c| *c < Decimal::ZERO) {
        None => return Ok(PaybackPeriod::Immediate),
        Some(t) if t == cumulatives.len() - 1 => return Ok(PaybackPeriod::Never),
        Some(t) => t,
    };

    let crossover_flow = discounted[t_star + 1];
    if crossover_flow.is_zero() {
        return Err(CapBudgetError::DivisionByZero {
            context: format!("payback interpolation at period {}", t_star + 1),
        });
    }

    // Linear interpolation assumes the crossover period's flow accrues evenly
    let fraction = -cumulatives[t_star] / crossover_flow;
    Ok(PaybackPeriod::After(Decimal::from(t_star as u64) + fraction))
}

// ---------------------------------------------------------------------------
// IRR solvers
// ---------------------------------------------------------------------------

fn newton_irr(cash_flows: &[Money], guess: Rate) -> CapBudgetResult<Rate> {
    let mut rate = guess;

    for i in 0..MAX_IRR_ITERATIONS {
        let mut npv_val = Decimal::ZERO;
        let mut dnpv = Decimal::ZERO;
        let one_plus_r = Decimal::ONE + rate;

        for (t, cf) in cash_flows.iter().enumerate() {
            let t_dec = Decimal::from(t as u64);
            // Terms whose discount factor collapses or overflows carry no
            // usable gradient; skip them
            let discount = match one_plus_r.checked_powd(t_dec) {
                Some(d) if !d.is_zero() => d,
                _ => continue,
            };
            match cf.checked_div(discount) {
                Some(term) => npv_val += term,
                None => continue,
            }
            if t > 0 {
                if let Some(next) = discount.checked_mul(one_plus_r) {
                    if !next.is_zero() {
                        if let Some(slope) = (t_dec * cf).checked_div(next) {
                            dnpv -= slope;
                        }
                    }
                }
            }
        }

        if npv_val.abs() < CONVERGENCE_THRESHOLD {
            return Ok(rate);
        }

        if dnpv.is_zero() {
            return Err(CapBudgetError::ConvergenceFailure {
                function: "IRR".into(),
                iterations: i,
                last_delta: npv_val,
            });
        }

        match npv_val.checked_div(dnpv) {
            Some(step) => rate -= step,
            None => {
                return Err(CapBudgetError::ConvergenceFailure {
                    function: "IRR".into(),
                    iterations: i,
                    last_delta: npv_val,
                })
            }
        }

        // Guard against divergence
        if rate < dec!(-0.99) {
            rate = dec!(-0.99);
        } else if rate > dec!(100.0) {
            rate = dec!(100.0);
        }
    }

    Err(CapBudgetError::ConvergenceFailure {
        function: "IRR".into(),
        iterations: MAX_IRR_ITERATIONS,
        last_delta: npv_at(rate, cash_flows),
    })
}

fn bisect_irr(cash_flows: &[Money]) -> CapBudgetResult<Rate> {
    let mut lo = BRACKET_RATES[0];
    let mut npv_lo = npv_at(lo, cash_flows);
    let mut bracket = None;

    for &hi in &BRACKET_RATES[1..] {
        if npv_lo.abs() < CONVERGENCE_THRESHOLD {
            return Ok(lo);
        }
        let npv_hi = npv_at(hi, cash_flows);
        if npv_hi.abs() < CONVERGENCE_THRESHOLD {
            return Ok(hi);
        }
        if (npv_lo < Decimal::ZERO) != (npv_hi < Decimal::ZERO) {
            bracket = Some((lo, hi, npv_lo));
            break;
        }
        lo = hi;
        npv_lo = npv_hi;
    }

    let (mut lo, mut hi, mut npv_lo) = match bracket {
        Some(b) => b,
        None => {
            return Err(CapBudgetError::ConvergenceFailure {
                function: "IRR bisection".into(),
                iterations: 0,
                last_delta: npv_lo,
            })
        }
    };

    for _ in 0..MAX_BISECTION_ITERATIONS {
        let mid = (lo + hi) / dec!(2);
        let npv_mid = npv_at(mid, cash_flows);

        if npv_mid.abs() < CONVERGENCE_THRESHOLD || (hi - lo).abs() < CONVERGENCE_THRESHOLD {
            return Ok(mid);
        }

        if (npv_mid < Decimal::ZERO) == (npv_lo < Decimal::ZERO) {
            lo = mid;
            npv_lo = npv_mid;
        } else {
            hi = mid;
        }
    }

    Err(CapBudgetError::ConvergenceFailure {
        function: "IRR bisection".into(),
        iterations: MAX_BISECTION_ITERATIONS,
        last_delta: npv_at((lo + hi) / dec!(2), cash_flows),
    })
}

/// NPV evaluated for the solvers. Skips terms the arithmetic cannot
/// represent instead of failing, so deep-negative and very large bracket
/// rates stay probeable.
fn npv_at(rate: Rate, cash_flows: &[Money]) -> Decimal {
    let one_plus_r = Decimal::ONE + rate;
    let mut total = Decimal::ZERO;

    for (t, cf) in cash_flows.iter().enumerate() {
        let discount = match one_plus_r.checked_powd(Decimal::from(t as u64)) {
            Some(d) if !d.is_zero() => d,
            _ => continue,
        };
        if let Some(term) = cf.checked_div(discount) {
            total += term;
        }
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_npv_direct_summation() {
        let cfs = vec![dec!(-200), dec!(100), dec!(100), dec!(100), dec!(100)];
        let result = npv(dec!(0.10), &cfs).unwrap();
        // -200 + 100/1.1 + 100/1.21 + 100/1.331 + 100/1.4641 = 116.98654...
        assert!((result - dec!(116.98654463)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_npv_zero_rate_is_plain_sum() {
        let cfs = vec![dec!(-200), dec!(50), dec!(50), dec!(50), dec!(1000)];
        let result = npv(dec!(0), &cfs).unwrap();
        assert_eq!(result, dec!(950));
    }

    #[test]
    fn test_npv_rejects_rate_at_or_below_minus_one() {
        let cfs = vec![dec!(-100), dec!(50)];
        assert!(matches!(
            npv(dec!(-1), &cfs),
            Err(CapBudgetError::InvalidInput { .. })
        ));
        assert!(matches!(
            npv(dec!(-2), &cfs),
            Err(CapBudgetError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_irr_conventional_series() {
        let cfs = vec![dec!(-200), dec!(100), dec!(100), dec!(100), dec!(100)];
        let rate = irr(&cfs, dec!(0.1)).unwrap();
        // Root is ~34.9%
        assert!((rate - dec!(0.3490)).abs() < dec!(0.001));
        // The root drives NPV to zero
        let residual = npv(rate, &cfs).unwrap();
        assert!(residual.abs() < dec!(0.00001));
    }

    #[test]
    fn test_irr_annuity() {
        let cfs = vec![dec!(-1000), dec!(400), dec!(400), dec!(400)];
        let rate = irr(&cfs, dec!(0.10)).unwrap();
        // IRR should be ~9.7%
        assert!((rate - dec!(0.097)).abs() < dec!(0.01));
    }

    #[test]
    fn test_irr_negative_root() {
        // -100 + 50/(1+r) = 0 at r = -0.5
        let cfs = vec![dec!(-100), dec!(50)];
        let rate = irr(&cfs, dec!(0.1)).unwrap();
        assert!((rate - dec!(-0.5)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_irr_requires_two_flows() {
        assert!(matches!(
            irr(&[dec!(-100)], dec!(0.1)),
            Err(CapBudgetError::InsufficientData(_))
        ));
        assert!(matches!(
            irr(&[], dec!(0.1)),
            Err(CapBudgetError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_irr_rejects_single_signed_series() {
        let all_in = vec![dec!(100), dec!(100), dec!(100)];
        assert!(matches!(
            irr(&all_in, dec!(0.1)),
            Err(CapBudgetError::FinancialImpossibility(_))
        ));

        let all_out = vec![dec!(-100), dec!(-50), dec!(-25)];
        assert!(matches!(
            irr(&all_out, dec!(0.1)),
            Err(CapBudgetError::FinancialImpossibility(_))
        ));
    }

    #[test]
    fn test_bisection_agrees_with_newton() {
        let cfs = vec![dec!(-200), dec!(100), dec!(100), dec!(100), dec!(100)];
        let rate = bisect_irr(&cfs).unwrap();
        assert!((rate - dec!(0.3490)).abs() < dec!(0.001));
    }

    #[test]
    fn test_discounted_payback_interpolates() {
        let cfs = vec![dec!(-200), dec!(100), dec!(100), dec!(100), dec!(100)];
        let result = discounted_payback(dec!(0.10), &cfs).unwrap();
        // Cumulative discounted: -200, -109.09, -26.45, +48.69, ...
        // Crossover inside period 3: 2 + 26.4463/75.1315 = 2.352
        match result {
            PaybackPeriod::After(p) => assert!((p - dec!(2.352)).abs() < dec!(0.0001)),
            other => panic!("expected After, got {other:?}"),
        }
    }

    #[test]
    fn test_discounted_payback_zero_rate_is_simple_payback() {
        let cfs = vec![dec!(-100), dec!(50), dec!(100)];
        let result = discounted_payback(dec!(0), &cfs).unwrap();
        // Cumulative: -100, -50, +50; crossover halfway through period 2
        assert_eq!(result, PaybackPeriod::After(dec!(1.5)));
    }

    #[test]
    fn test_discounted_payback_exact_breakeven() {
        let cfs = vec![dec!(-200), dec!(100), dec!(100), dec!(100), dec!(100)];
        let result = discounted_payback(dec!(0), &cfs).unwrap();
        // Cumulative hits exactly zero at period 2
        assert_eq!(result, PaybackPeriod::After(dec!(2)));
    }

    #[test]
    fn test_discounted_payback_never_recovers() {
        let cfs = vec![dec!(-1000), dec!(10), dec!(10), dec!(10)];
        let result = discounted_payback(dec!(0.10), &cfs).unwrap();
        assert_eq!(result, PaybackPeriod::Never);
    }

    #[test]
    fn test_discounted_payback_no_outlay_is_immediate() {
        let cfs = vec![dec!(50), dec!(25)];
        let result = discounted_payback(dec!(0.10), &cfs).unwrap();
        assert_eq!(result, PaybackPeriod::Immediate);
    }

    #[test]
    fn test_discounted_payback_single_outflow_never_recovers() {
        let result = discounted_payback(dec!(0.10), &[dec!(-100)]).unwrap();
        assert_eq!(result, PaybackPeriod::Never);
    }

    #[test]
    fn test_discounted_payback_empty_rejected() {
        assert!(matches!(
            discounted_payback(dec!(0.10), &[]),
            Err(CapBudgetError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_discounted_payback_lengthens_with_rate() {
        let cfs = vec![dec!(-200), dec!(100), dec!(100), dec!(100), dec!(100)];
        let mut previous = Decimal::MIN;
        for rate in [dec!(0), dec!(0.05), dec!(0.10), dec!(0.20), dec!(0.30)] {
            let p = discounted_payback(rate, &cfs)
                .unwrap()
                .as_periods()
                .unwrap();
            assert!(p >= previous, "payback shrank at rate {rate}");
            previous = p;
        }
    }
}
