use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Period fractions or counts
pub type Periods = Decimal;

/// One of the two sides of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alternative {
    A,
    B,
}

/// Which side a metric favours.
///
/// Exact equality is reported as `Tie` rather than silently awarded to
/// either side. A metric that is unavailable for one or both sides
/// compares as `Undefined`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preference {
    A,
    B,
    Tie,
    Undefined,
}

/// Payback period of a cash-flow series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaybackPeriod {
    /// The cumulative flow never goes negative; there is no outlay to recover
    Immediate,
    /// Breakeven after this many periods, interpolated linearly inside the
    /// crossover period
    After(Periods),
    /// Still under water at the end of the horizon
    Never,
}

impl PaybackPeriod {
    /// Periods until breakeven. `Immediate` counts as zero; `Never` has no
    /// finite value.
    pub fn as_periods(&self) -> Option<Periods> {
        match self {
            PaybackPeriod::Immediate => Some(Decimal::ZERO),
            PaybackPeriod::After(p) => Some(*p),
            PaybackPeriod::Never => None,
        }
    }
}

/// One row of a per-period discounting schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodFlow {
    pub period: u32,
    /// Undiscounted cash flow for the period
    pub cash_flow: Money,
    /// 1 / (1 + rate)^period
    pub discount_factor: Rate,
    /// Present value of the period's flow
    pub discounted: Money,
    /// Running total of discounted flows through this period
    pub cumulative_discounted: Money,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
