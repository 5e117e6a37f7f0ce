use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use capbudget_core::appraisal::{self, AppraisalInput};

use crate::input;

/// Arguments for a single-alternative appraisal
#[derive(Args)]
pub struct AppraiseArgs {
    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Cash flows, one per period (comma-separated, e.g. "-200,100,100,100,100")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub cash_flows: Option<Vec<Decimal>>,

    /// Discount rate as a decimal (e.g. 0.1 for 10%)
    #[arg(long, alias = "discount-rate")]
    pub rate: Option<Decimal>,

    /// Display label for the alternative
    #[arg(long)]
    pub label: Option<String>,
}

pub fn run_appraise(args: AppraiseArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let appraisal_input: AppraisalInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        AppraisalInput {
            cash_flows: args
                .cash_flows
                .ok_or("--cash-flows is required (or provide --input)")?,
            discount_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            label: args.label,
        }
    };

    let result = appraisal::appraise(&appraisal_input)?;
    Ok(serde_json::to_value(result)?)
}
