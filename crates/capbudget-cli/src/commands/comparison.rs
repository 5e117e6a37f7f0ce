use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use capbudget_core::comparison::{self, ComparisonInput};

use crate::input;

/// Arguments for a two-alternative comparison
#[derive(Args)]
pub struct CompareArgs {
    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Cash flows of alternative A (comma-separated, e.g. "-200,100,100,100,100")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub alternative_a: Option<Vec<Decimal>>,

    /// Cash flows of alternative B (comma-separated, e.g. "-200,50,50,50,1000")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub alternative_b: Option<Vec<Decimal>>,

    /// Discount rate shared by both alternatives (e.g. 0.1 for 10%)
    #[arg(long, alias = "discount-rate")]
    pub rate: Option<Decimal>,

    /// Display label for alternative A
    #[arg(long)]
    pub label_a: Option<String>,

    /// Display label for alternative B
    #[arg(long)]
    pub label_b: Option<String>,
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let comparison_input: ComparisonInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        ComparisonInput {
            alternative_a: args
                .alternative_a
                .ok_or("--alternative-a is required (or provide --input)")?,
            alternative_b: args
                .alternative_b
                .ok_or("--alternative-b is required (or provide --input)")?,
            discount_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            label_a: args.label_a,
            label_b: args.label_b,
        }
    };

    let result = comparison::compare_alternatives(&comparison_input)?;
    Ok(serde_json::to_value(result)?)
}
