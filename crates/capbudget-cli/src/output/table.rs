use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use std::str::FromStr;
use tabled::{builder::Builder, Table};

/// Format output as tables using the tabled crate.
///
/// Appraisal and comparison envelopes get purpose-built layouts; anything
/// else falls back to a flat field/value table.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                if result.get("npv_preference").is_some() {
                    print_comparison(result, map);
                } else if result.get("npv").is_some() {
                    print_appraisal(result, map);
                } else {
                    print_flat_object(result);
                    print_footer(map);
                }
            } else {
                print_flat_object(value);
            }
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_appraisal(result: &Value, envelope: &serde_json::Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Metric", "Value"]);
    builder.push_record(["NPV", &fmt_money(&result["npv"])]);
    builder.push_record(["IRR", &fmt_rate(&result["irr"])]);
    builder.push_record([
        "Discounted payback",
        &fmt_payback(&result["discounted_payback"]),
    ]);
    builder.push_record(["Simple payback", &fmt_payback(&result["simple_payback"])]);
    println!("{}", Table::from(builder));

    if let Some(Value::Array(schedule)) = result.get("schedule") {
        println!("\nSchedule:");
        print_schedule(schedule);
    }

    print_footer(envelope);
}

fn print_comparison(result: &Value, envelope: &serde_json::Map<String, Value>) {
    let label_a = result["label_a"].as_str().unwrap_or("A").to_string();
    let label_b = result["label_b"].as_str().unwrap_or("B").to_string();
    let a = &result["alternative_a"];
    let b = &result["alternative_b"];

    let mut builder = Builder::default();
    builder.push_record(["Metric", label_a.as_str(), label_b.as_str(), "Preferred"]);
    builder.push_record([
        "NPV".to_string(),
        fmt_money(&a["npv"]),
        fmt_money(&b["npv"]),
        preference_label(&result["npv_preference"], &label_a, &label_b),
    ]);
    builder.push_record([
        "IRR".to_string(),
        fmt_rate(&a["irr"]),
        fmt_rate(&b["irr"]),
        preference_label(&result["irr_preference"], &label_a, &label_b),
    ]);
    builder.push_record([
        "Discounted payback".to_string(),
        fmt_payback(&a["discounted_payback"]),
        fmt_payback(&b["discounted_payback"]),
        preference_label(&result["payback_preference"], &label_a, &label_b),
    ]);
    println!("{}", Table::from(builder));

    match result["dominant"].as_str() {
        Some("A") => println!("\nDominant: {}", label_a),
        Some("B") => println!("\nDominant: {}", label_b),
        _ => println!("\nDominant: none"),
    }

    print_footer(envelope);
}

fn print_schedule(rows: &[Value]) {
    let mut builder = Builder::default();
    builder.push_record([
        "Period",
        "Cash flow",
        "Discount factor",
        "Discounted",
        "Cumulative",
    ]);
    for row in rows {
        builder.push_record([
            row["period"].to_string(),
            fmt_money(&row["cash_flow"]),
            fmt_factor(&row["discount_factor"]),
            fmt_money(&row["discounted"]),
            fmt_money(&row["cumulative_discounted"]),
        ]);
    }
    println!("{}", Table::from(builder));
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        println!("{}", Table::from(builder));
    }
}

fn print_footer(envelope: &serde_json::Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

// ---------------------------------------------------------------------------
// Value formatting
// ---------------------------------------------------------------------------

fn decimal_of(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}

fn fmt_money(value: &Value) -> String {
    decimal_of(value)
        .map(|d| d.round_dp(2).to_string())
        .unwrap_or_else(|| "n/a".to_string())
}

fn fmt_rate(value: &Value) -> String {
    decimal_of(value)
        .map(|d| format!("{}%", (d * dec!(100)).round_dp(2)))
        .unwrap_or_else(|| "n/a".to_string())
}

fn fmt_factor(value: &Value) -> String {
    decimal_of(value)
        .map(|d| d.round_dp(4).to_string())
        .unwrap_or_else(|| "n/a".to_string())
}

fn fmt_payback(value: &Value) -> String {
    match value {
        Value::String(s) if s == "Immediate" => "immediate".to_string(),
        Value::String(s) if s == "Never" => "never".to_string(),
        Value::Object(map) => map
            .get("After")
            .and_then(decimal_of)
            .map(|d| format!("{} periods", d.round_dp(2)))
            .unwrap_or_else(|| "n/a".to_string()),
        _ => "n/a".to_string(),
    }
}

fn preference_label(value: &Value, label_a: &str, label_b: &str) -> String {
    match value.as_str() {
        Some("A") => label_a.to_string(),
        Some("B") => label_b.to_string(),
        Some("Tie") => "Tie".to_string(),
        Some("Undefined") => "Undefined".to_string(),
        _ => "n/a".to_string(),
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
