use serde_json::Value;
use std::io;

/// Write output as CSV to stdout.
///
/// An appraisal emits its per-period schedule; a comparison emits one row
/// per metric. Other shapes fall back to field/value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                if result.get("npv_preference").is_some() {
                    write_comparison_csv(&mut wtr, result);
                } else if let Some(Value::Array(schedule)) = result.get("schedule") {
                    write_array_csv(&mut wtr, schedule);
                } else if let Value::Object(res_map) = result {
                    let _ = wtr.write_record(["field", "value"]);
                    for (key, val) in res_map {
                        let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                    }
                }
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                }
            }
        }
        Value::Array(arr) => {
            write_array_csv(&mut wtr, arr);
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_comparison_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, result: &Value) {
    let a = &result["alternative_a"];
    let b = &result["alternative_b"];

    let _ = wtr.write_record(["metric", "alternative_a", "alternative_b", "preference"]);
    let _ = wtr.write_record([
        "npv",
        &format_csv_value(&a["npv"]),
        &format_csv_value(&b["npv"]),
        &format_csv_value(&result["npv_preference"]),
    ]);
    let _ = wtr.write_record([
        "irr",
        &format_csv_value(&a["irr"]),
        &format_csv_value(&b["irr"]),
        &format_csv_value(&result["irr_preference"]),
    ]);
    let _ = wtr.write_record([
        "discounted_payback",
        &csv_payback(&a["discounted_payback"]),
        &csv_payback(&b["discounted_payback"]),
        &format_csv_value(&result["payback_preference"]),
    ]);
    let _ = wtr.write_record(["dominant", "", "", &format_csv_value(&result["dominant"])]);
}

fn write_array_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    // Extract headers from first object
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| {
                        map.get(*h)
                            .map(format_csv_value)
                            .unwrap_or_default()
                    })
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
    }
}

/// Payback periods flatten to a plain number of periods; a series that
/// never recovers leaves the cell empty.
fn csv_payback(value: &Value) -> String {
    match value {
        Value::String(s) if s == "Immediate" => "0".to_string(),
        Value::Object(map) => map.get("After").map(format_csv_value).unwrap_or_default(),
        _ => String::new(),
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
