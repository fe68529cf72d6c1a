use serde_json::Value;

use super::scalar;

/// Headline fields, most important first.
const PRIORITY_KEYS: [&str; 4] = ["npv", "irr", "payback_year", "value"];

/// Print just the headline value of a result: NPV for simulations, the
/// resolved value for scenario lookups, else the first field.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);
    let metrics = result.get("metrics").unwrap_or(result);

    if let Value::Object(map) = metrics {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                println!("{}", scalar(val));
                return;
            }
        }
    }

    if let Value::Object(map) = result {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, scalar(val));
            return;
        }
    }

    println!("{}", scalar(result));
}
