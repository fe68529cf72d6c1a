use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{object_rows, period_rows, scalar, summary_fields};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => print_result_tables(result, map),
            _ => match map.get("results") {
                Some(Value::Array(results)) => print_array_table(results),
                _ => print_field_table(&summary_fields(map)),
            },
        },
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result_tables(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    print_field_table(&summary_fields(result));

    if let Some((headers, rows)) = period_rows(result) {
        println!();
        print_rows(headers, rows);
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_field_table(fields: &[(String, String)]) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in fields {
        builder.push_record([key.as_str(), val.as_str()]);
    }
    println!("{}", Table::from(builder));
}

fn print_array_table(arr: &[Value]) {
    match object_rows(arr) {
        Some((headers, rows)) => print_rows(headers, rows),
        None if arr.is_empty() => println!("(empty)"),
        None => {
            for item in arr {
                println!("{}", scalar(item));
            }
        }
    }
}

fn print_rows(headers: Vec<String>, rows: Vec<Vec<String>>) {
    let mut builder = Builder::default();
    builder.push_record(headers);
    for row in rows {
        builder.push_record(row);
    }
    println!("{}", Table::from(builder));
}
