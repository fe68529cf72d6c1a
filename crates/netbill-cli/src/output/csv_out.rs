use serde_json::Value;
use std::io;

use super::{object_rows, period_rows, scalar, summary_fields};

type StdoutWriter<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write output as CSV to stdout. Results with per-period data are written
/// one row per period; everything else as field/value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => match (map.get("result"), map.get("results")) {
            (Some(Value::Object(result)), _) => match period_rows(result) {
                Some((headers, rows)) => write_rows(&mut wtr, headers, rows),
                None => write_fields(&mut wtr, summary_fields(result)),
            },
            (_, Some(Value::Array(results))) => write_array(&mut wtr, results),
            _ => write_fields(&mut wtr, summary_fields(map)),
        },
        Value::Array(arr) => write_array(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([scalar(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_fields(wtr: &mut StdoutWriter<'_>, fields: Vec<(String, String)>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in fields {
        let _ = wtr.write_record([key, val]);
    }
}

fn write_array(wtr: &mut StdoutWriter<'_>, arr: &[Value]) {
    match object_rows(arr) {
        Some((headers, rows)) => write_rows(wtr, headers, rows),
        None => {
            for item in arr {
                let _ = wtr.write_record([scalar(item)]);
            }
        }
    }
}

fn write_rows(wtr: &mut StdoutWriter<'_>, headers: Vec<String>, rows: Vec<Vec<String>>) {
    let _ = wtr.write_record(&headers);
    for row in rows {
        let _ = wtr.write_record(&row);
    }
}
