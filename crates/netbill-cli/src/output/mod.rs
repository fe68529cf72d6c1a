pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Annual series shown per period, in column order.
const SERIES_COLUMNS: [&str; 6] = [
    "energy_kwh",
    "export_tariff",
    "retail_tariff",
    "operating_revenue",
    "opex",
    "debt_service",
];

/// Per-period rows of a result, when it carries any.
///
/// Simulation results yield one row per cash-flow period; operating series
/// are blank in period 0. Results with a `schedule` array yield its entries.
pub fn period_rows(result: &Map<String, Value>) -> Option<(Vec<String>, Vec<Vec<String>>)> {
    if let (Some(Value::Array(years)), Some(Value::Array(cashflow))) =
        (result.get("years"), result.get("cashflow"))
    {
        let series = result.get("series").and_then(Value::as_object);
        let mut headers = vec!["year".to_string(), "cashflow".to_string()];
        headers.extend(SERIES_COLUMNS.iter().map(|c| c.to_string()));

        let rows = years
            .iter()
            .zip(cashflow)
            .enumerate()
            .map(|(period, (year, flow))| {
                let mut row = vec![scalar(year), scalar(flow)];
                for column in SERIES_COLUMNS {
                    let cell = period
                        .checked_sub(1)
                        .and_then(|t| series?.get(column)?.get(t))
                        .map(scalar)
                        .unwrap_or_default();
                    row.push(cell);
                }
                row
            })
            .collect();
        return Some((headers, rows));
    }

    if let Some(Value::Array(schedule)) = result.get("schedule") {
        return object_rows(schedule);
    }
    None
}

/// Rows of an array of objects, headed by the first object's keys.
pub fn object_rows(items: &[Value]) -> Option<(Vec<String>, Vec<Vec<String>>)> {
    let Some(Value::Object(first)) = items.first() else {
        return None;
    };
    let headers: Vec<String> = first.keys().cloned().collect();
    let rows = items
        .iter()
        .filter_map(Value::as_object)
        .map(|item| {
            headers
                .iter()
                .map(|h| item.get(h).map(scalar).unwrap_or_default())
                .collect()
        })
        .collect();
    Some((headers, rows))
}

/// Scalar fields of a result, with the nested `metrics` object flattened in.
pub fn summary_fields(result: &Map<String, Value>) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    if let Some(Value::Object(metrics)) = result.get("metrics") {
        for (key, val) in metrics {
            fields.push((key.clone(), scalar(val)));
        }
    }
    for (key, val) in result {
        match val {
            Value::Array(_) | Value::Object(_) => {}
            _ => fields.push((key.clone(), scalar(val))),
        }
    }
    fields
}

/// Render one value as a single cell.
pub fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(scalar).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_simulation_rows_leave_period_zero_blank() {
        let result = json!({
            "years": [0, 1, 2],
            "cashflow": ["-1000", "300", "310"],
            "series": {
                "energy_kwh": ["1650", "1640"],
                "opex": ["15", "15.3"]
            }
        });
        let (headers, rows) = period_rows(result.as_object().unwrap()).unwrap();
        assert_eq!(headers[..3], ["year", "cashflow", "energy_kwh"]);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][..3], ["0", "-1000", ""]);
        assert_eq!(rows[2][..3], ["2", "310", "1640"]);
        // debt_service is absent from the series
        assert_eq!(rows[1][7], "");
    }

    #[test]
    fn test_schedule_rows() {
        let result = json!({ "schedule": [{"year": 1, "rate": "0.78"}, {"year": 2, "rate": "0.78"}] });
        let (headers, rows) = period_rows(result.as_object().unwrap()).unwrap();
        assert_eq!(headers, ["rate", "year"]);
        assert_eq!(rows[1], ["0.78", "2"]);
    }

    #[test]
    fn test_summary_flattens_metrics() {
        let result = json!({
            "metrics": {"npv": "1234.56", "irr": null},
            "total_capex": "64000",
            "cashflow": ["-64000"]
        });
        let fields = summary_fields(result.as_object().unwrap());
        assert!(fields.contains(&("npv".to_string(), "1234.56".to_string())));
        assert!(fields.contains(&("irr".to_string(), String::new())));
        assert!(fields.contains(&("total_capex".to_string(), "64000".to_string())));
        assert!(!fields.iter().any(|(k, _)| k == "cashflow"));
    }
}
