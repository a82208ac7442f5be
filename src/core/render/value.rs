//! Cell formatting shared by every renderer
//!
//! All formats print the same text for the same cell, so dates look identical
//! in CSV, spreadsheet and PDF output.

use crate::domain::CellValue;
use serde_json::Value;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Text form of a cell
///
/// Null → empty, dates and timestamps → `YYYY-MM-DD`, structured JSON →
/// compact JSON text, everything else → its display form.
pub fn format_cell(value: &CellValue) -> String {
    match value {
        CellValue::Null => String::new(),
        CellValue::Bool(b) => b.to_string(),
        CellValue::Integer(i) => i.to_string(),
        CellValue::Float(f) => f.to_string(),
        CellValue::Text(s) => s.clone(),
        CellValue::Date(d) => d.format(DATE_FORMAT).to_string(),
        CellValue::Timestamp(ts) => ts.date_naive().format(DATE_FORMAT).to_string(),
        CellValue::Json(Value::Null) => String::new(),
        CellValue::Json(Value::String(s)) => s.clone(),
        CellValue::Json(json) => json.to_string(),
    }
}

/// Cut `text` to at most `max_chars` characters, ending in "..." when cut
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_format_cell() {
        assert_eq!(format_cell(&CellValue::Null), "");
        assert_eq!(format_cell(&CellValue::Bool(true)), "true");
        assert_eq!(format_cell(&CellValue::Integer(-3)), "-3");
        assert_eq!(format_cell(&CellValue::Float(12.5)), "12.5");
        assert_eq!(format_cell(&CellValue::Text("Saúde".to_string())), "Saúde");
    }

    #[test]
    fn test_dates_use_calendar_form() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(format_cell(&CellValue::Date(date)), "2024-02-29");

        let ts = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 0).unwrap();
        assert_eq!(format_cell(&CellValue::Timestamp(ts)), "2024-12-31");
    }

    #[test]
    fn test_structured_values_are_json() {
        let value = CellValue::Json(json!({"tendencia": "alta", "peso": 2}));
        assert_eq!(format_cell(&value), r#"{"tendencia":"alta","peso":2}"#);
        assert_eq!(format_cell(&CellValue::Json(json!(["a", "b"]))), r#"["a","b"]"#);
        assert_eq!(format_cell(&CellValue::Json(json!(null))), "");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("curto", 10), "curto");
        assert_eq!(truncate_chars("exatamente", 10), "exatamente");
        assert_eq!(truncate_chars("Tecnologia da Informação", 10), "Tecnolo...");
        assert_eq!(truncate_chars("ççççççç", 5), "çç...");
    }
}
