//! Row parsing and value coercion for dataset bodies.
//!
//! The remote endpoint and the local cache file share the same
//! `{"data": [...]}` shape, so both paths go through [`records_from_body`].

use disability_map_dataset_models::{Record, RecordFieldMapping};
use disability_map_region::label_text;

use crate::FetchError;

/// Extracts records from a `{"data": [...]}` document.
///
/// Rows that are not JSON objects are skipped with a warning.
///
/// # Errors
///
/// Returns [`FetchError::Malformed`] if the document has no `data` array.
pub fn records_from_body(
    body: &serde_json::Value,
    fields: &RecordFieldMapping,
) -> Result<Vec<Record>, FetchError> {
    let rows = body
        .get("data")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| FetchError::Malformed {
            message: "No data array in response body".to_string(),
        })?;

    let mut skipped = 0_usize;
    let records: Vec<Record> = rows
        .iter()
        .filter_map(|row| {
            let record = record_from_row(row, fields);
            if record.is_none() {
                skipped += 1;
            }
            record
        })
        .collect();

    if skipped > 0 {
        log::warn!("Skipped {skipped} non-object rows in dataset body");
    }

    Ok(records)
}

/// Converts one raw row into a [`Record`], coercing each field.
///
/// Returns `None` only when the row is not a JSON object. Missing fields
/// become empty labels, an absent period, or an absent value.
#[must_use]
pub fn record_from_row(row: &serde_json::Value, fields: &RecordFieldMapping) -> Option<Record> {
    let obj = row.as_object()?;
    let field = |name: &str| obj.get(name).unwrap_or(&serde_json::Value::Null);

    Some(Record {
        region: label_text(field(&fields.region)),
        period: parse_period(field(&fields.period)),
        category: label_text(field(&fields.category)),
        value: parse_value(field(&fields.value)),
    })
}

/// Coerces a raw value to a finite, non-negative number.
///
/// Numbers and numeric strings (surrounding whitespace allowed) parse;
/// anything else, including negative, infinite, or `NaN` results, is absent.
#[must_use]
pub fn parse_value(value: &serde_json::Value) -> Option<f64> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    (parsed.is_finite() && parsed >= 0.0).then_some(parsed)
}

/// Coerces a raw reporting period to a year.
///
/// Accepts integers, integral floats (`2023.0`), and strings holding
/// either.
#[must_use]
pub fn parse_period(value: &serde_json::Value) -> Option<i32> {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .or_else(|| n.as_f64().and_then(integral_year)),
        serde_json::Value::String(s) => {
            let s = s.trim();
            s.parse::<i32>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral_year))
        }
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn integral_year(f: f64) -> Option<i32> {
    if f.is_finite() && f.fract() == 0.0 && f >= f64::from(i32::MIN) && f <= f64::from(i32::MAX) {
        Some(f as i32)
    } else {
        None
    }
}
