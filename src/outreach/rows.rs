//! Loading and checking the rows of the flat file.

use crate::error::{InvalidRow, OutreachResult};
use crate::models::ContactRecord;
use chrono::{DateTime, Utc};
use std::path::Path;

/// Read every row of `source`.
///
/// Values are trimmed, absent columns and short rows come back empty, and the validity date
/// is normalized with [`normalize_validity_date`].
pub fn load_rows(source: &Path) -> OutreachResult<Vec<ContactRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(source)?;

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let mut record: ContactRecord = result?;
        record.nif_expiricy = normalize_validity_date(&record.nif_expiricy);
        rows.push(record);
    }
    Ok(rows)
}

/// Reinterpret a millisecond epoch as a `YYYY-MM-DD` UTC date.
///
/// Anything that is not a number (including dates already formatted) becomes
/// an empty string.
pub fn normalize_validity_date(raw: &str) -> String {
    let Ok(millis) = raw.trim().parse::<f64>() else {
        return String::new();
    };
    if !millis.is_finite() {
        return String::new();
    }

    DateTime::<Utc>::from_timestamp_millis(millis as i64)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Every row must carry a phone number and a first name.
pub fn validate_rows(rows: &[ContactRecord]) -> Result<(), Vec<InvalidRow>> {
    let invalid: Vec<InvalidRow> = rows
        .iter()
        .enumerate()
        .filter(|(_, r)| r.phone.trim().is_empty() || r.firstname.trim().is_empty())
        .map(|(i, r)| InvalidRow {
            line: i + 1,
            hs_object_id: r.hs_object_id.clone(),
            firstname: r.firstname.clone(),
            phone: r.phone.clone(),
        })
        .collect();

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(invalid)
    }
}
