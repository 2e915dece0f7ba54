use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::types::UsageRecord;

pub const CSV_HEADER: &str = "Date,Service,Region,Usage_Type,Operation,Usage_Qty,Unit,Cost";

/// Usage quantity with two decimals, read from the leading number of the
/// field; missing or unparsable amounts become `0.00`.
pub fn format_amount(record: &UsageRecord) -> String {
    fixed_2(record.amount.leading_value().unwrap_or(0.0))
}

/// Two-decimal text where an exact tie at the third decimal rounds away
/// from zero (`0.125` → `0.13`).
fn fixed_2(v: f64) -> String {
    if v == 0.0 {
        return "0.00".to_string();
    }
    // Exact ties are multiples of 1/8 with an odd numerator
    let eighths = v.abs() * 8.0;
    if eighths.fract() == 0.0 && eighths % 2.0 == 1.0 {
        let sign = if v < 0.0 { "-" } else { "" };
        return format!("{sign}{:.2}", (v.abs() * 100.0).round() / 100.0);
    }
    format!("{v:.2}")
}

pub(crate) fn usage_type_or_placeholder(record: &UsageRecord) -> &str {
    match record.usage_type.as_deref() {
        Some(t) if !t.is_empty() => t,
        _ => "N/A",
    }
}

fn csv_row(record: &UsageRecord) -> String {
    [
        record.date.as_str(),
        record.service.as_str(),
        record.region.as_str(),
        usage_type_or_placeholder(record),
        record.operation.as_deref().unwrap_or(""),
        format_amount(record).as_str(),
        record.unit.as_deref().unwrap_or(""),
        // Cost is echoed verbatim, with no placeholder when missing
        record.cost.raw().as_str(),
    ]
    .join(",")
}

/// Render rows as a plain comma-joined document: header line, then one line
/// per record with no trailing newline.
pub fn to_csv(records: &[&UsageRecord]) -> String {
    let rows: Vec<String> = records.iter().map(|r| csv_row(r)).collect();
    format!("{CSV_HEADER}\n{}", rows.join("\n"))
}

pub fn report_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}_{}.csv", prefix, date.format("%Y-%m-%d"))
}

/// Write the filtered rows to `<dir>/<prefix>_<date>.csv`, creating `dir`.
pub fn write_report(
    dir: &Path,
    prefix: &str,
    date: NaiveDate,
    records: &[&UsageRecord],
) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory {}", dir.display()))?;
    let path = dir.join(report_file_name(prefix, date));
    fs::write(&path, to_csv(records))
        .with_context(|| format!("Failed to write report {}", path.display()))?;
    Ok(path)
}
