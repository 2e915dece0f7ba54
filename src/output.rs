use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use serde::Serialize;

use crate::export::{format_amount, usage_type_or_placeholder};
use crate::types::{
    AggregateView, DateTotal, FilterOptions, FilterSelection, RegionTotal, UsageRecord,
};

/// Dollar amount with thousands separators: 1234.5 → "$1,234.50".
pub fn format_usd(cost: f64) -> String {
    let fixed = format!("{:.2}", cost.abs());
    let (int_part, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if cost < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{frac}")
}

fn share(part: f64, total: f64) -> String {
    if total > 0.0 {
        format!("{:.1}%", part / total * 100.0)
    } else {
        "-".to_string()
    }
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(headers.iter().map(Cell::new));
    table
}

fn selection_label(selection: &FilterSelection) -> String {
    format!("service: {} | region: {}", selection.service, selection.region)
}

fn kpi_table(view: &AggregateView) -> Table {
    let mut table = new_table(&["Total Spend", "Usage Types", "Active Regions", "Line Items"]);
    table.add_row(vec![
        Cell::new(format_usd(view.total)),
        Cell::new(view.usage_types),
        Cell::new(view.region_totals.len()),
        Cell::new(view.filtered.len()),
    ]);
    table
}

fn regions_table(view: &AggregateView) -> Table {
    let mut table = new_table(&["Region", "Cost", "Share"]);
    for r in &view.region_totals {
        table.add_row(vec![
            Cell::new(&r.region),
            Cell::new(format_usd(r.cost)),
            Cell::new(share(r.cost, view.total)),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL"),
        Cell::new(format_usd(view.total)),
        Cell::new(""),
    ]);
    table
}

fn daily_table(view: &AggregateView) -> Table {
    let mut table = new_table(&["Date", "Cost"]);
    for d in &view.date_totals {
        table.add_row(vec![Cell::new(&d.date), Cell::new(format_usd(d.cost))]);
    }
    table.add_row(vec![Cell::new("TOTAL"), Cell::new(format_usd(view.total))]);
    table
}

fn record_row(r: &UsageRecord) -> Vec<Cell> {
    let qty = match r.unit.as_deref() {
        Some(unit) if !unit.is_empty() => format!("{} {}", format_amount(r), unit),
        _ => format_amount(r),
    };
    vec![
        Cell::new(&r.date),
        Cell::new(&r.service),
        Cell::new(usage_type_or_placeholder(r)),
        Cell::new(r.operation.as_deref().unwrap_or("")),
        Cell::new(qty),
        Cell::new(format!("${:.2}", r.cost.or_zero())),
    ]
}

pub fn print_summary(view: &AggregateView, selection: &FilterSelection) {
    println!("{}", selection_label(selection));
    println!("{}", kpi_table(view));
    println!("\nRegional distribution");
    println!("{}", regions_table(view));
    println!("\nDaily cost trend");
    println!("{}", daily_table(view));
}

pub fn print_regions(view: &AggregateView) {
    println!("{}", regions_table(view));
}

pub fn print_daily(view: &AggregateView) {
    println!("{}", daily_table(view));
}

pub fn print_records(view: &AggregateView, limit: usize) {
    let mut table = new_table(&["Date", "Service", "Usage Type", "Operation", "Qty", "Cost"]);
    for r in view.filtered.iter().take(limit) {
        table.add_row(record_row(r));
    }
    println!("{table}");

    if view.filtered.len() > limit {
        eprintln!(
            "Showing {} of {} line items (use --limit or `export` for all).",
            limit,
            view.filtered.len()
        );
    }
}

pub fn print_options(options: &FilterOptions) {
    let mut table = new_table(&["Services", "Regions"]);
    let rows = options.services.len().max(options.regions.len());
    for i in 0..rows {
        table.add_row(vec![
            Cell::new(options.services.get(i).map(String::as_str).unwrap_or("")),
            Cell::new(options.regions.get(i).map(String::as_str).unwrap_or("")),
        ]);
    }
    println!("{table}");
}

#[derive(Serialize)]
struct SummaryJson<'a> {
    service: String,
    region: String,
    total: f64,
    usage_types: usize,
    active_regions: usize,
    line_items: usize,
    region_totals: &'a [RegionTotal],
    date_totals: &'a [DateTotal],
}

pub fn summary_json(view: &AggregateView, selection: &FilterSelection) -> serde_json::Value {
    let summary = SummaryJson {
        service: selection.service.to_string(),
        region: selection.region.to_string(),
        total: view.total,
        usage_types: view.usage_types,
        active_regions: view.region_totals.len(),
        line_items: view.filtered.len(),
        region_totals: &view.region_totals,
        date_totals: &view.date_totals,
    };
    serde_json::to_value(summary).unwrap_or_default()
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).expect("JSON serialization failed")
    );
}
