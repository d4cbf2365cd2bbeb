use super::ui;
use crate::core::{PairKey, RateEntry, RateLookup};
use crate::warmer::WarmReport;
use chrono::{DateTime, Utc};
use comfy_table::Cell;

pub fn display_lookup(pair: &PairKey, lookup: &RateLookup) -> String {
    let origin = if lookup.cached {
        ui::style_text("cached", ui::StyleType::Subtle)
    } else {
        ui::style_text("fetched", ui::StyleType::Success)
    };

    let mut output = format!(
        "{}: {} ({})",
        ui::style_text(&pair.to_string(), ui::StyleType::Label),
        lookup.rate,
        origin
    );
    if let Some(path) = &lookup.path {
        output.push_str(&format!("\n  path: {}", path.join(" -> ")));
    }
    if let Some(liquidity) = lookup.liquidity {
        output.push_str(&format!("\n  liquidity: {liquidity:.2}"));
    }
    if let Some(ttl) = lookup.ttl {
        output.push_str(&format!("\n  ttl: {ttl}s"));
    }
    output
}

pub fn display_entries(entries: &[RateEntry], now: DateTime<Utc>) -> String {
    if entries.is_empty() {
        return ui::style_text("No cached rates", ui::StyleType::Subtle);
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Pair"),
        ui::header_cell("Rate"),
        ui::header_cell("Liquidity"),
        ui::header_cell("Path"),
        ui::header_cell("Source"),
        ui::header_cell("Expires (UTC)"),
        ui::header_cell("Status"),
    ]);

    for entry in entries {
        let path = entry
            .path
            .as_ref()
            .map_or("-".to_string(), |p| p.join(" -> "));
        table.add_row(vec![
            Cell::new(entry.key().to_string()),
            Cell::new(entry.rate.to_string()),
            ui::format_optional_cell(entry.liquidity, |l| format!("{l:.2}")),
            Cell::new(path),
            Cell::new(&entry.source),
            Cell::new(entry.expires_at.format("%Y-%m-%d %H:%M:%S").to_string()),
            ui::freshness_cell(entry.is_fresh(now)),
        ]);
    }

    format!(
        "{}\n\n{}",
        ui::style_text("Cached rates", ui::StyleType::Title),
        table
    )
}

pub fn display_warm_report(report: &WarmReport) -> String {
    let style_type = if report.failed.is_empty() {
        ui::StyleType::Success
    } else {
        ui::StyleType::Error
    };
    let mut output = format!(
        "Warmed {} of {} pairs",
        ui::style_text(&report.warmed.to_string(), style_type),
        report.attempted
    );

    for failure in &report.failed {
        output.push_str(&format!(
            "\n  {} {}",
            ui::style_text(&failure.pair.to_string(), ui::StyleType::Error),
            ui::style_text(&failure.error, ui::StyleType::Subtle)
        ));
    }
    output
}
