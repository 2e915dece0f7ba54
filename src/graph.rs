use std::io::stdout;

use anyhow::Result;
use crossterm::execute;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Bar, BarChart, BarGroup, Block},
    Terminal, TerminalOptions, Viewport,
};

use crate::output::format_usd;
use crate::types::{AggregateView, DateTotal, RegionTotal};

const PALETTE: [Color; 6] = [
    Color::Magenta,
    Color::Blue,
    Color::Cyan,
    Color::Green,
    Color::Red,
    Color::Yellow,
];

const TREND_HEIGHT: u16 = 17; // 15 for bars + 2 for border

#[derive(Debug, Clone, PartialEq)]
struct ChartBar {
    label: String,
    cents: u64,
    text: String,
}

fn cents(cost: f64) -> u64 {
    (cost.max(0.0) * 100.0).round() as u64
}

/// Daily bars labelled `MM-DD`.
fn trend_bars(dates: &[DateTotal]) -> Vec<ChartBar> {
    dates
        .iter()
        .map(|d| ChartBar {
            label: d.date.get(5..).unwrap_or(d.date.as_str()).to_string(),
            cents: cents(d.cost),
            text: format_usd(d.cost),
        })
        .collect()
}

fn region_bars(regions: &[RegionTotal]) -> Vec<ChartBar> {
    regions
        .iter()
        .map(|r| ChartBar {
            label: r.region.clone(),
            cents: cents(r.cost),
            text: format_usd(r.cost),
        })
        .collect()
}

/// One row per bar plus a gap row, and 2 for the border.
fn region_chart_height(bars: usize) -> u16 {
    u16::try_from(bars)
        .unwrap_or(u16::MAX)
        .saturating_mul(2)
        .saturating_add(2)
}

pub fn render(view: &AggregateView) -> Result<()> {
    if view.date_totals.is_empty() {
        eprintln!("No costs to plot.");
        return Ok(());
    }

    let trend: Vec<Bar> = trend_bars(&view.date_totals)
        .into_iter()
        .map(|b| {
            Bar::default()
                .value(b.cents)
                .label(b.label.into())
                .text_value(b.text)
                .style(Style::default().fg(PALETTE[0]))
        })
        .collect();

    let regions: Vec<Bar> = region_bars(&view.region_totals)
        .into_iter()
        .enumerate()
        .map(|(i, b)| {
            Bar::default()
                .value(b.cents)
                .label(b.label.into())
                .text_value(b.text)
                .style(Style::default().fg(PALETTE[i % PALETTE.len()]))
        })
        .collect();

    let trend_chart = BarChart::default()
        .block(Block::bordered().title("Daily cost trend"))
        .data(BarGroup::default().bars(&trend))
        .bar_width(9)
        .bar_gap(1)
        .value_style(Style::default().fg(Color::White))
        .label_style(Style::default().fg(Color::DarkGray));

    let region_chart = BarChart::default()
        .block(Block::bordered().title("Regional distribution"))
        .direction(Direction::Horizontal)
        .data(BarGroup::default().bars(&regions))
        .bar_width(1)
        .bar_gap(1)
        .value_style(Style::default().fg(Color::White))
        .label_style(Style::default().fg(Color::DarkGray));

    let region_height = region_chart_height(regions.len());

    let mut terminal = Terminal::with_options(
        CrosstermBackend::new(stdout()),
        TerminalOptions {
            viewport: Viewport::Inline(TREND_HEIGHT.saturating_add(region_height)),
        },
    )?;

    terminal.draw(|frame| {
        let [top, bottom] = Layout::vertical([
            Constraint::Length(TREND_HEIGHT),
            Constraint::Length(region_height),
        ])
        .areas(frame.area());
        frame.render_widget(trend_chart, top);
        frame.render_widget(region_chart, bottom);
    })?;

    // Move cursor below the charts
    execute!(stdout(), crossterm::cursor::MoveDown(1))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cents_clamps_and_rounds() {
        assert_eq!(cents(12.346), 1235);
        assert_eq!(cents(-3.0), 0);
        assert_eq!(cents(0.0), 0);
    }

    #[test]
    fn test_region_chart_height_saturates() {
        assert_eq!(region_chart_height(0), 2);
        assert_eq!(region_chart_height(3), 8);
        assert_eq!(region_chart_height(40_000), u16::MAX);
        assert_eq!(region_chart_height(usize::MAX), u16::MAX);
    }

    #[test]
    fn test_trend_labels() {
        let bars = trend_bars(&[
            DateTotal {
                date: "2024-01-01".into(),
                cost: 5.0,
            },
            DateTotal {
                date: "day1".into(),
                cost: 1234.0,
            },
        ]);
        assert_eq!(bars[0].label, "01-01");
        assert_eq!(bars[0].text, "$5.00");
        assert_eq!(bars[1].label, "day1");
        assert_eq!(bars[1].cents, 123_400);
    }

    #[test]
    fn test_region_bars_keep_order() {
        let bars = region_bars(&[
            RegionTotal {
                region: "us-west-2".into(),
                cost: 1.0,
            },
            RegionTotal {
                region: "eu-central-1".into(),
                cost: 2.0,
            },
        ]);
        let labels: Vec<&str> = bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, ["us-west-2", "eu-central-1"]);
    }
}
