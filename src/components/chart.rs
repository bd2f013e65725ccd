//! Fixed-height Unicode block chart for time series.

use chrono::{Datelike, NaiveDate};
use ratatui::style::Style;
use ratatui::text::{Line, Span, Text};
use serde::Deserialize;

use crate::theme::ThemeTokens;

/// `"{:>6} ┤"` plus one space of air before the first bar.
pub const Y_AXIS_WIDTH: usize = 9;
pub const BAR_WIDTH: usize = 3;
pub const BAR_GAP: usize = 1;
pub const BAR_FOOTPRINT: usize = BAR_WIDTH + BAR_GAP;
pub const CHART_ROWS: usize = 8;
pub const LABEL_BUDGET: usize = 5;

/// Rows produced for a non-empty chart: bars, baseline and labels.
pub const CHART_HEIGHT: usize = CHART_ROWS + 2;

const EIGHTHS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChartEntry {
    pub label: String,
    pub value: f64,
}

impl ChartEntry {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Round `v` up to 1, 2 or 5 times a power of ten. Non-positive input gives 1.
#[must_use]
pub fn nice_max(v: f64) -> f64 {
    if !v.is_finite() || v <= 0.0 {
        return 1.0;
    }
    let mut base = 10f64.powf(v.log10().floor());
    let mut steps = [1.0, 2.0, 5.0].into_iter().cycle();
    loop {
        let Some(step) = steps.next() else {
            return v;
        };
        let candidate = step * base;
        if candidate >= v {
            return candidate;
        }
        if step == 5.0 {
            base *= 10.0;
        }
    }
}

/// Number of bars that fit next to the axis in `max_width` columns.
#[must_use]
pub fn bars_that_fit(max_width: usize) -> usize {
    max_width.saturating_sub(Y_AXIS_WIDTH) / BAR_FOOTPRINT
}

/// Render the most recent entries that fit into `max_width` columns.
///
/// Returns no lines when there is nothing to draw or not even one bar fits; callers omit the
/// chart in that case.
#[must_use]
pub fn render(entries: &[ChartEntry], max_width: usize) -> Vec<String> {
    let fit = bars_that_fit(max_width);
    if entries.is_empty() || fit == 0 {
        return Vec::new();
    }
    let visible = &entries[entries.len().saturating_sub(fit)..];
    let peak = visible
        .iter()
        .map(|e| sanitize(e.value))
        .fold(0.0_f64, f64::max);
    let top = nice_max(peak);
    let plot_width = visible.len() * BAR_FOOTPRINT;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let heights: Vec<usize> = visible
        .iter()
        .map(|e| ((sanitize(e.value) / top) * (CHART_ROWS * 8) as f64).round() as usize)
        .map(|h| h.min(CHART_ROWS * 8))
        .collect();

    let mut out = Vec::with_capacity(CHART_HEIGHT);
    for row in 0..CHART_ROWS {
        let from_bottom = CHART_ROWS - 1 - row;
        let mut line = axis_label(row, top);
        for h in &heights {
            let fill = h.saturating_sub(from_bottom * 8).min(8);
            let glyph = if fill == 0 { ' ' } else { EIGHTHS[fill - 1] };
            line.extend(std::iter::repeat(glyph).take(BAR_WIDTH));
            line.extend(std::iter::repeat(' ').take(BAR_GAP));
        }
        out.push(line.trim_end().to_string());
    }
    out.push(format!("{:>6} └{}", "0", "─".repeat(plot_width + 1)));
    out.push(label_row(visible, plot_width));
    out
}

fn sanitize(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}

fn axis_label(row: usize, top: f64) -> String {
    if row == 0 {
        format!("{:>6} ┤ ", compact(top))
    } else if row == CHART_ROWS / 2 {
        format!("{:>6} ┤ ", compact(top / 2.0))
    } else {
        format!("{:>6} │ ", "")
    }
}

/// Labels under their bars, thinned as the series grows and never overlapping.
fn label_row(visible: &[ChartEntry], plot_width: usize) -> String {
    let step = match visible.len() {
        0..=10 => 1,
        11..=20 => 2,
        _ => 3,
    };
    let mut cells: Vec<char> = vec![' '; plot_width];
    let mut next_free = 0;
    for (i, entry) in visible.iter().enumerate() {
        if i % step != 0 {
            continue;
        }
        let col = i * BAR_FOOTPRINT;
        if col < next_free {
            continue;
        }
        let short: Vec<char> = shorten_label(&entry.label).chars().collect();
        let room = plot_width - col;
        for (j, ch) in short.iter().take(room).enumerate() {
            cells[col + j] = *ch;
        }
        next_free = col + short.len().min(room) + 1;
    }
    let labels: String = cells.into_iter().collect();
    format!("{}{}", " ".repeat(Y_AXIS_WIDTH), labels).trim_end().to_string()
}

/// Collapse well-known period formats: `2026-02-27` to `2/27`, `2026-01` to `Jan`,
/// `2026-W08` to `W8`. Anything else is cut to [`LABEL_BUDGET`] characters.
#[must_use]
pub fn shorten_label(label: &str) -> String {
    if let Ok(d) = NaiveDate::parse_from_str(label, "%Y-%m-%d") {
        return format!("{}/{}", d.month(), d.day());
    }
    if label.len() == 7 {
        if let Ok(d) = NaiveDate::parse_from_str(&format!("{label}-01"), "%Y-%m-%d") {
            return d.format("%b").to_string();
        }
    }
    if let Some(week) = iso_week(label) {
        return format!("W{week}");
    }
    label.chars().take(LABEL_BUDGET).collect()
}

fn iso_week(label: &str) -> Option<u32> {
    let (year, week) = label.split_once("-W")?;
    if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if week.is_empty() || week.len() > 2 || !week.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let n: u32 = week.parse().ok()?;
    (1..=53).contains(&n).then_some(n)
}

/// Short axis number: `950`, `1.5k`, `12M`, `0.25`.
#[must_use]
pub fn compact(v: f64) -> String {
    let abs = v.abs();
    let (scaled, suffix) = if abs >= 1e9 {
        (v / 1e9, "B")
    } else if abs >= 1e6 {
        (v / 1e6, "M")
    } else if abs >= 1e3 {
        (v / 1e3, "k")
    } else {
        (v, "")
    };
    let s = if scaled.fract() == 0.0 || scaled.abs() >= 100.0 {
        format!("{scaled:.0}")
    } else if scaled.abs() >= 0.01 || scaled == 0.0 {
        let s = format!("{scaled:.2}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        format!("{scaled:.0e}")
    };
    format!("{s}{suffix}")
}

/// [`render`] with axis and bars styled from the theme.
#[must_use]
pub fn render_text(entries: &[ChartEntry], max_width: usize, theme: &ThemeTokens) -> Text<'static> {
    let lines = render(entries, max_width);
    let axis = Style::default().fg(theme.chart_axis);
    let bars = Style::default().fg(theme.chart_bar);
    let count = lines.len();
    Text::from(
        lines
            .into_iter()
            .enumerate()
            .map(|(i, line)| {
                if i + 2 >= count {
                    return Line::from(Span::styled(line, axis));
                }
                let split = line
                    .char_indices()
                    .nth(Y_AXIS_WIDTH)
                    .map_or(line.len(), |(idx, _)| idx);
                let (head, tail) = line.split_at(split);
                Line::from(vec![
                    Span::styled(head.to_string(), axis),
                    Span::styled(tail.to_string(), bars),
                ])
            })
            .collect::<Vec<_>>(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_formats() {
        assert_eq!(compact(0.0), "0");
        assert_eq!(compact(950.0), "950");
        assert_eq!(compact(1500.0), "1.5k");
        assert_eq!(compact(2_000_000.0), "2M");
        assert_eq!(compact(0.25), "0.25");
        assert_eq!(compact(2.5), "2.5");
    }

    #[test]
    fn week_parsing_rejects_garbage() {
        assert_eq!(iso_week("2026-W08"), Some(8));
        assert_eq!(iso_week("2026-W53"), Some(53));
        assert_eq!(iso_week("2026-W54"), None);
        assert_eq!(iso_week("26-W08"), None);
        assert_eq!(iso_week("2026-Wxx"), None);
    }

    #[test]
    fn full_bar_reaches_the_top_row() {
        let lines = render(&[ChartEntry::new("a", 5.0)], 40);
        assert_eq!(lines.len(), CHART_HEIGHT);
        assert!(lines[0].starts_with("     5 ┤"));
        assert!(lines[0].ends_with("███"));
        assert!(lines[CHART_ROWS / 2].starts_with("   2.5 ┤"));
    }

    #[test]
    fn label_row_thins_long_series() {
        let entries: Vec<ChartEntry> = (1..=12)
            .map(|d| ChartEntry::new(format!("2026-03-{d:02}"), f64::from(d)))
            .collect();
        let lines = render(&entries, 200);
        let labels = lines.last().unwrap();
        assert!(labels.contains("3/1"));
        assert!(!labels.contains("3/2 "));
        assert!(labels.contains("3/3"));
    }
}
