//! Terminal rendering helpers shared by every page.

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use core_types::Paginated;
use formatting::Tone;
use std::fmt::Write;

const BAR_GLYPH: char = '█';

pub fn table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );
    table
}

/// Two-column label/value table used for cards and detail pages.
pub fn key_values(rows: Vec<(&str, String)>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label).add_attribute(Attribute::Bold), Cell::new(value)]);
    }
    table
}

pub fn heading(out: &mut String, title: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "─".repeat(title.chars().count()));
}

pub fn push_table(out: &mut String, table: &Table) {
    let _ = writeln!(out, "{}", table);
}

pub fn push_line(out: &mut String, line: impl AsRef<str>) {
    let _ = writeln!(out, "{}", line.as_ref());
}

/// The inline message a page shows in place of a failed query.
pub fn error_line(what: &str, message: &str) -> String {
    format!("Error loading {}: {}", what, message)
}

pub fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Positive => Color::Green,
        Tone::Negative => Color::Red,
        Tone::Neutral => Color::Grey,
    }
}

pub fn toned(text: impl ToString, tone: Tone) -> Cell {
    Cell::new(text.to_string()).fg(tone_color(tone))
}

/// `Page 2 of 3 (43 total)`, or nothing when everything fits on one page.
pub fn pager<T>(page: &Paginated<T>, current_page: u32) -> Option<String> {
    if !page.needs_pagination() {
        return None;
    }
    Some(format!(
        "Page {} of {} ({} total)",
        current_page,
        page.page_count(),
        page.total
    ))
}

/// A horizontal bar `width` cells wide at `max`, scaled linearly.
pub fn text_bar(value: f64, max: f64, width: usize) -> String {
    if !value.is_finite() || !max.is_finite() || max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let cells = ((value / max).min(1.0) * width as f64).round() as usize;
    std::iter::repeat_n(BAR_GLYPH, cells.max(1)).collect()
}

/// The first `limit` items joined by `, `, with `+N more` for the rest.
pub fn first_of<S: AsRef<str>>(items: &[S], limit: usize, uppercase: bool) -> String {
    let mut shown: Vec<String> = items
        .iter()
        .take(limit)
        .map(|s| {
            if uppercase {
                s.as_ref().to_uppercase()
            } else {
                s.as_ref().to_string()
            }
        })
        .collect();
    if items.len() > limit {
        shown.push(format!("+{} more", items.len() - limit));
    }
    shown.join(", ")
}

/// Cuts `text` to `max_chars` characters, appending `...` when it was longer.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut)
}

pub fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}
