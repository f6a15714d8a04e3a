//! Text formatting functions for report cells and tables.
//!
//! Provides plain text formatting for terminal and markdown output:
//! - Unit-scaled times (ns, µs, ms, s)
//! - Ratios, byte counts and signed byte deltas
//! - Padded, `|`-separated tables that read as markdown too

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

/// Cell text for a missing value.
pub const PLACEHOLDER: &str = "-";

/// Identity-column text of an empty table's only row.
pub const EMPTY_ROW: &str = "(none)";

/// Minimum width of the first table column.
pub const MIN_IDENTITY_WIDTH: usize = 30;

/// Formatting options for text output.
#[derive(Debug, Clone, Copy)]
pub struct TextFormatOptions {
    pub use_color: bool,
}

impl TextFormatOptions {
    #[must_use]
    pub const fn plain() -> Self {
        Self { use_color: false }
    }
}

const UNITS: [(&str, f64); 4] = [
    ("ns", 1.0),
    ("µs", 1_000.0),
    ("ms", 1_000_000.0),
    ("s", 1_000_000_000.0),
];

/// Format a nanosecond duration with a readable unit.
///
/// Precision shrinks as the scaled value grows: 2 decimals below 1000,
/// 1 below 100000, none above.
#[must_use]
pub fn format_time(nanos: f64) -> String {
    if !nanos.is_finite() {
        return PLACEHOLDER.to_string();
    }

    let magnitude = nanos.abs();
    let mut index = UNITS
        .iter()
        .rposition(|(_, scale)| magnitude >= *scale)
        .unwrap_or(0);
    // Rounding to two decimals can carry into the next unit (999.996 ns).
    if index + 1 < UNITS.len() && (magnitude / UNITS[index].1 * 100.0).round() >= 100_000.0 {
        index += 1;
    }

    let (unit, scale) = UNITS[index];
    let value = nanos / scale;
    let decimals = match value.abs() {
        v if v < 1_000.0 => 2,
        v if v < 100_000.0 => 1,
        _ => 0,
    };
    format!("{value:.decimals$} {unit}")
}

/// Format a time ratio with two decimals.
#[must_use]
pub fn format_ratio(ratio: f64) -> String {
    if ratio.is_finite() {
        format!("{ratio:.2}")
    } else {
        "inf".to_string()
    }
}

/// Format an allocation size, or the placeholder when not measured.
#[must_use]
pub fn format_bytes(bytes: Option<i64>) -> String {
    bytes.map_or_else(|| PLACEHOLDER.to_string(), |b| format!("{b} B"))
}

/// Format a signed byte difference, or the placeholder.
#[must_use]
pub fn format_delta(delta: Option<i64>) -> String {
    match delta {
        Some(d) if d > 0 => format!("+{d} B"),
        Some(d) => format!("{d} B"),
        None => PLACEHOLDER.to_string(),
    }
}

/// Displayed width of `text` in terminal columns.
#[must_use]
pub fn visible_len(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

fn pad(text: &str, width: usize, align: Align) -> String {
    let fill = " ".repeat(width.saturating_sub(visible_len(text)));
    match align {
        Align::Left => format!("{text}{fill}"),
        Align::Right => format!("{fill}{text}"),
    }
}

/// Column alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// How a cell is highlighted when color is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Good,
    Bad,
}

fn paint(text: String, tone: Tone, options: TextFormatOptions) -> String {
    if !options.use_color {
        return text;
    }
    match tone {
        Tone::Plain => text,
        Tone::Good => text.green().to_string(),
        Tone::Bad => text.red().to_string(),
    }
}

/// A fixed-column table.
///
/// The first column is left-aligned and at least [`MIN_IDENTITY_WIDTH`]
/// wide; the alignment of the others is given per column.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    aligns: Vec<Align>,
    rows: Vec<(Vec<String>, Tone)>,
}

impl Table {
    #[must_use]
    pub fn new(columns: &[(&str, Align)]) -> Self {
        Self {
            headers: columns.iter().map(|(h, _)| (*h).to_string()).collect(),
            aligns: columns.iter().map(|(_, a)| *a).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; `tone` colors its last cell.
    pub fn push(&mut self, cells: Vec<String>, tone: Tone) {
        debug_assert_eq!(cells.len(), self.headers.len());
        self.rows.push((cells, tone));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the table as lines, without trailing newlines.
    ///
    /// An empty table renders one `(none)` row.
    #[must_use]
    pub fn render(&self, options: TextFormatOptions) -> Vec<String> {
        let placeholder_row;
        let rows: Vec<(&[String], Tone)> = if self.rows.is_empty() {
            placeholder_row = std::iter::once(EMPTY_ROW.to_string())
                .chain(std::iter::repeat_n(
                    PLACEHOLDER.to_string(),
                    self.headers.len().saturating_sub(1),
                ))
                .collect::<Vec<_>>();
            vec![(placeholder_row.as_slice(), Tone::Plain)]
        } else {
            self.rows.iter().map(|(c, t)| (c.as_slice(), *t)).collect()
        };

        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let cells = rows.iter().map(|(cells, _)| visible_len(&cells[i]));
                let width = cells.chain([visible_len(header)]).max().unwrap_or(0);
                if i == 0 { width.max(MIN_IDENTITY_WIDTH) } else { width }
            })
            .collect();

        let mut lines = Vec::with_capacity(rows.len() + 2);
        lines.push(self.line(&self.headers, &widths, Tone::Plain, TextFormatOptions::plain()));
        lines.push(self.rule(&widths));
        for (cells, tone) in rows {
            lines.push(self.line(cells, &widths, tone, options));
        }
        lines
    }

    fn align(&self, column: usize) -> Align {
        if column == 0 {
            Align::Left
        } else {
            self.aligns.get(column).copied().unwrap_or(Align::Left)
        }
    }

    fn line(
        &self,
        cells: &[String],
        widths: &[usize],
        tone: Tone,
        options: TextFormatOptions,
    ) -> String {
        let last = cells.len().saturating_sub(1);
        let padded: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let text = pad(cell, widths[i], self.align(i));
                if i == last { paint(text, tone, options) } else { text }
            })
            .collect();
        format!("| {} |", padded.join(" | "))
    }

    fn rule(&self, widths: &[usize]) -> String {
        let parts: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| match self.align(i) {
                Align::Left => "-".repeat(w + 2),
                Align::Right => format!("{}:", "-".repeat(w + 1)),
            })
            .collect();
        format!("|{}|", parts.join("|"))
    }
}
