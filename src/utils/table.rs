//! Plain-text tables for CLI output.
//!
//! Each column is as wide as its widest cell, measured in display width with
//! ANSI color codes left out, and capped at the column's maximum. Plain cells
//! over the cap are cut short with `…`.

use regex::Regex;
use std::sync::LazyLock;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

static ANSI_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

pub struct Column {
    pub header: String,
    pub max_width: usize,
    pub align: Align,
}

impl Column {
    pub fn new(header: &str, max_width: usize) -> Self {
        Self {
            header: header.to_string(),
            max_width,
            align: Align::Left,
        }
    }

    /// Right-align the column, for numbers and durations.
    pub fn right(mut self) -> Self {
        self.align = Align::Right;
        self
    }
}

fn display_width(cell: &str) -> usize {
    UnicodeWidthStr::width(ANSI_CODE.replace_all(cell, "").as_ref())
}

fn fit(cell: &str, width: usize) -> String {
    if display_width(cell) <= width || ANSI_CODE.is_match(cell) {
        return cell.to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in cell.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn pad(cell: &str, width: usize, align: Align) -> String {
    let fill = " ".repeat(width.saturating_sub(display_width(cell)));
    match align {
        Align::Left => format!("{cell}{fill}"),
        Align::Right => format!("{fill}{cell}"),
    }
}

pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Missing trailing cells render empty.
    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let header = display_width(&col.header);
                let widest = self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| display_width(cell))
                    .max()
                    .unwrap_or(0);
                widest.min(col.max_width).max(header)
            })
            .collect()
    }

    pub fn render(&self) -> String {
        let widths = self.widths();
        let mut out = String::new();

        let line = |cells: Vec<String>| {
            let joined = cells.join("  ");
            format!("{}\n", joined.trim_end())
        };

        out.push_str(&line(
            self.columns
                .iter()
                .zip(&widths)
                .map(|(col, &w)| pad(&col.header, w, col.align))
                .collect(),
        ));

        for row in &self.rows {
            out.push_str(&line(
                self.columns
                    .iter()
                    .zip(&widths)
                    .enumerate()
                    .map(|(i, (col, &w))| {
                        let cell = row.get(i).map(String::as_str).unwrap_or("");
                        pad(&fit(cell, w), w, col.align)
                    })
                    .collect(),
            ));
        }

        out
    }
}
