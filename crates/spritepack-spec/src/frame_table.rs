//! Companion frame tables.
//!
//! A frame table is a `;`-delimited text file living next to a tile grid
//! image (`hero__16x16.png` pairs with `hero.csv`). After one header row,
//! every record binds a rectangular range of tiles to a named clip:
//!
//! ```text
//! name;start_col;start_row;col_count;row_count;fps;loop
//! walk;0;0;2;4;12;true
//! ```
//!
//! Records are split on every `;`. There is no quoting or escaping: quote
//! characters are kept as part of the field and a clip name cannot contain
//! the delimiter.

use crate::error::SpecError;

/// Field delimiter of frame table records.
pub const FRAME_TABLE_DELIMITER: char = ';';

/// File extension of frame tables.
pub const FRAME_TABLE_EXTENSION: &str = "csv";

/// One clip definition from a frame table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameTableRecord {
    /// Clip name.
    pub name: String,
    /// First tile column of the range.
    pub start_col: u32,
    /// First tile row of the range.
    pub start_row: u32,
    /// Number of columns in the range.
    pub col_count: u32,
    /// Number of rows in the range.
    pub row_count: u32,
    /// Playback rate in frames per second.
    pub fps: u32,
    /// Whether the clip loops.
    pub looping: bool,
    /// 1-based line number in the table, for diagnostics.
    pub line: usize,
}

impl FrameTableRecord {
    /// Column range `[start_col, start_col + col_count)`.
    pub fn columns(&self) -> std::ops::Range<u32> {
        self.start_col..self.start_col.saturating_add(self.col_count)
    }

    /// Row range `[start_row, start_row + row_count)`.
    pub fn rows(&self) -> std::ops::Range<u32> {
        self.start_row..self.start_row.saturating_add(self.row_count)
    }
}

/// A parsed frame table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameTable {
    /// Identity of the table (usually its relative path), for diagnostics.
    pub source: String,
    /// Records in declaration order.
    pub records: Vec<FrameTableRecord>,
}

impl FrameTable {
    /// Parses a frame table.
    ///
    /// The first line is a header and is skipped. Blank lines are ignored and
    /// every field is trimmed. The `loop` field is non-looping only when it
    /// reads `false` (case-insensitive); any other value loops.
    pub fn parse(source: impl Into<String>, text: &str) -> Result<Self, SpecError> {
        let source = source.into();
        let mut records = Vec::new();

        for (index, raw) in text.lines().enumerate().skip(1) {
            let line = index + 1;
            if raw.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = raw.split(FRAME_TABLE_DELIMITER).map(str::trim).collect();
            if fields.len() < 7 {
                return Err(SpecError::invalid_table(
                    &source,
                    line,
                    format!("expected 7 fields, found {}", fields.len()),
                ));
            }

            let name = fields[0];
            if name.is_empty() {
                return Err(SpecError::invalid_table(&source, line, "clip name is empty"));
            }

            let number = |column: usize, label: &str| -> Result<u32, SpecError> {
                fields[column].parse::<u32>().map_err(|_| {
                    SpecError::invalid_table(
                        &source,
                        line,
                        format!("{} '{}' is not a non-negative integer", label, fields[column]),
                    )
                })
            };

            records.push(FrameTableRecord {
                name: name.to_string(),
                start_col: number(1, "start_col")?,
                start_row: number(2, "start_row")?,
                col_count: number(3, "col_count")?,
                row_count: number(4, "row_count")?,
                fps: number(5, "fps")?,
                looping: !fields[6].eq_ignore_ascii_case("false"),
                line,
            });
        }

        Ok(Self { source, records })
    }

    /// Returns true if the table declares no clips.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
