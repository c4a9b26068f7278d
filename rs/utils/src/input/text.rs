use std::path::Path;

use anyhow::{anyhow, Result};
use log::debug;

use super::{Input, Row};

const MISSING_TOKENS: [&str; 5] = ["", "nan", "na", "?", "null"];

/// Reads a delimited text file of numbers, one data point per line.
///
/// Cells are separated by commas, semicolons, tabs or runs of spaces. Lines that are empty or
/// start with `#` are skipped. If the first remaining line isn't numeric it is taken as the
/// header with component names. Missing cells (`NaN`, `NA`, `?`, `null` or empty) become NaN.
pub struct TextReader {
    component_names: Vec<String>,
    rows: Vec<Vec<f32>>,
    dimension: usize,
    row_idx: usize,
}

fn split_line(line: &str) -> Vec<&str> {
    if line.contains([',', ';', '\t']) {
        line.split([',', ';', '\t']).map(|cell| cell.trim()).collect()
    } else {
        line.split_whitespace().collect()
    }
}

fn is_missing(cell: &str) -> bool {
    let lower = cell.to_ascii_lowercase();
    MISSING_TOKENS.contains(&lower.as_str())
}

fn parse_cell(cell: &str) -> Option<f32> {
    if is_missing(cell) {
        return Some(f32::NAN);
    }
    cell.parse::<f32>().ok()
}

impl TextReader {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e))?;
        Self::from_text(&content)
    }

    pub fn from_text(content: &str) -> Result<Self> {
        let mut component_names = vec![];
        let mut rows: Vec<Vec<f32>> = vec![];
        let mut dimension = 0;

        let lines = content
            .lines()
            .enumerate()
            .map(|(line_no, line)| (line_no + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

        for (line_no, line) in lines {
            let cells = split_line(line);
            let parsed = cells.iter().map(|cell| parse_cell(cell)).collect::<Vec<_>>();

            if parsed.iter().any(|value| value.is_none()) {
                if rows.is_empty() && component_names.is_empty() {
                    component_names = cells.iter().map(|cell| cell.to_string()).collect();
                    dimension = component_names.len();
                    continue;
                }
                return Err(anyhow!("Line {}: non-numeric value in '{}'", line_no, line));
            }

            let row = parsed.into_iter().flatten().collect::<Vec<f32>>();
            if dimension == 0 {
                dimension = row.len();
            }
            if row.len() != dimension {
                return Err(anyhow!(
                    "Line {}: expected {} values, found {}",
                    line_no,
                    dimension,
                    row.len()
                ));
            }
            rows.push(row);
        }

        debug!("Read {} rows of dimension {}", rows.len(), dimension);
        Ok(Self {
            component_names,
            rows,
            dimension,
            row_idx: 0,
        })
    }

    pub fn component_names(&self) -> &[String] {
        &self.component_names
    }
}

impl Input for TextReader {
    fn has_next(&self) -> bool {
        self.row_idx < self.rows.len()
    }

    // Caller is responsible for checking has_next first
    fn next(&mut self) -> Row<'_> {
        let id = self.row_idx as u64;
        self.row_idx += 1;
        Row {
            id,
            data: &self.rows[id as usize],
        }
    }

    fn reset(&mut self) {
        self.row_idx = 0;
    }

    fn num_rows(&self) -> usize {
        self.rows.len()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
