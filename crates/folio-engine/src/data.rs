use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use folio_contracts::console::{format_plain, TableView};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::stats::Summary;

const MISSING_MARKERS: &[&str] = &["nan", "na", "n/a", "null", "none"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || MISSING_MARKERS.contains(&trimmed.to_ascii_lowercase().as_str()) {
            return Cell::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Cell::Number(value),
            _ => Cell::Text(trimmed.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(value) => format_plain(*value),
            Cell::Text(text) => text.clone(),
        }
    }
}

/// In-memory CSV table with typed cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl DataTable {
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        Self::from_csv_reader(file).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let columns: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(str::to_string)
            .collect();
        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let mut row: Vec<Cell> = record.iter().take(columns.len()).map(Cell::parse).collect();
            row.resize(columns.len(), Cell::Empty);
            rows.push(row);
        }
        Ok(Self { columns, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn has_columns(&self, names: &[&str]) -> bool {
        names.iter().all(|name| self.column_index(name).is_some())
    }

    /// Columns whose present values are all numbers.
    pub fn numeric_columns(&self) -> Vec<String> {
        (0..self.columns.len())
            .filter(|idx| self.is_numeric(*idx))
            .map(|idx| self.columns[idx].clone())
            .collect()
    }

    fn is_numeric(&self, idx: usize) -> bool {
        let mut seen_number = false;
        for row in &self.rows {
            match &row[idx] {
                Cell::Number(_) => seen_number = true,
                Cell::Text(_) => return false,
                Cell::Empty => {}
            }
        }
        seen_number
    }

    /// Present numeric values of a column, in row order.
    pub fn numbers(&self, name: &str) -> Vec<f64> {
        let Some(idx) = self.column_index(name) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter_map(|row| row[idx].as_number())
            .collect()
    }

    /// Pairs of values from two columns, skipping rows missing either.
    pub fn number_pairs(&self, x: &str, y: &str) -> Vec<(f64, f64)> {
        let (Some(xi), Some(yi)) = (self.column_index(x), self.column_index(y)) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter_map(|row| Some((row[xi].as_number()?, row[yi].as_number()?)))
            .collect()
    }

    /// Distinct non-empty display values in first-seen order.
    pub fn unique(&self, name: &str) -> Vec<String> {
        let Some(idx) = self.column_index(name) else {
            return Vec::new();
        };
        let mut seen: Vec<String> = Vec::new();
        for row in &self.rows {
            let value = row[idx].display();
            if !value.is_empty() && !seen.contains(&value) {
                seen.push(value);
            }
        }
        seen
    }

    pub fn value(&self, row: usize, name: &str) -> Option<&Cell> {
        let idx = self.column_index(name)?;
        self.rows.get(row).map(|cells| &cells[idx])
    }

    pub fn filter<F: Fn(&DataTable, usize) -> bool>(&self, keep: F) -> DataTable {
        DataTable {
            columns: self.columns.clone(),
            rows: (0..self.rows.len())
                .filter(|idx| keep(self, *idx))
                .map(|idx| self.rows[idx].clone())
                .collect(),
        }
    }

    pub fn select(&self, names: &[&str]) -> DataTable {
        let indices: Vec<usize> = names
            .iter()
            .filter_map(|name| self.column_index(name))
            .collect();
        DataTable {
            columns: indices.iter().map(|idx| self.columns[*idx].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| indices.iter().map(|idx| row[*idx].clone()).collect())
                .collect(),
        }
    }

    pub fn head(&self, n: usize) -> TableView {
        self.view(Some(n))
    }

    pub fn view(&self, limit: Option<usize>) -> TableView {
        let mut table = TableView::new(&self.columns);
        let take = limit.unwrap_or(self.rows.len());
        for row in self.rows.iter().take(take) {
            table.push_row(row.iter().map(Cell::display).collect());
        }
        table
    }

    /// Summary statistics per numeric column, or per text column when the
    /// table has no numeric columns.
    pub fn describe(&self) -> TableView {
        let numeric = self.numeric_columns();
        if numeric.is_empty() {
            return self.describe_text();
        }

        let mut header = vec![String::new()];
        header.extend(numeric.iter().cloned());
        let mut table = TableView::new(&header);
        let summaries: Vec<Summary> = numeric
            .iter()
            .map(|column| Summary::of(&self.numbers(column)))
            .collect();
        let stats: [(&str, fn(&Summary) -> f64); 8] = [
            ("count", |s| s.count as f64),
            ("mean", |s| s.mean),
            ("std", |s| s.std),
            ("min", |s| s.min),
            ("25%", |s| s.q25),
            ("50%", |s| s.median),
            ("75%", |s| s.q75),
            ("max", |s| s.max),
        ];
        for (label, pick) in stats {
            let mut row = vec![label.to_string()];
            for summary in &summaries {
                let value = pick(summary);
                row.push(if label == "count" {
                    format_plain(value)
                } else {
                    format_stat(value)
                });
            }
            table.push_row(row);
        }
        table
    }

    fn describe_text(&self) -> TableView {
        let mut header = vec![String::new()];
        header.extend(self.columns.iter().cloned());
        let mut table = TableView::new(&header);
        let mut count_row = vec!["count".to_string()];
        let mut unique_row = vec!["unique".to_string()];
        let mut top_row = vec!["top".to_string()];
        let mut freq_row = vec!["freq".to_string()];
        for (idx, _) in self.columns.iter().enumerate() {
            let mut counts: IndexMap<String, usize> = IndexMap::new();
            for row in &self.rows {
                let value = row[idx].display();
                if !value.is_empty() {
                    *counts.entry(value).or_default() += 1;
                }
            }
            let total: usize = counts.values().sum();
            let top = counts
                .iter()
                .fold(None::<(&String, usize)>, |best, (value, count)| match best {
                    Some((_, best_count)) if best_count >= *count => best,
                    _ => Some((value, *count)),
                });
            count_row.push(total.to_string());
            unique_row.push(counts.len().to_string());
            top_row.push(top.map(|(value, _)| value.clone()).unwrap_or_default());
            freq_row.push(top.map(|(_, count)| count.to_string()).unwrap_or_default());
        }
        for row in [count_row, unique_row, top_row, freq_row] {
            table.push_row(row);
        }
        table
    }
}

pub fn format_stat(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{value:.2}")
    }
}
