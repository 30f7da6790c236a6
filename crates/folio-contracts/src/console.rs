//! Terminal surface shared by the menu and every project routine.
//!
//! [`Console`] has two primitives, reading one line and showing one [`Block`].
//! The widgets in [`ConsoleExt`] are built on those primitives; a blank answer
//! or the end of input always yields the widget's default.

use std::io::{self, BufRead, Cursor, ErrorKind, Write};
use std::path::PathBuf;

use anyhow::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Subheader(String),
    Markdown(String),
    Text(String),
    Info(String),
    Warning(String),
    Error(String),
    Success(String),
    Metric { label: String, value: String },
    Table(TableView),
    Chart { caption: String, path: PathBuf },
    Preformatted(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableView {
    pub fn new<S: AsRef<str>>(headers: &[S]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.as_ref().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn render_lines(&self) -> Vec<String> {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for row in std::iter::once(&self.headers).chain(self.rows.iter()) {
            for (idx, cell) in row.iter().enumerate() {
                widths[idx] = widths[idx].max(cell.chars().count());
            }
        }

        let format_row = |row: &[String]| -> String {
            let cells: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(idx, width)| {
                    let cell = row.get(idx).map(String::as_str).unwrap_or("");
                    format!("{cell:<width$}")
                })
                .collect();
            cells.join(" | ").trim_end().to_string()
        };

        let mut lines = vec![format_row(&self.headers)];
        lines.push(
            widths
                .iter()
                .map(|width| "-".repeat(*width))
                .collect::<Vec<String>>()
                .join("-+-"),
        );
        for row in &self.rows {
            lines.push(format_row(row));
        }
        if self.rows.is_empty() {
            lines.push("(no rows)".to_string());
        }
        lines
    }
}

pub trait Console {
    /// Reads one line without its terminator. `None` at end of input.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    fn show(&mut self, block: Block) -> Result<()>;
}

pub trait ConsoleExt: Console {
    fn title(&mut self, text: &str) -> Result<()> {
        self.show(Block::Title(text.to_string()))
    }

    fn subheader(&mut self, text: &str) -> Result<()> {
        self.show(Block::Subheader(text.to_string()))
    }

    fn markdown(&mut self, text: &str) -> Result<()> {
        self.show(Block::Markdown(text.to_string()))
    }

    fn write(&mut self, text: &str) -> Result<()> {
        self.show(Block::Text(text.to_string()))
    }

    fn info(&mut self, text: &str) -> Result<()> {
        self.show(Block::Info(text.to_string()))
    }

    fn warning(&mut self, text: &str) -> Result<()> {
        self.show(Block::Warning(text.to_string()))
    }

    fn error(&mut self, text: &str) -> Result<()> {
        self.show(Block::Error(text.to_string()))
    }

    fn success(&mut self, text: &str) -> Result<()> {
        self.show(Block::Success(text.to_string()))
    }

    fn metric(&mut self, label: &str, value: &str) -> Result<()> {
        self.show(Block::Metric {
            label: label.to_string(),
            value: value.to_string(),
        })
    }

    fn table(&mut self, table: TableView) -> Result<()> {
        self.show(Block::Table(table))
    }

    fn chart(&mut self, caption: &str, path: PathBuf) -> Result<()> {
        self.show(Block::Chart {
            caption: caption.to_string(),
            path,
        })
    }

    fn text_input(&mut self, label: &str, default: &str) -> Result<String> {
        let prompt = if default.is_empty() {
            format!("{label}: ")
        } else {
            format!("{label} [{default}]: ")
        };
        match self.read_line(&prompt)? {
            Some(line) if !line.trim().is_empty() => Ok(line.trim().to_string()),
            _ => Ok(default.to_string()),
        }
    }

    /// Multi-line input terminated by an empty line.
    fn text_area(&mut self, label: &str) -> Result<String> {
        self.show(Block::Text(format!("{label} (finish with an empty line)")))?;
        let mut lines = Vec::new();
        while let Some(line) = self.read_line("| ")? {
            if line.trim().is_empty() {
                break;
            }
            lines.push(line);
        }
        Ok(lines.join("\n"))
    }

    fn number_input(&mut self, label: &str, min: f64, max: f64, default: f64) -> Result<f64> {
        let prompt = format!(
            "{label} ({} to {}) [{}]: ",
            format_plain(min),
            format_plain(max),
            format_plain(default)
        );
        loop {
            let Some(line) = self.read_line(&prompt)? else {
                return Ok(default);
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return Ok(default);
            }
            match parse_number(trimmed) {
                Some(value) if value >= min && value <= max => return Ok(value),
                _ => self.show(Block::Warning(format!(
                    "Enter a number between {} and {}.",
                    format_plain(min),
                    format_plain(max)
                )))?,
            }
        }
    }

    fn slider(&mut self, label: &str, min: f64, max: f64, default: f64) -> Result<f64> {
        self.number_input(label, min, max, default)
    }

    fn range_slider(
        &mut self,
        label: &str,
        min: f64,
        max: f64,
        default: (f64, f64),
    ) -> Result<(f64, f64)> {
        let prompt = format!(
            "{label} (low..high within {}..{}) [{}..{}]: ",
            format_plain(min),
            format_plain(max),
            format_plain(default.0),
            format_plain(default.1)
        );
        loop {
            let Some(line) = self.read_line(&prompt)? else {
                return Ok(default);
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return Ok(default);
            }
            match parse_range(trimmed) {
                Some((low, high)) if min <= low && low <= high && high <= max => {
                    return Ok((low, high))
                }
                _ => self.show(Block::Warning(format!(
                    "Enter a range like {}..{}.",
                    format_plain(min),
                    format_plain(max)
                )))?,
            }
        }
    }

    /// Single choice. `None` only when there is nothing to choose from.
    fn selectbox<S: AsRef<str>>(
        &mut self,
        label: &str,
        options: &[S],
        default: usize,
    ) -> Result<Option<usize>> {
        if options.is_empty() {
            return Ok(None);
        }
        let default = default.min(options.len() - 1);
        self.show(Block::Preformatted(numbered_options(options)))?;
        let prompt = format!("{label} [{}]: ", options[default].as_ref());
        loop {
            let Some(line) = self.read_line(&prompt)? else {
                return Ok(Some(default));
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return Ok(Some(default));
            }
            match match_option(trimmed, options) {
                Some(idx) => return Ok(Some(idx)),
                None => self.show(Block::Warning(format!(
                    "Choose a number between 1 and {} or an option name.",
                    options.len()
                )))?,
            }
        }
    }

    /// Comma separated choices; `none` selects nothing.
    fn multiselect<S: AsRef<str>>(
        &mut self,
        label: &str,
        options: &[S],
        defaults: &[usize],
    ) -> Result<Vec<usize>> {
        if options.is_empty() {
            return Ok(Vec::new());
        }
        self.show(Block::Preformatted(numbered_options(options)))?;
        let default_text = if defaults.is_empty() {
            "none".to_string()
        } else {
            defaults
                .iter()
                .filter_map(|idx| options.get(*idx))
                .map(|option| option.as_ref().to_string())
                .collect::<Vec<String>>()
                .join(", ")
        };
        let prompt = format!("{label} [{default_text}]: ");
        'prompt: loop {
            let Some(line) = self.read_line(&prompt)? else {
                return Ok(defaults.to_vec());
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return Ok(defaults.to_vec());
            }
            if trimmed.eq_ignore_ascii_case("none") {
                return Ok(Vec::new());
            }
            let mut picked: Vec<usize> = Vec::new();
            for token in trimmed.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                let Some(idx) = match_option(token, options) else {
                    self.show(Block::Warning(format!("Unknown option '{token}'.")))?;
                    continue 'prompt;
                };
                if !picked.contains(&idx) {
                    picked.push(idx);
                }
            }
            return Ok(picked);
        }
    }

    fn button(&mut self, label: &str) -> Result<bool> {
        let answer = self.read_line(&format!("{label}? [y/N]: "))?;
        Ok(matches!(
            answer.as_deref().map(str::trim).map(str::to_ascii_lowercase).as_deref(),
            Some("y") | Some("yes")
        ))
    }
}

impl<C: Console + ?Sized> ConsoleExt for C {}

/// Plain-text console over any line reader and writer.
pub struct TextConsole<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> TextConsole<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    fn write_lines<I: IntoIterator<Item = String>>(&mut self, lines: I) -> io::Result<()> {
        for line in lines {
            writeln!(self.writer, "{line}")?;
        }
        Ok(())
    }
}

impl TextConsole<Cursor<Vec<u8>>, Vec<u8>> {
    /// Console fed from a fixed script, capturing everything it prints.
    pub fn scripted(input: &str) -> Self {
        Self::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    pub fn transcript(&self) -> String {
        String::from_utf8_lossy(&self.writer).into_owned()
    }
}

impl<R: BufRead, W: Write> Console for TextConsole<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.writer, "{prompt}")?;
        self.writer.flush()?;
        let mut line = String::new();
        loop {
            match self.reader.read_line(&mut line) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(line.trim_end_matches(['\n', '\r']).to_string())),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn show(&mut self, block: Block) -> Result<()> {
        let lines = match block {
            Block::Title(text) => {
                let rule = "=".repeat(text.chars().count());
                vec![String::new(), text, rule]
            }
            Block::Subheader(text) => {
                let rule = "-".repeat(text.chars().count());
                vec![String::new(), text, rule]
            }
            Block::Markdown(text) | Block::Text(text) => {
                text.lines().map(|line| line.trim().to_string()).collect()
            }
            Block::Info(text) => vec![format!("[info] {text}")],
            Block::Warning(text) => vec![format!("[warning] {text}")],
            Block::Error(text) => vec![format!("[error] {text}")],
            Block::Success(text) => vec![format!("[ok] {text}")],
            Block::Metric { label, value } => vec![format!("{label}: {value}")],
            Block::Table(table) => table.render_lines(),
            Block::Chart { caption, path } => {
                vec![format!("[chart] {caption}: {}", path.display())]
            }
            Block::Preformatted(lines) => lines,
        };
        self.write_lines(lines)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Formats a number without a trailing `.0` for whole values.
pub fn format_plain(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

/// `1234567.891` -> `1,234,567.89`
pub fn format_thousands(value: f64) -> String {
    let rendered = format!("{:.2}", value.abs());
    let (whole, frac) = rendered.split_once('.').unwrap_or((rendered.as_str(), "00"));
    let mut grouped = String::new();
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && rendered != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac}")
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn parse_range(raw: &str) -> Option<(f64, f64)> {
    let (low, high) = match raw.split_once("..") {
        Some(parts) => parts,
        None => {
            let mut parts = raw.split_whitespace();
            let low = parts.next()?;
            let high = parts.next()?;
            if parts.next().is_some() {
                return None;
            }
            (low, high)
        }
    };
    Some((parse_number(low.trim())?, parse_number(high.trim())?))
}

fn numbered_options<S: AsRef<str>>(options: &[S]) -> Vec<String> {
    options
        .iter()
        .enumerate()
        .map(|(idx, option)| format!("  {}) {}", idx + 1, option.as_ref()))
        .collect()
}

fn match_option<S: AsRef<str>>(token: &str, options: &[S]) -> Option<usize> {
    if let Ok(number) = token.parse::<usize>() {
        if (1..=options.len()).contains(&number) {
            return Some(number - 1);
        }
    }
    options
        .iter()
        .position(|option| option.as_ref() == token)
        .or_else(|| {
            options
                .iter()
                .position(|option| option.as_ref().eq_ignore_ascii_case(token))
        })
}
