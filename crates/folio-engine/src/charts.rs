//! PNG charts drawn with `image`, plus plain-text renderings for the terminal.

use std::path::Path;

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};

use crate::stats::Bin;

pub const CHART_WIDTH: u32 = 800;
pub const CHART_HEIGHT: u32 = 480;
const MARGIN: u32 = 40;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([60, 60, 60]);
const GRID: Rgb<u8> = Rgb([228, 228, 228]);
const PRIMARY: Rgb<u8> = Rgb([99, 110, 250]);
const HIGHLIGHT: Rgb<u8> = Rgb([220, 40, 40]);
const SKY: Rgb<u8> = Rgb([135, 206, 235]);
const PALETTE: [Rgb<u8>; 4] = [
    Rgb([99, 110, 250]),
    Rgb([239, 85, 59]),
    Rgb([0, 204, 150]),
    Rgb([171, 99, 250]),
];

#[derive(Debug, Clone, Copy)]
struct Bounds {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl Bounds {
    fn around(points: impl Iterator<Item = (f64, f64)>) -> Self {
        let mut bounds = Bounds {
            x_min: f64::INFINITY,
            x_max: f64::NEG_INFINITY,
            y_min: f64::INFINITY,
            y_max: f64::NEG_INFINITY,
        };
        for (x, y) in points {
            bounds.x_min = bounds.x_min.min(x);
            bounds.x_max = bounds.x_max.max(x);
            bounds.y_min = bounds.y_min.min(y);
            bounds.y_max = bounds.y_max.max(y);
        }
        if !bounds.x_min.is_finite() {
            bounds = Bounds {
                x_min: 0.0,
                x_max: 1.0,
                y_min: 0.0,
                y_max: 1.0,
            };
        }
        if bounds.x_min == bounds.x_max {
            bounds.x_min -= 1.0;
            bounds.x_max += 1.0;
        }
        if bounds.y_min == bounds.y_max {
            bounds.y_min -= 1.0;
            bounds.y_max += 1.0;
        }
        bounds
    }

    fn padded(mut self, fraction: f64) -> Self {
        let dx = (self.x_max - self.x_min) * fraction;
        let dy = (self.y_max - self.y_min) * fraction;
        self.x_min -= dx;
        self.x_max += dx;
        self.y_min -= dy;
        self.y_max += dy;
        self
    }
}

struct Canvas {
    image: RgbImage,
    bounds: Bounds,
}

impl Canvas {
    fn new(bounds: Bounds) -> Self {
        let mut canvas = Self {
            image: RgbImage::from_pixel(CHART_WIDTH, CHART_HEIGHT, BACKGROUND),
            bounds,
        };
        for step in 1..5 {
            let y = MARGIN + (CHART_HEIGHT - 2 * MARGIN) * step / 5;
            canvas.line((MARGIN as i64, y as i64), ((CHART_WIDTH - MARGIN) as i64, y as i64), GRID);
        }
        let bottom = (CHART_HEIGHT - MARGIN) as i64;
        let left = MARGIN as i64;
        canvas.line((left, MARGIN as i64), (left, bottom), AXIS);
        canvas.line((left, bottom), ((CHART_WIDTH - MARGIN) as i64, bottom), AXIS);
        canvas
    }

    fn to_px(&self, x: f64, y: f64) -> (i64, i64) {
        let plot_w = f64::from(CHART_WIDTH - 2 * MARGIN);
        let plot_h = f64::from(CHART_HEIGHT - 2 * MARGIN);
        let b = self.bounds;
        let px = f64::from(MARGIN) + (x - b.x_min) / (b.x_max - b.x_min) * plot_w;
        let py = f64::from(CHART_HEIGHT - MARGIN) - (y - b.y_min) / (b.y_max - b.y_min) * plot_h;
        (px.round() as i64, py.round() as i64)
    }

    fn put(&mut self, x: i64, y: i64, color: Rgb<u8>) {
        if x >= 0 && y >= 0 && x < i64::from(CHART_WIDTH) && y < i64::from(CHART_HEIGHT) {
            self.image.put_pixel(x as u32, y as u32, color);
        }
    }

    fn fill_rect(&mut self, a: (i64, i64), b: (i64, i64), color: Rgb<u8>) {
        for x in a.0.min(b.0)..=a.0.max(b.0) {
            for y in a.1.min(b.1)..=a.1.max(b.1) {
                self.put(x, y, color);
            }
        }
    }

    fn line(&mut self, from: (i64, i64), to: (i64, i64), color: Rgb<u8>) {
        let (mut x, mut y) = from;
        let dx = (to.0 - x).abs();
        let dy = -(to.1 - y).abs();
        let sx = if x < to.0 { 1 } else { -1 };
        let sy = if y < to.1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.put(x, y, color);
            if x == to.0 && y == to.1 {
                break;
            }
            let doubled = 2 * err;
            if doubled >= dy {
                err += dy;
                x += sx;
            }
            if doubled <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn dot(&mut self, center: (i64, i64), radius: i64, color: Rgb<u8>) {
        for x in -radius..=radius {
            for y in -radius..=radius {
                if x * x + y * y <= radius * radius {
                    self.put(center.0 + x, center.1 + y, color);
                }
            }
        }
    }

    fn cross(&mut self, center: (i64, i64), arm: i64, color: Rgb<u8>) {
        for offset in [-1, 0, 1] {
            self.line(
                (center.0 - arm, center.1 - arm + offset),
                (center.0 + arm, center.1 + arm + offset),
                color,
            );
            self.line(
                (center.0 - arm, center.1 + arm + offset),
                (center.0 + arm, center.1 - arm + offset),
                color,
            );
        }
    }

    fn save(self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.image
            .save(path)
            .with_context(|| format!("failed to save {}", path.display()))
    }
}

pub fn histogram_chart(path: &Path, bins: &[Bin]) -> Result<()> {
    let first = bins.first().map(|bin| bin.start).unwrap_or(0.0);
    let last = bins.last().map(|bin| bin.end).unwrap_or(1.0);
    let peak = bins.iter().map(|bin| bin.count).max().unwrap_or(0) as f64;
    let bounds = Bounds::around([(first, 0.0), (last, peak * 1.05)].into_iter());
    let mut canvas = Canvas::new(bounds);
    for bin in bins {
        if bin.count == 0 {
            continue;
        }
        let top_left = canvas.to_px(bin.start, bin.count as f64);
        let bottom_right = canvas.to_px(bin.end, 0.0);
        canvas.fill_rect(top_left, (bottom_right.0 - 1, bottom_right.1 - 1), PRIMARY);
    }
    canvas.save(path)
}

/// One vertical bar per value, coloured from a fixed palette.
pub fn bar_chart(path: &Path, values: &[f64]) -> Result<()> {
    let slots = values.len().max(1) as f64;
    let bounds = Bounds::around(
        values
            .iter()
            .map(|value| (0.0, *value))
            .chain([(0.0, 0.0), (slots, 0.0)]),
    );
    let bounds = Bounds {
        y_max: bounds.y_max + (bounds.y_max - bounds.y_min) * 0.05,
        ..bounds
    };
    let mut canvas = Canvas::new(bounds);
    for (idx, value) in values.iter().enumerate() {
        let a = canvas.to_px(idx as f64 + 0.15, *value);
        let b = canvas.to_px(idx as f64 + 0.85, 0.0);
        canvas.fill_rect(a, b, PALETTE[idx % PALETTE.len()]);
    }
    canvas.save(path)
}

/// Horizontal bars, first value on top.
pub fn horizontal_bar_chart(path: &Path, values: &[f64]) -> Result<()> {
    let slots = values.len().max(1) as f64;
    let peak = values.iter().copied().fold(0.0, f64::max);
    let bounds = Bounds::around([(0.0, 0.0), (peak * 1.05, slots)].into_iter());
    let mut canvas = Canvas::new(bounds);
    for (idx, value) in values.iter().enumerate() {
        let top = slots - idx as f64;
        let a = canvas.to_px(0.0, top - 0.15);
        let b = canvas.to_px(*value, top - 0.85);
        canvas.fill_rect(a, b, SKY);
    }
    canvas.save(path)
}

pub fn line_chart(path: &Path, values: &[f64]) -> Result<()> {
    let bounds = Bounds::around(values.iter().enumerate().map(|(x, y)| (x as f64, *y))).padded(0.02);
    let mut canvas = Canvas::new(bounds);
    let points: Vec<(i64, i64)> = values
        .iter()
        .enumerate()
        .map(|(x, y)| canvas.to_px(x as f64, *y))
        .collect();
    for pair in points.windows(2) {
        canvas.line(pair[0], pair[1], PRIMARY);
        canvas.line((pair[0].0, pair[0].1 + 1), (pair[1].0, pair[1].1 + 1), PRIMARY);
    }
    if let [only] = points.as_slice() {
        canvas.dot(*only, 3, PRIMARY);
    }
    canvas.save(path)
}

pub fn scatter_chart(path: &Path, points: &[(f64, f64)], highlight: Option<(f64, f64)>) -> Result<()> {
    let bounds = Bounds::around(points.iter().copied().chain(highlight)).padded(0.05);
    let mut canvas = Canvas::new(bounds);
    for (x, y) in points {
        let center = canvas.to_px(*x, *y);
        canvas.dot(center, 4, PRIMARY);
    }
    if let Some((x, y)) = highlight {
        let center = canvas.to_px(x, y);
        canvas.cross(center, 8, HIGHLIGHT);
    }
    canvas.save(path)
}

/// `label | ####### value` rows scaled to the largest value.
pub fn text_bars(items: &[(String, f64)], width: usize) -> Vec<String> {
    let label_width = items
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    let peak = items.iter().map(|(_, value)| *value).fold(0.0, f64::max);
    items
        .iter()
        .map(|(label, value)| {
            let filled = if peak > 0.0 {
                ((value.max(0.0) / peak) * width as f64).round() as usize
            } else {
                0
            };
            format!(
                "{label:<label_width$} | {} {}",
                "#".repeat(filled),
                crate::data::format_stat(*value)
            )
        })
        .collect()
}

/// Character-cell scatter plot; `*` marks occupied cells.
pub fn ascii_scatter(points: &[(f64, f64)], columns: usize, rows: usize) -> Vec<String> {
    if points.is_empty() || columns == 0 || rows == 0 {
        return Vec::new();
    }
    let bounds = Bounds::around(points.iter().copied());
    let mut grid = vec![vec![' '; columns]; rows];
    for (x, y) in points {
        let col = ((x - bounds.x_min) / (bounds.x_max - bounds.x_min) * (columns - 1) as f64).round();
        let row = ((bounds.y_max - y) / (bounds.y_max - bounds.y_min) * (rows - 1) as f64).round();
        grid[row as usize][col as usize] = '*';
    }
    let border = format!("+{}+", "-".repeat(columns));
    let mut lines = vec![border.clone()];
    lines.extend(grid.into_iter().map(|row| format!("|{}|", row.into_iter().collect::<String>())));
    lines.push(border);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::histogram;

    #[test]
    fn charts_write_png_files() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let dir = temp.path().join("charts");

        histogram_chart(&dir.join("hist.png"), &histogram(&[1.0, 2.0, 2.0, 3.0], 30))?;
        bar_chart(&dir.join("bar.png"), &[21.5, 18.0, 24.0, 81.0])?;
        horizontal_bar_chart(&dir.join("hbar.png"), &[9.1, 8.7])?;
        line_chart(&dir.join("line.png"), &[1000.0, 1000.5, 1001.0])?;
        scatter_chart(&dir.join("scatter.png"), &[(1.0, 2.0), (3.0, 4.0)], Some((2.0, 3.0)))?;

        for name in ["hist.png", "bar.png", "hbar.png", "line.png", "scatter.png"] {
            let decoded = image::open(dir.join(name))?;
            assert_eq!(decoded.width(), CHART_WIDTH);
            assert_eq!(decoded.height(), CHART_HEIGHT);
        }
        Ok(())
    }

    #[test]
    fn scatter_highlight_is_drawn_in_red() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("scatter.png");
        scatter_chart(&path, &[(0.0, 0.0), (10.0, 10.0)], Some((5.0, 5.0)))?;
        let decoded = image::open(&path)?.to_rgb8();
        assert!(decoded.pixels().any(|pixel| *pixel == HIGHLIGHT));
        Ok(())
    }

    #[test]
    fn degenerate_inputs_still_render() -> Result<()> {
        let temp = tempfile::tempdir()?;
        line_chart(&temp.path().join("single.png"), &[5.0])?;
        scatter_chart(&temp.path().join("empty.png"), &[], None)?;
        bar_chart(&temp.path().join("none.png"), &[])?;
        Ok(())
    }

    #[test]
    fn text_bars_scale_to_peak() {
        let lines = text_bars(&[("a".to_string(), 10.0), ("bbb".to_string(), 5.0)], 10);
        assert_eq!(lines[0], "a   | ########## 10.00");
        assert_eq!(lines[1], "bbb | ##### 5.00");
    }

    #[test]
    fn ascii_scatter_marks_corners() {
        let lines = ascii_scatter(&[(0.0, 0.0), (1.0, 1.0)], 4, 2);
        assert_eq!(lines, vec!["+----+", "|   *|", "|*   |", "+----+"]);
    }
}
