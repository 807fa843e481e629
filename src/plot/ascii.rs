//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! The x axis is log10(k); each redshift bin is drawn as a line with its own
//! marker (`0`..`9`, then `a`..`z`), in row order, so later bins overlay earlier ones.

const MARKERS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Render one curve per row of `rows` against wavenumbers `k`.
pub fn render_ascii_plot(k: &[f64], rows: &[Vec<f64>], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let xs: Vec<f64> = k.iter().map(|v| if *v > 0.0 { v.log10() } else { f64::NAN }).collect();
    let (x_min, x_max) = range(xs.iter().copied()).unwrap_or((-2.0, 1.0));
    let (y_min, y_max) = range(rows.iter().flatten().copied()).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    for (i, row) in rows.iter().enumerate() {
        let marker = MARKERS[i % MARKERS.len()] as char;
        let points: Vec<(f64, f64)> = xs
            .iter()
            .zip(row.iter())
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(&x, &y)| (x, y))
            .collect();
        draw_curve(&mut grid, &points, (x_min, x_max), (y_min, y_max), marker);
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: log10 k=[{x_min:.3}, {x_max:.3}] | y=[{y_min:.4}, {y_max:.4}]\n"
    ));

    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    out
}

fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if !(min.is_finite() && max.is_finite()) {
        return None;
    }
    if max > min {
        Some((min, max))
    } else {
        // Flat data (e.g. a boost of exactly 1): open a unit window around it.
        Some((min - 0.5, max + 0.5))
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(
    grid: &mut [Vec<char>],
    points: &[(f64, f64)],
    (x_min, x_max): (f64, f64),
    (y_min, y_max): (f64, f64),
    ch: char,
) {
    let height = grid.len();
    let width = grid.first().map_or(0, Vec::len);
    if width == 0 {
        return;
    }

    let mut prev = None;
    for &(x, y) in points {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        match prev {
            Some((c0, r0)) => draw_line(grid, c0, r0, col, row, ch),
            None => grid[row][col] = ch,
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_golden_snapshot_small() {
        let k = [0.1, 1.0, 10.0];
        let rows = vec![vec![1.0, 1.0, 1.0], vec![1.0, 1.0, 2.0]];

        let txt = render_ascii_plot(&k, &rows, 10, 5);
        let expected = concat!(
            "Plot: log10 k=[-1.000, 1.000] | y=[0.9500, 2.0500]\n",
            "         1\n",
            "        1\n",
            "       1\n",
            "      1\n",
            "1111110000\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn flat_series_stays_on_one_row() {
        let k = [0.01, 0.1, 1.0];
        let txt = render_ascii_plot(&k, &[vec![1.0, 1.0, 1.0]], 12, 5);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[3], "000000000000");
        assert_eq!(lines[1..].iter().filter(|l| !l.is_empty()).count(), 1);
    }

    #[test]
    fn empty_input_renders_blank_grid() {
        let txt = render_ascii_plot(&[], &[], 10, 5);
        assert_eq!(txt.lines().count(), 6);
        assert!(txt.lines().skip(1).all(str::is_empty));
    }
}
