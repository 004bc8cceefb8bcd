use std::path::Path;

use plotters::prelude::*;

use crate::error::{Error, Result};

/// Index of the first bucket whose cumulative probability exceeds `random`.
///
/// `random` is expected in [0, 1). If rounding leaves the cumulative sum
/// short of `random`, the last bucket with non-zero mass is returned.
pub fn categorical_sample<'a>(probs: impl IntoIterator<Item = &'a f64>, random: f64) -> usize {
    let mut cumulative: f64 = 0.0;
    let mut last_positive: usize = 0;
    for (i, p) in probs.into_iter().enumerate() {
        if *p > 0.0 {
            last_positive = i;
        }
        cumulative += p;
        if cumulative > random {
            return i;
        }
    }
    last_positive
}

pub fn moving_average(window: usize, vector: &[f64]) -> Vec<f64> {
    let window: usize = window.max(1);
    let mut aux: usize = 0;
    let mut result: Vec<f64> = vec![];
    while aux < vector.len() {
        let end: usize = if aux + window < vector.len() {
            aux + window
        } else {
            vector.len()
        };
        let slice: &[f64] = &vector[aux..end];
        let r: f64 = slice.iter().sum();
        result.push(r / slice.len() as f64);
        aux = end;
    }
    result
}

#[inline(always)]
pub fn to_s(ncol: usize, row: usize, col: usize) -> usize {
    row * ncol + col
}

/// Grid move for actions LEFT, DOWN, RIGHT, UP, clamped at the borders.
#[inline(always)]
pub fn inc(nrow: usize, ncol: usize, row: usize, col: usize, a: usize) -> (usize, usize) {
    match a {
        0 => (row, col.saturating_sub(1)),
        1 => ((row + 1).min(nrow - 1), col),
        2 => (row, (col + 1).min(ncol - 1)),
        3 => (row.saturating_sub(1), col),
        _ => (row, col),
    }
}

fn plot_error(e: impl std::fmt::Display) -> Error {
    Error::Plot {
        message: e.to_string(),
    }
}

/// Draws each series as a line into an SVG file at `path`.
pub fn plot_moving_average(
    path: &Path,
    series: &[Vec<f64>],
    colors: &[&RGBColor],
    legends: &[&str],
    title: &str,
) -> Result<()> {
    if colors.is_empty() {
        return Err(Error::Plot {
            message: "empty color palette".to_string(),
        });
    }
    let max_len: usize = series.iter().map(|s| s.len()).max().unwrap_or(0).max(2);
    let values = series.iter().flatten().copied().filter(|v| v.is_finite());
    let (mut min_y, mut max_y) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if min_y > max_y {
        min_y = 0.0;
        max_y = 1.0;
    }
    if min_y == max_y {
        min_y -= 0.5;
        max_y += 0.5;
    }

    let root = SVGBackend::new(path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0..max_len - 1, min_y..max_y)
        .map_err(plot_error)?;
    chart.configure_mesh().draw().map_err(plot_error)?;

    for (i, values) in series.iter().enumerate() {
        let color: RGBColor = *colors[i % colors.len()];
        let legend: String = legends.get(i).copied().unwrap_or("").to_string();
        chart
            .draw_series(LineSeries::new(
                values.iter().copied().enumerate(),
                &color,
            ))
            .map_err(plot_error)?
            .label(legend)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(plot_error)?;
    root.present().map_err(plot_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categorical_sample_walks_cumulative_mass() {
        let probs = [0.25, 0.5, 0.25];
        assert_eq!(categorical_sample(&probs, 0.0), 0);
        assert_eq!(categorical_sample(&probs, 0.3), 1);
        assert_eq!(categorical_sample(&probs, 0.74), 1);
        assert_eq!(categorical_sample(&probs, 0.8), 2);
    }

    #[test]
    fn categorical_sample_skips_zero_mass() {
        let probs = [0.0, 1.0, 0.0];
        assert_eq!(categorical_sample(&probs, 0.0), 1);
        assert_eq!(categorical_sample(&probs, 0.999), 1);
        // cumulative sum short of the draw
        assert_eq!(categorical_sample(&[0.3, 0.3, 0.3999, 0.0], 0.99999), 2);
    }

    #[test]
    fn moving_average_handles_partial_window() {
        assert_eq!(
            moving_average(2, &[1.0, 3.0, 5.0, 7.0, 9.0]),
            vec![2.0, 6.0, 9.0]
        );
        assert!(moving_average(3, &[]).is_empty());
    }

    #[test]
    fn plot_rejects_an_empty_palette() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");
        let result = plot_moving_average(&path, &[vec![1.0, 2.0]], &[], &["return"], "t");
        assert!(matches!(result, Err(Error::Plot { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn inc_clamps_to_grid() {
        assert_eq!(inc(4, 12, 0, 0, 0), (0, 0));
        assert_eq!(inc(4, 12, 0, 0, 3), (0, 0));
        assert_eq!(inc(4, 12, 3, 11, 1), (3, 11));
        assert_eq!(inc(4, 12, 3, 11, 2), (3, 11));
        assert_eq!(inc(4, 12, 1, 1, 2), (1, 2));
        assert_eq!(to_s(12, 3, 0), 36);
    }
}
