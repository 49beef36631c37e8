//! SVG plot rendering.

use std::error::Error;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::core::config::PlotsConfig;
use crate::core::errors::{ReportError, Result};
use crate::reports::{ChartKind, PlotData};

const CAPTION_FONT: (&str, u32) = ("sans-serif", 22);
const BAR_GROUP_WIDTH: f64 = 0.8;

type DrawResult = std::result::Result<(), Box<dyn Error>>;

/// Render a plot to an SVG document.
pub fn render_svg(plot: &PlotData, settings: &PlotsConfig) -> Result<String> {
    let mut svg = String::new();
    {
        let root =
            SVGBackend::with_string(&mut svg, (settings.width, settings.height)).into_drawing_area();
        draw_plot(&root, plot).map_err(|e| ReportError::render("svg", e.to_string()))?;
    }
    Ok(svg)
}

fn draw_plot(root: &DrawingArea<SVGBackend<'_>, Shift>, plot: &PlotData) -> DrawResult {
    root.fill(&WHITE)?;
    match plot.chart {
        ChartKind::GroupedBars => draw_grouped_bars(root, plot)?,
        ChartKind::Lines => draw_lines(root, plot)?,
    }
    root.present()?;
    Ok(())
}

/// Y range covering every point and the zero baseline, padded by 10%.
fn y_range(plot: &PlotData) -> (f64, f64) {
    let (low, high) = plot
        .series
        .iter()
        .flat_map(|s| s.points.iter().map(|(_, y)| *y))
        .fold((0.0f64, 0.0f64), |(lo, hi), y| (lo.min(y), hi.max(y)));

    if (high - low).abs() < f64::EPSILON {
        return (low, low + 1.0);
    }
    let pad = (high - low) * 0.1;
    (
        if low < 0.0 { low - pad } else { low },
        if high > 0.0 { high + pad } else { high },
    )
}

fn series_color(index: usize) -> RGBAColor {
    Palette99::pick(index).mix(0.9)
}

fn category_label(categories: &[String], x: f64) -> String {
    let nearest = x.round();
    if (x - nearest).abs() > 1e-6 || nearest < 0.0 {
        return String::new();
    }
    categories
        .get(nearest as usize)
        .cloned()
        .unwrap_or_default()
}

fn draw_grouped_bars(root: &DrawingArea<SVGBackend<'_>, Shift>, plot: &PlotData) -> DrawResult {
    let groups = plot.categories.len().max(1);
    let (y_min, y_max) = y_range(plot);

    let mut chart = ChartBuilder::on(root)
        .caption(&plot.title, CAPTION_FONT)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(groups as f64 - 0.5), y_min..y_max)?;

    let label_for = |x: &f64| category_label(&plot.categories, *x);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(groups)
        .x_label_formatter(&label_for)
        .x_desc(plot.x_label.as_str())
        .y_desc(plot.y_label.as_str())
        .draw()?;

    let bar_width = BAR_GROUP_WIDTH / plot.series.len().max(1) as f64;
    for (index, series) in plot.series.iter().enumerate() {
        let color = series_color(index);
        let offset = -BAR_GROUP_WIDTH / 2.0 + index as f64 * bar_width;
        chart
            .draw_series(series.points.iter().map(|&(x, y)| {
                let left = x + offset;
                Rectangle::new([(left, 0.0), (left + bar_width, y)], color.filled())
            }))?
            .label(series.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    if !plot.series.is_empty() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    Ok(())
}

fn draw_lines(root: &DrawingArea<SVGBackend<'_>, Shift>, plot: &PlotData) -> DrawResult {
    let (x_min, x_max) = plot
        .series
        .iter()
        .flat_map(|s| s.points.iter().map(|(x, _)| *x))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
            (lo.min(x), hi.max(x))
        });
    let (x_min, x_max) = if x_min.is_finite() && x_max > x_min {
        (x_min, x_max)
    } else if x_min.is_finite() {
        (x_min - 0.5, x_min + 0.5)
    } else {
        (0.0, 1.0)
    };
    let (y_min, y_max) = y_range(plot);

    let mut chart = ChartBuilder::on(root)
        .caption(&plot.title, CAPTION_FONT)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc(plot.x_label.as_str())
        .y_desc(plot.y_label.as_str())
        .draw()?;

    for (index, series) in plot.series.iter().enumerate() {
        let color = series_color(index);
        chart
            .draw_series(LineSeries::new(
                series.points.iter().copied(),
                color.stroke_width(2),
            ))?
            .label(series.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        chart.draw_series(
            series
                .points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
        )?;
    }

    if !plot.series.is_empty() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    Ok(())
}
