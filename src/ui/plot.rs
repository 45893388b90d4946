use std::collections::HashMap;

use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Plot, PlotPoints, Points};

use crate::color::{ContinuousScale, HISTOGRAM_FILL};
use crate::data::filter::{BinCount, ScatterPoint};

const PLOT_HEIGHT: f32 = 300.0;

// ---------------------------------------------------------------------------
// Histogram binning
// ---------------------------------------------------------------------------

/// One equal-width histogram bucket, `[start, end)` except for the last,
/// which also holds the maximum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl HistogramBin {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Split `[min, max]` of `values` into `bins` equal-width buckets. A single
/// distinct value gets unit-width buckets starting at that value.
pub fn histogram_bins(values: &[f64], bins: BinCount) -> Vec<HistogramBin> {
    let Some((min, max)) = values.iter().fold(None, |acc: Option<(f64, f64)>, &v| {
        Some(acc.map_or((v, v), |(lo, hi)| (lo.min(v), hi.max(v))))
    }) else {
        return Vec::new();
    };

    let n = bins.get() as usize;
    let span = max - min;
    let width = if span > 0.0 { span / n as f64 } else { 1.0 };

    let mut out: Vec<HistogramBin> = (0..n)
        .map(|i| HistogramBin {
            start: min + i as f64 * width,
            end: min + (i + 1) as f64 * width,
            count: 0,
        })
        .collect();
    for &v in values {
        let idx = (((v - min) / width).floor() as usize).min(n - 1);
        out[idx].count += 1;
    }
    out
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

/// Price histogram with a caller-chosen bin count.
pub fn price_histogram(ui: &mut Ui, prices: &[f64], bins: BinCount) {
    if prices.is_empty() {
        ui.label("No listings in the selected range.");
        return;
    }

    let bars: Vec<Bar> = histogram_bins(prices, bins)
        .iter()
        .map(|b| {
            Bar::new(b.center(), b.count as f64)
                .width(b.width())
                .name(format!("{:.0} – {:.0}", b.start, b.end))
        })
        .collect();
    let chart = BarChart::new(bars).color(HISTOGRAM_FILL).name("Listings");

    Plot::new("price_histogram")
        .height(PLOT_HEIGHT)
        .x_axis_label("Price (USD)")
        .y_axis_label("Listings")
        .allow_scroll(false)
        .show(ui, |plot_ui| plot_ui.bar_chart(chart));
}

/// Odometer against price, coloured by model year from light (older) to dark
/// (newer). Points without a model year are grey.
pub fn odometer_scatter(ui: &mut Ui, points: &[ScatterPoint]) {
    if points.is_empty() {
        ui.label("No listings in the selected range.");
        return;
    }

    let scale = ContinuousScale::blues_over(points.iter().filter_map(|p| p.model_year));
    if let Some(scale) = &scale {
        ui.label(
            RichText::new(format!(
                "Colour: model year, {:.0} (light) to {:.0} (dark)",
                scale.min, scale.max
            ))
            .weak(),
        );
    }

    // One series per colour keeps the draw calls bounded by distinct years.
    let mut series: HashMap<Color32, Vec<[f64; 2]>> = HashMap::new();
    for p in points {
        let color = match &scale {
            Some(scale) => scale.color_for_opt(p.model_year),
            None => HISTOGRAM_FILL,
        };
        series.entry(color).or_default().push([p.odometer, p.price]);
    }

    Plot::new("odometer_scatter")
        .height(PLOT_HEIGHT)
        .x_axis_label("Odometer")
        .y_axis_label("Price (USD)")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (color, coords) in series {
                plot_ui.points(
                    Points::new(PlotPoints::from(coords))
                        .color(color)
                        .radius(2.5),
                );
            }
        });
}
