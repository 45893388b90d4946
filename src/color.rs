use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Continuous colour scale
// ---------------------------------------------------------------------------

/// Accent used for histogram bars.
pub const HISTOGRAM_FILL: Color32 = Color32::from_rgb(0x60, 0xa3, 0xbc);

/// Shown for points without a value to map.
pub const MISSING_VALUE: Color32 = Color32::GRAY;

/// ColorBrewer sequential "Blues", light to dark.
const BLUES: [(u8, u8, u8); 9] = [
    (247, 251, 255),
    (222, 235, 247),
    (198, 219, 239),
    (158, 202, 225),
    (107, 174, 214),
    (66, 146, 198),
    (33, 113, 181),
    (8, 81, 156),
    (8, 48, 107),
];

/// Maps a numeric range onto a multi-stop gradient, interpolating in linear
/// RGB. Values outside the range clamp to the end stops.
#[derive(Debug, Clone)]
pub struct ContinuousScale {
    pub min: f64,
    pub max: f64,
    stops: Vec<LinSrgb>,
}

impl ContinuousScale {
    pub fn blues(min: f64, max: f64) -> Self {
        let stops = BLUES
            .iter()
            .map(|&(r, g, b)| Srgb::new(r, g, b).into_format::<f32>().into_linear())
            .collect();
        Self { min, max, stops }
    }

    /// Build a scale spanning the finite values in `values`.
    pub fn blues_over(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })?;
        Some(Self::blues(min, max))
    }

    /// Position of `value` in the range, in `0.0..=1.0`. A degenerate range
    /// puts everything at the dark end.
    fn position(&self, value: f64) -> f32 {
        let span = self.max - self.min;
        if span.abs() < f64::EPSILON {
            return 1.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0) as f32
    }

    pub fn color_for(&self, value: f64) -> Color32 {
        let t = self.position(value) * (self.stops.len() - 1) as f32;
        let lower = (t.floor() as usize).min(self.stops.len() - 2);
        let mixed = self.stops[lower].mix(self.stops[lower + 1], t - lower as f32);
        let rgb = Srgb::<u8>::from_linear(mixed);
        Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
    }

    pub fn color_for_opt(&self, value: Option<f64>) -> Color32 {
        value.map_or(MISSING_VALUE, |v| self.color_for(v))
    }
}
