use std::fmt;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Continuous colour scales
// ---------------------------------------------------------------------------

const VIRIDIS: &[(u8, u8, u8)] = &[
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

const PLASMA: &[(u8, u8, u8)] = &[
    (13, 8, 135),
    (126, 3, 168),
    (204, 71, 120),
    (248, 149, 64),
    (240, 249, 33),
];

/// Diverging: blue for low values, red for high.
const RDBU: &[(u8, u8, u8)] = &[
    (33, 102, 172),
    (103, 169, 207),
    (247, 247, 247),
    (239, 138, 98),
    (178, 24, 43),
];

/// Named colour scale used for marker colours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScale {
    #[default]
    Viridis,
    Plasma,
    RdBu,
    Rainbow,
}

impl ColorScale {
    pub const ALL: [ColorScale; 4] = [
        ColorScale::Viridis,
        ColorScale::Plasma,
        ColorScale::RdBu,
        ColorScale::Rainbow,
    ];

    /// Colour at position `t` in `[0, 1]` (clamped).
    pub fn sample(&self, t: f32) -> Color32 {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
        let rgb: Srgb = match self {
            ColorScale::Viridis => interpolate(VIRIDIS, t),
            ColorScale::Plasma => interpolate(PLASMA, t),
            ColorScale::RdBu => interpolate(RDBU, t),
            ColorScale::Rainbow => {
                // Hue sweep from blue (low) to red (high).
                let hsl = Hsl::new(240.0 * (1.0 - t), 0.75, 0.55);
                hsl.into_color()
            }
        };
        to_color32(rgb)
    }
}

impl fmt::Display for ColorScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColorScale::Viridis => "Viridis",
            ColorScale::Plasma => "Plasma",
            ColorScale::RdBu => "RdBu",
            ColorScale::Rainbow => "Rainbow",
        };
        write!(f, "{name}")
    }
}

/// Piecewise-linear blend between evenly spaced stops, in linear RGB.
fn interpolate(stops: &[(u8, u8, u8)], t: f32) -> Srgb {
    let to_linear = |(r, g, b): (u8, u8, u8)| -> LinSrgb {
        Srgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0).into_linear()
    };
    let segments = (stops.len() - 1) as f32;
    let pos = t * segments;
    let i = (pos.floor() as usize).min(stops.len() - 2);
    let local = pos - i as f32;
    let mixed = to_linear(stops[i]).mix(to_linear(stops[i + 1]), local);
    Srgb::from_linear(mixed)
}

fn to_color32(rgb: Srgb) -> Color32 {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgb(channel(rgb.red), channel(rgb.green), channel(rgb.blue))
}

// ---------------------------------------------------------------------------
// Color mapping: value → Color32
// ---------------------------------------------------------------------------

/// Maps the colour values of one series onto a scale.
#[derive(Debug, Clone, Copy)]
pub struct ColorMapper {
    pub scale: ColorScale,
    pub reverse: bool,
    lo: f64,
    hi: f64,
}

impl ColorMapper {
    /// Build a mapper spanning `(min, max)` of the values to colour.
    pub fn new(scale: ColorScale, reverse: bool, (lo, hi): (f64, f64)) -> Self {
        ColorMapper {
            scale,
            reverse,
            lo,
            hi,
        }
    }

    pub fn range(&self) -> (f64, f64) {
        (self.lo, self.hi)
    }

    /// Look up the colour for a value. A flat range maps to the middle.
    pub fn color_for(&self, value: f64) -> Color32 {
        let span = self.hi - self.lo;
        let t = if span.abs() < f64::EPSILON {
            0.5
        } else {
            ((value - self.lo) / span) as f32
        };
        let t = if self.reverse { 1.0 - t } else { t };
        self.scale.sample(t)
    }

    /// Evenly spaced (value, colour) pairs from low to high, for the legend.
    pub fn legend_entries(&self, n: usize) -> Vec<(f64, Color32)> {
        if n < 2 {
            return vec![(self.lo, self.color_for(self.lo))];
        }
        (0..n)
            .map(|i| {
                let v = self.lo + (self.hi - self.lo) * i as f64 / (n - 1) as f64;
                (v, self.color_for(v))
            })
            .collect()
    }
}
