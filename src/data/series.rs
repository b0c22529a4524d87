use serde::{Deserialize, Serialize};

use super::model::{
    sanitize, ColorChannel, PlotEntry, PlotSeries, PlotSummary, RankedRecord, RoleMap,
};
use super::select::parse_finite;

pub const DEFAULT_MIN_PX: f64 = 8.0;
pub const DEFAULT_MAX_PX: f64 = 60.0;
/// Floor applied to p-values before `-log10`.
pub const DEFAULT_P_VALUE_FLOOR: f64 = 1e-300;

// ---------------------------------------------------------------------------
// Marker sizing
// ---------------------------------------------------------------------------

/// Pixel range marker diameters are mapped into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerSizing {
    pub min_px: f64,
    pub max_px: f64,
}

impl Default for MarkerSizing {
    fn default() -> Self {
        Self {
            min_px: DEFAULT_MIN_PX,
            max_px: DEFAULT_MAX_PX,
        }
    }
}

impl MarkerSizing {
    /// Usable bounds: a positive minimum and a maximum no smaller than it.
    fn bounds(&self) -> (f64, f64) {
        let min = if self.min_px.is_finite() && self.min_px > 0.0 {
            self.min_px
        } else {
            DEFAULT_MIN_PX
        };
        let max = if self.max_px.is_finite() {
            self.max_px.max(min)
        } else {
            min
        };
        (min, max)
    }

    /// Map `|magnitude|` from `[0, max_magnitude]` linearly onto the pixel range.
    pub fn size(&self, magnitude: f64, max_magnitude: f64) -> f64 {
        let (min, max) = self.bounds();
        if !(max_magnitude > 0.0 && max_magnitude.is_finite()) {
            return min;
        }
        let t = (magnitude.abs() / max_magnitude).clamp(0.0, 1.0);
        min + t * (max - min)
    }
}

fn neg_log10(p: Option<f64>, floor: f64) -> f64 {
    match p {
        Some(p) => -p.max(floor).log10(),
        None => 0.0,
    }
}

// ---------------------------------------------------------------------------
// Series construction
// ---------------------------------------------------------------------------

/// Turn selected records into plot channels.
///
/// Colour comes from `-log10(p)` when a significance column is bound and the
/// first record has a value in it; otherwise it repeats the correlation.
/// Entry order and count follow `ranked` exactly.
pub fn build(
    ranked: &[RankedRecord<'_>],
    roles: &RoleMap,
    gene: &str,
    sizing: &MarkerSizing,
    p_value_floor: f64,
) -> PlotSeries {
    let floor = if p_value_floor.is_finite() && p_value_floor > 0.0 {
        p_value_floor
    } else {
        DEFAULT_P_VALUE_FLOOR
    };

    let significance = roles.significance.as_ref().filter(|col| {
        ranked
            .first()
            .is_some_and(|r| !sanitize(r.record.cell(col.index)).is_empty())
    });
    let channel = if significance.is_some() {
        ColorChannel::NegLog10P
    } else {
        ColorChannel::Correlation
    };

    let max_magnitude = ranked
        .iter()
        .map(|r| r.signed_correlation.abs())
        .fold(0.0, f64::max);

    let entries: Vec<PlotEntry> = ranked
        .iter()
        .map(|r| {
            let x = r.signed_correlation;
            let color_value = match significance {
                Some(col) => neg_log10(parse_finite(r.record.cell(col.index)), floor),
                None => x,
            };
            PlotEntry {
                label: sanitize(r.record.cell(roles.pathway.index)).to_string(),
                x,
                size: sizing.size(x, max_magnitude),
                color_value,
            }
        })
        .collect();

    let summary = PlotSummary {
        title: format!("Top {} pathways for {}", entries.len(), sanitize(gene)),
        x_axis_title: "Correlation".to_string(),
        legend_title: channel.legend_title().to_string(),
    };

    PlotSeries {
        entries,
        channel,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Dataset, Record};
    use crate::data::select::select;

    fn dataset(rows: &[(&str, &str, &str)]) -> Dataset {
        Dataset {
            columns: vec!["gene".into(), "pathway".into(), "cor".into(), "pval".into()],
            records: rows
                .iter()
                .map(|(p, c, pv)| Record {
                    cells: vec!["G".into(), p.to_string(), c.to_string(), pv.to_string()],
                })
                .collect(),
        }
    }

    fn roles(ds: &Dataset, with_p: bool) -> RoleMap {
        let p = with_p.then_some("pval");
        RoleMap::new(&ds.columns, "gene", "pathway", "cor", p).unwrap()
    }

    #[test]
    fn test_size_is_monotonic_and_floored() {
        let sizing = MarkerSizing::default();
        assert_eq!(sizing.size(0.0, 0.8), DEFAULT_MIN_PX);
        assert_eq!(sizing.size(-0.8, 0.8), DEFAULT_MAX_PX);
        let mut last = 0.0;
        for m in [0.0, 0.1, 0.25, 0.4, 0.8] {
            let s = sizing.size(m, 0.8);
            assert!(s >= last, "size({m}) = {s} < {last}");
            last = s;
        }
        assert_eq!(sizing.size(0.5, 0.0), DEFAULT_MIN_PX);
    }

    #[test]
    fn test_bad_bounds_stay_positive() {
        let sizing = MarkerSizing {
            min_px: -4.0,
            max_px: 2.0,
        };
        assert_eq!(sizing.size(0.0, 1.0), DEFAULT_MIN_PX);
        assert_eq!(sizing.size(1.0, 1.0), DEFAULT_MIN_PX);
    }

    #[test]
    fn test_color_falls_back_to_correlation() {
        let ds = dataset(&[("A", "0.6", "0.01"), ("B", "-0.3", "0.2")]);
        let roles = roles(&ds, false);
        let ranked = select(&ds, &roles, "G", 5, 5);
        let series = build(&ranked, &roles, "G", &MarkerSizing::default(), DEFAULT_P_VALUE_FLOOR);

        assert_eq!(series.channel, ColorChannel::Correlation);
        assert_eq!(series.summary.legend_title, "Correlation");
        let xs: Vec<f64> = series.entries.iter().map(|e| e.x).collect();
        let colors: Vec<f64> = series.entries.iter().map(|e| e.color_value).collect();
        assert_eq!(xs, colors);
    }

    #[test]
    fn test_neg_log10_channel() {
        let ds = dataset(&[("A", "0.6", "0.01"), ("B", "0.5", "0"), ("C", "0.4", "oops")]);
        let roles = roles(&ds, true);
        let ranked = select(&ds, &roles, "G", 5, 5);
        let series = build(&ranked, &roles, "G", &MarkerSizing::default(), DEFAULT_P_VALUE_FLOOR);

        assert_eq!(series.channel, ColorChannel::NegLog10P);
        assert_eq!(series.summary.legend_title, "-log10(p)");
        let colors: Vec<f64> = series.entries.iter().map(|e| e.color_value).collect();
        assert!((colors[0] - 2.0).abs() < 1e-12);
        assert!((colors[1] - 300.0).abs() < 1e-9);
        assert_eq!(colors[2], 0.0);
    }

    #[test]
    fn test_empty_first_p_disables_channel() {
        let ds = dataset(&[("A", "0.9", " "), ("B", "0.5", "0.01")]);
        let roles = roles(&ds, true);
        let ranked = select(&ds, &roles, "G", 5, 5);
        let series = build(&ranked, &roles, "G", &MarkerSizing::default(), DEFAULT_P_VALUE_FLOOR);
        assert_eq!(series.channel, ColorChannel::Correlation);
        assert_eq!(series.entries[1].color_value, 0.5);
    }

    #[test]
    fn test_entries_follow_selection_order() {
        let ds = dataset(&[
            ("\"Apoptosis\"", "0.2", ""),
            ("Glycolysis", "-0.7", ""),
            ("Hypoxia", "0.9", ""),
        ]);
        let roles = roles(&ds, false);
        let ranked = select(&ds, &roles, "G", 2, 1);
        let series = build(&ranked, &roles, "G", &MarkerSizing::default(), DEFAULT_P_VALUE_FLOOR);

        let labels: Vec<&str> = series.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["Glycolysis", "Hypoxia", "Apoptosis"]);
        assert_eq!(series.summary.title, "Top 3 pathways for G");
        assert_eq!(series.entries[1].size, DEFAULT_MAX_PX);
    }

    #[test]
    fn test_empty_selection_builds_empty_series() {
        let ds = dataset(&[("A", "0.6", "0.01")]);
        let roles = roles(&ds, true);
        let ranked = select(&ds, &roles, "MISSING", 5, 5);
        let series = build(&ranked, &roles, "MISSING", &MarkerSizing::default(), DEFAULT_P_VALUE_FLOOR);
        assert!(series.is_empty());
        assert_eq!(series.channel, ColorChannel::Correlation);
        assert_eq!(series.summary.title, "Top 0 pathways for MISSING");
    }
}
