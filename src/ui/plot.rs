use eframe::egui::{self, Align2, Color32, RichText, ScrollArea, Ui};
use egui_plot::{GridMark, Line, MarkerShape, Plot, PlotPoint, PlotPoints, Points, Text, VLine};

use crate::color::ColorMapper;
use crate::data::model::{ParseDiagnostics, RawPreview};
use crate::state::{AppState, PlotKind};

/// Marker radius used by the lollipop style.
const LOLLIPOP_RADIUS: f32 = 5.0;

// ---------------------------------------------------------------------------
// Correlation plot (central panel)
// ---------------------------------------------------------------------------

/// Render the bubble / lollipop chart in the central panel.
pub fn correlation_plot(ui: &mut Ui, state: &AppState) {
    let Some(current) = &state.plot else {
        if let Some(outcome) = &state.failed_decode {
            diagnostics_panel(
                ui,
                "File loaded but empty or failed to parse",
                &outcome.diagnostics,
                &outcome.preview,
            );
        } else if let Some(session) = &state.session {
            let heading = match &state.selected_gene {
                Some(gene) => format!("No rows for {gene}"),
                None => "No genes found in the gene column".to_string(),
            };
            diagnostics_panel(ui, &heading, session.diagnostics(), session.preview());
        } else {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a file to view correlations  (File → Open…)");
            });
        }
        return;
    };

    let series = &current.series;
    let mapper = state.color_mapper();

    ui.heading(&series.summary.title);
    if let Some(mapper) = &mapper {
        color_legend(ui, &series.summary.legend_title, mapper);
    }

    // Category axis: first entry on top.
    let n = series.len();
    let y_of = move |i: usize| (n - 1 - i) as f64;
    let labels: Vec<String> = series.entries.iter().map(|e| e.label.clone()).collect();
    let longest = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let axis_width = (longest as f32 * 7.0).clamp(120.0, 600.0);

    Plot::new("correlation_plot")
        .x_axis_label(series.summary.x_axis_title.clone())
        .y_axis_min_width(axis_width)
        .y_grid_spacer(move |_input| {
            (0..n)
                .map(|i| GridMark {
                    value: i as f64,
                    step_size: 1.0,
                })
                .collect()
        })
        .y_axis_formatter(move |mark, _range| {
            let pos = mark.value.round();
            if (mark.value - pos).abs() > 1e-6 || pos < 0.0 || pos as usize >= n {
                return String::new();
            }
            labels[n - 1 - pos as usize].clone()
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.vline(VLine::new(0.0).color(Color32::from_gray(200)));

            for (i, entry) in series.entries.iter().enumerate() {
                let y = y_of(i);
                let color = mapper
                    .as_ref()
                    .map(|m| m.color_for(entry.color_value))
                    .unwrap_or(Color32::LIGHT_BLUE);

                let radius = match state.plot_kind {
                    PlotKind::Bubble => entry.size as f32 / 2.0,
                    PlotKind::Lollipop => {
                        let stem = Line::new(PlotPoints::new(vec![[0.0, y], [entry.x, y]]))
                            .color(Color32::GRAY)
                            .width(1.5);
                        plot_ui.line(stem);
                        LOLLIPOP_RADIUS
                    }
                };

                let marker = Points::new(PlotPoints::new(vec![[entry.x, y]]))
                    .name(&entry.label)
                    .shape(MarkerShape::Circle)
                    .filled(true)
                    .radius(radius)
                    .color(color);
                plot_ui.points(marker);

                if state.show_labels {
                    let anchor = if entry.x < 0.0 {
                        Align2::RIGHT_CENTER
                    } else {
                        Align2::LEFT_CENTER
                    };
                    let text = Text::new(
                        PlotPoint::new(entry.x, y),
                        RichText::new(format!(" {:.2} ", entry.x)).small(),
                    )
                    .anchor(anchor);
                    plot_ui.text(text);
                }
            }
        });
}

/// Horizontal colour bar with the legend title and value range.
fn color_legend(ui: &mut Ui, title: &str, mapper: &ColorMapper) {
    let (lo, hi) = mapper.range();
    ui.horizontal(|ui: &mut Ui| {
        ui.label(RichText::new(title).strong());
        ui.label(format!("{lo:.2}"));
        let (rect, _) = ui.allocate_exact_size(egui::vec2(160.0, 12.0), egui::Sense::hover());
        let stops = mapper.legend_entries(32);
        let width = rect.width() / stops.len() as f32;
        for (i, (_, color)) in stops.iter().enumerate() {
            let min = egui::pos2(rect.left() + i as f32 * width, rect.top());
            let cell = egui::Rect::from_min_size(min, egui::vec2(width + 0.5, rect.height()));
            ui.painter().rect_filled(cell, 0.0, *color);
        }
        ui.label(format!("{hi:.2}"));
    });
}

// ---------------------------------------------------------------------------
// Diagnostics (nothing to plot)
// ---------------------------------------------------------------------------

/// Decode facts and the leading raw text, shown when there is nothing to plot.
fn diagnostics_panel(ui: &mut Ui, heading: &str, diag: &ParseDiagnostics, preview: &RawPreview) {
    ui.heading(heading);
    ui.label(format!(
        "Detected delimiter: {}   BOM: {}   Encoding: {}",
        diag.delimiter_name(),
        if diag.had_byte_order_mark { "yes" } else { "no" },
        diag.encoding
    ));
    if let Some(err) = &preview.error {
        ui.label(RichText::new(err).color(Color32::RED));
    }
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("First line (raw)");
            ui.monospace(&preview.first_line);
            ui.add_space(6.0);
            ui.strong("First 2k chars");
            ui.monospace(&preview.sample);
            ui.add_space(6.0);
            ui.strong("Hex of first 64 chars");
            ui.monospace(&preview.hex);
        });
}
