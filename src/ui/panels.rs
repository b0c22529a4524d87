use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::ColorScale;
use crate::data::export::{save_series_json, save_table_csv};
use crate::data::model::Role;
use crate::state::{AppState, PlotKind};

const NO_COLUMN: &str = "(none)";

// ---------------------------------------------------------------------------
// Left side panel – column roles and selection controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Columns");
    ui.separator();

    let Some(session) = &state.session else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate state afterwards.
    let columns = session.dataset().columns.clone();
    let roles = session.roles().clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Role pickers ----
            let mut role_change: Option<(Role, Option<String>)> = None;
            egui::Grid::new("role_pickers")
                .num_columns(2)
                .show(ui, |ui: &mut Ui| {
                    for role in Role::ALL {
                        let current = roles.column(role).map(|c| c.name.as_str());
                        ui.label(role.to_string());
                        egui::ComboBox::from_id_salt(("role", role))
                            .selected_text(current.unwrap_or(NO_COLUMN))
                            .show_ui(ui, |ui: &mut Ui| {
                                if role == Role::Significance
                                    && ui.selectable_label(current.is_none(), NO_COLUMN).clicked()
                                {
                                    role_change = Some((role, None));
                                }
                                for col in &columns {
                                    if ui
                                        .selectable_label(current == Some(col.as_str()), col)
                                        .clicked()
                                    {
                                        role_change = Some((role, Some(col.clone())));
                                    }
                                }
                            });
                        ui.end_row();
                    }
                });
            if let Some((role, column)) = role_change {
                state.set_role_column(role, column.as_deref());
            }
            ui.separator();

            // ---- Gene picker ----
            ui.strong(format!("Gene  ({})", state.genes.len()));
            let selected = state.selected_gene.clone().unwrap_or_default();
            let mut gene_change: Option<String> = None;
            egui::ComboBox::from_id_salt("gene")
                .selected_text(&selected)
                .height(400.0)
                .show_ui(ui, |ui: &mut Ui| {
                    for gene in &state.genes {
                        if ui.selectable_label(*gene == selected, gene).clicked() {
                            gene_change = Some(gene.clone());
                        }
                    }
                });
            if let Some(gene) = gene_change {
                state.selected_gene = Some(gene);
                state.update_plot();
            }
            ui.separator();

            // ---- Top-k ----
            egui::Grid::new("top_k").num_columns(2).show(ui, |ui: &mut Ui| {
                ui.label("Top positive");
                ui.add(egui::DragValue::new(&mut state.top_positive).range(0..=500));
                ui.end_row();
                ui.label("Top negative");
                ui.add(egui::DragValue::new(&mut state.top_negative).range(0..=500));
                ui.end_row();
            });
            ui.separator();

            // ---- Appearance ----
            ui.strong("Plot type");
            ui.horizontal(|ui: &mut Ui| {
                ui.radio_value(&mut state.plot_kind, PlotKind::Bubble, "Bubble");
                ui.radio_value(&mut state.plot_kind, PlotKind::Lollipop, "Lollipop");
            });

            ui.strong("Palette");
            egui::ComboBox::from_id_salt("palette")
                .selected_text(state.palette.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for scale in ColorScale::ALL {
                        ui.selectable_value(&mut state.palette, scale, scale.to_string());
                    }
                });
            ui.checkbox(&mut state.reverse_palette, "Reverse palette");
            ui.checkbox(&mut state.show_labels, "Show value labels");
            ui.separator();

            let can_update = !state.genes.is_empty();
            if ui
                .add_enabled(can_update, egui::Button::new("Update plot"))
                .clicked()
            {
                state.update_plot();
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let has_plot = state.plot.is_some();
            if ui
                .add_enabled(has_plot, egui::Button::new("Export table CSV…"))
                .clicked()
            {
                export_table_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(has_plot, egui::Button::new("Export series JSON…"))
                .clicked()
            {
                export_series_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(name) = state.source_path.as_ref().and_then(|p| p.file_name()) {
            ui.strong(name.to_string_lossy().into_owned());
        }
        if let Some(session) = &state.session {
            ui.label(format!(
                "{} rows, {} columns, {} genes  (delimiter: {})",
                session.dataset().len(),
                session.dataset().columns.len(),
                state.genes.len(),
                session.diagnostics().delimiter_name()
            ));
        }

        ui.separator();

        if let Some(msg) = &state.status_message {
            let failed = state.failed_decode.is_some()
                || msg.starts_with("Error")
                || msg.starts_with("Failed");
            let text = RichText::new(msg);
            ui.label(if failed { text.color(Color32::RED) } else { text });
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open gene/pathway correlations")
        .add_filter("Delimited text", &["csv", "tsv", "txt"])
        .add_filter("All files", &["*"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}

fn export_table_dialog(state: &mut AppState) {
    let Some(current) = &state.plot else {
        return;
    };
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export selected rows")
        .add_filter("CSV", &["csv"])
        .set_file_name("top_pathways.csv")
        .save_file()
    else {
        return;
    };
    state.status_message = Some(match save_table_csv(&current.table, &path) {
        Ok(()) => format!("Saved {}", path.display()),
        Err(e) => {
            log::error!("Export failed: {e:#}");
            format!("Error: {e:#}")
        }
    });
}

fn export_series_dialog(state: &mut AppState) {
    let Some(current) = &state.plot else {
        return;
    };
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export plot series")
        .add_filter("JSON", &["json"])
        .set_file_name("top_pathways.json")
        .save_file()
    else {
        return;
    };
    state.status_message = Some(match save_series_json(&current.series, &path) {
        Ok(()) => format!("Saved {}", path.display()),
        Err(e) => {
            log::error!("Export failed: {e:#}");
            format!("Error: {e:#}")
        }
    });
}
