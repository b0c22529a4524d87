use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct GeneCorApp {
    pub state: AppState,
}

impl GeneCorApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Load the first file dropped onto the window.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.first().and_then(|f| f.path.clone()));
        if let Some(path) = dropped {
            log::info!("File dropped: {}", path.display());
            self.state.open_path(&path);
        }
    }
}

impl eframe::App for GeneCorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: column roles and controls ----
        egui::SidePanel::left("control_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: selected rows ----
        if self.state.plot.is_some() {
            egui::TopBottomPanel::bottom("detail_table")
                .resizable(true)
                .default_height(200.0)
                .show(ctx, |ui| {
                    table::detail_table(ui, &self.state);
                });
        }

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::correlation_plot(ui, &self.state);
        });
    }
}
