use eframe::egui::{ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

/// Render the selected rows underneath the plot.
pub fn detail_table(ui: &mut Ui, state: &AppState) {
    let Some(current) = &state.plot else {
        ui.label("No rows selected.");
        return;
    };
    let table = &current.table;

    ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .columns(Column::auto().at_least(60.0), table.columns.len())
            .header(20.0, |mut header| {
                for col in &table.columns {
                    header.col(|ui| {
                        ui.strong(col);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, table.rows.len(), |mut row| {
                    let cells = &table.rows[row.index()];
                    for cell in cells {
                        row.col(|ui| {
                            ui.label(cell);
                        });
                    }
                });
            });
    });
}
