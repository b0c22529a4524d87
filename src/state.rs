use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::{ColorMapper, ColorScale};
use crate::config::ViewerConfig;
use crate::data::loader::{read_file, DecodeOutcome};
use crate::data::model::{DetailTable, PlotSeries, Role, RoleMap};
use crate::data::session::{PlotOutcome, PlotRequest, Session};

/// Chart style for the central panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotKind {
    #[default]
    Bubble,
    Lollipop,
}

/// The series currently on screen and its companion table.
#[derive(Debug, Clone)]
pub struct CurrentPlot {
    pub series: PlotSeries,
    pub table: DetailTable,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: ViewerConfig,

    /// Loaded file (None until a decode yields records).
    pub session: Option<Session>,

    /// Path the session (or failed decode) came from.
    pub source_path: Option<PathBuf>,

    /// Last decode that produced no records, shown as a diagnostic panel.
    pub failed_decode: Option<DecodeOutcome>,

    /// Gene picker contents for the current gene column.
    pub genes: Vec<String>,
    pub selected_gene: Option<String>,

    pub top_positive: usize,
    pub top_negative: usize,
    pub plot_kind: PlotKind,
    pub palette: ColorScale,
    pub reverse_palette: bool,
    pub show_labels: bool,

    /// Result of the last successful update.
    pub plot: Option<CurrentPlot>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl AppState {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            session: None,
            source_path: None,
            failed_decode: None,
            genes: Vec::new(),
            selected_gene: None,
            top_positive: config.top_positive,
            top_negative: config.top_negative,
            plot_kind: config.plot_kind,
            palette: config.palette,
            reverse_palette: config.reverse_palette,
            show_labels: config.show_labels,
            plot: None,
            status_message: None,
            config,
        }
    }

    /// Read and ingest a file. Read failures only touch the status line.
    pub fn open_path(&mut self, path: &Path) {
        match read_file(path, self.config.decoder) {
            Ok(outcome) => self.ingest(outcome, Some(path.to_path_buf())),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Failed to read file: {e:#}"));
            }
        }
    }

    /// Replace the current session with a fresh decode.
    pub fn ingest(&mut self, outcome: DecodeOutcome, source: Option<PathBuf>) {
        self.source_path = source;
        self.plot = None;
        self.genes.clear();
        self.selected_gene = None;

        if outcome.is_empty() {
            self.status_message = Some(parse_failure_message(&outcome));
            self.session = None;
            self.failed_decode = Some(outcome);
            return;
        }

        match Session::open(outcome) {
            Ok(session) => {
                let ds = session.dataset();
                self.status_message = Some(format!(
                    "Loaded {} rows, {} columns detected.",
                    ds.len(),
                    ds.columns.len()
                ));
                self.session = Some(session);
                self.failed_decode = None;
                self.refresh_genes();
                self.update_plot();
            }
            Err(e) => {
                log::error!("Cannot use decoded file: {e}");
                self.status_message = Some(format!("Error: {e}"));
                self.session = None;
            }
        }
    }

    /// Rebuild the gene list, keeping the selection when it is still present.
    pub fn refresh_genes(&mut self) {
        self.genes = self.session.as_ref().map(Session::genes).unwrap_or_default();
        let keep = self
            .selected_gene
            .as_ref()
            .is_some_and(|g| self.genes.contains(g));
        if !keep {
            self.selected_gene = self.genes.first().cloned();
        }
    }

    /// Bind `role` to `column`. Only significance accepts `None`.
    pub fn set_role_column(&mut self, role: Role, column: Option<&str>) {
        let Some(session) = &mut self.session else {
            return;
        };
        let current = session.roles();
        let mut gene = current.gene.name.clone();
        let mut pathway = current.pathway.name.clone();
        let mut correlation = current.correlation.name.clone();
        let mut significance = current.significance.as_ref().map(|c| c.name.clone());
        match (role, column) {
            (Role::Gene, Some(c)) => gene = c.to_string(),
            (Role::Pathway, Some(c)) => pathway = c.to_string(),
            (Role::Correlation, Some(c)) => correlation = c.to_string(),
            (Role::Significance, c) => significance = c.map(str::to_string),
            (_, None) => return,
        }

        let updated = RoleMap::new(
            &session.dataset().columns,
            &gene,
            &pathway,
            &correlation,
            significance.as_deref(),
        )
        .and_then(|roles| session.set_roles(roles));
        if let Err(e) = updated {
            self.status_message = Some(format!("Error: {e}"));
            return;
        }

        self.status_message = Some(match column {
            Some(c) => format!("{role} column set to {c}"),
            None => format!("{role} column cleared"),
        });
        if role == Role::Gene {
            self.refresh_genes();
        }
        if self.plot.is_some() {
            self.update_plot();
        }
    }

    /// Run the pipeline for the selected gene.
    pub fn update_plot(&mut self) {
        let (Some(session), Some(gene)) = (&self.session, &self.selected_gene) else {
            self.plot = None;
            return;
        };
        let request = PlotRequest {
            gene: gene.clone(),
            top_positive: self.top_positive,
            top_negative: self.top_negative,
            sizing: self.config.sizing(),
            p_value_floor: self.config.p_value_floor,
        };
        match session.plot(&request) {
            PlotOutcome::Rows { series, table } => {
                self.status_message = Some(series.summary.title.clone());
                self.plot = Some(CurrentPlot { series, table });
            }
            PlotOutcome::NoRows { gene } => {
                self.status_message = Some(format!("No rows for {gene}"));
                self.plot = None;
            }
        }
    }

    /// Colour mapping for the plotted series.
    pub fn color_mapper(&self) -> Option<ColorMapper> {
        let range = self.plot.as_ref()?.series.color_range()?;
        Some(ColorMapper::new(self.palette, self.reverse_palette, range))
    }
}

/// Status line for a decode that produced no records.
pub fn parse_failure_message(outcome: &DecodeOutcome) -> String {
    let diag = &outcome.diagnostics;
    format!(
        "File loaded but empty or failed to parse. Detected delimiter: {}, BOM: {}, encoding: {}.",
        diag.delimiter_name(),
        if diag.had_byte_order_mark { "yes" } else { "no" },
        diag.encoding
    )
}
