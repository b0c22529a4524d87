use serde::{Deserialize, Serialize};

use super::loader::DecodeOutcome;
use super::model::{Dataset, DetailTable, ParseDiagnostics, PlotSeries, RawPreview, RoleMap};
use super::schema::infer_roles;
use super::select::{detail_table, gene_choices, select};
use super::series::{build, MarkerSizing, DEFAULT_P_VALUE_FLOOR};
use crate::error::SchemaError;

// ---------------------------------------------------------------------------
// Requests and outcomes
// ---------------------------------------------------------------------------

/// Parameters of one plot request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotRequest {
    pub gene: String,
    pub top_positive: usize,
    pub top_negative: usize,
    pub sizing: MarkerSizing,
    pub p_value_floor: f64,
}

impl PlotRequest {
    /// Request with default sizing and p-value floor.
    pub fn new(gene: impl Into<String>, top_positive: usize, top_negative: usize) -> Self {
        Self {
            gene: gene.into(),
            top_positive,
            top_negative,
            sizing: MarkerSizing::default(),
            p_value_floor: DEFAULT_P_VALUE_FLOOR,
        }
    }
}

/// Result of running the pipeline for one gene.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotOutcome {
    /// At least one record survived selection.
    Rows {
        series: PlotSeries,
        table: DetailTable,
    },
    /// Nothing to show for this gene.
    NoRows { gene: String },
}

// ---------------------------------------------------------------------------
// Session – one loaded file
// ---------------------------------------------------------------------------

/// A decoded file plus the active column roles.
///
/// The record set is never mutated; only the role binding can change.
#[derive(Debug, Clone)]
pub struct Session {
    outcome: DecodeOutcome,
    roles: RoleMap,
}

impl Session {
    /// Start a session from a non-empty decode, inferring column roles.
    pub fn open(outcome: DecodeOutcome) -> Result<Self, SchemaError> {
        if outcome.is_empty() {
            return Err(SchemaError::NoRecords);
        }
        let roles = infer_roles(&outcome.dataset.columns)?;
        Ok(Self { outcome, roles })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.outcome.dataset
    }

    pub fn diagnostics(&self) -> &ParseDiagnostics {
        &self.outcome.diagnostics
    }

    /// Leading raw text of the file, for diagnosing selections that come
    /// back empty.
    pub fn preview(&self) -> &RawPreview {
        &self.outcome.preview
    }

    pub fn roles(&self) -> &RoleMap {
        &self.roles
    }

    /// Replace the role binding, re-checking every column against the header.
    pub fn set_roles(&mut self, roles: RoleMap) -> Result<(), SchemaError> {
        self.roles = RoleMap::new(
            &self.outcome.dataset.columns,
            &roles.gene.name,
            &roles.pathway.name,
            &roles.correlation.name,
            roles.significance.as_ref().map(|c| c.name.as_str()),
        )?;
        log::info!("Column roles overridden: {:?}", self.roles);
        Ok(())
    }

    /// Genes available under the current gene column.
    pub fn genes(&self) -> Vec<String> {
        gene_choices(self.dataset(), &self.roles)
    }

    /// Run selection and series building for one gene.
    pub fn plot(&self, request: &PlotRequest) -> PlotOutcome {
        let dataset = self.dataset();
        let ranked = select(
            dataset,
            &self.roles,
            &request.gene,
            request.top_positive,
            request.top_negative,
        );
        if ranked.is_empty() {
            log::info!("No rows for gene '{}'", request.gene);
            return PlotOutcome::NoRows {
                gene: request.gene.clone(),
            };
        }

        let series = build(
            &ranked,
            &self.roles,
            &request.gene,
            &request.sizing,
            request.p_value_floor,
        );
        let table = detail_table(dataset, &ranked);
        log::info!("{}", series.summary.title);
        PlotOutcome::Rows { series, table }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{decode, DecoderBackend};
    use crate::data::model::ColorChannel;

    const TABLE: &str = "\
Symbol\tTerm\tcorr\tp_value\tsource
TP53\tApoptosis\t0.81\t0.001\tkegg
TP53\tGlycolysis\t-0.42\t0.03\tkegg
TP53\tHypoxia\t0\t0.5\treactome
KRAS\tMAPK signaling\t0.66\t1e-5\tkegg
";

    fn session() -> Session {
        Session::open(decode(TABLE, DecoderBackend::Csv)).unwrap()
    }

    #[test]
    fn test_open_infers_roles() {
        let s = session();
        assert_eq!(s.roles().gene.name, "Symbol");
        assert_eq!(s.roles().pathway.name, "Term");
        assert_eq!(s.roles().significance.as_ref().unwrap().name, "p_value");
        assert_eq!(s.genes(), ["KRAS", "TP53"]);
        assert_eq!(s.diagnostics().detected_delimiter, '\t');
    }

    #[test]
    fn test_empty_decode_is_rejected() {
        let outcome = decode("gene,pathway,cor\n", DecoderBackend::Csv);
        assert_eq!(Session::open(outcome).unwrap_err(), SchemaError::NoRecords);
    }

    #[test]
    fn test_plot_rows() {
        let s = session();
        let outcome = s.plot(&PlotRequest::new("TP53", 5, 5));
        let PlotOutcome::Rows { series, table } = outcome else {
            panic!("expected rows");
        };
        assert_eq!(series.summary.title, "Top 2 pathways for TP53");
        assert_eq!(series.channel, ColorChannel::NegLog10P);
        assert_eq!(series.entries[0].label, "Glycolysis");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1][1], "Apoptosis");
    }

    #[test]
    fn test_plot_absent_gene() {
        let s = session();
        assert_eq!(
            s.plot(&PlotRequest::new("BRCA1", 5, 5)),
            PlotOutcome::NoRows {
                gene: "BRCA1".to_string()
            }
        );
    }

    #[test]
    fn test_no_rows_keeps_diagnostics_reachable() {
        let text = "gene;pathway;cor\nTP53;Apoptosis;0,81\nTP53;Glycolysis;-0,42\n";
        let s = Session::open(decode(text, DecoderBackend::Csv)).unwrap();
        assert!(matches!(
            s.plot(&PlotRequest::new("TP53", 5, 5)),
            PlotOutcome::NoRows { .. }
        ));
        assert_eq!(s.diagnostics().detected_delimiter, ';');
        assert!(!s.diagnostics().had_byte_order_mark);
        assert_eq!(s.preview().first_line, "gene;pathway;cor");
        assert!(s.preview().hex.starts_with("67 65 6e 65 3b"));
    }

    #[test]
    fn test_short_row_does_not_hide_quoted_pathways() {
        let text = "gene,pathway,cor\nTP53,\"Signal, transduction\",0.3\nTP53,Apoptosis\n";
        let s = Session::open(decode(text, DecoderBackend::Csv)).unwrap();
        let PlotOutcome::Rows { series, .. } = s.plot(&PlotRequest::new("TP53", 5, 5)) else {
            panic!("expected rows");
        };
        assert_eq!(series.len(), 1);
        assert_eq!(series.entries[0].label, "Signal, transduction");
        assert_eq!(series.entries[0].x, 0.3);
    }

    #[test]
    fn test_replot_is_idempotent() {
        let s = session();
        let before = s.dataset().clone();
        let request = PlotRequest::new("TP53", 1, 1);
        assert_eq!(s.plot(&request), s.plot(&request));
        assert_eq!(s.dataset(), &before);
    }

    #[test]
    fn test_role_override() {
        let mut s = session();
        let cols = s.dataset().columns.clone();

        let by_source = RoleMap::new(&cols, "source", "Term", "corr", None).unwrap();
        s.set_roles(by_source).unwrap();
        assert_eq!(s.genes(), ["kegg", "reactome"]);
        let PlotOutcome::Rows { series, .. } = s.plot(&PlotRequest::new("kegg", 10, 10)) else {
            panic!("expected rows");
        };
        assert_eq!(series.channel, ColorChannel::Correlation);
        assert_eq!(series.len(), 3);

        let other = vec!["x".to_string(), "y".to_string(), "z".to_string()];
        let foreign = RoleMap::new(&other, "x", "y", "z", None).unwrap();
        assert!(s.set_roles(foreign).is_err());
        assert_eq!(s.roles().gene.name, "source");
    }
}
