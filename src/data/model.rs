use std::fmt;

use serde::Serialize;

use crate::error::SchemaError;

// ---------------------------------------------------------------------------
// Cell sanitation
// ---------------------------------------------------------------------------

/// Strip one leading and one trailing `"` (if present), leaving whitespace.
pub fn strip_outer_quotes(cell: &str) -> &str {
    let s = cell.strip_prefix('"').unwrap_or(cell);
    s.strip_suffix('"').unwrap_or(s)
}

/// Normalise a cell before comparing or parsing it: one layer of surrounding
/// quotes is removed, then whitespace is trimmed.
pub fn sanitize(cell: &str) -> &str {
    strip_outer_quotes(cell).trim()
}

// ---------------------------------------------------------------------------
// Record / Dataset – the decoded table
// ---------------------------------------------------------------------------

/// One data row. Cells line up with [`Dataset::columns`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub cells: Vec<String>,
}

impl Record {
    /// Raw cell at `index`, or `""` when the row is short.
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }
}

/// A decoded table: one header shared by every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    /// Ordered column names, as read from the header row.
    pub columns: Vec<String>,
    /// Data rows, in file order.
    pub records: Vec<Record>,
}

impl Dataset {
    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// Semantic purpose of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Role {
    Gene,
    Pathway,
    Correlation,
    Significance,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Gene,
        Role::Pathway,
        Role::Correlation,
        Role::Significance,
    ];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Gene => "gene",
            Role::Pathway => "pathway",
            Role::Correlation => "correlation",
            Role::Significance => "significance",
        };
        write!(f, "{name}")
    }
}

/// A column resolved against a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub name: String,
    pub index: usize,
}

impl ColumnRef {
    fn resolve(columns: &[String], role: Role, name: &str) -> Result<Self, SchemaError> {
        columns
            .iter()
            .position(|c| c == name)
            .map(|index| ColumnRef {
                name: name.to_string(),
                index,
            })
            .ok_or_else(|| SchemaError::UnknownColumn {
                role,
                column: name.to_string(),
            })
    }
}

/// Binding of the four roles to columns of one header.
///
/// Built through [`RoleMap::new`], which checks every name against the header
/// once; cell access afterwards goes straight to the stored index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleMap {
    pub gene: ColumnRef,
    pub pathway: ColumnRef,
    pub correlation: ColumnRef,
    pub significance: Option<ColumnRef>,
}

impl RoleMap {
    pub fn new(
        columns: &[String],
        gene: &str,
        pathway: &str,
        correlation: &str,
        significance: Option<&str>,
    ) -> Result<Self, SchemaError> {
        if columns.is_empty() {
            return Err(SchemaError::NoColumns);
        }
        Ok(RoleMap {
            gene: ColumnRef::resolve(columns, Role::Gene, gene)?,
            pathway: ColumnRef::resolve(columns, Role::Pathway, pathway)?,
            correlation: ColumnRef::resolve(columns, Role::Correlation, correlation)?,
            significance: significance
                .map(|name| ColumnRef::resolve(columns, Role::Significance, name))
                .transpose()?,
        })
    }

    /// Column bound to `role`, if any.
    pub fn column(&self, role: Role) -> Option<&ColumnRef> {
        match role {
            Role::Gene => Some(&self.gene),
            Role::Pathway => Some(&self.pathway),
            Role::Correlation => Some(&self.correlation),
            Role::Significance => self.significance.as_ref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Selection output
// ---------------------------------------------------------------------------

/// A record that survived selection, with its parsed correlation.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRecord<'a> {
    pub record: &'a Record,
    /// Finite, non-zero correlation.
    pub signed_correlation: f64,
    /// Position inside its sign bucket (0 = most extreme).
    pub rank: usize,
}

/// Sanitised copy of the selected rows for the detail view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetailTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Plot series
// ---------------------------------------------------------------------------

/// One marker on the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotEntry {
    pub label: String,
    pub x: f64,
    pub size: f64,
    pub color_value: f64,
}

/// Which quantity drives marker colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColorChannel {
    /// `-log10(p)` from the significance column.
    NegLog10P,
    /// The correlation itself.
    Correlation,
}

impl ColorChannel {
    pub fn legend_title(&self) -> &'static str {
        match self {
            ColorChannel::NegLog10P => "-log10(p)",
            ColorChannel::Correlation => "Correlation",
        }
    }
}

/// Human-readable titles accompanying a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlotSummary {
    pub title: String,
    pub x_axis_title: String,
    pub legend_title: String,
}

/// Plot-ready output of one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSeries {
    pub entries: Vec<PlotEntry>,
    pub channel: ColorChannel,
    pub summary: PlotSummary,
}

impl PlotSeries {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Min and max colour value, `None` for an empty series.
    pub fn color_range(&self) -> Option<(f64, f64)> {
        self.entries.iter().map(|e| e.color_value).fold(None, |acc, v| {
            Some(match acc {
                None => (v, v),
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
            })
        })
    }
}

// ---------------------------------------------------------------------------
// Decode diagnostics
// ---------------------------------------------------------------------------

/// Text encoding the records were decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextEncoding {
    Utf8,
    Utf16Le,
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextEncoding::Utf8 => write!(f, "UTF-8"),
            TextEncoding::Utf16Le => write!(f, "UTF-16LE"),
        }
    }
}

/// Facts gathered once per decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParseDiagnostics {
    pub detected_delimiter: char,
    pub had_byte_order_mark: bool,
    pub encoding: TextEncoding,
}

impl ParseDiagnostics {
    /// Printable name of the detected delimiter.
    pub fn delimiter_name(&self) -> String {
        match self.detected_delimiter {
            '\t' => "tab".to_string(),
            ',' => "comma".to_string(),
            ';' => "semicolon".to_string(),
            '|' => "pipe".to_string(),
            other => format!("{other:?}"),
        }
    }
}

/// Leading slice of the raw text, kept for the diagnostic panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPreview {
    pub first_line: String,
    pub sample: String,
    pub hex: String,
    /// Parser error message, when decoding failed outright.
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn sanitize_strips_one_quote_layer_then_trims() {
        assert_eq!(sanitize("\"  TP53 \""), "TP53");
        assert_eq!(sanitize("\"\"x\"\""), "\"x\"");
        assert_eq!(sanitize("  plain\t"), "plain");
        assert_eq!(sanitize("\""), "");
    }

    #[test]
    fn role_map_rejects_unknown_columns() {
        let cols = columns(&["gene", "pathway", "cor"]);
        let err = RoleMap::new(&cols, "gene", "pathway", "rho", None).unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownColumn {
                role: Role::Correlation,
                column: "rho".to_string()
            }
        );

        let roles = RoleMap::new(&cols, "gene", "pathway", "cor", None).unwrap();
        assert_eq!(roles.correlation.index, 2);
        assert!(roles.column(Role::Significance).is_none());
    }

    #[test]
    fn short_records_read_as_empty() {
        let ds = Dataset {
            columns: columns(&["a", "b"]),
            records: vec![Record {
                cells: vec!["1".to_string()],
            }],
        };
        assert_eq!(ds.records[0].cell(0), "1");
        assert_eq!(ds.records[0].cell(1), "");
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn color_range_spans_entries() {
        let entry = |c: f64| PlotEntry {
            label: String::new(),
            x: 0.5,
            size: 8.0,
            color_value: c,
        };
        let series = PlotSeries {
            entries: vec![entry(2.0), entry(-1.0), entry(0.5)],
            channel: ColorChannel::Correlation,
            summary: PlotSummary {
                title: String::new(),
                x_axis_title: String::new(),
                legend_title: String::new(),
            },
        };
        assert_eq!(series.color_range(), Some((-1.0, 2.0)));
    }
}
