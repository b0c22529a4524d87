use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::model::{
    strip_outer_quotes, Dataset, ParseDiagnostics, RawPreview, Record, TextEncoding,
};

/// Delimiters tried on the first non-empty line, in tie-break order.
pub const DELIMITER_CANDIDATES: [char; 4] = ['\t', ',', ';', '|'];

/// Leading characters inspected for NUL code units.
const UTF16_SNIFF_CHARS: usize = 8;
const PREVIEW_CHARS: usize = 2000;
const PREVIEW_HEX_UNITS: usize = 64;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Which tabular parser turns text into records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecoderBackend {
    /// Quote-aware `csv` reader with a literal-quote forced-delimiter retry.
    #[default]
    Csv,
    /// Plain line/field splitting.
    Simple,
}

/// Everything one decode produces. An empty dataset is a normal outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeOutcome {
    pub dataset: Dataset,
    pub diagnostics: ParseDiagnostics,
    pub preview: RawPreview,
}

impl DecodeOutcome {
    /// True when no records were decoded.
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }
}

/// Read and decode a file. Only the read itself can fail.
pub fn read_file(path: &Path, backend: DecoderBackend) -> Result<DecodeOutcome> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("reading {}", path.display()))?;
    log::info!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(decode_bytes(&bytes, backend))
}

/// Decode raw bytes as UTF-8, retrying once as UTF-16LE when the leading
/// characters contain NUL code units.
pub fn decode_bytes(bytes: &[u8], backend: DecoderBackend) -> DecodeOutcome {
    let text = String::from_utf8_lossy(bytes);
    if !looks_like_utf16(&text) {
        return decode(&text, backend);
    }

    log::info!("NUL code units in leading text, retrying as UTF-16LE");
    let wide = decode_utf16le(bytes);
    let mut outcome = decode(&wide, backend);
    outcome.diagnostics.encoding = TextEncoding::Utf16Le;
    outcome
}

/// Decode delimited text into a [`Dataset`].
///
/// Never fails: parser errors are folded into an empty dataset and reported
/// through [`RawPreview::error`].
pub fn decode(text: &str, backend: DecoderBackend) -> DecodeOutcome {
    let had_byte_order_mark = text.starts_with('\u{FEFF}');
    let body = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    let delimiter = detect_delimiter(body);

    let diagnostics = ParseDiagnostics {
        detected_delimiter: delimiter,
        had_byte_order_mark,
        encoding: TextEncoding::Utf8,
    };
    let mut preview = RawPreview::capture(text);

    let parsed = match backend {
        DecoderBackend::Csv => decode_csv(body, delimiter),
        DecoderBackend::Simple => Ok(decode_simple(body, delimiter)),
    };
    let dataset = match parsed {
        Ok(ds) => ds,
        Err(e) => {
            log::warn!("Tabular parse failed: {e:#}");
            preview.error = Some(format!("{e:#}"));
            Dataset::default()
        }
    };

    if dataset.is_empty() {
        log::warn!(
            "Decoded no records (delimiter {}, BOM: {})",
            diagnostics.delimiter_name(),
            had_byte_order_mark
        );
    } else {
        log::info!(
            "Decoded {} records with columns {:?}",
            dataset.len(),
            dataset.columns
        );
    }

    DecodeOutcome {
        dataset,
        diagnostics,
        preview,
    }
}

/// Pick the candidate that splits the first non-empty line into the most
/// fields. Earlier candidates win ties; empty text yields a comma.
pub fn detect_delimiter(text: &str) -> char {
    let Some(first) = text.lines().find(|l| !l.trim().is_empty()) else {
        return ',';
    };
    DELIMITER_CANDIDATES
        .iter()
        .fold((DELIMITER_CANDIDATES[0], 0), |(best, best_fields), &c| {
            let fields = first.split(c).count();
            if fields > best_fields {
                (c, fields)
            } else {
                (best, best_fields)
            }
        })
        .0
}

// ---------------------------------------------------------------------------
// CSV backend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quoting {
    /// Quote-aware; the normal pass.
    Quoted,
    /// Quotes are literal text; the forced-delimiter retry.
    Literal,
}

/// Both passes accept ragged rows: short rows are padded to the header width
/// and extra cells are dropped.
fn decode_csv(body: &str, delimiter: char) -> Result<Dataset> {
    match parse_csv(body, delimiter, Quoting::Quoted) {
        Ok(ds) if !ds.is_empty() => return Ok(ds),
        Ok(_) => log::debug!("Quoted parse gave no records, forcing delimiter {delimiter:?}"),
        Err(e) => log::debug!("Quoted parse failed ({e:#}), forcing delimiter {delimiter:?}"),
    }
    parse_csv(body, delimiter, Quoting::Literal)
}

fn parse_csv(body: &str, delimiter: char, mode: Quoting) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .quoting(mode == Quoting::Quoted)
        .from_reader(body.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV header")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let width = columns.len();

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {}", row_no + 1))?;
        if row.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        let mut cells: Vec<String> = row.iter().take(width).map(str::to_string).collect();
        cells.resize(width, String::new());
        records.push(Record { cells });
    }

    Ok(Dataset { columns, records })
}

// ---------------------------------------------------------------------------
// Simple backend
// ---------------------------------------------------------------------------

/// Line-split fallback: header fields are trimmed, data cells lose one pair
/// of outer quotes, and short rows are padded with empty cells.
fn decode_simple(body: &str, delimiter: char) -> Dataset {
    let mut lines = body.lines().filter(|l| !l.trim().is_empty());
    let Some(header) = lines.next() else {
        return Dataset::default();
    };
    let columns: Vec<String> = header
        .split(delimiter)
        .map(|h| h.trim().to_string())
        .collect();

    let records = lines
        .map(|line| {
            let fields: Vec<&str> = line.split(delimiter).collect();
            let cells = (0..columns.len())
                .map(|i| {
                    fields
                        .get(i)
                        .map(|f| strip_outer_quotes(f).to_string())
                        .unwrap_or_default()
                })
                .collect();
            Record { cells }
        })
        .collect();

    Dataset { columns, records }
}

// ---------------------------------------------------------------------------
// Encoding helpers
// ---------------------------------------------------------------------------

fn looks_like_utf16(text: &str) -> bool {
    text.chars().take(UTF16_SNIFF_CHARS).any(|c| c == '\0')
}

fn decode_utf16le(bytes: &[u8]) -> String {
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

impl RawPreview {
    /// Snapshot the start of `text` for the diagnostic panel.
    pub fn capture(text: &str) -> Self {
        let sample: String = text.chars().take(PREVIEW_CHARS).collect();
        let first_line = sample
            .split('\n')
            .next()
            .unwrap_or("")
            .trim_end_matches('\r')
            .to_string();
        let hex = text
            .encode_utf16()
            .take(PREVIEW_HEX_UNITS)
            .map(|u| format!("{u:02x}"))
            .collect::<Vec<_>>()
            .join(" ");
        RawPreview {
            first_line,
            sample,
            hex,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const COMMA_TABLE: &str = "gene,pathway,cor,pval\nTP53,Apoptosis,0.81,0.001\nTP53,Glycolysis,-0.42,0.03\n";

    fn utf16le_bytes(text: &str, with_bom: bool) -> Vec<u8> {
        let mut bytes = Vec::new();
        if with_bom {
            bytes.extend_from_slice(&[0xFF, 0xFE]);
        }
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn test_detect_prefers_most_fields() {
        assert_eq!(detect_delimiter("a,b\tc\td\te\nx,y"), '\t');
        assert_eq!(detect_delimiter("\n\n  \na;b;c|d\n"), ';');
    }

    #[test]
    fn test_detect_ties_go_to_earlier_candidate() {
        assert_eq!(detect_delimiter("a,b;c"), ',');
        assert_eq!(detect_delimiter("a\tb,c"), '\t');
        assert_eq!(detect_delimiter("single"), '\t');
        assert_eq!(detect_delimiter(""), ',');
    }

    #[test]
    fn test_decode_comma_table() {
        let outcome = decode(COMMA_TABLE, DecoderBackend::Csv);
        assert_eq!(outcome.diagnostics.detected_delimiter, ',');
        assert!(!outcome.diagnostics.had_byte_order_mark);
        assert_eq!(outcome.dataset.columns, ["gene", "pathway", "cor", "pval"]);
        assert_eq!(outcome.dataset.len(), 2);
        assert_eq!(outcome.dataset.records[1].cell(2), "-0.42");
    }

    #[test]
    fn test_decode_is_deterministic() {
        let a = decode(COMMA_TABLE, DecoderBackend::Csv);
        let b = decode(COMMA_TABLE, DecoderBackend::Csv);
        assert_eq!(a.dataset, b.dataset);
    }

    #[test]
    fn test_bom_is_flagged_and_stripped() {
        let text = format!("\u{FEFF}{}", COMMA_TABLE.replace(',', "\t"));
        let outcome = decode(&text, DecoderBackend::Csv);
        assert!(outcome.diagnostics.had_byte_order_mark);
        assert_eq!(outcome.diagnostics.detected_delimiter, '\t');
        assert_eq!(outcome.dataset.columns[0], "gene");
    }

    #[test]
    fn test_header_only_is_empty_outcome() {
        let outcome = decode("gene;pathway;rho\n\n", DecoderBackend::Csv);
        assert!(outcome.is_empty());
        assert_eq!(outcome.diagnostics.detected_delimiter, ';');
        assert_eq!(outcome.preview.first_line, "gene;pathway;rho");
        assert!(outcome.preview.error.is_none());
    }

    #[test]
    fn test_ragged_rows_are_padded_or_cut() {
        let text = "gene,pathway,cor\r\nA,P1\r\nB,P2,0.5,extra\r\n   \r\n";
        let outcome = decode(text, DecoderBackend::Csv);
        assert_eq!(outcome.dataset.len(), 2);
        assert_eq!(outcome.dataset.records[0].cells, ["A", "P1", ""]);
        assert_eq!(outcome.dataset.records[1].cells, ["B", "P2", "0.5"]);
    }

    #[test]
    fn test_short_row_keeps_quoted_cells_intact() {
        let text = "gene,pathway,cor\nTP53,\"Signal, transduction\",0.3\nTP53,Apoptosis\n";
        let outcome = decode(text, DecoderBackend::Csv);
        assert_eq!(
            outcome.dataset.records[0].cells,
            ["TP53", "Signal, transduction", "0.3"]
        );
        assert_eq!(outcome.dataset.records[1].cells, ["TP53", "Apoptosis", ""]);
    }

    #[test]
    fn test_blank_trailing_line_keeps_quoted_cells_intact() {
        let text = "gene,pathway,cor\nTP53,\"Signal, transduction\",0.3\n  \n";
        let outcome = decode(text, DecoderBackend::Csv);
        assert_eq!(outcome.dataset.len(), 1);
        assert_eq!(outcome.dataset.records[0].cell(1), "Signal, transduction");
        assert_eq!(outcome.dataset.records[0].cell(2), "0.3");
    }

    #[test]
    fn test_quoted_cells_keep_embedded_delimiters() {
        let text = "gene,pathway,cor\nA,\"Signal, transduction\",0.3\n";
        let outcome = decode(text, DecoderBackend::Csv);
        assert_eq!(outcome.dataset.records[0].cell(1), "Signal, transduction");
    }

    #[test]
    fn test_simple_backend_pads_and_unquotes() {
        let text = " gene |pathway|cor\n\"TP53\"|\"P1\"\n\nKRAS|P2|-0.2\n";
        let outcome = decode(text, DecoderBackend::Simple);
        assert_eq!(outcome.diagnostics.detected_delimiter, '|');
        assert_eq!(outcome.dataset.columns, ["gene", "pathway", "cor"]);
        assert_eq!(outcome.dataset.records[0].cells, ["TP53", "P1", ""]);
        assert_eq!(outcome.dataset.records[1].cells, ["KRAS", "P2", "-0.2"]);
    }

    #[test]
    fn test_utf16le_retry() {
        let bytes = utf16le_bytes("gene\tpathway\tcor\nTP53\tP1\t0.5\n", true);
        let outcome = decode_bytes(&bytes, DecoderBackend::Csv);
        assert_eq!(outcome.diagnostics.encoding, TextEncoding::Utf16Le);
        assert!(outcome.diagnostics.had_byte_order_mark);
        assert_eq!(outcome.dataset.columns, ["gene", "pathway", "cor"]);
        assert_eq!(outcome.dataset.records[0].cells, ["TP53", "P1", "0.5"]);

        let no_bom = utf16le_bytes("gene,pathway,cor\nA,P,1\n", false);
        assert_eq!(decode_bytes(&no_bom, DecoderBackend::Csv).dataset.len(), 1);
    }

    #[test]
    fn test_utf8_bytes_skip_retry() {
        let outcome = decode_bytes(COMMA_TABLE.as_bytes(), DecoderBackend::Csv);
        assert_eq!(outcome.diagnostics.encoding, TextEncoding::Utf8);
        assert_eq!(outcome.dataset.len(), 2);
    }

    #[test]
    fn test_preview_hex_of_leading_units() {
        let preview = RawPreview::capture("ab\r\ncd");
        assert_eq!(preview.first_line, "ab");
        assert_eq!(preview.hex, "61 62 0d 0a 63 64");
    }

    #[test]
    fn test_read_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(COMMA_TABLE.as_bytes())?;
        let outcome = read_file(file.path(), DecoderBackend::Csv)?;
        assert_eq!(outcome.dataset.len(), 2);

        let missing = read_file(Path::new("no/such/file.csv"), DecoderBackend::Csv);
        assert!(missing.is_err());
        Ok(())
    }
}
