use std::collections::BTreeSet;

use super::model::{sanitize, Dataset, DetailTable, RankedRecord, Record, RoleMap};

/// Parse a cell as a finite number after sanitising it.
pub fn parse_finite(cell: &str) -> Option<f64> {
    sanitize(cell)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Top-k signed selection
// ---------------------------------------------------------------------------

/// Pick the strongest correlations of one gene.
///
/// Records whose sanitised gene cell equals `gene` are split by the sign of
/// their correlation. The `top_negative` most negative come first (most
/// negative leading), followed by the `top_positive` most positive. Zero and
/// unparsable correlations never appear. Equal values keep file order.
pub fn select<'a>(
    dataset: &'a Dataset,
    roles: &RoleMap,
    gene: &str,
    top_positive: usize,
    top_negative: usize,
) -> Vec<RankedRecord<'a>> {
    let target = sanitize(gene);
    let mut positive: Vec<(&Record, f64)> = Vec::new();
    let mut negative: Vec<(&Record, f64)> = Vec::new();
    let mut matched = 0usize;
    let mut unparsable = 0usize;

    for record in dataset
        .records
        .iter()
        .filter(|r| sanitize(r.cell(roles.gene.index)) == target)
    {
        matched += 1;
        match parse_finite(record.cell(roles.correlation.index)) {
            Some(v) if v > 0.0 => positive.push((record, v)),
            Some(v) if v < 0.0 => negative.push((record, v)),
            Some(_) => {}
            None => unparsable += 1,
        }
    }

    if unparsable > 0 {
        log::debug!(
            "{unparsable} of {matched} rows for '{target}' have no usable '{}' value",
            roles.correlation.name
        );
    }

    positive.sort_by(|a, b| b.1.total_cmp(&a.1));
    negative.sort_by(|a, b| a.1.total_cmp(&b.1));
    positive.truncate(top_positive);
    negative.truncate(top_negative);

    let ranked = |bucket: Vec<(&'a Record, f64)>| {
        bucket
            .into_iter()
            .enumerate()
            .map(|(rank, (record, signed_correlation))| RankedRecord {
                record,
                signed_correlation,
                rank,
            })
    };
    let selected: Vec<RankedRecord<'a>> = ranked(negative).chain(ranked(positive)).collect();

    log::debug!(
        "Selected {} of {matched} rows for '{target}'",
        selected.len()
    );
    selected
}

// ---------------------------------------------------------------------------
// Companion helpers
// ---------------------------------------------------------------------------

/// Distinct non-empty gene values, sorted case-insensitively.
pub fn gene_choices(dataset: &Dataset, roles: &RoleMap) -> Vec<String> {
    let unique: BTreeSet<&str> = dataset
        .records
        .iter()
        .map(|r| sanitize(r.cell(roles.gene.index)))
        .filter(|g| !g.is_empty())
        .collect();
    let mut genes: Vec<String> = unique.into_iter().map(str::to_string).collect();
    // Stable sort over byte-ordered input: case-insensitive ties stay byte-ordered.
    genes.sort_by_cached_key(|g| g.to_lowercase());
    genes
}

/// Sanitised copy of the selected rows, in selection order.
pub fn detail_table(dataset: &Dataset, ranked: &[RankedRecord<'_>]) -> DetailTable {
    DetailTable {
        columns: dataset.columns.clone(),
        rows: ranked
            .iter()
            .map(|r| {
                (0..dataset.columns.len())
                    .map(|i| sanitize(r.record.cell(i)).to_string())
                    .collect()
            })
            .collect(),
    }
}
