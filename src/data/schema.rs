use std::collections::HashMap;

use super::model::{Role, RoleMap};
use crate::error::SchemaError;

const GENE_CANDIDATES: &[&str] = &["gene", "symbol", "hgnc_symbol", "gene_name"];
const PATHWAY_CANDIDATES: &[&str] = &["pathway", "term", "gsva", "gsva_name", "path"];
const CORRELATION_CANDIDATES: &[&str] = &["cor", "corr", "correlation", "rho"];
const SIGNIFICANCE_CANDIDATES: &[&str] = &["pval", "p.value", "p_value", "pvalue"];

/// Header names a role is recognised by, in priority order.
pub fn candidates(role: Role) -> &'static [&'static str] {
    match role {
        Role::Gene => GENE_CANDIDATES,
        Role::Pathway => PATHWAY_CANDIDATES,
        Role::Correlation => CORRELATION_CANDIDATES,
        Role::Significance => SIGNIFICANCE_CANDIDATES,
    }
}

/// Positional default for a required role that no header name matched.
fn positional_default(role: Role) -> Option<usize> {
    match role {
        Role::Gene => Some(0),
        Role::Pathway => Some(1),
        Role::Correlation => Some(2),
        Role::Significance => None,
    }
}

/// Guess which column plays each role.
///
/// Names are compared case-insensitively against [`candidates`]. Required
/// roles without a match fall back to the 1st/2nd/3rd column (or the 1st when
/// the header is narrower); significance has no fallback and stays unbound.
pub fn infer_roles(columns: &[String]) -> Result<RoleMap, SchemaError> {
    if columns.is_empty() {
        return Err(SchemaError::NoColumns);
    }

    // Lowercase name -> original name; first occurrence wins.
    let mut index: HashMap<String, &str> = HashMap::new();
    for col in columns {
        index.entry(col.to_lowercase()).or_insert(col.as_str());
    }

    let by_name = |role: Role| {
        candidates(role)
            .iter()
            .find_map(|c| index.get(*c).copied())
    };
    let resolve = |role: Role| {
        by_name(role).or_else(|| {
            let pos = positional_default(role)?;
            let col = columns.get(pos).unwrap_or(&columns[0]);
            log::debug!("No {role} column by name, using column {pos}: '{col}'");
            Some(col.as_str())
        })
    };

    let gene = resolve(Role::Gene).ok_or(SchemaError::NoColumns)?;
    let pathway = resolve(Role::Pathway).ok_or(SchemaError::NoColumns)?;
    let correlation = resolve(Role::Correlation).ok_or(SchemaError::NoColumns)?;
    let significance = by_name(Role::Significance);

    let roles = RoleMap::new(columns, gene, pathway, correlation, significance)?;
    log::info!(
        "Inferred roles: gene='{}', pathway='{}', correlation='{}', significance={:?}",
        roles.gene.name,
        roles.pathway.name,
        roles.correlation.name,
        roles.significance.as_ref().map(|c| c.name.as_str())
    );
    Ok(roles)
}
