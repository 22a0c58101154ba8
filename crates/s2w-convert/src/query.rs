//! Flat search-query rendering.
//!
//! Renders a compiled rule as a single-line query string, e.g.
//! `field:"value" AND (other:"a" OR other:"b")`, used for quick inspection
//! and for naming what the sample-log verifier is about to check. Values
//! keep their original wildcards.

use crate::compiler::{CompiledRule, RuleUnit};

/// Render a compiled rule as a flat query expression.
pub fn build_query(compiled: &CompiledRule) -> String {
    let units: Vec<String> = compiled.units.iter().map(unit_query).collect();
    match units.as_slice() {
        [single] => single.clone(),
        many => many
            .iter()
            .map(|u| format!("({u})"))
            .collect::<Vec<_>>()
            .join(" OR "),
    }
}

fn unit_query(unit: &RuleUnit) -> String {
    unit.patterns
        .iter()
        .map(|p| {
            let terms: Vec<String> = p
                .alternatives
                .iter()
                .map(|a| format!("{}:\"{}\"", p.field, a.raw))
                .collect();
            let body = if terms.len() > 1 {
                format!("({})", terms.join(" OR "))
            } else {
                terms.join("")
            };
            if p.negate {
                format!("NOT {body}")
            } else {
                body
            }
        })
        .collect::<Vec<_>>()
        .join(" AND ")
}
