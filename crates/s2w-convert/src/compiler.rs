//! Rule compilation and evaluation.
//!
//! Compilation projects each referenced selection's field entries into
//! [`CompiledPattern`]s and assembles them into match units. An `and` chain
//! merges every selection into one unit; an `or` chain fans out into one
//! unit per selection, because a Wazuh rule body has no way to express a
//! disjunction across distinct field groups. Units are OR'd at evaluation
//! time and emitted as separate XML files.

use s2w_parser::{FieldSpec, Selection, SelectionRole, SigmaRule};

use crate::config::ConvertConfig;
use crate::error::{ConvertError, Result};
use crate::event::Event;
use crate::pattern::CompiledPattern;

/// One independently sufficient conjunction of patterns.
#[derive(Debug, Clone)]
pub struct RuleUnit {
    /// Name of the originating selection when the rule fanned out over an
    /// `or` chain; `None` for a single merged unit.
    pub selection: Option<String>,
    pub patterns: Vec<CompiledPattern>,
}

impl RuleUnit {
    /// A unit matches iff every pattern is satisfied. Short-circuits on the
    /// first unsatisfied pattern.
    pub fn matches(&self, event: &Event) -> bool {
        self.patterns.iter().all(|p| p.is_satisfied(event))
    }
}

/// A fully compiled rule: source metadata plus its match units.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub metadata: s2w_parser::RuleMetadata,
    pub units: Vec<RuleUnit>,
}

impl CompiledRule {
    /// The rule matches iff at least one unit matches.
    pub fn matches(&self, event: &Event) -> bool {
        self.units.iter().any(|u| u.matches(event))
    }
}

/// Compile a loaded rule into match units.
pub fn compile_rule(rule: &SigmaRule, config: &ConvertConfig) -> Result<CompiledRule> {
    let catch_all = config.is_catch_all_product(rule.metadata.logsource.product.as_deref());
    let refs = rule.condition_expr.references();

    let mut units = Vec::new();
    if rule.condition_expr.is_disjunction() {
        for r in refs {
            let selection = lookup(rule, &r.name)?;
            units.push(RuleUnit {
                selection: Some(r.name.clone()),
                patterns: compile_selection(selection, r.negated, catch_all, config)?,
            });
        }
    } else {
        let mut patterns = Vec::new();
        for r in refs {
            let selection = lookup(rule, &r.name)?;
            patterns.extend(compile_selection(selection, r.negated, catch_all, config)?);
        }
        units.push(RuleUnit {
            selection: None,
            patterns,
        });
    }

    Ok(CompiledRule {
        metadata: rule.metadata.clone(),
        units,
    })
}

fn lookup<'a>(rule: &'a SigmaRule, name: &str) -> Result<&'a Selection> {
    rule.selection(name)
        .ok_or_else(|| ConvertError::UnknownSelection(name.to_string()))
}

/// Compile one selection's entries. The negate flag composes the selection
/// role with the condition-level `not`: an exclusion selection referenced
/// through `not` compiles back to positive-match patterns.
fn compile_selection(
    selection: &Selection,
    cond_negated: bool,
    catch_all: bool,
    config: &ConvertConfig,
) -> Result<Vec<CompiledPattern>> {
    if selection.entries.is_empty() {
        return Err(ConvertError::EmptySelection(selection.name.clone()));
    }

    let negate = (selection.role == SelectionRole::Exclusion) != cond_negated;

    let mut patterns = Vec::with_capacity(selection.entries.len());
    for entry in &selection.entries {
        if entry.values.is_empty() {
            return Err(ConvertError::EmptyValues {
                selection: selection.name.clone(),
                field: entry.field.name.clone(),
            });
        }
        let field = project_field(&selection.name, &entry.field, catch_all, config)?;
        let values: Vec<String> = entry.values.iter().map(|v| v.to_string()).collect();
        patterns.push(CompiledPattern::compile(
            field,
            &values,
            negate,
            config.case_insensitive,
        )?);
    }
    Ok(patterns)
}

/// Project a field name onto the decoded event namespace.
///
/// Catch-all products match the raw log line under a single field. Everything
/// else lands under the event-data prefix with only the leading character
/// lowercased, matching the downstream decoder's naming.
fn project_field(
    selection: &str,
    spec: &FieldSpec,
    catch_all: bool,
    config: &ConvertConfig,
) -> Result<String> {
    if catch_all {
        return Ok(config.catch_all_field.clone());
    }

    let mut chars = spec.name.chars();
    let Some(first) = chars.next() else {
        return Err(ConvertError::EmptyFieldName {
            selection: selection.to_string(),
        });
    };

    let mut name = config.eventdata_prefix.clone();
    if config.fold_leading_char {
        name.extend(first.to_lowercase());
    } else {
        name.push(first);
    }
    name.push_str(chars.as_str());
    Ok(name)
}
