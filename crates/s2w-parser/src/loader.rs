//! YAML rule loading.
//!
//! Turns a Sigma YAML document into a [`SigmaRule`]: metadata extraction,
//! selection collection from the detection block, and condition parsing with
//! reference validation.

use std::fs;
use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::ast::{
    FieldEntry, FieldSpec, FieldValue, Level, LogSource, RuleMetadata, Selection, SelectionRole,
    SigmaRule,
};
use crate::condition::parse_condition;
use crate::error::{LoadError, Result};

/// Detection keys whose selections carry negated (exclusion) semantics.
const EXCLUSION_KEYS: &[&str] = &["falsepositive", "falsepositives"];

/// Parse a single Sigma rule from a YAML string.
pub fn parse_rule_yaml(input: &str) -> Result<SigmaRule> {
    let doc: Value = serde_yaml::from_str(input)?;
    let map = doc
        .as_mapping()
        .ok_or_else(|| LoadError::InvalidRule("document is not a mapping".into()))?;

    let metadata = parse_metadata(map)?;

    let detection = get_mapping(map, "detection")?
        .ok_or_else(|| LoadError::MissingField("detection".into()))?;

    let condition = get_string(detection, "condition")?
        .ok_or_else(|| LoadError::MissingField("detection.condition".into()))?;
    let condition_expr = parse_condition(&condition)?;

    let mut selections = Vec::new();
    for (key, value) in detection {
        let name = scalar_to_string(key)
            .ok_or_else(|| LoadError::InvalidRule("non-scalar detection key".into()))?;
        if name == "condition" {
            continue;
        }
        let role = if EXCLUSION_KEYS.contains(&name.as_str()) {
            SelectionRole::Exclusion
        } else {
            SelectionRole::Primary
        };
        selections.push(parse_selection(&name, role, value)?);
    }

    for r in condition_expr.references() {
        if !selections.iter().any(|s| s.name == r.name) {
            return Err(LoadError::UnknownSelection(r.name.clone()));
        }
    }

    Ok(SigmaRule {
        metadata,
        selections,
        condition,
        condition_expr,
    })
}

/// Parse a single Sigma rule from a YAML file on disk.
pub fn parse_rule_file(path: impl AsRef<Path>) -> Result<SigmaRule> {
    let content = fs::read_to_string(path)?;
    parse_rule_yaml(&content)
}

fn parse_metadata(map: &Mapping) -> Result<RuleMetadata> {
    let id = get_string(map, "id")?.ok_or_else(|| LoadError::MissingField("id".into()))?;
    let title = get_string(map, "title")?.ok_or_else(|| LoadError::MissingField("title".into()))?;

    let level = match get_string(map, "level")? {
        Some(s) => Level::from_str(&s),
        None => None,
    };

    let logsource = match map.get(Value::from("logsource")) {
        Some(Value::Mapping(ls)) => LogSource {
            category: get_string(ls, "category")?,
            product: get_string(ls, "product")?,
            service: get_string(ls, "service")?,
        },
        _ => LogSource::default(),
    };

    Ok(RuleMetadata {
        id,
        title,
        description: get_string(map, "description")?.unwrap_or_default(),
        author: get_string(map, "author")?.unwrap_or_default(),
        date: get_string(map, "date")?.unwrap_or_default(),
        status: get_string(map, "status")?.unwrap_or_default(),
        level,
        references: get_str_list(map, "references"),
        tags: get_str_list(map, "tags"),
        logsource,
    })
}

fn parse_selection(name: &str, role: SelectionRole, value: &Value) -> Result<Selection> {
    let map = value.as_mapping().ok_or_else(|| {
        LoadError::InvalidValue(name.to_string(), "selection must be a mapping".into())
    })?;

    let mut entries = Vec::new();
    for (key, val) in map {
        let raw_key = scalar_to_string(key).ok_or_else(|| {
            LoadError::InvalidValue(name.to_string(), "non-scalar field key".into())
        })?;
        let field = FieldSpec::parse(&raw_key);
        let values = parse_values(&raw_key, val)?;
        entries.push(FieldEntry { field, values });
    }

    Ok(Selection {
        name: name.to_string(),
        role,
        entries,
    })
}

fn parse_values(key: &str, value: &Value) -> Result<Vec<FieldValue>> {
    match value {
        Value::Sequence(seq) => seq
            .iter()
            .map(|v| {
                field_value(v).ok_or_else(|| {
                    LoadError::InvalidValue(key.to_string(), "non-scalar list element".into())
                })
            })
            .collect(),
        other => {
            let v = field_value(other).ok_or_else(|| {
                LoadError::InvalidValue(key.to_string(), "value must be a scalar or a list".into())
            })?;
            Ok(vec![v])
        }
    }
}

fn field_value(value: &Value) -> Option<FieldValue> {
    match value {
        Value::String(s) => Some(FieldValue::String(s.clone())),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(FieldValue::Integer(i))
            } else {
                n.as_f64().map(FieldValue::Float)
            }
        }
        Value::Bool(b) => Some(FieldValue::Bool(*b)),
        _ => None,
    }
}

/// Read a scalar value under `key` as a string. YAML often carries dates and
/// ids unquoted, so numbers and booleans stringify rather than error.
fn get_string(map: &Mapping, key: &str) -> Result<Option<String>> {
    match map.get(Value::from(key)) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => scalar_to_string(v)
            .map(Some)
            .ok_or_else(|| LoadError::InvalidValue(key.to_string(), "expected a scalar".into())),
    }
}

fn get_str_list(map: &Mapping, key: &str) -> Vec<String> {
    match map.get(Value::from(key)) {
        Some(Value::Sequence(seq)) => seq.iter().filter_map(scalar_to_string).collect(),
        Some(v) => scalar_to_string(v).into_iter().collect(),
        None => Vec::new(),
    }
}

fn get_mapping<'a>(map: &'a Mapping, key: &str) -> Result<Option<&'a Mapping>> {
    match map.get(Value::from(key)) {
        None => Ok(None),
        Some(Value::Mapping(m)) => Ok(Some(m)),
        Some(_) => Err(LoadError::InvalidValue(
            key.to_string(),
            "expected a mapping".into(),
        )),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
