//! AST types for Sigma rules as consumed by the Wazuh converter: metadata,
//! selections, field/value entries, and condition expressions.

use std::fmt;

use serde::Serialize;

// =============================================================================
// Severity level
// =============================================================================

/// Severity level of a rule.
///
/// Unknown level strings are not a load error: the loader keeps `None` and
/// the serializer falls back to the configured default severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Informational,
    Low,
    Medium,
    High,
    Critical,
}

impl Level {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "informational" => Some(Level::Informational),
            "low" => Some(Level::Low),
            "medium" => Some(Level::Medium),
            "high" => Some(Level::High),
            "critical" => Some(Level::Critical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Informational => "informational",
            Level::Low => "low",
            Level::Medium => "medium",
            Level::High => "high",
            Level::Critical => "critical",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Log source
// =============================================================================

/// Log source descriptor of a rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogSource {
    pub category: Option<String>,
    pub product: Option<String>,
    pub service: Option<String>,
}

// =============================================================================
// Rule metadata
// =============================================================================

/// Rule metadata, immutable per conversion pass.
///
/// `id` and `title` are required at load time; the remaining fields default
/// to empty, matching how the downstream XML treats absent metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleMetadata {
    pub id: String,
    pub title: String,
    pub description: String,
    pub author: String,
    pub date: String,
    pub status: String,
    pub level: Option<Level>,
    pub references: Vec<String>,
    pub tags: Vec<String>,
    pub logsource: LogSource,
}

// =============================================================================
// Condition expression AST
// =============================================================================

/// A reference to a named selection inside a condition expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionRef {
    pub name: String,
    /// Set when the reference is preceded by `not`.
    pub negated: bool,
}

/// Parsed condition expression.
///
/// Exactly one connective kind applies at the top level of a rule; mixed
/// `and`/`or` chains are rejected at parse time. A single (optionally
/// negated) reference is treated downstream as a one-element conjunction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConditionExpr {
    /// A lone selection reference.
    Reference(SelectionRef),
    /// `a and b and not c ...`
    Conjunction(Vec<SelectionRef>),
    /// `a or b or c ...`
    Disjunction(Vec<SelectionRef>),
}

impl ConditionExpr {
    /// All selection references in source order.
    pub fn references(&self) -> &[SelectionRef] {
        match self {
            ConditionExpr::Reference(r) => std::slice::from_ref(r),
            ConditionExpr::Conjunction(refs) | ConditionExpr::Disjunction(refs) => refs,
        }
    }

    /// Whether the expression is a disjunction over its references.
    pub fn is_disjunction(&self) -> bool {
        matches!(self, ConditionExpr::Disjunction(_))
    }
}

impl fmt::Display for ConditionExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (refs, joiner) = match self {
            ConditionExpr::Reference(r) => (std::slice::from_ref(r), " and "),
            ConditionExpr::Conjunction(refs) => (refs.as_slice(), " and "),
            ConditionExpr::Disjunction(refs) => (refs.as_slice(), " or "),
        };
        let parts: Vec<String> = refs
            .iter()
            .map(|r| {
                if r.negated {
                    format!("not {}", r.name)
                } else {
                    r.name.clone()
                }
            })
            .collect();
        write!(f, "{}", parts.join(joiner))
    }
}

// =============================================================================
// Selections
// =============================================================================

/// How a selection contributes to the assembled rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionRole {
    /// Contributes to the positive match.
    Primary,
    /// Contributes negated patterns (false-positive suppression).
    Exclusion,
}

/// A field name with optional modifier suffixes, parsed from detection keys
/// like `TargetObject|endswith`.
///
/// Modifiers are stripped before pattern compilation and otherwise ignored;
/// modifier semantics are out of scope for the Wazuh target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: String,
    pub modifiers: Vec<String>,
}

impl FieldSpec {
    /// Split a detection key on `|` into the field name and its modifiers.
    pub fn parse(key: &str) -> Self {
        let mut parts = key.split('|');
        let name = parts.next().unwrap_or("").to_string();
        let modifiers = parts.map(|m| m.to_string()).collect();
        FieldSpec { name, modifiers }
    }
}

/// A literal match value. Lists of these are OR'd alternatives.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{s}"),
            FieldValue::Integer(n) => write!(f, "{n}"),
            FieldValue::Float(n) => write!(f, "{n}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// One field with its ordered list of value alternatives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldEntry {
    pub field: FieldSpec,
    pub values: Vec<FieldValue>,
}

/// A named selection: an ordered set of field/value match criteria.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub name: String,
    pub role: SelectionRole,
    pub entries: Vec<FieldEntry>,
}

// =============================================================================
// Rule
// =============================================================================

/// A fully loaded Sigma rule, ready for compilation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SigmaRule {
    pub metadata: RuleMetadata,
    /// Named selections in document order.
    pub selections: Vec<Selection>,
    /// The raw condition string from the detection block.
    pub condition: String,
    /// The parsed condition expression.
    pub condition_expr: ConditionExpr,
}

impl SigmaRule {
    /// Look up a selection by name.
    pub fn selection(&self, name: &str) -> Option<&Selection> {
        self.selections.iter().find(|s| s.name == name)
    }
}
