//! Wildcard pattern compilation.
//!
//! Sigma values use `*` as the only wildcard. Each value compiles to an
//! anchored regex body; a value list becomes a single alternation so one
//! `<field>` entry covers every alternative.

use regex::Regex;
use serde_json::Value;

use crate::error::Result;
use crate::event::Event;

/// Convert one wildcard value into an unanchored regex body: `*` becomes
/// `.*`, every other character matches literally.
pub fn wildcard_to_regex(value: &str) -> String {
    regex::escape(value).replace(r"\*", ".*")
}

/// One value alternative of a compiled pattern.
#[derive(Debug, Clone)]
pub struct Alternative {
    /// The original literal, wildcards intact.
    pub raw: String,
    /// The escaped, unanchored regex body.
    pub body: String,
}

impl Alternative {
    pub fn compile(raw: &str) -> Self {
        Alternative {
            raw: raw.to_string(),
            body: wildcard_to_regex(raw),
        }
    }
}

/// A single field matcher: one projected field path, OR'd value alternatives,
/// and a negate flag resolved from the selection role and the condition.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub field: String,
    pub alternatives: Vec<Alternative>,
    pub negate: bool,
    text: String,
    regex: Regex,
}

impl CompiledPattern {
    /// Build a pattern from raw value literals. The alternation is anchored
    /// so `Admin*` matches `Administrator` but not `NotAdmin`.
    pub fn compile(
        field: String,
        values: &[String],
        negate: bool,
        case_insensitive: bool,
    ) -> Result<Self> {
        let alternatives: Vec<Alternative> =
            values.iter().map(|v| Alternative::compile(v)).collect();

        let mut text = String::new();
        if case_insensitive {
            text.push_str("(?i)");
        }
        text.push('^');
        if alternatives.len() > 1 {
            text.push_str("(?:");
            for (i, alt) in alternatives.iter().enumerate() {
                if i > 0 {
                    text.push('|');
                }
                text.push_str(&alt.body);
            }
            text.push(')');
        } else if let Some(alt) = alternatives.first() {
            text.push_str(&alt.body);
        }
        text.push('$');

        let regex = Regex::new(&text)?;
        Ok(CompiledPattern {
            field,
            alternatives,
            negate,
            text,
            regex,
        })
    }

    /// The full pattern text as emitted into the `<field>` entry.
    pub fn pattern_text(&self) -> &str {
        &self.text
    }

    /// Whether any alternative matches the given event value. Numbers and
    /// booleans are stringified; arrays match if any element does.
    pub fn matches_value(&self, value: &Value) -> bool {
        match value {
            Value::String(s) => self.regex.is_match(s),
            Value::Number(n) => self.regex.is_match(&n.to_string()),
            Value::Bool(b) => self.regex.is_match(if *b { "true" } else { "false" }),
            Value::Array(arr) => arr.iter().any(|v| self.matches_value(v)),
            _ => false,
        }
    }

    /// Evaluate against an event, honoring the negate flag.
    ///
    /// Fail-closed: when the field path does not resolve, the pattern is not
    /// satisfied even when negated. Absent telemetry must never count as "the
    /// excluded value was not present".
    pub fn is_satisfied(&self, event: &Event) -> bool {
        match event.get_field(&self.field) {
            Some(value) => self.matches_value(value) != self.negate,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compile(values: &[&str]) -> CompiledPattern {
        let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        CompiledPattern::compile("f".into(), &values, false, true).unwrap()
    }

    #[test]
    fn test_wildcard_to_regex() {
        assert_eq!(wildcard_to_regex("Admin*"), "Admin.*");
        assert_eq!(wildcard_to_regex("*\\cmd.exe"), ".*\\\\cmd\\.exe");
        assert_eq!(wildcard_to_regex("plain"), "plain");
    }

    #[test]
    fn test_single_literal_matches_exactly() {
        let p = compile(&["whoami"]);
        assert!(p.matches_value(&json!("whoami")));
        assert!(p.matches_value(&json!("WHOAMI")));
        assert!(!p.matches_value(&json!("whoami /all")));
        assert!(!p.matches_value(&json!("not whoami")));
    }

    #[test]
    fn test_wildcard_is_anchored() {
        let p = compile(&["Admin*"]);
        assert!(p.matches_value(&json!("Administrator")));
        assert!(p.matches_value(&json!("Admin")));
        assert!(!p.matches_value(&json!("NotAdmin")));
    }

    #[test]
    fn test_alternation_text() {
        let p = compile(&["4624", "4625"]);
        assert_eq!(p.pattern_text(), "(?i)^(?:4624|4625)$");
        let p = compile(&["whoami"]);
        assert_eq!(p.pattern_text(), "(?i)^whoami$");
    }

    #[test]
    fn test_case_sensitive_compile() {
        let p = CompiledPattern::compile("f".into(), &["Admin".into()], false, false).unwrap();
        assert_eq!(p.pattern_text(), "^Admin$");
        assert!(p.matches_value(&json!("Admin")));
        assert!(!p.matches_value(&json!("admin")));
    }

    #[test]
    fn test_regex_metacharacters_are_escaped() {
        let p = compile(&["a+b(c)"]);
        assert!(p.matches_value(&json!("a+b(c)")));
        assert!(!p.matches_value(&json!("aab(c)")));
    }

    #[test]
    fn test_numeric_and_bool_coercion() {
        let p = compile(&["4625"]);
        assert!(p.matches_value(&json!(4625)));
        assert!(!p.matches_value(&json!(4624)));

        let p = compile(&["true"]);
        assert!(p.matches_value(&json!(true)));
        assert!(!p.matches_value(&json!(false)));
    }

    #[test]
    fn test_array_value_matches_any_element() {
        let p = compile(&["b"]);
        assert!(p.matches_value(&json!(["a", "b", "c"])));
        assert!(!p.matches_value(&json!(["x", "y"])));
    }

    #[test]
    fn test_fail_closed_on_missing_field() {
        let v = json!({"other": "value"});
        let event = Event::from_value(&v);

        let positive = compile(&["x"]);
        assert!(!positive.is_satisfied(&event));

        let negated = CompiledPattern::compile("f".into(), &["x".into()], true, true).unwrap();
        assert!(!negated.is_satisfied(&event));
    }

    #[test]
    fn test_negate_inverts_present_values() {
        let negated = CompiledPattern::compile("f".into(), &["SYSTEM".into()], true, true).unwrap();
        let hit = json!({"f": "SYSTEM"});
        let miss = json!({"f": "alice"});
        assert!(!negated.is_satisfied(&Event::from_value(&hit)));
        assert!(negated.is_satisfied(&Event::from_value(&miss)));
    }
}
