//! # s2w-parser
//!
//! Rule model and loader for converting Sigma detection rules to Wazuh.
//!
//! This crate parses a single Sigma YAML document into a strongly-typed rule,
//! handling:
//!
//! - **Metadata**: id, title, description, author, date, status, severity
//!   level, references, tags, logsource
//! - **Selections**: named field/value match groups, with an explicit
//!   [`SelectionRole`] assigned at load time (the reserved `falsepositive`
//!   detection key loads as [`SelectionRole::Exclusion`])
//! - **Condition expressions**: a single-level chain of selection references
//!   joined by `and` or `or`, with per-reference `not`
//!
//! ## Supported condition grammar
//!
//! The converter targets Wazuh, which cannot express arbitrary boolean
//! structure, so the condition grammar is deliberately restricted: one
//! connective kind per condition, no parentheses, no `1 of` / `all of`
//! selectors. A condition mixing `and` and `or` fails with
//! [`LoadError::UnsupportedExpression`] rather than guessing precedence.
//!
//! ## Quick Start
//!
//! ```rust
//! use s2w_parser::parse_rule_yaml;
//!
//! let yaml = r#"
//! id: 100100
//! title: Suspicious Logon Burst
//! logsource:
//!     product: windows
//!     service: security
//! detection:
//!     selection:
//!         EventID:
//!             - 4624
//!             - 4625
//!     condition: selection
//! level: medium
//! "#;
//!
//! let rule = parse_rule_yaml(yaml).unwrap();
//! assert_eq!(rule.metadata.title, "Suspicious Logon Burst");
//! assert_eq!(rule.selections.len(), 1);
//! ```

pub mod ast;
pub mod condition;
pub mod error;
pub mod loader;

pub use ast::{
    ConditionExpr, FieldEntry, FieldSpec, FieldValue, Level, LogSource, RuleMetadata,
    SelectionRef, Selection, SelectionRole, SigmaRule,
};
pub use condition::parse_condition;
pub use error::{LoadError, Result};
pub use loader::{parse_rule_file, parse_rule_yaml};
