//! # s2w-convert
//!
//! Compiles loaded Sigma rules into Wazuh rule XML, with an evaluator for
//! checking compiled rules against sample events before deployment.
//!
//! ## Architecture
//!
//! - **Compilation** (per document): selection values become anchored
//!   wildcard patterns, the condition expression decides how patterns
//!   assemble into match units. An `or` condition fans out into one unit
//!   per selection; everything else merges into a single unit.
//! - **Rendering**: each unit serializes to one XML file ([`wazuh`]) and the
//!   whole rule to one flat query string ([`query`]).
//! - **Evaluation**: units are tested against JSON events with fail-closed
//!   field lookup, used by sample-log verification.
//!
//! Nothing here touches shared state; the [`ConvertConfig`] travels by value
//! so documents can convert independently.
//!
//! ## Quick Start
//!
//! ```rust
//! use s2w_parser::parse_rule_yaml;
//! use s2w_convert::{ConvertConfig, compile_rule, render_rule, Event};
//! use serde_json::json;
//!
//! let yaml = r#"
//! title: Detect Whoami
//! id: demo-1
//! level: medium
//! logsource:
//!     product: windows
//! detection:
//!     selection:
//!         CommandLine: 'whoami*'
//!     condition: selection
//! "#;
//!
//! let rule = parse_rule_yaml(yaml).unwrap();
//! let config = ConvertConfig::default();
//! let compiled = compile_rule(&rule, &config).unwrap();
//!
//! let files = render_rule(&compiled, &config);
//! assert_eq!(files[0].file_name, "rule_demo-1.xml");
//! assert!(files[0].xml.contains("level=\"10\""));
//!
//! let event = json!({"win": {"eventdata": {"commandLine": "whoami /all"}}});
//! assert!(compiled.matches(&Event::from_value(&event)));
//! ```

pub mod compiler;
pub mod config;
pub mod error;
pub mod event;
pub mod pattern;
pub mod query;
pub mod wazuh;

// Re-export the most commonly used types and functions at crate root
pub use compiler::{CompiledRule, RuleUnit, compile_rule};
pub use config::ConvertConfig;
pub use error::{ConvertError, Result};
pub use event::Event;
pub use pattern::{Alternative, CompiledPattern, wildcard_to_regex};
pub use query::build_query;
pub use wazuh::{WazuhFile, render_rule};
