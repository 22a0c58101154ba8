//! Wazuh XML rendering.
//!
//! Each match unit becomes one standalone XML file with a `<group>` root and
//! a single `<rule>` body. Rules fanned out from an `or` chain get the
//! originating selection name appended to the file name so each disjunct can
//! be toggled independently on the manager.

use crate::compiler::{CompiledRule, RuleUnit};
use crate::config::ConvertConfig;

/// One rendered output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WazuhFile {
    pub file_name: String,
    pub xml: String,
}

/// Render every unit of a compiled rule.
pub fn render_rule(compiled: &CompiledRule, config: &ConvertConfig) -> Vec<WazuhFile> {
    compiled
        .units
        .iter()
        .map(|unit| WazuhFile {
            file_name: unit_file_name(compiled, unit),
            xml: render_unit(compiled, unit, config),
        })
        .collect()
}

fn unit_file_name(compiled: &CompiledRule, unit: &RuleUnit) -> String {
    match &unit.selection {
        Some(sel) => format!("rule_{}_{}.xml", compiled.metadata.id, sel),
        None => format!("rule_{}.xml", compiled.metadata.id),
    }
}

fn render_unit(compiled: &CompiledRule, unit: &RuleUnit, config: &ConvertConfig) -> String {
    let meta = &compiled.metadata;
    let level = config.severity(meta.level);

    let mut s = String::new();
    s.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    s.push_str(&format!(
        "<group name=\"{}\">\n",
        xml_escape(&config.group_name)
    ));
    s.push_str(&format!(
        "  <rule id=\"{}\" level=\"{}\">\n",
        xml_escape(&meta.id),
        level
    ));

    if let Some(link) = meta.references.first() {
        s.push_str(&format!(
            "    <info type=\"link\">{}</info>\n",
            xml_escape(link)
        ));
    }

    for comment in [
        format!("Sigma Rule Author: {}", meta.author),
        format!("Description: {}", meta.description),
        format!("Date: {}", meta.date),
        format!("Status: {}", meta.status),
        format!("ID: {}", meta.id),
    ] {
        s.push_str(&format!("    <!--{}-->\n", comment_escape(&comment)));
    }

    if meta.tags.is_empty() {
        s.push_str("    <mitre />\n");
    } else {
        s.push_str("    <mitre>\n");
        for tag in &meta.tags {
            s.push_str(&format!("      <id>{}</id>\n", xml_escape(tag)));
        }
        s.push_str("    </mitre>\n");
    }

    s.push_str(&format!(
        "    <description>{}</description>\n",
        xml_escape(&meta.title)
    ));

    if config.no_full_log {
        s.push_str("    <options>no_full_log</options>\n");
    }

    let groups: Vec<&str> = [
        meta.logsource.category.as_deref(),
        meta.logsource.product.as_deref(),
        meta.logsource.service.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|g| !g.is_empty())
    .collect();
    if !groups.is_empty() {
        s.push_str(&format!(
            "    <group>{},</group>\n",
            xml_escape(&groups.join(","))
        ));
    }

    for p in &unit.patterns {
        s.push_str(&format!(
            "    <field name=\"{}\" negate=\"{}\" type=\"pcre2\">{}</field>\n",
            xml_escape(&p.field),
            if p.negate { "yes" } else { "no" },
            xml_escape(p.pattern_text())
        ));
    }

    s.push_str("  </rule>\n");
    s.push_str("</group>\n");
    s
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Comments cannot contain `--`; collapse runs to a single dash.
fn comment_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_dash = false;
    for c in s.chars() {
        if c == '-' {
            if prev_dash {
                continue;
            }
            prev_dash = true;
        } else {
            prev_dash = false;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_rule;
    use s2w_parser::parse_rule_yaml;

    const RULE: &str = r#"
title: Suspicious Logon
id: 5c9f33f5-0a4f-4173-9eb3-9c5e38f0e2a1
author: analyst
description: Detects suspicious logon events
date: 2023/06/14
status: experimental
level: critical
references:
  - https://example.com/writeup
  - https://example.com/secondary
tags:
  - attack.credential_access
  - attack.t1110
logsource:
  product: windows
  service: security
detection:
  selection:
    EventID:
      - 4624
      - 4625
  condition: selection
"#;

    fn render(yaml: &str) -> Vec<WazuhFile> {
        let rule = parse_rule_yaml(yaml).unwrap();
        let compiled = compile_rule(&rule, &ConvertConfig::default()).unwrap();
        render_rule(&compiled, &ConvertConfig::default())
    }

    #[test]
    fn test_single_unit_layout() {
        let files = render(RULE);
        assert_eq!(files.len(), 1);
        assert_eq!(
            files[0].file_name,
            "rule_5c9f33f5-0a4f-4173-9eb3-9c5e38f0e2a1.xml"
        );

        let xml = &files[0].xml;
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n"));
        assert!(xml.contains("<group name=\"sigma,\">"));
        assert!(xml.contains("<rule id=\"5c9f33f5-0a4f-4173-9eb3-9c5e38f0e2a1\" level=\"15\">"));
        // Only the first reference becomes the info link.
        assert!(xml.contains("<info type=\"link\">https://example.com/writeup</info>"));
        assert!(!xml.contains("secondary"));
        assert!(xml.contains("<!--Sigma Rule Author: analyst-->"));
        assert!(xml.contains("<id>attack.t1110</id>"));
        assert!(xml.contains("<description>Suspicious Logon</description>"));
        assert!(xml.contains("<options>no_full_log</options>"));
        assert!(xml.contains("<group>windows,security,</group>"));
        assert!(xml.contains(
            "<field name=\"win.eventdata.eventID\" negate=\"no\" type=\"pcre2\">(?i)^(?:4624|4625)$</field>"
        ));
    }

    #[test]
    fn test_or_rule_renders_one_file_per_selection() {
        let files = render(
            "title: T\nid: r1\nlogsource:\n  product: zeek\ndetection:\n  sel1:\n    query: '*.bad.test'\n  sel2:\n    query: '*.worse.test'\n  condition: sel1 or sel2\n",
        );
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].file_name, "rule_r1_sel1.xml");
        assert_eq!(files[1].file_name, "rule_r1_sel2.xml");
        assert!(files[0].xml.contains("name=\"full_log\""));
        assert!(!files[0].xml.contains("worse"));
    }

    #[test]
    fn test_unknown_level_renders_as_low() {
        let files = render(
            "title: T\nid: r2\nlevel: urgent\ndetection:\n  sel:\n    A: 1\n  condition: sel\n",
        );
        assert!(files[0].xml.contains("level=\"7\""));
    }

    #[test]
    fn test_negated_pattern_renders_negate_yes() {
        let files = render(
            "title: T\nid: r3\ndetection:\n  sel:\n    A: 1\n  falsepositive:\n    User: SYSTEM\n  condition: sel and falsepositive\n",
        );
        assert!(files[0].xml.contains("negate=\"yes\""));
        assert!(files[0].xml.contains("negate=\"no\""));
    }

    #[test]
    fn test_metadata_is_escaped() {
        let files = render(
            "title: A <b> & \"c\"\nid: r4\ndetection:\n  sel:\n    A: 1\n  condition: sel\n",
        );
        assert!(
            files[0]
                .xml
                .contains("<description>A &lt;b&gt; &amp; &quot;c&quot;</description>")
        );
    }

    #[test]
    fn test_comment_escape_collapses_double_dash() {
        assert_eq!(comment_escape("a--b---c"), "a-b-c");
        assert_eq!(comment_escape("plain"), "plain");
    }

    #[test]
    fn test_empty_logsource_omits_group_element() {
        let files = render("title: T\nid: r5\ndetection:\n  sel:\n    A: 1\n  condition: sel\n");
        assert!(!files[0].xml.contains("<group>,"));
        assert!(files[0].xml.contains("<group name=\"sigma,\">"));
        assert_eq!(files[0].xml.matches("<group").count(), 1);
    }
}
