//! Conversion settings.
//!
//! All knobs that affect the emitted XML live here and travel by value into
//! the pipeline, so independent documents can convert concurrently without
//! touching shared state.

use s2w_parser::Level;

/// Settings for one conversion pass.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Value of the `name` attribute on the root `<group>` element.
    pub group_name: String,
    /// Emit `<options>no_full_log</options>` in every rule body.
    pub no_full_log: bool,
    /// Compile patterns with the `(?i)` case-insensitivity flag.
    pub case_insensitive: bool,
    /// Prefix prepended to projected field names for event-data products.
    pub eventdata_prefix: String,
    /// Lowercase only the first character of a field name when projecting it
    /// under [`eventdata_prefix`](Self::eventdata_prefix). The downstream
    /// decoder names fields `commandLine`, `image`, `targetObject`; folding
    /// is limited to the leading character on purpose.
    pub fold_leading_char: bool,
    /// Products whose events are matched as raw text against a single field
    /// instead of decoded attributes.
    pub catch_all_products: Vec<String>,
    /// Field name used for catch-all products.
    pub catch_all_field: String,
    /// Wazuh level used when the rule's severity level is absent or unknown.
    pub default_severity: u8,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        ConvertConfig {
            group_name: "sigma,".to_string(),
            no_full_log: true,
            case_insensitive: true,
            eventdata_prefix: "win.eventdata.".to_string(),
            fold_leading_char: true,
            catch_all_products: vec!["zeek".to_string()],
            catch_all_field: "full_log".to_string(),
            default_severity: 7,
        }
    }
}

impl ConvertConfig {
    /// Map a severity level onto the Wazuh numeric scale. Unknown or absent
    /// levels fall back to [`default_severity`](Self::default_severity).
    pub fn severity(&self, level: Option<Level>) -> u8 {
        match level {
            Some(Level::Informational) => 5,
            Some(Level::Low) => 7,
            Some(Level::Medium) => 10,
            Some(Level::High) => 13,
            Some(Level::Critical) => 15,
            None => self.default_severity,
        }
    }

    /// Whether events for `product` are matched against the catch-all field.
    pub fn is_catch_all_product(&self, product: Option<&str>) -> bool {
        match product {
            Some(p) => {
                let lowered = p.to_ascii_lowercase();
                self.catch_all_products.iter().any(|c| *c == lowered)
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_table() {
        let config = ConvertConfig::default();
        assert_eq!(config.severity(Some(Level::Informational)), 5);
        assert_eq!(config.severity(Some(Level::Low)), 7);
        assert_eq!(config.severity(Some(Level::Medium)), 10);
        assert_eq!(config.severity(Some(Level::High)), 13);
        assert_eq!(config.severity(Some(Level::Critical)), 15);
    }

    #[test]
    fn test_unknown_level_falls_back_to_low() {
        // Unknown strings load as None; they must map to low's value, never
        // zero and never an error.
        let config = ConvertConfig::default();
        assert_eq!(config.severity(None), 7);
    }

    #[test]
    fn test_catch_all_product_is_case_insensitive() {
        let config = ConvertConfig::default();
        assert!(config.is_catch_all_product(Some("zeek")));
        assert!(config.is_catch_all_product(Some("Zeek")));
        assert!(!config.is_catch_all_product(Some("windows")));
        assert!(!config.is_catch_all_product(None));
    }
}
