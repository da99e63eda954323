//! Engine configuration

use serde::{Deserialize, Serialize};

/// Reconciliation engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Look up an invoice by description for credit transactions no rule matched
    #[serde(default = "default_credit_invoice_fallback")]
    pub credit_invoice_fallback: bool,
}

fn default_credit_invoice_fallback() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            credit_invoice_fallback: default_credit_invoice_fallback(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// `BANK_RULES_CREDIT_INVOICE_FALLBACK` accepts `true`/`false`/`1`/`0`;
    /// anything else keeps the default.
    pub fn from_env() -> Self {
        Self {
            credit_invoice_fallback: std::env::var("BANK_RULES_CREDIT_INVOICE_FALLBACK")
                .ok()
                .and_then(|value| parse_flag(&value))
                .unwrap_or_else(default_credit_invoice_fallback),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" 0 "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_config_defaults_when_field_missing() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert!(config.credit_invoice_fallback);
    }
}
