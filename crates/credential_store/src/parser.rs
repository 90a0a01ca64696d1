//! Credential document parsing
//!
//! JSON (bare array, the historical `email_config.json` layout) and TOML
//! (`[[credentials]]` tables).

use contracts::{ContractError, DeliveryCredential};
use serde::{Deserialize, Serialize};

/// Credential document format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFormat {
    /// JSON array (default)
    Json,
    /// TOML with a `credentials` array of tables
    Toml,
}

impl StoreFormat {
    /// Infer format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// TOML requires a table at the top level
#[derive(Debug, Default, Serialize, Deserialize)]
struct TomlDocument {
    #[serde(default)]
    credentials: Vec<DeliveryCredential>,
}

/// Parse a JSON credential document
pub fn parse_json(content: &str) -> Result<Vec<DeliveryCredential>, ContractError> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse a TOML credential document
pub fn parse_toml(content: &str) -> Result<Vec<DeliveryCredential>, ContractError> {
    toml::from_str::<TomlDocument>(content)
        .map(|doc| doc.credentials)
        .map_err(|e| ContractError::ConfigParse {
            message: format!("TOML parse error: {e}"),
            source: Some(Box::new(e)),
        })
}

/// Parse according to format
pub fn parse(content: &str, format: StoreFormat) -> Result<Vec<DeliveryCredential>, ContractError> {
    match format {
        StoreFormat::Json => parse_json(content),
        StoreFormat::Toml => parse_toml(content),
    }
}

/// Serialize according to format
pub fn render(
    credentials: &[DeliveryCredential],
    format: StoreFormat,
) -> Result<String, ContractError> {
    match format {
        StoreFormat::Json => serde_json::to_string_pretty(credentials)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}"))),
        StoreFormat::Toml => {
            let doc = TomlDocument {
                credentials: credentials.to_vec(),
            };
            toml::to_string_pretty(&doc)
                .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
        }
    }
}
