use std::path::Path;

use batchreg_types::{AccountId, MAX_BATCH};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Initial settings for a registry's access gate.
///
/// ```toml
/// admin = "label:admin"
/// paused = false
/// mint_enabled = true
/// max_batch = 500
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// The initial administrator. Accepts a 64-char hex id or `label:<name>`.
    pub admin: AccountId,
    /// Whether the registry starts paused.
    #[serde(default)]
    pub paused: bool,
    /// Whether minting starts enabled.
    #[serde(default = "default_mint_enabled")]
    pub mint_enabled: bool,
    /// Maximum entries per batch mint. Never above [`MAX_BATCH`].
    #[serde(default = "default_max_batch")]
    pub max_batch: usize,
}

fn default_mint_enabled() -> bool {
    true
}

fn default_max_batch() -> usize {
    MAX_BATCH
}

impl GateConfig {
    /// Defaults for everything except the admin.
    pub fn new(admin: AccountId) -> Self {
        Self {
            admin,
            paused: false,
            mint_enabled: default_mint_enabled(),
            max_batch: default_max_batch(),
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_batch == 0 || self.max_batch > MAX_BATCH {
            return Err(ConfigError::invalid(
                "max_batch",
                format!("must be between 1 and {MAX_BATCH}, got {}", self.max_batch),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn new_uses_defaults() {
        let admin = AccountId::derive("admin");
        let config = GateConfig::new(admin);
        assert_eq!(config.admin, admin);
        assert!(!config.paused);
        assert!(config.mint_enabled);
        assert_eq!(config.max_batch, MAX_BATCH);
    }

    #[test]
    fn parse_minimal_toml() {
        let config = GateConfig::from_toml_str(r#"admin = "label:admin""#).unwrap();
        assert_eq!(config, GateConfig::new(AccountId::derive("admin")));
    }

    #[test]
    fn parse_full_toml() {
        let text = format!(
            "admin = \"{}\"\npaused = true\nmint_enabled = false\nmax_batch = 25\n",
            AccountId::derive("ops").to_hex()
        );
        let config = GateConfig::from_toml_str(&text).unwrap();
        assert_eq!(config.admin, AccountId::derive("ops"));
        assert!(config.paused);
        assert!(!config.mint_enabled);
        assert_eq!(config.max_batch, 25);
    }

    #[test]
    fn missing_admin_is_a_parse_error() {
        let err = GateConfig::from_toml_str("paused = true").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn bad_admin_is_a_parse_error() {
        let err = GateConfig::from_toml_str(r#"admin = "nothex""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn max_batch_is_bounded() {
        for bad in [0, MAX_BATCH + 1] {
            let text = format!("admin = \"label:a\"\nmax_batch = {bad}\n");
            let err = GateConfig::from_toml_str(&text).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { field: "max_batch", .. }));
        }
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "admin = \"label:admin\"\nmint_enabled = false").unwrap();

        let config = GateConfig::load(file.path()).unwrap();
        assert!(!config.mint_enabled);
    }

    #[test]
    fn load_missing_file_reports_path() {
        let err = GateConfig::load("/nonexistent/batchreg.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/batchreg.toml"));
    }
}
