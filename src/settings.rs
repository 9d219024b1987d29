use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::attestation::AttestationTrust;
use crate::auth::{AuthenticationConfig, CounterPolicy};
use crate::challenge::Challenge;
use crate::error::U2fError;
use crate::register::RegistrationConfig;
use crate::registration::Registration;

/// Name of the settings file looked up in the working and secrets directories
pub const SETTINGS_FILE: &str = "U2f.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct U2fSettings {
    pub app_id: String,
    /// Origins accepted in client data; empty means just `app_id`
    pub trusted_facets: Vec<String>,
    pub skip_attestation_check: bool,
    /// PEM files holding the accepted attestation roots
    pub attestation_roots: Vec<PathBuf>,
    pub counter_policy: CounterPolicy,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for U2fSettings {
    fn default() -> Self {
        Self {
            app_id: "https://localhost:3483".to_string(),
            trusted_facets: Vec::new(),
            skip_attestation_check: false,
            attestation_roots: Vec::new(),
            counter_policy: CounterPolicy::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl U2fSettings {
    /// Load settings from configuration files and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Settings file cannot be read
    /// - TOML parsing fails
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Self::load_env_file();

        let mut settings = Self::load_base_settings()?;
        Self::apply_env_overrides(&mut settings);

        Ok(settings)
    }

    /// Load base settings from TOML file(s) or use defaults
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading base settings)
    /// 2. U2f.toml in `U2F_SECRETS_DIR` (if specified and exists)
    /// 3. U2f.toml in current directory (if exists)
    /// 4. Default settings
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file cannot be read or parsed
    fn load_base_settings() -> Result<Self, Box<dyn std::error::Error>> {
        let mut settings = Self::default();

        let default_config_path = PathBuf::from(SETTINGS_FILE);
        if default_config_path.exists() {
            settings = Self::from_file(&default_config_path)?;
            println!("✓ Loaded base settings from {}", default_config_path.display());
        }

        if let Ok(secrets_dir) = std::env::var("U2F_SECRETS_DIR") {
            let secrets_path = Path::new(&secrets_dir).join(SETTINGS_FILE);
            if secrets_path.exists() {
                settings = Self::from_file(&secrets_path)?;
                println!("✓ Overriding settings from {}", secrets_path.display());
            } else {
                println!(
                    "ℹ U2F_SECRETS_DIR set but no {SETTINGS_FILE} found at: {}",
                    secrets_path.display()
                );
            }
        }

        Ok(settings)
    }

    /// Parse a settings file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let toml_content = fs::read_to_string(path)?;
        Ok(basic_toml::from_str(&toml_content)?)
    }

    /// Apply environment variable overrides to settings
    pub fn apply_env_overrides(settings: &mut Self) {
        if let Ok(app_id) = std::env::var("U2F_APP_ID") {
            settings.app_id = app_id;
        }
        if let Ok(facets) = std::env::var("U2F_TRUSTED_FACETS") {
            settings.trusted_facets = split_list(&facets).map(str::to_string).collect();
        }
        if let Ok(skip) = std::env::var("U2F_SKIP_ATTESTATION_CHECK") {
            match skip.trim().parse::<bool>() {
                Ok(skip) => settings.skip_attestation_check = skip,
                Err(_) => {
                    eprintln!("⚠️  Ignoring invalid U2F_SKIP_ATTESTATION_CHECK value: {skip}");
                }
            }
        }
        if let Ok(roots) = std::env::var("U2F_ATTESTATION_ROOTS") {
            settings.attestation_roots = split_list(&roots).map(PathBuf::from).collect();
        }
        if let Ok(policy) = std::env::var("U2F_COUNTER_POLICY") {
            match policy.parse::<CounterPolicy>() {
                Ok(policy) => settings.counter_policy = policy,
                Err(err) => eprintln!("⚠️  Ignoring U2F_COUNTER_POLICY: {err}"),
            }
        }
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            settings.logging.level = log_level;
        }
    }

    /// Load environment variables from .env file
    fn load_env_file() {
        if let Ok(contents) = fs::read_to_string(".env") {
            for line in contents.lines() {
                let line = line.trim();
                if line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    std::env::set_var(key.trim(), value.trim());
                }
            }
        }
    }

    /// Origins accepted in client data
    #[must_use]
    pub fn trusted_facets(&self) -> Vec<String> {
        if self.trusted_facets.is_empty() {
            vec![self.app_id.clone()]
        } else {
            self.trusted_facets.clone()
        }
    }

    /// Issue a challenge for the configured app id
    ///
    /// # Errors
    ///
    /// Returns `InsufficientRandomness` if the random source fails.
    pub fn new_challenge(&self, registered_keys: Vec<Registration>) -> Result<Challenge, U2fError> {
        Challenge::new(&self.app_id, &self.trusted_facets(), registered_keys)
    }

    /// Build the registration options, reading the configured root files
    ///
    /// # Errors
    ///
    /// Returns an error if a root file cannot be read or holds no certificate
    pub fn registration_config(&self) -> Result<RegistrationConfig, Box<dyn std::error::Error>> {
        let mut trust = AttestationTrust::new();
        for path in &self.attestation_roots {
            let pem = fs::read(path)
                .map_err(|err| format!("Cannot read attestation root {}: {err}", path.display()))?;
            trust.add_roots_pem(&pem)?;
        }

        if trust.is_empty() && !self.skip_attestation_check {
            log::warn!("No attestation roots configured; every registration will be rejected");
        }

        Ok(RegistrationConfig {
            skip_attestation_check: self.skip_attestation_check,
            trust,
        })
    }

    /// Build the authentication options
    #[must_use]
    pub fn authentication_config(&self) -> AuthenticationConfig {
        AuthenticationConfig {
            counter_policy: self.counter_policy,
        }
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|item| !item.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::virtual_key::VirtualKey;
    use serial_test::serial;

    const ENV_VARS: &[&str] = &[
        "U2F_APP_ID",
        "U2F_TRUSTED_FACETS",
        "U2F_SKIP_ATTESTATION_CHECK",
        "U2F_ATTESTATION_ROOTS",
        "U2F_COUNTER_POLICY",
        "U2F_SECRETS_DIR",
        "RUST_LOG",
    ];

    // Helper function to clean all relevant environment variables for tests
    fn clean_env_vars() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let settings = U2fSettings::default();
        assert_eq!(settings.app_id, "https://localhost:3483");
        assert_eq!(settings.trusted_facets(), vec![settings.app_id.clone()]);
        assert!(!settings.skip_attestation_check);
        assert_eq!(settings.counter_policy, CounterPolicy::RejectDecrease);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_parse_toml() {
        let settings: U2fSettings = basic_toml::from_str(
            r#"
            app_id = "https://example.com"
            trusted_facets = ["https://example.com", "https://login.example.com"]
            skip_attestation_check = true
            counter_policy = "require-increase"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(settings.app_id, "https://example.com");
        assert_eq!(settings.trusted_facets().len(), 2);
        assert!(settings.skip_attestation_check);
        assert_eq!(settings.counter_policy, CounterPolicy::RequireIncrease);
        assert_eq!(settings.logging.level, "debug");
        assert!(settings.attestation_roots.is_empty());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clean_env_vars();

        std::env::set_var("U2F_APP_ID", "https://env.example.com");
        std::env::set_var(
            "U2F_TRUSTED_FACETS",
            "https://env.example.com, https://m.env.example.com,",
        );
        std::env::set_var("U2F_SKIP_ATTESTATION_CHECK", "true");
        std::env::set_var("U2F_COUNTER_POLICY", "require-increase");
        std::env::set_var("RUST_LOG", "trace");

        let mut settings = U2fSettings::default();
        U2fSettings::apply_env_overrides(&mut settings);

        assert_eq!(settings.app_id, "https://env.example.com");
        assert_eq!(
            settings.trusted_facets,
            vec![
                "https://env.example.com".to_string(),
                "https://m.env.example.com".to_string()
            ]
        );
        assert!(settings.skip_attestation_check);
        assert_eq!(settings.counter_policy, CounterPolicy::RequireIncrease);
        assert_eq!(settings.logging.level, "trace");

        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_invalid_env_values_are_ignored() {
        clean_env_vars();

        std::env::set_var("U2F_SKIP_ATTESTATION_CHECK", "maybe");
        std::env::set_var("U2F_COUNTER_POLICY", "lenient");

        let mut settings = U2fSettings::default();
        U2fSettings::apply_env_overrides(&mut settings);

        assert!(!settings.skip_attestation_check);
        assert_eq!(settings.counter_policy, CounterPolicy::RejectDecrease);

        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_secrets_dir_settings() {
        clean_env_vars();

        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            "app_id = \"https://secrets.example.com\"\nskip_attestation_check = true\n",
        )
        .unwrap();
        std::env::set_var("U2F_SECRETS_DIR", dir.path());

        let settings = U2fSettings::load().unwrap();
        assert_eq!(settings.app_id, "https://secrets.example.com");
        assert!(settings.skip_attestation_check);

        // Environment still wins over the file
        std::env::set_var("U2F_APP_ID", "https://env.example.com");
        let settings = U2fSettings::load().unwrap();
        assert_eq!(settings.app_id, "https://env.example.com");

        clean_env_vars();
    }

    #[test]
    fn test_registration_config_reads_roots() {
        let key = VirtualKey::new().unwrap();
        let pem = openssl::x509::X509::from_der(key.attestation_certificate())
            .unwrap()
            .to_pem()
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let root_path = dir.path().join("root.pem");
        fs::write(&root_path, pem).unwrap();

        let settings = U2fSettings {
            attestation_roots: vec![root_path],
            ..U2fSettings::default()
        };
        let config = settings.registration_config().unwrap();
        assert!(!config.skip_attestation_check);
        assert_eq!(config.trust.len(), 1);
        config.trust.verify(key.attestation_certificate()).unwrap();
    }

    #[test]
    fn test_registration_config_roots_can_be_extended() {
        let configured = VirtualKey::new().unwrap();
        let pem = openssl::x509::X509::from_der(configured.attestation_certificate())
            .unwrap()
            .to_pem()
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let root_path = dir.path().join("root.pem");
        fs::write(&root_path, pem).unwrap();

        let settings = U2fSettings {
            attestation_roots: vec![root_path],
            ..U2fSettings::default()
        };
        let mut config = settings.registration_config().unwrap();

        let extra = VirtualKey::new().unwrap();
        config.trust.add_root_der(extra.attestation_certificate()).unwrap();

        assert_eq!(config.trust.len(), 2);
        config.trust.verify(configured.attestation_certificate()).unwrap();
        config.trust.verify(extra.attestation_certificate()).unwrap();
    }

    #[test]
    fn test_registration_config_missing_root_file() {
        let settings = U2fSettings {
            attestation_roots: vec![PathBuf::from("/nonexistent/root.pem")],
            ..U2fSettings::default()
        };
        assert!(settings.registration_config().is_err());
    }

    #[test]
    fn test_authentication_config_and_challenge() {
        let settings = U2fSettings {
            counter_policy: CounterPolicy::RequireIncrease,
            ..U2fSettings::default()
        };
        assert_eq!(
            settings.authentication_config().counter_policy,
            CounterPolicy::RequireIncrease
        );

        let challenge = settings.new_challenge(vec![]).unwrap();
        assert_eq!(challenge.app_id, settings.app_id);
        assert_eq!(challenge.trusted_facets, settings.trusted_facets());
    }
}
