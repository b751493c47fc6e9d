use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// METAR source settings
    #[serde(default)]
    pub metar: MetarSourceConfig,

    /// Airport metadata source settings
    #[serde(default)]
    pub airports: AirportSourceConfig,

    /// Polling settings
    #[serde(default)]
    pub polling: PollingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetarSourceConfig {
    /// URL of the plain-text METAR endpoint (queried with `?id=<ICAO>`)
    pub base_url: String,

    /// In-band error marker some deployments embed in the response body.
    /// `None` means the deployment signals errors by HTTP status only.
    pub error_marker: Option<String>,
}

impl Default for MetarSourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://metar.vatsim.net/metar.php".to_string(),
            error_marker: Some("Error".to_string()),
        }
    }
}

/// Expected JSON shape of the airport endpoint, pinned per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AirportShape {
    #[default]
    Object,
    Array,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirportSourceConfig {
    /// URL of the airport metadata endpoint (queried with `?icao=<ICAO>`)
    pub base_url: String,

    /// API key appended as `&key=<credential>` (optional, can be set via environment)
    pub api_key: Option<String>,

    /// Response body shape for this deployment
    #[serde(default)]
    pub shape: AirportShape,
}

impl Default for AirportSourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://apps.estassinos.com/api/fs-core-data-api/airports.php"
                .to_string(),
            api_key: std::env::var("AWOS_AIRPORT_API_KEY").ok(),
            shape: AirportShape::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// METAR refresh interval in minutes (0 disables polling)
    pub refresh_minutes: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { refresh_minutes: 15 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            metar: MetarSourceConfig::default(),
            airports: AirportSourceConfig::default(),
            polling: PollingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        if !validation.warnings.is_empty() {
            for warning in &validation.warnings {
                tracing::warn!("Config warning: {}", warning);
            }
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.metar.base_url, "metar.base_url", &mut result);
        self.validate_url(&self.airports.base_url, "airports.base_url", &mut result);

        if let Some(marker) = &self.metar.error_marker {
            if marker.is_empty() {
                result.add_error(
                    "metar.error_marker",
                    "Error marker cannot be empty; omit it to disable the check",
                );
            }
        }

        if let Some(key) = &self.airports.api_key {
            if key.is_empty() {
                result.add_warning(
                    "airports.api_key",
                    "API key is empty - requests will be sent without a credential",
                );
            }
        }

        if self.polling.refresh_minutes == 0 {
            result.add_warning(
                "polling.refresh_minutes",
                "METAR polling disabled (0 minutes)",
            );
        } else if self.polling.refresh_minutes > 1440 {
            result.add_warning(
                "polling.refresh_minutes",
                "METAR refresh interval is more than 24 hours",
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if let Some(port) = url.port() {
                    if port == 0 {
                        result.add_error(field_name, "Port cannot be 0");
                    }
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("awos");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        assert!(
            result.is_valid(),
            "Default config should be valid: {:?}",
            result.errors
        );
    }

    #[test]
    fn test_invalid_metar_url() {
        let mut config = Config::default();
        config.metar.base_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "metar.base_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.airports.base_url = "ftp://example.com/airports.php".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result
            .errors
            .iter()
            .any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_empty_error_marker_is_error() {
        let mut config = Config::default();
        config.metar.error_marker = Some(String::new());
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "metar.error_marker"));
    }

    #[test]
    fn test_no_error_marker_is_valid() {
        let mut config = Config::default();
        config.metar.error_marker = None;
        let result = config.validate();
        assert!(result.is_valid());
    }

    #[test]
    fn test_zero_refresh_is_warning() {
        let mut config = Config::default();
        config.polling.refresh_minutes = 0;
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.field == "polling.refresh_minutes"));
    }

    #[test]
    fn test_airport_shape_roundtrip() {
        let mut config = Config::default();
        config.airports.shape = AirportShape::Array;
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.airports.shape, AirportShape::Array);
    }

    #[test]
    fn test_shape_defaults_to_object() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed.airports.shape, AirportShape::Object);
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }
}
