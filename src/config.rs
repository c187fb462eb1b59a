use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::{BlindspotRules, ScoringWeights};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub blindspot: BlindspotConfig,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    #[serde(default = "default_catalog_path")]
    pub path: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self { path: default_catalog_path() }
    }
}

fn default_catalog_path() -> String { "data/opportunities.json".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    pub default_top_n: Option<usize>,
    #[serde(default = "default_max_top_n")]
    pub max_top_n: usize,
    pub min_confidence: Option<f64>,
    #[serde(default = "default_deadline_urgency_days")]
    pub deadline_urgency_days: i64,
    #[serde(default = "default_max_next_steps")]
    pub max_next_steps: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            default_top_n: None,
            max_top_n: default_max_top_n(),
            min_confidence: None,
            deadline_urgency_days: default_deadline_urgency_days(),
            max_next_steps: default_max_next_steps(),
        }
    }
}

/// Largest accepted deadline urgency window, about ten years
const MAX_URGENCY_DAYS: i64 = 3650;

fn default_max_top_n() -> usize { 100 }
fn default_deadline_urgency_days() -> i64 { 14 }
fn default_max_next_steps() -> usize { 3 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_academic_weight")]
    pub academic: f64,
    #[serde(default = "default_skill_weight")]
    pub skill: f64,
    #[serde(default = "default_interest_weight")]
    pub interest: f64,
    #[serde(default = "default_location_weight")]
    pub location: f64,
    #[serde(default = "default_demographic_weight")]
    pub demographic: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            academic: default_academic_weight(),
            skill: default_skill_weight(),
            interest: default_interest_weight(),
            location: default_location_weight(),
            demographic: default_demographic_weight(),
        }
    }
}

fn default_academic_weight() -> f64 { 0.30 }
fn default_skill_weight() -> f64 { 0.25 }
fn default_interest_weight() -> f64 { 0.15 }
fn default_location_weight() -> f64 { 0.15 }
fn default_demographic_weight() -> f64 { 0.15 }

impl TryFrom<&WeightsConfig> for ScoringWeights {
    type Error = ConfigError;

    fn try_from(config: &WeightsConfig) -> Result<Self, Self::Error> {
        let weights = [
            ("academic", config.academic),
            ("skill", config.skill),
            ("interest", config.interest),
            ("location", config.location),
            ("demographic", config.demographic),
        ];

        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::Message(format!(
                    "scoring.weights.{} must be a finite, non-negative number (got {})",
                    name, weight
                )));
            }
        }

        Ok(Self {
            academic: config.academic,
            skill: config.skill,
            interest: config.interest,
            location: config.location,
            demographic: config.demographic,
        })
    }
}

/// Blindspot point table; defaults mirror `BlindspotRules::default()`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BlindspotConfig {
    pub low_visibility: u32,
    pub medium_visibility: u32,
    pub high_visibility: u32,
    pub background: u32,
    pub prior_miss: u32,
    pub government_institution: u32,
    pub high_threshold: u32,
    pub medium_threshold: u32,
    pub low_threshold: u32,
}

impl Default for BlindspotConfig {
    fn default() -> Self {
        let rules = BlindspotRules::default();
        Self {
            low_visibility: rules.low_visibility,
            medium_visibility: rules.medium_visibility,
            high_visibility: rules.high_visibility,
            background: rules.background,
            prior_miss: rules.prior_miss,
            government_institution: rules.government_institution,
            high_threshold: rules.high_threshold,
            medium_threshold: rules.medium_threshold,
            low_threshold: rules.low_threshold,
        }
    }
}

impl From<&BlindspotConfig> for BlindspotRules {
    fn from(config: &BlindspotConfig) -> Self {
        Self {
            low_visibility: config.low_visibility,
            medium_visibility: config.medium_visibility,
            high_visibility: config.high_visibility,
            background: config.background,
            prior_miss: config.prior_miss,
            government_institution: config.government_institution,
            high_threshold: config.high_threshold,
            medium_threshold: config.medium_threshold,
            low_threshold: config.low_threshold,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with SAARTHI_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings: Self = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., SAARTHI__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("SAARTHI")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings: Self = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("SAARTHI")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let urgency = self.matching.deadline_urgency_days;
        if !(0..=MAX_URGENCY_DAYS).contains(&urgency) {
            return Err(ConfigError::Message(format!(
                "matching.deadline_urgency_days must be between 0 and {} (got {})",
                MAX_URGENCY_DAYS, urgency
            )));
        }

        self.scoring_weights().map(|_| ())
    }

    pub fn scoring_weights(&self) -> Result<ScoringWeights, ConfigError> {
        ScoringWeights::try_from(&self.scoring.weights)
    }

    pub fn blindspot_rules(&self) -> BlindspotRules {
        BlindspotRules::from(&self.blindspot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_default_weights() {
        let weights = WeightsConfig::default();
        assert_eq!(weights.academic, 0.30);
        assert_eq!(weights.skill, 0.25);
        assert_eq!(weights.interest, 0.15);
        assert_eq!(weights.location, 0.15);
        assert_eq!(weights.demographic, 0.15);
        assert_eq!(ScoringWeights::try_from(&weights).unwrap(), ScoringWeights::default());
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let negative = WeightsConfig { skill: -0.25, ..WeightsConfig::default() };
        assert!(ScoringWeights::try_from(&negative).is_err());

        let not_finite = WeightsConfig { location: f64::NAN, ..WeightsConfig::default() };
        assert!(ScoringWeights::try_from(&not_finite).is_err());

        let zero = WeightsConfig {
            academic: 0.0,
            skill: 0.0,
            interest: 0.0,
            location: 0.0,
            demographic: 0.0,
        };
        assert!(ScoringWeights::try_from(&zero).is_ok());
    }

    #[test]
    fn test_urgency_window_bounds() {
        let mut settings = Settings::default();
        assert!(settings.validate().is_ok());

        settings.matching.deadline_urgency_days = -1;
        assert!(settings.validate().is_err());

        settings.matching.deadline_urgency_days = i64::MAX / 1000;
        assert!(settings.validate().is_err());

        settings.matching.deadline_urgency_days = MAX_URGENCY_DAYS;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_default_blindspot_rules() {
        let settings = Settings::default();
        assert_eq!(settings.blindspot_rules(), BlindspotRules::default());
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let raw = r#"
            [scoring.weights]
            academic = 0.5

            [blindspot]
            high_threshold = 6

            [matching]
            min_confidence = 40.0
        "#;

        let settings: Settings = Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.scoring.weights.academic, 0.5);
        assert_eq!(settings.scoring.weights.skill, 0.25);
        assert_eq!(settings.blindspot.high_threshold, 6);
        assert_eq!(settings.blindspot.low_visibility, 3);
        assert_eq!(settings.matching.min_confidence, Some(40.0));
        assert_eq!(settings.matching.max_top_n, 100);
        assert_eq!(settings.server.port, 8080);
    }
}
