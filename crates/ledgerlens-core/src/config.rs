//! Settings for analysis, retrieval, and advice
//!
//! ## Configuration Resolution
//!
//! Settings are loaded with a two-layer resolution:
//! 1. An explicit path (`--config`), else the override in the data dir
//!    (~/.local/share/ledgerlens/config/ledgerlens.toml)
//! 2. Embedded defaults (compiled into binary)
//!
//! Keys missing from an override keep their default values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analytics::{AnalysisConfig, BaselineMode, OverspendConfig, RecurrenceConfig};
use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/ledgerlens.toml");

/// Which embedder backs the retrieval index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedderKind {
    /// Local feature-hashing embedder, no network
    #[default]
    Hashing,
    /// Embeddings from the configured AI backend
    Ai,
}

impl std::str::FromStr for EmbedderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hashing" => Ok(Self::Hashing),
            "ai" => Ok(Self::Ai),
            _ => Err(format!("Unknown embedder: {} (expected hashing or ai)", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Passages returned per query
    pub top_k: usize,
    pub embedder: EmbedderKind,
    /// Vector size for the hashing embedder
    pub dimensions: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            embedder: EmbedderKind::Hashing,
            dimensions: 256,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Sampling temperature for the advice call
    pub temperature: f64,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self { temperature: 0.2 }
    }
}

/// All user-tunable settings
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Settings {
    pub recurrence: RecurrenceConfig,
    pub overspending: OverspendConfig,
    pub retrieval: RetrievalConfig,
    pub advisor: AdvisorConfig,
}

impl Settings {
    /// Load settings, checking `path` first, then the data-dir override,
    /// then the embedded defaults
    ///
    /// An explicit path that does not exist is an error; a missing data-dir
    /// override is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                read_config(path)?
            }
            None => match default_config_path().filter(|p| p.exists()) {
                Some(default_path) => read_config(&default_path)?,
                None => {
                    debug!("Using embedded default settings");
                    DEFAULT_CONFIG.to_string()
                }
            },
        };

        parse_settings(&content)
    }

    /// Parameters for the analytics engine
    pub fn analysis(&self) -> AnalysisConfig {
        AnalysisConfig {
            recurrence: self.recurrence,
            overspending: self.overspending,
        }
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(self.overspending.threshold_factor > 0.0) {
            return Err(Error::Config(format!(
                "overspending.threshold_factor must be positive, got {}",
                self.overspending.threshold_factor
            )));
        }
        if self.recurrence.min_occurrences < 2 {
            return Err(Error::Config(format!(
                "recurrence.min_occurrences must be at least 2, got {}",
                self.recurrence.min_occurrences
            )));
        }
        if self.recurrence.monthly_min_days > self.recurrence.monthly_max_days {
            return Err(Error::Config(format!(
                "recurrence.monthly_min_days ({}) exceeds monthly_max_days ({})",
                self.recurrence.monthly_min_days, self.recurrence.monthly_max_days
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be positive".to_string()));
        }
        if self.retrieval.dimensions == 0 {
            return Err(Error::Config(
                "retrieval.dimensions must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Render as TOML (the `config` command's output)
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize settings: {}", e)))
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("ledgerlens").join("config").join("ledgerlens.toml"))
}

fn read_config(path: &Path) -> Result<String> {
    debug!(path = %path.display(), "Reading settings");
    fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config {}: {}", path.display(), e))
    })
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawSettings {
    recurrence: Option<RawRecurrence>,
    overspending: Option<RawOverspending>,
    retrieval: Option<RawRetrieval>,
    advisor: Option<RawAdvisor>,
}

#[derive(Debug, Deserialize)]
struct RawRecurrence {
    min_occurrences: Option<usize>,
    monthly_min_days: Option<f64>,
    monthly_max_days: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawOverspending {
    threshold_factor: Option<f64>,
    baseline: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRetrieval {
    top_k: Option<usize>,
    embedder: Option<String>,
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawAdvisor {
    temperature: Option<f64>,
}

/// Parse settings from TOML content, applying values over the defaults
pub fn parse_settings(content: &str) -> Result<Settings> {
    let raw: RawSettings = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut settings = Settings::default();

    if let Some(recurrence) = raw.recurrence {
        if let Some(min) = recurrence.min_occurrences {
            settings.recurrence.min_occurrences = min;
        }
        if let Some(days) = recurrence.monthly_min_days {
            settings.recurrence.monthly_min_days = days;
        }
        if let Some(days) = recurrence.monthly_max_days {
            settings.recurrence.monthly_max_days = days;
        }
    }

    if let Some(overspending) = raw.overspending {
        if let Some(factor) = overspending.threshold_factor {
            settings.overspending.threshold_factor = factor;
        }
        if let Some(baseline) = overspending.baseline {
            settings.overspending.baseline = baseline
                .parse::<BaselineMode>()
                .map_err(Error::Config)?;
        }
    }

    if let Some(retrieval) = raw.retrieval {
        if let Some(k) = retrieval.top_k {
            settings.retrieval.top_k = k;
        }
        if let Some(embedder) = retrieval.embedder {
            settings.retrieval.embedder = embedder.parse::<EmbedderKind>().map_err(Error::Config)?;
        }
        if let Some(dimensions) = retrieval.dimensions {
            settings.retrieval.dimensions = dimensions;
        }
    }

    if let Some(advisor) = raw.advisor {
        if let Some(temperature) = advisor.temperature {
            settings.advisor.temperature = temperature;
        }
    }

    settings.validate()?;
    Ok(settings)
}
