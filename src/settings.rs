use std::path::Path;

use config::Config;
use serde::Deserialize;
use tracing::debug;

use crate::error::SettingsError;

pub const DEFAULT_MIN_WORDS: usize = 3;
pub const DEFAULT_POSITION_THRESHOLD: f64 = 20.0;

/// Run configuration. Every field is optional in the sources and falls back
/// to the defaults below.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_min_words")]
    pub min_word_count: usize,
    #[serde(default = "default_position_threshold")]
    pub position_threshold: f64,
    #[serde(default = "default_true")]
    pub use_clustering: bool,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

fn default_min_words() -> usize {
    DEFAULT_MIN_WORDS
}

fn default_position_threshold() -> f64 {
    DEFAULT_POSITION_THRESHOLD
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            min_word_count: DEFAULT_MIN_WORDS,
            position_threshold: DEFAULT_POSITION_THRESHOLD,
            use_clustering: true,
            openai_api_key: None,
            gemini_api_key: None,
            access_token: None,
        }
    }
}

/// Command-line values that take precedence over file and environment.
#[derive(Debug, Default)]
pub struct Overrides {
    pub min_word_count: Option<usize>,
    pub position_threshold: Option<f64>,
    pub disable_clustering: bool,
}

/// Credentials for the two heading providers. Blank keys are treated as absent.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub openai: Option<String>,
    pub gemini: Option<String>,
}

impl ApiKeys {
    pub fn any(&self) -> bool {
        self.openai.is_some() || self.gemini.is_some()
    }
}

impl Settings {
    /// Layer: defaults < config file (if present) < GSC_* env vars < CLI.
    pub fn load(path: &Path, overrides: &Overrides) -> Result<Settings, SettingsError> {
        Self::load_from(path, None, overrides)
    }

    /// `env` replaces the process environment when given.
    fn load_from(
        path: &Path,
        env: Option<config::Map<String, String>>,
        overrides: &Overrides,
    ) -> Result<Settings, SettingsError> {
        let mut builder = Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("GSC")
                    .try_parsing(true)
                    .source(env),
            )
            .set_override_option(
                "min_word_count",
                overrides.min_word_count.map(|n| n as i64),
            )?
            .set_override_option("position_threshold", overrides.position_threshold)?;
        if overrides.disable_clustering {
            builder = builder.set_override("use_clustering", false)?;
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        debug!(
            config = %path.display(),
            min_word_count = settings.min_word_count,
            position_threshold = settings.position_threshold,
            use_clustering = settings.use_clustering,
            "settings loaded"
        );
        settings.validated()
    }

    /// Checked once at startup; pipeline stages assume these hold.
    pub fn validated(mut self) -> Result<Settings, SettingsError> {
        if self.min_word_count == 0 {
            return Err(SettingsError::ZeroMinWords);
        }
        if !self.position_threshold.is_finite() || self.position_threshold <= 0.0 {
            return Err(SettingsError::BadPositionThreshold(self.position_threshold));
        }
        self.openai_api_key = non_blank(self.openai_api_key);
        self.gemini_api_key = non_blank(self.gemini_api_key);
        self.access_token = non_blank(self.access_token);
        Ok(self)
    }

    pub fn api_keys(&self) -> ApiKeys {
        ApiKeys {
            openai: self.openai_api_key.clone(),
            gemini: self.gemini_api_key.clone(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
