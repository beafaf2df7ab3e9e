use std::path::PathBuf;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use tracing::debug;

use crate::normalize::NormalizerConfig;

/// Run settings from `obob.toml` and `OBOB_*` environment variables.
/// Command-line flags are applied on top in `main`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub catalog: PathBuf,
    pub strict: bool,
    pub conjunction_heuristic: bool,
    /// Replaces the built-in two-part marker list when set.
    pub two_part_markers: Option<Vec<String>>,
    pub verify_sources: Vec<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            catalog: PathBuf::from("public/obob/books.json"),
            strict: false,
            conjunction_heuristic: true,
            two_part_markers: None,
            verify_sources: vec![
                PathBuf::from("public/obob/lake_oswego/questions.json"),
                PathBuf::from("public/obob/cedar_mill/questions.json"),
                PathBuf::from("public/obob/glencoe/glencoe_questions.json"),
            ],
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name("obob").required(false))
            .add_source(
                Environment::with_prefix("OBOB")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("verify_sources"),
            );
        Self::from_builder(builder)
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        debug!(settings = ?settings, "settings loaded");
        Ok(settings)
    }

    pub fn normalizer_config(&self) -> NormalizerConfig {
        let mut config = NormalizerConfig {
            strict: self.strict,
            conjunction_heuristic: self.conjunction_heuristic,
            ..NormalizerConfig::default()
        };
        if let Some(markers) = &self.two_part_markers {
            config.two_part_markers = markers.clone();
        }
        config
    }
}
