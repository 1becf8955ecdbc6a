//! Recognition configuration

use crate::template::{MatchStrategy, MatcherConfig, TemplateLoader};
use crate::{Error, Result};
use card_core::{Pack, TabularFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main recognition configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    pub matcher: MatcherConfig,
    /// Root holding one template directory per pack.
    pub data_root: PathBuf,
    pub packs: Vec<Pack>,
    /// Extra template roots, walked after the pack directories.
    pub template_dirs: Vec<PathBuf>,
    /// Directories searched recursively for display-info CSV files.
    pub display_dirs: Vec<PathBuf>,
    pub tabular: TabularFormat,
    /// When set, every extracted slot is written here as `<Slot>.png`.
    pub dump_dir: Option<PathBuf>,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            matcher: MatcherConfig::default(),
            data_root: "data".into(),
            packs: Pack::ALL.to_vec(),
            template_dirs: Vec::new(),
            display_dirs: vec!["config".into()],
            tabular: TabularFormat::default(),
            dump_dir: None,
        }
    }
}

impl RecognitionConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        let matcher = &self.matcher;
        if !(-1.0..=1.0).contains(&matcher.correlation_threshold) {
            return Err(Error::Config(format!(
                "correlation_threshold {} is outside [-1, 1]",
                matcher.correlation_threshold
            )));
        }
        if matcher.strategy == MatchStrategy::Keypoints && matcher.orb_features <= 0 {
            return Err(Error::Config("orb_features must be positive".to_string()));
        }
        Ok(())
    }

    /// Loader over the pack directories followed by the extra roots.
    pub fn template_loader(&self) -> TemplateLoader {
        self.template_dirs.iter().fold(
            TemplateLoader::new().add_pack_dirs(&self.data_root, &self.packs),
            |loader, dir| loader.add_template_dir(dir),
        )
    }
}
