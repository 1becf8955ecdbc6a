//! Template loading from image directories

use super::{CardTemplate, FeatureMatcher};
use crate::catalog::{LoadReport, TemplateCatalog};
use crate::utils::image::ImageUtils;
use crate::{Error, Result};
use card_core::{CardIdentity, Pack};
use log::{info, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Loads card templates from one or more directory trees.
///
/// Roots are walked in the order they were added, each recursively and
/// sorted by file name, so the first file seen for an identity is stable
/// across runs and is the one kept.
pub struct TemplateLoader {
    template_dirs: Vec<(PathBuf, Option<Pack>)>,
    supported_extensions: Vec<String>,
}

impl TemplateLoader {
    /// Create new template loader
    pub fn new() -> Self {
        Self {
            template_dirs: Vec::new(),
            supported_extensions: vec![
                "webp".to_string(),
                "png".to_string(),
                "jpg".to_string(),
                "jpeg".to_string(),
                "bmp".to_string(),
            ],
        }
    }

    /// Add template directory
    pub fn add_template_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.template_dirs.push((dir.as_ref().to_path_buf(), None));
        self
    }

    /// Add the directory of each pack under `data_root`.
    pub fn add_pack_dirs<P: AsRef<Path>>(mut self, data_root: P, packs: &[Pack]) -> Self {
        for pack in packs {
            self.template_dirs
                .push((pack.dir(data_root.as_ref()), Some(*pack)));
        }
        self
    }

    /// Decode and describe a single template file.
    pub fn load_template(
        &self,
        path: &Path,
        pack: Option<Pack>,
        matcher: &FeatureMatcher,
    ) -> Result<CardTemplate> {
        let identity = CardIdentity::from_path(path).ok_or_else(|| Error::Decode {
            path: path.to_path_buf(),
            reason: "file has no name to derive an identity from".to_string(),
        })?;
        let image = ImageUtils::load_grayscale(path)?;
        let descriptor = matcher.describe(&image)?;

        Ok(CardTemplate::new(identity, image, descriptor)
            .with_pack(pack)
            .with_source(path.to_path_buf()))
    }

    /// Load every template under the configured directories.
    ///
    /// A file that fails to decode is reported and skipped; the rest of the
    /// load continues.
    pub fn load(&self, matcher: &FeatureMatcher) -> Result<(TemplateCatalog, LoadReport)> {
        let mut catalog = TemplateCatalog::new(matcher.strategy());
        let mut report = LoadReport::default();

        for (dir, pack) in &self.template_dirs {
            if !dir.exists() {
                warn!("template directory {:?} does not exist, skipping", dir);
                continue;
            }

            for entry in WalkDir::new(dir).sort_by_file_name() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.clone());
                        warn!("cannot read {:?}: {}", path, e);
                        report.skipped.push((path, Error::Io(e.into())));
                        continue;
                    }
                };

                let path = entry.path();
                if !entry.file_type().is_file() || !self.is_supported(path) {
                    continue;
                }

                match self.load_template(path, *pack, matcher) {
                    Ok(template) => {
                        if catalog.insert(template)? {
                            report.loaded += 1;
                        } else {
                            report.duplicates.push(path.to_path_buf());
                        }
                    }
                    Err(e) => {
                        warn!("skipping template {:?}: {}", path, e);
                        report.skipped.push((path.to_path_buf(), e));
                    }
                }
            }
        }

        info!(
            "loaded {} templates ({} skipped, {} duplicates)",
            report.loaded,
            report.skipped.len(),
            report.duplicates.len()
        );
        Ok((catalog, report))
    }

    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .map(|ext| self.supported_extensions.contains(&ext))
            .unwrap_or(false)
    }
}

impl Default for TemplateLoader {
    fn default() -> Self {
        Self::new()
    }
}
