//! The set of known cards every slot is matched against

use crate::template::{CardTemplate, FeatureMatcher, MatchStrategy};
use crate::{Error, Result};
use card_core::{CardIdentity, DisplayInfoIndex};
use log::{debug, warn};
use opencv::core::Mat;
use std::collections::HashMap;
use std::path::PathBuf;

/// Ordered templates with identity lookup. Identities are unique: the first
/// template inserted under an identity is kept.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: Vec<CardTemplate>,
    index: HashMap<CardIdentity, usize>,
    strategy: MatchStrategy,
}

/// What happened while loading templates from disk.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: usize,
    /// Files that could not be decoded or described, with the reason.
    pub skipped: Vec<(PathBuf, Error)>,
    /// Files ignored because an earlier file had the same identity.
    pub duplicates: Vec<PathBuf>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.duplicates.is_empty()
    }
}

impl TemplateCatalog {
    pub fn new(strategy: MatchStrategy) -> Self {
        Self {
            templates: Vec::new(),
            index: HashMap::new(),
            strategy,
        }
    }

    /// Build a catalog from in-memory grayscale images.
    pub fn from_images<I>(matcher: &FeatureMatcher, images: I) -> Result<Self>
    where
        I: IntoIterator<Item = (CardIdentity, Mat)>,
    {
        let mut catalog = Self::new(matcher.strategy());
        for (identity, image) in images {
            let descriptor = matcher.describe(&image)?;
            catalog.insert(CardTemplate::new(identity, image, descriptor))?;
        }
        Ok(catalog)
    }

    /// Add a template. Returns `false` when the identity is already present,
    /// in which case the catalog is left unchanged.
    pub fn insert(&mut self, template: CardTemplate) -> Result<bool> {
        let strategy = template.descriptor().strategy();
        if strategy != self.strategy {
            return Err(Error::StrategyMismatch {
                catalog: self.strategy,
                matcher: strategy,
            });
        }

        if let Some(&idx) = self.index.get(template.identity()) {
            warn!(
                "duplicate template identity '{}' from {:?}, keeping {:?}",
                template.identity(),
                template.source(),
                self.templates[idx].source()
            );
            return Ok(false);
        }

        self.index.insert(template.identity().clone(), self.templates.len());
        self.templates.push(template);
        Ok(true)
    }

    /// Set the display text of every template named in `info`; identities
    /// without a template are ignored. Returns the number of templates updated.
    pub fn apply_display_info(&mut self, info: &DisplayInfoIndex) -> usize {
        let mut updated = 0;
        for (identity, text) in info.iter() {
            match self.index.get(identity) {
                Some(&idx) => {
                    self.templates[idx].set_display_info(text);
                    updated += 1;
                }
                None => debug!("display info for unknown card '{}' ignored", identity),
            }
        }
        updated
    }

    pub fn get(&self, identity: &CardIdentity) -> Option<&CardTemplate> {
        self.index.get(identity).map(|&idx| &self.templates[idx])
    }

    pub fn template(&self, idx: usize) -> Option<&CardTemplate> {
        self.templates.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CardTemplate> {
        self.templates.iter()
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
