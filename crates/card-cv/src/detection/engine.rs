//! Five-slot recognition over a fixed-layout composite

use super::config::RecognitionConfig;
use crate::catalog::{LoadReport, TemplateCatalog};
use crate::region::RegionExtractor;
use crate::template::{CardTemplate, FeatureMatcher};
use crate::utils::ImageUtils;
use crate::{Error, Result};
use card_core::{CardIdentity, DisplayInfoIndex, SlotLayout};
use image::DynamicImage;
use log::{debug, info, warn};
use opencv::core::Mat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What a single slot resolved to.
#[derive(Debug, Clone)]
pub enum SlotOutcome<'a> {
    Matched {
        template: &'a CardTemplate,
        score: f64,
    },
    /// Nothing in the catalog passed the acceptance rule.
    NoMatch { best_score: Option<f64> },
    /// Extraction or matching failed for this slot only.
    Failed { reason: String },
}

/// Recognition result for one slot.
#[derive(Debug, Clone)]
pub struct MatchResult<'a> {
    pub slot: SlotLayout,
    pub outcome: SlotOutcome<'a>,
}

impl<'a> MatchResult<'a> {
    /// The recognized template; `None` is the "no match" sentinel.
    pub fn template(&self) -> Option<&'a CardTemplate> {
        match self.outcome {
            SlotOutcome::Matched { template, .. } => Some(template),
            _ => None,
        }
    }

    pub fn score(&self) -> Option<f64> {
        match self.outcome {
            SlotOutcome::Matched { score, .. } => Some(score),
            SlotOutcome::NoMatch { best_score } => best_score,
            SlotOutcome::Failed { .. } => None,
        }
    }

    pub fn is_match(&self) -> bool {
        self.template().is_some()
    }

    /// Text for presentation; never empty, so a missing card is visible.
    pub fn label(&self) -> String {
        match &self.outcome {
            SlotOutcome::Matched { template, .. } if template.display_info().is_empty() => {
                template.identity().to_string()
            }
            SlotOutcome::Matched { template, .. } => {
                format!("{} ({})", template.identity(), template.display_info())
            }
            SlotOutcome::NoMatch { .. } => "no match".to_string(),
            SlotOutcome::Failed { reason } => format!("no match: {}", reason),
        }
    }

    pub fn summary(&self) -> MatchSummary {
        MatchSummary {
            slot: self.slot,
            identity: self.template().map(|t| t.identity().clone()),
            display_info: self.template().map(|t| t.display_info().to_string()),
            score: self.score(),
            failure: match &self.outcome {
                SlotOutcome::Failed { reason } => Some(reason.clone()),
                _ => None,
            },
        }
    }
}

/// Owned, serializable snapshot of a `MatchResult`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub slot: SlotLayout,
    pub identity: Option<CardIdentity>,
    pub display_info: Option<String>,
    pub score: Option<f64>,
    pub failure: Option<String>,
}

/// Recognizes the cards of a composite against a read-only catalog.
pub struct RecognitionEngine {
    catalog: TemplateCatalog,
    matcher: FeatureMatcher,
    extractor: RegionExtractor,
    dump_dir: Option<PathBuf>,
}

impl RecognitionEngine {
    /// Create an engine over a non-empty catalog described with the
    /// matcher's strategy.
    pub fn new(catalog: TemplateCatalog, matcher: FeatureMatcher) -> Result<Self> {
        if catalog.is_empty() {
            return Err(Error::EmptyCatalog);
        }
        if catalog.strategy() != matcher.strategy() {
            return Err(Error::StrategyMismatch {
                catalog: catalog.strategy(),
                matcher: matcher.strategy(),
            });
        }

        Ok(Self {
            catalog,
            matcher,
            extractor: RegionExtractor::new(),
            dump_dir: None,
        })
    }

    /// Load templates and display info as configured, merge them and build
    /// the engine. Display-info errors abort before the catalog is touched.
    pub fn from_config(config: &RecognitionConfig) -> Result<(Self, LoadReport)> {
        config.validate()?;
        let matcher = FeatureMatcher::new(config.matcher.clone());

        let (mut catalog, report) = config.template_loader().load(&matcher)?;
        let info = DisplayInfoIndex::load_dirs(&config.display_dirs, &config.tabular)?;
        let updated = catalog.apply_display_info(&info);
        info!(
            "display info set on {} of {} templates ({} rows)",
            updated,
            catalog.len(),
            info.len()
        );

        let mut engine = Self::new(catalog, matcher)?;
        engine.dump_dir = config.dump_dir.clone();
        Ok((engine, report))
    }

    pub fn with_dump_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.dump_dir = dir;
        self
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    /// Recognize every slot of a grayscale composite, in `SlotLayout::ALL`
    /// order. A failing slot is reported as such; the others still run.
    pub fn recognize(&self, composite: &Mat) -> Result<Vec<MatchResult<'_>>> {
        if self.catalog.is_empty() {
            return Err(Error::EmptyCatalog);
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            Ok(SlotLayout::ALL
                .par_iter()
                .map(|&slot| self.recognize_slot(composite, slot))
                .collect())
        }

        #[cfg(not(feature = "parallel"))]
        {
            Ok(SlotLayout::ALL
                .iter()
                .map(|&slot| self.recognize_slot(composite, slot))
                .collect())
        }
    }

    /// Convert a decoded image to grayscale and recognize it.
    pub fn recognize_image(&self, composite: &DynamicImage) -> Result<Vec<MatchResult<'_>>> {
        let gray = ImageUtils::dynamic_to_gray_mat(composite)?;
        self.recognize(&gray)
    }

    /// Recognize one slot, folding any error into `SlotOutcome::Failed`.
    pub fn recognize_slot(&self, composite: &Mat, slot: SlotLayout) -> MatchResult<'_> {
        let outcome = self.try_recognize_slot(composite, slot).unwrap_or_else(|e| {
            warn!("slot {} failed: {}", slot, e);
            SlotOutcome::Failed {
                reason: e.to_string(),
            }
        });

        MatchResult { slot, outcome }
    }

    fn try_recognize_slot(&self, composite: &Mat, slot: SlotLayout) -> Result<SlotOutcome<'_>> {
        let region = self.extractor.extract(composite, slot)?;
        if let Some(dir) = &self.dump_dir {
            self.dump(&region, dir, slot);
        }

        let found = self.matcher.identify(&region, &self.catalog)?;
        let outcome = match found.best().and_then(|idx| self.catalog.template(idx)) {
            Some(template) => SlotOutcome::Matched {
                template,
                score: found.score,
            },
            None => SlotOutcome::NoMatch {
                best_score: found.candidate.map(|_| found.score),
            },
        };

        debug!("slot {}: {:?}", slot, found.best().map(|_| found.score));
        Ok(outcome)
    }

    fn dump(&self, region: &Mat, dir: &Path, slot: SlotLayout) {
        let path = dir.join(format!("{}.png", slot));
        if let Err(e) = ImageUtils::save_image(region, &path) {
            warn!("could not write {:?}: {}", path, e);
        }
    }
}

/// Write recognition results as a pretty JSON array.
pub fn export_json(results: &[MatchResult<'_>], output_path: &Path) -> Result<()> {
    let summaries: Vec<MatchSummary> = results.iter().map(MatchResult::summary).collect();
    let json = serde_json::to_string_pretty(&summaries)?;
    std::fs::write(output_path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::MatcherConfig;
    use crate::testing;
    use opencv::core::{Scalar, CV_8UC1};
    use opencv::prelude::*;

    #[test]
    fn test_empty_catalog_is_rejected() {
        let matcher = FeatureMatcher::default();
        let catalog = TemplateCatalog::new(matcher.strategy());
        assert!(matches!(
            RecognitionEngine::new(catalog, matcher),
            Err(Error::EmptyCatalog)
        ));
    }

    #[test]
    fn test_recognize_tiled_composite() -> Result<()> {
        let matcher = FeatureMatcher::default();
        let (catalog, cards) = testing::catalog(&matcher, 7)?;
        let engine = RecognitionEngine::new(catalog, matcher)?;

        let order = [4, 0, 6, 2, 5];
        let composite = testing::to_mat(&testing::composite(order.map(|i| &cards[i])));
        let results = engine.recognize(&composite)?;

        assert_eq!(results.len(), 5);
        for ((result, slot), idx) in results.iter().zip(SlotLayout::ALL).zip(order) {
            assert_eq!(result.slot, slot);
            let template = result.template().expect("slot should match");
            assert_eq!(template.identity().as_str(), format!("card-{idx}"));
            assert!(result.score().unwrap() > 0.9);
        }
        Ok(())
    }

    #[test]
    fn test_small_composite_fails_per_slot() -> Result<()> {
        let matcher = FeatureMatcher::default();
        let (catalog, cards) = testing::catalog(&matcher, 2)?;
        let engine = RecognitionEngine::new(catalog, matcher)?;

        // only the top-left slot fits
        let mut canvas = image::GrayImage::from_pixel(400, 520, image::Luma([0]));
        image::imageops::replace(&mut canvas, &cards[1], 0, 0);
        let results = engine.recognize(&testing::to_mat(&canvas))?;

        assert_eq!(results.len(), 5);
        assert_eq!(results[0].template().unwrap().identity().as_str(), "card-1");
        for result in &results[1..] {
            assert!(matches!(result.outcome, SlotOutcome::Failed { .. }));
            assert!(!result.is_match());
            assert!(result.label().starts_with("no match"));
        }
        Ok(())
    }

    #[test]
    fn test_blank_composite_has_no_matches() -> Result<()> {
        let matcher = FeatureMatcher::new(MatcherConfig::keypoints());
        let (catalog, _) = testing::catalog(&matcher, 3)?;
        let engine = RecognitionEngine::new(catalog, matcher)?;

        let (width, height) = SlotLayout::bounding_size();
        let blank = Mat::new_rows_cols_with_default(height, width, CV_8UC1, Scalar::all(200.0))?;
        let results = engine.recognize(&blank)?;

        for result in &results {
            assert!(matches!(result.outcome, SlotOutcome::NoMatch { best_score: Some(s) } if s == 0.0));
            assert_eq!(result.label(), "no match");
        }
        Ok(())
    }

    #[test]
    fn test_summary_and_export() -> Result<()> {
        let matcher = FeatureMatcher::default();
        let (mut catalog, cards) = testing::catalog(&matcher, 5)?;
        let mut info = DisplayInfoIndex::new();
        info.insert("card-3".into(), "2 copies");
        catalog.apply_display_info(&info);
        let engine = RecognitionEngine::new(catalog, matcher)?;

        let composite = testing::to_mat(&testing::composite([
            &cards[3], &cards[1], &cards[2], &cards[0], &cards[4],
        ]));
        let results = engine.recognize(&composite)?;
        assert_eq!(results[0].label(), "card-3 (2 copies)");
        assert_eq!(results[1].label(), "card-1");

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("results.json");
        export_json(&results, &path)?;
        let parsed: Vec<MatchSummary> = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        assert_eq!(parsed.len(), 5);
        assert_eq!(parsed[0].display_info.as_deref(), Some("2 copies"));
        assert_eq!(parsed[0].identity, Some("card-3".into()));
        Ok(())
    }

    #[test]
    fn test_dump_dir_writes_each_crop() -> Result<()> {
        let matcher = FeatureMatcher::default();
        let (catalog, cards) = testing::catalog(&matcher, 5)?;
        let dir = tempfile::tempdir()?;
        let engine =
            RecognitionEngine::new(catalog, matcher)?.with_dump_dir(Some(dir.path().to_path_buf()));

        let composite = testing::to_mat(&testing::composite([
            &cards[0], &cards[1], &cards[2], &cards[3], &cards[4],
        ]));
        engine.recognize(&composite)?;

        for (slot, card) in SlotLayout::ALL.iter().zip(&cards) {
            let crop = image::open(dir.path().join(format!("{}.png", slot)))
                .expect("crop should be written")
                .to_luma8();
            assert_eq!(crop.dimensions(), (367, 512));
            assert_eq!(&crop, card);
        }
        Ok(())
    }
}
