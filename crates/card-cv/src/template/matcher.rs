//! Scoring a card region against every catalog template

use super::{Descriptor, MatchStrategy, MatcherConfig};
use crate::catalog::TemplateCatalog;
use crate::{Error, Result};
use log::debug;
use opencv::{
    core::{self, DMatch, KeyPoint, Mat, Ptr, Vector, NORM_HAMMING},
    features2d::{BFMatcher, ORB},
    imgproc,
    prelude::*,
};

/// Outcome of scoring one region against a catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Identification {
    /// Highest-scoring template in catalog order, before the acceptance rule.
    pub candidate: Option<usize>,
    /// Score of `candidate`, zero when nothing was comparable.
    pub score: f64,
    pub accepted: bool,
    /// Per-template scores in catalog order; `None` when incomparable.
    pub scores: Vec<Option<f64>>,
}

impl Identification {
    /// Index of the accepted template, if any.
    pub fn best(&self) -> Option<usize> {
        self.candidate.filter(|_| self.accepted)
    }
}

/// Describes images and scores them with a single strategy.
#[derive(Debug, Clone)]
pub struct FeatureMatcher {
    config: MatcherConfig,
}

impl FeatureMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.config.strategy
    }

    /// Compute the descriptor of a grayscale image.
    pub fn describe(&self, image: &Mat) -> Result<Descriptor> {
        match self.config.strategy {
            MatchStrategy::Correlation => Ok(Descriptor::Correlation(image.try_clone()?)),
            MatchStrategy::Keypoints => self.describe_keypoints(image),
        }
    }

    fn describe_keypoints(&self, image: &Mat) -> Result<Descriptor> {
        let mut orb = ORB::create_def()?;
        orb.set_max_features(self.config.orb_features)?;

        let mut keypoints = Vector::<KeyPoint>::new();
        let mut descriptors = Mat::default();
        orb.detect_and_compute(image, &core::no_array(), &mut keypoints, &mut descriptors, false)?;
        debug!("described {} keypoints", keypoints.len());

        Ok(Descriptor::Keypoints(descriptors))
    }

    /// Score a region against one template. `None` means the pair cannot be
    /// compared (template larger than the region).
    fn compare(
        &self,
        hamming: &Ptr<BFMatcher>,
        region: &Descriptor,
        template: &Descriptor,
    ) -> Result<Option<f64>> {
        match (region, template) {
            (Descriptor::Correlation(region), Descriptor::Correlation(template)) => {
                correlate(region, template)
            }
            (Descriptor::Keypoints(query), Descriptor::Keypoints(train)) => {
                self.count_correspondences(hamming, query, train).map(Some)
            }
            _ => Err(Error::StrategyMismatch {
                catalog: template.strategy(),
                matcher: region.strategy(),
            }),
        }
    }

    /// Whether a candidate's score is confident enough to report.
    pub fn accepts(&self, score: f64) -> bool {
        match self.config.strategy {
            MatchStrategy::Correlation => score > self.config.correlation_threshold,
            MatchStrategy::Keypoints => score >= f64::from(self.config.min_correspondences),
        }
    }

    /// Score a grayscale region against every template and pick the best.
    ///
    /// The running best is replaced only by a strictly greater score, so ties
    /// resolve to the earliest template in catalog order.
    pub fn identify(&self, region: &Mat, catalog: &TemplateCatalog) -> Result<Identification> {
        if catalog.strategy() != self.strategy() {
            return Err(Error::StrategyMismatch {
                catalog: catalog.strategy(),
                matcher: self.strategy(),
            });
        }

        let region = self.describe(region)?;
        let hamming = BFMatcher::create(NORM_HAMMING, false)?;
        let scores = catalog
            .iter()
            .map(|template| self.compare(&hamming, &region, template.descriptor()))
            .collect::<Result<Vec<_>>>()?;

        let mut candidate = None;
        let mut best_score = 0.0;
        for (idx, score) in scores.iter().enumerate() {
            let Some(score) = score.filter(|s| s.is_finite()) else {
                continue;
            };
            if candidate.is_none() || score > best_score {
                candidate = Some(idx);
                best_score = score;
            }
        }

        let accepted = candidate.is_some() && self.accepts(best_score);
        debug!(
            "best candidate {:?} scored {:.3} (accepted: {})",
            candidate.and_then(|idx| catalog.template(idx)).map(|t| t.identity()),
            best_score,
            accepted
        );

        Ok(Identification {
            candidate,
            score: best_score,
            accepted,
            scores,
        })
    }

    /// Count nearest-neighbour correspondences closer than the acceptance
    /// distance.
    fn count_correspondences(
        &self,
        matcher: &Ptr<BFMatcher>,
        query: &Mat,
        train: &Mat,
    ) -> Result<f64> {
        if query.empty() || train.empty() {
            return Ok(0.0);
        }

        let mut matches = Vector::<DMatch>::new();
        matcher.train_match(query, train, &mut matches, &core::no_array())?;

        let good = matches
            .iter()
            .filter(|m| m.distance < self.config.max_hamming_distance)
            .count();
        Ok(good as f64)
    }
}

impl Default for FeatureMatcher {
    fn default() -> Self {
        Self::new(MatcherConfig::default())
    }
}

/// Peak normalized correlation coefficient of `template` slid over `region`.
fn correlate(region: &Mat, template: &Mat) -> Result<Option<f64>> {
    if template.empty()
        || region.empty()
        || template.cols() > region.cols()
        || template.rows() > region.rows()
    {
        return Ok(None);
    }

    let mut response = Mat::default();
    imgproc::match_template(
        region,
        template,
        &mut response,
        imgproc::TM_CCOEFF_NORMED,
        &core::no_array(),
    )?;

    let mut max_val = 0.0;
    core::min_max_loc(&response, None, Some(&mut max_val), None, None, &core::no_array())?;
    Ok(Some(max_val))
}
