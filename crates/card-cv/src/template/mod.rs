//! Card templates and matching configuration

pub mod loader;
pub mod matcher;

pub use loader::TemplateLoader;
pub use matcher::{FeatureMatcher, Identification};

use card_core::{CardIdentity, Pack};
use opencv::core::Mat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How templates are described and compared. A catalog is described with
/// exactly one strategy and only a matcher of that strategy may score it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStrategy {
    /// Normalized correlation coefficient over the whole card image.
    Correlation,
    /// ORB keypoints compared by Hamming distance.
    Keypoints,
}

/// Precomputed template representation used for scoring.
#[derive(Debug, Clone)]
pub enum Descriptor {
    /// Grayscale image correlated at native scale
    Correlation(Mat),
    /// ORB descriptor rows (32 bytes each)
    Keypoints(Mat),
}

impl Descriptor {
    pub fn strategy(&self) -> MatchStrategy {
        match self {
            Descriptor::Correlation(_) => MatchStrategy::Correlation,
            Descriptor::Keypoints(_) => MatchStrategy::Keypoints,
        }
    }
}

/// Matching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub strategy: MatchStrategy,
    /// Correlation must be strictly above this to be accepted.
    pub correlation_threshold: f64,
    /// Correspondences count only when their Hamming distance is below this.
    pub max_hamming_distance: f32,
    /// Fewest good correspondences for a keypoint match to be accepted.
    /// Zero lets an all-zero scoring pass report the first template.
    pub min_correspondences: u32,
    pub orb_features: i32,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            strategy: MatchStrategy::Correlation,
            correlation_threshold: 0.9,
            max_hamming_distance: 32.0,
            min_correspondences: 1,
            orb_features: 500,
        }
    }
}

impl MatcherConfig {
    /// Keypoint matching with the default acceptance rule
    pub fn keypoints() -> Self {
        Self {
            strategy: MatchStrategy::Keypoints,
            ..Default::default()
        }
    }
}

/// A known card: identity, matching image and descriptor.
#[derive(Debug, Clone)]
pub struct CardTemplate {
    identity: CardIdentity,
    pack: Option<Pack>,
    source: Option<PathBuf>,
    image: Mat,
    descriptor: Descriptor,
    display_info: String,
}

impl CardTemplate {
    pub fn new(identity: CardIdentity, image: Mat, descriptor: Descriptor) -> Self {
        Self {
            identity,
            pack: None,
            source: None,
            image,
            descriptor,
            display_info: String::new(),
        }
    }

    pub fn with_pack(mut self, pack: Option<Pack>) -> Self {
        self.pack = pack;
        self
    }

    pub fn with_source(mut self, source: PathBuf) -> Self {
        self.source = Some(source);
        self
    }

    pub fn identity(&self) -> &CardIdentity {
        &self.identity
    }

    pub fn pack(&self) -> Option<Pack> {
        self.pack
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn image(&self) -> &Mat {
        &self.image
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn display_info(&self) -> &str {
        &self.display_info
    }

    pub(crate) fn set_display_info(&mut self, text: &str) {
        self.display_info = text.to_string();
    }
}
