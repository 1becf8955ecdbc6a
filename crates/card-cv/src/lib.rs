//! Card Detector Computer Vision Library
//!
//! Recognizes the five cards of a fixed-layout composite screenshot by
//! matching each slot against a preloaded template catalog using OpenCV.

pub mod catalog;
pub mod detection;
pub mod error;
pub mod region;
pub mod service;
pub mod template;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use catalog::{LoadReport, TemplateCatalog};
pub use detection::{MatchResult, MatchSummary, RecognitionConfig, RecognitionEngine, SlotOutcome};
pub use error::Error;
pub use region::RegionExtractor;
pub use service::{RecognitionService, SinkRegistry};
pub use template::{CardTemplate, Descriptor, FeatureMatcher, MatchStrategy, MatcherConfig, TemplateLoader};

pub use card_core::{CardIdentity, DisplayInfoIndex, Pack, SlotLayout, TabularFormat};

// Error handling
pub type Result<T> = std::result::Result<T, Error>;

/// Core traits for the recognition system
pub mod traits {
    use crate::detection::MatchResult;

    /// Receives the recognition outcome for one slot.
    pub trait SlotSink: Send {
        fn show(&mut self, result: &MatchResult<'_>);
    }

    impl<F> SlotSink for F
    where
        F: FnMut(&MatchResult<'_>) + Send,
    {
        fn show(&mut self, result: &MatchResult<'_>) {
            self(result)
        }
    }
}
