//! High-level recognition module

pub mod config;
pub mod engine;

pub use config::RecognitionConfig;
pub use engine::{export_json, MatchResult, MatchSummary, RecognitionEngine, SlotOutcome};
