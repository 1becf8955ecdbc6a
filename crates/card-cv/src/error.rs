//! Error kinds surfaced by the recognition pipeline

use card_core::{LoadError, SlotLayout};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A template or input image could not be decoded.
    #[error("failed to decode {path:?}: {reason}")]
    Decode { path: PathBuf, reason: String },

    /// Display metadata was malformed; the merge was not applied.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// A slot rectangle falls outside the composite.
    #[error("slot {slot} does not fit in a {width}x{height} composite")]
    Layout {
        slot: SlotLayout,
        width: i32,
        height: i32,
    },

    /// Recognition attempted with no templates loaded.
    #[error("template catalog is empty")]
    EmptyCatalog,

    /// Descriptors built by one strategy were scored by another.
    #[error("catalog was described with {catalog:?} but the matcher uses {matcher:?}")]
    StrategyMismatch {
        catalog: crate::template::MatchStrategy,
        matcher: crate::template::MatchStrategy,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("OpenCV: {0}")]
    OpenCv(#[from] opencv::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Config(e.to_string())
    }
}
