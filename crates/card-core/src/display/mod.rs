//! Display information keyed by card identity
//!
//! Built from tabular exports (one or more CSV files) and merged into the
//! template catalog once at startup.

pub mod tabular;

pub use tabular::TabularFormat;

use crate::identity::CardIdentity;
use log::info;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Errors raised while reading display metadata. All of them are fatal for
/// the merge: a partially-read index is never handed out.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{source_name}: {source}")]
    Malformed {
        source_name: String,
        #[source]
        source: csv::Error,
    },

    #[error("{source_name}: missing header row")]
    MissingHeader { source_name: String },

    #[error("{source_name}: header has no column '{column}'")]
    MissingColumn { source_name: String, column: String },

    #[error("{source_name}: line {line} has no value for '{column}'")]
    MissingField {
        source_name: String,
        line: usize,
        column: String,
    },
}

/// Identity to display string mapping.
#[derive(Debug, Clone, Default)]
pub struct DisplayInfoIndex {
    entries: HashMap<CardIdentity, String>,
}

impl DisplayInfoIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a single tabular source and add its rows. Later rows override
    /// earlier ones for the same identity.
    pub fn parse<R: Read>(
        &mut self,
        reader: R,
        source_name: &str,
        format: &TabularFormat,
    ) -> Result<usize, LoadError> {
        let rows = tabular::read_rows(reader, source_name, format)?;
        let count = rows.len();
        self.entries.extend(rows);
        Ok(count)
    }

    /// Parse one file.
    pub fn parse_file(&mut self, path: &Path, format: &TabularFormat) -> Result<usize, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse(file, &path.display().to_string(), format)
    }

    /// Recursively load every `.csv` file under the given directories.
    ///
    /// Files are visited in directory order, sorted by file name. Missing
    /// directories contribute nothing; any unreadable or malformed file aborts
    /// the whole load.
    pub fn load_dirs<P: AsRef<Path>>(dirs: &[P], format: &TabularFormat) -> Result<Self, LoadError> {
        let mut index = Self::new();

        for dir in dirs {
            let dir = dir.as_ref();
            if !dir.exists() {
                info!("display info directory {:?} does not exist, skipping", dir);
                continue;
            }

            for entry in WalkDir::new(dir).sort_by_file_name() {
                let entry = entry.map_err(|e| LoadError::Io {
                    path: e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf()),
                    source: e.into(),
                })?;
                let path = entry.path();
                if !entry.file_type().is_file() || !is_csv(path) {
                    continue;
                }

                let rows = index.parse_file(path, format)?;
                info!("loaded {} display rows from {:?}", rows, path);
            }
        }

        Ok(index)
    }

    pub fn insert(&mut self, identity: CardIdentity, text: impl Into<String>) {
        self.entries.insert(identity, text.into());
    }

    pub fn get(&self, identity: &CardIdentity) -> Option<&str> {
        self.entries.get(identity).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CardIdentity, &str)> {
        self.entries.iter().map(|(id, text)| (id, text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}
