use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Opaque card identity, unique per template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardIdentity(String);

impl CardIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identity of a template file: its base name without extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_stem()
            .map(|stem| Self(stem.to_string_lossy().to_string()))
            .filter(|id| !id.0.is_empty())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardIdentity {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for CardIdentity {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_from_path() {
        let id = CardIdentity::from_path(Path::new("data/Mewtwo/mewtwo-001.webp")).unwrap();
        assert_eq!(id.as_str(), "mewtwo-001");

        let nested = CardIdentity::from_path(Path::new("a/b/c/pikachu-ex.v2.png")).unwrap();
        assert_eq!(nested.as_str(), "pikachu-ex.v2");
    }

    #[test]
    fn test_identity_equality() {
        assert_eq!(CardIdentity::from("mew-010"), CardIdentity::new("mew-010".to_string()));
        assert_ne!(CardIdentity::from("mew-010"), CardIdentity::from("Mew-010"));
    }
}
