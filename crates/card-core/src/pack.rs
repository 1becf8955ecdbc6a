use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Card groupings; each pack's templates live in `<data_root>/<Pack>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pack {
    Mewtwo,
    Dracaufeu,
    Pikachu,
    Mew,
    Dialga,
    Palkia,
    Arceus,
}

impl Pack {
    pub const ALL: [Pack; 7] = [
        Pack::Mewtwo,
        Pack::Dracaufeu,
        Pack::Pikachu,
        Pack::Mew,
        Pack::Dialga,
        Pack::Palkia,
        Pack::Arceus,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Pack::Mewtwo => "Mewtwo",
            Pack::Dracaufeu => "Dracaufeu",
            Pack::Pikachu => "Pikachu",
            Pack::Mew => "Mew",
            Pack::Dialga => "Dialga",
            Pack::Palkia => "Palkia",
            Pack::Arceus => "Arceus",
        }
    }

    /// Directory holding this pack's templates under `data_root`.
    pub fn dir(&self, data_root: &Path) -> PathBuf {
        data_root.join(self.name())
    }
}

impl fmt::Display for Pack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_dirs() {
        let root = Path::new("data");
        assert_eq!(Pack::Dracaufeu.dir(root), PathBuf::from("data/Dracaufeu"));
        assert_eq!(Pack::ALL.len(), 7);
    }
}
