//! Card Detector core data model
//!
//! Pure data shared by the recognition crates: card identities, pack
//! groupings, the fixed composite layout and the display-info index.

pub mod display;
pub mod identity;
pub mod layout;
pub mod pack;

// Re-export commonly used types
pub use display::{DisplayInfoIndex, LoadError, TabularFormat};
pub use identity::CardIdentity;
pub use layout::{SlotLayout, SlotRect};
pub use pack::Pack;
