//! Typed settings
//!
//! In-memory mirror of the device settings, its fixed EEPROM layout and
//! the store that keeps the two in sync.

pub mod address;
pub mod codec;
pub mod enums;
pub mod error;
pub mod loader;
pub mod store;
pub mod types;
pub mod verify;

pub use address::{FieldKey, Slot, EEPROM_SIZE};
pub use enums::*;
pub use error::ConfigError;
pub use loader::{LoadOutcome, LoadReport};
pub use store::SettingsStore;
pub use types::*;
