//! Settings core for the gauge display firmware
//!
//! This crate holds everything that does not depend on a particular board:
//!
//! - Configuration types and their canonical enum names
//! - The fixed EEPROM address map and byte codec
//! - The settings store (verify, mirror, write-through, commit/discard)
//! - Load, format and version handling
//! - Alert and dynamic view evaluation against live data
//!
//! Storage is reached through [`digidash_hal::Eeprom`], so the same code
//! runs on the device and against [`digidash_hal::MemoryEeprom`] in tests.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod triggers;

pub use config::{ConfigError, Configuration, SettingsStore};
