//! Digidash storage abstraction layer
//!
//! This crate defines the byte-level storage interface the settings store
//! persists through. Board crates implement [`Eeprom`] on top of their
//! on-chip EEPROM, an emulated EEPROM in flash, or an external I2C part.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  digidash-core / digidash-json          │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  digidash-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ board EEPROM  │       │ MemoryEeprom  │
//! │   driver      │       │ (host/tests)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`eeprom::Eeprom`] - Byte-addressable persistent storage

#![no_std]
#![deny(unsafe_code)]

pub mod eeprom;
pub mod memory;

// Re-export key items at crate root for convenience
pub use eeprom::{Eeprom, EepromHandlers, ERASED_BYTE};
pub use memory::MemoryEeprom;
