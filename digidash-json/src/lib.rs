//! JSON exchange format for the gauge display settings
//!
//! External tooling reads and writes the configuration as JSON:
//!
//! - [`config_to_json`] exports every entity, enums as canonical names
//! - [`options_to_json`] exports the legal enum choices and capacities
//! - [`json_to_config`] imports a (possibly partial) document through the
//!   store's setters, so imported values get the same validation as
//!   direct API calls
//!
//! # Document shape
//!
//! ```json
//! {
//!   "views":    [{ "enable": "Enabled", "num_gauges": 3, "background": "Black",
//!                  "gauge": [{ "theme": "Stock ST", "pid": 0, "units": "n/a" }, ...] }, ...],
//!   "alerts":   [{ "enable": "Disabled", "pid": 0, "units": "n/a", "message": "",
//!                  "compare": "<", "threshold": 0.0 }, ...],
//!   "dynamics": [{ "enable": "Disabled", "priority": "Low", "pid": 0, "units": "n/a",
//!                  "compare": "<", "threshold": 0.0, "index": 0 }, ...],
//!   "general":  [{ "ee_version": 1 }]
//! }
//! ```
//!
//! Arrays are positional: element `i` addresses entity `i`.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

#[macro_use]
mod fmt;

pub mod error;
pub mod export;
pub mod import;
pub mod options;

pub use error::JsonError;
pub use export::{config_to_json, config_to_string};
pub use import::{json_to_config, ImportReport};
pub use options::{options_to_json, options_to_string};
