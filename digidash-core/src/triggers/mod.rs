//! Live-data triggers
//!
//! Evaluates the configured alerts and dynamic view rules against live
//! parameter values. Values are supplied by a lookup closure so this
//! module stays independent of the telemetry source.

pub mod alert;
pub mod dynamic;

pub use alert::{triggered_alerts, TriggeredAlerts};
pub use dynamic::resolve_active_view;
