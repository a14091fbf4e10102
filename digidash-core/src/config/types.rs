//! Configuration type definitions
//!
//! These types are the in-memory mirror of the settings held in EEPROM.
//! Capacities are fixed at build time; entities are never added or removed,
//! only enabled and disabled.

use heapless::String;

use super::enums::{Comparison, DynamicPriority, EnableState, GaugeTheme, PidUnits, ViewBackground};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Maximum number of views
pub const MAX_VIEWS: usize = 3;

/// Gauges shown by a single view
pub const GAUGES_PER_VIEW: usize = 3;

/// Maximum number of alerts
pub const MAX_ALERTS: usize = 5;

/// Maximum number of dynamic view-switching rules
pub const MAX_DYNAMICS: usize = 2;

/// Number of device-level settings records
pub const MAX_GENERALS: usize = 1;

/// Alert message buffer size, including the zero terminator
pub const ALERT_MESSAGE_LEN: usize = 64;

/// Longest alert message payload in bytes
pub const ALERT_MESSAGE_MAX: usize = ALERT_MESSAGE_LEN - 1;

/// Layout version written by this build
pub const EE_VERSION: u8 = 1;

/// PID value meaning "no parameter bound"
pub const PID_NONE: u32 = 0;

/// Erased-EEPROM pattern; never a plausible PID
pub const PID_ERASED: u32 = 0xFFFF_FFFF;

/// Alert message text
pub type AlertMessage = String<ALERT_MESSAGE_MAX>;

/// A single telemetry gauge
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Gauge {
    /// Visual style
    pub theme: GaugeTheme,
    /// Parameter shown by the gauge
    pub pid: u32,
    /// Display units of the parameter
    pub units: PidUnits,
}

impl Default for Gauge {
    fn default() -> Self {
        Self {
            theme: GaugeTheme::StockSt,
            pid: PID_NONE,
            units: PidUnits::NotApplicable,
        }
    }
}

/// A screen layout holding up to [`GAUGES_PER_VIEW`] gauges
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct View {
    #[cfg_attr(feature = "serde", serde(rename = "enable"))]
    pub enabled: EnableState,
    /// Number of gauges drawn (0..=GAUGES_PER_VIEW)
    pub num_gauges: u8,
    pub background: ViewBackground,
    #[cfg_attr(feature = "serde", serde(rename = "gauge"))]
    pub gauges: [Gauge; GAUGES_PER_VIEW],
}

/// A message shown when a parameter crosses a threshold
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Alert {
    #[cfg_attr(feature = "serde", serde(rename = "enable"))]
    pub enabled: EnableState,
    /// Parameter being watched
    pub pid: u32,
    pub units: PidUnits,
    /// Text shown while the alert is active
    pub message: AlertMessage,
    pub compare: Comparison,
    pub threshold: f32,
}

impl Default for Alert {
    fn default() -> Self {
        Self {
            enabled: EnableState::Disabled,
            pid: PID_NONE,
            units: PidUnits::NotApplicable,
            message: String::new(),
            compare: Comparison::LessThan,
            threshold: 0.0,
        }
    }
}

/// Rule that switches the active view when a parameter crosses a threshold
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct DynamicRule {
    #[cfg_attr(feature = "serde", serde(rename = "enable"))]
    pub enabled: EnableState,
    /// Priority used when several rules are true at once
    pub priority: DynamicPriority,
    pub pid: u32,
    pub units: PidUnits,
    pub compare: Comparison,
    pub threshold: f32,
    /// View shown while this rule wins
    #[cfg_attr(feature = "serde", serde(rename = "index"))]
    pub view_index: u8,
}

impl Default for DynamicRule {
    fn default() -> Self {
        Self {
            enabled: EnableState::Disabled,
            priority: DynamicPriority::Low,
            pid: PID_NONE,
            units: PidUnits::NotApplicable,
            compare: Comparison::LessThan,
            threshold: 0.0,
            view_index: 0,
        }
    }
}

/// Device-level settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct General {
    /// Layout version the stored bytes conform to
    pub ee_version: u8,
}

impl Default for General {
    fn default() -> Self {
        Self {
            ee_version: EE_VERSION,
        }
    }
}

/// Complete device configuration
///
/// Factory default: the first view is enabled with all of its gauges,
/// everything else is disabled.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Configuration {
    pub views: [View; MAX_VIEWS],
    pub alerts: [Alert; MAX_ALERTS],
    pub dynamics: [DynamicRule; MAX_DYNAMICS],
    pub general: [General; MAX_GENERALS],
}

impl Default for Configuration {
    fn default() -> Self {
        let mut views = [View::default(); MAX_VIEWS];
        views[0].enabled = EnableState::Enabled;
        views[0].num_gauges = GAUGES_PER_VIEW as u8;

        Self {
            views,
            alerts: core::array::from_fn(|_| Alert::default()),
            dynamics: [DynamicRule::default(); MAX_DYNAMICS],
            general: [General::default(); MAX_GENERALS],
        }
    }
}

impl Configuration {
    /// Create the factory default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of enabled views
    pub fn enabled_views(&self) -> usize {
        self.views.iter().filter(|v| v.enabled.is_enabled()).count()
    }

    /// Layout version of the first general record
    pub fn ee_version(&self) -> u8 {
        self.general[0].ee_version
    }
}
