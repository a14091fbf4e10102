//! Options catalog export
//!
//! Lists the canonical names of every enumerated field, in discriminant
//! order, together with the fixed capacities. UIs use it to build pickers
//! without hard-coding the schema.

use alloc::string::String;

use serde::Serialize;

use digidash_core::config::{
    Comparison, DynamicPriority, EnableState, GaugeTheme, PidUnits, ViewBackground,
    ALERT_MESSAGE_MAX, GAUGES_PER_VIEW, MAX_ALERTS, MAX_DYNAMICS, MAX_VIEWS,
};

use crate::error::JsonError;
use crate::export::copy_out;

type Names = &'static [&'static str];

#[derive(Serialize)]
struct Options {
    views: ViewOptions,
    alerts: AlertOptions,
    dynamics: DynamicOptions,
    limits: Limits,
}

#[derive(Serialize)]
struct ViewOptions {
    enable: Names,
    background: Names,
    gauge: GaugeOptions,
}

#[derive(Serialize)]
struct GaugeOptions {
    theme: Names,
    units: Names,
}

#[derive(Serialize)]
struct AlertOptions {
    enable: Names,
    units: Names,
    compare: Names,
}

#[derive(Serialize)]
struct DynamicOptions {
    enable: Names,
    priority: Names,
    units: Names,
    compare: Names,
}

#[derive(Serialize)]
struct Limits {
    max_views: usize,
    gauges_per_view: usize,
    max_alerts: usize,
    max_dynamics: usize,
    /// Longest message in bytes, terminator excluded
    alert_message_len: usize,
}

const OPTIONS: Options = Options {
    views: ViewOptions {
        enable: EnableState::NAMES,
        background: ViewBackground::NAMES,
        gauge: GaugeOptions {
            theme: GaugeTheme::NAMES,
            units: PidUnits::NAMES,
        },
    },
    alerts: AlertOptions {
        enable: EnableState::NAMES,
        units: PidUnits::NAMES,
        compare: Comparison::NAMES,
    },
    dynamics: DynamicOptions {
        enable: EnableState::NAMES,
        priority: DynamicPriority::NAMES,
        units: PidUnits::NAMES,
        compare: Comparison::NAMES,
    },
    limits: Limits {
        max_views: MAX_VIEWS,
        gauges_per_view: GAUGES_PER_VIEW,
        max_alerts: MAX_ALERTS,
        max_dynamics: MAX_DYNAMICS,
        alert_message_len: ALERT_MESSAGE_MAX,
    },
};

/// Serialize the options catalog into `buffer`
///
/// Same buffer contract as [`config_to_json`](crate::config_to_json).
pub fn options_to_json(buffer: &mut [u8]) -> Result<usize, JsonError> {
    let json = serde_json::to_vec(&OPTIONS)
        .map_err(|_| JsonError::Serialize)?;
    copy_out(&json, buffer)
}

/// Serialize the options catalog into a new string
pub fn options_to_string() -> Result<String, JsonError> {
    serde_json::to_string(&OPTIONS)
        .map_err(|_| JsonError::Serialize)
}
