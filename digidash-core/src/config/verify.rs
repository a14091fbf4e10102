//! Field validation
//!
//! Pure predicates, one per settable field. A value that fails here is
//! never written to the mirror or to storage.

use super::enums::{Comparison, DynamicPriority, EnableState, GaugeTheme, PidUnits, ViewBackground};
use super::types::{ALERT_MESSAGE_MAX, GAUGES_PER_VIEW, MAX_VIEWS, PID_ERASED};

/// Any PID except the erased-cell pattern
fn plausible_pid(pid: u32) -> bool {
    pid != PID_ERASED
}

pub fn verify_view_enable(enable: EnableState) -> bool {
    enable.is_valid()
}

pub fn verify_view_num_gauges(num_gauges: u8) -> bool {
    num_gauges as usize <= GAUGES_PER_VIEW
}

pub fn verify_view_background(background: ViewBackground) -> bool {
    background.is_valid()
}

pub fn verify_view_gauge_theme(theme: GaugeTheme) -> bool {
    theme.is_valid()
}

pub fn verify_view_gauge_pid(pid: u32) -> bool {
    plausible_pid(pid)
}

pub fn verify_view_gauge_units(units: PidUnits) -> bool {
    units.is_valid()
}

pub fn verify_alert_enable(enable: EnableState) -> bool {
    enable.is_valid()
}

pub fn verify_alert_pid(pid: u32) -> bool {
    plausible_pid(pid)
}

pub fn verify_alert_units(units: PidUnits) -> bool {
    units.is_valid()
}

/// Message must leave room for the terminator and contain no NUL
///
/// Overlong messages are refused rather than truncated.
pub fn verify_alert_message(message: &str) -> bool {
    message.len() <= ALERT_MESSAGE_MAX && !message.bytes().any(|b| b == 0)
}

pub fn verify_alert_compare(compare: Comparison) -> bool {
    compare.is_valid()
}

pub fn verify_alert_threshold(threshold: f32) -> bool {
    threshold.is_finite()
}

pub fn verify_dynamic_enable(enable: EnableState) -> bool {
    enable.is_valid()
}

pub fn verify_dynamic_priority(priority: DynamicPriority) -> bool {
    priority.is_valid()
}

pub fn verify_dynamic_compare(compare: Comparison) -> bool {
    compare.is_valid()
}

pub fn verify_dynamic_threshold(threshold: f32) -> bool {
    threshold.is_finite()
}

/// Target view must be an existing view slot
pub fn verify_dynamic_index(index: u8) -> bool {
    (index as usize) < MAX_VIEWS
}

pub fn verify_dynamic_pid(pid: u32) -> bool {
    plausible_pid(pid)
}

pub fn verify_dynamic_units(units: PidUnits) -> bool {
    units.is_valid()
}

/// 0xFF marks blank storage and cannot be a layout version
pub fn verify_general_ee_version(version: u8) -> bool {
    version != 0xFF
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::ALERT_MESSAGE_LEN;

    #[test]
    fn test_enum_sentinel_rejected() {
        assert!(verify_view_enable(EnableState::Enabled));
        assert!(!verify_view_enable(EnableState::Unset));
        assert!(!verify_view_enable(EnableState::from_u8(99)));
        assert!(!verify_view_background(ViewBackground::Unset));
        assert!(!verify_view_gauge_theme(GaugeTheme::from_name("Fancy")));
        assert!(!verify_dynamic_priority(DynamicPriority::Unset));
        assert!(!verify_alert_compare(Comparison::Unset));
    }

    #[test]
    fn test_num_gauges_range() {
        assert!(verify_view_num_gauges(0));
        assert!(verify_view_num_gauges(GAUGES_PER_VIEW as u8));
        assert!(!verify_view_num_gauges(GAUGES_PER_VIEW as u8 + 1));
    }

    #[test]
    fn test_dynamic_index_range() {
        assert!(verify_dynamic_index(MAX_VIEWS as u8 - 1));
        assert!(!verify_dynamic_index(MAX_VIEWS as u8));
    }

    #[test]
    fn test_pid_plausibility() {
        assert!(verify_view_gauge_pid(0));
        assert!(verify_alert_pid(0x0001_000C));
        assert!(!verify_dynamic_pid(PID_ERASED));
    }

    #[test]
    fn test_threshold_must_be_finite() {
        assert!(verify_alert_threshold(-40.0));
        assert!(!verify_alert_threshold(f32::NAN));
        assert!(!verify_dynamic_threshold(f32::INFINITY));
    }

    #[test]
    fn test_message_length_boundary() {
        let fits = "x".repeat(ALERT_MESSAGE_LEN - 1);
        let no_room_for_terminator = "x".repeat(ALERT_MESSAGE_LEN);
        assert!(verify_alert_message(""));
        assert!(verify_alert_message(&fits));
        assert!(!verify_alert_message(&no_room_for_terminator));
        assert!(!verify_alert_message("OVER\0HEAT"));
    }

    #[test]
    fn test_ee_version() {
        assert!(verify_general_ee_version(1));
        assert!(!verify_general_ee_version(0xFF));
    }
}
