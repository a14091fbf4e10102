//! Alert evaluation

use heapless::Vec;

use crate::config::{Configuration, MAX_ALERTS};

/// Indices of alerts whose condition currently holds
pub type TriggeredAlerts = Vec<u8, MAX_ALERTS>;

/// Evaluate every enabled alert against live data
///
/// `live` returns the current value of a PID, or `None` when unavailable.
/// Indices are returned in ascending order.
pub fn triggered_alerts(
    config: &Configuration,
    mut live: impl FnMut(u32) -> Option<f32>,
) -> TriggeredAlerts {
    let mut triggered = TriggeredAlerts::new();

    for (index, alert) in config.alerts.iter().enumerate() {
        if !alert.enabled.is_enabled() {
            continue;
        }
        let Some(value) = live(alert.pid) else {
            continue;
        };
        if alert.compare.evaluate(value, alert.threshold) {
            // Capacity equals the alert count
            let _ = triggered.push(index as u8);
        }
    }

    if !triggered.is_empty() {
        debug!("{} alerts triggered", triggered.len());
    }
    triggered
}
