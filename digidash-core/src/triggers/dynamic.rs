//! Dynamic view arbitration

use crate::config::{Configuration, DynamicRule, MAX_VIEWS};

/// Whether a rule is eligible to take over the display
fn is_armed(rule: &DynamicRule, config: &Configuration) -> bool {
    rule.enabled.is_enabled()
        && rule.priority.is_valid()
        && rule.compare.is_valid()
        && (rule.view_index as usize) < MAX_VIEWS
        && config.views[rule.view_index as usize].enabled.is_enabled()
}

/// Pick the view a dynamic rule wants shown
///
/// `live` returns the current value of a PID, or `None` when no data is
/// available (the rule does not fire). Among firing rules the highest
/// priority wins; equal priorities go to the lowest rule index. Rules
/// pointing at a disabled view are ignored.
///
/// Returns `None` when no rule fires.
pub fn resolve_active_view(
    config: &Configuration,
    mut live: impl FnMut(u32) -> Option<f32>,
) -> Option<u8> {
    let mut winner: Option<&DynamicRule> = None;

    for rule in config.dynamics.iter().filter(|r| is_armed(r, config)) {
        let Some(value) = live(rule.pid) else {
            continue;
        };
        if !rule.compare.evaluate(value, rule.threshold) {
            continue;
        }
        // Strictly greater keeps the earliest rule on a tie
        if winner.map_or(true, |w| rule.priority > w.priority) {
            winner = Some(rule);
        }
    }

    if let Some(rule) = winner {
        trace!("dynamic rule selects view {}", rule.view_index);
    }
    winner.map(|rule| rule.view_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Comparison, DynamicPriority, EnableState};

    const BOOST: u32 = 0x0001_000B;
    const COOLANT: u32 = 0x0001_0005;

    fn config() -> Configuration {
        let mut config = Configuration::default();
        config.views[1].enabled = EnableState::Enabled;
        config.views[2].enabled = EnableState::Enabled;

        config.dynamics[0] = DynamicRule {
            enabled: EnableState::Enabled,
            priority: DynamicPriority::Low,
            pid: BOOST,
            compare: Comparison::GreaterThan,
            threshold: 10.0,
            view_index: 1,
            ..DynamicRule::default()
        };
        config.dynamics[1] = DynamicRule {
            enabled: EnableState::Enabled,
            priority: DynamicPriority::High,
            pid: COOLANT,
            compare: Comparison::GreaterThanOrEqual,
            threshold: 105.0,
            view_index: 2,
            ..DynamicRule::default()
        };
        config
    }

    fn readings(boost: f32, coolant: f32) -> impl FnMut(u32) -> Option<f32> {
        move |pid| match pid {
            BOOST => Some(boost),
            COOLANT => Some(coolant),
            _ => None,
        }
    }

    #[test]
    fn test_no_rule_fires() {
        assert_eq!(resolve_active_view(&config(), readings(5.0, 90.0)), None);
    }

    #[test]
    fn test_single_rule_fires() {
        let config = config();
        assert_eq!(resolve_active_view(&config, readings(12.0, 90.0)), Some(1));
        assert_eq!(resolve_active_view(&config, readings(5.0, 105.0)), Some(2));
    }

    #[test]
    fn test_highest_priority_wins() {
        let config = config();
        assert_eq!(resolve_active_view(&config, readings(12.0, 110.0)), Some(2));
    }

    #[test]
    fn test_tie_goes_to_lowest_index() {
        let mut config = config();
        config.dynamics[1].priority = DynamicPriority::Low;
        assert_eq!(resolve_active_view(&config, readings(12.0, 110.0)), Some(1));
    }

    #[test]
    fn test_disabled_target_view_skipped() {
        let mut config = config();
        config.views[2].enabled = EnableState::Disabled;
        assert_eq!(resolve_active_view(&config, readings(12.0, 110.0)), Some(1));
    }

    #[test]
    fn test_disabled_rule_and_missing_data() {
        let mut config = config();
        config.dynamics[0].enabled = EnableState::Disabled;
        assert_eq!(resolve_active_view(&config, readings(12.0, 90.0)), None);
        assert_eq!(resolve_active_view(&config, |_| None), None);
    }
}
