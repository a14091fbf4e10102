//! Configuration import
//!
//! A document is applied field by field through the store's setters with
//! `save = true`. Each field stands alone: a rejected field is counted and
//! skipped, and fields applied before it stay applied. Keys that are not
//! recognized are ignored, and fields missing from the document keep their
//! current value.

use serde_json::{Map, Value};

use digidash_core::config::{
    Comparison, ConfigError, DynamicPriority, EnableState, GaugeTheme, PidUnits, ViewBackground,
};
use digidash_core::SettingsStore;
use digidash_hal::Eeprom;

use crate::error::JsonError;

/// Outcome of an import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ImportReport {
    /// Fields accepted and persisted
    pub applied: u16,
    /// Fields refused by index or value validation
    pub rejected: u16,
}

/// Apply a JSON document to the store
///
/// Malformed JSON is rejected up front and nothing is touched.
pub fn json_to_config<S: Eeprom>(
    store: &mut SettingsStore<S>,
    json: &[u8],
) -> Result<ImportReport, JsonError> {
    let document: Value = serde_json::from_slice(json).map_err(|_| JsonError::Parse)?;
    let root = document.as_object().ok_or(JsonError::NotAnObject)?;

    let mut importer = Importer {
        store,
        report: ImportReport::default(),
    };

    importer.each_entity(root, "views", Importer::view);
    importer.each_entity(root, "alerts", Importer::alert);
    importer.each_entity(root, "dynamics", Importer::dynamic);
    importer.each_entity(root, "general", Importer::general);

    let report = importer.report;
    info!(
        "json import: {} fields applied, {} rejected",
        report.applied, report.rejected
    );
    Ok(report)
}

type Object = Map<alloc::string::String, Value>;

struct Importer<'a, S> {
    store: &'a mut SettingsStore<S>,
    report: ImportReport,
}

impl<S: Eeprom> Importer<'_, S> {
    /// Visit each object element of `root[section]` with its position
    fn each_entity(
        &mut self,
        root: &Object,
        section: &str,
        mut apply: impl FnMut(&mut Self, u8, &Object),
    ) {
        let Some(entities) = root.get(section).and_then(Value::as_array) else {
            return;
        };
        for (position, entity) in entities.iter().enumerate() {
            match entity.as_object() {
                Some(fields) => apply(self, clamp_index(position), fields),
                None => debug!("json import: {}[{}] is not an object", section, position),
            }
        }
    }

    fn tally(&mut self, result: Result<(), ConfigError>) -> Result<(), ConfigError> {
        match result {
            Ok(()) => self.report.applied += 1,
            Err(_) => self.report.rejected += 1,
        }
        result
    }

    fn record(&mut self, section: &str, idx: u8, field: &str, result: Result<(), ConfigError>) {
        if let Err(e) = self.tally(result) {
            warn!(
                "json import: rejected {}[{}].{}: {}",
                section, idx, field, e
            );
        }
    }

    fn view(&mut self, idx: u8, fields: &Object) {
        for (field, value) in fields {
            let field = field.as_str();
            let store = &mut *self.store;
            let result = match field {
                "enable" => store.set_view_enable(idx, enable_state(value), true),
                "num_gauges" => with_u8(value, |n| store.set_view_num_gauges(idx, n, true)),
                "background" => store.set_view_background(idx, background(value), true),
                "gauge" => {
                    self.gauges(idx, value);
                    continue;
                }
                _ => continue,
            };
            self.record("views", idx, field, result);
        }
    }

    fn gauges(&mut self, view: u8, value: &Value) {
        let Some(gauges) = value.as_array() else {
            return;
        };
        for (position, entry) in gauges.iter().enumerate() {
            let Some(fields) = entry.as_object() else {
                continue;
            };
            let gauge = clamp_index(position);
            for (field, value) in fields {
                let field = field.as_str();
                let store = &mut *self.store;
                let result = match field {
                    "theme" => store.set_view_gauge_theme(view, gauge, theme(value), true),
                    "pid" => with_u32(value, |p| store.set_view_gauge_pid(view, gauge, p, true)),
                    "units" => store.set_view_gauge_units(view, gauge, units(value), true),
                    _ => continue,
                };
                if let Err(e) = self.tally(result) {
                    warn!(
                        "json import: rejected views[{}].gauge[{}].{}: {}",
                        view, gauge, field, e
                    );
                }
            }
        }
    }

    fn alert(&mut self, idx: u8, fields: &Object) {
        for (field, value) in fields {
            let field = field.as_str();
            let store = &mut *self.store;
            let result = match field {
                "enable" => store.set_alert_enable(idx, enable_state(value), true),
                "pid" => with_u32(value, |pid| store.set_alert_pid(idx, pid, true)),
                "units" => store.set_alert_units(idx, units(value), true),
                "message" => match value.as_str() {
                    Some(message) => store.set_alert_message(idx, message, true),
                    None => Err(ConfigError::OutOfRange),
                },
                "compare" => store.set_alert_compare(idx, comparison(value), true),
                "threshold" => with_f32(value, |t| store.set_alert_threshold(idx, t, true)),
                _ => continue,
            };
            self.record("alerts", idx, field, result);
        }
    }

    fn dynamic(&mut self, idx: u8, fields: &Object) {
        for (field, value) in fields {
            let field = field.as_str();
            let store = &mut *self.store;
            let result = match field {
                "enable" => store.set_dynamic_enable(idx, enable_state(value), true),
                "priority" => store.set_dynamic_priority(idx, priority(value), true),
                "pid" => with_u32(value, |pid| store.set_dynamic_pid(idx, pid, true)),
                "units" => store.set_dynamic_units(idx, units(value), true),
                "compare" => store.set_dynamic_compare(idx, comparison(value), true),
                "threshold" => with_f32(value, |t| store.set_dynamic_threshold(idx, t, true)),
                "index" => with_u8(value, |view| store.set_dynamic_index(idx, view, true)),
                _ => continue,
            };
            self.record("dynamics", idx, field, result);
        }
    }

    fn general(&mut self, idx: u8, fields: &Object) {
        for (field, value) in fields {
            let field = field.as_str();
            let store = &mut *self.store;
            let result = match field {
                "ee_version" => with_u8(value, |v| store.set_general_ee_version(idx, v, true)),
                _ => continue,
            };
            self.record("general", idx, field, result);
        }
    }
}

/// Positions past `u8` saturate and fail the setter's index check
fn clamp_index(position: usize) -> u8 {
    u8::try_from(position).unwrap_or(u8::MAX)
}

fn background(value: &Value) -> ViewBackground {
    value
        .as_str()
        .map_or(ViewBackground::Unset, ViewBackground::from_name)
}

fn theme(value: &Value) -> GaugeTheme {
    value
        .as_str()
        .map_or(GaugeTheme::Unset, GaugeTheme::from_name)
}

fn priority(value: &Value) -> DynamicPriority {
    value
        .as_str()
        .map_or(DynamicPriority::Unset, DynamicPriority::from_name)
}

fn enable_state(value: &Value) -> EnableState {
    value
        .as_str()
        .map_or(EnableState::Unset, EnableState::from_name)
}

fn units(value: &Value) -> PidUnits {
    value.as_str().map_or(PidUnits::Unset, PidUnits::from_name)
}

fn comparison(value: &Value) -> Comparison {
    value
        .as_str()
        .map_or(Comparison::Unset, Comparison::from_name)
}

/// Numbers that do not fit the field's type are out of range
fn with_u8(
    value: &Value,
    set: impl FnOnce(u8) -> Result<(), ConfigError>,
) -> Result<(), ConfigError> {
    value
        .as_u64()
        .and_then(|n| u8::try_from(n).ok())
        .map_or(Err(ConfigError::OutOfRange), set)
}

fn with_u32(
    value: &Value,
    set: impl FnOnce(u32) -> Result<(), ConfigError>,
) -> Result<(), ConfigError> {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .map_or(Err(ConfigError::OutOfRange), set)
}

fn with_f32(
    value: &Value,
    set: impl FnOnce(f32) -> Result<(), ConfigError>,
) -> Result<(), ConfigError> {
    value
        .as_f64()
        .map_or(Err(ConfigError::OutOfRange), |n| set(n as f32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::config_to_string;
    use digidash_core::config::address::GENERAL_BASE;
    use digidash_core::config::{Configuration, FieldKey, EE_VERSION, MAX_VIEWS};
    use digidash_hal::MemoryEeprom;
    use proptest::prelude::*;

    type Store = SettingsStore<MemoryEeprom<1024>>;

    fn store() -> Store {
        SettingsStore::load(MemoryEeprom::new()).0
    }

    fn field_count() -> u16 {
        let mut count = 0;
        FieldKey::for_each(|_| count += 1);
        count
    }

    fn customised() -> Store {
        let mut store = store();
        store
            .set_view_enable(1, EnableState::Enabled, true)
            .unwrap();
        store.set_view_num_gauges(1, 2, true).unwrap();
        store
            .set_view_background(1, ViewBackground::User1, true)
            .unwrap();
        store
            .set_view_gauge_theme(1, 0, GaugeTheme::Radial, true)
            .unwrap();
        store.set_view_gauge_pid(1, 0, 0x0001_000B, true).unwrap();
        store
            .set_view_gauge_units(1, 0, PidUnits::Psi, true)
            .unwrap();
        store
            .set_alert_enable(0, EnableState::Enabled, true)
            .unwrap();
        store.set_alert_pid(0, 0x0001_0005, true).unwrap();
        store.set_alert_units(0, PidUnits::Celsius, true).unwrap();
        store.set_alert_message(0, "OVERHEAT", true).unwrap();
        store
            .set_alert_compare(0, Comparison::GreaterThan, true)
            .unwrap();
        store.set_alert_threshold(0, 107.5, true).unwrap();
        store
            .set_dynamic_enable(1, EnableState::Enabled, true)
            .unwrap();
        store
            .set_dynamic_priority(1, DynamicPriority::High, true)
            .unwrap();
        store.set_dynamic_pid(1, 0x0001_000B, true).unwrap();
        store.set_dynamic_units(1, PidUnits::Psi, true).unwrap();
        store
            .set_dynamic_compare(1, Comparison::GreaterThanOrEqual, true)
            .unwrap();
        store.set_dynamic_threshold(1, 15.0, true).unwrap();
        store.set_dynamic_index(1, 1, true).unwrap();
        store
    }

    #[test]
    fn test_round_trip() {
        let source = customised();
        let json = config_to_string(source.config()).unwrap();

        let mut target = store();
        let report = json_to_config(&mut target, json.as_bytes()).unwrap();
        assert_eq!(
            report,
            ImportReport {
                applied: field_count(),
                rejected: 0,
            }
        );
        assert_eq!(target.config(), source.config());

        // Imported values are persisted, not just mirrored
        let (reloaded, _) = SettingsStore::load(target.into_storage());
        assert_eq!(reloaded.config(), source.config());
    }

    #[test]
    fn test_unknown_enum_name_leaves_value() {
        let mut store = customised();
        let json = br#"{"views":[{},{"background":"Plaid"}]}"#;

        let report = json_to_config(&mut store, json).unwrap();
        assert_eq!(
            report,
            ImportReport {
                applied: 0,
                rejected: 1,
            }
        );
        assert_eq!(store.get_view_background(1), Ok(ViewBackground::User1));
    }

    #[test]
    fn test_partial_failure_not_rolled_back() {
        let mut store = store();
        let json = br#"{
            "views": [{ "num_gauges": 2 }],
            "alerts": [{ "message": "LOW OIL", "threshold": "hot" }]
        }"#;

        let report = json_to_config(&mut store, json).unwrap();
        assert_eq!(
            report,
            ImportReport {
                applied: 2,
                rejected: 1,
            }
        );
        assert_eq!(store.get_view_num_gauges(0), Ok(2));
        assert_eq!(store.get_alert_message(0), Ok("LOW OIL"));
        assert_eq!(store.get_alert_threshold(0), Ok(0.0));

        let (reloaded, _) = SettingsStore::load(store.into_storage());
        assert_eq!(reloaded.get_view_num_gauges(0), Ok(2));
        assert_eq!(reloaded.get_alert_message(0), Ok("LOW OIL"));
    }

    #[test]
    fn test_absent_and_unknown_keys_ignored() {
        let mut store = customised();
        let before = store.config().clone();
        let json = br#"{"firmware":"2.1","views":[{"colour":"red"}],"alerts":[]}"#;

        let report = json_to_config(&mut store, json).unwrap();
        assert_eq!(report, ImportReport::default());
        assert_eq!(store.config(), &before);
    }

    #[test]
    fn test_extra_elements_rejected() {
        let mut store = store();
        let mut views = alloc::vec::Vec::new();
        for _ in 0..=MAX_VIEWS {
            views.push(serde_json::json!({ "enable": "Enabled" }));
        }
        let document = serde_json::json!({ "views": views });
        let json = serde_json::to_vec(&document).unwrap();

        let report = json_to_config(&mut store, &json).unwrap();
        assert_eq!(
            report,
            ImportReport {
                applied: MAX_VIEWS as u16,
                rejected: 1,
            }
        );
    }

    #[test]
    fn test_wrong_value_types_rejected() {
        let mut store = store();
        let json = br#"{
            "alerts": [{ "pid": -1, "message": 7, "threshold": "hot", "enable": true }],
            "dynamics": [{ "index": 300 }],
            "general": [{ "ee_version": 255 }]
        }"#;

        let report = json_to_config(&mut store, json).unwrap();
        assert_eq!(
            report,
            ImportReport {
                applied: 0,
                rejected: 6,
            }
        );
        assert_eq!(store.config(), &Configuration::default());
    }

    #[test]
    fn test_malformed_document_touches_nothing() {
        let mut store = store();
        store.storage_mut().reset_write_count();

        assert_eq!(
            json_to_config(&mut store, br#"{"views":[{"enable":"Enabled"}"#),
            Err(JsonError::Parse)
        );
        assert_eq!(
            json_to_config(&mut store, b"[1, 2]"),
            Err(JsonError::NotAnObject)
        );
        assert_eq!(store.storage().write_count(), 0);
    }

    #[test]
    fn test_foreign_storage_rejects_every_field() {
        let mut image = [0u8; 1024];
        image.copy_from_slice(store().into_storage().as_bytes());
        image[GENERAL_BASE as usize] = EE_VERSION + 1;
        let (mut store, _) = SettingsStore::load(MemoryEeprom::from_image(image));

        let json = br#"{"views":[{"num_gauges":1,"gauge":[{"pid":12}]}]}"#;
        let report = json_to_config(&mut store, json).unwrap();
        assert_eq!(
            report,
            ImportReport {
                applied: 0,
                rejected: 2,
            }
        );
        assert_eq!(store.storage().as_bytes(), &image[..]);
        assert_eq!(store.config(), &Configuration::default());
    }

    #[test]
    fn test_gauge_fields_checked_per_view() {
        let mut store = store();
        let json = br#"{"views":[{},{"gauge":[{"theme":"Radial"},{},{},{"pid":12}]}]}"#;

        let report = json_to_config(&mut store, json).unwrap();
        assert_eq!(
            report,
            ImportReport {
                applied: 1,
                rejected: 1,
            }
        );
        assert_eq!(store.get_view_gauge_theme(1, 0), Ok(GaugeTheme::Radial));
        assert_eq!(store.get_view_gauge_theme(0, 0), Ok(GaugeTheme::StockSt));
    }

    proptest! {
        #[test]
        fn prop_alert_round_trip(
            idx in 0usize..5,
            pid in 0u32..u32::MAX,
            quarters in -40_000i32..40_000,
            message in "[A-Z ]{0,63}",
            compare in 0u8..6,
        ) {
            let mut source = store();
            let idx = idx as u8;
            source
                .set_alert_enable(idx, EnableState::Enabled, true)
                .unwrap();
            source.set_alert_pid(idx, pid, true).unwrap();
            source
                .set_alert_threshold(idx, quarters as f32 / 4.0, true)
                .unwrap();
            source.set_alert_message(idx, &message, true).unwrap();
            source
                .set_alert_compare(idx, Comparison::from_u8(compare), true)
                .unwrap();

            let json = config_to_string(source.config()).unwrap();
            let mut target = store();
            let report = json_to_config(&mut target, json.as_bytes()).unwrap();
            prop_assert_eq!(report.rejected, 0);
            prop_assert_eq!(target.config(), source.config());
        }
    }
}
