//! Settings persistence
//!
//! Loads the configuration mirror from EEPROM. Blank storage is formatted
//! with factory defaults; a foreign layout version falls back to defaults
//! without touching the stored bytes.

use digidash_hal::{Eeprom, ERASED_BYTE};

use super::address::{FieldKey, GeneralField, MAX_FIELD_WIDTH};
use super::codec::decode_field;
use super::store::SettingsStore;
use super::types::{Configuration, EE_VERSION};

/// What the loader found in storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadOutcome {
    /// Stored layout matched and was read field by field
    Loaded,
    /// Storage was erased and has been formatted with defaults
    Blank,
    /// Stored layout version is not ours; defaults are in use
    VersionMismatch { found: u8 },
}

/// Result of a load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoadReport {
    pub outcome: LoadOutcome,
    /// Fields whose stored bytes were invalid and replaced by defaults
    pub repaired: u16,
}

impl<S: Eeprom> SettingsStore<S> {
    /// Build a store and load it from `storage`
    pub fn load(storage: S) -> (Self, LoadReport) {
        let mut store = Self::new(storage);
        let report = store.load_settings();
        (store, report)
    }

    /// Reload the mirror from storage
    ///
    /// Repaired fields are fixed in the mirror only; storage keeps the bad
    /// bytes until the field is next saved or the mirror is committed.
    ///
    /// On a version mismatch the store keeps the foreign bytes intact and
    /// refuses saves until [`format`](Self::format) or
    /// [`commit`](Self::commit) takes the storage over.
    pub fn load_settings(&mut self) -> LoadReport {
        info!("loading settings from eeprom...");

        let key = FieldKey::General {
            idx: 0,
            field: GeneralField::EeVersion,
        };
        let found = match key.resolve() {
            Ok(slot) => self.storage.read_byte(slot.offset),
            Err(_) => ERASED_BYTE,
        };

        if found == ERASED_BYTE {
            info!("eeprom is blank, formatting with defaults");
            self.format();
            return LoadReport {
                outcome: LoadOutcome::Blank,
                repaired: 0,
            };
        }

        if found != EE_VERSION {
            warn!(
                "eeprom layout version mismatch: found {}, expected {}",
                found, EE_VERSION
            );
            self.config = Configuration::default();
            self.foreign_version = Some(found);
            return LoadReport {
                outcome: LoadOutcome::VersionMismatch { found },
                repaired: 0,
            };
        }

        let mut config = Configuration::default();
        let mut repaired = 0u16;
        let storage = &mut self.storage;

        FieldKey::for_each(|key| {
            let Ok(slot) = key.resolve() else {
                return;
            };
            let mut buffer = [0u8; MAX_FIELD_WIDTH];
            let bytes = &mut buffer[..slot.width as usize];
            storage.read_into(slot.offset, bytes);

            if let Ok(true) = decode_field(&mut config, key, bytes) {
                debug!("invalid stored value for {:?}, using default", key);
                repaired += 1;
            }
        });

        self.config = config;
        self.foreign_version = None;
        log_settings_summary(&self.config, repaired);

        LoadReport {
            outcome: LoadOutcome::Loaded,
            repaired,
        }
    }

    /// Write factory defaults to the mirror and storage
    ///
    /// The version byte lands last, so storage reads back as blank until
    /// the format has fully completed. Returns the number of bytes written.
    pub fn format(&mut self) -> usize {
        self.config = Configuration::default();
        let written = self.commit();
        info!("formatted eeprom ({} bytes written)", written);
        written
    }
}

fn log_settings_summary(config: &Configuration, repaired: u16) {
    info!("settings loaded (layout version {})", config.ee_version());
    let alerts = config
        .alerts
        .iter()
        .filter(|a| a.enabled.is_enabled())
        .count();
    let dynamics = config
        .dynamics
        .iter()
        .filter(|d| d.enabled.is_enabled())
        .count();
    debug!("  {} views enabled", config.enabled_views());
    debug!("  {} alerts enabled", alerts);
    debug!("  {} dynamic rules enabled", dynamics);
    if repaired > 0 {
        info!("  {} fields repaired", repaired);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::address::{ViewField, GENERAL_BASE};
    use crate::config::enums::{Comparison, EnableState, PidUnits, ViewBackground};
    use crate::config::ConfigError;
    use digidash_hal::MemoryEeprom;

    type Storage = MemoryEeprom<1024>;

    fn formatted() -> Storage {
        let (store, _) = SettingsStore::load(Storage::new());
        store.into_storage()
    }

    fn formatted_image() -> [u8; 1024] {
        let mut image = [0u8; 1024];
        image.copy_from_slice(formatted().as_bytes());
        image
    }

    #[test]
    fn test_blank_storage_is_formatted() {
        let (store, report) = SettingsStore::load(Storage::new());
        assert_eq!(report.outcome, LoadOutcome::Blank);
        assert_eq!(store.config(), &Configuration::default());
        assert_eq!(store.storage().peek(GENERAL_BASE), EE_VERSION);

        let (reloaded, report) = SettingsStore::load(store.into_storage());
        assert_eq!(
            report,
            LoadReport {
                outcome: LoadOutcome::Loaded,
                repaired: 0,
            }
        );
        assert_eq!(reloaded.config(), &Configuration::default());
    }

    #[test]
    fn test_version_mismatch_keeps_storage() {
        let mut image = formatted_image();
        image[GENERAL_BASE as usize] = EE_VERSION + 1;

        let (store, report) = SettingsStore::load(Storage::from_image(image));
        assert_eq!(
            report.outcome,
            LoadOutcome::VersionMismatch {
                found: EE_VERSION + 1
            }
        );
        assert_eq!(store.foreign_version(), Some(EE_VERSION + 1));
        assert_eq!(store.config(), &Configuration::default());
        assert_eq!(store.storage().as_bytes(), &image[..]);
        assert_eq!(store.storage().write_count(), 0);
    }

    #[test]
    fn test_version_mismatch_refuses_saves_until_commit() {
        let mut image = formatted_image();
        image[GENERAL_BASE as usize] = EE_VERSION + 1;
        let (mut store, _) = SettingsStore::load(Storage::from_image(image));

        assert_eq!(
            store.set_view_num_gauges(0, 1, true),
            Err(ConfigError::VersionMismatch)
        );
        assert_eq!(store.get_view_num_gauges(0), Ok(3));
        assert_eq!(store.storage().as_bytes(), &image[..]);

        // Mirror-only edits are still allowed
        store.set_view_num_gauges(0, 1, false).unwrap();
        assert_eq!(store.storage().write_count(), 0);

        store.commit();
        assert_eq!(store.foreign_version(), None);
        assert_eq!(store.storage().peek(GENERAL_BASE), EE_VERSION);
        store.set_alert_message(0, "SAVED", true).unwrap();

        let (reloaded, report) = SettingsStore::load(store.into_storage());
        assert_eq!(report.outcome, LoadOutcome::Loaded);
        assert_eq!(reloaded.get_view_num_gauges(0), Ok(1));
        assert_eq!(reloaded.get_alert_message(0), Ok("SAVED"));
    }

    #[test]
    fn test_format_takes_over_foreign_storage() {
        let mut image = formatted_image();
        image[GENERAL_BASE as usize] = EE_VERSION + 1;
        let (mut store, _) = SettingsStore::load(Storage::from_image(image));

        store.format();
        store
            .set_view_background(0, ViewBackground::Flare, true)
            .unwrap();

        let (reloaded, report) = SettingsStore::load(store.into_storage());
        assert_eq!(report.outcome, LoadOutcome::Loaded);
        assert_eq!(reloaded.get_view_background(0), Ok(ViewBackground::Flare));
    }

    #[test]
    fn test_saved_values_survive_reload() {
        let (mut store, _) = SettingsStore::load(Storage::new());
        store
            .set_alert_enable(2, EnableState::Enabled, true)
            .unwrap();
        store.set_alert_pid(2, 0x0001_0005, true).unwrap();
        store.set_alert_units(2, PidUnits::Celsius, true).unwrap();
        store
            .set_alert_compare(2, Comparison::GreaterThan, true)
            .unwrap();
        store.set_alert_threshold(2, 110.0, true).unwrap();
        store.set_alert_message(2, "OVERHEAT", true).unwrap();
        // Draft only, must not survive
        store
            .set_view_enable(2, EnableState::Enabled, false)
            .unwrap();

        let (reloaded, report) = SettingsStore::load(store.into_storage());
        assert_eq!(report.outcome, LoadOutcome::Loaded);
        assert_eq!(reloaded.get_alert_message(2), Ok("OVERHEAT"));
        assert_eq!(reloaded.get_alert_threshold(2), Ok(110.0));
        assert_eq!(reloaded.get_alert_compare(2), Ok(Comparison::GreaterThan));
        assert_eq!(reloaded.get_view_enable(2), Ok(EnableState::Disabled));
    }

    #[test]
    fn test_corrupted_field_repaired() {
        let slot = FieldKey::View {
            idx: 1,
            field: ViewField::Background,
        }
        .resolve()
        .unwrap();
        let mut image = formatted_image();
        image[slot.offset as usize] = 0x77;

        let (store, report) = SettingsStore::load(Storage::from_image(image));
        assert_eq!(report.outcome, LoadOutcome::Loaded);
        assert_eq!(report.repaired, 1);
        assert_eq!(store.get_view_background(1), Ok(ViewBackground::default()));
        assert_eq!(store.storage().peek(slot.offset), 0x77);
    }

    #[test]
    fn test_interrupted_format_reads_as_blank() {
        let mut storage = Storage::new();
        // Some records landed before power was lost, the version never did
        for address in 0x010..0x030 {
            storage.poke(address, 0x00);
        }

        let (store, report) = SettingsStore::load(storage);
        assert_eq!(report.outcome, LoadOutcome::Blank);
        assert_eq!(store.config(), &Configuration::default());
        assert_eq!(store.storage().peek(GENERAL_BASE), EE_VERSION);
    }

    #[test]
    fn test_discard_drops_draft_edits() {
        let (mut store, _) = SettingsStore::load(Storage::new());
        store.set_view_num_gauges(0, 1, false).unwrap();
        assert_eq!(store.get_view_num_gauges(0), Ok(1));

        let report = store.discard();
        assert_eq!(report.outcome, LoadOutcome::Loaded);
        assert_eq!(store.get_view_num_gauges(0), Ok(3));
    }
}
