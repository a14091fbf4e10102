//! Settings store
//!
//! Owns the in-memory mirror of the configuration and the storage it
//! persists to. Every field has a `get_*` / `set_*` pair; setters verify
//! first and touch nothing on failure.
//!
//! ```
//! use digidash_core::config::{EnableState, SettingsStore, ConfigError, MAX_VIEWS};
//! use digidash_hal::MemoryEeprom;
//!
//! let mut store = SettingsStore::new(MemoryEeprom::<1024>::new());
//!
//! store.set_view_enable(1, EnableState::Enabled, true).unwrap();
//! assert_eq!(store.get_view_enable(1), Ok(EnableState::Enabled));
//!
//! assert_eq!(
//!     store.set_view_enable(MAX_VIEWS as u8, EnableState::Enabled, true),
//!     Err(ConfigError::IndexOutOfBounds)
//! );
//! ```

use digidash_hal::Eeprom;

use super::address::{
    AlertField, DynamicField, FieldKey, GaugeField, GeneralField, Slot, ViewField, MAX_FIELD_WIDTH,
};
use super::codec::{encode_field, FieldCodec};
use super::enums::{Comparison, DynamicPriority, EnableState, GaugeTheme, PidUnits, ViewBackground};
use super::error::ConfigError;
use super::types::{
    Alert, AlertMessage, Configuration, DynamicRule, Gauge, General, View, ALERT_MESSAGE_LEN,
    EE_VERSION,
};
use super::verify::*;

/// Typed settings store over an EEPROM
///
/// `save = true` on a setter writes the field through to storage;
/// `save = false` only changes the mirror, so a UI can preview edits and
/// later [`commit`](Self::commit) or [`discard`](Self::discard) them.
///
/// The store does no locking; a multi-threaded host must serialize all
/// mutation behind one lock.
pub struct SettingsStore<S> {
    pub(crate) storage: S,
    pub(crate) config: Configuration,
    /// Version found in storage when it holds a layout we do not own
    pub(crate) foreign_version: Option<u8>,
}

impl<S: Eeprom> SettingsStore<S> {
    /// Create a store holding the factory defaults
    ///
    /// Storage is not read; call [`load_settings`](Self::load_settings)
    /// or use [`SettingsStore::load`] to pick up persisted values.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            config: Configuration::default(),
            foreign_version: None,
        }
    }

    /// Current mirror
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Layout version of foreign storage, if the last load found one
    ///
    /// While set, setters refuse `save = true` with
    /// [`ConfigError::VersionMismatch`] so the foreign bytes survive for a
    /// migration. [`commit`](Self::commit) or [`format`](Self::format)
    /// take the storage over and clear it.
    pub fn foreign_version(&self) -> Option<u8> {
        self.foreign_version
    }

    /// Underlying storage
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutable access to the underlying storage
    ///
    /// Writes made here bypass the mirror until the next reload.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Consume the store and return the storage
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Write the entire mirror through to storage
    ///
    /// Bytes that already hold the right value are skipped. General
    /// records go last, so an interrupted commit of a fresh layout still
    /// reads back as blank. Returns the number of bytes written.
    pub fn commit(&mut self) -> usize {
        let mut written = 0;
        let (storage, config) = (&mut self.storage, &self.config);

        let mut write_key = |key: FieldKey| {
            if let Ok(slot) = key.resolve() {
                let mut buffer = [0u8; MAX_FIELD_WIDTH];
                let bytes = &mut buffer[..slot.width as usize];
                if encode_field(config, key, bytes).is_ok() {
                    written += storage.update_from(slot.offset, bytes);
                }
            }
        };

        FieldKey::for_each(|key| {
            if !matches!(key, FieldKey::General { .. }) {
                write_key(key);
            }
        });
        FieldKey::for_each(|key| {
            if matches!(key, FieldKey::General { .. }) {
                write_key(key);
            }
        });

        if let Some(found) = self.foreign_version.take() {
            info!("layout version {} replaced by {}", found, EE_VERSION);
        }
        debug!("commit wrote {} bytes", written);
        written
    }

    /// Drop unsaved edits by reloading the mirror from storage
    pub fn discard(&mut self) -> super::loader::LoadReport {
        self.load_settings()
    }

    /// Reset the mirror to factory defaults, writing through if `save`
    pub fn restore_defaults(&mut self, save: bool) {
        self.config = Configuration::default();
        if save {
            self.commit();
        }
        info!("settings restored to defaults (saved: {})", save);
    }

    /// Resolve `key`, check `valid`, then check storage may be written
    ///
    /// The index check comes first.
    fn admit(&self, key: FieldKey, valid: bool, save: bool) -> Result<Slot, ConfigError> {
        let checked = key.resolve().and_then(|slot| {
            if !valid {
                Err(ConfigError::OutOfRange)
            } else if save && self.foreign_version.is_some() {
                Err(ConfigError::VersionMismatch)
            } else {
                Ok(slot)
            }
        });
        if let Err(e) = checked {
            debug!("rejected write to {:?}: {:?}", key, e);
        }
        checked
    }

    /// Persist an accepted value when `save` is set
    fn write_through<T: FieldCodec>(&mut self, slot: Slot, value: &T, save: bool) {
        if !save {
            return;
        }
        let mut buffer = [0u8; MAX_FIELD_WIDTH];
        let bytes = &mut buffer[..slot.width as usize];
        value.encode(bytes);
        let written = self.storage.update_from(slot.offset, bytes);
        trace!("saved {} bytes at {:#x}", written, slot.offset);
    }

    fn view(&self, idx_view: u8) -> Result<&View, ConfigError> {
        self.config
            .views
            .get(idx_view as usize)
            .ok_or(ConfigError::IndexOutOfBounds)
    }

    fn view_mut(&mut self, idx_view: u8) -> Result<&mut View, ConfigError> {
        self.config
            .views
            .get_mut(idx_view as usize)
            .ok_or(ConfigError::IndexOutOfBounds)
    }

    fn gauge(&self, idx_view: u8, idx_gauge: u8) -> Result<&Gauge, ConfigError> {
        self.view(idx_view)?
            .gauges
            .get(idx_gauge as usize)
            .ok_or(ConfigError::IndexOutOfBounds)
    }

    fn gauge_mut(&mut self, idx_view: u8, idx_gauge: u8) -> Result<&mut Gauge, ConfigError> {
        self.view_mut(idx_view)?
            .gauges
            .get_mut(idx_gauge as usize)
            .ok_or(ConfigError::IndexOutOfBounds)
    }

    fn alert(&self, idx_alert: u8) -> Result<&Alert, ConfigError> {
        self.config
            .alerts
            .get(idx_alert as usize)
            .ok_or(ConfigError::IndexOutOfBounds)
    }

    fn alert_mut(&mut self, idx_alert: u8) -> Result<&mut Alert, ConfigError> {
        self.config
            .alerts
            .get_mut(idx_alert as usize)
            .ok_or(ConfigError::IndexOutOfBounds)
    }

    fn dynamic(&self, idx_dynamic: u8) -> Result<&DynamicRule, ConfigError> {
        self.config
            .dynamics
            .get(idx_dynamic as usize)
            .ok_or(ConfigError::IndexOutOfBounds)
    }

    fn dynamic_mut(&mut self, idx_dynamic: u8) -> Result<&mut DynamicRule, ConfigError> {
        self.config
            .dynamics
            .get_mut(idx_dynamic as usize)
            .ok_or(ConfigError::IndexOutOfBounds)
    }

    fn general(&self, idx_general: u8) -> Result<&General, ConfigError> {
        self.config
            .general
            .get(idx_general as usize)
            .ok_or(ConfigError::IndexOutOfBounds)
    }

    fn general_mut(&mut self, idx_general: u8) -> Result<&mut General, ConfigError> {
        self.config
            .general
            .get_mut(idx_general as usize)
            .ok_or(ConfigError::IndexOutOfBounds)
    }

    // ---------------------------------------------------------------------
    // View
    // ---------------------------------------------------------------------

    pub fn get_view_enable(&self, idx_view: u8) -> Result<EnableState, ConfigError> {
        Ok(self.view(idx_view)?.enabled)
    }

    pub fn set_view_enable(
        &mut self,
        idx_view: u8,
        enable: EnableState,
        save: bool,
    ) -> Result<(), ConfigError> {
        let key = FieldKey::View {
            idx: idx_view,
            field: ViewField::Enable,
        };
        let slot = self.admit(key, verify_view_enable(enable), save)?;
        self.view_mut(idx_view)?.enabled = enable;
        self.write_through(slot, &enable, save);
        Ok(())
    }

    pub fn get_view_num_gauges(&self, idx_view: u8) -> Result<u8, ConfigError> {
        Ok(self.view(idx_view)?.num_gauges)
    }

    pub fn set_view_num_gauges(
        &mut self,
        idx_view: u8,
        num_gauges: u8,
        save: bool,
    ) -> Result<(), ConfigError> {
        let key = FieldKey::View {
            idx: idx_view,
            field: ViewField::NumGauges,
        };
        let slot = self.admit(key, verify_view_num_gauges(num_gauges), save)?;
        self.view_mut(idx_view)?.num_gauges = num_gauges;
        self.write_through(slot, &num_gauges, save);
        Ok(())
    }

    pub fn get_view_background(&self, idx_view: u8) -> Result<ViewBackground, ConfigError> {
        Ok(self.view(idx_view)?.background)
    }

    pub fn set_view_background(
        &mut self,
        idx_view: u8,
        background: ViewBackground,
        save: bool,
    ) -> Result<(), ConfigError> {
        let key = FieldKey::View {
            idx: idx_view,
            field: ViewField::Background,
        };
        let slot = self.admit(key, verify_view_background(background), save)?;
        self.view_mut(idx_view)?.background = background;
        self.write_through(slot, &background, save);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Gauge
    // ---------------------------------------------------------------------

    pub fn get_view_gauge_theme(
        &self,
        idx_view: u8,
        idx_gauge: u8,
    ) -> Result<GaugeTheme, ConfigError> {
        Ok(self.gauge(idx_view, idx_gauge)?.theme)
    }

    pub fn set_view_gauge_theme(
        &mut self,
        idx_view: u8,
        idx_gauge: u8,
        theme: GaugeTheme,
        save: bool,
    ) -> Result<(), ConfigError> {
        let key = FieldKey::Gauge {
            view: idx_view,
            gauge: idx_gauge,
            field: GaugeField::Theme,
        };
        let slot = self.admit(key, verify_view_gauge_theme(theme), save)?;
        self.gauge_mut(idx_view, idx_gauge)?.theme = theme;
        self.write_through(slot, &theme, save);
        Ok(())
    }

    pub fn get_view_gauge_pid(&self, idx_view: u8, idx_gauge: u8) -> Result<u32, ConfigError> {
        Ok(self.gauge(idx_view, idx_gauge)?.pid)
    }

    pub fn set_view_gauge_pid(
        &mut self,
        idx_view: u8,
        idx_gauge: u8,
        pid: u32,
        save: bool,
    ) -> Result<(), ConfigError> {
        let key = FieldKey::Gauge {
            view: idx_view,
            gauge: idx_gauge,
            field: GaugeField::Pid,
        };
        let slot = self.admit(key, verify_view_gauge_pid(pid), save)?;
        self.gauge_mut(idx_view, idx_gauge)?.pid = pid;
        self.write_through(slot, &pid, save);
        Ok(())
    }

    pub fn get_view_gauge_units(
        &self,
        idx_view: u8,
        idx_gauge: u8,
    ) -> Result<PidUnits, ConfigError> {
        Ok(self.gauge(idx_view, idx_gauge)?.units)
    }

    pub fn set_view_gauge_units(
        &mut self,
        idx_view: u8,
        idx_gauge: u8,
        units: PidUnits,
        save: bool,
    ) -> Result<(), ConfigError> {
        let key = FieldKey::Gauge {
            view: idx_view,
            gauge: idx_gauge,
            field: GaugeField::Units,
        };
        let slot = self.admit(key, verify_view_gauge_units(units), save)?;
        self.gauge_mut(idx_view, idx_gauge)?.units = units;
        self.write_through(slot, &units, save);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Alert
    // ---------------------------------------------------------------------

    pub fn get_alert_enable(&self, idx_alert: u8) -> Result<EnableState, ConfigError> {
        Ok(self.alert(idx_alert)?.enabled)
    }

    pub fn set_alert_enable(
        &mut self,
        idx_alert: u8,
        enable: EnableState,
        save: bool,
    ) -> Result<(), ConfigError> {
        let key = FieldKey::Alert {
            idx: idx_alert,
            field: AlertField::Enable,
        };
        let slot = self.admit(key, verify_alert_enable(enable), save)?;
        self.alert_mut(idx_alert)?.enabled = enable;
        self.write_through(slot, &enable, save);
        Ok(())
    }

    pub fn get_alert_pid(&self, idx_alert: u8) -> Result<u32, ConfigError> {
        Ok(self.alert(idx_alert)?.pid)
    }

    pub fn set_alert_pid(
        &mut self,
        idx_alert: u8,
        pid: u32,
        save: bool,
    ) -> Result<(), ConfigError> {
        let key = FieldKey::Alert {
            idx: idx_alert,
            field: AlertField::Pid,
        };
        let slot = self.admit(key, verify_alert_pid(pid), save)?;
        self.alert_mut(idx_alert)?.pid = pid;
        self.write_through(slot, &pid, save);
        Ok(())
    }

    pub fn get_alert_units(&self, idx_alert: u8) -> Result<PidUnits, ConfigError> {
        Ok(self.alert(idx_alert)?.units)
    }

    pub fn set_alert_units(
        &mut self,
        idx_alert: u8,
        units: PidUnits,
        save: bool,
    ) -> Result<(), ConfigError> {
        let key = FieldKey::Alert {
            idx: idx_alert,
            field: AlertField::Units,
        };
        let slot = self.admit(key, verify_alert_units(units), save)?;
        self.alert_mut(idx_alert)?.units = units;
        self.write_through(slot, &units, save);
        Ok(())
    }

    pub fn get_alert_message(&self, idx_alert: u8) -> Result<&str, ConfigError> {
        Ok(self.alert(idx_alert)?.message.as_str())
    }

    /// Copy an alert message into a zero-terminated buffer
    ///
    /// The bytes after the text are zeroed. Returns the text length.
    pub fn copy_alert_message(
        &self,
        idx_alert: u8,
        buffer: &mut [u8; ALERT_MESSAGE_LEN],
    ) -> Result<usize, ConfigError> {
        let message = &self.alert(idx_alert)?.message;
        message.encode(buffer);
        Ok(message.len())
    }

    pub fn set_alert_message(
        &mut self,
        idx_alert: u8,
        message: &str,
        save: bool,
    ) -> Result<(), ConfigError> {
        let key = FieldKey::Alert {
            idx: idx_alert,
            field: AlertField::Message,
        };
        let slot = self.admit(key, verify_alert_message(message), save)?;

        let mut text = AlertMessage::new();
        text.push_str(message).map_err(|_| ConfigError::OutOfRange)?;

        self.write_through(slot, &text, save);
        self.alert_mut(idx_alert)?.message = text;
        Ok(())
    }

    pub fn get_alert_compare(&self, idx_alert: u8) -> Result<Comparison, ConfigError> {
        Ok(self.alert(idx_alert)?.compare)
    }

    pub fn set_alert_compare(
        &mut self,
        idx_alert: u8,
        compare: Comparison,
        save: bool,
    ) -> Result<(), ConfigError> {
        let key = FieldKey::Alert {
            idx: idx_alert,
            field: AlertField::Compare,
        };
        let slot = self.admit(key, verify_alert_compare(compare), save)?;
        self.alert_mut(idx_alert)?.compare = compare;
        self.write_through(slot, &compare, save);
        Ok(())
    }

    pub fn get_alert_threshold(&self, idx_alert: u8) -> Result<f32, ConfigError> {
        Ok(self.alert(idx_alert)?.threshold)
    }

    pub fn set_alert_threshold(
        &mut self,
        idx_alert: u8,
        threshold: f32,
        save: bool,
    ) -> Result<(), ConfigError> {
        let key = FieldKey::Alert {
            idx: idx_alert,
            field: AlertField::Threshold,
        };
        let slot = self.admit(key, verify_alert_threshold(threshold), save)?;
        self.alert_mut(idx_alert)?.threshold = threshold;
        self.write_through(slot, &threshold, save);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Dynamic
    // ---------------------------------------------------------------------

    pub fn get_dynamic_enable(&self, idx_dynamic: u8) -> Result<EnableState, ConfigError> {
        Ok(self.dynamic(idx_dynamic)?.enabled)
    }

    pub fn set_dynamic_enable(
        &mut self,
        idx_dynamic: u8,
        enable: EnableState,
        save: bool,
    ) -> Result<(), ConfigError> {
        let key = FieldKey::Dynamic {
            idx: idx_dynamic,
            field: DynamicField::Enable,
        };
        let slot = self.admit(key, verify_dynamic_enable(enable), save)?;
        self.dynamic_mut(idx_dynamic)?.enabled = enable;
        self.write_through(slot, &enable, save);
        Ok(())
    }

    pub fn get_dynamic_priority(&self, idx_dynamic: u8) -> Result<DynamicPriority, ConfigError> {
        Ok(self.dynamic(idx_dynamic)?.priority)
    }

    pub fn set_dynamic_priority(
        &mut self,
        idx_dynamic: u8,
        priority: DynamicPriority,
        save: bool,
    ) -> Result<(), ConfigError> {
        let key = FieldKey::Dynamic {
            idx: idx_dynamic,
            field: DynamicField::Priority,
        };
        let slot = self.admit(key, verify_dynamic_priority(priority), save)?;
        self.dynamic_mut(idx_dynamic)?.priority = priority;
        self.write_through(slot, &priority, save);
        Ok(())
    }

    pub fn get_dynamic_compare(&self, idx_dynamic: u8) -> Result<Comparison, ConfigError> {
        Ok(self.dynamic(idx_dynamic)?.compare)
    }

    pub fn set_dynamic_compare(
        &mut self,
        idx_dynamic: u8,
        compare: Comparison,
        save: bool,
    ) -> Result<(), ConfigError> {
        let key = FieldKey::Dynamic {
            idx: idx_dynamic,
            field: DynamicField::Compare,
        };
        let slot = self.admit(key, verify_dynamic_compare(compare), save)?;
        self.dynamic_mut(idx_dynamic)?.compare = compare;
        self.write_through(slot, &compare, save);
        Ok(())
    }

    pub fn get_dynamic_threshold(&self, idx_dynamic: u8) -> Result<f32, ConfigError> {
        Ok(self.dynamic(idx_dynamic)?.threshold)
    }

    pub fn set_dynamic_threshold(
        &mut self,
        idx_dynamic: u8,
        threshold: f32,
        save: bool,
    ) -> Result<(), ConfigError> {
        let key = FieldKey::Dynamic {
            idx: idx_dynamic,
            field: DynamicField::Threshold,
        };
        let slot = self.admit(key, verify_dynamic_threshold(threshold), save)?;
        self.dynamic_mut(idx_dynamic)?.threshold = threshold;
        self.write_through(slot, &threshold, save);
        Ok(())
    }

    /// View shown when this rule wins
    pub fn get_dynamic_index(&self, idx_dynamic: u8) -> Result<u8, ConfigError> {
        Ok(self.dynamic(idx_dynamic)?.view_index)
    }

    pub fn set_dynamic_index(
        &mut self,
        idx_dynamic: u8,
        index: u8,
        save: bool,
    ) -> Result<(), ConfigError> {
        let key = FieldKey::Dynamic {
            idx: idx_dynamic,
            field: DynamicField::ViewIndex,
        };
        let slot = self.admit(key, verify_dynamic_index(index), save)?;
        self.dynamic_mut(idx_dynamic)?.view_index = index;
        self.write_through(slot, &index, save);
        Ok(())
    }

    pub fn get_dynamic_pid(&self, idx_dynamic: u8) -> Result<u32, ConfigError> {
        Ok(self.dynamic(idx_dynamic)?.pid)
    }

    pub fn set_dynamic_pid(
        &mut self,
        idx_dynamic: u8,
        pid: u32,
        save: bool,
    ) -> Result<(), ConfigError> {
        let key = FieldKey::Dynamic {
            idx: idx_dynamic,
            field: DynamicField::Pid,
        };
        let slot = self.admit(key, verify_dynamic_pid(pid), save)?;
        self.dynamic_mut(idx_dynamic)?.pid = pid;
        self.write_through(slot, &pid, save);
        Ok(())
    }

    pub fn get_dynamic_units(&self, idx_dynamic: u8) -> Result<PidUnits, ConfigError> {
        Ok(self.dynamic(idx_dynamic)?.units)
    }

    pub fn set_dynamic_units(
        &mut self,
        idx_dynamic: u8,
        units: PidUnits,
        save: bool,
    ) -> Result<(), ConfigError> {
        let key = FieldKey::Dynamic {
            idx: idx_dynamic,
            field: DynamicField::Units,
        };
        let slot = self.admit(key, verify_dynamic_units(units), save)?;
        self.dynamic_mut(idx_dynamic)?.units = units;
        self.write_through(slot, &units, save);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // General
    // ---------------------------------------------------------------------

    pub fn get_general_ee_version(&self, idx_general: u8) -> Result<u8, ConfigError> {
        Ok(self.general(idx_general)?.ee_version)
    }

    pub fn set_general_ee_version(
        &mut self,
        idx_general: u8,
        version: u8,
        save: bool,
    ) -> Result<(), ConfigError> {
        let key = FieldKey::General {
            idx: idx_general,
            field: GeneralField::EeVersion,
        };
        let slot = self.admit(key, verify_general_ee_version(version), save)?;
        self.general_mut(idx_general)?.ee_version = version;
        self.write_through(slot, &version, save);
        Ok(())
    }
}
