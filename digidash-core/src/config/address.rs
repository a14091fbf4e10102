//! EEPROM address map
//!
//! Every field instance owns a fixed byte range. The table below is the
//! layout for [`EE_VERSION`](super::EE_VERSION); fields may only ever be
//! appended into reserved space, never moved, or existing devices would
//! read garbage after an update.
//!
//! ```text
//! 0x000 ┌──────────────────────┐
//!       │ general[1]  16 B     │  ee_version
//! 0x010 ├──────────────────────┤
//!       │ views[3]    32 B ea. │  enable, num_gauges, background, gauges[3] × 8 B
//! 0x070 ├──────────────────────┤
//!       │ alerts[5]   80 B ea. │  enable, compare, units, pid, threshold, message[64]
//! 0x200 ├──────────────────────┤
//!       │ dynamics[2] 16 B ea. │  enable, priority, compare, index, units, pid, threshold
//! 0x220 ├──────────────────────┤
//!       │ free                 │
//! 0x400 └──────────────────────┘
//! ```
//!
//! Multi-byte values are little-endian.

use super::error::ConfigError;
use super::types::{
    ALERT_MESSAGE_LEN, GAUGES_PER_VIEW, MAX_ALERTS, MAX_DYNAMICS, MAX_GENERALS, MAX_VIEWS,
};

/// Size of the settings EEPROM
pub const EEPROM_SIZE: u16 = 0x400;

pub const GENERAL_BASE: u16 = 0x000;
pub const GENERAL_STRIDE: u16 = 16;

pub const VIEW_BASE: u16 = 0x010;
pub const VIEW_STRIDE: u16 = 32;

/// Gauge records start this far into their view's record
pub const GAUGE_BASE: u16 = 4;
pub const GAUGE_STRIDE: u16 = 8;

pub const ALERT_BASE: u16 = 0x070;
pub const ALERT_STRIDE: u16 = 80;

pub const DYNAMIC_BASE: u16 = 0x200;
pub const DYNAMIC_STRIDE: u16 = 16;

/// Widest field in the map
pub const MAX_FIELD_WIDTH: usize = ALERT_MESSAGE_LEN;

const GENERAL_END: u16 = GENERAL_BASE + GENERAL_STRIDE * MAX_GENERALS as u16;
const GAUGE_END: u16 = GAUGE_BASE + GAUGE_STRIDE * GAUGES_PER_VIEW as u16;
const VIEW_END: u16 = VIEW_BASE + VIEW_STRIDE * MAX_VIEWS as u16;
const ALERT_END: u16 = ALERT_BASE + ALERT_STRIDE * MAX_ALERTS as u16;
const DYNAMIC_END: u16 = DYNAMIC_BASE + DYNAMIC_STRIDE * MAX_DYNAMICS as u16;

// Regions must not run into each other or off the end of the device
const _: () = assert!(GENERAL_END <= VIEW_BASE);
const _: () = assert!(GAUGE_END <= VIEW_STRIDE);
const _: () = assert!(VIEW_END <= ALERT_BASE);
const _: () = assert!(ALERT_END <= DYNAMIC_BASE);
const _: () = assert!(DYNAMIC_END <= EEPROM_SIZE);

/// Byte range of one field instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Slot {
    /// First byte
    pub offset: u16,
    /// Number of bytes
    pub width: u16,
}

impl Slot {
    /// One past the last byte
    pub const fn end(&self) -> u16 {
        self.offset + self.width
    }

    /// Check whether two slots share any byte
    pub const fn overlaps(&self, other: &Slot) -> bool {
        self.offset < other.end() && other.offset < self.end()
    }
}

/// Fields of a general record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GeneralField {
    EeVersion,
}

impl GeneralField {
    pub const ALL: [GeneralField; 1] = [GeneralField::EeVersion];

    const fn layout(self) -> (u16, u16) {
        match self {
            GeneralField::EeVersion => (0, 1),
        }
    }
}

/// Fields of a view record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ViewField {
    Enable,
    NumGauges,
    Background,
}

impl ViewField {
    pub const ALL: [ViewField; 3] = [
        ViewField::Enable,
        ViewField::NumGauges,
        ViewField::Background,
    ];

    const fn layout(self) -> (u16, u16) {
        match self {
            ViewField::Enable => (0, 1),
            ViewField::NumGauges => (1, 1),
            ViewField::Background => (2, 1),
        }
    }
}

/// Fields of a gauge record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GaugeField {
    Theme,
    Units,
    Pid,
}

impl GaugeField {
    pub const ALL: [GaugeField; 3] = [GaugeField::Theme, GaugeField::Units, GaugeField::Pid];

    const fn layout(self) -> (u16, u16) {
        match self {
            GaugeField::Theme => (0, 1),
            GaugeField::Units => (1, 1),
            GaugeField::Pid => (4, 4),
        }
    }
}

/// Fields of an alert record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertField {
    Enable,
    Compare,
    Units,
    Pid,
    Threshold,
    Message,
}

impl AlertField {
    pub const ALL: [AlertField; 6] = [
        AlertField::Enable,
        AlertField::Compare,
        AlertField::Units,
        AlertField::Pid,
        AlertField::Threshold,
        AlertField::Message,
    ];

    const fn layout(self) -> (u16, u16) {
        match self {
            AlertField::Enable => (0, 1),
            AlertField::Compare => (1, 1),
            AlertField::Units => (2, 1),
            AlertField::Pid => (4, 4),
            AlertField::Threshold => (8, 4),
            AlertField::Message => (12, ALERT_MESSAGE_LEN as u16),
        }
    }
}

/// Fields of a dynamic rule record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DynamicField {
    Enable,
    Priority,
    Compare,
    ViewIndex,
    Units,
    Pid,
    Threshold,
}

impl DynamicField {
    pub const ALL: [DynamicField; 7] = [
        DynamicField::Enable,
        DynamicField::Priority,
        DynamicField::Compare,
        DynamicField::ViewIndex,
        DynamicField::Units,
        DynamicField::Pid,
        DynamicField::Threshold,
    ];

    const fn layout(self) -> (u16, u16) {
        match self {
            DynamicField::Enable => (0, 1),
            DynamicField::Priority => (1, 1),
            DynamicField::Compare => (2, 1),
            DynamicField::ViewIndex => (3, 1),
            DynamicField::Units => (4, 1),
            DynamicField::Pid => (8, 4),
            DynamicField::Threshold => (12, 4),
        }
    }
}

/// A field instance: which field, of which entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FieldKey {
    General { idx: u8, field: GeneralField },
    View { idx: u8, field: ViewField },
    Gauge {
        view: u8,
        gauge: u8,
        field: GaugeField,
    },
    Alert { idx: u8, field: AlertField },
    Dynamic { idx: u8, field: DynamicField },
}

/// Reject an index at or beyond `capacity`
pub(crate) fn check_index(idx: u8, capacity: usize) -> Result<u16, ConfigError> {
    if (idx as usize) < capacity {
        Ok(idx as u16)
    } else {
        Err(ConfigError::IndexOutOfBounds)
    }
}

impl FieldKey {
    /// Resolve to a byte range, bounds-checking every index
    pub fn resolve(self) -> Result<Slot, ConfigError> {
        let (base, (offset, width)) = match self {
            FieldKey::General { idx, field } => {
                let idx = check_index(idx, MAX_GENERALS)?;
                (GENERAL_BASE + idx * GENERAL_STRIDE, field.layout())
            }
            FieldKey::View { idx, field } => {
                let idx = check_index(idx, MAX_VIEWS)?;
                (VIEW_BASE + idx * VIEW_STRIDE, field.layout())
            }
            FieldKey::Gauge { view, gauge, field } => {
                let view = check_index(view, MAX_VIEWS)?;
                let gauge = check_index(gauge, GAUGES_PER_VIEW)?;
                (
                    VIEW_BASE + view * VIEW_STRIDE + GAUGE_BASE + gauge * GAUGE_STRIDE,
                    field.layout(),
                )
            }
            FieldKey::Alert { idx, field } => {
                let idx = check_index(idx, MAX_ALERTS)?;
                (ALERT_BASE + idx * ALERT_STRIDE, field.layout())
            }
            FieldKey::Dynamic { idx, field } => {
                let idx = check_index(idx, MAX_DYNAMICS)?;
                (DYNAMIC_BASE + idx * DYNAMIC_STRIDE, field.layout())
            }
        };

        Ok(Slot {
            offset: base + offset,
            width,
        })
    }

    /// Visit every field instance of the schema, general records first
    pub fn for_each(mut visit: impl FnMut(FieldKey)) {
        for idx in 0..MAX_GENERALS as u8 {
            for field in GeneralField::ALL {
                visit(FieldKey::General { idx, field });
            }
        }
        for idx in 0..MAX_VIEWS as u8 {
            for field in ViewField::ALL {
                visit(FieldKey::View { idx, field });
            }
            for gauge in 0..GAUGES_PER_VIEW as u8 {
                for field in GaugeField::ALL {
                    visit(FieldKey::Gauge {
                        view: idx,
                        gauge,
                        field,
                    });
                }
            }
        }
        for idx in 0..MAX_ALERTS as u8 {
            for field in AlertField::ALL {
                visit(FieldKey::Alert { idx, field });
            }
        }
        for idx in 0..MAX_DYNAMICS as u8 {
            for field in DynamicField::ALL {
                visit(FieldKey::Dynamic { idx, field });
            }
        }
    }
}
