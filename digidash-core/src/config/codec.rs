//! Field byte encoding
//!
//! Converts between mirror values and the raw bytes of their EEPROM slot.
//! Enums are one byte, `u32` and `f32` are four bytes little-endian, and
//! messages fill their whole buffer (payload, then zeros).

use super::address::{AlertField, DynamicField, FieldKey, GaugeField, GeneralField, ViewField};
use super::enums::{Comparison, DynamicPriority, EnableState, GaugeTheme, PidUnits, ViewBackground};
use super::error::ConfigError;
use super::types::{AlertMessage, Configuration, ALERT_MESSAGE_MAX};
use super::verify::*;

/// A value that lives in an EEPROM slot
pub trait FieldCodec: Sized {
    /// Write the value into `out`, which is exactly the slot width
    fn encode(&self, out: &mut [u8]);

    /// Read a value back
    ///
    /// Returns `None` only when the bytes cannot form a value of this type
    /// at all. Values outside the field's domain (an `Unset` enum, a NaN
    /// threshold) decode successfully and are caught by verification.
    fn decode(bytes: &[u8]) -> Option<Self>;
}

impl FieldCodec for u8 {
    fn encode(&self, out: &mut [u8]) {
        if let Some(byte) = out.first_mut() {
            *byte = *self;
        }
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        bytes.first().copied()
    }
}

impl FieldCodec for u32 {
    fn encode(&self, out: &mut [u8]) {
        if let Some(dst) = out.get_mut(..4) {
            dst.copy_from_slice(&self.to_le_bytes());
        }
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        let raw: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
        Some(u32::from_le_bytes(raw))
    }
}

impl FieldCodec for f32 {
    fn encode(&self, out: &mut [u8]) {
        self.to_bits().encode(out)
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        u32::decode(bytes).map(f32::from_bits)
    }
}

macro_rules! enum_codec {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FieldCodec for $ty {
                fn encode(&self, out: &mut [u8]) {
                    self.as_u8().encode(out)
                }

                fn decode(bytes: &[u8]) -> Option<Self> {
                    u8::decode(bytes).map(<$ty>::from_u8)
                }
            }
        )*
    };
}

enum_codec!(
    EnableState,
    ViewBackground,
    GaugeTheme,
    PidUnits,
    Comparison,
    DynamicPriority,
);

impl FieldCodec for AlertMessage {
    fn encode(&self, out: &mut [u8]) {
        out.fill(0);
        let len = self.len().min(out.len().saturating_sub(1));
        out[..len].copy_from_slice(&self.as_bytes()[..len]);
    }

    /// Text up to the first NUL, cut at [`ALERT_MESSAGE_MAX`] bytes when the
    /// terminator is missing. Invalid UTF-8 does not decode.
    fn decode(bytes: &[u8]) -> Option<Self> {
        let window = &bytes[..bytes.len().min(ALERT_MESSAGE_MAX)];
        let len = window.iter().position(|&b| b == 0).unwrap_or(window.len());
        let text = core::str::from_utf8(&window[..len]).ok()?;

        let mut message = AlertMessage::new();
        message.push_str(text).ok()?;
        Some(message)
    }
}

fn entry<T>(items: &[T], idx: u8) -> Result<&T, ConfigError> {
    items.get(idx as usize).ok_or(ConfigError::IndexOutOfBounds)
}

fn entry_mut<T>(items: &mut [T], idx: u8) -> Result<&mut T, ConfigError> {
    items
        .get_mut(idx as usize)
        .ok_or(ConfigError::IndexOutOfBounds)
}

/// Encode the mirror's value for `key` into `out`
pub fn encode_field(
    config: &Configuration,
    key: FieldKey,
    out: &mut [u8],
) -> Result<(), ConfigError> {
    match key {
        FieldKey::General { idx, field } => {
            let general = entry(&config.general, idx)?;
            match field {
                GeneralField::EeVersion => general.ee_version.encode(out),
            }
        }
        FieldKey::View { idx, field } => {
            let view = entry(&config.views, idx)?;
            match field {
                ViewField::Enable => view.enabled.encode(out),
                ViewField::NumGauges => view.num_gauges.encode(out),
                ViewField::Background => view.background.encode(out),
            }
        }
        FieldKey::Gauge { view, gauge, field } => {
            let gauge = entry(&entry(&config.views, view)?.gauges, gauge)?;
            match field {
                GaugeField::Theme => gauge.theme.encode(out),
                GaugeField::Units => gauge.units.encode(out),
                GaugeField::Pid => gauge.pid.encode(out),
            }
        }
        FieldKey::Alert { idx, field } => {
            let alert = entry(&config.alerts, idx)?;
            match field {
                AlertField::Enable => alert.enabled.encode(out),
                AlertField::Compare => alert.compare.encode(out),
                AlertField::Units => alert.units.encode(out),
                AlertField::Pid => alert.pid.encode(out),
                AlertField::Threshold => alert.threshold.encode(out),
                AlertField::Message => alert.message.encode(out),
            }
        }
        FieldKey::Dynamic { idx, field } => {
            let rule = entry(&config.dynamics, idx)?;
            match field {
                DynamicField::Enable => rule.enabled.encode(out),
                DynamicField::Priority => rule.priority.encode(out),
                DynamicField::Compare => rule.compare.encode(out),
                DynamicField::ViewIndex => rule.view_index.encode(out),
                DynamicField::Units => rule.units.encode(out),
                DynamicField::Pid => rule.pid.encode(out),
                DynamicField::Threshold => rule.threshold.encode(out),
            }
        }
    }
    Ok(())
}

/// Decode `bytes` and keep the result only if it passes verification
fn sanitize<T: FieldCodec + Default>(bytes: &[u8], verify: impl Fn(&T) -> bool) -> (T, bool) {
    match T::decode(bytes) {
        Some(value) if verify(&value) => (value, false),
        _ => (T::default(), true),
    }
}

/// Store `bytes` into the mirror slot for `key`
///
/// A value that does not decode, or decodes outside the field's domain, is
/// replaced by the field's default. Returns `true` when that happened.
pub fn decode_field(
    config: &mut Configuration,
    key: FieldKey,
    bytes: &[u8],
) -> Result<bool, ConfigError> {
    let repaired = match key {
        FieldKey::General { idx, field } => {
            let general = entry_mut(&mut config.general, idx)?;
            match field {
                GeneralField::EeVersion => {
                    let (value, repaired) = sanitize(bytes, |v| verify_general_ee_version(*v));
                    general.ee_version = value;
                    repaired
                }
            }
        }
        FieldKey::View { idx, field } => {
            let view = entry_mut(&mut config.views, idx)?;
            match field {
                ViewField::Enable => {
                    let (value, repaired) = sanitize(bytes, |v| verify_view_enable(*v));
                    view.enabled = value;
                    repaired
                }
                ViewField::NumGauges => {
                    let (value, repaired) = sanitize(bytes, |v| verify_view_num_gauges(*v));
                    view.num_gauges = value;
                    repaired
                }
                ViewField::Background => {
                    let (value, repaired) = sanitize(bytes, |v| verify_view_background(*v));
                    view.background = value;
                    repaired
                }
            }
        }
        FieldKey::Gauge { view, gauge, field } => {
            let gauges = &mut entry_mut(&mut config.views, view)?.gauges;
            let gauge = entry_mut(gauges, gauge)?;
            match field {
                GaugeField::Theme => {
                    let (value, repaired) = sanitize(bytes, |v| verify_view_gauge_theme(*v));
                    gauge.theme = value;
                    repaired
                }
                GaugeField::Units => {
                    let (value, repaired) = sanitize(bytes, |v| verify_view_gauge_units(*v));
                    gauge.units = value;
                    repaired
                }
                GaugeField::Pid => {
                    let (value, repaired) = sanitize(bytes, |v| verify_view_gauge_pid(*v));
                    gauge.pid = value;
                    repaired
                }
            }
        }
        FieldKey::Alert { idx, field } => {
            let alert = entry_mut(&mut config.alerts, idx)?;
            match field {
                AlertField::Enable => {
                    let (value, repaired) = sanitize(bytes, |v| verify_alert_enable(*v));
                    alert.enabled = value;
                    repaired
                }
                AlertField::Compare => {
                    let (value, repaired) = sanitize(bytes, |v| verify_alert_compare(*v));
                    alert.compare = value;
                    repaired
                }
                AlertField::Units => {
                    let (value, repaired) = sanitize(bytes, |v| verify_alert_units(*v));
                    alert.units = value;
                    repaired
                }
                AlertField::Pid => {
                    let (value, repaired) = sanitize(bytes, |v| verify_alert_pid(*v));
                    alert.pid = value;
                    repaired
                }
                AlertField::Threshold => {
                    let (value, repaired) = sanitize(bytes, |v| verify_alert_threshold(*v));
                    alert.threshold = value;
                    repaired
                }
                AlertField::Message => {
                    let (value, repaired) =
                        sanitize::<AlertMessage>(bytes, |v| verify_alert_message(v.as_str()));
                    alert.message = value;
                    repaired
                }
            }
        }
        FieldKey::Dynamic { idx, field } => {
            let rule = entry_mut(&mut config.dynamics, idx)?;
            match field {
                DynamicField::Enable => {
                    let (value, repaired) = sanitize(bytes, |v| verify_dynamic_enable(*v));
                    rule.enabled = value;
                    repaired
                }
                DynamicField::Priority => {
                    let (value, repaired) = sanitize(bytes, |v| verify_dynamic_priority(*v));
                    rule.priority = value;
                    repaired
                }
                DynamicField::Compare => {
                    let (value, repaired) = sanitize(bytes, |v| verify_dynamic_compare(*v));
                    rule.compare = value;
                    repaired
                }
                DynamicField::ViewIndex => {
                    let (value, repaired) = sanitize(bytes, |v| verify_dynamic_index(*v));
                    rule.view_index = value;
                    repaired
                }
                DynamicField::Units => {
                    let (value, repaired) = sanitize(bytes, |v| verify_dynamic_units(*v));
                    rule.units = value;
                    repaired
                }
                DynamicField::Pid => {
                    let (value, repaired) = sanitize(bytes, |v| verify_dynamic_pid(*v));
                    rule.pid = value;
                    repaired
                }
                DynamicField::Threshold => {
                    let (value, repaired) = sanitize(bytes, |v| verify_dynamic_threshold(*v));
                    rule.threshold = value;
                    repaired
                }
            }
        }
    };
    Ok(repaired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::ALERT_MESSAGE_LEN;

    #[test]
    fn test_u32_little_endian() {
        let mut out = [0u8; 4];
        0x0102_0304u32.encode(&mut out);
        assert_eq!(out, [0x04, 0x03, 0x02, 0x01]);
        assert_eq!(u32::decode(&out), Some(0x0102_0304));
    }

    #[test]
    fn test_f32_bit_exact() {
        let mut out = [0u8; 4];
        (-12.75f32).encode(&mut out);
        assert_eq!(out, (-12.75f32).to_bits().to_le_bytes());
        assert_eq!(f32::decode(&out), Some(-12.75));
    }

    #[test]
    fn test_short_slice_does_not_decode() {
        assert_eq!(u32::decode(&[1, 2]), None);
        assert_eq!(u8::decode(&[]), None);
    }

    #[test]
    fn test_enum_out_of_range_decodes_to_unset() {
        assert_eq!(GaugeTheme::decode(&[0xFF]), Some(GaugeTheme::Unset));
        assert_eq!(Comparison::decode(&[5]), Some(Comparison::NotEqual));
    }

    #[test]
    fn test_message_zero_filled() {
        let mut message = AlertMessage::new();
        message.push_str("OVERHEAT").unwrap();

        let mut out = [0xAAu8; ALERT_MESSAGE_LEN];
        message.encode(&mut out);
        assert_eq!(&out[..8], b"OVERHEAT");
        assert!(out[8..].iter().all(|&b| b == 0));
        assert_eq!(AlertMessage::decode(&out).as_deref(), Some("OVERHEAT"));
    }

    #[test]
    fn test_message_without_terminator_is_cut() {
        let bytes = [b'A'; ALERT_MESSAGE_LEN];
        let message = AlertMessage::decode(&bytes).unwrap();
        assert_eq!(message.len(), ALERT_MESSAGE_MAX);
    }

    #[test]
    fn test_erased_message_does_not_decode() {
        let bytes = [0xFFu8; ALERT_MESSAGE_LEN];
        assert_eq!(AlertMessage::decode(&bytes), None);
    }

    #[test]
    fn test_decode_field_substitutes_default() {
        let mut config = Configuration::default();
        config.views[1].num_gauges = 2;

        let key = FieldKey::View {
            idx: 1,
            field: ViewField::NumGauges,
        };
        assert_eq!(decode_field(&mut config, key, &[9]), Ok(true));
        assert_eq!(config.views[1].num_gauges, 0);

        assert_eq!(decode_field(&mut config, key, &[3]), Ok(false));
        assert_eq!(config.views[1].num_gauges, 3);
    }

    #[test]
    fn test_encode_then_decode_every_field() {
        let mut source = Configuration::default();
        source.alerts[2].message.push_str("LOW OIL").unwrap();
        source.alerts[2].threshold = 12.5;
        source.dynamics[1].view_index = 2;
        source.views[2].gauges[1].pid = 0x0001_000C;

        let mut target = Configuration::default();
        target.views[0].enabled = EnableState::Disabled;

        let mut buffer = [0u8; ALERT_MESSAGE_LEN];
        FieldKey::for_each(|key| {
            let width = key.resolve().unwrap().width as usize;
            encode_field(&source, key, &mut buffer[..width]).unwrap();
            assert_eq!(decode_field(&mut target, key, &buffer[..width]), Ok(false));
        });
        assert_eq!(source, target);
    }
}
