//! Enumerated settings and their canonical names
//!
//! Every enumerated field is stored as a single byte holding the variant's
//! discriminant. Each type ends with an `Unset` variant: it has no canonical
//! name, never passes verification, and is what an out-of-range byte or an
//! unknown name decodes to.

/// Declares a settings enum together with its name table
///
/// The first listed variant is the type's default. `Unset` is appended
/// after the listed variants.
macro_rules! settings_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(#[$first_meta:meta])*
            $first:ident => $first_label:literal,
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $label:literal,
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        #[repr(u8)]
        pub enum $name {
            $(#[$first_meta])*
            $first,
            $(
                $(#[$vmeta])*
                $variant,
            )*
            /// Not configured; never a legal value
            Unset,
        }

        impl $name {
            /// Legal variants, in discriminant order
            pub const ALL: &'static [$name] = &[$name::$first, $($name::$variant),*];

            /// Canonical names, indexed by discriminant
            pub const NAMES: &'static [&'static str] = &[$first_label, $($label),*];

            /// Get the stored byte value
            pub const fn as_u8(self) -> u8 {
                self as u8
            }

            /// Decode a stored byte; anything out of range is `Unset`
            pub fn from_u8(value: u8) -> Self {
                Self::ALL
                    .get(value as usize)
                    .copied()
                    .unwrap_or(Self::Unset)
            }

            /// Canonical name, `None` for `Unset`
            pub fn name(self) -> Option<&'static str> {
                Self::NAMES.get(self as usize).copied()
            }

            /// Look up a canonical name (exact, case-sensitive)
            ///
            /// Returns `Unset` when nothing matches.
            pub fn from_name(name: &str) -> Self {
                Self::NAMES
                    .iter()
                    .position(|&candidate| candidate == name)
                    .and_then(|index| Self::ALL.get(index).copied())
                    .unwrap_or(Self::Unset)
            }

            /// Check that this is a legal value
            pub const fn is_valid(self) -> bool {
                !matches!(self, Self::Unset)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$first
            }
        }

        #[cfg(feature = "serde")]
        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                match self.name() {
                    Some(name) => serializer.serialize_str(name),
                    None => serializer.serialize_none(),
                }
            }
        }
    };
}

settings_enum! {
    /// Enable state shared by views, alerts and dynamic rules
    pub enum EnableState {
        Disabled => "Disabled",
        Enabled => "Enabled",
    }
}

settings_enum! {
    /// Background drawn behind a view's gauges
    pub enum ViewBackground {
        Black => "Black",
        Flare => "Flare",
        /// User-supplied image slot
        User1 => "User1",
    }
}

settings_enum! {
    /// Visual style of a gauge
    pub enum GaugeTheme {
        StockSt => "Stock ST",
        GrumpyCat => "Grumpy Cat",
        Linear => "Linear",
        Radial => "Radial",
    }
}

settings_enum! {
    /// Physical unit a parameter is displayed in
    pub enum PidUnits {
        /// Unitless or not applicable
        NotApplicable => "n/a",
        Celsius => "C",
        Fahrenheit => "F",
        Kpa => "kPa",
        Psi => "psi",
        Bar => "bar",
        InHg => "inHg",
        Rpm => "rpm",
        Mph => "mph",
        Kph => "km/h",
        Percent => "%",
        Volts => "V",
        Degrees => "deg",
        Lambda => "lambda",
        Afr => "AFR",
        GForce => "g",
        Milliseconds => "ms",
    }
}

settings_enum! {
    /// Relational operator between a live value and a threshold
    pub enum Comparison {
        LessThan => "<",
        LessThanOrEqual => "<=",
        GreaterThan => ">",
        GreaterThanOrEqual => ">=",
        Equal => "=",
        NotEqual => "!=",
    }
}

settings_enum! {
    /// Arbitration level of a dynamic rule
    pub enum DynamicPriority {
        Low => "Low",
        Medium => "Medium",
        High => "High",
    }
}

impl Comparison {
    /// Evaluate `value <op> threshold`
    ///
    /// `Unset` never holds.
    pub fn evaluate(self, value: f32, threshold: f32) -> bool {
        match self {
            Comparison::LessThan => value < threshold,
            Comparison::LessThanOrEqual => value <= threshold,
            Comparison::GreaterThan => value > threshold,
            Comparison::GreaterThanOrEqual => value >= threshold,
            Comparison::Equal => value == threshold,
            Comparison::NotEqual => value != threshold,
            Comparison::Unset => false,
        }
    }
}

impl EnableState {
    /// Check if the entity is switched on
    pub fn is_enabled(self) -> bool {
        self == EnableState::Enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discriminants_follow_table_order() {
        assert_eq!(EnableState::Disabled.as_u8(), 0);
        assert_eq!(EnableState::Enabled.as_u8(), 1);
        assert_eq!(EnableState::Unset.as_u8(), 2);
        assert_eq!(GaugeTheme::Radial.as_u8(), 3);
        assert_eq!(Comparison::Unset.as_u8(), 6);
        assert_eq!(PidUnits::ALL.len(), PidUnits::NAMES.len());
        assert_eq!(PidUnits::Unset.as_u8() as usize, PidUnits::ALL.len());
    }

    #[test]
    fn test_from_u8_out_of_range_is_unset() {
        assert_eq!(ViewBackground::from_u8(2), ViewBackground::User1);
        assert_eq!(ViewBackground::from_u8(3), ViewBackground::Unset);
        assert_eq!(ViewBackground::from_u8(0xFF), ViewBackground::Unset);
        assert_eq!(EnableState::from_u8(99), EnableState::Unset);
    }

    #[test]
    fn test_name_lookup() {
        assert_eq!(GaugeTheme::from_name("Grumpy Cat"), GaugeTheme::GrumpyCat);
        assert_eq!(Comparison::from_name(">="), Comparison::GreaterThanOrEqual);
        assert_eq!(PidUnits::from_name("km/h"), PidUnits::Kph);
        assert_eq!(GaugeTheme::Linear.name(), Some("Linear"));
        assert_eq!(GaugeTheme::Unset.name(), None);
    }

    #[test]
    fn test_name_lookup_is_exact() {
        assert_eq!(EnableState::from_name("enabled"), EnableState::Unset);
        assert_eq!(EnableState::from_name("Enabled "), EnableState::Unset);
        assert_eq!(DynamicPriority::from_name(""), DynamicPriority::Unset);
        assert!(!DynamicPriority::from_name("Urgent").is_valid());
    }

    #[test]
    fn test_every_name_maps_back() {
        for (index, name) in PidUnits::NAMES.iter().enumerate() {
            let units = PidUnits::from_name(name);
            assert_eq!(units.as_u8() as usize, index);
            assert_eq!(units.name(), Some(*name));
        }
    }

    #[test]
    fn test_defaults_are_first_entry() {
        assert_eq!(EnableState::default(), EnableState::Disabled);
        assert_eq!(ViewBackground::default(), ViewBackground::Black);
        assert_eq!(PidUnits::default(), PidUnits::NotApplicable);
        assert_eq!(DynamicPriority::default(), DynamicPriority::Low);
    }

    #[test]
    fn test_comparison_evaluate() {
        assert!(Comparison::LessThan.evaluate(1.0, 2.0));
        assert!(!Comparison::LessThan.evaluate(2.0, 2.0));
        assert!(Comparison::LessThanOrEqual.evaluate(2.0, 2.0));
        assert!(Comparison::GreaterThan.evaluate(3.0, 2.0));
        assert!(Comparison::GreaterThanOrEqual.evaluate(2.0, 2.0));
        assert!(Comparison::Equal.evaluate(2.5, 2.5));
        assert!(Comparison::NotEqual.evaluate(2.5, 2.0));
        assert!(!Comparison::Unset.evaluate(1.0, 1.0));
    }

    #[test]
    fn test_priority_ordering() {
        assert!(DynamicPriority::High > DynamicPriority::Medium);
        assert!(DynamicPriority::Medium > DynamicPriority::Low);
    }
}
