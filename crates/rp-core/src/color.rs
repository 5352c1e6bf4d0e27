//! Deterministic participant colors.
//!
//! Colors are derived from a participant name so the same record file gets
//! the same color every time it shows up, across runs and across diagrams.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Channel multiplier/offset pairs, one per channel (red, green, blue).
const CHANNEL_COEFFICIENTS: [(i64, i64); 3] = [(11, 73), (97, 113), (71, 373)];

/// Channel modulus. Every derived channel lies in `[0, CHANNEL_MODULUS)`.
pub const CHANNEL_MODULUS: u32 = 255;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Six hex digits, `RRGGBB`, lowercase, no leading `#`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Halve every channel. Same hue family, visually darker.
    #[must_use]
    pub fn darker_shade(self) -> Self {
        Self {
            r: sanitize_channel(i64::from(self.r / 2)),
            g: sanitize_channel(i64::from(self.g / 2)),
            b: sanitize_channel(i64::from(self.b / 2)),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

/// Derive a stable color for `identifier`.
#[must_use]
pub fn derive_color(identifier: &str) -> Rgb {
    let code = i64::from(identifier_hash(identifier));
    let [red, green, blue] =
        CHANNEL_COEFFICIENTS.map(|(multiplier, offset)| sanitize_channel(code * multiplier + offset));
    Rgb::new(red, green, blue)
}

/// Free-function form of [`Rgb::darker_shade`].
#[must_use]
pub fn darker_shade(color: Rgb) -> Rgb {
    color.darker_shade()
}

/// Free-function form of [`Rgb::to_hex`].
#[must_use]
pub fn to_hex(color: Rgb) -> String {
    color.to_hex()
}

/// Polynomial string hash (base 31) over UTF-16 code units, wrapping at 32 bits.
#[must_use]
pub fn identifier_hash(identifier: &str) -> i32 {
    identifier
        .encode_utf16()
        .fold(0_i32, |hash, unit| {
            hash.wrapping_mul(31).wrapping_add(i32::from(unit))
        })
}

// Truncates to 32 bits before folding into range, so large products wrap
// the same way the hash does.
fn sanitize_channel(value: i64) -> u8 {
    let truncated = value as i32;
    let channel = truncated.unsigned_abs() % CHANNEL_MODULUS;
    // channel < 255 always fits.
    channel as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_identifier_uses_offsets_only() {
        assert_eq!(identifier_hash(""), 0);
        assert_eq!(derive_color(""), Rgb::new(73, 113, 118));
    }

    #[test]
    fn single_letter_identifier_has_known_color() {
        assert_eq!(identifier_hash("A"), 65);
        assert_eq!(derive_color("A"), Rgb::new(23, 43, 143));
        assert_eq!(derive_color("A").to_hex(), "172b8f");
    }

    #[test]
    fn record_name_has_known_color_and_shade() {
        assert_eq!(identifier_hash("CUST"), 2_080_339);
        let color = derive_color("CUST");
        assert_eq!(color, Rgb::new(102, 21, 27));
        assert_eq!(color.darker_shade(), Rgb::new(51, 10, 13));
        assert_eq!(to_hex(darker_shade(color)), "330a0d");
    }

    #[test]
    fn hex_is_zero_padded() {
        assert_eq!(Rgb::new(7, 16, 0).to_hex(), "071000");
        assert_eq!(Rgb::new(254, 171, 205).to_hex(), "feabcd");
        assert_eq!(Rgb::new(1, 2, 3).to_string(), "#010203");
    }

    #[test]
    fn hash_wraps_instead_of_overflowing() {
        let long_name = "CUSTOMER_MASTER_FILE_WITH_A_VERY_LONG_NAME".repeat(8);
        let color = derive_color(&long_name);
        assert_eq!(color, derive_color(&long_name));
    }

    #[test]
    fn darker_shade_of_black_is_black() {
        assert_eq!(Rgb::default().darker_shade(), Rgb::default());
    }

    proptest! {
        #[test]
        fn derive_color_is_deterministic(identifier in ".{0,40}") {
            prop_assert_eq!(derive_color(&identifier), derive_color(&identifier));
        }

        #[test]
        fn derived_channels_stay_below_modulus(identifier in ".{0,40}") {
            let color = derive_color(&identifier);
            for channel in [color.r, color.g, color.b] {
                prop_assert!(u32::from(channel) < CHANNEL_MODULUS);
            }
            let shade = color.darker_shade();
            for channel in [shade.r, shade.g, shade.b] {
                prop_assert!(u32::from(channel) < CHANNEL_MODULUS);
            }
        }

        #[test]
        fn hex_is_always_six_hex_digits(r in 0_u8..255, g in 0_u8..255, b in 0_u8..255) {
            let hex = Rgb::new(r, g, b).to_hex();
            prop_assert_eq!(hex.len(), 6);
            prop_assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }
}
