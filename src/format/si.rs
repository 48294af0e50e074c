//! SI-prefixed fixed-width number rendering (`SIP` format specifiers).
//!
//! Grammar after the `SIP` tag: `[_][0]<width>[.<precision>]`.
//!
//! - `_` puts a space between the mantissa and the unit prefix (one more
//!   character of width)
//! - `0` pads with zeros after the sign instead of spaces before it
//! - `width` is the total rendered character count: sign, mantissa, spacer
//!   and the one-character unit slot
//! - `precision` caps the digits after the decimal point; without it as many
//!   decimals are shown as the width allows
//!
//! The unit slot always holds exactly one character: the prefix letter, or a
//! space when the value needs no prefix. Zero, infinities and NaN have no
//! meaningful magnitude and render bare, right-justified, with no unit.
//!
//! ```text
//! SIP6.1    12345.6   ->  " 12.3k"
//! SIP06.1   12345.6   ->  "012.3k"
//! SIP_6.1   12345.6   ->  "12.3 k"
//! SIP6.1   -12345.6   ->  "-12.3k"
//! SIP6.1        0.0   ->  "     0"
//! ```

use super::MAX_FIELD_WIDTH;
use super::numeric::round_half_away;

/// Engineering prefixes from 10^-24 to 10^24, a space for 10^0.
const PREFIXES: [char; 17] = [
    'y', 'z', 'a', 'f', 'p', 'n', 'µ', 'm', ' ', 'k', 'M', 'G', 'T', 'P', 'E', 'Z', 'Y',
];

/// Smallest and largest supported engineering exponent.
const MIN_EXPONENT: i32 = -24;
const MAX_EXPONENT: i32 = 24;

/// A parsed `SIP` specifier.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SiFormat {
    pub width: usize,
    pub precision: Option<usize>,
    pub zero_pad: bool,
    pub spacer: bool,
}

impl SiFormat {
    /// Parse the part of the specifier after `SIP`.
    ///
    /// Returns `None` when the width is missing, zero or wider than
    /// [`MAX_FIELD_WIDTH`], when the precision is past that cap too, or
    /// trailing characters follow the precision.
    pub fn parse(spec: &str) -> Option<Self> {
        let mut rest = spec;
        let spacer = rest.starts_with('_');
        if spacer {
            rest = &rest[1..];
        }
        let zero_pad = rest.starts_with('0');
        if zero_pad {
            rest = &rest[1..];
        }

        let (width_str, precision_str) = match rest.split_once('.') {
            Some((w, p)) => (w, Some(p)),
            None => (rest, None),
        };
        if width_str.is_empty() || !width_str.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let width = width_str
            .parse::<usize>()
            .ok()
            .filter(|w| (1..=MAX_FIELD_WIDTH).contains(w))?;
        let precision = match precision_str {
            Some(p) if !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()) => {
                Some(p.parse::<usize>().ok().filter(|p| *p <= MAX_FIELD_WIDTH)?)
            }
            Some(_) => return None,
            None => None,
        };

        Some(Self {
            width,
            precision,
            zero_pad,
            spacer,
        })
    }

    /// Render `value` into exactly `width` characters when it fits.
    ///
    /// Values whose integer part cannot fit even at the largest prefix come
    /// out wider than `width` rather than wrong.
    pub fn format(
        &self,
        value: f64,
    ) -> String {
        if value == 0.0 || !value.is_finite() {
            let bare = if value.is_nan() {
                "NaN"
            } else if value == f64::INFINITY {
                "Inf"
            } else if value == f64::NEG_INFINITY {
                "-Inf"
            } else {
                "0"
            };
            return format!("{bare:>width$}", width = self.width);
        }

        let negative = value < 0.0;
        let magnitude = value.abs();
        let fixed = usize::from(negative) + usize::from(self.spacer) + 1;
        let avail = self.width.saturating_sub(fixed).max(1);

        let mut exponent = ((magnitude.log10() / 3.0).floor() as i32 * 3).clamp(MIN_EXPONENT, MAX_EXPONENT);
        let (mantissa, decimals) = loop {
            let scaled = magnitude / 10f64.powi(exponent);
            let int_digits = integer_digits(scaled);
            if int_digits > avail && exponent < MAX_EXPONENT {
                exponent += 3;
                continue;
            }

            let room = avail.saturating_sub(int_digits + 1);
            let mut decimals = self.precision.map_or(room, |p| p.min(room));
            let mut rounded = round_half_away(scaled, decimals);
            // 99.96 -> 100.0 gains an integer digit; give up a decimal for it.
            while decimals > 0 && integer_digits(rounded) + decimals + 1 > avail {
                decimals -= 1;
                rounded = round_half_away(scaled, decimals);
            }
            if (rounded >= 1000.0 || integer_digits(rounded) > avail) && exponent < MAX_EXPONENT {
                exponent += 3;
                continue;
            }
            break (rounded, decimals);
        };

        let digits = format!("{mantissa:.decimals$}");
        let unit = PREFIXES[((exponent - MIN_EXPONENT) / 3) as usize];

        let mut body = digits;
        if self.spacer {
            body.push(' ');
        }
        body.push(unit);

        let used = usize::from(negative) + body.chars().count();
        let pad = self.width.saturating_sub(used);
        let sign = if negative { "-" } else { "" };
        if self.zero_pad {
            format!("{sign}{}{body}", "0".repeat(pad))
        } else {
            format!("{}{sign}{body}", " ".repeat(pad))
        }
    }
}

/// Digits before the decimal point, at least one.
fn integer_digits(value: f64) -> usize {
    let int = value.trunc();
    if int < 1.0 {
        1
    } else {
        int.log10().floor() as usize + 1
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sip(
        spec: &str,
        value: f64,
    ) -> String {
        SiFormat::parse(spec).map_or_else(|| "<bad spec>".into(), |f| f.format(value))
    }

    #[test]
    fn test_parse_flags() {
        let f = SiFormat::parse("_06.2");
        assert_eq!(
            f,
            Some(SiFormat {
                width: 6,
                precision: Some(2),
                zero_pad: true,
                spacer: true,
            })
        );
        assert_eq!(SiFormat::parse("8").map(|f| (f.width, f.precision)), Some((8, None)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(SiFormat::parse(""), None);
        assert_eq!(SiFormat::parse("0"), None);
        assert_eq!(SiFormat::parse("x6"), None);
        assert_eq!(SiFormat::parse("6."), None);
        assert_eq!(SiFormat::parse("6.1a"), None);
    }

    #[test]
    fn test_parse_rejects_oversized_fields() {
        assert_eq!(SiFormat::parse("255").map(|f| f.width), Some(255));
        assert_eq!(SiFormat::parse("256"), None);
        assert_eq!(SiFormat::parse("070000"), None);
        assert_eq!(SiFormat::parse("99999999999999999999999"), None);
        assert_eq!(SiFormat::parse("6.256"), None);
    }

    #[test]
    fn test_kilo_scaling() {
        assert_eq!(sip("6.1", 12345.6), " 12.3k");
        assert_eq!(sip("06.1", 12345.6), "012.3k");
        assert_eq!(sip("_6.1", 12345.6), "12.3 k");
    }

    #[test]
    fn test_negative_sign_takes_width() {
        assert_eq!(sip("6.1", -12345.6), "-12.3k");
        assert_eq!(sip("07.1", -12345.6), "-012.3k");
    }

    #[test]
    fn test_no_prefix_uses_space_unit() {
        assert_eq!(sip("6.1", 5.25), "  5.3 ");
        assert_eq!(sip("6", 5.0), "5.000 ");
    }

    #[test]
    fn test_small_values_use_milli_and_micro() {
        assert_eq!(sip("6.1", 0.0125), " 12.5m");
        assert_eq!(sip("6.2", 0.000_003_3), " 3.30µ");
        assert_eq!(sip("6.1", 0.000_003_3).chars().count(), 6);
    }

    #[test]
    fn test_rounding_carry_promotes_prefix() {
        assert_eq!(sip("6.1", 999.96), "  1.0k");
        assert_eq!(sip("6.1", 999_960.0), "  1.0M");
    }

    #[test]
    fn test_integer_digits_overflow_bumps_prefix() {
        // Three integer digits of a kilo value cannot fit in two characters.
        assert_eq!(sip("3", 987_654.0), " 1M");
        assert_eq!(sip("4", 987_654.0), "988k");
    }

    #[test]
    fn test_rounding_gains_integer_digit() {
        assert_eq!(sip("6.1", -99.96), " -100 ");
    }

    #[test]
    fn test_bare_values() {
        assert_eq!(sip("6.1", 0.0), "     0");
        assert_eq!(sip("06.1", 0.0), "     0");
        assert_eq!(sip("6.1", f64::NAN), "   NaN");
        assert_eq!(sip("6.1", f64::INFINITY), "   Inf");
        assert_eq!(sip("6.1", f64::NEG_INFINITY), "  -Inf");
    }

    #[test]
    fn test_exponent_clamped() {
        let huge = sip("8.1", 1.0e30);
        assert!(huge.ends_with('Y'));
        let tiny = sip("8.1", 1.0e-30);
        assert!(tiny.ends_with('y'));
    }
}

#[cfg(test)]
mod si_proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn width_is_exact_for_representable_values(
            value in prop_oneof![-1.0e20f64..-1.0e-20, 1.0e-20f64..1.0e20],
            width in 6usize..12,
            precision in 0usize..4,
            zero_pad in any::<bool>(),
        ) {
            let f = SiFormat { width, precision: Some(precision), zero_pad, spacer: false };
            let out = f.format(value);
            prop_assert_eq!(out.chars().count(), width, "{:?} -> {:?}", value, out);
        }
    }
}
