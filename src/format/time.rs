//! Calendar (`KDT`) and duration (`MET`) rendering of seconds.
//!
//! The pattern after the tag uses `y d h m s` for years, days, hours,
//! minutes and seconds, and `f` for fractions of a second. A run of the same
//! letter zero-pads to the run length. The largest unit present absorbs
//! everything above it, so `METhh:mm` shows 30 hours as `30:00`. Quoted text
//! and `\`-escaped characters are literal, as is any other character.
//!
//! `KDT` counts years and days from 1, like a calendar date; `MET` counts
//! from 0, like a stopwatch. Negative inputs get a leading `-` (countdowns).
//!
//! The calendar uses the home world's 6-hour day and 426-day year.
//!
//! Field runs stop at [`MAX_FIELD_WIDTH`] digits and counts saturate at
//! `u64::MAX`, so absurd inputs still render.

use super::MAX_FIELD_WIDTH;

/// Seconds per minute.
pub const MINUTE: f64 = 60.0;
/// Seconds per hour.
pub const HOUR: f64 = 3_600.0;
/// Seconds per local day (6 hours).
pub const DAY: f64 = 6.0 * HOUR;
/// Seconds per local year (426 days).
pub const YEAR: f64 = 426.0 * DAY;

/// Which origin the count starts from.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Clock {
    /// Date-like: first year and first day are 1.
    Calendar,
    /// Elapsed time: everything counts from 0.
    Elapsed,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Unit {
    Year,
    Day,
    Hour,
    Minute,
    Second,
}

impl Unit {
    const fn seconds(self) -> f64 {
        match self {
            Self::Year => YEAR,
            Self::Day => DAY,
            Self::Hour => HOUR,
            Self::Minute => MINUTE,
            Self::Second => 1.0,
        }
    }

    const fn from_letter(c: char) -> Option<Self> {
        match c {
            'y' => Some(Self::Year),
            'd' => Some(Self::Day),
            'h' => Some(Self::Hour),
            'm' => Some(Self::Minute),
            's' => Some(Self::Second),
            _ => None,
        }
    }
}

enum Piece {
    Field(Unit, usize),
    Fraction(usize),
    Literal(String),
}

fn parse(pattern: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if let Some(unit) = Unit::from_letter(c) {
            let mut run = 1;
            while chars.next_if_eq(&c).is_some() {
                run += 1;
            }
            pieces.push(Piece::Field(unit, run.min(MAX_FIELD_WIDTH)));
        } else if c == 'f' {
            let mut run = 1;
            while chars.next_if_eq(&'f').is_some() {
                run += 1;
            }
            pieces.push(Piece::Fraction(run.min(9)));
        } else if c == '\\' {
            if let Some(next) = chars.next() {
                pieces.push(Piece::Literal(next.to_string()));
            }
        } else if c == '\'' || c == '"' {
            let text: String = chars.by_ref().take_while(|q| *q != c).collect();
            pieces.push(Piece::Literal(text));
        } else {
            pieces.push(Piece::Literal(c.to_string()));
        }
    }
    pieces
}

/// Render `seconds` with a time pattern.
pub fn format_time(
    seconds: f64,
    clock: Clock,
    pattern: &str,
) -> String {
    if !seconds.is_finite() {
        return super::numeric::display(seconds);
    }
    let pieces = parse(pattern);
    let negative = seconds < 0.0;
    let total = seconds.abs();
    let mut remaining = total.trunc();
    let fraction = total.fract();

    // Largest unit first, each present unit takes what is left above it.
    let mut values = [0u64; 5];
    for (slot, unit) in [Unit::Year, Unit::Day, Unit::Hour, Unit::Minute, Unit::Second]
        .into_iter()
        .enumerate()
    {
        let present = pieces.iter().any(|p| matches!(p, Piece::Field(u, _) if *u == unit));
        if present {
            let count = (remaining / unit.seconds()).floor();
            remaining -= count * unit.seconds();
            values[slot] = count as u64;
        }
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    for piece in &pieces {
        match piece {
            Piece::Field(unit, width) => {
                let slot = *unit as usize;
                let offset = u64::from(clock == Clock::Calendar && matches!(unit, Unit::Year | Unit::Day));
                out.push_str(&format!("{:0width$}", values[slot].saturating_add(offset), width = *width));
            }
            Piece::Fraction(width) => {
                let digits = (fraction * 10f64.powi(*width as i32)).floor() as u64;
                out.push_str(&format!("{digits:0width$}", width = *width));
            }
            Piece::Literal(text) => out.push_str(text),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_clock() {
        assert_eq!(format_time(3_725.5, Clock::Elapsed, "hh:mm:ss.f"), "01:02:05.5");
        assert_eq!(format_time(0.0, Clock::Elapsed, "hh:mm:ss"), "00:00:00");
    }

    #[test]
    fn test_largest_unit_absorbs_overflow() {
        assert_eq!(format_time(30.0 * HOUR, Clock::Elapsed, "hh:mm"), "30:00");
        assert_eq!(format_time(30.0 * HOUR, Clock::Elapsed, "d'd' hh:mm"), "5d 00:00");
        assert_eq!(format_time(125.0, Clock::Elapsed, "s"), "125");
    }

    #[test]
    fn test_calendar_counts_from_one() {
        assert_eq!(format_time(0.0, Clock::Calendar, "'Y'y, 'D'ddd"), "Y1, D001");
        let t = YEAR + 2.0 * DAY + 3.0 * HOUR + 4.0 * MINUTE + 5.0;
        assert_eq!(format_time(t, Clock::Calendar, "y:ddd:hh:mm:ss"), "2:003:03:04:05");
    }

    #[test]
    fn test_negative_countdown() {
        assert_eq!(format_time(-90.0, Clock::Elapsed, "mm:ss"), "-01:30");
    }

    #[test]
    fn test_huge_input_saturates() {
        let max = u64::MAX.to_string();
        assert_eq!(format_time(1.0e30, Clock::Calendar, "y"), max);
        assert_eq!(format_time(1.0e30, Clock::Calendar, "d"), max);
        assert_eq!(format_time(-1.0e30, Clock::Elapsed, "s"), format!("-{max}"));
    }

    #[test]
    fn test_long_runs_are_clamped() {
        let out = format_time(5.0, Clock::Elapsed, &"s".repeat(70_000));
        assert_eq!(out.len(), MAX_FIELD_WIDTH);
        assert!(out.ends_with('5'));
    }

    #[test]
    fn test_escapes_and_literals() {
        assert_eq!(format_time(61.0, Clock::Elapsed, "m\\m ss\\s"), "1m 01s");
    }
}
