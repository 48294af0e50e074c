//! Composite formatting of evaluated variables.
//!
//! A format string holds literal text and items `{index[,alignment][:format]}`
//! that refer to positional arguments. `{{` and `}}` are literal braces.
//! Positive alignment right-justifies the item in that many characters,
//! negative alignment left-justifies it.
//!
//! The `:format` part selects a renderer:
//!
//! | Prefix | Renderer |
//! |--------|----------|
//! | `SIP` | [`si`] SI-prefixed fixed width |
//! | `KDT` / `MET` | [`time`] calendar / elapsed time |
//! | anything else | [`numeric`] standard or custom numeric format |
//!
//! Text values ignore the format unless they parse as a number; a numeric
//! format applied to non-numeric text is logged and the text is shown as is.

pub mod numeric;
pub mod si;
pub mod time;

use core::fmt;

use crate::log_warn;
use crate::variables::Value;

use self::si::SiFormat;
use self::time::Clock;

/// Text shown for [`Value::Unavailable`].
pub const UNAVAILABLE_TEXT: &str = "N/A";

/// Widest field any item may ask for: alignment, `SIP` width and
/// precision, placeholder and time runs. Larger requests are clamped or
/// rejected by the renderer that reads them.
pub const MAX_FIELD_WIDTH: usize = 255;

/// A composite format string that cannot be expanded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormatError {
    /// `{` without a matching `}`.
    UnclosedItem { at: usize },
    /// `}` that is neither `}}` nor the end of an item.
    StrayClosingBrace { at: usize },
    /// Item index missing or not a number.
    BadIndex { at: usize },
    /// Item index past the argument list.
    IndexOutOfRange { index: usize, count: usize },
    /// Alignment is not an integer.
    BadAlignment { at: usize },
}

impl fmt::Display for FormatError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::UnclosedItem { at } => write!(f, "unclosed item at {at}"),
            Self::StrayClosingBrace { at } => write!(f, "stray '}}' at {at}"),
            Self::BadIndex { at } => write!(f, "bad item index at {at}"),
            Self::IndexOutOfRange { index, count } => write!(f, "item {index} with {count} args"),
            Self::BadAlignment { at } => write!(f, "bad alignment at {at}"),
        }
    }
}

impl std::error::Error for FormatError {}

/// Expand `format` with positional `args`.
pub fn format_composite(
    format: &str,
    args: &[Value],
) -> Result<String, FormatError> {
    let mut out = String::with_capacity(format.len() + args.len() * 8);
    let mut chars = format.char_indices().peekable();

    while let Some((at, c)) = chars.next() {
        match c {
            '{' if chars.next_if(|(_, n)| *n == '{').is_some() => out.push('{'),
            '}' if chars.next_if(|(_, n)| *n == '}').is_some() => out.push('}'),
            '}' => return Err(FormatError::StrayClosingBrace { at }),
            '{' => {
                let mut item = String::new();
                let mut closed = false;
                for (_, n) in chars.by_ref() {
                    if n == '}' {
                        closed = true;
                        break;
                    }
                    item.push(n);
                }
                if !closed {
                    return Err(FormatError::UnclosedItem { at });
                }
                out.push_str(&expand_item(&item, at, args)?);
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}

fn expand_item(
    item: &str,
    at: usize,
    args: &[Value],
) -> Result<String, FormatError> {
    let (head, spec) = match item.split_once(':') {
        Some((h, s)) => (h, Some(s)),
        None => (item, None),
    };
    let (index, alignment) = match head.split_once(',') {
        Some((i, a)) => (i, Some(a)),
        None => (head, None),
    };

    let index: usize = index.trim().parse().map_err(|_| FormatError::BadIndex { at })?;
    let value = args.get(index).ok_or(FormatError::IndexOutOfRange {
        index,
        count: args.len(),
    })?;
    let alignment: i32 = match alignment {
        Some(a) => a.trim().parse().map_err(|_| FormatError::BadAlignment { at })?,
        None => 0,
    };

    let text = format_value(value, spec);
    Ok(align(text, alignment))
}

fn align(
    text: String,
    alignment: i32,
) -> String {
    let width = (alignment.unsigned_abs() as usize).min(MAX_FIELD_WIDTH);
    let len = text.chars().count();
    if len >= width {
        return text;
    }
    let pad = " ".repeat(width - len);
    if alignment > 0 { pad + &text } else { text + &pad }
}

/// Render one value with an optional format specifier.
pub fn format_value(
    value: &Value,
    spec: Option<&str>,
) -> String {
    let spec = spec.filter(|s| !s.is_empty());
    match (value, spec) {
        (Value::Unavailable, _) => UNAVAILABLE_TEXT.into(),
        (Value::Number(n), None) => numeric::display(*n),
        (Value::Number(n), Some(spec)) => format_number_spec(*n, spec),
        (Value::Text(text), None) => text.clone(),
        (Value::Text(text), Some(spec)) => match text.trim().parse::<f64>() {
            Ok(n) => format_number_spec(n, spec),
            Err(_) => {
                if !text.is_empty() {
                    log_warn!("Format {} needs a number, got {}", spec, text);
                }
                text.clone()
            }
        },
    }
}

fn format_number_spec(
    value: f64,
    spec: &str,
) -> String {
    if let Some(rest) = spec.strip_prefix("SIP") {
        return match SiFormat::parse(rest) {
            Some(si) => si.format(value),
            None => {
                log_warn!("Bad SI format {}", spec);
                numeric::display(value)
            }
        };
    }
    if let Some(pattern) = spec.strip_prefix("KDT") {
        return time::format_time(value, Clock::Calendar, pattern);
    }
    if let Some(pattern) = spec.strip_prefix("MET") {
        return time::format_time(value, Clock::Elapsed, pattern);
    }
    numeric::format_number(value, spec)
}

// =============================================================================
// Unit Tests
// =============================================================================
