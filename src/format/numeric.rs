//! Standard and custom numeric format strings.
//!
//! Standard specifiers are one letter plus an optional precision:
//!
//! | Spec | Meaning | Example (1234.5678) |
//! |------|---------|---------------------|
//! | `F2` | fixed point | `1234.57` |
//! | `N1` | fixed point, grouped | `1,234.6` |
//! | `P0` | percent (×100) | `123457 %` |
//! | `E3` | exponential | `1.235E+003` |
//! | `G4` | general, significant digits | `1235` |
//! | `D6` | integer, zero padded | `001235` |
//! | `X4` | hexadecimal integer | `04D3` |
//!
//! Anything else is a custom pattern: `0` and `#` digit placeholders, `.`,
//! `,` (grouping between placeholders, ÷1000 right before the point), `%`,
//! quoted `'...'`/`"..."` literals, `\` escapes, and up to three
//! `;`-separated sections for positive, negative and zero values. A section
//! without placeholders prints its literals only, so `ON;OFF;OFF` renders a
//! flag.
//!
//! Midpoints round away from zero everywhere.

use super::MAX_FIELD_WIDTH;

/// Round to `decimals` places, halves away from zero.
pub fn round_half_away(
    value: f64,
    decimals: usize,
) -> f64 {
    if decimals > 15 || !value.is_finite() {
        return value;
    }
    let scale = 10f64.powi(decimals as i32);
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / scale
}

/// Shortest plain rendering of a number, used when no format is given.
pub fn display(value: f64) -> String {
    if value == 0.0 {
        return "0".into();
    }
    if !value.is_finite() {
        return non_finite(value).into();
    }
    let magnitude = value.abs();
    if (1.0e-5..1.0e15).contains(&magnitude) {
        format!("{value}")
    } else {
        scientific(&format!("{value:e}"), 2, false)
    }
}

/// Format `value` with a standard or custom format string.
pub fn format_number(
    value: f64,
    spec: &str,
) -> String {
    if let Some(out) = standard(value, spec) {
        return out;
    }
    if !value.is_finite() {
        return non_finite(value).into();
    }
    custom(value, spec)
}

fn non_finite(value: f64) -> &'static str {
    if value.is_nan() {
        "NaN"
    } else if value > 0.0 {
        "Infinity"
    } else {
        "-Infinity"
    }
}

// =============================================================================
// Standard Specifiers
// =============================================================================

fn standard(
    value: f64,
    spec: &str,
) -> Option<String> {
    let mut chars = spec.chars();
    let kind = chars.next()?;
    let rest = chars.as_str();
    if !kind.is_ascii_alphabetic() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let precision = if rest.is_empty() {
        None
    } else {
        Some(rest.parse::<usize>().ok()?.min(30))
    };
    let upper = kind.to_ascii_uppercase();
    if !matches!(upper, 'F' | 'N' | 'P' | 'E' | 'G' | 'D' | 'X') {
        return None;
    }
    if !value.is_finite() {
        return Some(non_finite(value).into());
    }

    let out = match upper {
        'F' => fixed(value, precision.unwrap_or(2)),
        'N' => group_integer_part(&fixed(value, precision.unwrap_or(2))),
        'P' => format!("{} %", group_integer_part(&fixed(value * 100.0, precision.unwrap_or(2)))),
        'E' => exponential(value, precision.unwrap_or(6), kind.is_ascii_lowercase()),
        'G' => general(value, precision),
        'D' => {
            let n = value.round() as i64;
            let width = precision.unwrap_or(0);
            let digits = format!("{:0width$}", n.unsigned_abs());
            if n < 0 { format!("-{digits}") } else { digits }
        }
        _ => {
            let n = value.round() as i64;
            let width = precision.unwrap_or(0);
            if kind == 'x' {
                format!("{n:0width$x}")
            } else {
                format!("{n:0width$X}")
            }
        }
    };
    Some(out)
}

/// Fixed-point with half-away rounding and no negative zero.
fn fixed(
    value: f64,
    decimals: usize,
) -> String {
    let out = format!("{:.decimals$}", round_half_away(value, decimals));
    match out.strip_prefix('-') {
        Some(unsigned) if unsigned.bytes().all(|b| b == b'0' || b == b'.') => unsigned.into(),
        _ => out,
    }
}

/// Insert `,` every three digits of the integer part.
fn group_integer_part(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int, frac) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };
    let mut out = String::from(sign);
    out.push_str(&group_digits(int));
    if let Some(frac) = frac {
        out.push('.');
        out.push_str(frac);
    }
    out
}

fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Rebuild Rust's `1.5e3` as `1.5E+003` with at least `min_exp_digits`.
fn scientific(
    rust_exp: &str,
    min_exp_digits: usize,
    lower: bool,
) -> String {
    let (mantissa, exp) = rust_exp.split_once('e').unwrap_or((rust_exp, "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let sign = if exp < 0 { '-' } else { '+' };
    let marker = if lower { 'e' } else { 'E' };
    format!("{mantissa}{marker}{sign}{:0min_exp_digits$}", exp.unsigned_abs())
}

fn exponential(
    value: f64,
    decimals: usize,
    lower: bool,
) -> String {
    scientific(&format!("{value:.decimals$e}"), 3, lower)
}

fn general(
    value: f64,
    precision: Option<usize>,
) -> String {
    let Some(digits) = precision.filter(|p| *p > 0) else {
        return display(value);
    };
    if value == 0.0 {
        return "0".into();
    }
    let exp = format!("{value:.prec$e}", prec = digits - 1);
    let exponent: i32 = exp.split_once('e').and_then(|(_, e)| e.parse().ok()).unwrap_or(0);
    if exponent < -5 || exponent >= digits as i32 {
        let (mantissa, _) = exp.split_once('e').unwrap_or((exp.as_str(), ""));
        let mantissa = trim_fraction(mantissa);
        scientific(&format!("{mantissa}e{exponent}"), 2, false)
    } else {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&fixed(value, decimals)).into()
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

// =============================================================================
// Custom Patterns
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
enum Token {
    /// `0` (true) or `#` (false).
    Digit(bool),
    Point,
    Comma,
    Percent,
    Literal(char),
}

/// Split a pattern into at most three sections on unquoted `;`.
fn split_sections(pattern: &str) -> Vec<&str> {
    let mut sections = Vec::with_capacity(3);
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in pattern.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (None, '\\') => escaped = true,
            (None, '\'' | '"') => quote = Some(c),
            (Some(q), _) if c == q => quote = None,
            (None, ';') if sections.len() < 2 => {
                sections.push(&pattern[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    sections.push(&pattern[start..]);
    sections
}

fn tokenize(section: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(section.len());
    let mut chars = section.chars();
    let mut seen_point = false;
    while let Some(c) = chars.next() {
        match c {
            '0' => tokens.push(Token::Digit(true)),
            '#' => tokens.push(Token::Digit(false)),
            '.' if !seen_point => {
                seen_point = true;
                tokens.push(Token::Point);
            }
            ',' => tokens.push(Token::Comma),
            '%' => tokens.push(Token::Percent),
            '\\' => {
                if let Some(next) = chars.next() {
                    tokens.push(Token::Literal(next));
                }
            }
            '\'' | '"' => {
                for quoted in chars.by_ref() {
                    if quoted == c {
                        break;
                    }
                    tokens.push(Token::Literal(quoted));
                }
            }
            _ => tokens.push(Token::Literal(c)),
        }
    }
    tokens
}

fn custom(
    value: f64,
    pattern: &str,
) -> String {
    let sections = split_sections(pattern);
    let (section, signed) = match sections.as_slice() {
        [only] => (*only, true),
        [pos, neg] | [pos, neg, _] if value < 0.0 => {
            if neg.is_empty() {
                (*pos, true)
            } else {
                (*neg, false)
            }
        }
        [_, _, zero] if value == 0.0 => (*zero, false),
        [pos, ..] => (*pos, true),
        [] => ("", true),
    };

    let (text, nonzero) = render_section(&tokenize(section), value.abs());
    if signed && value < 0.0 && nonzero {
        format!("-{text}")
    } else {
        text
    }
}

/// Render one section for a non-negative value. Also reports whether any
/// non-zero digit made it into the output.
fn render_section(
    tokens: &[Token],
    value: f64,
) -> (String, bool) {
    if !tokens.iter().any(|t| matches!(t, Token::Digit(_))) {
        let text = tokens
            .iter()
            .map(|t| match t {
                Token::Literal(c) => *c,
                Token::Percent => '%',
                Token::Point => '.',
                Token::Comma => ',',
                Token::Digit(_) => '0',
            })
            .collect();
        return (text, false);
    }

    let point = tokens.iter().position(|t| *t == Token::Point).unwrap_or(tokens.len());
    let (int_tokens, frac_tokens) = tokens.split_at(point);
    let frac_tokens = frac_tokens.get(1..).unwrap_or(&[]);

    // Commas directly before the point (or the end of the integer part)
    // scale by 1000; a comma followed by a placeholder turns on grouping.
    let mut scale_commas = 0;
    for t in int_tokens.iter().rev() {
        match t {
            Token::Comma => scale_commas += 1,
            _ => break,
        }
    }
    let grouping = int_tokens
        .iter()
        .enumerate()
        .any(|(i, t)| *t == Token::Comma && int_tokens[i + 1..].iter().any(|t| matches!(t, Token::Digit(_))));
    let percents = tokens.iter().filter(|t| **t == Token::Percent).count();

    let mut value = value / 1000f64.powi(scale_commas);
    value *= 100f64.powi(percents as i32);

    let int_placeholders: Vec<bool> = int_tokens
        .iter()
        .filter_map(|t| if let Token::Digit(z) = t { Some(*z) } else { None })
        .collect();
    let min_int = int_placeholders
        .iter()
        .position(|z| *z)
        .map_or(0, |first_zero| int_placeholders.len() - first_zero)
        .min(MAX_FIELD_WIDTH);

    let frac_placeholders: Vec<bool> = frac_tokens
        .iter()
        .filter_map(|t| if let Token::Digit(z) = t { Some(*z) } else { None })
        .collect();
    let max_frac = frac_placeholders.len().min(MAX_FIELD_WIDTH);
    let min_frac = frac_placeholders
        .iter()
        .rposition(|z| *z)
        .map_or(0, |i| i + 1)
        .min(max_frac);

    let rounded = format!("{:.max_frac$}", round_half_away(value, max_frac));
    let (int_str, frac_str) = rounded.split_once('.').unwrap_or((&rounded, ""));
    let int_trimmed = int_str.trim_start_matches('0');
    let mut int_digits = format!("{int_trimmed:0>min_int$}");
    let mut frac_digits = frac_str.to_string();
    while frac_digits.len() > min_frac && frac_digits.ends_with('0') {
        frac_digits.pop();
    }
    let nonzero = int_digits.bytes().chain(frac_digits.bytes()).any(|b| b != b'0');

    if grouping {
        int_digits = group_digits(&int_digits);
    }

    let mut out = render_integer(int_tokens, &int_digits, grouping);
    if !frac_digits.is_empty() {
        out.push('.');
    }
    let mut frac = frac_digits.chars();
    for t in frac_tokens {
        match t {
            Token::Digit(_) => {
                if let Some(d) = frac.next() {
                    out.push(d);
                }
            }
            Token::Literal(c) => out.push(*c),
            Token::Percent => out.push('%'),
            Token::Comma | Token::Point => {}
        }
    }
    (out, nonzero)
}

/// Lay integer digits into the integer tokens from the right. Surplus
/// digits go where the leftmost placeholder sits.
fn render_integer(
    tokens: &[Token],
    digits: &str,
    grouping: bool,
) -> String {
    let first_digit = tokens.iter().position(|t| matches!(t, Token::Digit(_)));
    let Some(first_digit) = first_digit else {
        // No integer placeholders: literals, then the digits before the point.
        let mut out: String = tokens.iter().filter_map(literal_char).collect();
        out.push_str(digits);
        return out;
    };

    if grouping {
        // Grouped digits replace the whole placeholder run.
        let last_digit = tokens
            .iter()
            .rposition(|t| matches!(t, Token::Digit(_)))
            .unwrap_or(first_digit);
        let mut out: String = tokens[..first_digit].iter().filter_map(literal_char).collect();
        out.push_str(digits);
        out.extend(tokens[last_digit + 1..].iter().filter_map(literal_char));
        return out;
    }

    let mut remaining: Vec<char> = digits.chars().collect();
    let mut pieces: Vec<String> = Vec::with_capacity(tokens.len());
    for (i, t) in tokens.iter().enumerate().rev() {
        match t {
            Token::Digit(_) => {
                let mut piece = String::new();
                if i == first_digit {
                    piece.extend(remaining.drain(..));
                } else if let Some(d) = remaining.pop() {
                    piece.push(d);
                }
                pieces.push(piece);
            }
            other => {
                if let Some(c) = literal_char(other) {
                    pieces.push(c.to_string());
                }
            }
        }
    }
    pieces.iter().rev().map(String::as_str).collect()
}

fn literal_char(token: &Token) -> Option<char> {
    match token {
        Token::Literal(c) => Some(*c),
        Token::Percent => Some('%'),
        _ => None,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
