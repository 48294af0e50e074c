//! Page text templates.
//!
//! A template is page text with optional live fields. Each line is either
//! literal, or a composite format string and a variable list separated by
//! `$&$`:
//!
//! ```text
//! ALT: {0:SIP06.1}m  VS: {1,6:F1}$&$ALTITUDE$VERTSPEED
//! ```
//!
//! Config files cannot hold raw braces or newlines in every host, so the
//! source is decoded first: `<=` → `{`, `=>` → `}`, `$$$` → line break.
//!
//! Templates are parsed once at page load. A line that cannot be rendered
//! renders as [`FORMAT_ERROR`] instead, and the rest of the page is
//! unaffected.

use crate::format::{self, FormatError};
use crate::log_warn;
use crate::snapshot::Snapshot;
use crate::variables::{self, Value};

/// Separates the format string from the variable list.
pub const VARIABLE_DELIMITER: &str = "$&$";

/// Line break escape.
pub const LINE_BREAK_ESCAPE: &str = "$$$";

/// Text shown in place of a line that cannot be rendered.
pub const FORMAT_ERROR: &str = "FORMAT ERROR";

/// Replace the brace and line-break escapes.
pub fn decode_escapes(source: &str) -> String {
    source
        .replace("<=", "{")
        .replace("=>", "}")
        .replace(LINE_BREAK_ESCAPE, "\n")
}

/// Whether the text contains live fields and must be re-rendered.
pub fn is_mutable(source: &str) -> bool { decode_escapes(source).contains(VARIABLE_DELIMITER) }

// =============================================================================
// Template
// =============================================================================

/// One parsed template line.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TemplateLine {
    /// Literal text, trailing whitespace removed.
    Static(String),
    /// Composite format string with its variable names.
    Formatted { format: String, variables: Vec<String> },
    /// Renders as [`FORMAT_ERROR`].
    Malformed,
}

/// A parsed page template.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Template {
    lines: Vec<TemplateLine>,
    mutable: bool,
}

impl Template {
    /// Decode and split `source` into lines.
    pub fn parse(source: &str) -> Self {
        let decoded = decode_escapes(source);
        let mutable = decoded.contains(VARIABLE_DELIMITER);
        let lines = decoded.lines().map(parse_line).collect();
        Self { lines, mutable }
    }

    pub fn lines(&self) -> &[TemplateLine] { &self.lines }

    /// Whether any line has a variable list.
    pub const fn is_mutable(&self) -> bool { self.mutable }

    /// Render with the built-in variables.
    pub fn render(
        &self,
        snapshot: &Snapshot,
    ) -> String {
        self.render_with(|name| variables::evaluate(name, snapshot))
    }

    /// Render with a caller-supplied variable source.
    pub fn render_with(
        &self,
        mut evaluate: impl FnMut(&str) -> Value,
    ) -> String {
        let mut out = String::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            match line {
                TemplateLine::Static(text) => out.push_str(text),
                TemplateLine::Formatted { format, variables } => {
                    let args: Vec<Value> = variables.iter().map(|name| evaluate(name)).collect();
                    match format::format_composite(format, &args) {
                        Ok(text) => out.push_str(&text),
                        Err(_) => out.push_str(FORMAT_ERROR),
                    }
                }
                TemplateLine::Malformed => out.push_str(FORMAT_ERROR),
            }
        }
        out
    }
}

fn parse_line(line: &str) -> TemplateLine {
    let parts: Vec<&str> = line.split(VARIABLE_DELIMITER).collect();
    match parts.as_slice() {
        [text] => TemplateLine::Static(text.trim_end().to_owned()),
        [format, list] if !list.trim().is_empty() => {
            let variables: Vec<String> = list.split('$').map(|v| v.trim().to_owned()).collect();
            // Shape errors depend only on the format and the argument count.
            let probe = vec![Value::Unavailable; variables.len()];
            if let Err(e) = format::format_composite(format, &probe) {
                report(line, &e);
                return TemplateLine::Malformed;
            }
            TemplateLine::Formatted {
                format: (*format).to_owned(),
                variables,
            }
        }
        _ => {
            log_warn!("Malformed template line: {}", line);
            TemplateLine::Malformed
        }
    }
}

fn report(
    line: &str,
    error: &FormatError,
) {
    log_warn!("Bad format ({}): {}", error, line);
}

/// Parse and render `template` in one step.
pub fn render(
    template: &str,
    snapshot: &Snapshot,
) -> String {
    Template::parse(template).render(snapshot)
}

// =============================================================================
// Unit Tests
// =============================================================================
