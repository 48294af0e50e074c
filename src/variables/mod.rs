//! Named telemetry variables evaluated against a [`Snapshot`].
//!
//! Variables live in a flat, case-sensitive namespace. Fixed names map to
//! resolver closures in a [`VariableRegistry`] that is built once and shared
//! through [`registry`]. Two indexed families are parsed on the fly:
//!
//! | Family | Fields | Table |
//! |--------|--------|-------|
//! | `LISTR_<n>_<field>` | `NAME`, `VAL`, `MAX` | sorted resource totals |
//! | `CREW_<n>_<field>` | `FIRST`, `LAST`, `FULL`, `PRESENT` | crew seats |
//!
//! Evaluation never fails. A name that matches nothing (including an indexed
//! name with a bad index or field) evaluates to itself as text, so a typo in
//! a page shows up verbatim on the display.
//!
//! # Domains
//!
//! | Module | Names |
//! |--------|-------|
//! | [`flight`] | speeds, forces, altitudes, masses, attitude, time |
//! | [`orbit`] | apsides, period, maneuver node |
//! | [`target`] | distance, closing speed, target orbit |
//! | [`resources`] | per-resource totals, `LISTR_` family |
//! | [`crew`] | seat counts, `CREW_` family |
//! | [`flags`] | action groups |

pub mod crew;
pub mod flags;
pub mod flight;
pub mod orbit;
pub mod resources;
pub mod target;

use core::fmt;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::snapshot::Snapshot;

// =============================================================================
// Values
// =============================================================================

/// Result of evaluating one variable.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    /// Upstream data does not exist right now (e.g. impact time while
    /// landed). Distinct from zero.
    Unavailable,
}

impl Value {
    /// Numeric payload, if any.
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text payload, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_unavailable(&self) -> bool { matches!(self, Self::Unavailable) }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self { Self::Number(n) }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self { Self::Number(if b { 1.0 } else { 0.0 }) }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Self::Text(s.to_owned()) }
}

impl From<String> for Value {
    fn from(s: String) -> Self { Self::Text(s) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self { v.map_or(Self::Unavailable, Into::into) }
}

impl fmt::Display for Value {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&crate::format::format_value(self, None))
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Computes one variable from a snapshot.
pub type Resolver = Box<dyn Fn(&Snapshot) -> Value + Send + Sync>;

/// Name → resolver table with pass-through for unknown names.
pub struct VariableRegistry {
    table: HashMap<String, Resolver>,
}

impl VariableRegistry {
    /// A registry with no fixed names (indexed families still resolve).
    pub fn empty() -> Self { Self { table: HashMap::new() } }

    /// A registry with every built-in variable.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        flight::register(&mut registry);
        orbit::register(&mut registry);
        target::register(&mut registry);
        resources::register(&mut registry);
        crew::register(&mut registry);
        flags::register(&mut registry);
        registry
    }

    /// Add or replace a variable.
    pub fn define(
        &mut self,
        name: impl Into<String>,
        resolver: impl Fn(&Snapshot) -> Value + Send + Sync + 'static,
    ) {
        self.table.insert(name.into(), Box::new(resolver));
    }

    /// Add a plain numeric variable.
    pub fn number(
        &mut self,
        name: &str,
        resolver: fn(&Snapshot) -> f64,
    ) {
        self.define(name, move |s| Value::Number(resolver(s)));
    }

    /// Add a 1/0 flag variable.
    pub fn flag(
        &mut self,
        name: &str,
        resolver: fn(&Snapshot) -> bool,
    ) {
        self.define(name, move |s| Value::from(resolver(s)));
    }

    /// Add a text variable.
    pub fn text(
        &mut self,
        name: &str,
        resolver: fn(&Snapshot) -> String,
    ) {
        self.define(name, move |s| Value::Text(resolver(s)));
    }

    /// Whether `name` is a fixed variable.
    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.table.contains_key(name)
    }

    /// Number of fixed variables.
    pub fn len(&self) -> usize { self.table.len() }

    pub fn is_empty(&self) -> bool { self.table.is_empty() }

    /// Evaluate `name`; unknown names come back as themselves.
    pub fn evaluate(
        &self,
        name: &str,
        snapshot: &Snapshot,
    ) -> Value {
        if let Some(resolver) = self.table.get(name) {
            return resolver(snapshot);
        }
        resources::evaluate_indexed(name, snapshot)
            .or_else(|| crew::evaluate_indexed(name, snapshot))
            .unwrap_or_else(|| Value::Text(name.to_owned()))
    }
}

impl Default for VariableRegistry {
    fn default() -> Self { Self::new() }
}

static REGISTRY: OnceLock<VariableRegistry> = OnceLock::new();

/// The shared built-in registry, created on first use.
pub fn registry() -> &'static VariableRegistry { REGISTRY.get_or_init(VariableRegistry::new) }

/// Evaluate a variable with the built-in registry.
pub fn evaluate(
    name: &str,
    snapshot: &Snapshot,
) -> Value {
    registry().evaluate(name, snapshot)
}

/// Split `<prefix><index>_<field>` into its index and field.
///
/// An index too large for `usize` is still an index, just one past every
/// table, so it maps to `usize::MAX`.
pub(crate) fn parse_indexed<'a>(
    name: &'a str,
    prefix: &str,
) -> Option<(usize, &'a str)> {
    let rest = name.strip_prefix(prefix)?;
    let (index, field) = rest.split_once('_')?;
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((index.parse().unwrap_or(usize::MAX), field))
}

/// Sign-preserving logarithm for bar and tape displays.
///
/// Linear inside ±1, `sign * (1 + log10|x|)` outside, so the curve is
/// continuous through zero.
pub fn pseudo_log10(x: f64) -> f64 {
    if x.abs() <= 1.0 {
        x
    } else {
        x.signum() * (1.0 + x.abs().log10())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================


#[cfg(test)]
mod tests {
    use super::test_support::orbiting_snapshot;
    use super::*;

    #[test]
    fn test_unknown_name_passes_through() {
        let snap = orbiting_snapshot();
        assert_eq!(evaluate("ALTITUD", &snap), Value::Text("ALTITUD".into()));
        assert_eq!(evaluate("", &snap), Value::Text(String::new()));
        assert_eq!(evaluate("altitude", &snap), Value::Text("altitude".into()));
    }

    #[test]
    fn test_registry_is_large_and_shared() {
        assert!(registry().len() >= 120);
        assert!(std::ptr::eq(registry(), registry()));
        assert!(registry().contains("ALTITUDE"));
        assert!(!registry().contains("LISTR_0_NAME"));
    }

    #[test]
    fn test_custom_definitions() {
        let mut reg = VariableRegistry::empty();
        assert!(reg.is_empty());
        reg.number("DOUBLEALT", |s| s.vessel.altitude * 2.0);
        let snap = orbiting_snapshot();
        assert_eq!(reg.evaluate("DOUBLEALT", &snap), Value::Number(200_000.0));
        // Indexed families work without fixed names.
        assert_eq!(reg.evaluate("LISTR_0_NAME", &snap), Value::Text("ElectricCharge".into()));
        assert_eq!(reg.evaluate("ALTITUDE", &snap), Value::Text("ALTITUDE".into()));
    }

    #[test]
    fn test_parse_indexed() {
        assert_eq!(parse_indexed("LISTR_12_VAL", "LISTR_"), Some((12, "VAL")));
        assert_eq!(parse_indexed("LISTR__VAL", "LISTR_"), None);
        assert_eq!(parse_indexed("LISTR_x_VAL", "LISTR_"), None);
        assert_eq!(parse_indexed("LISTR_3", "LISTR_"), None);
        assert_eq!(parse_indexed("CREW_1_FULL", "LISTR_"), None);
        assert_eq!(
            parse_indexed("LISTR_99999999999999999999999_NAME", "LISTR_"),
            Some((usize::MAX, "NAME"))
        );
    }

    #[test]
    fn test_huge_index_is_out_of_range() {
        let snap = orbiting_snapshot();
        let huge = "99999999999999999999999";
        assert_eq!(evaluate(&format!("LISTR_{huge}_NAME"), &snap), Value::Text(String::new()));
        assert_eq!(evaluate(&format!("LISTR_{huge}_VAL"), &snap), Value::Number(0.0));
        assert_eq!(evaluate(&format!("CREW_{huge}_FULL"), &snap), Value::Text(String::new()));
        assert_eq!(evaluate(&format!("CREW_{huge}_PRESENT"), &snap), Value::Number(0.0));
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::from(true), Value::Number(1.0));
        assert_eq!(Value::from(None::<f64>), Value::Unavailable);
        assert_eq!(Value::from(Some(2.5)).as_number(), Some(2.5));
        assert_eq!(Value::from("x").as_text(), Some("x"));
        assert_eq!(Value::Unavailable.to_string(), "N/A");
        assert_eq!(Value::Number(3.0).to_string(), "3");
    }

    #[test]
    fn test_pseudo_log10() {
        assert_eq!(pseudo_log10(0.5), 0.5);
        assert_eq!(pseudo_log10(-1.0), -1.0);
        assert!((pseudo_log10(100.0) - 3.0).abs() < 1e-12);
        assert!((pseudo_log10(-1000.0) + 4.0).abs() < 1e-12);
    }
}
