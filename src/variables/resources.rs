//! Resource totals by well-known name and the `LISTR_` family.
//!
//! A resource the vessel does not carry reads 0 for amount, capacity and
//! percentage. `<X>PERCENT` is a fraction in 0..=1 so that a `P` or `0%`
//! format renders it as a percentage.

use super::{Value, VariableRegistry, parse_indexed};
use crate::snapshot::{ResourceTotal, Snapshot};

/// Variable prefix and the resource it totals.
pub const WELL_KNOWN: [(&str, &str); 9] = [
    ("ELECTRIC", "ElectricCharge"),
    ("FUEL", "LiquidFuel"),
    ("OXIDIZER", "Oxidizer"),
    ("MONOPROP", "MonoPropellant"),
    ("XENON", "XenonGas"),
    ("SOLIDFUEL", "SolidFuel"),
    ("INTAKEAIR", "IntakeAir"),
    ("ORE", "Ore"),
    ("ABLATOR", "Ablator"),
];

pub(super) fn register(r: &mut VariableRegistry) {
    for (prefix, resource) in WELL_KNOWN {
        r.define(prefix, move |s| Value::Number(field(s, resource, |t| t.amount)));
        r.define(format!("{prefix}MAX"), move |s| Value::Number(field(s, resource, |t| t.max_amount)));
        r.define(format!("{prefix}PERCENT"), move |s| Value::Number(field(s, resource, ResourceTotal::fraction)));
    }
    r.number("RESOURCECOUNT", |s| s.resources.len() as f64);
}

fn field(
    s: &Snapshot,
    resource: &str,
    get: impl Fn(&ResourceTotal) -> f64,
) -> f64 {
    s.resource(resource).map_or(0.0, get)
}

/// Resolve `LISTR_<n>_{NAME,VAL,MAX}` against the sorted resource table.
pub(super) fn evaluate_indexed(
    name: &str,
    s: &Snapshot,
) -> Option<Value> {
    let (index, field) = parse_indexed(name, "LISTR_")?;
    let row = s.resources.get(index);
    match field {
        "NAME" => Some(Value::Text(row.map(|r| r.name.clone()).unwrap_or_default())),
        "VAL" => Some(Value::Number(row.map_or(0.0, |r| r.amount))),
        "MAX" => Some(Value::Number(row.map_or(0.0, |r| r.max_amount))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::super::evaluate;
    use super::super::test_support::orbiting_snapshot;
    use super::*;

    #[test]
    fn test_well_known_resources() {
        let s = orbiting_snapshot();
        assert_eq!(evaluate("FUEL", &s), Value::Number(250.456));
        assert_eq!(evaluate("FUELMAX", &s), Value::Number(360.0));
        assert_eq!(evaluate("ELECTRICPERCENT", &s), Value::Number(0.4));
        assert_eq!(evaluate("RESOURCECOUNT", &s), Value::Number(3.0));
    }

    #[test]
    fn test_missing_resource_reads_zero() {
        let s = orbiting_snapshot();
        assert_eq!(evaluate("XENON", &s), Value::Number(0.0));
        assert_eq!(evaluate("XENONMAX", &s), Value::Number(0.0));
        assert_eq!(evaluate("XENONPERCENT", &s), Value::Number(0.0));
    }

    #[test]
    fn test_listr_rows_sorted_by_name() {
        let s = orbiting_snapshot();
        assert_eq!(evaluate("LISTR_0_NAME", &s), Value::Text("ElectricCharge".into()));
        assert_eq!(evaluate("LISTR_1_NAME", &s), Value::Text("LiquidFuel".into()));
        assert_eq!(evaluate("LISTR_2_MAX", &s), Value::Number(440.0));
    }

    #[test]
    fn test_listr_out_of_range() {
        let s = orbiting_snapshot();
        assert_eq!(evaluate("LISTR_9_NAME", &s), Value::Text(String::new()));
        assert_eq!(evaluate("LISTR_9_VAL", &s), Value::Number(0.0));
    }

    #[test]
    fn test_listr_malformed_is_unknown() {
        let s = orbiting_snapshot();
        assert_eq!(evaluate("LISTR_0_AMOUNT", &s), Value::Text("LISTR_0_AMOUNT".into()));
        assert_eq!(evaluate("LISTR_A_NAME", &s), Value::Text("LISTR_A_NAME".into()));
    }
}
