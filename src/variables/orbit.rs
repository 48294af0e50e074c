//! Orbit shape, apsides, timing and the next maneuver node.

use super::{Value, VariableRegistry};
use crate::snapshot::{STANDARD_GRAVITY, Snapshot};

pub(super) fn register(r: &mut VariableRegistry) {
    r.text("ORBITBODY", |s| s.vessel.body.name.clone());
    r.number("ORBITBODYRADIUS", |s| s.vessel.body.radius);
    r.number("PERIAPSIS", |s| s.orbit.periapsis);
    r.define("APOAPSIS", apoapsis);
    r.number("INCLINATION", |s| s.vessel.orbit.inclination);
    r.number("ECCENTRICITY", |s| s.vessel.orbit.eccentricity);
    r.number("SEMIMAJORAXIS", |s| s.vessel.orbit.semi_major_axis);
    r.number("ORBPERIOD", |s| s.orbit.period);
    r.number("TIMETOAP", |s| s.orbit.time_to_apoapsis);
    r.number("TIMETOPE", |s| s.orbit.time_to_periapsis);
    r.number("NEXTAPSIS", |s| s.orbit.next_apsis_altitude());
    r.number("NEXTAPSISTYPE", |s| f64::from(s.orbit.next_apsis.code()));
    r.text("NEXTAPSISLABEL", |s| s.orbit.next_apsis.label().to_owned());
    r.number("TIMETONEXTAPSIS", |s| s.orbit.time_to_next_apsis());
    r.flag("ORBITMAKESSENSE", |s| s.orbit.valid && !s.vessel.situation.is_grounded());
    r.number("LAN", |s| s.vessel.orbit.longitude_of_ascending_node);
    r.number("ARGUMENTOFPERIAPSIS", |s| s.vessel.orbit.argument_of_periapsis);

    // Maneuver node
    r.flag("MNODEEXISTS", |s| s.vessel.maneuver.is_some());
    r.number("MNODETIMESECS", |s| s.vessel.maneuver.map_or(0.0, |n| n.ut - s.vessel.universal_time));
    r.number("MNODEDV", |s| s.vessel.maneuver.map_or(0.0, |n| n.delta_v));
    r.number("MNODEBURNTIMESECS", burn_time);
}

/// Apoapsis altitude; unavailable on an escape trajectory.
fn apoapsis(s: &Snapshot) -> Value {
    match (s.orbit.valid, s.orbit.apoapsis) {
        (false, _) => Value::Number(0.0),
        (true, Some(ap)) => Value::Number(ap),
        (true, None) => Value::Unavailable,
    }
}

/// Burn time for the node at full thrust, from the rocket equation.
fn burn_time(s: &Snapshot) -> f64 {
    let Some(node) = s.vessel.maneuver else {
        return 0.0;
    };
    let thrust = s.vessel.max_thrust;
    let isp = s.vessel.specific_impulse;
    if thrust <= 0.0 || isp <= 0.0 || s.mass_wet <= 0.0 {
        return 0.0;
    }
    let exhaust_velocity = isp * STANDARD_GRAVITY;
    // Propellant mass burned, tonnes; thrust in kN gives t·m/s².
    let mass_flow = thrust / exhaust_velocity;
    let burned = s.mass_wet * (1.0 - (-node.delta_v.abs() / exhaust_velocity).exp());
    burned / mass_flow
}

#[cfg(test)]
mod tests {
    use super::super::evaluate;
    use super::super::test_support::{orbiting_snapshot, orbiting_vessel};
    use super::*;
    use crate::telemetry::Situation;

    fn number(
        name: &str,
        s: &Snapshot,
    ) -> f64 {
        evaluate(name, s).as_number().unwrap_or(f64::NAN)
    }

    #[test]
    fn test_apsides() {
        let s = orbiting_snapshot();
        assert!((number("PERIAPSIS", &s) - 93_000.0).abs() < 1e-6);
        assert!((number("APOAPSIS", &s) - 107_000.0).abs() < 1e-6);
        assert_eq!(number("ORBITMAKESSENSE", &s), 1.0);
        assert_eq!(evaluate("ORBITBODY", &s), Value::Text("Kerbin".into()));
    }

    #[test]
    fn test_next_apsis_is_apoapsis_after_periapsis_pass() {
        // Mean anomaly 1 rad: apoapsis (at pi) comes before periapsis.
        let s = orbiting_snapshot();
        assert_eq!(number("NEXTAPSISTYPE", &s), 1.0);
        assert_eq!(evaluate("NEXTAPSISLABEL", &s), Value::Text("Ap".into()));
        assert_eq!(number("NEXTAPSIS", &s), number("APOAPSIS", &s));
        assert_eq!(number("TIMETONEXTAPSIS", &s), number("TIMETOAP", &s));
        assert!(number("TIMETOAP", &s) < number("TIMETOPE", &s));
    }

    #[test]
    fn test_escape_trajectory() {
        let mut v = orbiting_vessel();
        v.situation = Situation::Escaping;
        v.orbit.semi_major_axis = -900_000.0;
        v.orbit.eccentricity = 1.5;
        v.orbit.mean_anomaly = 0.5;
        let s = Snapshot::build(&v);
        assert_eq!(evaluate("APOAPSIS", &s), Value::Unavailable);
        assert_eq!(number("ORBPERIOD", &s), 0.0);
        assert_eq!(number("NEXTAPSISTYPE", &s), 0.0);
        assert_eq!(evaluate("NEXTAPSISLABEL", &s), Value::Text(String::new()));
    }

    #[test]
    fn test_grounded_orbit_makes_no_sense() {
        let mut v = orbiting_vessel();
        v.situation = Situation::Landed;
        assert_eq!(number("ORBITMAKESSENSE", &Snapshot::build(&v)), 0.0);
        v.orbit.semi_major_axis = 0.0;
        let s = Snapshot::build(&v);
        assert_eq!(number("APOAPSIS", &s), 0.0);
        assert_eq!(number("ORBPERIOD", &s), 0.0);
    }

    #[test]
    fn test_maneuver_node() {
        let s = orbiting_snapshot();
        assert_eq!(number("MNODEEXISTS", &s), 1.0);
        assert_eq!(number("MNODETIMESECS", &s), 120.0);
        assert_eq!(number("MNODEDV", &s), 150.0);

        let ve = 320.0 * STANDARD_GRAVITY;
        let expected = s.mass_wet * (1.0 - (-150.0 / ve).exp()) * ve / 200.0;
        assert!((number("MNODEBURNTIMESECS", &s) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_no_maneuver_node() {
        let mut v = orbiting_vessel();
        v.maneuver = None;
        let s = Snapshot::build(&v);
        assert_eq!(number("MNODEEXISTS", &s), 0.0);
        assert_eq!(number("MNODETIMESECS", &s), 0.0);
        assert_eq!(number("MNODEDV", &s), 0.0);
        assert_eq!(number("MNODEBURNTIMESECS", &s), 0.0);
    }
}
