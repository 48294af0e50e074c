//! The current navigation target.
//!
//! With no target set, numbers read 0 and text reads empty.

use super::VariableRegistry;
use crate::snapshot::{OrbitSummary, Snapshot, relative_inclination};
use crate::telemetry::{OrbitState, TargetState};

pub(super) fn register(r: &mut VariableRegistry) {
    r.flag("TARGETEXISTS", |s| s.vessel.target.is_some());
    r.text("TARGETNAME", |s| target(s).map(|t| t.name.clone()).unwrap_or_default());
    r.text("TARGETTYPE", |s| target(s).map(|t| t.kind.label().to_owned()).unwrap_or_default());
    r.number("TARGETDISTANCE", |s| target(s).map_or(0.0, |t| t.relative_position.magnitude()));
    r.number("TARGETDISTANCEX", |s| target(s).map_or(0.0, |t| t.relative_position.x));
    r.number("TARGETDISTANCEY", |s| target(s).map_or(0.0, |t| t.relative_position.y));
    r.number("TARGETDISTANCEZ", |s| target(s).map_or(0.0, |t| t.relative_position.z));
    r.number("TRGTSPEED", |s| target(s).map_or(0.0, |t| t.relative_velocity.magnitude()));
    r.number("APPROACHSPEED", |s| target(s).map_or(0.0, approach_speed));
    r.number("TARGETAPOAPSIS", |s| summary(s).and_then(|o| o.apoapsis).unwrap_or(0.0));
    r.number("TARGETPERIAPSIS", |s| summary(s).map_or(0.0, |o| o.periapsis));
    r.number("TARGETINCLINATION", |s| target_orbit(s).map_or(0.0, |o| o.inclination));
    r.number("TARGETECCENTRICITY", |s| target_orbit(s).map_or(0.0, |o| o.eccentricity));
    r.number("TARGETORBITALPERIOD", |s| summary(s).map_or(0.0, |o| o.period));
    r.number("RELATIVEINCLINATION", |s| {
        target_orbit(s).map_or(0.0, |o| relative_inclination(&s.vessel.orbit, o))
    });
}

fn target(s: &Snapshot) -> Option<&TargetState> { s.vessel.target.as_ref() }

fn target_orbit(s: &Snapshot) -> Option<&OrbitState> { target(s).and_then(|t| t.orbit.as_ref()) }

fn summary(s: &Snapshot) -> Option<&OrbitSummary> { s.target_orbit.as_ref().filter(|o| o.valid) }

/// Closing speed along the line of sight, positive when closing.
fn approach_speed(t: &TargetState) -> f64 {
    let distance = t.relative_position.magnitude();
    if distance <= 0.0 {
        return 0.0;
    }
    -t.relative_position.dot(t.relative_velocity) / distance
}
