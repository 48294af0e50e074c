//! Speeds, forces, altitudes, masses, attitude, time and vessel identity.
//!
//! Units follow the telemetry: metres, m/s, kN, tonnes, degrees, seconds.

use super::{Value, VariableRegistry, pseudo_log10};
use crate::snapshot::Snapshot;

/// Sea-level air density used for equivalent airspeed (kg/m³).
const SEA_LEVEL_DENSITY: f64 = 1.225;

pub(super) fn register(r: &mut VariableRegistry) {
    // Velocity
    r.number("VERTSPEED", |s| s.vertical_speed);
    r.number("VERTSPEEDLOG10", |s| pseudo_log10(s.vertical_speed));
    r.number("VERTSPEEDROUNDED", |s| (s.vertical_speed * 10.0).round() / 10.0);
    r.number("SURFSPEED", |s| s.surface_speed);
    r.number("SURFSPEEDMACH", |s| ratio(s.surface_speed, s.vessel.speed_of_sound));
    r.number("ORBTSPEED", |s| s.vessel.orbital_speed);
    r.number("HORZVELOCITY", |s| s.horizontal_speed);
    r.number("EASPEED", |s| s.surface_speed * (s.vessel.atmospheric_density.max(0.0) / SEA_LEVEL_DENSITY).sqrt());
    r.number("SPEEDOFSOUND", |s| s.vessel.speed_of_sound);

    // Forces and engines
    r.number("ACCEL", |s| s.vessel.acceleration);
    r.number("GFORCE", |s| s.vessel.g_force);
    r.number("LOCALGRAVITY", |s| s.local_gravity);
    r.number("THRUST", |s| s.vessel.thrust);
    r.number("THRUSTMAX", |s| s.vessel.max_thrust);
    r.number("TWR", |s| s.thrust_to_weight(s.vessel.thrust));
    r.number("TWRMAX", |s| s.thrust_to_weight(s.vessel.max_thrust));
    r.number("MAXACCEL", |s| ratio(s.vessel.max_thrust, s.mass_wet));
    r.number("THROTTLE", |s| s.vessel.throttle);
    r.number("REALISP", |s| s.vessel.specific_impulse);
    r.number("HOVERPOINT", hover_point);
    r.number("DYNAMICPRESSURE", |s| s.vessel.dynamic_pressure);
    r.number("ATMPRESSURE", |s| s.vessel.static_pressure);
    r.number("ATMDENSITY", |s| s.vessel.atmospheric_density);

    // Altitude
    r.number("ALTITUDE", |s| s.vessel.altitude);
    r.number("ALTITUDELOG10", |s| pseudo_log10(s.vessel.altitude));
    r.number("RADARALT", Snapshot::radar_altitude);
    r.number("RADARALTLOG10", |s| pseudo_log10(s.radar_altitude()));
    r.number("RADARALTOCEAN", Snapshot::radar_altitude_ocean);
    r.number("TERRAINHEIGHT", |s| s.vessel.terrain_height);
    r.number("DISTTOATMOSPHERETOP", |s| (s.vessel.body.atmosphere_depth - s.vessel.altitude).max(0.0));
    r.number("ATMOSPHEREDEPTH", |s| s.vessel.body.atmosphere_depth);

    // Mass
    r.number("MASS", |s| s.mass_wet);
    r.number("MASSWET", |s| s.mass_wet);
    r.number("MASSDRY", |s| s.mass_dry);
    r.number("MASSRESOURCES", |s| s.mass_wet - s.mass_dry);
    r.number("PARTCOUNT", |s| s.part_count as f64);

    // Attitude and position
    r.number("HEADING", |s| s.vessel.heading);
    r.number("PITCH", |s| s.vessel.pitch);
    r.number("ROLL", |s| s.vessel.roll);
    r.number("ANGLEOFATTACK", |s| s.vessel.angle_of_attack);
    r.number("SIDESLIP", |s| s.vessel.sideslip);
    r.number("LATITUDE", |s| s.vessel.latitude);
    r.number("LONGITUDE", |s| normalize_longitude(s.vessel.longitude));
    r.text("LATITUDE_DMS", |s| dms(s.vessel.latitude, 'N', 'S'));
    r.text("LONGITUDE_DMS", |s| dms(normalize_longitude(s.vessel.longitude), 'E', 'W'));

    // Time
    r.number("UT", |s| s.vessel.universal_time);
    r.number("MET", |s| s.vessel.mission_time);
    r.define("TIMETOIMPACTSECS", |s| Value::from(s.impact.map(|i| i.time)));
    r.define("SPEEDATIMPACT", |s| Value::from(s.impact.map(|i| i.speed)));

    // Vessel
    r.number("STAGE", |s| f64::from(s.vessel.current_stage));
    r.text("VESSELNAME", |s| s.vessel.name.clone());
    r.text("VESSELTYPE", |s| s.vessel.vessel_type.clone());
    r.text("SITUATION", |s| s.vessel.situation.label().to_owned());
}

fn ratio(
    num: f64,
    den: f64,
) -> f64 {
    if den > 0.0 { num / den } else { 0.0 }
}

/// Throttle fraction that balances weight, clamped to 0..=1.
fn hover_point(s: &Snapshot) -> f64 {
    if s.vessel.max_thrust <= 0.0 {
        return 0.0;
    }
    (s.mass_wet * s.local_gravity / s.vessel.max_thrust).clamp(0.0, 1.0)
}

/// Wrap a longitude into -180..=180.
pub fn normalize_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && lon > 0.0 { 180.0 } else { wrapped }
}

/// Degrees as `DD°MM'SS" H` with a hemisphere letter.
pub fn dms(
    degrees: f64,
    positive: char,
    negative: char,
) -> String {
    let hemisphere = if degrees < 0.0 { negative } else { positive };
    let total_seconds = (degrees.abs() * 3_600.0).round() as u64;
    let d = total_seconds / 3_600;
    let m = (total_seconds / 60) % 60;
    let sec = total_seconds % 60;
    format!("{d}°{m:02}'{sec:02}\" {hemisphere}")
}
