//! Per-refresh telemetry snapshot and its single-writer hub.
//!
//! A [`Snapshot`] is built wholesale from a [`VesselState`] each time the
//! data cadence fires and is never mutated afterwards. Building it does the
//! vessel-wide work once (resource totals, crew seats, masses, orbit math) so
//! that variable evaluation is a cheap lookup over precomputed fields.
//!
//! # Derived Tables
//!
//! | Table | Order | Capacity |
//! |-------|-------|----------|
//! | resources | ordinal by name | [`MAX_RESOURCE_TYPES`] |
//! | crew seats | part order, seat order | [`MAX_CREW_SEATS`] |
//!
//! Both tables live in fixed-capacity `heapless::Vec`s. Entries past the
//! capacity are dropped with a warning.
//!
//! # Sharing
//!
//! Displays of one vessel share a [`SnapshotHub`]. The hub rebuilds at most
//! once per host frame and hands out `Arc` clones, so any number of displays
//! ticking in the same frame see the same snapshot.

use std::collections::BTreeMap;
use std::f64::consts::{PI, TAU};
use std::sync::Arc;

use heapless::Vec as FixedVec;

use crate::log_warn;
use crate::telemetry::{BodyInfo, OrbitState, VesselState};

/// Maximum number of distinct resource types tracked per snapshot.
pub const MAX_RESOURCE_TYPES: usize = 32;

/// Maximum number of crew seats tracked per snapshot.
pub const MAX_CREW_SEATS: usize = 32;

/// Standard gravity (m/s²), used for Isp and g-force conversions.
pub const STANDARD_GRAVITY: f64 = 9.806_65;

// =============================================================================
// Derived Tables
// =============================================================================

/// One resource summed over every part of the vessel.
#[derive(Clone, PartialEq, Debug)]
pub struct ResourceTotal {
    pub name: String,
    pub amount: f64,
    pub max_amount: f64,
    /// Current mass (t).
    pub mass: f64,
}

impl ResourceTotal {
    /// Fill level in 0..=1, 0 for a zero-capacity resource.
    pub fn fraction(&self) -> f64 {
        if self.max_amount > 0.0 {
            self.amount / self.max_amount
        } else {
            0.0
        }
    }
}

/// One crew seat, possibly empty.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CrewSeat {
    pub occupant: Option<String>,
}

impl CrewSeat {
    /// Given name: the first word of the occupant's name.
    pub fn first_name(&self) -> &str {
        self.occupant
            .as_deref()
            .and_then(|n| n.split_whitespace().next())
            .unwrap_or("")
    }

    /// Everything after the given name.
    pub fn last_name(&self) -> &str {
        self.occupant
            .as_deref()
            .map(str::trim)
            .and_then(|n| n.split_once(char::is_whitespace))
            .map_or("", |(_, rest)| rest.trim_start())
    }
}

// =============================================================================
// Orbit Summary
// =============================================================================

/// Which apsis comes next along the orbit.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ApsisKind {
    Apoapsis,
    Periapsis,
    /// Escape trajectory past periapsis, or a degenerate orbit.
    #[default]
    None,
}

impl ApsisKind {
    /// Numeric code for `NEXTAPSISTYPE`: 1 Ap, -1 Pe, 0 none.
    pub const fn code(self) -> i32 {
        match self {
            Self::Apoapsis => 1,
            Self::Periapsis => -1,
            Self::None => 0,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Apoapsis => "Ap",
            Self::Periapsis => "Pe",
            Self::None => "",
        }
    }
}

/// Orbit quantities derived from Keplerian elements.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct OrbitSummary {
    /// False when the elements cannot describe an orbit (zero semi-major
    /// axis, no gravity). Every other field is zero then.
    pub valid: bool,
    /// Apoapsis altitude above sea level (m), `None` on escape trajectories.
    pub apoapsis: Option<f64>,
    /// Periapsis altitude above sea level (m).
    pub periapsis: f64,
    /// Orbital period (s), 0 for escape trajectories.
    pub period: f64,
    /// Time to apoapsis (s), 0 for escape trajectories.
    pub time_to_apoapsis: f64,
    /// Time to periapsis (s), 0 once past periapsis on an escape trajectory.
    pub time_to_periapsis: f64,
    pub next_apsis: ApsisKind,
}

impl OrbitSummary {
    /// Derive apsides and timings for an orbit around `body`.
    pub fn compute(
        orbit: &OrbitState,
        body: &BodyInfo,
    ) -> Self {
        let a = orbit.semi_major_axis;
        let e = orbit.eccentricity;
        let mu = body.gravitational_parameter;
        if a == 0.0 || !a.is_finite() || !e.is_finite() || e < 0.0 || mu <= 0.0 {
            return Self::default();
        }

        let mean_motion = (mu / a.abs().powi(3)).sqrt();
        let periapsis = a * (1.0 - e) - body.radius;

        if e < 1.0 {
            let m = orbit.mean_anomaly.rem_euclid(TAU);
            let time_to_periapsis = (TAU - m).rem_euclid(TAU) / mean_motion;
            let time_to_apoapsis = (PI - m).rem_euclid(TAU) / mean_motion;
            let next_apsis = if time_to_apoapsis < time_to_periapsis {
                ApsisKind::Apoapsis
            } else {
                ApsisKind::Periapsis
            };
            Self {
                valid: true,
                apoapsis: Some(a * (1.0 + e) - body.radius),
                periapsis,
                period: TAU / mean_motion,
                time_to_apoapsis,
                time_to_periapsis,
                next_apsis,
            }
        } else {
            // Hyperbolic mean anomaly is negative before periapsis.
            let before_periapsis = orbit.mean_anomaly < 0.0;
            Self {
                valid: true,
                apoapsis: None,
                periapsis,
                period: 0.0,
                time_to_apoapsis: 0.0,
                time_to_periapsis: if before_periapsis { -orbit.mean_anomaly / mean_motion } else { 0.0 },
                next_apsis: if before_periapsis { ApsisKind::Periapsis } else { ApsisKind::None },
            }
        }
    }

    /// Altitude of the next apsis, 0 when there is none.
    pub fn next_apsis_altitude(&self) -> f64 {
        match self.next_apsis {
            ApsisKind::Apoapsis => self.apoapsis.unwrap_or(0.0),
            ApsisKind::Periapsis => self.periapsis,
            ApsisKind::None => 0.0,
        }
    }

    /// Time to the next apsis, 0 when there is none.
    pub fn time_to_next_apsis(&self) -> f64 {
        match self.next_apsis {
            ApsisKind::Apoapsis => self.time_to_apoapsis,
            ApsisKind::Periapsis => self.time_to_periapsis,
            ApsisKind::None => 0.0,
        }
    }
}

/// Angle between two orbital planes (deg).
pub fn relative_inclination(
    a: &OrbitState,
    b: &OrbitState,
) -> f64 {
    let normal = |o: &OrbitState| {
        let (si, ci) = o.inclination.to_radians().sin_cos();
        let (sl, cl) = o.longitude_of_ascending_node.to_radians().sin_cos();
        (si * sl, -si * cl, ci)
    };
    let (ax, ay, az) = normal(a);
    let (bx, by, bz) = normal(b);
    let cos = az.mul_add(bz, ax.mul_add(bx, ay * by)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Predicted surface impact.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Impact {
    /// Seconds until impact.
    pub time: f64,
    /// Total speed at impact (m/s).
    pub speed: f64,
}

// =============================================================================
// Snapshot
// =============================================================================

/// Immutable telemetry bundle for one data refresh.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub vessel: VesselState,
    pub part_count: usize,
    /// Sum of part dry masses (t).
    pub mass_dry: f64,
    /// Dry mass plus resource mass (t).
    pub mass_wet: f64,
    pub resources: FixedVec<ResourceTotal, MAX_RESOURCE_TYPES>,
    pub crew: FixedVec<CrewSeat, MAX_CREW_SEATS>,
    /// Gravitational acceleration at the current altitude (m/s²).
    pub local_gravity: f64,
    pub surface_speed: f64,
    pub vertical_speed: f64,
    pub horizontal_speed: f64,
    pub orbit: OrbitSummary,
    pub target_orbit: Option<OrbitSummary>,
    /// `None` when the vessel is not on a trajectory that meets the surface.
    pub impact: Option<Impact>,
}

impl Snapshot {
    /// Aggregate one frame of telemetry.
    pub fn build(vessel: &VesselState) -> Self {
        let mut totals: BTreeMap<&str, ResourceTotal> = BTreeMap::new();
        let mut mass_dry = 0.0;
        let mut crew = FixedVec::new();
        let mut crew_overflow = false;

        for part in &vessel.parts {
            mass_dry += part.dry_mass;
            for res in &part.resources {
                let total = totals.entry(res.name.as_str()).or_insert_with(|| ResourceTotal {
                    name: res.name.clone(),
                    amount: 0.0,
                    max_amount: 0.0,
                    mass: 0.0,
                });
                total.amount += res.amount;
                total.max_amount += res.max_amount;
                total.mass += res.amount * res.density;
            }
            for seat in &part.seats {
                let seat = CrewSeat {
                    occupant: seat.as_ref().map(|c| c.name.clone()),
                };
                if crew.push(seat).is_err() {
                    crew_overflow = true;
                }
            }
        }
        if crew_overflow {
            log_warn!("Crew table full, {} seats kept", MAX_CREW_SEATS);
        }

        let mut resources = FixedVec::new();
        let mut mass_resources = 0.0;
        for total in totals.into_values() {
            mass_resources += total.mass;
            if let Err(dropped) = resources.push(total) {
                log_warn!("Resource table full, dropping {}", dropped.name);
            }
        }

        let radius = vessel.body.radius + vessel.altitude;
        let local_gravity = if radius > 0.0 {
            vessel.body.gravitational_parameter / (radius * radius)
        } else {
            0.0
        };

        let v = vessel.surface_velocity;
        let horizontal_speed = v.x.hypot(v.y);
        let vertical_speed = v.z;
        let orbit = OrbitSummary::compute(&vessel.orbit, &vessel.body);
        let target_orbit = vessel
            .target
            .as_ref()
            .and_then(|t| t.orbit.as_ref())
            .map(|o| OrbitSummary::compute(o, &vessel.body));
        let impact = predict_impact(vessel, &orbit, local_gravity, vertical_speed, horizontal_speed);

        Self {
            part_count: vessel.parts.len(),
            mass_dry,
            mass_wet: mass_dry + mass_resources,
            resources,
            crew,
            local_gravity,
            surface_speed: v.magnitude(),
            vertical_speed,
            horizontal_speed,
            orbit,
            target_orbit,
            impact,
            vessel: vessel.clone(),
        }
    }

    /// Look up a resource total by its exact name.
    pub fn resource(
        &self,
        name: &str,
    ) -> Option<&ResourceTotal> {
        self.resources
            .binary_search_by(|r| r.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.resources[i])
    }

    /// Height above terrain, counting the sea floor as terrain.
    #[inline]
    pub fn radar_altitude(&self) -> f64 { self.vessel.altitude - self.vessel.terrain_height }

    /// Height above whichever is higher, terrain or sea level.
    #[inline]
    pub fn radar_altitude_ocean(&self) -> f64 { self.vessel.altitude - self.vessel.terrain_height.max(0.0) }

    /// Number of occupied seats.
    pub fn crew_count(&self) -> usize { self.crew.iter().filter(|s| s.occupant.is_some()).count() }

    /// Thrust-to-weight ratio for a thrust in kN.
    pub fn thrust_to_weight(
        &self,
        thrust: f64,
    ) -> f64 {
        let weight = self.mass_wet * self.local_gravity;
        if weight > 0.0 { thrust / weight } else { 0.0 }
    }
}

fn predict_impact(
    vessel: &VesselState,
    orbit: &OrbitSummary,
    gravity: f64,
    vertical_speed: f64,
    horizontal_speed: f64,
) -> Option<Impact> {
    if vessel.situation.is_grounded() {
        return None;
    }
    let surface = vessel.terrain_height.max(0.0);
    // A closed orbit whose periapsis clears the surface never comes down.
    if orbit.valid && orbit.apoapsis.is_some() && orbit.periapsis > surface {
        return None;
    }
    // Escape trajectories that are climbing never come down either.
    if orbit.valid && orbit.apoapsis.is_none() && vertical_speed >= 0.0 {
        return None;
    }

    let height = (vessel.altitude - surface).max(0.0);
    let (time, vertical_at_impact) = if gravity > 0.0 {
        let discriminant = vertical_speed.mul_add(vertical_speed, 2.0 * gravity * height);
        let root = discriminant.sqrt();
        ((vertical_speed + root) / gravity, root)
    } else if vertical_speed < 0.0 {
        (height / -vertical_speed, -vertical_speed)
    } else {
        return None;
    };

    Some(Impact {
        time,
        speed: horizontal_speed.hypot(vertical_at_impact),
    })
}

// =============================================================================
// Snapshot Hub
// =============================================================================

/// Single owner of a vessel's current snapshot.
///
/// `refresh` is idempotent within one host frame: the first call rebuilds,
/// later calls in the same frame return the same `Arc`. A call for a new
/// frame replaces the snapshot (last writer wins).
#[derive(Debug, Default)]
pub struct SnapshotHub {
    frame: Option<u64>,
    current: Option<Arc<Snapshot>>,
    rebuilds: u64,
}

impl SnapshotHub {
    pub const fn new() -> Self {
        Self {
            frame: None,
            current: None,
            rebuilds: 0,
        }
    }

    /// Get the snapshot for `frame`, rebuilding it on the first call.
    pub fn refresh(
        &mut self,
        frame: u64,
        vessel: &VesselState,
    ) -> Arc<Snapshot> {
        if self.frame == Some(frame) {
            if let Some(current) = &self.current {
                return Arc::clone(current);
            }
        }
        let snapshot = Arc::new(Snapshot::build(vessel));
        self.current = Some(Arc::clone(&snapshot));
        self.frame = Some(frame);
        self.rebuilds += 1;
        snapshot
    }

    /// Most recent snapshot, if any frame has been refreshed.
    pub fn latest(&self) -> Option<Arc<Snapshot>> { self.current.clone() }

    /// How many times a snapshot was actually rebuilt.
    #[inline]
    pub const fn rebuilds(&self) -> u64 { self.rebuilds }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{CrewMember, PartResource, PartState, Situation, Vec3};

    fn crew(name: &str) -> Option<CrewMember> { Some(CrewMember { name: name.into() }) }

    fn sample_vessel() -> VesselState {
        VesselState {
            parts: vec![
                PartState {
                    dry_mass: 1.0,
                    resources: vec![
                        PartResource::new("Oxidizer", 110.0, 220.0, 0.005),
                        PartResource::new("LiquidFuel", 90.0, 180.0, 0.005),
                    ],
                    seats: vec![crew("Jebediah Kerman"), None],
                },
                PartState {
                    dry_mass: 0.5,
                    resources: vec![
                        PartResource::new("LiquidFuel", 10.0, 20.0, 0.005),
                        PartResource::new("ElectricCharge", 50.0, 100.0, 0.0),
                    ],
                    seats: vec![crew("Valentina Kerman")],
                },
            ],
            ..VesselState::default()
        }
    }

    #[test]
    fn test_resources_summed_and_sorted() {
        let snap = Snapshot::build(&sample_vessel());
        let names: Vec<&str> = snap.resources.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["ElectricCharge", "LiquidFuel", "Oxidizer"]);

        let fuel = snap.resource("LiquidFuel").map(|r| (r.amount, r.max_amount));
        assert_eq!(fuel, Some((100.0, 200.0)));
        assert!(snap.resource("Ore").is_none());
    }

    #[test]
    fn test_masses() {
        let snap = Snapshot::build(&sample_vessel());
        assert!((snap.mass_dry - 1.5).abs() < 1e-9);
        // 210 units of fuel and oxidizer at 5 kg each
        assert!((snap.mass_wet - 2.5).abs() < 1e-9);
        assert_eq!(snap.part_count, 2);
    }

    #[test]
    fn test_crew_table_in_part_order() {
        let snap = Snapshot::build(&sample_vessel());
        assert_eq!(snap.crew.len(), 3);
        assert_eq!(snap.crew[0].first_name(), "Jebediah");
        assert_eq!(snap.crew[0].last_name(), "Kerman");
        assert_eq!(snap.crew[1].occupant, None);
        assert_eq!(snap.crew[2].first_name(), "Valentina");
        assert_eq!(snap.crew_count(), 2);
    }

    #[test]
    fn test_resource_table_capacity() {
        let mut vessel = VesselState::default();
        let resources = (0..40)
            .map(|i| PartResource::new(&format!("R{i:02}"), 1.0, 1.0, 0.0))
            .collect();
        vessel.parts.push(PartState {
            resources,
            ..PartState::default()
        });
        let snap = Snapshot::build(&vessel);
        assert_eq!(snap.resources.len(), MAX_RESOURCE_TYPES);
        assert_eq!(snap.resources[0].name, "R00");
    }

    #[test]
    fn test_circular_orbit_summary() {
        let body = BodyInfo::default();
        let orbit = OrbitState {
            semi_major_axis: 700_000.0,
            eccentricity: 0.0,
            mean_anomaly: 1.0,
            ..OrbitState::default()
        };
        let summary = OrbitSummary::compute(&orbit, &body);
        assert!(summary.valid);
        assert!((summary.periapsis - 100_000.0).abs() < 1e-6);
        assert_eq!(summary.apoapsis.map(f64::round), Some(100_000.0));
        let expected = TAU * (700_000.0_f64.powi(3) / body.gravitational_parameter).sqrt();
        assert!((summary.period - expected).abs() < 1e-6);
        // One radian past periapsis, so apoapsis comes first.
        let mean_motion = TAU / expected;
        assert!((summary.time_to_apoapsis - (PI - 1.0) / mean_motion).abs() < 1e-6);
        assert!((summary.time_to_periapsis - (TAU - 1.0) / mean_motion).abs() < 1e-6);
        assert_eq!(summary.next_apsis, ApsisKind::Apoapsis);
    }

    #[test]
    fn test_hyperbolic_orbit_has_no_apoapsis() {
        let orbit = OrbitState {
            semi_major_axis: -2_000_000.0,
            eccentricity: 1.5,
            mean_anomaly: -0.5,
            ..OrbitState::default()
        };
        let summary = OrbitSummary::compute(&orbit, &BodyInfo::default());
        assert!(summary.valid);
        assert_eq!(summary.apoapsis, None);
        assert_eq!(summary.period, 0.0);
        assert_eq!(summary.next_apsis, ApsisKind::Periapsis);
        assert!(summary.time_to_periapsis > 0.0);
    }

    #[test]
    fn test_degenerate_orbit() {
        let summary = OrbitSummary::compute(&OrbitState::default(), &BodyInfo::default());
        assert!(!summary.valid);
        assert_eq!(summary.period, 0.0);
        assert_eq!(summary.next_apsis, ApsisKind::None);
    }

    #[test]
    fn test_relative_inclination() {
        let a = OrbitState {
            inclination: 10.0,
            ..OrbitState::default()
        };
        let b = OrbitState {
            inclination: 35.0,
            ..OrbitState::default()
        };
        assert!((relative_inclination(&a, &b) - 25.0).abs() < 1e-9);
        assert!(relative_inclination(&a, &a).abs() < 1e-6);
    }

    #[test]
    fn test_impact_prediction() {
        let mut vessel = VesselState {
            situation: Situation::Flying,
            altitude: 1_000.0,
            terrain_height: 0.0,
            surface_velocity: Vec3::new(0.0, 0.0, -10.0),
            ..VesselState::default()
        };
        let snap = Snapshot::build(&vessel);
        let impact = snap.impact.map(|i| i.time);
        assert!(impact.is_some_and(|t| t > 10.0 && t < 100.0));

        vessel.situation = Situation::Landed;
        assert!(Snapshot::build(&vessel).impact.is_none());
    }

    #[test]
    fn test_hub_rebuilds_once_per_frame() {
        let vessel = sample_vessel();
        let mut hub = SnapshotHub::new();
        assert!(hub.latest().is_none());

        let a = hub.refresh(7, &vessel);
        let b = hub.refresh(7, &vessel);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(hub.rebuilds(), 1);

        let c = hub.refresh(8, &vessel);
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(hub.rebuilds(), 2);
        assert!(hub.latest().is_some_and(|l| Arc::ptr_eq(&l, &c)));
    }
}
