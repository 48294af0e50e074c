//! Raw vessel telemetry supplied by the host simulation.
//!
//! The host fills a [`VesselState`] every frame. Nothing in here is derived:
//! aggregation (resource totals, crew tables, masses) and orbit math happen
//! once per data refresh in [`crate::snapshot`].
//!
//! Units: meters, meters/second, seconds, degrees (angles the pilot reads),
//! radians (mean anomaly), tonnes, kilonewtons, kilopascals.

// =============================================================================
// Vector Math
// =============================================================================

/// Minimal 3D vector for relative positions and velocities.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(
        x: f64,
        y: f64,
        z: f64,
    ) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn dot(
        self,
        other: Self,
    ) -> f64 {
        self.z.mul_add(other.z, self.x.mul_add(other.x, self.y * other.y))
    }

    #[inline]
    pub fn magnitude(self) -> f64 { self.dot(self).sqrt() }
}

// =============================================================================
// Celestial Body and Orbit
// =============================================================================

/// The body the vessel currently orbits.
#[derive(Clone, PartialEq, Debug)]
pub struct BodyInfo {
    pub name: String,
    /// Mean radius (m).
    pub radius: f64,
    /// Standard gravitational parameter GM (m³/s²).
    pub gravitational_parameter: f64,
    /// Height of the atmosphere top above sea level (m), 0 when airless.
    pub atmosphere_depth: f64,
}

impl Default for BodyInfo {
    fn default() -> Self {
        Self {
            name: "Kerbin".into(),
            radius: 600_000.0,
            gravitational_parameter: 3.531_6e12,
            atmosphere_depth: 70_000.0,
        }
    }
}

/// Keplerian elements of an orbit around the current body.
///
/// Hyperbolic orbits have `eccentricity >= 1` and a negative
/// `semi_major_axis`.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct OrbitState {
    /// Semi-major axis (m).
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    /// Inclination (deg).
    pub inclination: f64,
    /// Longitude of the ascending node (deg).
    pub longitude_of_ascending_node: f64,
    /// Argument of periapsis (deg).
    pub argument_of_periapsis: f64,
    /// Mean anomaly at the current time (rad).
    pub mean_anomaly: f64,
}

// =============================================================================
// Vessel Structure
// =============================================================================

/// Flight situation as reported by the simulation.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Situation {
    #[default]
    Prelaunch,
    Landed,
    Splashed,
    Flying,
    SubOrbital,
    Orbiting,
    Escaping,
    Docked,
}

impl Situation {
    /// Upper-case label shown by the `SITUATION` variable.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Prelaunch => "PRELAUNCH",
            Self::Landed => "LANDED",
            Self::Splashed => "SPLASHED",
            Self::Flying => "FLYING",
            Self::SubOrbital => "SUB-ORBITAL",
            Self::Orbiting => "ORBITING",
            Self::Escaping => "ESCAPING",
            Self::Docked => "DOCKED",
        }
    }

    /// Whether the vessel is resting on a surface (or another vessel).
    pub const fn is_grounded(self) -> bool { matches!(self, Self::Prelaunch | Self::Landed | Self::Splashed | Self::Docked) }
}

/// One resource container on a part.
#[derive(Clone, PartialEq, Debug)]
pub struct PartResource {
    pub name: String,
    pub amount: f64,
    pub max_amount: f64,
    /// Tonnes per unit.
    pub density: f64,
}

impl PartResource {
    pub fn new(
        name: &str,
        amount: f64,
        max_amount: f64,
        density: f64,
    ) -> Self {
        Self {
            name: name.into(),
            amount,
            max_amount,
            density,
        }
    }
}

/// A seated crew member.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CrewMember {
    /// Full display name, first word is the given name.
    pub name: String,
}

/// One vessel part: its dry mass, resources and crew seats.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct PartState {
    /// Dry mass (t).
    pub dry_mass: f64,
    pub resources: Vec<PartResource>,
    /// One entry per seat, `None` for an empty seat.
    pub seats: Vec<Option<CrewMember>>,
}

// =============================================================================
// Targets and Maneuvers
// =============================================================================

/// What the current target is.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TargetKind {
    Vessel,
    Body,
    DockingPort,
}

impl TargetKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Vessel => "Vessel",
            Self::Body => "Celestial",
            Self::DockingPort => "Port",
        }
    }
}

/// The selected target, relative to the vessel.
#[derive(Clone, PartialEq, Debug)]
pub struct TargetState {
    pub name: String,
    pub kind: TargetKind,
    /// Target position minus vessel position (m).
    pub relative_position: Vec3,
    /// Target velocity minus vessel velocity (m/s).
    pub relative_velocity: Vec3,
    /// Target orbit around the same body, when known.
    pub orbit: Option<OrbitState>,
}

/// The next planned maneuver node.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ManeuverNode {
    /// Universal time of the node (s).
    pub ut: f64,
    /// Remaining delta-v of the burn (m/s).
    pub delta_v: f64,
}

/// Standard action-group toggles.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ActionGroups {
    pub gear: bool,
    pub brakes: bool,
    pub sas: bool,
    pub rcs: bool,
    pub lights: bool,
    pub abort: bool,
    /// Custom groups AG0..AG9.
    pub custom: [bool; 10],
}

// =============================================================================
// Vessel State
// =============================================================================

/// Everything the display reads about one vessel for one frame.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct VesselState {
    pub name: String,
    pub vessel_type: String,
    pub situation: Situation,

    /// Universal time (s).
    pub universal_time: f64,
    /// Mission elapsed time (s).
    pub mission_time: f64,

    pub body: BodyInfo,
    pub orbit: OrbitState,

    /// Altitude above sea level (m).
    pub altitude: f64,
    /// Terrain height under the vessel (m), negative over the sea floor.
    pub terrain_height: f64,
    pub latitude: f64,
    pub longitude: f64,

    pub heading: f64,
    pub pitch: f64,
    pub roll: f64,
    pub angle_of_attack: f64,
    pub sideslip: f64,

    /// Surface velocity in the local frame: east, north, up (m/s).
    pub surface_velocity: Vec3,
    /// Orbital speed (m/s).
    pub orbital_speed: f64,
    /// Sensed acceleration (m/s²).
    pub acceleration: f64,
    /// Sensed load factor (g).
    pub g_force: f64,

    /// Static pressure (kPa).
    pub static_pressure: f64,
    /// Dynamic pressure (kPa).
    pub dynamic_pressure: f64,
    /// Air density (kg/m³).
    pub atmospheric_density: f64,
    /// Local speed of sound (m/s), 0 in vacuum.
    pub speed_of_sound: f64,

    /// Current total thrust (kN).
    pub thrust: f64,
    /// Thrust at full throttle (kN).
    pub max_thrust: f64,
    /// Throttle setting 0..1.
    pub throttle: f64,
    /// Current specific impulse (s).
    pub specific_impulse: f64,

    pub current_stage: i32,
    pub action_groups: ActionGroups,

    pub parts: Vec<PartState>,
    pub target: Option<TargetState>,
    pub maneuver: Option<ManeuverNode>,
}

impl VesselState {
    /// Number of parts, the structural-change signal for the scheduler.
    #[inline]
    pub fn part_count(&self) -> usize { self.parts.len() }
}
