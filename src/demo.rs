//! Synthetic flight and built-in demo configuration for the simulator.

use cockpit_mfd::telemetry::{
    ActionGroups, CrewMember, OrbitState, PartResource, PartState, Situation, TargetKind, TargetState, Vec3,
    VesselState,
};

/// Demo display with one page per background kind.
pub const DEMO_CONFIG: &str = r#"
id = "mfd-demo"
columns = 40
rows = 20
refresh_draw_rate = 1

[[page]]
name = "flight"
default = true
button = "B1"
text = '''
FLIGHT <=0,-12=> MET <=1:METhh:mm:ss=>$&$SITUATION$MET
ALT   <=0:SIP6=>m   RADAR <=1:SIP6=>m$&$ALTITUDE$RADARALT
VSPD  <=0,9:F1=> m/s$&$VERTSPEED
SURF  <=0,9:F1=> m/s$&$SURFSPEED
TWR   <=0:F2=>  THROTTLE <=1:F2=>$&$TWR$THROTTLE
FUEL  <=0:F1=> / <=1:F0=>$&$FUEL$FUELMAX
STAGE <=0=>  PARTS <=1=>$&$STAGE$PARTCOUNT
LAT   <=0=>$&$LATITUDE_DMS
LON   <=0=>$&$LONGITUDE_DMS
'''

[[page]]
name = "orbit"
button = "B1"
text = '''
ORBIT <=0=>$&$ORBITBODY
AP  <=0:SIP6=>m  T- <=1:METmm:ss=>$&$APOAPSIS$TIMETOAP
PE  <=0:SIP6=>m  T- <=1:METmm:ss=>$&$PERIAPSIS$TIMETOPE
INC <=0:F2=>°  ECC <=1:F3=>$&$INCLINATION$ECCENTRICITY
PERIOD <=0:METh:mm:ss=>$&$ORBPERIOD
'''

[[page]]
name = "resources"
button = "B2"
text_handler = "resource_list"

[[page]]
name = "horizon"
button = "B3"
background = "handler"
background_handler = "horizon"
text = "PITCH <=0,6:F1=>  HDG <=1,5:F0=>$&$PITCH$HEADING"

[[page]]
name = "docking"
button = "B3"
background = "camera"
camera_transform = "DockingCam"
fov = 40.0
text = "TGT <=0=>  <=1:SIP6=>m$&$TARGETNAME$TARGETDISTANCE"

[[page]]
name = "log"
button = "B4"
text_handler = "log_viewer"
"#;

/// Simulated seconds per display tick.
pub const TICK_SECONDS: f64 = 0.5;

/// Booster separation time (s).
const STAGING_TIME: f64 = 120.0;

/// Time the vessel reaches its parking orbit (s).
const ORBIT_TIME: f64 = 240.0;

const KERBIN_RADIUS: f64 = 600_000.0;

/// Oscillate between `min` and `max`.
fn fake_signal(
    t: f64,
    min: f64,
    max: f64,
    freq: f64,
) -> f64 {
    let normalized = (t * freq).sin().mul_add(0.5, 0.5);
    min + normalized * (max - min)
}

/// Ease from 0 to 1 over `0..=1`.
fn smoothstep(x: f64) -> f64 {
    let x = x.clamp(0.0, 1.0);
    x * x * (3.0 - 2.0 * x)
}

/// Vessel state `t` seconds after launch.
///
/// Climbs to a 100 km orbit, drops its booster at [`STAGING_TIME`] and burns
/// fuel while the throttle is up.
pub fn vessel_at(t: f64) -> VesselState {
    let progress = smoothstep(t / ORBIT_TIME);
    let altitude = 100_000.0 * progress;
    let climb_rate = if t < ORBIT_TIME {
        100_000.0 * 6.0 * (t / ORBIT_TIME) * (1.0 - t / ORBIT_TIME) / ORBIT_TIME
    } else {
        0.0
    };
    let horizontal = 2_246.0 * progress;
    let throttle = if t < ORBIT_TIME { 1.0 - 0.6 * progress } else { 0.0 };
    let situation = match t {
        t if t < 1.0 => Situation::Prelaunch,
        _ if altitude < 70_000.0 => Situation::Flying,
        t if t < ORBIT_TIME => Situation::SubOrbital,
        _ => Situation::Orbiting,
    };

    let burned = 400.0 * progress;
    let mut parts = vec![PartState {
        dry_mass: 1.8,
        resources: vec![
            PartResource::new("ElectricCharge", fake_signal(t, 120.0, 150.0, 0.05), 150.0, 0.0),
            PartResource::new("MonoPropellant", 30.0, 30.0, 0.004),
        ],
        seats: vec![
            Some(CrewMember { name: "Jebediah Kerman".into() }),
            Some(CrewMember { name: "Valentina Kerman".into() }),
            None,
        ],
    }];
    parts.push(PartState {
        dry_mass: 2.5,
        resources: vec![
            PartResource::new("LiquidFuel", (720.0 - burned).max(0.0), 720.0, 0.005),
            PartResource::new("Oxidizer", (880.0 - burned * 1.22).max(0.0), 880.0, 0.005),
        ],
        seats: Vec::new(),
    });
    if t < STAGING_TIME {
        parts.push(PartState {
            dry_mass: 1.5,
            resources: vec![PartResource::new(
                "SolidFuel",
                (820.0 * (1.0 - t / STAGING_TIME)).max(0.0),
                820.0,
                0.0075,
            )],
            seats: Vec::new(),
        });
    }

    let semi_major_axis = KERBIN_RADIUS + 20_000.0 + 80_000.0 * progress;
    VesselState {
        name: "Kerbal X".into(),
        vessel_type: "Ship".into(),
        situation,
        universal_time: 5_000_000.0 + t,
        mission_time: t,
        orbit: OrbitState {
            semi_major_axis,
            eccentricity: 0.95 - 0.94 * progress,
            inclination: 0.1 + 0.4 * progress,
            mean_anomaly: t * 0.01,
            ..OrbitState::default()
        },
        altitude,
        terrain_height: if altitude < 10.0 { 70.0 } else { fake_signal(t, -400.0, 1_800.0, 0.02) },
        latitude: -0.097,
        longitude: -74.557 + t * 0.02,
        heading: 90.0,
        pitch: 90.0 - 85.0 * progress,
        roll: fake_signal(t, -2.0, 2.0, 0.3),
        surface_velocity: Vec3::new(horizontal, 0.0, climb_rate),
        orbital_speed: horizontal + 174.0,
        acceleration: 25.0 * throttle,
        g_force: 1.0 + 1.5 * throttle,
        static_pressure: 101.325 * (-altitude / 5_600.0).exp(),
        dynamic_pressure: fake_signal(t, 0.0, 20.0, 0.02) * (1.0 - progress),
        atmospheric_density: 1.225 * (-altitude / 5_600.0).exp(),
        speed_of_sound: if altitude < 70_000.0 { 340.0 } else { 0.0 },
        thrust: 400.0 * throttle,
        max_thrust: 400.0,
        throttle,
        specific_impulse: 300.0 + 45.0 * progress,
        current_stage: if t < STAGING_TIME { 2 } else { 1 },
        action_groups: ActionGroups {
            sas: true,
            lights: t > ORBIT_TIME,
            ..ActionGroups::default()
        },
        parts,
        target: Some(TargetState {
            name: "Mun Station".into(),
            kind: TargetKind::Vessel,
            relative_position: Vec3::new(42_000.0 - 60.0 * t, 18_000.0, -300.0),
            relative_velocity: Vec3::new(-60.0, 0.0, 0.5),
            orbit: Some(OrbitState {
                semi_major_axis: 720_000.0,
                eccentricity: 0.001,
                inclination: 1.2,
                ..OrbitState::default()
            }),
        }),
        ..VesselState::default()
    }
}
