//! Cockpit MFD simulator.
//!
//! Runs a scripted flight through one display and shows what it renders:
//!
//! - the character screen is printed every time a full refresh happens
//!   (first frame, page change, staging)
//! - the final pixel frame is written as a PNG
//! - the log buffer is dumped at the end
//!
//! ```text
//! mfd-sim [config.toml] [out.png]
//! ```
//!
//! Without a config the built-in demo display is used. The active page is
//! persisted in `mfd-sim.store` in the temp directory, so a second run
//! starts on the page the first one ended on.
//!
//! # Buttons
//!
//! | Button | Pages |
//! |--------|-------|
//! | B1 | flight, orbit |
//! | B2 | resources |
//! | B3 | horizon, docking camera |
//! | B4 | log |

mod demo;

use std::cell::Cell;
use std::error::Error;
use std::process::ExitCode;
use std::rc::Rc;

use cockpit_mfd::colors::{GROUND, SKY};
use cockpit_mfd::log_buffer::recent_logs;
use cockpit_mfd::{BlobStore, ContentProviders, DisplayConfig, HandlerTable, MonitorDisplay, SnapshotHub, log_info};
use demo::{DEMO_CONFIG, TICK_SECONDS, vessel_at};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay};

/// Ticks to simulate (5 minutes of flight).
const TOTAL_FRAMES: u64 = 600;

/// Button presses by frame.
const BUTTON_SCRIPT: [(u64, &str); 7] = [
    (40, "B1"),
    (120, "B2"),
    (200, "B3"),
    (260, "B3"),
    (320, "B4"),
    (400, "B1"),
    (500, "B1"),
];

type Display = SimulatorDisplay<Rgb565>;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("mfd-sim: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let config_path = args.next();
    let png_path = args.next().unwrap_or_else(|| "mfd-sim.png".to_owned());

    // ==========================================================================
    // Display Setup
    // ==========================================================================

    let (config, base_dir) = match &config_path {
        Some(path) => {
            let loaded = DisplayConfig::load(path)?;
            (loaded.config, Some(loaded.base_dir))
        }
        None => (DisplayConfig::from_toml(DEMO_CONFIG)?, None),
    };
    let mut store = BlobStore::open(std::env::temp_dir().join("mfd-sim.store"))?;
    let mut mfd = MonitorDisplay::new(&config, base_dir.as_deref(), ContentProviders::with_builtins(), &store)?;
    for rejected in mfd.rejected_pages() {
        eprintln!("skipped {rejected}");
    }

    let mut display: Display = SimulatorDisplay::new(mfd.pixel_size());
    let pitch = Rc::new(Cell::new(0.0_f64));
    let mut backgrounds = HandlerTable::new().handler("horizon", {
        let pitch = Rc::clone(&pitch);
        move |target: &mut Display| draw_horizon(target, pitch.get())
    });
    let mut hub = SnapshotHub::new();

    // ==========================================================================
    // Main Loop
    // ==========================================================================

    for frame in 0..TOTAL_FRAMES {
        let vessel = vessel_at(frame as f64 * TICK_SECONDS);
        pitch.set(vessel.pitch);

        if let Some((_, button)) = BUTTON_SCRIPT.iter().find(|(f, _)| *f == frame) {
            if let Some(change) = mfd.press_button(button, &mut store) {
                log_info!("{}: page {} -> {}", button, change.previous, change.current);
            }
        }

        let plan = mfd.tick(frame, &mut hub, &vessel, &mut display, &mut backgrounds);
        if plan.forced {
            print_screen(frame, &mfd);
        }
    }

    // ==========================================================================
    // Report
    // ==========================================================================

    let metrics = mfd.metrics();
    println!(
        "{} ticks: {} data, {} text, {} draws, {} forced, {} glyphs ({} skipped), {} fallbacks",
        metrics.ticks,
        metrics.data_refreshes,
        metrics.text_renders,
        metrics.draws,
        metrics.forced_refreshes,
        metrics.glyphs_drawn,
        metrics.glyphs_skipped,
        metrics.background_fallbacks,
    );
    println!(
        "tick time: avg {} us, min {} us, max {} us, snapshots built {}",
        metrics.tick_time_avg_us(),
        metrics.tick_time_min_us,
        metrics.tick_time_max_us,
        hub.rebuilds(),
    );

    for entry in recent_logs() {
        println!("{} {:>6} {}", entry.level.prefix(), entry.timestamp_ms, entry.message);
    }

    let output_settings = OutputSettingsBuilder::new().scale(2).build();
    display.to_rgb_output_image(&output_settings).save_png(&png_path)?;
    println!("last frame written to {png_path}");
    Ok(())
}

/// Print the character grid with a frame around it.
fn print_screen(
    frame: u64,
    mfd: &MonitorDisplay,
) {
    let screen = mfd.screen();
    println!("frame {frame}: {} [{}]", mfd.active_page().name, mfd.display_id());
    println!("+{}+", "-".repeat(screen.columns()));
    for row in 0..screen.rows() {
        println!("|{}|", screen.line(row).iter().collect::<String>());
    }
    println!("+{}+", "-".repeat(screen.columns()));
}

/// Sky over ground, the horizon shifted by `pitch` degrees.
fn draw_horizon(
    target: &mut Display,
    pitch: f64,
) -> bool {
    let size = target.size();
    let half = (size.height / 2) as i32;
    let offset = (pitch.clamp(-90.0, 90.0) / 90.0 * f64::from(half)) as i32;
    let horizon = (half + offset).clamp(0, size.height as i32) as u32;

    let sky = Rectangle::new(Point::zero(), Size::new(size.width, horizon));
    let ground = Rectangle::new(Point::new(0, horizon as i32), Size::new(size.width, size.height - horizon));
    target.fill_solid(&sky, SKY).is_ok() && target.fill_solid(&ground, GROUND).is_ok()
}
