//! Cockpit multi-function display core.
//!
//! Turns one frame of vessel telemetry into the characters and pixels of a
//! text-based instrument display:
//!
//! - [`variables`]: named telemetry values (`ALTITUDE`, `LISTR_0_NAME`, ...)
//! - [`template`] / [`format`]: page templates and the numeric format language
//! - [`pages`]: page definitions, selection and button bindings
//! - [`scheduler`]: data / text / draw refresh cadence
//! - [`compositor`]: background and glyph drawing onto any `DrawTarget`
//! - [`monitor`]: one display wiring the above into a per-tick pipeline
//!
//! Supporting modules: [`telemetry`] (host input), [`snapshot`] (per-refresh
//! aggregates), [`screen`] (character grid), [`config`] (TOML), [`persistence`]
//! (active page blob), [`providers`] (code-driven pages), [`log_buffer`],
//! [`profiling`], [`error`], [`colors`] and [`framebuffer`].
//!
//! # Example
//!
//! ```ignore
//! let config = DisplayConfig::from_toml(text)?;
//! let mut store = BlobStore::new();
//! let mut mfd = MonitorDisplay::new(&config, None, ContentProviders::with_builtins(), &store)?;
//! let mut hub = SnapshotHub::new();
//! let mut fb = FrameBuffer::new(320, 240, BLACK);
//!
//! for frame in 0.. {
//!     mfd.tick(frame, &mut hub, &vessel, &mut fb, &mut NoBackgrounds);
//! }
//! ```

// Crate-level lints
#![allow(clippy::cast_possible_truncation)] // f64 -> integer for formatted values and pixel math
#![allow(clippy::cast_precision_loss)] // counters and indices -> f64
#![allow(clippy::cast_possible_wrap)] // u32 -> i32 for pixel coordinates
#![allow(clippy::cast_sign_loss)] // rounded non-negative floats -> usize
#![allow(clippy::struct_excessive_bools)] // RefreshPlan and ActionGroups are plain flag sets

pub mod colors;
pub mod compositor;
pub mod config;
pub mod error;
pub mod format;
pub mod framebuffer;
pub mod log_buffer;
pub mod monitor;
pub mod pages;
pub mod persistence;
pub mod profiling;
pub mod providers;
pub mod scheduler;
pub mod screen;
pub mod snapshot;
pub mod telemetry;
pub mod template;
pub mod variables;

pub use compositor::font::{FontAtlas, FontChoice};
pub use compositor::{BackgroundServices, ComposeReport, HandlerTable, NoBackgrounds, ScreenCompositor};
pub use config::DisplayConfig;
pub use error::{ConfigError, MonitorError, PageError, StoreError};
pub use framebuffer::FrameBuffer;
pub use monitor::MonitorDisplay;
pub use pages::{Page, PageChange, PageRegistry};
pub use persistence::{BlobStore, PersistentStore};
pub use providers::{ContentProviders, PageContentProvider, ScreenSize};
pub use scheduler::{RefreshPlan, RefreshRates, RefreshScheduler};
pub use snapshot::{Snapshot, SnapshotHub};
pub use telemetry::VesselState;
pub use template::Template;
pub use variables::{Value, evaluate};
