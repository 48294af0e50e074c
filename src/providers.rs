//! Named text providers for pages whose text is computed in code.
//!
//! A page with `text_handler = "<name>"` gets its text from the provider
//! registered under that name instead of a template. Providers run on every
//! text refresh and are sized to the display grid.
//!
//! Built-ins:
//!
//! | Name | Content |
//! |------|---------|
//! | `log_viewer` | newest log lines, one per row |
//! | `resource_list` | every resource with a fill bar |

use core::fmt::Write as _;

use crate::log_buffer::recent_logs;
use crate::snapshot::Snapshot;

/// Character grid of the display.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ScreenSize {
    pub columns: usize,
    pub rows: usize,
}

/// Produces page text from the current snapshot.
pub trait PageContentProvider {
    fn produce(
        &mut self,
        snapshot: &Snapshot,
        size: ScreenSize,
    ) -> String;
}

impl<F> PageContentProvider for F
where
    F: FnMut(&Snapshot, ScreenSize) -> String,
{
    fn produce(
        &mut self,
        snapshot: &Snapshot,
        size: ScreenSize,
    ) -> String {
        self(snapshot, size)
    }
}

// =============================================================================
// Built-in Providers
// =============================================================================

/// Name of the built-in log page provider.
pub const LOG_VIEWER: &str = "log_viewer";

/// Name of the built-in resource table provider.
pub const RESOURCE_LIST: &str = "resource_list";

/// Tail of the global log buffer, newest line at the bottom.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogPageProvider;

impl PageContentProvider for LogPageProvider {
    fn produce(
        &mut self,
        _snapshot: &Snapshot,
        size: ScreenSize,
    ) -> String {
        let logs = recent_logs();
        let skip = logs.len().saturating_sub(size.rows);
        let mut out = String::new();
        for entry in logs.iter().skip(skip) {
            let mut line = String::new();
            let _ = write!(
                line,
                "{} {:>4}.{:01} {}",
                entry.level.prefix(),
                entry.timestamp_ms / 1000,
                (entry.timestamp_ms % 1000) / 100,
                entry.message
            );
            if !out.is_empty() {
                out.push('\n');
            }
            out.extend(line.chars().take(size.columns));
        }
        out
    }
}

/// One row per resource: name, percentage and a `#`/`-` bar.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResourceListProvider;

impl PageContentProvider for ResourceListProvider {
    fn produce(
        &mut self,
        snapshot: &Snapshot,
        size: ScreenSize,
    ) -> String {
        const NAME_WIDTH: usize = 14;
        const PERCENT_WIDTH: usize = 5;

        let bar_width = size.columns.saturating_sub(NAME_WIDTH + PERCENT_WIDTH + 2);
        let mut out = String::new();
        for (row, total) in snapshot.resources.iter().take(size.rows).enumerate() {
            if row > 0 {
                out.push('\n');
            }
            let fraction = total.fraction().clamp(0.0, 1.0);
            let filled = (fraction * bar_width as f64).round() as usize;
            let name: String = total.name.chars().take(NAME_WIDTH).collect();
            let _ = write!(
                out,
                "{name:<NAME_WIDTH$} {:>4}% {}{}",
                (fraction * 100.0).round() as u32,
                "#".repeat(filled),
                "-".repeat(bar_width - filled)
            );
        }
        out
    }
}

// =============================================================================
// Registry
// =============================================================================

type BoxedProvider = Box<dyn PageContentProvider + Send>;

/// Provider table owned by one display.
#[derive(Default)]
pub struct ContentProviders {
    providers: Vec<(String, BoxedProvider)>,
}

impl ContentProviders {
    /// Empty table.
    pub fn new() -> Self { Self::default() }

    /// Table with `log_viewer` and `resource_list`.
    pub fn with_builtins() -> Self {
        let mut providers = Self::new();
        providers.register(LOG_VIEWER, LogPageProvider);
        providers.register(RESOURCE_LIST, ResourceListProvider);
        providers
    }

    /// Add or replace a provider.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        provider: impl PageContentProvider + Send + 'static,
    ) {
        let name = name.into();
        let boxed: BoxedProvider = Box::new(provider);
        match self.providers.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = boxed,
            None => self.providers.push((name, boxed)),
        }
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.providers.iter().any(|(n, _)| n == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> { self.providers.iter().map(|(n, _)| n.as_str()) }

    /// Run the named provider; `None` if it is not registered.
    pub fn produce(
        &mut self,
        name: &str,
        snapshot: &Snapshot,
        size: ScreenSize,
    ) -> Option<String> {
        self.providers
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p.produce(snapshot, size))
    }
}

impl core::fmt::Debug for ContentProviders {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
