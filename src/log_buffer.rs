//! Log buffer with levels and timestamps for on-screen log viewing.
//!
//! Provides a circular buffer of log entries that the `log_viewer` page
//! provider renders as display text. Each entry has a log level, message, and
//! timestamp.
//!
//! # Log Levels
//!
//! - `Trace`: Dark gray - verbose debugging
//! - `Debug`: Gray - debugging information
//! - `Info`: Green - normal operation
//! - `Warn`: Yellow - warnings (bad page definitions, skipped glyphs)
//! - `Error`: Red - errors
//!
//! # Usage
//!
//! ```ignore
//! use cockpit_mfd::{log_info, log_warn};
//!
//! log_info!("Display {} loaded {} pages", id, count);
//! log_warn!("Skipping page {}: {}", index, err);
//! ```
//!
//! Writers never block: if the buffer is locked by another thread the entry
//! is dropped.

use std::sync::{Mutex, OnceLock};
use std::time::Instant;

use embedded_graphics::pixelcolor::Rgb565;
use heapless::String;

use crate::colors::{DARK_GRAY, GRAY, GREEN, RED, YELLOW};

/// Maximum number of log entries to keep.
pub const LOG_ENTRIES: usize = 32;

/// Maximum characters per log message.
pub const LOG_MSG_LEN: usize = 64;

/// Fixed-capacity line used by the `log_*!` macros.
pub type LogLine = String<LOG_MSG_LEN>;

/// Log severity level.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
#[repr(u8)]
pub enum LogLevel {
    /// Verbose debugging (dark gray)
    Trace = 0,
    /// Debug information (gray)
    Debug = 1,
    /// Normal operation (green)
    #[default]
    Info = 2,
    /// Warnings (yellow)
    Warn = 3,
    /// Errors (red)
    Error = 4,
}

impl LogLevel {
    /// Get the display color for this log level.
    pub const fn color(self) -> Rgb565 {
        match self {
            Self::Trace => DARK_GRAY,
            Self::Debug => GRAY,
            Self::Info => GREEN,
            Self::Warn => YELLOW,
            Self::Error => RED,
        }
    }

    /// Get the single-character prefix for this level.
    pub const fn prefix(self) -> char {
        match self {
            Self::Trace => 'T',
            Self::Debug => 'D',
            Self::Info => 'I',
            Self::Warn => 'W',
            Self::Error => 'E',
        }
    }
}

/// A single log entry with level, message, and timestamp.
#[derive(Clone, Debug)]
pub struct LogEntry {
    /// Log severity level.
    pub level: LogLevel,
    /// Log message (truncated to LOG_MSG_LEN).
    pub message: String<LOG_MSG_LEN>,
    /// Milliseconds since the first log call of the process.
    pub timestamp_ms: u32,
}

impl LogEntry {
    /// Create a new log entry.
    pub fn new(
        level: LogLevel,
        message: &str,
        timestamp_ms: u32,
    ) -> Self {
        let mut msg: String<LOG_MSG_LEN> = String::new();
        for (i, c) in message.chars().enumerate() {
            if i >= LOG_MSG_LEN - 1 {
                break;
            }
            if msg.push(c).is_err() {
                break;
            }
        }
        Self {
            level,
            message: msg,
            timestamp_ms,
        }
    }
}

impl Default for LogEntry {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            message: String::new(),
            timestamp_ms: 0,
        }
    }
}

/// Circular buffer of log entries.
pub struct LogBuffer {
    entries: [LogEntry; LOG_ENTRIES],
    head: usize, // Next write position
    count: usize,
}

impl LogBuffer {
    /// Create a new empty log buffer.
    pub const fn new() -> Self {
        Self {
            entries: [const {
                LogEntry {
                    level: LogLevel::Info,
                    message: String::new(),
                    timestamp_ms: 0,
                }
            }; LOG_ENTRIES],
            head: 0,
            count: 0,
        }
    }

    /// Push a new log entry. Oldest entry is dropped if buffer is full.
    pub fn push(
        &mut self,
        entry: LogEntry,
    ) {
        self.entries[self.head] = entry;
        self.head = (self.head + 1) % LOG_ENTRIES;
        if self.count < LOG_ENTRIES {
            self.count += 1;
        }
    }

    /// Get the number of entries in the buffer.
    #[inline]
    pub const fn len(&self) -> usize { self.count }

    /// Check if buffer is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool { self.count == 0 }

    /// Iterate over entries from oldest to newest.
    pub fn iter(&self) -> LogBufferIter<'_> {
        let start = if self.count < LOG_ENTRIES { 0 } else { self.head };
        LogBufferIter {
            buffer: self,
            pos: start,
            remaining: self.count,
        }
    }
}

impl Default for LogBuffer {
    fn default() -> Self { Self::new() }
}

/// Iterator over log buffer entries (oldest to newest).
pub struct LogBufferIter<'a> {
    buffer: &'a LogBuffer,
    pos: usize,
    remaining: usize,
}

impl<'a> Iterator for LogBufferIter<'a> {
    type Item = &'a LogEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entry = &self.buffer.entries[self.pos];
        self.pos = (self.pos + 1) % LOG_ENTRIES;
        self.remaining -= 1;
        Some(entry)
    }
}

/// Global log buffer protected by a mutex.
pub static LOG_BUFFER: Mutex<LogBuffer> = Mutex::new(LogBuffer::new());

static LOG_EPOCH: OnceLock<Instant> = OnceLock::new();

/// Get the current timestamp in milliseconds for logging.
#[inline]
pub fn current_timestamp_ms() -> u32 { LOG_EPOCH.get_or_init(Instant::now).elapsed().as_millis() as u32 }

/// Push a log entry to the global buffer.
///
/// This is non-blocking - if the mutex is held, the log is dropped.
pub fn push_log(
    level: LogLevel,
    message: &str,
) {
    let timestamp = current_timestamp_ms();
    let entry = LogEntry::new(level, message, timestamp);

    if let Ok(mut buffer) = LOG_BUFFER.try_lock() {
        buffer.push(entry);
    }
}

/// Copy the buffered entries, oldest first.
///
/// Readers wait for the lock; a poisoned buffer is still readable.
pub fn recent_logs() -> Vec<LogEntry> {
    let buffer = LOG_BUFFER.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    buffer.iter().cloned().collect()
}

/// Log a message at Info level.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        use core::fmt::Write as _;
        let mut buf = $crate::log_buffer::LogLine::new();
        let _ = write!(buf, $($arg)*);
        $crate::log_buffer::push_log($crate::log_buffer::LogLevel::Info, buf.as_str());
    }};
}

/// Log a message at Warn level.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        use core::fmt::Write as _;
        let mut buf = $crate::log_buffer::LogLine::new();
        let _ = write!(buf, $($arg)*);
        $crate::log_buffer::push_log($crate::log_buffer::LogLevel::Warn, buf.as_str());
    }};
}

/// Log a message at Error level.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        use core::fmt::Write as _;
        let mut buf = $crate::log_buffer::LogLine::new();
        let _ = write!(buf, $($arg)*);
        $crate::log_buffer::push_log($crate::log_buffer::LogLevel::Error, buf.as_str());
    }};
}

/// Log a message at Debug level.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        use core::fmt::Write as _;
        let mut buf = $crate::log_buffer::LogLine::new();
        let _ = write!(buf, $($arg)*);
        $crate::log_buffer::push_log($crate::log_buffer::LogLevel::Debug, buf.as_str());
    }};
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_truncates_long_message() {
        let long = "x".repeat(200);
        let entry = LogEntry::new(LogLevel::Warn, &long, 5);
        assert_eq!(entry.message.len(), LOG_MSG_LEN - 1);
        assert_eq!(entry.timestamp_ms, 5);
    }

    #[test]
    fn test_buffer_wraps_and_keeps_newest() {
        let mut buffer = LogBuffer::new();
        assert!(buffer.is_empty());
        for i in 0..(LOG_ENTRIES + 3) {
            let mut msg: String<8> = String::new();
            let _ = core::fmt::write(&mut msg, format_args!("{i}"));
            buffer.push(LogEntry::new(LogLevel::Info, msg.as_str(), i as u32));
        }
        assert_eq!(buffer.len(), LOG_ENTRIES);

        let first = buffer.iter().next().map(|e| e.timestamp_ms);
        let last = buffer.iter().last().map(|e| e.timestamp_ms);
        assert_eq!(first, Some(3));
        assert_eq!(last, Some((LOG_ENTRIES + 2) as u32));
    }

    #[test]
    fn test_level_prefix_and_order() {
        assert_eq!(LogLevel::Warn.prefix(), 'W');
        assert!(LogLevel::Error > LogLevel::Info);
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn test_macro_reaches_global_buffer() {
        // Other tests log concurrently; a contended write is dropped, so retry.
        for _ in 0..20 {
            crate::log_error!("macro check {}", 42);
            let found = recent_logs()
                .iter()
                .any(|e| e.level == LogLevel::Error && e.message.as_str() == "macro check 42");
            if found {
                return;
            }
        }
        panic!("log_error! never reached the global buffer");
    }
}
