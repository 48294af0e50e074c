//! Error types for configuration, page loading and persistence.
//!
//! Rendering itself never fails: bad variables, templates, glyphs and
//! backgrounds degrade visibly on screen instead. These errors only surface
//! while a display is being set up.

use core::fmt;

/// Failure to read or validate a display configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    Read {
        path: String,
        source: std::io::Error,
    },
    /// TOML syntax or schema error.
    Parse(toml::de::Error),
    /// A field holds a value the display cannot work with.
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Read { path, .. } => write!(f, "cannot read config {path}"),
            Self::Parse(_) => write!(f, "invalid config TOML"),
            Self::Invalid(what) => write!(f, "invalid config: {what}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(e) => Some(e),
            Self::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self { Self::Parse(e) }
}

/// Why a page definition was rejected.
///
/// Every variant except [`PageError::NoValidPages`] is local to one
/// definition: the registry logs it, skips that page and keeps loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// Definition supplies no text, background or button.
    Empty { definition: usize },
    /// Referenced text file could not be read.
    TextFile { definition: usize, path: String },
    /// Text handler name not registered with the display.
    UnknownProvider { definition: usize, name: String },
    /// Background kind is not `camera`, `texture` or `handler`.
    UnknownBackground { definition: usize, kind: String },
    /// Camera background without a camera transform.
    MissingCameraTransform { definition: usize },
    /// Texture background without a texture name.
    MissingTexture { definition: usize },
    /// Handler background without a handler name.
    MissingBackgroundHandler { definition: usize },
    /// Every definition was rejected, so there is no page to activate.
    NoValidPages,
}

impl fmt::Display for PageError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Empty { definition } => write!(f, "page #{definition} has no text, background or button"),
            Self::TextFile { definition, path } => write!(f, "page #{definition}: cannot read {path}"),
            Self::UnknownProvider { definition, name } => write!(f, "page #{definition}: no text handler {name}"),
            Self::UnknownBackground { definition, kind } => write!(f, "page #{definition}: bad background {kind}"),
            Self::MissingCameraTransform { definition } => write!(f, "page #{definition}: camera without transform"),
            Self::MissingTexture { definition } => write!(f, "page #{definition}: texture without name"),
            Self::MissingBackgroundHandler { definition } => {
                write!(f, "page #{definition}: handler background without name")
            }
            Self::NoValidPages => write!(f, "no valid page definitions"),
        }
    }
}

impl std::error::Error for PageError {}

/// Failure to write the persistent key/value blob.
#[derive(Debug)]
pub enum StoreError {
    /// Keys cannot contain the blob separators `$` or `|`.
    InvalidKey(String),
    /// Backing file could not be written.
    Io(std::io::Error),
}

impl fmt::Display for StoreError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::InvalidKey(key) => write!(f, "invalid store key {key:?}"),
            Self::Io(e) => write!(f, "store write failed: {e}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidKey(_) => None,
            Self::Io(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self { Self::Io(e) }
}

/// Failure to bring up a display instance.
#[derive(Debug)]
pub enum MonitorError {
    Config(ConfigError),
    Pages(PageError),
}

impl fmt::Display for MonitorError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "{e}"),
            Self::Pages(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for MonitorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Pages(e) => Some(e),
        }
    }
}

impl From<ConfigError> for MonitorError {
    fn from(e: ConfigError) -> Self { Self::Config(e) }
}

impl From<PageError> for MonitorError {
    fn from(e: PageError) -> Self { Self::Pages(e) }
}
