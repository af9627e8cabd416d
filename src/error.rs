use std::fmt;
use std::path::PathBuf;

/// Errors raised inside the dump pipeline
///
/// None of these ever reach the host response: the renderer turns
/// per-entry failures into placeholders and the lifecycle hook logs
/// anything else and leaves the body untouched.
#[derive(Debug)]
pub enum MultiDumpError {
    /// A dumped value could not be converted by the serializer
    Serialize {
        /// Rust type name of the failing value
        type_name: &'static str,
        /// Message reported by the serializer
        message: String,
    },
    /// The panel or sections template failed to render
    Template(askama::Error),
    /// A configuration file could not be parsed
    Config {
        /// Path of the offending file, when loaded from disk
        path: Option<PathBuf>,
        /// Parser message
        message: String,
    },
    /// An `excluded_route_patterns` entry is not a valid regex
    InvalidRoutePattern {
        /// The rejected pattern
        pattern: String,
        /// Regex compiler message
        message: String,
    },
    /// Filesystem access failed while loading configuration
    Io(std::io::Error),
}

impl fmt::Display for MultiDumpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MultiDumpError::Serialize { type_name, message } => {
                write!(f, "cannot serialize value of type `{}`: {}", type_name, message)
            }
            MultiDumpError::Template(err) => write!(f, "panel template failed: {}", err),
            MultiDumpError::Config {
                path: Some(path),
                message,
            } => write!(f, "invalid config '{}': {}", path.display(), message),
            MultiDumpError::Config {
                path: None,
                message,
            } => write!(f, "invalid config: {}", message),
            MultiDumpError::InvalidRoutePattern { pattern, message } => {
                write!(f, "invalid excluded route pattern '{}': {}", pattern, message)
            }
            MultiDumpError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for MultiDumpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MultiDumpError::Template(err) => Some(err),
            MultiDumpError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<askama::Error> for MultiDumpError {
    fn from(err: askama::Error) -> Self {
        MultiDumpError::Template(err)
    }
}

impl From<std::io::Error> for MultiDumpError {
    fn from(err: std::io::Error) -> Self {
        MultiDumpError::Io(err)
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, MultiDumpError>;
