use std::path::PathBuf;
use thiserror::Error;

/// Core error type for importee operations outside resolution itself.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Failure of a single resolution.
///
/// A specifier that simply cannot be found is not an error: resolution
/// returns `Ok(None)` for that case.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The importer path is not absolute.
    #[error("importer must be an absolute path, got {}", path.display())]
    RelativeImporter { path: PathBuf },

    /// The specifier cannot name anything on a filesystem.
    #[error("invalid specifier {specifier:?}: {reason}")]
    InvalidSpecifier {
        specifier: String,
        reason: &'static str,
    },

    /// An option value is out of range.
    #[error("invalid option `{option}`: {reason}")]
    InvalidOption {
        option: &'static str,
        reason: String,
    },

    /// A filesystem operation failed for a reason other than the path
    /// being absent.
    #[error("filesystem error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ResolveError {
    pub(crate) fn invalid_specifier(specifier: &str, reason: &'static str) -> Self {
        Self::InvalidSpecifier {
            specifier: specifier.to_string(),
            reason,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this is a caller error (as opposed to an environmental one).
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, Self::Io { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_importer_message() {
        let err = ResolveError::RelativeImporter {
            path: PathBuf::from("src/app.js"),
        };
        assert_eq!(
            err.to_string(),
            "importer must be an absolute path, got src/app.js"
        );
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_io_is_not_invalid_input() {
        let err = ResolveError::io(
            "/proj/node_modules",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(!err.is_invalid_input());
        assert!(err.to_string().contains("/proj/node_modules"));
    }

    #[test]
    fn test_resolve_error_converts_into_core_error() {
        let err: Error = ResolveError::invalid_specifier("", "empty").into();
        assert!(matches!(err, Error::Resolve(_)));
        assert_eq!(err.to_string(), "invalid specifier \"\": empty");
    }
}
