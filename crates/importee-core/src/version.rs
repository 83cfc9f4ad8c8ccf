//! Build information reported by `importee version`.

use crate::resolver::EXPLAIN_SCHEMA_VERSION;
use serde::Serialize;
use std::fmt;

/// The current version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// What this build of importee is and which output formats it speaks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    /// Commit the binary was built from, when the build provided one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_hash: Option<&'static str>,
    /// Schema of `importee explain --json` output.
    pub explain_schema_version: u32,
    /// Extensions probed when none are configured.
    pub default_extensions: &'static [&'static str],
}

impl BuildInfo {
    #[must_use]
    pub fn current() -> Self {
        Self {
            version: VERSION,
            git_hash: option_env!("IMPORTEE_BUILD_GIT_HASH"),
            explain_schema_version: EXPLAIN_SCHEMA_VERSION,
            default_extensions: crate::config::DEFAULT_EXTENSIONS,
        }
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "importee {}", self.version)?;
        if let Some(hash) = self.git_hash {
            write!(f, " ({hash})")?;
        }
        Ok(())
    }
}

/// One-line version banner, e.g. `importee 0.1.0 (abc1234)`.
#[must_use]
pub fn version_string() -> String {
    BuildInfo::current().to_string()
}
