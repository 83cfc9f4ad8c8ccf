//! Resolution options.
//!
//! Options use the camelCase shape of bundler resolve configs, so an existing
//! JSON config can be loaded as-is. The legacy `customResolveOptions`
//! grouping is accepted for `preserveSymlinks`.

use crate::error::{Error, ResolveError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default extensions for probing, in order.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".mjs", ".js", ".json"];

/// Default package.json fields naming a package entry point, in order.
pub const DEFAULT_MAIN_FIELDS: &[&str] = &["module", "main"];

/// Default package container directory names.
pub const DEFAULT_MODULE_DIRECTORIES: &[&str] = &["node_modules"];

/// Options for a single resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawOptions")]
pub struct ResolutionOptions {
    /// Where the bare-specifier search starts. Defaults to the importer's directory.
    pub root_dir: Option<PathBuf>,

    /// Whether built-in module names shadow same-named packages.
    pub prefer_builtins: bool,

    /// Extensions appended to extensionless candidates, in order.
    pub extensions: Vec<String>,

    /// Return symlinked results as the link path instead of the real path.
    pub preserve_symlinks: bool,

    /// package.json fields consulted for a directory entry point, in order.
    pub main_fields: Vec<String>,

    /// Names of package container directories searched at each ancestor.
    pub module_directories: Vec<String>,

    /// Conditions for package `exports`, in priority order.
    /// `None` leaves `exports` unused.
    pub export_conditions: Option<Vec<String>>,
}

impl Default for ResolutionOptions {
    fn default() -> Self {
        Self {
            root_dir: None,
            prefer_builtins: false,
            extensions: to_strings(DEFAULT_EXTENSIONS),
            preserve_symlinks: false,
            main_fields: to_strings(DEFAULT_MAIN_FIELDS),
            module_directories: to_strings(DEFAULT_MODULE_DIRECTORIES),
            export_conditions: None,
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Wire shape, with every field optional and the legacy grouping.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawOptions {
    root_dir: Option<PathBuf>,
    prefer_builtins: Option<bool>,
    extensions: Option<Vec<String>>,
    preserve_symlinks: Option<bool>,
    custom_resolve_options: Option<CustomResolveOptions>,
    main_fields: Option<Vec<String>>,
    module_directories: Option<Vec<String>>,
    export_conditions: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CustomResolveOptions {
    preserve_symlinks: Option<bool>,
}

impl From<RawOptions> for ResolutionOptions {
    fn from(raw: RawOptions) -> Self {
        let defaults = Self::default();
        let legacy_preserve = raw
            .custom_resolve_options
            .and_then(|c| c.preserve_symlinks);

        Self {
            root_dir: raw.root_dir,
            prefer_builtins: raw.prefer_builtins.unwrap_or(defaults.prefer_builtins),
            extensions: raw.extensions.unwrap_or(defaults.extensions),
            preserve_symlinks: raw
                .preserve_symlinks
                .or(legacy_preserve)
                .unwrap_or(defaults.preserve_symlinks),
            main_fields: raw.main_fields.unwrap_or(defaults.main_fields),
            module_directories: raw
                .module_directories
                .unwrap_or(defaults.module_directories),
            export_conditions: raw.export_conditions,
        }
    }
}

impl ResolutionOptions {
    /// Create options with all defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content =
            importee_util::fs::read_to_string_lossy(path).map_err(|source| Error::ConfigRead {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse options from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Set the bare-specifier search root.
    #[must_use]
    pub fn with_root_dir(mut self, root_dir: impl Into<PathBuf>) -> Self {
        self.root_dir = Some(root_dir.into());
        self
    }

    /// Set whether built-ins shadow packages.
    #[must_use]
    pub fn with_prefer_builtins(mut self, prefer: bool) -> Self {
        self.prefer_builtins = prefer;
        self
    }

    /// Set the probed extensions.
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Set symlink preservation.
    #[must_use]
    pub fn with_preserve_symlinks(mut self, preserve: bool) -> Self {
        self.preserve_symlinks = preserve;
        self
    }

    /// Set the entry point fields.
    #[must_use]
    pub fn with_main_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.main_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the package container directory names.
    #[must_use]
    pub fn with_module_directories<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.module_directories = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Enable package `exports` with the given conditions.
    #[must_use]
    pub fn with_export_conditions<I, S>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.export_conditions = Some(conditions.into_iter().map(Into::into).collect());
        self
    }

    /// Check option values that would make resolution meaningless.
    pub fn validate(&self) -> Result<(), ResolveError> {
        for ext in &self.extensions {
            if !ext.starts_with('.') || ext.len() < 2 {
                return Err(ResolveError::InvalidOption {
                    option: "extensions",
                    reason: format!("{ext:?} must start with '.' and name an extension"),
                });
            }
            if ext.contains(['/', '\\']) {
                return Err(ResolveError::InvalidOption {
                    option: "extensions",
                    reason: format!("{ext:?} must not contain a path separator"),
                });
            }
        }

        for dir in &self.module_directories {
            if dir.is_empty() || dir == "." || dir == ".." || dir.contains(['/', '\\']) {
                return Err(ResolveError::InvalidOption {
                    option: "moduleDirectories",
                    reason: format!("{dir:?} must be a single directory name"),
                });
            }
        }

        if let Some(root) = &self.root_dir {
            if !root.is_absolute() {
                return Err(ResolveError::InvalidOption {
                    option: "rootDir",
                    reason: format!("{} must be an absolute path", root.display()),
                });
            }
        }

        Ok(())
    }
}
