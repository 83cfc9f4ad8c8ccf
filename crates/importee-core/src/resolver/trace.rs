//! Resolution tracing for `importee explain`.
//!
//! Provides step-by-step traces of module resolution for debugging
//! and understanding why a specifier resolves to a particular file.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Schema version for the explain output format.
/// Bump when the trace structure changes incompatibly.
pub const EXPLAIN_SCHEMA_VERSION: u32 = 1;

/// Maximum number of tried paths to record.
pub const MAX_TRIED_PATHS: usize = 20;

/// A single step in the resolution trace.
#[derive(Debug, Clone, Serialize)]
pub struct TraceStep {
    /// Step name (e.g., "classify_specifier", "resolve_main", "file_exists")
    pub step: &'static str,
    /// Whether this step succeeded
    pub ok: bool,
    /// Human-readable description of what happened
    pub detail: String,
    /// File path involved in this step, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Package.json field or exports key involved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Value the key pointed at
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl TraceStep {
    /// Create a new trace step.
    pub fn new(step: &'static str, ok: bool, detail: impl Into<String>) -> Self {
        Self {
            step,
            ok,
            detail: detail.into(),
            path: None,
            key: None,
            target: None,
        }
    }

    /// Set the path for this step.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the key for this step.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set the target for this step.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}

/// Warning generated during resolution.
#[derive(Debug, Clone, Serialize)]
pub struct TraceWarning {
    /// Warning code (e.g., "invalid_package_json")
    pub code: &'static str,
    /// Human-readable warning message
    pub message: String,
}

/// Complete resolution trace.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolveTrace {
    /// Ordered list of resolution steps
    pub steps: Vec<TraceStep>,
    /// Warnings generated during resolution
    pub warnings: Vec<TraceWarning>,
    /// Candidate paths probed, capped at [`MAX_TRIED_PATHS`]
    pub tried: Vec<PathBuf>,
}

impl ResolveTrace {
    /// Create a new empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a step to the trace.
    pub fn add_step(&mut self, step: TraceStep) {
        self.steps.push(step);
    }

    /// Add a warning to the trace.
    pub fn add_warning(&mut self, code: &'static str, message: impl Into<String>) {
        self.warnings.push(TraceWarning {
            code,
            message: message.into(),
        });
    }

    /// Add a simple success step.
    pub fn success(&mut self, step: &'static str, detail: impl Into<String>) {
        self.steps.push(TraceStep::new(step, true, detail));
    }

    /// Add a simple failure step.
    pub fn failure(&mut self, step: &'static str, detail: impl Into<String>) {
        self.steps.push(TraceStep::new(step, false, detail));
    }

    /// Record a probed candidate (with cap).
    pub fn add_tried(&mut self, path: &Path) {
        if self.tried.len() < MAX_TRIED_PATHS {
            self.tried.push(path.to_path_buf());
        }
    }
}

/// Step names used in resolution tracing.
pub mod steps {
    pub const CLASSIFY_SPECIFIER: &str = "classify_specifier";
    pub const CHECK_BUILTIN: &str = "check_builtin";
    pub const RESOLVE_RELATIVE: &str = "resolve_relative";
    pub const RESOLVE_ABSOLUTE: &str = "resolve_absolute";
    pub const RESOLVE_BARE: &str = "resolve_bare";
    pub const SEARCH_MODULE_DIRECTORY: &str = "search_module_directory";
    pub const FIND_PACKAGE_DIR: &str = "find_package_dir";
    pub const READ_PACKAGE_JSON: &str = "read_package_json";
    pub const MATCH_EXPORTS_KEY: &str = "match_exports_key";
    pub const RESOLVE_MAIN: &str = "resolve_main";
    pub const RESOLVE_INDEX: &str = "resolve_index";
    pub const FILE_EXISTS: &str = "file_exists";
    pub const REALPATH: &str = "realpath";
    pub const FINAL_PATH: &str = "final_path";
}

/// Warning codes used in resolution tracing.
pub mod warning_codes {
    pub const INVALID_PACKAGE_JSON: &str = "invalid_package_json";
    pub const MAIN_NOT_FOUND: &str = "main_not_found";
    pub const SHADOWED_BY_BUILTIN: &str = "shadowed_by_builtin";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tried_is_capped() {
        let mut trace = ResolveTrace::new();
        for i in 0..(MAX_TRIED_PATHS + 5) {
            trace.add_tried(Path::new(&format!("/p/{i}.js")));
        }
        assert_eq!(trace.tried.len(), MAX_TRIED_PATHS);
        assert_eq!(trace.tried[0], PathBuf::from("/p/0.js"));
    }

    #[test]
    fn test_step_builder_serializes_without_empty_fields() {
        let step = TraceStep::new(steps::RESOLVE_MAIN, true, "Using main field")
            .with_key("main")
            .with_target("lib/entry.js");
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["step"], "resolve_main");
        assert_eq!(json["target"], "lib/entry.js");
        assert!(json.get("path").is_none());
    }

    #[test]
    fn test_success_and_failure() {
        let mut trace = ResolveTrace::new();
        trace.success(steps::CLASSIFY_SPECIFIER, "Specifier type: bare");
        trace.failure(steps::FIND_PACKAGE_DIR, "Package not found: pkg");
        trace.add_warning(warning_codes::INVALID_PACKAGE_JSON, "bad json");
        assert!(trace.steps[0].ok);
        assert!(!trace.steps[1].ok);
        assert_eq!(trace.warnings[0].code, "invalid_package_json");
    }
}
