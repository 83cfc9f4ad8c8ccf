//! Specifier classification and parsing.

use crate::error::ResolveError;
use serde::Serialize;

/// How a specifier locates its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecifierKind {
    /// `./x`, `../x`, `.` or `..`: relative to the importer's directory.
    Relative,
    /// Starts with a root marker.
    Absolute,
    /// A package name, optionally scoped and followed by a subpath.
    Bare,
}

impl std::fmt::Display for SpecifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Relative => write!(f, "relative"),
            Self::Absolute => write!(f, "absolute"),
            Self::Bare => write!(f, "bare"),
        }
    }
}

/// Node built-in module names, without the `node:` prefix.
const BUILTIN_MODULES: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// Classify a specifier by its prefix.
#[must_use]
pub fn classify(spec: &str) -> SpecifierKind {
    if spec == "." || spec == ".." || spec.starts_with("./") || spec.starts_with("../") {
        return SpecifierKind::Relative;
    }

    if cfg!(windows) && (spec.starts_with(".\\") || spec.starts_with("..\\")) {
        return SpecifierKind::Relative;
    }

    if is_absolute_path(spec) {
        return SpecifierKind::Absolute;
    }

    SpecifierKind::Bare
}

/// Reject specifiers that cannot name anything on a filesystem.
pub fn validate(spec: &str) -> Result<(), ResolveError> {
    if spec.is_empty() {
        return Err(ResolveError::invalid_specifier(spec, "specifier is empty"));
    }

    if spec.contains('\0') {
        return Err(ResolveError::invalid_specifier(
            spec,
            "specifier contains a NUL byte",
        ));
    }

    if spec.contains("://") || spec.starts_with("data:") {
        return Err(ResolveError::invalid_specifier(
            spec,
            "URL specifiers are not filesystem paths",
        ));
    }

    if classify(spec) == SpecifierKind::Bare {
        let (name, _) = parse_bare_specifier(spec);
        if !is_valid_package_name(name) {
            return Err(ResolveError::invalid_specifier(
                spec,
                "bare specifier does not start with a package name",
            ));
        }
    }

    Ok(())
}

/// Check if a specifier is an absolute path.
fn is_absolute_path(spec: &str) -> bool {
    // Unix absolute
    if spec.starts_with('/') {
        return true;
    }

    // Windows absolute: C:\, D:\, etc.
    let bytes = spec.as_bytes();
    if bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/')
    {
        return true;
    }

    // UNC path: \\server\share
    spec.starts_with("\\\\")
}

/// Parse a bare specifier into package name and optional subpath.
///
/// `"lodash/fp"` is `("lodash", Some("fp"))`, `"@scope/pkg/a/b"` is
/// `("@scope/pkg", Some("a/b"))`. A trailing slash leaves no subpath.
#[must_use]
pub fn parse_bare_specifier(spec: &str) -> (&str, Option<&str>) {
    let split_at = if spec.starts_with('@') {
        // Scoped package: the name spans two segments
        spec.match_indices('/').nth(1).map(|(i, _)| i)
    } else {
        spec.find('/')
    };

    match split_at {
        Some(i) => {
            let sub = &spec[i + 1..];
            (&spec[..i], (!sub.is_empty()).then_some(sub))
        }
        None => (spec, None),
    }
}

fn is_valid_package_name(name: &str) -> bool {
    if let Some(scoped) = name.strip_prefix('@') {
        let Some((scope, pkg)) = scoped.split_once('/') else {
            return false;
        };
        return !scope.is_empty() && !pkg.is_empty() && pkg != "." && pkg != "..";
    }
    !name.is_empty() && name != "." && name != ".."
}

/// Whether the specifier names a platform built-in module.
///
/// Any `node:` specifier is a built-in; otherwise the package name is
/// checked, so `fs/promises` counts.
#[must_use]
pub fn is_builtin(spec: &str) -> bool {
    if spec.starts_with("node:") {
        return true;
    }
    let (name, _) = parse_bare_specifier(spec);
    BUILTIN_MODULES.binary_search(&name).is_ok()
}
