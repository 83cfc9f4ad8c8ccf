//! Package metadata (`package.json`) reading.

use super::fs::{is_missing, FileSystem};
use crate::error::ResolveError;
use importee_util::fs::strip_bom;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// File name of package metadata.
pub const PACKAGE_JSON: &str = "package.json";

/// A parsed package.json.
#[derive(Debug, Clone)]
pub struct PackageJson {
    /// Path of the package.json file.
    pub path: PathBuf,
    value: Value,
}

impl PackageJson {
    /// Parse package.json contents. The top level must be an object.
    pub fn parse(path: impl Into<PathBuf>, bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_slice(strip_bom(bytes))?;
        if !value.is_object() {
            return Err(serde::de::Error::custom("package.json must be an object"));
        }
        Ok(Self {
            path: path.into(),
            value,
        })
    }

    /// The package name, if declared.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.value.get("name").and_then(Value::as_str)
    }

    /// The first non-empty string field among `main_fields`, with its field name.
    #[must_use]
    pub fn entry_point<'a>(&'a self, main_fields: &'a [String]) -> Option<(&'a str, &'a str)> {
        main_fields.iter().find_map(|field| {
            self.value
                .get(field)
                .and_then(Value::as_str)
                .filter(|entry| !entry.trim().is_empty())
                .map(|entry| (field.as_str(), entry))
        })
    }

    /// The `exports` field, if present and not null.
    #[must_use]
    pub fn exports(&self) -> Option<&Value> {
        self.value.get("exports").filter(|v| !v.is_null())
    }
}

/// Outcome of looking for a package.json in a directory.
#[derive(Debug)]
pub enum PackageJsonRead {
    /// No package.json in the directory.
    Missing,
    /// A package.json exists but cannot be used; carries the reason.
    Invalid(String),
    Found(PackageJson),
}

/// Read and parse `dir/package.json`.
///
/// Malformed metadata is reported as [`PackageJsonRead::Invalid`] rather
/// than an error; only unexpected I/O failures are errors.
pub async fn read_package_json<F: FileSystem>(
    fs: &F,
    dir: &Path,
) -> Result<PackageJsonRead, ResolveError> {
    let path = dir.join(PACKAGE_JSON);

    let bytes = match fs.read_file(&path).await {
        Ok(bytes) => bytes,
        Err(e) if is_missing(&e) => return Ok(PackageJsonRead::Missing),
        Err(e) if e.kind() == std::io::ErrorKind::IsADirectory => {
            return Ok(PackageJsonRead::Invalid("package.json is a directory".to_string()));
        }
        Err(e) => return Err(ResolveError::io(path, e)),
    };

    match PackageJson::parse(&path, &bytes) {
        Ok(pkg) => Ok(PackageJsonRead::Found(pkg)),
        Err(e) => Ok(PackageJsonRead::Invalid(e.to_string())),
    }
}
