//! Specifier resolution.
//!
//! Supports:
//! - Relative specifiers: `./`, `../`, `.`, `..`
//! - Absolute filesystem specifiers
//! - Bare specifiers with package container (`node_modules`) lookup,
//!   including scoped names and subpaths
//! - Extension probing (appended, in configured order)
//! - Directory resolution (`package.json` entry fields, then `index.*`)
//! - Opt-in package.json `exports`
//! - Symlink dereferencing of the final path

use super::exports::resolve_exports;
use super::fs::{is_missing, FileKind, FileSystem, OsFs};
use super::logger::{Logger, TracingLogger};
use super::pkg_json::{read_package_json, PackageJsonRead};
use super::specifier::{self, parse_bare_specifier, SpecifierKind};
use super::trace::{steps, warning_codes, ResolveTrace, TraceStep};
use crate::config::ResolutionOptions;
use crate::error::ResolveError;
use importee_util::path::{ancestors, append_extension, normalize};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolves specifiers against a filesystem.
///
/// Holds no per-call state: every call is a function of its arguments and
/// the filesystem contents, so one resolver can serve concurrent calls.
#[derive(Debug, Clone)]
pub struct Resolver<F = OsFs, L = TracingLogger> {
    fs: F,
    logger: L,
}

impl Default for Resolver<OsFs, TracingLogger> {
    fn default() -> Self {
        Self::new(OsFs, TracingLogger)
    }
}

/// Result of [`Resolver::explain`].
#[derive(Debug, Clone, Serialize)]
pub struct Explained {
    pub specifier: String,
    pub importer: PathBuf,
    pub kind: SpecifierKind,
    /// Resolved absolute path, or `None` if nothing matched.
    pub resolved: Option<PathBuf>,
    pub trace: ResolveTrace,
}

impl<F: FileSystem, L: Logger> Resolver<F, L> {
    /// Create a resolver over `fs` that reports misses to `logger`.
    pub fn new(fs: F, logger: L) -> Self {
        Self { fs, logger }
    }

    /// The filesystem this resolver reads.
    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// The logger misses are reported to.
    pub fn logger(&self) -> &L {
        &self.logger
    }

    /// Resolve `specifier` as imported from the file `importer`.
    ///
    /// Returns `Ok(None)` when nothing matches, after logging one warning.
    pub async fn resolve(
        &self,
        specifier: &str,
        importer: &Path,
        options: &ResolutionOptions,
    ) -> Result<Option<PathBuf>, ResolveError> {
        Ok(self.explain(specifier, importer, options).await?.resolved)
    }

    /// Resolve and return the full trace of what was tried.
    pub async fn explain(
        &self,
        specifier: &str,
        importer: &Path,
        options: &ResolutionOptions,
    ) -> Result<Explained, ResolveError> {
        if !importer.is_absolute() {
            return Err(ResolveError::RelativeImporter {
                path: importer.to_path_buf(),
            });
        }
        options.validate()?;
        specifier::validate(specifier)?;

        // Only lexical ancestors of the importer may hold its packages
        let importer_dir = normalize(importer.parent().unwrap_or(importer));
        let kind = specifier::classify(specifier);

        let mut probe = Probe {
            fs: &self.fs,
            options,
            trace: ResolveTrace::new(),
        };
        probe.trace.success(
            steps::CLASSIFY_SPECIFIER,
            format!("Specifier type: {kind}"),
        );

        let found = match kind {
            SpecifierKind::Relative => {
                let base = normalize(&importer_dir.join(specifier));
                probe.trace.add_step(
                    TraceStep::new(
                        steps::RESOLVE_RELATIVE,
                        true,
                        format!("Resolving relative to {}", importer_dir.display()),
                    )
                    .with_path(&base),
                );
                probe.load(&base, specifier.ends_with('/')).await?
            }
            SpecifierKind::Absolute => {
                let base = normalize(Path::new(specifier));
                probe.trace.add_step(
                    TraceStep::new(steps::RESOLVE_ABSOLUTE, true, "Absolute path").with_path(&base),
                );
                probe.load(&base, specifier.ends_with('/')).await?
            }
            SpecifierKind::Bare => {
                if options.prefer_builtins && specifier::is_builtin(specifier) {
                    probe.trace.failure(
                        steps::CHECK_BUILTIN,
                        format!("{specifier} is a built-in module"),
                    );
                    probe.trace.add_warning(
                        warning_codes::SHADOWED_BY_BUILTIN,
                        "Built-in modules have no filesystem path",
                    );
                    None
                } else {
                    let root = match &options.root_dir {
                        Some(root) => normalize(root),
                        None => importer_dir.clone(),
                    };
                    probe.resolve_bare(specifier, &root).await?
                }
            }
        };

        let resolved = match found {
            Some(path) => Some(probe.finish(path).await?),
            None => None,
        };

        match &resolved {
            Some(path) => debug!(specifier, resolved = %path.display(), "resolved"),
            None => {
                probe.trace.failure(steps::FINAL_PATH, "No candidate matched");
                self.logger.warn(&format!(
                    "importee {specifier} not found in filesystem for importer '{}'.",
                    importer.display()
                ));
            }
        }

        Ok(Explained {
            specifier: specifier.to_string(),
            importer: importer.to_path_buf(),
            kind,
            resolved,
            trace: probe.trace,
        })
    }
}

/// Resolve with the real filesystem, reporting misses through `tracing`.
pub async fn resolve_import_path(
    specifier: &str,
    importer: &Path,
    options: &ResolutionOptions,
) -> Result<Option<PathBuf>, ResolveError> {
    Resolver::new(OsFs, TracingLogger)
        .resolve(specifier, importer, options)
        .await
}

/// State of a single resolution.
struct Probe<'a, F> {
    fs: &'a F,
    options: &'a ResolutionOptions,
    trace: ResolveTrace,
}

impl<F: FileSystem> Probe<'_, F> {
    /// Kind of `path`, or `None` if absent.
    async fn kind_of(&mut self, path: &Path) -> Result<Option<FileKind>, ResolveError> {
        self.trace.add_tried(path);
        match self.fs.stat(path).await {
            Ok(kind) => Ok(Some(kind)),
            Err(e) if is_missing(&e) => Ok(None),
            Err(e) => Err(ResolveError::io(path, e)),
        }
    }

    /// Probe `base` as a file, then with extensions, then as a directory.
    async fn load(&mut self, base: &Path, dir_only: bool) -> Result<Option<PathBuf>, ResolveError> {
        let kind = self.kind_of(base).await?;
        if !dir_only {
            if let Some(found) = self.load_as_file(base, kind).await? {
                return Ok(Some(found));
            }
        }

        if kind == Some(FileKind::Directory) {
            return self.load_as_directory(base).await;
        }

        self.trace.failure(
            steps::FILE_EXISTS,
            format!("File not found: {}", base.display()),
        );
        Ok(None)
    }

    /// Exact path (already stat'ed as `kind`), then each extension appended.
    async fn load_as_file(
        &mut self,
        base: &Path,
        kind: Option<FileKind>,
    ) -> Result<Option<PathBuf>, ResolveError> {
        if kind == Some(FileKind::File) {
            self.trace.add_step(
                TraceStep::new(steps::FILE_EXISTS, true, "Exact file exists").with_path(base),
            );
            return Ok(Some(base.to_path_buf()));
        }

        let options = self.options;
        for ext in &options.extensions {
            let with_ext = append_extension(base, ext);
            if self.kind_of(&with_ext).await? == Some(FileKind::File) {
                self.trace.add_step(
                    TraceStep::new(
                        steps::FILE_EXISTS,
                        true,
                        format!("Found with extension: {ext}"),
                    )
                    .with_path(&with_ext),
                );
                return Ok(Some(with_ext));
            }
        }

        Ok(None)
    }

    /// `index` + each extension inside `dir`.
    async fn load_index(&mut self, dir: &Path) -> Result<Option<PathBuf>, ResolveError> {
        let options = self.options;
        for ext in &options.extensions {
            let index = dir.join(format!("index{ext}"));
            if self.kind_of(&index).await? == Some(FileKind::File) {
                self.trace.add_step(
                    TraceStep::new(
                        steps::RESOLVE_INDEX,
                        true,
                        format!("Resolution via index{ext}"),
                    )
                    .with_path(&index),
                );
                return Ok(Some(index));
            }
        }

        self.trace.add_step(
            TraceStep::new(steps::RESOLVE_INDEX, false, "No index file").with_path(dir),
        );
        Ok(None)
    }

    /// Package entry point from package.json, falling back to `index.*`.
    async fn load_as_directory(&mut self, dir: &Path) -> Result<Option<PathBuf>, ResolveError> {
        match read_package_json(self.fs, dir).await? {
            PackageJsonRead::Found(pkg) => {
                self.trace.add_step(
                    TraceStep::new(steps::READ_PACKAGE_JSON, true, "Found package.json")
                        .with_path(&pkg.path),
                );

                let options = self.options;
                if let Some((field, entry)) = pkg.entry_point(&options.main_fields) {
                    self.trace.add_step(
                        TraceStep::new(
                            steps::RESOLVE_MAIN,
                            true,
                            format!("Using {field} field: {entry}"),
                        )
                        .with_key(field)
                        .with_target(entry),
                    );

                    let entry_path = normalize(&dir.join(entry));
                    let kind = self.kind_of(&entry_path).await?;
                    if let Some(found) = self.load_as_file(&entry_path, kind).await? {
                        return Ok(Some(found));
                    }
                    if kind == Some(FileKind::Directory) {
                        if let Some(found) = self.load_index(&entry_path).await? {
                            return Ok(Some(found));
                        }
                    }

                    self.trace.failure(
                        steps::RESOLVE_MAIN,
                        format!("{field} field target not found: {entry}"),
                    );
                    self.trace.add_warning(
                        warning_codes::MAIN_NOT_FOUND,
                        format!(
                            "{} points at missing {entry}, falling back to index",
                            pkg.path.display()
                        ),
                    );
                }
            }
            PackageJsonRead::Invalid(reason) => {
                debug!(dir = %dir.display(), %reason, "ignoring invalid package.json");
                self.trace.failure(
                    steps::READ_PACKAGE_JSON,
                    format!("Ignoring invalid package.json: {reason}"),
                );
                self.trace.add_warning(
                    warning_codes::INVALID_PACKAGE_JSON,
                    format!("{}/package.json: {reason}", dir.display()),
                );
            }
            PackageJsonRead::Missing => {}
        }

        self.load_index(dir).await
    }

    /// Walk package containers upward from `root`.
    async fn resolve_bare(
        &mut self,
        spec: &str,
        root: &Path,
    ) -> Result<Option<PathBuf>, ResolveError> {
        let (pkg_name, subpath) = parse_bare_specifier(spec);

        self.trace.success(
            steps::RESOLVE_BARE,
            format!("Bare specifier: package={pkg_name}, subpath={subpath:?}"),
        );

        let options = self.options;
        let mut found_package = false;

        for dir in ancestors(root) {
            for module_dir in &options.module_directories {
                // Never look for node_modules/node_modules
                if dir.file_name().is_some_and(|name| name == module_dir.as_str()) {
                    continue;
                }

                let container = dir.join(module_dir);
                let pkg_dir = container.join(pkg_name);
                if self.kind_of(&pkg_dir).await? != Some(FileKind::Directory) {
                    continue;
                }

                found_package = true;
                self.trace.add_step(
                    TraceStep::new(
                        steps::SEARCH_MODULE_DIRECTORY,
                        true,
                        format!("Searching {}", container.display()),
                    )
                    .with_path(&container),
                );
                self.trace.add_step(
                    TraceStep::new(
                        steps::FIND_PACKAGE_DIR,
                        true,
                        format!("Found package: {pkg_name}"),
                    )
                    .with_path(&pkg_dir),
                );

                if let Some(found) = self.load_package(&pkg_dir, subpath).await? {
                    return Ok(Some(found));
                }
            }
        }

        if !found_package {
            self.trace.failure(
                steps::FIND_PACKAGE_DIR,
                format!("Package not found: {pkg_name}"),
            );
        }
        Ok(None)
    }

    /// Resolve the package root or a subpath inside a found package directory.
    async fn load_package(
        &mut self,
        pkg_dir: &Path,
        subpath: Option<&str>,
    ) -> Result<Option<PathBuf>, ResolveError> {
        let options = self.options;
        if let Some(conditions) = &options.export_conditions {
            if let PackageJsonRead::Found(pkg) = read_package_json(self.fs, pkg_dir).await? {
                if let Some(exports) = pkg.exports() {
                    let key = subpath.map(|s| format!("./{s}"));
                    let key_display = key.as_deref().unwrap_or(".");

                    let Some(target) = resolve_exports(exports, key.as_deref(), conditions)
                    else {
                        self.trace.failure(
                            steps::MATCH_EXPORTS_KEY,
                            format!("No matching exports key for: {key_display}"),
                        );
                        return Ok(None);
                    };

                    self.trace.add_step(
                        TraceStep::new(
                            steps::MATCH_EXPORTS_KEY,
                            true,
                            format!("Matched exports key: {key_display}"),
                        )
                        .with_key(key_display)
                        .with_target(&target),
                    );
                    let target_path = normalize(&pkg_dir.join(&target));
                    let kind = self.kind_of(&target_path).await?;
                    return self.load_as_file(&target_path, kind).await;
                }
            }
        }

        match subpath {
            Some(sub) => {
                let base = normalize(&pkg_dir.join(sub));
                // Subpaths must stay inside the package
                if !base.starts_with(pkg_dir) {
                    self.trace.failure(
                        steps::FILE_EXISTS,
                        format!("Subpath escapes package: {sub}"),
                    );
                    return Ok(None);
                }
                self.load(&base, false).await
            }
            None => self.load(pkg_dir, false).await,
        }
    }

    /// Apply symlink policy to the found file.
    async fn finish(&mut self, found: PathBuf) -> Result<PathBuf, ResolveError> {
        let path = if self.options.preserve_symlinks {
            found
        } else {
            let real = self
                .fs
                .realpath(&found)
                .await
                .map_err(|e| ResolveError::io(&found, e))?;
            if real != found {
                self.trace.add_step(
                    TraceStep::new(
                        steps::REALPATH,
                        true,
                        format!("Dereferenced {}", found.display()),
                    )
                    .with_path(&real),
                );
            }
            real
        };

        self.trace.add_step(
            TraceStep::new(steps::FINAL_PATH, true, "Resolution complete").with_path(&path),
        );
        Ok(path)
    }
}
