pub mod batch;
pub mod explain;
pub mod resolve;
pub mod version;

use clap::Args;
use importee_core::ResolutionOptions;
use importee_util::path::normalize;
use miette::{IntoDiagnostic, Result};
use std::future::Future;
use std::path::{Path, PathBuf};

/// Resolution flags shared by `resolve`, `explain` and `batch`.
#[derive(Args, Debug, Clone)]
pub struct OptionArgs {
    /// File doing the import (relative paths are taken from --cwd)
    #[arg(long, value_name = "FILE")]
    pub importer: PathBuf,

    /// Directory where the package search starts
    #[arg(long, value_name = "DIR")]
    pub root_dir: Option<PathBuf>,

    /// Extensions to probe, in order (e.g. .mjs,.js,.json)
    #[arg(long, value_delimiter = ',', value_name = "EXT", allow_hyphen_values = true)]
    pub extensions: Option<Vec<String>>,

    /// package.json fields naming the entry point, in order
    #[arg(long, value_delimiter = ',', value_name = "FIELD")]
    pub main_fields: Option<Vec<String>>,

    /// Package container directory names
    #[arg(long, value_delimiter = ',', value_name = "DIR")]
    pub module_directories: Option<Vec<String>>,

    /// Enable package.json exports with these conditions, in priority order
    #[arg(long, value_delimiter = ',', value_name = "CONDITION")]
    pub export_conditions: Option<Vec<String>>,

    /// Return symlinked results as the link path
    #[arg(long)]
    pub preserve_symlinks: bool,

    /// Treat built-in module names as unresolvable
    #[arg(long)]
    pub prefer_builtins: bool,

    /// JSON file with resolution options; flags override its values
    #[arg(long, value_name = "FILE", env = "IMPORTEE_CONFIG")]
    pub config: Option<PathBuf>,
}

impl OptionArgs {
    /// Absolute importer path.
    pub fn importer(&self, cwd: &Path) -> PathBuf {
        absolute(cwd, &self.importer)
    }

    /// Options from the config file (if any) with flags applied on top.
    pub fn options(&self, cwd: &Path) -> Result<ResolutionOptions> {
        let mut options = match &self.config {
            Some(path) => ResolutionOptions::load(&absolute(cwd, path)).into_diagnostic()?,
            None => ResolutionOptions::default(),
        };

        if let Some(root) = &self.root_dir {
            options.root_dir = Some(absolute(cwd, root));
        }
        if let Some(extensions) = &self.extensions {
            options.extensions.clone_from(extensions);
        }
        if let Some(fields) = &self.main_fields {
            options.main_fields.clone_from(fields);
        }
        if let Some(dirs) = &self.module_directories {
            options.module_directories.clone_from(dirs);
        }
        if let Some(conditions) = &self.export_conditions {
            options.export_conditions = Some(conditions.clone());
        }
        if self.preserve_symlinks {
            options.preserve_symlinks = true;
        }
        if self.prefer_builtins {
            options.prefer_builtins = true;
        }

        Ok(options)
    }
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        normalize(&cwd.join(path))
    }
}

/// Run a future to completion on a fresh runtime.
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;
    Ok(runtime.block_on(future))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: OptionArgs,
    }

    fn parse(argv: &[&str]) -> OptionArgs {
        let mut full = vec!["importee"];
        full.extend_from_slice(argv);
        Harness::parse_from(full).args
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = parse(&[
            "--importer",
            "src/app.js",
            "--extensions",
            ".ts,.js",
            "--preserve-symlinks",
            "--root-dir",
            "lib",
        ]);
        let cwd = Path::new("/work");
        let opts = args.options(cwd).unwrap();

        assert_eq!(args.importer(cwd), PathBuf::from("/work/src/app.js"));
        assert_eq!(opts.extensions, vec![".ts", ".js"]);
        assert!(opts.preserve_symlinks);
        assert!(!opts.prefer_builtins);
        assert_eq!(opts.root_dir, Some(PathBuf::from("/work/lib")));
    }

    #[test]
    fn test_config_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("importee.json");
        std::fs::write(
            &config,
            r#"{"extensions": [".cjs"], "mainFields": ["main"], "preferBuiltins": true}"#,
        )
        .unwrap();

        let config_arg = config.to_string_lossy().to_string();
        let args = parse(&[
            "--importer",
            "/a/b.js",
            "--config",
            &config_arg,
            "--extensions",
            ".js",
        ]);
        let opts = args.options(Path::new("/")).unwrap();

        assert_eq!(opts.extensions, vec![".js"]);
        assert_eq!(opts.main_fields, vec!["main"]);
        assert!(opts.prefer_builtins);
    }

    #[test]
    fn test_missing_config_is_an_error() {
        let args = parse(&["--importer", "/a/b.js", "--config", "/no/such/config.json"]);
        assert!(args.options(Path::new("/")).is_err());
    }
}
