//! `importee resolve`: print the file a specifier resolves to.

use super::{block_on, OptionArgs};
use importee_core::Resolver;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct ResolveJsonResult<'a> {
    ok: bool,
    specifier: &'a str,
    importer: &'a Path,
    resolved: Option<&'a Path>,
}

/// Run the resolve command. Exits with code 1 when nothing matches.
pub fn run(cwd: &Path, specifier: &str, args: &OptionArgs, json: bool) -> Result<()> {
    let importer = args.importer(cwd);
    let options = args.options(cwd)?;

    let resolver: Resolver = Resolver::default();
    let resolved: Option<PathBuf> =
        block_on(resolver.resolve(specifier, &importer, &options))?.into_diagnostic()?;

    if json {
        let result = ResolveJsonResult {
            ok: resolved.is_some(),
            specifier,
            importer: &importer,
            resolved: resolved.as_deref(),
        };
        println!("{}", serde_json::to_string_pretty(&result).into_diagnostic()?);
    } else if let Some(path) = &resolved {
        println!("{}", path.display());
    }

    if resolved.is_none() {
        std::process::exit(1);
    }
    Ok(())
}
