//! `importee batch`: resolve many specifiers from one importer.

use super::{block_on, OptionArgs};
use importee_core::{ResolveRequest, Resolver};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct BatchEntry<'a> {
    specifier: &'a str,
    resolved: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Run the batch command.
///
/// Misses print `-`; failed requests are reported on stderr and make the
/// command exit with code 2.
pub fn run(cwd: &Path, specifiers: &[String], args: &OptionArgs, json: bool) -> Result<()> {
    let importer = args.importer(cwd);
    let options = args.options(cwd)?;

    let requests: Vec<ResolveRequest> = specifiers
        .iter()
        .map(|spec| ResolveRequest::new(spec.as_str(), importer.as_path()))
        .collect();

    let resolver: Resolver = Resolver::default();
    let results = block_on(resolver.resolve_all(&requests, &options))?;

    let entries: Vec<BatchEntry<'_>> = specifiers
        .iter()
        .zip(results)
        .map(|(specifier, result)| match result {
            Ok(resolved) => BatchEntry {
                specifier,
                resolved,
                error: None,
            },
            Err(e) => BatchEntry {
                specifier,
                resolved: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

    let has_errors = entries.iter().any(|e| e.error.is_some());

    if json {
        println!("{}", serde_json::to_string_pretty(&entries).into_diagnostic()?);
    } else {
        for entry in &entries {
            match (&entry.resolved, &entry.error) {
                (_, Some(err)) => eprintln!("! {}: {err}", entry.specifier),
                (Some(path), None) => println!("{}\t{}", entry.specifier, path.display()),
                (None, None) => println!("{}\t-", entry.specifier),
            }
        }
    }

    if has_errors {
        std::process::exit(2);
    }
    Ok(())
}
