//! `importee explain`: show every step of a resolution.

use super::{block_on, OptionArgs};
use importee_core::resolver::EXPLAIN_SCHEMA_VERSION;
use importee_core::{Explained, Resolver};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::Path;

/// Explain result for JSON output.
#[derive(Serialize)]
struct ExplainJsonResult<'a> {
    schema_version: u32,
    ok: bool,
    result: &'a Explained,
}

/// Run the explain command. Exits with code 1 when nothing matches.
pub fn run(cwd: &Path, specifier: &str, args: &OptionArgs, json: bool) -> Result<()> {
    let importer = args.importer(cwd);
    let options = args.options(cwd)?;

    let resolver: Resolver = Resolver::default();
    let explained = block_on(resolver.explain(specifier, &importer, &options))?.into_diagnostic()?;

    if json {
        let result = ExplainJsonResult {
            schema_version: EXPLAIN_SCHEMA_VERSION,
            ok: explained.resolved.is_some(),
            result: &explained,
        };
        println!("{}", serde_json::to_string_pretty(&result).into_diagnostic()?);
    } else {
        print_explain_human(&explained);
    }

    if explained.resolved.is_none() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_explain_human(result: &Explained) {
    println!("Specifier: {}", result.specifier);
    println!("Kind: {}", result.kind);
    println!("Importer: {}", result.importer.display());
    println!();

    match &result.resolved {
        Some(resolved) => println!("Resolved: {}", resolved.display()),
        None => println!("Status: UNRESOLVED"),
    }
    println!();

    println!("Resolution trace:");
    for (i, step) in result.trace.steps.iter().enumerate() {
        let status = if step.ok { "OK" } else { "FAIL" };
        println!("  {}. [{}] {}: {}", i + 1, status, step.step, step.detail);

        if let Some(path) = &step.path {
            println!("      path: {}", path.display());
        }
        if let Some(key) = &step.key {
            println!("      key: {key}");
        }
        if let Some(target) = &step.target {
            println!("      target: {target}");
        }
    }

    if !result.trace.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &result.trace.warnings {
            println!("  [{}] {}", warning.code, warning.message);
        }
    }

    if result.resolved.is_none() && !result.trace.tried.is_empty() {
        println!();
        println!("Tried:");
        for path in &result.trace.tried {
            println!("  {}", path.display());
        }
    }
}
