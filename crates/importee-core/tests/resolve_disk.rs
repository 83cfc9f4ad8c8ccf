//! Resolution against a real directory tree.

use importee_core::{resolve_import_path, MemoryLogger, OsFs, ResolutionOptions, Resolver};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create files (with parents) under a fresh temp dir.
fn tree(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (rel, contents) in files {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
    dir
}

/// Canonical root, so expectations match dereferenced results on hosts
/// where the temp dir itself sits behind a symlink.
fn root(dir: &TempDir) -> PathBuf {
    dunce::canonicalize(dir.path()).unwrap()
}

#[tokio::test]
async fn test_relative_with_extension_probe() {
    let dir = tree(&[("src/app.js", ""), ("src/dep.js", "")]);
    let root = root(&dir);
    let found = resolve_import_path(
        "./dep",
        &root.join("src/app.js"),
        &ResolutionOptions::default(),
    )
    .await
    .unwrap();
    assert_eq!(found, Some(root.join("src/dep.js")));
}

#[tokio::test]
async fn test_bare_package_main_from_root_dir() {
    let dir = tree(&[
        ("proj/src/deep/file.js", ""),
        (
            "proj/node_modules/pkg/package.json",
            r#"{"name": "pkg", "main": "lib/entry.js"}"#,
        ),
        ("proj/node_modules/pkg/lib/entry.js", ""),
    ]);
    let root = root(&dir);
    let opts = ResolutionOptions::new().with_root_dir(root.join("proj"));

    let found = resolve_import_path("pkg", &root.join("proj/src/deep/file.js"), &opts)
        .await
        .unwrap();
    assert_eq!(found, Some(root.join("proj/node_modules/pkg/lib/entry.js")));
}

#[tokio::test]
async fn test_not_found_logs_one_warning() {
    let dir = tree(&[("src/app.js", "")]);
    let root = root(&dir);
    let importer = root.join("src/app.js");
    let resolver = Resolver::new(OsFs, MemoryLogger::new());

    let found = resolver
        .resolve("./nope", &importer, &ResolutionOptions::default())
        .await
        .unwrap();

    assert_eq!(found, None);
    let messages = resolver.logger().messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("./nope"));
    assert!(messages[0].contains(&importer.display().to_string()));
}

#[tokio::test]
async fn test_malformed_package_json_on_disk() {
    let dir = tree(&[
        ("src/app.js", ""),
        ("node_modules/broken/package.json", "{ not json"),
        ("node_modules/broken/index.js", ""),
    ]);
    let root = root(&dir);
    let found = resolve_import_path(
        "broken",
        &root.join("src/app.js"),
        &ResolutionOptions::default(),
    )
    .await
    .unwrap();
    assert_eq!(found, Some(root.join("node_modules/broken/index.js")));
}

#[tokio::test]
async fn test_file_used_as_directory_is_a_miss() {
    let dir = tree(&[("src/app.js", ""), ("src/plain.js", "")]);
    let root = root(&dir);
    let found = resolve_import_path(
        "./plain.js/inner",
        &root.join("src/app.js"),
        &ResolutionOptions::default(),
    )
    .await
    .unwrap();
    assert_eq!(found, None);
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlinked_package() {
    let dir = tree(&[
        ("proj/src/app.js", ""),
        ("store/pkg/index.js", ""),
    ]);
    let root = root(&dir);
    fs::create_dir_all(root.join("proj/node_modules")).unwrap();
    std::os::unix::fs::symlink(root.join("store/pkg"), root.join("proj/node_modules/pkg"))
        .unwrap();

    let importer = root.join("proj/src/app.js");
    let real = resolve_import_path("pkg", &importer, &ResolutionOptions::default())
        .await
        .unwrap();
    let kept = resolve_import_path(
        "pkg",
        &importer,
        &ResolutionOptions::new().with_preserve_symlinks(true),
    )
    .await
    .unwrap();

    assert_eq!(real, Some(root.join("store/pkg/index.js")));
    assert_eq!(kept, Some(root.join("proj/node_modules/pkg/index.js")));
}

#[cfg(unix)]
#[tokio::test]
async fn test_unreadable_package_json_is_an_error() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tree(&[
        ("src/app.js", ""),
        ("node_modules/locked/package.json", r#"{"main": "a.js"}"#),
        ("node_modules/locked/index.js", ""),
    ]);
    let root = root(&dir);
    let pkg_json = root.join("node_modules/locked/package.json");
    fs::set_permissions(&pkg_json, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can read the file anyway
    if fs::read(&pkg_json).is_ok() {
        return;
    }

    let result = resolve_import_path(
        "locked",
        &root.join("src/app.js"),
        &ResolutionOptions::default(),
    )
    .await;
    fs::set_permissions(&pkg_json, fs::Permissions::from_mode(0o644)).unwrap();

    let err = result.unwrap_err();
    assert!(!err.is_invalid_input());
}

#[tokio::test]
async fn test_config_file_round_trip() {
    let dir = tree(&[(
        "importee.json",
        r#"{"extensions": [".ts", ".js"], "customResolveOptions": {"preserveSymlinks": true}}"#,
    )]);
    let opts = ResolutionOptions::load(&dir.path().join("importee.json")).unwrap();
    assert_eq!(opts.extensions, vec![".ts", ".js"]);
    assert!(opts.preserve_symlinks);
    assert!(ResolutionOptions::load(Path::new("/definitely/not/here.json")).is_err());
}
