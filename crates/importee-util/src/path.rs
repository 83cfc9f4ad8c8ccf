//! Lexical path helpers.
//!
//! Nothing here touches the filesystem: symlinks are not followed and `..`
//! is applied to the textual path.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Normalize a path lexically, removing `.` components and folding `..`
/// into the preceding component.
///
/// `..` directly below the root is dropped (`/..` is `/`). Leading `..`
/// components of a relative path are kept.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    let mut depth = 0usize;

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                out.push(component.as_os_str());
                depth = 0;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth > 0 {
                    out.pop();
                    depth -= 1;
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            Component::Normal(name) => {
                out.push(name);
                depth += 1;
            }
        }
    }

    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Append an extension to the full file name, without replacing an existing one.
///
/// `append_extension("lib/a.min", ".js")` is `lib/a.min.js`, where
/// [`Path::with_extension`] would give `lib/a.js`.
#[must_use]
pub fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(ext);
    PathBuf::from(s)
}

/// Ancestors of `dir`, starting with `dir` itself and ending at the root.
pub fn ancestors(dir: &Path) -> impl Iterator<Item = &Path> {
    dir.ancestors().filter(|p| !p.as_os_str().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_removes_cur_dir() {
        assert_eq!(normalize(Path::new("/a/./b/.")), PathBuf::from("/a/b"));
    }

    #[test]
    fn test_normalize_folds_parent_dir() {
        assert_eq!(
            normalize(Path::new("/proj/src/../lib/x.js")),
            PathBuf::from("/proj/lib/x.js")
        );
    }

    #[test]
    fn test_normalize_parent_above_root() {
        assert_eq!(normalize(Path::new("/../../a")), PathBuf::from("/a"));
    }

    #[test]
    fn test_normalize_relative_keeps_leading_parent() {
        assert_eq!(normalize(Path::new("../a/../b")), PathBuf::from("../b"));
        assert_eq!(normalize(Path::new("a/..")), PathBuf::from("."));
    }

    #[test]
    fn test_append_extension_keeps_existing_dot() {
        assert_eq!(
            append_extension(Path::new("/p/a.min"), ".js"),
            PathBuf::from("/p/a.min.js")
        );
        assert_eq!(
            append_extension(Path::new("/p/dep"), ".json"),
            PathBuf::from("/p/dep.json")
        );
    }

    #[test]
    fn test_ancestors_walks_to_root() {
        let dirs: Vec<_> = ancestors(Path::new("/a/b")).collect();
        assert_eq!(dirs, vec![Path::new("/a/b"), Path::new("/a"), Path::new("/")]);
    }
}
