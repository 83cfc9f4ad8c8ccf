//! Package.json exports field evaluation.
//!
//! Opt-in: only consulted when resolution options carry export conditions.
//! Implements the common subset of Node's rules:
//! - Root exports (string, `"."` key, or root-level conditions)
//! - Exact subpath keys (`"./feature"`)
//! - Pattern keys with a single `*` (`"./features/*"`)
//! - Conditional targets, chosen by the caller's condition priority
//!   rather than object key order

use serde_json::{Map, Value};

/// Resolve exports for a subpath.
///
/// `subpath` is `None` for the package root, or `Some("./feature")`.
/// Returns the target path (starting with "./") if found.
#[must_use]
pub fn resolve_exports(
    exports: &Value,
    subpath: Option<&str>,
    conditions: &[String],
) -> Option<String> {
    match subpath {
        None => resolve_exports_root(exports, conditions),
        Some(sub) => resolve_exports_subpath(exports, sub, conditions)
            .or_else(|| resolve_exports_pattern(exports, sub, conditions)),
    }
}

/// Resolve the root export.
///
/// Supported shapes:
/// - `"./path"` - string shorthand
/// - `{ ".": "./path" }` or `{ ".": { "import": ..., "default": ... } }`
/// - `{ "import": ..., "default": ... }` - root conditions
fn resolve_exports_root(exports: &Value, conditions: &[String]) -> Option<String> {
    if let Some(s) = exports.as_str() {
        return validate_export_path(s);
    }

    let obj = exports.as_object()?;

    if let Some(dot) = obj.get(".") {
        return resolve_export_target(dot, conditions, 0);
    }

    if !has_subpath_keys(obj) {
        return resolve_export_target(exports, conditions, 0);
    }

    None
}

/// Resolve an exact subpath key.
fn resolve_exports_subpath(
    exports: &Value,
    subpath: &str,
    conditions: &[String],
) -> Option<String> {
    if !subpath.starts_with("./") {
        return None;
    }

    let obj = exports.as_object()?;
    if !has_subpath_keys(obj) {
        return None;
    }

    let target = obj.get(subpath)?;
    resolve_export_target(target, conditions, 0)
}

/// Resolve a pattern key; the most specific (longest) key wins.
fn resolve_exports_pattern(
    exports: &Value,
    subpath: &str,
    conditions: &[String],
) -> Option<String> {
    if !subpath.starts_with("./") {
        return None;
    }

    let obj = exports.as_object()?;

    let (_, target, star_value) = obj
        .iter()
        .filter(|(key, _)| key.starts_with("./") && key.matches('*').count() == 1)
        .filter_map(|(key, value)| {
            match_pattern(key, subpath).map(|star| (key.as_str(), value, star))
        })
        .min_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)))?;

    let target = resolve_export_target(target, conditions, 0)?;
    substitute_star(&target, star_value)
}

/// Check if exports object has subpath keys (keys starting with ".").
fn has_subpath_keys(obj: &Map<String, Value>) -> bool {
    obj.keys().any(|k| k.starts_with('.'))
}

/// Match a pattern key against a subpath, returning the `*` substitution.
fn match_pattern<'a>(pattern: &str, subpath: &'a str) -> Option<&'a str> {
    let (prefix, suffix) = pattern.split_once('*')?;

    if subpath.len() < prefix.len() + suffix.len() {
        return None;
    }
    let star = subpath.strip_prefix(prefix)?.strip_suffix(suffix)?;

    (!star.is_empty()).then_some(star)
}

/// Substitute `*` in the target, rejecting results that leave the package.
fn substitute_star(target: &str, star_value: &str) -> Option<String> {
    if target.matches('*').count() != 1 {
        return None;
    }

    let result = target.replace('*', star_value);

    if !result.starts_with("./") || escapes_package(&result) {
        return None;
    }

    Some(result)
}

/// Nesting limit for conditional targets.
const MAX_CONDITION_DEPTH: usize = 8;

/// Resolve a target: a string, a conditions object, or an array of fallbacks.
fn resolve_export_target(
    target: &Value,
    conditions: &[String],
    depth: usize,
) -> Option<String> {
    if depth > MAX_CONDITION_DEPTH {
        return None;
    }

    match target {
        Value::String(s) => validate_export_path(s),
        Value::Array(items) => items
            .iter()
            .find_map(|item| resolve_export_target(item, conditions, depth + 1)),
        Value::Object(obj) => conditions.iter().find_map(|condition| {
            obj.get(condition)
                .and_then(|value| resolve_export_target(value, conditions, depth + 1))
        }),
        _ => None,
    }
}

/// Export targets must be package-relative and stay inside the package.
fn validate_export_path(path: &str) -> Option<String> {
    (path.starts_with("./") && !escapes_package(path)).then(|| path.to_string())
}

fn escapes_package(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| segment == "..")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn conds(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_exports_string_root() {
        let exports = json!("./dist/index.js");
        assert_eq!(
            resolve_exports(&exports, None, &conds(&["import"])),
            Some("./dist/index.js".to_string())
        );
    }

    #[test]
    fn test_exports_dot_string() {
        let exports = json!({ ".": "./a.js" });
        assert_eq!(
            resolve_exports(&exports, None, &conds(&["default"])),
            Some("./a.js".to_string())
        );
    }

    #[test]
    fn test_exports_conditions_follow_caller_priority() {
        let exports = json!({
            ".": {
                "require": "./cjs.cjs",
                "import": "./esm.js",
                "default": "./d.js"
            }
        });
        assert_eq!(
            resolve_exports(&exports, None, &conds(&["import", "default"])),
            Some("./esm.js".to_string())
        );
        assert_eq!(
            resolve_exports(&exports, None, &conds(&["default", "import"])),
            Some("./d.js".to_string())
        );
        assert_eq!(resolve_exports(&exports, None, &conds(&["browser"])), None);
    }

    #[test]
    fn test_exports_conditions_at_root() {
        let exports = json!({
            "import": "./esm.js",
            "default": "./default.js"
        });
        assert_eq!(
            resolve_exports(&exports, None, &conds(&["import"])),
            Some("./esm.js".to_string())
        );
    }

    #[test]
    fn test_exports_nested_conditions() {
        let exports = json!({
            ".": { "node": { "import": "./node.mjs" }, "default": "./browser.js" }
        });
        assert_eq!(
            resolve_exports(&exports, None, &conds(&["node", "import", "default"])),
            Some("./node.mjs".to_string())
        );
        assert_eq!(
            resolve_exports(&exports, None, &conds(&["import", "default"])),
            Some("./browser.js".to_string())
        );
    }

    #[test]
    fn test_exports_array_fallback() {
        let exports = json!({ ".": ["not-relative", "./ok.js"] });
        assert_eq!(
            resolve_exports(&exports, None, &conds(&["default"])),
            Some("./ok.js".to_string())
        );
    }

    #[test]
    fn test_exports_invalid_path_ignored() {
        let exports = json!("https://example.com/x");
        assert_eq!(resolve_exports(&exports, None, &conds(&["default"])), None);
        let exports = json!("/absolute/path.js");
        assert_eq!(resolve_exports(&exports, None, &conds(&["default"])), None);
    }

    #[test]
    fn test_exports_target_outside_package_rejected() {
        let exports = json!({
            ".": "./../../x.js",
            "./feature": { "import": "./dist/../../secret.js", "default": "./ok.js" },
            "./win": "./..\\up.js"
        });
        let default = conds(&["default"]);
        assert_eq!(resolve_exports(&exports, None, &default), None);
        assert_eq!(
            resolve_exports(&exports, Some("./feature"), &conds(&["import"])),
            None
        );
        assert_eq!(
            resolve_exports(&exports, Some("./feature"), &conds(&["import", "default"])),
            Some("./ok.js".to_string())
        );
        assert_eq!(
            resolve_exports(&exports, Some("./feature"), &default),
            Some("./ok.js".to_string())
        );
        assert_eq!(resolve_exports(&exports, Some("./win"), &default), None);
    }

    #[test]
    fn test_exports_subpath_string() {
        let exports = json!({ ".": "./index.js", "./feature": "./dist/feature.js" });
        assert_eq!(
            resolve_exports(&exports, Some("./feature"), &conds(&["default"])),
            Some("./dist/feature.js".to_string())
        );
    }

    #[test]
    fn test_exports_subpath_not_found() {
        let exports = json!({ ".": "./index.js", "./feature": "./dist/feature.js" });
        assert_eq!(
            resolve_exports(&exports, Some("./other"), &conds(&["default"])),
            None
        );
    }

    #[test]
    fn test_exports_subpath_with_string_exports() {
        let exports = json!("./index.js");
        assert_eq!(
            resolve_exports(&exports, Some("./feature"), &conds(&["default"])),
            None
        );
    }

    #[test]
    fn test_exports_pattern_simple() {
        let exports = json!({ "./*": "./dist/*.js" });
        assert_eq!(
            resolve_exports(&exports, Some("./utils"), &conds(&["default"])),
            Some("./dist/utils.js".to_string())
        );
    }

    #[test]
    fn test_exports_pattern_specificity() {
        let exports = json!({
            "./*": "./dist/*.js",
            "./features/*": "./dist/features/*/index.js"
        });
        assert_eq!(
            resolve_exports(&exports, Some("./features/a"), &conds(&["default"])),
            Some("./dist/features/a/index.js".to_string())
        );
    }

    #[test]
    fn test_exports_pattern_path_traversal_rejected() {
        let exports = json!({ "./*": "./dist/*" });
        assert_eq!(
            resolve_exports(&exports, Some("./../secret"), &conds(&["default"])),
            None
        );
    }

    #[test]
    fn test_exports_pattern_empty_star_rejected() {
        let exports = json!({ "./features/*": "./dist/*.js" });
        assert_eq!(
            resolve_exports(&exports, Some("./features/"), &conds(&["default"])),
            None
        );
    }

    #[test]
    fn test_exports_exact_before_pattern() {
        let exports = json!({
            "./*": "./dist/*.js",
            "./special": "./special.js"
        });
        assert_eq!(
            resolve_exports(&exports, Some("./special"), &conds(&["default"])),
            Some("./special.js".to_string())
        );
    }

    #[test]
    fn test_match_pattern_overlap() {
        assert_eq!(match_pattern("./a*a", "./a"), None);
        assert_eq!(match_pattern("./a*a", "./aba"), Some("b"));
    }
}
