//! The default settings schema and per-setting validation/normalization.
//!
//! The default schema is the single source of truth for which dotted
//! setting names exist. It never changes at runtime; the resolver seeds
//! its settings tree from a deep copy of it.
//!
//! Every leaf has a [`SettingKind`] describing how raw strings (from the
//! environment or the CLI) are validated and converted into typed values.
//! The name-to-kind table is built once; unregistered names fall back to
//! [`SettingKind::Identity`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde_json::{Map, Value};

use crate::{Error, Result};

/// Platform cache directory for caravel (e.g. `~/.cache/caravel` on Linux).
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("caravel")
}

/// The fixed default schema.
///
/// Enumerates every valid leaf path and its default value. `cache-dir`
/// is resolved from the platform cache location at first access;
/// `virtualenvs.path` is defined in terms of it via a placeholder.
pub fn default_config() -> &'static Map<String, Value> {
    static DEFAULT: OnceLock<Map<String, Value>> = OnceLock::new();
    DEFAULT.get_or_init(|| {
        serde_json::json!({
            "cache-dir": default_cache_dir().to_string_lossy(),
            "virtualenvs": {
                "create": true,
                "in-project": null,
                "path": format!("{{cache-dir}}{}virtualenvs", std::path::MAIN_SEPARATOR),
                "options": {
                    "always-copy": false,
                    "system-site-packages": false,
                },
                "prefer-active-python": false,
            },
            "experimental": {
                "new-installer": true,
            },
            "installer": {
                "parallel": true,
                "max-workers": null,
            },
        })
        .as_object()
        .cloned()
        .unwrap_or_default()
    })
}

/// Check whether a dotted name addresses a leaf of the default schema.
///
/// Returns false for unknown names, for group names (`virtualenvs`,
/// `virtualenvs.options`), and for names that descend through a leaf.
pub fn is_key_valid(name: &str) -> bool {
    let mut current = default_config();
    let mut segments = name.split('.').peekable();
    while let Some(segment) = segments.next() {
        match current.get(segment) {
            Some(Value::Object(child)) => {
                if segments.peek().is_none() {
                    // Terminates at a group, not a leaf.
                    return false;
                }
                current = child;
            }
            Some(_) => return segments.peek().is_none(),
            None => return false,
        }
    }
    false
}

/// How a setting's raw string form is validated and normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    /// Boolean flags: accepts `true`/`false`/`1`/`0`.
    Bool,
    /// Filesystem paths: any string, normalized to platform components.
    Path,
    /// Integers strictly greater than zero.
    PositiveInt,
    /// Anything else: raw string passthrough.
    Identity,
}

/// Kinds for every non-identity leaf of the default schema.
static SETTING_KINDS: &[(&str, SettingKind)] = &[
    ("cache-dir", SettingKind::Path),
    ("virtualenvs.create", SettingKind::Bool),
    ("virtualenvs.in-project", SettingKind::Bool),
    ("virtualenvs.path", SettingKind::Path),
    ("virtualenvs.options.always-copy", SettingKind::Bool),
    ("virtualenvs.options.system-site-packages", SettingKind::Bool),
    ("virtualenvs.prefer-active-python", SettingKind::Bool),
    ("experimental.new-installer", SettingKind::Bool),
    ("installer.parallel", SettingKind::Bool),
    ("installer.max-workers", SettingKind::PositiveInt),
];

/// Look up the kind registered for a setting name.
///
/// Unregistered names get [`SettingKind::Identity`].
pub fn setting_kind(name: &str) -> SettingKind {
    static INDEX: OnceLock<HashMap<&'static str, SettingKind>> = OnceLock::new();
    INDEX
        .get_or_init(|| SETTING_KINDS.iter().copied().collect())
        .get(name)
        .copied()
        .unwrap_or(SettingKind::Identity)
}

impl SettingKind {
    /// Check whether a raw string is an acceptable input for this kind.
    ///
    /// Independent of [`normalize`](Self::normalize): the resolver's
    /// environment path never consults the validator, so callers taking
    /// untrusted input (like `cvl config set`) must check it themselves.
    pub fn validate(&self, raw: &str) -> bool {
        match self {
            SettingKind::Bool => matches!(raw, "true" | "false" | "1" | "0"),
            SettingKind::Path => true,
            SettingKind::PositiveInt => raw.parse::<i64>().map(|n| n > 0).unwrap_or(false),
            SettingKind::Identity => true,
        }
    }

    /// Convert a raw string into its typed value.
    ///
    /// Only [`SettingKind::PositiveInt`] can fail; a malformed integer is
    /// surfaced as [`Error::InvalidValue`] against `name`.
    pub fn normalize(&self, name: &str, raw: &str) -> Result<Value> {
        match self {
            SettingKind::Bool => Ok(Value::Bool(matches!(raw, "true" | "1"))),
            SettingKind::Path => Ok(Value::String(normalize_path(raw))),
            SettingKind::PositiveInt => raw
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| Error::InvalidValue {
                    name: name.to_string(),
                    value: raw.to_string(),
                }),
            SettingKind::Identity => Ok(Value::String(raw.to_string())),
        }
    }
}

/// Normalize a path string to platform components.
///
/// Collapses redundant separators; does not touch the filesystem.
fn normalize_path(raw: &str) -> String {
    let path: PathBuf = Path::new(raw).components().collect();
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every leaf path of the default schema, with its default value.
    fn known_keys() -> Vec<(String, Value)> {
        fn walk(node: &Map<String, Value>, parent: &str, out: &mut Vec<(String, Value)>) {
            for (key, value) in node {
                let path = if parent.is_empty() {
                    key.clone()
                } else {
                    format!("{parent}.{key}")
                };
                match value {
                    Value::Object(child) => walk(child, &path, out),
                    leaf => out.push((path, leaf.clone())),
                }
            }
        }
        let mut out = Vec::new();
        walk(default_config(), "", &mut out);
        out
    }

    // ==================== Default Schema Tests ====================

    #[test]
    fn test_default_schema_leaf_paths() {
        let keys: Vec<String> = known_keys().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                "cache-dir",
                "experimental.new-installer",
                "installer.max-workers",
                "installer.parallel",
                "virtualenvs.create",
                "virtualenvs.in-project",
                "virtualenvs.options.always-copy",
                "virtualenvs.options.system-site-packages",
                "virtualenvs.path",
                "virtualenvs.prefer-active-python",
            ]
        );
    }

    #[test]
    fn test_default_schema_values() {
        let defaults: Map<String, Value> = known_keys().into_iter().collect();
        assert_eq!(defaults["virtualenvs.create"], Value::Bool(true));
        assert_eq!(defaults["virtualenvs.in-project"], Value::Null);
        assert_eq!(defaults["virtualenvs.options.always-copy"], Value::Bool(false));
        assert_eq!(
            defaults["virtualenvs.options.system-site-packages"],
            Value::Bool(false)
        );
        assert_eq!(defaults["virtualenvs.prefer-active-python"], Value::Bool(false));
        assert_eq!(defaults["experimental.new-installer"], Value::Bool(true));
        assert_eq!(defaults["installer.parallel"], Value::Bool(true));
        assert_eq!(defaults["installer.max-workers"], Value::Null);

        let cache_dir = defaults["cache-dir"].as_str().unwrap();
        assert!(cache_dir.ends_with("caravel"));
        assert_eq!(
            defaults["virtualenvs.path"].as_str().unwrap(),
            &format!("{{cache-dir}}{}virtualenvs", std::path::MAIN_SEPARATOR)
        );
    }

    // ==================== Key Validity Tests ====================

    #[test]
    fn test_is_key_valid_for_all_leaves() {
        for (key, _) in known_keys() {
            assert!(is_key_valid(&key), "{key} should be valid");
        }
    }

    #[test]
    fn test_is_key_valid_rejects_groups() {
        assert!(!is_key_valid("virtualenvs"));
        assert!(!is_key_valid("virtualenvs.options"));
        assert!(!is_key_valid("experimental"));
        assert!(!is_key_valid("installer"));
    }

    #[test]
    fn test_is_key_valid_rejects_unknown() {
        assert!(!is_key_valid("foo"));
        assert!(!is_key_valid("bar"));
        assert!(!is_key_valid("virtualenvs.unknown"));
        assert!(!is_key_valid(""));
    }

    #[test]
    fn test_is_key_valid_rejects_descent_through_leaf() {
        assert!(!is_key_valid("cache-dir.foo"));
        assert!(!is_key_valid("installer.parallel.extra"));
    }

    // ==================== Setting Kind Tests ====================

    #[test]
    fn test_setting_kind_registry() {
        assert_eq!(setting_kind("cache-dir"), SettingKind::Path);
        assert_eq!(setting_kind("virtualenvs.path"), SettingKind::Path);
        assert_eq!(setting_kind("virtualenvs.create"), SettingKind::Bool);
        assert_eq!(setting_kind("virtualenvs.in-project"), SettingKind::Bool);
        assert_eq!(
            setting_kind("virtualenvs.prefer-active-python"),
            SettingKind::Bool
        );
        assert_eq!(setting_kind("installer.max-workers"), SettingKind::PositiveInt);
        assert_eq!(setting_kind("installer.unknown"), SettingKind::Identity);
        assert_eq!(setting_kind("foo"), SettingKind::Identity);
    }

    #[test]
    fn test_bool_validate() {
        for raw in ["true", "false", "1", "0"] {
            assert!(SettingKind::Bool.validate(raw), "{raw} should validate");
        }
        for raw in ["yes", "no", "TRUE", "2", ""] {
            assert!(!SettingKind::Bool.validate(raw), "{raw} should not validate");
        }
    }

    #[test]
    fn test_bool_normalize() {
        assert_eq!(
            SettingKind::Bool.normalize("virtualenvs.create", "true").unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            SettingKind::Bool.normalize("virtualenvs.create", "1").unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            SettingKind::Bool.normalize("virtualenvs.create", "false").unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            SettingKind::Bool.normalize("virtualenvs.create", "0").unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_positive_int_validate() {
        assert!(SettingKind::PositiveInt.validate("4"));
        assert!(SettingKind::PositiveInt.validate("1"));
        assert!(!SettingKind::PositiveInt.validate("0"));
        assert!(!SettingKind::PositiveInt.validate("-2"));
        assert!(!SettingKind::PositiveInt.validate("four"));
        assert!(!SettingKind::PositiveInt.validate(""));
    }

    #[test]
    fn test_positive_int_normalize() {
        assert_eq!(
            SettingKind::PositiveInt
                .normalize("installer.max-workers", "4")
                .unwrap(),
            Value::from(4)
        );
        let err = SettingKind::PositiveInt
            .normalize("installer.max-workers", "many")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
        assert!(err.to_string().contains("installer.max-workers"));
    }

    #[test]
    fn test_path_kind() {
        assert!(SettingKind::Path.validate("/anything//at all"));
        #[cfg(unix)]
        assert_eq!(
            SettingKind::Path.normalize("cache-dir", "/tmp//caravel/").unwrap(),
            Value::String("/tmp/caravel".to_string())
        );
    }

    #[test]
    fn test_identity_kind() {
        assert!(SettingKind::Identity.validate("whatever"));
        assert_eq!(
            SettingKind::Identity.normalize("foo", "whatever").unwrap(),
            Value::String("whatever".to_string())
        );
    }
}
