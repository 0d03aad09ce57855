//! Pre-dumped test listings.
//!
//! A snapshot is the flattened output of the configuration parser: one
//! record per test with its short name and, optionally, its long name or an
//! explicit family prefix.
//!
//! ```json
//! {
//!   "tests": [
//!     { "shortname": "type_specific.block_hotplug.raw.max_size",
//!       "name": "(subtest=type_specific).(subtest=block_hotplug).(image=raw).(x=max_size)" }
//!   ]
//! }
//! ```

use std::path::Path;

use cit_model::{ModelError, VariantIndex};
use serde::{Deserialize, Serialize};

const SUBTEST_MARKER: &str = "(subtest=";

/// Long names from the configuration parser always join components with dots.
const LONG_NAME_SEPARATOR: char = '.';

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("cannot read snapshot '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("test '{0}' has neither a prefix nor subtest components in its name")]
    MissingPrefix(String),

    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

/// One test as listed by the configuration parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRecord {
    /// Fully-qualified short test name.
    pub shortname: String,
    /// Long name with `(key=value)` components.
    #[serde(default)]
    pub name: Option<String>,
    /// Explicit family prefix; overrides the one derived from `name`.
    #[serde(default)]
    pub prefix: Option<String>,
}

impl TestRecord {
    /// Family prefix of this test.
    pub fn resolve_prefix(&self, separator: char) -> Result<String, SnapshotError> {
        if let Some(prefix) = &self.prefix {
            return Ok(prefix.clone());
        }
        self.name
            .as_deref()
            .and_then(|name| subtest_prefix(name, separator))
            .ok_or_else(|| SnapshotError::MissingPrefix(self.shortname.clone()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tests: Vec<TestRecord>,
}

impl Snapshot {
    pub fn from_json_str(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, SnapshotError> {
        let json = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Group the listed tests into families.
    pub fn variant_index(&self, separator: char) -> Result<VariantIndex, SnapshotError> {
        let named = self
            .tests
            .iter()
            .map(|t| Ok((t.resolve_prefix(separator)?, t.shortname.as_str())))
            .collect::<Result<Vec<_>, SnapshotError>>()?;
        Ok(VariantIndex::from_full_names(named, separator)?)
    }
}

/// Family prefix spelled by the `(subtest=X)` components of a long name,
/// joined with `separator`.
///
/// `(subtest=io).(image=raw).(subtest=hotplug)` gives `io.hotplug` for `.`.
pub fn subtest_prefix(long_name: &str, separator: char) -> Option<String> {
    let parts: Vec<&str> = long_name
        .split(LONG_NAME_SEPARATOR)
        .filter_map(|part| part.strip_prefix(SUBTEST_MARKER)?.strip_suffix(')'))
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join(separator.to_string().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtest_prefix() {
        assert_eq!(
            subtest_prefix("(subtest=io).(image=raw).(subtest=hotplug)", '.').as_deref(),
            Some("io.hotplug")
        );
        assert_eq!(subtest_prefix("(image=raw).(x=y)", '.'), None);
    }

    #[test]
    fn test_subtest_prefix_uses_configured_separator() {
        assert_eq!(
            subtest_prefix("(subtest=io).(image=raw).(subtest=hotplug)", '/').as_deref(),
            Some("io/hotplug")
        );
    }

    #[test]
    fn test_variant_index_with_slash_separator() {
        let json = r#"{"tests": [
            {"shortname": "t/hotplug/raw/max_size", "name": "(subtest=t).(subtest=hotplug).(i=raw).(s=max_size)"},
            {"shortname": "t/hotplug/qcow2", "name": "(subtest=t).(subtest=hotplug).(i=qcow2)"}
        ]}"#;
        let index = Snapshot::from_json_str(json)
            .unwrap()
            .variant_index('/')
            .unwrap();
        assert_eq!(
            index.variants("t/hotplug").unwrap(),
            ["raw/max_size", "qcow2"]
        );
    }

    #[test]
    fn test_explicit_prefix_wins() {
        let record = TestRecord {
            shortname: "a.b.c".into(),
            name: Some("(subtest=z)".into()),
            prefix: Some("a".into()),
        };
        assert_eq!(record.resolve_prefix('.').unwrap(), "a");
    }

    #[test]
    fn test_missing_prefix() {
        let record = TestRecord {
            shortname: "a.b".into(),
            name: None,
            prefix: None,
        };
        assert!(matches!(
            record.resolve_prefix('.'),
            Err(SnapshotError::MissingPrefix(_))
        ));
    }

    #[test]
    fn test_variant_index_from_snapshot() {
        let json = r#"{"tests": [
            {"shortname": "t.hotplug.raw.max_size", "name": "(subtest=t).(subtest=hotplug).(i=raw).(s=max_size)"},
            {"shortname": "t.hotplug.qcow2.default", "name": "(subtest=t).(subtest=hotplug).(i=qcow2).(s=default)"},
            {"shortname": "t.other.x", "prefix": "t.other"}
        ]}"#;
        let index = Snapshot::from_json_str(json)
            .unwrap()
            .variant_index('.')
            .unwrap();
        assert_eq!(
            index.variants("t.hotplug").unwrap(),
            ["raw.max_size", "qcow2.default"]
        );
        assert_eq!(index.variants("t.other").unwrap(), ["x"]);
    }

    #[test]
    fn test_shortname_outside_prefix_is_malformed() {
        let json = r#"{"tests": [{"shortname": "u.x", "prefix": "t"}]}"#;
        let err = Snapshot::from_json_str(json)
            .unwrap()
            .variant_index('.')
            .unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::Model(ModelError::MalformedVariant { .. })
        ));
    }
}
