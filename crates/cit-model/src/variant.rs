//! Variant decomposition.
//!
//! Variant suffixes are split on the separator into category tokens and
//! right-padded with the absent sentinel so that every variant of a family
//! has the same arity. Category `i` is then defined for all of them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Separator between the prefix and category tokens of a test name.
pub const DEFAULT_SEPARATOR: char = '.';

/// Placeholder for categories a shorter variant does not have.
pub const DEFAULT_ABSENT: &str = "";

/// Test variants grouped by family prefix.
///
/// Suffixes keep their discovery order within a family; families are
/// ordered by prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantIndex {
    families: BTreeMap<String, Vec<String>>,
}

impl VariantIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one variant suffix under `prefix`.
    pub fn insert(&mut self, prefix: impl Into<String>, suffix: impl Into<String>) {
        self.families
            .entry(prefix.into())
            .or_default()
            .push(suffix.into());
    }

    /// Group fully-qualified test names by their prefix.
    ///
    /// Every name must be the prefix itself or the prefix followed by the
    /// separator; anything else means the prefix does not belong to the name
    /// and is reported as [`ModelError::MalformedVariant`].
    pub fn from_full_names<I, P, N>(names: I, separator: char) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = (P, N)>,
        P: AsRef<str>,
        N: AsRef<str>,
    {
        let mut index = Self::new();
        for (prefix, name) in names {
            let (prefix, name) = (prefix.as_ref(), name.as_ref());
            let suffix = split_suffix(prefix, name, separator).ok_or_else(|| {
                ModelError::MalformedVariant {
                    prefix: prefix.to_string(),
                    name: name.to_string(),
                }
            })?;
            index.insert(prefix, suffix);
        }
        Ok(index)
    }

    /// Variant suffixes recorded for `prefix`.
    pub fn variants(&self, prefix: &str) -> Option<&[String]> {
        self.families.get(prefix).map(Vec::as_slice)
    }

    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.families.keys().map(String::as_str)
    }

    /// Number of families.
    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Every observed test name across all families.
    pub fn full_names(&self, separator: char) -> BTreeSet<String> {
        self.families
            .iter()
            .flat_map(|(prefix, suffixes)| {
                suffixes.iter().map(move |suffix| {
                    if suffix.is_empty() {
                        prefix.clone()
                    } else {
                        format!("{prefix}{separator}{suffix}")
                    }
                })
            })
            .collect()
    }
}

fn split_suffix<'a>(prefix: &str, name: &'a str, separator: char) -> Option<&'a str> {
    let rest = name.strip_prefix(prefix)?;
    if rest.is_empty() {
        return Some(rest);
    }
    rest.strip_prefix(separator)
}

/// One variant as an ordered sequence of category tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Variant {
    tokens: Vec<String>,
}

impl Variant {
    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn arity(&self) -> usize {
        self.tokens.len()
    }
}

/// The decomposed, padded variants of a single family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSet {
    pub prefix: String,
    pub separator: char,
    pub absent: String,
    pub variants: Vec<Variant>,
}

impl VariantSet {
    /// Split and pad a list of suffixes.
    ///
    /// An empty suffix names the bare prefix and has no tokens. A token equal
    /// to `absent` could not be told apart from padding once the row is
    /// reassembled, so it is rejected with [`ModelError::AbsentCollision`].
    pub fn from_suffixes<S: AsRef<str>>(
        prefix: &str,
        suffixes: &[S],
        separator: char,
        absent: &str,
    ) -> Result<Self, ModelError> {
        let mut split: Vec<Vec<String>> = Vec::with_capacity(suffixes.len());
        for suffix in suffixes {
            let suffix = suffix.as_ref();
            if suffix.is_empty() {
                split.push(Vec::new());
                continue;
            }
            let tokens: Vec<String> = suffix.split(separator).map(str::to_string).collect();
            if let Some(token) = tokens.iter().find(|t| t.as_str() == absent) {
                return Err(ModelError::AbsentCollision {
                    prefix: prefix.to_string(),
                    suffix: suffix.to_string(),
                    token: token.clone(),
                });
            }
            split.push(tokens);
        }
        let arity = split.iter().map(Vec::len).max().unwrap_or(0).max(1);

        let variants = split
            .into_iter()
            .map(|mut tokens| {
                tokens.resize(arity, absent.to_string());
                Variant::new(tokens)
            })
            .collect();

        Ok(Self {
            prefix: prefix.to_string(),
            separator,
            absent: absent.to_string(),
            variants,
        })
    }

    /// Common arity after padding.
    pub fn arity(&self) -> usize {
        self.variants.first().map_or(0, Variant::arity)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

/// Decompose the variants recorded for `prefix`.
pub fn decompose(
    index: &VariantIndex,
    prefix: &str,
    separator: char,
    absent: &str,
) -> Result<VariantSet, ModelError> {
    let suffixes = index
        .variants(prefix)
        .ok_or_else(|| ModelError::UnknownPrefix(prefix.to_string()))?;
    if suffixes.is_empty() {
        return Err(ModelError::NoVariants(prefix.to_string()));
    }
    VariantSet::from_suffixes(prefix, suffixes, separator, absent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotplug_index() -> VariantIndex {
        let mut index = VariantIndex::new();
        for suffix in ["raw.max_size", "qcow2.fmt_qcow2", "qcow2.default"] {
            index.insert("type_specific.block_hotplug", suffix);
        }
        index
    }

    #[test]
    fn test_decompose_splits_tokens() {
        let set = decompose(&hotplug_index(), "type_specific.block_hotplug", '.', "").unwrap();
        assert_eq!(set.arity(), 2);
        assert_eq!(set.variants[0].tokens(), ["raw", "max_size"]);
        assert_eq!(set.variants[2].tokens()[1], "default");
    }

    #[test]
    fn test_decompose_pads_short_variants() {
        let set = VariantSet::from_suffixes("t", &["a.b.c", "a", "x.y"], '.', "-").unwrap();
        assert_eq!(set.arity(), 3);
        assert_eq!(set.variants[1].tokens(), ["a", "-", "-"]);
        assert_eq!(set.variants[2].tokens(), ["x", "y", "-"]);
    }

    #[test]
    fn test_decompose_unknown_prefix() {
        let err = decompose(&hotplug_index(), "missing", '.', "").unwrap_err();
        assert_eq!(err, ModelError::UnknownPrefix("missing".into()));
    }

    #[test]
    fn test_from_full_names_groups_by_prefix() {
        let index = VariantIndex::from_full_names(
            [
                ("a.b", "a.b.x.y"),
                ("a.b", "a.b.z"),
                ("c", "c.w"),
                ("c", "c"),
            ],
            '.',
        )
        .unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.variants("a.b").unwrap(), ["x.y", "z"]);
        assert_eq!(index.variants("c").unwrap(), ["w", ""]);
    }

    #[test]
    fn test_from_full_names_rejects_foreign_prefix() {
        let err = VariantIndex::from_full_names([("a.b", "a.bc.x")], '.').unwrap_err();
        assert!(matches!(err, ModelError::MalformedVariant { .. }));
    }

    #[test]
    fn test_full_names_round_trip_suffixes() {
        let names = hotplug_index().full_names('.');
        assert_eq!(names.len(), 3);
        assert!(names.contains("type_specific.block_hotplug.raw.max_size"));
    }

    #[test]
    fn test_empty_component_collides_with_default_absent() {
        for suffix in ["a..b", "a.", ".a"] {
            let err = VariantSet::from_suffixes("p", &[suffix, "c.d.e"], '.', "").unwrap_err();
            assert_eq!(
                err,
                ModelError::AbsentCollision {
                    prefix: "p".into(),
                    suffix: suffix.into(),
                    token: String::new(),
                }
            );
        }
    }

    #[test]
    fn test_real_token_collides_with_custom_absent() {
        let mut index = VariantIndex::new();
        index.insert("p", "raw.none");
        index.insert("p", "qcow2");
        let err = decompose(&index, "p", '.', "none").unwrap_err();
        assert!(matches!(
            err,
            ModelError::AbsentCollision { ref token, .. } if token == "none"
        ));
        assert!(decompose(&index, "p", '.', "-").is_ok());
    }

    #[test]
    fn test_bare_prefix_variant_is_all_absent() {
        let set = VariantSet::from_suffixes("p", &["", "a.b"], '.', "").unwrap();
        assert_eq!(set.arity(), 2);
        assert_eq!(set.variants[0].tokens(), ["", ""]);

        let only_bare = VariantSet::from_suffixes("p", &[""], '.', "-").unwrap();
        assert_eq!(only_bare.variants[0].tokens(), ["-"]);
    }
}
