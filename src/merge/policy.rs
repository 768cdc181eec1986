//! Update policy for the merge engine
//!
//! A merge walks two definitions field by field. At every field it asks the
//! policy whether the right-hand value may replace the left-hand one. The
//! decision depends on three knobs:
//!
//! - `overwrite`: replace values that are already defined on the left.
//! - `allowed_fields`: when set, only matching paths may change.
//! - `ignored_fields`: matching paths never change (ignored when an
//!   allow-list is set).
//!
//! A fourth knob, `existing_keys_only`, stops map merges from inserting keys
//! that exist only on the right.
//!
//! ## Inserting new keys
//!
//! A key that exists only on the right is inserted whatever `overwrite`
//! says, since there is nothing on the left to protect. The allow-list and
//! the deny-list still apply to the new key's path: an allow-list merge
//! restricted to `attributes.type_uid` never adds `attributes.other`, and a
//! deny-list entry keeps its key out of the map.

use std::fmt;

/// Path of a field inside a definition, from the definition root
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath(pub Vec<String>);

impl FieldPath {
    pub fn new<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

/// Matches a field path for allow/deny decisions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldMatcher {
    /// Matches any path whose last segment is this name
    Name(String),
    /// Matches any path that starts with these segments
    Prefix(Vec<String>),
}

impl FieldMatcher {
    pub fn name(name: impl Into<String>) -> Self {
        FieldMatcher::Name(name.into())
    }

    pub fn prefix<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        FieldMatcher::Prefix(segments.into_iter().map(Into::into).collect())
    }

    pub fn matches(&self, path: &[String]) -> bool {
        match self {
            FieldMatcher::Name(name) => path.last() == Some(name),
            FieldMatcher::Prefix(prefix) => path.starts_with(prefix),
        }
    }
}

/// Options controlling a single merge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOptions {
    pub overwrite: bool,
    pub allowed_fields: Option<Vec<FieldMatcher>>,
    pub ignored_fields: Option<Vec<FieldMatcher>>,
    pub existing_keys_only: bool,
}

impl MergeOptions {
    /// Fill undefined fields only
    pub fn gap_fill() -> Self {
        Self::default()
    }

    /// Replace every field the right side defines
    pub fn overwrite() -> Self {
        Self {
            overwrite: true,
            ..Self::default()
        }
    }

    pub fn allow(mut self, matchers: impl IntoIterator<Item = FieldMatcher>) -> Self {
        self.allowed_fields = Some(matchers.into_iter().collect());
        self
    }

    pub fn ignore(mut self, matchers: impl IntoIterator<Item = FieldMatcher>) -> Self {
        self.ignored_fields = Some(matchers.into_iter().collect());
        self
    }

    pub fn existing_keys_only(mut self) -> Self {
        self.existing_keys_only = true;
        self
    }

    /// Decide whether the value at `path` may be replaced.
    ///
    /// An undefined right side never replaces anything. Otherwise the base
    /// decision is `overwrite || left undefined`, then filtered by the
    /// allow-list (if set) or the deny-list.
    pub fn can_update(&self, path: &[String], left_defined: bool, right_defined: bool) -> bool {
        if !right_defined {
            return false;
        }
        let base = self.overwrite || !left_defined;

        if let Some(allowed) = &self.allowed_fields {
            return base && allowed.iter().any(|m| m.matches(path));
        }
        if let Some(ignored) = &self.ignored_fields {
            if ignored.iter().any(|m| m.matches(path)) {
                return false;
            }
        }
        base
    }

    /// Decide whether a map key present only on the right may be inserted.
    pub fn can_insert(&self, path: &[String]) -> bool {
        !self.existing_keys_only && self.can_update(path, false, true)
    }
}
