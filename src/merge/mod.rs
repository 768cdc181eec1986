//! Structural merge of definitions
//!
//! This module merges one definition into another of the same shape and
//! reports every field it changed. It is the single mechanism every
//! enrichment step uses to modify definitions.
//!
//! ## How fields merge
//!
//! Each definition shape declares, per field, how that field merges (see the
//! `mergeable!` macro):
//!
//! - `leaf`: replaced as a whole when the policy allows.
//! - `part`: a nested definition; merged recursively when both sides are
//!   present, otherwise treated as a leaf.
//! - `map`: a name-keyed map of nested definitions; merged key by key when
//!   both sides are non-empty, otherwise treated as a leaf. Keys present only
//!   on the right are inserted when the policy allows insertion.
//!
//! Whether a value may be replaced is decided by [`MergeOptions`]. Every
//! applied change is recorded as a [`FieldPath`] in the returned
//! [`ChangeList`].

use std::collections::BTreeMap;

use crate::definitions::Definition;
use crate::error::{Error, Result};

pub mod policy;

pub use policy::{FieldMatcher, FieldPath, MergeOptions};

/// Field paths changed by a merge, in the order they were changed
pub type ChangeList = Vec<FieldPath>;

/// A value that can be merged field by field
pub trait Merge {
    fn merge_fields(&mut self, other: &Self, ctx: &mut MergeContext<'_>);
}

/// Traversal state of a single merge
#[derive(Debug)]
pub struct MergeContext<'o> {
    options: &'o MergeOptions,
    trail: Vec<String>,
    changes: ChangeList,
}

impl<'o> MergeContext<'o> {
    pub fn new(options: &'o MergeOptions) -> Self {
        Self {
            options,
            trail: Vec::new(),
            changes: Vec::new(),
        }
    }

    pub fn into_changes(self) -> ChangeList {
        self.changes
    }

    fn record(&mut self) {
        self.changes.push(FieldPath(self.trail.clone()));
    }

    fn scoped<R>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> R) -> R {
        self.trail.push(name.to_string());
        let result = f(self);
        self.trail.pop();
        result
    }

    /// Replace `left` with `right` as a whole, if allowed.
    pub fn leaf<T: Clone>(&mut self, name: &str, left: &mut Option<T>, right: &Option<T>) {
        self.scoped(name, |ctx| {
            if ctx
                .options
                .can_update(&ctx.trail, left.is_some(), right.is_some())
            {
                *left = right.clone();
                ctx.record();
            }
        });
    }

    /// Merge a nested definition.
    pub fn part<T: Merge + Clone>(&mut self, name: &str, left: &mut Option<T>, right: &Option<T>) {
        match (left.as_mut(), right) {
            (Some(l), Some(r)) => self.scoped(name, |ctx| l.merge_fields(r, ctx)),
            _ => self.leaf(name, left, right),
        }
    }

    /// Merge a name-keyed map of nested definitions.
    pub fn map<V: Merge + Clone>(
        &mut self,
        name: &str,
        left: &mut Option<BTreeMap<String, V>>,
        right: &Option<BTreeMap<String, V>>,
    ) {
        let composite = matches!(
            (&*left, right),
            (Some(l), Some(r)) if !l.is_empty() && !r.is_empty()
        );
        if !composite {
            return self.leaf(name, left, right);
        }
        let (Some(l), Some(r)) = (left.as_mut(), right) else {
            return;
        };

        self.scoped(name, |ctx| {
            for (key, value) in r {
                ctx.scoped(key, |ctx| match l.get_mut(key) {
                    Some(existing) => existing.merge_fields(value, ctx),
                    None => {
                        if ctx.options.can_insert(&ctx.trail) {
                            l.insert(key.clone(), value.clone());
                            ctx.record();
                        }
                    }
                });
            }
        });
    }

    /// Replace a value that is defined on both sides, if allowed.
    ///
    /// Used for values that cannot be merged field by field, such as two
    /// map entries of different kinds.
    pub fn replace<T: Clone>(&mut self, left: &mut T, right: &T) {
        if self.options.can_update(&self.trail, true, true) {
            *left = right.clone();
            self.record();
        }
    }
}

/// Declare how each field of a definition shape merges.
///
/// ```ignore
/// mergeable!(EnumMemberDefn {
///     leaf caption,
///     leaf description,
/// });
/// ```
///
/// A field may be given a different path segment with `= "name"`.
macro_rules! mergeable {
    (@key $field:ident) => {
        stringify!($field)
    };
    (@key $field:ident $key:literal) => {
        $key
    };
    ($ty:ty { $($kind:ident $field:ident $(= $key:literal)?),* $(,)? }) => {
        impl $crate::merge::Merge for $ty {
            fn merge_fields(&mut self, other: &Self, ctx: &mut $crate::merge::MergeContext<'_>) {
                $(
                    ctx.$kind(
                        $crate::merge::mergeable!(@key $field $($key)?),
                        &mut self.$field,
                        &other.$field,
                    );
                )*
            }
        }
    };
}
pub(crate) use mergeable;

/// Merge `right` into `left`, returning the changed field paths.
pub fn merge<T: Merge>(left: &mut T, right: &T, options: &MergeOptions) -> ChangeList {
    let mut ctx = MergeContext::new(options);
    left.merge_fields(right, &mut ctx);
    ctx.into_changes()
}

/// Merge two definitions of the same shape.
///
/// Returns `ShapeViolation` when the shapes differ; use
/// [`Definition::reshape`] first for cross-shape merges.
pub fn merge_definitions(
    path: &str,
    left: &mut Definition,
    right: &Definition,
    options: &MergeOptions,
) -> Result<ChangeList> {
    let changes = match (left, right) {
        (Definition::Object(l), Definition::Object(r)) => merge(l, r, options),
        (Definition::Event(l), Definition::Event(r)) => merge(l, r, options),
        (Definition::Profile(l), Definition::Profile(r)) => merge(l, r, options),
        (Definition::Include(l), Definition::Include(r)) => merge(l, r, options),
        (Definition::Extension(l), Definition::Extension(r)) => merge(l, r, options),
        (Definition::Dictionary(l), Definition::Dictionary(r)) => merge(l, r, options),
        (Definition::Categories(l), Definition::Categories(r)) => merge(l, r, options),
        (Definition::Version(l), Definition::Version(r)) => merge(l, r, options),
        (l, r) => return Err(Error::shape(path, r.kind(), l.kind())),
    };
    Ok(changes)
}
