//! # Operations
//!
//! An [`Operation`] is one planned, targeted mutation of the overlay: a target
//! path, an optional prerequisite path whose operations must run first, and
//! the [`Action`] to perform. Planners produce operations; the orchestrator
//! orders and applies them.
//!
//! Applying an operation returns the [`ChangeList`] of field paths it changed
//! in the target. An operation that finds nothing to do returns an empty list.
//! An operation that meets a definition of the wrong shape fails with
//! `ShapeViolation`.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;
use crate::merge::ChangeList;
use crate::overlay::Overlay;
use crate::path::RepoPath;
use crate::planners::{
    annotations, category, datetime, dictionary, extends, extension, id_sibling, include,
    object_type, profile, uid,
};

/// What an operation does to its target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Apply a fragment's annotations to its own attributes
    Annotate,
    /// Stamp attributes contributed by an extension with its name
    MarkExtension { extension: String },
    /// Stamp a selected profile's own attributes with its owner name
    MarkProfile { profile: String },
    /// Merge an include fragment (the prerequisite) into the target
    Include { subject: String, from_attributes: bool },
    /// Merge the base definition (the prerequisite) into the target
    Extends,
    /// Merge an extension fragment (the prerequisite) into its core counterpart
    ExtensionMerge,
    /// Record a selected profile as owner of the target attributes it declares
    ProfileOwner { profile: String },
    /// Remove an unselected profile's attributes from the target
    ExcludeProfile { profile: String },
    /// Assign the category implied by the event's path
    SetCategory { category: String },
    /// Compute category, class and type identifiers
    Uid,
    /// Fill attribute details from the dictionary
    Dictionary,
    /// Namespace extension-only object names and references to them
    ExtensionPrefix {
        rename: Option<String>,
        retype: BTreeMap<String, String>,
    },
    /// Turn references to non-primitive types into object references
    ObjectType,
    /// Link enum id attributes to their display siblings
    IdSibling,
    /// Add `_dt` companions for timestamp attributes
    DateTime,
    /// Copy an extension definition (the prerequisite) to its core path
    ExtensionCopy { extension: String },
}

impl Action {
    /// Short name used in plan listings
    pub fn label(&self) -> &'static str {
        match self {
            Action::Annotate => "annotate",
            Action::MarkExtension { .. } => "mark-extension",
            Action::MarkProfile { .. } => "mark-profile",
            Action::Include { .. } => "include",
            Action::Extends => "extends",
            Action::ExtensionMerge => "extension-merge",
            Action::ProfileOwner { .. } => "profile-owner",
            Action::ExcludeProfile { .. } => "exclude-profile",
            Action::SetCategory { .. } => "set-category",
            Action::Uid => "uid",
            Action::Dictionary => "dictionary",
            Action::ExtensionPrefix { .. } => "extension-prefix",
            Action::ObjectType => "object-type",
            Action::IdSibling => "id-sibling",
            Action::DateTime => "datetime",
            Action::ExtensionCopy { .. } => "extension-copy",
        }
    }
}

/// A planned mutation of one target definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub target: RepoPath,
    pub prerequisite: Option<RepoPath>,
    pub action: Action,
}

impl Operation {
    pub fn new(target: impl Into<RepoPath>, prerequisite: Option<RepoPath>, action: Action) -> Self {
        Self {
            target: target.into(),
            prerequisite,
            action,
        }
    }

    /// Apply this operation to the overlay
    pub fn apply(&self, overlay: &mut Overlay<'_>) -> Result<ChangeList> {
        match &self.action {
            Action::Annotate => annotations::apply(self, overlay),
            Action::MarkExtension { extension: name } => {
                extension::apply_mark(self, name, overlay)
            }
            Action::MarkProfile { profile: name } => profile::apply_mark(self, name, overlay),
            Action::Include {
                subject,
                from_attributes,
            } => include::apply(self, subject, *from_attributes, overlay),
            Action::Extends => extends::apply(self, overlay),
            Action::ExtensionMerge => extension::apply_merge(self, overlay),
            Action::ProfileOwner { profile: name } => profile::apply_owner(self, name, overlay),
            Action::ExcludeProfile { profile: name } => {
                profile::apply_exclude(self, name, overlay)
            }
            Action::SetCategory { category: name } => category::apply(self, name, overlay),
            Action::Uid => uid::apply(self, overlay),
            Action::Dictionary => dictionary::apply(self, overlay),
            Action::ExtensionPrefix { rename, retype } => {
                extension::apply_prefix(self, rename.as_deref(), retype, overlay)
            }
            Action::ObjectType => object_type::apply(self, overlay),
            Action::IdSibling => id_sibling::apply(self, overlay),
            Action::DateTime => datetime::apply(self, overlay),
            Action::ExtensionCopy { extension: name } => {
                extension::apply_copy(self, name, overlay)
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.action.label(), self.target)?;
        match &self.action {
            Action::MarkExtension { extension: name }
            | Action::ExtensionCopy { extension: name } => write!(f, " [{}]", name)?,
            Action::MarkProfile { profile: name }
            | Action::ProfileOwner { profile: name }
            | Action::ExcludeProfile { profile: name } => write!(f, " [{}]", name)?,
            Action::SetCategory { category: name } => write!(f, " [{}]", name)?,
            Action::Include { subject, .. } => write!(f, " [{}]", subject)?,
            _ => {}
        }
        if let Some(prerequisite) = &self.prerequisite {
            write!(f, " <- {}", prerequisite)?;
        }
        Ok(())
    }
}
