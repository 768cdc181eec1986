//! # Planners
//!
//! A planner inspects one definition file and proposes zero or more
//! [`Operation`]s. Planners never mutate anything: they read the overlay as
//! left by earlier phases and return operations, which the orchestrator orders
//! and applies.
//!
//! Each planner declares the definition shapes it accepts; the orchestrator
//! only calls [`Planner::analyze`] for files of those shapes.
//!
//! The apply side of each operation lives next to the planner that proposes
//! it, so every enrichment reads top to bottom in one module.

use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet};

use crate::config::Selection;
use crate::definitions::{AttrDefn, AttrEntry, Definition, DefinitionFile, DefinitionKind};
use crate::error::{Error, Result};
use crate::merge::{merge_definitions, ChangeList, MergeOptions};
use crate::operations::Operation;
use crate::overlay::Overlay;
use crate::path;

pub mod annotations;
pub mod category;
pub mod datetime;
pub mod dictionary;
pub mod extends;
pub mod extension;
pub mod find_dependency;
pub mod id_sibling;
pub mod include;
pub mod object_type;
pub mod profile;
pub mod uid;

/// Proposes operations for definition files
pub trait Planner: Send + Sync {
    /// Name used in logs and plan listings
    fn name(&self) -> &'static str;

    /// Definition shapes this planner analyzes
    fn accepts(&self) -> &'static [DefinitionKind];

    /// Propose operations for one file
    fn analyze(&self, file: &DefinitionFile, ctx: &PlanContext<'_>) -> Vec<Operation>;
}

/// Read-only view handed to planners during analysis
pub struct PlanContext<'a> {
    pub overlay: &'a Overlay<'a>,
    pub selection: &'a Selection,
    extension_objects: OnceCell<BTreeMap<String, BTreeSet<String>>>,
}

impl<'a> PlanContext<'a> {
    pub fn new(overlay: &'a Overlay<'a>, selection: &'a Selection) -> Self {
        Self {
            overlay,
            selection,
            extension_objects: OnceCell::new(),
        }
    }

    /// Directory of the active extension owning `path`, if any
    pub fn active_extension<'p>(&self, path: &'p str) -> Option<&'p str> {
        path::extension(path).filter(|dir| self.selection.extension_active(dir))
    }

    /// Whether `path` belongs to an extension left out of the compilation
    pub fn is_inactive_extension(&self, path: &str) -> bool {
        path::extension(path).is_some_and(|dir| !self.selection.extension_active(dir))
    }

    /// Names of objects that exist only in an active extension, keyed by the
    /// extension's declared name
    pub fn extension_objects(&self) -> &BTreeMap<String, BTreeSet<String>> {
        self.extension_objects.get_or_init(|| {
            let mut index: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
            for file in self.overlay.files() {
                if file.data.kind() != DefinitionKind::Object {
                    continue;
                }
                let Some(dir) = self.active_extension(&file.path) else {
                    continue;
                };
                if self.overlay.contains(&path::extensionless(&file.path)) {
                    continue;
                }
                let name = file.display_name();
                if name.contains('/') {
                    continue;
                }
                index
                    .entry(self.overlay.extension_name(dir))
                    .or_default()
                    .insert(name.to_string());
            }
            index
        })
    }
}

/// Attributes of a definition, skipping include directives
pub(crate) fn attribute_defns(data: &Definition) -> impl Iterator<Item = (&String, &AttrDefn)> {
    data.attributes()
        .into_iter()
        .flatten()
        .filter_map(|(name, entry)| entry.attribute().map(|attr| (name, attr)))
}

/// Fail unless the definition at `path` carries an attribute map
pub(crate) fn require_attributes(file: &DefinitionFile) -> Result<()> {
    match file.data.kind() {
        DefinitionKind::Object
        | DefinitionKind::Event
        | DefinitionKind::Profile
        | DefinitionKind::Include => Ok(()),
        other => Err(Error::shape(&file.path, "definition with attributes", other)),
    }
}

/// Fail unless the definition has the expected shape
pub(crate) fn require_kind(file: &DefinitionFile, expected: DefinitionKind) -> Result<()> {
    if file.data.kind() == expected {
        Ok(())
    } else {
        Err(Error::shape(&file.path, expected, file.data.kind()))
    }
}

/// Merge per-attribute patches into the attribute map of `target`
pub(crate) fn patch_attributes(
    overlay: &mut Overlay<'_>,
    target: &str,
    patches: BTreeMap<String, AttrDefn>,
    options: &MergeOptions,
) -> Result<ChangeList> {
    let file = overlay.get_mut(target)?;
    require_attributes(file)?;
    if patches.is_empty() {
        return Ok(Vec::new());
    }
    let patch = Definition::from_attributes(
        file.data.kind(),
        patches
            .into_iter()
            .map(|(name, attr)| (name, AttrEntry::Attribute(attr)))
            .collect(),
    );
    merge_definitions(target, &mut file.data, &patch, options)
}

/// Merge the (reshaped) definition at `source` into `target`
pub(crate) fn merge_from(
    overlay: &mut Overlay<'_>,
    target: &str,
    source: &str,
    options: &MergeOptions,
) -> Result<ChangeList> {
    let target_kind = overlay.get(target)?.data.kind();
    let patch = overlay.get(source)?.data.reshape(target_kind);
    let file = overlay.get_mut(target)?;
    merge_definitions(target, &mut file.data, &patch, options)
}
