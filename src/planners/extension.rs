//! Extension handling
//!
//! Extensions live under `extensions/<dir>/` and mirror the core layout. A
//! file there either patches a core definition at the same relative path or
//! adds a new definition. Four planners cooperate:
//!
//! 1.  **Mark** (phase 0): attributes an extension contributes are stamped
//!     with the extension's declared name.
//! 2.  **Merge** (phase 0): a fragment with a core counterpart is merged into
//!     the counterpart, filling gaps only.
//! 3.  **Prefix** (phase 3): objects that exist only in an extension are
//!     renamed `<extension>/<name>`, and stamped attributes that reference
//!     them are retyped to match.
//! 4.  **Copy** (phase 3): a definition with no core counterpart is copied
//!     to its core path and stamped with `src_extension`.
//!
//! Only active extensions (see [`Selection`](crate::config::Selection)) take
//! part.

use std::collections::BTreeMap;

use super::{attribute_defns, merge_from, patch_attributes, PlanContext, Planner};
use crate::definitions::{
    AttrDefn, Definition, DefinitionFile, DefinitionKind, ObjectDefn,
};
use crate::error::{Error, Result};
use crate::merge::{merge_definitions, ChangeList, FieldMatcher, MergeOptions};
use crate::operations::{Action, Operation};
use crate::overlay::Overlay;
use crate::path;

/// Stamps extension-contributed attributes with the extension name
pub struct MarkExtensionPlanner;

impl Planner for MarkExtensionPlanner {
    fn name(&self) -> &'static str {
        "mark-extension"
    }

    fn accepts(&self) -> &'static [DefinitionKind] {
        &[
            DefinitionKind::Object,
            DefinitionKind::Event,
            DefinitionKind::Profile,
            DefinitionKind::Include,
        ]
    }

    fn analyze(&self, file: &DefinitionFile, ctx: &PlanContext<'_>) -> Vec<Operation> {
        let Some(dir) = ctx.active_extension(&file.path) else {
            return Vec::new();
        };
        if attribute_defns(&file.data).next().is_none() {
            return Vec::new();
        }
        let manifest = path::extension_manifest_path(dir);
        let prerequisite = ctx.overlay.contains(&manifest).then_some(manifest);
        vec![Operation::new(
            &file.path,
            prerequisite,
            Action::MarkExtension {
                extension: ctx.overlay.extension_name(dir),
            },
        )]
    }
}

pub fn apply_mark(op: &Operation, extension: &str, overlay: &mut Overlay<'_>) -> Result<ChangeList> {
    let core_path = path::extensionless(&op.target);
    let core_names: Vec<String> = overlay
        .peek(&core_path)
        .map(|core| attribute_defns(&core.data).map(|(n, _)| n.clone()).collect())
        .unwrap_or_default();

    let file = overlay.get(&op.target)?;
    let patches = attribute_defns(&file.data)
        .filter(|(name, _)| !core_names.contains(*name))
        .map(|(name, _)| {
            (
                name.clone(),
                AttrDefn {
                    extension: Some(extension.to_string()),
                    ..Default::default()
                },
            )
        })
        .collect();

    patch_attributes(
        overlay,
        &op.target,
        patches,
        &MergeOptions::gap_fill().existing_keys_only(),
    )
}

/// Merges extension fragments into their core counterparts
pub struct ExtensionMergePlanner;

impl Planner for ExtensionMergePlanner {
    fn name(&self) -> &'static str {
        "extension-merge"
    }

    fn accepts(&self) -> &'static [DefinitionKind] {
        &[
            DefinitionKind::Object,
            DefinitionKind::Event,
            DefinitionKind::Profile,
            DefinitionKind::Include,
            DefinitionKind::Dictionary,
            DefinitionKind::Categories,
        ]
    }

    fn analyze(&self, file: &DefinitionFile, ctx: &PlanContext<'_>) -> Vec<Operation> {
        if ctx.active_extension(&file.path).is_none() {
            return Vec::new();
        }
        let core = path::extensionless(&file.path);
        if !ctx.overlay.contains(&core) {
            return Vec::new();
        }
        vec![Operation::new(
            core,
            Some(file.path.clone()),
            Action::ExtensionMerge,
        )]
    }
}

pub fn apply_merge(op: &Operation, overlay: &mut Overlay<'_>) -> Result<ChangeList> {
    let source = op.prerequisite.as_deref().ok_or_else(|| Error::MissingReference {
        path: op.target.clone(),
        reference: "extension fragment".to_string(),
    })?;
    let source_kind = overlay.get(source)?.data.kind();
    let target_kind = overlay.get(&op.target)?.data.kind();
    if source_kind != target_kind {
        return Err(Error::shape(&op.target, source_kind, target_kind));
    }
    merge_from(overlay, &op.target, source, &MergeOptions::gap_fill())
}

/// Namespaces extension-only objects and references to them
pub struct ExtensionPrefixPlanner;

impl ExtensionPrefixPlanner {
    fn rename(&self, file: &DefinitionFile, ctx: &PlanContext<'_>) -> Option<String> {
        if file.data.kind() != DefinitionKind::Object {
            return None;
        }
        let dir = ctx.active_extension(&file.path)?;
        if ctx.overlay.contains(&path::extensionless(&file.path)) {
            return None;
        }
        let name = file.display_name();
        if name.contains('/') {
            return None;
        }
        Some(format!("{}/{}", ctx.overlay.extension_name(dir), name))
    }

    fn retype(&self, file: &DefinitionFile, ctx: &PlanContext<'_>) -> BTreeMap<String, String> {
        let index = ctx.extension_objects();
        attribute_defns(&file.data)
            .filter_map(|(name, attr)| {
                let extension = attr.extension.as_deref()?;
                let type_name = attr.type_.as_deref()?;
                index
                    .get(extension)
                    .filter(|objects| objects.contains(type_name))
                    .map(|_| (name.clone(), format!("{}/{}", extension, type_name)))
            })
            .collect()
    }
}

impl Planner for ExtensionPrefixPlanner {
    fn name(&self) -> &'static str {
        "extension-prefix"
    }

    fn accepts(&self) -> &'static [DefinitionKind] {
        &[DefinitionKind::Object, DefinitionKind::Event]
    }

    fn analyze(&self, file: &DefinitionFile, ctx: &PlanContext<'_>) -> Vec<Operation> {
        let rename = self.rename(file, ctx);
        let retype = self.retype(file, ctx);
        if rename.is_none() && retype.is_empty() {
            return Vec::new();
        }
        vec![Operation::new(
            &file.path,
            None,
            Action::ExtensionPrefix { rename, retype },
        )]
    }
}

pub fn apply_prefix(
    op: &Operation,
    rename: Option<&str>,
    retype: &BTreeMap<String, String>,
    overlay: &mut Overlay<'_>,
) -> Result<ChangeList> {
    let mut changes = Vec::new();

    if let Some(name) = rename {
        let file = overlay.get_mut(&op.target)?;
        let patch = Definition::Object(ObjectDefn {
            name: Some(name.to_string()),
            ..Default::default()
        });
        let options = MergeOptions::overwrite().allow([FieldMatcher::prefix(["name"])]);
        changes.extend(merge_definitions(&op.target, &mut file.data, &patch, &options)?);
    }

    let patches = retype
        .iter()
        .map(|(attribute, type_name)| {
            (
                attribute.clone(),
                AttrDefn {
                    type_: Some(type_name.clone()),
                    ..Default::default()
                },
            )
        })
        .collect();
    let options = MergeOptions::overwrite()
        .allow([FieldMatcher::name("type")])
        .existing_keys_only();
    changes.extend(patch_attributes(overlay, &op.target, patches, &options)?);

    Ok(changes)
}

/// Copies extension-only definitions to their core paths
pub struct ExtensionCopyPlanner;

impl Planner for ExtensionCopyPlanner {
    fn name(&self) -> &'static str {
        "extension-copy"
    }

    fn accepts(&self) -> &'static [DefinitionKind] {
        &[
            DefinitionKind::Object,
            DefinitionKind::Event,
            DefinitionKind::Profile,
            DefinitionKind::Include,
            DefinitionKind::Dictionary,
            DefinitionKind::Categories,
            DefinitionKind::Version,
        ]
    }

    fn analyze(&self, file: &DefinitionFile, ctx: &PlanContext<'_>) -> Vec<Operation> {
        let Some(dir) = ctx.active_extension(&file.path) else {
            return Vec::new();
        };
        let core = path::extensionless(&file.path);
        if ctx.overlay.contains(&core) {
            return Vec::new();
        }
        vec![Operation::new(
            core,
            Some(file.path.clone()),
            Action::ExtensionCopy {
                extension: ctx.overlay.extension_name(dir),
            },
        )]
    }
}

pub fn apply_copy(op: &Operation, extension: &str, overlay: &mut Overlay<'_>) -> Result<ChangeList> {
    let source = op.prerequisite.as_deref().ok_or_else(|| Error::MissingReference {
        path: op.target.clone(),
        reference: "extension definition".to_string(),
    })?;
    let mut data = overlay.get(source)?.data.clone();
    data.set_src_extension(extension);

    // Nothing exists at the destination yet, so every defined field is copied
    let mut copy = Definition::empty(data.kind());
    let changes = merge_definitions(&op.target, &mut copy, &data, &MergeOptions::overwrite())?;
    overlay.insert(DefinitionFile::new(&op.target, copy)?);
    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Selection;
    use crate::definitions::AttrEntry;
    use crate::merge::FieldPath;
    use crate::repository::Repository;
    use std::collections::BTreeSet;

    fn repo() -> Repository {
        let mut repo = Repository::new();
        repo.add_json(
            "objects/device.json",
            r#"{"name": "device", "caption": "Device", "attributes": {"hostname": {"type": "string_t"}}}"#,
        )
        .unwrap();
        repo.add_json(
            "extensions/linux/extension.json",
            r#"{"name": "linux", "uid": 1}"#,
        )
        .unwrap();
        repo.add_json(
            "extensions/linux/objects/device.json",
            r#"{"caption": "Linux Device", "attributes": {
                "hostname": {"description": "Host name"},
                "kernel": {"type": "kernel"}
            }}"#,
        )
        .unwrap();
        repo.add_json(
            "extensions/linux/objects/kernel.json",
            r#"{"name": "kernel", "caption": "Kernel"}"#,
        )
        .unwrap();
        repo
    }

    fn selection() -> Selection {
        Selection {
            extensions: BTreeSet::from(["linux".to_string()]),
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_planned_only_for_core_counterparts() {
        let repo = repo();
        let overlay = Overlay::new(&repo);
        let selection = selection();
        let ctx = PlanContext::new(&overlay, &selection);

        let device = repo.get("extensions/linux/objects/device.json").unwrap();
        let kernel = repo.get("extensions/linux/objects/kernel.json").unwrap();

        let ops = ExtensionMergePlanner.analyze(device, &ctx);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].target, "objects/device.json");
        assert!(ExtensionMergePlanner.analyze(kernel, &ctx).is_empty());
        assert_eq!(ExtensionCopyPlanner.analyze(kernel, &ctx).len(), 1);
        assert!(ExtensionCopyPlanner.analyze(device, &ctx).is_empty());
    }

    #[test]
    fn test_inactive_extension_is_ignored() {
        let repo = repo();
        let overlay = Overlay::new(&repo);
        let selection = Selection::default();
        let ctx = PlanContext::new(&overlay, &selection);

        let device = repo.get("extensions/linux/objects/device.json").unwrap();
        assert!(ExtensionMergePlanner.analyze(device, &ctx).is_empty());
        assert!(MarkExtensionPlanner.analyze(device, &ctx).is_empty());
    }

    #[test]
    fn test_mark_then_merge_fills_core() {
        let repo = repo();
        let mut overlay = Overlay::new(&repo);

        let mark = Operation::new(
            "extensions/linux/objects/device.json",
            None,
            Action::MarkExtension {
                extension: "linux".to_string(),
            },
        );
        let changes = mark.apply(&mut overlay).unwrap();
        assert_eq!(
            changes,
            vec![FieldPath::new(["attributes", "kernel", "extension"])]
        );

        let merge = Operation::new(
            "objects/device.json",
            Some("extensions/linux/objects/device.json".to_string()),
            Action::ExtensionMerge,
        );
        let changes = merge.apply(&mut overlay).unwrap();
        assert_eq!(
            changes,
            vec![
                FieldPath::new(["attributes", "hostname", "description"]),
                FieldPath::new(["attributes", "kernel"]),
            ]
        );

        let Definition::Object(device) = &overlay.peek("objects/device.json").unwrap().data else {
            panic!("expected an object");
        };
        assert_eq!(device.caption.as_deref(), Some("Device"));
        let kernel = device.attributes.as_ref().unwrap()["kernel"].attribute().unwrap();
        assert_eq!(kernel.extension.as_deref(), Some("linux"));
    }

    #[test]
    fn test_prefix_renames_and_retypes() {
        let repo = repo();
        let mut overlay = Overlay::new(&repo);
        // Stamp first so the retype pass can see the provenance
        Operation::new(
            "extensions/linux/objects/device.json",
            None,
            Action::MarkExtension {
                extension: "linux".to_string(),
            },
        )
        .apply(&mut overlay)
        .unwrap();

        let selection = selection();
        let ops = {
            let ctx = PlanContext::new(&overlay, &selection);
            let mut ops = Vec::new();
            for path in [
                "extensions/linux/objects/device.json",
                "extensions/linux/objects/kernel.json",
            ] {
                let file = overlay.peek(path).unwrap();
                ops.extend(ExtensionPrefixPlanner.analyze(file, &ctx));
            }
            ops
        };
        assert_eq!(ops.len(), 2);
        for op in &ops {
            op.apply(&mut overlay).unwrap();
        }

        let kernel = overlay.peek("extensions/linux/objects/kernel.json").unwrap();
        assert_eq!(kernel.data.name(), Some("linux/kernel"));
        let device = overlay.peek("extensions/linux/objects/device.json").unwrap();
        let attrs = device.data.attributes().unwrap();
        assert_eq!(
            attrs["kernel"],
            AttrEntry::Attribute(AttrDefn {
                type_: Some("linux/kernel".to_string()),
                extension: Some("linux".to_string()),
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_copy_stamps_source_extension() {
        let repo = repo();
        let mut overlay = Overlay::new(&repo);
        let op = Operation::new(
            "objects/kernel.json",
            Some("extensions/linux/objects/kernel.json".to_string()),
            Action::ExtensionCopy {
                extension: "linux".to_string(),
            },
        );

        let changes = op.apply(&mut overlay).unwrap();

        assert!(changes.contains(&FieldPath::new(["src_extension"])));
        let copy = overlay.peek("objects/kernel.json").unwrap();
        assert_eq!(copy.data.src_extension(), Some("linux"));
        assert_eq!(copy.data.name(), Some("kernel"));
        assert!(!repo.contains("objects/kernel.json"));
    }

    #[test]
    fn test_merge_rejects_mismatched_shapes() {
        let mut repo = repo();
        repo.add_json("extensions/linux/events/device.json", "{}")
            .unwrap();
        let mut overlay = Overlay::new(&repo);
        let op = Operation::new(
            "objects/device.json",
            Some("extensions/linux/events/device.json".to_string()),
            Action::ExtensionMerge,
        );
        assert!(matches!(
            op.apply(&mut overlay),
            Err(Error::ShapeViolation { .. })
        ));
    }
}
