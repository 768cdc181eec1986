//! Object references
//!
//! An attribute typed with anything other than a dictionary type refers to
//! an object. It is rewritten to `type: object_t` with the object's name in
//! `object_type`, so renderers can tell the two apart without a lookup.

use std::collections::BTreeMap;

use super::{attribute_defns, patch_attributes, PlanContext, Planner};
use crate::definitions::{AttrDefn, DefinitionFile, DefinitionKind};
use crate::error::Result;
use crate::merge::{ChangeList, FieldMatcher, MergeOptions};
use crate::operations::{Action, Operation};
use crate::overlay::Overlay;
use crate::path::DICTIONARY_FILE;

pub const OBJECT_T: &str = "object_t";

pub struct ObjectTypePlanner;

impl Planner for ObjectTypePlanner {
    fn name(&self) -> &'static str {
        "object-type"
    }

    fn accepts(&self) -> &'static [DefinitionKind] {
        &[DefinitionKind::Object, DefinitionKind::Event]
    }

    fn analyze(&self, file: &DefinitionFile, ctx: &PlanContext<'_>) -> Vec<Operation> {
        if ctx.overlay.dictionary().is_none() {
            return Vec::new();
        }
        vec![Operation::new(
            &file.path,
            Some(DICTIONARY_FILE.to_string()),
            Action::ObjectType,
        )]
    }
}

pub fn apply(op: &Operation, overlay: &mut Overlay<'_>) -> Result<ChangeList> {
    let Some(dictionary) = overlay.dictionary() else {
        return Ok(Vec::new());
    };
    let target = overlay.get(&op.target)?;

    let patches: BTreeMap<String, AttrDefn> = attribute_defns(&target.data)
        .filter_map(|(name, attr)| {
            let type_name = attr.type_.as_deref()?;
            if type_name == OBJECT_T || dictionary.has_type(type_name) {
                return None;
            }
            Some((
                name.clone(),
                AttrDefn {
                    type_: Some(OBJECT_T.to_string()),
                    object_type: Some(type_name.to_string()),
                    ..Default::default()
                },
            ))
        })
        .collect();

    let options = MergeOptions::overwrite()
        .allow([FieldMatcher::name("type"), FieldMatcher::name("object_type")])
        .existing_keys_only();
    patch_attributes(overlay, &op.target, patches, &options)
}
