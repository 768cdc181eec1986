//! Datetime companions
//!
//! With the `datetime` profile selected, every `timestamp_t` attribute `T`
//! gains a companion `T_dt` of type `datetime_t`, owned by that profile.
//! The dictionary must declare `datetime_t`; without it nothing is added.

use std::collections::BTreeMap;

use super::{attribute_defns, patch_attributes, PlanContext, Planner};
use crate::definitions::{AttrDefn, DefinitionFile, DefinitionKind, OneOrMany};
use crate::error::Result;
use crate::merge::{ChangeList, MergeOptions};
use crate::operations::{Action, Operation};
use crate::overlay::Overlay;
use crate::path::DICTIONARY_FILE;

pub const DATETIME_PROFILE: &str = "datetime";
const TIMESTAMP_T: &str = "timestamp_t";
const DATETIME_T: &str = "datetime_t";
const SUFFIX: &str = "_dt";

pub struct DateTimePlanner;

impl Planner for DateTimePlanner {
    fn name(&self) -> &'static str {
        "datetime"
    }

    fn accepts(&self) -> &'static [DefinitionKind] {
        &[DefinitionKind::Object, DefinitionKind::Event]
    }

    fn analyze(&self, file: &DefinitionFile, ctx: &PlanContext<'_>) -> Vec<Operation> {
        if !ctx.selection.profile_selected(DATETIME_PROFILE) {
            return Vec::new();
        }
        let has_timestamps =
            attribute_defns(&file.data).any(|(_, attr)| attr.type_.as_deref() == Some(TIMESTAMP_T));
        if !has_timestamps {
            return Vec::new();
        }
        let prerequisite = ctx
            .overlay
            .contains(DICTIONARY_FILE)
            .then(|| DICTIONARY_FILE.to_string());
        vec![Operation::new(&file.path, prerequisite, Action::DateTime)]
    }
}

pub fn apply(op: &Operation, overlay: &mut Overlay<'_>) -> Result<ChangeList> {
    if !overlay
        .dictionary()
        .is_some_and(|dictionary| dictionary.has_type(DATETIME_T))
    {
        return Ok(Vec::new());
    }
    let target = overlay.get(&op.target)?;

    let patches: BTreeMap<String, AttrDefn> = attribute_defns(&target.data)
        .filter(|(name, attr)| {
            attr.type_.as_deref() == Some(TIMESTAMP_T) && !name.ends_with(SUFFIX)
        })
        .map(|(name, attr)| {
            (
                format!("{}{}", name, SUFFIX),
                AttrDefn {
                    caption: attr.caption.as_ref().map(|c| format!("{} Datetime", c)),
                    description: attr.description.clone(),
                    requirement: Some("optional".to_string()),
                    type_: Some(DATETIME_T.to_string()),
                    profile: Some(OneOrMany::One(DATETIME_PROFILE.to_string())),
                    group: attr.group.clone(),
                    is_array: attr.is_array,
                    ..Default::default()
                },
            )
        })
        .collect();

    patch_attributes(overlay, &op.target, patches, &MergeOptions::gap_fill())
}
