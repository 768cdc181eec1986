//! Annotations of include fragments and profiles
//!
//! A fragment may carry an `annotations` map such as
//! `{"group": "context"}`. Every attribute the fragment declares receives
//! each known annotation as a default, so the values travel with the
//! attributes into every object or event that includes the fragment.

use std::collections::BTreeMap;

use log::debug;

use super::{attribute_defns, patch_attributes, PlanContext, Planner};
use crate::definitions::{AttrDefn, DefinitionFile, DefinitionKind};
use crate::error::Result;
use crate::merge::{ChangeList, MergeOptions};
use crate::operations::{Action, Operation};
use crate::overlay::Overlay;

pub struct AnnotationPlanner;

impl Planner for AnnotationPlanner {
    fn name(&self) -> &'static str {
        "annotations"
    }

    fn accepts(&self) -> &'static [DefinitionKind] {
        &[DefinitionKind::Include, DefinitionKind::Profile]
    }

    fn analyze(&self, file: &DefinitionFile, _ctx: &PlanContext<'_>) -> Vec<Operation> {
        let annotated = file.data.annotations().is_some_and(|a| !a.is_empty());
        if annotated && attribute_defns(&file.data).next().is_some() {
            vec![Operation::new(&file.path, None, Action::Annotate)]
        } else {
            Vec::new()
        }
    }
}

/// Translate annotations into an attribute patch
fn annotation_patch(annotations: &BTreeMap<String, String>) -> AttrDefn {
    let mut patch = AttrDefn::default();
    for (key, value) in annotations {
        match key.as_str() {
            "group" => patch.group = Some(value.clone()),
            "requirement" => patch.requirement = Some(value.clone()),
            "observable" => match value.parse() {
                Ok(observable) => patch.observable = Some(observable),
                Err(_) => debug!("Ignoring non-numeric observable annotation `{}`", value),
            },
            other => debug!("Ignoring unknown annotation `{}`", other),
        }
    }
    patch
}

pub fn apply(op: &Operation, overlay: &mut Overlay<'_>) -> Result<ChangeList> {
    let file = overlay.get(&op.target)?;
    let Some(annotations) = file.data.annotations() else {
        return Ok(Vec::new());
    };
    let patch = annotation_patch(annotations);
    let patches = attribute_defns(&file.data)
        .map(|(name, _)| (name.clone(), patch.clone()))
        .collect();

    patch_attributes(overlay, &op.target, patches, &MergeOptions::gap_fill())
}
