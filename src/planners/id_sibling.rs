//! Enum siblings
//!
//! An enum attribute `X_id` (or `X_uid`) has a human-readable companion
//! carrying the caption of its value. The companion is `X_name` when the
//! definition declares one, otherwise `X`. Attributes that already name a
//! sibling keep it.

use std::collections::BTreeMap;

use super::{attribute_defns, patch_attributes, PlanContext, Planner};
use crate::definitions::{AttrDefn, DefinitionFile, DefinitionKind};
use crate::error::Result;
use crate::merge::{ChangeList, MergeOptions};
use crate::operations::{Action, Operation};
use crate::overlay::Overlay;

/// `X` for an `X_id` or `X_uid` attribute name
fn id_base(name: &str) -> Option<&str> {
    name.strip_suffix("_uid")
        .or_else(|| name.strip_suffix("_id"))
        .filter(|base| !base.is_empty())
}

pub struct IdSiblingPlanner;

impl Planner for IdSiblingPlanner {
    fn name(&self) -> &'static str {
        "id-sibling"
    }

    fn accepts(&self) -> &'static [DefinitionKind] {
        &[DefinitionKind::Object, DefinitionKind::Event]
    }

    fn analyze(&self, file: &DefinitionFile, _ctx: &PlanContext<'_>) -> Vec<Operation> {
        if attribute_defns(&file.data).any(|(name, _)| id_base(name).is_some()) {
            vec![Operation::new(&file.path, None, Action::IdSibling)]
        } else {
            Vec::new()
        }
    }
}

pub fn apply(op: &Operation, overlay: &mut Overlay<'_>) -> Result<ChangeList> {
    let target = overlay.get(&op.target)?;
    let Some(attributes) = target.data.attributes() else {
        return Ok(Vec::new());
    };

    let patches: BTreeMap<String, AttrDefn> = attribute_defns(&target.data)
        .filter(|(_, attr)| attr.enum_values.is_some() && attr.sibling.is_none())
        .filter_map(|(name, _)| {
            let base = id_base(name)?;
            let sibling = [format!("{}_name", base), base.to_string()]
                .into_iter()
                .find(|candidate| attributes.contains_key(candidate))?;
            Some((
                name.clone(),
                AttrDefn {
                    sibling: Some(sibling),
                    ..Default::default()
                },
            ))
        })
        .collect();

    patch_attributes(overlay, &op.target, patches, &MergeOptions::gap_fill())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Selection;
    use crate::merge::FieldPath;
    use crate::repository::Repository;

    fn sibling(overlay: &Overlay<'_>, attr: &str) -> Option<String> {
        overlay.peek("events/base_event.json").unwrap().data.attributes().unwrap()[attr]
            .attribute()
            .unwrap()
            .sibling
            .clone()
    }

    #[test]
    fn test_links_enum_ids() {
        let mut repo = Repository::new();
        repo.add_json(
            "events/base_event.json",
            r#"{"attributes": {
                "activity_id": {"enum": {"1": {"caption": "Open"}}},
                "activity_name": {"type": "string_t"},
                "severity_id": {"enum": {"1": {"caption": "Low"}}},
                "severity": {"type": "string_t"},
                "status_id": {"enum": {"1": {"caption": "Ok"}}, "sibling": "status_text"},
                "status": {"type": "string_t"},
                "type_uid": {"enum": {"1": {"caption": "x"}}},
                "session_uid": {"type": "string_t"},
                "session": {"type": "session"}
            }}"#,
        )
        .unwrap();
        let mut overlay = Overlay::new(&repo);
        let selection = Selection::default();
        let ops = {
            let ctx = PlanContext::new(&overlay, &selection);
            IdSiblingPlanner.analyze(repo.get("events/base_event.json").unwrap(), &ctx)
        };
        assert_eq!(ops.len(), 1);

        let changes = ops[0].apply(&mut overlay).unwrap();

        assert_eq!(
            changes,
            vec![
                FieldPath::new(["attributes", "activity_id", "sibling"]),
                FieldPath::new(["attributes", "severity_id", "sibling"]),
            ]
        );
        assert_eq!(sibling(&overlay, "activity_id").as_deref(), Some("activity_name"));
        assert_eq!(sibling(&overlay, "severity_id").as_deref(), Some("severity"));
        assert_eq!(sibling(&overlay, "status_id").as_deref(), Some("status_text"));
        assert_eq!(sibling(&overlay, "type_uid"), None);
        assert_eq!(sibling(&overlay, "session_uid"), None);
    }

    #[test]
    fn test_id_base() {
        assert_eq!(id_base("activity_id"), Some("activity"));
        assert_eq!(id_base("class_uid"), Some("class"));
        assert_eq!(id_base("_id"), None);
        assert_eq!(id_base("pid"), None);
    }
}
