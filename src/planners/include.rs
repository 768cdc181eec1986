//! Include directives
//!
//! Objects and events may name include fragments in a top-level `$include`
//! field; objects, events, profiles and include fragments may also carry a
//! `$include` entry inside their attribute map. Each resolved target is
//! merged into the includer with gap-fill semantics, so the includer's own
//! declarations win. Attribute-map directives are removed once merged.
//!
//! Unresolved targets are skipped; nothing is scheduled for them.

use log::debug;

use super::find_dependency::find_dependency;
use super::{merge_from, PlanContext, Planner};
use crate::definitions::{AttrEntry, DefinitionFile, DefinitionKind, INCLUDE_KEY};
use crate::error::{Error, Result};
use crate::merge::{ChangeList, FieldMatcher, FieldPath, MergeOptions};
use crate::operations::{Action, Operation};
use crate::overlay::Overlay;

pub struct IncludePlanner;

impl IncludePlanner {
    /// Include subjects of a file, each tagged with where it was declared
    fn subjects(file: &DefinitionFile) -> Vec<(String, bool)> {
        let mut subjects: Vec<(String, bool)> = file
            .data
            .include()
            .map(|targets| targets.items().into_iter().map(|s| (s.to_string(), false)).collect())
            .unwrap_or_default();

        if let Some(AttrEntry::Include(targets)) =
            file.data.attributes().and_then(|attrs| attrs.get(INCLUDE_KEY))
        {
            subjects.extend(targets.items().into_iter().map(|s| (s.to_string(), true)));
        }
        subjects
    }
}

impl Planner for IncludePlanner {
    fn name(&self) -> &'static str {
        "include"
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
        Self::subjects(file)
            .into_iter()
            .filter_map(|(subject, from_attributes)| {
                match find_dependency(ctx.overlay, &subject, &file.path) {
                    Some(dependency) if dependency != file.path => Some(Operation::new(
                        &file.path,
                        Some(dependency),
                        Action::Include {
                            subject,
                            from_attributes,
                        },
                    )),
                    _ => {
                        debug!("Unresolved include `{}` in {}", subject, file.path);
                        None
                    }
                }
            })
            .collect()
    }
}

pub fn apply(
    op: &Operation,
    subject: &str,
    from_attributes: bool,
    overlay: &mut Overlay<'_>,
) -> Result<ChangeList> {
    let source = op.prerequisite.as_deref().ok_or_else(|| Error::MissingReference {
        path: op.target.clone(),
        reference: subject.to_string(),
    })?;
    super::require_attributes(overlay.get(&op.target)?)?;

    let options = MergeOptions::gap_fill().ignore([FieldMatcher::prefix(["name"])]);
    let mut changes = merge_from(overlay, &op.target, source, &options)?;

    if from_attributes {
        let file = overlay.get_mut(&op.target)?;
        if let Some(Some(attributes)) = file.data.attributes_mut() {
            let exhausted = match attributes.get_mut(INCLUDE_KEY) {
                Some(AttrEntry::Include(targets)) if targets.contains(subject) => {
                    Some(targets.remove(subject))
                }
                _ => None,
            };
            if exhausted == Some(true) {
                attributes.remove(INCLUDE_KEY);
            }
            if exhausted.is_some() {
                changes.push(FieldPath::new(["attributes", INCLUDE_KEY]));
            }
        }
    }

    Ok(changes)
}
