//! Profiles
//!
//! A profile is an optional bundle of attributes. Objects and events list the
//! profiles they support in `profiles`; the compilation options select which
//! profiles are active.
//!
//! - A selected profile stamps its own attributes with its owner name
//!   ([`MarkProfilePlanner`]), and every object or event referencing it
//!   records that owner on the attributes the profile declares.
//! - An unselected profile's attributes are removed from every object or
//!   event referencing it.
//!
//! A reference that resolves to no profile is scheduled as an exclusion
//! without a prerequisite, which removes nothing.

use std::collections::BTreeMap;

use log::debug;

use super::find_dependency::find_profile;
use super::{attribute_defns, patch_attributes, PlanContext, Planner};
use crate::definitions::{AttrDefn, DefinitionFile, DefinitionKind, OneOrMany};
use crate::error::Result;
use crate::merge::{ChangeList, FieldMatcher, FieldPath, MergeOptions};
use crate::operations::{Action, Operation};
use crate::overlay::Overlay;
use crate::path;

/// Owner name of the profile at `path`: its declared name or file stem
fn owner_name(overlay: &Overlay<'_>, profile_path: &str) -> String {
    overlay
        .peek(profile_path)
        .and_then(|file| file.data.name().map(str::to_string))
        .unwrap_or_else(|| path::short_name(profile_path).to_string())
}

/// Stamps a selected profile's attributes with the profile name
pub struct MarkProfilePlanner;

impl Planner for MarkProfilePlanner {
    fn name(&self) -> &'static str {
        "mark-profile"
    }

    fn accepts(&self) -> &'static [DefinitionKind] {
        &[DefinitionKind::Profile]
    }

    fn analyze(&self, file: &DefinitionFile, ctx: &PlanContext<'_>) -> Vec<Operation> {
        if !ctx.selection.profile_selected(path::short_name(&file.path)) {
            return Vec::new();
        }
        if attribute_defns(&file.data).next().is_none() {
            return Vec::new();
        }
        vec![Operation::new(
            &file.path,
            None,
            Action::MarkProfile {
                profile: file.display_name().to_string(),
            },
        )]
    }
}

pub fn apply_mark(op: &Operation, profile: &str, overlay: &mut Overlay<'_>) -> Result<ChangeList> {
    let file = overlay.get(&op.target)?;
    let patches = attribute_defns(&file.data)
        .map(|(name, _)| {
            (
                name.clone(),
                AttrDefn {
                    profile: Some(OneOrMany::One(profile.to_string())),
                    ..Default::default()
                },
            )
        })
        .collect();
    patch_attributes(overlay, &op.target, patches, &MergeOptions::gap_fill())
}

/// Applies or excludes the profiles an object or event references
pub struct ProfilePlanner;

impl Planner for ProfilePlanner {
    fn name(&self) -> &'static str {
        "profiles"
    }

    fn accepts(&self) -> &'static [DefinitionKind] {
        &[DefinitionKind::Object, DefinitionKind::Event]
    }

    fn analyze(&self, file: &DefinitionFile, ctx: &PlanContext<'_>) -> Vec<Operation> {
        let Some(references) = file.data.profiles() else {
            return Vec::new();
        };

        references
            .iter()
            .map(|reference| {
                let resolved = find_profile(ctx.overlay, reference, &file.path);
                let stem = path::short_name(resolved.as_deref().unwrap_or(reference));
                let selected = ctx.selection.profile_selected(stem);

                match resolved {
                    Some(profile_path) if selected => Operation::new(
                        &file.path,
                        Some(profile_path.clone()),
                        Action::ProfileOwner {
                            profile: owner_name(ctx.overlay, &profile_path),
                        },
                    ),
                    resolved => {
                        if resolved.is_none() {
                            debug!("Profile `{}` of {} not found", reference, file.path);
                        }
                        Operation::new(
                            &file.path,
                            resolved,
                            Action::ExcludeProfile {
                                profile: reference.clone(),
                            },
                        )
                    }
                }
            })
            .collect()
    }
}

/// Attribute names declared by the prerequisite profile
fn profile_attributes(op: &Operation, overlay: &Overlay<'_>) -> Result<Vec<String>> {
    let Some(profile_path) = &op.prerequisite else {
        return Ok(Vec::new());
    };
    let profile = overlay.get(profile_path)?;
    super::require_kind(profile, DefinitionKind::Profile)?;
    Ok(attribute_defns(&profile.data)
        .map(|(name, _)| name.clone())
        .collect())
}

pub fn apply_owner(op: &Operation, profile: &str, overlay: &mut Overlay<'_>) -> Result<ChangeList> {
    let names = profile_attributes(op, overlay)?;
    let target = overlay.get(&op.target)?;

    let patches: BTreeMap<String, AttrDefn> = attribute_defns(&target.data)
        .filter(|(name, _)| names.contains(*name))
        .filter_map(|(name, attr)| {
            let owners = match &attr.profile {
                None => OneOrMany::One(profile.to_string()),
                Some(existing) if existing.contains(profile) => return None,
                Some(existing) => {
                    let mut owners = existing.clone();
                    owners.push(profile);
                    owners
                }
            };
            Some((
                name.clone(),
                AttrDefn {
                    profile: Some(owners),
                    ..Default::default()
                },
            ))
        })
        .collect();

    let options = MergeOptions::overwrite()
        .allow([FieldMatcher::name("profile")])
        .existing_keys_only();
    patch_attributes(overlay, &op.target, patches, &options)
}

pub fn apply_exclude(op: &Operation, _profile: &str, overlay: &mut Overlay<'_>) -> Result<ChangeList> {
    let names = profile_attributes(op, overlay)?;
    let target = overlay.get_mut(&op.target)?;
    super::require_attributes(target)?;

    let mut changes = Vec::new();
    if let Some(Some(attributes)) = target.data.attributes_mut() {
        for name in names {
            if attributes.remove(&name).is_some() {
                changes.push(FieldPath::new(["attributes".to_string(), name]));
            }
        }
    }
    Ok(changes)
}
