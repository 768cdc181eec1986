//! Event identifiers
//!
//! Every event with a `uid` and a `category` gets three derived enums:
//!
//! - `category_uid`: the category's identifier from the category table.
//! - `class_uid`: `extension * 100000 + category * 1000 + uid`.
//! - `type_uid`: `class_uid * 100 + activity` for each member of the
//!   event's `activity_id` enum, captioned `"<event>: <activity>"`.
//!
//! Enum members inherited from a base event are discarded first. An event
//! whose category the table does not know, or whose identifiers do not fit
//! in an `i64`, is left alone. An activity code whose `type_uid` overflows
//! is skipped.

use std::collections::BTreeMap;

use log::{debug, warn};

use super::{PlanContext, Planner};
use crate::definitions::{
    AttrDefn, AttrEntry, Definition, DefinitionFile, DefinitionKind, EnumMemberDefn, EventDefn,
};
use crate::error::{Error, Result};
use crate::merge::{merge, ChangeList, FieldMatcher, MergeOptions};
use crate::operations::{Action, Operation};
use crate::overlay::Overlay;
use crate::path::{self, CATEGORIES_FILE};

const DERIVED: [&str; 3] = ["category_uid", "class_uid", "type_uid"];

pub struct UidPlanner;

impl Planner for UidPlanner {
    fn name(&self) -> &'static str {
        "uid"
    }

    fn accepts(&self) -> &'static [DefinitionKind] {
        &[DefinitionKind::Event]
    }

    fn analyze(&self, file: &DefinitionFile, ctx: &PlanContext<'_>) -> Vec<Operation> {
        let prerequisite = ctx
            .overlay
            .contains(CATEGORIES_FILE)
            .then(|| CATEGORIES_FILE.to_string());
        vec![Operation::new(&file.path, prerequisite, Action::Uid)]
    }
}

/// Numeric identifier of the extension hosting an event
fn extension_uid(overlay: &Overlay<'_>, target: &str, event: &EventDefn) -> i64 {
    let by_dir = path::extension(target).and_then(|dir| overlay.extension_manifest(dir));
    let by_name = || {
        event.src_extension.as_deref().and_then(|name| {
            overlay
                .extension_by_name(name)
                .or_else(|| overlay.extension_manifest(name))
        })
    };
    by_dir
        .or_else(by_name)
        .and_then(|manifest| manifest.uid)
        .unwrap_or(0)
}

fn class_uid(extension_uid: i64, category_uid: i64, uid: i64) -> Option<i64> {
    extension_uid
        .checked_mul(100_000)?
        .checked_add(category_uid.checked_mul(1000)?)?
        .checked_add(uid)
}

fn enum_attr(members: BTreeMap<String, EnumMemberDefn>) -> AttrEntry {
    AttrEntry::Attribute(AttrDefn {
        enum_values: Some(members),
        ..Default::default()
    })
}

/// Build the derived enums, or `None` when the event cannot be numbered
fn derived_enums(overlay: &Overlay<'_>, target: &str, event: &EventDefn) -> Option<EventDefn> {
    let uid = event.uid?;
    let category_name = event.category.as_deref()?;
    let category = overlay
        .categories()
        .and_then(|table| table.attributes.as_ref())
        .and_then(|table| table.get(category_name));
    let Some(category) = category else {
        debug!("Unknown category `{}` for {}", category_name, target);
        return None;
    };

    let category_uid = category.uid.unwrap_or(0);
    let Some(class_uid) = class_uid(extension_uid(overlay, target, event), category_uid, uid)
    else {
        warn!("Class identifier of {} overflows, uid {} is too large", target, uid);
        return None;
    };

    let mut attributes = BTreeMap::new();
    attributes.insert(
        "category_uid".to_string(),
        enum_attr(BTreeMap::from([(
            category_uid.to_string(),
            EnumMemberDefn {
                caption: category.caption.clone(),
                description: category.description.clone(),
                ..Default::default()
            },
        )])),
    );
    attributes.insert(
        "class_uid".to_string(),
        enum_attr(BTreeMap::from([(
            class_uid.to_string(),
            EnumMemberDefn {
                caption: event.caption.clone(),
                description: event.description.clone(),
                ..Default::default()
            },
        )])),
    );

    let activities = event
        .attributes
        .as_ref()
        .and_then(|attrs| attrs.get("activity_id"))
        .and_then(AttrEntry::attribute)
        .and_then(|attr| attr.enum_values.as_ref());
    if let Some(activities) = activities {
        let mut types = BTreeMap::new();
        for (code, member) in activities {
            let Ok(activity) = code.parse::<i64>() else {
                warn!("Non-numeric activity code `{}` in {}", code, target);
                continue;
            };
            let Some(type_uid) = class_uid.checked_mul(100).and_then(|c| c.checked_add(activity))
            else {
                warn!("Type identifier for activity `{}` in {} overflows", code, target);
                continue;
            };
            let caption = format!(
                "{}: {}",
                event.caption.as_deref().unwrap_or_default(),
                member.caption.as_deref().unwrap_or_default()
            );
            types.insert(
                type_uid.to_string(),
                EnumMemberDefn {
                    caption: Some(caption),
                    description: member.description.clone(),
                    ..Default::default()
                },
            );
        }
        attributes.insert("type_uid".to_string(), enum_attr(types));
    }

    Some(EventDefn {
        attributes: Some(attributes),
        ..Default::default()
    })
}

pub fn apply(op: &Operation, overlay: &mut Overlay<'_>) -> Result<ChangeList> {
    let file = overlay.get(&op.target)?;
    let Definition::Event(event) = &file.data else {
        return Err(Error::shape(&op.target, DefinitionKind::Event, file.data.kind()));
    };
    let Some(enums) = derived_enums(overlay, &op.target, event) else {
        return Ok(Vec::new());
    };

    let file = overlay.get_mut(&op.target)?;
    let Definition::Event(event) = &mut file.data else {
        return Err(Error::shape(&op.target, DefinitionKind::Event, file.data.kind()));
    };

    if let Some(attributes) = event.attributes.as_mut() {
        for name in DERIVED {
            if let Some(attr) = attributes.get_mut(name).and_then(AttrEntry::attribute_mut) {
                attr.enum_values = Some(BTreeMap::new());
            }
        }
    }

    let options = MergeOptions::overwrite().allow(
        DERIVED
            .into_iter()
            .map(|name| FieldMatcher::prefix(["attributes", name])),
    );
    Ok(merge(event, &enums, &options))
}
