//! # Schema Rendering
//!
//! Projects a compiled overlay into a [`Schema`].
//!
//! ## Process
//!
//! 1.  **Types**: the dictionary's declared types become the types table.
//!
//! 2.  **Objects**: every core object whose name does not start with `_` is
//!     keyed by its declared name (or file stem).
//!
//! 3.  **Classes**: every core event with a `uid` is keyed by
//!     `<src_extension>/<name>`, or `<name>` for core events. The abstract
//!     base event (`base_event` or `base`) is kept apart as `base_event`.
//!
//! 4.  **Display Names**: each attribute's type is resolved against the
//!     types and objects tables. A type found in neither aborts rendering
//!     with `UnknownType`.
//!
//! Extension files are never rendered directly; their content reaches the
//! schema through merges and copies into core paths.

use std::collections::BTreeMap;

use log::warn;

use crate::definitions::{
    AttrDefn, Attributes, Definition, DefinitionFile, EventDefn, ObjectDefn, TypeDefn,
};
use crate::error::{Error, Result};
use crate::overlay::Overlay;
use crate::path::{self, VERSION_FILE};
use crate::planners::object_type::OBJECT_T;
use crate::schema::{Schema, SchemaAttribute, SchemaEvent, SchemaObject, SchemaType};

const BASE_EVENT_NAMES: [&str; 2] = ["base_event", "base"];
const INTERNAL_MARKER: char = '_';

/// Render the compiled overlay
pub fn render(overlay: &Overlay<'_>) -> Result<Schema> {
    let mut schema = Schema {
        version: version(overlay),
        types: types(overlay),
        ..Default::default()
    };

    let core_files = || overlay.files().filter(|f| path::extension(&f.path).is_none());

    for file in core_files() {
        if let Definition::Object(object) = &file.data {
            let name = file.display_name();
            if name.starts_with(INTERNAL_MARKER) {
                continue;
            }
            schema.objects.insert(name.to_string(), render_object(file, object));
        }
    }

    for file in core_files() {
        let Definition::Event(event) = &file.data else {
            continue;
        };
        let name = file.display_name();
        if BASE_EVENT_NAMES.contains(&name) {
            schema.base_event = Some(render_event(file, event));
        } else if event.uid.is_some() {
            let rendered = render_event(file, event);
            schema.classes.insert(rendered.key(), rendered);
        }
    }

    resolve_types(&mut schema)?;
    Ok(schema)
}

fn version(overlay: &Overlay<'_>) -> String {
    let version = match overlay.peek(VERSION_FILE).map(|f| &f.data) {
        Some(Definition::Version(v)) => v.version.clone(),
        _ => None,
    };
    let Some(version) = version else {
        warn!("No schema version in {}", VERSION_FILE);
        return String::new();
    };
    if let Err(e) = semver::Version::parse(&version) {
        warn!("Schema version `{}` is not a semantic version: {}", version, e);
    }
    version
}

fn types(overlay: &Overlay<'_>) -> BTreeMap<String, SchemaType> {
    overlay
        .dictionary()
        .and_then(|d| d.types.as_ref())
        .and_then(|t| t.attributes.as_ref())
        .map(|types| {
            types
                .iter()
                .map(|(name, defn)| (name.clone(), render_type(defn)))
                .collect()
        })
        .unwrap_or_default()
}

fn render_type(defn: &TypeDefn) -> SchemaType {
    SchemaType {
        caption: defn.caption.clone(),
        description: defn.description.clone(),
        is_array: defn.is_array,
        deprecated: defn.deprecated.clone(),
        max_len: defn.max_len,
        observable: defn.observable,
        range: defn.range.clone(),
        regex: defn.regex.clone(),
        type_: defn.type_.clone(),
        type_name: defn.type_name.clone(),
        values: defn.values.clone(),
    }
}

fn render_attributes(attributes: Option<&Attributes>) -> BTreeMap<String, SchemaAttribute> {
    attributes
        .into_iter()
        .flatten()
        .filter_map(|(name, entry)| entry.attribute().map(|attr| (name.clone(), render_attribute(attr))))
        .collect()
}

fn render_attribute(attr: &AttrDefn) -> SchemaAttribute {
    SchemaAttribute {
        caption: attr.caption.clone(),
        description: attr.description.clone(),
        requirement: attr.requirement.clone(),
        type_: attr.type_.clone(),
        type_name: None,
        object_type: attr.object_type.clone(),
        object_name: None,
        is_array: attr.is_array,
        deprecated: attr.deprecated.clone(),
        enum_values: attr.enum_values.clone(),
        group: attr.group.clone(),
        observable: attr.observable,
        profile: attr.profile.clone(),
        sibling: attr.sibling.clone(),
        extension: attr.extension.clone(),
    }
}

fn render_object(file: &DefinitionFile, object: &ObjectDefn) -> SchemaObject {
    SchemaObject {
        source: file.path.clone(),
        name: file.display_name().to_string(),
        caption: object.caption.clone(),
        description: object.description.clone(),
        extends: object.extends.clone(),
        observable: object.observable,
        profiles: object.profiles.clone(),
        constraints: object.constraints.clone(),
        deprecated: object.deprecated.clone(),
        src_extension: object.src_extension.clone(),
        attributes: render_attributes(object.attributes.as_ref()),
    }
}

fn render_event(file: &DefinitionFile, event: &EventDefn) -> SchemaEvent {
    SchemaEvent {
        source: file.path.clone(),
        name: file.display_name().to_string(),
        caption: event.caption.clone(),
        description: event.description.clone(),
        uid: event.uid,
        category: event.category.clone(),
        extends: event.extends.clone(),
        profiles: event.profiles.clone(),
        associations: event.associations.clone(),
        constraints: event.constraints.clone(),
        deprecated: event.deprecated.clone(),
        src_extension: event.src_extension.clone(),
        attributes: render_attributes(event.attributes.as_ref()),
    }
}

/// Display names of the types and objects an attribute may refer to
struct Names {
    types: BTreeMap<String, String>,
    objects: BTreeMap<String, String>,
}

impl Names {
    fn new(schema: &Schema) -> Self {
        Self {
            types: schema
                .types
                .iter()
                .map(|(name, t)| (name.clone(), t.caption.clone().unwrap_or_else(|| name.clone())))
                .collect(),
            objects: schema
                .objects
                .iter()
                .map(|(name, o)| (name.clone(), o.caption.clone().unwrap_or_else(|| name.clone())))
                .collect(),
        }
    }

    fn resolve(&self, owner: &str, name: &str, attr: &mut SchemaAttribute) -> Result<()> {
        let Some(type_name) = attr.type_.clone() else {
            return Ok(());
        };
        let unknown = |type_name: String| Error::UnknownType {
            path: owner.to_string(),
            attribute: name.to_string(),
            type_name,
        };

        if type_name == OBJECT_T {
            let object = attr.object_type.clone().unwrap_or_default();
            let display = self.objects.get(&object).ok_or_else(|| unknown(object.clone()))?;
            attr.object_name = Some(display.clone());
        } else if let Some(display) = self.types.get(&type_name) {
            attr.type_name = Some(display.clone());
        } else if let Some(display) = self.objects.get(&type_name) {
            attr.object_type = Some(type_name);
            attr.object_name = Some(display.clone());
        } else {
            return Err(unknown(type_name));
        }
        Ok(())
    }

    fn resolve_all(&self, owner: &str, attributes: &mut BTreeMap<String, SchemaAttribute>) -> Result<()> {
        for (name, attr) in attributes.iter_mut() {
            self.resolve(owner, name, attr)?;
        }
        Ok(())
    }
}

fn resolve_types(schema: &mut Schema) -> Result<()> {
    let names = Names::new(schema);
    for object in schema.objects.values_mut() {
        names.resolve_all(&object.source, &mut object.attributes)?;
    }
    for event in schema.classes.values_mut().chain(schema.base_event.as_mut()) {
        names.resolve_all(&event.source, &mut event.attributes)?;
    }
    Ok(())
}
