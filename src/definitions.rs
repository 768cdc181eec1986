//! # Definition Shapes
//!
//! Typed records for every kind of definition a schema repository holds.
//! All fields are optional: a fragment in an extension or an include file
//! usually defines only a handful of them, and enrichment fills the rest.
//!
//! Each shape also declares how it merges (see [`crate::merge`]): which
//! fields are leaves, which are nested parts, and which are name-keyed maps
//! of nested parts.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::merge::{mergeable, Merge, MergeContext};
use crate::path::{self, RepoPath};

/// Shape of a definition, implied by its path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DefinitionKind {
    Object,
    Event,
    Profile,
    Extension,
    Dictionary,
    Include,
    Categories,
    Version,
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DefinitionKind::Object => "object",
            DefinitionKind::Event => "event",
            DefinitionKind::Profile => "profile",
            DefinitionKind::Extension => "extension",
            DefinitionKind::Dictionary => "dictionary",
            DefinitionKind::Include => "include",
            DefinitionKind::Categories => "categories",
            DefinitionKind::Version => "version",
        };
        write!(f, "{}", name)
    }
}

/// One path or several paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn items(&self) -> Vec<&str> {
        match self {
            OneOrMany::One(item) => vec![item.as_str()],
            OneOrMany::Many(items) => items.iter().map(String::as_str).collect(),
        }
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items().contains(&item)
    }

    /// Add `item` unless already present, promoting a single value to a list.
    pub fn push(&mut self, item: &str) {
        if self.contains(item) {
            return;
        }
        match self {
            OneOrMany::One(existing) => {
                *self = OneOrMany::Many(vec![existing.clone(), item.to_string()]);
            }
            OneOrMany::Many(items) => items.push(item.to_string()),
        }
    }

    /// Remove `item`; returns `true` when nothing is left.
    pub fn remove(&mut self, item: &str) -> bool {
        match self {
            OneOrMany::One(existing) => existing == item,
            OneOrMany::Many(items) => {
                items.retain(|i| i != item);
                items.is_empty()
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeprecationInfo {
    pub message: Option<String>,
    pub since: Option<String>,
}

mergeable!(DeprecationInfo {
    leaf message,
    leaf since,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumMemberDefn {
    pub caption: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

mergeable!(EnumMemberDefn {
    leaf caption,
    leaf description,
    leaf notes,
});

/// An attribute of an object, event, profile or include fragment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttrDefn {
    pub caption: Option<String>,
    pub requirement: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub description: Option<String>,
    pub is_array: Option<bool>,
    pub deprecated: Option<DeprecationInfo>,
    #[serde(rename = "enum")]
    pub enum_values: Option<BTreeMap<String, EnumMemberDefn>>,
    pub group: Option<String>,
    pub observable: Option<i64>,
    pub profile: Option<OneOrMany>,
    pub sibling: Option<String>,
    pub extension: Option<String>,
    pub object_type: Option<String>,
}

mergeable!(AttrDefn {
    leaf caption,
    leaf requirement,
    leaf type_ = "type",
    leaf description,
    leaf is_array,
    part deprecated,
    map enum_values = "enum",
    leaf group,
    leaf observable,
    leaf profile,
    leaf sibling,
    leaf extension,
    leaf object_type,
});

/// Entry of an attribute map: an attribute, or an include directive
/// stored under the `$include` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrEntry {
    Include(OneOrMany),
    Attribute(AttrDefn),
}

impl AttrEntry {
    pub fn attribute(&self) -> Option<&AttrDefn> {
        match self {
            AttrEntry::Attribute(attr) => Some(attr),
            AttrEntry::Include(_) => None,
        }
    }

    pub fn attribute_mut(&mut self) -> Option<&mut AttrDefn> {
        match self {
            AttrEntry::Attribute(attr) => Some(attr),
            AttrEntry::Include(_) => None,
        }
    }
}

impl Merge for AttrEntry {
    fn merge_fields(&mut self, other: &Self, ctx: &mut MergeContext<'_>) {
        if let (AttrEntry::Attribute(left), AttrEntry::Attribute(right)) = (&mut *self, other) {
            left.merge_fields(right, ctx);
            return;
        }
        ctx.replace(self, other);
    }
}

/// Attribute map shared by objects, events, profiles and include fragments
pub type Attributes = BTreeMap<String, AttrEntry>;

/// Key under which attribute maps carry include directives
pub const INCLUDE_KEY: &str = "$include";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectDefn {
    pub caption: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub attributes: Option<Attributes>,
    pub extends: Option<String>,
    pub observable: Option<i64>,
    pub profiles: Option<Vec<String>>,
    pub constraints: Option<BTreeMap<String, Vec<String>>>,
    pub deprecated: Option<DeprecationInfo>,
    #[serde(rename = "$include", alias = "include")]
    pub include: Option<OneOrMany>,
    pub src_extension: Option<String>,
}

mergeable!(ObjectDefn {
    leaf caption,
    leaf name,
    leaf description,
    map attributes,
    leaf extends,
    leaf observable,
    leaf profiles,
    leaf constraints,
    part deprecated,
    leaf include = "$include",
    leaf src_extension,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventDefn {
    pub caption: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub attributes: Option<Attributes>,
    pub uid: Option<i64>,
    pub category: Option<String>,
    pub extends: Option<String>,
    pub profiles: Option<Vec<String>>,
    pub associations: Option<BTreeMap<String, Vec<String>>>,
    pub constraints: Option<BTreeMap<String, Vec<String>>>,
    pub deprecated: Option<DeprecationInfo>,
    #[serde(rename = "$include", alias = "include")]
    pub include: Option<OneOrMany>,
    pub src_extension: Option<String>,
}

mergeable!(EventDefn {
    leaf caption,
    leaf name,
    leaf description,
    map attributes,
    leaf uid,
    leaf category,
    leaf extends,
    leaf profiles,
    leaf associations,
    leaf constraints,
    part deprecated,
    leaf include = "$include",
    leaf src_extension,
});

/// A reusable bundle of attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncludeDefn {
    pub caption: Option<String>,
    pub description: Option<String>,
    pub attributes: Option<Attributes>,
    pub annotations: Option<BTreeMap<String, String>>,
}

mergeable!(IncludeDefn {
    leaf caption,
    leaf description,
    map attributes,
    leaf annotations,
});

/// An optional bundle of attributes selected at compile time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileDefn {
    pub caption: Option<String>,
    pub name: Option<String>,
    pub meta: Option<String>,
    pub description: Option<String>,
    pub attributes: Option<Attributes>,
    pub deprecated: Option<DeprecationInfo>,
    pub annotations: Option<BTreeMap<String, String>>,
}

mergeable!(ProfileDefn {
    leaf caption,
    leaf name,
    leaf meta,
    leaf description,
    map attributes,
    part deprecated,
    leaf annotations,
});

/// Manifest of an extension (`extensions/<dir>/extension.json`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtensionDefn {
    pub name: Option<String>,
    pub uid: Option<i64>,
    pub caption: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub deprecated: Option<DeprecationInfo>,
}

mergeable!(ExtensionDefn {
    leaf name,
    leaf uid,
    leaf caption,
    leaf version,
    leaf description,
    part deprecated,
});

/// A primitive type declared by the dictionary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeDefn {
    pub caption: Option<String>,
    pub description: Option<String>,
    pub is_array: Option<bool>,
    pub deprecated: Option<DeprecationInfo>,
    pub max_len: Option<i64>,
    pub observable: Option<i64>,
    pub range: Option<Vec<i64>>,
    pub regex: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub type_name: Option<String>,
    pub values: Option<Vec<serde_json::Value>>,
}

mergeable!(TypeDefn {
    leaf caption,
    leaf description,
    leaf is_array,
    part deprecated,
    leaf max_len,
    leaf observable,
    leaf range,
    leaf regex,
    leaf type_ = "type",
    leaf type_name,
    leaf values,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DictionaryTypes {
    pub caption: Option<String>,
    pub description: Option<String>,
    pub attributes: Option<BTreeMap<String, TypeDefn>>,
}

mergeable!(DictionaryTypes {
    leaf caption,
    leaf description,
    map attributes,
});

/// The global attribute and type dictionary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DictionaryDefn {
    pub name: Option<String>,
    pub caption: Option<String>,
    pub description: Option<String>,
    pub attributes: Option<BTreeMap<String, AttrDefn>>,
    pub types: Option<DictionaryTypes>,
}

mergeable!(DictionaryDefn {
    leaf name,
    leaf caption,
    leaf description,
    map attributes,
    part types,
});

impl DictionaryDefn {
    /// Whether the dictionary declares the primitive type `name`
    pub fn has_type(&self, name: &str) -> bool {
        self.types
            .as_ref()
            .and_then(|t| t.attributes.as_ref())
            .is_some_and(|types| types.contains_key(name))
    }
}

/// One entry of the category table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryDefn {
    pub caption: Option<String>,
    pub description: Option<String>,
    pub uid: Option<i64>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
}

mergeable!(CategoryDefn {
    leaf caption,
    leaf description,
    leaf uid,
    leaf type_ = "type",
});

/// The category table (`categories.json`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoriesDefn {
    pub caption: Option<String>,
    pub description: Option<String>,
    pub name: Option<String>,
    pub attributes: Option<BTreeMap<String, CategoryDefn>>,
}

mergeable!(CategoriesDefn {
    leaf caption,
    leaf description,
    leaf name,
    map attributes,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionDefn {
    pub version: Option<String>,
}

mergeable!(VersionDefn { leaf version });

/// A parsed definition of any shape
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Object(ObjectDefn),
    Event(EventDefn),
    Profile(ProfileDefn),
    Extension(ExtensionDefn),
    Dictionary(DictionaryDefn),
    Include(IncludeDefn),
    Categories(CategoriesDefn),
    Version(VersionDefn),
}

/// Fields shared across shapes, used to reshape one shape into another
#[derive(Debug, Clone, Default)]
struct SharedFields {
    caption: Option<String>,
    description: Option<String>,
    name: Option<String>,
    attributes: Option<Attributes>,
    deprecated: Option<DeprecationInfo>,
}

impl Definition {
    pub fn kind(&self) -> DefinitionKind {
        match self {
            Definition::Object(_) => DefinitionKind::Object,
            Definition::Event(_) => DefinitionKind::Event,
            Definition::Profile(_) => DefinitionKind::Profile,
            Definition::Extension(_) => DefinitionKind::Extension,
            Definition::Dictionary(_) => DefinitionKind::Dictionary,
            Definition::Include(_) => DefinitionKind::Include,
            Definition::Categories(_) => DefinitionKind::Categories,
            Definition::Version(_) => DefinitionKind::Version,
        }
    }

    /// An empty definition of the given shape
    pub fn empty(kind: DefinitionKind) -> Self {
        match kind {
            DefinitionKind::Object => Definition::Object(ObjectDefn::default()),
            DefinitionKind::Event => Definition::Event(EventDefn::default()),
            DefinitionKind::Profile => Definition::Profile(ProfileDefn::default()),
            DefinitionKind::Extension => Definition::Extension(ExtensionDefn::default()),
            DefinitionKind::Dictionary => Definition::Dictionary(DictionaryDefn::default()),
            DefinitionKind::Include => Definition::Include(IncludeDefn::default()),
            DefinitionKind::Categories => Definition::Categories(CategoriesDefn::default()),
            DefinitionKind::Version => Definition::Version(VersionDefn::default()),
        }
    }

    /// Parse JSON text as the given shape
    pub fn from_json(kind: DefinitionKind, text: &str) -> serde_json::Result<Self> {
        Ok(match kind {
            DefinitionKind::Object => Definition::Object(serde_json::from_str(text)?),
            DefinitionKind::Event => Definition::Event(serde_json::from_str(text)?),
            DefinitionKind::Profile => Definition::Profile(serde_json::from_str(text)?),
            DefinitionKind::Extension => Definition::Extension(serde_json::from_str(text)?),
            DefinitionKind::Dictionary => Definition::Dictionary(serde_json::from_str(text)?),
            DefinitionKind::Include => Definition::Include(serde_json::from_str(text)?),
            DefinitionKind::Categories => Definition::Categories(serde_json::from_str(text)?),
            DefinitionKind::Version => Definition::Version(serde_json::from_str(text)?),
        })
    }

    /// Declared `name`, for shapes that have one
    pub fn name(&self) -> Option<&str> {
        match self {
            Definition::Object(d) => d.name.as_deref(),
            Definition::Event(d) => d.name.as_deref(),
            Definition::Profile(d) => d.name.as_deref(),
            Definition::Extension(d) => d.name.as_deref(),
            Definition::Dictionary(d) => d.name.as_deref(),
            Definition::Categories(d) => d.name.as_deref(),
            Definition::Include(_) | Definition::Version(_) => None,
        }
    }

    /// Attribute map of shapes that carry attributes
    pub fn attributes(&self) -> Option<&Attributes> {
        match self {
            Definition::Object(d) => d.attributes.as_ref(),
            Definition::Event(d) => d.attributes.as_ref(),
            Definition::Profile(d) => d.attributes.as_ref(),
            Definition::Include(d) => d.attributes.as_ref(),
            _ => None,
        }
    }

    /// Mutable attribute slot of shapes that carry attributes
    pub fn attributes_mut(&mut self) -> Option<&mut Option<Attributes>> {
        match self {
            Definition::Object(d) => Some(&mut d.attributes),
            Definition::Event(d) => Some(&mut d.attributes),
            Definition::Profile(d) => Some(&mut d.attributes),
            Definition::Include(d) => Some(&mut d.attributes),
            _ => None,
        }
    }

    /// `profiles` references of objects and events
    pub fn profiles(&self) -> Option<&[String]> {
        match self {
            Definition::Object(d) => d.profiles.as_deref(),
            Definition::Event(d) => d.profiles.as_deref(),
            _ => None,
        }
    }

    pub fn extends(&self) -> Option<&str> {
        match self {
            Definition::Object(d) => d.extends.as_deref(),
            Definition::Event(d) => d.extends.as_deref(),
            _ => None,
        }
    }

    /// Top-level include directive of objects and events
    pub fn include(&self) -> Option<&OneOrMany> {
        match self {
            Definition::Object(d) => d.include.as_ref(),
            Definition::Event(d) => d.include.as_ref(),
            _ => None,
        }
    }

    pub fn annotations(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Definition::Profile(d) => d.annotations.as_ref(),
            Definition::Include(d) => d.annotations.as_ref(),
            _ => None,
        }
    }

    /// Record the extension a copied definition came from
    pub fn set_src_extension(&mut self, name: &str) {
        match self {
            Definition::Object(d) => d.src_extension = Some(name.to_string()),
            Definition::Event(d) => d.src_extension = Some(name.to_string()),
            _ => {}
        }
    }

    pub fn src_extension(&self) -> Option<&str> {
        match self {
            Definition::Object(d) => d.src_extension.as_deref(),
            Definition::Event(d) => d.src_extension.as_deref(),
            _ => None,
        }
    }

    fn shared(&self) -> SharedFields {
        match self {
            Definition::Object(d) => SharedFields {
                caption: d.caption.clone(),
                description: d.description.clone(),
                name: d.name.clone(),
                attributes: d.attributes.clone(),
                deprecated: d.deprecated.clone(),
            },
            Definition::Event(d) => SharedFields {
                caption: d.caption.clone(),
                description: d.description.clone(),
                name: d.name.clone(),
                attributes: d.attributes.clone(),
                deprecated: d.deprecated.clone(),
            },
            Definition::Profile(d) => SharedFields {
                caption: d.caption.clone(),
                description: d.description.clone(),
                name: d.name.clone(),
                attributes: d.attributes.clone(),
                deprecated: d.deprecated.clone(),
            },
            Definition::Include(d) => SharedFields {
                caption: d.caption.clone(),
                description: d.description.clone(),
                attributes: d.attributes.clone(),
                ..Default::default()
            },
            Definition::Dictionary(d) => SharedFields {
                caption: d.caption.clone(),
                description: d.description.clone(),
                name: d.name.clone(),
                attributes: d.attributes.as_ref().map(|attrs| {
                    attrs
                        .iter()
                        .map(|(k, v)| (k.clone(), AttrEntry::Attribute(v.clone())))
                        .collect()
                }),
                ..Default::default()
            },
            Definition::Extension(d) => SharedFields {
                caption: d.caption.clone(),
                description: d.description.clone(),
                name: d.name.clone(),
                deprecated: d.deprecated.clone(),
                ..Default::default()
            },
            Definition::Categories(d) => SharedFields {
                caption: d.caption.clone(),
                description: d.description.clone(),
                name: d.name.clone(),
                ..Default::default()
            },
            Definition::Version(_) => SharedFields::default(),
        }
    }

    /// A definition of shape `kind` holding only `attributes`
    pub fn from_attributes(kind: DefinitionKind, attributes: Attributes) -> Definition {
        Definition::Include(IncludeDefn {
            attributes: Some(attributes),
            ..Default::default()
        })
        .reshape(kind)
    }

    /// Project the shared fields of this definition into an otherwise empty
    /// definition of shape `kind`.
    ///
    /// Shared fields are caption, description, name, attributes and
    /// deprecation. Fields the target shape lacks are dropped.
    pub fn reshape(&self, kind: DefinitionKind) -> Definition {
        if self.kind() == kind {
            return self.clone();
        }
        let shared = self.shared();
        match kind {
            DefinitionKind::Object => Definition::Object(ObjectDefn {
                caption: shared.caption,
                description: shared.description,
                name: shared.name,
                attributes: shared.attributes,
                deprecated: shared.deprecated,
                ..Default::default()
            }),
            DefinitionKind::Event => Definition::Event(EventDefn {
                caption: shared.caption,
                description: shared.description,
                name: shared.name,
                attributes: shared.attributes,
                deprecated: shared.deprecated,
                ..Default::default()
            }),
            DefinitionKind::Profile => Definition::Profile(ProfileDefn {
                caption: shared.caption,
                description: shared.description,
                name: shared.name,
                attributes: shared.attributes,
                deprecated: shared.deprecated,
                ..Default::default()
            }),
            DefinitionKind::Include => Definition::Include(IncludeDefn {
                caption: shared.caption,
                description: shared.description,
                attributes: shared.attributes,
                ..Default::default()
            }),
            DefinitionKind::Dictionary => Definition::Dictionary(DictionaryDefn {
                caption: shared.caption,
                description: shared.description,
                name: shared.name,
                attributes: shared.attributes.map(|attrs| {
                    attrs
                        .into_iter()
                        .filter_map(|(k, v)| match v {
                            AttrEntry::Attribute(attr) => Some((k, attr)),
                            AttrEntry::Include(_) => None,
                        })
                        .collect()
                }),
                ..Default::default()
            }),
            DefinitionKind::Extension => Definition::Extension(ExtensionDefn {
                caption: shared.caption,
                description: shared.description,
                name: shared.name,
                deprecated: shared.deprecated,
                ..Default::default()
            }),
            DefinitionKind::Categories => Definition::Categories(CategoriesDefn {
                caption: shared.caption,
                description: shared.description,
                name: shared.name,
                ..Default::default()
            }),
            DefinitionKind::Version => Definition::Version(VersionDefn::default()),
        }
    }
}

/// A definition together with its repository path
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionFile {
    pub path: RepoPath,
    pub data: Definition,
}

impl DefinitionFile {
    /// Validate `path` against the grammar and check that `data` has the
    /// shape the path implies.
    pub fn new(path: &str, data: Definition) -> Result<Self> {
        let path = path::sanitize_path(path)?;
        let expected = path::kind_of(&path)?;
        if data.kind() != expected {
            return Err(Error::shape(&path, expected, data.kind()));
        }
        Ok(Self { path, data })
    }

    /// Parse JSON text into the shape implied by `path`
    pub fn from_json(path: &str, text: &str) -> Result<Self> {
        let path = path::sanitize_path(path)?;
        let kind = path::kind_of(&path)?;
        let data = Definition::from_json(kind, text).map_err(|source| Error::DefinitionParse {
            path: path.clone(),
            source,
        })?;
        Ok(Self { path, data })
    }

    /// Declared name, falling back to the file stem
    pub fn display_name(&self) -> &str {
        self.data
            .name()
            .unwrap_or_else(|| path::short_name(&self.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event_with_include_entry() {
        let file = DefinitionFile::from_json(
            "events/network/http_activity.json",
            r#"{
                "caption": "HTTP Activity",
                "name": "http_activity",
                "uid": 2,
                "extends": "network",
                "attributes": {
                    "$include": ["includes/thing.json"],
                    "activity_id": {
                        "enum": { "1": { "caption": "Connect" } },
                        "requirement": "required"
                    },
                    "http_request": { "type": "http_request" }
                }
            }"#,
        )
        .unwrap();

        let Definition::Event(event) = &file.data else {
            panic!("expected an event");
        };
        assert_eq!(event.uid, Some(2));
        let attrs = event.attributes.as_ref().unwrap();
        assert_eq!(
            attrs[INCLUDE_KEY],
            AttrEntry::Include(OneOrMany::Many(vec!["includes/thing.json".to_string()]))
        );
        let activity = attrs["activity_id"].attribute().unwrap();
        assert_eq!(
            activity.enum_values.as_ref().unwrap()["1"].caption.as_deref(),
            Some("Connect")
        );
        assert_eq!(
            attrs["http_request"].attribute().unwrap().type_.as_deref(),
            Some("http_request")
        );
    }

    #[test]
    fn test_parse_object_include_alias() {
        let file =
            DefinitionFile::from_json("objects/a.json", r#"{"include": "includes/b.json"}"#)
                .unwrap();
        assert_eq!(
            file.data.include(),
            Some(&OneOrMany::One("includes/b.json".to_string()))
        );
    }

    #[test]
    fn test_parse_error_carries_path() {
        let result = DefinitionFile::from_json("objects/a.json", r#"{"uid": "not a list"#);
        match result {
            Err(Error::DefinitionParse { path, .. }) => assert_eq!(path, "objects/a.json"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_new_checks_shape_against_path() {
        let result = DefinitionFile::new(
            "objects/a.json",
            Definition::Event(EventDefn::default()),
        );
        assert!(matches!(result, Err(Error::ShapeViolation { .. })));
    }

    #[test]
    fn test_reshape_dictionary_into_event_keeps_attributes() {
        let dictionary = Definition::Dictionary(DictionaryDefn {
            caption: Some("Dictionary".to_string()),
            attributes: Some(BTreeMap::from([(
                "time".to_string(),
                AttrDefn {
                    type_: Some("timestamp_t".to_string()),
                    ..Default::default()
                },
            )])),
            ..Default::default()
        });

        let Definition::Event(event) = dictionary.reshape(DefinitionKind::Event) else {
            panic!("expected an event");
        };
        assert_eq!(event.caption.as_deref(), Some("Dictionary"));
        assert!(event.attributes.unwrap().contains_key("time"));
        assert_eq!(event.uid, None);
    }

    #[test]
    fn test_one_or_many_push_and_remove() {
        let mut owners = OneOrMany::One("host".to_string());
        owners.push("cloud");
        owners.push("host");
        assert_eq!(owners.items(), vec!["host", "cloud"]);
        assert!(!owners.remove("host"));
        assert!(owners.remove("cloud"));
    }

    #[test]
    fn test_display_name_falls_back_to_stem() {
        let file = DefinitionFile::new(
            "objects/device.json",
            Definition::Object(ObjectDefn::default()),
        )
        .unwrap();
        assert_eq!(file.display_name(), "device");
    }
}
