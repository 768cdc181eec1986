//! # Compiled Schema
//!
//! The immutable result of a compilation: objects, event classes and
//! primitive types, each attribute fully merged and annotated with the
//! display name of its type. Produced by [`crate::render::render`].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::definitions::{DeprecationInfo, EnumMemberDefn, OneOrMany};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    pub version: String,
    pub objects: BTreeMap<String, SchemaObject>,
    pub classes: BTreeMap<String, SchemaEvent>,
    pub types: BTreeMap<String, SchemaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_event: Option<SchemaEvent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaAttribute {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirement: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    /// Caption of the primitive type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    /// Caption of the referenced object
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_array: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<DeprecationInfo>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<BTreeMap<String, EnumMemberDefn>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observable: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<OneOrMany>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sibling: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaObject {
    /// Repository path the entry was rendered from
    #[serde(skip)]
    pub source: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observable: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profiles: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<BTreeMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<DeprecationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_extension: Option<String>,
    pub attributes: BTreeMap<String, SchemaAttribute>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaEvent {
    /// Repository path the entry was rendered from
    #[serde(skip)]
    pub source: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profiles: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub associations: Option<BTreeMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<BTreeMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<DeprecationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_extension: Option<String>,
    pub attributes: BTreeMap<String, SchemaAttribute>,
}

impl SchemaEvent {
    /// Key of this event in the classes table
    pub fn key(&self) -> String {
        match &self.src_extension {
            Some(extension) => format!("{}/{}", extension, self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_array: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<DeprecationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_len: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observable: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<serde_json::Value>>,
}
