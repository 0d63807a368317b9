//! Values held by an edit form before they are encoded for the wire.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use serde_json::{Number, Value};

use crate::domain::gallery::GalleryValue;
use crate::domain::upload::UploadFile;

/// Field name to value, as collected from the editor widgets.
pub type FormValues = BTreeMap<String, FieldValue>;

/// The value of one form field.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    File(UploadFile),
    Gallery(GalleryValue),
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// `Null` and the empty string are never put on the wire.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    /// Files, lists and galleries cannot travel as JSON.
    pub fn needs_multipart(&self) -> bool {
        matches!(self, Self::File(_) | Self::List(_) | Self::Gallery(_))
    }

    /// Reads `true`/`false` switches, whether they arrived as booleans or as
    /// the strings some widgets emit.
    pub fn as_switch(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            Self::Text(text) if text == "true" => Some(true),
            Self::Text(text) if text == "false" => Some(false),
            _ => None,
        }
    }

    /// Seeds a field from a column of an existing record.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from_json).collect()),
            Value::Object(_) => Self::Text(value.to_string()),
        }
    }

    /// JSON rendition used by the JSON transport. Binary content has none.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            Self::Null => Some(Value::Null),
            Self::Bool(b) => Some(Value::Bool(*b)),
            Self::Number(n) => Some(Value::Number(n.clone())),
            Self::Text(s) => Some(Value::String(s.clone())),
            Self::List(items) => Some(Value::Array(
                items.iter().filter_map(FieldValue::to_json).collect(),
            )),
            Self::File(_) | Self::Gallery(_) => None,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Self::Null, Self::Number)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<UploadFile> for FieldValue {
    fn from(value: UploadFile) -> Self {
        Self::File(value)
    }
}

impl From<GalleryValue> for FieldValue {
    fn from(value: GalleryValue) -> Self {
        Self::Gallery(value)
    }
}

/// How the fields of one resource form are to be interpreted.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FormSchema {
    /// Single image inputs.
    pub image_fields: BTreeSet<String>,
    /// Multi image galleries.
    pub gallery_fields: BTreeSet<String>,
    /// Switches the backend must always receive explicitly.
    pub flag_fields: Vec<String>,
    /// Columns maintained by the server, never sent back.
    pub server_managed: BTreeSet<String>,
}

impl Default for FormSchema {
    fn default() -> Self {
        Self {
            image_fields: BTreeSet::from(["image".to_string()]),
            gallery_fields: BTreeSet::from(["gallery".to_string()]),
            flag_fields: vec![
                "active".to_string(),
                "free_delevery".to_string(),
                "one_year_warranty".to_string(),
            ],
            server_managed: BTreeSet::from([
                "createdAt".to_string(),
                "updatedAt".to_string(),
                "_method".to_string(),
            ]),
        }
    }
}

impl FormSchema {
    pub fn is_image(&self, field: &str) -> bool {
        self.image_fields.contains(field)
    }

    pub fn is_gallery(&self, field: &str) -> bool {
        self.gallery_fields.contains(field)
    }

    /// Turns a record column into the value its editor widget holds:
    /// gallery columns become `{existing: urls, new: []}`.
    pub fn seed_value(&self, field: &str, value: Value) -> FieldValue {
        if self.is_gallery(field) {
            let urls = match value {
                Value::Array(items) => items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(url) => Some(url),
                        Value::Object(mut object) => match object.remove("url") {
                            Some(Value::String(url)) => Some(url),
                            _ => None,
                        },
                        _ => None,
                    })
                    .collect(),
                _ => Vec::new(),
            };
            return FieldValue::Gallery(GalleryValue::from_existing(urls));
        }
        FieldValue::from_json(value)
    }
}
