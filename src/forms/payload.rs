//! Turns edit-form values into a request body.
//!
//! Building happens in three steps. [`PayloadBuilder::collect`] merges the
//! form with injected values, attaches the id of the record being edited and
//! strips server managed columns. [`CollectedFields::transport`] decides
//! between JSON and multipart: anything holding a file, a list or a gallery,
//! and every update, goes as multipart so that an untouched image can be sent
//! as an explicit empty field. [`CollectedFields::encode`] then applies the
//! per-field rules of the chosen transport.

use serde_json::{Map, Value};

use crate::domain::types::EntityId;
use crate::forms::fields::{FieldValue, FormSchema, FormValues};
use crate::forms::multipart::MultipartPayload;

/// Marker telling the backend to treat a POST as an update.
pub const METHOD_OVERRIDE_FIELD: &str = "_method";
pub const METHOD_OVERRIDE_PUT: &str = "PUT";

/// Encoded request body of a save operation.
#[derive(Clone, Debug, PartialEq)]
pub enum FormPayload {
    Json(Map<String, Value>),
    Multipart(MultipartPayload),
}

impl FormPayload {
    pub fn transport(&self) -> Transport {
        match self {
            Self::Json(_) => Transport::Json,
            Self::Multipart(_) => Transport::Multipart,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transport {
    Json,
    Multipart,
}

/// Form values after merging, ready to be classified and encoded.
#[derive(Clone, Debug, PartialEq)]
pub struct CollectedFields {
    fields: FormValues,
    editing: Option<EntityId>,
}

/// Builds payloads for one resource form.
#[derive(Clone, Copy, Debug)]
pub struct PayloadBuilder<'a> {
    schema: &'a FormSchema,
}

impl<'a> PayloadBuilder<'a> {
    pub fn new(schema: &'a FormSchema) -> Self {
        Self { schema }
    }

    /// Merges form values with injected values (injected values win),
    /// attaches `id` when editing and drops server managed columns.
    pub fn collect(
        &self,
        values: &FormValues,
        injected: &FormValues,
        editing: Option<EntityId>,
    ) -> CollectedFields {
        let mut fields = values.clone();
        fields.extend(injected.iter().map(|(k, v)| (k.clone(), v.clone())));
        if let Some(id) = editing {
            fields.insert("id".to_string(), FieldValue::from(id.get()));
        }
        fields.retain(|key, _| !self.schema.server_managed.contains(key));
        CollectedFields { fields, editing }
    }

    /// Runs every step at once.
    pub fn build(
        &self,
        values: &FormValues,
        injected: &FormValues,
        editing: Option<EntityId>,
    ) -> FormPayload {
        self.collect(values, injected, editing).encode(self.schema)
    }
}

impl CollectedFields {
    pub fn fields(&self) -> &FormValues {
        &self.fields
    }

    pub fn is_edit(&self) -> bool {
        self.editing.is_some()
    }

    pub fn transport(&self) -> Transport {
        if self.is_edit() || self.fields.values().any(FieldValue::needs_multipart) {
            Transport::Multipart
        } else {
            Transport::Json
        }
    }

    pub fn encode(self, schema: &FormSchema) -> FormPayload {
        match self.transport() {
            Transport::Json => FormPayload::Json(self.encode_json()),
            Transport::Multipart => FormPayload::Multipart(self.encode_multipart(schema)),
        }
    }

    fn encode_json(self) -> Map<String, Value> {
        self.fields
            .into_iter()
            .filter(|(_, value)| !value.is_blank())
            .filter_map(|(key, value)| {
                let json = match value.as_switch() {
                    Some(switch) => Some(Value::Bool(switch)),
                    None => value.to_json(),
                };
                json.map(|json| (key, json))
            })
            .collect()
    }

    fn encode_multipart(self, schema: &FormSchema) -> MultipartPayload {
        let mut payload = MultipartPayload::new();

        for (key, value) in &self.fields {
            if schema.is_image(key) {
                encode_image(&mut payload, key, value);
                continue;
            }
            if schema.is_gallery(key) {
                encode_gallery(&mut payload, key, value);
                continue;
            }
            encode_field(&mut payload, key, value);
        }

        for flag in &schema.flag_fields {
            if !self.fields.contains_key(flag) || payload.has(flag) {
                continue;
            }
            let on = self
                .fields
                .get(flag)
                .and_then(FieldValue::as_switch)
                .unwrap_or(false);
            payload.push_text(flag.as_str(), switch_text(on));
        }

        if self.is_edit() {
            payload.push_text(METHOD_OVERRIDE_FIELD, METHOD_OVERRIDE_PUT);
        }

        payload
    }
}

fn switch_text(on: bool) -> &'static str {
    if on { "1" } else { "0" }
}

/// A new file is uploaded; anything else (kept URL, cleared, missing) is an
/// explicit empty field meaning "leave the stored image alone".
fn encode_image(payload: &mut MultipartPayload, key: &str, value: &FieldValue) {
    match value {
        FieldValue::File(file) => payload.push_file(key, file.clone()),
        _ => payload.push_text(key, ""),
    }
}

/// Only pending uploads travel; URLs the server already holds are not resent.
fn encode_gallery(payload: &mut MultipartPayload, key: &str, value: &FieldValue) {
    let files: Vec<_> = match value {
        FieldValue::Gallery(gallery) => gallery.new.iter().collect(),
        FieldValue::List(items) => items
            .iter()
            .filter_map(|item| match item {
                FieldValue::File(file) => Some(file),
                _ => None,
            })
            .collect(),
        FieldValue::File(file) => vec![file],
        _ => Vec::new(),
    };
    for (index, file) in files.into_iter().enumerate() {
        payload.push_file(format!("{key}[{index}]"), file.clone());
    }
}

fn encode_field(payload: &mut MultipartPayload, key: &str, value: &FieldValue) {
    if value.is_blank() {
        return;
    }
    match value {
        FieldValue::File(file) => payload.push_file(key, file.clone()),
        FieldValue::Gallery(_) => encode_gallery(payload, key, value),
        FieldValue::List(items) => {
            for (index, item) in items.iter().enumerate() {
                let name = format!("{key}[{index}]");
                match item {
                    FieldValue::File(file) => payload.push_file(name, file.clone()),
                    other => {
                        if let Some(text) = scalar_text(other) {
                            payload.push_text(name, text);
                        }
                    }
                }
            }
        }
        other => {
            if let Some(text) = scalar_text(other) {
                payload.push_text(key, text);
            }
        }
    }
}

fn scalar_text(value: &FieldValue) -> Option<String> {
    if let Some(switch) = value.as_switch() {
        return Some(switch_text(switch).to_string());
    }
    match value {
        FieldValue::Number(number) => Some(number.to_string()),
        FieldValue::Text(text) => Some(text.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::gallery::GalleryValue;
    use crate::domain::upload::UploadFile;
    use crate::forms::multipart::PartValue;

    fn png(name: &str) -> UploadFile {
        UploadFile::new(name, "image/png", vec![0u8; 4])
    }

    fn values(pairs: Vec<(&str, FieldValue)>) -> FormValues {
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    fn id(raw: i64) -> EntityId {
        EntityId::new(raw).unwrap()
    }

    #[test]
    fn plain_create_is_json_without_blanks() {
        let schema = FormSchema::default();
        let form = values(vec![
            ("name", "Acme".into()),
            ("description", "".into()),
            ("discount", FieldValue::Null),
            ("active", "true".into()),
            ("price", 12.5.into()),
        ]);

        let payload = PayloadBuilder::new(&schema).build(&form, &FormValues::new(), None);

        let FormPayload::Json(body) = payload else {
            panic!("expected JSON payload");
        };
        assert_eq!(
            Value::Object(body),
            json!({"name": "Acme", "active": true, "price": 12.5})
        );
    }

    #[test]
    fn injected_values_override_form_and_server_fields_are_stripped() {
        let schema = FormSchema::default();
        let form = values(vec![
            ("role", "admin".into()),
            ("createdAt", "2024-01-01".into()),
            ("_method", "PATCH".into()),
        ]);
        let injected = values(vec![("role", "delivery".into())]);

        let collected = PayloadBuilder::new(&schema).collect(&form, &injected, None);

        assert_eq!(collected.fields().len(), 1);
        assert_eq!(collected.fields()["role"], FieldValue::from("delivery"));
        assert_eq!(collected.transport(), Transport::Json);
    }

    #[test]
    fn update_with_untouched_image_sends_explicit_empty_field() {
        let schema = FormSchema::default();
        let form = values(vec![
            ("name", "Chair".into()),
            ("image", "https://cdn.example.com/chair.png".into()),
        ]);

        let payload = PayloadBuilder::new(&schema).build(&form, &FormValues::new(), Some(id(7)));

        let FormPayload::Multipart(body) = payload else {
            panic!("expected multipart payload");
        };
        assert_eq!(body.text("image"), Some(""));
        assert_eq!(body.text("id"), Some("7"));
        assert_eq!(body.text("_method"), Some("PUT"));
        assert_eq!(body.text("name"), Some("Chair"));
    }

    #[test]
    fn cleared_image_is_still_sent() {
        let schema = FormSchema::default();
        let form = values(vec![("image", FieldValue::Null)]);

        let FormPayload::Multipart(body) =
            PayloadBuilder::new(&schema).build(&form, &FormValues::new(), Some(id(1)))
        else {
            panic!("expected multipart payload");
        };
        assert_eq!(body.text("image"), Some(""));
    }

    #[test]
    fn new_image_file_is_attached_as_binary() {
        let schema = FormSchema::default();
        let form = values(vec![("image", png("new.png").into())]);

        let payload = PayloadBuilder::new(&schema).build(&form, &FormValues::new(), None);

        let FormPayload::Multipart(body) = payload else {
            panic!("expected multipart payload");
        };
        assert_eq!(body.get("image"), Some(&PartValue::File(png("new.png"))));
        assert!(!body.has("_method"));
    }

    #[test]
    fn gallery_sends_only_new_files_indexed() {
        let schema = FormSchema::default();
        let gallery = GalleryValue {
            existing: vec!["https://cdn/a.png".into(), "https://cdn/b.png".into()],
            new: vec![png("c.png"), png("d.png")],
        };
        let form = values(vec![("gallery", gallery.into())]);

        let FormPayload::Multipart(body) =
            PayloadBuilder::new(&schema).build(&form, &FormValues::new(), None)
        else {
            panic!("expected multipart payload");
        };

        let names: Vec<_> = body
            .parts()
            .iter()
            .filter(|(name, _)| name.starts_with("gallery"))
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(names, vec!["gallery[0]", "gallery[1]"]);
        assert!(body.parts().iter().all(|(_, value)| match value {
            PartValue::Text(text) => !text.contains("cdn"),
            PartValue::File(_) => true,
        }));
    }

    #[test]
    fn multipart_scalar_rules() {
        let schema = FormSchema {
            flag_fields: Vec::new(),
            ..FormSchema::default()
        };
        let form = values(vec![
            ("featured", true.into()),
            ("hidden", "false".into()),
            ("quantity", 3i64.into()),
            ("note", "".into()),
            ("discount", FieldValue::Null),
            (
                "tags",
                FieldValue::List(vec!["a".into(), FieldValue::Null, 2i64.into()]),
            ),
        ]);

        let FormPayload::Multipart(body) =
            PayloadBuilder::new(&schema).build(&form, &FormValues::new(), None)
        else {
            panic!("expected multipart payload");
        };

        assert_eq!(body.text("featured"), Some("1"));
        assert_eq!(body.text("hidden"), Some("0"));
        assert_eq!(body.text("quantity"), Some("3"));
        assert!(!body.has("note"));
        assert!(!body.has("discount"));
        assert_eq!(body.text("tags[0]"), Some("a"));
        assert!(!body.has("tags[1]"));
        assert_eq!(body.text("tags[2]"), Some("2"));
    }

    #[test]
    fn flag_fields_of_the_form_are_always_present_in_multipart() {
        let schema = FormSchema::default();
        let form = values(vec![("active", FieldValue::Null), ("free_delevery", true.into())]);

        let FormPayload::Multipart(body) =
            PayloadBuilder::new(&schema).build(&form, &FormValues::new(), Some(id(2)))
        else {
            panic!("expected multipart payload");
        };

        assert_eq!(body.text("active"), Some("0"));
        assert_eq!(body.text("free_delevery"), Some("1"));
        assert!(!body.has("one_year_warranty"));
    }

    #[test]
    fn create_with_image_leaves_missing_flags_to_the_server() {
        let schema = FormSchema::default();
        let form = values(vec![("name", "Lamp".into()), ("image", png("lamp.png").into())]);

        let FormPayload::Multipart(body) =
            PayloadBuilder::new(&schema).build(&form, &FormValues::new(), None)
        else {
            panic!("expected multipart payload");
        };

        let names: Vec<_> = body.parts().iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["image", "name"]);
    }

    #[test]
    fn partial_update_sends_no_foreign_flags() {
        let schema = FormSchema::default();
        let form = values(vec![("email", "courier@example.com".into())]);

        let FormPayload::Multipart(body) =
            PayloadBuilder::new(&schema).build(&form, &FormValues::new(), Some(id(3)))
        else {
            panic!("expected multipart payload");
        };

        let names: Vec<_> = body.parts().iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["email", "id", "_method"]);
    }
}
