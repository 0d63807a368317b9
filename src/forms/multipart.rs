use crate::domain::upload::UploadFile;

/// Value of one multipart field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PartValue {
    Text(String),
    File(UploadFile),
}

/// Ordered multipart body. Field names may repeat; the HTTP client turns this
/// into the actual `multipart/form-data` stream and owns the boundary.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MultipartPayload {
    parts: Vec<(String, PartValue)>,
}

impl MultipartPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parts.push((name.into(), PartValue::Text(value.into())));
    }

    pub fn push_file(&mut self, name: impl Into<String>, file: UploadFile) {
        self.parts.push((name.into(), PartValue::File(file)));
    }

    pub fn has(&self, name: &str) -> bool {
        self.parts.iter().any(|(part, _)| part == name)
    }

    /// First value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&PartValue> {
        self.parts
            .iter()
            .find(|(part, _)| part == name)
            .map(|(_, value)| value)
    }

    /// First text value stored under `name`.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(PartValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn parts(&self) -> &[(String, PartValue)] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}
