//! Editing model behind a multi-image gallery input.

use std::collections::HashSet;

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::domain::gallery::{GalleryValue, PreviewItem, PreviewOrigin, Removed};
use crate::domain::upload::UploadFile;
use crate::forms::FormError;

const MIB: u64 = 1024 * 1024;

/// Limits applied to files added to a gallery.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Validate)]
#[serde(default)]
pub struct GalleryOptions {
    /// Comma separated MIME types; `type/*` matches a whole family.
    #[validate(length(min = 1))]
    pub accept: String,
    /// Largest accepted file in bytes.
    #[validate(range(min = 1))]
    pub max_size: u64,
    #[validate(range(min = 1))]
    pub max_files: usize,
}

impl Default for GalleryOptions {
    fn default() -> Self {
        Self {
            accept: "image/*".to_string(),
            max_size: 5 * MIB,
            max_files: 10,
        }
    }
}

impl GalleryOptions {
    pub fn accepts(&self, content_type: &str) -> bool {
        self.accept
            .split(',')
            .map(str::trim)
            .filter(|pattern| !pattern.is_empty())
            .any(|pattern| match pattern.strip_suffix("/*") {
                Some("*") => true,
                Some(family) => content_type
                    .split_once('/')
                    .is_some_and(|(kind, _)| kind.eq_ignore_ascii_case(family)),
                None => pattern.eq_ignore_ascii_case(content_type),
            })
    }

    fn max_size_label(&self) -> String {
        format!("{}MB", self.max_size as f64 / MIB as f64)
    }
}

/// Issues and releases preview URLs for files that only exist locally.
pub trait PreviewStore {
    fn create(&mut self, file: &UploadFile) -> String;
    fn revoke(&mut self, url: &str);
}

/// Hands out unique `blob:` URLs and tracks which are still live.
#[derive(Debug, Default)]
pub struct BlobUrlStore {
    live: HashSet<String>,
}

impl BlobUrlStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.live.contains(url)
    }
}

impl PreviewStore for BlobUrlStore {
    fn create(&mut self, _file: &UploadFile) -> String {
        let url = format!("blob:{}", Uuid::new_v4());
        self.live.insert(url.clone());
        url
    }

    fn revoke(&mut self, url: &str) {
        self.live.remove(url);
    }
}

/// Gallery value plus the preview URLs of its new files.
///
/// `new_urls[i]` always belongs to `value.new[i]`.
#[derive(Debug)]
pub struct GalleryEditor<S: PreviewStore = BlobUrlStore> {
    options: GalleryOptions,
    value: GalleryValue,
    new_urls: Vec<String>,
    store: S,
    error: Option<String>,
}

impl<S: PreviewStore> GalleryEditor<S> {
    pub fn new(
        options: GalleryOptions,
        value: GalleryValue,
        mut store: S,
    ) -> Result<Self, FormError> {
        options.validate()?;
        let new_urls = value.new.iter().map(|file| store.create(file)).collect();
        Ok(Self {
            options,
            value,
            new_urls,
            store,
            error: None,
        })
    }

    pub fn options(&self) -> &GalleryOptions {
        &self.options
    }

    pub fn value(&self) -> &GalleryValue {
        &self.value
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Message of the last rejected batch.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn previews(&self) -> Vec<PreviewItem> {
        self.value.previews(&self.new_urls)
    }

    pub fn remaining(&self) -> usize {
        self.options.max_files.saturating_sub(self.value.total())
    }

    pub fn can_add_more(&self) -> bool {
        self.remaining() > 0
    }

    fn check(&self, file: &UploadFile, accepted: usize) -> Result<(), String> {
        if file.size() > self.options.max_size {
            return Err(format!(
                "File size must be less than {}",
                self.options.max_size_label()
            ));
        }
        if !self.options.accepts(&file.content_type) {
            return Err(format!("File type must be: {}", self.options.accept));
        }
        if self.value.total() + accepted >= self.options.max_files {
            return Err(format!("Maximum {} files allowed", self.options.max_files));
        }
        Ok(())
    }

    /// Appends every valid file in arrival order and records an error for
    /// the rest. Returns how many were accepted.
    pub fn add(&mut self, files: Vec<UploadFile>) -> usize {
        self.error = None;
        let mut accepted = Vec::new();
        let mut errors = Vec::new();
        for file in files {
            match self.check(&file, accepted.len()) {
                Ok(()) => accepted.push(file),
                Err(reason) => errors.push(format!("{}: {reason}", file.file_name)),
            }
        }

        if !errors.is_empty() {
            self.error = Some(errors.join(", "));
        }

        let count = accepted.len();
        for file in accepted {
            self.new_urls.push(self.store.create(&file));
            self.value.new.push(file);
        }
        count
    }

    /// Removes the item shown at `preview_index`. Out of range indices are
    /// ignored.
    pub fn remove(&mut self, preview_index: usize) -> Option<Removed> {
        let item = self.previews().into_iter().nth(preview_index)?;
        let removed = self.value.remove(item.origin, item.original_index)?;
        if item.origin == PreviewOrigin::New && item.original_index < self.new_urls.len() {
            let url = self.new_urls.remove(item.original_index);
            self.store.revoke(&url);
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        for url in self.new_urls.drain(..) {
            self.store.revoke(&url);
        }
        self.value = GalleryValue::default();
        self.error = None;
    }

    /// Releases every preview URL and returns the edited value.
    pub fn finish(mut self) -> GalleryValue {
        for url in self.new_urls.drain(..) {
            self.store.revoke(&url);
        }
        self.value
    }
}
