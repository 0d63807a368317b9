//! Value shape of a multi-image gallery field.

use crate::domain::upload::UploadFile;

/// Images already stored on the server plus files waiting to be uploaded.
///
/// Insertion order is display order for both lists.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GalleryValue {
    pub existing: Vec<String>,
    pub new: Vec<UploadFile>,
}

/// Which list a preview item was built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PreviewOrigin {
    Existing,
    New,
}

/// One rendered thumbnail.
///
/// `original_index` is the position inside the list named by `origin`, which
/// is what removal must use, never the position inside the preview list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewItem {
    pub url: String,
    pub origin: PreviewOrigin,
    pub name: String,
    pub original_index: usize,
}

impl PreviewItem {
    /// Stable key for list rendering, e.g. `existing-0` or `new-2`.
    pub fn key(&self) -> String {
        match self.origin {
            PreviewOrigin::Existing => format!("existing-{}", self.original_index),
            PreviewOrigin::New => format!("new-{}", self.original_index),
        }
    }
}

impl GalleryValue {
    pub fn from_existing<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            existing: urls.into_iter().map(Into::into).collect(),
            new: Vec::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.existing.len() + self.new.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Removes one item from the list it came from.
    ///
    /// Returns the removed upload when the item was a new file. Out of range
    /// indices leave the value untouched.
    pub fn remove(&mut self, origin: PreviewOrigin, original_index: usize) -> Option<Removed> {
        match origin {
            PreviewOrigin::Existing if original_index < self.existing.len() => {
                Some(Removed::Existing(self.existing.remove(original_index)))
            }
            PreviewOrigin::New if original_index < self.new.len() => {
                Some(Removed::New(self.new.remove(original_index)))
            }
            _ => None,
        }
    }

    /// Builds the preview list: `existing` first, then `new`.
    ///
    /// `new_urls` must hold one preview URL per entry of `new`, in order.
    pub fn previews(&self, new_urls: &[String]) -> Vec<PreviewItem> {
        let existing = self
            .existing
            .iter()
            .enumerate()
            .filter(|(_, url)| !url.is_empty())
            .map(|(index, url)| PreviewItem {
                url: url.clone(),
                origin: PreviewOrigin::Existing,
                name: format!("Existing Image {}", index + 1),
                original_index: index,
            });
        let new = self
            .new
            .iter()
            .zip(new_urls)
            .enumerate()
            .map(|(index, (file, url))| PreviewItem {
                url: url.clone(),
                origin: PreviewOrigin::New,
                name: file.file_name.clone(),
                original_index: index,
            });
        existing.chain(new).collect()
    }
}

/// Item taken out of a gallery by [`GalleryValue::remove`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Removed {
    Existing(String),
    New(UploadFile),
}
