use serde::{Deserialize, Serialize};

/// One entry of the `links` array the backend attaches to paginated lists.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageLink {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub active: bool,
}

/// Position of one page inside a larger collection.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PaginationMeta {
    pub current_page: usize,
    pub last_page: usize,
    pub per_page: usize,
    pub total: usize,
    pub links: Vec<PageLink>,
}

impl Default for PaginationMeta {
    fn default() -> Self {
        Self::single_page(0, 0)
    }
}

impl PaginationMeta {
    /// Meta for a response that carried no pagination information: everything
    /// returned is assumed to be the only page.
    pub fn single_page(per_page: usize, total: usize) -> Self {
        Self {
            current_page: 1,
            last_page: 1,
            per_page,
            total,
            links: Vec::new(),
        }
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }
}

fn get_pages(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    let last_page = total_pages;

    if last_page == 0 {
        return vec![];
    }

    let mut pages = Vec::new();

    let left_end = (1 + left_edge).min(last_page + 1);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = (current_page + right_current + 1).min(last_page + 1);

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge) + 1);

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

/// Page numbers to render in a pager; `None` marks a gap.
pub fn page_window(meta: &PaginationMeta) -> Vec<Option<usize>> {
    let current_page = meta.current_page.max(1);
    get_pages(meta.last_page, current_page, 2, 2, 4, 2)
}
