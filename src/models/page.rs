//! Pagination payloads and cursors.

use serde::{Deserialize, Serialize};

/// Pagination metadata returned with every collection page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub item_count: u64,
    #[serde(default)]
    pub items_per_page: u32,
    pub total_pages: u32,
    pub current_page: u32,
}

/// Navigation links returned alongside the metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLinks {
    #[serde(default)]
    pub first: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub last: Option<String>,
}

/// One page of a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<PageLinks>,
}

impl<T> Page<T> {
    /// Wraps an unpaginated list (what filtered queries return) as its own
    /// single, final page.
    pub fn single(items: Vec<T>) -> Self {
        let count = items.len() as u64;
        Self {
            meta: PageMeta {
                total_items: count,
                item_count: count,
                items_per_page: items.len() as u32,
                total_pages: 1,
                current_page: 1,
            },
            items,
            links: None,
        }
    }

    pub fn cursor(&self) -> Cursor {
        Cursor {
            current_page: self.meta.current_page,
            total_pages: self.meta.total_pages,
        }
    }
}

/// Pagination progress for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    pub current_page: u32,
    pub total_pages: u32,
}

impl Cursor {
    pub fn is_exhausted(&self) -> bool {
        self.current_page >= self.total_pages
    }

    pub fn next_page(&self) -> u32 {
        self.current_page + 1
    }
}
