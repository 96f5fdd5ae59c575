//! Cursor protocol.
//!
//! The server orders a collection, and a page's last item id is the
//! position to resume after. Cursors are opaque outside this module.

use serde::{Deserialize, Serialize};

use crate::types::ListParams;

/// Position after the last item seen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn encode(last_item_id: impl Into<String>) -> Self {
        Self(last_item_id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Items that can anchor a cursor.
pub trait CursorItem {
    fn cursor_id(&self) -> &str;
}

/// One page of a list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPage<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub first_id: Option<String>,
    #[serde(default)]
    pub last_id: Option<String>,
    pub has_more: bool,
    #[serde(default = "list_object")]
    pub object: String,
}

fn list_object() -> String {
    "list".to_string()
}

impl<T: CursorItem> CursorPage<T> {
    /// Cursor for the following page, derived from the last item only.
    /// `None` when the page is empty or the server reports no more items.
    pub fn next_cursor(&self) -> Option<Cursor> {
        if !self.has_more {
            return None;
        }
        self.data.last().map(|item| Cursor::encode(item.cursor_id()))
    }

    pub fn has_next_page(&self) -> bool {
        self.next_cursor().is_some()
    }

    /// Request for the following page, keeping `prev`'s limit and order.
    pub fn next_page_params(&self, prev: &ListParams) -> Option<ListParams> {
        self.next_cursor().map(|cursor| prev.next(&cursor))
    }
}

impl<T> CursorPage<T> {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T> IntoIterator for CursorPage<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SortOrder;

    #[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
    struct Item {
        id: String,
    }

    impl CursorItem for Item {
        fn cursor_id(&self) -> &str {
            &self.id
        }
    }

    fn page(ids: &[&str], has_more: bool) -> CursorPage<Item> {
        CursorPage {
            data: ids.iter().map(|id| Item { id: id.to_string() }).collect(),
            first_id: ids.first().map(|s| s.to_string()),
            last_id: ids.last().map(|s| s.to_string()),
            has_more,
            object: "list".into(),
        }
    }

    #[test]
    fn cursor_follows_last_item() {
        assert_eq!(page(&["a", "b"], true).next_cursor(), Some(Cursor::encode("b")));
        assert_eq!(page(&["a", "b"], false).next_cursor(), None);
        assert_eq!(page(&[], true).next_cursor(), None);
    }

    #[test]
    fn next_params_keep_limit_and_order() {
        let prev = ListParams::new().limit(2).order(SortOrder::Desc);
        let next = page(&["a", "b"], true).next_page_params(&prev).unwrap();
        assert_eq!(next, ListParams::new().after("b").limit(2).order(SortOrder::Desc));
        assert!(page(&["a"], false).next_page_params(&prev).is_none());
    }

    #[test]
    fn decodes_list_envelope() {
        let page: CursorPage<Item> = serde_json::from_str(
            r#"{"data":[{"id":"skl_1"}],"first_id":"skl_1","last_id":"skl_1","has_more":false,"object":"list"}"#,
        )
        .unwrap();
        assert_eq!(page.len(), 1);
        assert!(!page.has_next_page());

        let empty: CursorPage<Item> =
            serde_json::from_str(r#"{"data":[],"first_id":null,"last_id":null,"has_more":false}"#)
                .unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.object, "list");
    }
}
