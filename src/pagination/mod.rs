//! Cursor pagination
//!
//! - `cursor`: cursors, pages and the next-request rule
//! - `list`: deferred list calls
//! - `pager`: lazy item and page sequences for both facades

pub mod cursor;
pub mod list;
pub mod pager;

pub use cursor::{Cursor, CursorItem, CursorPage};
pub use list::ListCall;
pub use pager::{PageIter, Pager, PagesIter};
