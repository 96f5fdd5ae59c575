//! Utility modules
//!
//! Cancellation handles and URL helpers shared by both facades.

pub mod cancel;
pub mod url;

pub use cancel::{CancelHandle, new_cancel_handle};
pub use url::{encode_segment, join_url};
