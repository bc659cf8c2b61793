//! Scroll execution.
//!
//! A scroll search runs in three steps:
//!
//! 1. `POST /<indices>/_search?scroll=<ttl>m` opens the cursor and returns the first page.
//! 2. `POST /_search/scroll` is repeated with the latest cursor until a page comes back empty.
//! 3. `DELETE /_search/scroll` releases every cursor seen, unless cursors are kept.
//!
//! Hits are handed to the caller as soon as step 2 finishes; step 3 runs in
//! the background and its outcome never changes the returned hits.

mod cleanup;
mod executor;
mod state;

pub use cleanup::{CleanupHandle, CleanupReport};
pub use executor::{ScrollExecutor, ScrollResults, clear_scrolls};
pub use state::{ScrollRegistry, ScrollState};
