//! Watch mode for polydoc.
//!
//! Watches the templates and fragments roots and regenerates the affected
//! documents one event at a time.

pub mod session;
pub mod watcher;

pub use session::{WatchError, WatchSession};
pub use watcher::{FileWatcher, WatchEvent};
