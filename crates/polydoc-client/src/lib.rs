//! Runtime helpers for sites generated by polydoc.
//!
//! Reads the missing-pages manifest to decide whether a page exists in
//! another language, and maps site URLs to languages and manifest keys.

pub mod availability;
pub mod paths;
pub mod switch;

pub use availability::{AvailabilityCache, FetchError, FileSource, HttpSource, ManifestSource};
pub use paths::{
    language_from_path, language_from_path_strict, language_home, manifest_path_from_url,
    replace_language_in_path,
};
pub use switch::{LanguageSwitcher, SwitchOutcome};
