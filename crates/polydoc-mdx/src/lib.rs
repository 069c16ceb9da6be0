//! Template and fragment parsing for polydoc.
//!
//! This crate provides the language model, frontmatter extraction, named
//! section extraction from `*.incl.md` fragments, and include-tag scanning
//! used by the generator.

pub mod frontmatter;
pub mod include;
pub mod language;
pub mod section;
pub mod source;

pub use frontmatter::{extract_frontmatter, parse_simple, Extracted, Frontmatter};
pub use include::{find_include_tags, has_include_tag, IncludeTag, Placement};
pub use language::{Language, LanguageAvailability, UnknownLanguage};
pub use section::{extract_section, Section};
pub use source::{normalize_path, read_normalized, SourceError};
