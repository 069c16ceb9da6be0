//! Per-language document generator for polydoc.
//!
//! Expands the `<LanguageInclude />` tags of page templates with sections
//! from per-language fragments, writes one document tree per language and
//! records which pages and sections are missing.

pub mod category;
pub mod config;
pub mod expander;
pub mod generator;
pub mod manifest;
pub mod render;
pub mod resolver;
pub mod template;

pub use config::{GeneratorConfig, Mode};
pub use expander::{Expander, Tracker};
pub use generator::{GenerateError, GenerateResult, Generator, OrphanedFragment};
pub use manifest::ContentGaps;
pub use resolver::FragmentResolver;
pub use template::{LoadError, Template};
