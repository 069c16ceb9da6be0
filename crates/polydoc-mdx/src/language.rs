//! Supported SDK languages.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An SDK language the documentation is generated for.
///
/// Variant order is the canonical processing and display order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    TypeScript,
    CSharp,
    Python,
}

impl Language {
    /// Every supported language, in canonical order.
    pub const ALL: [Language; 3] = [Self::TypeScript, Self::CSharp, Self::Python];

    /// Identifier used in paths, fragment file names and manifests.
    pub fn id(&self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::CSharp => "csharp",
            Self::Python => "python",
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::TypeScript => "TypeScript",
            Self::CSharp => "C#",
            Self::Python => "Python",
        }
    }

    /// Sidebar position of the language's root category.
    pub fn sidebar_position(&self) -> f64 {
        match self {
            Self::TypeScript => 2.0,
            Self::CSharp => 2.1,
            Self::Python => 2.2,
        }
    }

    /// Parse a language from its identifier.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.id() == id)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s).ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}

/// Error returned when parsing an unsupported language identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown language: {0}")]
pub struct UnknownLanguage(pub String);

/// Page path to the languages the page is NOT available in.
///
/// Keys are sorted so serialized manifests are stable.
pub type LanguageAvailability = BTreeMap<String, Vec<Language>>;
