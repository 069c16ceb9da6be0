//! Named section extraction from `*.incl.md` fragments.
//!
//! A fragment is split into sections by HTML comment markers:
//!
//! ```text
//! <!-- Setup -->
//! Run `pip install`.
//!
//! <!-- Usage -->
//! N/A
//! ```

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// Any section marker; terminates the previous section.
static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--\s*[\w-]+\s*-->").expect("Invalid section marker regex"));

/// Section state within a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    /// No marker with this name
    Absent,

    /// Marker present but nothing after it (or the fragment itself is empty)
    Empty,

    /// Author explicitly marked the section as not applicable
    NotApplicable,

    /// Trimmed section content
    Content(String),
}

impl Section {
    /// Whether this section should be reported as a content gap.
    pub fn is_gap(&self) -> bool {
        matches!(self, Self::Absent | Self::Empty)
    }

    /// Content to splice into production output.
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Content(text) => Some(text),
            _ => None,
        }
    }
}

/// Extract the section called `name` from fragment text.
///
/// Marker names match case-insensitively. Empty fragment text counts as an
/// empty section so that it stays visible in diagnostics.
pub fn extract_section(markdown: &str, name: &str) -> Section {
    if markdown.is_empty() {
        return Section::Empty;
    }

    let Some(open) = opening_marker(name).and_then(|re| re.find(markdown)) else {
        return Section::Absent;
    };

    let rest = &markdown[open.end()..];
    let end = MARKER_RE.find(rest).map_or(rest.len(), |m| m.start());
    let content = rest[..end].trim();

    if is_not_applicable(content) {
        Section::NotApplicable
    } else if content.is_empty() {
        Section::Empty
    } else {
        Section::Content(content.to_string())
    }
}

/// Whether trimmed section text is the explicit not-applicable signal.
pub fn is_not_applicable(content: &str) -> bool {
    content.eq_ignore_ascii_case("not applicable") || content.eq_ignore_ascii_case("n/a")
}

fn opening_marker(name: &str) -> Option<Regex> {
    let pattern = format!(r"<!--\s*{}\s*-->", regex::escape(name));
    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!("Invalid section name {:?}: {}", name, e);
            None
        }
    }
}
