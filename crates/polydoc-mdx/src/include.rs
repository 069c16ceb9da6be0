//! `<LanguageInclude section="..." />` tag scanning.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static INCLUDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<LanguageInclude\s+section="([^"]+)"\s*/>"#).expect("Invalid include tag regex")
});

/// Prefix that identifies an include tag, however malformed.
pub const INCLUDE_TAG_PREFIX: &str = "<LanguageInclude";

/// How included content is spliced into the surrounding text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Tag stands on its own line: content becomes a block of markdown
    Block,

    /// Tag sits within text: content is spliced without line breaks
    Inline,
}

/// An include tag found in a template body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeTag {
    /// Section name requested by the tag
    pub section: String,

    /// Byte range of the whole tag in the scanned text
    pub range: Range<usize>,

    pub placement: Placement,
}

/// Find all include tags in `text`, left to right.
pub fn find_include_tags(text: &str) -> Vec<IncludeTag> {
    INCLUDE_RE
        .captures_iter(text)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            let section = captures.get(1)?.as_str().to_string();
            Some(IncludeTag {
                section,
                range: whole.range(),
                placement: placement_at(text, whole.start()),
            })
        })
        .collect()
}

/// Whether the text mentions an include tag at all.
pub fn has_include_tag(text: &str) -> bool {
    text.contains(INCLUDE_TAG_PREFIX)
}

/// Block when only whitespace precedes `offset` on its line.
fn placement_at(text: &str, offset: usize) -> Placement {
    let line_start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    if text[line_start..offset].chars().all(char::is_whitespace) {
        Placement::Block
    } else {
        Placement::Inline
    }
}
