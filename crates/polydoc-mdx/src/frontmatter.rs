//! Frontmatter extraction and parsing.

use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::{Mapping, Value};

use crate::language::Language;

/// Matches a `---` delimited block at the very start of a document.
static FRONTMATTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A---\s*\r?\n(.*?)\r?\n---").expect("Invalid frontmatter regex")
});

/// `key: value` line accepted by the fallback parser.
static SIMPLE_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+):\s*(.+)$").expect("Invalid frontmatter line regex"));

/// Key listing the languages a template is restricted to.
pub const LANGUAGES_KEY: &str = "languages";

/// Key that silences the "no include tags" warning for a template.
pub const SUPPRESS_INCLUDE_WARNING_KEY: &str = "suppressLanguageIncludeWarning";

/// Parsed frontmatter of a template.
///
/// Values keep their source order so the block can be re-emitted as written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    values: Mapping,
}

impl Frontmatter {
    /// Wrap an already parsed mapping.
    pub fn from_mapping(values: Mapping) -> Self {
        Self { values }
    }

    /// Look up a raw value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// True only when `key` holds the boolean `true`.
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.get(key), Some(Value::Bool(true)))
    }

    /// Languages the document is restricted to, if it declares a restriction.
    ///
    /// Unknown identifiers in the list are ignored. A `languages` key that is
    /// not a list is treated as no restriction.
    pub fn languages(&self) -> Option<Vec<Language>> {
        match self.get(LANGUAGES_KEY) {
            Some(Value::Sequence(items)) => Some(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter_map(Language::from_id)
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Whether output should be generated for `language`.
    pub fn applies_to(&self, language: Language) -> bool {
        self.languages()
            .is_none_or(|languages| languages.contains(&language))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Serialize back to YAML (without the `---` delimiters).
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.values)
    }
}

/// Result of splitting a document into frontmatter and body.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted<'a> {
    /// Parsed frontmatter (empty when the document has none)
    pub frontmatter: Frontmatter,

    /// Content after the frontmatter block, leading whitespace trimmed
    pub body: &'a str,

    /// Whether a delimited block was present
    pub has_frontmatter: bool,

    /// Byte length of the delimited block, including both delimiters
    pub block_len: usize,
}

/// Extract frontmatter from document content.
///
/// Never fails: YAML that does not parse falls back to [`parse_simple`].
pub fn extract_frontmatter(source: &str) -> Extracted<'_> {
    let Some(captures) = FRONTMATTER_RE.captures(source) else {
        return Extracted {
            frontmatter: Frontmatter::default(),
            body: source,
            has_frontmatter: false,
            block_len: 0,
        };
    };

    // Group 0 always exists for a successful match and is anchored at 0.
    let block_len = captures.get(0).map_or(0, |m| m.end());
    let yaml = captures.get(1).map_or("", |m| m.as_str());

    let frontmatter = match serde_yaml::from_str::<Value>(yaml) {
        Ok(Value::Mapping(values)) => Frontmatter::from_mapping(values),
        Ok(_) => Frontmatter::default(),
        Err(e) => {
            tracing::warn!(
                "Error parsing frontmatter as YAML, falling back to simple parser: {}",
                e
            );
            parse_simple(yaml)
        }
    };

    Extracted {
        frontmatter,
        body: source[block_len..].trim_start(),
        has_frontmatter: true,
        block_len,
    }
}

/// Line-oriented `key: value` parser used when YAML parsing fails.
///
/// Infers booleans, non-negative integers and quoted strings; everything else
/// is kept as a string. Lines that are not `key: value` are skipped.
pub fn parse_simple(text: &str) -> Frontmatter {
    let mut values = Mapping::new();

    for line in text.lines() {
        let Some(captures) = SIMPLE_LINE_RE.captures(line) else {
            continue;
        };

        let key = &captures[1];
        let value = parse_scalar(captures[2].trim());
        values.insert(Value::String(key.to_string()), value);
    }

    Frontmatter::from_mapping(values)
}

fn parse_scalar(raw: &str) -> Value {
    let quoted = raw.len() >= 2
        && ((raw.starts_with('"') && raw.ends_with('"'))
            || (raw.starts_with('\'') && raw.ends_with('\'')));
    if quoted {
        return Value::String(raw[1..raw.len() - 1].to_string());
    }

    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = raw.parse::<u64>() {
            return Value::Number(n.into());
        }
    }

    Value::String(raw.to_string())
}
