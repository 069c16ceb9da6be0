//! Missing-pages and content-gaps manifests.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;

use polydoc_mdx::Language;

use crate::generator::GenerateError;

/// Template path -> section name -> languages where the section is missing.
///
/// Both levels are key-sorted so the serialized manifest is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ContentGaps {
    templates: BTreeMap<String, BTreeMap<String, Vec<Language>>>,
}

impl ContentGaps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a gap; a language is listed at most once per section.
    pub fn record(&mut self, template: &str, section: &str, language: Language) {
        let languages = self
            .templates
            .entry(template.to_string())
            .or_default()
            .entry(section.to_string())
            .or_default();
        if !languages.contains(&language) {
            languages.push(language);
        }
    }

    /// Drop every gap recorded for a template.
    pub fn remove_template(&mut self, template: &str) {
        self.templates.remove(template);
    }

    /// Languages missing a section, if any gap was recorded.
    pub fn get(&self, template: &str, section: &str) -> Option<&[Language]> {
        self.templates
            .get(template)
            .and_then(|sections| sections.get(section))
            .map(Vec::as_slice)
    }

    /// Iterate templates with their section gaps, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, Vec<Language>>)> {
        self.templates
            .iter()
            .map(|(template, sections)| (template.as_str(), sections))
    }

    /// Number of templates with at least one gap.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Total (section, language) gaps across all templates.
    pub fn total_gaps(&self) -> usize {
        self.templates
            .values()
            .flat_map(|sections| sections.values())
            .map(Vec::len)
            .sum()
    }

    pub fn clear(&mut self) {
        self.templates.clear();
    }
}

/// Write `value` as pretty JSON with a trailing newline.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), GenerateError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| GenerateError::WriteError(e.to_string()))?;
    }

    let mut json = serde_json::to_string_pretty(value)
        .map_err(|e| GenerateError::SerializeError(e.to_string()))?;
    json.push('\n');

    fs::write(path, json)
        .map_err(|e| GenerateError::WriteError(format!("{}: {}", path.display(), e)))
}
