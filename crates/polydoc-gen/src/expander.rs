//! Expansion of `<LanguageInclude />` tags into per-language content.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use polydoc_mdx::{
    extract_frontmatter, extract_section, find_include_tags, read_normalized, IncludeTag,
    Language, Placement, Section,
};

use crate::config::{GeneratorConfig, Mode};
use crate::manifest::ContentGaps;
use crate::resolver::FragmentResolver;
use crate::template::Template;

/// Bookkeeping shared by every expansion in a run.
#[derive(Debug, Default)]
pub struct Tracker {
    /// Sections missing per template and language
    pub gaps: ContentGaps,

    /// Fragment files some template expected to read
    pub referenced: BTreeSet<PathBuf>,
}

/// What a fragment lookup produced.
#[derive(Debug, Clone, PartialEq)]
enum Lookup {
    MissingFile,
    ReadFailed(String),
    Found(Section),
}

/// Expands include tags of a template.
pub struct Expander<'a> {
    config: &'a GeneratorConfig,
    resolver: &'a FragmentResolver,
}

impl<'a> Expander<'a> {
    pub fn new(config: &'a GeneratorConfig, resolver: &'a FragmentResolver) -> Self {
        Self { config, resolver }
    }

    /// Replace every include tag in the template source.
    ///
    /// In production mode with a target language, tags become the raw section
    /// text (or nothing). Otherwise each applicable language is wrapped in a
    /// `<Language>` element, gaps render as diagnostics and are recorded in
    /// `tracker`, and the component import is injected when missing.
    pub fn expand(
        &self,
        template: &Template,
        target: Option<Language>,
        tracker: &mut Tracker,
    ) -> String {
        let source = template.source.as_str();
        let tags = find_include_tags(source);
        if tags.is_empty() {
            return source.to_string();
        }

        let production_target = match (self.config.mode, target) {
            (Mode::Production, Some(language)) => Some(language),
            _ => None,
        };

        let mut output = String::with_capacity(source.len());
        let mut cursor = 0;

        for tag in &tags {
            output.push_str(&source[cursor..tag.range.start]);
            let replacement = match production_target {
                Some(language) => self.production_content(template, tag, language),
                None => self.diagnostic_content(template, tag, target, tracker),
            };
            output.push_str(&replacement);
            cursor = tag.range.end;
        }
        output.push_str(&source[cursor..]);

        if production_target.is_none() {
            self.inject_import(&mut output);
        }

        output
    }

    fn production_content(
        &self,
        template: &Template,
        tag: &IncludeTag,
        language: Language,
    ) -> String {
        let fragment = self.resolver.fragment_path(Path::new(&template.relative), language);
        match self.lookup(&fragment, &tag.section) {
            Lookup::Found(Section::Content(text)) => text,
            _ => String::new(),
        }
    }

    fn diagnostic_content(
        &self,
        template: &Template,
        tag: &IncludeTag,
        target: Option<Language>,
        tracker: &mut Tracker,
    ) -> String {
        let languages = match target {
            Some(language) => vec![language],
            None => Language::ALL.to_vec(),
        };
        let show_diagnostics = !self.config.mode.is_production();

        let mut parts = Vec::new();
        for language in languages {
            if !template.applies_to(language) {
                continue;
            }

            let fragment = self.resolver.fragment_path(Path::new(&template.relative), language);
            tracker.referenced.insert(fragment.clone());

            let body = match self.lookup(&fragment, &tag.section) {
                Lookup::Found(Section::Content(text)) => text,
                Lookup::Found(Section::NotApplicable) => continue,
                gap => {
                    tracker.gaps.record(&template.relative, &tag.section, language);
                    if !show_diagnostics {
                        continue;
                    }
                    self.diagnostic_message(&gap, &fragment, &tag.section, language)
                }
            };

            parts.push(wrap(language, &body, tag.placement));
        }

        match tag.placement {
            Placement::Block => parts.join("\n\n"),
            Placement::Inline => parts.concat(),
        }
    }

    fn lookup(&self, fragment: &Path, section: &str) -> Lookup {
        if !fragment.is_file() {
            return Lookup::MissingFile;
        }

        match read_normalized(fragment) {
            Ok(text) => Lookup::Found(extract_section(&text, section)),
            Err(e) => {
                tracing::warn!("Error reading fragment: {}", e);
                Lookup::ReadFailed(e.to_string())
            }
        }
    }

    fn diagnostic_message(
        &self,
        lookup: &Lookup,
        fragment: &Path,
        section: &str,
        language: Language,
    ) -> String {
        let name = language.display_name();
        match lookup {
            Lookup::MissingFile => format!(
                "[DevMode] Documentation file for {} not found: {}",
                name,
                self.config.display(fragment)
            ),
            Lookup::ReadFailed(error) => format!("[Dev] Error reading file: {}", error),
            Lookup::Found(Section::Empty) => format!(
                "**[Dev] Section \"{}\" is empty in {} documentation.** {}",
                section, name, GAP_HINT
            ),
            Lookup::Found(_) => format!(
                "**[Dev] Section \"{}\" not found in {} documentation.** {}",
                section, name, GAP_HINT
            ),
        }
    }

    /// Insert the component import after the frontmatter block, unless the
    /// output already imports it.
    fn inject_import(&self, output: &mut String) {
        let import = &self.config.component_import;
        if output.contains(import.as_str()) {
            return;
        }

        let block_len = extract_frontmatter(output).block_len;
        if block_len == 0 {
            output.insert_str(0, &format!("{};\n\n", import));
        } else {
            output.insert_str(block_len, &format!("\n\n{};", import));
        }
    }
}

const GAP_HINT: &str =
    "Either mark the section explicitly as N/A for intentionally ignored, or fill in documentation.";

/// Wrap content in the per-language conditional-render element.
fn wrap(language: Language, body: &str, placement: Placement) -> String {
    match placement {
        Placement::Block => format!(
            "<Language language=\"{}\">\n\n{}\n\n</Language>",
            language.id(),
            body
        ),
        Placement::Inline => {
            format!("<Language language=\"{}\">{}</Language>", language.id(), body)
        }
    }
}
