//! Generation driver.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use walkdir::WalkDir;

use polydoc_mdx::{
    extract_frontmatter, has_include_tag, normalize_path, Language, LanguageAvailability,
};

use crate::category::{copy_category_files, write_root_categories, CATEGORY_FILE};
use crate::config::GeneratorConfig;
use crate::expander::{Expander, Tracker};
use crate::manifest::{write_json, ContentGaps};
use crate::render::Renderer;
use crate::resolver::{fragment_language, is_fragment, FragmentResolver, TEMPLATE_EXTENSION};
use crate::template::{self, Template};

/// Result of a full generation run.
#[derive(Debug)]
pub struct GenerateResult {
    /// Number of templates processed
    pub templates: usize,

    /// Number of documents written
    pub files_written: usize,

    /// Pages missing from at least one language
    pub missing_pages: usize,

    /// Templates with at least one content gap
    pub templates_with_gaps: usize,

    /// Total run time in milliseconds
    pub duration_ms: u64,
}

/// Errors that can occur during generation.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("Templates directory not found: {0}")]
    TemplatesNotFound(String),

    #[error("Failed to read: {0}")]
    ReadError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),

    #[error("Failed to serialize: {0}")]
    SerializeError(String),

    #[error("Failed to render template: {0}")]
    TemplateError(String),
}

/// A fragment no template referenced during the run.
#[derive(Debug, Clone, PartialEq)]
pub struct OrphanedFragment {
    pub path: PathBuf,

    /// Language parsed from the file name
    pub language: Option<Language>,

    /// Page template the fragment would belong to
    pub template: Option<PathBuf>,
}

/// Generates per-language documents from templates and fragments.
///
/// Holds the manifests of the current run so that single templates can be
/// regenerated (watch mode) without losing the other entries.
pub struct Generator {
    config: GeneratorConfig,
    resolver: FragmentResolver,
    renderer: Renderer,
    missing_pages: LanguageAvailability,
    tracker: Tracker,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        let config = config.absolutized();
        let resolver = FragmentResolver::from_config(&config);
        Self {
            config,
            resolver,
            renderer: Renderer::new(),
            missing_pages: LanguageAvailability::new(),
            tracker: Tracker::default(),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn resolver(&self) -> &FragmentResolver {
        &self.resolver
    }

    pub fn missing_pages(&self) -> &LanguageAvailability {
        &self.missing_pages
    }

    pub fn content_gaps(&self) -> &ContentGaps {
        &self.tracker.gaps
    }

    /// Regenerate everything: clean, expand every template, copy category
    /// metadata, report orphans (development only) and write the manifests.
    pub fn generate_all(&mut self) -> Result<GenerateResult, GenerateError> {
        let start = Instant::now();
        tracing::info!("Generating language-specific documentation...");

        let templates = self.discover_templates()?;

        let removed = self.clean_outputs()?;
        if removed == 0 {
            tracing::info!("No files to clean");
        } else {
            tracing::info!("Cleaned up {} file(s)", removed);
        }

        self.missing_pages.clear();
        self.tracker = Tracker::default();

        if templates.is_empty() {
            tracing::info!(
                "No template files found in {}",
                self.config.display(&self.config.templates_dir)
            );
        }

        let mut files_written = 0;
        for path in &templates {
            files_written += self.generate_template(path)?;
        }

        copy_category_files(&self.config)?;
        write_root_categories(&self.config)?;

        if !self.config.mode.is_production() {
            self.warn_orphaned_fragments();
        }

        self.write_manifests()?;

        tracing::info!(
            "Generated {} template(s) for {} languages",
            templates.len(),
            Language::ALL.len()
        );

        Ok(GenerateResult {
            templates: templates.len(),
            files_written,
            missing_pages: self.missing_pages.len(),
            templates_with_gaps: self.tracker.gaps.len(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Generate the documents of one template for every language it applies
    /// to, replacing its previous manifest entries.
    ///
    /// Returns the number of documents written. A template that cannot be
    /// read is skipped with a warning.
    pub fn generate_template(&mut self, path: &Path) -> Result<usize, GenerateError> {
        let template = match Template::load(path, &self.config.templates_dir) {
            Ok(template) => template,
            Err(e) => {
                tracing::warn!("Skipping template: {}", e);
                return Ok(0);
            }
        };

        let page_path = template.page_path();
        self.missing_pages.remove(&page_path);
        self.tracker.gaps.remove_template(&template.relative);

        if !template.suppresses_include_warning() && !has_include_tag(&template.source) {
            tracing::warn!(
                "Template \"{}\" does not contain <LanguageInclude /> tags. If the file is \
                 intended to be identical for all languages, add \
                 suppressLanguageIncludeWarning: true to its frontmatter",
                template.relative
            );
        }

        let mut missing = Vec::new();
        let mut written = 0;

        for language in Language::ALL {
            if !template.applies_to(language) {
                missing.push(language);
                self.remove_output(&template.output_path(&self.config.docs_dir, language))?;
                continue;
            }

            let expanded = Expander::new(&self.config, &self.resolver).expand(
                &template,
                Some(language),
                &mut self.tracker,
            );
            let document = self.render_document(&template, &expanded)?;

            let output_path = template.output_path(&self.config.docs_dir, language);
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| GenerateError::WriteError(e.to_string()))?;
            }
            fs::write(&output_path, document).map_err(|e| {
                GenerateError::WriteError(format!("{}: {}", output_path.display(), e))
            })?;
            tracing::debug!("Wrote {}", self.config.display(&output_path));
            written += 1;
        }

        if !missing.is_empty() {
            self.missing_pages.insert(page_path, missing);
        }

        Ok(written)
    }

    /// Delete the generated documents of a template that no longer exists.
    ///
    /// Paths outside the templates root have no documents and are ignored.
    pub fn remove_template(&mut self, path: &Path) -> Result<usize, GenerateError> {
        let Some(relative) = self.resolver.relative_template(path) else {
            tracing::warn!("Ignoring {}: outside the templates directory", path.display());
            return Ok(0);
        };
        let relative = normalize_path(relative);
        self.missing_pages.remove(&template::page_path(&relative));
        self.tracker.gaps.remove_template(&relative);

        let mut removed = 0;
        for language in Language::ALL {
            let output_path = template::output_path(&relative, &self.config.docs_dir, language);
            if self.remove_output(&output_path)? {
                removed += 1;
            }
        }

        Ok(removed)
    }

    /// Delete one generated document if it exists.
    fn remove_output(&self, output_path: &Path) -> Result<bool, GenerateError> {
        if !output_path.is_file() {
            return Ok(false);
        }
        fs::remove_file(output_path).map_err(|e| {
            GenerateError::WriteError(format!("{}: {}", output_path.display(), e))
        })?;
        tracing::info!("Removed {}", self.config.display(output_path));
        Ok(true)
    }

    /// Copy template category metadata into every language tree.
    pub fn copy_categories(&self) -> Result<usize, GenerateError> {
        copy_category_files(&self.config)
    }

    /// Persist the missing-pages manifest, the content-gaps manifest and its
    /// markdown report.
    pub fn write_manifests(&self) -> Result<(), GenerateError> {
        let missing_path = self.config.missing_pages_path();
        write_json(&missing_path, &self.missing_pages)?;
        tracing::info!(
            "Wrote missing pages manifest to {} ({} entries)",
            self.config.display(&missing_path),
            self.missing_pages.len()
        );

        let gaps_path = self.config.content_gaps_path();
        write_json(&gaps_path, &self.tracker.gaps)?;

        let report_path = self.config.content_gaps_report_path();
        let report = self
            .renderer
            .gaps_report(&self.tracker.gaps)
            .map_err(|e| GenerateError::TemplateError(e.to_string()))?;
        fs::write(&report_path, report).map_err(|e| {
            GenerateError::WriteError(format!("{}: {}", report_path.display(), e))
        })?;

        tracing::info!(
            "Wrote content gaps manifest to {} ({} templates with gaps)",
            self.config.display(&gaps_path),
            self.tracker.gaps.len()
        );

        Ok(())
    }

    /// Fragments that no template referenced since the last full run.
    pub fn orphaned_fragments(&self) -> Vec<OrphanedFragment> {
        if !self.config.fragments_dir.is_dir() {
            return Vec::new();
        }

        WalkDir::new(&self.config.fragments_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file() && is_fragment(entry.path()))
            .filter(|entry| !self.tracker.referenced.contains(entry.path()))
            .map(|entry| {
                let path = entry.into_path();
                OrphanedFragment {
                    language: path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .and_then(fragment_language),
                    template: self.resolver.expected_template(&path),
                    path,
                }
            })
            .collect()
    }

    fn warn_orphaned_fragments(&self) {
        let orphans = self.orphaned_fragments();
        if orphans.is_empty() {
            return;
        }

        tracing::warn!(
            "Orphaned include files were found. These files are not referenced by any template \
             (possibly due to 'languages' frontmatter restrictions):"
        );
        for orphan in orphans {
            tracing::warn!(
                "  - [{}] {} (template: {})",
                orphan.language.map_or("unknown", |l| l.id()),
                self.config.display(&orphan.path),
                orphan
                    .template
                    .as_deref()
                    .map_or_else(|| "(unknown)".to_string(), |t| self.config.display(t))
            );
        }
    }

    /// Assemble a generated document: frontmatter, notice, expanded body.
    fn render_document(
        &self,
        template: &Template,
        expanded: &str,
    ) -> Result<String, GenerateError> {
        let extracted = extract_frontmatter(expanded);
        let mut document = String::with_capacity(expanded.len() + 256);

        if extracted.has_frontmatter && !extracted.frontmatter.is_empty() {
            let yaml = extracted
                .frontmatter
                .to_yaml()
                .map_err(|e| GenerateError::SerializeError(e.to_string()))?;
            document.push_str("---\n");
            document.push_str(&yaml);
            document.push_str("---\n\n");
        }

        let notice = self
            .renderer
            .notice(
                &self.config.display(&template.path),
                &self.config.regenerate_command,
            )
            .map_err(|e| GenerateError::TemplateError(e.to_string()))?;
        document.push_str(&notice);
        document.push_str(extracted.body);

        Ok(document)
    }

    /// Remove generated documents and category files from every language
    /// tree, then prune directories left empty.
    fn clean_outputs(&self) -> Result<usize, GenerateError> {
        let mut removed = 0;

        for language in Language::ALL {
            let language_dir = self.config.language_dir(language);
            if !language_dir.is_dir() {
                continue;
            }

            for entry in WalkDir::new(&language_dir)
                .contents_first(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();

                if entry.file_type().is_dir() {
                    if path != language_dir {
                        // Fails for directories that still hold other files.
                        let _ = fs::remove_dir(path);
                    }
                    continue;
                }

                if is_generated(path) {
                    fs::remove_file(path).map_err(|e| {
                        GenerateError::WriteError(format!("{}: {}", path.display(), e))
                    })?;
                    removed += 1;
                }
            }
        }

        Ok(removed)
    }

    /// All `*.mdx` templates, skipping `_` prefixed utility templates, sorted
    /// by forward-slash path.
    fn discover_templates(&self) -> Result<Vec<PathBuf>, GenerateError> {
        let templates_dir = &self.config.templates_dir;
        if !templates_dir.is_dir() {
            tracing::error!("Templates directory not found: {}", templates_dir.display());
            return Err(GenerateError::TemplatesNotFound(
                templates_dir.display().to_string(),
            ));
        }

        let mut templates: Vec<PathBuf> = WalkDir::new(templates_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                let name = entry.file_name().to_string_lossy();
                !name.starts_with('_')
                    && entry.path().extension().and_then(|e| e.to_str()) == Some(TEMPLATE_EXTENSION)
            })
            .map(|entry| entry.into_path())
            .collect();

        templates.sort_by_cached_key(|path| normalize_path(path));
        Ok(templates)
    }
}

fn is_generated(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(TEMPLATE_EXTENSION)
        || path.file_name().and_then(|n| n.to_str()) == Some(CATEGORY_FILE)
}
