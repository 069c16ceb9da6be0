//! Loaded page templates and the paths derived from them.

use std::path::{Path, PathBuf};

use polydoc_mdx::frontmatter::SUPPRESS_INCLUDE_WARNING_KEY;
use polydoc_mdx::{
    extract_frontmatter, normalize_path, read_normalized, Frontmatter, Language, SourceError,
};

/// Errors that can occur while loading a template.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("{0} is outside the templates directory")]
    OutsideRoot(PathBuf),
}

/// A page template read from the templates root.
#[derive(Debug, Clone)]
pub struct Template {
    /// Path on disk
    pub path: PathBuf,

    /// Forward-slash path relative to the templates root (manifest key)
    pub relative: String,

    /// Full source, line endings normalized
    pub source: String,

    /// Parsed frontmatter
    pub frontmatter: Frontmatter,
}

impl Template {
    /// Read a template from disk.
    ///
    /// `path` must lie under `templates_dir`; its output paths are derived
    /// from the part below that root.
    pub fn load(path: &Path, templates_dir: &Path) -> Result<Self, LoadError> {
        let relative = path
            .strip_prefix(templates_dir)
            .map_err(|_| LoadError::OutsideRoot(path.to_path_buf()))?;
        let source = read_normalized(path)?;
        Ok(Self::from_source(path, normalize_path(relative), source))
    }

    /// Build a template from in-memory source.
    pub fn from_source(
        path: impl Into<PathBuf>,
        relative: impl Into<String>,
        source: String,
    ) -> Self {
        let frontmatter = extract_frontmatter(&source).frontmatter;
        Self {
            path: path.into(),
            relative: relative.into(),
            source,
            frontmatter,
        }
    }

    /// Whether output should be generated for `language`.
    pub fn applies_to(&self, language: Language) -> bool {
        self.frontmatter.applies_to(language)
    }

    /// Whether the template opted out of the missing include tag warning.
    pub fn suppresses_include_warning(&self) -> bool {
        self.frontmatter.flag(SUPPRESS_INCLUDE_WARNING_KEY)
    }

    /// Key used in the missing-pages manifest.
    pub fn page_path(&self) -> String {
        page_path(&self.relative)
    }

    /// Generated file for `language` under `docs_dir`.
    pub fn output_path(&self, docs_dir: &Path, language: Language) -> PathBuf {
        output_path(&self.relative, docs_dir, language)
    }
}

/// Manifest page path for a relative template path.
///
/// `guide/setup.mdx` -> `guide/setup`, `guide/README.mdx` -> `guide`,
/// `README.mdx` -> `/`.
pub fn page_path(relative: &str) -> String {
    let without_ext = relative
        .strip_suffix(".mdx")
        .or_else(|| relative.strip_suffix(".md"))
        .unwrap_or(relative);
    let without_readme = without_ext.strip_suffix("README").unwrap_or(without_ext);
    let trimmed = without_readme.strip_suffix('/').unwrap_or(without_readme);

    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Generated file for a relative template path; `README.mdx` becomes
/// `index.mdx` so it renders as the category page.
pub fn output_path(relative: &str, docs_dir: &Path, language: Language) -> PathBuf {
    let relative = Path::new(relative);
    let dir = relative.parent().unwrap_or(Path::new(""));
    let file_name = match relative.file_name().and_then(|n| n.to_str()) {
        Some("README.mdx") => "index.mdx",
        Some(name) => name,
        None => "index.mdx",
    };

    docs_dir.join(language.id()).join(dir).join(file_name)
}
