//! Generator configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use polydoc_mdx::normalize_path;

/// Which kind of output to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Wrap content per language and render diagnostics for gaps
    #[default]
    Development,

    /// Splice raw content for the target language only
    Production,
}

impl Mode {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Configuration for a generation run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Project root; diagnostics display paths relative to it
    pub root: PathBuf,

    /// Shared page templates (`*.mdx`, `_category_.json`)
    pub templates_dir: PathBuf,

    /// Per-language fragments (`<language>.incl.md`)
    pub fragments_dir: PathBuf,

    /// Output base; each language gets its own subdirectory
    pub docs_dir: PathBuf,

    /// Directory served as static assets (missing-pages manifest)
    pub static_dir: PathBuf,

    /// Directory for build diagnostics (content-gaps manifest and report)
    pub reports_dir: PathBuf,

    pub mode: Mode,

    /// Import line for the conditional-render component, without semicolon
    pub component_import: String,

    /// Command named in the auto-generation notice
    pub regenerate_command: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            templates_dir: PathBuf::from("src/pages/templates"),
            fragments_dir: PathBuf::from("src/components/include"),
            docs_dir: PathBuf::from("docs/main"),
            static_dir: PathBuf::from("static"),
            reports_dir: PathBuf::from("scripts/generated"),
            mode: Mode::Development,
            component_import: "import Language from '@site/src/components/Language'".to_string(),
            regenerate_command: "polydoc".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Configuration with every directory laid out under `root` using the
    /// default relative locations.
    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let defaults = Self::default();
        Self {
            templates_dir: root.join(&defaults.templates_dir),
            fragments_dir: root.join(&defaults.fragments_dir),
            docs_dir: root.join(&defaults.docs_dir),
            static_dir: root.join(&defaults.static_dir),
            reports_dir: root.join(&defaults.reports_dir),
            root,
            ..defaults
        }
    }

    /// Resolve every directory against the working directory.
    ///
    /// File watchers report absolute paths, so template and fragment
    /// lookups only match when the configured roots are absolute too.
    pub fn absolutized(self) -> Self {
        Self {
            root: absolute(self.root),
            templates_dir: absolute(self.templates_dir),
            fragments_dir: absolute(self.fragments_dir),
            docs_dir: absolute(self.docs_dir),
            static_dir: absolute(self.static_dir),
            reports_dir: absolute(self.reports_dir),
            ..self
        }
    }

    pub fn missing_pages_path(&self) -> PathBuf {
        self.static_dir.join("missing-pages.json")
    }

    pub fn content_gaps_path(&self) -> PathBuf {
        self.reports_dir.join("content-gaps.json")
    }

    pub fn content_gaps_report_path(&self) -> PathBuf {
        self.reports_dir.join("content-gaps.md")
    }

    /// Output directory for one language.
    pub fn language_dir(&self, language: polydoc_mdx::Language) -> PathBuf {
        self.docs_dir.join(language.id())
    }

    /// Forward-slash path relative to the project root, for messages.
    pub fn display(&self, path: &Path) -> String {
        normalize_path(path.strip_prefix(&self.root).unwrap_or(path))
    }
}

/// Absolute form of `path`, or `path` itself if the working directory is
/// unavailable.
fn absolute(path: PathBuf) -> PathBuf {
    match std::path::absolute(&path) {
        Ok(absolute) => absolute,
        Err(e) => {
            tracing::warn!("Cannot resolve {}: {}", path.display(), e);
            path
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polydoc_mdx::Language;

    #[test]
    fn rooted_layout() {
        let config = GeneratorConfig::rooted_at("/site");

        assert_eq!(
            config.templates_dir,
            PathBuf::from("/site/src/pages/templates")
        );
        assert_eq!(
            config.missing_pages_path(),
            PathBuf::from("/site/static/missing-pages.json")
        );
        assert_eq!(
            config.language_dir(Language::CSharp),
            PathBuf::from("/site/docs/main/csharp")
        );
        assert_eq!(config.mode, Mode::Development);
    }

    #[test]
    fn displays_relative_to_root() {
        let config = GeneratorConfig::rooted_at("/site");

        assert_eq!(
            config.display(Path::new("/site/src/components/include/a/python.incl.md")),
            "src/components/include/a/python.incl.md"
        );
        assert_eq!(config.display(Path::new("/elsewhere/x")), "/elsewhere/x");
    }

    #[test]
    fn absolutized_defaults_resolve_against_working_directory() {
        let cwd = std::env::current_dir().unwrap();

        let config = GeneratorConfig::default().absolutized();

        assert_eq!(config.root, cwd);
        assert_eq!(config.templates_dir, cwd.join("src/pages/templates"));
        assert_eq!(config.fragments_dir, cwd.join("src/components/include"));
        assert_eq!(
            config.display(&cwd.join("docs/main/python/index.mdx")),
            "docs/main/python/index.mdx"
        );
    }

    #[test]
    fn absolutized_keeps_absolute_directories() {
        let config = GeneratorConfig::rooted_at("/site").absolutized();

        assert_eq!(config.root, PathBuf::from("/site"));
        assert_eq!(config.docs_dir, PathBuf::from("/site/docs/main"));
    }
}
