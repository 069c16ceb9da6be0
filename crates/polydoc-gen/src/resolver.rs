//! Mapping between templates and their per-language fragment files.
//!
//! ```text
//! templates/foo/README.mdx  ->  include/foo/<language>.incl.md
//! templates/foo/bar.mdx     ->  include/foo/bar/<language>.incl.md
//! ```

use std::path::{Path, PathBuf};

use polydoc_mdx::Language;

use crate::config::GeneratorConfig;

/// File name suffix of fragment files.
pub const FRAGMENT_SUFFIX: &str = ".incl.md";

/// Template file extension.
pub const TEMPLATE_EXTENSION: &str = "mdx";

/// Stems that mark a template as a category index.
const CATEGORY_INDEX_STEMS: [&str; 2] = ["README", "index"];

/// Resolves fragment paths for templates and back.
#[derive(Debug, Clone)]
pub struct FragmentResolver {
    templates_dir: PathBuf,
    fragments_dir: PathBuf,
}

impl FragmentResolver {
    pub fn new(templates_dir: impl Into<PathBuf>, fragments_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
            fragments_dir: fragments_dir.into(),
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(&config.templates_dir, &config.fragments_dir)
    }

    /// Template path relative to the templates root, `None` for paths
    /// outside it.
    pub fn relative_template<'a>(&self, template: &'a Path) -> Option<&'a Path> {
        template.strip_prefix(&self.templates_dir).ok()
    }

    /// Expected fragment file in `language` for the template at `relative`
    /// (a path relative to the templates root).
    pub fn fragment_path(&self, relative: &Path, language: Language) -> PathBuf {
        let dir = relative.parent().unwrap_or(Path::new(""));
        let file_name = fragment_file_name(language);

        if is_category_index(relative) {
            self.fragments_dir.join(dir).join(file_name)
        } else {
            let stem = relative
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default();
            self.fragments_dir.join(dir).join(stem).join(file_name)
        }
    }

    /// Template that owns a fragment, if one exists on disk.
    ///
    /// The category index convention (`<dir>/README.mdx`, then
    /// `<dir>/index.mdx`) is tried before the page convention (`<dir>.mdx`).
    pub fn owning_template(&self, fragment: &Path) -> Option<PathBuf> {
        let dir = self.fragment_dir(fragment)?;
        let template_dir = self.templates_dir.join(&dir);

        let mut candidates: Vec<PathBuf> = CATEGORY_INDEX_STEMS
            .iter()
            .map(|stem| template_dir.join(format!("{stem}.{TEMPLATE_EXTENSION}")))
            .collect();
        if dir.components().next().is_some() {
            candidates.push(with_template_extension(&template_dir));
        }

        candidates.into_iter().find(|candidate| candidate.is_file())
    }

    /// Page template a fragment would belong to, without touching the disk.
    ///
    /// `foo/bar/python.incl.md` maps to `foo/bar.mdx`. Fragments at the
    /// fragments root have no page template.
    pub fn expected_template(&self, fragment: &Path) -> Option<PathBuf> {
        let dir = self.fragment_dir(fragment)?;
        if dir.components().next().is_none() {
            return None;
        }
        Some(with_template_extension(&self.templates_dir.join(dir)))
    }

    /// Directory of a fragment relative to the fragments root.
    fn fragment_dir(&self, fragment: &Path) -> Option<PathBuf> {
        let relative = fragment.strip_prefix(&self.fragments_dir).ok()?;
        Some(relative.parent().unwrap_or(Path::new("")).to_path_buf())
    }
}

/// `foo/bar` -> `foo/bar.mdx`, keeping any dots already in the name.
fn with_template_extension(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(TEMPLATE_EXTENSION);
    PathBuf::from(name)
}

/// `<language>.incl.md`
pub fn fragment_file_name(language: Language) -> String {
    format!("{}{}", language.id(), FRAGMENT_SUFFIX)
}

/// Language of a fragment file name, e.g. `python.incl.md`.
pub fn fragment_language(file_name: &str) -> Option<Language> {
    file_name
        .strip_suffix(FRAGMENT_SUFFIX)
        .and_then(Language::from_id)
}

/// Whether a path names a fragment file.
pub fn is_fragment(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(FRAGMENT_SUFFIX))
}

/// Whether a template is a category index (`README.mdx` or `index.mdx`).
pub fn is_category_index(template: &Path) -> bool {
    template
        .file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| CATEGORY_INDEX_STEMS.contains(&stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn resolver() -> FragmentResolver {
        FragmentResolver::new("/site/templates", "/site/include")
    }

    #[test]
    fn category_index_fragment_sits_beside_category() {
        let path = resolver().fragment_path(Path::new("foo/README.mdx"), Language::Python);

        assert_eq!(path, PathBuf::from("/site/include/foo/python.incl.md"));
    }

    #[test]
    fn page_fragment_is_nested() {
        let path = resolver().fragment_path(Path::new("foo/bar.mdx"), Language::CSharp);

        assert_eq!(path, PathBuf::from("/site/include/foo/bar/csharp.incl.md"));
    }

    #[test]
    fn relative_template_stays_inside_root() {
        let r = resolver();

        let relative = r
            .relative_template(Path::new("/site/templates/guide/index.mdx"))
            .unwrap();
        assert_eq!(relative, Path::new("guide/index.mdx"));
        assert_eq!(
            r.fragment_path(relative, Language::TypeScript),
            PathBuf::from("/site/include/guide/typescript.incl.md")
        );

        assert_eq!(r.relative_template(Path::new("/other/guide/index.mdx")), None);
        assert_eq!(r.relative_template(Path::new("templates/guide/index.mdx")), None);
    }

    #[test]
    fn root_page_template() {
        let path = resolver().fragment_path(Path::new("welcome.mdx"), Language::Python);

        assert_eq!(path, PathBuf::from("/site/include/welcome/python.incl.md"));
    }

    #[test]
    fn expected_template_for_orphans() {
        let r = resolver();

        assert_eq!(
            r.expected_template(Path::new("/site/include/foo/bar/python.incl.md")),
            Some(PathBuf::from("/site/templates/foo/bar.mdx"))
        );
        assert_eq!(
            r.expected_template(Path::new("/site/include/python.incl.md")),
            None
        );
        assert_eq!(r.expected_template(Path::new("/other/python.incl.md")), None);
    }

    #[test]
    fn owning_template_prefers_category_index() {
        let temp = tempdir().unwrap();
        let templates = temp.path().join("templates");
        let include = temp.path().join("include");
        fs::create_dir_all(templates.join("guide")).unwrap();
        fs::write(templates.join("guide/README.mdx"), "# Guide").unwrap();
        fs::write(templates.join("guide.mdx"), "# Page").unwrap();

        let r = FragmentResolver::new(&templates, &include);

        assert_eq!(
            r.owning_template(&include.join("guide/python.incl.md")),
            Some(templates.join("guide/README.mdx"))
        );
    }

    #[test]
    fn owning_template_falls_back_to_page() {
        let temp = tempdir().unwrap();
        let templates = temp.path().join("templates");
        let include = temp.path().join("include");
        fs::create_dir_all(templates.join("guide")).unwrap();
        fs::write(templates.join("guide/setup.mdx"), "# Setup").unwrap();

        let r = FragmentResolver::new(&templates, &include);

        assert_eq!(
            r.owning_template(&include.join("guide/setup/csharp.incl.md")),
            Some(templates.join("guide/setup.mdx"))
        );
        assert_eq!(r.owning_template(&include.join("guide/gone/csharp.incl.md")), None);
    }

    #[test]
    fn parses_fragment_names() {
        assert_eq!(fragment_language("python.incl.md"), Some(Language::Python));
        assert_eq!(fragment_language("ruby.incl.md"), None);
        assert_eq!(fragment_language("python.md"), None);
        assert!(is_fragment(Path::new("a/csharp.incl.md")));
        assert!(!is_fragment(Path::new("a/README.mdx")));
    }

    #[test]
    fn detects_category_index() {
        assert!(is_category_index(Path::new("a/README.mdx")));
        assert!(is_category_index(Path::new("index.mdx")));
        assert!(!is_category_index(Path::new("a/readme-notes.mdx")));
    }
}
