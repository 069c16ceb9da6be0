//! Sidebar category metadata (`_category_.json`) for each language tree.

use std::path::Path;

use serde::Serialize;
use walkdir::WalkDir;

use polydoc_mdx::{normalize_path, read_normalized, Language};

use crate::config::GeneratorConfig;
use crate::generator::GenerateError;
use crate::manifest::write_json;

/// File name of category metadata.
pub const CATEGORY_FILE: &str = "_category_.json";

/// Root category written for each language directory.
#[derive(Debug, Clone, Serialize)]
struct RootCategory {
    label: String,
    position: f64,
    collapsible: bool,
    collapsed: bool,
}

/// Copy every `_category_.json` under the templates root into each language
/// tree, adding a `key` unique per language and directory.
///
/// Returns the number of files written. Malformed category files are skipped
/// with a warning.
pub fn copy_category_files(config: &GeneratorConfig) -> Result<usize, GenerateError> {
    let mut written = 0;

    for entry in WalkDir::new(&config.templates_dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() || entry.file_name() != CATEGORY_FILE {
            continue;
        }

        let relative_dir = path
            .parent()
            .and_then(|dir| dir.strip_prefix(&config.templates_dir).ok())
            .unwrap_or(Path::new(""));

        let Some(category) = read_category(path) else {
            continue;
        };

        for language in Language::ALL {
            let mut localized = category.clone();
            localized.insert(
                "key".to_string(),
                serde_json::Value::String(category_key(language, relative_dir)),
            );

            let target = config
                .language_dir(language)
                .join(relative_dir)
                .join(CATEGORY_FILE);
            write_json(&target, &localized)?;
            written += 1;
        }
    }

    Ok(written)
}

/// Write the top-level category of each language directory.
pub fn write_root_categories(config: &GeneratorConfig) -> Result<usize, GenerateError> {
    for language in Language::ALL {
        let category = RootCategory {
            label: format!("{} Guide", language.display_name()),
            position: language.sidebar_position(),
            collapsible: true,
            collapsed: false,
        };
        write_json(&config.language_dir(language).join(CATEGORY_FILE), &category)?;
    }

    Ok(Language::ALL.len())
}

/// `<language>-<dir with separators as dashes>`, or `<language>-root`.
pub fn category_key(language: Language, relative_dir: &Path) -> String {
    let dir = normalize_path(relative_dir).replace('/', "-");
    if dir.is_empty() {
        format!("{}-root", language.id())
    } else {
        format!("{}-{}", language.id(), dir)
    }
}

fn read_category(path: &Path) -> Option<serde_json::Map<String, serde_json::Value>> {
    let content = match read_normalized(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("Skipping category file: {}", e);
            return None;
        }
    };

    match serde_json::from_str::<serde_json::Value>(&content) {
        Ok(serde_json::Value::Object(map)) => Some(map),
        Ok(_) => {
            tracing::warn!("Skipping category file {}: not a JSON object", path.display());
            None
        }
        Err(e) => {
            tracing::warn!("Skipping malformed category file {}: {}", path.display(), e);
            None
        }
    }
}
