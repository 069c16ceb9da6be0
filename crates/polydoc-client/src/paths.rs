//! Language segments in site URLs.
//!
//! Language-scoped pages live at `<base><language>/<page>`, where `base` is
//! the site base URL including its trailing slash (e.g. `/teams-ai/`).

use polydoc_mdx::Language;

/// Language of a language-scoped path, or TypeScript for any other path.
pub fn language_from_path(pathname: &str, base: &str) -> Language {
    language_from_path_strict(pathname, base).unwrap_or_default()
}

/// Language of a language-scoped path, `None` for any other path.
pub fn language_from_path_strict(pathname: &str, base: &str) -> Option<Language> {
    split_language(pathname, base).map(|(language, _)| language)
}

/// Swap the language segment of a path.
///
/// The result always has a slash after the language, so
/// `/docs/python` becomes `/docs/csharp/`. Paths without a language segment
/// are returned unchanged.
pub fn replace_language_in_path(pathname: &str, base: &str, language: Language) -> String {
    match split_language(pathname, base) {
        Some((_, rest)) => format!("{}{}/{}", base, language.id(), rest),
        None => pathname.to_string(),
    }
}

/// Missing-pages manifest key for a URL path.
///
/// Drops the base URL and the first path segment (the language), then any
/// trailing slash; the language root maps to `/`.
pub fn manifest_path_from_url(pathname: &str, base: &str) -> String {
    let without_base = pathname.replacen(base, "", 1);
    let without_language = match without_base.find('/') {
        Some(index) if index > 0 => &without_base[index + 1..],
        _ => without_base.as_str(),
    };
    let trimmed = without_language
        .strip_suffix('/')
        .unwrap_or(without_language);

    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Landing page of a language, `<base><language>/`.
pub fn language_home(base: &str, language: Language) -> String {
    format!("{}{}/", base, language.id())
}

/// Split `<base><language>[/<rest>]` into the language and `rest`.
fn split_language<'a>(pathname: &'a str, base: &str) -> Option<(Language, &'a str)> {
    let after_base = pathname.strip_prefix(base)?;
    let (segment, rest) = match after_base.split_once('/') {
        Some((segment, rest)) => (segment, rest),
        None => (after_base, ""),
    };
    Language::from_id(segment).map(|language| (language, rest))
}
