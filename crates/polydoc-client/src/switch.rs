//! Choosing where to go when the reader picks another language.

use polydoc_mdx::Language;

use crate::availability::{AvailabilityCache, ManifestSource};
use crate::paths::{
    language_from_path_strict, language_home, manifest_path_from_url, replace_language_in_path,
};

/// Result of a language switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// Keep the current page
    Stay,

    /// Navigate to this URL
    Navigate(String),

    /// The page does not exist in the target language; offer its home page
    Unavailable { home: String },
}

/// Maps the current page to its counterpart in another language.
pub struct LanguageSwitcher<S> {
    base: String,
    cache: AvailabilityCache<S>,
}

impl<S: ManifestSource> LanguageSwitcher<S> {
    /// `base` is the site base URL with its trailing slash.
    pub fn new(base: impl Into<String>, cache: AvailabilityCache<S>) -> Self {
        Self {
            base: base.into(),
            cache,
        }
    }

    pub fn cache(&self) -> &AvailabilityCache<S> {
        &self.cache
    }

    /// Decide where a switch to `target` from `pathname` should lead.
    ///
    /// Pages outside any language tree stay put. Otherwise the same page in
    /// `target` is used when the manifest does not list it as missing.
    pub async fn switch(&self, pathname: &str, target: Language) -> SwitchOutcome {
        let Some(current) = language_from_path_strict(pathname, &self.base) else {
            return SwitchOutcome::Stay;
        };
        if current == target {
            return SwitchOutcome::Stay;
        }

        let target_url = replace_language_in_path(pathname, &self.base, target);
        let home = language_home(&self.base, target);
        if target_url == pathname {
            return SwitchOutcome::Navigate(home);
        }

        let page_path = manifest_path_from_url(pathname, &self.base);
        if self.cache.is_available(&page_path, target).await {
            SwitchOutcome::Navigate(target_url)
        } else {
            tracing::debug!("{} is not available in {}", page_path, target.display_name());
            SwitchOutcome::Unavailable { home }
        }
    }
}
