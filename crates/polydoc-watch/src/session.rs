//! Dispatch of watch events to the generator.

use std::path::{Path, PathBuf};

use tokio::sync::mpsc::Receiver;

use polydoc_gen::{GenerateError, Generator};

use crate::watcher::WatchEvent;

/// Errors that can occur in watch mode.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("File watch error: {0}")]
    Notify(#[from] notify::Error),

    #[error("Cannot resolve {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Generate(#[from] GenerateError),
}

/// Applies watch events to a generator, one at a time.
pub struct WatchSession {
    generator: Generator,
}

impl WatchSession {
    /// Wrap a generator that has already completed a full run.
    pub fn new(generator: Generator) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    /// Handle one event, then rewrite the manifests.
    pub fn handle(&mut self, event: &WatchEvent) -> Result<(), WatchError> {
        match event {
            WatchEvent::TemplateChanged(path) if path.is_file() => {
                let written = self.generator.generate_template(path)?;
                tracing::info!(
                    "Regenerated {} ({} file(s))",
                    self.display(path),
                    written
                );
            }
            WatchEvent::TemplateChanged(path) | WatchEvent::TemplateRemoved(path) => {
                let removed = self.generator.remove_template(path)?;
                tracing::info!(
                    "Template {} removed ({} generated file(s) deleted)",
                    self.display(path),
                    removed
                );
            }
            WatchEvent::FragmentChanged(path) => {
                let Some(template) = self.generator.resolver().owning_template(path) else {
                    tracing::warn!("No template found for {}", self.display(path));
                    return Ok(());
                };
                let written = self.generator.generate_template(&template)?;
                tracing::info!(
                    "Regenerated {} for {} ({} file(s))",
                    self.display(&template),
                    self.display(path),
                    written
                );
            }
            WatchEvent::CategoryChanged(path) => {
                let copied = self.generator.copy_categories()?;
                tracing::info!(
                    "Copied category metadata after change to {} ({} file(s))",
                    self.display(path),
                    copied
                );
            }
        }

        self.generator.write_manifests()?;
        Ok(())
    }

    /// Handle events until the channel closes. Failures are logged and the
    /// session keeps running.
    pub async fn run(mut self, mut events: Receiver<WatchEvent>) {
        while let Some(event) = events.recv().await {
            tracing::debug!("Change detected: {:?}", event);
            if let Err(e) = self.handle(&event) {
                tracing::error!(
                    "Failed to handle change to {}: {}",
                    self.display(event.path()),
                    e
                );
            }
        }
    }

    fn display(&self, path: &Path) -> String {
        self.generator.config().display(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polydoc_gen::GeneratorConfig;
    use polydoc_mdx::Language;
    use crate::watcher::FileWatcher;
    use std::fs;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::{tempdir, TempDir};

    fn session() -> (TempDir, GeneratorConfig, WatchSession) {
        let temp = tempdir().unwrap();
        let config = GeneratorConfig::rooted_at(temp.path());
        fs::create_dir_all(config.templates_dir.join("guide")).unwrap();
        fs::write(
            config.templates_dir.join("guide/setup.mdx"),
            "# Setup\n\n<LanguageInclude section=\"Install\" />\n",
        )
        .unwrap();

        let mut generator = Generator::new(config.clone());
        generator.generate_all().unwrap();
        (temp, config, WatchSession::new(generator))
    }

    fn output(config: &GeneratorConfig, language: Language) -> PathBuf {
        config.language_dir(language).join("guide/setup.mdx")
    }

    #[test]
    fn fragment_change_regenerates_owning_template() {
        let (_temp, config, mut session) = session();
        assert!(session
            .generator()
            .content_gaps()
            .get("guide/setup.mdx", "Install")
            .is_some());

        let fragment = config.fragments_dir.join("guide/setup/python.incl.md");
        fs::create_dir_all(fragment.parent().unwrap()).unwrap();
        fs::write(&fragment, "<!-- Install -->\npip install teams\n").unwrap();

        session
            .handle(&WatchEvent::FragmentChanged(fragment))
            .unwrap();

        let python = fs::read_to_string(output(&config, Language::Python)).unwrap();
        assert!(python.contains("pip install teams"));
        assert_eq!(
            session
                .generator()
                .content_gaps()
                .get("guide/setup.mdx", "Install"),
            Some(&[Language::TypeScript, Language::CSharp][..])
        );
        let manifest = fs::read_to_string(config.content_gaps_path()).unwrap();
        assert!(!manifest.contains("python"));
    }

    #[test]
    fn template_change_updates_missing_pages() {
        let (_temp, config, mut session) = session();
        let template = config.templates_dir.join("guide/setup.mdx");
        fs::write(
            &template,
            "---\nlanguages: [csharp]\n---\n<LanguageInclude section=\"Install\" />\n",
        )
        .unwrap();

        session
            .handle(&WatchEvent::TemplateChanged(template))
            .unwrap();

        let missing = fs::read_to_string(config.missing_pages_path()).unwrap();
        assert_eq!(
            missing,
            "{\n  \"guide/setup\": [\n    \"typescript\",\n    \"python\"\n  ]\n}\n"
        );
        assert!(output(&config, Language::CSharp).exists());
        assert!(!output(&config, Language::TypeScript).exists());
        assert!(!output(&config, Language::Python).exists());
    }

    #[test]
    fn template_removal_deletes_outputs() {
        let (_temp, config, mut session) = session();
        let template = config.templates_dir.join("guide/setup.mdx");
        fs::remove_file(&template).unwrap();

        session
            .handle(&WatchEvent::TemplateRemoved(template))
            .unwrap();

        for language in Language::ALL {
            assert!(!output(&config, language).exists());
        }
        assert!(session.generator().content_gaps().is_empty());
    }

    #[test]
    fn fragment_without_template_is_ignored() {
        let (_temp, config, mut session) = session();
        let fragment = config.fragments_dir.join("nowhere/python.incl.md");

        session
            .handle(&WatchEvent::FragmentChanged(fragment))
            .unwrap();
    }

    #[test]
    fn category_change_recopies_metadata() {
        let (_temp, config, mut session) = session();
        let category = config.templates_dir.join("guide/_category_.json");
        fs::write(&category, "{\"label\": \"Guide\"}").unwrap();

        session
            .handle(&WatchEvent::CategoryChanged(category))
            .unwrap();

        let copied = fs::read_to_string(
            config
                .language_dir(Language::CSharp)
                .join("guide/_category_.json"),
        )
        .unwrap();
        assert!(copied.contains("\"key\": \"csharp-guide\""));
    }

    #[tokio::test]
    async fn watched_changes_regenerate_with_default_directories() {
        let temp = tempdir().unwrap();
        let root = temp.path().canonicalize().unwrap();
        let previous_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(&root).unwrap();

        let config = GeneratorConfig::default();
        let template = config.templates_dir.join("guide/setup.mdx");
        fs::create_dir_all(template.parent().unwrap()).unwrap();
        fs::write(&template, "# Setup\n\n<LanguageInclude section=\"Install\" />\n").unwrap();
        let fragment_dir = config.fragments_dir.join("guide/setup");
        fs::create_dir_all(&fragment_dir).unwrap();

        let mut generator = Generator::new(config.clone());
        generator.generate_all().unwrap();
        let mut session = WatchSession::new(generator);

        let (watcher, mut rx) =
            FileWatcher::new(&config.templates_dir, &config.fragments_dir).unwrap();

        // Give inotify time to set up
        tokio::time::sleep(Duration::from_millis(100)).await;

        let template_source = "# Setup guide\n\n<LanguageInclude section=\"Install\" />\n";
        fs::write(&template, template_source).unwrap();
        fs::write(
            fragment_dir.join("python.incl.md"),
            "<!-- Install -->\npip install teams\n",
        )
        .unwrap();

        let mut template_seen = false;
        let mut fragment_seen = false;
        while !(template_seen && fragment_seen) {
            let event = tokio::time::timeout(Duration::from_secs(3), rx.recv())
                .await
                .expect("timeout waiting for file watch event")
                .expect("channel should not be closed");
            assert!(event.path().is_absolute());
            match &event {
                WatchEvent::TemplateChanged(_) => template_seen = true,
                WatchEvent::FragmentChanged(_) => fragment_seen = true,
                _ => {}
            }
            session.handle(&event).unwrap();
        }
        drop(watcher);

        let python = fs::read_to_string(root.join("docs/main/python/guide/setup.mdx")).unwrap();
        assert!(python.contains("# Setup guide"));
        assert!(python.contains("pip install teams"));
        assert_eq!(fs::read_to_string(&template).unwrap(), template_source);

        std::env::set_current_dir(previous_dir).unwrap();
    }
}
