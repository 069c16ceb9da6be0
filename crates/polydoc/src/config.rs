//! Configuration file (`polydoc.toml`) and environment overrides.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use polydoc_gen::{GeneratorConfig, Mode};
use serde::Deserialize;

const CONFIG_FILE: &str = "polydoc.toml";

/// Environment variable selecting the generation mode.
const ENV_VAR: &str = "POLYDOC_ENV";

/// Configuration file structure (polydoc.toml).
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    paths: PathsConfig,
    #[serde(default)]
    generate: GenerateSettings,
}

#[derive(Debug, Deserialize, Default)]
struct PathsConfig {
    templates: Option<PathBuf>,
    fragments: Option<PathBuf>,
    docs: Option<PathBuf>,
    #[serde(rename = "static")]
    static_dir: Option<PathBuf>,
    reports: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
struct GenerateSettings {
    mode: Option<Mode>,
    component_import: Option<String>,
    regenerate_command: Option<String>,
}

/// Load `polydoc.toml` from the working directory if it exists, then apply
/// `POLYDOC_ENV`. Directories are resolved against the working directory.
pub fn load_config() -> Result<GeneratorConfig> {
    let env_mode = std::env::var(ENV_VAR).ok();
    Ok(load_config_from(Path::new(CONFIG_FILE), env_mode.as_deref())?.absolutized())
}

/// Returns an error if the config file exists but is malformed.
fn load_config_from(path: &Path, env_mode: Option<&str>) -> Result<GeneratorConfig> {
    let file_config = if path.exists() {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config: ConfigFile = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        tracing::info!("Loaded config from {}", path.display());
        config
    } else {
        ConfigFile::default()
    };

    let mut config = file_config.into_generator_config();
    if env_mode == Some("production") {
        config.mode = Mode::Production;
    }

    tracing::debug!("Generating in {:?} mode", config.mode);
    Ok(config)
}

impl ConfigFile {
    fn into_generator_config(self) -> GeneratorConfig {
        let defaults = GeneratorConfig::default();
        let paths = self.paths;
        let generate = self.generate;

        GeneratorConfig {
            templates_dir: paths.templates.unwrap_or(defaults.templates_dir),
            fragments_dir: paths.fragments.unwrap_or(defaults.fragments_dir),
            docs_dir: paths.docs.unwrap_or(defaults.docs_dir),
            static_dir: paths.static_dir.unwrap_or(defaults.static_dir),
            reports_dir: paths.reports.unwrap_or(defaults.reports_dir),
            mode: generate.mode.unwrap_or(defaults.mode),
            component_import: generate
                .component_import
                .unwrap_or(defaults.component_import),
            regenerate_command: generate
                .regenerate_command
                .unwrap_or(defaults.regenerate_command),
            root: defaults.root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_without_file() {
        let temp = tempdir().unwrap();

        let config = load_config_from(&temp.path().join(CONFIG_FILE), None).unwrap();

        assert_eq!(config.templates_dir, PathBuf::from("src/pages/templates"));
        assert_eq!(config.mode, Mode::Development);
    }

    #[test]
    fn reads_file_and_env_override() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"
[paths]
templates = "templates"
static = "public"

[generate]
regenerate_command = "make docs"
"#,
        )
        .unwrap();

        let config = load_config_from(&path, Some("production")).unwrap();

        assert_eq!(config.templates_dir, PathBuf::from("templates"));
        assert_eq!(config.static_dir, PathBuf::from("public"));
        assert_eq!(config.docs_dir, PathBuf::from("docs/main"));
        assert_eq!(config.regenerate_command, "make docs");
        assert_eq!(config.mode, Mode::Production);
    }

    #[test]
    fn file_mode_applies_without_env() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, "[generate]\nmode = \"production\"\n").unwrap();

        let config = load_config_from(&path, Some("development")).unwrap();

        assert_eq!(config.mode, Mode::Production);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, "[generate]\nmode = \"staging\"\n").unwrap();

        assert!(load_config_from(&path, None).is_err());
    }
}
