//! Watch mode.

use anyhow::{Context, Result};
use polydoc_gen::{Generator, GeneratorConfig};
use polydoc_watch::{FileWatcher, WatchSession};

/// Generate everything once, then regenerate on changes until interrupted.
pub async fn run(config: GeneratorConfig) -> Result<()> {
    let mut generator = Generator::new(config);
    generator
        .generate_all()
        .context("Initial generation failed")?;

    let config = generator.config();
    let (watcher, rx) = FileWatcher::new(&config.templates_dir, &config.fragments_dir)
        .context("Failed to start file watcher")?;

    tracing::info!(
        "Watching {} and {} for changes...",
        config.display(&config.templates_dir),
        config.display(&config.fragments_dir)
    );

    tokio::select! {
        _ = WatchSession::new(generator).run(rx) => {}
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for shutdown signal")?;
            tracing::info!("Stopping watch mode");
        }
    }

    drop(watcher);
    Ok(())
}
