//! One-shot generation.

use anyhow::{Context, Result};
use polydoc_gen::{Generator, GeneratorConfig};

/// Run a full generation.
pub fn run(config: GeneratorConfig) -> Result<()> {
    let result = Generator::new(config)
        .generate_all()
        .context("Generation failed")?;

    tracing::info!(
        "Wrote {} documents from {} templates in {}ms",
        result.files_written,
        result.templates,
        result.duration_ms
    );
    if result.templates_with_gaps > 0 {
        tracing::info!("{} template(s) have content gaps", result.templates_with_gaps);
    }

    Ok(())
}
