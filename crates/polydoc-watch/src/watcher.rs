//! File watching for templates, fragments and category metadata.

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::event::{ModifyKind, RenameMode};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

use polydoc_gen::category::CATEGORY_FILE;
use polydoc_gen::resolver::{is_fragment, TEMPLATE_EXTENSION};

use crate::session::WatchError;

/// Changes the watch session reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// Template was created or modified
    TemplateChanged(PathBuf),

    /// Template was deleted or renamed away
    TemplateRemoved(PathBuf),

    /// Fragment was created, modified or deleted
    FragmentChanged(PathBuf),

    /// `_category_.json` was created or modified
    CategoryChanged(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            Self::TemplateChanged(path)
            | Self::TemplateRemoved(path)
            | Self::FragmentChanged(path)
            | Self::CategoryChanged(path) => path,
        }
    }
}

/// Watches the templates and fragments roots.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Start watching both roots recursively.
    ///
    /// Returns the watcher and a channel to receive events. Every filesystem
    /// event is forwarded; nothing is debounced.
    pub fn new(
        templates_dir: &Path,
        fragments_dir: &Path,
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), WatchError> {
        let templates_dir = absolute(templates_dir)?;
        let fragments_dir = absolute(fragments_dir)?;
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    let _ = sync_tx.send(event);
                }
                Err(e) => tracing::warn!("Watch error: {}", e),
            }
        })?;

        for dir in [&templates_dir, &fragments_dir] {
            if dir.exists() {
                watcher.watch(dir, RecursiveMode::Recursive)?;
                tracing::debug!("Watching {}", dir.display());
            } else {
                tracing::warn!("Not watching missing directory {}", dir.display());
            }
        }

        std::thread::spawn(move || {
            while let Ok(event) = sync_rx.recv() {
                for path in &event.paths {
                    let Some(watch_event) = classify_event(path, &event.kind, &templates_dir)
                    else {
                        continue;
                    };
                    if async_tx.blocking_send(watch_event).is_err() {
                        return;
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Watched roots are absolute so event paths match the generator's
/// absolute configuration.
fn absolute(dir: &Path) -> Result<PathBuf, WatchError> {
    std::path::absolute(dir).map_err(|source| WatchError::Resolve {
        path: dir.to_path_buf(),
        source,
    })
}

/// Classify a notify event on one path.
///
/// Fragments are recognized anywhere; templates and category files only
/// under the templates root. Utility templates (`_` prefix) are ignored.
fn classify_event(path: &Path, kind: &EventKind, templates_dir: &Path) -> Option<WatchEvent> {
    let removed = match kind {
        EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(RenameMode::From)) => true,
        EventKind::Create(_) | EventKind::Modify(_) => false,
        _ => return None,
    };

    if is_fragment(path) {
        return Some(WatchEvent::FragmentChanged(path.to_path_buf()));
    }

    if !path.starts_with(templates_dir) {
        return None;
    }

    let name = path.file_name().and_then(|n| n.to_str())?;
    if name == CATEGORY_FILE {
        return (!removed).then(|| WatchEvent::CategoryChanged(path.to_path_buf()));
    }

    let is_template = !name.starts_with('_')
        && path.extension().and_then(|e| e.to_str()) == Some(TEMPLATE_EXTENSION);
    if !is_template {
        return None;
    }

    if removed {
        Some(WatchEvent::TemplateRemoved(path.to_path_buf()))
    } else {
        Some(WatchEvent::TemplateChanged(path.to_path_buf()))
    }
}
