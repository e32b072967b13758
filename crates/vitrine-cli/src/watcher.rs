//! Debounced file watcher for snippet files.
//!
//! Watches the snippet's directory non-recursively and reports debounced
//! events for the target file only.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify_debouncer_mini::{DebounceEventResult, new_debouncer, notify::RecursiveMode};
use tokio::sync::mpsc;

/// File change event.
#[derive(Debug, Clone)]
pub enum FileEvent {
    /// File was modified (or recreated).
    Modified(PathBuf),
    /// File was removed.
    Removed(PathBuf),
}

/// File watcher handle.
pub struct FileWatcher {
    /// Debouncer handle (kept alive to maintain watcher).
    _debouncer: notify_debouncer_mini::Debouncer<notify::RecommendedWatcher>,
    /// Receiver for file events.
    rx: mpsc::UnboundedReceiver<FileEvent>,
}

impl FileWatcher {
    /// Create a new watcher for the given snippet file.
    pub fn new(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let target = Arc::new(path.as_ref().to_path_buf());
        let watch_dir = target.parent().unwrap_or(Path::new(".")).to_path_buf();

        let (tx, rx) = mpsc::unbounded_channel();
        let filter = target.clone();

        let mut debouncer = new_debouncer(
            Duration::from_millis(200),
            move |result: DebounceEventResult| {
                if let Ok(events) = result {
                    for event in events {
                        if event.path != *filter {
                            continue;
                        }

                        let file_event = if event.path.exists() {
                            FileEvent::Modified(event.path.clone())
                        } else {
                            FileEvent::Removed(event.path.clone())
                        };

                        let _ = tx.send(file_event);
                    }
                }
            },
        )?;

        debouncer
            .watcher()
            .watch(&watch_dir, RecursiveMode::NonRecursive)?;

        Ok(Self {
            _debouncer: debouncer,
            rx,
        })
    }

    /// Receive the next file event.
    pub async fn recv(&mut self) -> Option<FileEvent> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn watcher_creation() {
        let temp = TempDir::new().unwrap();
        let snippet = temp.path().join("demo.vit");
        fs::write(&snippet, "<p>hi</p>").unwrap();

        let watcher = FileWatcher::new(&snippet);
        assert!(watcher.is_ok());
    }
}
