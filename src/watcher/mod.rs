//! Source file watching for `--watch`.
//!
//! The parent directory is watched rather than the file itself, since most
//! editors save by writing a new file and renaming it over the old one.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

/// Debounce used by the CLI.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// Reports debounced changes to one source file.
pub struct SourceWatcher {
    _watcher: RecommendedWatcher,
    events: Receiver<notify::Result<Event>>,
    directory: PathBuf,
    source: PathBuf,
    file_name: Option<OsString>,
    debounce: Duration,
    dirty_since: Option<Instant>,
}

impl SourceWatcher {
    /// Start watching `path`.
    ///
    /// # Errors
    /// Returns an error if the platform watcher cannot be created or the
    /// directory cannot be watched.
    pub fn new(path: impl AsRef<Path>, debounce: Duration) -> notify::Result<Self> {
        // Event paths are canonical; compare against canonical paths.
        let source = path
            .as_ref()
            .canonicalize()
            .unwrap_or_else(|_| path.as_ref().to_path_buf());
        let file_name = source.file_name().map(std::ffi::OsStr::to_os_string);
        let directory = parent_directory(&source);

        let (tx, events) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |event| {
            let _ = tx.send(event);
        })?;
        watcher.watch(&directory, RecursiveMode::NonRecursive)?;
        tracing::debug!(source = %source.display(), directory = %directory.display(), "watching");

        Ok(Self {
            _watcher: watcher,
            events,
            directory,
            source,
            file_name,
            debounce,
            dirty_since: None,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Drain pending events; true once a change has settled for the debounce period.
    pub fn poll(&mut self) -> bool {
        while let Ok(event) = self.events.try_recv() {
            self.record(event);
        }
        self.settled()
    }

    /// Block until a settled change, or until `timeout` passes.
    ///
    /// Returns false when the timeout expired or the watcher went away.
    pub fn wait_for_change(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.poll() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let wait = self
                .dirty_since
                .map_or(deadline - now, |since| {
                    (since + self.debounce).saturating_duration_since(now)
                })
                .min(deadline - now);
            match self.events.recv_timeout(wait) {
                Ok(event) => self.record(event),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return false,
            }
        }
    }

    fn record(&mut self, event: notify::Result<Event>) {
        match event {
            Ok(event) if self.concerns_source(&event) => {
                tracing::trace!(kind = ?event.kind, "source changed");
                self.dirty_since = Some(Instant::now());
            }
            Ok(event) => {
                tracing::trace!(kind = ?event.kind, paths = ?event.paths, "ignored event");
            }
            Err(err) => tracing::warn!(%err, "watch error"),
        }
    }

    fn settled(&mut self) -> bool {
        match self.dirty_since {
            Some(since) if since.elapsed() >= self.debounce => {
                self.dirty_since = None;
                true
            }
            _ => false,
        }
    }

    fn concerns_source(&self, event: &Event) -> bool {
        event.paths.iter().any(|path| {
            path == &self.directory
                || path == &self.source
                || self
                    .file_name
                    .as_ref()
                    .is_some_and(|name| path.file_name().is_some_and(|f| f == name))
        })
    }
}

fn parent_directory(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
