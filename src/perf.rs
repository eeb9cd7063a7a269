//! Timing scopes and the render trace log.
//!
//! The trace log records every layout decision the renderer makes (one line
//! per handler call) into a file, for debugging layout problems without
//! turning on global tracing output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{LazyLock, Mutex, MutexGuard};
use std::time::Instant;

static ENABLED: AtomicBool = AtomicBool::new(false);
static TRACE_LOG: LazyLock<Mutex<TraceLog>> = LazyLock::new(|| Mutex::new(TraceLog::new()));

/// Reports its lifetime on drop when timing is enabled.
#[derive(Debug)]
pub struct Scope {
    name: &'static str,
    start: Instant,
}

impl Drop for Scope {
    fn drop(&mut self) {
        if !is_enabled() {
            return;
        }
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        tracing::info!(target: "pagemark::perf", "{}: {:.2} ms", self.name, elapsed_ms);
        log_event("perf", format!("{}: {elapsed_ms:.2} ms", self.name));
    }
}

#[derive(Debug)]
struct TraceLog {
    start: Instant,
    writer: Option<BufWriter<File>>,
}

impl TraceLog {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            writer: None,
        }
    }
}

fn trace_log() -> MutexGuard<'static, TraceLog> {
    TRACE_LOG
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn scope(name: &'static str) -> Scope {
    Scope {
        name,
        start: Instant::now(),
    }
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// Start writing the trace log to `path`, or stop with `None`.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn set_trace_path(path: Option<&Path>) -> std::io::Result<()> {
    let mut log = trace_log();
    if let Some(path) = path {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "pagemark render trace start")?;
        writer.flush()?;
        log.start = Instant::now();
        log.writer = Some(writer);
    } else if let Some(mut writer) = log.writer.take() {
        writer.flush()?;
    }
    Ok(())
}

pub fn is_trace_enabled() -> bool {
    trace_log().writer.is_some()
}

/// Append one event to the trace log, if one is open.
pub fn log_event(name: &str, detail: impl AsRef<str>) {
    let mut log = trace_log();
    let elapsed_ms = log.start.elapsed().as_secs_f64() * 1000.0;
    if let Some(writer) = log.writer.as_mut() {
        let _ = writeln!(
            writer,
            "[{elapsed_ms:>10.3} ms] {name}: {}",
            detail.as_ref()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_set_enabled_toggles_runtime_flag() {
        set_enabled(true);
        assert!(is_enabled());

        set_enabled(false);
        assert!(!is_enabled());
    }

    #[test]
    fn test_trace_path_enables_logging_and_writes() {
        let temp_file = NamedTempFile::new().unwrap();
        set_trace_path(Some(temp_file.path())).unwrap();
        assert!(is_trace_enabled());
        log_event("Paragraph (entering)", "margins 28.35");
        set_trace_path(None).unwrap();
        assert!(!is_trace_enabled());

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("pagemark render trace start"));
        assert!(content.contains("Paragraph (entering): margins 28.35"));
    }
}
