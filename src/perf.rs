//! Opt-in timing and the plugin event log.
//!
//! `--perf` prints each [`scope`] as it closes. `--debug-log PATH` opens an
//! event log that records every [`Event`] of the plugin lifecycle and toolbar
//! dispatch, plus scope timings, one line each.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{LazyLock, Mutex, MutexGuard};
use std::time::{Duration, Instant};

static TIMING: AtomicBool = AtomicBool::new(false);
static EVENT_LOG: LazyLock<Mutex<EventLog>> = LazyLock::new(|| Mutex::new(EventLog::closed()));

/// A plugin or toolbar occurrence worth recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'a> {
    ModuleLoaded { module: &'a str },
    ModuleFailed { module: &'a str, reason: &'a str },
    PluginSetUp { plugin: &'a str },
    SetupFailed { plugin: &'a str, reason: &'a str },
    MenuSwitched { plugin: &'a str, menu: &'a str },
    ActionRan { plugin: &'a str, action: &'a str },
    ActionAborted {
        plugin: &'a str,
        action: &'a str,
        reason: &'a str,
    },
}

impl Event<'_> {
    /// Stable tag written at the start of the log line.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ModuleLoaded { .. } => "module.loaded",
            Self::ModuleFailed { .. } => "module.failed",
            Self::PluginSetUp { .. } => "plugin.set_up",
            Self::SetupFailed { .. } => "plugin.setup_failed",
            Self::MenuSwitched { .. } => "menu.switched",
            Self::ActionRan { .. } => "action.ran",
            Self::ActionAborted { .. } => "action.aborted",
        }
    }
}

impl fmt::Display for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModuleLoaded { module } => write!(f, "{module}"),
            Self::PluginSetUp { plugin } => write!(f, "{plugin}"),
            Self::ModuleFailed { module: name, reason }
            | Self::SetupFailed {
                plugin: name,
                reason,
            } => write!(f, "{name} ({reason})"),
            Self::MenuSwitched { plugin, menu } => write!(f, "{plugin} -> {menu}"),
            Self::ActionRan { plugin, action } => write!(f, "{plugin}/{action}"),
            Self::ActionAborted {
                plugin,
                action,
                reason,
            } => write!(f, "{plugin}/{action} ({reason})"),
        }
    }
}

/// Times a region; reports on drop to stderr (`--perf`) and the event log.
#[derive(Debug)]
pub struct Scope {
    name: &'static str,
    start: Instant,
}

impl Drop for Scope {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        if is_enabled() {
            eprintln!("[perf] {}: {:.2} ms", self.name, millis(elapsed));
        }
        event_log().write_line(&format!("scope {}: {:.3} ms", self.name, millis(elapsed)));
    }
}

#[derive(Debug)]
struct EventLog {
    opened: Instant,
    writer: Option<BufWriter<File>>,
    written: usize,
}

impl EventLog {
    fn closed() -> Self {
        Self {
            opened: Instant::now(),
            writer: None,
            written: 0,
        }
    }

    fn write_line(&mut self, line: &str) {
        let at = millis(self.opened.elapsed());
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        // The log is best-effort; a failed write must not abort an action.
        if writeln!(writer, "[{at:>10.3} ms] {line}")
            .and_then(|()| writer.flush())
            .is_ok()
        {
            self.written += 1;
        }
    }
}

fn event_log() -> MutexGuard<'static, EventLog> {
    match EVENT_LOG.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn millis(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}

pub fn set_enabled(enabled: bool) {
    TIMING.store(enabled, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    TIMING.load(Ordering::Relaxed)
}

pub fn scope(name: &'static str) -> Scope {
    Scope {
        name,
        start: Instant::now(),
    }
}

/// Open the event log at `path`, or close it with `None`.
///
/// Closing writes a final line with the number of records.
///
/// # Errors
/// Fails when the log file cannot be created or written.
pub fn set_debug_log_path(path: Option<&Path>) -> std::io::Result<()> {
    let mut log = event_log();
    if log.writer.is_some() {
        let summary = format!("closed after {} records", log.written);
        log.write_line(&summary);
    }
    *log = EventLog::closed();
    if let Some(path) = path {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "markbar event log")?;
        writer.flush()?;
        log.writer = Some(writer);
    }
    Ok(())
}

pub fn is_debug_log_enabled() -> bool {
    event_log().writer.is_some()
}

/// Append `event` to the event log, if one is open.
pub fn record(event: Event<'_>) {
    let mut log = event_log();
    if log.writer.is_some() {
        log.write_line(&format!("{}: {event}", event.kind()));
    }
}
