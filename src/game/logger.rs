//! Centralized duel logger
//!
//! Narration is the engine's only required presentation output: every rules
//! event produces a structured `LogEntry { kind, message, turn }`. The
//! logger can print to stdout, capture to an in-memory buffer (for tests
//! and embedding UIs), or both. A bump allocator backs message formatting
//! so hot paths avoid intermediate heap strings.

use bumpalo::Bump;
use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell};
use std::fmt;
use std::fmt::Write as FmtWrite;
use std::ops::Deref;

/// Verbosity level for duel output
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum VerbosityLevel {
    /// Silent - no output during the duel
    Silent = 0,
    /// Minimal - only the duel outcome
    Minimal = 1,
    /// Normal - turns, summons, battles, effects (default)
    #[default]
    Normal = 2,
    /// Verbose - draws and rejection chatter as well
    Verbose = 3,
}

/// Output destination for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputMode {
    /// Output only to stdout (default)
    #[default]
    Stdout,
    /// Capture only to the in-memory buffer (no stdout)
    Memory,
    /// Both stdout and the in-memory buffer
    Both,
}

/// Structured category of a narration entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogKind {
    TurnStart,
    TurnEnd,
    Draw,
    Summon,
    Attack,
    Damage,
    Destruction,
    Effect,
    System,
    Warning,
    DuelEnd,
}

impl LogKind {
    /// Verbosity at which entries of this kind are printed
    fn level(self) -> VerbosityLevel {
        match self {
            LogKind::DuelEnd => VerbosityLevel::Minimal,
            LogKind::Draw | LogKind::System => VerbosityLevel::Verbose,
            _ => VerbosityLevel::Normal,
        }
    }
}

/// One narration entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub kind: LogKind,
    pub message: String,
    /// Turn number the entry was produced on
    pub turn: u32,
}

/// Guard type providing read-only slice access to captured entries
pub struct LogGuard<'a> {
    guard: Ref<'a, Vec<LogEntry>>,
}

impl<'a> LogGuard<'a> {
    pub fn iter(&self) -> std::slice::Iter<'_, LogEntry> {
        self.guard.iter()
    }

    pub fn len(&self) -> usize {
        self.guard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard.is_empty()
    }
}

impl<'a> Deref for LogGuard<'a> {
    type Target = [LogEntry];

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

/// Centralized logger for duel narration
pub struct DuelLogger {
    verbosity: VerbosityLevel,
    output_mode: OutputMode,

    /// Bump allocator for temporary message formatting
    format_bump: RefCell<Bump>,

    /// Captured entries (owned strings)
    log_buffer: RefCell<Vec<LogEntry>>,
}

impl DuelLogger {
    pub fn new() -> Self {
        DuelLogger {
            verbosity: VerbosityLevel::default(),
            output_mode: OutputMode::default(),
            format_bump: RefCell::new(Bump::new()),
            log_buffer: RefCell::new(Vec::new()),
        }
    }

    pub fn with_verbosity(verbosity: VerbosityLevel) -> Self {
        DuelLogger {
            verbosity,
            ..DuelLogger::new()
        }
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: VerbosityLevel) {
        self.verbosity = verbosity;
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    pub fn set_output_mode(&mut self, mode: OutputMode) {
        self.output_mode = mode;
    }

    /// Record a narration entry
    pub fn log(&self, kind: LogKind, turn: u32, message: &str) {
        let should_capture = matches!(self.output_mode, OutputMode::Memory | OutputMode::Both);
        let should_output = matches!(self.output_mode, OutputMode::Stdout | OutputMode::Both);

        // Early exit if the message won't be used
        if kind.level() > self.verbosity && !should_capture {
            return;
        }

        if should_capture {
            self.log_buffer.borrow_mut().push(LogEntry {
                kind,
                message: message.to_string(),
                turn,
            });
        }

        if should_output && kind.level() <= self.verbosity {
            if kind.level() == VerbosityLevel::Minimal {
                println!("{message}");
            } else {
                println!("  {message}");
            }
        }
    }

    /// Record a narration entry from format arguments, assembling the
    /// message in the bump arena
    pub fn log_fmt(&self, kind: LogKind, turn: u32, args: fmt::Arguments<'_>) {
        let should_capture = matches!(self.output_mode, OutputMode::Memory | OutputMode::Both);
        if kind.level() > self.verbosity && !should_capture {
            return;
        }

        let mut bump = self.format_bump.borrow_mut();
        let mut scratch = bumpalo::collections::String::new_in(&bump);
        // Infallible for in-memory writers
        let _ = scratch.write_fmt(args);
        let message = scratch.as_str().to_string();
        drop(scratch);
        bump.reset();
        drop(bump);

        self.log(kind, turn, &message);
    }

    /// Read-only access to captured entries
    pub fn logs(&self) -> LogGuard<'_> {
        LogGuard {
            guard: self.log_buffer.borrow(),
        }
    }

    pub fn clear_logs(&mut self) {
        self.log_buffer.borrow_mut().clear();
        self.format_bump.borrow_mut().reset();
    }
}

impl Default for DuelLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DuelLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DuelLogger")
            .field("verbosity", &self.verbosity)
            .field("output_mode", &self.output_mode)
            .field("log_count", &self.log_buffer.borrow().len())
            .finish()
    }
}

impl Clone for DuelLogger {
    fn clone(&self) -> Self {
        DuelLogger {
            verbosity: self.verbosity,
            output_mode: self.output_mode,
            format_bump: RefCell::new(Bump::new()),
            log_buffer: RefCell::new(self.log_buffer.borrow().clone()),
        }
    }
}

impl Serialize for DuelLogger {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("DuelLogger", 2)?;
        state.serialize_field("verbosity", &self.verbosity)?;
        state.serialize_field("output_mode", &self.output_mode)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for DuelLogger {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct DuelLoggerData {
            verbosity: VerbosityLevel,
            output_mode: OutputMode,
        }

        let data = DuelLoggerData::deserialize(deserializer)?;
        Ok(DuelLogger {
            verbosity: data.verbosity,
            output_mode: data.output_mode,
            format_bump: RefCell::new(Bump::new()),
            log_buffer: RefCell::new(Vec::new()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_logger() -> DuelLogger {
        let mut logger = DuelLogger::new();
        logger.set_output_mode(OutputMode::Memory);
        logger
    }

    #[test]
    fn test_capture() {
        let logger = memory_logger();
        logger.log(LogKind::Summon, 3, "Alice summons Core Warden");

        let logs = logger.logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].kind, LogKind::Summon);
        assert_eq!(logs[0].turn, 3);
        assert!(logs[0].message.contains("Core Warden"));
    }

    #[test]
    fn test_capture_ignores_verbosity() {
        let mut logger = memory_logger();
        logger.set_verbosity(VerbosityLevel::Silent);
        logger.log(LogKind::Draw, 2, "Alice draws a card");
        assert_eq!(logger.logs().len(), 1);
    }

    #[test]
    fn test_log_fmt() {
        let logger = memory_logger();
        logger.log_fmt(
            LogKind::Damage,
            4,
            format_args!("{} takes {} damage", "Bob", 600),
        );
        assert_eq!(logger.logs()[0].message, "Bob takes 600 damage");
    }

    #[test]
    fn test_clone_keeps_entries() {
        let logger = memory_logger();
        logger.log(LogKind::System, 1, "hello");
        let cloned = logger.clone();
        assert_eq!(cloned.logs().len(), 1);
    }
}
