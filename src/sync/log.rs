/// Bounded, newest-first event log backing the dashboard log panel.
///
/// Every operator action and every fetch outcome produces one entry. The log
/// lives for the lifetime of the client and is capped: once the bound is
/// reached, the oldest entry is dropped for each new one. Entries are stored
/// newest-first, so index 0 is always the most recent.
use chrono::Local;

/// Default number of entries retained when no capacity is configured.
pub const DEFAULT_CAPACITY: usize = 100;

// ---------------------------------------------------------------------------
// Entry types
// ---------------------------------------------------------------------------

/// Severity of a log entry, mapped to a presentation style by the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A single timestamped entry in the dashboard log.
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Local wall-clock time of day (`HH:MM:SS`).
    pub timestamp: String,
    pub message: String,
    pub severity: Severity,
}

// ---------------------------------------------------------------------------
// Event log
// ---------------------------------------------------------------------------

/// Bounded newest-first log.
#[derive(Debug)]
pub struct EventLog {
    entries: Vec<LogEntry>,
    capacity: usize,
}

impl EventLog {
    /// Create an empty log that retains at most `capacity` entries.
    ///
    /// A capacity of zero is treated as 1 so that the most recent entry is
    /// always observable.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Prepend a new entry, dropping the oldest entries beyond capacity.
    pub fn push(&mut self, message: impl Into<String>, severity: Severity) {
        let entry = LogEntry {
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            message: message.into(),
            severity,
        };
        self.entries.insert(0, entry);
        self.entries.truncate(self.capacity);
    }

    /// All retained entries, newest first.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// The most recent entry, if any.
    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
