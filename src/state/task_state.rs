/// Task state definitions for tracking one fetch+extract attempt
///
/// Each target of a scrape phase runs as one task moving forward through
/// these states. No task ever moves backwards.
use std::fmt;

/// Represents the current state of one scrape task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    // ===== Active States =====
    /// Task spawned, waiting for a concurrency slot
    Pending,

    /// Slot held, request not yet issued
    SlotAcquired,

    /// Request (and any retries) in flight
    Fetching,

    /// Body received, running the extractor
    Extracting,

    // ===== Terminal States =====
    /// Value extracted and handed to the collector
    Succeeded,

    /// Transport, status or parse failure
    Failed,
}

impl TaskState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Returns true while the task holds a concurrency slot
    pub fn holds_slot(&self) -> bool {
        matches!(self, Self::SlotAcquired | Self::Fetching | Self::Extracting)
    }

    /// Returns true if `next` is a legal successor of this state
    ///
    /// Any active state may fail. Success is only reachable from
    /// `Extracting`.
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        match (self, next) {
            (Self::Pending, Self::SlotAcquired) => true,
            (Self::SlotAcquired, Self::Fetching) => true,
            (Self::Fetching, Self::Extracting) => true,
            (Self::Extracting, Self::Succeeded) => true,
            (from, Self::Failed) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Short lowercase label used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::SlotAcquired => "slot_acquired",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tracks one task's state and rejects illegal moves
#[derive(Debug)]
pub struct TaskTracker {
    key: String,
    state: TaskState,
}

impl TaskTracker {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            state: TaskState::Pending,
        }
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Moves to `next`, logging the transition
    ///
    /// An illegal transition is logged and ignored; the tracker keeps its
    /// current state.
    pub fn advance(&mut self, next: TaskState) {
        if !self.state.can_transition_to(next) {
            tracing::warn!(
                "Ignoring invalid task transition for {}: {} -> {}",
                self.key,
                self.state,
                next
            );
            return;
        }
        tracing::trace!("Task {}: {} -> {}", self.key, self.state, next);
        self.state = next;
    }
}
