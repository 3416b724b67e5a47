//! State module for tracking scrape task progress
//!
//! `TaskState` models the lifecycle of one fetch+extract task:
//! `Pending -> SlotAcquired -> Fetching -> Extracting -> Succeeded`, with a
//! jump to `Failed` allowed from any active state.

mod task_state;

pub use task_state::{TaskState, TaskTracker};
