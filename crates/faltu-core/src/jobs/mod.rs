//! Tracking of long-running server-side jobs.
//!
//! This module provides:
//! - `JobSource`: the seam through which job status is fetched
//! - `JobPoller`: spawns a cancellable task that polls a job until it
//!   reaches a terminal state
//! - `PollHandle`: the subscriber side, yielding `PollEvent`s
//!
//! Fetches for one job are strictly sequential and spaced by a fixed
//! interval (5 seconds by default). Stopping or dropping the handle ends
//! the task at its next scheduling point.

pub mod poller;
pub mod source;

pub use poller::{JobPoller, PollEvent, PollHandle, DEFAULT_POLL_INTERVAL};
pub use source::JobSource;
