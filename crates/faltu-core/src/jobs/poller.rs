use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, Stream};
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

use super::JobSource;
use crate::api::ApiError;
use crate::models::{JobId, JobState, JobStatus};

/// Delay between status fetches while a job is pending or processing
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Buffer size for the poll event channel.
/// Progress events are small and consumers drain them promptly.
const EVENT_BUFFER_SIZE: usize = 16;

#[derive(Debug)]
pub enum PollEvent<T> {
    /// The job is still pending or processing
    Progress(JobStatus),
    Completed(T),
    Failed(String),
    /// A fetch failed; polling has stopped
    Error(ApiError),
}

impl<T> PollEvent<T> {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollEvent::Progress(_))
    }
}

pub struct JobPoller<S> {
    source: Arc<S>,
    interval: Duration,
}

impl<S> Clone for JobPoller<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            interval: self.interval,
        }
    }
}

impl<S: JobSource + 'static> JobPoller<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn a polling task for `job_id`. The first fetch happens immediately.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self, job_id: JobId) -> PollHandle<S::Output> {
        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::channel(EVENT_BUFFER_SIZE);

        tokio::spawn(run_poll_loop(
            Arc::clone(&self.source),
            job_id.clone(),
            self.interval,
            tx,
            cancel.clone(),
        ));

        PollHandle {
            job_id,
            events: rx,
            _guard: cancel.clone().drop_guard(),
            cancel,
        }
    }
}

/// Body of the spawned polling task.
///
/// Cancellation is checked after each fetch resolves and while waiting for
/// the next one; an in-flight fetch is never aborted.
async fn run_poll_loop<S: JobSource>(
    source: Arc<S>,
    job_id: JobId,
    interval: Duration,
    tx: mpsc::Sender<PollEvent<S::Output>>,
    cancel: CancellationToken,
) {
    let mut fetches: u32 = 0;

    loop {
        fetches += 1;
        debug!(job_id = %job_id, fetch = fetches, "Fetching job status");
        let result = source.fetch_state(&job_id).await;

        if cancel.is_cancelled() {
            debug!(job_id = %job_id, "Poller stopped during fetch, discarding result");
            return;
        }

        let event = match result {
            Ok(JobState::Pending) => PollEvent::Progress(JobStatus::Pending),
            Ok(JobState::Processing) => PollEvent::Progress(JobStatus::Processing),
            Ok(JobState::Completed(output)) => PollEvent::Completed(output),
            Ok(JobState::Failed(message)) => PollEvent::Failed(message),
            Err(e) => {
                warn!(job_id = %job_id, error = %e, "Job status fetch failed, stopping poller");
                PollEvent::Error(e)
            }
        };
        let terminal = event.is_terminal();

        tokio::select! {
            _ = cancel.cancelled() => return,
            sent = tx.send(event) => {
                if sent.is_err() {
                    debug!(job_id = %job_id, "Subscriber gone, stopping poller");
                    return;
                }
            }
        }

        if terminal {
            info!(job_id = %job_id, fetches = fetches, "Job reached terminal state");
            return;
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(job_id = %job_id, "Poller stopped");
                return;
            }
            _ = tx.closed() => {
                debug!(job_id = %job_id, "Subscriber gone, stopping poller");
                return;
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }
}

/// Subscriber side of a running poller.
///
/// Dropping the handle stops the poller.
pub struct PollHandle<T> {
    job_id: JobId,
    events: mpsc::Receiver<PollEvent<T>>,
    cancel: CancellationToken,
    _guard: DropGuard,
}

impl<T: Send + 'static> PollHandle<T> {
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Stop scheduling further fetches. Idempotent.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// A token that stops this poller when cancelled, for wiring into
    /// shutdown signals.
    pub fn stop_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Next event, or `None` once the poller has finished or been stopped.
    pub async fn next(&mut self) -> Option<PollEvent<T>> {
        if self.cancel.is_cancelled() {
            return None;
        }
        tokio::select! {
            _ = self.cancel.cancelled() => None,
            event = self.events.recv() => event,
        }
    }

    /// Drive the poller to its terminal event, reporting progress along the way.
    /// Returns `None` if the poller was stopped first.
    pub async fn until_terminal<F>(mut self, mut on_progress: F) -> Option<PollEvent<T>>
    where
        F: FnMut(JobStatus),
    {
        while let Some(event) = self.next().await {
            match event {
                PollEvent::Progress(status) => on_progress(status),
                terminal => return Some(terminal),
            }
        }
        None
    }

    /// Adapt the handle into a `Stream` of events. Dropping the stream stops
    /// the poller.
    pub fn into_stream(self) -> impl Stream<Item = PollEvent<T>> {
        stream::unfold(self, |mut handle| async move {
            handle.next().await.map(|event| (event, handle))
        })
    }
}
