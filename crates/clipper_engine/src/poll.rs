use std::time::{Duration, Instant};

use crate::client::map_reqwest_error;
use crate::{ClipClient, ClipError, ClipFailureKind, TaskSnapshot, TaskState, TerminalStatus};

const UNREPORTED_ERROR: &str = "backend reported a failure without details";
const UNRECOGNIZED_STATUS: &str = "backend reported an unrecognized task status";

#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Pause between status queries.
    pub interval: Duration,
    /// Hard bound on the whole poll, hung requests included.
    pub ceiling: Duration,
    /// Per-request timeout of one status query.
    pub request_timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(900),
            ceiling: Duration::from_secs(60),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Observer called once per non-terminal status, before the poller suspends.
pub trait ProgressSink: Send + Sync {
    fn still_working(&self, state: TaskState, elapsed: Duration);
}

/// Re-queries one queued task until the backend settles it.
#[derive(Debug, Clone)]
pub struct TaskPoller {
    base: String,
    client: reqwest::Client,
    settings: PollSettings,
}

impl TaskPoller {
    /// Shares the submit client's connection pool and already-validated
    /// base URL; both talk to the same backend.
    pub fn new(client: &ClipClient, settings: PollSettings) -> Self {
        Self {
            base: client.base().to_string(),
            client: client.http().clone(),
            settings,
        }
    }

    /// Poll until the task is terminal. Any query failure is terminal too;
    /// the status endpoint is not retried. The ceiling converts a stuck
    /// backend, hung requests included, into `TimedOut`.
    pub async fn poll(&self, task_id: &str, sink: &dyn ProgressSink) -> TerminalStatus {
        match tokio::time::timeout(self.settings.ceiling, self.poll_inner(task_id, sink)).await {
            Ok(status) => status,
            Err(_) => TerminalStatus::TimedOut,
        }
    }

    async fn poll_inner(&self, task_id: &str, sink: &dyn ProgressSink) -> TerminalStatus {
        let started = Instant::now();
        loop {
            let snapshot = match self.query(task_id).await {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    return TerminalStatus::Error {
                        message: err.to_string(),
                    }
                }
            };
            match snapshot.status {
                TaskState::Saved => {
                    return TerminalStatus::Saved {
                        warning: snapshot.warning.filter(|warning| !warning.is_empty()),
                    }
                }
                TaskState::Error => {
                    return TerminalStatus::Error {
                        message: snapshot
                            .error
                            .filter(|message| !message.is_empty())
                            .unwrap_or_else(|| UNREPORTED_ERROR.to_string()),
                    }
                }
                // An unrecognized status means a backend this build does not
                // understand; stopping beats polling forever.
                TaskState::Unknown => {
                    return TerminalStatus::Error {
                        message: UNRECOGNIZED_STATUS.to_string(),
                    }
                }
                TaskState::Queued | TaskState::Processing => {
                    sink.still_working(snapshot.status, started.elapsed());
                    tokio::time::sleep(self.settings.interval).await;
                }
            }
        }
    }

    async fn query(&self, task_id: &str) -> Result<TaskSnapshot, ClipError> {
        let response = self
            .client
            .get(format!("{}/api/task/{}", self.base, task_id))
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(|err| map_reqwest_error(err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClipError::new(
                ClipFailureKind::BackendStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        response
            .json::<TaskSnapshot>()
            .await
            .map_err(|err| map_reqwest_error(err))
    }
}
