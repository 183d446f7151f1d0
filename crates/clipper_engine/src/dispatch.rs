use std::sync::Arc;
use std::time::Duration;

use clipper_core::{resolve, ToastKind, ToastTiming};
use clipper_logging::{clip_debug, clip_info, clip_warn};

use crate::{
    CaptureSettings, ClientSettings, ClipClient, ClipError, ClipRequest, DispatchOutcome,
    NavigationSource, Notifier, PageHost, PollSettings, ProgressSink, SubmitOutcome, TaskPoller,
    TaskState, TerminalStatus, ToastSurface,
};

const MSG_NO_PAGE: &str = "no page context available to capture";
const MSG_SUBMITTING: &str = "Capturing page...";
const MSG_QUEUED: &str = "Queued at the backend...";
const MSG_PROCESSING: &str = "Processing...";
const MSG_SAVED: &str = "Saved";
const MSG_TIMED_OUT: &str = "timed out waiting for the backend to finish";

/// Everything a [`Dispatcher`] is wired with.
pub struct DispatcherConfig {
    pub backend_url: String,
    pub capture: CaptureSettings,
    pub client: ClientSettings,
    pub poll: PollSettings,
    pub timing: ToastTiming,
    pub page_host: Arc<dyn PageHost>,
    pub surface: Arc<dyn ToastSurface>,
    pub navigation: Option<Arc<dyn NavigationSource>>,
}

/// Runs the whole pipeline for one page: snapshot, resolve, submit, poll,
/// notify. Failures end in a transient toast and a `Failed` outcome; nothing
/// escapes to the caller.
pub struct Dispatcher {
    client: ClipClient,
    poller: TaskPoller,
    notifier: Notifier,
    capture: CaptureSettings,
    page_host: Arc<dyn PageHost>,
    navigation: Option<Arc<dyn NavigationSource>>,
}

impl Dispatcher {
    /// Validates the backend URL and builds the HTTP plumbing. Spawns
    /// nothing; the navigation hook is installed on the first dispatch.
    pub fn new(config: DispatcherConfig) -> Result<Self, ClipError> {
        let client = ClipClient::new(&config.backend_url, config.client)?;
        let poller = TaskPoller::new(&client, config.poll);
        let notifier = Notifier::new(config.surface, config.timing);
        Ok(Self {
            client,
            poller,
            notifier,
            capture: config.capture,
            page_host: config.page_host,
            navigation: config.navigation,
        })
    }

    pub async fn dispatch(&self) -> DispatchOutcome {
        if let Some(navigation) = &self.navigation {
            self.notifier.install_navigation(navigation.as_ref());
        }
        self.notifier.begin_dispatch();
        let timing = self.notifier.timing();

        let Some(context) = self.page_host.snapshot().await else {
            clip_warn!("dispatch requested without a page to capture");
            self.notifier
                .show(ToastKind::Error, MSG_NO_PAGE, Some(timing.error_ttl));
            return DispatchOutcome::Failed {
                reason: MSG_NO_PAGE.to_string(),
            };
        };

        let url = resolve(&context);
        clip_info!("dispatching clip for {url}");
        let request = ClipRequest::new(url, &self.capture);
        self.notifier.show(ToastKind::Loading, MSG_SUBMITTING, None);

        match self.client.submit(&request).await {
            Ok(SubmitOutcome::Completed) => self.conclude(TerminalStatus::Saved { warning: None }),
            Ok(SubmitOutcome::Queued { task_id }) => {
                clip_info!("clip queued as task {task_id}");
                let sink = StillWorkingSink {
                    notifier: &self.notifier,
                };
                let status = self.poller.poll(&task_id, &sink).await;
                self.conclude(status)
            }
            Err(err) => {
                clip_warn!("clip submission failed: {err}");
                self.notifier
                    .show(ToastKind::Error, err.to_string(), Some(timing.error_ttl));
                DispatchOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Backend reachability for a passive indicator.
    pub async fn health(&self) -> bool {
        self.client.health().await
    }

    fn conclude(&self, status: TerminalStatus) -> DispatchOutcome {
        let timing = self.notifier.timing();
        match status {
            TerminalStatus::Saved { warning: None } => {
                self.notifier
                    .show(ToastKind::Success, MSG_SAVED, Some(timing.success_ttl));
                DispatchOutcome::Saved { warning: None }
            }
            TerminalStatus::Saved {
                warning: Some(warning),
            } => {
                self.notifier.show(
                    ToastKind::Warning,
                    format!("Saved with a warning: {warning}"),
                    Some(timing.warning_ttl),
                );
                DispatchOutcome::Saved {
                    warning: Some(warning),
                }
            }
            TerminalStatus::Error { message } => {
                clip_warn!("clip task failed: {message}");
                self.notifier
                    .show(ToastKind::Error, message.clone(), Some(timing.error_ttl));
                DispatchOutcome::Failed { reason: message }
            }
            TerminalStatus::TimedOut => {
                clip_warn!("clip task timed out");
                self.notifier
                    .show(ToastKind::Error, MSG_TIMED_OUT, Some(timing.error_ttl));
                DispatchOutcome::Failed {
                    reason: MSG_TIMED_OUT.to_string(),
                }
            }
        }
    }
}

/// Keeps the loading toast fresh while the backend works.
struct StillWorkingSink<'a> {
    notifier: &'a Notifier,
}

impl ProgressSink for StillWorkingSink<'_> {
    fn still_working(&self, state: TaskState, elapsed: Duration) {
        clip_debug!("task still {state:?} after {elapsed:?}");
        let message = match state {
            TaskState::Queued => MSG_QUEUED,
            _ => MSG_PROCESSING,
        };
        self.notifier.show(ToastKind::Loading, message, None);
    }
}
