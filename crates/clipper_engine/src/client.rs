use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::{ClipError, ClipFailureKind, ClipRequest, SubmitOutcome};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub submit_timeout: Duration,
    pub health_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            submit_timeout: Duration::from_secs(20),
            health_timeout: Duration::from_millis(1500),
        }
    }
}

/// Acknowledgement body of a submit. Anything unreadable is treated as the
/// empty ack, so a backend that answers 2xx with garbage still counts as a
/// synchronous completion.
#[derive(Debug, Default, Deserialize)]
struct SubmitAck {
    #[serde(default)]
    task_id: Option<String>,
}

/// HTTP client for the local clip backend.
#[derive(Debug, Clone)]
pub struct ClipClient {
    base: String,
    client: reqwest::Client,
    settings: ClientSettings,
}

impl ClipClient {
    pub fn new(base_url: &str, settings: ClientSettings) -> Result<Self, ClipError> {
        let base = base_url.trim().trim_end_matches('/').to_string();
        Url::parse(&base)
            .map_err(|err| ClipError::new(ClipFailureKind::InvalidBaseUrl, err.to_string()))?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(|err| ClipError::new(ClipFailureKind::Network, err.to_string()))?;
        Ok(Self {
            base,
            client,
            settings,
        })
    }

    /// Submit one clip. A 2xx answer with a non-empty `task_id` means the
    /// backend queued the work; any other 2xx body means it already finished.
    pub async fn submit(&self, request: &ClipRequest) -> Result<SubmitOutcome, ClipError> {
        let response = self
            .client
            .post(format!("{}/api/clip", self.base))
            .timeout(self.settings.submit_timeout)
            .json(request)
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

        let bytes = response.bytes().await.map_err(|err| map_reqwest_error(err))?;
        let ack = serde_json::from_slice::<SubmitAck>(&bytes).unwrap_or_default();
        match ack.task_id.filter(|task_id| !task_id.is_empty()) {
            Some(task_id) => Ok(SubmitOutcome::Queued { task_id }),
            None => Ok(SubmitOutcome::Completed),
        }
    }

    pub(crate) fn base(&self) -> &str {
        &self.base
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.client
    }

    /// Quick reachability probe against `/health`.
    pub async fn health(&self) -> bool {
        self.client
            .get(format!("{}/health", self.base))
            .timeout(self.settings.health_timeout)
            .send()
            .await
            .map(|response| response.status().is_success())
            .unwrap_or(false)
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ClipError {
    if err.is_timeout() {
        return ClipError::new(ClipFailureKind::Timeout, err.to_string());
    }
    ClipError::new(ClipFailureKind::Network, err.to_string())
}
