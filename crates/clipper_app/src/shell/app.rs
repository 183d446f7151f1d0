use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clipper_core::ToastTiming;
use clipper_engine::{
    ClientSettings, DispatchEvent, DispatchHandle, DispatchOutcome, DispatcherConfig,
    LocationProbe, LocationWatch, NavigationSource, PollSettings,
};
use clipper_logging::{clip_error, clip_info, clip_warn};

use super::host::{ArgPageHost, TerminalSurface};
use super::logging::{self, LogDestination};
use super::settings;

const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(20);
/// Generous upper bound over submit timeout plus poll ceiling.
const OUTCOME_DEADLINE: Duration = Duration::from_secs(90);
const DISMISSAL_GRACE: Duration = Duration::from_secs(6);

pub fn run() -> ExitCode {
    logging::initialize(LogDestination::Both);

    let page_url = std::env::args().nth(1);
    if page_url.is_none() {
        clip_warn!("No page url given; dispatching without a page");
    }

    let settings = settings::load(Path::new("."));
    let backend_url = settings.normalized_backend_url();
    clip_info!("Dispatching against {}", backend_url);

    let surface = Arc::new(TerminalSurface::new());
    let navigation: Arc<dyn NavigationSource> =
        Arc::new(LocationWatch::new(location_probe(page_url.clone())));

    let config = DispatcherConfig {
        backend_url,
        capture: settings.capture(),
        client: ClientSettings::default(),
        poll: PollSettings::default(),
        timing: ToastTiming::default(),
        page_host: Arc::new(ArgPageHost::new(page_url)),
        surface: surface.clone(),
        navigation: Some(navigation),
    };

    let handle = match DispatchHandle::new(config) {
        Ok(handle) => handle,
        Err(err) => {
            clip_error!("Could not start the dispatcher: {}", err);
            return ExitCode::FAILURE;
        }
    };

    handle.probe_health();
    handle.clip();

    let code = match wait_for_outcome(&handle) {
        Some(DispatchOutcome::Saved { warning: None }) => ExitCode::SUCCESS,
        Some(DispatchOutcome::Saved {
            warning: Some(warning),
        }) => {
            clip_warn!("Saved with a warning: {}", warning);
            ExitCode::SUCCESS
        }
        Some(DispatchOutcome::Failed { reason }) => {
            clip_error!("Dispatch failed: {}", reason);
            ExitCode::FAILURE
        }
        None => {
            clip_error!("No dispatch outcome within {:?}", OUTCOME_DEADLINE);
            ExitCode::FAILURE
        }
    };

    // Let the toast play out before the process goes away.
    let deadline = Instant::now() + DISMISSAL_GRACE;
    while !surface.settled() && Instant::now() < deadline {
        thread::sleep(EVENT_POLL_INTERVAL);
    }

    code
}

fn wait_for_outcome(handle: &DispatchHandle) -> Option<DispatchOutcome> {
    let deadline = Instant::now() + OUTCOME_DEADLINE;
    while Instant::now() < deadline {
        while let Some(event) = handle.try_recv() {
            match event {
                DispatchEvent::HealthProbed { reachable: true } => {
                    clip_info!("Backend is reachable");
                }
                DispatchEvent::HealthProbed { reachable: false } => {
                    clip_warn!("Backend did not answer the health probe; is the server running?");
                }
                DispatchEvent::DispatchFinished { outcome } => return Some(outcome),
            }
        }
        thread::sleep(EVENT_POLL_INTERVAL);
    }
    None
}

/// The terminal shell has no real navigation; the probe pins the page the
/// process was started for.
fn location_probe(page_url: Option<String>) -> LocationProbe {
    Arc::new(move || page_url.clone())
}
