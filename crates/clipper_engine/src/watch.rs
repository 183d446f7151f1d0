use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clipper_logging::clip_debug;

use crate::{NavigationEvent, NavigationHook, NavigationSource};

/// Reads the current location, or `None` when there is no page.
pub type LocationProbe = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// [`NavigationSource`] that detects location changes by polling a probe.
///
/// The poll loop starts once, on the first subscription, and runs for the
/// life of the process. Hooks subscribed later join the same loop.
pub struct LocationWatch {
    probe: LocationProbe,
    interval: Duration,
    hooks: Arc<Mutex<Vec<NavigationHook>>>,
    started: AtomicBool,
}

impl LocationWatch {
    pub fn new(probe: LocationProbe) -> Self {
        Self::with_interval(probe, Duration::from_millis(500))
    }

    pub fn with_interval(probe: LocationProbe, interval: Duration) -> Self {
        Self {
            probe,
            interval,
            hooks: Arc::new(Mutex::new(Vec::new())),
            started: AtomicBool::new(false),
        }
    }

    /// Must run on a tokio runtime; the poll loop is a spawned task.
    fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }
        let probe = self.probe.clone();
        let hooks = self.hooks.clone();
        let interval = self.interval;
        tokio::spawn(async move {
            let mut last = probe();
            loop {
                tokio::time::sleep(interval).await;
                let current = probe();
                if current != last {
                    clip_debug!("location changed: {last:?} -> {current:?}");
                    last = current;
                    for hook in hooks.lock().expect("navigation hooks lock").iter() {
                        hook(NavigationEvent::LocationChanged);
                    }
                }
            }
        });
    }
}

impl NavigationSource for LocationWatch {
    fn subscribe(&self, hook: NavigationHook) {
        self.hooks.lock().expect("navigation hooks lock").push(hook);
        self.start();
    }
}
