use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clipper_core::{TimerToken, ToastController, ToastEffect, ToastKind, ToastTiming, ToastView};
use clipper_logging::{clip_debug, clip_warn};

use crate::{NavigationSource, SurfaceError, ToastSurface};

/// Async adapter around the pure [`ToastController`]: executes its effects
/// against the host surface and turns `Schedule` effects into tokio sleeps
/// that report back `timer_fired`.
///
/// Surface calls are best-effort; a failing surface is logged and ignored.
#[derive(Clone)]
pub struct Notifier {
    inner: Arc<NotifierInner>,
}

struct NotifierInner {
    controller: Mutex<ToastController>,
    surface: Arc<dyn ToastSurface>,
    hook_installed: AtomicBool,
}

impl Notifier {
    pub fn new(surface: Arc<dyn ToastSurface>, timing: ToastTiming) -> Self {
        Self {
            inner: Arc::new(NotifierInner {
                controller: Mutex::new(ToastController::new(timing)),
                surface,
                hook_installed: AtomicBool::new(false),
            }),
        }
    }

    pub fn timing(&self) -> ToastTiming {
        self.lock().timing()
    }

    pub fn begin_dispatch(&self) {
        self.lock().begin_dispatch();
    }

    /// Must run on a tokio runtime when `ttl` is set; the dismissal timer is
    /// a spawned sleep.
    pub fn show(&self, kind: ToastKind, message: impl Into<String>, ttl: Option<Duration>) {
        let effects = self.lock().show(kind, message, ttl);
        run_effects(&self.inner, effects);
    }

    pub fn clear(&self) {
        let effects = self.lock().clear();
        run_effects(&self.inner, effects);
    }

    /// Suppression never schedules anything, so this is safe to call from
    /// outside the runtime, e.g. a navigation hook on a host thread.
    pub fn suppress(&self) {
        let effects = self.lock().suppress();
        run_effects(&self.inner, effects);
    }

    pub fn exit_finished(&self) {
        let effects = self.lock().exit_finished();
        run_effects(&self.inner, effects);
    }

    /// Register the suppression hook on `source`, at most once per notifier
    /// no matter how often dispatches come through.
    pub fn install_navigation(&self, source: &dyn NavigationSource) {
        if self.inner.hook_installed.swap(true, Ordering::SeqCst) {
            return;
        }
        let inner = self.inner.clone();
        source.subscribe(Arc::new(move |event| {
            clip_debug!("navigation event {event:?}, suppressing toast");
            let effects = inner
                .controller
                .lock()
                .expect("toast controller lock")
                .suppress();
            run_effects(&inner, effects);
        }));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ToastController> {
        self.inner.controller.lock().expect("toast controller lock")
    }
}

fn run_effects(inner: &Arc<NotifierInner>, effects: Vec<ToastEffect>) {
    for effect in effects {
        match effect {
            ToastEffect::Render(view) => report(inner.surface.upsert(&view)),
            ToastEffect::BeginExit => report(inner.surface.begin_exit()),
            ToastEffect::Remove => report(inner.surface.remove()),
            ToastEffect::Schedule { token, delay } => schedule(inner.clone(), token, delay),
        }
    }
}

fn schedule(inner: Arc<NotifierInner>, token: TimerToken, delay: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let effects = inner
            .controller
            .lock()
            .expect("toast controller lock")
            .timer_fired(token);
        run_effects(&inner, effects);
    });
}

fn report(result: Result<(), SurfaceError>) {
    if let Err(err) = result {
        clip_warn!("toast surface call failed: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::NavigationEvent;
    use clipper_core::ToastKind;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum SurfaceCall {
        Upsert,
        BeginExit,
        Remove,
    }

    #[derive(Default)]
    struct RecordingSurface {
        calls: Mutex<Vec<SurfaceCall>>,
    }

    impl RecordingSurface {
        fn calls(&self) -> Vec<SurfaceCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ToastSurface for RecordingSurface {
        fn upsert(&self, _view: &ToastView) -> Result<(), SurfaceError> {
            self.calls.lock().unwrap().push(SurfaceCall::Upsert);
            Ok(())
        }

        fn begin_exit(&self) -> Result<(), SurfaceError> {
            self.calls.lock().unwrap().push(SurfaceCall::BeginExit);
            Ok(())
        }

        fn remove(&self) -> Result<(), SurfaceError> {
            self.calls.lock().unwrap().push(SurfaceCall::Remove);
            Ok(())
        }
    }

    #[derive(Default)]
    struct TestNavigationSource {
        hooks: Mutex<Vec<crate::NavigationHook>>,
    }

    impl TestNavigationSource {
        fn fire(&self, event: NavigationEvent) {
            for hook in self.hooks.lock().unwrap().iter() {
                hook(event);
            }
        }

        fn hook_count(&self) -> usize {
            self.hooks.lock().unwrap().len()
        }
    }

    impl NavigationSource for TestNavigationSource {
        fn subscribe(&self, hook: crate::NavigationHook) {
            self.hooks.lock().unwrap().push(hook);
        }
    }

    fn fast_timing() -> ToastTiming {
        ToastTiming {
            success_ttl: Duration::from_millis(10),
            warning_ttl: Duration::from_millis(10),
            error_ttl: Duration::from_millis(10),
            exit_fallback: Duration::from_millis(10),
        }
    }

    #[tokio::test]
    async fn timed_toast_runs_to_removal() {
        let surface = Arc::new(RecordingSurface::default());
        let notifier = Notifier::new(surface.clone(), fast_timing());

        notifier.show(ToastKind::Success, "Saved", Some(Duration::from_millis(10)));
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(
            surface.calls(),
            vec![SurfaceCall::Upsert, SurfaceCall::BeginExit, SurfaceCall::Remove]
        );
    }

    #[tokio::test]
    async fn clear_walks_through_the_exit_transition() {
        let surface = Arc::new(RecordingSurface::default());
        let notifier = Notifier::new(surface.clone(), fast_timing());

        notifier.show(ToastKind::Loading, "Capturing page...", None);
        notifier.clear();
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(
            surface.calls(),
            vec![SurfaceCall::Upsert, SurfaceCall::BeginExit, SurfaceCall::Remove]
        );
    }

    #[tokio::test]
    async fn early_exit_report_wins_over_the_guard() {
        let timing = ToastTiming {
            exit_fallback: Duration::from_millis(100),
            ..fast_timing()
        };
        let surface = Arc::new(RecordingSurface::default());
        let notifier = Notifier::new(surface.clone(), timing);

        notifier.show(ToastKind::Success, "Saved", Some(Duration::from_millis(10)));
        tokio::time::sleep(Duration::from_millis(50)).await;
        notifier.exit_finished();
        // Let the stale guard fire; it must not remove a second time.
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(
            surface.calls(),
            vec![SurfaceCall::Upsert, SurfaceCall::BeginExit, SurfaceCall::Remove]
        );
    }

    #[test]
    fn navigation_hook_installs_once_and_suppresses_off_runtime() {
        let surface = Arc::new(RecordingSurface::default());
        let notifier = Notifier::new(surface.clone(), ToastTiming::default());
        let source = TestNavigationSource::default();

        notifier.install_navigation(&source);
        notifier.install_navigation(&source);
        assert_eq!(source.hook_count(), 1);

        notifier.show(ToastKind::Loading, "Capturing page...", None);
        source.fire(NavigationEvent::ContinuousScroll);
        notifier.show(ToastKind::Error, "network error", None);

        assert_eq!(surface.calls(), vec![SurfaceCall::Upsert, SurfaceCall::Remove]);
    }
}
