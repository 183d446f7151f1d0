use std::sync::Arc;

use clipper_core::{PageContext, ToastView};

/// Failure reported by a toast surface operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("toast surface error: {0}")]
pub struct SurfaceError(pub String);

/// Read access to the page a dispatch should capture.
#[async_trait::async_trait]
pub trait PageHost: Send + Sync {
    /// Snapshot the active page, or `None` when there is none to capture.
    async fn snapshot(&self) -> Option<PageContext>;
}

/// Rendering half of the toast: the host owns the actual widget, the engine
/// only tells it what the widget should do next.
pub trait ToastSurface: Send + Sync {
    fn upsert(&self, view: &ToastView) -> Result<(), SurfaceError>;
    fn begin_exit(&self) -> Result<(), SurfaceError>;
    fn remove(&self) -> Result<(), SurfaceError>;
}

/// Page lifecycle changes that invalidate any toast still on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationEvent {
    /// The location changed outright.
    LocationChanged,
    /// The page swapped its content in place, feed style.
    ContinuousScroll,
}

pub type NavigationHook = Arc<dyn Fn(NavigationEvent) + Send + Sync>;

/// Source of navigation events the host can observe.
pub trait NavigationSource: Send + Sync {
    fn subscribe(&self, hook: NavigationHook);
}
