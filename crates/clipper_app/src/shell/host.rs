use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Local;
use clipper_core::{PageContext, ToastKind, ToastView};
use clipper_engine::{PageHost, SurfaceError, ToastSurface};

/// Toast surface that renders as timestamped terminal lines.
pub struct TerminalSurface {
    rendered: AtomicBool,
    removed: AtomicBool,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self {
            rendered: AtomicBool::new(false),
            removed: AtomicBool::new(false),
        }
    }

    /// True once no toast is pending, i.e. nothing was ever rendered or the
    /// last rendered toast has been taken down again.
    pub fn settled(&self) -> bool {
        !self.rendered.load(Ordering::SeqCst) || self.removed.load(Ordering::SeqCst)
    }

    fn line(&self, text: &str) {
        println!("{} {}", Local::now().format("%H:%M:%S%.3f"), text);
    }
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastSurface for TerminalSurface {
    fn upsert(&self, view: &ToastView) -> Result<(), SurfaceError> {
        self.rendered.store(true, Ordering::SeqCst);
        self.removed.store(false, Ordering::SeqCst);
        let label = match view.kind {
            ToastKind::Loading => "[....]",
            ToastKind::Success => "[ OK ]",
            ToastKind::Warning => "[WARN]",
            ToastKind::Error => "[FAIL]",
        };
        self.line(&format!("{label} {}", view.message));
        Ok(())
    }

    // A terminal has no transition to play; the removal line is enough.
    fn begin_exit(&self) -> Result<(), SurfaceError> {
        Ok(())
    }

    fn remove(&self) -> Result<(), SurfaceError> {
        self.removed.store(true, Ordering::SeqCst);
        self.line("[ -- ] notification dismissed");
        Ok(())
    }
}

/// Page host over the command-line argument: the given URL stands in for
/// the active page, and no argument means there is no page at all.
pub struct ArgPageHost {
    context: Option<PageContext>,
}

impl ArgPageHost {
    pub fn new(page_url: Option<String>) -> Self {
        Self {
            context: page_url.map(PageContext::new),
        }
    }
}

#[async_trait::async_trait]
impl PageHost for ArgPageHost {
    async fn snapshot(&self) -> Option<PageContext> {
        self.context.clone()
    }
}
