//! Clipper engine: backend client, task polling, and dispatch orchestration.
mod client;
mod dispatch;
mod handle;
mod host;
mod notify;
mod poll;
mod types;
mod watch;

pub use client::{ClientSettings, ClipClient};
pub use dispatch::{Dispatcher, DispatcherConfig};
pub use handle::{DispatchEvent, DispatchHandle};
pub use host::{
    NavigationEvent, NavigationHook, NavigationSource, PageHost, SurfaceError, ToastSurface,
};
pub use notify::Notifier;
pub use poll::{PollSettings, ProgressSink, TaskPoller};
pub use types::{
    CaptureMode, CaptureSettings, ClipError, ClipFailureKind, ClipRequest, DispatchOutcome,
    SubmitOutcome, TaskSnapshot, TaskState, TerminalStatus,
};
pub use watch::{LocationProbe, LocationWatch};
