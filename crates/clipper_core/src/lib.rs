//! Clipper core: pure page snapshots, URL resolution, and toast state machine.
mod page;
mod resolve;
mod toast;

pub use page::PageContext;
pub use resolve::resolve;
pub use toast::{
    TimerToken, ToastController, ToastEffect, ToastKind, ToastTiming, ToastView,
};
