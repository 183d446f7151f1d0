//! Terminal shell around the clip dispatcher.
mod app;
mod host;
mod logging;
mod settings;

pub use app::run;
