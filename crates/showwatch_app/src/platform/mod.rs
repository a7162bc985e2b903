//! Process-level plumbing: configuration, logging, locking and the run itself.
mod app;
mod config;
mod lock;
mod logging;

pub use app::run_app;
