//! Live plumbing around the steering core: landmark input, key injection,
//! preview window and the frame loop tying them together.

pub mod app;
pub mod config;
pub mod display;
pub mod guard;
pub mod injector;
#[cfg(feature = "preview")]
pub mod preview;
pub mod signal;
pub mod source;

pub use app::{run, RunSummary, StopReason};
pub use config::Config;
pub use display::{FrameDisplay, Headless};
pub use guard::KeyGuard;
pub use source::{DetectorProcess, JsonLinesSource, LandmarkSource};
