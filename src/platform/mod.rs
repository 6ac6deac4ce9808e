//! Platform abstraction layer
//!
//! Handles the host side of a session:
//! - Time/ticks (named periodic tasks)
//! - Input events (tilt samples, audio buffers) from any thread
//! - Visibility (pause/resume)
//! - Microphone acquisition and release

pub mod capture;
pub mod runtime;
pub mod scheduler;

pub use capture::{AudioCapture, CaptureError, NoMicrophone, SyntheticMic};
pub use runtime::{HostEvent, Runtime};
pub use scheduler::{Scheduler, TaskKind};
