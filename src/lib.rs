//! Echolocation - a tilt-steered dolphin arcade core
//!
//! Core modules:
//! - `sim`: Session simulation (sound sampling, corals, orca, collisions, game state)
//! - `platform`: Host-facing driver (task scheduler, command queue, audio capture)
//! - `tuning`: Data-driven game balance

pub mod platform;
pub mod sim;
pub mod tuning;

pub use platform::{AudioCapture, CaptureError, HostEvent, Runtime, Scheduler, TaskKind};
pub use tuning::{Difficulty, EdgePolicy, ImmunityScope, Tuning, TuningError};

/// Reference gameplay constants (defaults for [`Tuning`])
pub mod consts {
    /// Tilt-to-pixel sensitivity for the dolphin
    pub const TILT_SENSITIVITY: f32 = 5.0;

    /// Sprite extents
    pub const DOLPHIN_SIZE: (f32, f32) = (120.0, 80.0);
    pub const ORCA_SIZE: (f32, f32) = (160.0, 100.0);
    pub const CORAL_SIZE: (f32, f32) = (110.0, 110.0);
    /// Number of corals in the field
    pub const CORAL_COUNT: usize = 3;

    /// Orca movement per pursuit tick
    pub const ORCA_STEP: f32 = 3.0;
    /// Upper bound for the orca step when speed growth is enabled
    pub const ORCA_MAX_STEP: f32 = 9.0;

    /// Collision margins (shaved off right/bottom edges)
    pub const DOLPHIN_MARGIN: f32 = 10.0;
    pub const CORAL_MARGIN: f32 = 20.0;
    pub const ORCA_MARGIN: f32 = 20.0;

    /// Periodic task cadences (milliseconds)
    pub const ELAPSED_TICK_MS: u64 = 1_000;
    pub const REPOSITION_MS: u64 = 5_000;
    pub const DUTY_CYCLE_MS: u64 = 10_000;
    pub const PURSUIT_TICK_MS: u64 = 50;
    pub const SOUND_SAMPLE_MS: u64 = 1_000;

    /// Grace period after start/reset
    pub const IMMUNITY_MS: u64 = 2_000;
    /// Points per elapsed second
    pub const SCORE_PER_SECOND: u32 = 5;

    /// Microphone capture format
    pub const SAMPLE_RATE: u32 = 44_100;
}

/// Clamp a coordinate to `[0, max]`, collapsing to 0 when the range is empty
#[inline]
pub fn clamp_axis(value: f32, max: f32) -> f32 {
    value.min(max).max(0.0)
}

/// Wrap a coordinate that left `[0, max]` to the opposite edge
#[inline]
pub fn wrap_axis(value: f32, max: f32) -> f32 {
    let max = max.max(0.0);
    if value < 0.0 {
        max
    } else if value > max {
        0.0
    } else {
        value
    }
}
