//! Session simulation module
//!
//! All gameplay logic lives here. This module must stay host-independent:
//! - Time arrives as discrete handler calls, never read from a wall clock
//! - Seeded RNG only
//! - Stable iteration order (corals by index)
//! - No rendering or platform dependencies

pub mod amplitude;
pub mod collision;
pub mod geometry;
pub mod state;
pub mod tick;

pub use amplitude::{darkness_for_level, opacity_for_level, sound_level};
pub use collision::{check_corals, check_orca};
pub use geometry::{Arena, Rect};
pub use state::{
    Collision, Coral, Dolphin, GameEvent, GamePhase, GameState, GameSummary, Orca, RenderState,
    SpriteView,
};
pub use tick::{Command, apply};
