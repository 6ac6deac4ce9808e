//! Session state and core simulation types
//!
//! Everything the handlers in `tick` mutate lives in [`GameState`]. Only one
//! owner ever holds it mutably.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::{Arena, Rect};
use crate::tuning::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Constructed, waiting for `start`
    Idle,
    /// Active gameplay
    Playing,
    /// Run ended, waiting for a reset
    GameOver,
}

/// What ended the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Collision {
    /// Dolphin swam into the coral at this index
    Coral { index: usize },
    /// Orca caught the dolphin
    Orca,
}

/// Terminal summary handed to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub score: u32,
    pub elapsed_secs: u32,
    pub cause: Collision,
}

/// Events emitted for the host (drained after each update)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Started,
    /// Pre-game countdown step (seconds left before start)
    Countdown { remaining: u32 },
    ImmunityEnded,
    MicToggled { active: bool },
    SoundSampled { level: f32, opacity: u8 },
    CoralsMoved,
    GameOver(GameSummary),
    Reset,
}

/// The player's dolphin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dolphin {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl Dolphin {
    pub fn bounds(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }
}

/// The hunting orca
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Orca {
    pub pos: Vec2,
    pub size: Vec2,
    /// Distance covered per pursuit tick
    pub speed: f32,
}

impl Orca {
    pub fn bounds(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }
}

/// A coral obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coral {
    pub pos: Vec2,
    pub size: Vec2,
    /// 0-255; 0 means invisible and harmless
    pub opacity: u8,
}

impl Coral {
    pub fn bounds(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.opacity > 0
    }
}

/// Sprite snapshot for drawing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteView {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub opacity: u8,
}

impl SpriteView {
    fn new(pos: Vec2, size: Vec2, opacity: u8) -> Self {
        Self {
            x: pos.x,
            y: pos.y,
            width: size.x,
            height: size.y,
            opacity,
        }
    }
}

/// Everything the presentation layer needs for one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderState {
    pub phase: GamePhase,
    pub dolphin: SpriteView,
    pub orca: SpriteView,
    pub corals: Vec<SpriteView>,
    /// Background overlay alpha
    pub darkness: u8,
    pub sound_level: Option<f32>,
    pub mic_active: bool,
    pub immune: bool,
    pub score: u32,
    pub elapsed_secs: u32,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub tuning: Tuning,
    pub arena: Arena,
    pub phase: GamePhase,
    /// Session clock (ms), set by the driver before each update
    pub clock_ms: u64,
    pub elapsed_secs: u32,
    /// Live mirror of `elapsed_secs * score_per_second`
    pub score: u32,
    /// Grace window flag, cleared by the one-shot expiry
    pub immune: bool,
    /// Clock value at which the grace window closes
    pub immune_until_ms: u64,
    pub mic_active: bool,
    /// Most recent sampled level (None until the first buffer)
    pub sound_level: Option<f32>,
    pub darkness: u8,
    pub dolphin: Dolphin,
    pub orca: Orca,
    pub corals: Vec<Coral>,
    /// Summary of the last finished run
    pub summary: Option<GameSummary>,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a session in the Idle phase
    pub fn new(arena: Arena, tuning: Tuning, seed: u64) -> Self {
        let dolphin_size = Vec2::from(tuning.dolphin_size);
        let orca_size = Vec2::from(tuning.orca_size);
        let coral_size = Vec2::from(tuning.coral_size);

        let corals = (0..tuning.coral_count)
            .map(|_| Coral {
                pos: Vec2::ZERO,
                size: coral_size,
                opacity: 0,
            })
            .collect();

        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            arena,
            phase: GamePhase::Idle,
            clock_ms: 0,
            elapsed_secs: 0,
            score: 0,
            immune: false,
            immune_until_ms: 0,
            mic_active: false,
            sound_level: None,
            darkness: 255,
            dolphin: Dolphin {
                pos: arena.centered(dolphin_size),
                size: dolphin_size,
            },
            orca: Orca {
                pos: Vec2::ZERO,
                size: orca_size,
                speed: tuning.orca_step,
            },
            corals,
            summary: None,
            events: Vec::new(),
            tuning,
        };

        state.scatter_corals();
        state
    }

    /// Points for a given number of survived seconds
    pub fn score_for(&self, elapsed_secs: u32) -> u32 {
        elapsed_secs.saturating_mul(self.tuning.score_per_second)
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Whether the grace window is still open at the current clock
    pub fn is_immune(&self) -> bool {
        self.immune && self.clock_ms < self.immune_until_ms
    }

    /// Open a fresh grace window starting now
    pub fn arm_immunity(&mut self) {
        self.immune = true;
        self.immune_until_ms = self.clock_ms + self.tuning.immunity_ms;
    }

    /// Remaining grace time (0 once closed)
    pub fn immunity_remaining_ms(&self) -> u64 {
        if self.immune {
            self.immune_until_ms.saturating_sub(self.clock_ms)
        } else {
            0
        }
    }

    /// Orca step for the current elapsed time
    pub fn orca_speed_for(&self, elapsed_secs: u32) -> f32 {
        let t = &self.tuning;
        let scaled = t.orca_step * (1.0 + t.orca_speed_growth * elapsed_secs as f32);
        scaled.min(t.orca_max_step)
    }

    /// Set every coral's opacity
    pub fn set_coral_opacity(&mut self, opacity: u8) {
        for coral in &mut self.corals {
            coral.opacity = opacity;
        }
    }

    /// Give every coral a uniformly random on-screen position
    pub fn scatter_corals(&mut self) {
        for coral in &mut self.corals {
            let max = self.arena.max_pos(coral.size);
            let x = if max.x > 0.0 {
                self.rng.random_range(0.0..=max.x)
            } else {
                0.0
            };
            let y = if max.y > 0.0 {
                self.rng.random_range(0.0..=max.y)
            } else {
                0.0
            };
            coral.pos = Vec2::new(x, y);
        }
    }

    /// Put the dolphin back in the middle and the orca in its corner
    pub fn reseed_positions(&mut self) {
        self.dolphin.pos = self.arena.centered(self.dolphin.size);
        self.orca.pos = Vec2::ZERO;
        self.orca.speed = self.orca_speed_for(0);
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Snapshot for the presentation layer
    pub fn render_state(&self) -> RenderState {
        RenderState {
            phase: self.phase,
            dolphin: SpriteView::new(self.dolphin.pos, self.dolphin.size, 255),
            orca: SpriteView::new(self.orca.pos, self.orca.size, 255),
            corals: self
                .corals
                .iter()
                .map(|c| SpriteView::new(c.pos, c.size, c.opacity))
                .collect(),
            darkness: self.darkness,
            sound_level: self.sound_level,
            mic_active: self.mic_active,
            immune: self.is_immune(),
            score: self.score,
            elapsed_secs: self.elapsed_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> Arena {
        Arena::new(1080.0, 1920.0)
    }

    #[test]
    fn test_new_session_is_idle_and_centered() {
        let state = GameState::new(arena(), Tuning::default(), 7);
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.corals.len(), 3);
        assert_eq!(state.orca.pos, Vec2::ZERO);
        let expected = arena().centered(state.dolphin.size);
        assert_eq!(state.dolphin.pos, expected);
        assert!(state.corals.iter().all(|c| !c.is_visible()));
    }

    #[test]
    fn test_corals_stay_on_screen() {
        let mut state = GameState::new(arena(), Tuning::default(), 1234);
        for _ in 0..200 {
            state.scatter_corals();
            for coral in &state.corals {
                let max = state.arena.max_pos(coral.size);
                assert!(coral.pos.x >= 0.0 && coral.pos.x <= max.x);
                assert!(coral.pos.y >= 0.0 && coral.pos.y <= max.y);
            }
        }
    }

    #[test]
    fn test_scatter_in_tiny_arena() {
        let mut state = GameState::new(Arena::new(10.0, 10.0), Tuning::default(), 3);
        state.scatter_corals();
        assert!(state.corals.iter().all(|c| c.pos == Vec2::ZERO));
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = GameState::new(arena(), Tuning::default(), 99);
        let b = GameState::new(arena(), Tuning::default(), 99);
        for (ca, cb) in a.corals.iter().zip(&b.corals) {
            assert_eq!(ca.pos, cb.pos);
        }
    }

    #[test]
    fn test_immunity_window() {
        let mut state = GameState::new(arena(), Tuning::default(), 1);
        state.clock_ms = 500;
        state.arm_immunity();
        assert_eq!(state.immune_until_ms, 2_500);
        state.clock_ms = 2_499;
        assert!(state.is_immune());
        assert_eq!(state.immunity_remaining_ms(), 1);
        state.clock_ms = 2_500;
        assert!(!state.is_immune());
    }

    #[test]
    fn test_orca_speed_growth_is_capped() {
        let mut tuning = Tuning::default();
        tuning.orca_speed_growth = 0.1;
        let state = GameState::new(arena(), tuning, 1);
        assert_eq!(state.orca_speed_for(0), 3.0);
        assert!((state.orca_speed_for(10) - 6.0).abs() < 1e-5);
        assert_eq!(state.orca_speed_for(1_000), state.tuning.orca_max_step);
    }

    #[test]
    fn test_render_state_serializes() {
        let state = GameState::new(arena(), Tuning::default(), 5);
        let json = serde_json::to_string(&state.render_state()).unwrap();
        assert!(json.contains("\"corals\""));
        assert!(json.contains("\"darkness\":255"));
    }
}
