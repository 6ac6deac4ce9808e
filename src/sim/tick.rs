//! Session update handlers
//!
//! One handler per signal source. Every handler is a no-op unless the session
//! is Playing, and every mutation of [`GameState`] goes through here.

use glam::Vec2;

use super::amplitude::{darkness_for_level, opacity_for_level, sound_level};
use super::collision::{check_corals, check_orca};
use super::state::{Collision, GameEvent, GamePhase, GameState, GameSummary};
use crate::tuning::EdgePolicy;
use crate::{clamp_axis, wrap_axis};

/// A single update delivered to the session
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Accelerometer sample (two tilt axes)
    Tilt { x: f32, y: f32 },
    /// One block of captured microphone PCM
    AudioBuffer(Vec<i16>),
    ElapsedSecond,
    Reposition,
    DutyCycle,
    /// Player pressed "Start/Stop Listening"
    ToggleMic,
    PursuitStep,
    ImmunityExpired,
    Start,
    Reset,
}

/// Apply one command to the session
pub fn apply(state: &mut GameState, command: &Command) {
    match command {
        Command::Tilt { x, y } => on_tilt(state, *x, *y),
        Command::AudioBuffer(samples) => on_audio_buffer(state, samples),
        Command::ElapsedSecond => on_elapsed_second(state),
        Command::Reposition => on_reposition(state),
        Command::DutyCycle => on_duty_cycle(state),
        Command::ToggleMic => on_toggle_mic(state),
        Command::PursuitStep => on_pursuit_step(state),
        Command::ImmunityExpired => on_immunity_expired(state),
        Command::Start => start(state),
        Command::Reset => request_reset(state),
    }
}

/// Leave Idle and begin play
pub fn start(state: &mut GameState) {
    if state.phase != GamePhase::Idle {
        log::debug!("Ignoring start in {:?}", state.phase);
        return;
    }
    state.phase = GamePhase::Playing;
    state.arm_immunity();
    log::info!("Session started (seed {})", state.seed);
    state.emit(GameEvent::Started);
}

/// "Play again": zero counters, re-seed positions, re-arm immunity
pub fn request_reset(state: &mut GameState) {
    state.elapsed_secs = 0;
    state.score = 0;
    state.summary = None;
    state.phase = GamePhase::Playing;
    state.arm_immunity();

    state.reseed_positions();
    state.mic_active = false;
    state.sound_level = None;
    state.darkness = darkness_for_level(0.0);
    state.set_coral_opacity(0);
    state.scatter_corals();

    log::info!("Session reset");
    state.emit(GameEvent::Reset);
}

/// Steer the dolphin from a tilt sample, then check the corals
pub fn on_tilt(state: &mut GameState, tilt_x: f32, tilt_y: f32) {
    if !state.is_playing() {
        return;
    }
    if !(tilt_x.is_finite() && tilt_y.is_finite()) {
        log::debug!("Dropping non-finite tilt sample ({}, {})", tilt_x, tilt_y);
        return;
    }

    let sensitivity = state.tuning.tilt_sensitivity;
    // Lean right, swim left: x is inverted
    let moved = state.dolphin.pos + Vec2::new(-tilt_x, tilt_y) * sensitivity;
    let max = state.arena.max_pos(state.dolphin.size);

    state.dolphin.pos = match state.tuning.edge_policy {
        EdgePolicy::Clamp => Vec2::new(clamp_axis(moved.x, max.x), clamp_axis(moved.y, max.y)),
        EdgePolicy::Wrap => Vec2::new(wrap_axis(moved.x, max.x), wrap_axis(moved.y, max.y)),
    };

    if let Some(hit) = check_corals(state) {
        game_over(state, hit);
    }
}

/// Fold a microphone block into the coral opacity and the darkness overlay
pub fn on_audio_buffer(state: &mut GameState, samples: &[i16]) {
    if !state.is_playing() || !state.mic_active {
        return;
    }

    let level = sound_level(samples);
    let opacity = opacity_for_level(level);
    state.sound_level = Some(level);
    state.darkness = darkness_for_level(level);
    state.set_coral_opacity(opacity);

    log::debug!("Sound level {:.1} dB -> coral opacity {}", level, opacity);
    state.emit(GameEvent::SoundSampled { level, opacity });

    // Corals may have just appeared under the dolphin
    if let Some(hit) = check_corals(state) {
        game_over(state, hit);
    }
}

/// One second survived
pub fn on_elapsed_second(state: &mut GameState) {
    if !state.is_playing() {
        return;
    }
    state.elapsed_secs += 1;
    state.score = state.score_for(state.elapsed_secs);
    state.orca.speed = state.orca_speed_for(state.elapsed_secs);
}

/// Move every coral somewhere new
pub fn on_reposition(state: &mut GameState) {
    if !state.is_playing() {
        return;
    }
    state.scatter_corals();
    state.emit(GameEvent::CoralsMoved);

    if let Some(hit) = check_corals(state) {
        game_over(state, hit);
    }
}

/// Timed microphone flip
pub fn on_duty_cycle(state: &mut GameState) {
    flip_mic(state, "duty cycle");
}

/// Manual microphone flip, independent of the duty cycle
pub fn on_toggle_mic(state: &mut GameState) {
    flip_mic(state, "player");
}

/// Switching the mic off hides every coral
fn flip_mic(state: &mut GameState, source: &str) {
    if !state.is_playing() {
        return;
    }
    state.mic_active = !state.mic_active;
    if !state.mic_active {
        state.set_coral_opacity(0);
        state.sound_level = None;
    }
    log::info!(
        "Mic {} ({})",
        if state.mic_active { "ON" } else { "OFF" },
        source
    );
    state.emit(GameEvent::MicToggled {
        active: state.mic_active,
    });
}

/// Move the orca one step toward the dolphin, then check for a catch
pub fn on_pursuit_step(state: &mut GameState) {
    if !state.is_playing() {
        return;
    }

    let to_dolphin = state.dolphin.pos - state.orca.pos;
    // Coincident positions: no direction this tick
    if let Some(dir) = to_dolphin.try_normalize() {
        let moved = state.orca.pos + dir * state.orca.speed;
        let max = state.arena.max_pos(state.orca.size);
        state.orca.pos = Vec2::new(clamp_axis(moved.x, max.x), clamp_axis(moved.y, max.y));
    }

    if let Some(hit) = check_orca(state) {
        game_over(state, hit);
    }
}

/// Close the grace window
pub fn on_immunity_expired(state: &mut GameState) {
    if !state.immune {
        return;
    }
    state.immune = false;
    log::debug!("Immunity over at {} ms", state.clock_ms);
    state.emit(GameEvent::ImmunityEnded);
}

fn game_over(state: &mut GameState, cause: Collision) {
    let summary = GameSummary {
        score: state.score_for(state.elapsed_secs),
        elapsed_secs: state.elapsed_secs,
        cause,
    };
    state.phase = GamePhase::GameOver;
    state.score = summary.score;
    state.immune = false;
    state.summary = Some(summary);
    log::info!(
        "Game over ({:?}) after {}s, score {}",
        cause,
        summary.elapsed_secs,
        summary.score
    );
    state.emit(GameEvent::GameOver(summary));
}
