//! Collision detection between the dolphin and its hazards
//!
//! Both checks shave fixed margins off the right/bottom edges of each box
//! before the overlap test. Neither check mutates state; `tick` turns a hit
//! into the game-over transition.

use super::geometry::Rect;
use super::state::{Collision, GameState};
use crate::tuning::ImmunityScope;

/// Dolphin and coral boxes after margin shrink
pub fn coral_hitboxes(state: &GameState, index: usize) -> Option<(Rect, Rect)> {
    let coral = state.corals.get(index)?;
    let dolphin = state.dolphin.bounds().shrink_far_edges(state.tuning.dolphin_margin);
    let coral = coral.bounds().shrink_far_edges(state.tuning.coral_margin);
    Some((dolphin, coral))
}

/// Dolphin and orca boxes after margin shrink
pub fn orca_hitboxes(state: &GameState) -> (Rect, Rect) {
    let dolphin = state
        .dolphin
        .bounds()
        .shrink_far_edges(state.tuning.dolphin_orca_margin);
    let orca = state.orca.bounds().shrink_far_edges(state.tuning.orca_margin);
    (dolphin, orca)
}

/// First visible coral the dolphin overlaps
///
/// No-op outside Playing and while the grace window is open.
pub fn check_corals(state: &GameState) -> Option<Collision> {
    if !state.is_playing() || state.is_immune() {
        return None;
    }

    state
        .corals
        .iter()
        .enumerate()
        .filter(|(_, coral)| coral.is_visible())
        .find_map(|(index, _)| {
            let (dolphin, coral) = coral_hitboxes(state, index)?;
            dolphin
                .intersects(&coral)
                .then_some(Collision::Coral { index })
        })
}

/// Whether the orca has caught the dolphin
///
/// The grace window only applies here under [`ImmunityScope::All`].
pub fn check_orca(state: &GameState) -> Option<Collision> {
    if !state.is_playing() {
        return None;
    }
    if state.tuning.immunity_scope == ImmunityScope::All && state.is_immune() {
        return None;
    }

    let (dolphin, orca) = orca_hitboxes(state);
    dolphin.intersects(&orca).then_some(Collision::Orca)
}
