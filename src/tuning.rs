//! Game balance and tuning
//!
//! Every constant the session reads lives here so a host can load a JSON
//! override. Missing fields fall back to the reference defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// What the dolphin does at the arena edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EdgePolicy {
    /// Stop at the wall
    #[default]
    Clamp,
    /// Reappear on the opposite side
    Wrap,
}

/// Which collisions the post-start grace window suppresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ImmunityScope {
    /// Corals and orca alike
    #[default]
    All,
    /// Corals only; the orca can strike during the window
    ObstaclesOnly,
}

/// Errors raised while loading or validating tuning
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Game tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Sprites ===
    pub dolphin_size: (f32, f32),
    pub orca_size: (f32, f32),
    pub coral_size: (f32, f32),
    pub coral_count: usize,

    // === Movement ===
    pub tilt_sensitivity: f32,
    pub edge_policy: EdgePolicy,
    /// Orca step per pursuit tick at session start
    pub orca_step: f32,
    /// Fractional step increase per elapsed second (0 = constant speed)
    pub orca_speed_growth: f32,
    pub orca_max_step: f32,

    // === Collision ===
    pub dolphin_margin: f32,
    pub coral_margin: f32,
    /// Dolphin margin used against the orca
    pub dolphin_orca_margin: f32,
    pub orca_margin: f32,
    pub immunity_ms: u64,
    pub immunity_scope: ImmunityScope,

    // === Cadences (ms) ===
    pub elapsed_tick_ms: u64,
    pub reposition_ms: u64,
    pub duty_cycle_ms: u64,
    pub pursuit_tick_ms: u64,
    pub sound_sample_ms: u64,

    // === Scoring ===
    pub score_per_second: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            dolphin_size: DOLPHIN_SIZE,
            orca_size: ORCA_SIZE,
            coral_size: CORAL_SIZE,
            coral_count: CORAL_COUNT,

            tilt_sensitivity: TILT_SENSITIVITY,
            edge_policy: EdgePolicy::Clamp,
            orca_step: ORCA_STEP,
            orca_speed_growth: 0.0,
            orca_max_step: ORCA_MAX_STEP,

            dolphin_margin: DOLPHIN_MARGIN,
            coral_margin: CORAL_MARGIN,
            dolphin_orca_margin: DOLPHIN_MARGIN,
            orca_margin: ORCA_MARGIN,
            immunity_ms: IMMUNITY_MS,
            immunity_scope: ImmunityScope::All,

            elapsed_tick_ms: ELAPSED_TICK_MS,
            reposition_ms: REPOSITION_MS,
            duty_cycle_ms: DUTY_CYCLE_MS,
            pursuit_tick_ms: PURSUIT_TICK_MS,
            sound_sample_ms: SOUND_SAMPLE_MS,

            score_per_second: SCORE_PER_SECOND,
        }
    }
}

impl Tuning {
    /// Create tuning from a difficulty preset
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        let mut tuning = Self::default();
        tuning.apply_difficulty(difficulty);
        tuning
    }

    /// Apply a difficulty preset on top of the current values
    pub fn apply_difficulty(&mut self, difficulty: Difficulty) {
        match difficulty {
            Difficulty::Easy => {
                self.orca_step = 2.0;
                self.orca_speed_growth = 0.0;
                self.immunity_ms = 3_000;
                self.reposition_ms = 8_000;
            }
            Difficulty::Normal => {}
            Difficulty::Hard => {
                self.orca_speed_growth = 0.02;
                self.immunity_ms = 1_000;
                self.immunity_scope = ImmunityScope::ObstaclesOnly;
            }
        }
    }

    /// Parse tuning from JSON (missing fields keep their defaults)
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load tuning, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(e) => {
                log::warn!("Using default tuning ({})", e);
                Self::default()
            }
        }
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let sizes = [self.dolphin_size, self.orca_size, self.coral_size];
        if sizes.iter().any(|&(w, h)| !(w > 0.0 && h > 0.0)) {
            return Err(invalid("sprite size", "extents must be positive"));
        }
        if self.coral_count == 0 {
            return Err(invalid("coral_count", "need at least one coral"));
        }
        if !(self.tilt_sensitivity > 0.0) {
            return Err(invalid("tilt_sensitivity", "must be positive"));
        }
        if !(self.orca_step > 0.0) || self.orca_max_step < self.orca_step {
            return Err(invalid("orca_step", "must be positive and not above orca_max_step"));
        }
        if !(self.orca_speed_growth >= 0.0) {
            return Err(invalid("orca_speed_growth", "must not be negative"));
        }
        let margins = [
            self.dolphin_margin,
            self.coral_margin,
            self.dolphin_orca_margin,
            self.orca_margin,
        ];
        if margins.iter().any(|m| !(*m >= 0.0)) {
            return Err(invalid("margin", "must not be negative"));
        }
        let periods = [
            self.elapsed_tick_ms,
            self.reposition_ms,
            self.duty_cycle_ms,
            self.pursuit_tick_ms,
            self.sound_sample_ms,
        ];
        if periods.contains(&0) {
            return Err(invalid("period", "task periods must be non-zero"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &'static str) -> TuningError {
    TuningError::Invalid { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.orca_step, 3.0);
        assert_eq!(tuning.score_per_second, 5);
        assert_eq!(tuning.coral_count, 3);
    }

    #[test]
    fn test_difficulty_round_trip_names() {
        for d in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
            assert_eq!(Difficulty::from_str(d.as_str()), Some(d));
        }
        assert_eq!(Difficulty::from_str("nightmare"), None);
    }

    #[test]
    fn test_presets_validate() {
        for d in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
            assert!(Tuning::from_difficulty(d).validate().is_ok(), "{}", d.as_str());
        }
        let hard = Tuning::from_difficulty(Difficulty::Hard);
        assert!(hard.orca_speed_growth > 0.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "orca_step": 4.5, "edge_policy": "Wrap" }"#).unwrap();
        assert_eq!(tuning.orca_step, 4.5);
        assert_eq!(tuning.edge_policy, EdgePolicy::Wrap);
        assert_eq!(tuning.immunity_ms, IMMUNITY_MS);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = Tuning::from_json(r#"{ "pursuit_tick_ms": 0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "period", .. }));

        let err = Tuning::from_json(r#"{ "coral_count": 0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "coral_count", .. }));

        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let tuning = Tuning::load_or_default("/definitely/not/here.json");
        assert_eq!(tuning, Tuning::default());
    }
}
