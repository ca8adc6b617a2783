//! Data-driven game balance
//!
//! Every gameplay constant lives here with a default from [`crate::consts`].
//! The browser build may override any subset through an inline JSON block.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Gameplay tuning values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Geometry ===
    pub play_area_width: f32,
    pub play_area_height: f32,
    pub player_width: f32,
    pub ball_size: f32,

    // === Movement ===
    pub player_speed: f32,
    pub move_repeat_ms: u32,
    pub fall_tick_ms: u32,
    pub ball_fall_step: f32,
    pub ball_drift: f32,

    // === Spawn progression ===
    pub initial_spawn_interval_ms: u32,
    pub min_spawn_interval_ms: u32,
    pub spawn_interval_step_ms: u32,
    pub progression_override_after_ms: u32,
    pub override_spawn_interval_ms: u32,

    // === Audio ===
    pub music_volume: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            play_area_width: PLAY_AREA_WIDTH,
            play_area_height: PLAY_AREA_HEIGHT,
            player_width: PLAYER_WIDTH,
            ball_size: BALL_SIZE,

            player_speed: PLAYER_SPEED,
            move_repeat_ms: MOVE_REPEAT_MS,
            fall_tick_ms: FALL_TICK_MS,
            ball_fall_step: BALL_FALL_STEP,
            ball_drift: BALL_DRIFT,

            initial_spawn_interval_ms: INITIAL_SPAWN_INTERVAL_MS,
            min_spawn_interval_ms: MIN_SPAWN_INTERVAL_MS,
            spawn_interval_step_ms: SPAWN_INTERVAL_STEP_MS,
            progression_override_after_ms: PROGRESSION_OVERRIDE_AFTER_MS,
            override_spawn_interval_ms: OVERRIDE_SPAWN_INTERVAL_MS,

            music_volume: MUSIC_VOLUME,
        }
    }
}

/// Why a tuning table was rejected
#[derive(Debug, Clone, PartialEq)]
pub enum TuningError {
    /// A timer period of zero would fire forever without advancing time
    ZeroPeriod(&'static str),
    /// A size or distance that must be strictly positive
    NonPositive(&'static str),
    /// Spawn floor is above the starting interval
    FloorAboveInitial { min_ms: u32, initial_ms: u32 },
    /// Volume outside 0.0 - 1.0
    VolumeOutOfRange(f32),
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::ZeroPeriod(name) => write!(f, "{name} must be at least 1 ms"),
            TuningError::NonPositive(name) => write!(f, "{name} must be greater than zero"),
            TuningError::FloorAboveInitial { min_ms, initial_ms } => write!(
                f,
                "min spawn interval ({min_ms} ms) exceeds initial interval ({initial_ms} ms)"
            ),
            TuningError::VolumeOutOfRange(v) => write!(f, "music volume {v} not in 0.0..=1.0"),
        }
    }
}

impl std::error::Error for TuningError {}

impl Tuning {
    /// Parse a (possibly partial) JSON table; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check that the table describes a playable game
    pub fn validate(&self) -> Result<(), TuningError> {
        let periods = [
            ("move_repeat_ms", self.move_repeat_ms),
            ("fall_tick_ms", self.fall_tick_ms),
            ("initial_spawn_interval_ms", self.initial_spawn_interval_ms),
            ("min_spawn_interval_ms", self.min_spawn_interval_ms),
            ("override_spawn_interval_ms", self.override_spawn_interval_ms),
        ];
        for (name, ms) in periods {
            if ms == 0 {
                return Err(TuningError::ZeroPeriod(name));
            }
        }

        let sizes = [
            ("play_area_width", self.play_area_width),
            ("play_area_height", self.play_area_height),
            ("player_width", self.player_width),
            ("ball_size", self.ball_size),
            ("player_speed", self.player_speed),
            ("ball_fall_step", self.ball_fall_step),
        ];
        for (name, v) in sizes {
            if !(v > 0.0) {
                return Err(TuningError::NonPositive(name));
            }
        }

        if self.min_spawn_interval_ms > self.initial_spawn_interval_ms {
            return Err(TuningError::FloorAboveInitial {
                min_ms: self.min_spawn_interval_ms,
                initial_ms: self.initial_spawn_interval_ms,
            });
        }

        if !(0.0..=1.0).contains(&self.music_volume) {
            return Err(TuningError::VolumeOutOfRange(self.music_volume));
        }

        Ok(())
    }

    /// Parse and validate, falling back to defaults on any problem
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => match tuning.validate() {
                Ok(()) => {
                    log::info!("Loaded tuning overrides");
                    tuning
                }
                Err(e) => {
                    log::warn!("Rejected tuning ({e}), using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Malformed tuning JSON ({e}), using defaults");
                Self::default()
            }
        }
    }

    /// Load tuning from the page's `<script id="tuning">` block (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("tuning"))
            .and_then(|el| el.text_content());

        match json {
            Some(json) if !json.trim().is_empty() => Self::from_json_or_default(&json),
            _ => {
                log::info!("Using default tuning");
                Self::default()
            }
        }
    }

    /// Native builds always use the defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.initial_spawn_interval_ms, 600);
        assert_eq!(tuning.min_spawn_interval_ms, 200);
        assert_eq!(tuning.music_volume, 0.5);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "play_area_width": 480.0, "fall_tick_ms": 16 }"#)
            .expect("valid json");
        assert_eq!(tuning.play_area_width, 480.0);
        assert_eq!(tuning.fall_tick_ms, 16);
        assert_eq!(tuning.ball_size, BALL_SIZE);
        assert_eq!(tuning.override_spawn_interval_ms, OVERRIDE_SPAWN_INTERVAL_MS);
    }

    #[test]
    fn test_validate_rejects_bad_tables() {
        let zero_tick = Tuning {
            fall_tick_ms: 0,
            ..Default::default()
        };
        assert_eq!(zero_tick.validate(), Err(TuningError::ZeroPeriod("fall_tick_ms")));

        let inverted = Tuning {
            min_spawn_interval_ms: 700,
            ..Default::default()
        };
        assert!(matches!(
            inverted.validate(),
            Err(TuningError::FloorAboveInitial { min_ms: 700, initial_ms: 600 })
        ));

        let loud = Tuning {
            music_volume: 1.5,
            ..Default::default()
        };
        assert_eq!(loud.validate(), Err(TuningError::VolumeOutOfRange(1.5)));
    }

    #[test]
    fn test_fallback_on_garbage() {
        assert_eq!(Tuning::from_json_or_default("not json"), Tuning::default());
        assert_eq!(
            Tuning::from_json_or_default(r#"{ "ball_size": -1.0 }"#),
            Tuning::default()
        );
    }
}
