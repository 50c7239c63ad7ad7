//! Course and player tuning
//!
//! Loaded from a JSON file on native builds; anything missing falls back to
//! the defaults in [`crate::consts`].

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::HazardKind;

/// Errors that can occur while loading settings
#[derive(Debug)]
pub enum SettingsError {
    /// File system error
    Io(std::io::Error),
    /// Malformed JSON
    Json(serde_json::Error),
    /// Parsed but unusable
    Invalid(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "IO error: {}", e),
            SettingsError::Json(e) => write!(f, "JSON error: {}", e),
            SettingsError::Invalid(msg) => write!(f, "Invalid settings: {}", msg),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            SettingsError::Json(e) => Some(e),
            SettingsError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Json(e)
    }
}

/// How hard the marble responds to input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Impulse per second of held direction
    pub impulse_strength: f32,
    /// Rolling torque per second of held direction
    pub torque_strength: f32,
    /// Upward impulse of a grounded jump
    pub jump_impulse: f32,
    /// Camera low-pass rate (per second)
    pub camera_smoothing: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            impulse_strength: IMPULSE_STRENGTH,
            torque_strength: TORQUE_STRENGTH,
            jump_impulse: JUMP_IMPULSE,
            camera_smoothing: CAMERA_SMOOTHING,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Hazard blocks between start and finish
    pub blocks_count: u32,
    /// Archetypes the level builder picks from
    pub hazards: Vec<HazardKind>,
    /// First course seed (random when absent)
    pub seed: Option<u64>,
    /// Vertical gravity (m/s²)
    pub gravity: f32,
    pub player: PlayerTuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            blocks_count: DEFAULT_BLOCKS_COUNT,
            hazards: HazardKind::ALL.to_vec(),
            seed: None,
            gravity: GRAVITY,
            player: PlayerTuning::default(),
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load settings from `path`, falling back to defaults on any error
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::info!("Using default settings");
            return Self::default();
        };

        match Self::from_file(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Failed to load {}: {}; using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.hazards.is_empty() {
            return Err(SettingsError::Invalid(
                "at least one hazard kind is required".to_string(),
            ));
        }
        if !self.gravity.is_finite() {
            return Err(SettingsError::Invalid("gravity must be finite".to_string()));
        }
        let p = &self.player;
        let tuning = [
            p.impulse_strength,
            p.torque_strength,
            p.jump_impulse,
            p.camera_smoothing,
        ];
        if tuning.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(SettingsError::Invalid(
                "player tuning values must be finite and non-negative".to_string(),
            ));
        }
        Ok(())
    }
}
