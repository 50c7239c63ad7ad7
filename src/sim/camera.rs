//! Trailing follow camera
//!
//! Position and look-at target are two independent low-pass filters chasing
//! offsets from the marble.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::{smoothing_factor, vec3};

/// What the renderer needs to place the camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

#[derive(Debug, Clone)]
pub struct CameraRig {
    position: Vec3,
    target: Vec3,
    /// Low-pass rate (per second)
    smoothing: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(CAMERA_SMOOTHING)
    }
}

impl CameraRig {
    pub fn new(smoothing: f32) -> Self {
        Self {
            position: vec3(CAMERA_INITIAL_POSITION),
            target: Vec3::ZERO,
            smoothing,
        }
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.position,
            target: self.target,
        }
    }

    /// Where the camera wants to be for a marble at `body`
    pub fn desired(body: Vec3) -> CameraPose {
        CameraPose {
            position: body + vec3(CAMERA_OFFSET),
            target: body + vec3(CAMERA_TARGET_OFFSET),
        }
    }

    /// Move toward the desired pose for `body` over `dt` seconds
    pub fn follow(&mut self, body: Vec3, dt: f32) -> CameraPose {
        let desired = Self::desired(body);
        let t = smoothing_factor(self.smoothing, dt);
        self.position = self.position.lerp(desired.position, t);
        self.target = self.target.lerp(desired.target, t);
        self.pose()
    }
}
