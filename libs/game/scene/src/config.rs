// This file is part of Updraft.
//
// Updraft is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// Updraft is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with Updraft.  If not, see <http://www.gnu.org/licenses/>.
use balloon::Balloon;
use nalgebra::Vector3;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    #[error("a scene needs at least one balloon")]
    NoBalloons,
    #[error("rope length must be positive and finite, got {0}")]
    InvalidRopeLength(f32),
    #[error("maximum step must be positive and finite, got {0}")]
    InvalidMaxStep(f32),
    #[error("time step must be non-negative and finite, got {0}")]
    InvalidTimeStep(f32),
}

/// The ground the house sits on.
#[derive(Clone, Debug, PartialEq)]
pub enum Landscape {
    Flat {
        height: f32,
    },
    /// Two table mountains; the house starts on the highest point and the beacon is
    /// put on the other plateau.
    Tepui {
        size: f32,
        max_height: f32,
        resolution: usize,
    },
}

impl Default for Landscape {
    fn default() -> Self {
        Self::Tepui {
            size: 100.0,
            max_height: 15.0,
            resolution: 200,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SceneConfig {
    pub balloon_count: usize,
    pub rope_length: f32,
    /// Frame deltas above this are clamped before they reach the integrators.
    pub max_step: Option<f32>,
    /// Seeds beacon placement.
    pub seed: u64,
    pub autopilot: bool,
    pub wind: Vector3<f32>,
    pub landscape: Landscape,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            balloon_count: 15,
            rope_length: Balloon::ROPE_LENGTH,
            max_step: Some(0.1),
            seed: 0,
            autopilot: true,
            wind: Vector3::zeros(),
            landscape: Landscape::default(),
        }
    }
}

impl SceneConfig {
    pub fn validate(&self) -> Result<(), SceneError> {
        if self.balloon_count == 0 {
            return Err(SceneError::NoBalloons);
        }
        if !self.rope_length.is_finite() || self.rope_length <= 0.0 {
            return Err(SceneError::InvalidRopeLength(self.rope_length));
        }
        if let Some(max_step) = self.max_step {
            if !max_step.is_finite() || max_step <= 0.0 {
                return Err(SceneError::InvalidMaxStep(max_step));
            }
        }
        Ok(())
    }
}
