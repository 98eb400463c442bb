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
use bevy_ecs::prelude::*;
use house::House;
use log::trace;
use nalgebra::Vector3;

/// Which steering keys are held this tick.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ControlInput {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
}

impl ControlInput {
    pub fn is_idle(&self) -> bool {
        !(self.forward || self.back || self.left || self.right)
    }
}

/// Direct steering by the player, relative to the direction they are looking.
#[derive(Clone, Debug, Resource)]
pub struct ManualControl {
    control_strength: f32,
    // Yaw in radians; zero looks down +z.
    heading: f32,
}

impl Default for ManualControl {
    fn default() -> Self {
        Self {
            control_strength: Self::CONTROL_STRENGTH,
            heading: 0.0,
        }
    }
}

impl ManualControl {
    pub const CONTROL_STRENGTH: f32 = 30.0;
    pub const MIN_BALLOON_FACTOR: f32 = 0.1;
    pub const MAX_BALLOON_FACTOR: f32 = 1.5;

    pub fn set_heading(&mut self, heading: f32) {
        self.heading = heading;
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    /// Fewer balloons means less authority, within limits.
    pub fn balloon_factor(attached_balloons: usize) -> f32 {
        (attached_balloons as f32 / House::BALLOON_THRESHOLD as f32)
            .clamp(Self::MIN_BALLOON_FACTOR, Self::MAX_BALLOON_FACTOR)
    }

    pub fn force(&self, input: &ControlInput, attached_balloons: usize) -> Vector3<f32> {
        let forward = Vector3::new(self.heading.sin(), 0.0, self.heading.cos());
        let right = forward.cross(&Vector3::y());

        let mut push = Vector3::zeros();
        if input.forward {
            push += forward;
        }
        if input.back {
            push -= forward;
        }
        if input.right {
            push += right;
        }
        if input.left {
            push -= right;
        }
        push * self.control_strength * Self::balloon_factor(attached_balloons)
    }

    /// Push the house according to `input`. Returns whether any force was applied.
    pub fn apply(&self, house: &mut House, input: &ControlInput) -> bool {
        let force = self.force(input, house.attached_balloon_count());
        if force.norm() <= 0.001 {
            return false;
        }
        trace!("manual steering force {force:?}");
        house.apply_external_force(&force);
        true
    }
}
