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
use pilot::ControlInput;

/// Input from whoever is driving the simulation, applied at the start of the next tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimCommand {
    /// Let go of the first balloon still tied to the house.
    ReleaseBalloon,
    /// Burst the first balloon still tied to the house.
    PopBalloon,
    SetAutopilot(bool),
    /// Yaw, in radians, that manual steering treats as forward.
    SetHeading(f32),
    /// Replace the held steering keys.
    Steer(ControlInput),
}

#[derive(Debug, Default, Resource)]
pub struct PendingCommands {
    commands: Vec<SimCommand>,
}

impl PendingCommands {
    pub fn push(&mut self, command: SimCommand) {
        self.commands.push(command);
    }

    pub fn take(&mut self) -> Vec<SimCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Steering keys currently held.
#[derive(Clone, Copy, Debug, Default, Resource)]
pub struct PilotInput {
    pub input: ControlInput,
}

/// Which chimney ring slot a balloon is tied to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Component)]
pub struct Tether {
    pub index: usize,
}
