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

/// Look of a balloon. Only the renderer cares; nothing in the physics reads it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Component)]
pub enum BalloonStyle {
    Classic,
    Glitter,
    Metallic,
    Neon,
    Transparent,
    Textured,
}

impl BalloonStyle {
    pub const ALL: [BalloonStyle; 6] = [
        Self::Classic,
        Self::Glitter,
        Self::Metallic,
        Self::Neon,
        Self::Transparent,
        Self::Textured,
    ];

    pub fn for_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }
}
