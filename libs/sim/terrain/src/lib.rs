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
mod tepui;

pub use crate::tepui::TepuiTerrain;

use std::ops::Range;

/// Height of the ground under a point in the xz-plane. This is the only way the
/// simulation looks at terrain.
pub trait TerrainHeight: Send + Sync {
    fn height_at(&self, x: f32, z: f32) -> f32;
}

impl<F> TerrainHeight for F
where
    F: Fn(f32, f32) -> f32 + Send + Sync,
{
    fn height_at(&self, x: f32, z: f32) -> f32 {
        self(x, z)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlatTerrain {
    height: f32,
}

impl FlatTerrain {
    pub fn new(height: f32) -> Self {
        Self { height }
    }
}

impl TerrainHeight for FlatTerrain {
    fn height_at(&self, _x: f32, _z: f32) -> f32 {
        self.height
    }
}

/// A rectangle in the xz-plane in which something may be placed.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementRegion {
    pub x: Range<f32>,
    pub z: Range<f32>,
}

impl PlacementRegion {
    pub fn contains(&self, x: f32, z: f32) -> bool {
        self.x.start <= x && x <= self.x.end && self.z.start <= z && z <= self.z.end
    }
}
