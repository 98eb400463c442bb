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
use crate::{PlacementRegion, TerrainHeight};
use nalgebra::Point3;

#[derive(Clone, Copy, Debug)]
struct Plateau {
    // All widths are fractions of the terrain size.
    center: f32,
    top_width: f32,
    cliff_width: f32,
    height: f32,
}

impl Plateau {
    fn profile(&self, x: f32) -> f32 {
        let d = (x - self.center).abs();
        if d < self.top_width {
            return 1.0;
        }
        let t = ((d - self.top_width) / self.cliff_width).clamp(0.0, 1.0);
        1.0 - t * t * (3.0 - 2.0 * t)
    }

    // Keep placements away from the cliff edge.
    fn landing_span(&self, size: f32) -> std::ops::Range<f32> {
        let half = self.top_width * size * 0.8;
        self.center * size - half..self.center * size + half
    }
}

const WEST: Plateau = Plateau {
    center: -0.30,
    top_width: 0.10,
    cliff_width: 0.015,
    height: 0.55,
};

const EAST: Plateau = Plateau {
    center: 0.30,
    top_width: 0.14,
    cliff_width: 0.015,
    height: 1.15,
};

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Two flat-topped table mountains split by a river canyon running along z.
#[derive(Clone, Copy, Debug)]
pub struct TepuiTerrain {
    size: f32,
    max_height: f32,
}

impl TepuiTerrain {
    pub fn new(size: f32, max_height: f32) -> Self {
        Self { size, max_height }
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn max_height(&self) -> f32 {
        self.max_height
    }

    /// Highest point on a `resolution` x `resolution` grid over the terrain. The first
    /// sample wins ties.
    pub fn peak(&self, resolution: usize) -> Point3<f32> {
        let resolution = resolution.max(1);
        let step = self.size / resolution as f32;
        let offset = self.size / 2.0;
        let mut peak = Point3::new(-offset, f32::MIN, -offset);
        for i in 0..=resolution {
            for j in 0..=resolution {
                let x = i as f32 * step - offset;
                let z = j as f32 * step - offset;
                let h = self.height_at(x, z);
                if h > peak.y {
                    peak = Point3::new(x, h, z);
                }
            }
        }
        peak
    }

    /// The plateau across the canyon from `x`, shrunk away from its cliffs.
    pub fn landing_region(&self, x: f32) -> PlacementRegion {
        let target = if x < 0.0 { EAST } else { WEST };
        PlacementRegion {
            x: target.landing_span(self.size),
            z: -self.size * 0.4..self.size * 0.4,
        }
    }
}

impl TerrainHeight for TepuiTerrain {
    fn height_at(&self, x: f32, z: f32) -> f32 {
        let nx = x / self.size;
        let nz = z / self.size;

        let wobble = (nz * 6.0).sin() * 0.035 + (nz * 13.0).sin() * 0.015;
        let west = WEST.profile(nx + wobble);
        let east = EAST.profile(nx + wobble);
        let mut height =
            west * self.max_height * WEST.height + east * self.max_height * EAST.height;

        // canyon and river bed
        let sx = nx + (nz * 16.0).sin() * 0.025;
        height -= (-(sx / 0.04).powi(2)).exp() * self.max_height;
        height += (-(sx / 0.012).powi(2)).exp() * self.max_height * 0.12;

        // rough up the cliffs, leave the tops flat
        let edge = 1.0 - smoothstep(0.7, 1.0, west.max(east));
        let cliff = (height * 5.0 + z * 0.4).sin() * 0.20 + (height * 17.0 + nx * 12.0).sin() * 0.08;
        height + cliff * smoothstep(0.2, 0.6, edge)
    }
}
