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
use nalgebra::{Point3, Vector3};

/// An axis aligned box. Callers are expected to keep `min <= max` on every axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    min: Point3<f32>,
    max: Point3<f32>,
}

impl Aabb {
    pub fn from_bounds(min: &Point3<f32>, max: &Point3<f32>) -> Self {
        Self {
            min: *min,
            max: *max,
        }
    }

    /// Build a box that sits on `base`, centered in x and z, rising `extent.y` above it.
    pub fn from_base_and_extent(base: &Point3<f32>, extent: &Vector3<f32>) -> Self {
        let half = Vector3::new(extent.x * 0.5, 0.0, extent.z * 0.5);
        Self {
            min: base - half,
            max: base + Vector3::new(half.x, extent.y, half.z),
        }
    }

    pub fn min(&self) -> &Point3<f32> {
        &self.min
    }

    pub fn max(&self) -> &Point3<f32> {
        &self.max
    }

    pub fn extent(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Inclusive containment test; points on a face count as inside.
    pub fn contains_point(&self, p: &Point3<f32>) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}
