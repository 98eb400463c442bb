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
use nalgebra::Point3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    center: Point3<f32>,
    radius: f32,
}

impl Sphere {
    pub fn from_center_and_radius(center: &Point3<f32>, radius: f32) -> Self {
        Self {
            center: *center,
            radius,
        }
    }

    pub fn center(&self) -> &Point3<f32> {
        &self.center
    }

    pub fn center_mut(&mut self) -> &mut Point3<f32> {
        &mut self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}
