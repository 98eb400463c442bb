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
use log::trace;
use nalgebra::{Point3, Vector3};

/// A point mass. Forces accumulate between calls to `integrate` and are cleared by it,
/// so every force has to be re-applied on every tick.
#[derive(Clone, Debug, PartialEq)]
pub struct RigidBody {
    pub position: Point3<f32>,
    pub velocity: Vector3<f32>,
    pub force: Vector3<f32>,
    pub mass: f32,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new(Point3::origin(), 1.0)
    }
}

impl RigidBody {
    pub fn new(position: Point3<f32>, mass: f32) -> Self {
        Self {
            position,
            velocity: Vector3::zeros(),
            force: Vector3::zeros(),
            mass,
        }
    }

    pub fn apply_force(&mut self, f: &Vector3<f32>) {
        self.force += f;
    }

    pub fn clear_force(&mut self) {
        self.force = Vector3::zeros();
    }

    /// Bodies without positive mass are never integrated.
    pub fn is_static(&self) -> bool {
        self.mass <= 0.0
    }

    /// Semi-implicit Euler: velocity is advanced first and the new velocity moves
    /// the position. A body with non-positive mass is left untouched, including its
    /// accumulated force.
    pub fn integrate(&mut self, dt: f32) {
        if self.is_static() {
            trace!("skipping integration of body with mass {}", self.mass);
            return;
        }

        let acceleration = self.force / self.mass;
        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;

        self.force = Vector3::zeros();
    }
}
