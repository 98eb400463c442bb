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
//! Stateless force models. Callers sum the results into a `RigidBody` each tick.
use nalgebra::{Point3, Vector3};

pub const GRAVITY: f32 = 9.8;
pub const AIR_DENSITY: f32 = 1.225;

// Real helium lift is far too weak to carry a house with a handful of balloons.
pub const BUOYANCY_LIFT_MULTIPLIER: f32 = 6.0;

pub fn gravity(mass: f32) -> Vector3<f32> {
    Vector3::new(0.0, -GRAVITY * mass, 0.0)
}

/// Displaced air weight of a sphere of `radius`, scaled by `BUOYANCY_LIFT_MULTIPLIER`.
pub fn buoyancy(radius: f32) -> Vector3<f32> {
    let volume = 4.0 / 3.0 * std::f32::consts::PI * radius * radius * radius;
    Vector3::new(
        0.0,
        AIR_DENSITY * volume * GRAVITY * BUOYANCY_LIFT_MULTIPLIER,
        0.0,
    )
}

/// Linear drag.
pub fn drag(velocity: &Vector3<f32>, coefficient: f32) -> Vector3<f32> {
    velocity * -coefficient
}

/// Tension of a rope from `anchor` to a body at `position`. The rope only pulls: while
/// the body is within `rest_length` of the anchor the rope is slack and no force results.
pub fn rope_spring_damper(
    position: &Point3<f32>,
    velocity: &Vector3<f32>,
    anchor: &Point3<f32>,
    rest_length: f32,
    stiffness: f32,
    damping: f32,
) -> Vector3<f32> {
    let offset = position - anchor;
    let distance = offset.norm();
    if distance <= rest_length || distance <= f32::EPSILON {
        return Vector3::zeros();
    }

    let n = offset / distance;
    let spring = -stiffness * (distance - rest_length) * n;
    let damper = -damping * velocity.dot(&n) * n;
    spring + damper
}
