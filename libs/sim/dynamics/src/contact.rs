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
use crate::RigidBody;
use geometry::{intersect::sphere_vs_sphere, Sphere};
use nalgebra::Vector3;

/// Coefficient of restitution for sphere contacts. Slightly bouncy.
pub const RESTITUTION: f32 = 0.8;

const MIN_SEPARATION: f32 = 0.0001;

/// Separate two overlapping spheres and exchange momentum along the contact normal.
///
/// Each sphere is moved out of the overlap in proportion to the mass of the *other*
/// body, so the heavier body moves less. No impulse is applied when the spheres are
/// already separating. Coincident centers use +Y as the contact normal.
pub fn resolve_sphere_contact(
    a: &mut Sphere,
    b: &mut Sphere,
    vel_a: &mut Vector3<f32>,
    vel_b: &mut Vector3<f32>,
    mass_a: f32,
    mass_b: f32,
) {
    if mass_a <= 0.0 || mass_b <= 0.0 {
        return;
    }
    let total_mass = mass_a + mass_b;

    let offset = a.center() - b.center();
    let mut distance = offset.norm();
    let normal = if distance < MIN_SEPARATION {
        distance = MIN_SEPARATION;
        Vector3::new(0.0, 1.0, 0.0)
    } else {
        offset / distance
    };

    let overlap = (a.radius() + b.radius()) - distance;
    *a.center_mut() += normal * (overlap * (mass_b / total_mass));
    *b.center_mut() -= normal * (overlap * (mass_a / total_mass));

    let velocity_along_normal = (*vel_a - *vel_b).dot(&normal);
    if velocity_along_normal >= 0.0 {
        return;
    }

    let j = -(1.0 + RESTITUTION) * velocity_along_normal / (1.0 / mass_a + 1.0 / mass_b);
    let impulse = normal * j;
    *vel_a += impulse / mass_a;
    *vel_b -= impulse / mass_b;
}

/// Detect and resolve a contact between two bodies treated as spheres. Returns true
/// if the bodies were overlapping.
pub fn resolve_body_contact(
    a: &mut RigidBody,
    radius_a: f32,
    b: &mut RigidBody,
    radius_b: f32,
) -> bool {
    let mut sphere_a = Sphere::from_center_and_radius(&a.position, radius_a);
    let mut sphere_b = Sphere::from_center_and_radius(&b.position, radius_b);
    if !sphere_vs_sphere(&sphere_a, &sphere_b) {
        return false;
    }
    resolve_sphere_contact(
        &mut sphere_a,
        &mut sphere_b,
        &mut a.velocity,
        &mut b.velocity,
        a.mass,
        b.mass,
    );
    a.position = *sphere_a.center();
    b.position = *sphere_b.center();
    true
}
