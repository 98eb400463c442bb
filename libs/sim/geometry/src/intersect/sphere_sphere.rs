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
use crate::Sphere;

/// Overlap test on squared distances; touching spheres do not intersect.
pub fn sphere_vs_sphere(a: &Sphere, b: &Sphere) -> bool {
    let radius_sum = a.radius() + b.radius();
    (a.center() - b.center()).norm_squared() < radius_sum * radius_sum
}
