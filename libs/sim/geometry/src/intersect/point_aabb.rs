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
use crate::Aabb;
use nalgebra::Point3;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AabbFace {
    NegX,
    PosX,
    NegY,
    PosY,
    NegZ,
    PosZ,
}

impl AabbFace {
    const ALL: [AabbFace; 6] = [
        AabbFace::NegX,
        AabbFace::PosX,
        AabbFace::NegY,
        AabbFace::PosY,
        AabbFace::NegZ,
        AabbFace::PosZ,
    ];

    fn depth(&self, p: &Point3<f32>, aabb: &Aabb) -> f32 {
        match self {
            AabbFace::NegX => p.x - aabb.min().x,
            AabbFace::PosX => aabb.max().x - p.x,
            AabbFace::NegY => p.y - aabb.min().y,
            AabbFace::PosY => aabb.max().y - p.y,
            AabbFace::NegZ => p.z - aabb.min().z,
            AabbFace::PosZ => aabb.max().z - p.z,
        }
    }

    fn place_outside(&self, p: &mut Point3<f32>, aabb: &Aabb, margin: f32) {
        match self {
            AabbFace::NegX => p.x = aabb.min().x - margin,
            AabbFace::PosX => p.x = aabb.max().x + margin,
            AabbFace::NegY => p.y = aabb.min().y - margin,
            AabbFace::PosY => p.y = aabb.max().y + margin,
            AabbFace::NegZ => p.z = aabb.min().z - margin,
            AabbFace::PosZ => p.z = aabb.max().z + margin,
        }
    }
}

/// If `p` is inside `aabb`, move it through the nearest face so that it ends up
/// `margin` beyond that face. Returns the face used, or None if `p` was outside.
///
/// This is a discrete test: a point that crossed the whole box since the last
/// call is not detected.
pub fn eject_point_from_aabb(p: &mut Point3<f32>, aabb: &Aabb, margin: f32) -> Option<AabbFace> {
    if !aabb.contains_point(p) {
        return None;
    }

    // Ties resolve to the first face in ALL order.
    let mut nearest = AabbFace::NegX;
    let mut nearest_depth = nearest.depth(p, aabb);
    for face in &AabbFace::ALL[1..] {
        let depth = face.depth(p, aabb);
        if depth < nearest_depth {
            nearest = *face;
            nearest_depth = depth;
        }
    }
    nearest.place_outside(p, aabb, margin);
    Some(nearest)
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_box() -> Aabb {
        Aabb::from_bounds(&Point3::new(0.0, 0.0, 0.0), &Point3::new(1.0, 1.0, 1.0))
    }

    fn distance_outside(p: &Point3<f32>, aabb: &Aabb) -> f32 {
        let dx = (aabb.min().x - p.x).max(p.x - aabb.max().x).max(0.0);
        let dy = (aabb.min().y - p.y).max(p.y - aabb.max().y).max(0.0);
        let dz = (aabb.min().z - p.z).max(p.z - aabb.max().z).max(0.0);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    #[test]
    fn test_outside_point_untouched() {
        let mut p = Point3::new(2.0, 0.5, 0.5);
        assert_eq!(eject_point_from_aabb(&mut p, &unit_box(), 0.02), None);
        assert_relative_eq!(p.x, 2.0);
    }

    #[test]
    fn test_eject_through_nearest_face() {
        let aabb = unit_box();
        let mut p = Point3::new(0.5, 0.9, 0.4);
        assert_eq!(
            eject_point_from_aabb(&mut p, &aabb, 0.02),
            Some(AabbFace::PosY)
        );
        assert_relative_eq!(p.y, 1.02);
        assert_relative_eq!(p.x, 0.5);
        assert_relative_eq!(p.z, 0.4);

        let mut p = Point3::new(0.05, 0.5, 0.4);
        assert_eq!(
            eject_point_from_aabb(&mut p, &aabb, 0.02),
            Some(AabbFace::NegX)
        );
        assert_relative_eq!(p.x, -0.02);
    }

    #[test]
    fn test_ejected_points_clear_margin() {
        let aabb = Aabb::from_bounds(&Point3::new(-2.0, 0.0, -1.0), &Point3::new(3.0, 4.0, 1.5));
        let margin = 0.02;
        for i in 1..10 {
            for j in 1..10 {
                for k in 1..10 {
                    let mut p = Point3::new(
                        -2.0 + 5.0 * i as f32 / 10.0,
                        4.0 * j as f32 / 10.0,
                        -1.0 + 2.5 * k as f32 / 10.0,
                    );
                    assert!(eject_point_from_aabb(&mut p, &aabb, margin).is_some());
                    assert!(!aabb.contains_point(&p));
                    assert!(distance_outside(&p, &aabb) >= margin - 1e-5);
                }
            }
        }
    }
}
