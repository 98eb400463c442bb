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
use geometry::{intersect::eject_point_from_aabb, Aabb};
use nalgebra::{Point3, Vector3};

/// Vertical acceleration applied to free rope points.
pub const ROPE_GRAVITY: f32 = -9.8;

/// Blend factor for the velocity term layered into the position update.
pub const AIR_DAMPING: f32 = 0.98;

/// Relaxation passes per update unless the caller asks for something else.
pub const DEFAULT_ITERATIONS: usize = 5;

/// How far beyond a face an ejected point is placed.
pub const PUSH_OUT_MARGIN: f32 = 0.02;

const MIN_SEGMENT_LENGTH: f32 = 0.0001;

#[derive(Clone, Debug, PartialEq)]
pub struct VerletPoint {
    pub position: Point3<f32>,
    pub previous_position: Point3<f32>,
    pub pinned: bool,
}

impl VerletPoint {
    pub fn new(position: Point3<f32>, pinned: bool) -> Self {
        Self {
            position,
            previous_position: position,
            pinned,
        }
    }

    /// Implied per-step velocity.
    pub fn displacement(&self) -> Vector3<f32> {
        self.position - self.previous_position
    }
}

/// A chain of N+1 points joined by N fixed length segments, with the first point
/// pinned. Velocity is never stored; it is implied by the last two positions.
#[derive(Clone, Debug)]
pub struct VerletRope {
    points: Vec<VerletPoint>,
    segment_length: f32,
}

impl VerletRope {
    /// Lay out a straight rope from `start` to `end`. The rest length of each segment is
    /// fixed here from the initial span and never changes.
    pub fn new(start: &Point3<f32>, end: &Point3<f32>, segments: usize) -> Self {
        let segments = segments.max(1);
        let span = end - start;
        let points = (0..=segments)
            .map(|i| {
                let t = i as f32 / segments as f32;
                VerletPoint::new(start + span * t, i == 0)
            })
            .collect();
        Self {
            points,
            segment_length: span.norm() / segments as f32,
        }
    }

    pub fn points(&self) -> &[VerletPoint] {
        &self.points
    }

    pub fn segment_count(&self) -> usize {
        self.points.len() - 1
    }

    pub fn segment_length(&self) -> f32 {
        self.segment_length
    }

    pub fn start(&self) -> &Point3<f32> {
        &self.points[0].position
    }

    pub fn end(&self) -> &Point3<f32> {
        &self.points[self.points.len() - 1].position
    }

    /// Sum of the current segment lengths.
    pub fn current_length(&self) -> f32 {
        self.points
            .windows(2)
            .map(|pair| (pair[1].position - pair[0].position).norm())
            .sum()
    }

    /// Move the pinned start, e.g. to follow whatever the rope is tied to.
    pub fn pin_start(&mut self, position: &Point3<f32>) {
        let start = &mut self.points[0];
        start.position = *position;
        start.previous_position = *position;
        start.pinned = true;
    }

    pub fn update(&mut self, dt: f32, iterations: usize) {
        self.integrate(dt);
        for _ in 0..iterations {
            self.relax();
        }
    }

    /// Advance every free point from its implied velocity plus gravity. The velocity
    /// term is added a second time scaled by `AIR_DAMPING * dt`; this is not textbook
    /// Verlet, but is what gives the rope its loose swing.
    pub fn integrate(&mut self, dt: f32) {
        let gravity_step = Vector3::new(0.0, ROPE_GRAVITY * dt * dt, 0.0);
        for point in self.points.iter_mut().filter(|p| !p.pinned) {
            let velocity = point.displacement();
            point.previous_position = point.position;
            point.position += velocity + gravity_step + velocity * (AIR_DAMPING * dt);
        }
    }

    /// One Gauss-Seidel pass over the segments, start to end. Each free endpoint takes
    /// half of the length error; a pinned endpoint takes none.
    pub fn relax(&mut self) {
        for i in 0..self.points.len() - 1 {
            let delta = self.points[i + 1].position - self.points[i].position;
            let current = delta.norm();
            if current < MIN_SEGMENT_LENGTH {
                continue;
            }

            let correction = delta * (0.5 * (current - self.segment_length) / current);
            if !self.points[i].pinned {
                self.points[i].position += correction;
            }
            if !self.points[i + 1].pinned {
                self.points[i + 1].position -= correction;
            }
        }
    }

    /// Push every free point that ended up inside `aabb` back out through its
    /// nearest face.
    pub fn collide_with_aabb(&mut self, aabb: &Aabb) {
        for point in self.points.iter_mut().filter(|p| !p.pinned) {
            eject_point_from_aabb(&mut point.position, aabb, PUSH_OUT_MARGIN);
        }
    }
}
