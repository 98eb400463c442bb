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
mod style;

pub use crate::style::BalloonStyle;

use bevy_ecs::prelude::*;
use dynamics::{
    forces::{buoyancy, drag, gravity, rope_spring_damper},
    resolve_body_contact, RigidBody,
};
use geometry::{Aabb, Sphere};
use log::{debug, info, trace, warn};
use nalgebra::{Point3, Vector3};
use verlet_rope::{VerletRope, DEFAULT_ITERATIONS};

/// Lifecycle of a balloon. Transitions only ever move forward.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum BalloonState {
    /// Settling in after creation; no forces apply.
    Spawn,
    /// Gravity, buoyancy, drag and the tether are simulated.
    Physics,
    /// Terminal. Motion belongs to the dangling rope.
    Popped,
}

#[derive(Clone, Debug, Component)]
pub struct Balloon {
    body: RigidBody,
    anchor: Point3<f32>,
    rope_length: f32,
    attached: bool,
    radius: f32,
    state: BalloonState,
    spawn_timer: f32,

    // Where the rope hangs from once the balloon has been let go.
    free_rope_anchor: Point3<f32>,

    // Only present once popped.
    rope: Option<VerletRope>,
    house_bounds: Option<Aabb>,
}

impl Default for Balloon {
    fn default() -> Self {
        Self::new()
    }
}

impl Balloon {
    pub const MASS: f32 = 0.8;
    pub const RADIUS: f32 = 0.5;
    pub const ROPE_LENGTH: f32 = 5.0;
    pub const SPAWN_DURATION: f32 = 0.15;
    pub const DRAG: f32 = 2.0;
    pub const TETHER_STIFFNESS: f32 = 25.0;
    pub const TETHER_DAMPING: f32 = 8.0;
    pub const ROPE_SEGMENTS: usize = 10;

    pub fn new() -> Self {
        Self {
            body: RigidBody::new(Point3::origin(), Self::MASS),
            anchor: Point3::origin(),
            rope_length: Self::ROPE_LENGTH,
            attached: true,
            radius: Self::RADIUS,
            state: BalloonState::Spawn,
            spawn_timer: 0.0,
            free_rope_anchor: Point3::origin(),
            rope: None,
            house_bounds: None,
        }
    }

    /// Move the tether anchor and hang the balloon straight above it at rest.
    pub fn set_anchor(&mut self, anchor: &Point3<f32>) {
        self.anchor = *anchor;
        self.body.position = anchor + Vector3::y() * self.rope_length;
        self.body.velocity = Vector3::zeros();
        self.free_rope_anchor = *anchor;
    }

    /// Follow a moving anchor without disturbing the balloon itself.
    pub fn update_anchor(&mut self, anchor: &Point3<f32>) {
        self.anchor = *anchor;
        if self.attached {
            if let Some(rope) = self.rope.as_mut() {
                rope.pin_start(anchor);
            }
        }
    }

    pub fn attach(&mut self, rope_length: f32) {
        if self.state == BalloonState::Popped || !self.attached {
            warn!("cannot re-attach a released or popped balloon");
            return;
        }
        self.rope_length = rope_length;
        self.attached = true;
    }

    pub fn release(&mut self) {
        if !self.attached {
            return;
        }
        self.attached = false;
        self.free_rope_anchor = self.body.position - Vector3::y() * self.rope_length;
        info!("released balloon at {}", self.body.position);
    }

    /// Burst the balloon. The body stops simulating and a rope is left hanging from the
    /// rope start. Calling this again does nothing.
    pub fn pop(&mut self) {
        if self.state == BalloonState::Popped {
            trace!("balloon already popped");
            return;
        }
        let start = self.rope_start();
        self.rope = Some(VerletRope::new(
            &start,
            &self.body.position,
            Self::ROPE_SEGMENTS,
        ));
        self.state = BalloonState::Popped;
        self.body.velocity = Vector3::zeros();
        self.body.clear_force();
        info!("popped balloon at {}", self.body.position);
    }

    pub fn apply_forces(&mut self) {
        if self.state != BalloonState::Physics {
            return;
        }
        let gravity = gravity(self.body.mass);
        let lift = buoyancy(self.radius);
        let drag = drag(&self.body.velocity, Self::DRAG);
        self.body.apply_force(&gravity);
        self.body.apply_force(&lift);
        self.body.apply_force(&drag);
        if self.attached {
            let tether = rope_spring_damper(
                &self.body.position,
                &self.body.velocity,
                &self.anchor,
                self.rope_length,
                Self::TETHER_STIFFNESS,
                Self::TETHER_DAMPING,
            );
            self.body.apply_force(&tether);
        }
    }

    pub fn update(&mut self, dt: f32) {
        match self.state {
            BalloonState::Spawn => {
                self.spawn_timer += dt;
                if self.spawn_timer >= Self::SPAWN_DURATION {
                    self.state = BalloonState::Physics;
                    debug!("balloon settled after {:.2}s", self.spawn_timer);
                }
            }
            BalloonState::Physics => {
                self.body.integrate(dt);
                if !self.attached {
                    self.free_rope_anchor = self.body.position - Vector3::y() * self.rope_length;
                }
            }
            BalloonState::Popped => {
                if let Some(rope) = self.rope.as_mut() {
                    rope.update(dt, DEFAULT_ITERATIONS);
                    if let Some(bounds) = self.house_bounds.as_ref() {
                        rope.collide_with_aabb(bounds);
                    }
                    self.body.position = *rope.end();
                }
            }
        }
    }

    /// Bounce two balloons off each other. Popped balloons are skipped.
    pub fn collide_with(&mut self, other: &mut Balloon) -> bool {
        if self.is_popped() || other.is_popped() {
            return false;
        }
        resolve_body_contact(&mut self.body, self.radius, &mut other.body, other.radius)
    }

    /// Box the dangling rope collides with once popped.
    pub fn set_house_bounds(&mut self, bounds: Aabb) {
        self.house_bounds = Some(bounds);
    }

    pub fn rope_start(&self) -> Point3<f32> {
        if self.attached {
            self.anchor
        } else {
            self.free_rope_anchor
        }
    }

    pub fn state(&self) -> BalloonState {
        self.state
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_popped(&self) -> bool {
        self.state == BalloonState::Popped
    }

    pub fn position(&self) -> &Point3<f32> {
        &self.body.position
    }

    pub fn anchor(&self) -> &Point3<f32> {
        &self.anchor
    }

    pub fn free_rope_anchor(&self) -> &Point3<f32> {
        &self.free_rope_anchor
    }

    pub fn rope_length(&self) -> f32 {
        self.rope_length
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn sphere(&self) -> Sphere {
        Sphere::from_center_and_radius(&self.body.position, self.radius)
    }

    pub fn rope(&self) -> Option<&VerletRope> {
        self.rope.as_ref()
    }

    pub fn body(&self) -> &RigidBody {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut RigidBody {
        &mut self.body
    }
}

/// Resolve every overlapping pair in `balloons`.
pub fn collide_balloons(balloons: &mut [Balloon]) -> usize {
    let mut contacts = 0;
    for i in 1..balloons.len() {
        let (head, tail) = balloons.split_at_mut(i);
        let a = &mut head[i - 1];
        for b in tail.iter_mut() {
            if a.collide_with(b) {
                contacts += 1;
            }
        }
    }
    contacts
}

/// The first balloon, in chimney ring order, that is still tied on and unpopped.
pub fn first_tied<'a>(
    balloons: impl IntoIterator<Item = &'a mut Balloon>,
) -> Option<(usize, &'a mut Balloon)> {
    balloons
        .into_iter()
        .enumerate()
        .find(|(_, balloon)| balloon.is_attached() && !balloon.is_popped())
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::distance;

    const DT: f32 = 1.0 / 60.0;

    fn settled(anchor: Point3<f32>) -> Balloon {
        let mut balloon = Balloon::new();
        balloon.set_anchor(&anchor);
        balloon.update(Balloon::SPAWN_DURATION);
        assert_eq!(balloon.state(), BalloonState::Physics);
        balloon
    }

    fn tick(balloon: &mut Balloon, n: usize) {
        for _ in 0..n {
            balloon.apply_forces();
            balloon.update(DT);
        }
    }

    #[test]
    fn test_set_anchor_hangs_above() {
        let mut balloon = Balloon::new();
        balloon.body_mut().velocity = Vector3::new(1.0, 2.0, 3.0);
        balloon.set_anchor(&Point3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(*balloon.position(), Point3::new(1.0, 7.0, 3.0));
        assert_relative_eq!(balloon.body().velocity, Vector3::zeros());
    }

    #[test]
    fn test_spawn_is_inert() {
        let mut balloon = Balloon::new();
        balloon.set_anchor(&Point3::origin());
        balloon.apply_forces();
        assert_relative_eq!(balloon.body().force, Vector3::zeros());
        balloon.update(0.1);
        assert_eq!(balloon.state(), BalloonState::Spawn);
        assert_relative_eq!(*balloon.position(), Point3::new(0.0, 5.0, 0.0));
        balloon.update(0.1);
        assert_eq!(balloon.state(), BalloonState::Physics);
    }

    #[test]
    fn test_tether_holds() {
        let anchor = Point3::origin();
        let mut balloon = settled(anchor);
        tick(&mut balloon, 600);
        let stretch = distance(balloon.position(), &anchor);
        assert!(stretch > Balloon::ROPE_LENGTH);
        assert!(stretch < Balloon::ROPE_LENGTH + 2.0);
    }

    #[test]
    fn test_release_floats_away() {
        let anchor = Point3::origin();
        let mut balloon = settled(anchor);
        balloon.release();
        assert!(!balloon.is_attached());
        assert_relative_eq!(balloon.rope_start(), anchor);
        tick(&mut balloon, 600);
        assert!(balloon.position().y > Balloon::ROPE_LENGTH + 10.0);
        assert_relative_eq!(
            *balloon.free_rope_anchor(),
            balloon.position() - Vector3::new(0.0, Balloon::ROPE_LENGTH, 0.0)
        );
        assert_relative_eq!(balloon.rope_start(), *balloon.free_rope_anchor());
    }

    #[test]
    fn test_release_twice_keeps_anchor() {
        let mut balloon = settled(Point3::origin());
        balloon.release();
        let frozen = *balloon.free_rope_anchor();
        balloon.body_mut().position.y += 3.0;
        balloon.release();
        assert_relative_eq!(*balloon.free_rope_anchor(), frozen);
    }

    #[test]
    fn test_pop_is_idempotent() {
        let mut balloon = settled(Point3::origin());
        tick(&mut balloon, 30);
        balloon.pop();
        assert!(balloon.is_popped());
        let segments = balloon.rope().map(|rope| rope.segment_count());
        assert_eq!(segments, Some(Balloon::ROPE_SEGMENTS));

        tick(&mut balloon, 10);
        let end = *balloon.position();
        balloon.pop();
        assert_relative_eq!(*balloon.position(), end);
        assert_relative_eq!(*balloon.rope().unwrap().end(), end);
    }

    #[test]
    fn test_popped_ignores_forces() {
        let mut balloon = settled(Point3::origin());
        balloon.pop();
        balloon.apply_forces();
        assert_relative_eq!(balloon.body().force, Vector3::zeros());
    }

    #[test]
    fn test_popped_follows_rope() {
        let mut balloon = settled(Point3::origin());
        balloon.body_mut().position = Point3::new(3.0, 4.0, 0.0);
        balloon.pop();
        tick(&mut balloon, 60);
        let rope_end = *balloon.rope().unwrap().end();
        assert_relative_eq!(*balloon.position(), rope_end);
        assert!(balloon.position().y < 4.0);
    }

    #[test]
    fn test_popped_rope_follows_anchor() {
        let mut balloon = settled(Point3::origin());
        balloon.pop();
        let anchor = Point3::new(2.0, 1.0, 0.0);
        balloon.update_anchor(&anchor);
        assert_relative_eq!(*balloon.rope().unwrap().start(), anchor);
        assert_relative_eq!(balloon.rope_start(), anchor);
    }

    #[test]
    fn test_popped_rope_avoids_house() {
        let mut balloon = settled(Point3::origin());
        balloon.pop();
        let bounds = Aabb::from_bounds(
            &Point3::new(-1.0, -10.0, -1.0),
            &Point3::new(1.0, 4.5, 1.0),
        );
        balloon.set_house_bounds(bounds);
        balloon.update(DT);
        for point in balloon.rope().unwrap().points().iter().skip(1) {
            assert!(!bounds.contains_point(&point.position));
        }
    }

    #[test]
    fn test_attach_after_release_is_ignored() {
        let mut balloon = settled(Point3::origin());
        balloon.attach(7.0);
        assert_relative_eq!(balloon.rope_length(), 7.0);
        balloon.release();
        balloon.attach(3.0);
        assert!(!balloon.is_attached());
        assert_relative_eq!(balloon.rope_length(), 7.0);
    }

    #[test]
    fn test_collide_balloons() {
        let mut balloons = vec![
            settled(Point3::origin()),
            settled(Point3::new(0.5, 0.0, 0.0)),
            settled(Point3::new(20.0, 0.0, 0.0)),
        ];
        assert_eq!(collide_balloons(&mut balloons), 1);
        let gap = distance(balloons[0].position(), balloons[1].position());
        assert!(gap >= 2.0 * Balloon::RADIUS - 1e-4);

        balloons[1].body_mut().position = *balloons[0].position();
        balloons[1].pop();
        assert_eq!(collide_balloons(&mut balloons), 0);
    }

    #[test]
    fn test_first_tied_skips_released_and_popped() {
        let mut balloons = vec![Balloon::new(), Balloon::new(), Balloon::new()];
        balloons[0].release();
        balloons[1].pop();
        let (index, balloon) = first_tied(balloons.iter_mut()).unwrap();
        assert_eq!(index, 2);
        balloon.release();
        assert!(first_tied(balloons.iter_mut()).is_none());
    }
}
