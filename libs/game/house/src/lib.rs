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
mod tilt;

use balloon::Balloon;
use bevy_ecs::prelude::*;
use dynamics::{
    forces::{drag, gravity},
    RigidBody,
};
use geometry::Aabb;
use log::{info, trace};
use nalgebra::{Point3, Vector3};
use std::{f32::consts::PI, fmt, sync::Arc};
use terrain::TerrainHeight;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TakeoffPhase {
    /// Not enough balloons to do anything.
    Grounded,
    /// Enough balloons, but the ropes are still taking up the load.
    Tension,
    /// Lift is ramping up or fully applied.
    Flying,
}

#[derive(Component)]
pub struct House {
    body: RigidBody,
    initial_position: Point3<f32>,
    is_flying: bool,
    is_taking_off: bool,
    takeoff_timer: f32,
    attached_balloon_count: usize,
    phase: TakeoffPhase,

    // Orientation, for display only.
    rotation: Vector3<f32>,
    angular_velocity: Vector3<f32>,
    tilt_angle: f32,
    tilt_axis: Vector3<f32>,

    wind: Vector3<f32>,
    terrain: Option<Arc<dyn TerrainHeight>>,
}

impl fmt::Debug for House {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("House")
            .field("body", &self.body)
            .field("phase", &self.phase)
            .field("takeoff_timer", &self.takeoff_timer)
            .field("attached_balloon_count", &self.attached_balloon_count)
            .field("tilt_angle", &self.tilt_angle)
            .finish_non_exhaustive()
    }
}

impl House {
    pub const BALLOON_THRESHOLD: usize = 8;
    pub const MAX_HEIGHT: f32 = 25.0;
    pub const MASS: f32 = 22.0;
    pub const WIDTH: f32 = 5.0;
    pub const HEIGHT: f32 = 5.0;
    pub const DEPTH: f32 = 5.0;
    pub const LIFT_PER_BALLOON: f32 = 15.0;
    pub const DRAG: f32 = 5.0;
    pub const TAKEOFF_DELAY: f32 = 10.0;
    pub const LIFTUP_WINDOW: f32 = 1.0;
    pub const TENSION_LIFT_FRACTION: f32 = 0.3;
    pub const GROUND_FRICTION: f32 = 100.0;
    pub const CEILING_STIFFNESS: f32 = 50.0;
    pub const GROUND_RESTITUTION: f32 = 0.1;
    pub const MIN_BOUNCE_SPEED: f32 = 0.5;
    pub const HORIZONTAL_GROUND_FRICTION: f32 = 0.95;
    pub const CONTACT_ANGULAR_DAMPING: f32 = 0.8;

    /// Where the balloon ropes are tied, relative to the house origin.
    pub const CHIMNEY_OFFSET: [f32; 3] = [-0.18, 5.0, -2.0];
    pub const CHIMNEY_RING_RADIUS: f32 = 0.1;

    // Height above the start that still counts as sitting on the pad.
    const GROUND_TOLERANCE: f32 = 0.1;

    pub fn new(initial_position: Point3<f32>) -> Self {
        Self {
            body: RigidBody::new(initial_position, Self::MASS),
            initial_position,
            is_flying: false,
            is_taking_off: false,
            takeoff_timer: 0.0,
            attached_balloon_count: 0,
            phase: TakeoffPhase::Grounded,
            rotation: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            tilt_angle: 0.0,
            tilt_axis: Vector3::x(),
            wind: Vector3::zeros(),
            terrain: None,
        }
    }

    pub fn set_terrain(&mut self, terrain: Arc<dyn TerrainHeight>) {
        self.terrain = Some(terrain);
    }

    /// Horizontal wind push, felt only while flying.
    pub fn set_wind(&mut self, wind: &Vector3<f32>) {
        self.wind = Vector3::new(wind.x, 0.0, wind.z);
    }

    /// Accumulate this tick's forces. Only balloons that are still tied on and not
    /// popped count toward lift.
    pub fn apply_forces<'a, I>(&mut self, balloons: I)
    where
        I: IntoIterator<Item = &'a Balloon>,
    {
        self.attached_balloon_count = balloons
            .into_iter()
            .filter(|balloon| balloon.is_attached() && !balloon.is_popped())
            .count();

        self.body.apply_force(&gravity(self.body.mass));

        if self.attached_balloon_count >= Self::BALLOON_THRESHOLD {
            self.is_taking_off = true;
        } else {
            self.is_taking_off = false;
            self.is_flying = false;
            self.takeoff_timer = 0.0;
        }

        let full_lift = self.attached_balloon_count as f32 * Self::LIFT_PER_BALLOON;
        if self.is_taking_off {
            if self.on_ground() && self.takeoff_timer < Self::TAKEOFF_DELAY {
                let tension = self.takeoff_timer / Self::TAKEOFF_DELAY;
                let lift = full_lift * Self::TENSION_LIFT_FRACTION * tension;
                let friction = -self.body.velocity.y * Self::GROUND_FRICTION;
                self.body.apply_force(&Vector3::new(0.0, lift + friction, 0.0));

                // Stay on the pad until the ropes are taut.
                self.body.position.x = self.initial_position.x;
                self.body.position.z = self.initial_position.z;
                self.body.velocity.x = 0.0;
                self.body.velocity.z = 0.0;
            } else {
                self.is_flying = true;
                let liftup = ((self.takeoff_timer - Self::TAKEOFF_DELAY) / Self::LIFTUP_WINDOW)
                    .clamp(0.0, 1.0);
                self.body
                    .apply_force(&Vector3::new(0.0, full_lift * liftup, 0.0));
            }
        }

        if self.body.velocity.norm() > 0.01 {
            self.body.apply_force(&drag(&self.body.velocity, Self::DRAG));
        }

        if self.is_flying {
            self.body.apply_force(&self.wind);
        }

        let altitude = self.body.position.y - self.initial_position.y;
        if altitude > Self::MAX_HEIGHT {
            let excess = altitude - Self::MAX_HEIGHT;
            self.body
                .apply_force(&Vector3::new(0.0, -excess * Self::CEILING_STIFFNESS, 0.0));
        }

        self.note_phase();
    }

    /// Push from outside the house, e.g. steering. Must be applied between
    /// `apply_forces` and `update`.
    pub fn apply_external_force(&mut self, force: &Vector3<f32>) {
        self.body.apply_force(force);
    }

    pub fn update(&mut self, dt: f32) {
        if self.is_taking_off {
            self.takeoff_timer += dt;
        }

        let horizontal_force = Vector3::new(self.body.force.x, 0.0, self.body.force.z);
        self.body.integrate(dt);

        self.update_tilt(&horizontal_force, dt);
        self.rotation.y += self.angular_velocity.y * dt * 0.1;

        self.resolve_ground_contact();
    }

    fn resolve_ground_contact(&mut self) {
        let terrain = match self.terrain.as_ref() {
            Some(terrain) => terrain,
            None => {
                if self.body.position.y < self.initial_position.y {
                    self.body.position.y = self.initial_position.y;
                    self.body.velocity.y = 0.0;
                    self.angular_velocity *= Self::CONTACT_ANGULAR_DAMPING;
                }
                return;
            }
        };

        let half_width = Self::WIDTH * 0.5;
        let half_depth = Self::DEPTH * 0.5;
        let p = self.body.position;
        let ground = [
            (-half_width, -half_depth),
            (half_width, -half_depth),
            (-half_width, half_depth),
            (half_width, half_depth),
            (0.0, 0.0),
        ]
        .iter()
        .map(|(dx, dz)| terrain.height_at(p.x + dx, p.z + dz))
        .fold(f32::MIN, f32::max);

        if p.y >= ground {
            return;
        }
        trace!("house ground contact, {:.3} below terrain", ground - p.y);
        self.body.position.y = ground;
        if self.body.velocity.y < 0.0 {
            self.body.velocity.y *= -Self::GROUND_RESTITUTION;
            if self.body.velocity.y.abs() < Self::MIN_BOUNCE_SPEED {
                self.body.velocity.y = 0.0;
            }
        }
        self.angular_velocity *= Self::CONTACT_ANGULAR_DAMPING;
        self.body.velocity.x *= Self::HORIZONTAL_GROUND_FRICTION;
        self.body.velocity.z *= Self::HORIZONTAL_GROUND_FRICTION;
    }

    fn on_ground(&self) -> bool {
        self.body.position.y <= self.initial_position.y + Self::GROUND_TOLERANCE
    }

    fn note_phase(&mut self) {
        let phase = if self.is_flying {
            TakeoffPhase::Flying
        } else if self.is_taking_off {
            TakeoffPhase::Tension
        } else {
            TakeoffPhase::Grounded
        };
        if phase != self.phase {
            info!(
                "house {:?} -> {:?} with {} balloons",
                self.phase, phase, self.attached_balloon_count
            );
            self.phase = phase;
        }
    }

    /// Rope tie point for balloon `index` of `count`, spread on a small ring around the
    /// chimney.
    pub fn tether_anchor(&self, index: usize, count: usize) -> Point3<f32> {
        let [x, y, z] = Self::CHIMNEY_OFFSET;
        let angle = 2.0 * PI * index as f32 / count.max(1) as f32;
        let ring = Vector3::new(angle.cos(), 0.0, angle.sin()) * Self::CHIMNEY_RING_RADIUS;
        self.body.position + Vector3::new(x, y, z) + ring
    }

    /// Box around the house, resting on its origin.
    pub fn world_aabb(&self) -> Aabb {
        Aabb::from_base_and_extent(
            &self.body.position,
            &Vector3::new(Self::WIDTH, Self::HEIGHT, Self::DEPTH),
        )
    }

    pub fn phase(&self) -> TakeoffPhase {
        self.phase
    }

    pub fn is_flying(&self) -> bool {
        self.is_flying
    }

    pub fn is_taking_off(&self) -> bool {
        self.is_taking_off
    }

    pub fn takeoff_timer(&self) -> f32 {
        self.takeoff_timer
    }

    pub fn attached_balloon_count(&self) -> usize {
        self.attached_balloon_count
    }

    pub fn position(&self) -> &Point3<f32> {
        &self.body.position
    }

    pub fn velocity(&self) -> &Vector3<f32> {
        &self.body.velocity
    }

    pub fn initial_position(&self) -> &Point3<f32> {
        &self.initial_position
    }

    pub fn body(&self) -> &RigidBody {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut RigidBody {
        &mut self.body
    }

    pub fn rotation(&self) -> &Vector3<f32> {
        &self.rotation
    }

    pub fn angular_velocity(&self) -> &Vector3<f32> {
        &self.angular_velocity
    }

    pub fn tilt_angle(&self) -> f32 {
        self.tilt_angle
    }

    pub fn tilt_axis(&self) -> &Vector3<f32> {
        &self.tilt_axis
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use terrain::FlatTerrain;

    const DT: f32 = 1.0 / 60.0;

    fn balloons(n: usize) -> Vec<Balloon> {
        (0..n).map(|_| Balloon::new()).collect()
    }

    fn tick(house: &mut House, balloons: &[Balloon], seconds: f32) {
        let n = (seconds / DT).round() as usize;
        for _ in 0..n {
            house.apply_forces(balloons);
            house.update(DT);
        }
    }

    #[test]
    fn test_takeoff_threshold() {
        let mut house = House::new(Point3::origin());
        house.apply_forces(&balloons(House::BALLOON_THRESHOLD - 1));
        assert!(!house.is_taking_off());
        assert_eq!(house.phase(), TakeoffPhase::Grounded);
        house.apply_forces(&balloons(House::BALLOON_THRESHOLD));
        assert!(house.is_taking_off());
        assert_eq!(house.phase(), TakeoffPhase::Tension);
    }

    #[test]
    fn test_only_attached_balloons_count() {
        let mut all = balloons(House::BALLOON_THRESHOLD + 2);
        all[0].release();
        all[1].pop();
        all[2].pop();
        let mut house = House::new(Point3::origin());
        house.apply_forces(&all);
        assert_eq!(house.attached_balloon_count(), House::BALLOON_THRESHOLD - 1);
        assert!(!house.is_taking_off());
    }

    #[test]
    fn test_losing_balloons_resets() {
        let mut all = balloons(20);
        let mut house = House::new(Point3::origin());
        tick(&mut house, &all, 12.0);
        assert!(house.is_flying());
        for balloon in all.iter_mut().take(13) {
            balloon.release();
        }
        house.apply_forces(&all);
        assert!(!house.is_taking_off());
        assert!(!house.is_flying());
        assert_relative_eq!(house.takeoff_timer(), 0.0);
    }

    #[test]
    fn test_tension_stays_on_pad() {
        let all = balloons(20);
        let mut house = House::new(Point3::new(3.0, 0.0, -2.0));
        tick(&mut house, &all, 5.0);
        assert_eq!(house.phase(), TakeoffPhase::Tension);
        assert_relative_eq!(*house.position(), Point3::new(3.0, 0.0, -2.0));
    }

    #[test]
    fn test_lifts_off() {
        let all = balloons(20);
        let mut house = House::new(Point3::origin());
        tick(&mut house, &all, 15.0);
        assert!(house.is_flying());
        assert_eq!(house.phase(), TakeoffPhase::Flying);
        assert!(house.position().y > 1.0);
    }

    #[test]
    fn test_soft_ceiling() {
        let mut house = House::new(Point3::origin());
        house.body_mut().position.y = House::MAX_HEIGHT + 5.0;
        house.apply_forces(std::iter::empty());
        let expected = -House::MASS * dynamics::forces::GRAVITY - 5.0 * House::CEILING_STIFFNESS;
        assert_relative_eq!(house.body().force.y, expected, epsilon = 1e-3);
    }

    #[test]
    fn test_wind_only_when_flying() {
        let mut house = House::new(Point3::origin());
        house.set_wind(&Vector3::new(4.0, 100.0, 0.0));
        house.apply_forces(std::iter::empty());
        assert_relative_eq!(house.body().force.x, 0.0);
        house.body_mut().clear_force();

        let all = balloons(20);
        tick(&mut house, &all, 12.0);
        house.apply_forces(&all);
        let drag_x = -House::DRAG * house.velocity().x;
        assert_relative_eq!(house.body().force.x, 4.0 + drag_x, epsilon = 1e-3);
    }

    #[test]
    fn test_floor_without_terrain() {
        let mut house = House::new(Point3::new(0.0, 2.0, 0.0));
        house.body_mut().velocity.y = -10.0;
        house.update(DT);
        assert_relative_eq!(house.position().y, 2.0);
        assert_relative_eq!(house.velocity().y, 0.0);
    }

    #[test]
    fn test_terrain_pushes_up() {
        let mut house = House::new(Point3::origin());
        house.set_terrain(Arc::new(FlatTerrain::new(3.0)));
        house.body_mut().velocity = Vector3::new(1.0, -2.0, 0.0);
        house.update(DT);
        assert_relative_eq!(house.position().y, 3.0);
        assert_relative_eq!(house.velocity().y, 0.0);
        assert_relative_eq!(house.velocity().x, 0.95);
    }

    #[test]
    fn test_terrain_uses_highest_corner() {
        let mut house = House::new(Point3::origin());
        house.set_terrain(Arc::new(|x: f32, _z: f32| x));
        house.update(DT);
        assert_relative_eq!(house.position().y, House::WIDTH * 0.5);
    }

    #[test]
    fn test_hard_landing_bounces() {
        let mut house = House::new(Point3::new(0.0, 1.0, 0.0));
        house.set_terrain(Arc::new(FlatTerrain::new(1.0)));
        house.body_mut().velocity.y = -60.0;
        house.update(DT);
        assert_relative_eq!(house.position().y, 1.0);
        assert_relative_eq!(house.velocity().y, 6.0, epsilon = 1e-3);
    }

    #[test]
    fn test_tilts_under_steering() {
        let all = balloons(20);
        let mut house = House::new(Point3::origin());
        tick(&mut house, &all, 12.0);
        for _ in 0..600 {
            house.apply_forces(&all);
            house.apply_external_force(&Vector3::new(30.0, 0.0, 0.0));
            house.update(DT);
        }
        assert!(house.tilt_angle() > 0.05);
        assert!(house.tilt_angle() <= House::MAX_TILT_ANGLE);
        assert_relative_eq!(*house.tilt_axis(), -Vector3::z(), epsilon = 1e-3);
    }

    #[test]
    fn test_tether_anchor_ring() {
        let house = House::new(Point3::new(10.0, 0.0, 0.0));
        let first = house.tether_anchor(0, 4);
        assert_relative_eq!(first, Point3::new(10.0 - 0.18 + 0.1, 5.0, -2.0), epsilon = 1e-5);
        let third = house.tether_anchor(2, 4);
        assert_relative_eq!(third, Point3::new(10.0 - 0.18 - 0.1, 5.0, -2.0), epsilon = 1e-5);
    }

    #[test]
    fn test_world_aabb() {
        let house = House::new(Point3::new(1.0, 2.0, 3.0));
        let aabb = house.world_aabb();
        assert_relative_eq!(*aabb.min(), Point3::new(-1.5, 2.0, 0.5));
        assert_relative_eq!(*aabb.max(), Point3::new(3.5, 7.0, 5.5));
    }
}
