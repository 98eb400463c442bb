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
use balloon::{first_tied, Balloon};
use beacon::Beacon;
use bevy_ecs::prelude::*;
use house::House;
use log::{debug, info};
use nalgebra::{Point3, Vector3};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AutopilotPhase {
    /// Switched off, or the house is not flying yet.
    Disengaged,
    /// Far out: full thrust at the beacon.
    Cruise,
    /// Closing in: thrust scales down with distance.
    Approach,
    /// Inside the arrival radius: brake and nudge toward the center.
    Centering,
    /// Over the beacon: hold position and let balloons go one at a time.
    Landing,
}

/// Flies the house to the beacon and lands it there by shedding balloons. Owns none of
/// what it steers; the house, beacon and balloons are handed in every tick.
#[derive(Clone, Debug, Resource)]
pub struct Autopilot {
    enabled: bool,
    thrust_force: f32,
    arrival_distance: f32,
    release_timer: f32,
    phase: AutopilotPhase,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            enabled: true,
            thrust_force: Self::THRUST_FORCE,
            arrival_distance: Self::ARRIVAL_DISTANCE,
            release_timer: 0.0,
            phase: AutopilotPhase::Disengaged,
        }
    }
}

impl Autopilot {
    pub const THRUST_FORCE: f32 = 10.0;
    pub const ARRIVAL_DISTANCE: f32 = 5.0;
    pub const CRUISE_DISTANCE: f32 = 20.0;
    pub const CENTERED_DISTANCE: f32 = 1.5;
    pub const RELEASE_DELAY: f32 = 3.0;
    pub const APPROACH_FLOOR: f32 = 0.2;
    pub const CENTERING_BRAKE: f32 = 2.0;
    pub const CENTERING_STEER: f32 = 0.5;
    pub const LANDING_BRAKE: f32 = 5.0;
    pub const LANDING_CLEARANCE: f32 = 1.0;
    pub const FALLING_LIMIT: f32 = -0.1;

    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled != self.enabled {
            info!("autopilot {}", if enabled { "engaged" } else { "disengaged" });
        }
        self.enabled = enabled;
        if !enabled {
            self.release_timer = 0.0;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn phase(&self) -> AutopilotPhase {
        self.phase
    }

    pub fn release_timer(&self) -> f32 {
        self.release_timer
    }

    /// Which branch of the control loop applies at horizontal distance `dist`.
    pub fn phase_at(&self, dist: f32) -> AutopilotPhase {
        if dist >= Self::CRUISE_DISTANCE {
            AutopilotPhase::Cruise
        } else if dist >= self.arrival_distance {
            AutopilotPhase::Approach
        } else if dist >= Self::CENTERED_DISTANCE {
            AutopilotPhase::Centering
        } else {
            AutopilotPhase::Landing
        }
    }

    /// Thrust toward `target` in the horizontal plane. Zero when already overhead.
    pub fn steering_force(&self, from: &Point3<f32>, target: &Point3<f32>) -> Vector3<f32> {
        let direction = Vector3::new(target.x - from.x, 0.0, target.z - from.z);
        let length = direction.norm();
        if length < 0.001 {
            return Vector3::zeros();
        }
        direction / length * self.thrust_force
    }

    /// Push the house toward the beacon. Returns true when a balloon should be let go
    /// this tick.
    pub fn steer(&mut self, house: &mut House, beacon: &Beacon, dt: f32) -> bool {
        if !self.enabled || !house.is_flying() {
            self.enter(AutopilotPhase::Disengaged);
            return false;
        }

        let here = *house.position();
        let target = beacon.position();
        let dist = Vector3::new(target.x - here.x, 0.0, target.z - here.z).norm();
        let phase = self.phase_at(dist);
        self.enter(phase);

        match phase {
            AutopilotPhase::Disengaged => false,
            AutopilotPhase::Cruise => {
                self.release_timer = 0.0;
                house.apply_external_force(&self.steering_force(&here, target));
                false
            }
            AutopilotPhase::Approach => {
                self.release_timer = 0.0;
                let factor = (dist / Self::CRUISE_DISTANCE).max(Self::APPROACH_FLOOR);
                house.apply_external_force(&(self.steering_force(&here, target) * factor));
                false
            }
            AutopilotPhase::Centering => {
                let brake = house.velocity() * -Self::CENTERING_BRAKE;
                house.apply_external_force(&brake);
                let steer = self.steering_force(&here, target) * Self::CENTERING_STEER;
                house.apply_external_force(&steer);
                false
            }
            AutopilotPhase::Landing => {
                let velocity = *house.velocity();
                let brake = Vector3::new(-velocity.x, 0.0, -velocity.z) * Self::LANDING_BRAKE;
                house.apply_external_force(&brake);

                if house.attached_balloon_count() == 0
                    || here.y <= beacon.height() + Self::LANDING_CLEARANCE
                {
                    return false;
                }
                self.release_timer += dt;
                if self.release_timer > Self::RELEASE_DELAY && velocity.y >= Self::FALLING_LIMIT {
                    self.release_timer = 0.0;
                    debug!("centered {dist:.2} from the beacon, shedding a balloon");
                    return true;
                }
                false
            }
        }
    }

    /// Steer, and let go of the first balloon still tied on when it is time. Balloons
    /// come in chimney ring order. Returns the ring index of the released balloon.
    pub fn update<'a>(
        &mut self,
        house: &mut House,
        beacon: &Beacon,
        balloons: impl IntoIterator<Item = &'a mut Balloon>,
        dt: f32,
    ) -> Option<usize> {
        if !self.steer(house, beacon, dt) {
            return None;
        }
        let (index, balloon) = first_tied(balloons)?;
        balloon.release();
        info!("autopilot released balloon {index} for landing");
        Some(index)
    }

    fn enter(&mut self, phase: AutopilotPhase) {
        if phase != self.phase {
            info!("autopilot {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_util::airborne_house;
    use approx::assert_relative_eq;

    fn beacon() -> Beacon {
        Beacon::new(Point3::origin(), 5.0, 20.0)
    }

    /// Hover `dist` east of the beacon at rest, steer once and return the force.
    fn force_at(dist: f32) -> (AutopilotPhase, Vector3<f32>) {
        let (mut house, _balloons) = airborne_house();
        let mut autopilot = Autopilot::default();
        house.body_mut().position = Point3::new(dist, 30.0, 0.0);
        house.body_mut().velocity = Vector3::zeros();
        house.body_mut().clear_force();
        autopilot.steer(&mut house, &beacon(), 1.0 / 60.0);
        (autopilot.phase(), house.body().force)
    }

    #[test]
    fn test_cruise_boundary() {
        let (phase, force) = force_at(20.0);
        assert_eq!(phase, AutopilotPhase::Cruise);
        assert_relative_eq!(force, Vector3::new(-10.0, 0.0, 0.0), epsilon = 1e-4);

        let (phase, force) = force_at(19.9);
        assert_eq!(phase, AutopilotPhase::Approach);
        assert_relative_eq!(force.x, -10.0 * 19.9 / 20.0, epsilon = 1e-4);
    }

    #[test]
    fn test_arrival_boundary() {
        let (phase, force) = force_at(5.0);
        assert_eq!(phase, AutopilotPhase::Approach);
        assert_relative_eq!(force.x, -2.5, epsilon = 1e-4);

        let (phase, force) = force_at(4.9);
        assert_eq!(phase, AutopilotPhase::Centering);
        assert_relative_eq!(force.x, -5.0, epsilon = 1e-4);
    }

    #[test]
    fn test_centered_boundary() {
        let (phase, force) = force_at(1.5);
        assert_eq!(phase, AutopilotPhase::Centering);
        assert_relative_eq!(force.x, -5.0, epsilon = 1e-4);

        let (phase, force) = force_at(1.4);
        assert_eq!(phase, AutopilotPhase::Landing);
        assert_relative_eq!(force, Vector3::zeros());
    }

    #[test]
    fn test_approach_floor() {
        let mut autopilot = Autopilot::default();
        autopilot.arrival_distance = 1.0;
        let (mut house, _balloons) = airborne_house();
        house.body_mut().position = Point3::new(2.0, 30.0, 0.0);
        house.body_mut().velocity = Vector3::zeros();
        house.body_mut().clear_force();
        autopilot.steer(&mut house, &beacon(), 0.1);
        assert_eq!(autopilot.phase(), AutopilotPhase::Approach);
        assert_relative_eq!(house.body().force.x, -10.0 * Autopilot::APPROACH_FLOOR, epsilon = 1e-4);
    }

    #[test]
    fn test_centering_brakes() {
        let (mut house, _balloons) = airborne_house();
        let mut autopilot = Autopilot::default();
        house.body_mut().position = Point3::new(0.0, 30.0, 3.0);
        house.body_mut().velocity = Vector3::new(1.0, 2.0, 0.0);
        house.body_mut().clear_force();
        autopilot.steer(&mut house, &beacon(), 0.1);
        assert_relative_eq!(
            house.body().force,
            Vector3::new(-2.0, -4.0, -5.0),
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_grounded_house_is_ignored() {
        let mut house = House::new(Point3::new(50.0, 0.0, 0.0));
        let mut autopilot = Autopilot::default();
        assert!(!autopilot.steer(&mut house, &beacon(), 0.1));
        assert_eq!(autopilot.phase(), AutopilotPhase::Disengaged);
        assert_relative_eq!(house.body().force, Vector3::zeros());
    }

    #[test]
    fn test_disabled() {
        let (mut house, _balloons) = airborne_house();
        let mut autopilot = Autopilot::default();
        autopilot.set_enabled(false);
        house.body_mut().clear_force();
        assert!(!autopilot.steer(&mut house, &beacon(), 0.1));
        assert_relative_eq!(house.body().force, Vector3::zeros());
    }

    #[test]
    fn test_releases_one_balloon_after_delay() {
        let (mut house, mut balloons) = airborne_house();
        let mut autopilot = Autopilot::default();
        house.body_mut().position = Point3::new(0.5, 30.0, 0.0);
        house.body_mut().velocity = Vector3::zeros();
        for _ in 0..3 {
            assert_eq!(autopilot.update(&mut house, &beacon(), balloons.iter_mut(), 1.0), None);
        }
        assert_eq!(autopilot.update(&mut house, &beacon(), balloons.iter_mut(), 1.0), Some(0));
        assert!(!balloons[0].is_attached());
        assert!(balloons[1..].iter().all(|balloon| balloon.is_attached()));
        assert_relative_eq!(autopilot.release_timer(), 0.0);
    }

    #[test]
    fn test_no_release_while_falling() {
        let (mut house, mut balloons) = airborne_house();
        let mut autopilot = Autopilot::default();
        house.body_mut().position = Point3::new(0.0, 30.0, 0.0);
        house.body_mut().velocity = Vector3::new(0.0, -1.0, 0.0);
        for _ in 0..10 {
            assert_eq!(autopilot.update(&mut house, &beacon(), balloons.iter_mut(), 1.0), None);
        }
        house.body_mut().velocity = Vector3::zeros();
        assert_eq!(autopilot.update(&mut house, &beacon(), balloons.iter_mut(), 1.0), Some(0));
    }

    #[test]
    fn test_no_release_below_beacon_height() {
        let (mut house, mut balloons) = airborne_house();
        let mut autopilot = Autopilot::default();
        house.body_mut().position = Point3::new(0.0, 10.0, 0.0);
        house.body_mut().velocity = Vector3::zeros();
        for _ in 0..10 {
            assert_eq!(autopilot.update(&mut house, &beacon(), balloons.iter_mut(), 1.0), None);
        }
        assert_relative_eq!(autopilot.release_timer(), 0.0);
        assert!(balloons.iter().all(|balloon| balloon.is_attached()));

        house.body_mut().position.y = beacon().height() + 0.5;
        for _ in 0..10 {
            assert_eq!(autopilot.update(&mut house, &beacon(), balloons.iter_mut(), 1.0), None);
        }

        house.body_mut().position.y = beacon().height() + 2.0;
        for _ in 0..3 {
            assert_eq!(autopilot.update(&mut house, &beacon(), balloons.iter_mut(), 1.0), None);
        }
        assert_eq!(autopilot.update(&mut house, &beacon(), balloons.iter_mut(), 1.0), Some(0));
    }

    #[test]
    fn test_leaving_arrival_radius_resets_timer() {
        let (mut house, _balloons) = airborne_house();
        let mut autopilot = Autopilot::default();
        house.body_mut().position = Point3::new(0.0, 30.0, 0.0);
        house.body_mut().velocity = Vector3::zeros();
        autopilot.steer(&mut house, &beacon(), 2.0);
        assert_relative_eq!(autopilot.release_timer(), 2.0);

        house.body_mut().position = Point3::new(3.0, 30.0, 0.0);
        autopilot.steer(&mut house, &beacon(), 1.0);
        assert_relative_eq!(autopilot.release_timer(), 2.0);

        house.body_mut().position = Point3::new(8.0, 30.0, 0.0);
        autopilot.steer(&mut house, &beacon(), 1.0);
        assert_relative_eq!(autopilot.release_timer(), 0.0);
    }
}
