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
use crate::House;
use nalgebra::{UnitQuaternion, Vector3};

impl House {
    pub const TILT_RESPONSE: f32 = 0.30;
    pub const TILT_DAMPING: f32 = 3.0;
    pub const MAX_TILT_ANGLE: f32 = 0.12;

    // Horizontal force above which the house leans into the push rather than into its
    // drift.
    const TILT_FORCE_THRESHOLD: f32 = 1.0;
    const TILT_AXIS_BLEND: f32 = 5.0;
    const TILT_STIFFNESS: f32 = 2.0;

    /// Lean the house into its horizontal motion. Purely cosmetic: nothing here feeds
    /// back into the linear state.
    pub(crate) fn update_tilt(&mut self, horizontal_force: &Vector3<f32>, dt: f32) {
        if !self.is_flying {
            self.angular_velocity *= 0.9;
            self.tilt_angle *= 0.9;
            return;
        }

        let horizontal_velocity = Vector3::new(self.body.velocity.x, 0.0, self.body.velocity.z);
        let force = horizontal_force.norm();
        let speed = horizontal_velocity.norm();
        let desired = if force > Self::TILT_FORCE_THRESHOLD {
            Some((
                horizontal_force / force,
                force / self.body.mass * Self::TILT_RESPONSE,
            ))
        } else if speed > 0.1 {
            Some((horizontal_velocity / speed, speed * Self::TILT_RESPONSE))
        } else {
            None
        };

        match desired {
            Some((direction, tilt)) => {
                let tilt = tilt.min(Self::MAX_TILT_ANGLE);
                let axis = Vector3::y().cross(&direction);
                self.blend_tilt_axis(&axis, (Self::TILT_AXIS_BLEND * dt).min(1.0));
                self.angular_velocity += axis * (tilt - self.tilt_angle) * Self::TILT_STIFFNESS * dt;
            }
            None => {
                self.angular_velocity -= self.angular_velocity * Self::TILT_STIFFNESS * dt;
            }
        }
        self.angular_velocity *= (1.0 - Self::TILT_DAMPING * dt).max(0.0);

        let rate = self.angular_velocity.dot(&self.tilt_axis);
        if desired.is_none() && self.angular_velocity.norm() < 0.001 {
            self.tilt_angle *= 0.95;
        } else {
            self.tilt_angle = (self.tilt_angle + rate * dt)
                .clamp(-Self::MAX_TILT_ANGLE, Self::MAX_TILT_ANGLE);
        }
    }

    // Both axes lie in the horizontal plane, so turn about +Y. A reversal is a half
    // turn rather than a shrink through zero.
    fn blend_tilt_axis(&mut self, target: &Vector3<f32>, t: f32) {
        let sin = self.tilt_axis.cross(target).y;
        let cos = self.tilt_axis.dot(target);
        let turn = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), sin.atan2(cos) * t);
        self.tilt_axis = turn * self.tilt_axis;
    }
}

#[cfg(test)]
mod test {
    use crate::House;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};

    #[test]
    fn test_grounded_settles_upright() {
        let mut house = House::new(Point3::origin());
        house.tilt_angle = 0.1;
        house.update_tilt(&Vector3::new(50.0, 0.0, 0.0), 0.1);
        assert_relative_eq!(house.tilt_angle, 0.09, epsilon = 1e-6);
    }

    #[test]
    fn test_drift_sets_axis() {
        let mut house = House::new(Point3::origin());
        house.is_flying = true;
        house.body.velocity = Vector3::new(0.0, 0.0, 2.0);
        for _ in 0..600 {
            house.update_tilt(&Vector3::zeros(), 1.0 / 60.0);
        }
        // y cross +z
        assert_relative_eq!(house.tilt_axis, Vector3::x(), epsilon = 1e-3);
        assert!(house.tilt_angle > 0.0);
        assert!(house.tilt_angle <= House::MAX_TILT_ANGLE);
    }

    #[test]
    fn test_reversal_turns_axis() {
        let mut house = House::new(Point3::origin());
        house.is_flying = true;
        house.body.velocity = Vector3::new(0.0, 0.0, 2.0);
        for _ in 0..600 {
            house.update_tilt(&Vector3::zeros(), 1.0 / 60.0);
        }
        assert_relative_eq!(house.tilt_axis, Vector3::x(), epsilon = 1e-3);

        house.body.velocity = Vector3::new(0.0, 0.0, -2.0);
        for _ in 0..6000 {
            house.update_tilt(&Vector3::zeros(), 1.0 / 60.0);
        }
        assert_relative_eq!(house.tilt_axis, -Vector3::x(), epsilon = 1e-3);
        assert_relative_eq!(house.tilt_axis.norm(), 1.0, epsilon = 1e-3);
        assert!(house.tilt_angle > 0.0);
    }

    #[test]
    fn test_axis_turns_partway() {
        let mut house = House::new(Point3::origin());
        house.is_flying = true;
        house.blend_tilt_axis(&-Vector3::z(), 0.5);
        let expected = Vector3::new(1.0, 0.0, -1.0).normalize();
        assert_relative_eq!(house.tilt_axis, expected, epsilon = 1e-5);
    }
}
