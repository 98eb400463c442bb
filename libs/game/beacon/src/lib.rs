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
use bevy_ecs::prelude::*;
use log::{debug, warn};
use nalgebra::{Point3, Vector2};
use terrain::{PlacementRegion, TerrainHeight};

/// The landing target.
#[derive(Clone, Debug, Resource)]
pub struct Beacon {
    position: Point3<f32>,
    radius: f32,
    height: f32,
    animation_time: f32,
    animation_speed: f32,
}

impl Default for Beacon {
    fn default() -> Self {
        Self::new(Point3::origin(), Self::DEFAULT_RADIUS, Self::DEFAULT_HEIGHT)
    }
}

impl Beacon {
    pub const DEFAULT_RADIUS: f32 = 5.0;
    pub const DEFAULT_HEIGHT: f32 = 20.0;
    pub const MAX_SLOPE: f32 = 0.15;
    pub const MAX_PLACEMENT_ATTEMPTS: usize = 100;
    pub const SLOPE_SAMPLE_DISTANCE: f32 = 0.5;
    pub const ANIMATION_PERIOD: f32 = 100.0;

    pub fn new(position: Point3<f32>, radius: f32, height: f32) -> Self {
        Self {
            position,
            radius,
            height,
            animation_time: 0.0,
            animation_speed: 1.0,
        }
    }

    /// Put a default-sized beacon on a flat spot inside `region`.
    pub fn placed<T>(terrain: &T, region: &PlacementRegion, rng: &mut fastrand::Rng) -> Self
    where
        T: TerrainHeight + ?Sized,
    {
        Self::new(
            Self::place(terrain, region, rng),
            Self::DEFAULT_RADIUS,
            Self::DEFAULT_HEIGHT,
        )
    }

    /// Pick a random point in `region` whose slope is below `MAX_SLOPE`. After
    /// `MAX_PLACEMENT_ATTEMPTS` misses the last candidate is used anyway.
    pub fn place<T>(terrain: &T, region: &PlacementRegion, rng: &mut fastrand::Rng) -> Point3<f32>
    where
        T: TerrainHeight + ?Sized,
    {
        let mut candidate = Point3::origin();
        for attempt in 1..=Self::MAX_PLACEMENT_ATTEMPTS {
            let x = region.x.start + (region.x.end - region.x.start) * rng.f32();
            let z = region.z.start + (region.z.end - region.z.start) * rng.f32();
            candidate = Point3::new(x, terrain.height_at(x, z), z);
            if Self::slope_at(terrain, x, z) < Self::MAX_SLOPE {
                debug!("beacon placed at {candidate} after {attempt} attempts");
                return candidate;
            }
        }
        warn!(
            "no flat spot for the beacon after {} attempts; using {}",
            Self::MAX_PLACEMENT_ATTEMPTS,
            candidate
        );
        candidate
    }

    /// Rise over run of the terrain at (x, z), from central differences.
    pub fn slope_at<T>(terrain: &T, x: f32, z: f32) -> f32
    where
        T: TerrainHeight + ?Sized,
    {
        let d = Self::SLOPE_SAMPLE_DISTANCE;
        let dx = terrain.height_at(x + d, z) - terrain.height_at(x - d, z);
        let dz = terrain.height_at(x, z + d) - terrain.height_at(x, z - d);
        (Vector2::new(dx, dz) / (2.0 * d)).norm()
    }

    pub fn update(&mut self, dt: f32) {
        self.animation_time += dt * self.animation_speed;
        if self.animation_time > Self::ANIMATION_PERIOD {
            self.animation_time -= Self::ANIMATION_PERIOD;
        }
    }

    /// Whether `p` is inside the beacon column, ignoring height.
    pub fn is_over(&self, p: &Point3<f32>) -> bool {
        Vector2::new(p.x - self.position.x, p.z - self.position.z).norm() <= self.radius
    }

    pub fn position(&self) -> &Point3<f32> {
        &self.position
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn animation_time(&self) -> f32 {
        self.animation_time
    }
}
