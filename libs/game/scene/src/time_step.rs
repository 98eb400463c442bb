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
use log::debug;

/// The step every system integrates with this tick.
#[derive(Clone, Debug, Resource)]
pub struct TimeStep {
    step: f32,
    max_step: Option<f32>,
    elapsed: f32,
    tick: u64,
}

impl TimeStep {
    pub fn new(max_step: Option<f32>) -> Self {
        Self {
            step: 0.0,
            max_step,
            elapsed: 0.0,
            tick: 0,
        }
    }

    /// Take the next frame delta, clamped to the maximum step if there is one.
    pub fn advance(&mut self, frame_dt: f32) -> f32 {
        self.step = match self.max_step {
            Some(max_step) if frame_dt > max_step => {
                debug!("clamping frame step {frame_dt:.3}s to {max_step:.3}s");
                max_step
            }
            _ => frame_dt,
        };
        self.elapsed += self.step;
        self.tick += 1;
        self.step
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_clamps_spikes() {
        let mut ts = TimeStep::new(Some(0.1));
        assert_relative_eq!(ts.advance(0.05), 0.05);
        assert_relative_eq!(ts.advance(2.0), 0.1);
        assert_relative_eq!(ts.step(), 0.1);
        assert_relative_eq!(ts.elapsed(), 0.15, epsilon = 1e-6);
        assert_eq!(ts.tick(), 2);
    }

    #[test]
    fn test_unclamped() {
        let mut ts = TimeStep::new(None);
        assert_relative_eq!(ts.advance(2.0), 2.0);
    }
}
