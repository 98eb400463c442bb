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
mod command;
mod config;
mod time_step;

pub use crate::{
    command::{PendingCommands, PilotInput, SimCommand, Tether},
    config::{Landscape, SceneConfig, SceneError},
    time_step::TimeStep,
};

use anyhow::Result;
use balloon::{first_tied, Balloon, BalloonStyle};
use beacon::Beacon;
use bevy_ecs::{prelude::*, schedule::Stage};
use house::{House, TakeoffPhase};
use log::{info, warn};
use nalgebra::{Point3, Vector3};
use pilot::{Autopilot, AutopilotPhase, ManualControl};
use std::sync::Arc;
use terrain::{FlatTerrain, PlacementRegion, TepuiTerrain, TerrainHeight};

#[derive(Clone, Debug, Eq, PartialEq, Hash, StageLabel)]
pub enum SimStage {
    Simulate,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, SystemLabel)]
pub enum SimStep {
    ApplyCommands,
    BalloonPhysics,
    BalloonCollisions,
    HouseForces,
    Steering,
    HouseIntegrate,
    FollowHouse,
}

/// State of the scene after a tick, for drivers that do not want to reach into the
/// world.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub tick: u64,
    pub elapsed: f32,
    pub house_position: Point3<f32>,
    pub house_velocity: Vector3<f32>,
    pub takeoff_phase: TakeoffPhase,
    pub tilt_angle: f32,
    pub attached_balloons: usize,
    pub popped_balloons: usize,
    pub autopilot_phase: AutopilotPhase,
    pub beacon_position: Point3<f32>,
    pub distance_to_beacon: f32,
    pub over_beacon: bool,
}

/// A house, its balloons and a beacon to fly to.
pub struct Simulation {
    world: World,
    schedule: Schedule,
    house: Entity,
    balloons: Vec<Entity>,
}

impl Simulation {
    pub fn new(config: SceneConfig) -> Result<Self> {
        config.validate()?;

        let (terrain, house_position, beacon_region) = match config.landscape {
            Landscape::Flat { height } => {
                let terrain: Arc<dyn TerrainHeight> = Arc::new(FlatTerrain::new(height));
                let region = PlacementRegion {
                    x: 30.0..40.0,
                    z: -5.0..5.0,
                };
                (terrain, Point3::new(0.0, height, 0.0), region)
            }
            Landscape::Tepui {
                size,
                max_height,
                resolution,
            } => {
                let tepui = TepuiTerrain::new(size, max_height);
                let peak = tepui.peak(resolution);
                let region = tepui.landing_region(peak.x);
                let terrain: Arc<dyn TerrainHeight> = Arc::new(tepui);
                (terrain, peak, region)
            }
        };

        let mut rng = fastrand::Rng::with_seed(config.seed);
        let beacon = Beacon::placed(&*terrain, &beacon_region, &mut rng);

        let mut house = House::new(house_position);
        house.set_terrain(terrain);
        house.set_wind(&config.wind);

        let mut autopilot = Autopilot::default();
        autopilot.set_enabled(config.autopilot);

        let mut world = World::new();
        world.insert_resource(TimeStep::new(config.max_step));
        world.insert_resource(PendingCommands::default());
        world.insert_resource(PilotInput::default());
        world.insert_resource(ManualControl::default());
        world.insert_resource(autopilot);
        info!(
            "house at {}, beacon at {}",
            house_position,
            beacon.position()
        );
        world.insert_resource(beacon);

        let balloons = (0..config.balloon_count)
            .map(|index| {
                let mut balloon = Balloon::new();
                balloon.attach(config.rope_length);
                balloon.set_anchor(&house.tether_anchor(index, config.balloon_count));
                world
                    .spawn((balloon, Tether { index }, BalloonStyle::for_index(index)))
                    .id()
            })
            .collect();
        let house = world.spawn(house).id();

        let mut sim = Self {
            world,
            schedule: Schedule::default(),
            house,
            balloons,
        };
        sim.schedule
            .add_stage(SimStage::Simulate, SystemStage::single_threaded());
        sim.add_sim_system(Self::sys_apply_commands.label(SimStep::ApplyCommands));
        sim.add_sim_system(
            Self::sys_balloon_physics
                .label(SimStep::BalloonPhysics)
                .after(SimStep::ApplyCommands),
        );
        sim.add_sim_system(
            Self::sys_balloon_collisions
                .label(SimStep::BalloonCollisions)
                .after(SimStep::BalloonPhysics),
        );
        sim.add_sim_system(
            Self::sys_house_forces
                .label(SimStep::HouseForces)
                .after(SimStep::BalloonCollisions),
        );
        sim.add_sim_system(
            Self::sys_steering
                .label(SimStep::Steering)
                .after(SimStep::HouseForces),
        );
        sim.add_sim_system(
            Self::sys_house_integrate
                .label(SimStep::HouseIntegrate)
                .after(SimStep::Steering),
        );
        sim.add_sim_system(
            Self::sys_follow_house
                .label(SimStep::FollowHouse)
                .after(SimStep::HouseIntegrate),
        );
        sim.add_sim_system(Self::sys_animate_beacon.after(SimStep::HouseIntegrate));

        info!("scene ready with {} balloons", config.balloon_count);
        Ok(sim)
    }

    fn add_sim_system<Params>(&mut self, system: impl IntoSystemDescriptor<Params>) {
        self.schedule.add_system_to_stage(SimStage::Simulate, system);
    }

    pub fn push_command(&mut self, command: SimCommand) {
        self.world.resource_mut::<PendingCommands>().push(command);
    }

    /// Run one tick with a frame delta of `dt` seconds.
    pub fn step(&mut self, dt: f32) -> Result<(), SceneError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(SceneError::InvalidTimeStep(dt));
        }
        self.world.resource_mut::<TimeStep>().advance(dt);
        self.schedule.run(&mut self.world);
        Ok(())
    }

    pub fn house(&self) -> Option<&House> {
        self.world.get::<House>(self.house)
    }

    /// Balloons in chimney ring order.
    pub fn balloons(&self) -> impl Iterator<Item = &Balloon> + '_ {
        self.balloons
            .iter()
            .filter_map(|entity| self.world.get::<Balloon>(*entity))
    }

    pub fn beacon(&self) -> &Beacon {
        self.world.resource::<Beacon>()
    }

    pub fn autopilot(&self) -> &Autopilot {
        self.world.resource::<Autopilot>()
    }

    pub fn time_step(&self) -> &TimeStep {
        self.world.resource::<TimeStep>()
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        let house = self.house()?;
        let beacon = self.beacon();
        let time_step = self.time_step();
        let offset = beacon.position() - house.position();
        Some(Snapshot {
            tick: time_step.tick(),
            elapsed: time_step.elapsed(),
            house_position: *house.position(),
            house_velocity: *house.velocity(),
            takeoff_phase: house.phase(),
            tilt_angle: house.tilt_angle(),
            attached_balloons: house.attached_balloon_count(),
            popped_balloons: self.balloons().filter(|b| b.is_popped()).count(),
            autopilot_phase: self.autopilot().phase(),
            beacon_position: *beacon.position(),
            distance_to_beacon: Vector3::new(offset.x, 0.0, offset.z).norm(),
            over_beacon: beacon.is_over(house.position()),
        })
    }

    // Balloons sorted by chimney ring slot.
    fn ring_order<'a>(
        balloons: &'a mut Query<(&Tether, &mut Balloon)>,
    ) -> Vec<Mut<'a, Balloon>> {
        let mut slots = balloons
            .iter_mut()
            .map(|(tether, balloon)| (tether.index, balloon))
            .collect::<Vec<_>>();
        slots.sort_by_key(|(index, _)| *index);
        slots.into_iter().map(|(_, balloon)| balloon).collect()
    }

    fn sys_apply_commands(
        mut pending: ResMut<PendingCommands>,
        mut autopilot: ResMut<Autopilot>,
        mut manual: ResMut<ManualControl>,
        mut pilot_input: ResMut<PilotInput>,
        mut balloons: Query<(&Tether, &mut Balloon)>,
    ) {
        if pending.is_empty() {
            return;
        }
        for command in pending.take() {
            match command {
                SimCommand::ReleaseBalloon => {
                    let mut ordered = Self::ring_order(&mut balloons);
                    match first_tied(ordered.iter_mut().map(|balloon| &mut **balloon)) {
                        Some((index, balloon)) => {
                            balloon.release();
                            info!("balloon {index} released");
                        }
                        None => warn!("no tied balloon left to release"),
                    }
                }
                SimCommand::PopBalloon => {
                    let mut ordered = Self::ring_order(&mut balloons);
                    match first_tied(ordered.iter_mut().map(|balloon| &mut **balloon)) {
                        Some((index, balloon)) => {
                            balloon.pop();
                            info!("balloon {index} popped");
                        }
                        None => warn!("no tied balloon left to pop"),
                    }
                }
                SimCommand::SetAutopilot(enabled) => autopilot.set_enabled(enabled),
                SimCommand::SetHeading(heading) => manual.set_heading(heading),
                SimCommand::Steer(input) => pilot_input.input = input,
            }
        }
    }

    fn sys_balloon_physics(timestep: Res<TimeStep>, mut balloons: Query<&mut Balloon>) {
        for mut balloon in balloons.iter_mut() {
            balloon.apply_forces();
            balloon.update(timestep.step());
        }
    }

    fn sys_balloon_collisions(mut balloons: Query<&mut Balloon>) {
        let mut pairs = balloons.iter_combinations_mut();
        while let Some([mut a, mut b]) = pairs.fetch_next() {
            a.collide_with(&mut b);
        }
    }

    fn sys_house_forces(mut houses: Query<&mut House>, balloons: Query<&Balloon>) {
        for mut house in houses.iter_mut() {
            house.apply_forces(balloons.iter());
        }
    }

    fn sys_steering(
        timestep: Res<TimeStep>,
        mut autopilot: ResMut<Autopilot>,
        manual: Res<ManualControl>,
        pilot_input: Res<PilotInput>,
        beacon: Res<Beacon>,
        mut houses: Query<&mut House>,
        mut balloons: Query<(&Tether, &mut Balloon)>,
    ) {
        for mut house in houses.iter_mut() {
            if !autopilot.is_enabled() {
                manual.apply(&mut house, &pilot_input.input);
                continue;
            }
            let mut ordered = Self::ring_order(&mut balloons);
            autopilot.update(
                &mut house,
                &beacon,
                ordered.iter_mut().map(|balloon| &mut **balloon),
                timestep.step(),
            );
        }
    }

    fn sys_house_integrate(timestep: Res<TimeStep>, mut houses: Query<&mut House>) {
        for mut house in houses.iter_mut() {
            house.update(timestep.step());
        }
    }

    fn sys_animate_beacon(timestep: Res<TimeStep>, mut beacon: ResMut<Beacon>) {
        beacon.update(timestep.step());
    }

    fn sys_follow_house(houses: Query<&House>, mut balloons: Query<(&Tether, &mut Balloon)>) {
        let house = match houses.get_single() {
            Ok(house) => house,
            Err(_) => return,
        };
        let count = balloons.iter().count();
        let bounds = house.world_aabb();
        for (tether, mut balloon) in balloons.iter_mut() {
            balloon.update_anchor(&house.tether_anchor(tether.index, count));
            balloon.set_house_bounds(bounds);
        }
    }
}
