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
use anyhow::{ensure, Result};
use log::info;
use nalgebra::Vector3;
use pilot::ControlInput;
use scene::{Landscape, SceneConfig, SimCommand, Simulation};
use structopt::StructOpt;

/// Fly a house on balloons to the beacon, headless
#[derive(Debug, StructOpt)]
struct Opt {
    /// Number of ticks to simulate
    #[structopt(short, long, default_value = "3600")]
    ticks: usize,

    /// Frame delta in seconds
    #[structopt(long, default_value = "0.0166667")]
    dt: f32,

    /// Balloons tied to the chimney
    #[structopt(short, long, default_value = "15")]
    balloons: usize,

    /// Largest step handed to the integrators; 0 to disable clamping
    #[structopt(long, default_value = "0.1")]
    max_step: f32,

    /// Seed for beacon placement
    #[structopt(long, default_value = "0")]
    seed: u64,

    /// Hold the forward key instead of flying with the autopilot
    #[structopt(long)]
    manual: bool,

    /// Yaw in radians that manual steering treats as forward
    #[structopt(long, default_value = "0")]
    heading: f32,

    /// Start on flat ground instead of the tepuis
    #[structopt(long)]
    flat: bool,

    /// Wind pushing east, in newtons
    #[structopt(long, default_value = "0")]
    wind: f32,

    /// Let a balloon go every N ticks
    #[structopt(long)]
    release_every: Option<usize>,

    /// Pop a balloon at each of these ticks
    #[structopt(long)]
    pop_at: Vec<usize>,
}

fn main() -> Result<()> {
    env_logger::init();
    let opt = Opt::from_args();
    ensure!(opt.dt.is_finite() && opt.dt > 0.0, "--dt must be positive");
    ensure!(opt.heading.is_finite(), "--heading must be finite");
    ensure!(opt.max_step >= 0.0, "--max-step must not be negative");
    ensure!(
        opt.release_every != Some(0),
        "--release-every must be at least 1"
    );

    let config = SceneConfig {
        balloon_count: opt.balloons,
        max_step: if opt.max_step > 0.0 {
            Some(opt.max_step)
        } else {
            None
        },
        seed: opt.seed,
        autopilot: !opt.manual,
        wind: Vector3::new(opt.wind, 0.0, 0.0),
        landscape: if opt.flat {
            Landscape::Flat { height: 0.0 }
        } else {
            Landscape::default()
        },
        ..Default::default()
    };
    let mut sim = Simulation::new(config)?;
    if opt.manual {
        sim.push_command(SimCommand::SetHeading(opt.heading));
        sim.push_command(SimCommand::Steer(ControlInput {
            forward: true,
            ..Default::default()
        }));
    }

    let ticks_per_report = ((1.0 / opt.dt).round() as usize).max(1);
    for tick in 1..=opt.ticks {
        if opt.pop_at.contains(&tick) {
            sim.push_command(SimCommand::PopBalloon);
        }
        if let Some(every) = opt.release_every {
            if tick % every == 0 {
                sim.push_command(SimCommand::ReleaseBalloon);
            }
        }
        sim.step(opt.dt)?;

        if tick % ticks_per_report == 0 || tick == opt.ticks {
            if let Some(snapshot) = sim.snapshot() {
                println!(
                    "t={:6.2}s pos=({:7.2}, {:6.2}, {:7.2}) {:?} balloons={} popped={} autopilot={:?} beacon={:.2}{}",
                    snapshot.elapsed,
                    snapshot.house_position.x,
                    snapshot.house_position.y,
                    snapshot.house_position.z,
                    snapshot.takeoff_phase,
                    snapshot.attached_balloons,
                    snapshot.popped_balloons,
                    snapshot.autopilot_phase,
                    snapshot.distance_to_beacon,
                    if snapshot.over_beacon { " (over)" } else { "" },
                );
            }
        }
    }

    info!("simulated {} ticks", opt.ticks);
    Ok(())
}
