use std::{path::PathBuf, time::Duration};

use bevy::{log::LogPlugin, prelude::*};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;


mod domain;
mod interface;
mod profile;
mod resource;
mod scheduler;
mod simulator;

use crate::{
    domain::{ControlMessage, MapSize, Navigator, SimulationContext},
    interface::QueueMailbox,
    profile::{EnvironmentProfile, ProfileError, RobotProfile},
    resource::{ContextRes, EnvironmentRes, MailboxRes, NavigatorRes, RobotRes},
    scheduler::{Configuration, Scheduler},
    simulator::Simulator,
};

#[derive(Parser, Debug)]
#[command(
    name = "rover-tour",
    about = "Robot touring the objects of a simulated environment"
)]
struct Cli {
    /// Robot profile, its file name starts with the robot's port
    robot: PathBuf,

    /// Environment profile, its file name starts with the environment's port
    environment: PathBuf,

    #[arg(long, default_value_t = 1000)]
    map_width: u32,

    #[arg(long, default_value_t = 800)]
    map_height: u32,

    /// Pause between two ticks
    #[arg(long, value_name = "MILLISECONDS", default_value_t = 100)]
    delay_ms: u64,

    /// Stop after this many ticks
    #[arg(long)]
    ticks: Option<u64>,

    /// Seed for the random placement of objects
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() {
    let cli = Cli::parse();

    let mut app = App::new();
    app.add_plugins(LogPlugin::default())
        .add_plugins(
            Scheduler::new(Duration::from_millis(cli.delay_ms)).with_tick_limit(cli.ticks),
        )
        .add_plugins(Simulator);

    match load(&cli) {
        Ok((robot, environment)) => {
            info!(
                "robot `{}` on port {}, environment `{}` on port {} with {} objects",
                robot.command,
                robot.port,
                environment.command,
                environment.port,
                environment.environment.objects().len()
            );
            let mailbox = QueueMailbox::default();
            mailbox.send(ControlMessage::Start);

            app.insert_resource(Configuration::Loaded)
                .insert_resource(RobotRes::from(robot.robot))
                .insert_resource(NavigatorRes::from(Navigator::default()))
                .insert_resource(EnvironmentRes::from(environment.environment))
                .insert_resource(ContextRes::from(SimulationContext::new(environment.port)))
                .insert_resource(MailboxRes::from(mailbox));
        }
        Err(error) => {
            error!("{error}");
            app.insert_resource(Configuration::Failed(error.to_string()));
        }
    }

    app.run();
}

fn load(cli: &Cli) -> Result<(RobotProfile, EnvironmentProfile), ProfileError> {
    let map = MapSize::new(cli.map_width, cli.map_height);
    let mut rng = ChaCha8Rng::seed_from_u64(cli.seed);

    let robot = RobotProfile::load(&cli.robot)?;
    let environment = EnvironmentProfile::load(&cli.environment, map, &mut rng)?;
    Ok((robot, environment))
}
