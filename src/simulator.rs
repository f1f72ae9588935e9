//! Simulation of the robot touring the objects of the environment.
//!
//! Each tick the environment takes at most one control message from its mailbox. While the
//! simulation is started the movable objects advance, the robot plans or follows its route and
//! every newly touched object is sent a bump, which the environment receives on a later tick.

use std::collections::BTreeSet;

use bevy::prelude::*;

use crate::{
    domain::{Bump, ControlMessage, EnvObject, HasCollision, Step},
    interface::ProximitySensor,
    resource::{ContextRes, EnvironmentRes, MailboxRes, NavigatorRes, RobotRes},
    scheduler::configuration_loaded,
};

pub struct Simulator;

impl Plugin for Simulator {
    fn build(&self, app: &mut App) {
        app.init_resource::<Contacts>().add_systems(
            Update,
            (
                poll_messages,
                (act_environment, drive_robot, detect_collisions)
                    .chain()
                    .run_if(simulation_started),
            )
                .chain()
                .run_if(configuration_loaded),
        );
    }
}

/// Ids of the objects the robot touched on the previous tick.
#[derive(Resource, Default)]
pub struct Contacts(BTreeSet<u32>);

fn simulation_started(context: Option<Res<ContextRes>>) -> bool {
    context.is_some_and(|context| context.is_started())
}

fn poll_messages(
    mut context: ResMut<ContextRes>,
    mut mailbox: ResMut<MailboxRes>,
    mut environment: ResMut<EnvironmentRes>,
) {
    let state = context.state();
    let Some(bump) = context.poll(&mut **mailbox) else {
        if context.state() != state {
            info!("simulation {:?}", context.state());
        }
        return;
    };

    match environment.dispatch_bump(bump) {
        Some(id) => info!("object {id} bumped"),
        None => warn!("no object for bump target {}", bump.target_id),
    }
}

fn act_environment(mut environment: ResMut<EnvironmentRes>) {
    environment.advance();
}

fn drive_robot(
    mut robot: ResMut<RobotRes>,
    mut navigator: ResMut<NavigatorRes>,
    environment: Res<EnvironmentRes>,
    mut tour_complete: Local<bool>,
) {
    let mut sensor = ProximitySensor::new(&environment, robot.visibility_radius());

    match navigator.step(&mut **robot, &mut sensor) {
        Ok(Step::Idle) => {}
        Ok(Step::Moved {
            target,
            position,
            planned,
        }) => {
            if planned {
                if let Some(route) = navigator.route() {
                    info!(
                        "planned route over {} objects: {route}",
                        navigator.objects().len()
                    );
                }
            }
            *tour_complete = false;
            debug!("moved to {position} towards node {target}");
        }
        Ok(Step::TourComplete) => {
            if !*tour_complete {
                info!("tour complete");
                *tour_complete = true;
            }
        }
        Err(error) => error!("robot step failed: {error}"),
    }
}

fn detect_collisions(
    robot: Res<RobotRes>,
    environment: Res<EnvironmentRes>,
    mailbox: Res<MailboxRes>,
    mut contacts: ResMut<Contacts>,
) {
    let touching = environment
        .objects()
        .iter()
        .filter(|object| robot.has_collision(*object))
        .map(EnvObject::id)
        .collect::<BTreeSet<_>>();

    for id in touching.difference(&contacts.0) {
        debug!("robot touches object {id}");
        mailbox.send(ControlMessage::Bump(Bump::for_object(*id)));
    }
    contacts.0 = touching;
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        domain::{
            Actuator, Angle, Environment, MapSize, Movability, Navigator, Point, Robot,
            SimulationContext, SimulationState, Velocity,
        },
        interface::QueueMailbox,
        scheduler::Configuration,
    };

    fn app(robot: Robot, objects: Vec<EnvObject>, configuration: Configuration) -> App {
        let environment = Environment::new(objects, MapSize::new(200, 200)).unwrap();
        let mut app = App::new();
        app.add_plugins(Simulator)
            .insert_resource(configuration)
            .insert_resource(RobotRes::from(robot))
            .insert_resource(NavigatorRes::from(Navigator::default()))
            .insert_resource(EnvironmentRes::from(environment))
            .insert_resource(ContextRes::from(SimulationContext::new(5000)))
            .insert_resource(MailboxRes::from(QueueMailbox::default()));
        app
    }

    fn send(app: &App, message: ControlMessage) {
        app.world.resource::<MailboxRes>().send(message);
    }

    fn robot_position(app: &App) -> Point {
        app.world.resource::<RobotRes>().position()
    }

    fn far_objects() -> Vec<EnvObject> {
        vec![EnvObject::new(0, Point::new(0, 50), 2)]
    }

    #[test]
    fn test_simulator_waits_for_start() {
        let mut app = app(
            Robot::new(Point::new(0, 0), 2, Velocity::new(5.0)),
            far_objects(),
            Configuration::Loaded,
        );

        app.update();
        app.update();

        assert_eq!(robot_position(&app), Point::new(0, 0));
        assert_eq!(app.world.resource::<ContextRes>().state(), None);
        assert_eq!(app.world.resource::<NavigatorRes>().route(), None);
    }

    #[test]
    fn test_simulator_start_pause_resume() {
        let mut app = app(
            Robot::new(Point::new(0, 0), 2, Velocity::new(5.0)),
            far_objects(),
            Configuration::Loaded,
        );

        send(&app, ControlMessage::Start);
        app.update();
        assert_eq!(robot_position(&app), Point::new(0, 5));

        send(&app, ControlMessage::Pause);
        app.update();
        app.update();
        assert_eq!(
            app.world.resource::<ContextRes>().state(),
            Some(SimulationState::Paused)
        );
        assert_eq!(robot_position(&app), Point::new(0, 5));

        send(&app, ControlMessage::Start);
        app.update();
        assert_eq!(robot_position(&app), Point::new(0, 10));
    }

    #[test]
    fn test_simulator_idle_without_configuration() {
        let mut app = app(
            Robot::new(Point::new(0, 0), 2, Velocity::new(5.0)),
            far_objects(),
            Configuration::Failed("port mismatch".into()),
        );

        send(&app, ControlMessage::Start);
        app.update();

        assert_eq!(robot_position(&app), Point::new(0, 0));
        assert_eq!(app.world.resource::<ContextRes>().state(), None);
        assert_eq!(app.world.resource::<MailboxRes>().len(), 1);
    }

    #[test]
    fn test_simulator_bumps_touched_objects_once() {
        let mut app = app(
            Robot::new(Point::new(0, 0), 20, Velocity::new(5.0)),
            vec![
                EnvObject::new(0, Point::new(0, 8), 2),
                EnvObject::new(1, Point::new(8, 8), 2),
                EnvObject::new(2, Point::new(8, 0), 2),
            ],
            Configuration::Loaded,
        );

        send(&app, ControlMessage::Start);
        app.update();
        assert_eq!(robot_position(&app), Point::new(0, 5));
        assert_eq!(app.world.resource::<MailboxRes>().len(), 3);

        app.update();
        assert_eq!(robot_position(&app), Point::new(4, 6));
        assert_eq!(app.world.resource::<MailboxRes>().len(), 2);

        let environment = app.world.resource::<EnvironmentRes>();
        assert_eq!(environment.object(0).map(EnvObject::bumps), Some(1));
        assert_eq!(
            environment.object(0).and_then(EnvObject::last_bump),
            Some(Bump { target_id: 1 })
        );
        assert_eq!(environment.object(1).map(EnvObject::bumps), Some(0));
        assert_eq!(environment.object(2).map(EnvObject::bumps), Some(0));
    }

    #[test]
    fn test_simulator_advances_movable_objects_while_started() {
        let mut app = app(
            Robot::new(Point::new(0, 0), 2, Velocity::new(1.0)),
            vec![
                EnvObject::new(0, Point::new(100, 100), 2)
                    .with_movability(Movability::Movable)
                    .with_motion(Velocity::new(3.0), Angle::from_deg(0.0)),
                EnvObject::new(1, Point::new(150, 150), 2)
                    .with_motion(Velocity::new(3.0), Angle::from_deg(0.0)),
            ],
            Configuration::Loaded,
        );

        app.update();
        send(&app, ControlMessage::Start);
        app.update();
        app.update();

        let environment = app.world.resource::<EnvironmentRes>();
        assert_eq!(
            environment.object(0).map(EnvObject::position),
            Some(Point::new(106, 100))
        );
        assert_eq!(
            environment.object(1).map(EnvObject::position),
            Some(Point::new(150, 150))
        );
    }
}
