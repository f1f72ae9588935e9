//! Planning pipeline and per-tick target following of the robot.
//!
//! A route is planned only while no route is committed: the sensed objects are turned into a
//! cost matrix with the robot's own position as depot, solved, and the first target is the node
//! the route leaves the depot for. The committed route is then followed edge by edge whenever
//! the robot arrives at its current target. Objects sensed later are ignored until the route is
//! abandoned.

use super::{
    has_arrived, step_towards, Actuator, Advance, CostMatrix, Point, Position, RobotError,
    Route, RouteSolver, TargetSequencer, TourSolver, TARGET_X_SLOT, TARGET_Y_SLOT,
};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SensedObject {
    pub id: Option<u32>,
    pub position: Point,
}

impl SensedObject {
    pub fn new(id: Option<u32>, position: Point) -> Self {
        Self { id, position }
    }
}

/// Reports the objects currently visible from a position.
pub trait Sensor {
    fn query(&mut self, origin: Point) -> Vec<SensedObject>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Step {
    /// Nothing to plan for.
    Idle,
    Moved {
        target: usize,
        position: Point,
        planned: bool,
    },
    /// The committed route leads back to the depot.
    TourComplete,
}

pub struct Navigator {
    solver: Box<dyn RouteSolver + Send + Sync>,
    objects: Vec<SensedObject>,
    sequencer: Option<TargetSequencer>,
}

impl Navigator {
    pub fn new(solver: impl RouteSolver + Send + Sync + 'static) -> Self {
        Self {
            solver: Box::new(solver),
            objects: vec![],
            sequencer: None,
        }
    }

    /// Objects sensed when the committed route was planned.
    pub fn objects(&self) -> &[SensedObject] {
        &self.objects
    }

    pub fn route(&self) -> Option<&Route> {
        self.sequencer.as_ref().map(TargetSequencer::route)
    }

    pub fn target(&self) -> Option<&SensedObject> {
        self.sequencer
            .as_ref()
            .and_then(|s| self.objects.get(s.current()))
    }

    /// Drops the committed route so that the next step plans again.
    pub fn abandon(&mut self) {
        self.sequencer = None;
        self.objects.clear();
    }

    pub fn step(
        &mut self,
        body: &mut impl Actuator,
        sensor: &mut impl Sensor,
    ) -> Result<Step, RobotError> {
        let planned = self.sequencer.is_none();
        let retarget = if planned {
            if !self.plan(body.position(), sensor) {
                return Ok(Step::Idle);
            }
            true
        } else if has_arrived(body.position(), commanded_target(&*body)?, body.diameter()) {
            match self.sequencer.as_mut().map(TargetSequencer::advance) {
                Some(Advance::Next(_)) => true,
                _ => return Ok(Step::TourComplete),
            }
        } else {
            false
        };

        let Some(target) = self.sequencer.as_ref().map(TargetSequencer::current) else {
            return Ok(Step::Idle);
        };
        if retarget {
            let Some(object) = self.objects.get(target) else {
                return Ok(Step::Idle);
            };
            body.set_parameter(TARGET_X_SLOT, object.position.x().into())?;
            body.set_parameter(TARGET_Y_SLOT, object.position.y().into())?;
        }

        let target_position = commanded_target(&*body)?;
        let position = step_towards(body.position(), target_position, body.velocity());
        body.move_to(position);

        Ok(Step::Moved {
            target,
            position,
            planned,
        })
    }

    fn plan(&mut self, origin: Point, sensor: &mut impl Sensor) -> bool {
        let objects = sensor.query(origin);
        let points = objects.iter().map(|o| o.position).collect::<Vec<_>>();
        let Some(matrix) = CostMatrix::build(&points, origin) else {
            return false;
        };
        let Ok(route) = self.solver.solve(&matrix) else {
            return false;
        };

        self.sequencer = TargetSequencer::start(route);
        self.objects = objects;
        self.sequencer.is_some()
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(TourSolver::default())
    }
}

fn commanded_target(body: &impl Actuator) -> Result<Position, RobotError> {
    Ok(Position::new(
        body.parameter(TARGET_X_SLOT)?,
        body.parameter(TARGET_Y_SLOT)?,
    ))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::domain::{Robot, Velocity};

    #[derive(Default)]
    struct FixedSensor {
        objects: Vec<SensedObject>,
        queries: usize,
    }

    impl FixedSensor {
        fn new(points: &[(i32, i32)]) -> Self {
            Self {
                objects: points
                    .iter()
                    .enumerate()
                    .map(|(id, p)| SensedObject::new(Some(id as u32), Point::from(*p)))
                    .collect(),
                queries: 0,
            }
        }
    }

    impl Sensor for FixedSensor {
        fn query(&mut self, _origin: Point) -> Vec<SensedObject> {
            self.queries += 1;
            self.objects.clone()
        }
    }

    fn robot() -> Robot {
        Robot::new(Point::new(0, 0), 20, Velocity::new(5.0))
    }

    #[test]
    fn test_navigator_idle_without_objects() {
        let mut navigator = Navigator::default();
        let mut robot = robot();
        let mut sensor = FixedSensor::default();

        assert_eq!(navigator.step(&mut robot, &mut sensor), Ok(Step::Idle));
        assert_eq!(navigator.step(&mut robot, &mut sensor), Ok(Step::Idle));
        assert_eq!(sensor.queries, 2);
        assert_eq!(navigator.route(), None);
        assert_eq!(robot.position(), Point::new(0, 0));
        assert_eq!(robot.parameter(TARGET_X_SLOT), Ok(0.0));
        assert_eq!(robot.parameter(TARGET_Y_SLOT), Ok(0.0));
    }

    #[test]
    fn test_navigator_tour() {
        let mut navigator = Navigator::default();
        let mut robot = robot();
        let mut sensor = FixedSensor::new(&[(0, 8), (8, 8), (8, 0)]);

        let steps = (0..5)
            .map(|_| navigator.step(&mut robot, &mut sensor).unwrap())
            .collect::<Vec<_>>();

        assert_eq!(
            steps,
            vec![
                Step::Moved {
                    target: 0,
                    position: Point::new(0, 5),
                    planned: true
                },
                Step::Moved {
                    target: 1,
                    position: Point::new(4, 6),
                    planned: false
                },
                Step::Moved {
                    target: 2,
                    position: Point::new(6, 1),
                    planned: false
                },
                Step::TourComplete,
                Step::TourComplete,
            ]
        );
        assert_eq!(sensor.queries, 1);
        assert_eq!(robot.position(), Point::new(6, 1));
        assert_eq!(navigator.target(), Some(&sensor.objects[2]));
        assert_eq!(
            navigator.route().map(ToString::to_string),
            Some("3->0, 0->1, 1->2, 2->3".to_string())
        );
    }

    #[test]
    fn test_navigator_first_target_leaves_depot() {
        let mut navigator = Navigator::default();
        let mut robot = robot();
        let mut sensor = FixedSensor::new(&[(100, 100), (3, 0), (50, 0)]);

        navigator.step(&mut robot, &mut sensor).unwrap();

        let route = navigator.route().unwrap();
        let depot = route.len() - 1;
        assert_eq!(depot, 3);
        assert_eq!(
            navigator.target(),
            sensor.objects.get(route.successor(depot).unwrap())
        );
        assert_eq!(robot.parameter(TARGET_X_SLOT), Ok(3.0));
        assert_eq!(robot.parameter(TARGET_Y_SLOT), Ok(0.0));
    }

    #[test]
    fn test_navigator_keeps_route_when_new_objects_appear() {
        let mut navigator = Navigator::default();
        let mut robot = Robot::new(Point::new(0, 0), 2, Velocity::new(1.0));
        let mut sensor = FixedSensor::new(&[(0, 50)]);

        navigator.step(&mut robot, &mut sensor).unwrap();
        sensor.objects.push(SensedObject::new(Some(1), Point::new(1, 1)));
        navigator.step(&mut robot, &mut sensor).unwrap();

        assert_eq!(sensor.queries, 1);
        assert_eq!(navigator.objects().len(), 1);
        assert_eq!(robot.position(), Point::new(0, 2));
    }

    #[test]
    fn test_navigator_abandon() {
        let mut navigator = Navigator::default();
        let mut robot = robot();
        let mut sensor = FixedSensor::new(&[(0, 8)]);

        navigator.step(&mut robot, &mut sensor).unwrap();
        navigator.abandon();
        assert_eq!(navigator.route(), None);
        assert_eq!(navigator.target(), None);

        sensor.objects = vec![SensedObject::new(None, Point::new(-9, 5))];
        assert_eq!(
            navigator.step(&mut robot, &mut sensor),
            Ok(Step::Moved {
                target: 0,
                position: Point::new(-5, 5),
                planned: true
            })
        );
        assert_eq!(sensor.queries, 2);
    }

    #[test]
    fn test_navigator_follows_commanded_target() {
        let mut navigator = Navigator::default();
        let mut robot = Robot::new(Point::new(0, 0), 2, Velocity::new(2.0));
        let mut sensor = FixedSensor::new(&[(0, 40)]);

        navigator.step(&mut robot, &mut sensor).unwrap();
        robot.set_parameter(TARGET_X_SLOT, 20.0).unwrap();
        robot.set_parameter(TARGET_Y_SLOT, 2.0).unwrap();

        assert_eq!(
            navigator.step(&mut robot, &mut sensor),
            Ok(Step::Moved {
                target: 0,
                position: Point::new(2, 2),
                planned: false
            })
        );
    }
}
