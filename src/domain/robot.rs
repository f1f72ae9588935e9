//! Robot body and the actuation primitives driving it.

use thiserror::Error;

use super::{Angle, Color, HasCollision, IntersectionPolicy, Point, Shape, Velocity};

pub const PARAMETER_SLOTS: usize = 4;
/// Parameter slot holding the x coordinate of the current target.
pub const TARGET_X_SLOT: usize = 0;
/// Parameter slot holding the y coordinate of the current target.
pub const TARGET_Y_SLOT: usize = 1;

/// Absolute actuation primitives and numeric parameter slots of a mobile agent.
pub trait Actuator {
    fn position(&self) -> Point;

    fn diameter(&self) -> u32;

    fn velocity(&self) -> Velocity;

    fn parameter(&self, slot: usize) -> Result<f64, RobotError>;

    fn set_parameter(&mut self, slot: usize, value: f64) -> Result<(), RobotError>;

    fn move_to(&mut self, position: Point);

    fn turn(&mut self, heading: Angle);

    fn change_diameter(&mut self, diameter: u32);

    fn change_color(&mut self, color: Color);
}

#[derive(Clone, Debug, PartialEq)]
pub struct Robot {
    position: Point,
    heading: Angle,
    diameter: u32,
    velocity: Velocity,
    visibility_radius: f64,
    intersection: IntersectionPolicy,
    color: Color,
    parameters: [Parameter; PARAMETER_SLOTS],
}

impl Robot {
    pub fn new(position: Point, diameter: u32, velocity: Velocity) -> Self {
        Self {
            position,
            heading: Angle::default(),
            diameter,
            velocity,
            visibility_radius: 0.0,
            intersection: IntersectionPolicy::default(),
            color: Color::default(),
            parameters: Default::default(),
        }
    }

    pub fn with_visibility_radius(self, visibility_radius: f64) -> Self {
        Self {
            visibility_radius,
            ..self
        }
    }

    pub fn with_intersection(self, intersection: IntersectionPolicy) -> Self {
        Self {
            intersection,
            ..self
        }
    }

    pub fn with_parameters(self, parameters: [Parameter; PARAMETER_SLOTS]) -> Self {
        Self { parameters, ..self }
    }

    pub fn heading(&self) -> Angle {
        self.heading
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn intersection(&self) -> IntersectionPolicy {
        self.intersection
    }

    /// Sensing range; zero means unlimited.
    pub fn visibility_radius(&self) -> f64 {
        self.visibility_radius
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
}

impl Actuator for Robot {
    fn position(&self) -> Point {
        self.position
    }

    fn diameter(&self) -> u32 {
        self.diameter
    }

    fn velocity(&self) -> Velocity {
        self.velocity
    }

    fn parameter(&self, slot: usize) -> Result<f64, RobotError> {
        self.parameters
            .get(slot)
            .map(|p| p.value)
            .ok_or(RobotError::InvalidParameterSlot(slot))
    }

    fn set_parameter(&mut self, slot: usize, value: f64) -> Result<(), RobotError> {
        if let Some(parameter) = self.parameters.get_mut(slot) {
            parameter.value = value;
            Ok(())
        } else {
            Err(RobotError::InvalidParameterSlot(slot))
        }
    }

    fn move_to(&mut self, position: Point) {
        self.position = position;
    }

    fn turn(&mut self, heading: Angle) {
        self.heading = heading;
    }

    fn change_diameter(&mut self, diameter: u32) {
        self.diameter = diameter;
    }

    fn change_color(&mut self, color: Color) {
        self.color = color;
    }
}

impl HasCollision for Robot {
    fn shape(&self) -> Shape {
        Shape::circle(self.position, self.diameter)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: f64,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
pub enum RobotError {
    #[error("invalid parameter slot {0}")]
    InvalidParameterSlot(usize),
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    use super::*;

    fn robot() -> Robot {
        Robot::new(Point::new(1, 2), 4, Velocity::new(2.0))
    }

    #[test]
    fn test_robot_parameters() {
        let mut robot = robot();
        assert_eq!(robot.set_parameter(TARGET_X_SLOT, 12.0), Ok(()));
        assert_eq!(robot.set_parameter(TARGET_Y_SLOT, -3.5), Ok(()));
        assert_abs_diff_eq!(robot.parameter(TARGET_X_SLOT).unwrap(), 12.0);
        assert_abs_diff_eq!(robot.parameter(TARGET_Y_SLOT).unwrap(), -3.5);
        assert_abs_diff_eq!(robot.parameter(PARAMETER_SLOTS - 1).unwrap(), 0.0);
    }

    #[rstest]
    #[case(PARAMETER_SLOTS)]
    #[case(usize::MAX)]
    fn test_robot_invalid_parameter_slot(#[case] slot: usize) {
        let mut robot = robot();
        assert_eq!(
            robot.parameter(slot),
            Err(RobotError::InvalidParameterSlot(slot))
        );
        assert_eq!(
            robot.set_parameter(slot, 1.0),
            Err(RobotError::InvalidParameterSlot(slot))
        );
    }

    #[test]
    fn test_robot_with_parameters_keeps_names() {
        let robot = robot().with_parameters([
            Parameter::new("target x", 0.0),
            Parameter::new("target y", 0.0),
            Parameter::new("gain", 1.5),
            Parameter::new("spare", 0.0),
        ]);
        assert_eq!(robot.parameters()[2].name, "gain");
        assert_abs_diff_eq!(robot.parameter(2).unwrap(), 1.5);
    }

    #[test]
    fn test_robot_actuation() {
        let mut robot = robot();
        robot.move_to(Point::new(-4, 9));
        robot.turn(Angle::from_deg(90.0));
        robot.change_diameter(10);
        robot.change_color(Color::new(255, 0, 0));

        assert_eq!(robot.position(), Point::new(-4, 9));
        assert_abs_diff_eq!(robot.heading().to_deg(), 90.0, epsilon = 1e-9);
        assert_eq!(robot.diameter(), 10);
        assert_eq!(robot.color(), Color::new(255, 0, 0));
        assert_eq!(
            robot.shape(),
            Shape::circle(Point::new(-4, 9), 10)
        );
    }
}
