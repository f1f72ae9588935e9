//! The domain module encapsulates the core business logic. It defines the `Robot` and
//! `Environment` entities, the route planning pipeline the robot follows and the control
//! messages the environment reacts to.
//!
//! By minimizing hard dependencies, this module ensures the business logic remains adaptable and
//! independent of specific implementation details.

mod basis;
mod collision;
mod control;
mod cost;
mod environment;
mod motion;
mod navigator;
mod robot;
mod route;
mod sequencer;

pub use basis::{Angle, Color, IntersectionPolicy, Point, Position, Velocity};
pub use collision::{HasCollision, Shape};
pub use control::{Bump, ControlMessage, Mailbox, SimulationContext, SimulationState};
pub use cost::CostMatrix;
pub use environment::{EnvObject, Environment, EnvironmentError, MapSize, Movability};
pub use motion::step_towards;
pub use navigator::{Navigator, SensedObject, Sensor, Step};
pub use robot::{
    Actuator, Parameter, Robot, RobotError, PARAMETER_SLOTS, TARGET_X_SLOT, TARGET_Y_SLOT,
};
pub use route::{Route, RouteSolver, TourSolver};
pub use sequencer::{has_arrived, Advance, TargetSequencer};
