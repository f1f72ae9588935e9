//! Bounded step towards a target.

use super::{Point, Position, Velocity};

/// Moves from `from` towards `to` by about `step` along the connecting line.
///
/// The step is measured on the line through both points and placed on the side of `from`
/// facing `to` only while it stays short of the target's y coordinate; a step that would reach
/// or pass it goes the other way. With both points on the same row the step is purely
/// horizontal. The result is truncated to whole world units.
pub fn step_towards(from: Point, to: Position, step: Velocity) -> Point {
    let (x1, y1) = (f64::from(from.x()), f64::from(from.y()));
    let (x2, y2) = (to.x(), to.y());
    let step: f64 = step.into();

    if y2 == y1 {
        let x = if x2 > x1 { x1 + step } else { x1 - step };
        return Position::new(x, y1).truncate();
    }

    let part = step.abs() / (((x2 - x1) / (y2 - y1)).powi(2) + 1.0).sqrt();
    let y = if y1 + part < y2 { y1 + part } else { y1 - part };
    let x = (x2 - x1) * (y - y1) / (y2 - y1) + x1;

    Position::new(x, y).truncate()
}
