//! Collision detection based on circular footprints.

use super::Position;

pub trait HasCollision {
    fn has_collision(&self, other: &dyn HasCollision) -> bool {
        self.shape().has_intersection(&other.shape())
    }

    fn shape(&self) -> Shape;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Circle { position: Position, radius: f64 },
}

impl Shape {
    /// Circle of the given diameter centered on a position.
    pub fn circle(position: impl Into<Position>, diameter: u32) -> Self {
        Shape::Circle {
            position: position.into(),
            radius: f64::from(diameter) / 2.0,
        }
    }

    fn has_intersection(&self, other: &Shape) -> bool {
        match (self, other) {
            (
                Shape::Circle { position, radius },
                Shape::Circle {
                    position: other_position,
                    radius: other_radius,
                },
            ) => position.distance(*other_position) < radius + other_radius,
        }
    }
}
