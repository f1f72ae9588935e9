//! Basic building blocks.

use std::{
    f64::consts::PI,
    fmt,
    ops::{Add, Mul},
};

/// Integer position in world units.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Point {
    x: i32,
    y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn distance(&self, point: Self) -> f64 {
        let dx = (i64::from(self.x) - i64::from(point.x)) as f64;
        let dy = (i64::from(self.y) - i64::from(point.y)) as f64;
        (dx.powi(2) + dy.powi(2)).sqrt()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<Point> for Position {
    fn from(value: Point) -> Self {
        Position::new(value.x.into(), value.y.into())
    }
}

impl From<(i32, i32)> for Point {
    fn from(value: (i32, i32)) -> Self {
        Point::new(value.0, value.1)
    }
}

/// Continuous position, used for commanded targets and intermediate motion results.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Position {
    x: f64,
    y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn distance(&self, position: Self) -> f64 {
        ((self.x - position.x).powi(2) + (self.y - position.y).powi(2)).sqrt()
    }

    /// Truncates both coordinates towards zero.
    pub fn truncate(&self) -> Point {
        Point::new(self.x as i32, self.y as i32)
    }
}

impl Mul<f64> for Position {
    type Output = Position;

    fn mul(self, rhs: f64) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Angle(f64);

impl Angle {
    pub fn new(radians: f64) -> Self {
        Self(radians)
    }

    pub fn from_deg(degree: f64) -> Self {
        Self(degree * PI / 180.0)
    }

    pub fn to_deg(self) -> f64 {
        (self.0 * (180.0 / PI) + 360.0) % 360.0
    }

    /// Unit vector pointing in the direction of the angle.
    pub fn direction(self) -> Position {
        Position::new(self.0.cos(), self.0.sin())
    }
}

impl From<Angle> for f64 {
    fn from(value: Angle) -> Self {
        value.0
    }
}

/// Step length covered per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Velocity(f64);

impl Velocity {
    pub fn new(velocity: f64) -> Self {
        Self(velocity)
    }
}

impl From<Velocity> for f64 {
    fn from(value: Velocity) -> Self {
        value.0
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

/// Collision-response category of an object. The response itself is up to the object.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum IntersectionPolicy {
    #[default]
    None,
    Stop,
    Bounce,
}

impl TryFrom<u8> for IntersectionPolicy {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(IntersectionPolicy::None),
            1 => Ok(IntersectionPolicy::Stop),
            2 => Ok(IntersectionPolicy::Bounce),
            _ => Err(value),
        }
    }
}
