//! Environment owning the simulated objects.

use std::collections::BTreeSet;

use thiserror::Error;

use super::{
    Angle, Bump, Color, HasCollision, IntersectionPolicy, Point, Position, SensedObject, Shape,
    Velocity,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MapSize {
    pub width: u32,
    pub height: u32,
}

impl MapSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, point: Point) -> bool {
        u32::try_from(point.x()).is_ok_and(|x| x < self.width)
            && u32::try_from(point.y()).is_ok_and(|y| y < self.height)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Environment {
    objects: Vec<EnvObject>,
    map: MapSize,
}

impl Environment {
    pub fn new(objects: Vec<EnvObject>, map: MapSize) -> Result<Self, EnvironmentError> {
        let mut ids = BTreeSet::new();
        for object in &objects {
            if !ids.insert(object.id) {
                return Err(EnvironmentError::DuplicateId(object.id));
            }
        }
        Ok(Self { objects, map })
    }

    pub fn objects(&self) -> &[EnvObject] {
        &self.objects
    }

    pub fn object(&self, id: u32) -> Option<&EnvObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Hands a bump to the one object it addresses and returns that object's id. All other
    /// objects are left untouched.
    pub fn dispatch_bump(&mut self, bump: Bump) -> Option<u32> {
        let object = self
            .objects
            .iter_mut()
            .find(|o| o.id.checked_add(1) == Some(bump.target_id))?;
        object.receive_bump(bump);
        Some(object.id)
    }

    /// Runs the per-object action of one tick.
    pub fn advance(&mut self) {
        let map = self.map;
        for object in self.objects.iter_mut().filter(|o| o.is_movable()) {
            object.advance(map);
        }
    }

    /// Objects within `radius` of `origin`. A radius of zero covers the whole map.
    pub fn neighbours(&self, origin: Point, radius: f64) -> Vec<SensedObject> {
        self.objects
            .iter()
            .filter(|o| radius <= 0.0 || o.position.distance(origin) <= radius)
            .map(|o| SensedObject::new(Some(o.id), o.position))
            .collect()
    }
}

#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
pub enum EnvironmentError {
    #[error("object with id {0} already exists")]
    DuplicateId(u32),
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnvObject {
    id: u32,
    position: Point,
    diameter: u32,
    movability: Movability,
    intersection: IntersectionPolicy,
    velocity: Velocity,
    heading: Angle,
    color: Color,
    bumps: u32,
    last_bump: Option<Bump>,
}

impl EnvObject {
    pub fn new(id: u32, position: Point, diameter: u32) -> Self {
        Self {
            id,
            position,
            diameter,
            movability: Movability::default(),
            intersection: IntersectionPolicy::default(),
            velocity: Velocity::default(),
            heading: Angle::default(),
            color: Color::default(),
            bumps: 0,
            last_bump: None,
        }
    }

    pub fn with_movability(self, movability: Movability) -> Self {
        Self { movability, ..self }
    }

    pub fn with_intersection(self, intersection: IntersectionPolicy) -> Self {
        Self {
            intersection,
            ..self
        }
    }

    pub fn with_motion(self, velocity: Velocity, heading: Angle) -> Self {
        Self {
            velocity,
            heading,
            ..self
        }
    }

    pub fn with_color(self, color: Color) -> Self {
        Self { color, ..self }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn is_movable(&self) -> bool {
        self.movability == Movability::Movable
    }

    pub fn intersection(&self) -> IntersectionPolicy {
        self.intersection
    }

    pub fn heading(&self) -> Angle {
        self.heading
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn bumps(&self) -> u32 {
        self.bumps
    }

    pub fn last_bump(&self) -> Option<Bump> {
        self.last_bump
    }

    pub fn receive_bump(&mut self, bump: Bump) {
        self.bumps += 1;
        self.last_bump = Some(bump);
    }

    /// Steps along the heading, unless that would leave the map.
    fn advance(&mut self, map: MapSize) {
        let next = (Position::from(self.position)
            + self.heading.direction() * f64::from(self.velocity))
        .truncate();
        if map.contains(next) {
            self.position = next;
        }
    }
}

impl HasCollision for EnvObject {
    fn shape(&self) -> Shape {
        Shape::circle(self.position, self.diameter)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Movability {
    #[default]
    Unmovable,
    Movable,
}
