//! Line based profiles describing the robot and the environment objects.
//!
//! Lines starting with `//` and blank lines are skipped, the remaining lines are read by
//! position. The first four characters of a profile's file name hold the port it is bound to,
//! which has to match the port given in the body.

use std::{
    collections::HashMap,
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use once_cell::sync::Lazy;
use rand::Rng;
use thiserror::Error;

use crate::domain::{
    Actuator, Angle, Color, EnvObject, Environment, EnvironmentError, IntersectionPolicy,
    MapSize, Movability, Parameter, Point, Robot, Velocity, PARAMETER_SLOTS,
};

const COMMENT_PREFIX: &str = "//";
const RANDOM_POSITION: &str = "-1;-1";
const OBJECT_RECORD_LINES: usize = 8;
const ROBOT_PARAMETERS_LINE: usize = 9;

static NAMED_COLORS: Lazy<HashMap<&'static str, Color>> = Lazy::new(|| {
    HashMap::from([
        ("black", Color::new(0, 0, 0)),
        ("white", Color::new(255, 255, 255)),
        ("red", Color::new(255, 0, 0)),
        ("green", Color::new(0, 128, 0)),
        ("lime", Color::new(0, 255, 0)),
        ("blue", Color::new(0, 0, 255)),
        ("yellow", Color::new(255, 255, 0)),
        ("cyan", Color::new(0, 255, 255)),
        ("magenta", Color::new(255, 0, 255)),
        ("gray", Color::new(128, 128, 128)),
        ("grey", Color::new(128, 128, 128)),
        ("orange", Color::new(255, 165, 0)),
        ("purple", Color::new(128, 0, 128)),
        ("brown", Color::new(165, 42, 42)),
    ])
});

#[derive(Clone, Debug, PartialEq)]
pub struct RobotProfile {
    pub command: String,
    pub port: u16,
    pub robot: Robot,
}

impl RobotProfile {
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        Self::parse(&read(path)?, file_port(path))
    }

    pub fn parse(text: &str, file_port: Option<u16>) -> Result<Self, ProfileError> {
        let lines = significant_lines(text);
        let record = Record::new(Subject::Robot, &lines);

        let command = record.command()?;
        let port = check_port(record.line(1, Field::Port)?, file_port)?;
        let position = record.position(2)?;
        let diameter = record.value(3, Field::Diameter, |d: &u32| *d > 0)?;
        let visibility_radius = record.value(4, Field::VisibilityRadius, |r: &f64| {
            *r >= 0.0 && r.is_finite()
        })?;
        let velocity = record.value(5, Field::Velocity, |v: &f64| *v > 0.0 && v.is_finite())?;
        let intersection = record.intersection(6)?;
        let orientation = record.value(7, Field::Orientation, |o: &f64| o.is_finite())?;
        let color = record.color(8)?;
        let parameters = record.parameters(ROBOT_PARAMETERS_LINE)?;

        let mut robot = Robot::new(position, diameter, Velocity::new(velocity))
            .with_visibility_radius(visibility_radius)
            .with_intersection(intersection)
            .with_parameters(parameters);
        robot.turn(Angle::from_deg(orientation));
        robot.change_color(color);

        Ok(Self {
            command,
            port,
            robot,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnvironmentProfile {
    pub command: String,
    pub port: u16,
    pub environment: Environment,
}

impl EnvironmentProfile {
    pub fn load(path: &Path, map: MapSize, rng: &mut impl Rng) -> Result<Self, ProfileError> {
        Self::parse(&read(path)?, file_port(path), map, rng)
    }

    /// Parses the launch command, the port and every complete object record. A trailing
    /// incomplete record is ignored.
    pub fn parse(
        text: &str,
        file_port: Option<u16>,
        map: MapSize,
        rng: &mut impl Rng,
    ) -> Result<Self, ProfileError> {
        let lines = significant_lines(text);
        let header = Record::new(Subject::Environment, &lines);

        let command = header.command()?;
        let port = check_port(header.line(1, Field::Port)?, file_port)?;

        let objects = lines
            .get(2..)
            .unwrap_or_default()
            .chunks_exact(OBJECT_RECORD_LINES)
            .enumerate()
            .map(|(index, lines)| {
                Record::new(Subject::Object(index), lines).object(map, &mut *rng)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            command,
            port,
            environment: Environment::new(objects, map)?,
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Subject {
    Robot,
    Environment,
    /// Object record, counted from zero in file order.
    Object(usize),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Robot => write!(f, "robot"),
            Subject::Environment => write!(f, "environment"),
            Subject::Object(index) => write!(f, "object {index}"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Field {
    Command,
    Port,
    Id,
    Position,
    Diameter,
    VisibilityRadius,
    Velocity,
    Intersection,
    Movable,
    Orientation,
    Color,
    Parameter(usize),
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Command => write!(f, "launch command"),
            Field::Port => write!(f, "port"),
            Field::Id => write!(f, "id"),
            Field::Position => write!(f, "position"),
            Field::Diameter => write!(f, "diameter"),
            Field::VisibilityRadius => write!(f, "visibility radius"),
            Field::Velocity => write!(f, "velocity"),
            Field::Intersection => write!(f, "intersection"),
            Field::Movable => write!(f, "movable flag"),
            Field::Orientation => write!(f, "orientation"),
            Field::Color => write!(f, "color"),
            Field::Parameter(slot) => write!(f, "parameter {slot}"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{subject}: missing {field}")]
    Missing { subject: Subject, field: Field },
    #[error("{subject}: invalid {field} `{value}`")]
    Invalid {
        subject: Subject,
        field: Field,
        value: String,
    },
    #[error("port in file name ({file:?}) and file body (`{body}`) differ")]
    PortMismatch { file: Option<u16>, body: String },
    #[error("{subject}: position {position} outside the map")]
    OutOfMap { subject: Subject, position: Point },
    #[error("{subject}: no room for random placement of diameter {diameter}")]
    NoRoom { subject: Subject, diameter: u32 },
    #[error(transparent)]
    Environment(#[from] EnvironmentError),
}

/// Port encoded in the leading four characters of the file name. Zero counts as missing.
pub fn file_port(path: &Path) -> Option<u16> {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.get(..4))
        .and_then(|port| port.parse::<u16>().ok())
        .filter(|port| *port != 0)
}

fn read(path: &Path) -> Result<String, ProfileError> {
    fs::read_to_string(path).map_err(|source| ProfileError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn significant_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(COMMENT_PREFIX))
        .collect()
}

fn check_port(body: &str, file: Option<u16>) -> Result<u16, ProfileError> {
    match (body.parse::<u16>(), file) {
        (Ok(port), Some(file)) if port == file => Ok(port),
        _ => Err(ProfileError::PortMismatch {
            file,
            body: body.to_string(),
        }),
    }
}

fn parse_color(text: &str) -> Option<Color> {
    let Some(hex) = text.strip_prefix('#') else {
        return NAMED_COLORS.get(text.to_lowercase().as_str()).copied();
    };
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|digits| u8::from_str_radix(digits, 16).ok())
    };
    match hex.len() {
        3 => Some(Color::new(
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
        )),
        6 => Some(Color::new(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        _ => None,
    }
}

fn parse_coordinate(text: &str) -> Option<i32> {
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Positional view on the lines describing one subject.
struct Record<'a> {
    subject: Subject,
    lines: &'a [&'a str],
}

impl<'a> Record<'a> {
    fn new(subject: Subject, lines: &'a [&'a str]) -> Self {
        Self { subject, lines }
    }

    fn line(&self, index: usize, field: Field) -> Result<&'a str, ProfileError> {
        self.lines
            .get(index)
            .copied()
            .ok_or(ProfileError::Missing {
                subject: self.subject,
                field,
            })
    }

    fn invalid(&self, field: Field, value: &str) -> ProfileError {
        ProfileError::Invalid {
            subject: self.subject,
            field,
            value: value.to_string(),
        }
    }

    fn value<T: FromStr>(
        &self,
        index: usize,
        field: Field,
        valid: impl FnOnce(&T) -> bool,
    ) -> Result<T, ProfileError> {
        let text = self.line(index, field)?;
        text.parse::<T>()
            .ok()
            .filter(valid)
            .ok_or_else(|| self.invalid(field, text))
    }

    fn command(&self) -> Result<String, ProfileError> {
        Ok(self.line(0, Field::Command)?.to_string())
    }

    fn position(&self, index: usize) -> Result<Point, ProfileError> {
        let text = self.line(index, Field::Position)?;
        text.split_once(';')
            .and_then(|(x, y)| Some(Point::new(parse_coordinate(x)?, parse_coordinate(y)?)))
            .ok_or_else(|| self.invalid(Field::Position, text))
    }

    fn intersection(&self, index: usize) -> Result<IntersectionPolicy, ProfileError> {
        let text = self.line(index, Field::Intersection)?;
        text.parse::<u8>()
            .ok()
            .and_then(|value| IntersectionPolicy::try_from(value).ok())
            .ok_or_else(|| self.invalid(Field::Intersection, text))
    }

    fn color(&self, index: usize) -> Result<Color, ProfileError> {
        let text = self.line(index, Field::Color)?;
        parse_color(text).ok_or_else(|| self.invalid(Field::Color, text))
    }

    fn parameters(&self, first: usize) -> Result<[Parameter; PARAMETER_SLOTS], ProfileError> {
        let mut parameters: [Parameter; PARAMETER_SLOTS] = Default::default();
        let lines = self.lines.get(first..).unwrap_or_default();
        for (slot, text) in lines.iter().enumerate() {
            let field = Field::Parameter(slot);
            let parameter = parameters
                .get_mut(slot)
                .ok_or_else(|| self.invalid(field, text))?;
            *parameter = text
                .split_once(';')
                .and_then(|(value, name)| {
                    let value = value.parse::<f64>().ok().filter(|v| *v >= 0.0)?;
                    let name = name.trim();
                    let valid_name = !name.is_empty()
                        && name
                            .chars()
                            .all(|c| c.is_alphanumeric() || c == '_' || c == ' ');
                    valid_name.then(|| Parameter::new(name, value))
                })
                .ok_or_else(|| self.invalid(field, text))?;
        }
        Ok(parameters)
    }

    fn object(&self, map: MapSize, rng: &mut impl Rng) -> Result<EnvObject, ProfileError> {
        let id = self.value(0, Field::Id, |_: &u32| true)?;
        let diameter = self.value(2, Field::Diameter, |d: &u32| *d > 0)?;
        let position = if self.line(1, Field::Position)? == RANDOM_POSITION {
            self.random_position(diameter, map, rng)?
        } else {
            let position = self.position(1)?;
            if !map.contains(position) {
                return Err(ProfileError::OutOfMap {
                    subject: self.subject,
                    position,
                });
            }
            position
        };
        let intersection = self.intersection(3)?;
        let movability = match self.line(4, Field::Movable)? {
            "0" => Movability::Unmovable,
            "1" => Movability::Movable,
            text => return Err(self.invalid(Field::Movable, text)),
        };
        let orientation =
            self.value(5, Field::Orientation, |o: &f64| *o >= 0.0 && o.is_finite())?;
        let velocity = self.value(6, Field::Velocity, |v: &f64| *v > 0.0 && v.is_finite())?;
        let color = self.color(7)?;

        Ok(EnvObject::new(id, position, diameter)
            .with_movability(movability)
            .with_intersection(intersection)
            .with_motion(Velocity::new(velocity), Angle::from_deg(orientation))
            .with_color(color))
    }

    /// Draws each coordinate from `[diameter, extent - diameter)`.
    fn random_position(
        &self,
        diameter: u32,
        map: MapSize,
        rng: &mut impl Rng,
    ) -> Result<Point, ProfileError> {
        let no_room = || ProfileError::NoRoom {
            subject: self.subject,
            diameter,
        };
        let low = i32::try_from(diameter).map_err(|_| no_room())?;
        let high = |extent: u32| {
            i32::try_from(extent)
                .ok()
                .map(|extent| extent - low)
                .filter(|high| *high > low)
                .ok_or_else(no_room)
        };
        let (x_high, y_high) = (high(map.width)?, high(map.height)?);
        Ok(Point::new(
            rng.random_range(low..x_high),
            rng.random_range(low..y_high),
        ))
    }
}
