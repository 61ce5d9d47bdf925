/// Host-facing commands and their one-line text form
use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{one_of, space1},
    combinator::{all_consuming, map, rest, verify},
    number::complete::float,
    sequence::{preceded, tuple},
    IResult,
};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use nalgebra::{Point3, Vector3};
use tracing::debug;

use crate::error::{CommandError, ViewerError};
use crate::model::Model;
use crate::obj::{LoadOptions, LoadReport};

/// One call into the model, as a UI control or script line would issue it
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load(PathBuf),
    SetPosition(Point3<f32>),
    /// Absolute target angle in degrees along `axis`
    Rotate { angle: f32, axis: Vector3<f32> },
    Scale(f32),
    Translate(Vector3<f32>),
}

impl Command {
    pub fn rotate_x(angle: f32) -> Self {
        Self::Rotate {
            angle,
            axis: Vector3::x(),
        }
    }

    pub fn rotate_y(angle: f32) -> Self {
        Self::Rotate {
            angle,
            axis: Vector3::y(),
        }
    }

    pub fn rotate_z(angle: f32) -> Self {
        Self::Rotate {
            angle,
            axis: Vector3::z(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(path) => write!(f, "load {}", path.display()),
            Self::SetPosition(p) => write!(f, "position {} {} {}", p.x, p.y, p.z),
            Self::Rotate { angle, axis } => {
                write!(f, "rotate {} {} {} {}", angle, axis.x, axis.y, axis.z)
            }
            Self::Scale(factor) => write!(f, "scale {}", factor),
            Self::Translate(v) => write!(f, "translate {} {} {}", v.x, v.y, v.z),
        }
    }
}

fn number(input: &str) -> IResult<&str, f32> {
    preceded(space1, float)(input)
}

fn vector(input: &str) -> IResult<&str, Vector3<f32>> {
    map(tuple((number, number, number)), |(x, y, z)| {
        Vector3::new(x, y, z)
    })(input)
}

fn named_axis(input: &str) -> IResult<&str, Vector3<f32>> {
    map(preceded(space1, one_of("xyzXYZ")), |c| match c {
        'x' | 'X' => Vector3::x(),
        'y' | 'Y' => Vector3::y(),
        _ => Vector3::z(),
    })(input)
}

fn load(input: &str) -> IResult<&str, Command> {
    map(
        preceded(
            tag_no_case("load"),
            preceded(space1, verify(rest, |s: &str| !s.trim().is_empty())),
        ),
        |path: &str| Command::Load(PathBuf::from(path.trim())),
    )(input)
}

fn position(input: &str) -> IResult<&str, Command> {
    map(preceded(tag_no_case("position"), vector), |v| {
        Command::SetPosition(Point3::from(v))
    })(input)
}

fn rotate(input: &str) -> IResult<&str, Command> {
    map(
        preceded(tag_no_case("rotate"), tuple((number, alt((named_axis, vector))))),
        |(angle, axis)| Command::Rotate { angle, axis },
    )(input)
}

fn scale(input: &str) -> IResult<&str, Command> {
    map(preceded(tag_no_case("scale"), number), Command::Scale)(input)
}

fn translate(input: &str) -> IResult<&str, Command> {
    map(preceded(tag_no_case("translate"), vector), Command::Translate)(input)
}

fn command(input: &str) -> IResult<&str, Command> {
    all_consuming(alt((load, position, rotate, scale, translate)))(input)
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        command(input)
            .map(|(_, cmd)| cmd)
            .map_err(|e| CommandError {
                input: input.to_string(),
                reason: match e {
                    nom::Err::Error(inner) | nom::Err::Failure(inner) => {
                        format!("unexpected input at `{}`", inner.input)
                    }
                    nom::Err::Incomplete(_) => "incomplete command".to_string(),
                },
            })
    }
}

impl Model {
    /// Run one command with default load options.
    ///
    /// # Errors
    ///
    /// Propagates the load or transform error; the model is unchanged.
    pub fn apply(&mut self, command: &Command) -> Result<Option<LoadReport>, ViewerError> {
        self.apply_with(command, &LoadOptions::default())
    }

    /// Run one command, using `options` if it loads a file.
    ///
    /// Returns the load report for [`Command::Load`] and `None` otherwise.
    ///
    /// # Errors
    ///
    /// Propagates the load or transform error; the model is unchanged.
    pub fn apply_with(
        &mut self,
        command: &Command,
        options: &LoadOptions,
    ) -> Result<Option<LoadReport>, ViewerError> {
        debug!("Applying `{}`", command);
        match command {
            Command::Load(path) => return Ok(Some(self.load_with(path, options)?)),
            Command::SetPosition(p) => self.set_position(*p)?,
            Command::Rotate { angle, axis } => self.rotate(*angle, *axis)?,
            Command::Scale(factor) => self.scale(*factor)?,
            Command::Translate(v) => self.translate(*v)?,
        }
        Ok(None)
    }
}
