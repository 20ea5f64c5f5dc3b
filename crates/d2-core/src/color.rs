//! Color values accepted by D2 style attributes.
//!
//! [`Color`] wraps the `DynamicColor` type from the color crate. D2 also
//! accepts CSS gradient expressions for `fill` and `stroke`; those are kept
//! as [`ColorValue::Gradient`] without further interpretation.

use std::{
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use color::DynamicColor;
use thiserror::Error;

/// Error returned when a string is not a recognizable color.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color `{input}`: {reason}")]
pub struct ColorError {
    input: String,
    reason: String,
}

/// A concrete CSS color such as `#ff0000`, `rgb(0 0 255)` or `teal`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl Color {
    /// Parses a CSS color string.
    ///
    /// # Examples
    ///
    /// ```
    /// use d2_core::color::Color;
    ///
    /// assert!(Color::new("#ff0000").is_ok());
    /// assert!(Color::new("honeydew").is_ok());
    /// assert!(Color::new("not-a-color").is_err());
    /// ```
    pub fn new(color_str: &str) -> Result<Self, ColorError> {
        DynamicColor::from_str(color_str)
            .map(|color| Self { color })
            .map_err(|err| ColorError {
                input: color_str.to_string(),
                reason: err.to_string(),
            })
    }

    /// Alpha component in `0.0..=1.0`.
    pub fn alpha(&self) -> f32 {
        self.color.components[3]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new("black").expect("'black' is a valid CSS color")
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.color)
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Any value a D2 color attribute accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColorValue {
    Solid(Color),
    /// A `linear-gradient(...)` or `radial-gradient(...)` expression.
    Gradient(String),
}

impl ColorValue {
    /// Parses a solid color or a CSS gradient expression.
    pub fn parse(value: &str) -> Result<Self, ColorError> {
        let trimmed = value.trim();
        if is_gradient(trimmed) {
            return Ok(Self::Gradient(trimmed.to_string()));
        }
        Color::new(trimmed).map(Self::Solid)
    }
}

fn is_gradient(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    (lower.starts_with("linear-gradient(") || lower.starts_with("radial-gradient("))
        && lower.ends_with(')')
}
