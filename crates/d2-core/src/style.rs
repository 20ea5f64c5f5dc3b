//! Style attribute catalogue and value validation.
//!
//! Every attribute that may appear inside a `style` map is listed in
//! [`StyleKeyword`], together with the [`ValueRule`] its value must satisfy.
//!
//! # Examples
//!
//! ```
//! use d2_core::style::StyleKeyword;
//!
//! let opacity = StyleKeyword::from_keyword("opacity").unwrap();
//! assert!(opacity.validate("0.4").is_ok());
//!
//! let err = opacity.validate("1.5").unwrap_err();
//! assert_eq!(err.to_string(), "expected opacity to be a float between 0 and 1");
//! ```

use std::fmt;

use thiserror::Error;

use crate::color::ColorValue;

/// Font families D2 knows by name.
pub const SYSTEM_FONTS: &[&str] = &["mono"];

/// Reason a style value was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StyleValueError {
    #[error("expected {keyword} to be a float between {min} and {max}")]
    FloatRange {
        keyword: &'static str,
        min: f32,
        max: f32,
    },

    #[error("expected {keyword} to be an integer between {min} and {max}")]
    IntRange {
        keyword: &'static str,
        min: i64,
        max: i64,
    },

    #[error("expected {keyword} to be true or false")]
    Boolean { keyword: &'static str },

    #[error("expected {keyword} to be a valid color: {reason}")]
    Color {
        keyword: &'static str,
        reason: String,
    },

    #[error("expected {keyword} to be a valid font: ({})", .fonts.join(", "))]
    Font {
        keyword: &'static str,
        fonts: &'static [&'static str],
    },

    #[error("expected {keyword} to be one of ({})", .variants.join(", "))]
    OneOf {
        keyword: &'static str,
        variants: &'static [&'static str],
    },
}

/// Constraint a style value must satisfy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueRule {
    FloatRange(f32, f32),
    IntRange(i64, i64),
    Boolean,
    Color,
    Font,
    OneOf(&'static [&'static str]),
}

impl ValueRule {
    fn check(self, keyword: &'static str, value: &str) -> Result<(), StyleValueError> {
        let value = value.trim();
        match self {
            Self::FloatRange(min, max) => value
                .parse::<f32>()
                .ok()
                .filter(|v| (min..=max).contains(v))
                .map(|_| ())
                .ok_or(StyleValueError::FloatRange { keyword, min, max }),
            Self::IntRange(min, max) => value
                .parse::<i64>()
                .ok()
                .filter(|v| (min..=max).contains(v))
                .map(|_| ())
                .ok_or(StyleValueError::IntRange { keyword, min, max }),
            Self::Boolean => match value {
                "true" | "false" => Ok(()),
                _ => Err(StyleValueError::Boolean { keyword }),
            },
            Self::Color => ColorValue::parse(value)
                .map(|_| ())
                .map_err(|err| StyleValueError::Color {
                    keyword,
                    reason: err.to_string(),
                }),
            Self::Font => {
                if SYSTEM_FONTS.contains(&value) {
                    Ok(())
                } else {
                    Err(StyleValueError::Font {
                        keyword,
                        fonts: SYSTEM_FONTS,
                    })
                }
            }
            Self::OneOf(variants) => {
                if variants.contains(&value) {
                    Ok(())
                } else {
                    Err(StyleValueError::OneOf { keyword, variants })
                }
            }
        }
    }
}

macro_rules! style_keywords {
    ($($variant:ident => $keyword:literal, $rule:expr;)+) => {
        /// A style attribute name.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum StyleKeyword {
            $($variant,)+
        }

        impl StyleKeyword {
            /// Every style attribute, in catalogue order.
            pub const ALL: &'static [StyleKeyword] = &[$(StyleKeyword::$variant,)+];

            /// The attribute name as written in source.
            pub fn keyword(self) -> &'static str {
                match self {
                    $(Self::$variant => $keyword,)+
                }
            }

            /// Rule the attribute's value must satisfy.
            pub fn rule(self) -> ValueRule {
                match self {
                    $(Self::$variant => $rule,)+
                }
            }
        }
    };
}

style_keywords! {
    Opacity => "opacity", ValueRule::FloatRange(0.0, 1.0);
    Fill => "fill", ValueRule::Color;
    FillPattern => "fill-pattern", ValueRule::OneOf(&["dots", "lines", "grain"]);
    Stroke => "stroke", ValueRule::Color;
    StrokeWidth => "stroke-width", ValueRule::IntRange(0, 15);
    StrokeDash => "stroke-dash", ValueRule::IntRange(0, 10);
    BorderRadius => "border-radius", ValueRule::IntRange(0, 20);
    Font => "font", ValueRule::Font;
    FontSize => "font-size", ValueRule::IntRange(8, 100);
    FontColor => "font-color", ValueRule::Color;
    Bold => "bold", ValueRule::Boolean;
    Italic => "italic", ValueRule::Boolean;
    Underline => "underline", ValueRule::Boolean;
    TextTransform => "text-transform", ValueRule::OneOf(&["uppercase", "lowercase", "title", "none"]);
    Shadow => "shadow", ValueRule::Boolean;
    Multiple => "multiple", ValueRule::Boolean;
    DoubleBorder => "double-border", ValueRule::Boolean;
    ThreeD => "3d", ValueRule::Boolean;
    Animated => "animated", ValueRule::Boolean;
    Filled => "filled", ValueRule::Boolean;
}

impl StyleKeyword {
    /// Looks up a style attribute by name (case-insensitive).
    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|style| style.keyword().eq_ignore_ascii_case(word))
    }

    /// Checks `value` against this attribute's rule.
    pub fn validate(self, value: &str) -> Result<(), StyleValueError> {
        self.rule().check(self.keyword(), value)
    }
}

impl fmt::Display for StyleKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
