//! Configuration types for D2 document processing.
//!
//! This module provides configuration structures that control which checks
//! run after a document is parsed. All types implement [`serde::Deserialize`]
//! for loading from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration.
//! - [`ValidationConfig`] - Switches for the keyword and value checks.
//!
//! # Example
//!
//! ```
//! # use d2::config::AppConfig;
//! // Use default configuration
//! let config = AppConfig::default();
//! assert!(config.validate().styles());
//! assert!(config.validate().shapes());
//! ```

use serde::Deserialize;

use d2_parser::validate::ValidateConfig;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Validation configuration section.
    #[serde(default)]
    validate: ValidationConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified validation configuration.
    pub fn new(validate: ValidationConfig) -> Self {
        Self { validate }
    }

    /// Returns the validation configuration.
    pub fn validate(&self) -> &ValidationConfig {
        &self.validate
    }
}

/// Which checks run after parsing.
///
/// Both checks are enabled unless the configuration turns them off:
///
/// ```toml
/// [validate]
/// styles = true
/// shapes = false
/// ```
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ValidationConfig {
    /// Check style keywords, style values and connection block keywords.
    #[serde(default = "enabled")]
    styles: bool,

    /// Check the values of `shape:` properties.
    #[serde(default = "enabled")]
    shapes: bool,
}

fn enabled() -> bool {
    true
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            styles: true,
            shapes: true,
        }
    }
}

impl ValidationConfig {
    /// Creates a new [`ValidationConfig`].
    ///
    /// # Arguments
    ///
    /// * `styles` - Whether style keywords and values are checked.
    /// * `shapes` - Whether `shape:` values are checked.
    pub fn new(styles: bool, shapes: bool) -> Self {
        Self { styles, shapes }
    }

    pub fn styles(&self) -> bool {
        self.styles
    }

    pub fn shapes(&self) -> bool {
        self.shapes
    }

    /// Returns `true` when at least one check is enabled.
    pub fn is_enabled(&self) -> bool {
        self.styles || self.shapes
    }
}

impl From<ValidationConfig> for ValidateConfig {
    fn from(config: ValidationConfig) -> Self {
        ValidateConfig {
            check_styles: config.styles,
            check_shapes: config.shapes,
        }
    }
}
