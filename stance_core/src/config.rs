// stance_core/src/config.rs

//! Construction-time configuration of a `StateEstimator`: per-robot sensor
//! calibration, contact thresholds, the feet, and the bodies of interest.

use figment::{
    providers::{Format, Toml},
    Figment,
};
use nalgebra::{Rotation3, Vector3};
use serde::Deserialize;
use std::f64::consts::PI;
use std::path::Path;

use crate::error::ConfigError;
use crate::types::Sided;
use crate::utils::serde_helpers;

// =========================================================================
// == Top-Level Configuration ==
// =========================================================================

/// # EstimatorConfig
/// Everything a `StateEstimator` needs besides the dynamics engine itself.
/// This struct is the root of the data parsed from an estimator `.toml` file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)] // Fail if the TOML has fields not in our struct
pub struct EstimatorConfig {
    #[serde(default)]
    pub calibration: CalibrationOffsets,

    #[serde(default)]
    pub contact: ContactConfig,

    /// The `[feet.left]` / `[feet.right]` tables.
    pub feet: Sided<FootConfig>,

    // The TOML has `[[bodies]]`, which becomes a Vec of BodyOfInterestConfig structs.
    #[serde(default)]
    pub bodies: Vec<BodyOfInterestConfig>,
}

impl EstimatorConfig {
    /// A config with default calibration and thresholds and no extra bodies.
    pub fn new(left_foot: impl Into<String>, right_foot: impl Into<String>) -> Self {
        Self {
            calibration: CalibrationOffsets::default(),
            contact: ContactConfig::default(),
            feet: Sided::new(FootConfig::new(left_foot), FootConfig::new(right_foot)),
            bodies: Vec::new(),
        }
    }

    pub fn with_calibration(mut self, calibration: CalibrationOffsets) -> Self {
        self.calibration = calibration;
        self
    }

    pub fn with_contact(mut self, contact: ContactConfig) -> Self {
        self.contact = contact;
        self
    }

    /// Adds a body of interest tracked at its origin.
    pub fn with_body(mut self, name: impl Into<String>, body: impl Into<String>) -> Self {
        self.bodies.push(BodyOfInterestConfig {
            name: name.into(),
            body: body.into(),
            offset: Vector3::zeros(),
        });
        self
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = Figment::new().merge(Toml::string(toml)).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = Figment::new().merge(Toml::file(path.as_ref())).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.calibration.validate()?;
        self.contact.validate()?;
        for (field, foot) in [("feet.left.body", &self.feet.left), ("feet.right.body", &self.feet.right)] {
            if foot.body.trim().is_empty() {
                return Err(invalid(field, "must name a body of the model"));
            }
        }
        for body in &self.bodies {
            if body.name.trim().is_empty() || body.body.trim().is_empty() {
                return Err(invalid("bodies", "name and body must be non-empty"));
            }
            if !is_finite3(&body.offset) {
                return Err(invalid("bodies.offset", "must be finite"));
            }
        }
        Ok(())
    }
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

/// Per-robot offsets between a foot body frame, its force/torque sensor, and
/// the sole contact point.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CalibrationOffsets {
    /// Foot frame origin to the sole contact point, in foot coordinates.
    #[serde(with = "serde_helpers::vec3_from_array")]
    pub foot_to_contact_offset: Vector3<f64>,

    /// Foot frame origin to the sensor origin, in foot coordinates.
    #[serde(with = "serde_helpers::vec3_from_array")]
    pub foot_to_sensor_position_offset: Vector3<f64>,

    /// Orientation of the sensor axes relative to the foot frame.
    /// Given in the TOML as `[roll, pitch, yaw]` in degrees.
    #[serde(with = "serde_helpers::rotation_from_euler_deg")]
    pub foot_to_sensor_rotation_offset: Rotation3<f64>,
}

impl Default for CalibrationOffsets {
    fn default() -> Self {
        Self {
            foot_to_contact_offset: Vector3::zeros(),
            foot_to_sensor_position_offset: Vector3::zeros(),
            foot_to_sensor_rotation_offset: Rotation3::identity(),
        }
    }
}

impl CalibrationOffsets {
    /// Offsets of the Valkyrie humanoid's ankle force/torque sensors.
    pub fn valkyrie() -> Self {
        Self {
            foot_to_contact_offset: Vector3::new(0.0, 0.0, -0.09),
            foot_to_sensor_position_offset: Vector3::new(0.0215646, 0.0, -0.051054),
            foot_to_sensor_rotation_offset: Rotation3::from_axis_angle(&Vector3::x_axis(), -PI),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !is_finite3(&self.foot_to_contact_offset) {
            return Err(invalid("calibration.foot_to_contact_offset", "must be finite"));
        }
        if !is_finite3(&self.foot_to_sensor_position_offset) {
            return Err(invalid("calibration.foot_to_sensor_position_offset", "must be finite"));
        }
        if !self.foot_to_sensor_rotation_offset.matrix().iter().all(|x| x.is_finite()) {
            return Err(invalid("calibration.foot_to_sensor_rotation_offset", "must be finite"));
        }
        Ok(())
    }
}

/// Thresholds of the contact wrench estimator, in Newtons.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ContactConfig {
    /// Below this `|Fz|` a foot is treated as unloaded and its CoP falls back
    /// to the foot origin.
    pub min_foot_vertical_force: f64,
    /// Below this `|Fz_left + Fz_right|` no combined CoP is reported.
    pub min_total_vertical_force: f64,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            min_foot_vertical_force: 1e-3,
            min_total_vertical_force: 1e-3,
        }
    }
}

impl ContactConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("contact.min_foot_vertical_force", self.min_foot_vertical_force),
            ("contact.min_total_vertical_force", self.min_total_vertical_force),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(field, &format!("must be positive and finite, got {}", value)));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FootConfig {
    /// Name of the foot body in the model.
    pub body: String,
}

impl FootConfig {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BodyOfInterestConfig {
    /// Lookup name used by the controller.
    pub name: String,
    /// Name of the body in the model.
    pub body: String,
    /// Tracked point in body coordinates.
    #[serde(with = "serde_helpers::vec3_from_array", default = "zero_offset")]
    pub offset: Vector3<f64>,
}

fn zero_offset() -> Vector3<f64> {
    Vector3::zeros()
}

fn is_finite3(v: &Vector3<f64>) -> bool {
    v.iter().all(|x| x.is_finite())
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    }
}
