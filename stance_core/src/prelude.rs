// stance_core/src/prelude.rs

// --- Core Abstractions ---
pub use crate::abstractions::{DynamicsEngine, ExternalWrenches};
pub use crate::error::{ConfigError, EstimatorError, StanceError};

// --- Core Data Structures ---
pub use crate::messages::{CenterOfMass, CentroidalMomentum, HumanoidStatus};
pub use crate::spatial::{transform_spatial_force, Twist, Wrench};
pub use crate::types::{BodyId, Side, Sided};

// --- Estimation ---
pub use crate::estimation::{
    BodyOfInterest, BodySlot, ContactEstimate, ContactWrenchEstimator, EstimatorPhase,
    FootContact, StateEstimator,
};

// --- Configuration ---
pub use crate::config::{CalibrationOffsets, ContactConfig, EstimatorConfig};
