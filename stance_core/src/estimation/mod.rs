// stance_core/src/estimation/mod.rs

//! The per-cycle estimator and the two components it drives: the
//! body-of-interest tracker and the contact wrench estimator.

pub mod bodies;
pub mod contact;
mod estimator;

pub use bodies::{BodyOfInterest, BodySlot, BodyTracker};
pub use contact::{ContactEstimate, ContactWrenchEstimator, FootContact, FootKinematics};
pub use estimator::{EstimatorPhase, StateEstimator};
