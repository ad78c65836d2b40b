// stance_core/src/lib.rs

//! Per-control-cycle state estimation for a humanoid biped.
//!
//! A `StateEstimator` drives a `DynamicsEngine` with the latest joint state and
//! publishes one `HumanoidStatus` snapshot per cycle: dynamics terms, CoM and
//! centroidal momentum, tracked bodies, and foot contact wrenches with their
//! centers of pressure.

pub mod abstractions;
pub mod config;
pub mod error;
pub mod estimation;
pub mod messages;
pub mod prelude;
pub mod spatial;
pub mod types;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;
