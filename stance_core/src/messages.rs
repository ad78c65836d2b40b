// stance_core/src/messages.rs

use nalgebra::{DVector, Matrix3xX, Matrix6xX, Vector2, Vector3, Vector6};

use crate::estimation::bodies::{BodyOfInterest, BodySlot, BodyTracker};
use crate::estimation::contact::{ContactEstimate, FootContact};
use crate::spatial::Wrench;
use crate::types::{BiasTerm, Configuration, JointTorque, MassMatrix, Side, Velocity};

// =========================================================================
// == Public API Messages (Snapshot Data) ==
// =========================================================================

/// Center-of-mass kinematics for the current configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct CenterOfMass {
    /// World position.
    pub position: Vector3<f64>,
    /// World velocity, `jacobian * v`.
    pub velocity: Vector3<f64>,
    /// 3 x nv.
    pub jacobian: Matrix3xX<f64>,
    pub jacobian_dot_times_v: Vector3<f64>,
}

impl CenterOfMass {
    pub(crate) fn zeros(nv: usize) -> Self {
        Self {
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            jacobian: Matrix3xX::zeros(nv),
            jacobian_dot_times_v: Vector3::zeros(),
        }
    }
}

/// Linear and angular momentum about the CoM, `[linear; angular]`.
#[derive(Clone, Debug, PartialEq)]
pub struct CentroidalMomentum {
    /// 6 x nv, maps `v` to `momentum`.
    pub matrix: Matrix6xX<f64>,
    pub matrix_dot_times_v: Vector6<f64>,
    /// `matrix * v`.
    pub momentum: Vector6<f64>,
}

impl CentroidalMomentum {
    pub(crate) fn zeros(nv: usize) -> Self {
        Self {
            matrix: Matrix6xX::zeros(nv),
            matrix_dot_times_v: Vector6::zeros(),
            momentum: Vector6::zeros(),
        }
    }
}

/// The primary output of the estimator: one consistent snapshot of the
/// robot's kinematic and dynamic state, refreshed as a whole by every
/// successful `StateEstimator::update`.
///
/// This is the message the inverse-dynamics controller consumes each cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct HumanoidStatus {
    pub(crate) time: f64,
    pub(crate) position: Configuration,
    pub(crate) velocity: Velocity,
    pub(crate) joint_torque: JointTorque,
    pub(crate) mass_matrix: MassMatrix,
    pub(crate) bias_term: BiasTerm,
    pub(crate) com: CenterOfMass,
    pub(crate) centroidal_momentum: CentroidalMomentum,
    pub(crate) bodies: BodyTracker,
    pub(crate) contact: ContactEstimate,
}

impl HumanoidStatus {
    /// An all-zero snapshot sized for the model, used before the first update.
    pub(crate) fn zeros(nq: usize, nv: usize, num_actuators: usize, bodies: BodyTracker) -> Self {
        Self {
            time: 0.0,
            position: DVector::zeros(nq),
            velocity: DVector::zeros(nv),
            joint_torque: DVector::zeros(num_actuators),
            mass_matrix: MassMatrix::zeros(nv, nv),
            bias_term: DVector::zeros(nv),
            com: CenterOfMass::zeros(nv),
            centroidal_momentum: CentroidalMomentum::zeros(nv),
            bodies,
            contact: ContactEstimate::default(),
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn position(&self) -> &Configuration {
        &self.position
    }

    pub fn velocity(&self) -> &Velocity {
        &self.velocity
    }

    pub fn joint_torque(&self) -> &JointTorque {
        &self.joint_torque
    }

    pub fn mass_matrix(&self) -> &MassMatrix {
        &self.mass_matrix
    }

    pub fn bias_term(&self) -> &BiasTerm {
        &self.bias_term
    }

    pub fn com(&self) -> &CenterOfMass {
        &self.com
    }

    pub fn centroidal_momentum(&self) -> &CentroidalMomentum {
        &self.centroidal_momentum
    }

    pub fn bodies(&self) -> &BodyTracker {
        &self.bodies
    }

    pub fn body(&self, slot: BodySlot) -> Option<&BodyOfInterest> {
        self.bodies.get(slot)
    }

    pub fn body_by_name(&self, name: &str) -> Option<&BodyOfInterest> {
        self.bodies.by_name(name)
    }

    pub fn contact(&self) -> &ContactEstimate {
        &self.contact
    }

    pub fn foot_contact(&self, side: Side) -> &FootContact {
        &self.contact.feet[side]
    }

    /// Foot wrench after the sensor-to-body rotation, still about the sensor origin.
    pub fn foot_wrench_in_sensor_frame(&self, side: Side) -> &Wrench {
        &self.contact.feet[side].wrench_in_sensor_frame
    }

    /// Foot wrench in the world-aligned frame at the foot origin.
    pub fn foot_wrench_in_world_frame(&self, side: Side) -> &Wrench {
        &self.contact.feet[side].wrench_in_world_frame
    }

    pub fn cop_in_sensor_frame(&self, side: Side) -> &Vector2<f64> {
        &self.contact.feet[side].cop_in_sensor_frame
    }

    pub fn cop_in_world_frame(&self, side: Side) -> &Vector2<f64> {
        &self.contact.feet[side].cop_in_world_frame
    }

    /// World position of the foot's sole contact point.
    pub fn sole_position(&self, side: Side) -> &Vector3<f64> {
        &self.contact.feet[side].sole_position
    }

    /// Combined world CoP of both feet, `None` when neither foot carries load.
    pub fn cop(&self) -> Option<Vector2<f64>> {
        self.contact.cop
    }
}
