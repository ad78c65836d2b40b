// stance_core/src/estimation/estimator.rs

use nalgebra::{DVector, Vector3};
use tracing::{info, warn};

use crate::abstractions::DynamicsEngine;
use crate::config::{EstimatorConfig, FootConfig};
use crate::error::{EstimatorError, StanceError};
use crate::estimation::bodies::{BodyOfInterest, BodySlot, BodyTracker};
use crate::estimation::contact::{ContactWrenchEstimator, FootKinematics};
use crate::messages::HumanoidStatus;
use crate::spatial::Wrench;
use crate::types::{BodyId, Side, Sided};

/// Lifecycle of a `StateEstimator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimatorPhase {
    /// Bound to a model, the snapshot still holds zeros.
    Constructed,
    /// At least one update succeeded.
    Updated,
}

/// The two tracked frames of one foot.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FootSlots {
    foot: BodySlot,
    sensor: BodySlot,
}

/// A per-control-cycle state estimator for a biped.
///
/// Each `update` drives the dynamics engine with the latest joint state, refreshes
/// every body of interest, and fuses the two ankle force/torque sensors. The
/// resulting `HumanoidStatus` is replaced as a whole: an update either succeeds
/// and commits every field, or fails validation before anything is written.
pub struct StateEstimator<E: DynamicsEngine> {
    engine: E,
    /// Kinematics cache, allocated once and reused every cycle.
    cache: E::Cache,
    contact_estimator: ContactWrenchEstimator,
    feet: Sided<FootSlots>,
    status: HumanoidStatus,
    phase: EstimatorPhase,
}

impl<E: DynamicsEngine> StateEstimator<E> {
    /// Binds an estimator to `engine` and registers every body of interest.
    ///
    /// Besides the configured bodies, each foot gets two slots: the foot body
    /// itself (named after the model body) and its force/torque sensor
    /// (`"<foot body>_sensor"`, at the calibrated sensor position).
    pub fn new(engine: E, config: &EstimatorConfig) -> Result<Self, StanceError> {
        config.validate()?;

        let nq = engine.num_positions();
        let nv = engine.num_velocities();
        let num_actuators = engine.num_actuators();

        let mut bodies = BodyTracker::new();
        for body in &config.bodies {
            let id = resolve_body(&engine, &body.body)?;
            bodies.register(&body.name, id, body.offset, nv)?;
        }

        let sensor_offset = config.calibration.foot_to_sensor_position_offset;
        let feet = Sided::new(
            register_foot(&engine, &mut bodies, &config.feet.left, &sensor_offset, nv)?,
            register_foot(&engine, &mut bodies, &config.feet.right, &sensor_offset, nv)?,
        );

        info!(
            nq,
            nv,
            num_actuators,
            bodies = bodies.len(),
            "state estimator bound to model"
        );

        let cache = engine.create_cache();
        Ok(Self {
            contact_estimator: ContactWrenchEstimator::new(&config.calibration, &config.contact),
            status: HumanoidStatus::zeros(nq, nv, num_actuators, bodies),
            engine,
            cache,
            feet,
            phase: EstimatorPhase::Constructed,
        })
    }

    /// Runs one estimation cycle.
    ///
    /// `left_wrench` and `right_wrench` are raw sensor readings
    /// `[fx, fy, fz, tx, ty, tz]` in each sensor's own frame.
    ///
    /// # Errors
    /// `DimensionMismatch` if `q`, `v` or `joint_torque` has the wrong length,
    /// `NonFinite` if any input holds NaN or Inf. In both cases the previous
    /// snapshot is left untouched.
    pub fn update(
        &mut self,
        t: f64,
        q: &DVector<f64>,
        v: &DVector<f64>,
        joint_torque: &DVector<f64>,
        left_wrench: impl Into<Wrench>,
        right_wrench: impl Into<Wrench>,
    ) -> Result<(), EstimatorError> {
        let raw_wrenches = Sided::new(left_wrench.into(), right_wrench.into());
        if let Err(err) = self.validate(t, q, v, joint_torque, &raw_wrenches) {
            warn!(%err, t, "rejected state update, keeping previous snapshot");
            return Err(err);
        }

        let status = &mut self.status;
        status.time = t;
        status.position.copy_from(q);
        status.velocity.copy_from(v);
        status.joint_torque.copy_from(joint_torque);

        self.engine
            .initialize_cache(&mut self.cache, &status.position, &status.velocity);
        self.engine.compute_kinematics(&mut self.cache, true);

        status.mass_matrix = self.engine.mass_matrix(&self.cache);
        status.bias_term = self.engine.bias_term(&self.cache, &[]);

        // com
        let com = &mut status.com;
        com.position = self.engine.center_of_mass(&self.cache);
        com.jacobian = self.engine.center_of_mass_jacobian(&self.cache);
        com.jacobian_dot_times_v = self.engine.center_of_mass_jacobian_dot_times_v(&self.cache);
        com.velocity = &com.jacobian * &status.velocity;

        let momentum = &mut status.centroidal_momentum;
        momentum.matrix = self.engine.centroidal_momentum_matrix(&self.cache);
        momentum.matrix_dot_times_v = self
            .engine
            .centroidal_momentum_matrix_dot_times_v(&self.cache);
        momentum.momentum = &momentum.matrix * &status.velocity;

        // body parts
        status.bodies.update_all(&self.engine, &self.cache);

        // ft sensors
        let kinematics = self.feet.map(|slots| FootKinematics {
            foot_pose: *status.bodies.issued(slots.foot).pose(),
            sensor_pose: *status.bodies.issued(slots.sensor).pose(),
        });
        status.contact = self.contact_estimator.estimate(&raw_wrenches, &kinematics);

        self.phase = EstimatorPhase::Updated;
        Ok(())
    }

    fn validate(
        &self,
        t: f64,
        q: &DVector<f64>,
        v: &DVector<f64>,
        joint_torque: &DVector<f64>,
        raw_wrenches: &Sided<Wrench>,
    ) -> Result<(), EstimatorError> {
        let status = &self.status;
        check_len("q", status.position.len(), q)?;
        check_len("v", status.velocity.len(), v)?;
        check_len("joint_torque", status.joint_torque.len(), joint_torque)?;

        if !t.is_finite() {
            return Err(EstimatorError::NonFinite { field: "t" });
        }
        check_finite("q", q)?;
        check_finite("v", v)?;
        check_finite("joint_torque", joint_torque)?;
        for side in Side::BOTH {
            if !raw_wrenches[side].is_finite() {
                let field = match side {
                    Side::Left => "left_wrench",
                    Side::Right => "right_wrench",
                };
                return Err(EstimatorError::NonFinite { field });
            }
        }
        Ok(())
    }

    // --- Accessors ---

    /// The latest committed snapshot.
    pub fn status(&self) -> &HumanoidStatus {
        &self.status
    }

    pub fn phase(&self) -> EstimatorPhase {
        self.phase
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn contact_estimator(&self) -> &ContactWrenchEstimator {
        &self.contact_estimator
    }

    pub fn foot(&self, side: Side) -> &BodyOfInterest {
        self.status.bodies.issued(self.feet[side].foot)
    }

    pub fn foot_sensor(&self, side: Side) -> &BodyOfInterest {
        self.status.bodies.issued(self.feet[side].sensor)
    }

    pub fn foot_slot(&self, side: Side) -> BodySlot {
        self.feet[side].foot
    }

    pub fn foot_sensor_slot(&self, side: Side) -> BodySlot {
        self.feet[side].sensor
    }

    /// Current position of the named joint.
    pub fn joint_position(&self, joint: &str) -> Result<f64, EstimatorError> {
        let index = self
            .engine
            .position_index(joint)
            .ok_or_else(|| EstimatorError::UnknownJoint(joint.to_string()))?;
        Ok(self.status.position[index])
    }

    /// Current velocity of the named joint.
    pub fn joint_velocity(&self, joint: &str) -> Result<f64, EstimatorError> {
        let index = self
            .engine
            .velocity_index(joint)
            .ok_or_else(|| EstimatorError::UnknownJoint(joint.to_string()))?;
        Ok(self.status.velocity[index])
    }

    /// Measured torque of the named actuated joint.
    pub fn joint_torque_by_name(&self, joint: &str) -> Result<f64, EstimatorError> {
        let index = self
            .engine
            .actuator_index(joint)
            .ok_or_else(|| EstimatorError::UnknownJoint(joint.to_string()))?;
        Ok(self.status.joint_torque[index])
    }
}

fn resolve_body<E: DynamicsEngine>(engine: &E, name: &str) -> Result<BodyId, EstimatorError> {
    engine
        .find_body(name)
        .ok_or_else(|| EstimatorError::UnknownBody(name.to_string()))
}

fn register_foot<E: DynamicsEngine>(
    engine: &E,
    bodies: &mut BodyTracker,
    foot: &FootConfig,
    sensor_offset: &Vector3<f64>,
    nv: usize,
) -> Result<FootSlots, EstimatorError> {
    let id = resolve_body(engine, &foot.body)?;
    let foot_slot = bodies.register_or_reuse(&foot.body, id, Vector3::zeros(), nv)?;
    let sensor_slot = bodies.register(&format!("{}_sensor", foot.body), id, *sensor_offset, nv)?;
    Ok(FootSlots {
        foot: foot_slot,
        sensor: sensor_slot,
    })
}

fn check_len(field: &'static str, expected: usize, value: &DVector<f64>) -> Result<(), EstimatorError> {
    if value.len() != expected {
        return Err(EstimatorError::DimensionMismatch {
            field,
            expected,
            got: value.len(),
        });
    }
    Ok(())
}

fn check_finite(field: &'static str, value: &DVector<f64>) -> Result<(), EstimatorError> {
    if value.iter().all(|x| x.is_finite()) {
        Ok(())
    } else {
        Err(EstimatorError::NonFinite { field })
    }
}
