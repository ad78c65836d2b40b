// stance_core/src/estimation/bodies.rs

use nalgebra::{Isometry3, Matrix6xX, Translation3, UnitQuaternion, Vector3, Vector6};

use crate::abstractions::DynamicsEngine;
use crate::error::EstimatorError;
use crate::spatial::Twist;
use crate::types::BodyId;

/// Index-stable handle to a slot of a `BodyTracker`.
/// Only the tracker that issued a slot can resolve it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodySlot(usize);

impl BodySlot {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A point on a rigid body whose world kinematics are refreshed every cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyOfInterest {
    name: String,
    body: BodyId,
    /// Tracked point in body coordinates.
    offset: Vector3<f64>,
    pose: Isometry3<f64>,
    twist: Twist,
    /// 6 x nv spatial Jacobian of the tracked point.
    jacobian: Matrix6xX<f64>,
    jacobian_dot_times_v: Vector6<f64>,
}

impl BodyOfInterest {
    fn new(name: String, body: BodyId, offset: Vector3<f64>, num_velocities: usize) -> Self {
        Self {
            name,
            body,
            offset,
            pose: Isometry3::identity(),
            twist: Twist::default(),
            jacobian: Matrix6xX::zeros(num_velocities),
            jacobian_dot_times_v: Vector6::zeros(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> BodyId {
        self.body
    }

    pub fn offset(&self) -> &Vector3<f64> {
        &self.offset
    }

    /// World pose of the frame at the tracked point, with the body's orientation.
    pub fn pose(&self) -> &Isometry3<f64> {
        &self.pose
    }

    /// Spatial velocity of the tracked point.
    pub fn twist(&self) -> &Twist {
        &self.twist
    }

    pub fn jacobian(&self) -> &Matrix6xX<f64> {
        &self.jacobian
    }

    pub fn jacobian_dot_times_v(&self) -> &Vector6<f64> {
        &self.jacobian_dot_times_v
    }

    /// Overwrites the cached values from freshly computed kinematics.
    fn update<E: DynamicsEngine>(&mut self, engine: &E, cache: &E::Cache) {
        let origin = engine.body_pose(cache, self.body);
        let offset = Isometry3::from_parts(Translation3::from(self.offset), UnitQuaternion::identity());
        self.pose = engine.frame_pose(cache, self.body, &offset);

        let lever_arm = origin.rotation * self.offset;
        self.twist = engine.body_twist(cache, self.body).shift(&lever_arm);

        self.jacobian = engine.body_jacobian(cache, self.body, &self.offset);
        self.jacobian_dot_times_v = engine.body_jacobian_dot_times_v(cache, self.body, &self.offset);
    }
}

/// A fixed arena of bodies of interest.
///
/// Slots are registered while the estimator is built and never added or
/// removed afterwards, so a `BodySlot` stays valid for the estimator's lifetime
/// and a refresh touches every slot in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BodyTracker {
    bodies: Vec<BodyOfInterest>,
}

impl BodyTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds a slot. Names must be unique within the tracker.
    pub(crate) fn register(
        &mut self,
        name: &str,
        body: BodyId,
        offset: Vector3<f64>,
        num_velocities: usize,
    ) -> Result<BodySlot, EstimatorError> {
        if self.find(name).is_some() {
            return Err(EstimatorError::DuplicateBody(name.to_string()));
        }
        self.bodies
            .push(BodyOfInterest::new(name.to_string(), body, offset, num_velocities));
        Ok(BodySlot(self.bodies.len() - 1))
    }

    /// Returns the existing slot if it tracks the same point, otherwise registers a new one.
    pub(crate) fn register_or_reuse(
        &mut self,
        name: &str,
        body: BodyId,
        offset: Vector3<f64>,
        num_velocities: usize,
    ) -> Result<BodySlot, EstimatorError> {
        match self.find(name) {
            Some(slot) => {
                let existing = &self.bodies[slot.0];
                if existing.body == body && existing.offset == offset {
                    Ok(slot)
                } else {
                    Err(EstimatorError::DuplicateBody(name.to_string()))
                }
            }
            None => self.register(name, body, offset, num_velocities),
        }
    }

    /// Resolves a slot, `None` if it lies outside this tracker.
    pub fn get(&self, slot: BodySlot) -> Option<&BodyOfInterest> {
        self.bodies.get(slot.0)
    }

    /// Resolves a slot this tracker issued itself.
    pub(crate) fn issued(&self, slot: BodySlot) -> &BodyOfInterest {
        &self.bodies[slot.0]
    }

    pub fn find(&self, name: &str) -> Option<BodySlot> {
        self.bodies.iter().position(|b| b.name == name).map(BodySlot)
    }

    pub fn by_name(&self, name: &str) -> Option<&BodyOfInterest> {
        self.find(name).map(|slot| self.issued(slot))
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodySlot, &BodyOfInterest)> {
        self.bodies.iter().enumerate().map(|(i, b)| (BodySlot(i), b))
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Refreshes every slot from the engine's current kinematics.
    pub(crate) fn update_all<E: DynamicsEngine>(&mut self, engine: &E, cache: &E::Cache) {
        for body in &mut self.bodies {
            body.update(engine, cache);
        }
    }
}
