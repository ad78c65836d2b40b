// stance_core/src/spatial.rs

//! Spatial (6D) force and motion vectors.
//!
//! Every 6-vector in this crate is ordered `[linear; angular]`:
//! a wrench is `[fx, fy, fz, tx, ty, tz]` and a twist is `[vx, vy, vz, wx, wy, wz]`.

use nalgebra::{Isometry3, Vector3, Vector6};

/// A 6D generalized force: a force and the moment it produces about the
/// origin of the frame it is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Wrench {
    pub force: Vector3<f64>,
    pub torque: Vector3<f64>,
}

impl Wrench {
    pub fn new(force: Vector3<f64>, torque: Vector3<f64>) -> Self {
        Self { force, torque }
    }

    pub fn zeros() -> Self {
        Self::default()
    }

    /// Unpacks `[fx, fy, fz, tx, ty, tz]`.
    pub fn from_vector(v: &Vector6<f64>) -> Self {
        Self {
            force: v.fixed_rows::<3>(0).into(),
            torque: v.fixed_rows::<3>(3).into(),
        }
    }

    pub fn to_vector(&self) -> Vector6<f64> {
        let mut v = Vector6::zeros();
        v.fixed_rows_mut::<3>(0).copy_from(&self.force);
        v.fixed_rows_mut::<3>(3).copy_from(&self.torque);
        v
    }

    /// Applies the same rotation matrix to both the force and the torque triple.
    /// No lever arm is involved, so the point of application is unchanged.
    pub fn rotated(&self, rotation: &nalgebra::Matrix3<f64>) -> Self {
        Self {
            force: rotation * self.force,
            torque: rotation * self.torque,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.force.iter().chain(self.torque.iter()).all(|x| x.is_finite())
    }
}

impl From<Vector6<f64>> for Wrench {
    fn from(v: Vector6<f64>) -> Self {
        Self::from_vector(&v)
    }
}

impl From<Wrench> for Vector6<f64> {
    fn from(w: Wrench) -> Self {
        w.to_vector()
    }
}

/// Re-expresses a wrench from frame A in frame B.
///
/// `tf_b_from_a` maps coordinates of A into B (the pose of A in B). The force
/// is rotated into B; the torque is rotated and picks up the moment of the
/// force about B's origin, `p × f`.
pub fn transform_spatial_force(tf_b_from_a: &Isometry3<f64>, wrench_a: &Wrench) -> Wrench {
    let force = tf_b_from_a.rotation * wrench_a.force;
    let torque = tf_b_from_a.rotation * wrench_a.torque
        + tf_b_from_a.translation.vector.cross(&force);
    Wrench { force, torque }
}

/// Spatial velocity of a point rigidly attached to a body, expressed in a
/// world-aligned frame located at that point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Twist {
    pub linear: Vector3<f64>,
    pub angular: Vector3<f64>,
}

impl Twist {
    pub fn new(linear: Vector3<f64>, angular: Vector3<f64>) -> Self {
        Self { linear, angular }
    }

    /// Unpacks `[vx, vy, vz, wx, wy, wz]`.
    pub fn from_vector(v: &Vector6<f64>) -> Self {
        Self {
            linear: v.fixed_rows::<3>(0).into(),
            angular: v.fixed_rows::<3>(3).into(),
        }
    }

    pub fn to_vector(&self) -> Vector6<f64> {
        let mut v = Vector6::zeros();
        v.fixed_rows_mut::<3>(0).copy_from(&self.linear);
        v.fixed_rows_mut::<3>(3).copy_from(&self.angular);
        v
    }

    /// Velocity of the point displaced by `r` (world-aligned) from the current one.
    pub fn shift(&self, r: &Vector3<f64>) -> Self {
        Self {
            linear: self.linear + self.angular.cross(r),
            angular: self.angular,
        }
    }
}
