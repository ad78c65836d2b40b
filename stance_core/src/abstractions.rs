// stance_core/src/abstractions.rs

use nalgebra::{DMatrix, DVector, Isometry3, Matrix3xX, Matrix6xX, Vector3, Vector6};

use crate::spatial::{Twist, Wrench};
use crate::types::{BiasTerm, BodyId, MassMatrix};

/// External wrenches applied to bodies when evaluating the bias term.
/// The estimator always passes an empty slice.
pub type ExternalWrenches<'a> = &'a [(BodyId, Wrench)];

// --- DYNAMICS ENGINE TRAIT ---
/// The capability interface of a multibody kinematics/dynamics engine.
///
/// The estimator never implements rigid-body algorithms itself; it drives an
/// engine through this trait once per control cycle. Every query is
/// synchronous and reads the kinematics stored in `Cache`, which is filled by
/// `initialize_cache` followed by `compute_kinematics`.
///
/// All 6-row quantities use the crate-wide `[linear; angular]` ordering and are
/// expressed in a world-aligned frame.
pub trait DynamicsEngine {
    /// Per-configuration kinematic scratch space, allocated once and reused.
    type Cache;

    /// Number of generalized positions, the length of `q`.
    fn num_positions(&self) -> usize;

    /// Number of generalized velocities, the length of `v`.
    fn num_velocities(&self) -> usize;

    /// Number of actuated joints, the length of the joint torque vector.
    fn num_actuators(&self) -> usize;

    /// Resolves a body name of the bound model.
    fn find_body(&self, name: &str) -> Option<BodyId>;

    /// Index of the named joint's coordinate in `q`.
    fn position_index(&self, joint: &str) -> Option<usize>;

    /// Index of the named joint's coordinate in `v`.
    fn velocity_index(&self, joint: &str) -> Option<usize>;

    /// Index of the named joint in the joint torque vector.
    fn actuator_index(&self, joint: &str) -> Option<usize>;

    /// Allocates an empty cache sized for this model.
    fn create_cache(&self) -> Self::Cache;

    /// Loads a configuration and velocity into the cache. Derived quantities are
    /// stale until `compute_kinematics` runs.
    fn initialize_cache(&self, cache: &mut Self::Cache, q: &DVector<f64>, v: &DVector<f64>);

    /// Forward kinematics. With `with_velocity_terms`, twists and
    /// Jacobian-dot-times-v terms become available too.
    fn compute_kinematics(&self, cache: &mut Self::Cache, with_velocity_terms: bool);

    /// Joint-space inertia matrix `M(q)`, nv x nv.
    fn mass_matrix(&self, cache: &Self::Cache) -> MassMatrix;

    /// Generalized forces `C(q, v)` from gravity and velocity products, minus
    /// the contribution of `external_wrenches`.
    fn bias_term(&self, cache: &Self::Cache, external_wrenches: ExternalWrenches) -> BiasTerm;

    fn center_of_mass(&self, cache: &Self::Cache) -> Vector3<f64>;

    fn center_of_mass_jacobian(&self, cache: &Self::Cache) -> Matrix3xX<f64>;

    fn center_of_mass_jacobian_dot_times_v(&self, cache: &Self::Cache) -> Vector3<f64>;

    /// Maps `v` to the momentum about the CoM, 6 x nv.
    fn centroidal_momentum_matrix(&self, cache: &Self::Cache) -> Matrix6xX<f64>;

    fn centroidal_momentum_matrix_dot_times_v(&self, cache: &Self::Cache) -> Vector6<f64>;

    /// World pose of a body frame.
    fn body_pose(&self, cache: &Self::Cache, body: BodyId) -> Isometry3<f64>;

    /// Spatial velocity of the body origin.
    fn body_twist(&self, cache: &Self::Cache, body: BodyId) -> Twist;

    /// World pose of a frame rigidly attached to `body` at `offset`.
    /// Engines that store named frames natively may override this.
    fn frame_pose(&self, cache: &Self::Cache, body: BodyId, offset: &Isometry3<f64>) -> Isometry3<f64> {
        self.body_pose(cache, body) * offset
    }

    /// Spatial velocity Jacobian of the body-fixed point `point` (body coordinates), 6 x nv.
    fn body_jacobian(&self, cache: &Self::Cache, body: BodyId, point: &Vector3<f64>) -> Matrix6xX<f64>;

    /// `Jdot * v` for the same point as `body_jacobian`.
    fn body_jacobian_dot_times_v(
        &self,
        cache: &Self::Cache,
        body: BodyId,
        point: &Vector3<f64>,
    ) -> Vector6<f64>;
}

// Lets an engine be shared by reference between an estimator and a controller.
impl<E: DynamicsEngine + ?Sized> DynamicsEngine for &E {
    type Cache = E::Cache;

    fn num_positions(&self) -> usize {
        (**self).num_positions()
    }

    fn num_velocities(&self) -> usize {
        (**self).num_velocities()
    }

    fn num_actuators(&self) -> usize {
        (**self).num_actuators()
    }

    fn find_body(&self, name: &str) -> Option<BodyId> {
        (**self).find_body(name)
    }

    fn position_index(&self, joint: &str) -> Option<usize> {
        (**self).position_index(joint)
    }

    fn velocity_index(&self, joint: &str) -> Option<usize> {
        (**self).velocity_index(joint)
    }

    fn actuator_index(&self, joint: &str) -> Option<usize> {
        (**self).actuator_index(joint)
    }

    fn create_cache(&self) -> Self::Cache {
        (**self).create_cache()
    }

    fn initialize_cache(&self, cache: &mut Self::Cache, q: &DVector<f64>, v: &DVector<f64>) {
        (**self).initialize_cache(cache, q, v)
    }

    fn compute_kinematics(&self, cache: &mut Self::Cache, with_velocity_terms: bool) {
        (**self).compute_kinematics(cache, with_velocity_terms)
    }

    fn mass_matrix(&self, cache: &Self::Cache) -> DMatrix<f64> {
        (**self).mass_matrix(cache)
    }

    fn bias_term(&self, cache: &Self::Cache, external_wrenches: ExternalWrenches) -> DVector<f64> {
        (**self).bias_term(cache, external_wrenches)
    }

    fn center_of_mass(&self, cache: &Self::Cache) -> Vector3<f64> {
        (**self).center_of_mass(cache)
    }

    fn center_of_mass_jacobian(&self, cache: &Self::Cache) -> Matrix3xX<f64> {
        (**self).center_of_mass_jacobian(cache)
    }

    fn center_of_mass_jacobian_dot_times_v(&self, cache: &Self::Cache) -> Vector3<f64> {
        (**self).center_of_mass_jacobian_dot_times_v(cache)
    }

    fn centroidal_momentum_matrix(&self, cache: &Self::Cache) -> Matrix6xX<f64> {
        (**self).centroidal_momentum_matrix(cache)
    }

    fn centroidal_momentum_matrix_dot_times_v(&self, cache: &Self::Cache) -> Vector6<f64> {
        (**self).centroidal_momentum_matrix_dot_times_v(cache)
    }

    fn body_pose(&self, cache: &Self::Cache, body: BodyId) -> Isometry3<f64> {
        (**self).body_pose(cache, body)
    }

    fn body_twist(&self, cache: &Self::Cache, body: BodyId) -> Twist {
        (**self).body_twist(cache, body)
    }

    fn frame_pose(&self, cache: &Self::Cache, body: BodyId, offset: &Isometry3<f64>) -> Isometry3<f64> {
        (**self).frame_pose(cache, body, offset)
    }

    fn body_jacobian(&self, cache: &Self::Cache, body: BodyId, point: &Vector3<f64>) -> Matrix6xX<f64> {
        (**self).body_jacobian(cache, body, point)
    }

    fn body_jacobian_dot_times_v(
        &self,
        cache: &Self::Cache,
        body: BodyId,
        point: &Vector3<f64>,
    ) -> Vector6<f64> {
        (**self).body_jacobian_dot_times_v(cache, body, point)
    }
}
