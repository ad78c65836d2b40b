// stance_core/src/test_utils.rs

//! A small, self-consistent stand-in for a multibody engine.
//!
//! The fake models a biped whose whole body translates with `q[0..3]`. Every
//! body keeps its nominal orientation, and the spatial Jacobian of every body
//! origin is the identity on the first six velocity coordinates (three linear,
//! three angular), so `twist = J * v` holds exactly.

use std::cell::RefCell;

use nalgebra::{
    DMatrix, DVector, Isometry3, Matrix3, Matrix3xX, Matrix6xX, Translation3, UnitQuaternion,
    Vector3, Vector6,
};

use crate::abstractions::{DynamicsEngine, ExternalWrenches};
use crate::spatial::Twist;
use crate::types::{BiasTerm, BodyId, MassMatrix};

pub(crate) const GRAVITY: f64 = 9.81;

pub(crate) const JOINTS: [&str; 8] = [
    "base_x", "base_y", "base_z", "base_wx", "base_wy", "base_wz", "l_knee", "r_knee",
];
pub(crate) const ACTUATED: [&str; 2] = ["l_knee", "r_knee"];

#[derive(Debug, Clone)]
struct FakeBody {
    name: &'static str,
    nominal_pose: Isometry3<f64>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeCache {
    q: DVector<f64>,
    v: DVector<f64>,
    /// `Some(with_velocity_terms)` once kinematics ran for the loaded state.
    kinematics: Option<bool>,
}

#[derive(Debug)]
pub(crate) struct FakeEngine {
    bodies: Vec<FakeBody>,
    centroidal_matrix: Matrix6xX<f64>,
    /// Engine calls in order, for checking how the estimator drives the engine.
    pub(crate) calls: RefCell<Vec<&'static str>>,
}

impl FakeEngine {
    /// Pelvis, torso and two flat feet 20cm apart.
    pub(crate) fn biped() -> Self {
        let rotated_torso = Isometry3::from_parts(
            Translation3::new(0.0, 0.0, 1.4),
            UnitQuaternion::from_euler_angles(0.1, -0.2, 0.3),
        );
        let bodies = vec![
            FakeBody {
                name: "pelvis",
                nominal_pose: Isometry3::translation(0.0, 0.0, 1.0),
            },
            FakeBody {
                name: "torso",
                nominal_pose: rotated_torso,
            },
            FakeBody {
                name: "l_foot",
                nominal_pose: Isometry3::translation(0.0, 0.1, 0.1),
            },
            FakeBody {
                name: "r_foot",
                nominal_pose: Isometry3::translation(0.0, -0.1, 0.1),
            },
        ];
        let nv = JOINTS.len();
        let centroidal_matrix =
            Matrix6xX::from_fn(nv, |r, c| ((r + 1) as f64 * 0.5 - c as f64 * 0.25).sin());

        Self {
            bodies,
            centroidal_matrix,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn nominal_pose(&self, name: &str) -> Isometry3<f64> {
        self.bodies
            .iter()
            .find(|b| b.name == name)
            .map(|b| b.nominal_pose)
            .expect("unknown fake body")
    }

    pub(crate) fn call_log(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.borrow_mut().push(call);
    }

    fn check_kinematics(cache: &FakeCache, needs_velocity: bool) {
        match cache.kinematics {
            Some(with_velocity) => assert!(
                with_velocity || !needs_velocity,
                "query needs velocity kinematics"
            ),
            None => panic!("query before compute_kinematics"),
        }
    }

    fn origin_jacobian(&self) -> Matrix6xX<f64> {
        let mut jacobian = Matrix6xX::zeros(JOINTS.len());
        jacobian.fixed_view_mut::<6, 6>(0, 0).fill_with_identity();
        jacobian
    }

    fn lever_arm(&self, cache: &FakeCache, body: BodyId, point: &Vector3<f64>) -> Vector3<f64> {
        self.body_pose(cache, body).rotation * point
    }
}

impl DynamicsEngine for FakeEngine {
    type Cache = FakeCache;

    fn num_positions(&self) -> usize {
        JOINTS.len()
    }

    fn num_velocities(&self) -> usize {
        JOINTS.len()
    }

    fn num_actuators(&self) -> usize {
        ACTUATED.len()
    }

    fn find_body(&self, name: &str) -> Option<BodyId> {
        self.bodies.iter().position(|b| b.name == name).map(BodyId)
    }

    fn position_index(&self, joint: &str) -> Option<usize> {
        JOINTS.iter().position(|j| *j == joint)
    }

    fn velocity_index(&self, joint: &str) -> Option<usize> {
        JOINTS.iter().position(|j| *j == joint)
    }

    fn actuator_index(&self, joint: &str) -> Option<usize> {
        ACTUATED.iter().position(|j| *j == joint)
    }

    fn create_cache(&self) -> FakeCache {
        self.record("create_cache");
        FakeCache::default()
    }

    fn initialize_cache(&self, cache: &mut FakeCache, q: &DVector<f64>, v: &DVector<f64>) {
        self.record("initialize_cache");
        cache.q = q.clone();
        cache.v = v.clone();
        cache.kinematics = None;
    }

    fn compute_kinematics(&self, cache: &mut FakeCache, with_velocity_terms: bool) {
        self.record("compute_kinematics");
        cache.kinematics = Some(with_velocity_terms);
    }

    fn mass_matrix(&self, cache: &FakeCache) -> MassMatrix {
        Self::check_kinematics(cache, false);
        self.record("mass_matrix");
        let n = JOINTS.len();
        DMatrix::from_fn(n, n, |r, c| {
            if r == c {
                2.0 + cache.q[r].powi(2)
            } else {
                0.1 / (1.0 + (r + c) as f64)
            }
        })
    }

    fn bias_term(&self, cache: &FakeCache, external_wrenches: ExternalWrenches) -> BiasTerm {
        Self::check_kinematics(cache, true);
        assert!(external_wrenches.is_empty());
        self.record("bias_term");
        let mut bias = cache.v.component_mul(&cache.v) * 0.01;
        bias[2] += 75.0 * GRAVITY;
        bias
    }

    fn center_of_mass(&self, cache: &FakeCache) -> Vector3<f64> {
        Self::check_kinematics(cache, false);
        self.record("center_of_mass");
        Vector3::new(cache.q[0], cache.q[1], cache.q[2] + 0.9)
    }

    fn center_of_mass_jacobian(&self, cache: &FakeCache) -> Matrix3xX<f64> {
        Self::check_kinematics(cache, false);
        self.record("center_of_mass_jacobian");
        let mut jacobian = Matrix3xX::zeros(JOINTS.len());
        jacobian.fixed_view_mut::<3, 3>(0, 0).copy_from(&Matrix3::identity());
        jacobian
    }

    fn center_of_mass_jacobian_dot_times_v(&self, cache: &FakeCache) -> Vector3<f64> {
        Self::check_kinematics(cache, true);
        self.record("center_of_mass_jacobian_dot_times_v");
        Vector3::new(0.0, 0.0, -0.01 * cache.v[3])
    }

    fn centroidal_momentum_matrix(&self, cache: &FakeCache) -> Matrix6xX<f64> {
        Self::check_kinematics(cache, false);
        self.record("centroidal_momentum_matrix");
        self.centroidal_matrix.clone()
    }

    fn centroidal_momentum_matrix_dot_times_v(&self, cache: &FakeCache) -> Vector6<f64> {
        Self::check_kinematics(cache, true);
        self.record("centroidal_momentum_matrix_dot_times_v");
        Vector6::from_fn(|r, _| 0.001 * r as f64 * cache.v[0])
    }

    fn body_pose(&self, cache: &FakeCache, body: BodyId) -> Isometry3<f64> {
        Self::check_kinematics(cache, false);
        let shift = if cache.q.len() >= 3 {
            Translation3::new(cache.q[0], cache.q[1], cache.q[2])
        } else {
            Translation3::identity()
        };
        shift * self.bodies[body.0].nominal_pose
    }

    fn body_twist(&self, cache: &FakeCache, _body: BodyId) -> Twist {
        Self::check_kinematics(cache, true);
        let v: Vector6<f64> = self.origin_jacobian() * &cache.v;
        Twist::from_vector(&v)
    }

    fn body_jacobian(&self, cache: &FakeCache, body: BodyId, point: &Vector3<f64>) -> Matrix6xX<f64> {
        Self::check_kinematics(cache, false);
        let r = self.lever_arm(cache, body, point);
        let origin = self.origin_jacobian();
        let angular = origin.fixed_rows::<3>(3).into_owned();
        let mut jacobian = origin.clone();
        let linear = origin.fixed_rows::<3>(0) - r.cross_matrix() * &angular;
        jacobian.fixed_rows_mut::<3>(0).copy_from(&linear);
        jacobian
    }

    fn body_jacobian_dot_times_v(
        &self,
        cache: &FakeCache,
        body: BodyId,
        point: &Vector3<f64>,
    ) -> Vector6<f64> {
        Self::check_kinematics(cache, true);
        let r = self.lever_arm(cache, body, point);
        let omega = self.body_twist(cache, body).angular;
        let mut jdot_v = Vector6::zeros();
        jdot_v
            .fixed_rows_mut::<3>(0)
            .copy_from(&omega.cross(&omega.cross(&r)));
        jdot_v
    }
}
