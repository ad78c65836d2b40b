// stance_core/src/estimation/contact.rs

//! Fuses the two ankle force/torque sensors into world-frame foot wrenches and
//! centers of pressure.

use nalgebra::{Isometry3, Point3, Rotation3, Translation3, UnitQuaternion, Vector2, Vector3};
use tracing::debug;

use crate::config::{CalibrationOffsets, ContactConfig};
use crate::spatial::{transform_spatial_force, Wrench};
use crate::types::{Side, Sided};

/// Where the kinematics put one foot this cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FootKinematics {
    /// World pose of the foot body frame.
    pub foot_pose: Isometry3<f64>,
    /// World pose of the force/torque sensor frame (foot axes, sensor origin).
    pub sensor_pose: Isometry3<f64>,
}

/// Contact quantities of one foot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FootContact {
    /// Measured wrench rotated into foot axes, about the sensor origin.
    pub wrench_in_sensor_frame: Wrench,
    /// The same wrench in world axes, about the foot origin.
    pub wrench_in_world_frame: Wrench,
    pub cop_in_sensor_frame: Vector2<f64>,
    pub cop_in_world_frame: Vector2<f64>,
    /// World position of the sole contact point.
    pub sole_position: Vector3<f64>,
    /// `|Fz|` is at or above the per-foot threshold.
    pub loaded: bool,
}

impl FootContact {
    /// World vertical force on the foot.
    pub fn vertical_force(&self) -> f64 {
        self.wrench_in_world_frame.force.z
    }
}

/// Contact state of both feet.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContactEstimate {
    pub feet: Sided<FootContact>,
    /// Force-weighted world CoP of both feet, assuming they share one horizontal
    /// plane. `None` when the summed vertical force is below threshold.
    pub cop: Option<Vector2<f64>>,
}

impl ContactEstimate {
    pub fn in_contact(&self) -> bool {
        self.cop.is_some()
    }
}

/// Center of pressure of a wrench about the origin of the frame it is expressed
/// in, `(-ty / fz, tx / fz)`. The caller guarantees `fz` is not near zero.
pub fn center_of_pressure(wrench: &Wrench) -> Vector2<f64> {
    let fz = wrench.force.z;
    Vector2::new(-wrench.torque.y / fz, wrench.torque.x / fz)
}

/// Force-weighted average of the per-foot CoPs.
pub fn combine_cops(
    cops: &Sided<Vector2<f64>>,
    vertical_forces: &Sided<f64>,
    min_total_vertical_force: f64,
) -> Option<Vector2<f64>> {
    let total = vertical_forces.left + vertical_forces.right;
    if total.abs() < min_total_vertical_force {
        return None;
    }
    Some((cops.left * vertical_forces.left + cops.right * vertical_forces.right) / total)
}

/// Converts raw sensor wrenches into contact quantities using the robot's
/// calibration offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactWrenchEstimator {
    sensor_rotation_offset: Rotation3<f64>,
    contact_offset: Vector3<f64>,
    thresholds: ContactConfig,
}

impl ContactWrenchEstimator {
    pub fn new(calibration: &CalibrationOffsets, thresholds: &ContactConfig) -> Self {
        Self {
            sensor_rotation_offset: calibration.foot_to_sensor_rotation_offset,
            contact_offset: calibration.foot_to_contact_offset,
            thresholds: thresholds.clone(),
        }
    }

    pub fn thresholds(&self) -> &ContactConfig {
        &self.thresholds
    }

    /// Processes one foot.
    pub fn estimate_foot(&self, raw_wrench: &Wrench, kinematics: &FootKinematics) -> FootContact {
        // Sensor axes -> foot axes.
        let wrench_in_sensor_frame = raw_wrench.rotated(self.sensor_rotation_offset.transpose().matrix());

        // Target frame: world orientation, located at the foot origin.
        let foot_position = kinematics.foot_pose.translation.vector;
        let ankle_to_world =
            Isometry3::from_parts(Translation3::from(foot_position), UnitQuaternion::identity());
        let sensor_to_ankle = ankle_to_world.inverse() * kinematics.sensor_pose;
        let wrench_in_world_frame = transform_spatial_force(&sensor_to_ankle, &wrench_in_sensor_frame);

        let sole_position = (kinematics.foot_pose * Point3::from(self.contact_offset)).coords;
        let min_fz = self.thresholds.min_foot_vertical_force;
        let loaded = wrench_in_world_frame.force.z.abs() >= min_fz;

        let cop_in_world_frame = if loaded {
            center_of_pressure(&wrench_in_world_frame) + foot_position.xy()
        } else {
            foot_position.xy()
        };
        // A tilted foot can be loaded in world z with no load along the sensor z axis.
        let cop_in_sensor_frame = if loaded && wrench_in_sensor_frame.force.z.abs() >= min_fz {
            center_of_pressure(&wrench_in_sensor_frame)
        } else {
            Vector2::zeros()
        };

        FootContact {
            wrench_in_sensor_frame,
            wrench_in_world_frame,
            cop_in_sensor_frame,
            cop_in_world_frame,
            sole_position,
            loaded,
        }
    }

    /// Processes both feet and combines their CoPs.
    pub fn estimate(
        &self,
        raw_wrenches: &Sided<Wrench>,
        kinematics: &Sided<FootKinematics>,
    ) -> ContactEstimate {
        let feet = Sided::from_fn(|side| {
            let foot = self.estimate_foot(&raw_wrenches[side], &kinematics[side]);
            if !foot.loaded {
                debug!(side = side.name(), fz = foot.vertical_force(), "foot unloaded");
            }
            foot
        });

        let cops = feet.as_ref().map(|foot| foot.cop_in_world_frame);
        let vertical_forces = feet.as_ref().map(FootContact::vertical_force);
        let cop = combine_cops(&cops, &vertical_forces, self.thresholds.min_total_vertical_force);
        if cop.is_none() {
            debug!(
                fz_left = vertical_forces[Side::Left],
                fz_right = vertical_forces[Side::Right],
                "no combined center of pressure, feet carry no net vertical load"
            );
        }

        ContactEstimate { feet, cop }
    }
}
