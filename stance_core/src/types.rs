// stance_core/src/types.rs

use nalgebra::{DMatrix, DVector};
use serde::Deserialize;
use std::ops::{Index, IndexMut};

// --- Core Type Aliases ---
/// Generalized position vector `q`.
pub type Configuration = DVector<f64>;
/// Generalized velocity vector `v`.
pub type Velocity = DVector<f64>;
/// Actuated joint torque vector.
pub type JointTorque = DVector<f64>;
/// Joint-space inertia matrix `M(q)`.
pub type MassMatrix = DMatrix<f64>;
/// Gravity + Coriolis/centrifugal generalized forces `C(q, v)`.
pub type BiasTerm = DVector<f64>;

// --- Core Identifier ---
/// An engine-assigned identifier for a rigid body of the bound model.
/// The estimator never interprets the value; it only hands it back to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BodyId(pub usize);

/// Which foot a quantity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn name(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// A pair of values, one per foot, indexable by `Side`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Sided<T> {
    pub left: T,
    pub right: T,
}

impl<T> Sided<T> {
    pub fn new(left: T, right: T) -> Self {
        Self { left, right }
    }

    /// Builds both sides from a closure called once per side, left first.
    pub fn from_fn(mut f: impl FnMut(Side) -> T) -> Self {
        let left = f(Side::Left);
        let right = f(Side::Right);
        Self { left, right }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Sided<U> {
        Sided {
            left: f(self.left),
            right: f(self.right),
        }
    }

    pub fn as_ref(&self) -> Sided<&T> {
        Sided {
            left: &self.left,
            right: &self.right,
        }
    }
}

impl<T> Index<Side> for Sided<T> {
    type Output = T;

    fn index(&self, side: Side) -> &T {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

impl<T> IndexMut<Side> for Sided<T> {
    fn index_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}
