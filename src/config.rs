//! Solver configuration.

use crate::constants::{
    ILL_CONDITIONED, MAX_ADMITTANCE, MIN_PIVOT_RATIO, SINGULAR_DETERMINANT, ZERO_IMPEDANCE_EPSILON,
};
use crate::math::{CScalar, Scalar};

/// How voltage sources enter the nodal system.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceModel {
    /// Every source is a Norton companion: its internal conductance is stamped like any
    /// other branch and `Vs · Ys` is injected at its terminals. Ideal sources are clamped
    /// to [`SolverConfig::max_admittance`].
    Companion,
    /// Sources with a finite internal resistance use the companion model; ideal sources
    /// get a constraint row and a branch-current unknown.
    #[default]
    Constrained,
}

/// Tuning knobs for [`Circuit::solve`](crate::circuits::Circuit::solve).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Impedances with a magnitude below this are treated as ideal shorts.
    pub zero_impedance_epsilon: Scalar,
    /// Conductance substituted for a clamped branch.
    pub max_admittance: Scalar,
    /// `|det|` at or below this marks the system singular.
    pub singular_determinant: Scalar,
    /// `min |u_kk| / max |u_kk|` at or below this marks the system singular.
    pub min_pivot_ratio: Scalar,
    /// Condition estimate above which [`SolveWarning::IllConditioned`](crate::errors::SolveWarning::IllConditioned)
    /// is reported. Clamped branches and DC sentinels push this past `1e12` routinely.
    pub ill_conditioned: Scalar,
    /// Voltage-source formulation.
    pub source_model: SourceModel,
}

impl SolverConfig {
    /// Configuration using the companion model for every source.
    #[must_use]
    pub fn companion() -> Self {
        Self {
            source_model: SourceModel::Companion,
            ..Self::default()
        }
    }

    /// Returns `1/z`, or the sentinel conductance when `|z|` is below the epsilon.
    #[must_use]
    pub fn admittance(&self, z: CScalar) -> CScalar {
        if self.is_short(z) {
            CScalar::new(self.max_admittance, 0.0)
        } else {
            z.inv()
        }
    }

    /// True when `|z|` is small enough to count as an ideal short.
    #[must_use]
    pub fn is_short(&self, z: CScalar) -> bool {
        z.norm() < self.zero_impedance_epsilon
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            zero_impedance_epsilon: ZERO_IMPEDANCE_EPSILON,
            max_admittance: MAX_ADMITTANCE,
            singular_determinant: SINGULAR_DETERMINANT,
            min_pivot_ratio: MIN_PIVOT_RATIO,
            ill_conditioned: ILL_CONDITIONED,
            source_model: SourceModel::Constrained,
        }
    }
}
