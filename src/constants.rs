//! Numerical sentinels and conversions shared by the component model and the solver.
//!
//! The sentinels stand in for the ideal limits of reactive elements at DC: a capacitor is
//! an open circuit and an inductor a short. Substituting a finite magnitude keeps the
//! admittance matrix finite; the price is a relative error of order
//! `|Z_circuit| / OPEN_CIRCUIT_IMPEDANCE` in the solved voltages.

use std::f64::consts::PI;

use crate::math::Scalar;

/// Impedance magnitude (Ω) reported by a capacitor at DC.
pub const OPEN_CIRCUIT_IMPEDANCE: Scalar = 1.0e12;
/// Impedance magnitude (Ω) reported by an inductor at DC.
pub const SHORT_CIRCUIT_IMPEDANCE: Scalar = 1.0e-12;
/// Impedances with `|Z|` strictly below this are treated as ideal shorts.
pub const ZERO_IMPEDANCE_EPSILON: Scalar = 1.0e-12;
/// Conductance (S) substituted for `1/Z` when `|Z|` is below [`ZERO_IMPEDANCE_EPSILON`].
pub const MAX_ADMITTANCE: Scalar = 1.0e12;
/// `|det(Y)|` at or below this value marks the system as singular.
pub const SINGULAR_DETERMINANT: Scalar = 1.0e-300;
/// Smallest-to-largest LU pivot ratio at or below which the system counts as singular.
///
/// Sits below the `1/(MAX_ADMITTANCE · OPEN_CIRCUIT_IMPEDANCE)` spread that a DC
/// capacitor chain next to a clamped branch legitimately produces.
pub const MIN_PIVOT_RATIO: Scalar = 1.0e-30;
/// Condition estimate above which a solve carries an ill-conditioning warning.
pub const ILL_CONDITIONED: Scalar = 1.0e12;

/// Priority of a ground node; dominates any number of source attachments.
pub const GROUND_PRIORITY: u32 = u32::MAX;
/// Priority added to a node each time a voltage source is attached to it.
pub const SOURCE_PRIORITY_STEP: u32 = 1;

/// Returns the angular frequency corresponding to a linear frequency `hz`.
#[inline]
#[must_use]
pub fn angular_frequency(hz: Scalar) -> Scalar {
    2.0 * PI * hz
}

/// Corner frequency (Hz) of a first-order RC section.
#[inline]
#[must_use]
pub fn rc_corner_frequency(resistance: Scalar, capacitance: Scalar) -> Scalar {
    1.0 / (2.0 * PI * resistance * capacitance)
}

/// Resonant frequency (Hz) of an LC pair.
#[inline]
#[must_use]
pub fn lc_resonant_frequency(inductance: Scalar, capacitance: Scalar) -> Scalar {
    1.0 / (2.0 * PI * (inductance * capacitance).sqrt())
}
