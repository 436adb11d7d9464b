//! Shared numerical primitives.

use num_complex::Complex;

/// Primary scalar type used across the crate.
pub type Scalar = f64;
/// Primary complex scalar type used for phasors.
pub type CScalar = Complex<Scalar>;

/// Complex zero.
pub const ZERO: CScalar = Complex::new(0.0, 0.0);

/// Returns the phasor `magnitude · e^(j·phase)` with `phase` in radians.
#[must_use]
pub fn phasor(magnitude: Scalar, phase: Scalar) -> CScalar {
    Complex::from_polar(magnitude, phase)
}

/// Returns the phasor `magnitude · e^(j·phase)` with `phase` in degrees.
#[must_use]
pub fn phasor_deg(magnitude: Scalar, phase_deg: Scalar) -> CScalar {
    phasor(magnitude, phase_deg.to_radians())
}

/// Wraps an angle in degrees into `[-180, 180)`.
#[must_use]
pub fn wrap_degrees(angle: Scalar) -> Scalar {
    (angle + 180.0).rem_euclid(360.0) - 180.0
}
