//! Convenience re-exports for building and solving circuits.

pub use crate::circuits::{
    analysis::{NodalAnalysis, SolveReport},
    circuit::Circuit,
    component::{Capacitor, Component, Element, Impedance, Inductor, Resistor, VoltageSource},
    node::{ComponentId, Node, NodeId},
    stamp::NodalBuilder,
};
pub use crate::config::{SolverConfig, SourceModel};
pub use crate::constants::*;
pub use crate::errors::{CircuitError, ConfigurationError, NumericalError, SolveWarning};
pub use crate::math::{phasor, phasor_deg, wrap_degrees, CScalar, Scalar};
pub use crate::sweep::{
    auto_frequency_range, frequency_response, frequency_response_across, linspace, logspace_hz,
    mag, mag_db, phase_deg, ResponsePoint,
};
