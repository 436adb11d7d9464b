//! Lumped circuit model and the nodal solver.

/// Nodal system assembly results and the dense LU solve.
pub mod analysis;
/// Circuit arena and the `solve()` algorithm.
pub mod circuit;
/// Element impedance laws and the component wrapper.
pub mod component;
/// Node registry and arena handles.
pub mod node;
/// Nodal stamping helpers for DC/AC analysis.
pub mod stamp;

pub use analysis::{AdmittanceMatrix, CurrentVector, NodalAnalysis, NodalSolution, SolveReport};
pub use circuit::Circuit;
pub use component::{Capacitor, Component, Element, Impedance, Inductor, Resistor, VoltageSource};
pub use node::{ComponentId, Node, NodeId};
pub use stamp::{NodalBuilder, Slot};
