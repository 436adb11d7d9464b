//! Error and warning types surfaced by [`Circuit::solve`](crate::circuits::Circuit::solve).

use thiserror::Error;

use crate::circuits::{ComponentId, NodeId};
use crate::math::Scalar;

/// Top-level error type for the crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CircuitError {
    /// The topology or parameters cannot be assembled into a system.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// The assembled system has no unique solution.
    #[error(transparent)]
    Numerical(#[from] NumericalError),
}

impl CircuitError {
    /// True for topology/parameter problems detected before assembly.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// True for failures of the linear solve itself.
    #[must_use]
    pub const fn is_numerical(&self) -> bool {
        matches!(self, Self::Numerical(_))
    }
}

/// Problems with the circuit description, detected before any matrix is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// Nodal analysis needs a reference node plus at least one unknown.
    #[error("at least two nodes are required, found {found}")]
    TooFewNodes {
        /// Number of registered nodes.
        found: usize,
    },
    /// A component is missing one or both endpoints.
    #[error("component `{name}` ({component}) is not connected to two nodes")]
    Unconnected {
        /// Offending component.
        component: ComponentId,
        /// Its name.
        name: String,
    },
    /// Both endpoints of a component are the same node.
    #[error("component `{name}` ({component}) has both terminals on node {node}")]
    DuplicateEndpoint {
        /// Offending component.
        component: ComponentId,
        /// Its name.
        name: String,
        /// The shared node.
        node: NodeId,
    },
    /// A handle does not belong to this circuit.
    #[error("node {node} is not part of this circuit")]
    UnknownNode {
        /// The foreign handle.
        node: NodeId,
    },
    /// A component handle does not belong to this circuit.
    #[error("component {component} is not part of this circuit")]
    UnknownComponent {
        /// The foreign handle.
        component: ComponentId,
    },
    /// Frequencies must be finite and non-negative.
    #[error("invalid frequency {frequency} Hz")]
    InvalidFrequency {
        /// The rejected value.
        frequency: Scalar,
    },
}

/// Failures of the linear solve.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumericalError {
    /// No unique solution: part of the network has no path to the reference, the
    /// determinant is at or below the configured threshold, or the smallest LU pivot
    /// is negligible next to the largest.
    #[error("admittance matrix is singular (log10|det| = {determinant_log10}, floating nodes: {floating:?})")]
    SingularMatrix {
        /// `log10 |det(Y)|`, `-inf` for an exactly zero pivot or a floating subnetwork.
        determinant_log10: Scalar,
        /// Nodes without a component path to the reference, in analysis order.
        floating: Vec<NodeId>,
    },
    /// The LU back-substitution produced no solution.
    #[error("linear solve failed")]
    SolveFailed,
    /// The solution contains NaN or infinite entries.
    #[error("solution is not finite at node {node}")]
    NonFiniteSolution {
        /// First node with a non-finite voltage.
        node: NodeId,
    },
}

/// Non-fatal conditions reported alongside a successful solve.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveWarning {
    /// More than one distinct AC source frequency; the first source in insertion order wins.
    #[error("sources at several frequencies ({others:?} Hz ignored), analysing at {used} Hz")]
    MixedFrequencies {
        /// Frequency used for the analysis.
        used: Scalar,
        /// The other distinct frequencies, in insertion order.
        others: Vec<Scalar>,
    },
    /// The LU pivot ratio exceeds [`SolverConfig::ill_conditioned`](crate::config::SolverConfig::ill_conditioned).
    #[error("ill-conditioned system (cond ≈ {cond_estimate:e}), results may be inaccurate")]
    IllConditioned {
        /// Largest over smallest LU pivot magnitude.
        cond_estimate: Scalar,
    },
}

/// Convenience alias for results returned by the solver.
pub type Result<T> = std::result::Result<T, CircuitError>;
