use nalgebra::{DMatrix, DVector};

use crate::config::SolverConfig;
use crate::errors::{NumericalError, SolveWarning};
use crate::math::{CScalar, Scalar};

use super::node::NodeId;

/// Dense admittance matrix used in nodal analysis.
pub type AdmittanceMatrix = DMatrix<CScalar>;
/// Complex current injection vector.
pub type CurrentVector = DVector<CScalar>;

/// Assembled nodal system `Y · x = I`.
///
/// The first `node_count` unknowns are node voltages; any remaining ones are branch
/// currents of constrained voltage sources.
#[derive(Debug, Clone)]
pub struct NodalAnalysis {
    /// System admittance matrix.
    pub admittance: AdmittanceMatrix,
    /// Net current injection vector.
    pub current: CurrentVector,
    /// Number of node-voltage unknowns.
    pub node_count: usize,
}

/// Solution of a [`NodalAnalysis`] system.
#[derive(Debug, Clone)]
pub struct NodalSolution {
    /// Node voltages, `node_count` entries.
    pub voltages: DVector<CScalar>,
    /// Branch currents of constrained sources, in stamping order.
    pub branch_currents: DVector<CScalar>,
    /// `log10 |det(Y)|`.
    pub determinant_log10: Scalar,
    /// Rough condition estimate from the LU pivot ratio (larger is worse).
    pub cond_estimate: Option<Scalar>,
}

impl NodalAnalysis {
    /// Total number of unknowns.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.admittance.nrows()
    }

    /// Solves the system using LU factorization.
    ///
    /// The determinant is accumulated as `Σ log10 |u_kk|` over the LU pivots, so large
    /// sentinel conductances cannot overflow it. A system whose `|det|` is at or below
    /// `config.singular_determinant`, or whose smallest pivot is at or below
    /// `config.min_pivot_ratio` times the largest, is rejected before back-substitution.
    pub fn solve(&self, config: &SolverConfig) -> Result<NodalSolution, NumericalError> {
        let lu = self.admittance.clone().lu();
        let u = lu.u();
        let dim = u.nrows().min(u.ncols());

        let mut determinant_log10: Scalar = 0.0;
        let mut max_d: Scalar = 0.0;
        let mut min_d = Scalar::INFINITY;
        for k in 0..dim {
            let d = u[(k, k)].norm();
            determinant_log10 += d.log10();
            max_d = max_d.max(d);
            min_d = min_d.min(d);
        }

        let negligible_pivot = dim > 0 && min_d <= config.min_pivot_ratio * max_d;
        if determinant_log10.is_nan()
            || determinant_log10 <= config.singular_determinant.log10()
            || negligible_pivot
        {
            return Err(NumericalError::SingularMatrix {
                determinant_log10,
                floating: Vec::new(),
            });
        }

        let x = lu.solve(&self.current).ok_or(NumericalError::SolveFailed)?;
        let n = self.node_count;
        let m = x.len() - n;
        let voltages = x.rows(0, n).into_owned();
        let branch_currents = if m > 0 { x.rows(n, m).into_owned() } else { DVector::zeros(0) };
        let cond_estimate = (min_d.is_finite() && min_d > 0.0).then(|| max_d / min_d);

        Ok(NodalSolution {
            voltages,
            branch_currents,
            determinant_log10,
            cond_estimate,
        })
    }
}

/// Diagnostics of a successful [`Circuit::solve`](super::Circuit::solve).
#[derive(Debug, Clone, PartialEq)]
pub struct SolveReport {
    /// Analysis frequency in hertz (0 for DC).
    pub frequency: Scalar,
    /// Node held at 0 V.
    pub reference: NodeId,
    /// Size of the solved system.
    pub unknowns: usize,
    /// `log10 |det(Y)|` of the solved system.
    pub determinant_log10: Scalar,
    /// Rough condition estimate from LU diagonal ratio (larger is worse).
    pub cond_estimate: Option<Scalar>,
    /// Non-fatal conditions encountered.
    pub warnings: Vec<SolveWarning>,
}
