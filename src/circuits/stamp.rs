//! Nodal stamping helpers for DC/AC analysis (dense).

use nalgebra::{DMatrix, DVector};
use num_complex::Complex;

use crate::math::CScalar;

use super::analysis::NodalAnalysis;

/// Row/column of a node in the system. The reference node is represented by `None`.
pub type Slot = Option<usize>;

/// Builder for nodal analysis systems using element stamping.
///
/// The system has `node_count` voltage unknowns followed by one branch-current unknown
/// per constraint (ideal voltage source).
#[derive(Debug, Clone)]
pub struct NodalBuilder {
    n: usize,
    y: DMatrix<CScalar>,
    i: DVector<CScalar>,
    m: usize,
    capacity: usize,
}

impl NodalBuilder {
    /// Creates a stamping context with `node_count` non-reference nodes and room for
    /// `constraint_count` voltage constraints.
    #[must_use]
    pub fn new(node_count: usize, constraint_count: usize) -> Self {
        let size = node_count + constraint_count;
        Self {
            n: node_count,
            y: DMatrix::zeros(size, size),
            i: DVector::zeros(size),
            m: 0,
            capacity: constraint_count,
        }
    }

    /// Stamps an admittance `y` between nodes `a` and `b`.
    pub fn stamp_admittance(&mut self, a: Slot, b: Slot, y: CScalar) {
        match (a, b) {
            (Some(i), Some(j)) => {
                self.y[(i, i)] += y;
                self.y[(j, j)] += y;
                self.y[(i, j)] -= y;
                self.y[(j, i)] -= y;
            }
            (Some(i), None) => {
                self.y[(i, i)] += y;
            }
            (None, Some(j)) => {
                self.y[(j, j)] += y;
            }
            (None, None) => {}
        }
    }

    /// Stamps a current source `i` flowing through the source from `neg` to `pos`,
    /// i.e. injected into the network at `pos`.
    pub fn stamp_current_source(&mut self, pos: Slot, neg: Slot, i: CScalar) {
        if let Some(p) = pos {
            self.i[p] += i;
        }
        if let Some(n) = neg {
            self.i[n] -= i;
        }
    }

    /// Enforces `V(pos) - V(neg) = v` with a new branch-current unknown.
    /// Returns the index of the branch current within [`Self::constraint_count`].
    ///
    /// # Panics
    ///
    /// Panics when more constraints are stamped than the builder was sized for.
    pub fn stamp_voltage_constraint(&mut self, pos: Slot, neg: Slot, v: CScalar) -> usize {
        assert!(self.m < self.capacity, "constraint capacity exceeded");
        let k = self.m;
        self.m += 1;
        let row = self.n + k;
        let one = Complex::new(1.0, 0.0);

        if let Some(p) = pos {
            self.y[(p, row)] += one;
            self.y[(row, p)] += one;
        }
        if let Some(n) = neg {
            self.y[(n, row)] -= one;
            self.y[(row, n)] -= one;
        }
        self.i[row] += v;
        k
    }

    /// Number of node-voltage unknowns.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.n
    }

    /// Number of constraints stamped so far.
    #[must_use]
    pub const fn constraint_count(&self) -> usize {
        self.m
    }

    /// Finalizes the builder into a `NodalAnalysis` system.
    ///
    /// Unused constraint capacity is trimmed so the system stays square and non-singular.
    #[must_use]
    pub fn build(self) -> NodalAnalysis {
        let size = self.n + self.m;
        let (y, i) = if self.m == self.capacity {
            (self.y, self.i)
        } else {
            (
                self.y.view((0, 0), (size, size)).into_owned(),
                self.i.rows(0, size).into_owned(),
            )
        };
        NodalAnalysis {
            admittance: y,
            current: i,
            node_count: self.n,
        }
    }
}
