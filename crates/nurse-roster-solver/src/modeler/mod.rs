// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! A thin LP/MILP facade. The master problem talks to this trait only;
//! the shipped backend materializes the symbolic model into `good_lp`
//! with HiGHS on every solve call.

pub mod err;
pub mod highs;

use nurse_roster_model::prelude::{Cost, SolverStatus};
use std::time::Duration;

use crate::modeler::err::ModelerError;

/// Index of a variable in a [`Modeler`].
pub type VarId = usize;
/// Index of a constraint in a [`Modeler`].
pub type ConsId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Continuous,
    /// Integral in the MILP, relaxed to continuous in the LP.
    Integer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintSense {
    Leq,
    Eq,
    Geq,
}

/// LP relaxation result: primal values per variable and dual values
/// per constraint, in declaration order.
#[derive(Debug, Clone)]
pub struct LpSolution {
    pub status: SolverStatus,
    pub objective: Cost,
    pub values: Vec<Cost>,
    pub duals: Vec<Cost>,
}

impl LpSolution {
    pub fn infeasible() -> Self {
        Self {
            status: SolverStatus::Infeasible,
            objective: Cost::INFINITY,
            values: Vec::new(),
            duals: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MipSolution {
    pub status: SolverStatus,
    pub objective: Cost,
    pub values: Vec<Cost>,
}

impl MipSolution {
    pub fn infeasible() -> Self {
        Self {
            status: SolverStatus::Infeasible,
            objective: Cost::INFINITY,
            values: Vec::new(),
        }
    }
}

/// Backend-agnostic model building and solving. Infeasibility is a
/// status on the returned solution; `Err` is reserved for backend
/// failures.
pub trait Modeler {
    fn add_var(&mut self, name: String, kind: VarKind, lb: Cost, ub: Cost, objective: Cost)
        -> VarId;

    fn add_cons(&mut self, name: String, sense: ConstraintSense, rhs: Cost) -> ConsId;

    /// Set the coefficient of `var` in `cons`, replacing any previous
    /// coefficient of that variable in that row.
    fn set_coeff(&mut self, cons: ConsId, var: VarId, coeff: Cost);

    fn set_rhs(&mut self, cons: ConsId, rhs: Cost);

    fn set_var_bounds(&mut self, var: VarId, lb: Cost, ub: Cost);

    fn nb_vars(&self) -> usize;

    fn nb_cons(&self) -> usize;

    /// Drop all variables and constraints.
    fn reset(&mut self);

    /// Solve the LP relaxation (every variable continuous) and report
    /// primal and dual values.
    fn solve_lp(&mut self, time_limit: Option<Duration>) -> Result<LpSolution, ModelerError>;

    /// Solve the MILP with integrality enforced.
    fn solve_mip(&mut self, time_limit: Option<Duration>) -> Result<MipSolution, ModelerError>;
}
