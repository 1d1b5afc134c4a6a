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

//! Solvers for weekly nurse rostering.
//!
//! Three layers build on each other:
//!
//! - [`greedy`] constructs a roster by repeated cheapest-insertion of
//!   demanded shifts, useful on its own and as a warm start;
//! - [`master`] runs column generation over rotations, pricing new
//!   columns through a [`pricer::RotationPricer`] and solving the
//!   final integer program through a [`modeler::Modeler`] backend;
//! - [`stochastic`] wraps the master problem in a
//!   generation-evaluation loop that hedges against unknown future
//!   weeks.

pub mod greedy;
pub mod master;
pub mod modeler;
pub mod pricer;
pub mod report;
pub mod solver;
pub mod stochastic;

pub mod prelude {
    pub use crate::greedy::{Greedy, GreedyWeights};
    pub use crate::master::rotation::{DualCosts, Rotation, RotationId, RotationIdAllocator};
    pub use crate::master::MasterProblem;
    pub use crate::modeler::highs::HighsModeler;
    pub use crate::modeler::Modeler;
    pub use crate::pricer::{EnumerationPricer, RotationPricer};
    pub use crate::report::{NurseReport, RunReport, WeekReport};
    pub use crate::solver::{run_algorithm, Algorithm, SolveError, SolverParam};
    pub use crate::stochastic::demand_gen::{DemandGenerator, HistoryDemandGenerator};
    pub use crate::stochastic::{competition_ranks, StochasticOptions, StochasticSolver};
}
