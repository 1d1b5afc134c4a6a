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

//! Solution-side entities: rosters, the counters carried across day
//! boundaries, and the schedule produced by a solver run.

pub mod live_nurse;
pub mod roster;
pub mod state;

use crate::common::Cost;
use crate::solution::roster::Roster;
use crate::solution::state::NurseState;
use serde::Serialize;

/// Termination status of a solver run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SolverStatus {
    Optimal,
    Feasible,
    Infeasible,
    TimeLimit,
}

impl SolverStatus {
    /// True when the run produced a usable schedule.
    #[inline]
    pub fn has_solution(self) -> bool {
        matches!(self, SolverStatus::Optimal | SolverStatus::Feasible)
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverStatus::Optimal => write!(f, "optimal"),
            SolverStatus::Feasible => write!(f, "feasible"),
            SolverStatus::Infeasible => write!(f, "infeasible"),
            SolverStatus::TimeLimit => write!(f, "time-limit"),
        }
    }
}

/// One roster per nurse over the planned horizon, together with the
/// states each nurse reaches at the end of it.
#[derive(Debug, Clone)]
pub struct Schedule {
    rosters: Vec<Roster>,
    final_states: Vec<NurseState>,
    cost: Cost,
    status: SolverStatus,
}

impl Schedule {
    pub fn new(
        rosters: Vec<Roster>,
        final_states: Vec<NurseState>,
        cost: Cost,
        status: SolverStatus,
    ) -> Self {
        debug_assert_eq!(rosters.len(), final_states.len());
        Self {
            rosters,
            final_states,
            cost,
            status,
        }
    }

    /// A schedule carrying no rosters, used for failed runs.
    pub fn infeasible() -> Self {
        Self {
            rosters: Vec::new(),
            final_states: Vec::new(),
            cost: Cost::INFINITY,
            status: SolverStatus::Infeasible,
        }
    }

    #[inline]
    pub fn rosters(&self) -> &[Roster] {
        &self.rosters
    }

    #[inline]
    pub fn roster(&self, nurse: usize) -> &Roster {
        &self.rosters[nurse]
    }

    #[inline]
    pub fn final_states(&self) -> &[NurseState] {
        &self.final_states
    }

    #[inline]
    pub fn cost(&self) -> Cost {
        self.cost
    }

    #[inline]
    pub fn status(&self) -> SolverStatus {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_has_solution() {
        assert!(SolverStatus::Optimal.has_solution());
        assert!(SolverStatus::Feasible.has_solution());
        assert!(!SolverStatus::Infeasible.has_solution());
        assert!(!SolverStatus::TimeLimit.has_solution());
    }

    #[test]
    fn test_infeasible_schedule_is_empty() {
        let s = Schedule::infeasible();
        assert!(s.rosters().is_empty());
        assert_eq!(s.status(), SolverStatus::Infeasible);
        assert!(s.cost().is_infinite());
    }
}
