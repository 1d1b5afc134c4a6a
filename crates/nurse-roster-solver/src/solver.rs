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

//! Entry point tying the algorithms together: pick one, hand it a
//! weekly problem, get a [`Schedule`] back.

use std::time::Duration;

use nurse_roster_model::prelude::*;

use crate::master::err::MasterError;
use crate::master::MasterProblem;
use crate::modeler::highs::HighsModeler;
use crate::pricer::EnumerationPricer;

/// Which algorithm answers a single-week solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// Constructive sweep only; fast and never calls the MILP backend.
    Greedy,
    /// Column generation over rotations, greedy warm start.
    Master,
}

/// Knobs shared by the single-week solvers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverParam {
    /// Wall-clock budget for one solve, pricing and MILP included.
    pub time_limit: Duration,
    pub max_pricing_iterations: usize,
    /// Scales the pro-rata soft bounds that spread total-shift and
    /// weekend consumption over the remaining weeks.
    pub weight_factor: f64,
}

impl Default for SolverParam {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(10),
            max_pricing_iterations: 25,
            weight_factor: 1.0,
        }
    }
}

impl SolverParam {
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }
}

#[derive(Debug)]
pub enum SolveError {
    Master(MasterError),
}

impl std::fmt::Display for SolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Master(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for SolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Master(err) => Some(err),
        }
    }
}

impl From<MasterError> for SolveError {
    fn from(err: MasterError) -> Self {
        Self::Master(err)
    }
}

/// Solve one week with the chosen algorithm. A fresh solver is built
/// per call, so repeated calls with perturbed demands are independent.
pub fn run_algorithm(
    algorithm: Algorithm,
    scenario: &Scenario,
    demand: &Demand,
    preferences: &Preferences,
    init_states: &[NurseState],
    param: SolverParam,
) -> Result<Schedule, SolveError> {
    match algorithm {
        Algorithm::Greedy => {
            let mut greedy = crate::greedy::Greedy::new(
                scenario.clone(),
                demand.clone(),
                preferences.clone(),
                init_states.to_vec(),
            );
            greedy.solve();
            Ok(greedy.schedule())
        }
        Algorithm::Master => {
            let mut master = MasterProblem::new(
                scenario.clone(),
                demand.clone(),
                preferences.clone(),
                init_states.to_vec(),
                HighsModeler::new(),
                EnumerationPricer::default(),
                param,
            )?;
            master.solve(None)?;
            Ok(master.schedule())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Scenario {
        ScenarioBuilder::new()
            .weeks(1, 0)
            .shift("Day", 1, 7)
            .skill("Nurse")
            .contract(Contract::new("full-time", 0, 7, 1, 7, 1, 4, false))
            .nurse("A", 0, [0])
            .nurse("B", 0, [0])
            .build()
            .unwrap()
    }

    fn demand() -> Demand {
        let mut d = Demand::zero(7, 2, 1);
        for day in 0..7 {
            d.set_min(day, 1, 0, 1);
            d.set_opt(day, 1, 0, 1);
        }
        d
    }

    #[test]
    fn test_greedy_and_master_agree_on_feasibility() {
        let s = scenario();
        let d = demand();
        let p = Preferences::none(2);
        let states = vec![NurseState::resting(3); 2];
        for algorithm in [Algorithm::Greedy, Algorithm::Master] {
            let schedule =
                run_algorithm(algorithm, &s, &d, &p, &states, SolverParam::default()).unwrap();
            assert!(schedule.status().has_solution(), "{algorithm:?}");
            assert_eq!(schedule.rosters().len(), 2);
        }
    }

    #[test]
    fn test_param_defaults() {
        let param = SolverParam::default();
        assert_eq!(param.time_limit, Duration::from_secs(10));
        assert_eq!(param.max_pricing_iterations, 25);
        assert_eq!(param.weight_factor, 1.0);
    }
}
