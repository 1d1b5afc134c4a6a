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

//! Week-by-week solving under demand uncertainty. Each candidate
//! first-week schedule is produced against a sampled extension of the
//! real demand, then scored by how cheaply the following week can be
//! solved from the states it leaves behind.

pub mod demand_gen;

use std::time::{Duration, Instant};

use nurse_roster_model::prelude::*;

use crate::solver::{run_algorithm, Algorithm, SolverParam};
use crate::stochastic::demand_gen::DemandGenerator;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochasticOptions {
    /// Days of sampled demand appended after the real week.
    pub nb_extra_days: usize,
    /// Independent future demands every candidate is scored against.
    pub nb_evaluation_demands: usize,
    /// Horizon of each evaluation demand.
    pub evaluation_days: usize,
    pub max_candidates: usize,
    /// Wall-clock budget for the whole solve.
    pub time_limit: Duration,
    /// Budget for one candidate-generating solve.
    pub generation_time_limit: Duration,
    /// Budget for one evaluation solve.
    pub evaluation_time_limit: Duration,
    /// When false, skip evaluation and rely on the pro-rata penalties
    /// of a single weighted solve.
    pub with_evaluation: bool,
    pub weight_factor: f64,
    /// Algorithm used for candidate-generating solves.
    pub generation_algorithm: Algorithm,
    /// Algorithm used for next-week evaluation solves.
    pub evaluation_algorithm: Algorithm,
}

impl Default for StochasticOptions {
    fn default() -> Self {
        Self {
            nb_extra_days: 7,
            nb_evaluation_demands: 2,
            evaluation_days: 14,
            max_candidates: 100,
            time_limit: Duration::from_secs(60),
            generation_time_limit: Duration::from_secs(10),
            evaluation_time_limit: Duration::from_secs(5),
            with_evaluation: true,
            weight_factor: 1.0,
            generation_algorithm: Algorithm::Master,
            evaluation_algorithm: Algorithm::Master,
        }
    }
}

/// One generated first-week schedule together with its scores.
struct Candidate {
    schedule: Schedule,
    /// Next-week solve cost per evaluation demand, `None` on failure.
    evaluation_costs: Vec<Option<i64>>,
}

pub struct StochasticSolver<G: DemandGenerator> {
    scenario: Scenario,
    demand: Demand,
    preferences: Preferences,
    init_states: Vec<NurseState>,
    generator: G,
    options: StochasticOptions,
}

impl<G: DemandGenerator> StochasticSolver<G> {
    pub fn new(
        scenario: Scenario,
        demand: Demand,
        preferences: Preferences,
        init_states: Vec<NurseState>,
        generator: G,
        options: StochasticOptions,
    ) -> Self {
        Self {
            scenario,
            demand,
            preferences,
            init_states,
            generator,
            options,
        }
    }

    /// Solve the current week. Never fails: solver errors are logged
    /// and the result degrades to an infeasible schedule.
    pub fn solve(&mut self) -> Schedule {
        if self.scenario.is_last_week() {
            return self.solve_terminal_week();
        }
        if !self.options.with_evaluation {
            return self.solve_penalty_only();
        }
        self.solve_with_evaluation()
    }

    /// Last week of the horizon: nothing follows, so the real demand
    /// is solved as-is.
    fn solve_terminal_week(&mut self) -> Schedule {
        tracing::info!("terminal week, solving deterministically");
        let param = SolverParam::default()
            .with_time_limit(self.options.generation_time_limit);
        match run_algorithm(
            self.options.generation_algorithm,
            &self.scenario,
            &self.demand,
            &self.preferences,
            &self.init_states,
            param,
        ) {
            Ok(schedule) => schedule,
            Err(error) => {
                tracing::error!(%error, "terminal week solve failed");
                Schedule::infeasible()
            }
        }
    }

    /// One solve of the real week demand; the weighted pro-rata slack
    /// penalties stand in for explicit lookahead.
    fn solve_penalty_only(&mut self) -> Schedule {
        tracing::info!("penalty-only solve of the week demand");
        let mut param = SolverParam::default().with_time_limit(self.options.time_limit);
        param.weight_factor = self.options.weight_factor;
        match run_algorithm(
            self.options.generation_algorithm,
            &self.scenario,
            &self.demand,
            &self.preferences,
            &self.init_states,
            param,
        ) {
            Ok(schedule) => schedule,
            Err(error) => {
                tracing::error!(%error, "penalty-only solve failed");
                Schedule::infeasible()
            }
        }
    }

    /// Generate candidate schedules against sampled demand extensions
    /// and keep the one that leaves the cheapest next week behind.
    fn solve_with_evaluation(&mut self) -> Schedule {
        let started = Instant::now();
        let nb_days = self.demand.nb_days();
        // Sampled only once the first candidate is in, so a week with
        // no feasible candidates never draws them.
        let mut evaluation_demands: Vec<Demand> = Vec::new();

        let mut candidates: Vec<Candidate> = Vec::new();
        let mut best: Option<usize> = None;
        for attempt in 0..self.options.max_candidates {
            if started.elapsed() >= self.options.time_limit {
                break;
            }
            let Some(extended) = self.extended_demand() else {
                break;
            };
            let param = SolverParam::default()
                .with_time_limit(self.options.generation_time_limit);
            let extended_schedule = match run_algorithm(
                self.options.generation_algorithm,
                &self.scenario,
                &extended,
                &self.preferences,
                &self.init_states,
                param,
            ) {
                Ok(schedule) if schedule.status().has_solution() => schedule,
                Ok(_) => {
                    tracing::debug!(attempt, "sampled extension is infeasible, skipping");
                    continue;
                }
                Err(error) => {
                    tracing::warn!(attempt, %error, "candidate solve failed, skipping");
                    continue;
                }
            };
            let schedule = self.truncate(&extended_schedule, nb_days);
            if candidates
                .iter()
                .any(|c| c.schedule.rosters() == schedule.rosters())
            {
                continue;
            }
            if evaluation_demands.is_empty() {
                evaluation_demands = self
                    .generator
                    .generate_many(self.options.nb_evaluation_demands, self.options.evaluation_days);
            }
            let evaluation_costs = evaluation_demands
                .iter()
                .map(|demand| self.evaluate(schedule.final_states(), demand))
                .collect();
            candidates.push(Candidate {
                schedule,
                evaluation_costs,
            });
            let new_best = best_candidate(&candidates);
            tracing::debug!(
                attempt,
                candidates = candidates.len(),
                best = ?new_best,
                "candidate accepted"
            );
            // The incumbent survived another challenger: converged.
            if new_best == best && candidates.len() > 1 {
                break;
            }
            best = new_best;
        }

        match best_candidate(&candidates) {
            Some(index) => {
                tracing::info!(
                    candidates = candidates.len(),
                    chosen = index,
                    "stochastic solve finished"
                );
                candidates.swap_remove(index).schedule
            }
            None => {
                tracing::warn!("no feasible candidate generated");
                Schedule::infeasible()
            }
        }
    }

    /// Real demand followed by `nb_extra_days` of sampled demand.
    fn extended_demand(&mut self) -> Option<Demand> {
        let mut extended = self.demand.clone();
        let extra = self.generator.generate(self.options.nb_extra_days);
        match extended.append(&extra) {
            Ok(()) => Some(extended),
            Err(error) => {
                tracing::error!(%error, "demand generator shape mismatch");
                None
            }
        }
    }

    /// Cost of solving the following week from `states` against a
    /// hypothetical demand.
    fn evaluate(&self, states: &[NurseState], demand: &Demand) -> Option<i64> {
        let next_week = self.scenario.with_week(self.scenario.this_week() + 1);
        let preferences = Preferences::none(states.len());
        let param = SolverParam::default()
            .with_time_limit(self.options.evaluation_time_limit);
        match run_algorithm(
            self.options.evaluation_algorithm,
            &next_week,
            demand,
            &preferences,
            states,
            param,
        ) {
            Ok(schedule) if schedule.status().has_solution() => {
                Some(schedule.cost() as i64)
            }
            Ok(_) => None,
            Err(error) => {
                tracing::warn!(%error, "evaluation solve failed");
                None
            }
        }
    }

    /// First `nb_days` days of an extended schedule, with final states
    /// replayed from the initial states over the kept days.
    fn truncate(&self, schedule: &Schedule, nb_days: usize) -> Schedule {
        let rosters: Vec<Roster> = schedule
            .rosters()
            .iter()
            .map(|r| r.truncated(nb_days))
            .collect();
        let final_states = states_after(&self.init_states, &rosters);
        Schedule::new(rosters, final_states, schedule.cost(), schedule.status())
    }
}

/// States after replaying `rosters` day by day from `init_states`.
fn states_after(init_states: &[NurseState], rosters: &[Roster]) -> Vec<NurseState> {
    init_states
        .iter()
        .zip(rosters)
        .map(|(init, roster)| {
            let mut state = *init;
            for day in 0..roster.nb_days() {
                state.update(day, roster.day(day).shift());
            }
            state
        })
        .collect()
}

/// Competition ranks, ties sharing the mean of the positions they
/// occupy: scores {5, 5, 5, 8} rank as {2, 2, 2, 4} and {4, 4, 9} as
/// {1.5, 1.5, 3}.
pub fn competition_ranks(scores: &[i64]) -> Vec<f64> {
    scores
        .iter()
        .map(|&score| {
            let better = scores.iter().filter(|&&s| s < score).count();
            let ties = scores.iter().filter(|&&s| s == score).count();
            better as f64 + (ties as f64 + 1.0) / 2.0
        })
        .collect()
}

/// Index of the candidate with the lowest total rank across the
/// evaluation demands. Candidates whose evaluation failed rank last
/// for that demand; ties go to the first generated.
fn best_candidate(candidates: &[Candidate]) -> Option<usize> {
    if candidates.is_empty() {
        return None;
    }
    let mut totals = vec![0f64; candidates.len()];
    let nb_evaluations = candidates[0].evaluation_costs.len();
    for e in 0..nb_evaluations {
        let scores: Vec<i64> = candidates
            .iter()
            .map(|c| c.evaluation_costs[e].unwrap_or(i64::MAX))
            .collect();
        for (total, rank) in totals.iter_mut().zip(competition_ranks(&scores)) {
            *total += rank;
        }
    }
    let mut best = 0;
    for (index, &total) in totals.iter().enumerate().skip(1) {
        if total < totals[best] {
            best = index;
        }
    }
    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stochastic::demand_gen::HistoryDemandGenerator;

    #[test]
    fn test_competition_ranks_share_tied_positions() {
        assert_eq!(competition_ranks(&[5, 5, 5, 8]), vec![2.0, 2.0, 2.0, 4.0]);
    }

    #[test]
    fn test_competition_ranks_distinct_scores() {
        assert_eq!(competition_ranks(&[30, 10, 20]), vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_competition_ranks_even_tie_blocks_average() {
        assert_eq!(competition_ranks(&[4, 4]), vec![1.5, 1.5]);
        assert_eq!(competition_ranks(&[4, 4, 9]), vec![1.5, 1.5, 3.0]);
    }

    #[test]
    fn test_competition_ranks_all_tied() {
        assert_eq!(competition_ranks(&[4, 4, 4]), vec![2.0, 2.0, 2.0]);
    }

    fn candidate(evaluations: Vec<Option<i64>>) -> Candidate {
        Candidate {
            schedule: Schedule::infeasible(),
            evaluation_costs: evaluations,
        }
    }

    #[test]
    fn test_best_candidate_ranks_evaluations_only() {
        // Only the ordering per evaluation demand counts, not the cost
        // magnitudes: one win each totals to a tie.
        let candidates = vec![
            candidate(vec![Some(6), Some(100)]),
            candidate(vec![Some(5), Some(101)]),
        ];
        assert_eq!(best_candidate(&candidates), Some(0));
        let candidates = vec![candidate(vec![Some(6)]), candidate(vec![Some(5)])];
        assert_eq!(best_candidate(&candidates), Some(1));
    }

    #[test]
    fn test_best_candidate_prefers_cheap_evaluations() {
        let candidates = vec![
            candidate(vec![Some(100), Some(100)]),
            candidate(vec![Some(5), Some(5)]),
        ];
        assert_eq!(best_candidate(&candidates), Some(1));
    }

    #[test]
    fn test_best_candidate_failed_evaluation_ranks_last() {
        let candidates = vec![candidate(vec![None]), candidate(vec![Some(50)])];
        assert_eq!(best_candidate(&candidates), Some(1));
    }

    #[test]
    fn test_best_candidate_tie_goes_to_first() {
        let candidates = vec![candidate(vec![Some(5)]), candidate(vec![Some(5)])];
        assert_eq!(best_candidate(&candidates), Some(0));
    }

    #[test]
    fn test_states_after_replays_roster() {
        let init = vec![NurseState::resting(2)];
        let mut roster = Roster::rest(3);
        roster.set_day(0, Assignment::Work { shift: 1, skill: 0 });
        roster.set_day(1, Assignment::Work { shift: 1, skill: 0 });
        let states = states_after(&init, &[roster]);
        assert_eq!(states[0].total_shifts, 2);
        assert_eq!(states[0].cons_days_off, 1);
        assert_eq!(states[0].shift, REST_SHIFT);
    }

    fn scenario(nb_weeks: usize, this_week: usize) -> Scenario {
        ScenarioBuilder::new()
            .weeks(nb_weeks, this_week)
            .shift("Day", 1, 7)
            .skill("Nurse")
            .contract(Contract::new("full-time", 0, 28, 1, 7, 1, 8, false))
            .nurse("A", 0, [0])
            .nurse("B", 0, [0])
            .build()
            .unwrap()
    }

    fn week_demand(min: u32) -> Demand {
        let mut d = Demand::zero(7, 2, 1);
        for day in 0..7 {
            d.set_min(day, 1, 0, min);
            d.set_opt(day, 1, 0, min);
        }
        d
    }

    fn options() -> StochasticOptions {
        StochasticOptions {
            nb_extra_days: 7,
            nb_evaluation_demands: 1,
            evaluation_days: 7,
            max_candidates: 2,
            time_limit: Duration::from_secs(30),
            generation_time_limit: Duration::from_secs(5),
            evaluation_time_limit: Duration::from_secs(5),
            with_evaluation: true,
            weight_factor: 1.0,
            generation_algorithm: Algorithm::Master,
            evaluation_algorithm: Algorithm::Master,
        }
    }

    /// Delegates to a [`HistoryDemandGenerator`] and counts the
    /// demands drawn from it.
    struct CountingGenerator {
        inner: HistoryDemandGenerator,
        calls: std::rc::Rc<std::cell::Cell<usize>>,
    }

    impl CountingGenerator {
        fn new(history: Vec<Demand>, seed: u64) -> Self {
            Self {
                inner: HistoryDemandGenerator::new(history, seed),
                calls: std::rc::Rc::new(std::cell::Cell::new(0)),
            }
        }
    }

    impl DemandGenerator for CountingGenerator {
        fn generate(&mut self, nb_days: usize) -> Demand {
            self.calls.set(self.calls.get() + 1);
            self.inner.generate(nb_days)
        }
    }

    #[test]
    fn test_terminal_week_solves_real_demand() {
        let generator = HistoryDemandGenerator::new(vec![week_demand(1)], 1);
        let mut solver = StochasticSolver::new(
            scenario(4, 3),
            week_demand(1),
            Preferences::none(2),
            vec![NurseState::resting(3); 2],
            generator,
            options(),
        );
        let schedule = solver.solve();
        assert!(schedule.status().has_solution());
        assert_eq!(schedule.rosters()[0].nb_days(), 7);
    }

    #[test]
    fn test_penalty_only_solves_week_demand_without_sampling() {
        let generator = CountingGenerator::new(vec![week_demand(1)], 2);
        let calls = generator.calls.clone();
        let mut opts = options();
        opts.with_evaluation = false;
        let mut solver = StochasticSolver::new(
            scenario(4, 0),
            week_demand(1),
            Preferences::none(2),
            vec![NurseState::resting(3); 2],
            generator,
            opts,
        );
        let schedule = solver.solve();
        assert!(schedule.status().has_solution());
        assert_eq!(schedule.rosters()[0].nb_days(), 7);
        assert_eq!(schedule.final_states().len(), 2);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_evaluation_loop_returns_week_schedule() {
        let generator = HistoryDemandGenerator::new(vec![week_demand(1)], 3);
        let mut solver = StochasticSolver::new(
            scenario(4, 0),
            week_demand(1),
            Preferences::none(2),
            vec![NurseState::resting(3); 2],
            generator,
            options(),
        );
        let schedule = solver.solve();
        assert!(schedule.status().has_solution());
        assert_eq!(schedule.rosters()[0].nb_days(), 7);
        for roster in schedule.rosters() {
            assert_eq!(roster.nb_days(), 7);
        }
    }

    #[test]
    fn test_configured_algorithms_drive_all_solves() {
        let generator = HistoryDemandGenerator::new(vec![week_demand(1)], 5);
        let mut opts = options();
        opts.generation_algorithm = Algorithm::Greedy;
        opts.evaluation_algorithm = Algorithm::Greedy;
        let mut solver = StochasticSolver::new(
            scenario(4, 0),
            week_demand(1),
            Preferences::none(2),
            vec![NurseState::resting(3); 2],
            generator,
            opts,
        );
        let schedule = solver.solve();
        assert!(schedule.status().has_solution());
        assert_eq!(schedule.rosters()[0].nb_days(), 7);
    }

    #[test]
    fn test_evaluation_demands_not_drawn_without_a_candidate() {
        // Two nurses can never cover a minimum of five, so every
        // candidate solve fails and only the per-attempt horizon
        // extensions are sampled.
        let generator = CountingGenerator::new(vec![week_demand(1)], 9);
        let calls = generator.calls.clone();
        let mut opts = options();
        opts.generation_algorithm = Algorithm::Greedy;
        opts.evaluation_algorithm = Algorithm::Greedy;
        let mut solver = StochasticSolver::new(
            scenario(4, 0),
            week_demand(5),
            Preferences::none(2),
            vec![NurseState::resting(3); 2],
            generator,
            opts,
        );
        let schedule = solver.solve();
        assert!(!schedule.status().has_solution());
        assert_eq!(calls.get(), opts.max_candidates);
    }
}
