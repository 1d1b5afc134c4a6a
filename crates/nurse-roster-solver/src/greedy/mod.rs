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

//! Constructive heuristic: one chronological sweep over days, shifts
//! and positions, assigning the cheapest feasible nurses until minimum
//! (then optimal) demand is met. No LP solve anywhere.

pub mod gapfill;

use nurse_roster_model::prelude::*;
use std::cmp::Ordering;

use crate::greedy::gapfill::{fill_gap, transition_cost};
use crate::master::rotation::{rotations_from_roster, RotationIdAllocator};

/// Selection weights of the marginal assignment cost.
#[derive(Debug, Clone, Copy)]
pub struct GreedyWeights {
    /// Penalty per next-day shift the assignment would make infeasible.
    pub nb_forbidden: Cost,
    /// Penalty per rank of the nurse's position, keeping versatile
    /// nurses free for harder slots.
    pub rank: Cost,
    /// Penalty for drawing from a position whose supply no longer
    /// exceeds its remaining minimum demand.
    pub cover_min: Cost,
}

impl Default for GreedyWeights {
    fn default() -> Self {
        Self {
            nb_forbidden: 30.0,
            rank: 10.0,
            cover_min: 60.0,
        }
    }
}

pub struct Greedy {
    scenario: Scenario,
    demand: Demand,
    preferences: Preferences,
    nurses: Vec<LiveNurse>,
    weights: GreedyWeights,
    position_order: Vec<usize>,
    /// Per (day, shift, skill) count of nurses assigned by the sweep.
    assigned: Vec<Vec<Vec<u32>>>,
    /// Nurses still unassigned on the day under construction.
    available: Vec<bool>,
    /// Per (shift, position) excess of feasible supply over remaining
    /// minimum demand for the day under construction.
    shift_demand: Vec<Vec<i64>>,
    last_assigned: Vec<Option<DayIndex>>,
    covered: bool,
    cost: Cost,
    status: SolverStatus,
}

impl Greedy {
    pub fn new(
        scenario: Scenario,
        demand: Demand,
        preferences: Preferences,
        init_states: Vec<NurseState>,
    ) -> Self {
        debug_assert_eq!(demand.nb_shifts(), scenario.nb_shifts());
        debug_assert_eq!(demand.nb_skills(), scenario.nb_skills());
        let nurses = live_nurses_from(&scenario, &init_states, demand.nb_days());
        let nb_nurses = nurses.len();
        Self {
            scenario,
            demand,
            preferences,
            nurses,
            weights: GreedyWeights::default(),
            position_order: Vec::new(),
            assigned: Vec::new(),
            available: Vec::new(),
            shift_demand: Vec::new(),
            last_assigned: vec![None; nb_nurses],
            covered: false,
            cost: Cost::INFINITY,
            status: SolverStatus::Infeasible,
        }
    }

    pub fn with_weights(mut self, weights: GreedyWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Run the constructive sweep. Failure to cover minimum demand is
    /// reported as an infeasible status; the best-effort roster is
    /// still available for inspection and evaluation.
    pub fn solve(&mut self) -> SolverStatus {
        self.covered = self.constructive_greedy();
        self.cost = self.compute_total_cost();
        self.status = if self.covered {
            SolverStatus::Feasible
        } else {
            SolverStatus::Infeasible
        };
        tracing::debug!(
            covered = self.covered,
            cost = self.cost,
            "greedy sweep finished"
        );
        self.status
    }

    #[inline]
    pub fn status(&self) -> SolverStatus {
        self.status
    }

    #[inline]
    pub fn nurses(&self) -> &[LiveNurse] {
        &self.nurses
    }

    pub fn rosters(&self) -> Vec<Roster> {
        self.nurses.iter().map(|n| n.roster().clone()).collect()
    }

    pub fn schedule(&self) -> Schedule {
        Schedule::new(
            self.rosters(),
            self.nurses.iter().map(|n| *n.final_state()).collect(),
            self.cost,
            self.status,
        )
    }

    /// Positions in assignment order: scarcest supply per skill first,
    /// then higher rank first.
    fn sort_positions(&self) -> Vec<usize> {
        let supply = |p: usize| -> f64 {
            let nurses = self.nurses.iter().filter(|n| n.position_index() == p).count();
            let skills = self.scenario.position(p).skills().len().max(1);
            nurses as f64 / skills as f64
        };
        let mut order: Vec<usize> = (0..self.scenario.nb_positions()).collect();
        order.sort_by(|&a, &b| {
            supply(a)
                .partial_cmp(&supply(b))
                .unwrap_or(Ordering::Equal)
                .then(
                    self.scenario
                        .position(b)
                        .rank()
                        .cmp(&self.scenario.position(a).rank()),
                )
                .then(a.cmp(&b))
        });
        order
    }

    fn constructive_greedy(&mut self) -> bool {
        let nb_days = self.demand.nb_days();
        let nb_shifts = self.scenario.nb_shifts();
        let nb_skills = self.scenario.nb_skills();
        self.position_order = self.sort_positions();
        self.assigned = vec![vec![vec![0; nb_skills]; nb_shifts]; nb_days];

        for day in 0..nb_days {
            self.available = vec![true; self.nurses.len()];
            self.compute_shift_demand(day);
            // Two sweeps: hard minimum first, then optimal coverage
            // with whatever spare supply remains.
            for optimal_pass in [false, true] {
                for shift in 1..nb_shifts {
                    for position_slot in 0..self.position_order.len() {
                        let position = self.position_order[position_slot];
                        // Serve the skills fewest positions can cover
                        // first, so versatile nurses are not spent on
                        // widely-covered skills.
                        let mut skills: Vec<SkillIndex> = self
                            .scenario
                            .position(position)
                            .skills()
                            .iter()
                            .copied()
                            .collect();
                        skills.sort_by_key(|&sk| (self.positions_covering(sk), sk));
                        for skill in skills {
                            let target = if optimal_pass {
                                self.demand.opt(day, shift, skill)
                            } else {
                                self.demand.min(day, shift, skill)
                            };
                            while self.assigned[day][shift][skill] < target {
                                if optimal_pass && self.shift_demand[shift][position] <= 0 {
                                    break;
                                }
                                let Some(nurse) = self.best_nurse_for(day, shift, position) else {
                                    break;
                                };
                                self.assign_task_to_nurse(nurse, day, shift, skill);
                                self.available[nurse] = false;
                                self.assigned[day][shift][skill] += 1;
                                self.shift_demand[shift][position] -= 1;
                            }
                        }
                    }
                }
            }
        }
        self.check_min_coverage()
    }

    fn positions_covering(&self, skill: SkillIndex) -> usize {
        self.scenario
            .positions()
            .iter()
            .filter(|p| p.covers_skill(skill))
            .count()
    }

    /// Excess of feasible supply over remaining minimum demand, per
    /// (shift, position), for one day.
    fn compute_shift_demand(&mut self, day: DayIndex) {
        let nb_shifts = self.scenario.nb_shifts();
        let nb_positions = self.scenario.nb_positions();
        let mut table = vec![vec![0i64; nb_positions]; nb_shifts];
        for (shift, row) in table.iter_mut().enumerate().skip(1) {
            for (position, cell) in row.iter_mut().enumerate() {
                let supply = self
                    .nurses
                    .iter()
                    .filter(|n| {
                        n.position_index() == position
                            && self.is_feasible_task(n, n.state_at(day), day, shift)
                    })
                    .count() as i64;
                let need: i64 = self
                    .scenario
                    .position(position)
                    .skills()
                    .iter()
                    .map(|&sk| i64::from(self.demand.min(day, shift, sk)))
                    .sum();
                *cell = supply - need;
            }
        }
        self.shift_demand = table;
    }

    /// True iff the assignment keeps the nurse inside the hard bounds
    /// of her contract and shift type.
    fn is_feasible_task(
        &self,
        nurse: &LiveNurse,
        state: &NurseState,
        day: DayIndex,
        shift: ShiftIndex,
    ) -> bool {
        let contract = nurse.contract();
        if state.shift == shift && state.cons_shifts + 1 > self.scenario.max_cons_shifts(shift) {
            return false;
        }
        if state.is_working() && state.cons_days_worked + 1 > contract.max_cons_days_work {
            return false;
        }
        if state.total_shifts + 1 > contract.max_total_shifts {
            return false;
        }
        if is_weekend(day) {
            // The weekend is new unless its Saturday was worked.
            let already_counted = is_sunday(day) && state.is_working();
            if !already_counted && state.total_weekends + 1 > contract.max_worked_weekends {
                return false;
            }
        }
        true
    }

    /// Marginal cost of giving `nurse` this task, given her simulated
    /// state entering the day.
    fn cost_task(
        &self,
        nurse: &LiveNurse,
        state: &NurseState,
        day: DayIndex,
        shift: ShiftIndex,
        excess: i64,
    ) -> Cost {
        let contract = nurse.contract();
        let mut cost = transition_cost(&self.scenario, contract, state, shift);
        if self.preferences.wants_shift_off(nurse.index(), day, shift) {
            cost += WEIGHT_PREFERENCES;
        }
        if contract.complete_weekends && is_sunday(day) && !state.is_working() {
            cost += WEIGHT_COMPLETE_WEEKEND;
        }
        // Risk of painting the nurse into a corner tomorrow.
        let mut reached = *state;
        reached.update(day, shift);
        let nb_worked_shifts = self.scenario.nb_shifts() - 1;
        let forbidden = (1..self.scenario.nb_shifts())
            .filter(|&next| {
                day + 1 < self.demand.nb_days()
                    && !self.is_feasible_task(nurse, &reached, day + 1, next)
            })
            .count();
        cost += self.weights.nb_forbidden * forbidden as Cost / nb_worked_shifts.max(1) as Cost;
        cost += self.weights.rank * self.scenario.position(nurse.position_index()).rank() as Cost;
        if excess <= 0 {
            cost += self.weights.cover_min;
        }
        cost
    }

    /// Flexibility order used to break cost ties: more remaining
    /// contract allowance first, lower rank first, fewer assignments
    /// first, then stable by index.
    fn compare_nurses(&self, a: usize, b: usize) -> Ordering {
        let remaining = |i: usize| -> usize {
            let n = &self.nurses[i];
            n.contract()
                .max_total_shifts
                .saturating_sub(n.final_state().total_shifts)
        };
        remaining(b)
            .cmp(&remaining(a))
            .then_with(|| {
                self.scenario
                    .position(self.nurses[a].position_index())
                    .rank()
                    .cmp(&self.scenario.position(self.nurses[b].position_index()).rank())
            })
            .then_with(|| {
                self.nurses[a]
                    .roster()
                    .nb_worked()
                    .cmp(&self.nurses[b].roster().nb_worked())
            })
            .then(a.cmp(&b))
    }

    fn best_nurse_for(&self, day: DayIndex, shift: ShiftIndex, position: usize) -> Option<usize> {
        let excess = self.shift_demand[shift][position];
        let mut best: Option<(Cost, usize)> = None;
        for (index, nurse) in self.nurses.iter().enumerate() {
            if !self.available[index] || nurse.position_index() != position {
                continue;
            }
            let state = nurse.state_at(day);
            if !self.is_feasible_task(nurse, state, day, shift) {
                continue;
            }
            let cost = self.cost_task(nurse, state, day, shift, excess);
            let better = match best {
                None => true,
                Some((best_cost, best_index)) => {
                    cost < best_cost
                        || (cost == best_cost
                            && self.compare_nurses(index, best_index) == Ordering::Less)
                }
            };
            if better {
                best = Some((cost, index));
            }
        }
        best.map(|(_, index)| index)
    }

    /// Commit the task: fill any gap since the nurse's previous task
    /// with the cheapest rest-or-work pattern, then assign the day.
    fn assign_task_to_nurse(
        &mut self,
        nurse: usize,
        day: DayIndex,
        shift: ShiftIndex,
        skill: SkillIndex,
    ) {
        let gap_start = self.last_assigned[nurse].map_or(0, |d| d + 1);
        let mut roster = self.nurses[nurse].roster().clone();
        if gap_start < day {
            let contract = self.nurses[nurse].contract().clone();
            let entering = *self.nurses[nurse].state_at(gap_start);
            let (path, _) = fill_gap(&self.scenario, &contract, entering, gap_start..day, shift);
            let fallback_skill = self.nurses[nurse].skills().first().copied().unwrap_or(0);
            for (offset, &gap_shift) in path.iter().enumerate() {
                let assignment = if gap_shift == REST_SHIFT {
                    Assignment::Rest
                } else {
                    Assignment::Work {
                        shift: gap_shift,
                        skill: fallback_skill,
                    }
                };
                roster.set_day(gap_start + offset, assignment);
            }
        }
        roster.set_day(day, Assignment::Work { shift, skill });
        self.nurses[nurse].set_roster(roster);
        self.last_assigned[nurse] = Some(day);
    }

    /// Coverage verdict from the final rosters, which include any work
    /// the gap filler added after the day was first processed.
    fn check_min_coverage(&self) -> bool {
        let nb_days = self.demand.nb_days();
        for day in 0..nb_days {
            for shift in 1..self.scenario.nb_shifts() {
                for skill in 0..self.scenario.nb_skills() {
                    let have = self
                        .nurses
                        .iter()
                        .filter(|n| {
                            n.roster().day(day)
                                == Assignment::Work { shift, skill }
                        })
                        .count() as u32;
                    if have < self.demand.min(day, shift, skill) {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Soft cost of the finished rosters: rotation costs plus coverage
    /// shortfall and contract-total penalties.
    fn compute_total_cost(&self) -> Cost {
        let mut ids = RotationIdAllocator::new();
        let mut total = 0.0;
        for nurse in &self.nurses {
            for mut rotation in rotations_from_roster(&mut ids, nurse.index(), nurse.roster()) {
                rotation.compute_cost(&self.scenario, nurse, &self.preferences);
                total += rotation.cost();
            }
            let contract = nurse.contract();
            let final_state = nurse.final_state();
            total += final_state
                .total_shifts
                .saturating_sub(contract.max_total_shifts) as Cost
                * WEIGHT_TOTAL_SHIFTS;
            total += final_state
                .total_weekends
                .saturating_sub(contract.max_worked_weekends) as Cost
                * WEIGHT_TOTAL_WEEKENDS;
            if self.scenario.is_last_week() {
                total += contract
                    .min_total_shifts
                    .saturating_sub(final_state.total_shifts) as Cost
                    * WEIGHT_TOTAL_SHIFTS;
            }
        }
        for day in 0..self.demand.nb_days() {
            for shift in 1..self.scenario.nb_shifts() {
                for skill in 0..self.scenario.nb_skills() {
                    let have = self
                        .nurses
                        .iter()
                        .filter(|n| {
                            n.roster().day(day)
                                == Assignment::Work { shift, skill }
                        })
                        .count() as u32;
                    let opt = self.demand.opt(day, shift, skill);
                    total += Cost::from(opt.saturating_sub(have)) * WEIGHT_OPTIMAL_DEMAND;
                }
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(nb_nurses: usize) -> Scenario {
        let mut b = ScenarioBuilder::new()
            .weeks(1, 0)
            .shift("Day", 1, 7)
            .skill("Nurse")
            .contract(Contract::new("full-time", 0, 7, 1, 7, 1, 4, false));
        for i in 0..nb_nurses {
            b = b.nurse(format!("N{i}"), 0, [0]);
        }
        b.build().unwrap()
    }

    fn uniform_demand(nb_days: usize, min: u32, opt: u32) -> Demand {
        let mut d = Demand::zero(nb_days, 2, 1);
        for day in 0..nb_days {
            d.set_min(day, 1, 0, min);
            d.set_opt(day, 1, 0, opt);
        }
        d
    }

    fn rested(nb_nurses: usize) -> Vec<NurseState> {
        vec![NurseState::resting(3); nb_nurses]
    }

    #[test]
    fn test_zero_cost_when_everyone_works() {
        // Minimum demand equals the full nurse pool, no preferences:
        // everyone works every day and nothing is violated.
        let s = scenario(2);
        let mut g = Greedy::new(s, uniform_demand(7, 2, 2), Preferences::none(2), rested(2));
        let status = g.solve();
        assert_eq!(status, SolverStatus::Feasible);
        let schedule = g.schedule();
        assert_eq!(schedule.cost(), 0.0);
        for roster in schedule.rosters() {
            assert_eq!(roster.nb_worked(), 7);
        }
    }

    #[test]
    fn test_min_coverage_met_or_reported() {
        let s = scenario(3);
        let mut g = Greedy::new(s, uniform_demand(7, 2, 3), Preferences::none(3), rested(3));
        let status = g.solve();
        assert_eq!(status, SolverStatus::Feasible);
        let schedule = g.schedule();
        for day in 0..7 {
            let working = schedule
                .rosters()
                .iter()
                .filter(|r| r.day(day).is_work())
                .count();
            assert!(working >= 2, "day {day} has {working} < 2 nurses");
        }
    }

    #[test]
    fn test_impossible_demand_is_reported_not_fatal() {
        let s = scenario(1);
        let mut g = Greedy::new(s, uniform_demand(7, 3, 3), Preferences::none(1), rested(1));
        let status = g.solve();
        assert_eq!(status, SolverStatus::Infeasible);
        // The best-effort roster is still fully populated.
        assert_eq!(g.schedule().rosters().len(), 1);
        assert_eq!(g.schedule().rosters()[0].nb_days(), 7);
    }

    #[test]
    fn test_rosters_are_total() {
        let s = scenario(3);
        let mut d = uniform_demand(7, 0, 0);
        // Sparse demand: one nurse on days 1 and 5 only.
        d.set_min(1, 1, 0, 1);
        d.set_min(5, 1, 0, 1);
        let mut g = Greedy::new(s, d, Preferences::none(3), rested(3));
        g.solve();
        for roster in g.rosters() {
            assert_eq!(roster.days().len(), 7);
        }
    }

    #[test]
    fn test_scarce_position_served_first() {
        // Two positions over one shared skill; the single versatile
        // nurse should be kept for the skill only she covers.
        let s = ScenarioBuilder::new()
            .weeks(1, 0)
            .shift("Day", 1, 7)
            .skill("General")
            .skill("Head")
            .contract(Contract::new("full-time", 0, 7, 1, 7, 1, 4, false))
            .nurse("A", 0, [0])
            .nurse("B", 0, [0, 1])
            .build()
            .unwrap();
        let mut d = Demand::zero(3, 2, 2);
        for day in 0..3 {
            d.set_min(day, 1, 0, 1);
            d.set_min(day, 1, 1, 1);
            d.set_opt(day, 1, 0, 1);
            d.set_opt(day, 1, 1, 1);
        }
        let mut g = Greedy::new(s, d, Preferences::none(2), rested(2));
        let status = g.solve();
        assert_eq!(status, SolverStatus::Feasible);
    }
}
