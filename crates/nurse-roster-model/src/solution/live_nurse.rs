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

//! A nurse during solving: the static description joined with an
//! initial state, a working roster and the state reached after each
//! day. States are rebuilt as a whole whenever the roster changes, so
//! they can never drift out of sync with it.

use crate::common::{Cost, DayIndex, NurseId, ShiftIndex, SkillIndex};
use crate::problem::scenario::{Contract, Nurse, Scenario};
use crate::solution::roster::{Assignment, Roster};
use crate::solution::state::NurseState;

#[derive(Debug, Clone)]
pub struct LiveNurse {
    index: usize,
    id: NurseId,
    contract: Contract,
    position: usize,
    skills: Vec<SkillIndex>,
    init_state: NurseState,
    roster: Roster,
    /// `states[d]` is the state after day `d - 1`; `states[0]` is the
    /// initial state, so the vector has `nb_days + 1` entries.
    states: Vec<NurseState>,
    max_total_shifts_avg: Cost,
    max_weekends_avg: Cost,
}

impl LiveNurse {
    pub fn new(
        scenario: &Scenario,
        nurse: &Nurse,
        index: usize,
        init_state: NurseState,
        nb_days: usize,
    ) -> Self {
        let contract = scenario.contract(nurse.contract_index()).clone();
        let remaining_weeks = scenario.nb_weeks() - scenario.this_week();
        // Pro-rata share of the remaining contract allowance for the
        // days under planning.
        let horizon_share = nb_days as Cost / (remaining_weeks as Cost * 7.0);
        let max_total_shifts_avg = contract
            .max_total_shifts
            .saturating_sub(init_state.total_shifts) as Cost
            * horizon_share;
        let max_weekends_avg = contract
            .max_worked_weekends
            .saturating_sub(init_state.total_weekends) as Cost
            * horizon_share;
        let mut live = Self {
            index,
            id: nurse.id(),
            contract,
            position: nurse.position_index(),
            skills: nurse.skills().to_vec(),
            init_state,
            roster: Roster::rest(nb_days),
            states: Vec::new(),
            max_total_shifts_avg,
            max_weekends_avg,
        };
        live.rebuild_states();
        live
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn id(&self) -> NurseId {
        self.id
    }

    #[inline]
    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    #[inline]
    pub fn position_index(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn skills(&self) -> &[SkillIndex] {
        &self.skills
    }

    #[inline]
    pub fn has_skill(&self, skill: SkillIndex) -> bool {
        self.skills.contains(&skill)
    }

    #[inline]
    pub fn init_state(&self) -> &NurseState {
        &self.init_state
    }

    #[inline]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    #[inline]
    pub fn nb_days(&self) -> usize {
        self.roster.nb_days()
    }

    /// Pro-rata ceiling on worked shifts for the planned horizon.
    #[inline]
    pub fn max_total_shifts_avg(&self) -> Cost {
        self.max_total_shifts_avg
    }

    /// Pro-rata ceiling on worked weekends for the planned horizon.
    #[inline]
    pub fn max_weekends_avg(&self) -> Cost {
        self.max_weekends_avg
    }

    /// State before `day` is worked.
    #[inline]
    pub fn state_at(&self, day: DayIndex) -> &NurseState {
        &self.states[day]
    }

    /// State after the last planned day.
    #[inline]
    pub fn final_state(&self) -> &NurseState {
        &self.states[self.roster.nb_days()]
    }

    #[inline]
    pub fn shift_on(&self, day: DayIndex) -> ShiftIndex {
        self.roster.day(day).shift()
    }

    /// Replace the whole roster and rebuild every per-day state.
    pub fn set_roster(&mut self, roster: Roster) {
        debug_assert_eq!(roster.nb_days(), self.roster.nb_days());
        self.roster = roster;
        self.rebuild_states();
    }

    /// Assign one day and rebuild the states from that day on.
    pub fn assign(&mut self, day: DayIndex, assignment: Assignment) {
        self.roster.set_day(day, assignment);
        self.rebuild_states();
    }

    /// The state reached if the nurse rests from `from` up to (not
    /// including) `day`, without touching the roster.
    pub fn state_if_rest_until(&self, from: DayIndex, day: DayIndex) -> NurseState {
        let mut state = self.states[from];
        for d in from..day {
            state.update(d, crate::common::REST_SHIFT);
        }
        state
    }

    fn rebuild_states(&mut self) {
        let nb_days = self.roster.nb_days();
        self.states.clear();
        self.states.reserve(nb_days + 1);
        self.states.push(self.init_state);
        let mut state = self.init_state;
        for day in 0..nb_days {
            state.update(day, self.roster.day(day).shift());
            self.states.push(state);
        }
    }
}

/// Build the live view of every nurse in the scenario, pairing each
/// with its initial state.
pub fn live_nurses_from(
    scenario: &Scenario,
    init_states: &[NurseState],
    nb_days: usize,
) -> Vec<LiveNurse> {
    debug_assert_eq!(init_states.len(), scenario.nb_nurses());
    scenario
        .nurses()
        .iter()
        .enumerate()
        .map(|(index, nurse)| LiveNurse::new(scenario, nurse, index, init_states[index], nb_days))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::REST_SHIFT;
    use crate::problem::scenario::{Contract, ScenarioBuilder};

    fn scenario() -> Scenario {
        ScenarioBuilder::new()
            .weeks(4, 0)
            .shift("Early", 1, 3)
            .skill("Nurse")
            .contract(Contract::new("full-time", 0, 20, 1, 5, 1, 2, false))
            .nurse("A", 0, [0])
            .build()
            .unwrap()
    }

    fn live() -> LiveNurse {
        let s = scenario();
        let states = vec![NurseState::resting(1)];
        live_nurses_from(&s, &states, 7).remove(0)
    }

    #[test]
    fn test_states_follow_roster() {
        let mut n = live();
        assert_eq!(n.final_state().cons_days_off, 8);
        n.assign(2, Assignment::Work { shift: 1, skill: 0 });
        assert_eq!(n.state_at(2).cons_days_off, 3);
        assert_eq!(n.state_at(3).cons_days_worked, 1);
        assert_eq!(n.final_state().cons_days_off, 4);
        assert_eq!(n.final_state().shift, REST_SHIFT);
    }

    #[test]
    fn test_state_if_rest_until_leaves_roster_alone() {
        let mut n = live();
        n.assign(0, Assignment::Work { shift: 1, skill: 0 });
        let hypothetical = n.state_if_rest_until(1, 4);
        assert_eq!(hypothetical.cons_days_off, 3);
        assert_eq!(n.state_at(1).cons_days_worked, 1);
    }

    #[test]
    fn test_pro_rata_allowances() {
        let n = live();
        // 7 of 28 remaining days, 20 total shifts allowed.
        assert!((n.max_total_shifts_avg() - 5.0).abs() < 1e-9);
        assert!((n.max_weekends_avg() - 0.5).abs() < 1e-9);
    }
}
