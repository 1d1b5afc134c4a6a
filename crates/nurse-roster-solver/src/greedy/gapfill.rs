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

//! Iterative dynamic program that completes the unassigned days between
//! two of a nurse's tasks with the cheapest rest-or-work pattern. The
//! gap is bounded by the horizon, states are memoized on a capped
//! counter signature, and ties prefer rest.

use nurse_roster_model::prelude::*;
use std::collections::BTreeMap;
use std::ops::Range;

/// Counter cap for the memoization signature; contract bounds are far
/// below it, so capped states are cost-equivalent.
const COUNTER_CAP: usize = 16;

type Signature = (ShiftIndex, usize, usize, usize, usize);

fn signature(state: &NurseState, total_cap: usize) -> Signature {
    (
        state.shift,
        state.cons_shifts.min(COUNTER_CAP),
        state.cons_days_worked.min(COUNTER_CAP),
        state.cons_days_off.min(COUNTER_CAP),
        state.total_shifts.min(total_cap),
    )
}

/// Marginal soft cost of assigning `shift` on the next day given the
/// current counters: run shortfalls when a run ends, run overruns when
/// one grows past its bound, and short rest at the start of work.
pub(crate) fn transition_cost(
    scenario: &Scenario,
    contract: &Contract,
    state: &NurseState,
    shift: ShiftIndex,
) -> Cost {
    let mut cost = 0.0;
    if shift == REST_SHIFT {
        if state.is_working() {
            let min_s = scenario.min_cons_shifts(state.shift);
            if state.cons_shifts < min_s {
                cost += (min_s - state.cons_shifts) as Cost * WEIGHT_CONS_SHIFTS;
            }
            if state.cons_days_worked < contract.min_cons_days_work {
                cost += (contract.min_cons_days_work - state.cons_days_worked) as Cost
                    * WEIGHT_CONS_DAYS_WORK;
            }
        }
    } else if state.is_working() {
        if state.shift == shift {
            if state.cons_shifts + 1 > scenario.max_cons_shifts(shift) {
                cost += WEIGHT_CONS_SHIFTS;
            }
        } else {
            let min_s = scenario.min_cons_shifts(state.shift);
            if state.cons_shifts < min_s {
                cost += (min_s - state.cons_shifts) as Cost * WEIGHT_CONS_SHIFTS;
            }
        }
        if state.cons_days_worked + 1 > contract.max_cons_days_work {
            cost += WEIGHT_CONS_DAYS_WORK;
        }
    } else if state.cons_days_off < contract.min_cons_days_off {
        cost += (contract.min_cons_days_off - state.cons_days_off) as Cost * WEIGHT_CONS_DAYS_OFF;
    }
    cost
}

/// Find the cheapest rest-or-work filling of `days`, given the state
/// entering the gap and the shift known to follow it. Returns one
/// shift per gap day (possibly `REST_SHIFT`) and the total cost
/// including the transition into `next_shift`.
pub(crate) fn fill_gap(
    scenario: &Scenario,
    contract: &Contract,
    start: NurseState,
    days: Range<DayIndex>,
    next_shift: ShiftIndex,
) -> (Vec<ShiftIndex>, Cost) {
    let total_cap = contract.max_total_shifts + 1;
    let mut layer: BTreeMap<Signature, (Cost, NurseState, Vec<ShiftIndex>)> = BTreeMap::new();
    layer.insert(signature(&start, total_cap), (0.0, start, Vec::new()));

    for day in days {
        let mut next: BTreeMap<Signature, (Cost, NurseState, Vec<ShiftIndex>)> = BTreeMap::new();
        for (cost, state, path) in layer.into_values() {
            // Rest first so strict improvement keeps the resting path
            // on ties.
            for shift in std::iter::once(REST_SHIFT).chain(1..scenario.nb_shifts()) {
                if shift != REST_SHIFT && state.total_shifts + 1 > contract.max_total_shifts {
                    continue;
                }
                let step = cost + transition_cost(scenario, contract, &state, shift);
                let mut reached = state;
                reached.update(day, shift);
                let key = signature(&reached, total_cap);
                let improves = next.get(&key).is_none_or(|(existing, _, _)| step < *existing);
                if improves {
                    let mut extended = path.clone();
                    extended.push(shift);
                    next.insert(key, (step, reached, extended));
                }
            }
        }
        layer = next;
    }

    let mut best: Option<(Cost, Vec<ShiftIndex>)> = None;
    for (cost, state, path) in layer.into_values() {
        let total = cost + transition_cost(scenario, contract, &state, next_shift);
        if best.as_ref().is_none_or(|(existing, _)| total < *existing) {
            best = Some((total, path));
        }
    }
    best.map(|(cost, path)| (path, cost)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(min_cons_work: usize) -> Scenario {
        ScenarioBuilder::new()
            .shift("Early", 1, 5)
            .shift("Late", 1, 5)
            .skill("Nurse")
            .contract(Contract::new("full-time", 0, 50, min_cons_work, 6, 1, 7, false))
            .nurse("A", 0, [0])
            .build()
            .unwrap()
    }

    #[test]
    fn test_fill_covers_every_gap_day() {
        let s = scenario(1);
        let c = s.contract(0).clone();
        let (path, _) = fill_gap(&s, &c, NurseState::resting(2), 2..6, 1);
        assert_eq!(path.len(), 4);
    }

    #[test]
    fn test_ties_prefer_rest() {
        let s = scenario(1);
        let c = s.contract(0).clone();
        // Nothing forces work here, so the whole gap should rest.
        let (path, cost) = fill_gap(&s, &c, NurseState::resting(2), 1..4, 1);
        assert!(path.iter().all(|&sh| sh == REST_SHIFT));
        assert_eq!(cost, 0.0);
    }

    #[test]
    fn test_bridges_short_work_runs() {
        let s = scenario(3);
        let mut entering = NurseState::default();
        entering.update(0, 1);
        let c = s.contract(0).clone();
        // One worked day behind, one gap day, work ahead: resting the
        // gap pays the min-consecutive-work shortfall twice over, so
        // working through is cheaper.
        let (path, _) = fill_gap(&s, &c, entering, 1..2, 1);
        assert_eq!(path.len(), 1);
        assert_ne!(path[0], REST_SHIFT);
    }

    #[test]
    fn test_empty_gap_is_just_the_boundary_cost() {
        let s = scenario(1);
        let c = s.contract(0).clone();
        let (path, cost) = fill_gap(&s, &c, NurseState::resting(5), 3..3, 1);
        assert!(path.is_empty());
        assert_eq!(cost, 0.0);
    }
}
