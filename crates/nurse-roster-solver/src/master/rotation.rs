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

//! Rotations, the columns of the master problem: one contiguous block
//! of worked shifts for one nurse, with its soft-constraint cost
//! breakdown and its dual (pricing) cost.

use nurse_roster_model::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// Identifier of a rotation, unique within one master problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RotationId(usize);

impl RotationId {
    #[inline]
    pub fn new(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for RotationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// Monotonic id source owned by one master problem instance.
#[derive(Debug, Default)]
pub struct RotationIdAllocator {
    next: usize,
}

impl RotationIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> RotationId {
        let id = RotationId(self.next);
        self.next += 1;
        id
    }
}

/// The five soft-cost components of a rotation. Components are
/// `f64::INFINITY` until [`Rotation::compute_cost`] runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostBreakdown {
    pub cons_shifts: Cost,
    pub cons_days_worked: Cost,
    pub complete_weekend: Cost,
    pub preference: Cost,
    pub init_rest: Cost,
}

impl CostBreakdown {
    pub fn unset() -> Self {
        Self {
            cons_shifts: Cost::INFINITY,
            cons_days_worked: Cost::INFINITY,
            complete_weekend: Cost::INFINITY,
            preference: Cost::INFINITY,
            init_rest: Cost::INFINITY,
        }
    }

    #[inline]
    pub fn total(&self) -> Cost {
        self.cons_shifts
            + self.cons_days_worked
            + self.complete_weekend
            + self.preference
            + self.init_rest
    }
}

/// Dual prices of one nurse's rows after an LP resolve, folded so that
/// a column's reduced cost is `cost - compute_dual_cost`.
#[derive(Debug, Clone)]
pub struct DualCosts {
    /// Per (day, shift) price of working that slot.
    work: Vec<Vec<Cost>>,
    /// Price of starting a work block on a day (flow row entered).
    start_work: Vec<Cost>,
    /// Price of ending a work block on a day (flow row of the day
    /// after, negated).
    end_work: Vec<Cost>,
    /// Price per covered worked weekend.
    weekend: Cost,
}

impl DualCosts {
    pub fn new(
        work: Vec<Vec<Cost>>,
        start_work: Vec<Cost>,
        end_work: Vec<Cost>,
        weekend: Cost,
    ) -> Self {
        debug_assert_eq!(work.len(), start_work.len());
        debug_assert_eq!(work.len(), end_work.len());
        Self {
            work,
            start_work,
            end_work,
            weekend,
        }
    }

    /// An all-zero dual vector of the given shape.
    pub fn zero(nb_days: usize, nb_shifts: usize) -> Self {
        Self {
            work: vec![vec![0.0; nb_shifts]; nb_days],
            start_work: vec![0.0; nb_days],
            end_work: vec![0.0; nb_days],
            weekend: 0.0,
        }
    }

    #[inline]
    pub fn nb_days(&self) -> usize {
        self.work.len()
    }

    #[inline]
    pub fn work_cost(&self, day: DayIndex, shift: ShiftIndex) -> Cost {
        self.work[day][shift]
    }

    #[inline]
    pub fn start_work_cost(&self, day: DayIndex) -> Cost {
        self.start_work[day]
    }

    #[inline]
    pub fn end_work_cost(&self, day: DayIndex) -> Cost {
        self.end_work[day]
    }

    #[inline]
    pub fn worked_weekend_cost(&self) -> Cost {
        self.weekend
    }

    pub fn set_work_cost(&mut self, day: DayIndex, shift: ShiftIndex, value: Cost) {
        self.work[day][shift] = value;
    }
}

/// A contiguous block of worked shifts for one nurse. Days outside the
/// shift map are rest. Never mutated once registered as a column.
#[derive(Debug, Clone)]
pub struct Rotation {
    id: RotationId,
    nurse: usize,
    shifts: BTreeMap<DayIndex, ShiftIndex>,
    first_day: DayIndex,
    length: usize,
    cost: Cost,
    breakdown: CostBreakdown,
    dual_cost: Cost,
}

impl Rotation {
    /// A worked rotation; `shifts` must be non-empty with contiguous
    /// day keys and no rest entries.
    pub fn new(id: RotationId, nurse: usize, shifts: BTreeMap<DayIndex, ShiftIndex>) -> Self {
        debug_assert!(!shifts.is_empty());
        debug_assert!(shifts.values().all(|&s| s != REST_SHIFT));
        let first_day = *shifts.keys().next().unwrap_or(&0);
        let length = shifts.len();
        debug_assert!(shifts.keys().last().is_some_and(|&d| d == first_day + length - 1));
        Self {
            id,
            nurse,
            shifts,
            first_day,
            length,
            cost: Cost::INFINITY,
            breakdown: CostBreakdown::unset(),
            dual_cost: Cost::INFINITY,
        }
    }

    /// The empty rotation that closes a nurse's carried-over working
    /// block immediately before day 0; it occupies day 0 as rest.
    pub fn init_state(id: RotationId, nurse: usize) -> Self {
        Self {
            id,
            nurse,
            shifts: BTreeMap::new(),
            first_day: 0,
            length: 0,
            cost: Cost::INFINITY,
            breakdown: CostBreakdown::unset(),
            dual_cost: Cost::INFINITY,
        }
    }

    #[inline]
    pub fn id(&self) -> RotationId {
        self.id
    }

    #[inline]
    pub fn nurse(&self) -> usize {
        self.nurse
    }

    #[inline]
    pub fn shifts(&self) -> &BTreeMap<DayIndex, ShiftIndex> {
        &self.shifts
    }

    #[inline]
    pub fn first_day(&self) -> DayIndex {
        self.first_day
    }

    /// Last worked day; equals `first_day` for the init-state rotation.
    #[inline]
    pub fn last_day(&self) -> DayIndex {
        self.first_day + self.length.saturating_sub(1)
    }

    #[inline]
    pub fn length(&self) -> usize {
        self.length
    }

    #[inline]
    pub fn is_init_state(&self) -> bool {
        self.length == 0
    }

    #[inline]
    pub fn cost(&self) -> Cost {
        self.cost
    }

    #[inline]
    pub fn breakdown(&self) -> &CostBreakdown {
        &self.breakdown
    }

    #[inline]
    pub fn dual_cost(&self) -> Cost {
        self.dual_cost
    }

    pub fn set_dual_cost(&mut self, value: Cost) {
        self.dual_cost = value;
    }

    /// Number of distinct weekends with at least one worked day.
    pub fn covered_weekends(&self) -> usize {
        let weekends: BTreeSet<usize> = self
            .shifts
            .keys()
            .filter(|&&d| is_weekend(d))
            .map(|&d| weekend_index(d))
            .collect();
        weekends.len()
    }

    /// Recompute the five cost components by simulating the
    /// consecutive-shift and consecutive-worked-day counters forward
    /// from the nurse's initial state. The initial state is carried
    /// over iff the rotation starts on day 0. Idempotent.
    pub fn compute_cost(&mut self, scenario: &Scenario, nurse: &LiveNurse, preferences: &Preferences) {
        debug_assert_eq!(self.nurse, nurse.index());
        let contract = nurse.contract();
        let init = nurse.init_state();
        let nb_days = nurse.nb_days();

        if self.is_init_state() {
            // Closing the carried-over block: pay the shortfall of its
            // last shift run and of its worked-day run.
            let mut cons_shifts = 0.0;
            let mut cons_days_worked = 0.0;
            if init.is_working() {
                let min_s = scenario.min_cons_shifts(init.shift);
                if init.cons_shifts < min_s {
                    cons_shifts = (min_s - init.cons_shifts) as Cost * WEIGHT_CONS_SHIFTS;
                }
                if init.cons_days_worked < contract.min_cons_days_work {
                    cons_days_worked = (contract.min_cons_days_work - init.cons_days_worked)
                        as Cost
                        * WEIGHT_CONS_DAYS_WORK;
                }
            }
            self.breakdown = CostBreakdown {
                cons_shifts,
                cons_days_worked,
                complete_weekend: 0.0,
                preference: 0.0,
                init_rest: 0.0,
            };
            self.cost = self.breakdown.total();
            return;
        }

        let carry = self.first_day == 0 && init.is_working();
        let days: Vec<(DayIndex, ShiftIndex)> =
            self.shifts.iter().map(|(&d, &s)| (d, s)).collect();

        // Consecutive shift-type penalties.
        let mut cons_shifts = 0.0;
        let first_shift = days[0].1;
        if carry && init.shift != first_shift {
            // The carried run of the old shift type ends at day 0.
            let min_s = scenario.min_cons_shifts(init.shift);
            if init.cons_shifts < min_s {
                cons_shifts += (min_s - init.cons_shifts) as Cost * WEIGHT_CONS_SHIFTS;
            }
        }
        let mut run_shift = first_shift;
        let mut run_len = if carry && init.shift == first_shift {
            init.cons_shifts
        } else {
            0
        };
        for &(_, shift) in &days {
            if shift != run_shift {
                let min_s = scenario.min_cons_shifts(run_shift);
                if run_len < min_s {
                    cons_shifts += (min_s - run_len) as Cost * WEIGHT_CONS_SHIFTS;
                }
                run_shift = shift;
                run_len = 0;
            }
            run_len += 1;
            if run_len > scenario.max_cons_shifts(run_shift) {
                cons_shifts += WEIGHT_CONS_SHIFTS;
            }
        }
        if self.last_day() + 1 < nb_days {
            // A run cut by the horizon end is not penalized.
            let min_s = scenario.min_cons_shifts(run_shift);
            if run_len < min_s {
                cons_shifts += (min_s - run_len) as Cost * WEIGHT_CONS_SHIFTS;
            }
        }

        // Consecutive worked-day penalties.
        let mut cons_days_worked = 0.0;
        let mut worked_run = if carry { init.cons_days_worked } else { 0 };
        for _ in 0..self.length {
            worked_run += 1;
            if worked_run > contract.max_cons_days_work {
                cons_days_worked += WEIGHT_CONS_DAYS_WORK;
            }
        }
        if self.last_day() + 1 < nb_days && worked_run < contract.min_cons_days_work {
            cons_days_worked +=
                (contract.min_cons_days_work - worked_run) as Cost * WEIGHT_CONS_DAYS_WORK;
        }

        // Complete-weekend penalties.
        let mut complete_weekend = 0.0;
        if contract.complete_weekends {
            for w in weekend_index(self.first_day)..=weekend_index(self.last_day()) {
                let saturday = 5 + 7 * w;
                let sunday = 6 + 7 * w;
                let works_sat = self.shifts.contains_key(&saturday);
                let works_sun = sunday < nb_days && self.shifts.contains_key(&sunday);
                if sunday < nb_days && works_sat != works_sun {
                    complete_weekend += WEIGHT_COMPLETE_WEEKEND;
                }
            }
        }

        // Preference penalties.
        let mut preference = 0.0;
        for &(day, shift) in &days {
            if preferences.wants_shift_off(self.nurse, day, shift) {
                preference += WEIGHT_PREFERENCES;
            }
        }

        // Initial rest-state penalty: starting work before the minimum
        // rest following the horizon boundary is reached.
        let mut init_rest = 0.0;
        if !carry {
            let rest_taken = self.first_day
                + if init.is_working() {
                    0
                } else {
                    init.cons_days_off
                };
            let missing = contract.min_cons_days_off.saturating_sub(rest_taken);
            init_rest = missing as Cost * WEIGHT_CONS_DAYS_OFF;
        }

        self.breakdown = CostBreakdown {
            cons_shifts,
            cons_days_worked,
            complete_weekend,
            preference,
            init_rest,
        };
        self.cost = self.breakdown.total();
    }

    /// Sum of this rotation's coefficients priced by `duals`. Pure;
    /// the stored cost fields are never touched.
    pub fn compute_dual_cost(&self, duals: &DualCosts) -> Cost {
        let mut total =
            duals.start_work_cost(self.first_day) + duals.end_work_cost(self.last_day());
        for (&day, &shift) in &self.shifts {
            total += duals.work_cost(day, shift);
        }
        total += duals.worked_weekend_cost() * self.covered_weekends() as Cost;
        total
    }

    /// Reduced cost against the current duals; negative means the
    /// column improves the restricted master problem.
    #[inline]
    pub fn reduced_cost(&self, duals: &DualCosts) -> Cost {
        self.cost - self.compute_dual_cost(duals)
    }
}

/// Decompose a roster into its maximal contiguous work blocks, one
/// rotation per block. Used for warm starts.
pub fn rotations_from_roster(
    ids: &mut RotationIdAllocator,
    nurse: usize,
    roster: &Roster,
) -> Vec<Rotation> {
    let mut rotations = Vec::new();
    let mut block: BTreeMap<DayIndex, ShiftIndex> = BTreeMap::new();
    for (day, assignment) in roster.days().iter().enumerate() {
        match assignment {
            Assignment::Work { shift, .. } => {
                block.insert(day, *shift);
            }
            Assignment::Rest => {
                if !block.is_empty() {
                    rotations.push(Rotation::new(ids.next_id(), nurse, std::mem::take(&mut block)));
                }
            }
        }
    }
    if !block.is_empty() {
        rotations.push(Rotation::new(ids.next_id(), nurse, block));
    }
    rotations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Scenario {
        ScenarioBuilder::new()
            .weeks(4, 0)
            .shift("Early", 2, 3)
            .shift("Late", 2, 3)
            .skill("Nurse")
            .contract(Contract::new("full-time", 0, 20, 2, 5, 2, 2, true))
            .nurse("A", 0, [0])
            .build()
            .unwrap()
    }

    fn nurse_with(state: NurseState) -> (Scenario, LiveNurse) {
        let s = scenario();
        let live = live_nurses_from(&s, &[state], 14).remove(0);
        (s, live)
    }

    fn rotation(days: &[(DayIndex, ShiftIndex)]) -> Rotation {
        let mut alloc = RotationIdAllocator::new();
        Rotation::new(alloc.next_id(), 0, days.iter().copied().collect())
    }

    #[test]
    fn test_breakdown_sums_to_cost_and_is_idempotent() {
        let (s, n) = nurse_with(NurseState::resting(2));
        let p = Preferences::none(1);
        let mut r = rotation(&[(1, 1), (2, 1), (3, 2)]);
        r.compute_cost(&s, &n, &p);
        let first = r.cost();
        assert!((r.breakdown().total() - first).abs() < 1e-9);
        r.compute_cost(&s, &n, &p);
        assert_eq!(r.cost(), first);
    }

    #[test]
    fn test_min_cons_shift_shortfall() {
        let (s, n) = nurse_with(NurseState::resting(2));
        let p = Preferences::none(1);
        // Early worked once, then Late twice: Early run is 1 below min 2.
        let mut r = rotation(&[(2, 1), (3, 2), (4, 2)]);
        r.compute_cost(&s, &n, &p);
        assert_eq!(r.breakdown().cons_shifts, WEIGHT_CONS_SHIFTS);
    }

    #[test]
    fn test_max_cons_days_overrun() {
        let (s, n) = nurse_with(NurseState::resting(2));
        let p = Preferences::none(1);
        // Seven worked days with max 5: two days over.
        let mut r = rotation(&[(0, 1), (1, 1), (2, 1), (3, 2), (4, 2), (5, 2), (6, 1)]);
        r.compute_cost(&s, &n, &p);
        assert_eq!(r.breakdown().cons_days_worked, 2.0 * WEIGHT_CONS_DAYS_WORK);
    }

    #[test]
    fn test_horizon_cut_run_is_not_penalized() {
        let (s, n) = nurse_with(NurseState::resting(2));
        let p = Preferences::none(1);
        // Single worked day at the last day of a 14-day horizon.
        let mut r = rotation(&[(13, 1)]);
        r.compute_cost(&s, &n, &p);
        assert_eq!(r.breakdown().cons_shifts, 0.0);
        assert_eq!(r.breakdown().cons_days_worked, 0.0);
    }

    #[test]
    fn test_incomplete_weekend_penalty() {
        let (s, n) = nurse_with(NurseState::resting(2));
        let p = Preferences::none(1);
        // Works Friday + Saturday, rests Sunday.
        let mut r = rotation(&[(4, 1), (5, 1)]);
        r.compute_cost(&s, &n, &p);
        assert_eq!(r.breakdown().complete_weekend, WEIGHT_COMPLETE_WEEKEND);
        // Works the whole weekend: complete.
        let mut r = rotation(&[(5, 1), (6, 1)]);
        r.compute_cost(&s, &n, &p);
        assert_eq!(r.breakdown().complete_weekend, 0.0);
    }

    #[test]
    fn test_preference_penalty() {
        let (s, n) = nurse_with(NurseState::resting(2));
        let mut p = Preferences::none(1);
        p.add_shift_off(0, 2, 1);
        let mut r = rotation(&[(2, 1), (3, 1)]);
        r.compute_cost(&s, &n, &p);
        assert_eq!(r.breakdown().preference, WEIGHT_PREFERENCES);
    }

    #[test]
    fn test_init_rest_penalty_for_short_rest() {
        // One rest day behind her, contract wants two in a row.
        let (s, n) = nurse_with(NurseState::resting(1));
        let p = Preferences::none(1);
        let mut r = rotation(&[(0, 1), (1, 1)]);
        r.compute_cost(&s, &n, &p);
        assert_eq!(r.breakdown().init_rest, WEIGHT_CONS_DAYS_OFF);
        // Starting a day later completes the rest.
        let mut r = rotation(&[(1, 1), (2, 1)]);
        r.compute_cost(&s, &n, &p);
        assert_eq!(r.breakdown().init_rest, 0.0);
    }

    #[test]
    fn test_carry_in_continues_counters() {
        let mut state = NurseState::default();
        state.shift = 1;
        state.cons_shifts = 3;
        state.cons_days_worked = 3;
        let (s, n) = nurse_with(state);
        let p = Preferences::none(1);
        // One more Early: run of 4 exceeds max 3 once.
        let mut r = rotation(&[(0, 1), (1, 2), (2, 2)]);
        r.compute_cost(&s, &n, &p);
        assert_eq!(r.breakdown().cons_shifts, WEIGHT_CONS_SHIFTS);
        assert_eq!(r.breakdown().init_rest, 0.0);
    }

    #[test]
    fn test_init_state_rotation_closes_short_runs() {
        let mut state = NurseState::default();
        state.shift = 1;
        state.cons_shifts = 1;
        state.cons_days_worked = 1;
        let (s, n) = nurse_with(state);
        let p = Preferences::none(1);
        let mut alloc = RotationIdAllocator::new();
        let mut r = Rotation::init_state(alloc.next_id(), 0);
        r.compute_cost(&s, &n, &p);
        assert_eq!(r.breakdown().cons_shifts, WEIGHT_CONS_SHIFTS);
        assert_eq!(r.breakdown().cons_days_worked, WEIGHT_CONS_DAYS_WORK);
    }

    #[test]
    fn test_dual_cost_is_pure() {
        let (s, n) = nurse_with(NurseState::resting(2));
        let p = Preferences::none(1);
        let mut r = rotation(&[(2, 1), (3, 1)]);
        r.compute_cost(&s, &n, &p);
        let cost = r.cost();
        let mut duals = DualCosts::zero(14, 3);
        duals.set_work_cost(2, 1, 5.0);
        duals.set_work_cost(3, 1, 7.0);
        assert!((r.compute_dual_cost(&duals) - 12.0).abs() < 1e-9);
        assert_eq!(r.cost(), cost);
    }

    #[test]
    fn test_covered_weekends() {
        let r = rotation(&[(4, 1), (5, 1), (6, 1), (7, 1)]);
        assert_eq!(r.covered_weekends(), 1);
        let r = rotation(&[(5, 1), (6, 1), (7, 1), (8, 1), (9, 1), (10, 1), (11, 1), (12, 1)]);
        assert_eq!(r.covered_weekends(), 2);
    }

    #[test]
    fn test_rotations_from_roster_splits_on_rest() {
        let mut roster = Roster::rest(7);
        for day in [0, 1, 4, 5] {
            roster.set_day(day, Assignment::Work { shift: 1, skill: 0 });
        }
        let mut alloc = RotationIdAllocator::new();
        let rotations = rotations_from_roster(&mut alloc, 0, &roster);
        assert_eq!(rotations.len(), 2);
        assert_eq!(rotations[0].first_day(), 0);
        assert_eq!(rotations[0].length(), 2);
        assert_eq!(rotations[1].first_day(), 4);
        assert_eq!(rotations[1].last_day(), 5);
    }

    #[test]
    fn test_id_allocator_is_monotonic() {
        let mut alloc = RotationIdAllocator::new();
        let a = alloc.next_id();
        let b = alloc.next_id();
        assert!(a < b);
        assert_eq!(a.get() + 1, b.get());
    }
}
