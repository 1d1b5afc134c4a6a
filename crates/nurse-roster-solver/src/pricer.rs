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

//! The pricing contract of the master problem, plus a bounded
//! enumeration pricer shipped as the reference implementation. The
//! master only ever sees this trait; any shortest-path or label-setting
//! pricer can be dropped in behind it.

use nurse_roster_model::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

use crate::master::rotation::{DualCosts, Rotation, RotationIdAllocator};

pub const REDUCED_COST_EPSILON: Cost = 1e-6;

/// Searches for rotations with negative reduced cost for one nurse.
/// Implementations must be deterministic for a given dual vector and
/// nurse state, so a column-generation trace is reproducible.
pub trait RotationPricer {
    fn price_rotations(
        &mut self,
        nurse: &LiveNurse,
        scenario: &Scenario,
        preferences: &Preferences,
        duals: &DualCosts,
        ids: &mut RotationIdAllocator,
    ) -> Vec<Rotation>;
}

/// Scans every (start day, length) window up to the contract's
/// consecutive-work bound; per window it tries the per-day best-dual
/// shift assignment and every uniform single-shift assignment, and
/// keeps the candidates whose reduced cost is strictly negative.
#[derive(Debug, Clone)]
pub struct EnumerationPricer {
    max_columns_per_nurse: usize,
}

impl EnumerationPricer {
    pub fn new(max_columns_per_nurse: usize) -> Self {
        Self {
            max_columns_per_nurse,
        }
    }
}

impl Default for EnumerationPricer {
    fn default() -> Self {
        Self::new(10)
    }
}

impl RotationPricer for EnumerationPricer {
    fn price_rotations(
        &mut self,
        nurse: &LiveNurse,
        scenario: &Scenario,
        preferences: &Preferences,
        duals: &DualCosts,
        ids: &mut RotationIdAllocator,
    ) -> Vec<Rotation> {
        let nb_days = duals.nb_days();
        let nb_shifts = scenario.nb_shifts();
        if nb_days == 0 || nb_shifts <= 1 {
            return Vec::new();
        }
        let max_len = nurse.contract().max_cons_days_work.min(nb_days).max(1);

        // Candidate shift maps, deduplicated before evaluation.
        let mut candidates: BTreeSet<Vec<(DayIndex, ShiftIndex)>> = BTreeSet::new();
        for first in 0..nb_days {
            for len in 1..=max_len.min(nb_days - first) {
                let days = first..first + len;
                // Per-day highest-dual shift.
                let argmax: Vec<(DayIndex, ShiftIndex)> = days
                    .clone()
                    .map(|d| {
                        let best = (1..nb_shifts)
                            .fold(1, |acc, s| {
                                if duals.work_cost(d, s) > duals.work_cost(d, acc) {
                                    s
                                } else {
                                    acc
                                }
                            });
                        (d, best)
                    })
                    .collect();
                candidates.insert(argmax);
                for s in 1..nb_shifts {
                    candidates.insert(days.clone().map(|d| (d, s)).collect());
                }
            }
        }

        let mut priced: Vec<(Cost, Rotation)> = Vec::new();
        for map in candidates {
            let shifts: BTreeMap<DayIndex, ShiftIndex> = map.into_iter().collect();
            let mut rotation = Rotation::new(ids.next_id(), nurse.index(), shifts);
            rotation.compute_cost(scenario, nurse, preferences);
            let reduced = rotation.reduced_cost(duals);
            if reduced < -REDUCED_COST_EPSILON {
                rotation.set_dual_cost(rotation.compute_dual_cost(duals));
                priced.push((reduced, rotation));
            }
        }

        priced.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.id().cmp(&b.1.id()))
        });
        priced.truncate(self.max_columns_per_nurse);
        priced.into_iter().map(|(_, r)| r).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Scenario {
        ScenarioBuilder::new()
            .weeks(1, 0)
            .shift("Early", 1, 5)
            .shift("Late", 1, 5)
            .skill("Nurse")
            .contract(Contract::new("full-time", 0, 20, 1, 5, 1, 7, false))
            .nurse("A", 0, [0])
            .build()
            .unwrap()
    }

    fn live(s: &Scenario) -> LiveNurse {
        live_nurses_from(s, &[NurseState::resting(2)], 7).remove(0)
    }

    #[test]
    fn test_no_columns_without_attractive_duals() {
        let s = scenario();
        let n = live(&s);
        let duals = DualCosts::zero(7, s.nb_shifts());
        let mut pricer = EnumerationPricer::default();
        let mut ids = RotationIdAllocator::new();
        let found = pricer.price_rotations(&n, &s, &Preferences::none(1), &duals, &mut ids);
        assert!(found.is_empty());
    }

    #[test]
    fn test_finds_negative_reduced_cost_columns() {
        let s = scenario();
        let n = live(&s);
        let mut duals = DualCosts::zero(7, s.nb_shifts());
        for d in 0..7 {
            duals.set_work_cost(d, 1, 100.0);
        }
        let mut pricer = EnumerationPricer::default();
        let mut ids = RotationIdAllocator::new();
        let found = pricer.price_rotations(&n, &s, &Preferences::none(1), &duals, &mut ids);
        assert!(!found.is_empty());
        for r in &found {
            assert!(r.reduced_cost(&duals) < -REDUCED_COST_EPSILON);
            assert!(r.cost().is_finite());
        }
    }

    #[test]
    fn test_pricing_is_deterministic() {
        let s = scenario();
        let n = live(&s);
        let mut duals = DualCosts::zero(7, s.nb_shifts());
        duals.set_work_cost(2, 1, 250.0);
        duals.set_work_cost(3, 2, 250.0);
        let mut pricer = EnumerationPricer::default();
        let runs: Vec<Vec<(DayIndex, usize)>> = (0..2)
            .map(|_| {
                let mut ids = RotationIdAllocator::new();
                pricer
                    .price_rotations(&n, &s, &Preferences::none(1), &duals, &mut ids)
                    .iter()
                    .map(|r| (r.first_day(), r.length()))
                    .collect()
            })
            .collect();
        assert_eq!(runs[0], runs[1]);
    }

    #[test]
    fn test_respects_column_cap() {
        let s = scenario();
        let n = live(&s);
        let mut duals = DualCosts::zero(7, s.nb_shifts());
        for d in 0..7 {
            for sh in 1..s.nb_shifts() {
                duals.set_work_cost(d, sh, 500.0);
            }
        }
        let mut pricer = EnumerationPricer::new(3);
        let mut ids = RotationIdAllocator::new();
        let found = pricer.price_rotations(&n, &s, &Preferences::none(1), &duals, &mut ids);
        assert_eq!(found.len(), 3);
    }
}
