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

//! Sampling plausible future demands from the weeks already seen.

use nurse_roster_model::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of hypothetical future demands for lookahead solves.
pub trait DemandGenerator {
    /// A demand covering `nb_days` days, same per-day shape as the
    /// problem demand.
    fn generate(&mut self, nb_days: usize) -> Demand;

    /// `count` independent demands of `nb_days` days each.
    fn generate_many(&mut self, count: usize, nb_days: usize) -> Vec<Demand> {
        (0..count).map(|_| self.generate(nb_days)).collect()
    }
}

fn perturb(rng: &mut ChaCha8Rng, value: u32) -> u32 {
    let delta = rng.random_range(-1..=1i64);
    (value as i64 + delta).max(0) as u32
}

/// Resamples days uniformly from historical weekly demands and
/// perturbs every cell by at most one nurse. Deterministic for a given
/// seed and call sequence.
pub struct HistoryDemandGenerator {
    history: Vec<Demand>,
    rng: ChaCha8Rng,
}

impl HistoryDemandGenerator {
    /// `history` must be non-empty and uniform in shifts and skills.
    pub fn new(history: Vec<Demand>, seed: u64) -> Self {
        assert!(!history.is_empty(), "demand history must not be empty");
        let shape = (history[0].nb_shifts(), history[0].nb_skills());
        debug_assert!(history
            .iter()
            .all(|d| (d.nb_shifts(), d.nb_skills()) == shape));
        Self {
            history,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl DemandGenerator for HistoryDemandGenerator {
    fn generate(&mut self, nb_days: usize) -> Demand {
        let nb_shifts = self.history[0].nb_shifts();
        let nb_skills = self.history[0].nb_skills();
        let mut demand = Demand::zero(nb_days, nb_shifts, nb_skills);
        for day in 0..nb_days {
            let week = self.rng.random_range(0..self.history.len());
            let sample_day = self.rng.random_range(0..self.history[week].nb_days());
            for shift in 1..nb_shifts {
                for skill in 0..nb_skills {
                    let base_min = self.history[week].min(sample_day, shift, skill);
                    let base_opt = self.history[week].opt(sample_day, shift, skill);
                    let min = perturb(&mut self.rng, base_min);
                    let opt = perturb(&mut self.rng, base_opt).max(min);
                    demand.set_min(day, shift, skill, min);
                    demand.set_opt(day, shift, skill, opt);
                }
            }
        }
        demand
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> Vec<Demand> {
        let mut week = Demand::zero(7, 2, 1);
        for day in 0..7 {
            week.set_min(day, 1, 0, 3);
            week.set_opt(day, 1, 0, 5);
        }
        vec![week]
    }

    #[test]
    fn test_generated_demand_stays_near_history() {
        let mut generator = HistoryDemandGenerator::new(history(), 7);
        let demand = generator.generate(14);
        assert_eq!(demand.nb_days(), 14);
        for day in 0..14 {
            let min = demand.min(day, 1, 0);
            let opt = demand.opt(day, 1, 0);
            assert!((2..=4).contains(&min), "min {min} out of range");
            assert!((4..=6).contains(&opt), "opt {opt} out of range");
            assert!(opt >= min);
        }
    }

    #[test]
    fn test_same_seed_same_demand() {
        let a = HistoryDemandGenerator::new(history(), 42).generate(7);
        let b = HistoryDemandGenerator::new(history(), 42).generate(7);
        for day in 0..7 {
            assert_eq!(a.min(day, 1, 0), b.min(day, 1, 0));
            assert_eq!(a.opt(day, 1, 0), b.opt(day, 1, 0));
        }
    }

    #[test]
    fn test_generate_many_yields_independent_demands() {
        let mut generator = HistoryDemandGenerator::new(history(), 11);
        let demands = generator.generate_many(3, 7);
        assert_eq!(demands.len(), 3);
        for demand in &demands {
            assert_eq!(demand.nb_days(), 7);
            for day in 0..7 {
                assert!(demand.opt(day, 1, 0) >= demand.min(day, 1, 0));
            }
        }
    }

    #[test]
    fn test_opt_never_below_min() {
        let mut week = Demand::zero(7, 2, 1);
        for day in 0..7 {
            week.set_min(day, 1, 0, 1);
            week.set_opt(day, 1, 0, 1);
        }
        let mut generator = HistoryDemandGenerator::new(vec![week], 3);
        let demand = generator.generate(28);
        for day in 0..28 {
            assert!(demand.opt(day, 1, 0) >= demand.min(day, 1, 0));
        }
    }
}
