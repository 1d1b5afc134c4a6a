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

//! Coverage demand over the planning horizon, indexed as
//! `[day][shift][skill]`. Minimum demand is a hard floor, optimal
//! demand is the soft target priced in the objective.

use crate::common::{DayIndex, ShiftIndex, SkillIndex, REST_SHIFT};
use crate::problem::err::DemandShapeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Demand {
    min: Vec<Vec<Vec<u32>>>,
    opt: Vec<Vec<Vec<u32>>>,
}

impl Demand {
    /// An all-zero demand of the given shape.
    pub fn zero(nb_days: usize, nb_shifts: usize, nb_skills: usize) -> Self {
        Self {
            min: vec![vec![vec![0; nb_skills]; nb_shifts]; nb_days],
            opt: vec![vec![vec![0; nb_skills]; nb_shifts]; nb_days],
        }
    }

    pub fn new(min: Vec<Vec<Vec<u32>>>, opt: Vec<Vec<Vec<u32>>>) -> Self {
        debug_assert_eq!(min.len(), opt.len());
        Self { min, opt }
    }

    #[inline]
    pub fn nb_days(&self) -> usize {
        self.min.len()
    }

    #[inline]
    pub fn nb_shifts(&self) -> usize {
        self.min.first().map_or(0, |d| d.len())
    }

    #[inline]
    pub fn nb_skills(&self) -> usize {
        self.min
            .first()
            .and_then(|d| d.first())
            .map_or(0, |s| s.len())
    }

    #[inline]
    pub fn min(&self, day: DayIndex, shift: ShiftIndex, skill: SkillIndex) -> u32 {
        self.min[day][shift][skill]
    }

    #[inline]
    pub fn opt(&self, day: DayIndex, shift: ShiftIndex, skill: SkillIndex) -> u32 {
        self.opt[day][shift][skill]
    }

    pub fn set_min(&mut self, day: DayIndex, shift: ShiftIndex, skill: SkillIndex, value: u32) {
        debug_assert_ne!(shift, REST_SHIFT);
        self.min[day][shift][skill] = value;
    }

    pub fn set_opt(&mut self, day: DayIndex, shift: ShiftIndex, skill: SkillIndex, value: u32) {
        debug_assert_ne!(shift, REST_SHIFT);
        self.opt[day][shift][skill] = value;
    }

    /// Total minimum coverage requested over all days, shifts and skills.
    pub fn total_min(&self) -> u64 {
        self.min
            .iter()
            .flatten()
            .flatten()
            .map(|&v| u64::from(v))
            .sum()
    }

    /// Extend this demand with the days of `other`, which must have the
    /// same per-day shape.
    pub fn append(&mut self, other: &Demand) -> Result<(), DemandShapeError> {
        let left = (self.nb_shifts(), self.nb_skills());
        let right = (other.nb_shifts(), other.nb_skills());
        if self.nb_days() > 0 && other.nb_days() > 0 && left != right {
            return Err(DemandShapeError::new(left, right));
        }
        self.min.extend(other.min.iter().cloned());
        self.opt.extend(other.opt.iter().cloned());
        Ok(())
    }

    /// A copy restricted to the day range `[from, from + nb_days)`.
    pub fn sub_demand(&self, from: DayIndex, nb_days: usize) -> Demand {
        let to = (from + nb_days).min(self.nb_days());
        Demand {
            min: self.min[from..to].to_vec(),
            opt: self.opt[from..to].to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demand(nb_days: usize) -> Demand {
        let mut d = Demand::zero(nb_days, 3, 2);
        for day in 0..nb_days {
            d.set_min(day, 1, 0, 1);
            d.set_opt(day, 1, 0, 2);
        }
        d
    }

    #[test]
    fn test_append_extends_days() {
        let mut d = demand(7);
        d.append(&demand(7)).unwrap();
        assert_eq!(d.nb_days(), 14);
        assert_eq!(d.min(10, 1, 0), 1);
        assert_eq!(d.opt(10, 1, 0), 2);
    }

    #[test]
    fn test_append_rejects_shape_mismatch() {
        let mut d = demand(7);
        let other = Demand::zero(7, 4, 2);
        let err = d.append(&other).unwrap_err();
        assert_eq!(err.left(), (3, 2));
        assert_eq!(err.right(), (4, 2));
        assert_eq!(d.nb_days(), 7);
    }

    #[test]
    fn test_sub_demand_clamps_to_horizon() {
        let d = demand(10);
        let sub = d.sub_demand(7, 7);
        assert_eq!(sub.nb_days(), 3);
        assert_eq!(sub.min(0, 1, 0), 1);
    }

    #[test]
    fn test_total_min() {
        let d = demand(7);
        assert_eq!(d.total_min(), 7);
    }
}
