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

//! Per-nurse shift-off wishes. Granting a wish is free; working a
//! wished-off assignment is penalized in the objective.

use crate::common::{DayIndex, ShiftIndex, REST_SHIFT};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    wishes_off: Vec<BTreeMap<DayIndex, BTreeSet<ShiftIndex>>>,
}

impl Preferences {
    /// Empty wish list for `nb_nurses` nurses.
    pub fn none(nb_nurses: usize) -> Self {
        Self {
            wishes_off: vec![BTreeMap::new(); nb_nurses],
        }
    }

    #[inline]
    pub fn nb_nurses(&self) -> usize {
        self.wishes_off.len()
    }

    /// Record that `nurse` wishes not to work `shift` on `day`.
    pub fn add_shift_off(&mut self, nurse: usize, day: DayIndex, shift: ShiftIndex) {
        debug_assert_ne!(shift, REST_SHIFT);
        self.wishes_off[nurse].entry(day).or_default().insert(shift);
    }

    /// Record that `nurse` wishes not to work at all on `day`;
    /// `nb_shifts` is the scenario shift count including rest.
    pub fn add_day_off(&mut self, nurse: usize, day: DayIndex, nb_shifts: usize) {
        let set = self.wishes_off[nurse].entry(day).or_default();
        for shift in 1..nb_shifts {
            set.insert(shift);
        }
    }

    /// True when working `shift` on `day` violates a wish of `nurse`.
    #[inline]
    pub fn wants_shift_off(&self, nurse: usize, day: DayIndex, shift: ShiftIndex) -> bool {
        shift != REST_SHIFT
            && self.wishes_off[nurse]
                .get(&day)
                .is_some_and(|set| set.contains(&shift))
    }

    /// Number of wished-off (day, shift) pairs of `nurse`.
    pub fn nb_wishes(&self, nurse: usize) -> usize {
        self.wishes_off[nurse].values().map(BTreeSet::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_off_wish() {
        let mut p = Preferences::none(2);
        p.add_shift_off(0, 3, 2);
        assert!(p.wants_shift_off(0, 3, 2));
        assert!(!p.wants_shift_off(0, 3, 1));
        assert!(!p.wants_shift_off(1, 3, 2));
        assert!(!p.wants_shift_off(0, 4, 2));
    }

    #[test]
    fn test_day_off_covers_all_worked_shifts() {
        let mut p = Preferences::none(1);
        p.add_day_off(0, 5, 4);
        for shift in 1..4 {
            assert!(p.wants_shift_off(0, 5, shift));
        }
        assert!(!p.wants_shift_off(0, 5, REST_SHIFT));
        assert_eq!(p.nb_wishes(0), 3);
    }
}
