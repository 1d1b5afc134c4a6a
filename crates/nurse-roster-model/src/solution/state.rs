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

//! The counters a nurse carries across day boundaries. These are what
//! make weeks couple: the state at the end of one week is the initial
//! state of the next.

use crate::common::{is_saturday, is_sunday, DayIndex, ShiftIndex, REST_SHIFT};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NurseState {
    /// Shift worked on the most recent day, rest encoded as shift 0.
    pub shift: ShiftIndex,
    /// Length of the current run of `shift` (zero after a rest day).
    pub cons_shifts: usize,
    pub cons_days_worked: usize,
    pub cons_days_off: usize,
    pub total_shifts: usize,
    pub total_weekends: usize,
}

impl NurseState {
    /// A fresh state with an ongoing rest of `cons_days_off` days.
    pub fn resting(cons_days_off: usize) -> Self {
        Self {
            cons_days_off,
            ..Default::default()
        }
    }

    #[inline]
    pub fn is_working(&self) -> bool {
        self.shift != REST_SHIFT
    }

    /// Advance the state by one day on which `shift` is worked (or
    /// `REST_SHIFT`). `day` is the absolute day index, used to count
    /// worked weekends: a weekend counts once, on its Saturday, or on
    /// its Sunday when the Saturday was rested.
    pub fn update(&mut self, day: DayIndex, shift: ShiftIndex) {
        let prev = self.shift;
        if shift == REST_SHIFT {
            self.cons_days_off = if prev == REST_SHIFT {
                self.cons_days_off + 1
            } else {
                1
            };
            self.cons_days_worked = 0;
            self.cons_shifts = 0;
        } else {
            self.total_shifts += 1;
            self.cons_days_worked = if prev == REST_SHIFT {
                1
            } else {
                self.cons_days_worked + 1
            };
            self.cons_shifts = if shift == prev { self.cons_shifts + 1 } else { 1 };
            self.cons_days_off = 0;
            if is_saturday(day) || (is_sunday(day) && prev == REST_SHIFT) {
                self.total_weekends += 1;
            }
        }
        self.shift = shift;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consecutive_counters() {
        let mut s = NurseState::resting(2);
        s.update(0, 1);
        assert_eq!((s.cons_shifts, s.cons_days_worked, s.cons_days_off), (1, 1, 0));
        s.update(1, 1);
        assert_eq!(s.cons_shifts, 2);
        s.update(2, 2);
        assert_eq!((s.cons_shifts, s.cons_days_worked), (1, 3));
        s.update(3, REST_SHIFT);
        assert_eq!((s.cons_shifts, s.cons_days_worked, s.cons_days_off), (0, 0, 1));
        s.update(4, REST_SHIFT);
        assert_eq!(s.cons_days_off, 2);
        assert_eq!(s.total_shifts, 3);
    }

    #[test]
    fn test_weekend_counted_once() {
        // Work Saturday and Sunday of the first week; one weekend.
        let mut s = NurseState::default();
        s.update(5, 1);
        s.update(6, 1);
        assert_eq!(s.total_weekends, 1);
    }

    #[test]
    fn test_sunday_only_weekend_counts() {
        let mut s = NurseState::default();
        s.update(5, REST_SHIFT);
        s.update(6, 1);
        assert_eq!(s.total_weekends, 1);
    }

    #[test]
    fn test_weekday_work_counts_no_weekend() {
        let mut s = NurseState::default();
        for day in 0..5 {
            s.update(day, 1);
        }
        assert_eq!(s.total_weekends, 0);
        assert_eq!(s.cons_days_worked, 5);
    }
}
