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

//! Shared primitives: cost type, index aliases, the nurse identifier,
//! weekday arithmetic and the soft-constraint weights.

/// Objective costs are weighted penalty sums.
pub type Cost = f64;

pub type DayIndex = usize;
pub type ShiftIndex = usize;
pub type SkillIndex = usize;

/// Shift 0 is the rest "shift" everywhere; worked shifts are `1..nb_shifts`.
pub const REST_SHIFT: ShiftIndex = 0;

// Soft-constraint weights (INRC-II rule book).
pub const WEIGHT_OPTIMAL_DEMAND: Cost = 30.0;
pub const WEIGHT_CONS_SHIFTS: Cost = 15.0;
pub const WEIGHT_CONS_DAYS_WORK: Cost = 30.0;
pub const WEIGHT_CONS_DAYS_OFF: Cost = 30.0;
pub const WEIGHT_PREFERENCES: Cost = 10.0;
pub const WEIGHT_COMPLETE_WEEKEND: Cost = 30.0;
pub const WEIGHT_TOTAL_SHIFTS: Cost = 20.0;
pub const WEIGHT_TOTAL_WEEKENDS: Cost = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NurseId(usize);

impl NurseId {
    #[inline]
    pub fn new(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NurseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "N{}", self.0)
    }
}

// The horizon starts on a Monday, so the weekend of week `w` is made of
// days `7w + 5` (Saturday) and `7w + 6` (Sunday).

#[inline]
pub fn is_saturday(day: DayIndex) -> bool {
    day % 7 == 5
}

#[inline]
pub fn is_sunday(day: DayIndex) -> bool {
    day % 7 == 6
}

#[inline]
pub fn is_weekend(day: DayIndex) -> bool {
    is_saturday(day) || is_sunday(day)
}

/// Index of the weekend the day belongs to (`day / 7`, valid for any day).
#[inline]
pub fn weekend_index(day: DayIndex) -> usize {
    day / 7
}

/// Number of weekends that intersect the horizon `[0, nb_days)`.
#[inline]
pub fn nb_weekends_in(nb_days: usize) -> usize {
    if nb_days <= 5 {
        0
    } else {
        (nb_days - 5).div_ceil(7)
    }
}
