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

use crate::common::{DayIndex, ShiftIndex, SkillIndex, REST_SHIFT};
use serde::Serialize;

/// What one nurse does on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Assignment {
    Rest,
    Work { shift: ShiftIndex, skill: SkillIndex },
}

impl Assignment {
    #[inline]
    pub fn is_work(self) -> bool {
        matches!(self, Assignment::Work { .. })
    }

    /// The shift index worked, with rest encoded as shift 0.
    #[inline]
    pub fn shift(self) -> ShiftIndex {
        match self {
            Assignment::Rest => REST_SHIFT,
            Assignment::Work { shift, .. } => shift,
        }
    }

    #[inline]
    pub fn skill(self) -> Option<SkillIndex> {
        match self {
            Assignment::Rest => None,
            Assignment::Work { skill, .. } => Some(skill),
        }
    }
}

/// One nurse's assignments over the planning horizon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Roster {
    days: Vec<Assignment>,
}

impl Roster {
    /// An all-rest roster over `nb_days` days.
    pub fn rest(nb_days: usize) -> Self {
        Self {
            days: vec![Assignment::Rest; nb_days],
        }
    }

    pub fn from_days(days: Vec<Assignment>) -> Self {
        Self { days }
    }

    #[inline]
    pub fn nb_days(&self) -> usize {
        self.days.len()
    }

    #[inline]
    pub fn day(&self, day: DayIndex) -> Assignment {
        self.days[day]
    }

    #[inline]
    pub fn days(&self) -> &[Assignment] {
        &self.days
    }

    pub fn set_day(&mut self, day: DayIndex, assignment: Assignment) {
        self.days[day] = assignment;
    }

    /// Number of worked days.
    pub fn nb_worked(&self) -> usize {
        self.days.iter().filter(|a| a.is_work()).count()
    }

    /// A copy restricted to the first `nb_days` days.
    pub fn truncated(&self, nb_days: usize) -> Roster {
        Roster {
            days: self.days[..nb_days.min(self.days.len())].to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_shift_encoding() {
        assert_eq!(Assignment::Rest.shift(), REST_SHIFT);
        let work = Assignment::Work { shift: 2, skill: 1 };
        assert_eq!(work.shift(), 2);
        assert_eq!(work.skill(), Some(1));
        assert_eq!(Assignment::Rest.skill(), None);
    }

    #[test]
    fn test_roster_counts_worked_days() {
        let mut r = Roster::rest(7);
        r.set_day(0, Assignment::Work { shift: 1, skill: 0 });
        r.set_day(3, Assignment::Work { shift: 2, skill: 0 });
        assert_eq!(r.nb_worked(), 2);
        assert_eq!(r.truncated(2).nb_worked(), 1);
    }
}
