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

//! Data model for the nurse rostering solver: problem-side entities
//! (scenario, demand, preferences) and solution-side entities (rosters,
//! per-day nurse states, schedules).

pub mod common;
pub mod problem;
pub mod solution;

pub mod prelude {
    pub use crate::common::*;
    pub use crate::problem::demand::Demand;
    pub use crate::problem::preferences::Preferences;
    pub use crate::problem::scenario::{
        Contract, Nurse, Position, Scenario, ScenarioBuilder, ShiftType,
    };
    pub use crate::solution::live_nurse::{live_nurses_from, LiveNurse};
    pub use crate::solution::roster::{Assignment, Roster};
    pub use crate::solution::state::NurseState;
    pub use crate::solution::{Schedule, SolverStatus};
}
