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

//! Serializable summaries of solved weeks, for dumping run results.

use nurse_roster_model::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct NurseReport {
    pub name: String,
    pub worked_days: usize,
    pub total_shifts: usize,
    pub total_weekends: usize,
    pub roster: Vec<Assignment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekReport {
    pub week: usize,
    pub status: SolverStatus,
    pub cost: Cost,
    pub nurses: Vec<NurseReport>,
}

impl WeekReport {
    pub fn from_schedule(scenario: &Scenario, week: usize, schedule: &Schedule) -> Self {
        let nurses = schedule
            .rosters()
            .iter()
            .zip(schedule.final_states())
            .enumerate()
            .map(|(index, (roster, state))| NurseReport {
                name: scenario.nurse(index).name().to_string(),
                worked_days: roster.nb_worked(),
                total_shifts: state.total_shifts,
                total_weekends: state.total_weekends,
                roster: roster.days().to_vec(),
            })
            .collect();
        Self {
            week,
            status: schedule.status(),
            cost: schedule.cost(),
            nurses,
        }
    }
}

/// The whole multi-week run, one entry per solved week.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub weeks: Vec<WeekReport>,
}

impl RunReport {
    pub fn push(&mut self, week: WeekReport) {
        self.weeks.push(week);
    }

    /// Sum of the week costs; infinite as soon as any week failed.
    pub fn total_cost(&self) -> Cost {
        self.weeks.iter().map(|w| w.cost).sum()
    }

    pub fn all_solved(&self) -> bool {
        self.weeks.iter().all(|w| w.status.has_solution())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Scenario {
        ScenarioBuilder::new()
            .weeks(1, 0)
            .shift("Day", 1, 7)
            .skill("Nurse")
            .contract(Contract::new("full-time", 0, 7, 1, 7, 1, 4, false))
            .nurse("A", 0, [0])
            .build()
            .unwrap()
    }

    #[test]
    fn test_week_report_counts_worked_days() {
        let mut roster = Roster::rest(7);
        roster.set_day(0, Assignment::Work { shift: 1, skill: 0 });
        roster.set_day(1, Assignment::Work { shift: 1, skill: 0 });
        let mut state = NurseState::resting(0);
        state.total_shifts = 2;
        let schedule = Schedule::new(vec![roster], vec![state], 60.0, SolverStatus::Optimal);
        let report = WeekReport::from_schedule(&scenario(), 0, &schedule);
        assert_eq!(report.nurses[0].worked_days, 2);
        assert_eq!(report.nurses[0].name, "A");
        assert_eq!(report.cost, 60.0);
    }

    #[test]
    fn test_run_report_totals_and_serializes() {
        let schedule = Schedule::new(Vec::new(), Vec::new(), 30.0, SolverStatus::Optimal);
        let mut run = RunReport::default();
        run.push(WeekReport::from_schedule(&scenario(), 0, &schedule));
        run.push(WeekReport::from_schedule(&scenario(), 1, &schedule));
        assert_eq!(run.total_cost(), 60.0);
        assert!(run.all_solved());
        let json = serde_json::to_string(&run).unwrap();
        assert!(json.contains("\"weeks\""));
    }
}
