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

use chrono::{DateTime, Utc};
use nurse_roster_model::prelude::*;
use nurse_roster_solver::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT | FmtSpan::CLOSE)
        .init();
}

#[derive(Serialize)]
struct RunRecord {
    week: usize,
    start_ts: DateTime<Utc>,
    end_ts: DateTime<Utc>,
    runtime_ms: u128,
    cost: Option<f64>,
    report: WeekReport,
}

const NB_WEEKS: usize = 4;

/// A small ward: two shift types, two skills, a full-time and a
/// part-time contract, eight nurses.
fn build_scenario(this_week: usize) -> Scenario {
    ScenarioBuilder::new()
        .weeks(NB_WEEKS, this_week)
        .shift("Early", 2, 5)
        .shift("Late", 2, 4)
        .skill("HeadNurse")
        .skill("Nurse")
        .contract(Contract::new("full-time", 10, 22, 2, 5, 2, 3, true))
        .contract(Contract::new("part-time", 5, 14, 2, 4, 2, 2, false))
        .nurse("Patrick", 0, [0, 1])
        .nurse("Andrea", 0, [0, 1])
        .nurse("Stefaan", 0, [1])
        .nurse("Sara", 0, [1])
        .nurse("Nguyen", 1, [1])
        .nurse("Martha", 1, [1])
        .nurse("Oliver", 0, [1])
        .nurse("Ines", 1, [0, 1])
        .build()
        .expect("scenario is valid")
}

/// Weekly demand with a lighter weekend.
fn build_week_demand(week: usize) -> Demand {
    let mut demand = Demand::zero(7, 3, 2);
    for day in 0..7 {
        let weekend = day % 7 >= 5;
        for shift in 1..3usize {
            let base = if weekend { 1 } else { 2 };
            demand.set_min(day, shift, 0, if shift == 1 { 1 } else { 0 });
            demand.set_opt(day, shift, 0, 1);
            demand.set_min(day, shift, 1, base);
            demand.set_opt(day, shift, 1, base + ((week + day + shift) % 2) as u32);
        }
    }
    demand
}

fn build_preferences(week: usize) -> Preferences {
    let mut preferences = Preferences::none(8);
    preferences.add_day_off(week % 8, (week + 2) % 7, 3);
    preferences.add_shift_off((week + 3) % 8, (week + 5) % 7, 1);
    preferences
}

fn main() {
    enable_tracing();

    let mut records: Vec<RunRecord> = Vec::new();
    let mut run_report = RunReport::default();
    let mut states = vec![NurseState::resting(2); 8];
    let mut history: Vec<Demand> = Vec::new();

    for week in 0..NB_WEEKS {
        let scenario = build_scenario(week);
        let demand = build_week_demand(week);
        let preferences = build_preferences(week);
        history.push(demand.clone());

        tracing::info!(
            "Solving week {} of {} with {} nurses",
            week + 1,
            NB_WEEKS,
            scenario.nb_nurses()
        );

        let start_ts = Utc::now();
        let t0 = Instant::now();

        let generator = HistoryDemandGenerator::new(history.clone(), 42 + week as u64);
        let options = StochasticOptions {
            max_candidates: 4,
            time_limit: Duration::from_secs(60),
            generation_time_limit: Duration::from_secs(10),
            evaluation_time_limit: Duration::from_secs(5),
            ..StochasticOptions::default()
        };
        let mut solver = StochasticSolver::new(
            scenario.clone(),
            demand,
            preferences,
            states.clone(),
            generator,
            options,
        );
        let schedule = solver.solve();

        let runtime = t0.elapsed();
        let end_ts = Utc::now();

        let cost = if schedule.status().has_solution() {
            tracing::info!(
                "Finished week {}: cost={}, runtime={:?}",
                week + 1,
                schedule.cost(),
                runtime
            );
            states = schedule.final_states().to_vec();
            Some(schedule.cost())
        } else {
            tracing::error!("Failed week {}: runtime={:?}", week + 1, runtime);
            None
        };

        let report = WeekReport::from_schedule(&scenario, week, &schedule);
        run_report.push(report.clone());
        records.push(RunRecord {
            week,
            start_ts,
            end_ts,
            runtime_ms: runtime.as_millis(),
            cost,
            report,
        });

        if cost.is_none() {
            break;
        }
    }

    tracing::info!(
        "Run finished: {} week(s) solved, total cost {}",
        run_report.weeks.len(),
        run_report.total_cost()
    );

    let out_path = PathBuf::from("roster_results.json");
    match File::create(&out_path).and_then(|mut f| {
        let json = serde_json::to_string_pretty(&records).expect("serialize results");
        f.write_all(json.as_bytes())
    }) {
        Ok(()) => {
            tracing::info!(
                "Wrote {} run record(s) to {}",
                records.len(),
                out_path.display()
            );
        }
        Err(e) => {
            tracing::error!("Failed to write results to {}: {}", out_path.display(), e);
        }
    }
}
