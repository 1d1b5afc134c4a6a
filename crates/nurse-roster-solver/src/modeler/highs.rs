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

//! `good_lp` + HiGHS backend. The model is held symbolically and
//! materialized into a fresh `good_lp` problem on every solve, which
//! keeps incremental column additions cheap on our side and lets the
//! LP relaxation and the MILP share one description.

use good_lp::solvers::highs::highs;
use good_lp::solvers::{DualValues, SolutionWithDual};
use good_lp::*;
use nurse_roster_model::prelude::{Cost, SolverStatus};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::modeler::err::{BackendError, ModelerError};
use crate::modeler::{ConsId, ConstraintSense, LpSolution, MipSolution, Modeler, VarId, VarKind};

#[derive(Debug, Clone)]
struct VarDef {
    name: String,
    kind: VarKind,
    lb: Cost,
    ub: Cost,
    objective: Cost,
}

#[derive(Debug, Clone)]
struct ConsDef {
    #[allow(dead_code)]
    name: String,
    sense: ConstraintSense,
    rhs: Cost,
    // var -> coefficient; a map so repeated set_coeff replaces.
    terms: BTreeMap<VarId, Cost>,
}

#[derive(Debug, Default)]
pub struct HighsModeler {
    vars: Vec<VarDef>,
    cons: Vec<ConsDef>,
}

impl HighsModeler {
    pub fn new() -> Self {
        Self::default()
    }

    fn solve_materialized(
        &self,
        relax: bool,
        time_limit: Option<Duration>,
    ) -> Result<Option<(Cost, Vec<Cost>, Vec<Cost>, SolverStatus)>, ModelerError> {
        let mut vars = variables!();
        let handles: Vec<Variable> = self
            .vars
            .iter()
            .map(|def| {
                let mut v = variable().min(def.lb).name(def.name.clone());
                if def.ub.is_finite() {
                    v = v.max(def.ub);
                }
                if !relax && def.kind == VarKind::Integer {
                    v = v.integer();
                }
                vars.add(v)
            })
            .collect();

        let objective = self
            .vars
            .iter()
            .enumerate()
            .filter(|(_, def)| def.objective != 0.0)
            .fold(Expression::from(0.0), |acc, (i, def)| {
                acc + def.objective * handles[i]
            });

        let mut prob = vars.minimise(objective).using(highs);
        if let Some(limit) = time_limit {
            prob = prob.with_time_limit(limit.as_secs_f64());
        }

        let refs: Vec<constraint::ConstraintReference> = self
            .cons
            .iter()
            .map(|c| {
                let expr = c
                    .terms
                    .iter()
                    .fold(Expression::from(0.0), |acc, (&v, &coeff)| {
                        acc + coeff * handles[v]
                    });
                match c.sense {
                    ConstraintSense::Leq => prob.add_constraint(expr.leq(c.rhs)),
                    ConstraintSense::Eq => prob.add_constraint(expr.eq(c.rhs)),
                    ConstraintSense::Geq => prob.add_constraint(expr.geq(c.rhs)),
                }
            })
            .collect();

        let started = Instant::now();
        match prob.solve() {
            Ok(mut sol) => {
                let values: Vec<Cost> = handles.iter().map(|&h| sol.value(h)).collect();
                let objective: Cost = self
                    .vars
                    .iter()
                    .zip(&values)
                    .map(|(def, &v)| def.objective * v)
                    .sum();
                let duals: Vec<Cost> = if relax {
                    let view = sol.compute_dual();
                    refs.iter().map(|r| view.dual(r.clone())).collect()
                } else {
                    Vec::new()
                };
                // good_lp reports no termination reason; treat a run
                // that used up its allowance as budget-bound.
                let status = match time_limit {
                    Some(limit) if started.elapsed() >= limit => SolverStatus::TimeLimit,
                    _ => SolverStatus::Optimal,
                };
                Ok(Some((objective, values, duals, status)))
            }
            Err(ResolutionError::Infeasible) => Ok(None),
            Err(other) => Err(BackendError::new(other.to_string()).into()),
        }
    }
}

impl Modeler for HighsModeler {
    fn add_var(
        &mut self,
        name: String,
        kind: VarKind,
        lb: Cost,
        ub: Cost,
        objective: Cost,
    ) -> VarId {
        self.vars.push(VarDef {
            name,
            kind,
            lb,
            ub,
            objective,
        });
        self.vars.len() - 1
    }

    fn add_cons(&mut self, name: String, sense: ConstraintSense, rhs: Cost) -> ConsId {
        self.cons.push(ConsDef {
            name,
            sense,
            rhs,
            terms: BTreeMap::new(),
        });
        self.cons.len() - 1
    }

    fn set_coeff(&mut self, cons: ConsId, var: VarId, coeff: Cost) {
        self.cons[cons].terms.insert(var, coeff);
    }

    fn set_rhs(&mut self, cons: ConsId, rhs: Cost) {
        self.cons[cons].rhs = rhs;
    }

    fn set_var_bounds(&mut self, var: VarId, lb: Cost, ub: Cost) {
        self.vars[var].lb = lb;
        self.vars[var].ub = ub;
    }

    fn nb_vars(&self) -> usize {
        self.vars.len()
    }

    fn nb_cons(&self) -> usize {
        self.cons.len()
    }

    fn reset(&mut self) {
        self.vars.clear();
        self.cons.clear();
    }

    fn solve_lp(&mut self, time_limit: Option<Duration>) -> Result<LpSolution, ModelerError> {
        match self.solve_materialized(true, time_limit)? {
            Some((objective, values, duals, status)) => Ok(LpSolution {
                status,
                objective,
                values,
                duals,
            }),
            None => Ok(LpSolution::infeasible()),
        }
    }

    fn solve_mip(&mut self, time_limit: Option<Duration>) -> Result<MipSolution, ModelerError> {
        match self.solve_materialized(false, time_limit)? {
            Some((objective, values, _, status)) => Ok(MipSolution {
                status,
                objective,
                values,
            }),
            None => Ok(MipSolution::infeasible()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // min x + 2y  s.t.  x + y >= 3, x <= 2, y <= 4
    fn small_model() -> HighsModeler {
        let mut m = HighsModeler::new();
        let x = m.add_var("x".into(), VarKind::Continuous, 0.0, 2.0, 1.0);
        let y = m.add_var("y".into(), VarKind::Continuous, 0.0, 4.0, 2.0);
        let c = m.add_cons("cover".into(), ConstraintSense::Geq, 3.0);
        m.set_coeff(c, x, 1.0);
        m.set_coeff(c, y, 1.0);
        m
    }

    #[test]
    fn test_lp_solve_with_duals() {
        let mut m = small_model();
        let sol = m.solve_lp(None).unwrap();
        assert_eq!(sol.status, SolverStatus::Optimal);
        assert!((sol.objective - 4.0).abs() < 1e-6);
        assert!((sol.values[0] - 2.0).abs() < 1e-6);
        assert!((sol.values[1] - 1.0).abs() < 1e-6);
        // The covering row is binding with the dual of y's cost.
        assert!((sol.duals[0] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_mip_respects_integrality() {
        let mut m = HighsModeler::new();
        let x = m.add_var("x".into(), VarKind::Integer, 0.0, 10.0, 1.0);
        let c = m.add_cons("half".into(), ConstraintSense::Geq, 2.5);
        m.set_coeff(c, x, 1.0);
        let sol = m.solve_mip(None).unwrap();
        assert!((sol.values[0] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_infeasible_is_a_status_not_an_error() {
        let mut m = HighsModeler::new();
        let x = m.add_var("x".into(), VarKind::Continuous, 0.0, 1.0, 1.0);
        let c = m.add_cons("too-much".into(), ConstraintSense::Geq, 5.0);
        m.set_coeff(c, x, 1.0);
        let sol = m.solve_lp(None).unwrap();
        assert_eq!(sol.status, SolverStatus::Infeasible);
    }

    #[test]
    fn test_set_coeff_replaces() {
        let mut m = small_model();
        m.set_coeff(0, 0, 10.0);
        let sol = m.solve_lp(None).unwrap();
        // x alone now covers the row: 10x >= 3 with x cheapest.
        assert!(sol.values[0] < 1.0);
    }
}
