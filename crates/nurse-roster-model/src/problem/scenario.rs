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

//! The static problem description: shift types, skills, contracts,
//! positions and nurses, together with the multi-week planning context.

use crate::common::{NurseId, ShiftIndex, SkillIndex, REST_SHIFT};
use crate::problem::err::{
    EmptyScenarioError, InvalidContractBoundsError, ScenarioError, UnknownContractError,
    UnknownSkillError,
};
use std::collections::BTreeSet;

/// A worked shift type with its consecutive-assignment bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftType {
    name: String,
    min_cons: usize,
    max_cons: usize,
}

impl ShiftType {
    pub fn new(name: impl Into<String>, min_cons: usize, max_cons: usize) -> Self {
        Self {
            name: name.into(),
            min_cons,
            max_cons,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn min_cons(&self) -> usize {
        self.min_cons
    }

    #[inline]
    pub fn max_cons(&self) -> usize {
        self.max_cons
    }
}

/// Labor rules attached to a group of nurses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    name: String,
    pub min_total_shifts: usize,
    pub max_total_shifts: usize,
    pub min_cons_days_work: usize,
    pub max_cons_days_work: usize,
    pub min_cons_days_off: usize,
    pub max_worked_weekends: usize,
    pub complete_weekends: bool,
}

impl Contract {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        min_total_shifts: usize,
        max_total_shifts: usize,
        min_cons_days_work: usize,
        max_cons_days_work: usize,
        min_cons_days_off: usize,
        max_worked_weekends: usize,
        complete_weekends: bool,
    ) -> Self {
        Self {
            name: name.into(),
            min_total_shifts,
            max_total_shifts,
            min_cons_days_work,
            max_cons_days_work,
            min_cons_days_off,
            max_worked_weekends,
            complete_weekends,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A set of interchangeable skills; nurses sharing a skill set share a
/// position. The rank counts positions whose skill set is strictly
/// contained in this one, so more versatile positions rank higher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    skills: BTreeSet<SkillIndex>,
    rank: usize,
}

impl Position {
    #[inline]
    pub fn skills(&self) -> &BTreeSet<SkillIndex> {
        &self.skills
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    #[inline]
    pub fn covers_skill(&self, skill: SkillIndex) -> bool {
        self.skills.contains(&skill)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nurse {
    id: NurseId,
    name: String,
    contract: usize,
    position: usize,
    skills: Vec<SkillIndex>,
}

impl Nurse {
    #[inline]
    pub fn id(&self) -> NurseId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn contract_index(&self) -> usize {
        self.contract
    }

    #[inline]
    pub fn position_index(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn skills(&self) -> &[SkillIndex] {
        &self.skills
    }

    #[inline]
    pub fn has_skill(&self, skill: SkillIndex) -> bool {
        self.skills.contains(&skill)
    }
}

#[derive(Debug, Clone)]
pub struct Scenario {
    shifts: Vec<ShiftType>,
    skills: Vec<String>,
    contracts: Vec<Contract>,
    positions: Vec<Position>,
    nurses: Vec<Nurse>,
    nb_weeks: usize,
    this_week: usize,
}

impl Scenario {
    #[inline]
    pub fn nb_shifts(&self) -> usize {
        self.shifts.len()
    }

    #[inline]
    pub fn nb_skills(&self) -> usize {
        self.skills.len()
    }

    #[inline]
    pub fn nb_nurses(&self) -> usize {
        self.nurses.len()
    }

    #[inline]
    pub fn nb_positions(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn nb_weeks(&self) -> usize {
        self.nb_weeks
    }

    #[inline]
    pub fn this_week(&self) -> usize {
        self.this_week
    }

    /// True when the week under planning is the last of the horizon.
    #[inline]
    pub fn is_last_week(&self) -> bool {
        self.this_week + 1 >= self.nb_weeks
    }

    #[inline]
    pub fn shift(&self, s: ShiftIndex) -> &ShiftType {
        &self.shifts[s]
    }

    #[inline]
    pub fn shifts(&self) -> &[ShiftType] {
        &self.shifts
    }

    /// Minimum consecutive assignments of shift `s`; zero for rest.
    #[inline]
    pub fn min_cons_shifts(&self, s: ShiftIndex) -> usize {
        if s == REST_SHIFT {
            0
        } else {
            self.shifts[s].min_cons
        }
    }

    /// Maximum consecutive assignments of shift `s`; unbounded for rest.
    #[inline]
    pub fn max_cons_shifts(&self, s: ShiftIndex) -> usize {
        if s == REST_SHIFT {
            usize::MAX
        } else {
            self.shifts[s].max_cons
        }
    }

    #[inline]
    pub fn skill_name(&self, skill: SkillIndex) -> &str {
        &self.skills[skill]
    }

    #[inline]
    pub fn contract(&self, c: usize) -> &Contract {
        &self.contracts[c]
    }

    #[inline]
    pub fn nb_contracts(&self) -> usize {
        self.contracts.len()
    }

    #[inline]
    pub fn position(&self, p: usize) -> &Position {
        &self.positions[p]
    }

    #[inline]
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    #[inline]
    pub fn nurse(&self, n: usize) -> &Nurse {
        &self.nurses[n]
    }

    #[inline]
    pub fn nurses(&self) -> &[Nurse] {
        &self.nurses
    }

    #[inline]
    pub fn contract_of(&self, nurse: usize) -> &Contract {
        &self.contracts[self.nurses[nurse].contract]
    }

    pub fn nurses_of_position(&self, position: usize) -> impl Iterator<Item = &Nurse> {
        self.nurses
            .iter()
            .filter(move |n| n.position == position)
    }

    /// Move the planning context one week forward (demand extension).
    pub fn with_week(&self, this_week: usize) -> Scenario {
        let mut s = self.clone();
        s.this_week = this_week;
        s
    }
}

/// Validating builder; positions are derived from the distinct nurse
/// skill sets at `build` time.
#[derive(Debug, Default)]
pub struct ScenarioBuilder {
    shifts: Vec<ShiftType>,
    skills: Vec<String>,
    contracts: Vec<Contract>,
    nurses: Vec<(String, usize, Vec<SkillIndex>)>,
    nb_weeks: usize,
    this_week: usize,
}

impl ScenarioBuilder {
    pub fn new() -> Self {
        Self {
            nb_weeks: 1,
            ..Default::default()
        }
    }

    pub fn weeks(mut self, nb_weeks: usize, this_week: usize) -> Self {
        self.nb_weeks = nb_weeks.max(1);
        self.this_week = this_week;
        self
    }

    pub fn shift(mut self, name: impl Into<String>, min_cons: usize, max_cons: usize) -> Self {
        self.shifts.push(ShiftType::new(name, min_cons, max_cons));
        self
    }

    pub fn skill(mut self, name: impl Into<String>) -> Self {
        self.skills.push(name.into());
        self
    }

    pub fn contract(mut self, contract: Contract) -> Self {
        self.contracts.push(contract);
        self
    }

    pub fn nurse(
        mut self,
        name: impl Into<String>,
        contract: usize,
        skills: impl IntoIterator<Item = SkillIndex>,
    ) -> Self {
        self.nurses
            .push((name.into(), contract, skills.into_iter().collect()));
        self
    }

    pub fn build(self) -> Result<Scenario, ScenarioError> {
        if self.shifts.is_empty() || self.nurses.is_empty() || self.skills.is_empty() {
            return Err(EmptyScenarioError.into());
        }

        for c in &self.contracts {
            if c.min_total_shifts > c.max_total_shifts
                || c.min_cons_days_work > c.max_cons_days_work
            {
                return Err(InvalidContractBoundsError::new(c.name.clone()).into());
            }
        }

        // Rest is always shift 0.
        let mut shifts = Vec::with_capacity(self.shifts.len() + 1);
        shifts.push(ShiftType::new("Rest", 0, usize::MAX));
        shifts.extend(self.shifts);

        // Derive positions from the distinct skill sets.
        let mut positions: Vec<BTreeSet<SkillIndex>> = Vec::new();
        let mut nurses = Vec::with_capacity(self.nurses.len());
        for (index, (name, contract, skills)) in self.nurses.into_iter().enumerate() {
            let id = NurseId::new(index);
            if contract >= self.contracts.len() {
                return Err(UnknownContractError::new(id, contract).into());
            }
            for &sk in &skills {
                if sk >= self.skills.len() {
                    return Err(UnknownSkillError::new(id, sk).into());
                }
            }
            let set: BTreeSet<SkillIndex> = skills.iter().copied().collect();
            let position = match positions.iter().position(|p| *p == set) {
                Some(p) => p,
                None => {
                    positions.push(set);
                    positions.len() - 1
                }
            };
            nurses.push(Nurse {
                id,
                name,
                contract,
                position,
                skills,
            });
        }

        let ranked: Vec<Position> = positions
            .iter()
            .map(|set| {
                let rank = positions
                    .iter()
                    .filter(|other| other.len() < set.len() && other.is_subset(set))
                    .count();
                Position {
                    skills: set.clone(),
                    rank,
                }
            })
            .collect();

        Ok(Scenario {
            shifts,
            skills: self.skills,
            contracts: self.contracts,
            positions: ranked,
            nurses,
            nb_weeks: self.nb_weeks,
            this_week: self.this_week,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract() -> Contract {
        Contract::new("full-time", 0, 20, 1, 5, 1, 2, false)
    }

    fn scenario() -> Scenario {
        ScenarioBuilder::new()
            .shift("Early", 1, 3)
            .shift("Late", 1, 3)
            .skill("Nurse")
            .skill("HeadNurse")
            .contract(contract())
            .nurse("A", 0, [0])
            .nurse("B", 0, [0, 1])
            .nurse("C", 0, [0])
            .build()
            .unwrap()
    }

    #[test]
    fn test_rest_shift_is_prepended() {
        let s = scenario();
        assert_eq!(s.nb_shifts(), 3);
        assert_eq!(s.shift(REST_SHIFT).name(), "Rest");
        assert_eq!(s.min_cons_shifts(REST_SHIFT), 0);
        assert_eq!(s.max_cons_shifts(REST_SHIFT), usize::MAX);
        assert_eq!(s.max_cons_shifts(1), 3);
    }

    #[test]
    fn test_positions_group_identical_skill_sets() {
        let s = scenario();
        assert_eq!(s.nb_positions(), 2);
        assert_eq!(
            s.nurse(0).position_index(),
            s.nurse(2).position_index()
        );
        assert_ne!(
            s.nurse(0).position_index(),
            s.nurse(1).position_index()
        );
    }

    #[test]
    fn test_position_rank_counts_contained_sets() {
        let s = scenario();
        let single = s.position(s.nurse(0).position_index());
        let double = s.position(s.nurse(1).position_index());
        assert_eq!(single.rank(), 0);
        assert_eq!(double.rank(), 1);
    }

    #[test]
    fn test_unknown_contract_is_rejected() {
        let err = ScenarioBuilder::new()
            .shift("Early", 1, 3)
            .skill("Nurse")
            .contract(contract())
            .nurse("A", 7, [0])
            .build()
            .unwrap_err();
        match err {
            ScenarioError::UnknownContract(e) => assert_eq!(e.contract(), 7),
            other => panic!("expected UnknownContract, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_skill_is_rejected() {
        let err = ScenarioBuilder::new()
            .shift("Early", 1, 3)
            .skill("Nurse")
            .contract(contract())
            .nurse("A", 0, [4])
            .build()
            .unwrap_err();
        match err {
            ScenarioError::UnknownSkill(e) => assert_eq!(e.skill(), 4),
            other => panic!("expected UnknownSkill, got {other:?}"),
        }
    }

    #[test]
    fn test_inverted_contract_bounds_are_rejected() {
        let bad = Contract::new("bad", 10, 5, 1, 5, 1, 2, false);
        let err = ScenarioBuilder::new()
            .shift("Early", 1, 3)
            .skill("Nurse")
            .contract(bad)
            .nurse("A", 0, [0])
            .build()
            .unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidContractBounds(_)));
    }
}
