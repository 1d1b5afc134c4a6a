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

use crate::common::NurseId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnknownContractError {
    nurse: NurseId,
    contract: usize,
}

impl UnknownContractError {
    pub fn new(nurse: NurseId, contract: usize) -> Self {
        Self { nurse, contract }
    }

    pub fn nurse(&self) -> NurseId {
        self.nurse
    }

    pub fn contract(&self) -> usize {
        self.contract
    }
}

impl std::fmt::Display for UnknownContractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Nurse {} references unknown contract {}",
            self.nurse, self.contract
        )
    }
}

impl std::error::Error for UnknownContractError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnknownSkillError {
    nurse: NurseId,
    skill: usize,
}

impl UnknownSkillError {
    pub fn new(nurse: NurseId, skill: usize) -> Self {
        Self { nurse, skill }
    }

    pub fn nurse(&self) -> NurseId {
        self.nurse
    }

    pub fn skill(&self) -> usize {
        self.skill
    }
}

impl std::fmt::Display for UnknownSkillError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Nurse {} references unknown skill {}",
            self.nurse, self.skill
        )
    }
}

impl std::error::Error for UnknownSkillError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InvalidContractBoundsError {
    contract: String,
}

impl InvalidContractBoundsError {
    pub fn new(contract: impl Into<String>) -> Self {
        Self {
            contract: contract.into(),
        }
    }

    pub fn contract(&self) -> &str {
        &self.contract
    }
}

impl std::fmt::Display for InvalidContractBoundsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Contract '{}' has a minimum bound above its maximum",
            self.contract
        )
    }
}

impl std::error::Error for InvalidContractBoundsError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmptyScenarioError;

impl std::fmt::Display for EmptyScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "A scenario needs at least one worked shift and one nurse")
    }
}

impl std::error::Error for EmptyScenarioError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScenarioError {
    Empty(EmptyScenarioError),
    UnknownContract(UnknownContractError),
    UnknownSkill(UnknownSkillError),
    InvalidContractBounds(InvalidContractBoundsError),
}

impl std::fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioError::Empty(e) => write!(f, "{}", e),
            ScenarioError::UnknownContract(e) => write!(f, "{}", e),
            ScenarioError::UnknownSkill(e) => write!(f, "{}", e),
            ScenarioError::InvalidContractBounds(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ScenarioError {}

impl From<EmptyScenarioError> for ScenarioError {
    #[inline]
    fn from(e: EmptyScenarioError) -> Self {
        ScenarioError::Empty(e)
    }
}

impl From<UnknownContractError> for ScenarioError {
    #[inline]
    fn from(e: UnknownContractError) -> Self {
        ScenarioError::UnknownContract(e)
    }
}

impl From<UnknownSkillError> for ScenarioError {
    #[inline]
    fn from(e: UnknownSkillError) -> Self {
        ScenarioError::UnknownSkill(e)
    }
}

impl From<InvalidContractBoundsError> for ScenarioError {
    #[inline]
    fn from(e: InvalidContractBoundsError) -> Self {
        ScenarioError::InvalidContractBounds(e)
    }
}

/// Two demands whose (shift, skill) grids disagree cannot be combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DemandShapeError {
    left: (usize, usize),
    right: (usize, usize),
}

impl DemandShapeError {
    pub fn new(left: (usize, usize), right: (usize, usize)) -> Self {
        Self { left, right }
    }

    pub fn left(&self) -> (usize, usize) {
        self.left
    }

    pub fn right(&self) -> (usize, usize) {
        self.right
    }
}

impl std::fmt::Display for DemandShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Demand shapes differ: {}x{} shifts/skills vs {}x{}",
            self.left.0, self.left.1, self.right.0, self.right.1
        )
    }
}

impl std::error::Error for DemandShapeError {}
