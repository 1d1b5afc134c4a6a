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

use nurse_roster_model::problem::err::DemandShapeError;

use crate::modeler::err::ModelerError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MasterError {
    /// The demand's per-day shape does not match the scenario.
    DemandShape(DemandShapeError),
    /// The LP/MILP backend failed.
    Modeler(ModelerError),
}

impl std::fmt::Display for MasterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MasterError::DemandShape(e) => write!(f, "{e}"),
            MasterError::Modeler(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for MasterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MasterError::DemandShape(e) => Some(e),
            MasterError::Modeler(e) => Some(e),
        }
    }
}

impl From<DemandShapeError> for MasterError {
    fn from(value: DemandShapeError) -> Self {
        MasterError::DemandShape(value)
    }
}

impl From<ModelerError> for MasterError {
    fn from(value: ModelerError) -> Self {
        MasterError::Modeler(value)
    }
}
