//! Components are the building blocks of a model.
//!
//! A component reads a set of named series, computes its outputs over the whole
//! horizon in one go and reports the local derivative of each output with respect
//! to each series it depends on directly. Chaining these local derivatives into
//! total Jacobians is the job of [`crate::sensitivity::SensitivityGraph`].

use crate::errors::{RSForestError, RSForestResult};
use crate::timeseries::{FloatValue, Horizon, YearSeries};
use crate::timeseries_collection::TimeseriesItem;
use crate::variable::StaticVariableDefinition;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum RequirementType {
    Input,
    Output,
}

/// A named series read or written by a component.
#[derive(Debug, Eq, PartialEq, Clone, Hash, Serialize, Deserialize)]
pub struct RequirementDefinition {
    pub name: String,
    pub unit: String,
    pub requirement_type: RequirementType,
}

impl RequirementDefinition {
    pub fn new(name: &str, unit: &str, requirement_type: RequirementType) -> Self {
        Self {
            name: name.to_string(),
            unit: unit.to_string(),
            requirement_type,
        }
    }

    /// Input requirement for a registered variable
    pub fn input(variable: &StaticVariableDefinition) -> Self {
        Self::new(variable.name, variable.unit, RequirementType::Input)
    }

    /// Output requirement for a registered variable
    pub fn output(variable: &StaticVariableDefinition) -> Self {
        Self::new(variable.name, variable.unit, RequirementType::Output)
    }
}

/// The series a component is allowed to read during a solve.
#[derive(Debug, Clone)]
pub struct InputState<'a> {
    horizon: Horizon,
    state: Vec<&'a TimeseriesItem>,
}

impl<'a> InputState<'a> {
    pub fn build(horizon: Horizon, state: Vec<&'a TimeseriesItem>) -> Self {
        Self { horizon, state }
    }

    pub fn empty(horizon: Horizon) -> Self {
        Self {
            horizon,
            state: vec![],
        }
    }

    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    /// Series for a variable
    ///
    /// Fails if the variable was not provided to the component.
    pub fn get(&self, name: &str) -> RSForestResult<&'a YearSeries> {
        self.state
            .iter()
            .find(|item| item.name == name)
            .map(|item| &item.series)
            .ok_or_else(|| RSForestError::UnknownVariable(name.to_string()))
    }

    /// Series for a registered variable
    pub fn variable(&self, variable: &StaticVariableDefinition) -> RSForestResult<&'a YearSeries> {
        self.get(variable.name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.state.iter().any(|item| item.name == name)
    }
}

/// Partial derivative of one output series with respect to one series it reads.
///
/// `values[[i, k]]` is the derivative of the output in year `i` with respect to the
/// input in year `k`, holding every other direct dependency fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalDerivative {
    pub output: String,
    pub input: String,
    pub values: Array2<FloatValue>,
}

/// Everything produced by one solve of a component.
///
/// Series are recorded in the order they were inserted. A derivative may reference
/// a declared input or an output inserted earlier by the same component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentOutput {
    series: Vec<(String, YearSeries)>,
    derivatives: Vec<LocalDerivative>,
}

impl ComponentOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, variable: &StaticVariableDefinition, series: YearSeries) {
        self.insert_named(variable.name, series);
    }

    pub fn insert_named(&mut self, name: &str, series: YearSeries) {
        self.series.push((name.to_string(), series));
    }

    /// Record the partial derivative of `output` with respect to `input`
    pub fn derivative(
        &mut self,
        output: &StaticVariableDefinition,
        input: &StaticVariableDefinition,
        values: Array2<FloatValue>,
    ) {
        self.derivative_named(output.name, input.name, values);
    }

    pub fn derivative_named(&mut self, output: &str, input: &str, values: Array2<FloatValue>) {
        self.derivatives.push(LocalDerivative {
            output: output.to_string(),
            input: input.to_string(),
            values,
        });
    }

    pub fn get(&self, name: &str) -> Option<&YearSeries> {
        self.series
            .iter()
            .find(|(series_name, _)| series_name == name)
            .map(|(_, series)| series)
    }

    pub fn series(&self) -> &[(String, YearSeries)] {
        &self.series
    }

    pub fn derivatives(&self) -> &[LocalDerivative] {
        &self.derivatives
    }

    pub fn into_parts(self) -> (Vec<(String, YearSeries)>, Vec<LocalDerivative>) {
        (self.series, self.derivatives)
    }
}

/// Component of a forest model.
///
/// Each component encapsulates one engine of the land-use module. The model calls
/// [`Component::solve`] once per evaluation with the full horizon; components are
/// stateless between calls.
#[typetag::serde(tag = "type")]
pub trait Component: Debug + Send + Sync {
    /// Variables read and written by this component
    fn definitions(&self) -> Vec<RequirementDefinition>;

    fn inputs(&self) -> Vec<RequirementDefinition> {
        self.definitions()
            .into_iter()
            .filter(|d| d.requirement_type == RequirementType::Input)
            .collect()
    }

    fn input_names(&self) -> Vec<String> {
        self.inputs().into_iter().map(|d| d.name).collect()
    }

    fn outputs(&self) -> Vec<RequirementDefinition> {
        self.definitions()
            .into_iter()
            .filter(|d| d.requirement_type == RequirementType::Output)
            .collect()
    }

    fn output_names(&self) -> Vec<String> {
        self.outputs().into_iter().map(|d| d.name).collect()
    }

    /// Compute every output over `horizon` together with its local derivatives
    fn solve(&self, horizon: Horizon, input_state: &InputState) -> RSForestResult<ComponentOutput>;
}
