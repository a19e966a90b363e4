use crate::component::{InputState, RequirementDefinition};
use crate::errors::{RSForestError, RSForestResult};
use crate::interpolate::{InterpolationMap, PoleJacobian};
use crate::jacobian::Jacobian;
use crate::sensitivity::SensitivityGraph;
use crate::timeseries::{Horizon, YearSeries};
use crate::timeseries_collection::{TimeseriesCollection, VariableType};
use log::debug;
use petgraph::dot::{Config, Dot};
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::builder::component_name;
use super::types::{CGraph, C};

/// A coupled set of components that are solved over a common horizon.
///
/// Components may pass series between themselves.
/// Each component may require information from other components to be solved (endogenous),
/// predefined data (exogenous) or values supplied on each run (decision variables).
///
/// The model itself is never mutated by a run, so the same model can be evaluated
/// repeatedly with different decisions.
#[derive(Debug, Serialize, Deserialize)]
pub struct Model {
    /// A directed graph with components as nodes and the edges defining the state dependencies
    /// between nodes.
    components: CGraph,
    /// Topological order of `components`
    order: Vec<NodeIndex>,
    horizon: Horizon,
    exogenous: TimeseriesCollection,
    decision_variables: Vec<RequirementDefinition>,
}

impl Model {
    pub fn new(
        components: CGraph,
        order: Vec<NodeIndex>,
        horizon: Horizon,
        exogenous: TimeseriesCollection,
        decision_variables: Vec<RequirementDefinition>,
    ) -> Self {
        Self {
            components,
            order,
            horizon,
            exogenous,
            decision_variables,
        }
    }

    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    pub fn decision_variables(&self) -> &[RequirementDefinition] {
        &self.decision_variables
    }

    /// Components in the order they are solved
    pub fn components(&self) -> Vec<&C> {
        self.order.iter().map(|node| &self.components[*node]).collect()
    }

    /// Solve every component once with the given decision series.
    ///
    /// Every declared decision variable must be present in `decisions` and cover the
    /// model horizon. Extra series in `decisions` are ignored.
    pub fn run(&self, decisions: &TimeseriesCollection) -> RSForestResult<ModelRun> {
        let mut state = self.exogenous.clone();
        let mut sensitivities = SensitivityGraph::new(self.horizon);
        for name in self.exogenous.names() {
            sensitivities.add_node(name);
        }

        for decision in &self.decision_variables {
            let series = decisions.require(&decision.name)?;
            series.check_horizon(&decision.name, self.horizon)?;
            state.add_timeseries(&decision.name, series.clone(), VariableType::Decision)?;
            sensitivities.add_node(&decision.name);
        }

        for node in &self.order {
            self.solve_component(&self.components[*node], &mut state, &mut sensitivities)?;
        }

        Ok(ModelRun {
            horizon: self.horizon,
            state,
            sensitivities,
        })
    }

    fn solve_component(
        &self,
        component: &C,
        state: &mut TimeseriesCollection,
        sensitivities: &mut SensitivityGraph,
    ) -> RSForestResult<()> {
        let name = component_name(component);
        debug!("Solving {}", name);

        let input_names = component.input_names();
        let output = {
            let items = input_names
                .iter()
                .map(|input| {
                    state
                        .get_by_name(input)
                        .ok_or_else(|| RSForestError::UnknownVariable(input.clone()))
                })
                .collect::<RSForestResult<Vec<_>>>()?;
            component.solve(self.horizon, &InputState::build(self.horizon, items))?
        };

        let output_names = component.output_names();
        let (series, derivatives) = output.into_parts();
        for (output_name, values) in series {
            if !output_names.contains(&output_name) {
                return Err(RSForestError::Error(format!(
                    "{} produced undeclared output {}",
                    name, output_name
                )));
            }
            values.check_horizon(&output_name, self.horizon)?;
            state.add_timeseries(&output_name, values, VariableType::Endogenous)?;
            sensitivities.add_node(&output_name);
        }
        if let Some(missing) = output_names.iter().find(|n| !state.contains(n)) {
            return Err(RSForestError::Error(format!(
                "{} did not produce declared output {}",
                name, missing
            )));
        }

        for derivative in derivatives {
            if !output_names.contains(&derivative.output)
                || !(input_names.contains(&derivative.input)
                    || output_names.contains(&derivative.input))
            {
                return Err(RSForestError::Error(format!(
                    "{} reported d({})/d({}) outside of its declared variables",
                    name, derivative.output, derivative.input
                )));
            }
            sensitivities.add_edge(&derivative.output, &derivative.input, derivative.values)?;
        }
        debug!(
            "{} graph now has {} series and {} local derivatives",
            name,
            sensitivities.node_count(),
            sensitivities.edge_count()
        );
        Ok(())
    }

    /// Returns a representation of the component graph in Graphviz's dot format
    pub fn as_dot(&self) -> Dot<'_, &CGraph> {
        Dot::with_attr_getters(
            &self.components,
            &[Config::NodeNoLabel, Config::EdgeNoLabel],
            &|_, er| format!("label = {:?}", er.weight().name),
            &|_, (_, component)| format!("label = \"{}\"", component_name(component)),
        )
    }
}

/// Results of one evaluation of a [`Model`].
#[derive(Debug, Clone)]
pub struct ModelRun {
    horizon: Horizon,
    state: TimeseriesCollection,
    sensitivities: SensitivityGraph,
}

impl ModelRun {
    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    /// Every series of the run: exogenous, decisions and component outputs
    pub fn timeseries(&self) -> &TimeseriesCollection {
        &self.state
    }

    pub fn series(&self, name: &str) -> RSForestResult<&YearSeries> {
        self.state.require(name)
    }

    pub fn sensitivities(&self) -> &SensitivityGraph {
        &self.sensitivities
    }

    pub fn jacobian(&self, output: &str, input: &str) -> RSForestResult<Jacobian> {
        self.sensitivities.total_derivative(output, input)
    }

    pub fn jacobians_for_input(&self, input: &str) -> RSForestResult<BTreeMap<String, Jacobian>> {
        self.sensitivities.jacobians_for_input(input)
    }

    pub fn pole_jacobian(
        &self,
        output: &str,
        input: &str,
        map: &InterpolationMap,
    ) -> RSForestResult<PoleJacobian> {
        self.sensitivities.pole_jacobian(output, input, map)
    }
}
