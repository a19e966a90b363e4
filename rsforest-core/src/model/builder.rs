use crate::component::{Component, RequirementDefinition, RequirementType};
use crate::errors::{RSForestError, RSForestResult};
use crate::timeseries::{Horizon, YearSeries};
use crate::timeseries_collection::{TimeseriesCollection, VariableType};
use crate::variable::StaticVariableDefinition;
use log::debug;
use petgraph::algo::toposort;
use petgraph::graph::NodeIndex;
use petgraph::Graph;
use std::collections::HashMap;
use std::sync::Arc;

use super::runtime::Model;
use super::types::{CGraph, C};
use super::validation::{is_valid_graph, verify_definition};

/// Short name of a component, taken from its `Debug` representation
pub(crate) fn component_name(component: &C) -> String {
    format!("{:?}", component)
        .split(['{', ' ', '('])
        .next()
        .unwrap_or("UnknownComponent")
        .to_string()
}

/// Build a new model from a set of components.
///
/// The builder generates a graph that defines the inter-component dependencies
/// and determines what variables are endogenous, exogenous or decision variables.
/// This graph is used by the model to define the order in which components are solved.
pub struct ModelBuilder {
    components: Vec<C>,
    exogenous_variables: Vec<(String, YearSeries)>,
    decision_variables: Vec<RequirementDefinition>,
    /// The years on which every series of the model is defined
    pub horizon: Horizon,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self {
            components: vec![],
            exogenous_variables: vec![],
            decision_variables: vec![],
            horizon: Horizon {
                year_start: 2020,
                year_end: 2100,
            },
        }
    }

    /// Register a component with the builder.
    pub fn with_component(&mut self, component: Arc<dyn Component>) -> &mut Self {
        self.components.push(component);
        self
    }

    /// Supply exogenous data to be used by the model.
    ///
    /// Any unneeded series will be ignored.
    pub fn with_exogenous_variable(&mut self, name: &str, series: YearSeries) -> &mut Self {
        self.exogenous_variables.push((name.to_string(), series));
        self
    }

    pub fn with_exogenous_collection(&mut self, collection: TimeseriesCollection) -> &mut Self {
        for item in collection {
            self.exogenous_variables.push((item.name, item.series));
        }
        self
    }

    /// Declare a series that is supplied on every run.
    ///
    /// Total derivatives are taken with respect to decision variables.
    pub fn with_decision_variable(&mut self, variable: &StaticVariableDefinition) -> &mut Self {
        self.with_decision_variable_named(variable.name, variable.unit)
    }

    pub fn with_decision_variable_named(&mut self, name: &str, unit: &str) -> &mut Self {
        self.decision_variables
            .push(RequirementDefinition::new(name, unit, RequirementType::Input));
        self
    }

    /// Specify the years the model is solved on.
    pub fn with_horizon(&mut self, horizon: Horizon) -> &mut Self {
        self.horizon = horizon;
        self
    }

    /// Builds the component graph for the registered components and creates a concrete model.
    ///
    /// Returns an error if the component definitions are inconsistent.
    pub fn build(&self) -> RSForestResult<Model> {
        let mut graph: CGraph = Graph::new();
        let mut definitions = HashMap::new();
        let mut producers: HashMap<String, NodeIndex> = HashMap::new();

        let mut exogenous = TimeseriesCollection::new();
        for (name, series) in &self.exogenous_variables {
            series.check_horizon(name, self.horizon)?;
            exogenous.add_timeseries(name, series.clone(), VariableType::Exogenous)?;
        }

        let mut decision_names: Vec<&str> = vec![];
        for decision in &self.decision_variables {
            verify_definition(&mut definitions, decision, "decision variables")?;
            if exogenous.contains(&decision.name) || decision_names.contains(&decision.name.as_str())
            {
                return Err(RSForestError::ConfigurationError(format!(
                    "{} is declared more than once as exogenous or decision variable",
                    decision.name
                )));
            }
            decision_names.push(&decision.name);
        }

        let nodes: Vec<(NodeIndex, String)> = self
            .components
            .iter()
            .map(|component| (graph.add_node(component.clone()), component_name(component)))
            .collect();

        for (component, (node, name)) in self.components.iter().zip(&nodes) {
            for output in component.outputs() {
                verify_definition(&mut definitions, &output, name)?;
                if producers.contains_key(&output.name) {
                    return Err(RSForestError::ConfigurationError(format!(
                        "{} is produced by more than one component",
                        output.name
                    )));
                }
                if exogenous.contains(&output.name) || decision_names.contains(&output.name.as_str())
                {
                    return Err(RSForestError::ConfigurationError(format!(
                        "{} is produced by {} but is also supplied from outside the model",
                        output.name, name
                    )));
                }
                producers.insert(output.name.clone(), *node);
            }
        }

        for (component, (node, name)) in self.components.iter().zip(&nodes) {
            for input in component.inputs() {
                verify_definition(&mut definitions, &input, name)?;
                match producers.get(&input.name) {
                    Some(producer) if producer == node => {
                        return Err(RSForestError::ConfigurationError(format!(
                            "{} reads its own output {}",
                            name, input.name
                        )));
                    }
                    Some(producer) => {
                        graph.add_edge(*producer, *node, input.clone());
                    }
                    None => {
                        if !exogenous.contains(&input.name)
                            && !decision_names.contains(&input.name.as_str())
                        {
                            return Err(RSForestError::ConfigurationError(format!(
                                "{} requires {} which is not produced by a component, \
                                 exogenous or a decision variable",
                                name, input.name
                            )));
                        }
                    }
                }
            }
        }

        // Check that the component graph doesn't contain any loops
        if !is_valid_graph(&graph) {
            return Err(RSForestError::ConfigurationError(
                "Component graph contains a cycle".to_string(),
            ));
        }
        let order = toposort(&graph, None).map_err(|_| {
            RSForestError::ConfigurationError("Component graph contains a cycle".to_string())
        })?;

        debug!(
            "Built model with {} components and {} decision variables",
            order.len(),
            self.decision_variables.len()
        );

        Ok(Model::new(
            graph,
            order,
            self.horizon,
            exogenous,
            self.decision_variables.clone(),
        ))
    }
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}
