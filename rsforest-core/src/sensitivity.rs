//! Chain-rule composition of local derivatives.
//!
//! Every series produced during a model run is a node of a directed graph and every
//! local derivative reported by a component is an edge from the series it was taken
//! with respect to, to the series it describes. Total derivatives are accumulated in
//! tangent mode over a topological order of the graph:
//!
//! $$ J_n = \sum_{p \to n} L_{p \to n} J_p, \qquad J_{input} = I $$
//!
//! The result only depends on the graph, not on the order components were solved in.

use crate::errors::{RSForestError, RSForestResult};
use crate::interpolate::{InterpolationMap, PoleJacobian};
use crate::jacobian::{operators, Jacobian};
use crate::timeseries::{FloatValue, Horizon};
use log::debug;
use ndarray::Array2;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef};
use petgraph::Direction;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone)]
pub struct SensitivityGraph {
    horizon: Horizon,
    graph: DiGraph<String, Array2<FloatValue>>,
    nodes: HashMap<String, NodeIndex>,
}

impl SensitivityGraph {
    pub fn new(horizon: Horizon) -> Self {
        Self {
            horizon,
            graph: DiGraph::new(),
            nodes: HashMap::new(),
        }
    }

    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    /// Register a series. Adding an existing name is a no-op.
    pub fn add_node(&mut self, name: &str) -> NodeIndex {
        if let Some(index) = self.nodes.get(name) {
            return *index;
        }
        let index = self.graph.add_node(name.to_string());
        self.nodes.insert(name.to_string(), index);
        index
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn index_of(&self, name: &str) -> RSForestResult<NodeIndex> {
        self.nodes
            .get(name)
            .copied()
            .ok_or_else(|| RSForestError::UnknownVariable(name.to_string()))
    }

    /// Record $\partial output / \partial input$.
    ///
    /// Both series must already be registered. The matrix must be square over the
    /// horizon and causal. Repeated edges between the same pair are summed.
    pub fn add_edge(
        &mut self,
        output: &str,
        input: &str,
        values: Array2<FloatValue>,
    ) -> RSForestResult<()> {
        let jacobian = Jacobian::from_array(self.horizon, values)?;
        jacobian.check_causality(output, input)?;

        let target = self.index_of(output)?;
        let source = self.index_of(input)?;
        if source == target {
            return Err(RSForestError::Error(format!(
                "A series cannot depend on itself: {}",
                output
            )));
        }

        match self.graph.find_edge(source, target) {
            Some(edge) => {
                self.graph[edge] += jacobian.values();
            }
            None => {
                self.graph.add_edge(source, target, jacobian.into_values());
            }
        }
        Ok(())
    }

    /// Total derivatives of every series reachable from `input`
    fn propagate(&self, input: &str) -> RSForestResult<HashMap<NodeIndex, Array2<FloatValue>>> {
        let seed = self.index_of(input)?;
        let order = toposort(&self.graph, None).map_err(|cycle| {
            RSForestError::Error(format!(
                "Sensitivity graph contains a cycle through {}",
                self.graph[cycle.node_id()]
            ))
        })?;

        let mut reachable = vec![false; self.graph.node_count()];
        let mut dfs = Dfs::new(&self.graph, seed);
        while let Some(node) = dfs.next(&self.graph) {
            reachable[node.index()] = true;
        }

        let n = self.horizon.len();
        let mut totals: HashMap<NodeIndex, Array2<FloatValue>> = HashMap::new();
        for node in order {
            if !reachable[node.index()] {
                continue;
            }
            if node == seed {
                totals.insert(node, operators::identity(n));
                continue;
            }
            let mut total = Array2::zeros((n, n));
            for edge in self.graph.edges_directed(node, Direction::Incoming) {
                if let Some(upstream) = totals.get(&edge.source()) {
                    total += &edge.weight().dot(upstream);
                }
            }
            totals.insert(node, total);
        }

        debug!(
            "Propagated sensitivities of {} to {} series",
            input,
            totals.len()
        );
        Ok(totals)
    }

    fn checked(&self, output: &str, input: &str, values: Array2<FloatValue>) -> RSForestResult<Jacobian> {
        let jacobian = Jacobian::from_array(self.horizon, values)?;
        if let Err(violation) = jacobian.check_causality(output, input) {
            if cfg!(debug_assertions) {
                panic!("{}", violation);
            }
            return Err(violation);
        }
        Ok(jacobian)
    }

    /// Total derivative of `output` with respect to `input`.
    ///
    /// A zero matrix is returned when `output` does not depend on `input`.
    pub fn total_derivative(&self, output: &str, input: &str) -> RSForestResult<Jacobian> {
        let target = self.index_of(output)?;
        let mut totals = self.propagate(input)?;
        match totals.remove(&target) {
            Some(values) => self.checked(output, input, values),
            None => Ok(Jacobian::zeros(self.horizon)),
        }
    }

    /// Total derivatives with respect to `input` of every series that depends on it
    ///
    /// The seed itself is not included.
    pub fn jacobians_for_input(&self, input: &str) -> RSForestResult<BTreeMap<String, Jacobian>> {
        let seed = self.index_of(input)?;
        let mut result = BTreeMap::new();
        for (node, values) in self.propagate(input)? {
            if node == seed {
                continue;
            }
            let name = &self.graph[node];
            result.insert(name.clone(), self.checked(name, input, values)?);
        }
        Ok(result)
    }

    /// Total derivative converted to pole space with `map`
    pub fn pole_jacobian(
        &self,
        output: &str,
        input: &str,
        map: &InterpolationMap,
    ) -> RSForestResult<PoleJacobian> {
        map.to_poles(&self.total_derivative(output, input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn horizon() -> Horizon {
        Horizon::new(2020, 2022).unwrap()
    }

    /// x -> y = 2x, y -> z = running sum of y, x -> z directly with identity
    fn diamond() -> SensitivityGraph {
        let mut graph = SensitivityGraph::new(horizon());
        for name in ["x", "y", "z", "w"] {
            graph.add_node(name);
        }
        graph
            .add_edge("y", "x", operators::scaled_identity(3, 2.0))
            .unwrap();
        graph.add_edge("z", "y", operators::running_sum(3)).unwrap();
        graph.add_edge("z", "x", operators::identity(3)).unwrap();
        graph
    }

    #[test]
    fn chain_rule_over_paths() {
        let graph = diamond();
        let total = graph.total_derivative("z", "x").unwrap();
        let expected = operators::running_sum(3) * 2.0 + operators::identity(3);
        assert_eq!(total.values(), &expected);
    }

    #[test]
    fn independent_output_is_zero() {
        let graph = diamond();
        assert!(graph.total_derivative("w", "x").unwrap().is_zero());
        assert!(graph.total_derivative("x", "z").unwrap().is_zero());
    }

    #[test]
    fn jacobians_for_input_lists_reachable() {
        let graph = diamond();
        let all = graph.jacobians_for_input("x").unwrap();
        let names: Vec<_> = all.keys().cloned().collect();
        assert_eq!(names, vec!["y".to_string(), "z".to_string()]);
        assert_eq!(
            all["z"].values(),
            &graph.total_derivative("z", "x").unwrap().into_values()
        );
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let mut graph = SensitivityGraph::new(horizon());
        for name in ["z", "x", "y"] {
            graph.add_node(name);
        }
        graph.add_edge("z", "x", operators::identity(3)).unwrap();
        graph.add_edge("z", "y", operators::running_sum(3)).unwrap();
        graph
            .add_edge("y", "x", operators::scaled_identity(3, 2.0))
            .unwrap();

        assert_eq!(
            graph.total_derivative("z", "x").unwrap(),
            diamond().total_derivative("z", "x").unwrap()
        );
    }

    #[test]
    fn anticausal_edge_is_rejected() {
        let mut graph = SensitivityGraph::new(horizon());
        graph.add_node("a");
        graph.add_node("b");
        let values = array![[1.0, 1.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        assert!(matches!(
            graph.add_edge("b", "a", values),
            Err(RSForestError::CausalityViolation {
                output_year: 2020,
                input_year: 2021,
                ..
            })
        ));
    }

    #[test]
    fn unknown_names() {
        let graph = diamond();
        assert!(matches!(
            graph.total_derivative("missing", "x"),
            Err(RSForestError::UnknownVariable(_))
        ));
        let mut graph = diamond();
        assert!(graph
            .add_edge("missing", "x", operators::identity(3))
            .is_err());
    }

    #[test]
    fn repeated_edges_are_summed() {
        let mut graph = SensitivityGraph::new(horizon());
        graph.add_node("a");
        graph.add_node("b");
        graph.add_edge("b", "a", operators::identity(3)).unwrap();
        graph.add_edge("b", "a", operators::identity(3)).unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(
            graph.total_derivative("b", "a").unwrap().values(),
            &operators::scaled_identity(3, 2.0)
        );
    }
}
