use crate::component::RequirementDefinition;
use crate::errors::{RSForestError, RSForestResult};
use petgraph::visit::{IntoNeighbors, IntoNodeIdentifiers, Visitable};
use std::collections::HashMap;

use super::types::VariableDefinition;

/// Checks if the new definition is consistent with any existing definition.
///
/// If any definitions share a name then the units must be identical.
pub(crate) fn verify_definition(
    definitions: &mut HashMap<String, VariableDefinition>,
    definition: &RequirementDefinition,
    origin: &str,
) -> RSForestResult<()> {
    match definitions.get(&definition.name) {
        Some(existing) => {
            if existing.unit != definition.unit {
                return Err(RSForestError::ConfigurationError(format!(
                    "Unit mismatch for {}: {} uses {} but {} uses {}",
                    definition.name, existing.origin, existing.unit, origin, definition.unit
                )));
            }
        }
        None => {
            definitions.insert(
                definition.name.clone(),
                VariableDefinition::from_requirement_definition(definition, origin),
            );
        }
    }
    Ok(())
}

/// Check that a component graph is valid.
///
/// We require a directed acyclic graph.
/// This avoids the case where component `A` depends on a component `B`,
/// but component `B` also depends on component `A`.
pub(crate) fn is_valid_graph<G>(g: G) -> bool
where
    G: IntoNodeIdentifiers + IntoNeighbors + Visitable,
{
    use petgraph::visit::{depth_first_search, DfsEvent};

    depth_first_search(g, g.node_identifiers(), |event| match event {
        DfsEvent::BackEdge(_, _) => Err(()),
        _ => Ok(()),
    })
    .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::RequirementType;
    use petgraph::Graph;

    #[test]
    fn unit_mismatch() {
        let mut definitions = HashMap::new();
        let a = RequirementDefinition::new("x", "Gha", RequirementType::Output);
        let b = RequirementDefinition::new("x", "Mha", RequirementType::Input);

        verify_definition(&mut definitions, &a, "A").unwrap();
        verify_definition(&mut definitions, &a, "B").unwrap();
        assert!(matches!(
            verify_definition(&mut definitions, &b, "C"),
            Err(RSForestError::ConfigurationError(_))
        ));
    }

    #[test]
    fn cycles_are_invalid() {
        let mut graph: Graph<(), ()> = Graph::new();
        let a = graph.add_node(());
        let b = graph.add_node(());
        let c = graph.add_node(());
        graph.add_edge(a, b, ());
        graph.add_edge(b, c, ());
        assert!(is_valid_graph(&graph));

        graph.add_edge(c, a, ());
        assert!(!is_valid_graph(&graph));
    }
}
