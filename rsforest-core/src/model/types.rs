use crate::component::{Component, RequirementDefinition};
use petgraph::Graph;
use std::sync::Arc;

/// Shared handle to a component.
pub type C = Arc<dyn Component>;

/// Component dependency graph. Edges carry the variable passed between components.
pub type CGraph = Graph<C, RequirementDefinition>;

/// Definition tracking for a variable during model building.
#[derive(Debug, Clone)]
pub(crate) struct VariableDefinition {
    pub name: String,
    pub unit: String,
    /// Where the definition was first seen, for error messages
    pub origin: String,
}

impl VariableDefinition {
    pub fn from_requirement_definition(definition: &RequirementDefinition, origin: &str) -> Self {
        Self {
            name: definition.name.clone(),
            unit: definition.unit.clone(),
            origin: origin.to_string(),
        }
    }
}
