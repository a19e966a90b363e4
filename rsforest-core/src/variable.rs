//! Variable registration for the land-use model.
//!
//! Every series exchanged between components is identified by a name following
//! the `|`-separated hierarchical convention (for example
//! `Forest Surface|Deforestation|Cumulative`) and carries a canonical unit and a
//! description. Definitions are declared at compile time with
//! [`define_static_variable!`] and collected with `inventory`, so any crate in the
//! workspace can contribute variables and they can be listed or looked up by name.

use serde::{Deserialize, Serialize};

/// Owned variable metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDefinition {
    pub name: String,
    pub unit: String,
    pub description: String,
}

/// Static variable definition holder for compile-time registration.
#[derive(Debug, Clone, Copy)]
pub struct StaticVariableDefinition {
    /// Variable name
    pub name: &'static str,
    /// Canonical unit
    pub unit: &'static str,
    /// Description
    pub description: &'static str,
}

impl StaticVariableDefinition {
    pub const fn new(name: &'static str, unit: &'static str, description: &'static str) -> Self {
        Self {
            name,
            unit,
            description,
        }
    }

    pub fn to_variable_definition(&self) -> VariableDefinition {
        VariableDefinition {
            name: self.name.to_string(),
            unit: self.unit.to_string(),
            description: self.description.to_string(),
        }
    }
}

inventory::collect!(StaticVariableDefinition);

/// Define a variable and register it with the static registry.
///
/// ```rust
/// use rsforest_core::define_static_variable;
///
/// define_static_variable!(
///     VAR_EXAMPLE,
///     name = "Example|Variable",
///     unit = "Gha",
///     description = "A test variable",
/// );
///
/// fn main() {
///     assert_eq!(VAR_EXAMPLE.name, "Example|Variable");
/// }
/// ```
#[macro_export]
macro_rules! define_static_variable {
    (
        $var_name:ident,
        name = $name:expr,
        unit = $unit:expr,
        description = $desc:expr $(,)?
    ) => {
        #[doc = concat!("Static variable definition for ", $name)]
        pub static $var_name: $crate::variable::StaticVariableDefinition =
            $crate::variable::StaticVariableDefinition::new($name, $unit, $desc);

        $crate::inventory::submit! {
            $crate::variable::StaticVariableDefinition::new($name, $unit, $desc)
        }
    };
}

/// Look up a registered variable by name
pub fn get_variable(name: &str) -> Option<VariableDefinition> {
    inventory::iter::<StaticVariableDefinition>
        .into_iter()
        .find(|var| var.name == name)
        .map(|var| var.to_variable_definition())
}

/// All registered variables, sorted by name
pub fn list_variables() -> Vec<VariableDefinition> {
    let mut variables: Vec<_> = inventory::iter::<StaticVariableDefinition>
        .into_iter()
        .map(|var| var.to_variable_definition())
        .collect();
    variables.sort_by(|a, b| a.name.cmp(&b.name));
    variables
}
