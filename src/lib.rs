//! rsforest: a forest land-use module with exact sensitivities
//!
//! The building blocks live in two workspace crates that are re-exported here:
//!
//! - [`rsforest_core`]: yearly series, Jacobians, control-point interpolation, the
//!   component model and the sensitivity graph
//! - [`rsforest_components`]: the forest components, their parameters and the
//!   [`ForestModel`] facade
//!
//! With the `python` feature the facade is also exposed as a Python extension module.

pub use rsforest_components;
pub use rsforest_core;

pub use rsforest_components::{
    ControlInvestments, ForestModel, ForestParameters, ForestRun, Investments,
};
pub use rsforest_core::errors::{RSForestError, RSForestResult};

#[cfg(feature = "python")]
pub mod python;
