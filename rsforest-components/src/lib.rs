//! Forest land-use components for rsforest
//!
//! This crate turns three yearly investment streams (deforestation, reforestation
//! and managed wood) into forest surfaces, CO2 flows, biomass production, a biomass
//! price and lost capital, together with the exact Jacobians of every output with
//! respect to every investment.
//!
//! # Module Organisation
//!
//! - `components`: one [`Component`](rsforest_core::component::Component) per engine
//! - `parameters`: per-component parameters and the aggregate [`ForestParameters`]
//! - `variables`: the registered variable names and units
//! - `model`: the [`ForestModel`] facade wiring the components together
//!
//! # Parameters
//!
//! Every parameter struct has defaults matching the reference forest discipline.
//! [`ForestParameters`] loads them from TOML.

pub mod components;
pub mod model;
pub mod parameters;
pub mod variables;

pub use model::{ControlInvestments, ForestModel, ForestRun, Investments};
pub use parameters::ForestParameters;
