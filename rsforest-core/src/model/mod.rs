//! A model consists of a series of coupled components which are solved together.
//!
//! The builder works out which variables are produced by a component (endogenous),
//! supplied as fixed data (exogenous) or chosen by the optimizer (decision variables)
//! and orders the components so that every input is available before it is read.
//!
//! A run solves every component once over the whole horizon and records the local
//! derivatives in a [`crate::sensitivity::SensitivityGraph`] so that total Jacobians
//! with respect to the decision variables can be requested afterwards.

mod builder;
mod runtime;
mod types;
mod validation;

pub use builder::ModelBuilder;
pub use runtime::{Model, ModelRun};
