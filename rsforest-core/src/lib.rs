pub mod component;
pub mod errors;
pub mod interpolate;
pub mod jacobian;
pub mod model;
pub mod sensitivity;
pub mod timeseries;
pub mod timeseries_collection;
pub mod variable;

// Used by `define_static_variable!`
pub use inventory;
