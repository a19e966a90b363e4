//! Parameters of the forest components
//!
//! Each component has its own parameter struct with defaults taken from the
//! reference forest discipline. [`ForestParameters`] groups the constants by
//! concern, loads them from TOML and derives the per-component structs.

mod biomass;
mod carbon;
mod forest;
mod lost_capital;
mod price;
mod schedule;
mod surface;

pub use biomass::{BiomassParameters, ProductionParameters};
pub use carbon::CarbonParameters;
pub use forest::ForestParameters;
pub use lost_capital::LostCapitalParameters;
pub use price::{capital_recovery_factor, MarketParameters, PriceParameters};
pub use schedule::Schedule;
pub use surface::{DeforestationPolicy, SurfaceParameters};
