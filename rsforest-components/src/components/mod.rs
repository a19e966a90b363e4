mod biomass;
mod carbon;
mod lost_capital;
mod price;
pub mod surface;

pub use biomass::BiomassProduction;
pub use carbon::CarbonBalance;
pub use lost_capital::LostCapital;
pub use price::BiomassPrice;
pub use surface::{SaturatingAccumulation, SurfaceEvolution};
