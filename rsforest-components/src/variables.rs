//! Variables exchanged between the forest components.
//!
//! Investments are in G$ and surfaces in Gha so that dividing an investment by a cost
//! in $/ha directly yields a surface. Masses are in Mt (Gha × kg/ha) and energy in
//! TWh (Mt × kWh/kg).

use rsforest_core::define_static_variable;

// Decision variables

define_static_variable!(
    VAR_DEFORESTATION_INVESTMENT,
    name = "Investment|Deforestation",
    unit = "G$",
    description = "Yearly investment in clearing forest",
);
define_static_variable!(
    VAR_REFORESTATION_INVESTMENT,
    name = "Investment|Reforestation",
    unit = "G$",
    description = "Yearly investment in planting new forest",
);
define_static_variable!(
    VAR_MANAGED_WOOD_INVESTMENT,
    name = "Investment|Managed Wood",
    unit = "G$",
    description = "Yearly investment in planting managed wood",
);

// Surface

define_static_variable!(
    VAR_DEFORESTATION_REQUESTED,
    name = "Forest Surface|Deforestation|Requested",
    unit = "Gha",
    description = "Surface the deforestation investment would clear without the land limit",
);
define_static_variable!(
    VAR_DEFORESTATION_CAPACITY,
    name = "Forest Surface|Deforestation|Capacity",
    unit = "Gha",
    description = "Total surface that can have been deforested by the end of the year",
);
define_static_variable!(
    VAR_DEFORESTATION_DELTA,
    name = "Forest Surface|Deforestation|Delta",
    unit = "Gha",
    description = "Surface cleared during the year",
);
define_static_variable!(
    VAR_DEFORESTATION_CUMULATIVE,
    name = "Forest Surface|Deforestation|Cumulative",
    unit = "Gha",
    description = "Surface cleared since the start of the horizon",
);
define_static_variable!(
    VAR_REFORESTATION_DELTA,
    name = "Forest Surface|Reforestation|Delta",
    unit = "Gha",
    description = "Surface reforested during the year",
);
define_static_variable!(
    VAR_REFORESTATION_CUMULATIVE,
    name = "Forest Surface|Reforestation|Cumulative",
    unit = "Gha",
    description = "Surface reforested since the start of the horizon",
);
define_static_variable!(
    VAR_MANAGED_WOOD_DELTA,
    name = "Forest Surface|Managed Wood|Delta",
    unit = "Gha",
    description = "Managed wood planted during the year",
);
define_static_variable!(
    VAR_MANAGED_WOOD_CUMULATIVE,
    name = "Forest Surface|Managed Wood|Cumulative",
    unit = "Gha",
    description = "Managed wood ever planted, including the initial surface",
);
define_static_variable!(
    VAR_MANAGED_WOOD_CONVERTED,
    name = "Forest Surface|Managed Wood|Converted",
    unit = "Gha",
    description = "Managed wood cleared once the unmanaged forest is exhausted",
);
define_static_variable!(
    VAR_MANAGED_WOOD_STANDING,
    name = "Forest Surface|Managed Wood|Standing",
    unit = "Gha",
    description = "Managed wood still standing, the land-use requirement of managed wood",
);
define_static_variable!(
    VAR_UNMANAGED_FOREST,
    name = "Forest Surface|Unmanaged",
    unit = "Gha",
    description = "Unmanaged forest stock at the start of the horizon",
);
define_static_variable!(
    VAR_REMAINING_UNMANAGED_FOREST,
    name = "Forest Surface|Unmanaged|Remaining",
    unit = "Gha",
    description = "Unmanaged forest not yet cleared",
);
define_static_variable!(
    VAR_PROTECTED_FOREST,
    name = "Forest Surface|Protected",
    unit = "Gha",
    description = "Protected forest, never deforested",
);
define_static_variable!(
    VAR_GLOBAL_FOREST_SURFACE,
    name = "Forest Surface|Global",
    unit = "Gha",
    description = "Total forest surface",
);
define_static_variable!(
    VAR_GLOBAL_FOREST_DELTA,
    name = "Forest Surface|Global|Delta",
    unit = "Gha",
    description = "Change of the total forest surface relative to the previous year",
);
define_static_variable!(
    VAR_FOREST_CONSTRAINT,
    name = "Forest Surface|Constraint Evolution",
    unit = "Gha",
    description = "Cumulative reforestation minus cumulative deforestation",
);

// Carbon

define_static_variable!(
    VAR_CO2_EMITTED,
    name = "CO2 Emissions|Forest|Emitted",
    unit = "GtCO2",
    description = "CO2 released by deforestation during the year",
);
define_static_variable!(
    VAR_CO2_ABSORBED,
    name = "CO2 Emissions|Forest|Absorbed",
    unit = "GtCO2",
    description = "CO2 captured by reforestation during the year, negative",
);
define_static_variable!(
    VAR_CO2_NET,
    name = "CO2 Emissions|Forest|Net",
    unit = "GtCO2",
    description = "Emitted plus absorbed CO2",
);
define_static_variable!(
    VAR_CO2_CUMULATIVE,
    name = "CO2 Emissions|Forest|Cumulative",
    unit = "GtCO2",
    description = "Running balance of forest CO2 seeded with the initial debt",
);

// Biomass

define_static_variable!(
    VAR_PRODUCTIVE_SURFACE,
    name = "Biomass|Managed Wood|Productive Surface",
    unit = "Gha",
    description = "Managed wood old enough to be harvested",
);
define_static_variable!(
    VAR_MANAGED_WOOD_MASS,
    name = "Biomass|Managed Wood|Mass",
    unit = "Mt",
    description = "Biomass harvested from managed wood",
);
define_static_variable!(
    VAR_DEFORESTATION_MASS,
    name = "Biomass|Deforestation|Mass",
    unit = "Mt",
    description = "Biomass recovered from cleared forest",
);
define_static_variable!(
    VAR_TOTAL_MASS,
    name = "Biomass|Total|Mass",
    unit = "Mt",
    description = "Biomass from every source",
);
define_static_variable!(
    VAR_WOOD_MASS,
    name = "Biomass|Wood|Mass",
    unit = "Mt",
    description = "Wood part of the biomass",
);
define_static_variable!(
    VAR_RESIDUE_MASS,
    name = "Biomass|Residue|Mass",
    unit = "Mt",
    description = "Residue part of the biomass",
);
define_static_variable!(
    VAR_ENERGY_MASS,
    name = "Biomass|Energy|Mass",
    unit = "Mt",
    description = "Biomass used for energy",
);
define_static_variable!(
    VAR_INDUSTRY_MASS,
    name = "Biomass|Industry|Mass",
    unit = "Mt",
    description = "Biomass used by industry",
);
define_static_variable!(
    VAR_ENERGY_PRODUCTION,
    name = "Biomass|Energy|Production",
    unit = "TWh",
    description = "Energy content of the biomass used for energy",
);
define_static_variable!(
    VAR_CO2_CONSUMPTION,
    name = "Biomass|CO2 Consumption",
    unit = "Mt",
    description = "CO2 captured by the biomass that is produced",
);
define_static_variable!(
    VAR_CO2_INTENSITY,
    name = "Biomass|CO2 Intensity",
    unit = "kg/kWh",
    description = "CO2 emitted per unit of biomass energy, negative since growth captures CO2",
);

// Price

define_static_variable!(
    VAR_TRANSPORT_COST,
    name = "Biomass|Transport Cost",
    unit = "$/t",
    description = "Cost of transporting one tonne of biomass",
);
define_static_variable!(
    VAR_MARGIN,
    name = "Biomass|Margin",
    unit = "%",
    description = "Price as a percentage of cost",
);
define_static_variable!(
    VAR_MANAGED_WOOD_PRICE,
    name = "Biomass|Managed Wood|Price",
    unit = "$/t",
    description = "Price of biomass from managed wood",
);
define_static_variable!(
    VAR_DEFORESTATION_PRICE,
    name = "Biomass|Deforestation|Price",
    unit = "$/t",
    description = "Price of biomass from cleared forest",
);
define_static_variable!(
    VAR_PRICE_PER_TONNE,
    name = "Biomass|Price",
    unit = "$/t",
    description = "Mass-weighted biomass price",
);
define_static_variable!(
    VAR_PRICE_PER_MWH,
    name = "Biomass|Price per Energy",
    unit = "$/MWh",
    description = "Mass-weighted biomass price per unit of energy",
);

// Lost capital

define_static_variable!(
    VAR_LOST_CAPITAL_DEFORESTATION,
    name = "Lost Capital|Deforestation",
    unit = "G$",
    description = "Deforestation investment with no physical effect",
);
define_static_variable!(
    VAR_LOST_CAPITAL_REFORESTATION,
    name = "Lost Capital|Reforestation",
    unit = "G$",
    description = "Reforestation investment whose forest was later cleared",
);
define_static_variable!(
    VAR_LOST_CAPITAL_MANAGED_WOOD,
    name = "Lost Capital|Managed Wood",
    unit = "G$",
    description = "Capital of managed wood cleared by deforestation",
);
define_static_variable!(
    VAR_LOST_CAPITAL_TOTAL,
    name = "Lost Capital|Total",
    unit = "G$",
    description = "Lost capital over every activity",
);
