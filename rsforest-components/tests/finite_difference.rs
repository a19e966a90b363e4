//! Analytic Jacobians against centered finite differences.
//!
//! Every scenario stays away from the kinks of the model: investments are positive,
//! no year sits on the land limit or on the edge of the productive surface, and
//! biomass is produced every year. The scenarios differ in which branch of each
//! kink they sit on.

use rsforest_components::parameters::DeforestationPolicy;
use rsforest_components::variables::*;
use rsforest_components::{ForestModel, ForestParameters, Investments};
use rsforest_core::timeseries::{FloatValue, YearSeries};

const STEP: FloatValue = 1e-4;
const TOLERANCE: FloatValue = 1e-6;
/// Rounding error of one evaluation relative to the output, amplified by the step
const ROUNDING: FloatValue = 1e-13;

const INVESTMENTS: [&str; 3] = [
    VAR_DEFORESTATION_INVESTMENT.name,
    VAR_REFORESTATION_INVESTMENT.name,
    VAR_MANAGED_WOOD_INVESTMENT.name,
];

struct Scenario {
    model: ForestModel,
    investments: Investments,
}

fn ramp(model: &ForestModel, base: FloatValue, slope: FloatValue) -> YearSeries {
    let n = model.horizon().len();
    YearSeries::from_vec(
        model.horizon().year_start,
        (0..n).map(|i| base + slope * i as FloatValue).collect(),
    )
    .unwrap()
}

fn scenario(parameters: ForestParameters, deforestation: (FloatValue, FloatValue)) -> Scenario {
    let model = ForestModel::from_parameters(parameters).unwrap();
    let investments = Investments {
        deforestation: ramp(&model, deforestation.0, deforestation.1),
        reforestation: ramp(&model, 1.0, 0.1),
        managed_wood: ramp(&model, 4.0, -0.2),
    };
    Scenario { model, investments }
}

fn parameters() -> ForestParameters {
    ForestParameters {
        year_start: 2020,
        year_end: 2032,
        ..Default::default()
    }
}

/// Deforestation stays well within the unmanaged forest
fn unconstrained() -> Scenario {
    scenario(parameters(), (2.0, 0.3))
}

/// The unmanaged forest is exhausted in the first year and deforestation converts
/// managed wood every year after, without ever reaching the land limit.
fn conversion() -> Scenario {
    let mut parameters = parameters();
    parameters.surface.initial_unmanaged_forest = 0.002;
    parameters.surface.deforestation_policy = DeforestationPolicy::UnmanagedThenManagedWood;
    scenario(parameters, (20.0, 0.0))
}

/// Deforestation hits the land limit from the second year on and clears all the
/// managed wood planted each year.
fn saturated() -> Scenario {
    let mut parameters = parameters();
    parameters.surface.initial_unmanaged_forest = 0.002;
    parameters.surface.initial_managed_wood = 0.001;
    parameters.surface.deforestation_policy = DeforestationPolicy::UnmanagedThenManagedWood;
    scenario(parameters, (20.0, 0.0))
}

fn perturbed(investments: &Investments, input: &str, index: usize, step: FloatValue) -> Investments {
    let mut result = investments.clone();
    let target = if input == VAR_DEFORESTATION_INVESTMENT.name {
        &mut result.deforestation
    } else if input == VAR_REFORESTATION_INVESTMENT.name {
        &mut result.reforestation
    } else {
        &mut result.managed_wood
    };
    let mut values = target.to_vec();
    values[index] += step;
    *target = YearSeries::from_vec(target.year_start(), values).unwrap();
    result
}

fn check(scenario: &Scenario, output: &str, input: &str) {
    let Scenario { model, investments } = scenario;
    let base = model.evaluate(investments).unwrap();
    let analytic = base.jacobian(output, input).unwrap();
    let scale = analytic
        .values()
        .iter()
        .fold(0.0, |acc: FloatValue, v| acc.max(v.abs()));
    let magnitude = base
        .series(output)
        .unwrap()
        .values()
        .iter()
        .fold(0.0, |acc: FloatValue, v| acc.max(v.abs()));
    let tolerance = TOLERANCE * scale + ROUNDING * magnitude / STEP + 1e-8;
    let n = model.horizon().len();

    for k in 0..n {
        let up = model
            .evaluate(&perturbed(investments, input, k, STEP))
            .unwrap()
            .series(output)
            .unwrap()
            .to_vec();
        let down = model
            .evaluate(&perturbed(investments, input, k, -STEP))
            .unwrap()
            .series(output)
            .unwrap()
            .to_vec();
        for i in 0..n {
            let numeric = (up[i] - down[i]) / (2.0 * STEP);
            let exact = analytic.values()[[i, k]];
            assert!(
                (numeric - exact).abs() <= tolerance,
                "d({})/d({}) at ({}, {}): analytic {} numeric {}",
                output,
                input,
                i,
                k,
                exact,
                numeric
            );
        }
    }
}

/// Checks `outputs` against every investment
fn check_all(scenario: &Scenario, outputs: &[&str]) {
    for output in outputs {
        for input in INVESTMENTS {
            check(scenario, output, input);
        }
    }
}

#[test]
fn surfaces() {
    let scenario = unconstrained();
    check(&scenario, VAR_DEFORESTATION_CUMULATIVE.name, VAR_DEFORESTATION_INVESTMENT.name);
    check(&scenario, VAR_GLOBAL_FOREST_SURFACE.name, VAR_REFORESTATION_INVESTMENT.name);
    check(&scenario, VAR_GLOBAL_FOREST_SURFACE.name, VAR_MANAGED_WOOD_INVESTMENT.name);
    check(&scenario, VAR_FOREST_CONSTRAINT.name, VAR_DEFORESTATION_INVESTMENT.name);
}

#[test]
fn carbon() {
    let scenario = unconstrained();
    check(&scenario, VAR_CO2_CUMULATIVE.name, VAR_DEFORESTATION_INVESTMENT.name);
    check(&scenario, VAR_CO2_NET.name, VAR_REFORESTATION_INVESTMENT.name);
}

#[test]
fn biomass() {
    let scenario = unconstrained();
    check(&scenario, VAR_TOTAL_MASS.name, VAR_MANAGED_WOOD_INVESTMENT.name);
    check(&scenario, VAR_ENERGY_PRODUCTION.name, VAR_DEFORESTATION_INVESTMENT.name);
}

#[test]
fn price() {
    let scenario = unconstrained();
    check(&scenario, VAR_PRICE_PER_TONNE.name, VAR_DEFORESTATION_INVESTMENT.name);
    check(&scenario, VAR_PRICE_PER_TONNE.name, VAR_MANAGED_WOOD_INVESTMENT.name);
    check(&scenario, VAR_PRICE_PER_MWH.name, VAR_MANAGED_WOOD_INVESTMENT.name);
}

#[test]
fn lost_capital() {
    let scenario = unconstrained();
    check(&scenario, VAR_LOST_CAPITAL_TOTAL.name, VAR_DEFORESTATION_INVESTMENT.name);
}

#[test]
fn co2_consumption() {
    check(&unconstrained(), VAR_CO2_CONSUMPTION.name, VAR_MANAGED_WOOD_INVESTMENT.name);
}

const CONSTRAINED_OUTPUTS: [&str; 6] = [
    VAR_LOST_CAPITAL_DEFORESTATION.name,
    VAR_LOST_CAPITAL_MANAGED_WOOD.name,
    VAR_LOST_CAPITAL_TOTAL.name,
    VAR_TOTAL_MASS.name,
    VAR_MANAGED_WOOD_STANDING.name,
    VAR_PRICE_PER_TONNE.name,
];

#[test]
fn managed_wood_conversion() {
    let scenario = conversion();
    let run = scenario.model.evaluate(&scenario.investments).unwrap();
    let surface = run.surface().unwrap();
    // every year converts managed wood, so the lost capital is not trivially zero
    assert!(surface.managed_wood_converted.values().iter().all(|v| *v > 1e-4));
    assert!(run.lost_capital().unwrap().managed_wood.values()[1] > 1.0);

    check_all(&scenario, &CONSTRAINED_OUTPUTS);
}

#[test]
fn saturated_deforestation() {
    let scenario = saturated();
    let run = scenario.model.evaluate(&scenario.investments).unwrap();
    let lost = run.lost_capital().unwrap();
    assert!(lost.deforestation.values().iter().skip(1).all(|v| *v > 1.0));

    check_all(&scenario, &CONSTRAINED_OUTPUTS);
}
