//! Every total derivative of a run is lower triangular in years.

use rsforest_components::parameters::DeforestationPolicy;
use rsforest_components::variables::*;
use rsforest_components::{ForestModel, ForestParameters, Investments};
use rsforest_core::timeseries::YearSeries;

fn assert_causal(model: &ForestModel, investments: &Investments) {
    let run = model.evaluate(investments).unwrap();
    for input in [
        VAR_DEFORESTATION_INVESTMENT.name,
        VAR_REFORESTATION_INVESTMENT.name,
        VAR_MANAGED_WOOD_INVESTMENT.name,
        VAR_TRANSPORT_COST.name,
        VAR_MARGIN.name,
    ] {
        let jacobians = run.jacobians_for_input(input).unwrap();
        assert!(!jacobians.is_empty(), "nothing depends on {}", input);
        for (output, jacobian) in jacobians {
            let values = jacobian.values();
            for ((i, k), value) in values.indexed_iter() {
                if k > i {
                    assert_eq!(
                        *value, 0.0,
                        "d({})/d({}) has an entry above the diagonal at ({}, {})",
                        output, input, i, k
                    );
                }
            }
        }
    }
}

#[test]
fn unsaturated_run() {
    let model = ForestModel::from_parameters(ForestParameters {
        year_start: 2020,
        year_end: 2040,
        ..Default::default()
    })
    .unwrap();
    let horizon = model.horizon();
    assert_causal(
        &model,
        &Investments {
            deforestation: YearSeries::constant(horizon, 5.0),
            reforestation: YearSeries::constant(horizon, 2.0),
            managed_wood: YearSeries::constant(horizon, 3.0),
        },
    );
}

fn constrained_model(unmanaged: f64, policy: DeforestationPolicy) -> ForestModel {
    let mut parameters = ForestParameters {
        year_start: 2020,
        year_end: 2040,
        ..Default::default()
    };
    parameters.surface.initial_unmanaged_forest = unmanaged;
    parameters.surface.deforestation_policy = policy;
    ForestModel::from_parameters(parameters).unwrap()
}

fn heavy_deforestation(model: &ForestModel) -> Investments {
    let horizon = model.horizon();
    Investments {
        deforestation: YearSeries::constant(horizon, 20.0),
        reforestation: YearSeries::constant(horizon, 2.0),
        managed_wood: YearSeries::constant(horizon, 1.0),
    }
}

#[test]
fn saturated_run() {
    let model = constrained_model(0.01, DeforestationPolicy::UnmanagedOnly);
    assert_causal(&model, &heavy_deforestation(&model));
}

#[test]
fn managed_wood_conversion_run() {
    let model = constrained_model(0.002, DeforestationPolicy::UnmanagedThenManagedWood);
    let investments = heavy_deforestation(&model);
    let converted = model
        .evaluate(&investments)
        .unwrap()
        .surface()
        .unwrap()
        .managed_wood_converted;
    assert!(converted.values().iter().any(|v| *v > 0.0));
    assert_causal(&model, &investments);
}
