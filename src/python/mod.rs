use log::debug;
use numpy::{PyArray1, PyArray2, PyReadonlyArray1, ToPyArray};
use pyo3::exceptions::{PyKeyError, PyValueError};
use pyo3::prelude::*;
use rsforest_components::{ForestModel, ForestParameters, ForestRun, Investments};
use rsforest_core::errors::RSForestError;
use rsforest_core::timeseries::{Year, YearSeries};

fn to_py_err(error: RSForestError) -> PyErr {
    match error {
        RSForestError::UnknownVariable(name) => PyKeyError::new_err(name),
        other => PyValueError::new_err(other.to_string()),
    }
}

fn to_series(year_start: Year, values: PyReadonlyArray1<f64>) -> PyResult<YearSeries> {
    YearSeries::new(year_start, values.as_array().to_owned()).map_err(to_py_err)
}

/// Forest model built from a dict of parameters, or the defaults
///
/// Example:
///     model = ForestModel({"year_start": 2020, "year_end": 2050})
///     run = model.evaluate(2020, deforestation, reforestation, managed_wood)
///     run.jacobian("CO2 Emissions|Forest|Cumulative", "Investment|Deforestation")
#[pyclass]
#[pyo3(name = "ForestModel")]
pub struct PyForestModel(ForestModel);

#[pymethods]
impl PyForestModel {
    #[new]
    #[pyo3(signature = (parameters=None))]
    fn new(parameters: Option<Bound<'_, PyAny>>) -> PyResult<Self> {
        let parameters = match parameters {
            Some(parameters) => pythonize::depythonize_bound::<ForestParameters>(parameters)
                .map_err(|e| PyValueError::new_err(format!("{}", e)))?,
            None => ForestParameters::default(),
        };
        Ok(Self(
            ForestModel::from_parameters(parameters).map_err(to_py_err)?,
        ))
    }

    #[getter]
    fn year_start(&self) -> Year {
        self.0.horizon().year_start
    }

    #[getter]
    fn year_end(&self) -> Year {
        self.0.horizon().year_end
    }

    fn evaluate(
        &self,
        year_start: Year,
        deforestation: PyReadonlyArray1<f64>,
        reforestation: PyReadonlyArray1<f64>,
        managed_wood: PyReadonlyArray1<f64>,
    ) -> PyResult<PyForestRun> {
        let investments = Investments {
            deforestation: to_series(year_start, deforestation)?,
            reforestation: to_series(year_start, reforestation)?,
            managed_wood: to_series(year_start, managed_wood)?,
        };
        debug!("Evaluating forest model from Python");
        Ok(PyForestRun(self.0.evaluate(&investments).map_err(to_py_err)?))
    }
}

#[pyclass]
#[pyo3(name = "ForestRun")]
pub struct PyForestRun(ForestRun);

#[pymethods]
impl PyForestRun {
    fn names(&self) -> Vec<String> {
        self.0.names().into_iter().map(str::to_string).collect()
    }

    fn series<'py>(&self, py: Python<'py>, name: &str) -> PyResult<Bound<'py, PyArray1<f64>>> {
        let series = self.0.series(name).map_err(to_py_err)?;
        Ok(series.values().to_pyarray_bound(py))
    }

    /// Total derivative of `output` with respect to `input`, rows are output years
    fn jacobian<'py>(
        &self,
        py: Python<'py>,
        output: &str,
        input: &str,
    ) -> PyResult<Bound<'py, PyArray2<f64>>> {
        let jacobian = self.0.jacobian(output, input).map_err(to_py_err)?;
        Ok(jacobian.values().to_pyarray_bound(py))
    }
}

#[pymodule]
#[pyo3(name = "_lib")]
fn rsforest(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add_class::<PyForestModel>()?;
    m.add_class::<PyForestRun>()?;
    Ok(())
}
