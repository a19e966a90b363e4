use crate::errors::{RSForestError, RSForestResult};
use crate::timeseries::YearSeries;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, PartialOrd, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum VariableType {
    /// Fixed values defined outside of the model
    Exogenous,
    /// Values chosen by the optimizer for each evaluation
    Decision,
    /// Values that are determined within the model
    Endogenous,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeseriesItem {
    pub series: YearSeries,
    pub name: String,
    pub variable_type: VariableType,
}

/// A collection of named yearly series.
///
/// Allows for easy access to series by name across the whole model.
/// Names are unique within a collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeseriesCollection {
    items: Vec<TimeseriesItem>,
}

impl TimeseriesCollection {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add a new series to the collection
    ///
    /// Fails if a series with the same name already exists in the collection
    pub fn add_timeseries(
        &mut self,
        name: &str,
        series: YearSeries,
        variable_type: VariableType,
    ) -> RSForestResult<()> {
        if self.get_by_name(name).is_some() {
            return Err(RSForestError::Error(format!(
                "timeseries {} already exists",
                name
            )));
        }

        self.items.push(TimeseriesItem {
            series,
            name: name.to_string(),
            variable_type,
        });
        Ok(())
    }

    pub fn get_by_name(&self, name: &str) -> Option<&TimeseriesItem> {
        self.items.iter().find(|x| x.name == name)
    }

    pub fn get_series(&self, name: &str) -> Option<&YearSeries> {
        self.get_by_name(name).map(|item| &item.series)
    }

    /// Same as [`Self::get_series`] but reports a missing series as an error
    pub fn require(&self, name: &str) -> RSForestResult<&YearSeries> {
        self.get_series(name)
            .ok_or_else(|| RSForestError::UnknownVariable(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get_by_name(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeseriesItem> {
        self.items.iter()
    }

    /// Move every item of `other` into this collection
    pub fn extend(&mut self, other: TimeseriesCollection) -> RSForestResult<()> {
        for item in other.items {
            self.add_timeseries(&item.name, item.series, item.variable_type)?;
        }
        Ok(())
    }
}

impl IntoIterator for TimeseriesCollection {
    type Item = TimeseriesItem;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
