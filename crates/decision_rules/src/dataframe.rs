//! Conversion of polars frames and series into [`Dataset`]s and target vectors.
//!
//! Integer and float columns become `Value::Number`, every other dtype is cast
//! to strings and becomes `Value::Nominal`. Nulls are kept as `Value::Null`.

use crate::dataset::{Dataset, Value};
use crate::error::Result;
use polars::prelude::*;

fn is_numeric(dtype: &DataType) -> bool {
    dtype.is_integer() || dtype.is_float()
}

/// Values of a series, numeric or nominal depending on its dtype.
pub fn values_from_series(series: &Series) -> Result<Vec<Value>> {
    if is_numeric(series.dtype()) {
        let casted = series.cast(&DataType::Float64)?;
        Ok(casted.f64()?.into_iter().map(Value::from).collect())
    } else {
        let casted = series.cast(&DataType::String)?;
        Ok(casted
            .str()?
            .into_iter()
            .map(|v| v.map_or(Value::Null, Value::from))
            .collect())
    }
}

/// Class labels or survival statuses.
pub fn targets_from_series(series: &Series) -> Result<Vec<Value>> {
    values_from_series(series)
}

/// Numeric targets, nulls and unparsable entries become NaN.
pub fn numeric_targets_from_series(series: &Series) -> Result<Vec<f64>> {
    Ok(values_from_series(series)?
        .iter()
        .map(|v| v.as_f64().unwrap_or(f64::NAN))
        .collect())
}

impl Dataset {
    /// Dataset plus column names, in frame order.
    pub fn from_dataframe(df: &DataFrame) -> Result<(Self, Vec<String>)> {
        let mut names = Vec::with_capacity(df.width());
        let mut columns = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            names.push(column.name().to_string());
            columns.push(values_from_series(column.as_materialized_series())?);
        }
        Ok((Dataset::from_columns(columns)?, names))
    }
}
