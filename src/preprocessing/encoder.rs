//! One-hot encoding of integer-coded categorical columns

use crate::data::column_i64;
use crate::error::{HeartIqError, Result};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Sorted categories of one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ColumnCategories {
    column: String,
    categories: Vec<i64>,
}

/// One-hot encoder that drops the first (smallest) category of every column.
///
/// A column with `k` categories yields `k - 1` indicator columns; a row in
/// the first category is all zeros. Values not seen at fit time are
/// rejected with [`HeartIqError::UnknownCategory`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    columns: Vec<ColumnCategories>,
    is_fitted: bool,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.columns = columns
            .iter()
            .map(|&name| {
                let mut categories = column_i64(df, name)?;
                categories.sort_unstable();
                categories.dedup();
                Ok(ColumnCategories {
                    column: name.to_string(),
                    categories,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.is_fitted = true;
        Ok(self)
    }

    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(HeartIqError::ModelNotFitted);
        }

        let mut out = Array2::zeros((df.height(), self.n_output_features()));
        let mut offset = 0;
        for col in &self.columns {
            let values = column_i64(df, &col.column)?;
            for (i, value) in values.into_iter().enumerate() {
                let pos = col
                    .categories
                    .binary_search(&value)
                    .map_err(|_| HeartIqError::UnknownCategory {
                        column: col.column.clone(),
                        value: value.to_string(),
                    })?;
                if pos > 0 {
                    out[[i, offset + pos - 1]] = 1.0;
                }
            }
            offset += col.categories.len().saturating_sub(1);
        }
        Ok(out)
    }

    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<Array2<f64>> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    pub fn n_output_features(&self) -> usize {
        self.columns
            .iter()
            .map(|c| c.categories.len().saturating_sub(1))
            .sum()
    }

    /// Output column names in the form `<column>_<category>`
    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .flat_map(|c| {
                c.categories
                    .iter()
                    .skip(1)
                    .map(move |v| format!("{}_{}", c.column, v))
            })
            .collect()
    }

    /// Categories seen at fit time for a column
    pub fn categories(&self, column: &str) -> Option<&[i64]> {
        self.columns
            .iter()
            .find(|c| c.column == column)
            .map(|c| c.categories.as_slice())
    }
}
