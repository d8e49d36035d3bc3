//! Column-oriented feature table.

use crate::error::{Error, Result};

/// Rectangular table of named numeric columns.
///
/// Columns keep their insertion order; rows are addressed by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureBatch {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl FeatureBatch {
    /// Empty batch with no columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(name, values)` pairs. All columns must have equal length
    /// and distinct names.
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Vec<f64>)>) -> Result<Self> {
        let mut batch = Self::new();
        for (name, values) in columns {
            batch = batch.with_column(name, values)?;
        }
        Ok(batch)
    }

    /// Build from row-major data with the given column names.
    pub fn from_rows<S: AsRef<str>>(names: &[S], rows: &[Vec<f64>]) -> Result<Self> {
        let mut columns = vec![Vec::with_capacity(rows.len()); names.len()];
        for (i, row) in rows.iter().enumerate() {
            if row.len() != names.len() {
                return Err(Error::Validation(format!(
                    "row {i} has {} values, expected {}",
                    row.len(),
                    names.len()
                )));
            }
            for (column, &value) in columns.iter_mut().zip(row) {
                column.push(value);
            }
        }
        Self::from_columns(
            names.iter().map(|n| n.as_ref().to_string()).zip(columns).collect(),
        )
    }

    /// Add a column, consuming and returning the batch.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        let name = name.into();
        if self.names.contains(&name) {
            return Err(Error::Validation(format!("duplicate column '{name}'")));
        }
        if !self.columns.is_empty() && values.len() != self.n_rows() {
            return Err(Error::Validation(format!(
                "column '{name}' has {} rows, expected {}",
                values.len(),
                self.n_rows()
            )));
        }
        self.names.push(name);
        self.columns.push(values);
        Ok(self)
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// Number of columns.
    pub fn n_columns(&self) -> usize {
        self.names.len()
    }

    /// True when there are no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    /// Column names in order.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Values of a named column.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.columns[i].as_slice())
    }

    /// Iterate `(name, values)` pairs.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter().map(Vec::as_slice))
    }

    /// One row as a vector.
    pub fn row(&self, index: usize) -> Option<Vec<f64>> {
        if index >= self.n_rows() {
            return None;
        }
        Some(self.columns.iter().map(|c| c[index]).collect())
    }

    /// Row-major copy of the data, as consumed by classifiers.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.n_rows())
            .map(|i| self.columns.iter().map(|c| c[i]).collect())
            .collect()
    }

    /// Subset of rows by index. Out-of-range indices are ignored.
    pub fn select(&self, indices: &[usize]) -> Self {
        let n = self.n_rows();
        let columns = self
            .columns
            .iter()
            .map(|c| indices.iter().filter(|&&i| i < n).map(|&i| c[i]).collect())
            .collect();
        Self {
            names: self.names.clone(),
            columns,
        }
    }

    /// Stack `other` below `self`. Column names must match in order.
    pub fn concat(&self, other: &Self) -> Result<Self> {
        if self.n_columns() == 0 {
            return Ok(other.clone());
        }
        if other.n_columns() == 0 {
            return Ok(self.clone());
        }
        if self.names != other.names {
            return Err(Error::Validation(format!(
                "cannot concatenate batches with columns {:?} and {:?}",
                self.names, other.names
            )));
        }
        let columns = self
            .columns
            .iter()
            .zip(&other.columns)
            .map(|(a, b)| a.iter().chain(b).copied().collect())
            .collect();
        Ok(Self {
            names: self.names.clone(),
            columns,
        })
    }
}
