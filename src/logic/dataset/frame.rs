use rand::Rng;
use std::collections::HashMap;

use super::sample;
use super::DatasetError;
use crate::logic::features::{ClientRecord, FeatureValue};

/// Row-major reference table with a dense zero-based row index
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<FeatureValue>>,
}

impl Dataset {
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<FeatureValue>>) -> Result<Self, DatasetError> {
        let mut index = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(DatasetError::Parse(format!("duplicate column '{}'", name)));
            }
        }

        if let Some((row, width)) = rows
            .iter()
            .enumerate()
            .map(|(i, r)| (i, r.len()))
            .find(|(_, width)| *width != columns.len())
        {
            return Err(DatasetError::Parse(format!(
                "row {} has {} fields, expected {}",
                row,
                width,
                columns.len()
            )));
        }

        Ok(Self { columns, index, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&FeatureValue> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[col])
    }

    /// Row `id` as a client record (all columns)
    pub fn row(&self, id: usize) -> Option<ClientRecord> {
        let values = self.rows.get(id)?;
        Some(
            self.columns
                .iter()
                .cloned()
                .zip(values.iter().cloned())
                .collect(),
        )
    }

    /// Uniformly random row, with its id
    pub fn random_row<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(usize, ClientRecord)> {
        if self.rows.is_empty() {
            return None;
        }
        let id = rng.gen_range(0..self.rows.len());
        self.row(id).map(|record| (id, record))
    }

    /// Finite numeric values of a column (missing and text cells skipped)
    pub fn column_values(&self, name: &str) -> Vec<f64> {
        match self.column_index(name) {
            Some(col) => self.rows.iter().filter_map(|r| r[col].as_finite()).collect(),
            None => Vec::new(),
        }
    }

    /// Independent fixed-seed draw of up to `size` rows; `self` is untouched
    pub fn sample_rows(&self, size: usize, seed: u64) -> Vec<ClientRecord> {
        sample::sample_indices(self.len(), size, seed)
            .into_iter()
            .filter_map(|id| self.row(id))
            .collect()
    }

    // ------------------------------------------------------------------------
    // Schema edits (loader only)
    // ------------------------------------------------------------------------

    /// Append a derived column, replacing any column with the same name
    pub(crate) fn put_column(&mut self, name: &str, values: Vec<FeatureValue>) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(name) {
            Some(col) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[col] = value;
                }
            }
            None => {
                self.index.insert(name.to_string(), self.columns.len());
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    /// Rename a column; an existing column named `to` is dropped first
    pub(crate) fn rename_column(&mut self, from: &str, to: &str) -> bool {
        if from == to || !self.has_column(from) {
            return false;
        }
        if let Some(col) = self.column_index(to) {
            self.drop_column(col);
        }
        let Some(col) = self.column_index(from) else {
            return false;
        };

        self.index.remove(from);
        self.index.insert(to.to_string(), col);
        self.columns[col] = to.to_string();
        true
    }

    /// Raw values of a column (missing column yields `None`)
    pub(crate) fn column(&self, name: &str) -> Option<Vec<&FeatureValue>> {
        let col = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[col]).collect())
    }

    fn drop_column(&mut self, col: usize) {
        self.columns.remove(col);
        for row in &mut self.rows {
            row.remove(col);
        }
        self.index = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
    }
}
