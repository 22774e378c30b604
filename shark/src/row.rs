//! Binding result rows onto entities.
use std::fmt;

use crate::{Value, entity::Entity, value::TypeMismatch};

/// A decoded result set: column names plus positionally typed cells.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryResult {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl QueryResult {
    pub(crate) fn new(columns: Vec<String>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    pub(crate) fn push(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.columns.len(), "row width must match the description");
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Bind every row onto a fresh entity.
    pub fn bind<T: Entity>(&self) -> Result<Vec<T>, BindError> {
        let mut entities = Vec::with_capacity(self.rows.len());
        for row in 0..self.rows.len() {
            let mut entity = T::default();
            self.apply_onto(row, &mut entity)?;
            entities.push(entity);
        }
        Ok(entities)
    }

    /// Write the cells of row `row` into the matching fields of `entity`.
    ///
    /// Fields without a column in this result are left untouched, which is
    /// what a projected select relies on.
    pub(crate) fn apply_onto<T: Entity>(&self, row: usize, entity: &mut T) -> Result<(), BindError> {
        for (field, spec) in T::fields().iter().enumerate() {
            let Some(column) = self.column(spec.name) else {
                continue;
            };
            entity
                .apply(field, &self.rows[row][column])
                .map_err(|mismatch| BindError { column: spec.name, mismatch })?;
        }
        Ok(())
    }
}

/// An error when a result row does not fit the entity declaration.
pub struct BindError {
    column: &'static str,
    mismatch: TypeMismatch,
}

impl std::error::Error for BindError { }

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to bind column {}: {}", self.column, self.mismatch)
    }
}

impl fmt::Debug for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}
