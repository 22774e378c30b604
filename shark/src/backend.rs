//! The backend capability set consumed by the translator.
use std::collections::HashMap;

use crate::{Result, entity::FieldSpec, row::QueryResult, types::ColumnType};

/// Live column metadata reported by the server about an existing table.
#[derive(Clone, Debug, PartialEq)]
pub struct TableInfo {
    pub name: String,
    /// Logical type mask of the live column. One database type can cover
    /// several logical types.
    pub ty: ColumnType,
    pub length: usize,
    pub nullable: bool,
    pub default_value: String,
}

/// Everything a wire backend must supply to the schema/CRUD translator.
///
/// The shared statement shapes (`create table`, `add column`,
/// `drop column`, string escaping) are provided; a backend overrides only
/// where its dialect differs.
pub trait Backend {
    /// Live column metadata of `table`, keyed by column name.
    ///
    /// `None` when the table does not exist.
    fn get_table_info(&mut self, table: &str) -> Result<Option<HashMap<String, TableInfo>>>;

    /// Render one column definition of a `create table`/`add column`.
    fn generate_field(&self, field: &FieldSpec) -> Result<String>;

    /// Change the type and/or nullability of a live column.
    ///
    /// Only the clauses selected by the two flags are emitted.
    fn alter_table_column(
        &mut self,
        table: &str,
        field: &FieldSpec,
        type_changed: bool,
        nullable_changed: bool,
    ) -> Result<()>;

    /// Insert a row. A non-empty `primary_keys` requests the new key
    /// values back as a single-row result.
    fn insert_into(
        &mut self,
        table: &str,
        names: &[&str],
        values: &[String],
        primary_keys: &[&str],
    ) -> Result<Option<QueryResult>>;

    /// The dialect's random-ordering function.
    fn random_function(&self) -> &'static str;

    /// Render a binary value as a statement literal.
    fn escape_binary(&self, bytes: &[u8]) -> String;

    /// Execute a statement that produces no rows.
    fn query(&mut self, sql: &str) -> Result<()>;

    /// Execute a statement and collect its result rows.
    fn query_select(&mut self, sql: &str) -> Result<QueryResult>;

    /// Render a string value as a quoted statement literal.
    fn escape_string(&self, value: &str) -> String {
        crate::sql::escape_string(value)
    }

    fn create_table(&mut self, table: &str, definitions: &[String]) -> Result<()> {
        self.query(&format!("create table {} ({});", table, definitions.join(",")))
    }

    fn alter_table_add_column(&mut self, table: &str, field: &FieldSpec) -> Result<()> {
        let definition = self.generate_field(field)?;
        self.query(&format!("alter table {table} add column {definition};"))
    }

    fn alter_table_drop_column(&mut self, table: &str, column: &str) -> Result<()> {
        self.query(&format!("alter table {table} drop column {column};"))
    }
}
