//! The entity contract between declared record types and the translator.
use crate::{TypeMismatch, Value, types::ColumnType};

/// Canonical description of one entity field, produced at derive time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldSpec {
    /// Resolved column name.
    pub name: &'static str,
    /// Logical column type.
    pub ty: ColumnType,
    /// Declared length, 0 when unspecified.
    pub length: usize,
    pub nullable: bool,
    pub unique: bool,
    pub auto_increment: bool,
    /// Column default expression, empty when unspecified.
    pub default_value: &'static str,
}

/// A record type whose fields map onto table columns.
///
/// Usually implemented with `#[derive(Entity)]`:
///
/// ```ignore
/// #[derive(Default, Entity)]
/// #[sql("test")]
/// struct Test {
///     #[sql(primary_key, auto_increment)]
///     test_id: Nullable<i32>,
///     #[sql(name = "string", length = 10)]
///     test: Nullable<String>,
/// }
/// ```
///
/// The table name is queried from an instance, never derived from the type
/// identity. Fields are addressed positionally in declaration order, with
/// names resolved per [`fields`][Entity::fields].
pub trait Entity: Default {
    /// The table this entity maps onto.
    fn table_name(&self) -> &'static str;

    /// Field descriptions in declaration order.
    fn fields() -> &'static [FieldSpec];

    /// Resolved column names of the primary key, possibly composite.
    fn primary_keys() -> &'static [&'static str];

    /// The current content of field `field` as a cell.
    fn value(&self, field: usize) -> Value;

    /// Write a result cell into field `field`.
    ///
    /// A null cell nullifies a nullable field and is a mismatch for a raw
    /// one. Indexes past the declared fields are ignored.
    fn apply(&mut self, field: usize, value: &Value) -> Result<(), TypeMismatch>;
}
