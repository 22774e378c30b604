//! The backend-independent schema and CRUD translator.
use crate::{
    Result,
    backend::Backend,
    clause::{Operator, Select, Where},
    entity::Entity,
    row::QueryResult,
    sql,
};

/// Create `T`'s table, or reconcile the live one against the declaration.
///
/// A missing table is created from the generated column definitions plus a
/// composite `primary key` clause. Otherwise every declared field is
/// compared against the live column: an incompatible type (empty bitwise
/// AND) or a nullability difference issues a column alter, a missing
/// column is added, and live columns without a declaration are dropped.
pub(crate) fn init<T: Entity, B: Backend>(backend: &mut B) -> Result<()> {
    let table = T::default().table_name();

    let Some(mut live) = backend.get_table_info(table)? else {
        let mut definitions = Vec::with_capacity(T::fields().len() + 1);
        for field in T::fields() {
            definitions.push(backend.generate_field(field)?);
        }
        if !T::primary_keys().is_empty() {
            definitions.push(format!("primary key({})", T::primary_keys().join(",")));
        }
        return backend.create_table(table, &definitions);
    };

    for field in T::fields() {
        match live.remove(field.name) {
            Some(info) => {
                let type_changed = !field.ty.compatible(info.ty);
                let nullable_changed = field.nullable != info.nullable;
                if type_changed || nullable_changed {
                    backend.alter_table_column(table, field, type_changed, nullable_changed)?;
                }
            }
            None => backend.alter_table_add_column(table, field)?,
        }
    }

    for leftover in live.keys() {
        backend.alter_table_drop_column(table, leftover)?;
    }

    Ok(())
}

pub(crate) fn select<T: Entity, B: Backend>(
    backend: &mut B,
    columns: Option<&[&str]>,
    select: &Select,
) -> Result<Vec<T>> {
    let table = T::default().table_name();
    let statement = sql::select_statement(table, columns, select, backend);
    let result = backend.query_select(&statement)?;
    Ok(result.bind()?)
}

/// Insert every present field of `entity`.
///
/// Null wrappers are left out so the server can fill defaults and
/// generated keys. A non-empty `primary_keys` asks the backend for the new
/// key values, surfaced as the returned single-row result.
pub(crate) fn insert<T: Entity, B: Backend>(
    backend: &mut B,
    entity: &T,
    primary_keys: &[&str],
) -> Result<Option<QueryResult>> {
    let table = entity.table_name();

    let mut names = Vec::new();
    let mut values = Vec::new();
    for (index, field) in T::fields().iter().enumerate() {
        let value = entity.value(index);
        if value.is_null() {
            continue;
        }
        names.push(field.name);
        values.push(sql::literal(&value, backend));
    }

    backend.insert_into(table, &names, &values, primary_keys)
}

pub(crate) fn update<T: Entity, B: Backend>(
    backend: &mut B,
    entity: &T,
    columns: &[&str],
    clause: Option<Where>,
) -> Result<()> {
    let table = entity.table_name();

    let mut assignments = Vec::with_capacity(columns.len());
    for column in columns {
        let index = T::fields()
            .iter()
            .position(|f| f.name == *column)
            .ok_or_else(|| crate::error::ErrorKind::UnknownColumn((*column).into()))?;
        let value = entity.value(index);
        assignments.push((*column, sql::literal(&value, backend)));
    }

    let clause = clause.or_else(|| id_clause(entity, backend));
    if clause.is_none() {
        log::warn!("update on {table} without a where clause modifies every row");
    }

    let statement = sql::update_statement(table, &assignments, clause.as_ref(), backend);
    backend.query(&statement)
}

pub(crate) fn delete<B: Backend>(backend: &mut B, table: &str, clause: Option<&Where>) -> Result<()> {
    if clause.is_none() {
        log::warn!("delete on {table} without a where clause empties the table");
    }
    let statement = sql::delete_statement(table, clause, backend);
    backend.query(&statement)
}

/// The conjunction of `pk = <entity value>` statements, `None` for an
/// entity without primary keys.
pub(crate) fn id_clause<T: Entity, B: Backend>(entity: &T, backend: &B) -> Option<Where> {
    let mut clause: Option<Where> = None;
    for key in T::primary_keys() {
        let index = T::fields().iter().position(|f| f.name == *key)?;
        let (value, needs_escaping) = match entity.value(index) {
            crate::Value::Char(c) => (c.to_string(), true),
            crate::Value::String(s) | crate::Value::Clob(s) => (s, true),
            other => (sql::literal(&other, backend), false),
        };
        let statement = Where::Statement {
            field: (*key).into(),
            op: Operator::Equals,
            value,
            needs_escaping,
        };
        clause = Some(match clause {
            Some(prior) => prior & statement,
            None => statement,
        });
    }
    clause
}
