//! Statement rendering and value escaping.
//!
//! Everything here is backend independent; the backend only contributes
//! its dialect capabilities ([`escape_binary`][crate::backend::Backend::escape_binary],
//! [`random_function`][crate::backend::Backend::random_function]).
use crate::{
    backend::Backend,
    clause::{Limit, Order, Select, Where},
    value::{self, Value},
};

/// Quote a string literal, doubling inner quotes.
pub fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        if c == '\'' {
            out.push('\'');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

/// Render a cell as a statement literal.
pub(crate) fn literal<B: Backend + ?Sized>(value: &Value, backend: &B) -> String {
    match value {
        Value::Null => String::from("null"),
        Value::Bool(v) => String::from(if *v { "true" } else { "false" }),
        Value::Byte(v) => itoa::Buffer::new().format(*v).into(),
        Value::Short(v) => itoa::Buffer::new().format(*v).into(),
        Value::Int(v) => itoa::Buffer::new().format(*v).into(),
        Value::Long(v) => itoa::Buffer::new().format(*v).into(),
        Value::Float(v) => ryu::Buffer::new().format(*v).into(),
        Value::Double(v) => ryu::Buffer::new().format(*v).into(),
        Value::Char(v) => backend.escape_string(&v.to_string()),
        Value::String(v) | Value::Clob(v) => backend.escape_string(v),
        Value::Binary(v) | Value::Blob(v) => backend.escape_binary(v),
        Value::Date(v) => backend.escape_string(&value::format_date(v)),
        Value::DateTime(v) => backend.escape_string(&value::format_datetime(v)),
        Value::Time(v) => backend.escape_string(&value::format_time(v)),
    }
}

/// Render a filter tree by recursive descent.
pub(crate) fn render_where<B: Backend + ?Sized>(clause: &Where, backend: &B, out: &mut String) {
    match clause {
        Where::Statement { field, op, value, needs_escaping } => {
            out.push_str(field);
            out.push(' ');
            out.push_str(op.word());
            out.push(' ');
            match needs_escaping {
                true => out.push_str(&backend.escape_string(value)),
                false => out.push_str(value),
            }
        }
        Where::Complex { left, glue, right } => {
            out.push('(');
            render_where(&**left, backend, out);
            out.push_str(") ");
            out.push_str(glue.word());
            out.push_str(" (");
            render_where(&**right, backend, out);
            out.push(')');
        }
    }
}

pub(crate) fn render_order(order: &Order, random_function: &str, out: &mut String) {
    if order.rand {
        out.push_str(random_function);
        return;
    }
    let mut fields = order.fields.iter();
    let Some(first) = fields.next() else { return };
    out.push_str(&first.name);
    out.push_str(if first.asc { " asc" } else { " desc" });
    for field in fields {
        out.push_str(", ");
        out.push_str(&field.name);
        out.push_str(if field.asc { " asc" } else { " desc" });
    }
}

pub(crate) fn render_limit(limit: &Limit, out: &mut String) {
    if limit.is_none() {
        return;
    }
    out.push_str("limit ");
    if limit.lower != 0 {
        out.push_str(itoa::Buffer::new().format(limit.lower));
        out.push(',');
    }
    out.push_str(itoa::Buffer::new().format(limit.upper));
}

/// `select <cols> from <table> [where ..] [order by ..] [limit ..]`.
pub(crate) fn select_statement<B: Backend + ?Sized>(
    table: &str,
    columns: Option<&[&str]>,
    select: &Select,
    backend: &B,
) -> String {
    let mut sql = String::from("select ");
    match columns {
        Some(columns) => sql.push_str(&columns.join(",")),
        None => sql.push('*'),
    }
    sql.push_str(" from ");
    sql.push_str(table);

    if let Some(clause) = &select.filter {
        sql.push_str(" where ");
        render_where(clause, backend, &mut sql);
    }
    if let Some(order) = &select.order {
        sql.push_str(" order by ");
        render_order(order, backend.random_function(), &mut sql);
    }
    if !select.limit.is_none() {
        sql.push(' ');
        render_limit(&select.limit, &mut sql);
    }
    sql.push(';');
    sql
}

/// `insert into <table> (<names>) values (<values>)`, without terminator
/// so backends can extend it.
pub(crate) fn insert_statement(table: &str, names: &[&str], values: &[String]) -> String {
    let mut sql = String::from("insert into ");
    sql.push_str(table);
    sql.push_str(" (");
    sql.push_str(&names.join(","));
    sql.push_str(") values (");
    sql.push_str(&values.join(","));
    sql.push(')');
    sql
}

/// `update <table> set n1=v1,.. [where ..]`.
pub(crate) fn update_statement<B: Backend + ?Sized>(
    table: &str,
    assignments: &[(&str, String)],
    clause: Option<&Where>,
    backend: &B,
) -> String {
    let mut sql = String::from("update ");
    sql.push_str(table);
    sql.push_str(" set ");
    let mut first = true;
    for (name, value) in assignments {
        if !first {
            sql.push(',');
        }
        sql.push_str(name);
        sql.push('=');
        sql.push_str(value);
        first = false;
    }
    if let Some(clause) = clause {
        sql.push_str(" where ");
        render_where(clause, backend, &mut sql);
    }
    sql.push(';');
    sql
}

/// `delete from <table> [where ..]`.
pub(crate) fn delete_statement<B: Backend + ?Sized>(
    table: &str,
    clause: Option<&Where>,
    backend: &B,
) -> String {
    let mut sql = String::from("delete from ");
    sql.push_str(table);
    if let Some(clause) = clause {
        sql.push_str(" where ");
        render_where(clause, backend, &mut sql);
    }
    sql.push(';');
    sql
}
