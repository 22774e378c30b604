//! Result cells and the field conversion table.
use std::fmt;

use time::{
    Date, PrimitiveDateTime, Time,
    format_description::{BorrowedFormatItem as I, Component as C, modifier},
};

use crate::types::{Blob, Clob, ColumnType, Nullable};

/// One decoded result cell, a tagged union over the logical types plus null.
///
/// Also used in the other direction: entity fields surface their current
/// content as a `Value` for statement rendering.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    String(String),
    Binary(Vec<u8>),
    Clob(String),
    Blob(Vec<u8>),
    Date(Date),
    DateTime(PrimitiveDateTime),
    Time(Time),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The logical type of the cell, the empty set for null.
    pub fn type_flag(&self) -> ColumnType {
        match self {
            Value::Null => ColumnType::none(),
            Value::Bool(_) => ColumnType::BOOL,
            Value::Byte(_) => ColumnType::BYTE,
            Value::Short(_) => ColumnType::SHORT,
            Value::Int(_) => ColumnType::INT,
            Value::Long(_) => ColumnType::LONG,
            Value::Float(_) => ColumnType::FLOAT,
            Value::Double(_) => ColumnType::DOUBLE,
            Value::Char(_) => ColumnType::CHAR,
            Value::String(_) => ColumnType::STRING,
            Value::Binary(_) => ColumnType::BINARY,
            Value::Clob(_) => ColumnType::CLOB,
            Value::Blob(_) => ColumnType::BLOB,
            Value::Date(_) => ColumnType::DATE,
            Value::DateTime(_) => ColumnType::DATETIME,
            Value::Time(_) => ColumnType::TIME,
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Byte(_) => "byte",
            Value::Short(_) => "short",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Char(_) => "char",
            Value::String(_) => "string",
            Value::Binary(_) => "binary",
            Value::Clob(_) => "clob",
            Value::Blob(_) => "blob",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Time(_) => "time",
        }
    }
}

/// An error when a result cell does not fit the declared field type.
pub struct TypeMismatch {
    expected: ColumnType,
    found: &'static str,
}

impl TypeMismatch {
    fn new(expected: ColumnType, found: &Value) -> Self {
        Self { expected, found: found.name() }
    }
}

impl std::error::Error for TypeMismatch { }

impl fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected a {:?} cell, found {}", self.expected, self.found)
    }
}

impl fmt::Debug for TypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

/// A rust type that can live in an entity field.
///
/// Carries the logical column type, whether the declaration alone makes the
/// column nullable, and the conversions from and to result cells.
pub trait FieldType: Sized {
    const TYPE: ColumnType;
    const NULLABLE: bool = false;

    fn to_value(&self) -> Value;

    fn from_value(value: &Value) -> Result<Self, TypeMismatch>;
}

macro_rules! field_type {
    ($ty:ty, $flag:ident, |$self:ident| $to:expr, $($pat:pat $(if $guard:expr)? => $from:expr,)*) => {
        impl FieldType for $ty {
            const TYPE: ColumnType = ColumnType::$flag;

            fn to_value(&$self) -> Value {
                $to
            }

            fn from_value(value: &Value) -> Result<Self, TypeMismatch> {
                match value {
                    $($pat $(if $guard)? => $from,)*
                    other => Err(TypeMismatch::new(Self::TYPE, other)),
                }
            }
        }
    };
}

field_type!(bool, BOOL, |self| Value::Bool(*self),
    Value::Bool(v) => Ok(*v),
    // mysql renders boolean as tinyint(1)
    Value::Byte(v) => Ok(*v != 0),
);

field_type!(i8, BYTE, |self| Value::Byte(*self),
    Value::Byte(v) => Ok(*v),
);

field_type!(i16, SHORT, |self| Value::Short(*self),
    Value::Short(v) => Ok(*v),
);

field_type!(i32, INT, |self| Value::Int(*self),
    Value::Int(v) => Ok(*v),
    // generated keys come back as 8-byte integers on both backends
    Value::Long(v) => i32::try_from(*v)
        .map_err(|_| TypeMismatch::new(Self::TYPE, &Value::Long(*v))),
);

field_type!(i64, LONG, |self| Value::Long(*self),
    Value::Long(v) => Ok(*v),
    Value::Int(v) => Ok(i64::from(*v)),
);

field_type!(f32, FLOAT, |self| Value::Float(*self),
    Value::Float(v) => Ok(*v),
);

field_type!(f64, DOUBLE, |self| Value::Double(*self),
    Value::Double(v) => Ok(*v),
    Value::Float(v) => Ok(f64::from(*v)),
);

field_type!(char, CHAR, |self| Value::Char(*self),
    Value::Char(v) => Ok(*v),
    Value::String(v) if v.chars().count() == 1 => Ok(v.chars().next().unwrap()),
);

field_type!(String, STRING, |self| Value::String(self.clone()),
    Value::String(v) | Value::Clob(v) => Ok(v.clone()),
    Value::Char(v) => Ok(v.to_string()),
);

field_type!(Vec<u8>, BINARY, |self| Value::Binary(self.clone()),
    Value::Binary(v) => Ok(v.clone()),
    Value::Blob(v) => Ok(v.clone()),
);

field_type!(Clob, CLOB, |self| Value::Clob(self.0.clone()),
    Value::Clob(v) => Ok(Clob(v.clone())),
    Value::String(v) => Ok(Clob(v.clone())),
);

field_type!(Blob, BLOB, |self| Value::Blob(self.0.clone()),
    Value::Blob(v) => Ok(Blob(v.clone())),
    Value::Binary(v) => Ok(Blob(v.clone())),
);

field_type!(Date, DATE, |self| Value::Date(*self),
    Value::Date(v) => Ok(*v),
);

field_type!(PrimitiveDateTime, DATETIME, |self| Value::DateTime(*self),
    Value::DateTime(v) => Ok(*v),
);

field_type!(Time, TIME, |self| Value::Time(*self),
    Value::Time(v) => Ok(*v),
);

impl<T: FieldType> FieldType for Nullable<T> {
    const TYPE: ColumnType = T::TYPE;
    const NULLABLE: bool = true;

    fn to_value(&self) -> Value {
        match self.get() {
            Some(value) => value.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: &Value) -> Result<Self, TypeMismatch> {
        match value {
            Value::Null => Ok(Nullable::null()),
            other => T::from_value(other).map(Nullable::new),
        }
    }
}

// ===== Wire text formats =====

const DATE_FORMAT: &[I<'_>] = &[
    I::Component(C::Year(modifier::Year::default())),
    I::Literal(b"-"),
    I::Component(C::Month(modifier::Month::default())),
    I::Literal(b"-"),
    I::Component(C::Day(modifier::Day::default())),
];

const TIME_FORMAT: &[I<'_>] = &[
    I::Component(C::Hour(modifier::Hour::default())),
    I::Literal(b":"),
    I::Component(C::Minute(modifier::Minute::default())),
    I::Literal(b":"),
    I::Component(C::Second(modifier::Second::default())),
];

const SUBSECOND: &[I<'_>] = &[
    I::Literal(b"."),
    I::Component(C::Subsecond(modifier::Subsecond::default())),
];

const DATETIME_FORMAT: &[I<'_>] = &[
    I::Compound(DATE_FORMAT),
    I::Literal(b" "),
    I::Compound(TIME_FORMAT),
];

/// `2019-01-01 00:27:43[.n]`, the `timestamp`/`datetime` text form.
const DATETIME_PARSE: &[I<'_>] = &[
    I::Compound(DATETIME_FORMAT),
    I::Optional(&I::Compound(SUBSECOND)),
];

/// `00:36:12[.n]`, the `time` text form.
const TIME_PARSE: &[I<'_>] = &[
    I::Compound(TIME_FORMAT),
    I::Optional(&I::Compound(SUBSECOND)),
];

const DATETIME_SUBSEC: &[I<'_>] = &[
    I::Compound(DATETIME_FORMAT),
    I::Compound(SUBSECOND),
];

const TIME_SUBSEC: &[I<'_>] = &[
    I::Compound(TIME_FORMAT),
    I::Compound(SUBSECOND),
];

pub(crate) fn parse_date(text: &str) -> Result<Date, time::error::Parse> {
    Date::parse(text, DATE_FORMAT)
}

pub(crate) fn parse_time(text: &str) -> Result<Time, time::error::Parse> {
    Time::parse(text, TIME_PARSE)
}

pub(crate) fn parse_datetime(text: &str) -> Result<PrimitiveDateTime, time::error::Parse> {
    PrimitiveDateTime::parse(text, DATETIME_PARSE)
}

pub(crate) fn format_date(date: &Date) -> String {
    date.format(DATE_FORMAT).expect("format is statically known")
}

pub(crate) fn format_time(time: &Time) -> String {
    let format = match time.nanosecond() {
        0 => TIME_FORMAT,
        _ => TIME_SUBSEC,
    };
    time.format(format).expect("format is statically known")
}

pub(crate) fn format_datetime(datetime: &PrimitiveDateTime) -> String {
    let format = match datetime.nanosecond() {
        0 => DATETIME_FORMAT,
        _ => DATETIME_SUBSEC,
    };
    datetime.format(format).expect("format is statically known")
}
