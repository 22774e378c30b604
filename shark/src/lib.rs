//! Native database connector with a typed entity layer.
//!
//! A record type declares its columns once and gets its table created,
//! reconciled and queried without hand-written statements, over either of
//! two from-scratch wire clients: postgres (frontend/backend protocol v3)
//! and mysql (client/server protocol v4.1+).
//!
//! # Examples
//!
//! ```no_run
//! use shark::{Database, Entity, Nullable, clause::var};
//!
//! #[derive(Default, Entity)]
//! #[sql("test")]
//! struct Test {
//!     #[sql(primary_key, auto_increment)]
//!     test_id: Nullable<i32>,
//!     #[sql(not_null)]
//!     a: Nullable<i32>,
//!     #[sql(unique)]
//!     b: Nullable<i16>,
//! }
//!
//! # fn app() -> shark::Result<()> {
//! let mut db = Database::postgres("post", "user", "passwd")?;
//!
//! // create, or alter a live table into shape
//! db.init::<Test>()?;
//!
//! let mut row = Test::default();
//! row.a.set(55);
//! row.b.set(-1);
//! db.insert(&mut row)?;
//!
//! // the generated key came back with the insert
//! assert!(!row.test_id.is_null());
//!
//! // filters compose with `&` and `|`
//! let rows: Vec<Test> = db.select(var("a").less_than(40) & var("b").not_equals(0))?;
//! # let _ = rows;
//! # Ok(())
//! # }
//! ```

mod common;
mod ext;

// Framing
pub mod stream;

// Data model
pub mod types;
mod value;
mod entity;

// Translator
pub mod clause;
pub mod sql;
mod schema;
pub mod backend;
pub mod row;

// Wire clients
pub mod postgres;
pub mod mysql;

// Connection
mod config;
mod database;

mod error;

#[doc(inline)]
pub use backend::{Backend, TableInfo};
#[doc(inline)]
pub use clause::{Limit, Order, Select, Where, var};
#[doc(inline)]
pub use config::Config;
#[doc(inline)]
pub use database::{Database, MysqlDatabase, PgDatabase};
#[doc(inline)]
pub use entity::{Entity, FieldSpec};
#[doc(inline)]
pub use error::{Error, ErrorKind, Result};
#[doc(inline)]
pub use row::QueryResult;
#[doc(inline)]
pub use types::{Blob, Clob, ColumnType, Nullable};
#[doc(inline)]
pub use value::{FieldType, TypeMismatch, Value};

#[cfg(feature = "macros")]
pub use shark_macros::Entity;
