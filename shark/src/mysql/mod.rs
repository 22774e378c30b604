//! Mysql Client/Server Protocol (v4.1+)
//!
//! Packets are framed by a 3-byte little-endian length and a sequence
//! counter byte which restarts at zero for every command round-trip.
//! There is no message-type byte; packets are told apart by their first
//! body byte and the conversation phase.
//!
//! <https://dev.mysql.com/doc/dev/mysql-server/latest/PAGE_PROTOCOL.html>
pub(crate) mod packet;
pub(crate) mod auth;
mod error;
mod connection;

pub use connection::MysqlConnection;
pub use error::MysqlError;
