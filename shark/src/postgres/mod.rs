//! Postgres Frontend and Backend Protocol
//!
//! All communication is through a stream of messages. The first byte of a
//! message identifies the message type, and the next four bytes specify the
//! length of the rest of the message (this length count includes itself,
//! but not the message-type byte).
//!
//! For historical reasons, the very first message sent by the client (the
//! startup message) has no initial message-type byte.
//!
//! <https://www.postgresql.org/docs/17/protocol-overview.html>
pub(crate) mod frontend;
pub(crate) mod backend;
mod error;
mod connection;

pub use connection::PgConnection;
pub use error::{PgError, PgErrors};
