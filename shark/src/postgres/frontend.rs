//! Postgres Frontend Messages
//!
//! All struct fields here mirror the actual message sent to postgres. The
//! frame header is written by the packet stream; messages encode only
//! their body.
use bytes::{BufMut, BytesMut};

use crate::ext::{BufMutExt, UsizeExt};

/// A type which can be encoded into a postgres frontend message.
pub trait FrontendProtocol {
    /// message type
    const MSGTYPE: u8;

    /// write the main body of the message
    fn encode(self, buf: &mut BytesMut);
}

/// Postgres Startup frontend message
///
/// For historical reasons, the very first message sent by the client (the
/// startup message) has no initial message-type byte.
///
/// Thus, [`Startup`] does not implement [`FrontendProtocol`]
#[derive(Debug)]
pub struct Startup<'a> {
    /// The database user name to connect as. Required; there is no default.
    pub user: &'a str,
    /// The database to connect to. Defaults to the user name.
    pub database: &'a str,
}

impl Startup<'_> {
    pub fn encode(self, buf: &mut BytesMut) {
        // Int32(196608)
        // The protocol version number. The most significant 16 bits are
        // the major version number (3 for the protocol described here).
        buf.put_i32(196608);

        // The protocol version number is followed by one or more pairs of
        // parameter name and value strings.
        buf.put_nul_string("user");
        buf.put_nul_string(self.user);
        buf.put_nul_string("database");
        buf.put_nul_string(self.database);

        // A zero byte is required as a terminator after the last
        // name/value pair.
        buf.put_u8(b'\0');
    }
}

/// Identifies the message as a password response.
#[derive(Debug)]
pub struct PasswordMessage<'a> {
    /// The password (encrypted, if requested).
    pub password: &'a str,
}

impl FrontendProtocol for PasswordMessage<'_> {
    const MSGTYPE: u8 = b'p';

    fn encode(self, buf: &mut BytesMut) {
        buf.put_nul_string(self.password);
    }
}

/// Identifies the message as a simple query.
pub struct Query<'a> {
    /// the query string itself
    pub sql: &'a str,
}

impl FrontendProtocol for Query<'_> {
    const MSGTYPE: u8 = b'Q';

    fn encode(self, buf: &mut BytesMut) {
        buf.put_nul_string(self.sql);
    }
}

/// Identifies the message as a Parse command.
pub struct Parse<'a> {
    /// prepared statement name (an empty string selects the unnamed
    /// prepared statement).
    pub prepare_name: &'a str,
    /// The query string to be parsed.
    pub sql: &'a str,
    /// Object IDs of the prespecified parameter data types.
    pub param_types: &'a [u32],
}

impl FrontendProtocol for Parse<'_> {
    const MSGTYPE: u8 = b'P';

    fn encode(self, buf: &mut BytesMut) {
        buf.put_nul_string(self.prepare_name);
        buf.put_nul_string(self.sql);
        buf.put_i16(self.param_types.len() as i16);
        for oid in self.param_types {
            buf.put_u32(*oid);
        }
    }
}

/// Identifies the message as a Bind command.
///
/// Both parameters and result columns use the text format here.
pub struct Bind<'a> {
    /// The name of the destination portal (an empty string selects the
    /// unnamed portal).
    pub portal_name: &'a str,
    /// The name of the source prepared statement.
    pub stmt_name: &'a str,
    /// Text parameter values, `None` for null.
    pub params: &'a [Option<&'a str>],
}

impl FrontendProtocol for Bind<'_> {
    const MSGTYPE: u8 = b'B';

    fn encode(self, buf: &mut BytesMut) {
        buf.put_nul_string(self.portal_name);
        buf.put_nul_string(self.stmt_name);

        // one format code per parameter, all text
        buf.put_u16(self.params.len() as u16);
        for _ in self.params {
            buf.put_u16(0);
        }

        // Int32 length, -1 for null, then the value bytes
        buf.put_u16(self.params.len() as u16);
        for param in self.params {
            match param {
                Some(value) => {
                    buf.put_i32(value.len().to_u32() as i32);
                    buf.put_slice(value.as_bytes());
                }
                None => buf.put_i32(-1),
            }
        }

        // one result format code, text
        buf.put_u16(1);
        buf.put_u16(0);
    }
}

/// Identifies the message as an Execute command.
pub struct Execute<'a> {
    /// The name of the portal to execute (an empty string selects the
    /// unnamed portal).
    pub portal_name: &'a str,
    /// Maximum number of rows to return. Zero denotes "no limit".
    pub max_rows: i32,
}

impl FrontendProtocol for Execute<'_> {
    const MSGTYPE: u8 = b'E';

    fn encode(self, buf: &mut BytesMut) {
        buf.put_nul_string(self.portal_name);
        buf.put_i32(self.max_rows);
    }
}

/// Identifies the message as a Sync command.
pub struct Sync;

impl FrontendProtocol for Sync {
    const MSGTYPE: u8 = b'S';

    fn encode(self, _: &mut BytesMut) { }
}

/// Identifies the message as a Flush command.
pub struct Flush;

impl FrontendProtocol for Flush {
    const MSGTYPE: u8 = b'H';

    fn encode(self, _: &mut BytesMut) { }
}

/// Identifies the message as a termination.
pub struct Terminate;

impl FrontendProtocol for Terminate {
    const MSGTYPE: u8 = b'X';

    fn encode(self, _: &mut BytesMut) { }
}
