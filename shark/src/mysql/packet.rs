//! Mysql packet payloads.
//!
//! Everything here decodes from or encodes into a packet body; the length
//! and sequence header is handled by the packet stream.
use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::error::MysqlError;
use crate::{error::ProtocolError, ext::BufMutExt};

/// Client capability flags.
pub(crate) mod capability {
    pub const CONNECT_WITH_DB: u32 = 8;
    pub const PROTOCOL_41: u32 = 512;
    pub const SECURE_CONNECTION: u32 = 32768;
    pub const PLUGIN_AUTH: u32 = 1 << 19;
}

/// Command bytes, the first payload byte of a client command packet.
pub(crate) mod command {
    pub const COM_QUIT: u8 = 0x01;
    pub const COM_QUERY: u8 = 0x03;
}

/// Column types of the result set protocol.
pub(crate) mod column_type {
    pub const TINY: u8 = 1;
    pub const SHORT: u8 = 2;
    pub const LONG: u8 = 3;
    pub const FLOAT: u8 = 4;
    pub const DOUBLE: u8 = 5;
    pub const NULL: u8 = 6;
    pub const TIMESTAMP: u8 = 7;
    pub const LONGLONG: u8 = 8;
    pub const INT24: u8 = 9;
    pub const DATE: u8 = 10;
    pub const TIME: u8 = 11;
    pub const DATETIME: u8 = 12;
    pub const YEAR: u8 = 13;
    pub const VARCHAR: u8 = 15;
    pub const TINY_BLOB: u8 = 249;
    pub const MEDIUM_BLOB: u8 = 250;
    pub const LONG_BLOB: u8 = 251;
    pub const BLOB: u8 = 252;
    pub const VAR_STRING: u8 = 253;
    pub const STRING: u8 = 254;
}

/// The character set id marking a binary column.
pub(crate) const BINARY_CHARSET: u16 = 63;

/// First payload byte of an OK packet.
pub(crate) const OK_HEADER: u8 = 0x00;
/// First payload byte of an ERR packet.
pub(crate) const ERR_HEADER: u8 = 0xFF;
/// First payload byte of an EOF packet and of auth continuation requests.
pub(crate) const EOF_HEADER: u8 = 0xFE;
/// First payload byte of an AuthMoreData packet.
pub(crate) const MORE_DATA_HEADER: u8 = 0x01;

/// The cell sentinel for null in a text result row.
pub(crate) const NULL_CELL: u8 = 0xFB;

/// Read a length-encoded integer, `None` for the null sentinel.
pub(crate) fn get_lenenc_int(buf: &mut Bytes) -> Result<Option<u64>, ProtocolError> {
    if buf.is_empty() {
        return Err(ProtocolError::Malformed("length encoded integer"));
    }
    let value = match buf.get_u8() {
        NULL_CELL => return Ok(None),
        0xFC => {
            ensure(buf, 2)?;
            u64::from(buf.get_u16_le())
        }
        0xFD => {
            ensure(buf, 3)?;
            buf.get_uint_le(3)
        }
        0xFE => {
            ensure(buf, 8)?;
            buf.get_u64_le()
        }
        short => u64::from(short),
    };
    Ok(Some(value))
}

/// Read a length-encoded byte run, `None` for the null sentinel.
pub(crate) fn get_lenenc_bytes(buf: &mut Bytes) -> Result<Option<Bytes>, ProtocolError> {
    match get_lenenc_int(buf)? {
        None => Ok(None),
        Some(len) => {
            ensure(buf, len as usize)?;
            Ok(Some(buf.split_to(len as usize)))
        }
    }
}

fn get_lenenc_string(buf: &mut Bytes) -> Result<String, ProtocolError> {
    let bytes = get_lenenc_bytes(buf)?
        .ok_or(ProtocolError::Malformed("unexpected null string"))?;
    Ok(std::str::from_utf8(&bytes)?.into())
}

fn ensure(buf: &Bytes, len: usize) -> Result<(), ProtocolError> {
    match buf.len() < len {
        true => Err(ProtocolError::Malformed("packet too short")),
        false => Ok(()),
    }
}

/// Returns `true` when the body is an EOF packet.
pub(crate) fn is_eof(body: &[u8]) -> bool {
    body.first() == Some(&EOF_HEADER) && body.len() < 9
}

/// The server greeting, handshake protocol version 10.
#[derive(Debug)]
pub(crate) struct Handshake {
    pub server_version: String,
    pub capabilities: u32,
    pub charset: u8,
    /// The 20-byte auth scramble.
    pub scramble: Vec<u8>,
    /// Empty when the server did not announce a plugin.
    pub auth_plugin: String,
}

impl Handshake {
    pub fn decode(mut body: Bytes) -> Result<Handshake, ProtocolError> {
        ensure(&body, 1)?;
        if body.get_u8() != 0x0a {
            return Err(ProtocolError::Malformed("handshake protocol version"));
        }

        let end = body
            .iter()
            .position(|b| *b == 0)
            .ok_or(ProtocolError::Malformed("server version"))?;
        let server_version = String::from_utf8_lossy(&body.split_to(end)).into_owned();
        body.advance(1);

        ensure(&body, 4 + 8 + 1 + 2 + 1 + 2 + 2 + 1 + 10)?;
        body.advance(4); // connection id
        let mut scramble = body.split_to(8).to_vec();
        body.advance(1); // filler
        let mut capabilities = u32::from(body.get_u16_le());
        let charset = body.get_u8();
        body.advance(2); // status flags
        capabilities |= u32::from(body.get_u16_le()) << 16;
        let auth_len = body.get_u8() as usize;
        body.advance(10); // reserved

        if capabilities & capability::SECURE_CONNECTION != 0 {
            let take = usize::max(13, auth_len.saturating_sub(8));
            ensure(&body, take)?;
            let mut rest = body.split_to(take).to_vec();
            while rest.last() == Some(&0) {
                rest.pop();
            }
            scramble.extend_from_slice(&rest);
        }

        let auth_plugin = match capabilities & capability::PLUGIN_AUTH {
            0 => String::new(),
            _ => match body.iter().position(|b| *b == 0) {
                Some(end) => String::from_utf8_lossy(&body.split_to(end)).into_owned(),
                None => String::from_utf8_lossy(&body).into_owned(),
            },
        };

        Ok(Handshake { server_version, capabilities, charset, scramble, auth_plugin })
    }
}

/// The client handshake response (protocol 4.1 layout).
pub(crate) struct HandshakeResponse<'a> {
    pub capabilities: u32,
    pub charset: u8,
    pub user: &'a str,
    /// The hashed password, empty for no password.
    pub auth_response: &'a [u8],
    pub database: &'a str,
    pub auth_plugin: &'a str,
}

impl HandshakeResponse<'_> {
    pub fn encode(self, buf: &mut BytesMut) {
        buf.put_u32_le(self.capabilities);
        buf.put_u32_le(1); // max packet size
        buf.put_u8(self.charset);
        buf.put_bytes(0, 23);
        buf.put_nul_string(self.user);
        buf.put_u8(self.auth_response.len() as u8);
        buf.put_slice(self.auth_response);
        buf.put_nul_string(self.database);
        buf.put_nul_string(self.auth_plugin);
    }
}

/// An OK packet: affected rows, generated key, server status.
#[derive(Debug)]
pub(crate) struct OkPacket {
    pub affected_rows: u64,
    pub last_insert_id: u64,
}

impl OkPacket {
    pub fn decode(mut body: Bytes) -> Result<OkPacket, ProtocolError> {
        ensure(&body, 1)?;
        if body.get_u8() != OK_HEADER {
            return Err(ProtocolError::Malformed("ok packet header"));
        }
        let affected_rows = get_lenenc_int(&mut body)?
            .ok_or(ProtocolError::Malformed("affected rows"))?;
        let last_insert_id = get_lenenc_int(&mut body)?
            .ok_or(ProtocolError::Malformed("last insert id"))?;
        Ok(OkPacket { affected_rows, last_insert_id })
    }
}

/// Parse an ERR packet body into [`MysqlError`].
pub(crate) fn parse_err(mut body: Bytes) -> Result<MysqlError, ProtocolError> {
    ensure(&body, 3)?;
    if body.get_u8() != ERR_HEADER {
        return Err(ProtocolError::Malformed("err packet header"));
    }
    let code = body.get_u16_le();
    // sql state marker plus five state bytes
    if body.first() == Some(&b'#') {
        ensure(&body, 6)?;
        body.advance(6);
    }
    Ok(MysqlError {
        code,
        message: String::from_utf8_lossy(&body).into_owned(),
    })
}

/// Column Definition 41, sent once per column ahead of the rows.
#[derive(Debug)]
pub(crate) struct ColumnDefinition {
    pub name: String,
    pub charset: u16,
    pub length: u32,
    pub column_type: u8,
}

impl ColumnDefinition {
    pub fn decode(mut body: Bytes) -> Result<ColumnDefinition, ProtocolError> {
        let _catalog = get_lenenc_string(&mut body)?;
        let _schema = get_lenenc_string(&mut body)?;
        let _table = get_lenenc_string(&mut body)?;
        let _org_table = get_lenenc_string(&mut body)?;
        let name = get_lenenc_string(&mut body)?;
        let _org_name = get_lenenc_string(&mut body)?;

        // fixed-length fields, preceded by their length (0x0c)
        get_lenenc_int(&mut body)?;
        ensure(&body, 2 + 4 + 1 + 2 + 1)?;
        let charset = body.get_u16_le();
        let length = body.get_u32_le();
        let column_type = body.get_u8();

        Ok(ColumnDefinition { name, charset, length, column_type })
    }
}
