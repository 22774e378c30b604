//! Mysql connection and its [`Backend`] implementation.
use bytes::{BufMut, Bytes};
use std::{
    collections::HashMap,
    io::{Read, Write},
    net::TcpStream,
};

use super::{
    auth,
    packet::{
        self, BINARY_CHARSET, ColumnDefinition, ERR_HEADER, EOF_HEADER, Handshake,
        HandshakeResponse, MORE_DATA_HEADER, OK_HEADER, OkPacket, capability,
        column_type, command,
    },
};
use crate::{
    Result, Value,
    backend::{Backend, TableInfo},
    config::Config,
    entity::FieldSpec,
    error::{ErrorKind, ProtocolError},
    ext::{FmtExt, HexExt},
    row::QueryResult,
    sql,
    stream::{self, Packets},
    types::ColumnType,
    value,
};

/// ERR code for a table that does not exist.
const ER_NO_SUCH_TABLE: u16 = 1146;

/// Capabilities this client answers the handshake with.
const CLIENT_CAPABILITIES: u32 = capability::PROTOCOL_41
    | capability::CONNECT_WITH_DB
    | capability::SECURE_CONNECTION
    | capability::PLUGIN_AUTH;

/// A mysql connection speaking the client/server protocol v4.1+.
///
/// Generic over the inner stream so protocol flows can be tested against
/// scripted bytes.
#[derive(Debug)]
pub struct MysqlConnection<S = TcpStream> {
    packets: Packets<S>,
    #[allow(dead_code, reason = "kept for capability checks of later features")]
    capabilities: u32,
}

impl MysqlConnection<TcpStream> {
    /// Connect and authenticate against a mysql server.
    pub fn connect(config: &Config) -> Result<Self> {
        let stream = TcpStream::connect((config.host.as_str(), config.port))?;
        Self::handshake(stream, config)
    }

    /// Gracefully close the connection.
    pub fn close(mut self) -> Result<()> {
        self.packets.reset_sequence();
        self.packets.send(None, |buf| buf.put_u8(command::COM_QUIT));
        self.packets.flush()?;
        self.packets.into_inner().shutdown(std::net::Shutdown::Both)?;
        Ok(())
    }
}

impl<S: Read + Write> MysqlConnection<S> {
    pub(crate) fn handshake(io: S, config: &Config) -> Result<Self> {
        let mut packets = Packets::new(io, stream::MYSQL);

        let body = packets.recv()?;
        if body.first() == Some(&ERR_HEADER) {
            return Err(packet::parse_err(body)?.into());
        }
        let handshake = Handshake::decode(body)?;
        log::trace!("(mysql) server {}", handshake.server_version);

        let plugin = match handshake.auth_plugin.as_str() {
            // servers without plugin auth use the native scheme
            "" | auth::NATIVE_PASSWORD => auth::NATIVE_PASSWORD,
            auth::CACHING_SHA2 => auth::CACHING_SHA2,
            other => return Err(ErrorKind::UnsupportedAuth(other.into()).into()),
        };
        let scramble = match plugin {
            auth::CACHING_SHA2 => auth::scramble_caching_sha2(&config.pass, &handshake.scramble),
            _ => auth::scramble_native(&config.pass, &handshake.scramble),
        };

        packets.send(None, |buf| {
            HandshakeResponse {
                capabilities: CLIENT_CAPABILITIES,
                charset: handshake.charset,
                user: &config.user,
                auth_response: &scramble,
                database: &config.dbname,
                auth_plugin: plugin,
            }
            .encode(buf)
        });

        let mut conn = Self { packets, capabilities: handshake.capabilities };
        conn.finish_authentication()?;
        Ok(conn)
    }

    /// Authentication failures are fatal; the connection is dropped.
    fn finish_authentication(&mut self) -> Result<()> {
        loop {
            let body = self.packets.recv()?;
            match body.first() {
                Some(&OK_HEADER) => return Ok(()),
                Some(&ERR_HEADER) => return Err(packet::parse_err(body)?.into()),
                // caching_sha2_password fast path: 0x03 confirms the
                // cached scramble, the OK packet follows
                Some(&MORE_DATA_HEADER) if body.get(1) == Some(&0x03) => { }
                Some(&MORE_DATA_HEADER) => {
                    return Err(ErrorKind::UnsupportedAuth(
                        "caching_sha2_password full authentication".into(),
                    )
                    .into());
                }
                Some(&EOF_HEADER) => {
                    return Err(ErrorKind::UnsupportedAuth(
                        "authentication method switch".into(),
                    )
                    .into());
                }
                _ => {
                    log::trace!("(mysql) unexpected auth packet {:?}", body.lossy());
                    return Err(ProtocolError::unexpected(
                        body.first().copied().unwrap_or_default(),
                        "authentication",
                    )
                    .into());
                }
            }
        }
    }

    /// Send one command, restarting the packet sequence.
    fn send_command(&mut self, com: u8, payload: &str) {
        self.packets.reset_sequence();
        self.packets.send(None, |buf| {
            buf.put_u8(com);
            buf.put_slice(payload.as_bytes());
        });
    }

    /// Run a statement that answers with a plain OK.
    fn command(&mut self, sql: &str) -> Result<OkPacket> {
        log::trace!("(mysql) {sql}");
        self.send_command(command::COM_QUERY, sql);
        let body = self.packets.recv()?;
        match body.first() {
            Some(&ERR_HEADER) => Err(packet::parse_err(body)?.into()),
            Some(&OK_HEADER) => Ok(OkPacket::decode(body)?),
            first => Err(ProtocolError::unexpected(
                first.copied().unwrap_or_default(),
                "command response",
            )
            .into()),
        }
    }

    /// Run a statement and parse its text result set.
    fn text_query(&mut self, sql: &str) -> Result<QueryResult> {
        log::trace!("(mysql) {sql}");
        self.send_command(command::COM_QUERY, sql);

        let mut body = self.packets.recv()?;
        match body.first() {
            Some(&ERR_HEADER) => return Err(packet::parse_err(body)?.into()),
            Some(&OK_HEADER) => return Ok(QueryResult::default()),
            _ => { }
        }

        let column_count = packet::get_lenenc_int(&mut body)?
            .ok_or(ProtocolError::Malformed("column count"))?;

        let mut columns = Vec::with_capacity(column_count as usize);
        for _ in 0..column_count {
            columns.push(ColumnDefinition::decode(self.packets.recv()?)?);
        }

        // the definitions are closed by an EOF packet
        let body = self.packets.recv()?;
        if !packet::is_eof(&body) {
            return Err(ProtocolError::unexpected(
                body.first().copied().unwrap_or_default(),
                "column definitions",
            )
            .into());
        }

        let mut result =
            QueryResult::new(columns.iter().map(|c| c.name.clone()).collect());
        loop {
            let mut body = self.packets.recv()?;
            if packet::is_eof(&body) {
                return Ok(result);
            }
            if body.first() == Some(&ERR_HEADER) {
                return Err(packet::parse_err(body)?.into());
            }

            let mut row = Vec::with_capacity(columns.len());
            for column in &columns {
                match packet::get_lenenc_bytes(&mut body)? {
                    Some(cell) => row.push(decode_cell(column, cell)?),
                    None => row.push(Value::Null),
                }
            }
            result.push(row);
        }
    }
}

impl<S: Read + Write> Backend for MysqlConnection<S> {
    /// `describe`-based table info; a missing table answers with ERR 1146.
    fn get_table_info(&mut self, table: &str) -> Result<Option<HashMap<String, TableInfo>>> {
        let result = match self.text_query(&format!("describe {table};")) {
            Ok(result) => result,
            Err(error) => {
                return match error.kind() {
                    ErrorKind::Mysql(err) if err.code == ER_NO_SUCH_TABLE => Ok(None),
                    _ => Err(error),
                };
            }
        };

        let field = result
            .column("Field")
            .ok_or(ProtocolError::Malformed("describe row"))?;
        let ty = result
            .column("Type")
            .ok_or(ProtocolError::Malformed("describe row"))?;
        let null = result
            .column("Null")
            .ok_or(ProtocolError::Malformed("describe row"))?;
        let default = result.column("Default");

        let text = |value: &Value| -> String {
            match value {
                Value::String(s) | Value::Clob(s) => s.clone(),
                _ => String::new(),
            }
        };

        let mut info = HashMap::with_capacity(result.len());
        for row in result.rows() {
            let name = text(&row[field]);
            let (mask, length) = parse_column_type(&text(&row[ty]));
            let column = TableInfo {
                ty: mask,
                length,
                nullable: text(&row[null]) == "YES",
                default_value: default.map(|i| text(&row[i])).unwrap_or_default(),
                name: name.clone(),
            };
            info.insert(name, column);
        }
        Ok(Some(info))
    }

    fn generate_field(&self, field: &FieldSpec) -> Result<String> {
        let type_name = mysql_type(field)?;

        let mut def = String::from(field.name);
        def.push(' ');
        def.push_str(type_name);
        if field.length > 0 {
            def.push('(');
            def.push_str(itoa::Buffer::new().format(field.length));
            def.push(')');
        }
        if !field.nullable {
            def.push_str(" not null");
        }
        if field.unique {
            def.push_str(" unique");
        }
        if field.auto_increment {
            def.push_str(" auto_increment");
        }
        Ok(def)
    }

    fn alter_table_column(
        &mut self,
        table: &str,
        field: &FieldSpec,
        _type_changed: bool,
        _nullable_changed: bool,
    ) -> Result<()> {
        // the dialect re-states the whole column either way
        let definition = self.generate_field(field)?;
        self.query(&format!("alter table {table} modify column {definition};"))
    }

    fn insert_into(
        &mut self,
        table: &str,
        names: &[&str],
        values: &[String],
        primary_keys: &[&str],
    ) -> Result<Option<QueryResult>> {
        let mut statement = sql::insert_statement(table, names, values);
        statement.push(';');
        let ok = self.command(&statement)?;

        // the OK packet carries one generated key at most
        if let [key] = primary_keys {
            if ok.last_insert_id > 0 {
                let mut result = QueryResult::new(vec![(*key).into()]);
                result.push(vec![Value::Long(ok.last_insert_id as i64)]);
                return Ok(Some(result));
            }
        }
        Ok(None)
    }

    fn random_function(&self) -> &'static str {
        "rand()"
    }

    fn escape_binary(&self, bytes: &[u8]) -> String {
        if bytes.is_empty() {
            return String::from("''");
        }
        let mut out = String::with_capacity(bytes.len() * 2 + 2);
        out.push_str("0x");
        bytes.write_hex_upper(&mut out);
        out
    }

    fn query(&mut self, sql: &str) -> Result<()> {
        self.command(sql).map(|_| ())
    }

    fn query_select(&mut self, sql: &str) -> Result<QueryResult> {
        self.text_query(sql)
    }
}

/// Decode one text-protocol cell per the column definition.
fn decode_cell(column: &ColumnDefinition, cell: Bytes) -> Result<Value> {
    use column_type as t;

    // binary-charset string columns hold raw bytes
    match column.column_type {
        t::TINY_BLOB | t::MEDIUM_BLOB | t::LONG_BLOB | t::BLOB
            if column.charset == BINARY_CHARSET =>
        {
            return Ok(Value::Blob(cell.to_vec()));
        }
        t::VARCHAR | t::VAR_STRING | t::STRING if column.charset == BINARY_CHARSET => {
            return Ok(Value::Binary(cell.to_vec()));
        }
        t::NULL => return Ok(Value::Null),
        _ => { }
    }

    let text = std::str::from_utf8(&cell)?;

    macro_rules! parse {
        ($what:literal) => {
            text.parse().map_err(|_| ProtocolError::Malformed($what))?
        };
    }

    let value = match column.column_type {
        t::TINY => Value::Byte(parse!("tinyint")),
        t::SHORT | t::YEAR => Value::Short(parse!("smallint")),
        t::LONG | t::INT24 => Value::Int(parse!("int")),
        t::LONGLONG => Value::Long(parse!("bigint")),
        t::FLOAT => Value::Float(parse!("float")),
        t::DOUBLE => Value::Double(parse!("double")),
        t::DATE => Value::Date(
            value::parse_date(text).map_err(|_| ProtocolError::Malformed("date"))?,
        ),
        t::TIME => Value::Time(
            value::parse_time(text).map_err(|_| ProtocolError::Malformed("time"))?,
        ),
        t::DATETIME | t::TIMESTAMP => Value::DateTime(
            value::parse_datetime(text).map_err(|_| ProtocolError::Malformed("datetime"))?,
        ),
        t::TINY_BLOB | t::MEDIUM_BLOB | t::LONG_BLOB | t::BLOB => Value::Clob(text.into()),
        _ => Value::String(text.into()),
    };
    Ok(value)
}

/// Parse a `describe` type like `varchar(10)` or `tinyint(1)` into the
/// logical mask and declared length.
fn parse_column_type(describe: &str) -> (ColumnType, usize) {
    let (base, length) = match describe.split_once('(') {
        Some((base, rest)) => {
            let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
            (base, digits.parse().unwrap_or(0))
        }
        None => (describe, 0),
    };

    let mask = match base {
        // boolean columns come back as tinyint(1), accept either form
        "tinyint" if length == 1 => ColumnType::BOOL | ColumnType::BYTE,
        "tinyint" => ColumnType::BYTE,
        "boolean" | "bool" => ColumnType::BOOL,
        "smallint" | "year" => ColumnType::SHORT,
        "int" | "integer" | "mediumint" => ColumnType::INT,
        "bigint" => ColumnType::LONG,
        "float" => ColumnType::FLOAT,
        "double" => ColumnType::DOUBLE,
        "char" => ColumnType::CHAR,
        "varchar" => ColumnType::STRING,
        "binary" | "varbinary" => ColumnType::BINARY,
        "tinyblob" | "mediumblob" | "longblob" | "blob" => ColumnType::BLOB,
        "tinytext" | "mediumtext" | "longtext" | "text" | "clob" => ColumnType::CLOB,
        "date" => ColumnType::DATE,
        "datetime" | "timestamp" => ColumnType::DATETIME,
        "time" => ColumnType::TIME,
        _ => ColumnType::none(),
    };
    (mask, length)
}

fn mysql_type(field: &FieldSpec) -> Result<&'static str> {
    let name = match field.ty {
        ColumnType::BOOL => "boolean",
        ColumnType::BYTE => "tinyint",
        ColumnType::SHORT => "smallint",
        ColumnType::INT => "int",
        ColumnType::LONG => "bigint",
        ColumnType::FLOAT => "float",
        ColumnType::DOUBLE => "double",
        ColumnType::CHAR => "char",
        ColumnType::STRING => "varchar",
        ColumnType::BINARY => "binary",
        ColumnType::CLOB => "clob",
        ColumnType::BLOB => "blob",
        ColumnType::DATE => "date",
        ColumnType::DATETIME => "datetime",
        ColumnType::TIME => "time",
        _ => return Err(ErrorKind::UnsupportedType { backend: "mysql", ty: field.ty }.into()),
    };
    Ok(name)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mysql::packet::NULL_CELL;
    use crate::stream::test::Pipe;

    fn pack(buf: &mut Vec<u8>, sequence: u8, body: &[u8]) {
        buf.extend_from_slice(&(body.len() as u32).to_le_bytes()[..3]);
        buf.push(sequence);
        buf.extend_from_slice(body);
    }

    fn server_handshake(plugin: &str) -> Vec<u8> {
        let mut body = vec![0x0a];
        body.extend_from_slice(b"8.0.39\0");
        body.extend_from_slice(&42u32.to_le_bytes());
        body.extend_from_slice(&[1u8; 8]);
        body.push(0);
        body.extend_from_slice(&(CLIENT_CAPABILITIES as u16).to_le_bytes());
        body.push(255);
        body.extend_from_slice(&[0, 0]);
        body.extend_from_slice(&((CLIENT_CAPABILITIES >> 16) as u16).to_le_bytes());
        body.push(21);
        body.extend_from_slice(&[0u8; 10]);
        body.extend_from_slice(&[2u8; 12]);
        body.push(0);
        body.extend_from_slice(plugin.as_bytes());
        body.push(0);
        body
    }

    fn ok_packet() -> Vec<u8> {
        vec![0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00]
    }

    fn config() -> Config {
        Config::local("post", "user", "passwd", 3306)
    }

    fn connect(input: Vec<u8>) -> MysqlConnection<Pipe> {
        MysqlConnection::handshake(Pipe::new(input), &config()).unwrap()
    }

    fn connected() -> MysqlConnection<Pipe> {
        let mut input = Vec::new();
        pack(&mut input, 0, &server_handshake(auth::NATIVE_PASSWORD));
        pack(&mut input, 2, &ok_packet());
        connect(input)
    }

    fn feed(conn: &mut MysqlConnection<Pipe>, packets: Vec<u8>) {
        let input = &mut conn.packets.io_mut().input;
        let position = input.position();
        input.get_mut().extend_from_slice(&packets);
        input.set_position(position);
    }

    #[test]
    fn handshake_response_layout() {
        let conn = connected();
        let out = conn.packets.into_inner().output;

        // header: length, sequence 1 answering the greeting
        let len = u32::from_le_bytes([out[0], out[1], out[2], 0]) as usize;
        assert_eq!(out[3], 1);
        let body = &out[4..4 + len];

        assert_eq!(&body[..4], &CLIENT_CAPABILITIES.to_le_bytes());
        assert_eq!(&body[4..8], &1u32.to_le_bytes());
        assert_eq!(body[8], 255);
        assert!(body[9..32].iter().all(|b| *b == 0));
        assert_eq!(&body[32..37], b"user\0");
        assert_eq!(body[37], 20, "native scramble is sha1 sized");
        assert_eq!(&body[58..63], b"post\0");
        assert_eq!(&body[63..], b"mysql_native_password\0");
    }

    #[test]
    fn unknown_plugin_is_rejected() {
        let mut input = Vec::new();
        pack(&mut input, 0, &server_handshake("sha256_password"));
        let result = MysqlConnection::handshake(Pipe::new(input), &config());
        assert!(matches!(
            result.unwrap_err().kind(),
            ErrorKind::UnsupportedAuth(plugin) if plugin == "sha256_password",
        ));
    }

    #[test]
    fn caching_sha2_fast_path() {
        let mut input = Vec::new();
        pack(&mut input, 0, &server_handshake(auth::CACHING_SHA2));
        pack(&mut input, 2, &[0x01, 0x03]);
        pack(&mut input, 3, &ok_packet());
        let conn = connect(input);

        let out = conn.packets.into_inner().output;
        // the scramble is sha256 sized
        assert_eq!(out[4 + 37], 32);
    }

    #[test]
    fn caching_sha2_full_auth_is_unsupported() {
        let mut input = Vec::new();
        pack(&mut input, 0, &server_handshake(auth::CACHING_SHA2));
        pack(&mut input, 2, &[0x01, 0x04]);
        let result = MysqlConnection::handshake(Pipe::new(input), &config());
        assert!(matches!(
            result.unwrap_err().kind(),
            ErrorKind::UnsupportedAuth(_),
        ));
    }

    #[test]
    fn commands_restart_the_sequence() {
        let mut conn = connected();
        let mut packets = Vec::new();
        pack(&mut packets, 1, &ok_packet());
        pack(&mut packets, 1, &ok_packet());
        feed(&mut conn, packets);

        conn.query("create table test (a int);").unwrap();
        conn.query("drop table test;").unwrap();

        let out = conn.packets.into_inner().output;
        // skip the handshake response, then both commands carry sequence 0
        let first = 4 + u32::from_le_bytes([out[0], out[1], out[2], 0]) as usize;
        assert_eq!(out[first + 3], 0);
        assert_eq!(out[first + 4], command::COM_QUERY);
        let second = first + 4 + u32::from_le_bytes([
            out[first], out[first + 1], out[first + 2], 0,
        ]) as usize;
        assert_eq!(out[second + 3], 0);
        assert_eq!(out[second + 4], command::COM_QUERY);
    }

    #[test]
    fn err_packet_surfaces_coded() {
        let mut conn = connected();
        let mut err = vec![0xFF];
        err.extend_from_slice(&1062u16.to_le_bytes());
        err.extend_from_slice(b"#23000Duplicate entry");
        let mut packets = Vec::new();
        pack(&mut packets, 1, &err);
        feed(&mut conn, packets);

        let error = conn.query("insert into test (b) values (1);").unwrap_err();
        assert!(matches!(
            error.kind(),
            ErrorKind::Mysql(err) if err.code == 1062 && err.message == "Duplicate entry",
        ));
    }

    fn lenenc_str(buf: &mut Vec<u8>, s: &str) {
        buf.push(s.len() as u8);
        buf.extend_from_slice(s.as_bytes());
    }

    fn column_definition(name: &str, ty: u8, charset: u16, length: u32) -> Vec<u8> {
        let mut body = Vec::new();
        lenenc_str(&mut body, "def");
        lenenc_str(&mut body, "db");
        lenenc_str(&mut body, "test");
        lenenc_str(&mut body, "test");
        lenenc_str(&mut body, name);
        lenenc_str(&mut body, name);
        body.push(0x0c);
        body.extend_from_slice(&charset.to_le_bytes());
        body.extend_from_slice(&length.to_le_bytes());
        body.push(ty);
        body.extend_from_slice(&[0, 0, 0, 0, 0]);
        body
    }

    fn eof() -> Vec<u8> {
        vec![0xFE, 0, 0, 2, 0]
    }

    #[test]
    fn text_result_set() {
        let mut conn = connected();

        let mut packets = Vec::new();
        pack(&mut packets, 1, &[2]); // column count
        pack(&mut packets, 2, &column_definition("a", column_type::LONG, 224, 11));
        pack(&mut packets, 3, &column_definition("s", column_type::VAR_STRING, 224, 40));
        pack(&mut packets, 4, &eof());
        let mut row = Vec::new();
        lenenc_str(&mut row, "55");
        lenenc_str(&mut row, "test");
        pack(&mut packets, 5, &row);
        let mut row = Vec::new();
        lenenc_str(&mut row, "33");
        row.push(NULL_CELL);
        pack(&mut packets, 6, &row);
        pack(&mut packets, 7, &eof());
        feed(&mut conn, packets);

        let result = conn.query_select("select * from test;").unwrap();
        assert_eq!(result.columns(), ["a", "s"]);
        assert_eq!(result.rows()[0], [Value::Int(55), Value::String("test".into())]);
        assert_eq!(result.rows()[1], [Value::Int(33), Value::Null]);
    }

    #[test]
    fn describe_reconciles_masks() {
        let mut conn = connected();

        let mut packets = Vec::new();
        pack(&mut packets, 1, &[6]);
        for name in ["Field", "Type", "Null", "Key", "Default", "Extra"] {
            pack(
                &mut packets,
                0,
                &column_definition(name, column_type::VAR_STRING, 224, 64),
            );
        }
        pack(&mut packets, 0, &eof());
        let mut row = Vec::new();
        lenenc_str(&mut row, "flag");
        lenenc_str(&mut row, "tinyint(1)");
        lenenc_str(&mut row, "YES");
        lenenc_str(&mut row, "");
        row.push(NULL_CELL);
        lenenc_str(&mut row, "");
        pack(&mut packets, 0, &row);
        pack(&mut packets, 0, &eof());
        feed(&mut conn, packets);

        let info = conn.get_table_info("test").unwrap().unwrap();
        let flag = &info["flag"];
        assert_eq!(flag.ty, ColumnType::BOOL | ColumnType::BYTE);
        assert_eq!(flag.length, 1);
        assert!(flag.nullable);
    }

    #[test]
    fn missing_table_info() {
        let mut conn = connected();
        let mut err = vec![0xFF];
        err.extend_from_slice(&ER_NO_SUCH_TABLE.to_le_bytes());
        err.extend_from_slice(b"#42S02Table 'post.missing' doesn't exist");
        let mut packets = Vec::new();
        pack(&mut packets, 1, &err);
        feed(&mut conn, packets);

        assert!(conn.get_table_info("missing").unwrap().is_none());
    }

    #[test]
    fn insert_returns_the_generated_key() {
        let mut conn = connected();
        let mut packets = Vec::new();
        // affected 1, last insert id 7
        pack(&mut packets, 1, &[0x00, 0x01, 0x07, 0x02, 0x00, 0x00, 0x00]);
        feed(&mut conn, packets);

        let result = conn
            .insert_into("test", &["a"], &[String::from("1")], &["test_id"])
            .unwrap()
            .unwrap();
        assert_eq!(result.columns(), ["test_id"]);
        assert_eq!(result.rows()[0], [Value::Long(7)]);
    }

    #[test]
    fn column_type_parsing() {
        assert_eq!(parse_column_type("varchar(10)"), (ColumnType::STRING, 10));
        assert_eq!(parse_column_type("int(11)"), (ColumnType::INT, 11));
        assert_eq!(parse_column_type("int"), (ColumnType::INT, 0));
        assert_eq!(
            parse_column_type("tinyint(1)"),
            (ColumnType::BOOL | ColumnType::BYTE, 1),
        );
        assert_eq!(parse_column_type("tinyint(4)"), (ColumnType::BYTE, 4));
        assert_eq!(parse_column_type("what(4)"), (ColumnType::none(), 4));
    }

    #[test]
    fn generated_definitions() {
        let conn = connected();
        let field = FieldSpec {
            name: "test_id",
            ty: ColumnType::INT,
            length: 0,
            nullable: false,
            unique: false,
            auto_increment: true,
            default_value: "",
        };
        assert_eq!(
            conn.generate_field(&field).unwrap(),
            "test_id int not null auto_increment",
        );

        let field = FieldSpec {
            name: "string",
            ty: ColumnType::STRING,
            length: 10,
            nullable: true,
            unique: false,
            auto_increment: false,
            default_value: "",
        };
        assert_eq!(conn.generate_field(&field).unwrap(), "string varchar(10)");
    }

    #[test]
    fn escape_binary_renders_hex() {
        let conn = connected();
        assert_eq!(conn.escape_binary(&[0xDE, 0xAD]), "0xDEAD");
        assert_eq!(conn.escape_binary(&[]), "''");
    }
}
