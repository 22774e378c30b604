//! Postgres connection and its [`Backend`] implementation.
use bytes::Bytes;
use md5::{Digest, Md5};
use std::{
    collections::HashMap,
    io::{Read, Write},
    net::TcpStream,
};

use super::{
    backend::{self, Authentication, BackendMessage, BackendProtocol, PgColumn},
    error::PgErrors,
    frontend::{self, FrontendProtocol},
};
use crate::{
    Result, Value,
    backend::{Backend, TableInfo},
    config::Config,
    entity::FieldSpec,
    error::{ErrorKind, ProtocolError},
    ext::{HexExt, from_hex},
    row::QueryResult,
    sql,
    stream::{self, Packets},
    types::ColumnType,
    value,
};

/// The long-lived statement behind `get_table_info`, prepared at connect.
const TABLE_INFO_NAME: &str = "_shark_table_info";
const TABLE_INFO_SQL: &str = "select column_name, data_type, is_nullable, \
    character_maximum_length, column_default from INFORMATION_SCHEMA.COLUMNS \
    where table_name=$1;";

const VARCHAR_OID: u32 = 1043;

/// A postgres connection speaking the frontend/backend protocol v3.
///
/// The connection handles `NoticeResponse` transparently, and after an
/// `ErrorResponse` drains stale packets up to the next `ReadyForQuery`
/// before the next operation.
///
/// Generic over the inner stream so protocol flows can be tested against
/// scripted bytes.
#[derive(Debug)]
pub struct PgConnection<S = TcpStream> {
    packets: Packets<S>,
    /// Run-time parameter reports collected during startup.
    parameters: HashMap<String, String>,
    key_data: Option<backend::BackendKeyData>,
    /// Prepared statement registry keyed by statement text.
    statements: HashMap<String, String>,
    /// Set after an error response; the next receive re-synchronizes.
    error: bool,
}

impl PgConnection<TcpStream> {
    /// Connect and authenticate against a postgres server.
    pub fn connect(config: &Config) -> Result<Self> {
        let stream = TcpStream::connect((config.host.as_str(), config.port))?;
        Self::handshake(stream, config)
    }

    /// Gracefully close the connection.
    pub fn close(mut self) -> Result<()> {
        self.send(frontend::Terminate);
        self.packets.flush()?;
        self.packets.into_inner().shutdown(std::net::Shutdown::Both)?;
        Ok(())
    }
}

impl<S: Read + Write> PgConnection<S> {
    pub(crate) fn handshake(io: S, config: &Config) -> Result<Self> {
        let mut conn = Self {
            packets: Packets::new(io, stream::POSTGRES),
            parameters: HashMap::new(),
            key_data: None,
            statements: HashMap::new(),
            error: false,
        };

        conn.packets.send_headless(|buf| {
            frontend::Startup { user: &config.user, database: &config.dbname }.encode(buf)
        });
        conn.packets.flush()?;

        conn.authenticate(config)?;

        // In this phase a backend process is being started, and the
        // frontend is just an interested bystander.
        loop {
            match conn.recv()? {
                BackendMessage::ReadyForQuery(_) => break,
                BackendMessage::ParameterStatus(param) => {
                    conn.parameters.insert(param.name, param.value);
                }
                BackendMessage::BackendKeyData(key_data) => {
                    conn.key_data = Some(key_data);
                }
                message => return Err(message.unexpected("startup phase").into()),
            }
        }

        conn.table_info_statement()?;

        log::trace!(
            "(pg) connected, backend pid {:?}",
            conn.key_data.as_ref().map(|k| k.process_id),
        );
        Ok(conn)
    }

    fn authenticate(&mut self, config: &Config) -> Result<()> {
        loop {
            match self.recv::<Authentication>()? {
                Authentication::Ok => return Ok(()),
                Authentication::CleartextPassword => {
                    self.send(frontend::PasswordMessage { password: &config.pass });
                    self.packets.flush()?;
                }
                Authentication::MD5Password { salt } => {
                    let password = md5_password(&config.user, &config.pass, salt);
                    self.send(frontend::PasswordMessage { password: &password });
                    self.packets.flush()?;
                }
                Authentication::Other(method) => {
                    return Err(ErrorKind::UnsupportedAuth(
                        format!("postgres authentication method {method}"),
                    )
                    .into());
                }
            }
        }
    }

    /// Look up the table-info statement, preparing it when absent.
    fn table_info_statement(&mut self) -> Result<String> {
        if let Some(name) = self.statements.get(TABLE_INFO_SQL) {
            return Ok(name.clone());
        }

        self.send(frontend::Parse {
            prepare_name: TABLE_INFO_NAME,
            sql: TABLE_INFO_SQL,
            param_types: &[VARCHAR_OID],
        });
        self.send(frontend::Flush);
        self.recv::<backend::ParseComplete>()?;

        self.statements
            .insert(TABLE_INFO_SQL.into(), TABLE_INFO_NAME.into());
        Ok(TABLE_INFO_NAME.into())
    }

    fn send<F: FrontendProtocol>(&mut self, message: F) {
        self.packets.send(Some(F::MSGTYPE), |buf| message.encode(buf));
    }

    /// Receive the next backend message.
    ///
    /// Notices are logged and skipped; an error response raises the error
    /// flag and surfaces as [`ErrorKind::Postgres`]. While the error flag
    /// is set, stale packets are discarded up to `ReadyForQuery` first.
    fn recv<B: BackendProtocol>(&mut self) -> Result<B> {
        if self.error {
            self.resynchronize()?;
        }

        loop {
            let body = self.packets.recv()?;
            match self.packets.opcode() {
                backend::ErrorResponse::MSGTYPE => {
                    self.error = true;
                    return Err(PgErrors::parse(body).into());
                }
                backend::NoticeResponse::MSGTYPE => {
                    log::warn!("{}", PgErrors::parse(body));
                }
                msgtype => return Ok(B::decode(msgtype, body)?),
            }
        }
    }

    fn resynchronize(&mut self) -> Result<()> {
        let mut discarded = 0usize;
        loop {
            let body = self.packets.recv()?;
            match self.packets.opcode() {
                backend::ReadyForQuery::MSGTYPE => break,
                backend::NoticeResponse::MSGTYPE => log::warn!("{}", PgErrors::parse(body)),
                stale => {
                    log::trace!("(pg) discarding {}", BackendMessage::message_name(stale));
                    discarded += 1;
                }
            }
        }
        self.error = false;
        if discarded > 0 {
            log::warn!("discarded {discarded} stale packets after an error response");
        }
        Ok(())
    }

    /// Run a simple query and collect its rows.
    fn simple_query(&mut self, sql: &str) -> Result<QueryResult> {
        log::trace!("(pg) {sql}");
        self.send(frontend::Query { sql });

        let columns = match self.recv()? {
            BackendMessage::RowDescription(description) => description.columns,
            BackendMessage::CommandComplete(_) | BackendMessage::EmptyQueryResponse(_) => {
                self.recv::<backend::ReadyForQuery>()?;
                return Ok(QueryResult::default());
            }
            message => return Err(message.unexpected("query response").into()),
        };

        let mut result =
            QueryResult::new(columns.iter().map(|c| c.name.clone()).collect());
        loop {
            match self.recv()? {
                BackendMessage::DataRow(row) => result.push(decode_row(&columns, row.cells)?),
                BackendMessage::CommandComplete(_) => break,
                message => return Err(message.unexpected("result rows").into()),
            }
        }
        self.recv::<backend::ReadyForQuery>()?;
        Ok(result)
    }
}

impl<S: Read + Write> Backend for PgConnection<S> {
    fn get_table_info(&mut self, table: &str) -> Result<Option<HashMap<String, TableInfo>>> {
        let statement = self.table_info_statement()?;

        self.send(frontend::Bind {
            portal_name: "",
            stmt_name: &statement,
            params: &[Some(table)],
        });
        self.send(frontend::Execute { portal_name: "", max_rows: 0 });
        self.send(frontend::Sync);
        self.recv::<backend::BindComplete>()?;

        let mut rows = Vec::new();
        loop {
            match self.recv()? {
                BackendMessage::DataRow(row) => rows.push(row.cells),
                BackendMessage::CommandComplete(_) => break,
                message => return Err(message.unexpected("table info").into()),
            }
        }
        self.recv::<backend::ReadyForQuery>()?;

        if rows.is_empty() {
            return Ok(None);
        }

        let mut info = HashMap::with_capacity(rows.len());
        for cells in rows {
            if cells.len() != 5 {
                return Err(ProtocolError::Malformed("table info row").into());
            }
            let text = |cell: &Option<Bytes>| -> Result<String> {
                match cell {
                    Some(bytes) => Ok(std::str::from_utf8(bytes)?.into()),
                    None => Ok(String::new()),
                }
            };

            let name = text(&cells[0])?;
            let column = TableInfo {
                ty: data_type_mask(&text(&cells[1])?),
                nullable: text(&cells[2])? == "YES",
                length: text(&cells[3])?.parse().unwrap_or(0),
                default_value: text(&cells[4])?,
                name: name.clone(),
            };
            info.insert(name, column);
        }
        Ok(Some(info))
    }

    fn generate_field(&self, field: &FieldSpec) -> Result<String> {
        let (type_name, length) = pg_type(field)?;

        let mut def = String::from(field.name);
        def.push(' ');
        def.push_str(type_name);
        if length > 0 {
            def.push('(');
            def.push_str(itoa::Buffer::new().format(length));
            def.push(')');
        }
        if !field.nullable {
            def.push_str(" not null");
        }
        if field.unique {
            def.push_str(" unique");
        }
        Ok(def)
    }

    fn alter_table_column(
        &mut self,
        table: &str,
        field: &FieldSpec,
        type_changed: bool,
        nullable_changed: bool,
    ) -> Result<()> {
        let mut statement = format!("alter table {table} alter column {}", field.name);
        if type_changed {
            let (type_name, length) = pg_type(field)?;
            statement.push_str(" type ");
            statement.push_str(type_name);
            if length > 0 {
                statement.push('(');
                statement.push_str(itoa::Buffer::new().format(length));
                statement.push(')');
            }
        }
        if nullable_changed {
            if type_changed {
                statement.push_str(&format!(", alter column {}", field.name));
            }
            statement.push_str(match field.nullable {
                true => " drop not null",
                false => " set not null",
            });
        }
        statement.push(';');
        self.query(&statement)
    }

    fn insert_into(
        &mut self,
        table: &str,
        names: &[&str],
        values: &[String],
        primary_keys: &[&str],
    ) -> Result<Option<QueryResult>> {
        let mut statement = sql::insert_statement(table, names, values);
        if primary_keys.is_empty() {
            statement.push(';');
            self.query(&statement)?;
            return Ok(None);
        }
        statement.push_str(" returning ");
        statement.push_str(&primary_keys.join(","));
        statement.push(';');
        Ok(Some(self.simple_query(&statement)?))
    }

    fn random_function(&self) -> &'static str {
        "random()"
    }

    fn escape_binary(&self, bytes: &[u8]) -> String {
        let mut out = String::with_capacity(bytes.len() * 2 + 5);
        out.push_str("'\\x");
        bytes.write_hex_upper(&mut out);
        out.push('\'');
        out
    }

    fn query(&mut self, sql: &str) -> Result<()> {
        log::trace!("(pg) {sql}");
        self.send(frontend::Query { sql });
        loop {
            match self.recv()? {
                BackendMessage::CommandComplete(_) | BackendMessage::EmptyQueryResponse(_) => { }
                BackendMessage::ReadyForQuery(_) => return Ok(()),
                message => return Err(message.unexpected("command").into()),
            }
        }
    }

    fn query_select(&mut self, sql: &str) -> Result<QueryResult> {
        self.simple_query(sql)
    }
}

/// `"md5" + hex(md5(hex(md5(password + user)) + salt))`, lowercase hex.
fn md5_password(user: &str, password: &str, salt: [u8; 4]) -> String {
    let mut hasher = Md5::new();
    hasher.update(password.as_bytes());
    hasher.update(user.as_bytes());
    let mut inner = String::with_capacity(32);
    hasher.finalize().as_slice().write_hex_lower(&mut inner);

    let mut hasher = Md5::new();
    hasher.update(inner.as_bytes());
    hasher.update(salt);
    let mut out = String::with_capacity(35);
    out.push_str("md5");
    hasher.finalize().as_slice().write_hex_lower(&mut out);
    out
}

fn decode_row(columns: &[PgColumn], cells: Vec<Option<Bytes>>) -> Result<Vec<Value>> {
    if cells.len() != columns.len() {
        return Err(ProtocolError::Malformed("data row width").into());
    }
    columns
        .iter()
        .zip(cells)
        .map(|(column, cell)| match cell {
            Some(bytes) => decode_cell(column.oid, &bytes),
            None => Ok(Value::Null),
        })
        .collect()
}

/// Decode one text-format cell per its type oid.
///
/// Oids outside the table decode as raw text; catalog domains such as the
/// `information_schema` identifier types land there.
fn decode_cell(oid: u32, bytes: &Bytes) -> Result<Value> {
    let text = std::str::from_utf8(bytes)?;

    macro_rules! parse {
        ($what:literal) => {
            text.parse().map_err(|_| ProtocolError::Malformed($what))?
        };
    }

    let value = match oid {
        // boolean, 't' or 'f'
        16 => Value::Bool(text == "t"),
        // bytea, "\x" followed by hex digits
        17 => {
            let hex = text
                .strip_prefix("\\x")
                .ok_or(ProtocolError::Malformed("bytea prefix"))?;
            let bytes =
                from_hex(hex.as_bytes()).ok_or(ProtocolError::Malformed("bytea digits"))?;
            Value::Binary(bytes)
        }
        20 => Value::Long(parse!("int8")),
        21 => Value::Short(parse!("int2")),
        23 => Value::Int(parse!("int4")),
        25 => Value::Clob(text.into()),
        700 => Value::Float(parse!("float4")),
        701 => Value::Double(parse!("float8")),
        1042 => Value::Char(
            text.chars().next().ok_or(ProtocolError::Malformed("empty char"))?,
        ),
        1043 => Value::String(text.into()),
        1082 => Value::Date(
            value::parse_date(text).map_err(|_| ProtocolError::Malformed("date"))?,
        ),
        1083 => Value::Time(
            value::parse_time(text).map_err(|_| ProtocolError::Malformed("time"))?,
        ),
        1114 => Value::DateTime(
            value::parse_datetime(text).map_err(|_| ProtocolError::Malformed("timestamp"))?,
        ),
        _ => Value::String(text.into()),
    };
    Ok(value)
}

fn data_type_mask(data_type: &str) -> ColumnType {
    match data_type {
        "boolean" => ColumnType::BOOL,
        "smallint" => ColumnType::SHORT,
        "integer" => ColumnType::INT,
        "bigint" => ColumnType::LONG,
        "real" => ColumnType::FLOAT,
        "double precision" => ColumnType::DOUBLE,
        "character" => ColumnType::CHAR,
        "character varying" => ColumnType::STRING,
        // one database type serving two logical types
        "bytea" => ColumnType::BINARY | ColumnType::BLOB,
        "text" => ColumnType::CLOB,
        "date" => ColumnType::DATE,
        "timestamp without time zone" | "timestamp with time zone" => ColumnType::DATETIME,
        "time without time zone" | "time with time zone" => ColumnType::TIME,
        _ => ColumnType::none(),
    }
}

fn pg_type(field: &FieldSpec) -> Result<(&'static str, usize)> {
    let rendered = match field.ty {
        ColumnType::BOOL => ("boolean", 0),
        ColumnType::SHORT => match field.auto_increment {
            true => ("serial2", 0),
            false => ("int2", 0),
        },
        ColumnType::INT => match field.auto_increment {
            true => ("serial4", 0),
            false => ("int4", 0),
        },
        ColumnType::LONG => match field.auto_increment {
            true => ("serial8", 0),
            false => ("int8", 0),
        },
        ColumnType::FLOAT => ("float4", 0),
        ColumnType::DOUBLE => ("float8", 0),
        // char columns hold exactly one character here
        ColumnType::CHAR => ("char", 1),
        ColumnType::STRING => ("varchar", field.length),
        ColumnType::BINARY | ColumnType::BLOB => ("bytea", 0),
        ColumnType::CLOB => ("text", 0),
        ColumnType::DATE => ("date", 0),
        ColumnType::DATETIME => ("timestamp", 0),
        ColumnType::TIME => ("time", 0),
        // i8 has no postgres rendering, and unknown masks never come from
        // a field declaration
        _ => {
            return Err(ErrorKind::UnsupportedType { backend: "postgresql", ty: field.ty }.into())
        }
    };
    Ok(rendered)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::stream::test::Pipe;
    use bytes::{BufMut, BytesMut};

    fn msg(buf: &mut BytesMut, op: u8, body: &[u8]) {
        buf.put_u8(op);
        buf.put_u32(body.len() as u32 + 4);
        buf.put_slice(body);
    }

    fn auth(method: u32) -> Vec<u8> {
        method.to_be_bytes().to_vec()
    }

    fn ready() -> Vec<u8> {
        vec![b'I']
    }

    fn startup_tail(buf: &mut BytesMut) {
        // ParameterStatus, BackendKeyData, ReadyForQuery, ParseComplete
        msg(buf, b'S', b"server_version\017\0");
        let mut key = Vec::new();
        key.extend_from_slice(&7u32.to_be_bytes());
        key.extend_from_slice(&13u32.to_be_bytes());
        msg(buf, b'K', &key);
        msg(buf, b'Z', &ready());
        msg(buf, b'1', b"");
    }

    fn config() -> Config {
        Config::local("post", "user", "passwd", 5432)
    }

    fn connect(input: BytesMut) -> PgConnection<Pipe> {
        PgConnection::handshake(Pipe::new(input.to_vec()), &config()).unwrap()
    }

    /// Byte offset right after the startup message in the sent output.
    fn startup_end(out: &[u8]) -> usize {
        u32::from_be_bytes(out[..4].try_into().unwrap()) as usize
    }

    #[test]
    fn startup_cleartext() {
        let mut input = BytesMut::new();
        msg(&mut input, b'R', &auth(3));
        msg(&mut input, b'R', &auth(0));
        startup_tail(&mut input);

        let conn = connect(input);
        assert_eq!(conn.parameters["server_version"], "17");
        assert_eq!(conn.key_data.as_ref().unwrap().process_id, 7);
        assert_eq!(conn.statements[TABLE_INFO_SQL], TABLE_INFO_NAME);

        let out = conn.packets.into_inner().output;
        // startup message has no opcode: length, version, then pairs
        assert_eq!(&out[4..8], &196608i32.to_be_bytes());
        let p = startup_end(&out);
        assert_eq!(&out[8..p], b"user\0user\0database\0post\0\0");
        // cleartext password follows
        assert_eq!(&out[p..p + 5], b"p\0\0\0\x0b");
        assert_eq!(&out[p + 5..p + 12], b"passwd\0");
    }

    #[test]
    fn startup_md5() {
        let mut input = BytesMut::new();
        let mut salted = auth(5);
        salted.extend_from_slice(&[1, 2, 3, 4]);
        msg(&mut input, b'R', &salted);
        msg(&mut input, b'R', &auth(0));
        startup_tail(&mut input);

        let conn = connect(input);
        let out = conn.packets.into_inner().output;

        let p = startup_end(&out);
        assert_eq!(out[p], b'p');
        // "md5" + 32 hex digits + nul
        assert_eq!(&out[p + 5..p + 8], b"md5");
        let digest = &out[p + 8..p + 40];
        assert!(digest.iter().all(u8::is_ascii_hexdigit));
        assert!(!digest.iter().any(u8::is_ascii_uppercase), "lowercase hex");
        assert_eq!(out[p + 40], 0);
        assert_eq!(
            md5_password("user", "passwd", [1, 2, 3, 4]),
            md5_password("user", "passwd", [1, 2, 3, 4]),
        );
    }

    #[test]
    fn unsupported_auth_method() {
        let mut input = BytesMut::new();
        msg(&mut input, b'R', &auth(10));
        let result = PgConnection::handshake(Pipe::new(input.to_vec()), &config());
        assert!(matches!(
            result.unwrap_err().kind(),
            ErrorKind::UnsupportedAuth(_),
        ));
    }

    fn connected() -> PgConnection<Pipe> {
        let mut input = BytesMut::new();
        msg(&mut input, b'R', &auth(0));
        startup_tail(&mut input);
        connect(input)
    }

    fn feed(conn: &mut PgConnection<Pipe>, packets: BytesMut) {
        let input = &mut conn.packets.io_mut().input;
        let position = input.position();
        input.get_mut().extend_from_slice(&packets);
        input.set_position(position);
    }

    fn row_description(buf: &mut BytesMut, columns: &[(&str, u32)]) {
        let mut body = BytesMut::new();
        body.put_u16(columns.len() as u16);
        for (name, oid) in columns {
            body.put_slice(name.as_bytes());
            body.put_u8(0);
            body.put_u32(0); // table oid
            body.put_u16(0); // attribute number
            body.put_u32(*oid);
            body.put_i16(0); // type size
            body.put_i32(0); // type modifier
            body.put_u16(0); // format code
        }
        msg(buf, b'T', &body);
    }

    fn data_row(buf: &mut BytesMut, cells: &[Option<&[u8]>]) {
        let mut body = BytesMut::new();
        body.put_u16(cells.len() as u16);
        for cell in cells {
            match cell {
                Some(value) => {
                    body.put_u32(value.len() as u32);
                    body.put_slice(value);
                }
                None => body.put_u32(u32::MAX),
            }
        }
        msg(buf, b'D', &body);
    }

    #[test]
    fn select_decodes_typed_columns() {
        let mut conn = connected();

        let mut packets = BytesMut::new();
        row_description(
            &mut packets,
            &[("test_id", 23), ("string", 1043), ("ok", 16), ("payload", 17)],
        );
        data_row(
            &mut packets,
            &[Some(b"1"), Some(b"test"), Some(b"t"), Some(b"\\xDEAD")],
        );
        data_row(&mut packets, &[Some(b"2"), None, Some(b"f"), None]);
        msg(&mut packets, b'C', b"SELECT 2\0");
        msg(&mut packets, b'Z', &ready());
        feed(&mut conn, packets);

        let result = conn.query_select("select * from test;").unwrap();
        assert_eq!(result.columns(), ["test_id", "string", "ok", "payload"]);
        assert_eq!(
            result.rows()[0],
            [
                Value::Int(1),
                Value::String("test".into()),
                Value::Bool(true),
                Value::Binary(vec![0xDE, 0xAD]),
            ],
        );
        assert_eq!(
            result.rows()[1],
            [Value::Int(2), Value::Null, Value::Bool(false), Value::Null],
        );
    }

    #[test]
    fn command_consumes_ready_for_query() {
        let mut conn = connected();

        let mut packets = BytesMut::new();
        msg(&mut packets, b'C', b"CREATE TABLE\0");
        msg(&mut packets, b'Z', &ready());
        msg(&mut packets, b'C', b"DROP TABLE\0");
        msg(&mut packets, b'Z', &ready());
        feed(&mut conn, packets);

        conn.query("create table test (a int4);").unwrap();
        conn.query("drop table test;").unwrap();
    }

    #[test]
    fn error_response_drains_to_ready() {
        let mut conn = connected();

        let mut packets = BytesMut::new();
        msg(&mut packets, b'E', b"SERROR\0C23505\0Mduplicate key\0\0");
        msg(&mut packets, b'Z', &ready());
        msg(&mut packets, b'C', b"INSERT 0 1\0");
        msg(&mut packets, b'Z', &ready());
        feed(&mut conn, packets);

        let err = conn.query("insert into test (b) values (1);").unwrap_err();
        let ErrorKind::Postgres(errors) = err.kind() else {
            panic!("expected a backend coded error, got {err:?}");
        };
        assert_eq!(errors.sqlstate(), Some("23505"));

        // the second operation resynchronizes and succeeds
        conn.query("insert into test (b) values (2);").unwrap();
    }

    #[test]
    fn table_info_round_trip() {
        let mut conn = connected();

        let mut packets = BytesMut::new();
        msg(&mut packets, b'2', b""); // BindComplete
        data_row(
            &mut packets,
            &[Some(b"a"), Some(b"integer"), Some(b"NO"), None, None],
        );
        data_row(
            &mut packets,
            &[Some(b"string"), Some(b"character varying"), Some(b"YES"), Some(b"10"), None],
        );
        msg(&mut packets, b'C', b"SELECT 2\0");
        msg(&mut packets, b'Z', &ready());
        feed(&mut conn, packets);

        let info = conn.get_table_info("test").unwrap().unwrap();
        assert_eq!(info["a"].ty, ColumnType::INT);
        assert!(!info["a"].nullable);
        assert_eq!(info["string"].ty, ColumnType::STRING);
        assert_eq!(info["string"].length, 10);
        assert!(info["string"].nullable);
    }

    #[test]
    fn missing_table_info() {
        let mut conn = connected();

        let mut packets = BytesMut::new();
        msg(&mut packets, b'2', b"");
        msg(&mut packets, b'C', b"SELECT 0\0");
        msg(&mut packets, b'Z', &ready());
        feed(&mut conn, packets);

        assert!(conn.get_table_info("missing").unwrap().is_none());
    }

    #[test]
    fn escape_binary_renders_hex() {
        let conn = connected();
        assert_eq!(conn.escape_binary(&[0xDE, 0xAD]), "'\\xDEAD'");
        assert_eq!(conn.escape_binary(&[]), "'\\x'");
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
        assert_eq!(conn.generate_field(&field).unwrap(), "test_id serial4 not null");

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

        let field = FieldSpec {
            name: "b",
            ty: ColumnType::SHORT,
            length: 0,
            nullable: false,
            unique: true,
            auto_increment: false,
            default_value: "",
        };
        assert_eq!(conn.generate_field(&field).unwrap(), "b int2 not null unique");

        let field = FieldSpec {
            name: "raw",
            ty: ColumnType::BYTE,
            length: 0,
            nullable: false,
            unique: false,
            auto_increment: false,
            default_value: "",
        };
        assert!(conn.generate_field(&field).is_err(), "no postgres i8 rendering");
    }
}
