//! `shark` error types.
use std::{backtrace::Backtrace, fmt, io, str::Utf8Error};

use crate::{
    config::ParseError,
    mysql::MysqlError,
    postgres::PgErrors,
    row::BindError,
    stream::FrameError,
    types::ColumnType,
};

/// A specialized [`Result`] type for `shark` operation.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// All possible error from `shark` library.
pub struct Error {
    context: String,
    backtrace: Backtrace,
    kind: ErrorKind,
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

/// All possible error kind from `shark` library.
pub enum ErrorKind {
    /// Connection URL failed to parse.
    Config(ParseError),
    /// Socket failure.
    Io(io::Error),
    /// The server closed the socket mid conversation.
    ConnectionClosed,
    /// Unexpected or malformed packet.
    Protocol(ProtocolError),
    /// The server requested an authentication method this library does not
    /// speak.
    UnsupportedAuth(String),
    /// Error response from a postgres server, one entry per error field.
    Postgres(PgErrors),
    /// Error response from a mysql server.
    Mysql(MysqlError),
    /// A result row did not fit the entity declaration.
    Bind(BindError),
    /// A caller-supplied column name does not exist on the entity.
    UnknownColumn(String),
    /// The backend has no rendering for this logical type.
    UnsupportedType {
        backend: &'static str,
        ty: ColumnType,
    },
    /// The server sent non utf8 text.
    Utf8(Utf8Error),
}

macro_rules! from {
    (<$ty:ty>$pat:pat => $body:expr) => {
        impl From<$ty> for Error {
            fn from($pat: $ty) -> Self {
                let backtrace = std::backtrace::Backtrace::capture();
                Self { context: String::new(), backtrace, kind: $body }
            }
        }
    };
}

from!(<ErrorKind>e => e);
from!(<ParseError>e => ErrorKind::Config(e));
from!(<io::Error>e => ErrorKind::Io(e));
from!(<ProtocolError>e => ErrorKind::Protocol(e));
from!(<PgErrors>e => ErrorKind::Postgres(e));
from!(<MysqlError>e => ErrorKind::Mysql(e));
from!(<BindError>e => ErrorKind::Bind(e));
from!(<Utf8Error>e => ErrorKind::Utf8(e));

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        match e {
            FrameError::ConnectionClosed => ErrorKind::ConnectionClosed.into(),
            FrameError::Io(e) => ErrorKind::Io(e).into(),
        }
    }
}

impl std::error::Error for Error { }

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.context.is_empty() {
            write!(f, "{}: ", self.context)?;
        }

        fmt::Display::fmt(&self.kind, f)?;

        if let std::backtrace::BacktraceStatus::Captured = self.backtrace.status() {
            let mut backtrace = self.backtrace.to_string();
            write!(f, "\n\n")?;
            writeln!(f, "Stack backtrace:")?;
            backtrace.truncate(backtrace.trim_end().len());
            write!(f, "{}", backtrace)?;
        }

        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

impl std::error::Error for ErrorKind { }

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => e.fmt(f),
            Self::Io(e) => e.fmt(f),
            Self::ConnectionClosed => f.write_str("connection closed by server"),
            Self::Protocol(e) => e.fmt(f),
            Self::UnsupportedAuth(method) => {
                write!(f, "authentication method {method} is not supported")
            }
            Self::Postgres(e) => e.fmt(f),
            Self::Mysql(e) => e.fmt(f),
            Self::Bind(e) => e.fmt(f),
            Self::UnknownColumn(name) => write!(f, "unknown column: {name}"),
            Self::UnsupportedType { backend, ty } => {
                write!(f, "{backend} has no column type for {ty:?}")
            }
            Self::Utf8(e) => e.fmt(f),
        }
    }
}

impl fmt::Debug for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

/// An error when translating packets from the server.
pub enum ProtocolError {
    /// A packet arrived out of the expected order.
    WrongPacketSequence {
        expected: u8,
        got: u8,
    },
    /// A packet this library does not know in the current phase.
    Unexpected {
        got: u8,
        phase: &'static str,
    },
    /// A packet too short or otherwise unreadable.
    Malformed(&'static str),
}

impl ProtocolError {
    pub(crate) fn unexpected(got: u8, phase: &'static str) -> ProtocolError {
        ProtocolError::Unexpected { got, phase }
    }
}

impl From<Utf8Error> for ProtocolError {
    fn from(_: Utf8Error) -> Self {
        ProtocolError::Malformed("non utf8 string")
    }
}

impl std::error::Error for ProtocolError { }

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongPacketSequence { expected, got } => write!(
                f,
                "wrong packet sequence: expected '{}', got '{}'",
                char::from(*expected),
                char::from(*got),
            ),
            Self::Unexpected { got, phase } => {
                write!(f, "unexpected packet ({:#04x}) during {phase}", got)
            }
            Self::Malformed(what) => write!(f, "malformed packet: {what}"),
        }
    }
}

impl fmt::Debug for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}
