//! Postgres error responses.
//!
//! An `ErrorResponse` body is a sequence of `(field code, string)` pairs
//! terminated by a zero byte. Every field becomes one [`PgError`]; the
//! whole response is surfaced as the aggregate [`PgErrors`].
use bytes::{Buf, Bytes};
use std::fmt;

/// One identified field of a postgres error response.
#[derive(Clone, PartialEq, Eq)]
pub struct PgError {
    /// Field type code: 'S' severity, 'C' sqlstate, 'M' message, ...
    pub code: u8,
    pub message: String,
}

impl std::error::Error for PgError { }

impl fmt::Display for PgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(postgresql-{}) {}", char::from(self.code), self.message)
    }
}

impl fmt::Debug for PgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

/// Every field of one postgres error response.
#[derive(Clone, PartialEq, Eq)]
pub struct PgErrors(pub Vec<PgError>);

impl PgErrors {
    /// Parse an `ErrorResponse` or `NoticeResponse` body.
    ///
    /// Unknown field codes are kept; a missing terminator ends the parse.
    pub(crate) fn parse(mut body: Bytes) -> PgErrors {
        let mut fields = Vec::new();
        while !body.is_empty() {
            let code = body.get_u8();
            if code == 0 {
                break;
            }
            let end = body
                .iter()
                .position(|b| *b == 0)
                .unwrap_or(body.len());
            let raw = body.split_to(end);
            if !body.is_empty() {
                body.advance(1); // nul
            }
            fields.push(PgError {
                code,
                message: String::from_utf8_lossy(&raw).into_owned(),
            });
        }
        PgErrors(fields)
    }

    /// The sqlstate code field, when the server sent one.
    pub fn sqlstate(&self) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.code == b'C')
            .map(|e| e.message.as_str())
    }
}

impl std::error::Error for PgErrors { }

impl fmt::Display for PgErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields = self.0.iter();
        if let Some(first) = fields.next() {
            first.fmt(f)?;
        }
        for field in fields {
            write!(f, ", {field}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for PgErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_fields() {
        let body = Bytes::from_static(b"SERROR\0C23505\0Mduplicate key\0\0");
        let errors = PgErrors::parse(body);
        assert_eq!(errors.0.len(), 3);
        assert_eq!(errors.0[0].code, b'S');
        assert_eq!(errors.0[0].message, "ERROR");
        assert_eq!(errors.sqlstate(), Some("23505"));
        assert_eq!(
            errors.to_string(),
            "(postgresql-S) ERROR, (postgresql-C) 23505, (postgresql-M) duplicate key",
        );
    }

    #[test]
    fn parse_without_terminator() {
        let errors = PgErrors::parse(Bytes::from_static(b"Mboom"));
        assert_eq!(errors.0.len(), 1);
        assert_eq!(errors.0[0].message, "boom");
    }
}
