//! Mysql error responses.
use std::fmt;

/// An ERR packet from the mysql server.
#[derive(Clone, PartialEq, Eq)]
pub struct MysqlError {
    /// Server error number, e.g. 1062 for a duplicate key.
    pub code: u16,
    pub message: String,
}

impl std::error::Error for MysqlError { }

impl fmt::Display for MysqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(mysql-{}) {}", self.code, self.message)
    }
}

impl fmt::Debug for MysqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}
