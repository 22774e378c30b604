use bytes::{Buf, BufMut, Bytes};
use std::fmt::Write;

use crate::common::ByteStr;

/// Checked length casts for wire fields.
pub trait UsizeExt {
    /// Length is `usize` in rust, while the wire wants `u32`,
    /// this will panic when overflow instead of wrapping.
    fn to_u32(self) -> u32;
}

/// Zero-terminated string operation in [`BufMut`].
pub trait BufMutExt {
    /// Write string bytes followed by the `0x00` sentinel.
    fn put_nul_string(&mut self, string: &str);
}

/// Zero-terminated string operation in [`Bytes`].
pub trait BytesExt {
    /// Read bytes until the `0x00` sentinel, strip it.
    ///
    /// Using [`ByteStr`] avoid allocating [`Vec`] as it required for [`String::from_utf8`]
    fn get_nul_bytestr(&mut self) -> Result<ByteStr, std::str::Utf8Error>;

    /// Read raw bytes until the `0x00` sentinel, strip it.
    fn get_nul_bytes(&mut self) -> Bytes;
}

/// Hex rendering for binary values and auth digests.
pub trait HexExt {
    /// Append uppercase hex digits of self to `out`.
    fn write_hex_upper(&self, out: &mut String);

    /// Append lowercase hex digits of self to `out`.
    fn write_hex_lower(&self, out: &mut String);
}

/// Helper trait to [`Display`][std::fmt::Display] bytes.
pub trait FmtExt {
    /// Lossy [`Display`][std::fmt::Display] bytes.
    fn lossy(&self) -> LossyFmt<'_>;
}

/// Lossy [`Display`][std::fmt::Display] implementation for bytes.
pub struct LossyFmt<'a>(pub &'a [u8]);

impl UsizeExt for usize {
    fn to_u32(self) -> u32 {
        self.try_into().expect("message size too large for protocol")
    }
}

impl<B: BufMut> BufMutExt for B {
    fn put_nul_string(&mut self, string: &str) {
        self.put(string.as_bytes());
        self.put_u8(b'\0');
    }
}

impl BytesExt for Bytes {
    fn get_nul_bytestr(&mut self) -> Result<ByteStr, std::str::Utf8Error> {
        ByteStr::from_utf8(self.get_nul_bytes())
    }

    fn get_nul_bytes(&mut self) -> Bytes {
        let end = self
            .iter()
            .position(|e| matches!(e, b'\0'))
            .expect("wire string did not nul terminated");
        let me = self.split_to(end);
        Buf::advance(self, 1); // nul
        me
    }
}

impl HexExt for [u8] {
    fn write_hex_upper(&self, out: &mut String) {
        for b in self {
            write!(out, "{b:02X}").expect("writing to a string never fails");
        }
    }

    fn write_hex_lower(&self, out: &mut String) {
        for b in self {
            write!(out, "{b:02x}").expect("writing to a string never fails");
        }
    }
}

/// Parse hex digits back into bytes, accepting either case.
pub fn from_hex(hex: &[u8]) -> Option<Vec<u8>> {
    fn nibble(b: u8) -> Option<u8> {
        match b {
            b'0'..=b'9' => Some(b - b'0'),
            b'a'..=b'f' => Some(b - b'a' + 10),
            b'A'..=b'F' => Some(b - b'A' + 10),
            _ => None,
        }
    }

    if hex.len() % 2 != 0 {
        return None;
    }

    hex.chunks_exact(2)
        .map(|pair| Some(nibble(pair[0])? << 4 | nibble(pair[1])?))
        .collect()
}

impl FmtExt for [u8] {
    fn lossy(&self) -> LossyFmt<'_> {
        LossyFmt(self)
    }
}

impl std::fmt::Display for LossyFmt<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for &b in self.0 {
            if b.is_ascii_graphic() || b.is_ascii_whitespace() {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:x}")?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for LossyFmt<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "b\"{self}\"")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn nul_string_roundtrip() {
        let mut buf = BytesMut::new();
        buf.put_nul_string("shark");
        buf.put_nul_string("");
        let mut bytes = buf.freeze();
        assert_eq!(bytes.get_nul_bytestr().unwrap(), "shark");
        assert_eq!(bytes.get_nul_bytestr().unwrap(), "");
        assert!(bytes.is_empty());
    }

    #[test]
    fn hex() {
        let mut out = String::new();
        [0xDEu8, 0xAD].write_hex_upper(&mut out);
        assert_eq!(out, "DEAD");
        assert_eq!(from_hex(b"DEAD").unwrap(), vec![0xDE, 0xAD]);
        assert_eq!(from_hex(b"dead").unwrap(), vec![0xDE, 0xAD]);
        assert_eq!(from_hex(b"dea"), None);
        assert_eq!(from_hex(b"zz"), None);
    }
}
