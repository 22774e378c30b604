//! Framed packet stream shared by both wire protocols.
//!
//! Both backends speak length-prefixed packets over one blocking TCP
//! socket, they only disagree on the framing parameters:
//!
//! ```text
//! postgres  ┏━━━━┳━━━━━━━━━━━━━┳━━━━━━┓      mysql  ┏━━━━━━━━━┳━━━━━┳━━━━━━┓
//!           ┃ Op ┃ Length (BE) ┃ Body ┃             ┃ Len (LE) ┃ Seq ┃ Body ┃
//!           ┣━━━━╋━━━━━━━━━━━━━╋━━━━━━┫             ┣━━━━━━━━━╋━━━━━╋━━━━━━┫
//!           ┃ u8 ┃ u32, self-incl ┃ .. ┃            ┃   u24   ┃ u8  ┃  ..  ┃
//!           ┗━━━━┻━━━━━━━━━━━━━┻━━━━━━┛             ┗━━━━━━━━━┻━━━━━┻━━━━━━┛
//! ```
//!
//! [`Packets`] owns the socket and a pair of buffers; sends are buffered
//! until [`flush`][Packets::flush], receives read whole packets.
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io::{Read, Write};

const READ_CHUNK: usize = 4096;
const DEFAULT_BUF_CAPACITY: usize = 1024;

/// Byte order of a framing field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

/// Framing parameters of one wire protocol.
#[derive(Clone, Copy, Debug)]
pub struct Framing {
    /// Leading opcode bytes before the length field (0 or 1).
    pub id_length: usize,
    /// Width of the length field in bytes (1..=8).
    pub length_width: usize,
    /// Byte order of the length field.
    pub length_endian: Endian,
    /// Whether the length value counts its own bytes.
    pub length_includes_itself: bool,
    /// Width of the per-packet sequence counter, 0 disables it.
    pub sequence_width: usize,
    /// Byte order of the sequence counter.
    pub sequence_endian: Endian,
}

/// Postgres framing: opcode byte, 4-byte big-endian self-including length.
pub const POSTGRES: Framing = Framing {
    id_length: 1,
    length_width: 4,
    length_endian: Endian::Big,
    length_includes_itself: true,
    sequence_width: 0,
    sequence_endian: Endian::Big,
};

/// Mysql framing: 3-byte little-endian length, 1-byte sequence counter.
pub const MYSQL: Framing = Framing {
    id_length: 0,
    length_width: 3,
    length_endian: Endian::Little,
    length_includes_itself: false,
    sequence_width: 1,
    sequence_endian: Endian::Little,
};

impl Framing {
    const fn header_len(&self) -> usize {
        self.id_length + self.length_width + self.sequence_width
    }
}

/// An error from the framed stream.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The server closed the socket (0-byte read).
    #[error("connection closed by server")]
    ConnectionClosed,
    /// Any other socket failure.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// A framed packet stream over a blocking socket.
///
/// Generic over the inner stream so protocol flows can be exercised
/// against in-memory bytes.
#[derive(Debug)]
pub struct Packets<S> {
    io: S,
    framing: Framing,
    read_buf: BytesMut,
    write_buf: BytesMut,
    sequence: u64,
    opcode: u8,
}

impl<S> Packets<S> {
    pub fn new(io: S, framing: Framing) -> Self {
        Self {
            io,
            framing,
            read_buf: BytesMut::with_capacity(DEFAULT_BUF_CAPACITY),
            write_buf: BytesMut::with_capacity(DEFAULT_BUF_CAPACITY),
            sequence: 0,
            opcode: 0,
        }
    }

    /// The leading opcode byte of the last received packet.
    ///
    /// Stays valid until the next [`recv`][Packets::recv]. Always 0 for a
    /// framing without opcode bytes.
    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    /// Restart the sequence counter for a new command round-trip.
    pub fn reset_sequence(&mut self) {
        self.sequence = 0;
    }

    /// Consume self into the inner stream.
    pub fn into_inner(self) -> S {
        self.io
    }

    #[cfg(test)]
    pub(crate) fn io_mut(&mut self) -> &mut S {
        &mut self.io
    }

    /// Buffer one packet: opcode (if framed), patched length, sequence
    /// (post-incremented), then the payload written by `body`.
    pub fn send(&mut self, opcode: Option<u8>, body: impl FnOnce(&mut BytesMut)) {
        debug_assert_eq!(
            opcode.is_some(),
            self.framing.id_length == 1,
            "opcode presence must match the framing",
        );

        if let Some(op) = opcode {
            self.write_buf.put_u8(op);
        }
        self.frame(body);
    }

    /// Buffer one packet without the leading opcode byte.
    ///
    /// The postgres startup message is the one packet that has no
    /// message-type byte even though the framing otherwise carries one.
    pub fn send_headless(&mut self, body: impl FnOnce(&mut BytesMut)) {
        self.frame(body);
    }

    fn frame(&mut self, body: impl FnOnce(&mut BytesMut)) {
        let len_at = self.write_buf.len();
        self.write_buf.put_bytes(0, self.framing.length_width);

        if self.framing.sequence_width > 0 {
            let seq = self.sequence;
            self.sequence += 1;
            match self.framing.sequence_endian {
                Endian::Big => self.write_buf.put_uint(seq, self.framing.sequence_width),
                Endian::Little => self.write_buf.put_uint_le(seq, self.framing.sequence_width),
            }
        }

        let body_at = self.write_buf.len();
        body(&mut self.write_buf);

        let mut length = (self.write_buf.len() - body_at) as u64;
        if self.framing.length_includes_itself {
            length += self.framing.length_width as u64;
        }

        let mut slot = &mut self.write_buf[len_at..len_at + self.framing.length_width];
        match self.framing.length_endian {
            Endian::Big => slot.put_uint(length, self.framing.length_width),
            Endian::Little => slot.put_uint_le(length, self.framing.length_width),
        }
    }
}

impl<S: Read + Write> Packets<S> {
    /// Write all buffered packets to the socket.
    pub fn flush(&mut self) -> Result<(), FrameError> {
        while !self.write_buf.is_empty() {
            let wrote = self.io.write(&self.write_buf)?;
            if wrote == 0 {
                return Err(FrameError::ConnectionClosed);
            }
            self.write_buf.advance(wrote);
        }
        self.io.flush()?;
        Ok(())
    }

    /// Receive one packet body, flushing buffered sends first.
    ///
    /// The opcode byte, if framed, is available from
    /// [`opcode`][Packets::opcode] afterwards. A received sequence counter
    /// re-synchronizes the local one.
    pub fn recv(&mut self) -> Result<Bytes, FrameError> {
        if !self.write_buf.is_empty() {
            self.flush()?;
        }

        let header_len = self.framing.header_len();
        while self.read_buf.len() < header_len {
            self.fill()?;
        }

        let mut header = &self.read_buf[..header_len];
        let opcode = match self.framing.id_length {
            0 => 0,
            _ => header.get_u8(),
        };
        let length = match self.framing.length_endian {
            Endian::Big => header.get_uint(self.framing.length_width),
            Endian::Little => header.get_uint_le(self.framing.length_width),
        };
        if self.framing.sequence_width > 0 {
            let seq = match self.framing.sequence_endian {
                Endian::Big => header.get_uint(self.framing.sequence_width),
                Endian::Little => header.get_uint_le(self.framing.sequence_width),
            };
            self.sequence = seq + 1;
        }

        let mut body_len = length as usize;
        if self.framing.length_includes_itself {
            body_len -= self.framing.length_width;
        }

        while self.read_buf.len() < header_len + body_len {
            self.fill()?;
        }

        self.read_buf.advance(header_len);
        self.opcode = opcode;
        Ok(self.read_buf.split_to(body_len).freeze())
    }

    fn fill(&mut self) -> Result<(), FrameError> {
        let mut chunk = [0u8; READ_CHUNK];
        match self.io.read(&mut chunk)? {
            0 => Err(FrameError::ConnectionClosed),
            read => {
                self.read_buf.extend_from_slice(&chunk[..read]);
                Ok(())
            }
        }
    }
}
