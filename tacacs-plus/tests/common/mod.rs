//! Shared scaffolding for the in-memory integration tests: a stream that serves scripted
//! server replies instead of talking to a real daemon, and helpers that hand-encode those
//! replies the same way the protocol crate's own unit tests do (its `Reply` types have no
//! `Serialize` impl, since a client only ever receives them).

use std::collections::VecDeque;
use std::io::{self, Read, Write};

use byteorder::{ByteOrder, NetworkEndian};
use tacacs_plus_protocol::{MajorVersion, MinorVersion, PacketFlags, PacketType, Version};

/// A shared secret never used by these tests: every scripted exchange runs over the
/// unobfuscated wire path, since the protocol crate keeps its obfuscation keystream
/// private to its own crate.
pub const EMPTY_SECRET: &[u8] = b"";

/// Stands in for a live TCP connection to a single TACACS+ server: reads are served from
/// a pre-scripted buffer of bytes (the server's replies), writes are captured so a test
/// can assert on what the client actually sent.
pub struct MemoryStream {
    inbound: VecDeque<u8>,
    pub sent: Vec<u8>,
}

impl MemoryStream {
    /// Builds a stream that will serve `inbound` (one or more concatenated packets) in
    /// response to reads, in order.
    pub fn scripted(inbound: Vec<u8>) -> Self {
        Self {
            inbound: inbound.into(),
            sent: Vec::new(),
        }
    }
}

impl Read for MemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.inbound.len());
        for slot in buf[..n].iter_mut() {
            *slot = self.inbound.pop_front().expect("checked length above");
        }
        Ok(n)
    }
}

impl Write for MemoryStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sent.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Hand-encodes a 12-byte header followed by `body`, the same layout `HeaderInfo::serialize`
/// produces, but reachable from outside the protocol crate.
pub fn packet_bytes(
    packet_type: PacketType,
    sequence_number: u8,
    flags: PacketFlags,
    session_id: u32,
    body: &[u8],
) -> Vec<u8> {
    let mut out = vec![0u8; 12 + body.len()];
    out[0] = Version::new(MajorVersion::RFC8907, MinorVersion::Default).into();
    out[1] = packet_type as u8;
    out[2] = sequence_number;
    out[3] = flags.bits();
    NetworkEndian::write_u32(&mut out[4..8], session_id);
    NetworkEndian::write_u32(&mut out[8..12], body.len() as u32);
    out[12..].copy_from_slice(body);
    out
}

/// Encodes an authentication reply body: `status flags msglen datalen message data`.
pub fn authentication_reply_body(status: u8, flags: u8, message: &[u8], data: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; 6];
    out[0] = status;
    out[1] = flags;
    NetworkEndian::write_u16(&mut out[2..4], message.len() as u16);
    NetworkEndian::write_u16(&mut out[4..6], data.len() as u16);
    out.extend_from_slice(message);
    out.extend_from_slice(data);
    out
}

/// Encodes an authorization reply body: `status argcount msglen datalen arglens... message
/// data args...`. `arguments` are encoded as-is (already `key=value`/`key*value` text).
pub fn authorization_reply_body(status: u8, message: &[u8], data: &[u8], arguments: &[&[u8]]) -> Vec<u8> {
    let mut out = vec![0u8; 6];
    out[0] = status;
    out[1] = arguments.len() as u8;
    NetworkEndian::write_u16(&mut out[2..4], message.len() as u16);
    NetworkEndian::write_u16(&mut out[4..6], data.len() as u16);

    for argument in arguments {
        out.push(argument.len() as u8);
    }
    out.extend_from_slice(message);
    out.extend_from_slice(data);
    for argument in arguments {
        out.extend_from_slice(argument);
    }
    out
}

/// Encodes an accounting reply body: `msglen datalen status message data`.
pub fn accounting_reply_body(status: u8, message: &[u8], data: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; 5];
    NetworkEndian::write_u16(&mut out[0..2], message.len() as u16);
    NetworkEndian::write_u16(&mut out[2..4], data.len() as u16);
    out[4] = status;
    out.extend_from_slice(message);
    out.extend_from_slice(data);
    out
}
