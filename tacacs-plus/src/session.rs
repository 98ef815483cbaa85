//! Owns header, session-id, and sequence-number state for one TACACS+ exchange.
//!
//! A session is single-threaded: every method here takes `&mut self`, so two operations
//! on the same session can never be interleaved.

use std::io::{Read, Write};

use byteorder::{ByteOrder, NetworkEndian};
use rand::Rng;

use tacacs_plus_protocol::{
    DeserializeError, HeaderInfo, MajorVersion, MinorVersion, Packet, PacketBody, PacketFlags,
    Serialize, ToOwnedBody, Version, MAX_BODY_LENGTH,
};

use crate::error::ClientError;
use crate::transport::Transport;

/// A single TACACS+ session: one transport, one session id, one monotonic sequence counter.
pub struct Session<S> {
    transport: Transport<S>,
    secret: Vec<u8>,
    session_id: u32,
    sequence: u8,
}

impl<S: Read + Write> Session<S> {
    /// Starts a new session on `transport`, drawing a random session id and starting the
    /// sequence counter at 1 (the first packet of any session).
    pub fn new(transport: Transport<S>, secret: Vec<u8>) -> Self {
        Self::with_session_id(transport, secret, rand::thread_rng().gen())
    }

    /// Starts a new session with a caller-chosen session id rather than a random one.
    ///
    /// The wire protocol itself has no use for a predictable id; this exists so tests can
    /// script a server's replies against a session id known ahead of time.
    pub fn with_session_id(transport: Transport<S>, secret: Vec<u8>, session_id: u32) -> Self {
        Self {
            transport,
            secret,
            session_id,
            sequence: 1,
        }
    }

    /// The session id drawn for this session, constant for its whole lifetime.
    pub fn session_id(&self) -> u32 {
        self.session_id
    }

    fn take_sequence(&mut self) -> Result<u8, ClientError> {
        let current = self.sequence;
        self.sequence = self
            .sequence
            .checked_add(1)
            .ok_or(ClientError::SequenceOverflow)?;
        Ok(current)
    }

    /// Builds, obfuscates (unless the secret is empty), and writes a packet, advancing the
    /// sequence counter.
    pub fn send<B: PacketBody + Serialize>(&mut self, body: B) -> Result<(), ClientError> {
        let sequence = self.take_sequence()?;
        let header = HeaderInfo::new(
            Version::new(MajorVersion::RFC8907, MinorVersion::Default),
            sequence,
            PacketFlags::empty(),
            self.session_id,
        );
        let packet = Packet::new(header, body);

        let mut buffer = vec![0u8; packet.wire_size()];
        let written = if self.secret.is_empty() {
            packet.serialize_unobfuscated(&mut buffer)?
        } else {
            packet.serialize(&self.secret, &mut buffer)?
        };

        if written != buffer.len() {
            return Err(ClientError::AssemblyError);
        }

        self.transport.write_all(&buffer)
    }

    /// Reads the next packet as its borrowed representation, checking its sequence number
    /// along the way. `buffer` is supplied by the caller so the returned packet can borrow
    /// from it.
    pub fn recv_packet<'raw, B>(&mut self, buffer: &'raw mut Vec<u8>) -> Result<Packet<B>, ClientError>
    where
        B: PacketBody + TryFrom<&'raw [u8], Error = DeserializeError>,
    {
        let expected_sequence = self.take_sequence()?;

        buffer.clear();
        buffer.resize(HeaderInfo::HEADER_SIZE_BYTES, 0);
        self.transport.read_header(buffer)?;

        let claimed_body_length = NetworkEndian::read_u32(&buffer[8..12]);
        if claimed_body_length > MAX_BODY_LENGTH {
            return Err(ClientError::InvalidPacketReceived(DeserializeError::BodyTooLarge {
                claimed: claimed_body_length,
            }));
        }

        buffer.resize(HeaderInfo::HEADER_SIZE_BYTES + claimed_body_length as usize, 0);
        self.transport
            .read_body(&mut buffer[HeaderInfo::HEADER_SIZE_BYTES..])?;

        let packet = if self.secret.is_empty() {
            Packet::deserialize_unobfuscated(buffer, self.session_id, expected_sequence)?
        } else {
            Packet::deserialize(&self.secret, buffer, self.session_id, expected_sequence)?
        };

        Ok(packet)
    }

    /// Reads the next packet and converts its body into an owned, heap-allocated form.
    pub fn recv<'raw, B>(&mut self, buffer: &'raw mut Vec<u8>) -> Result<B::Owned, ClientError>
    where
        B: PacketBody + ToOwnedBody + TryFrom<&'raw [u8], Error = DeserializeError>,
    {
        let packet = self.recv_packet::<B>(buffer)?;
        Ok(packet.body().to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn sequence_overflows_after_255_packets() {
        let transport = Transport::new(Cursor::new(Vec::<u8>::new()));
        let mut session = Session::new(transport, Vec::new());
        session.sequence = 255;

        let result = session.take_sequence();
        assert!(matches!(result, Err(ClientError::SequenceOverflow)));
    }

    #[test]
    fn sequence_increments_by_one_per_send_and_recv() {
        let transport = Transport::new(Cursor::new(Vec::<u8>::new()));
        let mut session = Session::new(transport, Vec::new());

        assert_eq!(session.take_sequence().unwrap(), 1);
        assert_eq!(session.take_sequence().unwrap(), 2);
        assert_eq!(session.take_sequence().unwrap(), 3);
    }

    #[test]
    fn session_id_is_constant() {
        let transport = Transport::new(Cursor::new(Vec::<u8>::new()));
        let session = Session::new(transport, Vec::new());
        let id = session.session_id();
        assert_eq!(session.session_id(), id);
    }
}
