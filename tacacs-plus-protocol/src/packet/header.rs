//! The 12-byte TACACS+ packet header.

use bitflags::bitflags;
use byteorder::{ByteOrder, NetworkEndian};
use getset::{CopyGetters, Setters};

use super::PacketType;
use crate::{DeserializeError, Version};

/// Flags carried in a packet header.
#[repr(transparent)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct PacketFlags(u8);

bitflags! {
    impl PacketFlags: u8 {
        /// Indicates the body of the packet is unobfuscated.
        ///
        /// RFC 8907 states that "this option is deprecated and **MUST NOT** be used in
        /// production" (section 4.5); this client only ever sets it when no shared secret
        /// was configured for the server being addressed.
        const UNENCRYPTED       = 0b00000001;

        /// Signals that the client would like to reuse a TCP connection across multiple sessions.
        ///
        /// Never requested by this client; see the single-session-per-connection non-goal.
        const SINGLE_CONNECTION = 0b00000100;
    }
}

/// Information included in a TACACS+ packet header.
#[derive(Debug, PartialEq, Eq, Clone, Copy, CopyGetters, Setters)]
pub struct HeaderInfo {
    /// The protocol version of this packet.
    #[getset(get_copy = "pub")]
    pub(crate) version: Version,

    /// The sequence number of this packet within its session.
    ///
    /// Odd numbers are sent by the client, even numbers by the server; the first packet
    /// of a session is always sequence 1.
    #[getset(get_copy = "pub")]
    pub(crate) sequence_number: u8,

    /// Flags associated with this packet.
    #[getset(get_copy = "pub", set = "pub(crate)")]
    pub(crate) flags: PacketFlags,

    /// The 32-bit session identifier, constant across every packet of a session.
    #[getset(get_copy = "pub")]
    pub(crate) session_id: u32,
}

impl HeaderInfo {
    /// The size of a serialized header, in bytes.
    pub const HEADER_SIZE_BYTES: usize = 12;

    /// Builds a new header from its constituent fields.
    pub fn new(version: Version, sequence_number: u8, flags: PacketFlags, session_id: u32) -> Self {
        Self {
            version,
            sequence_number,
            flags,
            session_id,
        }
    }

    pub(super) fn serialize(
        &self,
        buffer: &mut [u8],
        packet_type: PacketType,
        body_length: u32,
    ) -> Result<usize, crate::SerializeError> {
        if buffer.len() < Self::HEADER_SIZE_BYTES {
            return Err(crate::SerializeError::NotEnoughSpace);
        }

        buffer[0] = self.version.into();
        buffer[1] = packet_type as u8;
        buffer[2] = self.sequence_number;
        buffer[3] = self.flags.bits();
        NetworkEndian::write_u32(&mut buffer[4..8], self.session_id);
        NetworkEndian::write_u32(&mut buffer[8..12], body_length);

        Ok(Self::HEADER_SIZE_BYTES)
    }

    /// The body length claimed by this header, as read from the wire.
    pub(super) fn claimed_body_length(buffer: &[u8]) -> u32 {
        NetworkEndian::read_u32(&buffer[8..12])
    }
}

impl TryFrom<&[u8]> for HeaderInfo {
    type Error = DeserializeError;

    fn try_from(buffer: &[u8]) -> Result<Self, Self::Error> {
        if buffer.len() < Self::HEADER_SIZE_BYTES {
            return Err(DeserializeError::ShortHeader);
        }

        let version: Version = buffer[0].try_into()?;
        let flags = PacketFlags::from_bits(buffer[3])
            .ok_or(DeserializeError::InvalidHeaderFlags(buffer[3]))?;

        Ok(Self {
            version,
            sequence_number: buffer[2],
            flags,
            session_id: NetworkEndian::read_u32(&buffer[4..8]),
        })
    }
}
