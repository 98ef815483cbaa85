//! The outer TACACS+ packet envelope: header plus obfuscated body.

use md5::{Digest, Md5};
use num_enum::{TryFromPrimitive, TryFromPrimitiveError};

use crate::util::xor_slices;
use crate::{DeserializeError, PacketBody, Serialize, SerializeError};

pub mod header;
pub use header::{HeaderInfo, PacketFlags};

#[cfg(feature = "std")]
use crate::owned::ToOwnedBody;

/// An implementation-chosen maximum body length, per §4.2: bodies larger than this are
/// rejected outright rather than trusted to allocate.
pub const MAX_BODY_LENGTH: u32 = 64 * 1024;

/// MD5 digest size, in bytes.
const MD5_OUTPUT_SIZE: usize = 16;

/// The type of a protocol packet.
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy, TryFromPrimitive)]
pub enum PacketType {
    /// Authentication packet.
    Authentication = 0x1,

    /// Authorization packet.
    Authorization = 0x2,

    /// Accounting packet.
    Accounting = 0x3,
}

#[doc(hidden)]
impl From<TryFromPrimitiveError<PacketType>> for DeserializeError {
    fn from(value: TryFromPrimitiveError<PacketType>) -> Self {
        Self::InvalidPacketType(value.number)
    }
}

/// A full TACACS+ protocol packet: header plus body.
#[derive(Debug, PartialEq, Eq)]
pub struct Packet<B: PacketBody> {
    header: HeaderInfo,
    body: B,
}

impl<B: PacketBody> Packet<B> {
    /// Assembles a header and body into a full packet.
    ///
    /// The header's minor version is overwritten with whatever the body requires, if it
    /// requires a specific one (e.g. PAP/CHAP authentication bodies require minor version 1).
    pub fn new(mut header: HeaderInfo, body: B) -> Self {
        if let Some(minor) = body.required_minor_version() {
            header.version = crate::Version::new(header.version.major(), minor);
        }

        Self { header, body }
    }

    /// The header of this packet.
    pub fn header(&self) -> &HeaderInfo {
        &self.header
    }

    /// The body of this packet.
    pub fn body(&self) -> &B {
        &self.body
    }
}

/// Computes the MD5-chained keystream for a body of `body_len` bytes and XORs it in place.
///
/// See §4.1: the first 16-byte block is `MD5(session_id || key || version || sequence)`;
/// each subsequent block chains in the previous block's output. This routine is its own
/// inverse, so it is used both to obfuscate outgoing bodies and deobfuscate incoming ones.
fn obfuscate_body(header: &HeaderInfo, secret_key: &[u8], body_buffer: &mut [u8]) {
    if body_buffer.is_empty() {
        return;
    }

    let mut pseudo_pad = [0u8; MD5_OUTPUT_SIZE];

    let mut prefix_hasher = Md5::new();
    prefix_hasher.update(header.session_id().to_be_bytes());
    prefix_hasher.update(secret_key);
    prefix_hasher.update([u8::from(header.version())]);
    prefix_hasher.update([header.sequence_number()]);

    let mut chunks_iter = body_buffer.chunks_mut(MD5_OUTPUT_SIZE);

    prefix_hasher
        .clone()
        .finalize_into((&mut pseudo_pad).into());

    // body_buffer was checked nonempty above, so this always yields at least one chunk
    let first_chunk = chunks_iter.next().expect("body buffer is nonempty");
    xor_slices(first_chunk, &pseudo_pad);

    for chunk in chunks_iter {
        let mut hasher = prefix_hasher.clone();
        hasher.update(pseudo_pad);
        hasher.finalize_into((&mut pseudo_pad).into());

        xor_slices(chunk, &pseudo_pad);
    }
}

impl<B: PacketBody + Serialize> Packet<B> {
    /// The size of this packet as encoded into its binary format.
    pub fn wire_size(&self) -> usize {
        HeaderInfo::HEADER_SIZE_BYTES + self.body.wire_size()
    }

    /// Serializes the packet into `buffer`, obfuscating the body with `secret_key`.
    ///
    /// Consumes the packet and clears the [`UNENCRYPTED`](PacketFlags::UNENCRYPTED) flag.
    pub fn serialize(mut self, secret_key: &[u8], buffer: &mut [u8]) -> Result<usize, SerializeError> {
        self.header.flags.remove(PacketFlags::UNENCRYPTED);

        let packet_length = self.serialize_packet(buffer)?;

        obfuscate_body(
            &self.header,
            secret_key,
            &mut buffer[HeaderInfo::HEADER_SIZE_BYTES..packet_length],
        );

        Ok(packet_length)
    }

    /// Serializes the packet into `buffer`, leaving the body as plaintext.
    ///
    /// Consumes the packet and sets the [`UNENCRYPTED`](PacketFlags::UNENCRYPTED) flag.
    pub fn serialize_unobfuscated(mut self, buffer: &mut [u8]) -> Result<usize, SerializeError> {
        self.header.flags.insert(PacketFlags::UNENCRYPTED);
        self.serialize_packet(buffer)
    }

    fn serialize_packet(&self, buffer: &mut [u8]) -> Result<usize, SerializeError> {
        let wire_size = self.wire_size();

        if buffer.len() < wire_size {
            return Err(SerializeError::NotEnoughSpace);
        }

        let body_length = self
            .body
            .serialize_into_buffer(&mut buffer[HeaderInfo::HEADER_SIZE_BYTES..wire_size])?;

        let header_bytes =
            self.header
                .serialize(&mut buffer[..HeaderInfo::HEADER_SIZE_BYTES], B::TYPE, body_length.try_into()?)?;

        Ok(header_bytes + body_length)
    }
}

impl<'raw, B> Packet<B>
where
    B: PacketBody + TryFrom<&'raw [u8], Error = DeserializeError>,
{
    /// Deserializes a packet from `buffer`, deobfuscating the body with `secret_key` first.
    ///
    /// `expected_session_id` and `expected_sequence` enforce the session-consistency
    /// invariants from §3: the header's session id must match the session that sent the
    /// request, and the sequence number must be the one the session expects next.
    pub fn deserialize(
        secret_key: &[u8],
        buffer: &'raw mut [u8],
        expected_session_id: u32,
        expected_sequence: u8,
    ) -> Result<Self, DeserializeError> {
        let header = Self::validate_header(buffer, expected_session_id, expected_sequence)?;

        obfuscate_body(&header, secret_key, &mut buffer[HeaderInfo::HEADER_SIZE_BYTES..]);

        let body = (&buffer[HeaderInfo::HEADER_SIZE_BYTES..]).try_into()?;
        Ok(Self { header, body })
    }

    /// Deserializes a packet from `buffer`, treating the body as plaintext.
    pub fn deserialize_unobfuscated(
        buffer: &'raw [u8],
        expected_session_id: u32,
        expected_sequence: u8,
    ) -> Result<Self, DeserializeError> {
        let header = Self::validate_header(buffer, expected_session_id, expected_sequence)?;

        if !header.flags().contains(PacketFlags::UNENCRYPTED) {
            return Err(DeserializeError::IncorrectUnencryptedFlag);
        }

        let body = (&buffer[HeaderInfo::HEADER_SIZE_BYTES..]).try_into()?;
        Ok(Self { header, body })
    }

    fn validate_header(
        buffer: &[u8],
        expected_session_id: u32,
        expected_sequence: u8,
    ) -> Result<HeaderInfo, DeserializeError> {
        if buffer.len() < HeaderInfo::HEADER_SIZE_BYTES {
            return Err(DeserializeError::ShortHeader);
        }

        let header: HeaderInfo = buffer[..HeaderInfo::HEADER_SIZE_BYTES].try_into()?;

        let actual_type = PacketType::try_from(buffer[1])?;
        if actual_type != B::TYPE {
            return Err(DeserializeError::PacketTypeMismatch {
                expected: B::TYPE,
                actual: actual_type,
            });
        }

        if header.session_id() != expected_session_id {
            return Err(DeserializeError::SessionIdMismatch);
        }

        if header.sequence_number() != expected_sequence {
            return Err(DeserializeError::SequenceMismatch {
                expected: expected_sequence,
                actual: header.sequence_number(),
            });
        }

        let claimed_length = HeaderInfo::claimed_body_length(buffer);
        if claimed_length > MAX_BODY_LENGTH {
            return Err(DeserializeError::BodyTooLarge {
                claimed: claimed_length,
            });
        }

        if (buffer.len() - HeaderInfo::HEADER_SIZE_BYTES) < claimed_length as usize {
            return Err(DeserializeError::ShortBody);
        }

        Ok(header)
    }
}

#[cfg(feature = "std")]
impl<B> Packet<B>
where
    B: PacketBody + ToOwnedBody,
{
    /// Converts a borrowed packet into one with owned, heap-allocated body fields.
    pub fn to_owned(&self) -> Packet<B::Owned> {
        Packet {
            header: self.header,
            body: self.body.to_owned(),
        }
    }
}
