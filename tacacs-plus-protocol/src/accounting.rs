//! Accounting packets of the TACACS+ protocol.

use bitflags::bitflags;
use byteorder::{ByteOrder, NetworkEndian};
use getset::{CopyGetters, Getters};

use crate::{
    Arguments, AuthenticationContext, AuthenticationMethod, DeserializeError, FieldText,
    PacketBody, PacketType, Serialize, SerializeError, UserInformation,
};

#[cfg(feature = "std")]
mod owned;
#[cfg(feature = "std")]
pub use owned::ReplyOwned;

#[cfg(test)]
mod tests;

/// Raw on-the-wire accounting request flags.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RawFlags(u8);

bitflags! {
    impl RawFlags: u8 {
        const START = 0x02;
        const STOP = 0x04;
        const WATCHDOG = 0x08;
    }
}

/// The valid flag combinations for a TACACS+ accounting REQUEST packet.
///
/// RFC8907 defines only these four combinations as meaningful; other bit patterns
/// (e.g. START and STOP together) don't correspond to a well-defined request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flags {
    /// Marks the start of a task being accounted for.
    StartRecord,

    /// Marks the end of a task being accounted for.
    StopRecord,

    /// A periodic update for a still-running task, without resetting its start time.
    WatchdogNoUpdate,

    /// A periodic update for a still-running task, treated as a new start record.
    WatchdogUpdate,
}

impl Flags {
    /// The number of bytes occupied by a flag set on the wire.
    pub const WIRE_SIZE: usize = 1;
}

impl From<Flags> for RawFlags {
    fn from(value: Flags) -> Self {
        match value {
            Flags::StartRecord => RawFlags::START,
            Flags::StopRecord => RawFlags::STOP,
            Flags::WatchdogNoUpdate => RawFlags::WATCHDOG,
            Flags::WatchdogUpdate => RawFlags::WATCHDOG | RawFlags::START,
        }
    }
}

/// An accounting request packet, used to start, stop, or report progress on a task.
pub struct Request<'packet> {
    flags: Flags,
    authentication_method: AuthenticationMethod,
    authentication: AuthenticationContext,
    user_information: UserInformation<'packet>,
    arguments: Arguments<'packet>,
}

impl<'packet> Request<'packet> {
    /// Assembles an accounting request packet from its fields.
    pub fn new(
        flags: Flags,
        authentication_method: AuthenticationMethod,
        authentication: AuthenticationContext,
        user_information: UserInformation<'packet>,
        arguments: Arguments<'packet>,
    ) -> Self {
        Self {
            flags,
            authentication_method,
            authentication,
            user_information,
            arguments,
        }
    }
}

impl PacketBody for Request<'_> {
    const TYPE: PacketType = PacketType::Accounting;

    // 4 extra bytes from user information lengths (user, port, remote address) and argument count
    const REQUIRED_FIELDS_LENGTH: usize =
        Flags::WIRE_SIZE + AuthenticationMethod::WIRE_SIZE + AuthenticationContext::WIRE_SIZE + 4;
}

impl Serialize for Request<'_> {
    fn wire_size(&self) -> usize {
        Flags::WIRE_SIZE
            + AuthenticationMethod::WIRE_SIZE
            + AuthenticationContext::WIRE_SIZE
            + self.user_information.wire_size()
            + self.arguments.wire_size()
    }

    fn serialize_into_buffer(&self, buffer: &mut [u8]) -> Result<usize, SerializeError> {
        if buffer.len() < self.wire_size() {
            return Err(SerializeError::NotEnoughSpace);
        }

        buffer[0] = RawFlags::from(self.flags).bits();
        buffer[1] = self.authentication_method as u8;

        self.authentication
            .serialize_header_information(&mut buffer[2..5]);
        self.user_information
            .serialize_header_information(&mut buffer[5..8])?;

        let user_info_start: usize = Self::REQUIRED_FIELDS_LENGTH + self.arguments.argument_count();

        let user_information_len = self
            .user_information
            .serialize_body_information(&mut buffer[user_info_start..]);

        let arguments_wire_len = self.arguments.serialize_count_and_lengths(&mut buffer[8..])?
            + self
                .arguments
                .serialize_encoded_values(&mut buffer[user_info_start + user_information_len..])?;

        Ok((Self::REQUIRED_FIELDS_LENGTH - 1) + user_information_len + arguments_wire_len)
    }
}

/// The server's reply status in an accounting exchange.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The accounting record was logged successfully.
    Success = 0x01,

    /// A server-side error occurred while logging the record.
    Error = 0x02,

    /// Forward accounting request to an alternative daemon.
    #[deprecated = "Forwarding to an alternative daemon was deprecated in RFC8907."]
    Follow = 0x21,
}

impl Status {
    /// The wire size of an accounting reply status, in bytes.
    pub const WIRE_SIZE: usize = 1;
}

impl TryFrom<u8> for Status {
    type Error = DeserializeError;

    fn try_from(value: u8) -> Result<Self, DeserializeError> {
        match value {
            0x01 => Ok(Self::Success),
            0x02 => Ok(Self::Error),
            #[allow(deprecated)]
            0x21 => Ok(Self::Follow),
            other => Err(DeserializeError::InvalidStatus(other)),
        }
    }
}

/// An accounting reply packet received from a TACACS+ server.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct Reply<'packet> {
    /// The status received from the server.
    #[getset(get_copy = "pub")]
    status: Status,

    /// The message received from the server, potentially to display to a user.
    #[getset(get = "pub")]
    server_message: FieldText<'packet>,

    /// The domain-specific, administrative/log data received from the server.
    #[getset(get_copy = "pub")]
    data: &'packet [u8],
}

impl PacketBody for Reply<'_> {
    const TYPE: PacketType = PacketType::Accounting;

    // 2 bytes each for server message/data lengths, 1 byte for status
    const REQUIRED_FIELDS_LENGTH: usize = 5;
}

impl<'raw> TryFrom<&'raw [u8]> for Reply<'raw> {
    type Error = DeserializeError;

    fn try_from(buffer: &'raw [u8]) -> Result<Self, Self::Error> {
        if buffer.len() < Self::REQUIRED_FIELDS_LENGTH {
            return Err(DeserializeError::UnexpectedEnd);
        }

        let server_message_length = NetworkEndian::read_u16(&buffer[0..2]) as usize;
        let data_length = NetworkEndian::read_u16(&buffer[2..4]) as usize;
        let status: Status = buffer[4].try_into()?;

        let server_message_start = Self::REQUIRED_FIELDS_LENGTH;
        let data_start = server_message_start + server_message_length;
        let total_length = data_start + data_length;

        if buffer.len() < total_length {
            return Err(DeserializeError::UnexpectedEnd);
        }

        let server_message = FieldText::try_from(&buffer[server_message_start..data_start])
            .map_err(|_| DeserializeError::BadText)?;
        let data = &buffer[data_start..total_length];

        Ok(Self {
            status,
            server_message,
            data,
        })
    }
}
