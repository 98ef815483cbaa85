//! Authorization packets of the TACACS+ protocol.

use byteorder::{ByteOrder, NetworkEndian};
use getset::{CopyGetters, Getters};
use num_enum::{TryFromPrimitive, TryFromPrimitiveError};

use crate::{
    Argument, Arguments, AuthenticationContext, AuthenticationMethod, DeserializeError,
    FieldText, InvalidArgument, PacketBody, PacketType, Serialize, SerializeError,
    UserInformation,
};

#[cfg(feature = "std")]
mod owned;
#[cfg(feature = "std")]
pub use owned::ReplyOwned;

#[cfg(test)]
mod tests;

/// An authorization request packet body, including arguments.
pub struct Request<'packet> {
    method: AuthenticationMethod,
    authentication_context: AuthenticationContext,
    user_information: UserInformation<'packet>,
    arguments: Arguments<'packet>,
}

impl<'packet> Request<'packet> {
    /// Assembles an authorization request packet from its fields.
    pub fn new(
        method: AuthenticationMethod,
        authentication_context: AuthenticationContext,
        user_information: UserInformation<'packet>,
        arguments: Arguments<'packet>,
    ) -> Self {
        Self {
            method,
            authentication_context,
            user_information,
            arguments,
        }
    }
}

impl PacketBody for Request<'_> {
    const TYPE: PacketType = PacketType::Authorization;

    // 4 extra bytes from user information lengths (user, port, remote address) and argument count
    const REQUIRED_FIELDS_LENGTH: usize =
        AuthenticationMethod::WIRE_SIZE + AuthenticationContext::WIRE_SIZE + 4;
}

impl Serialize for Request<'_> {
    fn wire_size(&self) -> usize {
        AuthenticationMethod::WIRE_SIZE
            + AuthenticationContext::WIRE_SIZE
            + self.user_information.wire_size()
            + self.arguments.wire_size()
    }

    fn serialize_into_buffer(&self, buffer: &mut [u8]) -> Result<usize, SerializeError> {
        if buffer.len() < self.wire_size() {
            return Err(SerializeError::NotEnoughSpace);
        }

        buffer[0] = self.method as u8;
        self.authentication_context
            .serialize_header_information(&mut buffer[1..4]);
        self.user_information
            .serialize_header_information(&mut buffer[4..7])?;

        // user information values start after all required fields and argument lengths (1 byte each)
        let user_info_start: usize = Self::REQUIRED_FIELDS_LENGTH + self.arguments.argument_count();

        let user_information_len = self
            .user_information
            .serialize_body_information(&mut buffer[user_info_start..]);

        // argument lengths start at index 7, just after the argument count
        let arguments_wire_len = self.arguments.serialize_count_and_lengths(&mut buffer[7..])?
            + self
                .arguments
                .serialize_encoded_values(&mut buffer[user_info_start + user_information_len..])?;

        // subtract 1 from REQUIRED_FIELDS_LENGTH since Arguments::wire_size() counts the argument count byte
        Ok((Self::REQUIRED_FIELDS_LENGTH - 1) + user_information_len + arguments_wire_len)
    }
}

/// The status of an authorization operation, as returned by the server.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
pub enum Status {
    /// Authorization passed; the server may have additional arguments for the client.
    PassAdd = 0x01,

    /// Authorization passed; the server's argument values override those in the request.
    PassReplace = 0x02,

    /// Authorization request was denied.
    Fail = 0x10,

    /// A server-side error occurred.
    Error = 0x11,

    /// Forward authorization request to an alternative daemon.
    #[deprecated = "Forwarding to an alternative daemon was deprecated in RFC8907."]
    Follow = 0x21,
}

impl Status {
    /// The wire size of an authorization reply status, in bytes.
    pub const WIRE_SIZE: usize = 1;
}

#[doc(hidden)]
impl From<TryFromPrimitiveError<Status>> for DeserializeError {
    fn from(value: TryFromPrimitiveError<Status>) -> Self {
        Self::InvalidStatus(value.number)
    }
}

/// Raw, still-undecoded argument framing extracted from a reply buffer.
#[derive(Debug, PartialEq, Eq)]
struct ArgumentsInfo<'raw> {
    argument_count: u8,
    argument_lengths: &'raw [u8],
    arguments_buffer: &'raw [u8],
}

/// The body of an authorization reply packet.
#[derive(Debug, PartialEq, Eq, Getters, CopyGetters)]
pub struct Reply<'packet> {
    /// The status returned in an authorization exchange.
    #[getset(get_copy = "pub")]
    status: Status,

    /// The message sent by the server, to be displayed to the user.
    #[getset(get = "pub")]
    server_message: FieldText<'packet>,

    /// The administrative/log data returned from the server.
    #[getset(get_copy = "pub")]
    data: &'packet [u8],

    arguments_info: ArgumentsInfo<'packet>,
}

struct ReplyFieldLengths {
    data_length: usize,
    server_message_length: usize,
    total_length: usize,
}

/// An iterator over the arguments in an authorization reply packet.
///
/// Each item is independently decoded, so a single malformed attribute does not prevent
/// the rest of the reply's arguments from being read; see [`Argument::deserialize`].
pub struct ArgumentsIterator<'iter> {
    arguments_info: &'iter ArgumentsInfo<'iter>,
    next_argument_number: usize,
    next_offset: usize,
}

impl<'iter> Iterator for ArgumentsIterator<'iter> {
    type Item = Result<Argument<'iter>, InvalidArgument>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_argument_number < self.arguments_info.argument_count as usize {
            let next_length = self.arguments_info.argument_lengths[self.next_argument_number] as usize;
            let raw_argument =
                &self.arguments_info.arguments_buffer[self.next_offset..self.next_offset + next_length];

            self.next_argument_number += 1;
            self.next_offset += next_length;

            Some(Argument::deserialize(raw_argument))
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let size = self.arguments_info.argument_count as usize;
        (size, Some(size))
    }
}

impl ExactSizeIterator for ArgumentsIterator<'_> {}

impl<'packet> Reply<'packet> {
    const ARGUMENT_LENGTHS_START: usize = 6;

    /// Determines the length of a reply packet encoded into the provided buffer, if possible.
    pub fn claimed_length(buffer: &[u8]) -> Result<usize, DeserializeError> {
        Self::extract_field_lengths(buffer).map(|lengths| lengths.total_length)
    }

    fn extract_field_lengths(buffer: &[u8]) -> Result<ReplyFieldLengths, DeserializeError> {
        if buffer.len() < Self::REQUIRED_FIELDS_LENGTH {
            return Err(DeserializeError::UnexpectedEnd);
        }

        let argument_count = buffer[1] as usize;

        if buffer.len() < Self::REQUIRED_FIELDS_LENGTH + argument_count {
            return Err(DeserializeError::UnexpectedEnd);
        }

        let server_message_length = NetworkEndian::read_u16(&buffer[2..4]) as usize;
        let data_length = NetworkEndian::read_u16(&buffer[4..6]) as usize;

        let encoded_arguments_length: usize = buffer
            [Self::ARGUMENT_LENGTHS_START..Self::ARGUMENT_LENGTHS_START + argument_count]
            .iter()
            .map(|&length| length as usize)
            .sum();

        let total_length = Self::REQUIRED_FIELDS_LENGTH
            + argument_count
            + server_message_length
            + data_length
            + encoded_arguments_length;

        Ok(ReplyFieldLengths {
            data_length,
            server_message_length,
            total_length,
        })
    }

    /// Returns an iterator over the arguments included in this reply packet.
    ///
    /// Malformed individual arguments surface as `Err` items rather than failing the
    /// whole iteration, so callers can act on the attributes that did decode.
    pub fn iter_arguments(&self) -> ArgumentsIterator<'_> {
        ArgumentsIterator {
            arguments_info: &self.arguments_info,
            next_argument_number: 0,
            next_offset: 0,
        }
    }
}

impl PacketBody for Reply<'_> {
    const TYPE: PacketType = PacketType::Authorization;

    // 1 byte for status, 1 byte for argument count, 2 bytes each for server message/data lengths
    const REQUIRED_FIELDS_LENGTH: usize = Status::WIRE_SIZE + 1 + 4;
}

impl<'raw> TryFrom<&'raw [u8]> for Reply<'raw> {
    type Error = DeserializeError;

    fn try_from(buffer: &'raw [u8]) -> Result<Self, Self::Error> {
        let ReplyFieldLengths {
            data_length,
            server_message_length,
            total_length,
        } = Self::extract_field_lengths(buffer)?;

        if buffer.len() < total_length {
            return Err(DeserializeError::UnexpectedEnd);
        }

        let status: Status = buffer[0].try_into()?;
        let argument_count = buffer[1];

        let body_start = Self::ARGUMENT_LENGTHS_START + argument_count as usize;
        let data_start = body_start + server_message_length;
        let arguments_start = data_start + data_length;

        let server_message = FieldText::try_from(&buffer[body_start..data_start])
            .map_err(|_| DeserializeError::BadText)?;
        let data = &buffer[data_start..arguments_start];

        let argument_lengths = &buffer[Self::ARGUMENT_LENGTHS_START..body_start];
        let argument_values = &buffer[arguments_start..total_length];

        let arguments_info = ArgumentsInfo {
            argument_count,
            argument_lengths,
            arguments_buffer: argument_values,
        };

        Ok(Self {
            status,
            server_message,
            data,
            arguments_info,
        })
    }
}
