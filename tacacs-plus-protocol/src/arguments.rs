//! Attribute-value pairs carried by authorization and accounting packets.

use core::fmt;
use core::iter::zip;

use getset::{CopyGetters, Getters};

use crate::sealed::Sealed;
use crate::DeserializeError;
use crate::FieldText;

#[cfg(test)]
mod tests;

/// An attribute-value pair, as carried by authorization and accounting packets.
///
/// The first `=` or `*` in the wire encoding separates the name from the value; `=`
/// marks the attribute as required, `*` as optional. See §3/§4.3.
#[derive(Clone, Default, PartialEq, Eq, Debug, Getters, CopyGetters)]
pub struct Argument<'data> {
    /// The attribute's name.
    #[getset(get = "pub")]
    name: FieldText<'data>,

    /// The attribute's value.
    #[getset(get = "pub")]
    value: FieldText<'data>,

    /// Whether the attribute is required (`=`, `true`) or optional (`*`, `false`).
    #[getset(get_copy = "pub")]
    required: bool,
}

impl Sealed for Argument<'_> {}

/// An error describing why a raw attribute string could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidArgument {
    /// The attribute had an empty name.
    EmptyName,

    /// The attribute name contained a delimiter (`=` or `*`).
    NameContainsDelimiter,

    /// The attribute encoding did not contain a delimiter at all.
    NoDelimiter,

    /// The attribute was too long to be encodeable (over 255 bytes combined).
    TooLong,

    /// The attribute wasn't valid printable ASCII.
    NotAscii,
}

impl fmt::Display for InvalidArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "attributes cannot have empty names"),
            Self::NameContainsDelimiter => {
                write!(f, "names cannot contain value delimiter characters (= or *)")
            }
            Self::NoDelimiter => write!(f, "encoded attribute had no delimiter"),
            Self::TooLong => write!(
                f,
                "the total length of an attribute (name + delimiter + value) must not exceed 255 bytes"
            ),
            Self::NotAscii => write!(f, "encoded attribute was not printable ASCII"),
        }
    }
}

impl From<InvalidArgument> for DeserializeError {
    fn from(value: InvalidArgument) -> Self {
        Self::InvalidArgument(value)
    }
}

impl<'data> Argument<'data> {
    /// The delimiter used for a required attribute.
    pub const REQUIRED_DELIMITER: char = '=';

    /// The delimiter used for an optional attribute.
    pub const OPTIONAL_DELIMITER: char = '*';

    /// Constructs an attribute, enforcing a combined name + delimiter + value length of at
    /// most 255 bytes, as that must fit in a single length-prefix byte on the wire.
    pub fn new(
        name: FieldText<'data>,
        value: FieldText<'data>,
        required: bool,
    ) -> Result<Self, InvalidArgument> {
        if name.is_empty() {
            Err(InvalidArgument::EmptyName)
        } else if name.contains_any(&[Self::REQUIRED_DELIMITER, Self::OPTIONAL_DELIMITER]) {
            Err(InvalidArgument::NameContainsDelimiter)
        } else if name.len() + 1 + value.len() > u8::MAX as usize {
            Err(InvalidArgument::TooLong)
        } else {
            Ok(Argument {
                name,
                value,
                required,
            })
        }
    }

    /// The encoded length of an attribute, including the delimiter but not the length
    /// byte that precedes it elsewhere in the packet.
    fn encoded_length(&self) -> u8 {
        // never panics: length checked to fit a u8 in new()/deserialize()
        (self.name.len() + 1 + self.value.len())
            .try_into()
            .expect("attribute length was checked to fit in a u8")
    }

    fn serialize(&self, buffer: &mut [u8]) {
        let name_len = self.name.len();
        buffer[..name_len].copy_from_slice(self.name.as_bytes());

        buffer[name_len] = if self.required {
            Self::REQUIRED_DELIMITER
        } else {
            Self::OPTIONAL_DELIMITER
        } as u8;

        let value_len = self.value.len();
        buffer[name_len + 1..name_len + 1 + value_len].copy_from_slice(self.value.as_bytes());
    }

    /// Checks whether a raw byte slice is a valid attribute encoding, per [RFC8907 §6.1].
    ///
    /// [RFC8907 §6.1]: https://www.rfc-editor.org/rfc/rfc8907.html#section-6.1-18
    fn check_encoding(raw_argument: &[u8]) -> Result<(), InvalidArgument> {
        if u8::try_from(raw_argument.len()).is_err() {
            Err(InvalidArgument::TooLong)
        } else if !(raw_argument.is_ascii() && raw_argument.iter().all(|c| !c.is_ascii_control())) {
            Err(InvalidArgument::NotAscii)
        } else if !(raw_argument.contains(&(Self::REQUIRED_DELIMITER as u8))
            || raw_argument.contains(&(Self::OPTIONAL_DELIMITER as u8)))
        {
            Err(InvalidArgument::NoDelimiter)
        } else if raw_argument[0] == Self::REQUIRED_DELIMITER as u8
            || raw_argument[0] == Self::OPTIONAL_DELIMITER as u8
        {
            Err(InvalidArgument::EmptyName)
        } else {
            Ok(())
        }
    }

    /// Deserializes an attribute from its name-delimiter-value wire encoding.
    pub(crate) fn deserialize(buffer: &'data [u8]) -> Result<Self, InvalidArgument> {
        Self::check_encoding(buffer)?;

        let equals_index = buffer.iter().position(|c| *c == b'=');
        let star_index = buffer.iter().position(|c| *c == b'*');

        // check_encoding guarantees at least one of these is Some
        let delimiter_index = match (equals_index, star_index) {
            (None, star) => star,
            (equals, None) => equals,
            (Some(equals), Some(star)) => Some(equals.min(star)),
        }
        .expect("check_encoding guarantees a delimiter is present");

        let required = buffer[delimiter_index] == Self::REQUIRED_DELIMITER as u8;

        // check_encoding guarantees the buffer is ASCII
        let name = FieldText::try_from(&buffer[..delimiter_index])
            .expect("attribute name was checked to be ASCII");
        let value = FieldText::try_from(&buffer[delimiter_index + 1..])
            .expect("attribute value was checked to be ASCII");

        Ok(Self {
            name,
            value,
            required,
        })
    }
}

/// An ordered, bounded (at most 255 entries) list of attributes, ready for encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arguments<'args>(&'args [Argument<'args>]);

impl<'args> Arguments<'args> {
    /// Builds an `Arguments` list from a slice, returning `None` if it holds more than 255 entries.
    pub fn new<T: AsRef<[Argument<'args>]> + ?Sized>(arguments: &'args T) -> Option<Self> {
        if u8::try_from(arguments.as_ref().len()).is_ok() {
            Some(Self(arguments.as_ref()))
        } else {
            None
        }
    }

    /// The number of attributes in this list.
    pub fn argument_count(&self) -> usize {
        self.0.len()
    }

    pub(crate) fn wire_size(&self) -> usize {
        let argument_values_len: usize = self
            .0
            .iter()
            .map(|argument| argument.encoded_length() as usize)
            .sum();

        // 1 extra byte for the argument count itself, plus one length byte per argument
        1 + self.0.len() + argument_values_len
    }

    /// Serializes the argument count and each attribute's length into `buffer`.
    pub(crate) fn serialize_count_and_lengths(&self, buffer: &mut [u8]) -> Result<usize, crate::SerializeError> {
        let argument_count = self.argument_count();

        if buffer.len() <= argument_count {
            return Err(crate::SerializeError::NotEnoughSpace);
        }

        buffer[0] = argument_count.try_into()?;

        for (position, argument) in zip(&mut buffer[1..1 + argument_count], self.0) {
            *position = argument.encoded_length();
        }

        Ok(1 + argument_count)
    }

    /// Serializes each attribute's name-delimiter-value encoding into `buffer`.
    pub(crate) fn serialize_encoded_values(&self, buffer: &mut [u8]) -> Result<usize, crate::SerializeError> {
        let full_encoded_length: usize = self
            .0
            .iter()
            .map(|argument| argument.encoded_length() as usize)
            .sum();

        if buffer.len() < full_encoded_length {
            return Err(crate::SerializeError::NotEnoughSpace);
        }

        let mut argument_start = 0;
        for argument in self.0.iter() {
            let argument_length = argument.encoded_length() as usize;
            let next_argument_start = argument_start + argument_length;
            argument.serialize(&mut buffer[argument_start..next_argument_start]);
            argument_start = next_argument_start;
        }

        Ok(argument_start)
    }
}

impl<'args> AsRef<[Argument<'args>]> for Arguments<'args> {
    fn as_ref(&self) -> &[Argument<'args>] {
        self.0
    }
}
