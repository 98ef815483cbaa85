//! Printable-ASCII text fields used throughout TACACS+ packet bodies.

use core::fmt;

mod inner;
use inner::FieldTextInner;

#[cfg(test)]
mod tests;

/// A printable-ASCII string field, borrowed from a packet buffer or owned on `std`.
///
/// This is effectively a `Cow<'_, str>` restricted to printable ASCII and usable in a
/// `no_std` context, since most text fields in TACACS+ packets (user names, server
/// messages, port identifiers) are defined to be ASCII text.
#[derive(Debug, Clone, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FieldText<'data>(FieldTextInner<'data>);

/// The text was not valid for a [`FieldText`]: it contained non-ASCII or control characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidText<T>(pub(crate) T);

impl<T> fmt::Display for InvalidText<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "text was not printable ASCII")
    }
}

fn is_valid_field_text(text: &str) -> bool {
    text.is_ascii() && text.chars().all(|c| !c.is_ascii_control())
}

impl<'data> FieldText<'data> {
    /// The length of this text, in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this text is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The raw bytes of this text.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Checks whether this text contains any of the given characters.
    pub fn contains_any(&self, characters: &[char]) -> bool {
        self.0.chars().any(|c| characters.contains(&c))
    }

    /// Converts this text into one with an owned (heap-allocated) inner representation.
    #[cfg(feature = "std")]
    pub fn into_owned<'out>(self) -> FieldText<'out> {
        FieldText(self.0.into_owned())
    }
}

impl<'data> TryFrom<&'data str> for FieldText<'data> {
    type Error = InvalidText<&'data str>;

    fn try_from(value: &'data str) -> Result<Self, Self::Error> {
        if is_valid_field_text(value) {
            Ok(Self(FieldTextInner::Borrowed(value)))
        } else {
            Err(InvalidText(value))
        }
    }
}

impl<'data> TryFrom<&'data [u8]> for FieldText<'data> {
    type Error = InvalidText<&'data [u8]>;

    fn try_from(value: &'data [u8]) -> Result<Self, Self::Error> {
        let as_str = core::str::from_utf8(value).map_err(|_| InvalidText(value))?;
        FieldText::try_from(as_str).map_err(|_| InvalidText(value))
    }
}

#[cfg(feature = "std")]
impl TryFrom<std::string::String> for FieldText<'static> {
    type Error = InvalidText<std::string::String>;

    fn try_from(value: std::string::String) -> Result<Self, Self::Error> {
        if is_valid_field_text(&value) {
            Ok(Self(FieldTextInner::Owned(value)))
        } else {
            Err(InvalidText(value))
        }
    }
}

impl AsRef<str> for FieldText<'_> {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

impl PartialEq for FieldText<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl fmt::Display for FieldText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
