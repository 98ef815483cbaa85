//! Heap-allocated, lifetime-free counterparts of the borrowed packet body types.
//!
//! Borrowed types (e.g. [`authentication::Reply`](crate::authentication::Reply)) hold
//! slices into the buffer they were deserialized from, for use without an allocator; the
//! `std`-only `*Owned` types here copy that data out so it can outlive the receive buffer,
//! which is what callers building a blocking client generally want.

use std::string::String;
use std::vec::Vec;

use crate::sealed::Sealed;

/// A type with an owned, heap-allocated counterpart.
pub trait ToOwnedBody: Sealed {
    /// The owned counterpart of this type.
    type Owned;

    /// Copies this type's borrowed fields into a heap-allocated equivalent.
    fn to_owned(&self) -> Self::Owned;
}

/// A single authorization/accounting argument with owned fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentOwned {
    /// The argument's name.
    pub name: String,

    /// The argument's value.
    pub value: String,

    /// Whether the argument is required (`=`) or optional (`*`).
    pub required: bool,
}

impl<'data> From<crate::Argument<'data>> for ArgumentOwned {
    fn from(value: crate::Argument<'data>) -> Self {
        Self {
            name: value.name().as_ref().into(),
            value: value.value().as_ref().into(),
            required: value.required(),
        }
    }
}

pub(crate) fn collect_arguments<'iter>(
    iter: impl Iterator<Item = crate::Argument<'iter>>,
) -> Vec<ArgumentOwned> {
    iter.map(ArgumentOwned::from).collect()
}
