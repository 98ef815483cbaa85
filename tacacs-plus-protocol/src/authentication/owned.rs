use std::borrow::ToOwned as _;
use std::string::String;
use std::vec::Vec;

use super::{Reply, ReplyFlags, Status};
use crate::{MinorVersion, PacketBody, PacketType, ToOwnedBody};

/// An authentication reply packet with owned fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyOwned {
    /// The status, as returned by the server.
    pub status: Status,

    /// The flags set in the server response.
    pub flags: ReplyFlags,

    /// The message to be displayed to the user.
    pub server_message: String,

    /// The domain-specific data included in the reply.
    pub data: Vec<u8>,
}

impl ToOwnedBody for Reply<'_> {
    type Owned = ReplyOwned;

    fn to_owned(&self) -> Self::Owned {
        ReplyOwned {
            status: self.status(),
            flags: self.flags(),
            server_message: self.server_message().as_ref().to_owned(),
            data: self.data().to_owned(),
        }
    }
}

impl PacketBody for ReplyOwned {
    const TYPE: PacketType = PacketType::Authentication;
    const REQUIRED_FIELDS_LENGTH: usize = Reply::REQUIRED_FIELDS_LENGTH;

    fn required_minor_version(&self) -> Option<MinorVersion> {
        None
    }
}
