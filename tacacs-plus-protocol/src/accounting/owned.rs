use std::borrow::ToOwned as _;
use std::string::String;
use std::vec::Vec;

use super::{Reply, Status};
use crate::{PacketBody, PacketType, ToOwnedBody};

/// An accounting reply packet with owned fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyOwned {
    /// The status returned by the server.
    pub status: Status,

    /// The message to display to the user.
    pub server_message: String,

    /// The console/administrative data from the server.
    pub data: Vec<u8>,
}

impl ToOwnedBody for Reply<'_> {
    type Owned = ReplyOwned;

    fn to_owned(&self) -> Self::Owned {
        ReplyOwned {
            status: self.status(),
            server_message: self.server_message().as_ref().to_owned(),
            data: self.data().to_owned(),
        }
    }
}

impl PacketBody for ReplyOwned {
    const TYPE: PacketType = PacketType::Accounting;
    const REQUIRED_FIELDS_LENGTH: usize = Reply::REQUIRED_FIELDS_LENGTH;
}
