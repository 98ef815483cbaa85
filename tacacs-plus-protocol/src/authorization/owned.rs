use std::borrow::ToOwned as _;
use std::string::String;
use std::vec::Vec;

use super::{Reply, Status};
use crate::owned::collect_arguments;
use crate::{ArgumentOwned, PacketBody, PacketType, ToOwnedBody};

/// An authorization reply packet with owned fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyOwned {
    /// The status returned by the TACACS+ server.
    pub status: Status,

    /// The message to present to the user connected to this client.
    pub server_message: String,

    /// The administrative/log data returned from the server.
    pub data: Vec<u8>,

    /// The arguments sent by the server that decoded successfully.
    ///
    /// Arguments that failed to decode are dropped here; callers that need to observe
    /// those failures should use [`Reply::iter_arguments`] directly on the borrowed reply.
    pub arguments: Vec<ArgumentOwned>,
}

impl ToOwnedBody for Reply<'_> {
    type Owned = ReplyOwned;

    fn to_owned(&self) -> Self::Owned {
        ReplyOwned {
            status: self.status(),
            server_message: self.server_message().as_ref().to_owned(),
            data: self.data().to_owned(),
            arguments: collect_arguments(self.iter_arguments().filter_map(Result::ok)),
        }
    }
}

impl PacketBody for ReplyOwned {
    const TYPE: PacketType = PacketType::Authorization;
    const REQUIRED_FIELDS_LENGTH: usize = Reply::REQUIRED_FIELDS_LENGTH;
}
