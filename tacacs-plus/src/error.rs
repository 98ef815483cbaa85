//! Errors surfaced by a TACACS+ exchange.
//!
//! The variants roughly split into two groups: transport/protocol failures that a caller
//! driving a [`crate::selector`] should treat as a reason to try the next configured server,
//! and authoritative or caller-induced failures that must not be retried.

use thiserror::Error;

use tacacs_plus_protocol as protocol;
use tacacs_plus_protocol::authentication::{BadStart, DataTooLong};

/// An error occurring during a TACACS+ authentication, authorization, or accounting exchange.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ClientError {
    /// Could not establish a TCP connection to the server.
    #[error("failed to connect to TACACS+ server")]
    ConnectFailed,

    /// A read did not complete within the configured deadline.
    #[error("timed out waiting for a reply from the TACACS+ server")]
    ReadTimeout,

    /// Fewer bytes were accepted than requested when writing a packet.
    #[error("failed to write the full packet to the TACACS+ server")]
    WriteError,

    /// Any other I/O failure on the underlying connection.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The local encoder produced a packet of an unexpected size. This is always a bug in
    /// this crate, never something caused by server or network behavior.
    #[error("assembled packet did not match its computed wire size")]
    AssemblyError,

    /// A packet body could not be serialized to the wire.
    #[error(transparent)]
    SerializeError(#[from] protocol::SerializeError),

    /// An invalid or inconsistent packet was received from a server. This is the most
    /// common symptom of a wrong shared secret, since an incorrectly deobfuscated body
    /// usually fails one of the decoder's consistency checks.
    #[error("invalid packet received from server: {0}")]
    InvalidPacketReceived(#[from] protocol::DeserializeError),

    /// The server reported a session-ending `ERROR` status: it was reached but couldn't
    /// service the request, so [`crate::selector`] treats this as eligible for failover
    /// to the next configured server rather than a terminal answer.
    #[error("server reported an error status: {message}")]
    ServerError {
        /// The message returned by the server, if any.
        message: String,
    },

    /// No configured server produced a usable response.
    #[error("no configured TACACS+ server was reachable")]
    NoServersAvailable,

    /// The host's conversation callback refused the prompt, failed, or returned an empty
    /// response to a `GETDATA` prompt.
    #[error("host conversation was refused or returned no usable response")]
    ConversationError,

    /// A server-issued prompt exceeded the maximum length this client will hand to its host.
    #[error("server message exceeded the maximum prompt length")]
    PromptTooLong,

    /// A session exceeded the 255-packet sequence number limit.
    #[error("session exceeded the maximum of 255 packets")]
    SequenceOverflow,

    /// The user, port, or remote address of a session could not be represented as
    /// printable ASCII, or was otherwise invalid.
    #[error("session context had an invalid field")]
    InvalidContext,

    /// A field was too long to fit in its wire length prefix.
    #[error("a field exceeded the maximum length encodable on the wire")]
    FieldTooLong,

    /// More than 255 attributes were supplied for an authorization/accounting request.
    #[error("only up to 255 attributes fit in a single packet")]
    TooManyArguments,

    /// An attribute could not be constructed, e.g. an empty name or one containing `=`/`*`.
    #[error(transparent)]
    InvalidArgument(#[from] protocol::InvalidArgument),
}

#[doc(hidden)]
impl From<DataTooLong> for ClientError {
    fn from(_value: DataTooLong) -> Self {
        Self::FieldTooLong
    }
}

#[doc(hidden)]
impl From<BadStart> for ClientError {
    fn from(_value: BadStart) -> Self {
        Self::FieldTooLong
    }
}
