//! Authorization request/reply exchange: attribute passing.

use std::io::{Read, Write};

use tacacs_plus_protocol::authorization::{Reply, Request, Status};
use tacacs_plus_protocol::{
    Argument, ArgumentOwned, Arguments, AuthenticationContext, AuthenticationService,
    AuthenticationType, ToOwnedBody,
};

use crate::context::SessionContext;
use crate::error::ClientError;
use crate::session::Session;

/// The terminal result of an authorization exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationOutcome {
    /// `PASS_ADD`: the server's attributes augment the caller's.
    PassAdd {
        /// The message to present to the user.
        message: String,
        /// Administrative/log data returned by the server.
        data: Vec<u8>,
        /// Attributes sent by the server that decoded successfully.
        arguments: Vec<ArgumentOwned>,
        /// How many attributes in the reply failed to decode and were skipped.
        malformed_argument_count: usize,
    },
    /// `PASS_REPL`: the server's attributes replace the caller's.
    PassReplace {
        /// The message to present to the user.
        message: String,
        /// Administrative/log data returned by the server.
        data: Vec<u8>,
        /// Attributes sent by the server that decoded successfully.
        arguments: Vec<ArgumentOwned>,
        /// How many attributes in the reply failed to decode and were skipped.
        malformed_argument_count: usize,
    },
    /// `FAIL`: the service request is denied.
    Denied {
        /// The message to present to the user.
        message: String,
    },
}

/// Sends an authorization request carrying `arguments` and interprets the reply.
///
/// `FOLLOW` is treated the same as a denial, since this client doesn't chase redirects.
pub fn authorize<S: Read + Write>(
    session: &mut Session<S>,
    context: &SessionContext,
    arguments: &[Argument<'_>],
) -> Result<AuthorizationOutcome, ClientError> {
    let arguments = Arguments::new(arguments).ok_or(ClientError::TooManyArguments)?;

    let request = Request::new(
        context.authentication_method(),
        AuthenticationContext {
            privilege_level: context.privilege_level(),
            authentication_type: AuthenticationType::NotSet,
            service: AuthenticationService::Login,
        },
        context.as_user_information()?,
        arguments,
    );
    session.send(request)?;

    let mut buffer = Vec::new();
    let packet = session.recv_packet::<Reply<'_>>(&mut buffer)?;
    let reply = packet.body();

    let malformed_argument_count = reply.iter_arguments().filter(|result| result.is_err()).count();
    let status = reply.status();
    let server_message = reply.server_message().as_ref().to_string();
    let data = reply.data().to_vec();
    let owned = reply.to_owned();

    match status {
        Status::PassAdd => Ok(AuthorizationOutcome::PassAdd {
            message: server_message,
            data,
            arguments: owned.arguments,
            malformed_argument_count,
        }),
        Status::PassReplace => Ok(AuthorizationOutcome::PassReplace {
            message: server_message,
            data,
            arguments: owned.arguments,
            malformed_argument_count,
        }),
        Status::Fail => Ok(AuthorizationOutcome::Denied { message: server_message }),
        #[allow(deprecated)]
        Status::Follow => Ok(AuthorizationOutcome::Denied { message: server_message }),
        Status::Error => Err(ClientError::ServerError { message: server_message }),
    }
}
