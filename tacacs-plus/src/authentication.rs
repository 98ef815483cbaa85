//! The authentication state machine: `START` / `REPLY` / `CONTINUE`.

use std::io::{Read, Write};

use md5::{Digest, Md5};
use rand::Rng;

use tacacs_plus_protocol::authentication::{
    Action, Continue, ContinueFlags, Reply, ReplyOwned, Start, Status,
};
use tacacs_plus_protocol::{
    AuthenticationContext, AuthenticationService, AuthenticationType, PrivilegeLevel, UserInformation,
};

use crate::error::ClientError;
use crate::session::Session;

pub use tacacs_plus_protocol::authentication::Action as AuthenticationAction;

/// The maximum length of a server-issued message used as a conversation prompt: longer
/// messages are rejected rather than handed to a host's conversation function unbounded.
pub const MAX_PROMPT_LENGTH: usize = 4 * 1024;

/// The port value the original `pam_tacplus` used to signal a non-interactive caller; a
/// `GETDATA` prompt on this port short-circuits to [`AuthenticationOutcome::NewTokenRequired`]
/// instead of invoking the conversation callback.
pub const NON_INTERACTIVE_PORT: &str = "http";

/// The host-provided conversation callback consulted for `GETDATA` prompts.
///
/// This is the one place the authentication loop talks back to its caller; a PAM caller
/// implements this over `pam_conv`, tests implement it with a canned response queue.
pub trait ConversationHost {
    /// Prompts the user with `message` (echo disabled) and returns their response.
    ///
    /// Returning `Err` is treated the same as the host refusing the conversation.
    fn prompt(&mut self, message: &str) -> Result<String, ClientError>;
}

/// A [`ConversationHost`] that never prompts; used for login flows (PAP/CHAP, or ASCII
/// with the password supplied up front) that don't expect a `GETDATA` round trip.
pub struct NoConversation;

impl ConversationHost for NoConversation {
    fn prompt(&mut self, _message: &str) -> Result<String, ClientError> {
        Err(ClientError::ConversationError)
    }
}

/// The fields needed to start an ASCII authentication session.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticationRequest<'a> {
    /// `Login` for a normal sign-in, `ChangePassword` for a password-change flow.
    pub action: Action,
    pub user: &'a str,
    pub port: &'a str,
    pub remote_address: &'a str,
    pub privilege_level: PrivilegeLevel,
    /// The password to send in the `START` body and to answer a `GETPASS` prompt with.
    /// `None` for flows that expect the server to prompt for everything via `GETDATA`.
    pub password: Option<&'a str>,
}

/// A terminal result of the authentication loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationOutcome {
    /// `PASS`: the user is authenticated.
    Pass {
        /// The message returned by the server, intended for display to the user.
        message: String,
        /// Authentication data returned by the server.
        data: Vec<u8>,
    },
    /// `FAIL`: the attempt is authoritatively denied.
    Fail {
        /// The message returned by the server, intended for display to the user.
        message: String,
        /// Authentication data returned by the server.
        data: Vec<u8>,
    },
    /// `RESTART`: the caller may retry, e.g. with a different authentication type; this
    /// crate never does so transparently.
    Restart,
    /// `FOLLOW`: a redirect to an alternative daemon, which this client does not chase.
    Follow,
    /// A non-interactive `GETDATA` (port `http`) that would otherwise require a password
    /// change conversation.
    NewTokenRequired,
}

fn build_user_information<'a>(
    user: &'a str,
    port: &'a str,
    remote_address: &'a str,
) -> Result<UserInformation<'a>, ClientError> {
    UserInformation::new(
        user.try_into().map_err(|_| ClientError::InvalidContext)?,
        port.try_into().map_err(|_| ClientError::InvalidContext)?,
        remote_address.try_into().map_err(|_| ClientError::InvalidContext)?,
    )
    .ok_or(ClientError::InvalidContext)
}

fn outcome_from_reply(reply: ReplyOwned) -> Result<AuthenticationOutcome, ClientError> {
    match reply.status {
        Status::Pass => Ok(AuthenticationOutcome::Pass {
            message: reply.server_message,
            data: reply.data,
        }),
        Status::Fail => Ok(AuthenticationOutcome::Fail {
            message: reply.server_message,
            data: reply.data,
        }),
        Status::Restart => Ok(AuthenticationOutcome::Restart),
        #[allow(deprecated)]
        Status::Follow => Ok(AuthenticationOutcome::Follow),
        Status::Error => Err(ClientError::ServerError {
            message: reply.server_message,
        }),
        Status::GetUser | Status::GetPassword | Status::GetData => {
            // a single-shot exchange (PAP/CHAP) was driven against a server that wants to
            // continue the conversation; there's nothing sensible to answer with here.
            Err(ClientError::ConversationError)
        }
    }
}

/// Drives a single ASCII authentication exchange to completion against `session`.
///
/// Iterates `REPLY -> CONTINUE` until a terminal status is reached. `host` is only
/// consulted for `GETDATA` prompts on an interactive port.
pub fn run_ascii<S: Read + Write>(
    session: &mut Session<S>,
    request: AuthenticationRequest<'_>,
    host: &mut impl ConversationHost,
) -> Result<AuthenticationOutcome, ClientError> {
    let user_information = build_user_information(request.user, request.port, request.remote_address)?;

    let start = Start::new(
        request.action,
        AuthenticationContext {
            privilege_level: request.privilege_level,
            authentication_type: AuthenticationType::Ascii,
            service: AuthenticationService::Login,
        },
        user_information,
        request.password.map(str::as_bytes),
    )?;
    session.send(start)?;

    let mut cached_password = request.password.map(str::to_owned);
    let mut buffer = Vec::new();

    loop {
        let reply: ReplyOwned = session.recv::<Reply<'_>>(&mut buffer)?;

        match reply.status {
            Status::GetUser => {
                session.send(Continue::new(Some(request.user.as_bytes()), None, ContinueFlags::empty())?)?;
            }
            Status::GetPassword => {
                let password = cached_password.as_deref().ok_or(ClientError::ConversationError)?;
                session.send(Continue::new(Some(password.as_bytes()), None, ContinueFlags::empty())?)?;
            }
            Status::GetData => {
                if request.port == NON_INTERACTIVE_PORT {
                    return Ok(AuthenticationOutcome::NewTokenRequired);
                }

                if reply.server_message.len() > MAX_PROMPT_LENGTH {
                    return Err(ClientError::PromptTooLong);
                }

                let response = host.prompt(&reply.server_message)?;
                if response.is_empty() {
                    // an empty GETDATA response is a conversation error, not a fail.
                    return Err(ClientError::ConversationError);
                }

                cached_password = Some(response.clone());
                session.send(Continue::new(Some(response.as_bytes()), None, ContinueFlags::empty())?)?;
            }
            _ => return outcome_from_reply(reply),
        }
    }
}

/// Drives a single-round PAP authentication exchange: the password is sent directly in
/// the `START` body, and the server's single `REPLY` is the final outcome.
pub fn run_pap<S: Read + Write>(
    session: &mut Session<S>,
    user: &str,
    port: &str,
    remote_address: &str,
    privilege_level: PrivilegeLevel,
    password: &str,
) -> Result<AuthenticationOutcome, ClientError> {
    let user_information = build_user_information(user, port, remote_address)?;

    let start = Start::new(
        Action::Login,
        AuthenticationContext {
            privilege_level,
            authentication_type: AuthenticationType::Pap,
            service: AuthenticationService::Login,
        },
        user_information,
        Some(password.as_bytes()),
    )?;
    session.send(start)?;

    let mut buffer = Vec::new();
    let reply: ReplyOwned = session.recv::<Reply<'_>>(&mut buffer)?;
    outcome_from_reply(reply)
}

/// Drives a single-round CHAP authentication exchange, per [RFC1334 §3.2.1][rfc]: the
/// `START` body carries a random PPP id, an 8-byte challenge, and the MD5 response
/// `MD5(id || password || challenge)`.
///
/// [rfc]: https://www.rfc-editor.org/rfc/rfc1334.html#section-3.2.1
pub fn run_chap<S: Read + Write>(
    session: &mut Session<S>,
    user: &str,
    port: &str,
    remote_address: &str,
    privilege_level: PrivilegeLevel,
    password: &str,
) -> Result<AuthenticationOutcome, ClientError> {
    let user_information = build_user_information(user, port, remote_address)?;

    let ppp_id: u8 = rand::thread_rng().gen();
    let challenge: [u8; 8] = rand::thread_rng().gen();

    let mut hasher = Md5::new();
    hasher.update([ppp_id]);
    hasher.update(password.as_bytes());
    hasher.update(challenge);
    let response = hasher.finalize();

    let mut data = Vec::with_capacity(1 + challenge.len() + response.len());
    data.push(ppp_id);
    data.extend_from_slice(&challenge);
    data.extend_from_slice(&response[..]);

    let start = Start::new(
        Action::Login,
        AuthenticationContext {
            privilege_level,
            authentication_type: AuthenticationType::Chap,
            service: AuthenticationService::Login,
        },
        user_information,
        Some(&data),
    )?;
    session.send(start)?;

    let mut buffer = Vec::new();
    let reply: ReplyOwned = session.recv::<Reply<'_>>(&mut buffer)?;
    outcome_from_reply(reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    // the empty-GETDATA-response-is-a-conversation-error behavior of `run_ascii` is
    // covered by tests/ascii_login.rs, which scripts a real server exchange rather than
    // calling `ConversationHost::prompt` directly.

    #[test]
    fn no_conversation_host_always_refuses() {
        let mut host = NoConversation;
        assert!(matches!(host.prompt("anything"), Err(ClientError::ConversationError)));
    }
}
