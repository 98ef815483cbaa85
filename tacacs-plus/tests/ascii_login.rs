//! ASCII login: the interactive `GETUSER`/`GETPASS`/`GETDATA` loop driven by `run_ascii`.

mod common;

use std::collections::VecDeque;

use common::{authentication_reply_body, packet_bytes, MemoryStream, EMPTY_SECRET};
use tacacs_plus::authentication::{
    AuthenticationOutcome, AuthenticationRequest, ConversationHost, NoConversation,
};
use tacacs_plus::{ClientError, PrivilegeLevel, Session, Transport};
use tacacs_plus_protocol::authentication::Action;
use tacacs_plus_protocol::{PacketFlags, PacketType};

const SESSION_ID: u32 = 0x0f0f_1234;

struct CannedResponses(VecDeque<String>);

impl ConversationHost for CannedResponses {
    fn prompt(&mut self, _message: &str) -> Result<String, ClientError> {
        self.0.pop_front().ok_or(ClientError::ConversationError)
    }
}

fn session_with_replies(bodies: &[(u8, &[u8], &[u8])]) -> Session<MemoryStream> {
    let mut sequence = 2u8;
    let mut scripted = Vec::new();
    for (status, message, data) in bodies {
        let body = authentication_reply_body(*status, 0, message, data);
        scripted.extend(packet_bytes(
            PacketType::Authentication,
            sequence,
            PacketFlags::UNENCRYPTED,
            SESSION_ID,
            &body,
        ));
        sequence += 2;
    }

    let transport = Transport::new(MemoryStream::scripted(scripted));
    Session::with_session_id(transport, EMPTY_SECRET.to_vec(), SESSION_ID)
}

fn base_request<'a>(password: Option<&'a str>) -> AuthenticationRequest<'a> {
    AuthenticationRequest {
        action: Action::Login,
        user: "alice",
        port: "tty0",
        remote_address: "192.0.2.1",
        privilege_level: PrivilegeLevel::default(),
        password,
    }
}

#[test]
fn ascii_login_walks_getuser_and_getpass_to_pass() {
    let mut session = session_with_replies(&[
        (0x04, b"Username: ", b""), // GetUser
        (0x05, b"Password: ", b""), // GetPassword
        (0x01, b"Welcome", b""),    // Pass
    ]);

    let outcome = tacacs_plus::authentication::run_ascii(
        &mut session,
        base_request(Some("hunter2")),
        &mut NoConversation,
    )
    .expect("well-formed exchange");

    assert_eq!(
        outcome,
        AuthenticationOutcome::Pass {
            message: "Welcome".to_string(),
            data: Vec::new(),
        }
    );
}

#[test]
fn ascii_login_consults_host_for_getdata_on_interactive_port() {
    let mut session = session_with_replies(&[
        (0x03, b"one-time code: ", b""), // GetData
        (0x01, b"Welcome", b""),         // Pass
    ]);

    let mut host = CannedResponses(VecDeque::from(["123456".to_string()]));
    let outcome = tacacs_plus::authentication::run_ascii(&mut session, base_request(None), &mut host)
        .expect("well-formed exchange");

    assert_eq!(
        outcome,
        AuthenticationOutcome::Pass {
            message: "Welcome".to_string(),
            data: Vec::new(),
        }
    );
}

#[test]
fn ascii_login_empty_getdata_response_is_conversation_error() {
    let mut session = session_with_replies(&[(0x03, b"one-time code: ", b"")]);

    let mut host = CannedResponses(VecDeque::from([String::new()]));
    let result = tacacs_plus::authentication::run_ascii(&mut session, base_request(None), &mut host);

    assert!(matches!(result, Err(ClientError::ConversationError)));
}

#[test]
fn ascii_login_on_non_interactive_port_short_circuits_getdata() {
    let mut session = session_with_replies(&[(0x03, b"new token required", b"")]);

    let mut request = base_request(None);
    request.port = "http";

    // NoConversation errors if its prompt() is ever called, so this also proves the host
    // is never consulted for a non-interactive GETDATA.
    let outcome =
        tacacs_plus::authentication::run_ascii(&mut session, request, &mut NoConversation)
            .expect("short-circuits without prompting");

    assert_eq!(outcome, AuthenticationOutcome::NewTokenRequired);
}

#[test]
fn ascii_login_fails() {
    let mut session = session_with_replies(&[(0x02, b"no such user", b"")]);

    let outcome =
        tacacs_plus::authentication::run_ascii(&mut session, base_request(Some("hunter2")), &mut NoConversation)
            .expect("well-formed exchange");

    assert_eq!(
        outcome,
        AuthenticationOutcome::Fail {
            message: "no such user".to_string(),
            data: Vec::new(),
        }
    );
}
