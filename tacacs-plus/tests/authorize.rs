//! Authorization: a single request/reply round trip carrying attributes both ways.

mod common;

use common::{authorization_reply_body, packet_bytes, MemoryStream, EMPTY_SECRET};
use tacacs_plus::authorization::{authorize, AuthorizationOutcome};
use tacacs_plus::context::SessionContextBuilder;
use tacacs_plus::{Argument, Session, Transport};
use tacacs_plus_protocol::{PacketFlags, PacketType};

const SESSION_ID: u32 = 0x4242_4242;

fn session_with_reply(body: Vec<u8>) -> Session<MemoryStream> {
    let packet = packet_bytes(PacketType::Authorization, 2, PacketFlags::UNENCRYPTED, SESSION_ID, &body);
    let transport = Transport::new(MemoryStream::scripted(packet));
    Session::with_session_id(transport, EMPTY_SECRET.to_vec(), SESSION_ID)
}

#[test]
fn authorize_pass_add_decodes_returned_attributes() {
    let body = authorization_reply_body(0x01, b"", b"", &[b"priv-lvl=15"]);
    let mut session = session_with_reply(body);

    let context = SessionContextBuilder::new("alice").build();
    let argument = Argument::new("service".try_into().unwrap(), "shell".try_into().unwrap(), true).unwrap();

    let outcome = authorize(&mut session, &context, &[argument]).expect("well-formed reply");

    match outcome {
        AuthorizationOutcome::PassAdd {
            arguments,
            malformed_argument_count,
            ..
        } => {
            assert_eq!(malformed_argument_count, 0);
            assert_eq!(arguments.len(), 1);
        }
        other => panic!("expected PassAdd, got {other:?}"),
    }
}

#[test]
fn authorize_skips_malformed_attributes_without_failing_the_reply() {
    // an argument with no `=`/`*` separator doesn't decode, but the reply as a whole is
    // still well-formed.
    let body = authorization_reply_body(0x01, b"", b"", &[b"priv-lvl=15", b"garbage"]);
    let mut session = session_with_reply(body);

    let context = SessionContextBuilder::new("alice").build();
    let outcome = authorize(&mut session, &context, &[]).expect("well-formed reply");

    match outcome {
        AuthorizationOutcome::PassAdd {
            arguments,
            malformed_argument_count,
            ..
        } => {
            assert_eq!(arguments.len(), 1);
            assert_eq!(malformed_argument_count, 1);
        }
        other => panic!("expected PassAdd, got {other:?}"),
    }
}

#[test]
fn authorize_denied_on_fail_status() {
    let body = authorization_reply_body(0x10, b"not authorized", b"", &[]);
    let mut session = session_with_reply(body);

    let context = SessionContextBuilder::new("alice").build();
    let outcome = authorize(&mut session, &context, &[]).expect("well-formed reply");

    assert_eq!(
        outcome,
        AuthorizationOutcome::Denied {
            message: "not authorized".to_string()
        }
    );
}

#[test]
fn authorize_server_error_status_is_reported() {
    let body = authorization_reply_body(0x11, b"internal error", b"", &[]);
    let mut session = session_with_reply(body);

    let context = SessionContextBuilder::new("alice").build();
    let result = authorize(&mut session, &context, &[]);

    assert!(matches!(result, Err(tacacs_plus::ClientError::ServerError { .. })));
}
