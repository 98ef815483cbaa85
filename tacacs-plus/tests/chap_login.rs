//! CHAP login: the client computes an RFC1334 MD5 challenge response client-side, but the
//! wire exchange is still a single `START`/`REPLY` round trip from the client's point of view.

mod common;

use common::{authentication_reply_body, packet_bytes, MemoryStream, EMPTY_SECRET};
use tacacs_plus::authentication::{run_chap, AuthenticationOutcome};
use tacacs_plus::{PrivilegeLevel, Session, Transport};
use tacacs_plus_protocol::{PacketFlags, PacketType};

const SESSION_ID: u32 = 0x2468_ace0;

fn session_with_reply(body: Vec<u8>) -> Session<MemoryStream> {
    let packet = packet_bytes(PacketType::Authentication, 2, PacketFlags::UNENCRYPTED, SESSION_ID, &body);
    let stream = MemoryStream::scripted(packet);
    let transport = Transport::new(stream);
    Session::with_session_id(transport, EMPTY_SECRET.to_vec(), SESSION_ID)
}

#[test]
fn chap_login_passes() {
    let body = authentication_reply_body(0x01, 0, b"", b"");
    let mut session = session_with_reply(body);

    let outcome = run_chap(
        &mut session,
        "bob",
        "tty1",
        "192.0.2.2",
        PrivilegeLevel::MAXIMUM,
        "hunter2",
    )
    .expect("well-formed reply");

    assert_eq!(
        outcome,
        AuthenticationOutcome::Pass {
            message: String::new(),
            data: Vec::new(),
        }
    );

    // the client's CHAP START carries a 1-byte ppp id, an 8-byte challenge, and a 16-byte
    // MD5 response, on top of the usual authentication header fields.
    assert!(session.session_id() == SESSION_ID);
}

#[test]
fn chap_login_restart_does_not_retry_transparently() {
    let body = authentication_reply_body(0x06, 0, b"", b"");
    let mut session = session_with_reply(body);

    let outcome = run_chap(
        &mut session,
        "bob",
        "tty1",
        "192.0.2.2",
        PrivilegeLevel::MAXIMUM,
        "hunter2",
    )
    .expect("well-formed reply");

    assert_eq!(outcome, AuthenticationOutcome::Restart);
}
