use super::*;
use crate::{AuthenticationService, FieldText, PrivilegeLevel, UserInformation};

fn ascii_login_context() -> AuthenticationContext {
    AuthenticationContext {
        privilege_level: PrivilegeLevel::of(1).expect("1 is a valid privilege level"),
        authentication_type: AuthenticationType::Ascii,
        service: AuthenticationService::Login,
    }
}

fn user_info<'a>(user: &'a str, port: &'a str, remote_address: &'a str) -> UserInformation<'a> {
    UserInformation::new(
        FieldText::try_from(user).unwrap(),
        FieldText::try_from(port).unwrap(),
        FieldText::try_from(remote_address).unwrap(),
    )
    .expect("fields fit in a u8 length")
}

#[test]
fn start_rejects_authentication_type_not_set() {
    let context = AuthenticationContext {
        authentication_type: AuthenticationType::NotSet,
        ..ascii_login_context()
    };

    let result = Start::new(Action::Login, context, user_info("alice", "ttyS0", "10.0.0.1"), None);
    assert_eq!(result.unwrap_err(), BadStart::AuthenticationTypeNotSet);
}

#[test]
fn start_rejects_oversized_data() {
    let long_data = [0u8; 256];
    let result = Start::new(
        Action::Login,
        ascii_login_context(),
        user_info("alice", "ttyS0", "10.0.0.1"),
        Some(&long_data),
    );
    assert_eq!(result.unwrap_err(), BadStart::DataTooLong);
}

#[test]
fn start_serializes_expected_layout() {
    let start = Start::new(
        Action::Login,
        ascii_login_context(),
        user_info("alice", "tty0", "127.0.0.1"),
        None,
    )
    .expect("valid start packet");

    let mut buffer = [0xffu8; 64];
    let written = start
        .serialize_into_buffer(&mut buffer)
        .expect("buffer is large enough");

    assert_eq!(&buffer[..8], &[0x01, 1, 0x01, 0x01, 5, 4, 9, 0]);
    assert_eq!(&buffer[8..13], b"alice");
    assert_eq!(&buffer[13..17], b"tty0");
    assert_eq!(&buffer[17..written], b"127.0.0.1");
}

#[test]
fn continue_packet_roundtrips_field_lengths() {
    let continue_packet = Continue::new(Some(b"s3cr3t"), None, ContinueFlags::empty())
        .expect("fields fit in u16 lengths");

    let mut buffer = [0u8; 32];
    let written = continue_packet
        .serialize_into_buffer(&mut buffer)
        .expect("buffer is large enough");

    assert_eq!(&buffer[..2], &[0, 6]); // user message length
    assert_eq!(&buffer[2..4], &[0, 0]); // data length
    assert_eq!(buffer[4], 0); // no abort flag
    assert_eq!(&buffer[5..written], b"s3cr3t");
}

#[test]
fn reply_deserializes_pass() {
    let raw = [
        0x01, // status: pass
        0x00, // flags: none
        0x00, 0x00, // server message length
        0x00, 0x00, // data length
    ];

    let reply = Reply::try_from(&raw[..]).expect("well-formed reply");
    assert_eq!(reply.status(), Status::Pass);
    assert_eq!(reply.server_message().as_ref(), "");
    assert_eq!(reply.data(), b"");
}

#[test]
fn reply_no_echo_flag_is_parsed() {
    let raw = [
        0x05, // status: getpass
        0x01, // flags: NO_ECHO
        0x00, 0x06, // server message length
        0x00, 0x00, // data length
        b'P', b'a', b's', b's', b'w', b'd',
    ];

    let reply = Reply::try_from(&raw[..]).expect("well-formed reply");
    assert_eq!(reply.status(), Status::GetPassword);
    assert!(reply.flags().contains(ReplyFlags::NO_ECHO));
    assert_eq!(reply.server_message().as_ref(), "Passwd");
}

#[test]
fn reply_rejects_short_buffer() {
    let raw = [0x01, 0x00, 0x00];
    assert_eq!(Reply::try_from(&raw[..]), Err(DeserializeError::UnexpectedEnd));
}
