use super::*;
use crate::{AuthenticationService, AuthenticationType, FieldText, PrivilegeLevel, UserInformation};

fn context() -> AuthenticationContext {
    AuthenticationContext {
        privilege_level: PrivilegeLevel::of(0).unwrap(),
        authentication_type: AuthenticationType::Ascii,
        service: AuthenticationService::Login,
    }
}

fn user_info<'a>() -> UserInformation<'a> {
    UserInformation::new(
        FieldText::try_from("alice").unwrap(),
        FieldText::try_from("tty0").unwrap(),
        FieldText::try_from("127.0.0.1").unwrap(),
    )
    .unwrap()
}

#[test]
fn watchdog_update_combines_start_and_watchdog_bits() {
    assert_eq!(
        RawFlags::from(Flags::WatchdogUpdate),
        RawFlags::WATCHDOG | RawFlags::START
    );
    assert_eq!(RawFlags::from(Flags::StartRecord), RawFlags::START);
    assert_eq!(RawFlags::from(Flags::StopRecord), RawFlags::STOP);
}

#[test]
fn request_serializes_flags_and_method() {
    let empty = [];
    let arguments = Arguments::new(&empty).unwrap();
    let request = Request::new(
        Flags::StartRecord,
        AuthenticationMethod::TacacsPlus,
        context(),
        user_info(),
        arguments,
    );

    let mut buffer = [0xffu8; 32];
    let written = request.serialize_into_buffer(&mut buffer).unwrap();

    assert_eq!(buffer[0], RawFlags::START.bits());
    assert_eq!(buffer[1], AuthenticationMethod::TacacsPlus as u8);
    assert_eq!(buffer[8], 0); // argument count
    assert_eq!(&buffer[9..written], b"alicetty0127.0.0.1");
}

#[test]
fn reply_deserializes_success_with_message() {
    let raw = [
        0x00, 0x04, // server message length
        0x00, 0x00, // data length
        0x01, // status: success
        b'd', b'o', b'n', b'e',
    ];

    let reply = Reply::try_from(&raw[..]).expect("well-formed reply");
    assert_eq!(reply.status(), Status::Success);
    assert_eq!(reply.server_message().as_ref(), "done");
    assert_eq!(reply.data(), b"");
}

#[test]
fn status_rejects_unknown_byte() {
    assert_eq!(Status::try_from(0x99), Err(DeserializeError::InvalidStatus(0x99)));
}
