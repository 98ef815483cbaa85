use super::*;
use crate::{
    AuthenticationMethod, AuthenticationService, AuthenticationType, FieldText, PrivilegeLevel,
    UserInformation,
};

fn context() -> AuthenticationContext {
    AuthenticationContext {
        privilege_level: PrivilegeLevel::of(1).unwrap(),
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
fn request_serializes_with_no_arguments() {
    let empty = [];
    let arguments = Arguments::new(&empty).unwrap();
    let request = Request::new(AuthenticationMethod::TacacsPlus, context(), user_info(), arguments);

    let mut buffer = [0xffu8; 32];
    let written = request.serialize_into_buffer(&mut buffer).unwrap();

    assert_eq!(&buffer[..7], &[0x06, 1, 0x01, 0x01, 5, 4, 9]);
    assert_eq!(buffer[7], 0); // argument count
    assert_eq!(&buffer[8..written], b"alicetty0127.0.0.1");
}

#[test]
fn reply_iterates_arguments_in_order() {
    let raw: [u8; 6 + 2 + 13 + 11] = {
        let mut buf = [0u8; 6 + 2 + 13 + 11];
        buf[0] = 0x01; // status: pass add
        buf[1] = 2; // argument count
        // server message length (0), data length (0) already zero
        buf[6] = 13; // len("service=shell")
        buf[7] = 11; // len("priv-lvl=15")
        buf[8..21].copy_from_slice(b"service=shell");
        buf[21..32].copy_from_slice(b"priv-lvl=15");
        buf
    };

    let reply = Reply::try_from(&raw[..]).expect("well-formed reply");
    assert_eq!(reply.status(), Status::PassAdd);

    let mut iter = reply.iter_arguments();
    let first = iter.next().unwrap().expect("well-formed argument");
    assert_eq!(first.name().as_ref(), "service");
    assert_eq!(first.value().as_ref(), "shell");

    let second = iter.next().unwrap().expect("well-formed argument");
    assert_eq!(second.name().as_ref(), "priv-lvl");
    assert_eq!(second.value().as_ref(), "15");

    assert!(iter.next().is_none());
}

#[test]
fn reply_iterator_reports_malformed_argument_without_aborting() {
    let raw: [u8; 6 + 2 + 17 + 11] = {
        let mut buf = [0u8; 6 + 2 + 17 + 11];
        buf[0] = 0x10; // status: fail
        buf[1] = 2;
        buf[6] = 17; // len of the malformed argument below
        buf[7] = 11; // len("priv-lvl=15")
        buf[8..25].copy_from_slice(b"no-delimiter-here");
        buf[25..36].copy_from_slice(b"priv-lvl=15");
        buf
    };

    let reply = Reply::try_from(&raw[..]).expect("field lengths are still well-formed");
    let mut iter = reply.iter_arguments();

    assert!(iter.next().unwrap().is_err());
    assert_eq!(iter.next().unwrap().unwrap().name().as_ref(), "priv-lvl");
}
