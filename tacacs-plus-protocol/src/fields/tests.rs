use super::*;

#[test]
fn privilege_level_rejects_out_of_range() {
    assert!(PrivilegeLevel::of(16).is_none());
    assert!(PrivilegeLevel::of(15).is_some());
    assert_eq!(PrivilegeLevel::default(), PrivilegeLevel::MINIMUM);
}

#[test]
fn user_information_rejects_oversized_field() {
    let long_user_bytes = [b'a'; 256];
    let long_user_str = core::str::from_utf8(&long_user_bytes).unwrap();
    let long_user = FieldText::try_from(long_user_str).unwrap();

    assert!(UserInformation::new(
        long_user,
        FieldText::try_from("port").unwrap(),
        FieldText::try_from("addr").unwrap(),
    )
    .is_none());
}

#[test]
fn user_information_serializes_lengths_then_values() {
    let info = UserInformation::new(
        FieldText::try_from("bob").unwrap(),
        FieldText::try_from("tty1").unwrap(),
        FieldText::try_from("10.0.0.2").unwrap(),
    )
    .unwrap();

    let mut header = [0u8; 3];
    info.serialize_header_information(&mut header).unwrap();
    assert_eq!(header, [3, 4, 8]);

    let mut body = [0u8; 15];
    let written = info.serialize_body_information(&mut body);
    assert_eq!(&body[..written], b"bobtty110.0.0.2");
}
