use super::*;
use crate::FieldText;

fn required(name: &str, value: &str) -> Argument<'_> {
    Argument::new(
        FieldText::try_from(name).unwrap(),
        FieldText::try_from(value).unwrap(),
        true,
    )
    .expect("valid argument")
}

#[test]
fn new_rejects_empty_name() {
    let result = Argument::new(FieldText::try_from("").unwrap(), FieldText::try_from("x").unwrap(), true);
    assert_eq!(result.unwrap_err(), InvalidArgument::EmptyName);
}

#[test]
fn new_rejects_delimiter_in_name() {
    let result = Argument::new(
        FieldText::try_from("priv=lvl").unwrap(),
        FieldText::try_from("15").unwrap(),
        true,
    );
    assert_eq!(result.unwrap_err(), InvalidArgument::NameContainsDelimiter);
}

#[test]
fn deserialize_required_and_optional() {
    let required = Argument::deserialize(b"priv-lvl=15").expect("valid argument");
    assert_eq!(required.name().as_ref(), "priv-lvl");
    assert_eq!(required.value().as_ref(), "15");
    assert!(required.required());

    let optional = Argument::deserialize(b"service*shell").expect("valid argument");
    assert_eq!(optional.name().as_ref(), "service");
    assert_eq!(optional.value().as_ref(), "shell");
    assert!(!optional.required());
}

#[test]
fn deserialize_rejects_missing_delimiter() {
    assert_eq!(
        Argument::deserialize(b"no-delimiter-here"),
        Err(InvalidArgument::NoDelimiter)
    );
}

#[test]
fn deserialize_rejects_empty_name() {
    assert_eq!(Argument::deserialize(b"=value"), Err(InvalidArgument::EmptyName));
}

#[test]
fn arguments_list_serializes_count_lengths_and_values() {
    let first = required("service", "shell");
    let second = required("priv-lvl", "15");
    let list = [first, second];
    let arguments = Arguments::new(&list).expect("fits in 255 entries");

    let mut header_buffer = [0u8; 3];
    arguments
        .serialize_count_and_lengths(&mut header_buffer)
        .expect("buffer is large enough");
    assert_eq!(header_buffer, [2, 13, 11]); // count, "service=shell".len(), "priv-lvl=15".len()

    let mut values_buffer = [0u8; 24];
    let written = arguments
        .serialize_encoded_values(&mut values_buffer)
        .expect("buffer is large enough");
    assert_eq!(&values_buffer[..written], b"service=shellpriv-lvl=15");
}

#[test]
fn arguments_new_rejects_more_than_255_entries() {
    let single = required("a", "b");
    let many: [Argument<'_>; 256] = core::array::from_fn(|_| single.clone());
    assert!(Arguments::new(&many).is_none());
}
