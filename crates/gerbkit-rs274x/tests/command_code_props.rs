use gerbkit_rs274x::scanner::read_command_code;
use gerbkit_rs274x::{CommandCode, LineCursor};
use proptest::prelude::*;

fn loaded(text: String) -> LineCursor {
    let mut cursor = LineCursor::from_text(text);
    cursor.refill().unwrap();
    cursor
}

proptest! {
    #[test]
    fn prop_code_read_consumes_two_chars(
        code in proptest::sample::select(CommandCode::ALL.to_vec()),
        rest in "[A-Z0-9,.*%]{1,16}",
    ) {
        let mut cursor = loaded(format!("{}{}", code.as_str(), rest));
        let raw = read_command_code(&mut cursor);
        prop_assert_eq!(cursor.position(), 2);
        let [a, b] = raw.unwrap();
        prop_assert_eq!(CommandCode::decode(a, b), Some(code));
        prop_assert_eq!(cursor.remaining(), rest.as_bytes());
    }

    #[test]
    fn prop_single_char_is_not_a_code(c in "[A-Z]") {
        let mut cursor = loaded(c);
        prop_assert!(read_command_code(&mut cursor).is_none());
        prop_assert_eq!(cursor.position(), 0);
    }
}
