use super::*;

#[test]
fn search_matches_name_phone_or_email() {
    assert!(matches_search("", "Karim", "0555", None));
    assert!(matches_search("  ", "Karim", "0555", None));
    assert!(matches_search("kar", "Karim Haddad", "0555", None));
    assert!(matches_search("0555", "Karim", "0555123456", None));
    assert!(matches_search("GMAIL", "Karim", "0555", Some("karim@gmail.com")));
    assert!(matches_search("سارة", "سارة بن علي", "0666", None));

    assert!(!matches_search("amina", "Karim", "0555", Some("karim@gmail.com")));
    assert!(!matches_search("0666", "Karim", "0555", None));
}

#[test]
fn notices_render_with_level_tag() {
    assert_eq!(Notice::success("ok").to_string(), "[تم] ok");
    assert_eq!(Notice::error("no").to_string(), "[خطأ] no");
    assert!(Notice::error("no").is_error());
}
