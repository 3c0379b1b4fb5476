use super::*;

#[test]
fn page_ids_parse_back_from_display() {
    for page in PageId::ALL {
        assert_eq!(page.to_string().parse::<PageId>().expect("parse"), page);
    }
}

#[test]
fn legacy_identifiers_map_to_current_pages() {
    assert_eq!("loading".parse::<PageId>().unwrap(), PageId::Bootstrap);
    assert_eq!("courses".parse::<PageId>().unwrap(), PageId::CourseCategory);
    assert_eq!("basic-form".parse::<PageId>().unwrap(), PageId::RegistrationBasic);
    assert_eq!("full-form".parse::<PageId>().unwrap(), PageId::RegistrationFull);
    assert_eq!("internapplication".parse::<PageId>().unwrap(), PageId::Internship);
}

#[test]
fn unknown_page_is_rejected() {
    let err = "settings".parse::<PageId>().expect_err("should fail");
    assert_eq!(err, ParsePageError("settings".to_owned()));
    assert_eq!(err.to_string(), "unknown page identifier: settings");
}

#[test]
fn default_page_is_bootstrap() {
    assert_eq!(PageId::default(), PageId::Bootstrap);
}

#[test]
fn page_serializes_as_kebab_case() {
    let json = serde_json::to_string(&PageId::AdminDashboard).unwrap();
    assert_eq!(json, "\"admin-dashboard\"");
    let page: PageId = serde_json::from_str("\"course-category\"").unwrap();
    assert_eq!(page, PageId::CourseCategory);
}

#[test]
fn every_page_has_a_title() {
    for page in PageId::ALL {
        assert!(!page.title().is_empty(), "{page} has no title");
    }
}

// =============================================================
// Destination
// =============================================================

#[test]
fn destination_keywords_parse() {
    assert_eq!("admin".parse::<Destination>().unwrap(), Destination::Admin);
    assert_eq!("basic".parse::<Destination>().unwrap(), Destination::Basic);
    assert_eq!("full".parse::<Destination>().unwrap(), Destination::Full);
}

#[test]
fn destination_falls_through_to_page_ids() {
    assert_eq!(
        "workshops".parse::<Destination>().unwrap(),
        Destination::Page(PageId::Workshops)
    );
    assert!("nowhere".parse::<Destination>().is_err());
}
