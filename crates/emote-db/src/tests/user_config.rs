use super::test_db;

#[test]
fn test_user_config_roundtrip() {
    let db = test_db();
    assert!(db.get_user_config("42").unwrap().is_none());

    db.set_user_config("42", r#"{"Editors":["a"]}"#).unwrap();
    assert_eq!(
        db.get_user_config("42").unwrap().as_deref(),
        Some(r#"{"Editors":["a"]}"#)
    );

    db.set_user_config("42", r#"{"Editors":[]}"#).unwrap();
    assert_eq!(
        db.get_user_config("42").unwrap().as_deref(),
        Some(r#"{"Editors":[]}"#)
    );

    assert!(db.delete_user_config("42").unwrap());
    assert!(!db.delete_user_config("42").unwrap());
    assert!(db.get_user_config("42").unwrap().is_none());
}
