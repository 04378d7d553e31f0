use mazurka_pool::Row;
use serde_json::json;

#[test]
fn test_row_serializes_as_object_in_column_order() {
    // Column order must survive serialization even when it is not
    // alphabetical.
    let row = Row::from_pairs([("z", json!(1)), ("a", json!("x"))]);
    let serialized = serde_json::to_string(&row).unwrap();
    assert_eq!(serialized, r#"{"z":1,"a":"x"}"#);
}

#[test]
fn test_rows_serialize_as_json_array() {
    let rows = vec![
        Row::from_pairs([("id", json!(1)), ("name", json!("ada"))]),
        Row::from_pairs([("id", json!(2)), ("name", json!("grace"))]),
    ];
    let value = serde_json::to_value(&rows).unwrap();
    assert_eq!(
        value,
        json!([
            { "id": 1, "name": "ada" },
            { "id": 2, "name": "grace" }
        ])
    );
}

#[test]
fn test_get_by_name_and_index() {
    let row = Row::from_pairs([("id", json!(7)), ("email", json!("ada@example.com"))]);

    assert_eq!(row.get("id"), Some(&json!(7)));
    assert_eq!(row.get("email"), Some(&json!("ada@example.com")));
    assert_eq!(row.get("missing"), None);
    assert_eq!(row.get_index(0), Some(&json!(7)));
    assert_eq!(row.get_index(9), None);
}

#[test]
fn test_missing_values_pad_with_null() {
    let columns = vec!["a".to_string(), "b".to_string()];
    let row = Row::new(columns, vec![json!(1)]);

    assert_eq!(row.len(), 2);
    assert_eq!(row.get("a"), Some(&json!(1)));
    assert_eq!(row.get("b"), Some(&json!(null)));
}

#[test]
fn test_extra_values_are_truncated() {
    let columns = vec!["a".to_string()];
    let row = Row::new(columns, vec![json!(1), json!(2), json!(3)]);

    assert_eq!(row.len(), 1);
    assert_eq!(row.get_index(1), None);
}

#[test]
fn test_empty_row() {
    let row = Row::from_pairs(Vec::<(String, serde_json::Value)>::new());

    assert!(row.is_empty());
    assert_eq!(serde_json::to_string(&row).unwrap(), "{}");
}

#[test]
fn test_columns_accessor_preserves_order() {
    let row = Row::from_pairs([("first", json!(1)), ("second", json!(2))]);
    assert_eq!(row.columns(), ["first".to_string(), "second".to_string()]);
}
