//! Unit tests for the legacy object container.

use serde_json::Value;

use super::*;
use crate::error::ProtocolErrorKind;

#[test]
fn keys_keep_insertion_order() {
    let mut object = LegacyObject::with_type("AbsoluteMonthlyRecurrence");
    object.add("Interval", 2);
    object.add("DayOfMonth", 15);
    assert_eq!(
        object.keys().collect::<Vec<_>>(),
        [TYPE_KEY, "Interval", "DayOfMonth"]
    );
    assert_eq!(object.type_name(), Some("AbsoluteMonthlyRecurrence"));
}

#[test]
fn text_renders_primitives_only() {
    let mut object = LegacyObject::new();
    object.add("Name", "weekly");
    object.add("Count", 3);
    object.add("Flag", true);
    object.add("Nested", LegacyObject::new());
    object.add("Nothing", Value::Null);
    assert_eq!(object.text("Name").as_deref(), Some("weekly"));
    assert_eq!(object.text("Count").as_deref(), Some("3"));
    assert_eq!(object.text("Flag").as_deref(), Some("true"));
    assert_eq!(object.text("Nested"), None);
    assert_eq!(object.text("Nothing"), None);
    assert_eq!(object.text("Missing"), None);
}

#[test]
fn nested_objects_are_retrievable() {
    let mut inner = LegacyObject::with_type("NoEndRecurrence");
    inner.add("StartDate", "2024-01-15");
    let mut outer = LegacyObject::new();
    outer.add("Range", inner.clone());
    assert_eq!(outer.object("Range"), Some(inner));
    assert!(outer.contains_key("Range"));
}

#[test]
fn json_text_round_trips() {
    let mut object = LegacyObject::with_type("DailyRecurrence");
    object.add("Interval", 4);
    let text = object.to_json_string();
    assert_eq!(text, r#"{"__type":"DailyRecurrence","Interval":4}"#);
    assert_eq!(LegacyObject::from_json_str(&text).expect("parse"), object);
}

#[test]
fn from_json_rejects_non_objects() {
    let error = LegacyObject::from_json_str("[1,2]").expect_err("array");
    assert_eq!(error.kind(), ProtocolErrorKind::MalformedDocument);
    let error = LegacyObject::from_json_str("{").expect_err("truncated");
    assert_eq!(error.kind(), ProtocolErrorKind::MalformedDocument);
}
