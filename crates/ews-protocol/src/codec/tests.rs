//! Unit tests for the document reader and writer.

use rstest::{fixture, rstest};

use super::*;
use crate::error::ProtocolErrorKind;

const TYPES: &str = "http://schemas.microsoft.com/exchange/services/2006/types";

#[fixture]
fn pattern_document() -> String {
    format!(
        r#"<t:AbsoluteMonthlyRecurrence xmlns:t="{TYPES}">
             <t:Interval>2</t:Interval>
             <t:Unknown><t:Nested>x</t:Nested></t:Unknown>
             <t:DayOfMonth>15</t:DayOfMonth>
           </t:AbsoluteMonthlyRecurrence>"#
    )
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

#[rstest]
fn reader_resolves_prefixes_to_namespaces(pattern_document: String) {
    let mut reader = DocumentReader::parse(&pattern_document).expect("parse");
    assert_eq!(reader.advance(), NodeKind::StartElement);
    assert_eq!(reader.local_name().expect("name"), "AbsoluteMonthlyRecurrence");
    assert_eq!(reader.namespace(), Some(TYPES));
    assert!(reader.is_in_namespace(XmlNamespace::Types));
}

#[rstest]
fn reader_reads_scalar_and_rests_on_end_tag(pattern_document: String) {
    let mut reader = DocumentReader::parse(&pattern_document).expect("parse");
    reader.advance();
    reader.advance();
    assert!(reader.is_start_element(XmlNamespace::Types, "Interval"));
    let interval: u32 = reader.read_element_value().expect("interval");
    assert_eq!(interval, 2);
    assert!(reader.is_end_element(XmlNamespace::Types, "Interval"));
}

#[rstest]
fn reader_skips_nested_subtree(pattern_document: String) {
    let mut reader = DocumentReader::parse(&pattern_document).expect("parse");
    reader.advance();
    reader.advance();
    reader.skip_current_element().expect("skip interval");
    assert_eq!(reader.advance(), NodeKind::StartElement);
    assert!(!reader.is_scalar_element());
    reader.skip_current_element().expect("skip unknown");
    assert!(reader.is_end_element(XmlNamespace::Types, "Unknown"));
    reader.advance();
    assert!(reader.is_start_element(XmlNamespace::Types, "DayOfMonth"));
}

#[rstest]
fn reader_finds_descendant_from_document_root(pattern_document: String) {
    let mut reader = DocumentReader::parse(&pattern_document).expect("parse");
    let found = reader
        .read_to_descendant(XmlNamespace::Types, "DayOfMonth")
        .expect("search");
    assert!(found);
    assert_eq!(reader.read_element_text().expect("text"), "15");
}

#[rstest]
fn reader_reports_missing_descendant(pattern_document: String) {
    let mut reader = DocumentReader::parse(&pattern_document).expect("parse");
    reader.advance();
    let found = reader
        .read_to_descendant(XmlNamespace::Messages, "DayOfMonth")
        .expect("search");
    assert!(!found);
    assert!(reader.is_end_element(XmlNamespace::Types, "AbsoluteMonthlyRecurrence"));
}

#[test]
fn reader_expands_empty_elements_and_reads_attributes() {
    let mut reader = DocumentReader::parse(&format!(
        r#"<t:ItemId xmlns:t="{TYPES}" Id="AAMk" ChangeKey="CQAA"/>"#
    ))
    .expect("parse");
    reader.advance();
    assert_eq!(reader.attribute("Id"), Some("AAMk"));
    assert_eq!(reader.attribute("ChangeKey"), Some("CQAA"));
    assert_eq!(reader.attribute("xmlns"), None);
    assert_eq!(reader.read_element_text().expect("empty"), "");
    assert_eq!(reader.advance(), NodeKind::EndOfDocument);
}

#[test]
fn reader_unescapes_text() {
    let mut reader = DocumentReader::parse("<Name>Smith &amp; Jones</Name>").expect("parse");
    reader.advance();
    assert_eq!(reader.read_element_text().expect("text"), "Smith & Jones");
}

#[rstest]
#[case::trailing("<DisplayName>Ada </DisplayName>", "Ada ")]
#[case::leading("<DisplayName>  Ada</DisplayName>", "  Ada")]
#[case::indented_children("<A>\n  <B>x</B>\n</A>", "")]
fn reader_keeps_spaces_inside_values(#[case] document: &str, #[case] expected: &str) {
    let mut reader = DocumentReader::parse(document).expect("parse");
    reader.advance();
    if expected.is_empty() {
        assert_eq!(reader.advance(), NodeKind::StartElement);
        assert_eq!(reader.local_name().expect("name"), "B");
    } else {
        assert_eq!(reader.read_element_text().expect("text"), expected);
    }
}

#[test]
fn reader_resolves_attribute_namespaces() {
    let mut reader = DocumentReader::parse(&format!(
        r#"<P xmlns:xsi="{}" xsi:type="t:Flag" Name="w3wp"/>"#,
        XmlNamespace::SchemaInstance.uri()
    ))
    .expect("parse");
    reader.advance();
    assert_eq!(reader.attribute("Name"), Some("w3wp"));
    assert_eq!(reader.attribute("type"), None);
}

#[test]
fn reader_rejects_value_with_child_elements() {
    let mut reader = DocumentReader::parse("<A><B>1</B></A>").expect("parse");
    reader.advance();
    let error = reader.read_element_text().expect_err("has children");
    assert_eq!(error.kind(), ProtocolErrorKind::MalformedDocument);
}

#[test]
fn reader_reports_unparseable_value() {
    let mut reader = DocumentReader::parse("<DayOfMonth>first</DayOfMonth>").expect("parse");
    reader.advance();
    let error = reader.read_element_value::<u32>().expect_err("not a number");
    assert!(matches!(
        error,
        crate::ProtocolError::InvalidFieldValue { ref field, ref value }
            if field == "DayOfMonth" && value == "first"
    ));
}

#[rstest]
#[case::mismatched_tags("<A></B>")]
#[case::undeclared_prefix("<x:A></x:A>")]
fn reader_rejects_malformed_documents(#[case] document: &str) {
    let error = DocumentReader::parse(document).expect_err("malformed");
    assert_eq!(error.kind(), ProtocolErrorKind::MalformedDocument);
}

#[test]
fn reader_captures_inner_tokens() {
    let mut reader = DocumentReader::parse("<Outer><Inner a=\"1\">v</Inner></Outer>").expect("parse");
    reader.advance();
    let inner = reader.read_inner_tokens().expect("tokens");
    assert_eq!(
        inner,
        vec![
            XmlToken::Start {
                name: XmlName::new(None, "Inner"),
                attributes: vec![(XmlName::new(None, "a"), "1".into())],
            },
            XmlToken::text("v"),
            XmlToken::end(XmlName::new(None, "Inner")),
        ]
    );
    assert_eq!(reader.local_name().expect("name"), "Outer");
    assert_eq!(reader.node_kind(), NodeKind::EndElement);
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

#[test]
fn writer_emits_prefixed_elements_with_attributes() {
    let mut writer = DocumentWriter::new();
    writer
        .write_start_element(XmlNamespace::Messages, "DeleteItem")
        .expect("start");
    writer.write_attribute("DeleteType", "HardDelete").expect("attr");
    writer
        .write_element_value(XmlNamespace::Types, "Value", "a<b")
        .expect("value");
    writer.write_end_element().expect("end");
    let xml = writer.into_document().expect("document");
    assert_eq!(
        xml,
        r#"<m:DeleteItem DeleteType="HardDelete"><t:Value>a&lt;b</t:Value></m:DeleteItem>"#
    );
}

#[test]
fn writer_collapses_immediately_closed_elements() {
    let mut writer = DocumentWriter::new();
    writer
        .write_start_element(XmlNamespace::Types, "ItemId")
        .expect("start");
    writer.write_attribute("Id", "AAMk").expect("attr");
    writer.write_end_element().expect("end");
    assert_eq!(writer.into_document().expect("document"), r#"<t:ItemId Id="AAMk"/>"#);
}

#[test]
fn writer_rejects_attribute_after_content() {
    let mut writer = DocumentWriter::new();
    writer
        .write_start_element(XmlNamespace::Types, "A")
        .expect("start");
    writer.write_value("text").expect("value");
    let error = writer.write_attribute("late", 1).expect_err("too late");
    assert_eq!(error.kind(), ProtocolErrorKind::WriteFailed);
}

#[test]
fn writer_rejects_unclosed_document() {
    let mut writer = DocumentWriter::new();
    writer
        .write_start_element(XmlNamespace::Types, "A")
        .expect("start");
    assert_eq!(writer.depth(), 1);
    let error = writer.into_document().expect_err("unclosed");
    assert_eq!(error.kind(), ProtocolErrorKind::WriteFailed);
}

#[test]
fn writer_replays_captured_tokens() {
    let mut reader =
        DocumentReader::parse(&format!(r#"<P><t:Flag xmlns:t="{TYPES}">on</t:Flag><Free/></P>"#))
            .expect("parse");
    reader.advance();
    let tokens = reader.read_inner_tokens().expect("tokens");

    let mut writer = DocumentWriter::new();
    writer.write_tokens(&tokens).expect("replay");
    assert_eq!(
        writer.into_document().expect("document"),
        format!(r#"<t:Flag xmlns:t="{TYPES}">on</t:Flag><Free/>"#)
    );
}

#[test]
fn replayed_fragment_parses_on_its_own() {
    let mut reader = DocumentReader::parse(&format!(
        r#"<m:ReturnValue xmlns:m="urn:m" xmlns:t="{TYPES}"><t:Info><t:Count>1</t:Count></t:Info></m:ReturnValue>"#
    ))
    .expect("parse");
    reader.advance();
    let tokens = reader.read_inner_tokens().expect("tokens");

    let mut writer = DocumentWriter::new();
    writer.write_tokens(&tokens).expect("replay");
    let xml = writer.into_document().expect("document");
    assert_eq!(xml.matches("xmlns:t=").count(), 1, "{xml}");

    let mut replayed = DocumentReader::parse(&xml).expect("reparse");
    assert!(replayed.read_to_descendant(XmlNamespace::Types, "Count").expect("search"));
    assert_eq!(replayed.read_element_value::<u32>().expect("count"), 1);
}

#[test]
fn replay_reuses_declarations_in_scope() {
    let tokens = [
        XmlToken::start(XmlName::qualified(XmlNamespace::Types, "Flag")),
        XmlToken::end(XmlName::qualified(XmlNamespace::Types, "Flag")),
    ];
    let mut writer = DocumentWriter::new();
    writer
        .write_start_element(XmlNamespace::Messages, "Parameter")
        .expect("start");
    writer
        .write_namespace_declaration(XmlNamespace::Types)
        .expect("declare");
    writer.write_tokens(&tokens).expect("replay");
    writer.write_end_element().expect("end");
    assert_eq!(
        writer.into_document().expect("document"),
        format!(r#"<m:Parameter xmlns:t="{TYPES}"><t:Flag/></m:Parameter>"#)
    );
}

#[rstest]
#[case::schema_instance(XmlNamespace::SchemaInstance.uri(), "xsi:type")]
#[case::unknown_namespace("urn:vendor", "ns0:type")]
fn replay_keeps_attribute_namespaces(#[case] uri: &str, #[case] qualified: &str) {
    let mut reader = DocumentReader::parse(&format!(
        r#"<Outer><P xmlns:v="{uri}" v:type="t:Flag" Name="w3wp"/></Outer>"#
    ))
    .expect("parse");
    reader.advance();
    let tokens = reader.read_inner_tokens().expect("tokens");

    let mut writer = DocumentWriter::new();
    writer.write_tokens(&tokens).expect("replay");
    let xml = writer.into_document().expect("document");
    assert!(xml.contains(&format!(r#"{qualified}="t:Flag""#)), "{xml}");

    let mut reparsed = DocumentReader::parse(&xml).expect("reparse");
    reparsed.advance();
    let outer = reparsed.read_outer_tokens().expect("tokens");
    let attributes = match outer.first() {
        Some(XmlToken::Start { attributes, .. }) => attributes.clone(),
        other => panic!("expected a start tag, got {other:?}"),
    };
    assert!(attributes.contains(&(
        XmlName::new(Some(uri.to_owned()), "type"),
        "t:Flag".to_owned()
    )));
    assert!(attributes.contains(&(XmlName::new(None, "Name"), "w3wp".to_owned())));
}

#[test]
fn replay_writes_xml_prefix_without_declaring_it() {
    let mut reader =
        DocumentReader::parse(r#"<F><faultstring xml:lang="en-US">bad</faultstring></F>"#)
            .expect("parse");
    reader.advance();
    let tokens = reader.read_inner_tokens().expect("tokens");

    let mut writer = DocumentWriter::new();
    writer.write_tokens(&tokens).expect("replay");
    assert_eq!(
        writer.into_document().expect("document"),
        r#"<faultstring xml:lang="en-US">bad</faultstring>"#
    );
}

#[test]
fn replay_resets_default_namespace_for_unqualified_children() {
    let tokens = [
        XmlToken::start(XmlName::new(Some("urn:vendor".to_owned()), "Outer")),
        XmlToken::start(XmlName::new(None, "Inner")),
        XmlToken::end(XmlName::new(None, "Inner")),
        XmlToken::end(XmlName::new(Some("urn:vendor".to_owned()), "Outer")),
    ];
    let mut writer = DocumentWriter::new();
    writer.write_tokens(&tokens).expect("replay");
    assert_eq!(
        writer.into_document().expect("document"),
        r#"<Outer xmlns="urn:vendor"><Inner xmlns=""/></Outer>"#
    );
}

#[test]
fn namespace_lookup_by_uri() {
    assert_eq!(XmlNamespace::from_uri(TYPES), Some(XmlNamespace::Types));
    assert_eq!(XmlNamespace::from_uri("urn:unknown"), None);
}
