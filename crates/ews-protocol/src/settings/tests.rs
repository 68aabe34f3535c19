//! Unit tests for the settings holder and converter registry.

use std::thread;

use rstest::{fixture, rstest};

use super::*;

const RESPONSE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Autodiscover xmlns="http://schemas.microsoft.com/exchange/autodiscover/responseschema/2006">
  <Response xmlns="http://schemas.microsoft.com/exchange/autodiscover/outlook/responseschema/2006a">
    <User>
      <DisplayName>Ada Lovelace</DisplayName>
      <LegacyDN>/o=Contoso/ou=First/cn=Recipients/cn=ada</LegacyDN>
      <AutoDiscoverSMTPAddress>ada@contoso.example</AutoDiscoverSMTPAddress>
      <DeploymentId></DeploymentId>
      <Preferences><Theme>dark</Theme></Preferences>
    </User>
    <Account><AccountType>email</AccountType></Account>
  </Response>
</Autodiscover>"#;

#[fixture]
fn user() -> OutlookUser {
    OutlookUser::from_autodiscover_response(RESPONSE).expect("parse response")
}

#[test]
fn registry_lists_the_full_catalogue() {
    let names: Vec<_> = available_settings().into_iter().collect();
    assert_eq!(
        names,
        [
            UserSettingName::UserDisplayName,
            UserSettingName::UserDN,
            UserSettingName::UserDeploymentId,
            UserSettingName::AutoDiscoverSMTPAddress,
        ]
    );
}

#[rstest]
fn loads_known_children_and_skips_the_rest(user: OutlookUser) {
    assert_eq!(
        user,
        OutlookUser::with_values(
            Some("Ada Lovelace".into()),
            Some("/o=Contoso/ou=First/cn=Recipients/cn=ada".into()),
            Some(String::new()),
            Some("ada@contoso.example".into()),
        )
    );
}

#[test]
fn empty_and_absent_values_are_indistinguishable() {
    let holder = OutlookUser::with_values(Some("Ada".into()), Some(String::new()), None, None);
    let found = convert_settings(
        &holder,
        &[
            UserSettingName::UserDisplayName,
            UserSettingName::UserDN,
            UserSettingName::UserDeploymentId,
        ],
    );
    assert_eq!(found.len(), 1);
    assert_eq!(found.get(&UserSettingName::UserDisplayName).map(String::as_str), Some("Ada"));
    assert!(!found.contains_key(&UserSettingName::UserDN));
    assert!(!found.contains_key(&UserSettingName::UserDeploymentId));
}

#[rstest]
fn only_requested_settings_are_returned(user: OutlookUser) {
    let found = convert_settings(&user, &[UserSettingName::AutoDiscoverSMTPAddress]);
    assert_eq!(found.keys().copied().collect::<Vec<_>>(), [UserSettingName::AutoDiscoverSMTPAddress]);
    assert!(convert_settings(&user, &[]).is_empty());
}

#[rstest]
fn report_lists_unavailable_settings(user: OutlookUser) {
    let report = UserSettingsReport::from_holder(
        &user,
        &[
            UserSettingName::UserDeploymentId,
            UserSettingName::UserDisplayName,
            UserSettingName::UserDeploymentId,
        ],
    );
    assert_eq!(report.get(UserSettingName::UserDisplayName), Some("Ada Lovelace"));
    assert_eq!(report.errors().len(), 1);
    let error = report.errors().first().expect("one error");
    assert_eq!(error.setting(), UserSettingName::UserDeploymentId);
    assert_eq!(error.code(), UserSettingErrorCode::SettingIsNotAvailable);
}

#[rstest]
fn reloading_discards_previous_values(user: OutlookUser) {
    let mut holder = user;
    let document = r#"<User xmlns="http://schemas.microsoft.com/exchange/autodiscover/outlook/responseschema/2006a"><DisplayName>Grace</DisplayName></User>"#;
    let mut reader = DocumentReader::parse(document).expect("parse");
    reader.advance();
    holder.load_from_xml(&mut reader).expect("load");
    assert_eq!(
        holder,
        OutlookUser::with_values(Some("Grace".into()), None, None, None)
    );
}

#[test]
fn response_without_user_is_a_shape_error() {
    let error = OutlookUser::from_autodiscover_response(
        r#"<Autodiscover xmlns="http://schemas.microsoft.com/exchange/autodiscover/responseschema/2006"/>"#,
    )
    .expect_err("no user");
    assert_eq!(error.kind(), crate::error::ProtocolErrorKind::ProtocolShape);
}

#[test]
fn registry_is_shared_across_threads() {
    let handles: Vec<_> = (0..4)
        .map(|_| thread::spawn(|| available_settings().len()))
        .collect();
    for handle in handles {
        assert_eq!(handle.join().expect("thread"), 4);
    }
}

#[test]
fn setting_names_parse_from_wire_spelling() {
    assert_eq!("UserDN".parse::<UserSettingName>().ok(), Some(UserSettingName::UserDN));
    assert_eq!(UserSettingName::AutoDiscoverSMTPAddress.to_string(), "AutoDiscoverSMTPAddress");
}

#[test]
fn autodiscover_request_names_address_and_schema() {
    let request = autodiscover_request("ada@contoso.example").expect("request");
    assert!(request.starts_with(&format!(r#"<Autodiscover xmlns="{REQUEST_SCHEMA}">"#)));
    assert!(request.contains("<EMailAddress>ada@contoso.example</EMailAddress>"));
    assert!(request.contains(XmlNamespace::OutlookResponse.uri()));
}
