//! Behaviour-driven tests for the client operations.

use std::str::FromStr;

use ews_config::Config;
use ews_protocol::requests::{DeleteMode, ItemId};
use ews_protocol::settings::{UserSettingName, UserSettingsReport};
use ews_protocol::testing::{CannedTransport, soap_reply};
use ews_protocol::{ErrorHandling, ServiceResult};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use super::support::{AUTODISCOVER_REPLY, DELETE_NOT_FOUND, DELETE_SUCCESS, DIAGNOSTIC_SUCCESS};
use crate::{ClientError, ExchangeClient};

/// A quoted string value from a Gherkin feature file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct QuotedString(String);

impl FromStr for QuotedString {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim_matches('"').to_owned()))
    }
}

impl QuotedString {
    fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Default)]
struct ClientWorld {
    server_version: Option<String>,
    transport: Option<CannedTransport>,
    client: Option<ExchangeClient<CannedTransport>>,
    results: Option<Result<Vec<ServiceResult>, ClientError>>,
    report: Option<UserSettingsReport>,
    diagnostic: Option<Result<String, ClientError>>,
}

#[fixture]
fn world() -> ClientWorld {
    ClientWorld::default()
}

impl ClientWorld {
    fn client(&mut self) -> &ExchangeClient<CannedTransport> {
        if self.client.is_none() {
            let version = self.server_version.clone().expect("server version must be set");
            let transport = self.transport.take().unwrap_or_default();
            let config = Config::default().with_server_version(version);
            self.client = Some(ExchangeClient::from_config(&config, transport).expect("client"));
        }
        self.client.as_ref().expect("client was just built")
    }

    fn queue(&mut self, reply: String) {
        let transport = self.transport.take().unwrap_or_default();
        self.transport = Some(transport.with_reply(reply));
    }
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given("a client configured for {version}")]
fn given_client(world: &mut ClientWorld, version: QuotedString) {
    world.server_version = Some(version.as_str().to_owned());
}

#[given("the server will confirm one deletion and miss the other")]
fn given_delete_reply(world: &mut ClientWorld) {
    world.queue(soap_reply(
        "DeleteItemResponse",
        &[DELETE_SUCCESS, DELETE_NOT_FOUND],
    ));
}

#[given("the server will answer the diagnostic call")]
fn given_diagnostic_reply(world: &mut ClientWorld) {
    world.queue(soap_reply(
        "ExecuteDiagnosticMethodResponse",
        &[DIAGNOSTIC_SUCCESS],
    ));
}

#[given("autodiscover knows the user's display name and legacy DN")]
fn given_autodiscover_reply(world: &mut ClientWorld) {
    world.queue(AUTODISCOVER_REPLY.to_owned());
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when("two items are deleted collecting errors")]
fn when_delete_collecting(world: &mut ClientWorld) {
    let outcome = world
        .client()
        .delete_items(
            vec![ItemId::new("AAMk1"), ItemId::new("AAMk2")],
            DeleteMode::SoftDelete,
            ErrorHandling::ReturnErrors,
        )
        .map(|responses| responses.iter().map(|unit| unit.result()).collect());
    world.results = Some(outcome);
}

#[when("two items are deleted stopping on the first error")]
fn when_delete_throwing(world: &mut ClientWorld) {
    let outcome = world
        .client()
        .delete_items(
            vec![ItemId::new("AAMk1"), ItemId::new("AAMk2")],
            DeleteMode::SoftDelete,
            ErrorHandling::ThrowOnError,
        )
        .map(|responses| responses.iter().map(|unit| unit.result()).collect());
    world.results = Some(outcome);
}

#[when("the diagnostic method {verb} is run")]
fn when_diagnostic(world: &mut ClientWorld, verb: QuotedString) {
    let outcome = world
        .client()
        .execute_diagnostic_method(verb.as_str(), "<Server/>")
        .and_then(|result| result.to_xml().map_err(ClientError::from));
    world.diagnostic = Some(outcome);
}

#[when("the display name and deployment id are requested")]
fn when_settings_requested(world: &mut ClientWorld) {
    let report = world
        .client()
        .user_settings(
            "grace@contoso.example",
            &[UserSettingName::UserDisplayName, UserSettingName::UserDeploymentId],
        )
        .expect("user settings");
    world.report = Some(report);
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then("the results are {results}")]
fn then_results(world: &mut ClientWorld, results: QuotedString) {
    let expected: Vec<ServiceResult> = results
        .as_str()
        .split_whitespace()
        .map(|word| word.parse().expect("known result"))
        .collect();
    match world.results.as_ref().expect("deletion must have run") {
        Ok(found) => assert_eq!(found, &expected),
        Err(error) => panic!("deletion failed: {error}"),
    }
}

#[then("the deletion fails at item {index}")]
fn then_delete_fails(world: &mut ClientWorld, index: usize) {
    match world.results.as_ref().expect("deletion must have run") {
        Err(ClientError::Protocol(ews_protocol::ProtocolError::ServiceFault {
            index: found, ..
        })) => assert_eq!(*found, index),
        other => panic!("expected a service fault, got {other:?}"),
    }
}

#[then("the diagnostic returns {xml}")]
fn then_diagnostic_returns(world: &mut ClientWorld, xml: QuotedString) {
    match world.diagnostic.as_ref().expect("diagnostic must have run") {
        Ok(found) => assert_eq!(found, xml.as_str()),
        Err(error) => panic!("diagnostic failed: {error}"),
    }
}

#[then("the diagnostic is refused as too new for the server")]
fn then_diagnostic_refused(world: &mut ClientWorld) {
    match world.diagnostic.as_ref().expect("diagnostic must have run") {
        Err(ClientError::Protocol(error)) => assert_eq!(
            error.kind(),
            ews_protocol::ProtocolErrorKind::VersionIncompatible
        ),
        other => panic!("expected a version refusal, got {other:?}"),
    }
    assert!(world.client().dispatcher().transport().sent().is_empty());
}

#[then("the report gives the display name {name}")]
fn then_report_name(world: &mut ClientWorld, name: QuotedString) {
    let report = world.report.as_ref().expect("report must exist");
    assert_eq!(
        report.get(UserSettingName::UserDisplayName),
        Some(name.as_str())
    );
}

#[then("the report lists the deployment id as unavailable")]
fn then_report_missing(world: &mut ClientWorld) {
    let report = world.report.as_ref().expect("report must exist");
    let missing: Vec<_> = report.errors().iter().map(|error| error.setting()).collect();
    assert_eq!(missing, [UserSettingName::UserDeploymentId]);
}

#[scenario(path = "tests/features/client_operations.feature")]
fn client_operations_behaviour(world: ClientWorld) {
    let _ = world;
}
