//! Crate-level integration and BDD tests.


use time::macros::date;

use crate::codec::{DocumentReader, DocumentWriter, XmlNamespace};
use crate::dispatch::ServiceDispatcher;
use crate::pattern::{MonthlyPattern, Recurrence, RecurrenceRange};
use crate::request::{ErrorHandling, ServiceRequest};
use crate::response::ResponsePayload;
use crate::testing::{CannedTransport, soap_reply};
use crate::version::ExchangeVersion;
use crate::ProtocolError;

/// Request carrying a recurrence, answered with the recurrence echoed back.
struct RecurrenceEcho {
    recurrence: Recurrence,
}

#[derive(Debug, Default)]
struct EchoedRecurrence(Option<Recurrence>);

impl ResponsePayload for EchoedRecurrence {
    fn read_element_from_xml(&mut self, reader: &mut DocumentReader) -> Result<bool, ProtocolError> {
        if !reader.is_start_element(XmlNamespace::Types, "Recurrence") {
            return Ok(false);
        }
        self.0 = Some(Recurrence::load_from_xml(reader)?);
        Ok(true)
    }
}

impl ServiceRequest for RecurrenceEcho {
    type Payload = EchoedRecurrence;

    fn xml_element_name(&self) -> &'static str {
        "EchoRecurrence"
    }

    fn response_xml_element_name(&self) -> &'static str {
        "EchoRecurrenceResponse"
    }

    fn response_message_xml_element_name(&self) -> &'static str {
        "EchoRecurrenceResponseMessage"
    }

    fn minimum_required_version(&self) -> ExchangeVersion {
        ExchangeVersion::Exchange2007Sp1
    }

    fn error_handling(&self) -> ErrorHandling {
        ErrorHandling::ThrowOnError
    }

    fn expected_response_message_count(&self) -> usize {
        1
    }

    fn create_response_payload(&self, _index: usize) -> EchoedRecurrence {
        EchoedRecurrence::default()
    }

    fn write_elements(&self, writer: &mut DocumentWriter) -> Result<(), ProtocolError> {
        self.recurrence.write_to_xml(writer)
    }

    fn validate(&self) -> Result<(), ProtocolError> {
        self.recurrence.validate()
    }
}

#[test]
fn recurrence_travels_through_a_full_exchange() {
    let mut range = RecurrenceRange::no_end();
    range.set_start_date(date!(2025 - 03 - 01)).expect("start");
    let recurrence = Recurrence::new(MonthlyPattern::with_values(2, 15).expect("pattern"), range);

    let mut writer = DocumentWriter::new();
    recurrence.write_to_xml(&mut writer).expect("write");
    let echoed = writer.into_document().expect("document");
    let unit = format!(
        r#"<m:EchoRecurrenceResponseMessage ResponseClass="Success">{echoed}</m:EchoRecurrenceResponseMessage>"#
    );
    let transport =
        CannedTransport::new().with_reply(soap_reply("EchoRecurrenceResponse", &[unit.as_str()]));
    let dispatcher = ServiceDispatcher::new(transport, ExchangeVersion::Exchange2010);

    let responses = dispatcher
        .execute(&RecurrenceEcho {
            recurrence: recurrence.clone(),
        })
        .expect("exchange");
    let payload = responses.into_vec().into_iter().next().expect("unit").into_payload();
    assert_eq!(payload.0, Some(recurrence));

    let sent = dispatcher.transport().sent();
    assert!(sent.first().expect("sent").body().contains(
        "<t:AbsoluteMonthlyRecurrence><t:Interval>2</t:Interval><t:DayOfMonth>15</t:DayOfMonth></t:AbsoluteMonthlyRecurrence>"
    ));
}

#[test]
fn incomplete_recurrence_is_rejected_before_sending() {
    let recurrence = Recurrence::new(MonthlyPattern::new(), RecurrenceRange::no_end());
    let dispatcher = ServiceDispatcher::new(CannedTransport::new(), ExchangeVersion::Exchange2013);
    let error = dispatcher
        .execute(&RecurrenceEcho { recurrence })
        .expect_err("incomplete");
    assert!(error.to_string().contains("Interval must be set"));
    assert!(dispatcher.transport().sent().is_empty());
}
