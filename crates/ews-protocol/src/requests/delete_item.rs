use strum::{Display, EnumString};

use crate::codec::{DocumentWriter, XmlNamespace};
use crate::error::ProtocolError;
use crate::request::{ErrorHandling, ServiceRequest};
use crate::version::ExchangeVersion;

/// How deleted items are disposed of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
pub enum DeleteMode {
    /// Removed permanently.
    HardDelete,
    /// Moved to the dumpster.
    SoftDelete,
    /// Moved to the Deleted Items folder.
    #[default]
    MoveToDeletedItems,
}

/// Whether deleting a meeting notifies its attendees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum SendCancellationsMode {
    /// Send no cancellations.
    SendToNone,
    /// Send cancellations without keeping a copy.
    SendOnlyToAll,
    /// Send cancellations and keep a copy in Sent Items.
    SendToAllAndSaveCopy,
}

/// Which occurrences of a recurring task a deletion affects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum AffectedTaskOccurrence {
    /// Every occurrence.
    AllOccurrences,
    /// Only the occurrence identified.
    SpecifiedOccurrenceOnly,
}

/// Identifier of one mailbox item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemId {
    id: String,
    change_key: Option<String>,
}

impl ItemId {
    /// Creates an identifier without a change key.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            change_key: None,
        }
    }

    /// Attaches the change key of the item version being targeted.
    #[must_use]
    pub fn with_change_key(mut self, change_key: impl Into<String>) -> Self {
        self.change_key = Some(change_key.into());
        self
    }

    /// Returns the identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the change key, if any.
    #[must_use]
    pub fn change_key(&self) -> Option<&str> {
        self.change_key.as_deref()
    }
}

/// Deletes items; the reply holds one response unit per item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteItemRequest {
    item_ids: Vec<ItemId>,
    delete_mode: DeleteMode,
    send_cancellations: Option<SendCancellationsMode>,
    affected_task_occurrences: Option<AffectedTaskOccurrence>,
    error_handling: ErrorHandling,
}

impl DeleteItemRequest {
    /// Creates a request for `item_ids` under the given error policy.
    #[must_use]
    pub const fn new(item_ids: Vec<ItemId>, error_handling: ErrorHandling) -> Self {
        Self {
            item_ids,
            delete_mode: DeleteMode::MoveToDeletedItems,
            send_cancellations: None,
            affected_task_occurrences: None,
            error_handling,
        }
    }

    /// Sets the disposal mode.
    #[must_use]
    pub const fn with_delete_mode(mut self, mode: DeleteMode) -> Self {
        self.delete_mode = mode;
        self
    }

    /// Sets the meeting cancellation behaviour.
    #[must_use]
    pub const fn with_send_cancellations(mut self, mode: SendCancellationsMode) -> Self {
        self.send_cancellations = Some(mode);
        self
    }

    /// Sets which task occurrences are affected.
    #[must_use]
    pub const fn with_affected_task_occurrences(mut self, scope: AffectedTaskOccurrence) -> Self {
        self.affected_task_occurrences = Some(scope);
        self
    }

    /// Returns the targeted items.
    #[must_use]
    pub fn item_ids(&self) -> &[ItemId] {
        &self.item_ids
    }

    /// Returns the disposal mode.
    #[must_use]
    pub const fn delete_mode(&self) -> DeleteMode {
        self.delete_mode
    }
}

impl ServiceRequest for DeleteItemRequest {
    type Payload = ();

    fn xml_element_name(&self) -> &'static str {
        "DeleteItem"
    }

    fn response_xml_element_name(&self) -> &'static str {
        "DeleteItemResponse"
    }

    fn response_message_xml_element_name(&self) -> &'static str {
        "DeleteItemResponseMessage"
    }

    fn minimum_required_version(&self) -> ExchangeVersion {
        ExchangeVersion::Exchange2007Sp1
    }

    fn error_handling(&self) -> ErrorHandling {
        self.error_handling
    }

    fn expected_response_message_count(&self) -> usize {
        self.item_ids.len()
    }

    fn create_response_payload(&self, _index: usize) {}

    fn write_attributes(&self, writer: &mut DocumentWriter) -> Result<(), ProtocolError> {
        writer.write_attribute("DeleteType", self.delete_mode)?;
        if let Some(mode) = self.send_cancellations {
            writer.write_attribute("SendMeetingCancellations", mode)?;
        }
        if let Some(scope) = self.affected_task_occurrences {
            writer.write_attribute("AffectedTaskOccurrences", scope)?;
        }
        Ok(())
    }

    fn write_elements(&self, writer: &mut DocumentWriter) -> Result<(), ProtocolError> {
        writer.write_start_element(XmlNamespace::Messages, "ItemIds")?;
        for item in &self.item_ids {
            writer.write_start_element(XmlNamespace::Types, "ItemId")?;
            writer.write_attribute("Id", &item.id)?;
            if let Some(change_key) = &item.change_key {
                writer.write_attribute("ChangeKey", change_key)?;
            }
            writer.write_end_element()?;
        }
        writer.write_end_element()
    }

    fn validate(&self) -> Result<(), ProtocolError> {
        if self.item_ids.is_empty() {
            return Err(ProtocolError::validation("ItemIds must not be empty"));
        }
        if let Some(position) = self.item_ids.iter().position(|item| item.id.trim().is_empty()) {
            return Err(ProtocolError::validation(format!(
                "ItemIds[{position}] has an empty Id"
            )));
        }
        Ok(())
    }
}
