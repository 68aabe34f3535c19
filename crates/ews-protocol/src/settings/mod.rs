//! Autodiscover settings holder and converter registry.
//!
//! [`OutlookUser`] is populated from the `User` element of a plain-old-XML
//! autodiscover response. Callers never read its attributes directly; they
//! ask [`convert_settings`] for a set of [`UserSettingName`]s and receive only
//! the ones the holder can supply. The registry behind that call is built
//! once, on first use, and shared read-only afterwards.

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use strum::{Display, EnumString};
use tracing::debug;

use crate::codec::{DocumentReader, DocumentWriter, NodeKind, XmlName, XmlNamespace, XmlToken};
use crate::error::ProtocolError;

const SETTINGS_TARGET: &str = "ews_protocol::settings";

const REQUEST_SCHEMA: &str =
    "http://schemas.microsoft.com/exchange/autodiscover/outlook/requestschema/2006";

/// Identifies one user setting an autodiscover holder may be able to supply.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString,
)]
pub enum UserSettingName {
    /// The user's display name.
    UserDisplayName,
    /// The user's legacy distinguished name.
    UserDN,
    /// The deployment identifier of the user's organisation.
    UserDeploymentId,
    /// The SMTP address autodiscover resolved for the user.
    AutoDiscoverSMTPAddress,
}

/// Settings discovered for one user.
///
/// Every attribute is optional; absent and empty values are reported the
/// same way by [`convert_settings`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutlookUser {
    display_name: Option<String>,
    legacy_dn: Option<String>,
    deployment_id: Option<String>,
    autodiscover_smtp_address: Option<String>,
}

impl OutlookUser {
    /// Creates an empty holder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a holder from explicit values.
    #[must_use]
    pub fn with_values(
        display_name: Option<String>,
        legacy_dn: Option<String>,
        deployment_id: Option<String>,
        autodiscover_smtp_address: Option<String>,
    ) -> Self {
        Self {
            display_name,
            legacy_dn,
            deployment_id,
            autodiscover_smtp_address,
        }
    }

    fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    fn legacy_dn(&self) -> Option<&str> {
        self.legacy_dn.as_deref()
    }

    fn deployment_id(&self) -> Option<&str> {
        self.deployment_id.as_deref()
    }

    fn autodiscover_smtp_address(&self) -> Option<&str> {
        self.autodiscover_smtp_address.as_deref()
    }

    /// Re-populates the holder from the `User` element under the cursor,
    /// leaving the cursor on its closing tag. Previous values are discarded
    /// and unknown children are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedDocument`] when the element is never
    /// closed or a known child holds nested elements.
    pub fn load_from_xml(&mut self, reader: &mut DocumentReader) -> Result<(), ProtocolError> {
        *self = Self::new();
        loop {
            match reader.advance() {
                NodeKind::StartElement if reader.is_in_namespace(XmlNamespace::OutlookResponse) => {
                    let name = reader.local_name()?.to_owned();
                    let slot = match name.as_str() {
                        "DisplayName" => &mut self.display_name,
                        "LegacyDN" => &mut self.legacy_dn,
                        "DeploymentId" => &mut self.deployment_id,
                        "AutoDiscoverSMTPAddress" => &mut self.autodiscover_smtp_address,
                        _ => {
                            reader.skip_current_element()?;
                            continue;
                        }
                    };
                    *slot = Some(reader.read_element_text()?);
                }
                NodeKind::StartElement => reader.skip_current_element()?,
                NodeKind::EndElement
                    if reader.is_end_element(XmlNamespace::OutlookResponse, "User") =>
                {
                    return Ok(());
                }
                NodeKind::EndOfDocument => {
                    return Err(ProtocolError::malformed("element 'User' is never closed"));
                }
                NodeKind::EndElement | NodeKind::Text => {}
            }
        }
    }

    /// Parses a complete autodiscover response document.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ProtocolShape`] when the document has no
    /// `User` element, or any parse error.
    pub fn from_autodiscover_response(document: &str) -> Result<Self, ProtocolError> {
        let mut reader = DocumentReader::parse(document)?;
        if !reader.read_to_descendant(XmlNamespace::OutlookResponse, "User")? {
            return Err(ProtocolError::shape(
                "Autodiscover",
                "response does not contain a User element",
            ));
        }
        let mut user = Self::new();
        user.load_from_xml(&mut reader)?;
        debug!(target: SETTINGS_TARGET, "loaded autodiscover user settings");
        Ok(user)
    }
}

type Converter = fn(&OutlookUser) -> Option<&str>;

static CONVERTERS: Lazy<BTreeMap<UserSettingName, Converter>> = Lazy::new(|| {
    BTreeMap::from([
        (
            UserSettingName::UserDisplayName,
            OutlookUser::display_name as Converter,
        ),
        (UserSettingName::UserDN, OutlookUser::legacy_dn as Converter),
        (
            UserSettingName::UserDeploymentId,
            OutlookUser::deployment_id as Converter,
        ),
        (
            UserSettingName::AutoDiscoverSMTPAddress,
            OutlookUser::autodiscover_smtp_address as Converter,
        ),
    ])
});

/// Returns every setting an [`OutlookUser`] can ever supply.
#[must_use]
pub fn available_settings() -> BTreeSet<UserSettingName> {
    CONVERTERS.keys().copied().collect()
}

/// Extracts the requested settings from `holder`.
///
/// Settings the holder lacks, holds as an empty string, or the registry does
/// not know are omitted from the result.
///
/// # Example
///
/// ```
/// use ews_protocol::settings::{OutlookUser, UserSettingName, convert_settings};
///
/// let user = OutlookUser::with_values(Some("Ada".into()), Some(String::new()), None, None);
/// let found = convert_settings(
///     &user,
///     &[UserSettingName::UserDisplayName, UserSettingName::UserDN],
/// );
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[&UserSettingName::UserDisplayName], "Ada");
/// ```
#[must_use]
pub fn convert_settings(
    holder: &OutlookUser,
    requested: &[UserSettingName],
) -> BTreeMap<UserSettingName, String> {
    CONVERTERS
        .iter()
        .filter(|(name, _)| requested.contains(name))
        .filter_map(|(name, convert)| {
            convert(holder)
                .filter(|value| !value.is_empty())
                .map(|value| (*name, value.to_owned()))
        })
        .collect()
}

/// Error codes attached to settings that could not be supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum UserSettingErrorCode {
    /// The holder has no value for the setting.
    SettingIsNotAvailable,
}

/// A requested setting the report could not supply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSettingError {
    setting: UserSettingName,
    code: UserSettingErrorCode,
}

impl UserSettingError {
    /// Returns the setting that was requested.
    #[must_use]
    pub const fn setting(&self) -> UserSettingName {
        self.setting
    }

    /// Returns the error code.
    #[must_use]
    pub const fn code(&self) -> UserSettingErrorCode {
        self.code
    }
}

/// Answer to a user-settings query: the values found plus one error per
/// requested setting that was not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSettingsReport {
    settings: BTreeMap<UserSettingName, String>,
    errors: Vec<UserSettingError>,
}

impl UserSettingsReport {
    /// Runs the converter registry over `holder` for `requested`.
    #[must_use]
    pub fn from_holder(holder: &OutlookUser, requested: &[UserSettingName]) -> Self {
        let settings = convert_settings(holder, requested);
        let mut errors = Vec::new();
        for setting in requested {
            let reported = errors
                .iter()
                .any(|error: &UserSettingError| error.setting == *setting);
            if !settings.contains_key(setting) && !reported {
                errors.push(UserSettingError {
                    setting: *setting,
                    code: UserSettingErrorCode::SettingIsNotAvailable,
                });
            }
        }
        Self { settings, errors }
    }

    /// Returns the value of a supplied setting.
    #[must_use]
    pub fn get(&self, setting: UserSettingName) -> Option<&str> {
        self.settings.get(&setting).map(String::as_str)
    }

    /// Returns every supplied setting.
    #[must_use]
    pub const fn settings(&self) -> &BTreeMap<UserSettingName, String> {
        &self.settings
    }

    /// Returns the settings that could not be supplied, in request order.
    #[must_use]
    pub fn errors(&self) -> &[UserSettingError] {
        &self.errors
    }
}

/// Writes the plain-old-XML autodiscover request for `email_address`.
///
/// # Errors
///
/// Returns [`ProtocolError::WriteFailed`] if the document cannot be written.
pub fn autodiscover_request(email_address: &str) -> Result<String, ProtocolError> {
    let element = |name: &str| XmlName::new(Some(REQUEST_SCHEMA.to_owned()), name);
    let mut writer = DocumentWriter::new();
    writer.write_tokens(&[
        XmlToken::start(element("Autodiscover")),
        XmlToken::start(element("Request")),
        XmlToken::start(element("EMailAddress")),
        XmlToken::text(email_address),
        XmlToken::end(element("EMailAddress")),
        XmlToken::start(element("AcceptableResponseSchema")),
        XmlToken::text(XmlNamespace::OutlookResponse.uri()),
        XmlToken::end(element("AcceptableResponseSchema")),
        XmlToken::end(element("Request")),
        XmlToken::end(element("Autodiscover")),
    ])?;
    writer.into_document()
}
