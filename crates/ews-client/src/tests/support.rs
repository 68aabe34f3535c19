//! Canned documents shared by the client test suites.

/// Autodiscover reply naming a display name and legacy DN only.
pub(crate) const AUTODISCOVER_REPLY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Autodiscover xmlns="http://schemas.microsoft.com/exchange/autodiscover/responseschema/2006">
  <Response xmlns="http://schemas.microsoft.com/exchange/autodiscover/outlook/responseschema/2006a">
    <User>
      <DisplayName>Grace Hopper</DisplayName>
      <LegacyDN>/o=Contoso/cn=grace</LegacyDN>
      <DeploymentId></DeploymentId>
    </User>
  </Response>
</Autodiscover>"#;

/// Autodiscover reply with no user record.
pub(crate) const AUTODISCOVER_WITHOUT_USER: &str = r#"<Autodiscover xmlns="http://schemas.microsoft.com/exchange/autodiscover/responseschema/2006"><Response xmlns="http://schemas.microsoft.com/exchange/autodiscover/outlook/responseschema/2006a"/></Autodiscover>"#;

/// Successful deletion unit.
pub(crate) const DELETE_SUCCESS: &str = r#"<m:DeleteItemResponseMessage ResponseClass="Success"><m:ResponseCode>NoError</m:ResponseCode></m:DeleteItemResponseMessage>"#;

/// Deletion unit reporting a missing item.
pub(crate) const DELETE_NOT_FOUND: &str = r#"<m:DeleteItemResponseMessage ResponseClass="Error"><m:MessageText>The specified object was not found in the store.</m:MessageText><m:ResponseCode>ErrorItemNotFound</m:ResponseCode></m:DeleteItemResponseMessage>"#;

/// Diagnostic unit returning an uptime node.
pub(crate) const DIAGNOSTIC_SUCCESS: &str = r#"<m:ExecuteDiagnosticMethodResponseMessage ResponseClass="Success"><m:ResponseCode>NoError</m:ResponseCode><m:ReturnValue><Uptime>42</Uptime></m:ReturnValue></m:ExecuteDiagnosticMethodResponseMessage>"#;
