//! Events recorded by the API and delivered through hook notifications.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::api::{Action, Mango};
use crate::error::{Error, Result};
use crate::model::common::UnixTime;

/// Everything a hook can subscribe to.
///
/// Unrecognized wire values decode as [`EventType::Unknown`] so new event
/// kinds never break notification parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    PayinNormalCreated,
    PayinNormalSucceeded,
    PayinNormalFailed,
    PayoutNormalCreated,
    PayoutNormalSucceeded,
    PayoutNormalFailed,
    TransferNormalCreated,
    TransferNormalSucceeded,
    TransferNormalFailed,
    PayinRefundCreated,
    PayinRefundSucceeded,
    PayinRefundFailed,
    PayoutRefundCreated,
    PayoutRefundSucceeded,
    PayoutRefundFailed,
    TransferRefundCreated,
    TransferRefundSucceeded,
    TransferRefundFailed,
    PayinRepudiationCreated,
    PayinRepudiationSucceeded,
    PayinRepudiationFailed,
    KycCreated,
    KycSucceeded,
    KycFailed,
    KycValidationAsked,
    KycOutdated,
    DisputeDocumentCreated,
    DisputeDocumentValidationAsked,
    DisputeDocumentSucceeded,
    DisputeDocumentFailed,
    DisputeCreated,
    DisputeSubmitted,
    DisputeActionRequired,
    DisputeFurtherActionRequired,
    DisputeClosed,
    DisputeSentToBank,
    TransferSettlementCreated,
    TransferSettlementSucceeded,
    TransferSettlementFailed,
    MandateCreated,
    MandateFailed,
    MandateActivated,
    MandateSubmitted,
    #[serde(other)]
    #[default]
    Unknown,
}

/// One entry of the event stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Event {
    /// Id of the resource the event refers to. The spelling is the
    /// service's, not ours.
    #[serde(rename = "RessourceId")]
    pub resource_id: String,
    pub event_type: EventType,
    pub date: UnixTime,
}

impl Event {
    /// Rebuilds the event carried by a hook notification callback.
    ///
    /// Notifications arrive as plain GETs with the event spread over the
    /// query string. Both the service's `RessourceId` spelling and the
    /// conventional `ResourceId` are accepted, the former winning when
    /// both appear.
    pub fn from_notification_url(url: &Url) -> Result<Event> {
        let mut event_type = None;
        let mut resource_id = None;
        let mut fallback_resource_id = None;
        let mut date = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "EventType" => event_type = Some(value.into_owned()),
                "RessourceId" => resource_id = Some(value.into_owned()),
                "ResourceId" => fallback_resource_id = Some(value.into_owned()),
                "Date" => date = Some(value.into_owned()),
                _ => {}
            }
        }
        let (Some(raw_type), Some(resource_id), Some(raw_date)) =
            (event_type, resource_id.or(fallback_resource_id), date)
        else {
            return Err(Error::Validation(
                "notification is missing EventType, RessourceId or Date".into(),
            ));
        };
        let timestamp: i64 = raw_date
            .parse()
            .map_err(|_| Error::Validation(format!("notification Date is not a timestamp: {raw_date}")))?;
        // The catch-all variant makes this deserialization infallible.
        let event_type: EventType =
            serde_json::from_value(serde_json::Value::String(raw_type)).unwrap_or_default();
        Ok(Event {
            resource_id,
            event_type,
            date: UnixTime(timestamp),
        })
    }
}

impl Mango {
    /// Lists every event recorded for the client account.
    pub async fn events(&self) -> Result<Vec<Event>> {
        self.dispatch_into(Action::FetchAllEvents, None).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_event_type_wire_names() {
        let encoded = serde_json::to_string(&EventType::PayinNormalCreated).unwrap();
        assert_eq!(encoded, "\"PAYIN_NORMAL_CREATED\"");
        let decoded: EventType = serde_json::from_str("\"KYC_VALIDATION_ASKED\"").unwrap();
        assert_eq!(decoded, EventType::KycValidationAsked);
        let decoded: EventType = serde_json::from_str("\"MANDATE_FAILED\"").unwrap();
        assert_eq!(decoded, EventType::MandateFailed);
    }

    #[test]
    fn test_unrecognized_event_type_decodes_as_unknown() {
        let decoded: EventType = serde_json::from_str("\"INSTANT_PAYMENT_CREATED\"").unwrap();
        assert_eq!(decoded, EventType::Unknown);
    }

    #[test]
    fn test_event_decodes_reply() {
        let event: Event = serde_json::from_value(json!({
            "RessourceId": "PI942572",
            "EventType": "PAYIN_NORMAL_SUCCEEDED",
            "Date": 1421175052
        }))
        .unwrap();
        assert_eq!(event.resource_id, "PI942572");
        assert_eq!(event.event_type, EventType::PayinNormalSucceeded);
        assert_eq!(event.date, UnixTime(1421175052));
    }

    #[test]
    fn test_notification_url_parses() {
        let url = Url::parse(
            "https://example.com/callback?EventType=PAYIN_NORMAL_SUCCEEDED&RessourceId=PI942572&Date=1421175052",
        )
        .unwrap();
        let event = Event::from_notification_url(&url).unwrap();
        assert_eq!(event.event_type, EventType::PayinNormalSucceeded);
        assert_eq!(event.resource_id, "PI942572");
        assert_eq!(event.date, UnixTime(1421175052));
    }

    #[test]
    fn test_notification_url_accepts_conventional_spelling() {
        let url = Url::parse("https://example.com/cb?EventType=KYC_CREATED&ResourceId=DOC1&Date=7").unwrap();
        assert_eq!(Event::from_notification_url(&url).unwrap().resource_id, "DOC1");

        // The service spelling wins when both are present.
        let url = Url::parse(
            "https://example.com/cb?EventType=KYC_CREATED&ResourceId=DOC1&RessourceId=DOC2&Date=7",
        )
        .unwrap();
        assert_eq!(Event::from_notification_url(&url).unwrap().resource_id, "DOC2");
    }

    #[test]
    fn test_notification_url_rejects_missing_fields() {
        let url = Url::parse("https://example.com/cb?EventType=KYC_CREATED&Date=7").unwrap();
        assert!(matches!(Event::from_notification_url(&url), Err(Error::Validation(_))));

        let url = Url::parse("https://example.com/cb?EventType=KYC_CREATED&RessourceId=D&Date=soon").unwrap();
        match Event::from_notification_url(&url) {
            Err(Error::Validation(message)) => assert!(message.contains("soon")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
