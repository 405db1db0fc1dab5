use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::attendance::{AttendanceRecord, ScanAction};

/// Label used when a scan event arrives without an action.
pub const DEFAULT_SCAN_LABEL: &str = "Scanned";

/// Payload of a `barcode_scanned` push message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScanEvent {
    #[schema(example = "23BCA041")]
    pub barcode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<ScanRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScanRecord {
    #[schema(example = "Walk-In")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(flatten)]
    pub details: AttendanceRecord,
}

impl ScanEvent {
    pub fn new(barcode: impl Into<String>, action: ScanAction, details: AttendanceRecord) -> Self {
        ScanEvent {
            barcode: barcode.into(),
            record: Some(ScanRecord {
                action: Some(action.to_string()),
                details,
            }),
        }
    }

    /// The scan action, or [`DEFAULT_SCAN_LABEL`] when the sender left it out.
    pub fn action_label(&self) -> &str {
        self.record
            .as_ref()
            .and_then(|r| r.action.as_deref())
            .filter(|a| !a.is_empty())
            .unwrap_or(DEFAULT_SCAN_LABEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn action_falls_back_when_record_or_action_missing() {
        let bare: ScanEvent = serde_json::from_value(json!({ "barcode": "X1" })).unwrap();
        assert_eq!(bare.action_label(), "Scanned");

        let no_action: ScanEvent =
            serde_json::from_value(json!({ "barcode": "X1", "record": { "name": "A" } })).unwrap();
        assert_eq!(no_action.action_label(), "Scanned");

        let full: ScanEvent =
            serde_json::from_value(json!({ "barcode": "X1", "record": { "action": "Walk-Out" } }))
                .unwrap();
        assert_eq!(full.action_label(), "Walk-Out");
    }

    #[test]
    fn server_event_serializes_record_fields_inline() {
        let details = AttendanceRecord {
            roll: "X1".into(),
            barcode: "X1".into(),
            name: "Student X1".into(),
            status: "In Library".into(),
            ..Default::default()
        };
        let value = serde_json::to_value(ScanEvent::new("X1", ScanAction::WalkIn, details)).unwrap();

        assert_eq!(value["barcode"], "X1");
        assert_eq!(value["record"]["action"], "Walk-In");
        assert_eq!(value["record"]["name"], "Student X1");
        assert_eq!(value["record"]["status"], "In Library");
    }
}
