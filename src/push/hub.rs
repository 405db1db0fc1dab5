use serde_json::{Value, json};
use tokio::sync::broadcast;
use tracing::debug;

use crate::model::scan::ScanEvent;

const CONNECTED: &str = "connect";
const BARCODE_SCANNED: &str = "barcode_scanned";
const DATA_CLEARED: &str = "data_cleared";

#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    Connected,
    BarcodeScanned(ScanEvent),
    DataCleared,
}

impl PushEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PushEvent::Connected => CONNECTED,
            PushEvent::BarcodeScanned(_) => BARCODE_SCANNED,
            PushEvent::DataCleared => DATA_CLEARED,
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            PushEvent::Connected => json!({ "status": "connected" }),
            PushEvent::BarcodeScanned(scan) => json!(scan),
            PushEvent::DataCleared => json!({ "success": true }),
        }
    }

    /// Rebuilds an event from its wire name and JSON data. Unknown names
    /// yield `None`.
    pub fn from_wire(name: &str, data: &str) -> Result<Option<Self>, serde_json::Error> {
        Ok(match name {
            CONNECTED => Some(PushEvent::Connected),
            BARCODE_SCANNED => Some(PushEvent::BarcodeScanned(serde_json::from_str(data)?)),
            DATA_CLEARED => Some(PushEvent::DataCleared),
            _ => None,
        })
    }
}

/// Broadcast fan-out to every open push stream.
#[derive(Clone)]
pub struct EventHub {
    tx: broadcast::Sender<PushEvent>,
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        EventHub { tx }
    }

    /// Returns how many subscribers received the event. Nobody listening is
    /// not an error.
    pub fn publish(&self, event: PushEvent) -> usize {
        let name = event.name();
        let delivered = self.tx.send(event).unwrap_or(0);
        debug!(event = name, delivered, "Published push event");
        delivered
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PushEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        EventHub::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_subscriber_sees_published_events() {
        let hub = EventHub::new(8);
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        assert_eq!(hub.publish(PushEvent::DataCleared), 2);
        assert_eq!(a.recv().await.unwrap(), PushEvent::DataCleared);
        assert_eq!(b.recv().await.unwrap(), PushEvent::DataCleared);
    }

    #[test]
    fn publishing_without_listeners_is_fine() {
        let hub = EventHub::default();
        assert_eq!(hub.publish(PushEvent::Connected), 0);
    }

    #[test]
    fn wire_names_round_trip() {
        let scan = PushEvent::from_wire(BARCODE_SCANNED, r#"{"barcode":"Z9"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(scan.name(), "barcode_scanned");
        assert!(PushEvent::from_wire("heartbeat", "{}").unwrap().is_none());
        assert!(PushEvent::from_wire(BARCODE_SCANNED, "{").is_err());
    }
}
