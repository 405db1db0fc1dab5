use std::sync::Arc;

use chrono::Local;
use sqlx::SqlitePool;
use tracing::{info, instrument, warn};

use crate::model::scan::ScanEvent;
use crate::push::{EventHub, PushEvent};
use crate::services::{ledger, students::StudentDirectory};

/// Turns raw barcodes into ledger rows and `barcode_scanned` events.
#[derive(Clone)]
pub struct ScanProcessor {
    pool: SqlitePool,
    students: Arc<StudentDirectory>,
    hub: EventHub,
    class_label: String,
}

impl ScanProcessor {
    pub fn new(
        pool: SqlitePool,
        students: Arc<StudentDirectory>,
        hub: EventHub,
        class_label: impl Into<String>,
    ) -> Self {
        ScanProcessor {
            pool,
            students,
            hub,
            class_label: class_label.into(),
        }
    }

    /// Blank input is ignored and yields `Ok(None)`.
    #[instrument(name = "scan", skip(self))]
    pub async fn handle_barcode(&self, raw: &str) -> Result<Option<ScanEvent>, sqlx::Error> {
        let barcode = raw.trim();
        if barcode.is_empty() {
            return Ok(None);
        }

        let student = self.students.get(barcode);
        if student.is_none() {
            warn!(barcode, "Student not found, recording by barcode");
        }

        let (record, action) = ledger::record_scan(
            &self.pool,
            barcode,
            student,
            &self.class_label,
            Local::now().naive_local(),
        )
        .await?;

        info!(barcode, %action, name = %record.name, "Barcode recorded");

        let event = ScanEvent::new(barcode, action, record);
        self.hub.publish(PushEvent::BarcodeScanned(event.clone()));
        Ok(Some(event))
    }
}
