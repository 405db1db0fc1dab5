use chrono::{DateTime, Local};
use tracing::{error, info};

use crate::dashboard::source::{AttendanceSource, FetchError};
use crate::dashboard::view::DashboardView;
use crate::model::scan::ScanEvent;
use crate::push::PushEvent;

/// Status line for a scan: barcode, action and local time of arrival.
pub fn scan_info_text(barcode: &str, action: &str, at: DateTime<Local>) -> String {
    format!("{barcode} — {action} @ {}", at.format("%-m/%-d/%Y, %-I:%M:%S %p"))
}

/// Live attendance board: keeps a view in step with the source and the
/// push channel.
///
/// Refreshes are not sequenced against each other; whichever response
/// arrives last is what stays on screen.
pub struct Dashboard<S, V> {
    source: S,
    view: V,
}

impl<S, V> Dashboard<S, V>
where
    S: AttendanceSource,
    V: DashboardView,
{
    pub fn new(source: S, view: V) -> Self {
        Dashboard { source, view }
    }

    /// Fetches and redraws the rows. On failure the error is logged and the
    /// rows already on screen stay as they are.
    pub async fn load_attendance(&mut self) -> Result<usize, FetchError> {
        match self.source.fetch_attendance().await {
            Ok(rows) => {
                self.view.show_rows(&rows);
                Ok(rows.len())
            }
            Err(e) => {
                error!(error = %e, "Failed to load attendance");
                Err(e)
            }
        }
    }

    pub fn on_connect(&self) {
        info!("Connected");
    }

    /// Updates the status line, then refreshes the table once.
    pub async fn on_scan(&mut self, scan: &ScanEvent, at: DateTime<Local>) {
        let text = scan_info_text(&scan.barcode, scan.action_label(), at);
        self.view.show_scan_info(&text);
        let _ = self.load_attendance().await;
    }

    pub async fn handle(&mut self, event: PushEvent) {
        match event {
            PushEvent::Connected => self.on_connect(),
            PushEvent::BarcodeScanned(scan) => self.on_scan(&scan, Local::now()).await,
            PushEvent::DataCleared => {
                let _ = self.load_attendance().await;
            }
        }
    }
}
