//! Barcode input sources feeding the [`ScanProcessor`].

pub mod hid;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tracing::{error, info, warn};

use crate::services::scan::ScanProcessor;
use hid::BarcodeAssembler;

/// A partial HID barcode is submitted after this much silence.
pub const HID_IDLE_FLUSH: Duration = Duration::from_millis(500);

/// Owns the single background scanner task of the process.
pub struct Scanner {
    processor: ScanProcessor,
    device: Option<PathBuf>,
    running: Arc<AtomicBool>,
}

impl Scanner {
    pub fn new(processor: ScanProcessor, device: Option<PathBuf>) -> Self {
        Scanner {
            processor,
            device,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Starts the listener unless one is already running. Returns whether
    /// this call started it.
    pub fn start(&self) -> bool {
        if self.running.swap(true, Ordering::SeqCst) {
            return false;
        }

        let processor = self.processor.clone();
        let device = self.device.clone();
        let running = self.running.clone();

        actix_web::rt::spawn(async move {
            let outcome = match device {
                Some(path) => {
                    info!(device = %path.display(), "Listening for HID barcode reports");
                    match tokio::fs::File::open(&path).await {
                        Ok(file) => read_hid_reports(file, &processor, HID_IDLE_FLUSH).await,
                        Err(e) => Err(e),
                    }
                }
                None => {
                    info!("Listening for barcodes on stdin, one per line");
                    read_lines(BufReader::new(tokio::io::stdin()), &processor).await
                }
            };

            match outcome {
                Ok(count) => info!(count, "Scanner input closed"),
                Err(e) => error!(error = %e, "Scanner listener exited"),
            }
            running.store(false, Ordering::SeqCst);
        });

        true
    }
}

async fn submit(processor: &ScanProcessor, barcode: &str) -> bool {
    match processor.handle_barcode(barcode).await {
        Ok(Some(_)) => true,
        Ok(None) => false,
        Err(e) => {
            error!(error = %e, barcode, "Failed to record scan");
            false
        }
    }
}

/// Keyboard-wedge scanners and manual typing: one barcode per line.
/// Returns the number of recorded scans once the input ends.
pub async fn read_lines<R>(reader: R, processor: &ScanProcessor) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut recorded = 0;

    while let Some(line) = lines.next_line().await? {
        if submit(processor, &line).await {
            recorded += 1;
        }
    }
    Ok(recorded)
}

/// Raw HID reports, one report per read as a `hidraw` node delivers them.
pub async fn read_hid_reports<R>(
    mut reader: R,
    processor: &ScanProcessor,
    idle_flush: Duration,
) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut assembler = BarcodeAssembler::default();
    let mut report = [0u8; 64];
    let mut recorded = 0;

    loop {
        match tokio::time::timeout(idle_flush, reader.read(&mut report)).await {
            Err(_) => {
                if let Some(barcode) = assembler.flush() {
                    warn!(%barcode, "Scanner went quiet without Enter, submitting partial read");
                    if submit(processor, &barcode).await {
                        recorded += 1;
                    }
                }
            }
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => {
                if let Some(barcode) = assembler.push_report(&report[..n]) {
                    if submit(processor, &barcode).await {
                        recorded += 1;
                    }
                }
            }
            Ok(Err(e)) => return Err(e),
        }
    }

    if let Some(barcode) = assembler.flush() {
        if submit(processor, &barcode).await {
            recorded += 1;
        }
    }
    Ok(recorded)
}
