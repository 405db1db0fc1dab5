//! Downloadable copies of the ledger.

use derive_more::Display;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::model::attendance::{AttendanceRecord, NOT_RECORDED};

const SHEET_NAME: &str = "Attendance";
const SHEET_HEADERS: [&str; 8] = [
    "Roll_Number",
    "Name",
    "Section",
    "Class",
    "Date",
    "Walk_In_Time",
    "Walk_Out_Time",
    "Status",
];

const PDF_HEADERS: [&str; 8] = [
    "Roll", "Name", "Section", "Class", "Date", "In Time", "Out Time", "Status",
];
// A4 landscape
const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 10.0;
const LINE_HEIGHT: f32 = 6.5;
const ROWS_PER_PAGE: usize = 26;
const COLUMN_X: [f32; 8] = [0.0, 34.0, 100.0, 126.0, 148.0, 178.0, 206.0, 234.0];

#[derive(Debug, Display)]
pub enum ExportError {
    #[display(fmt = "Excel export failed: {}", _0)]
    Excel(String),
    #[display(fmt = "PDF export failed: {}", _0)]
    Pdf(String),
}

impl std::error::Error for ExportError {}

impl From<XlsxError> for ExportError {
    fn from(e: XlsxError) -> Self {
        ExportError::Excel(e.to_string())
    }
}

/// Cell values in export column order. A missing out time is left blank.
fn export_cells(r: &AttendanceRecord) -> [&str; 8] {
    let out_time = if r.out_time == NOT_RECORDED {
        ""
    } else {
        r.out_time.as_str()
    };
    [
        r.barcode.as_str(),
        r.name.as_str(),
        r.section.as_str(),
        r.class_name.as_str(),
        r.date.as_str(),
        r.in_time.as_str(),
        out_time,
        r.status.as_str(),
    ]
}

pub fn to_xlsx(records: &[AttendanceRecord]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        for (col, header) in (0u16..).zip(SHEET_HEADERS) {
            sheet.write_string_with_format(0, col, header, &bold)?;
        }
        for (row, record) in (1u32..).zip(records) {
            for (col, value) in (0u16..).zip(export_cells(record)) {
                sheet.write_string(row, col, value)?;
            }
        }
        sheet.autofit();
    }

    Ok(workbook.save_to_buffer()?)
}

pub fn to_pdf(records: &[AttendanceRecord]) -> Result<Vec<u8>, ExportError> {
    let (doc, page, layer) = PdfDocument::new(
        "Library Attendance",
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Table",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;

    let mut chunks = records.chunks(ROWS_PER_PAGE);
    let mut current = doc.get_page(page).get_layer(layer);
    let mut page_rows = chunks.next().unwrap_or(&[]);

    loop {
        write_pdf_line(&current, 0, &PDF_HEADERS, &bold, 10.0);
        for (i, record) in page_rows.iter().enumerate() {
            write_pdf_line(&current, i + 1, &export_cells(record), &regular, 9.0);
        }

        match chunks.next() {
            Some(next) => {
                let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Table");
                current = doc.get_page(page).get_layer(layer);
                page_rows = next;
            }
            None => break,
        }
    }

    doc.save_to_bytes()
        .map_err(|e| ExportError::Pdf(e.to_string()))
}

fn write_pdf_line(
    layer: &PdfLayerReference,
    line: usize,
    cells: &[&str; 8],
    font: &IndirectFontRef,
    size: f32,
) {
    let y = PAGE_HEIGHT - MARGIN - 5.0 - LINE_HEIGHT * line as f32;
    for (x, cell) in COLUMN_X.iter().zip(cells) {
        // builtin fonts only cover Latin-1
        let text: String = cell
            .chars()
            .map(|c| if c == '—' { '-' } else { c })
            .collect();
        layer.use_text(text, size, Mm(MARGIN + x), Mm(y), font);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(roll: &str) -> AttendanceRecord {
        AttendanceRecord {
            roll: roll.into(),
            barcode: roll.into(),
            name: format!("Student {roll}"),
            section: NOT_RECORDED.into(),
            class_name: "BCA".into(),
            date: "2026-03-14".into(),
            in_time: "09:00:00".into(),
            out_time: NOT_RECORDED.into(),
            status: "In Library".into(),
        }
    }

    #[test]
    fn missing_out_time_is_blank() {
        let r = record("R1");
        let cells = export_cells(&r);
        assert_eq!(cells[0], "R1");
        assert_eq!(cells[6], "");
        assert_eq!(cells[7], "In Library");
    }

    #[test]
    fn workbook_is_an_xlsx_archive() {
        let bytes = to_xlsx(&[record("R1"), record("R2")]).unwrap();
        assert!(bytes.starts_with(b"PK"));
        assert!(to_xlsx(&[]).unwrap().starts_with(b"PK"));
    }

    #[test]
    fn pdf_spans_pages_for_long_ledgers() {
        let records: Vec<_> = (0..ROWS_PER_PAGE * 2 + 3)
            .map(|i| record(&format!("R{i}")))
            .collect();
        let bytes = to_pdf(&records).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(to_pdf(&[]).unwrap().starts_with(b"%PDF"));
    }
}
